//! Data types and calibration file persistence

mod persistence;
mod types;

pub use persistence::{
    decode_calibration, default_calibration_path, encode_calibration, format_matrix_values,
    load_calibration, save_calibration,
};
pub use types::{
    AffineMatrix, CalibrationPoint, CalibrationResult, OutputForm, RawBounds, RawSample,
    ScreenPoint, TargetLayout, TouchReport,
};
