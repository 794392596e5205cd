//! tscal core library
//!
//! Touchscreen calibration for Linux evdev digitizers.
//!
//! # Module Structure
//!
//! - `input/` - decoding of the raw `input_event` stream into touch reports
//! - `calibration/` - sample window, calibration state machine, solver
//! - `data/` - shared types and calibration file formats
//! - `hw/` - device discovery and live application of results
//!
//! # Example
//!
//! ```no_run
//! use tc_core::{CalibrationSession, EventDecoder, OutputForm, SessionConfig, SystemSink, TargetLayout};
//!
//! let device = tc_core::find_touchscreen("Chumby 8 touchscreen").ok();
//! let config = SessionConfig::new(TargetLayout::for_screen(800, 480, 20), OutputForm::Matrix);
//! let mut session = CalibrationSession::new(config, device.is_some());
//! let mut sink = SystemSink::new(device.as_ref(), "Chumby 8 touchscreen", "/tmp/touchscreen.conf".into());
//! let mut decoder = EventDecoder::new();
//! if let Some(dev) = device.as_ref() {
//!     decoder.read_available(&mut &*dev, |report| {
//!         session.handle_report(report, &mut sink);
//!     }).unwrap();
//! }
//! ```

// Grouped modules
pub mod calibration;
pub mod data;
pub mod hw;
pub mod input;

// Standalone modules
pub mod constants;
pub mod error;

pub use calibration::{
    solve, CalibrationSession, CalibrationSink, CalibrationState, ExtrapolatedBounds,
    SampleWindow, SessionConfig,
};
pub use data::{
    decode_calibration, default_calibration_path, encode_calibration, load_calibration,
    save_calibration, AffineMatrix, CalibrationPoint, CalibrationResult, OutputForm, RawBounds,
    RawSample, ScreenPoint, TargetLayout, TouchReport,
};
pub use error::{Result, TscalError};
pub use hw::{
    apply_calibration, find_touchscreen, list_input_devices, preferred_device_name, SystemSink,
    TouchDevice,
};
pub use input::{EventDecoder, RawEvent, RECORD_SIZE};
