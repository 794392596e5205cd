//! Hardware interaction: evdev discovery, reads and live calibration

mod apply;
mod device;
mod ioctl;

pub use apply::{apply_axis_bounds, apply_calibration, apply_matrix_property, xinput_args, SystemSink};
pub use device::{
    find_touchscreen, find_touchscreen_in, list_input_devices, names_match, preferred_device_name,
    TouchDevice,
};
