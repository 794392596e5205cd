//! Live application of a calibration to the running input stack
//!
//! # Raw bounds
//!
//! The kernel axis ranges of the touchscreen are rewritten in place with
//! `EVIOCSABS`, so every consumer that scales by the advertised range picks
//! up the new bounds on its next open.
//!
//! # Matrix
//!
//! libinput reads its calibration from the X input property
//! `libinput Calibration Matrix`; it is set through `xinput set-prop`.

use std::os::unix::io::AsRawFd;
use std::path::PathBuf;
use std::process::Command;
use tracing::{debug, info};

use crate::calibration::CalibrationSink;
use crate::constants::evdev::{ABS_X, ABS_Y};
use crate::constants::xinput;
use crate::data::{format_matrix_values, save_calibration, AffineMatrix, CalibrationResult, RawBounds};
use crate::error::{Result, TscalError};
use crate::hw::device::TouchDevice;
use crate::hw::ioctl;

fn set_axis_range(device: &TouchDevice, axis: u16, min: i32, max: i32) -> Result<()> {
    let fd = device.as_raw_fd();
    // SAFETY: input_absinfo is plain old data; zeroed is a valid value.
    let mut info: libc::input_absinfo = unsafe { std::mem::zeroed() };

    // SAFETY: EVIOCGABS fills exactly one input_absinfo owned by this frame.
    let rc = unsafe { libc::ioctl(fd, ioctl::eviocgabs(axis) as _, &mut info as *mut libc::input_absinfo) };
    if rc < 0 {
        return Err(TscalError::apply_failed(format!(
            "EVIOCGABS({}) on {:?}: {}",
            axis,
            device.path(),
            std::io::Error::last_os_error()
        )));
    }

    debug!(
        "Axis {} range {}..{} -> {}..{}",
        axis, info.minimum, info.maximum, min, max
    );
    info.minimum = min;
    info.maximum = max;

    // SAFETY: EVIOCSABS only reads the input_absinfo passed in.
    let rc = unsafe { libc::ioctl(fd, ioctl::eviocsabs(axis) as _, &info as *const libc::input_absinfo) };
    if rc < 0 {
        return Err(TscalError::apply_failed(format!(
            "EVIOCSABS({}) on {:?}: {}",
            axis,
            device.path(),
            std::io::Error::last_os_error()
        )));
    }
    Ok(())
}

/// Rewrite the kernel X/Y axis ranges of `device`
pub fn apply_axis_bounds(device: &TouchDevice, bounds: &RawBounds) -> Result<()> {
    set_axis_range(device, ABS_X, bounds.min_x, bounds.max_x)?;
    set_axis_range(device, ABS_Y, bounds.min_y, bounds.max_y)?;
    info!("Applied axis bounds to {:?}", device.path());
    Ok(())
}

/// Arguments passed to `xinput` to set the matrix property
pub fn xinput_args(device_name: &str, matrix: &AffineMatrix) -> Vec<String> {
    let mut args = vec![
        "set-prop".to_string(),
        device_name.to_string(),
        xinput::CALIBRATION_PROPERTY.to_string(),
    ];
    args.extend(format_matrix_values(matrix).split(' ').map(str::to_string));
    args
}

/// Set libinput's calibration matrix on the named X input device
pub fn apply_matrix_property(device_name: &str, matrix: &AffineMatrix) -> Result<()> {
    let output = Command::new(xinput::PROGRAM)
        .args(xinput_args(device_name, matrix))
        .output()
        .map_err(|e| TscalError::apply_failed(format!("cannot run {}: {}", xinput::PROGRAM, e)))?;

    if !output.status.success() {
        return Err(TscalError::apply_failed(format!(
            "{} exited with {}: {}",
            xinput::PROGRAM,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    info!("Applied calibration matrix to '{}'", device_name);
    Ok(())
}

/// Apply a result in whichever way its form requires
pub fn apply_calibration(
    device: Option<&TouchDevice>,
    device_name: &str,
    result: &CalibrationResult,
) -> Result<()> {
    match result {
        CalibrationResult::Bounds(bounds) => {
            let device = device.ok_or_else(|| TscalError::apply_failed("no touchscreen open"))?;
            apply_axis_bounds(device, bounds)
        }
        CalibrationResult::Matrix(matrix) => apply_matrix_property(device_name, matrix),
    }
}

/// Sink that saves to a file and applies to the live system
pub struct SystemSink<'a> {
    pub device: Option<&'a TouchDevice>,
    pub device_name: String,
    pub calibration_file: PathBuf,
}

impl<'a> SystemSink<'a> {
    pub fn new(device: Option<&'a TouchDevice>, device_name: impl Into<String>, calibration_file: PathBuf) -> Self {
        Self {
            device,
            device_name: device_name.into(),
            calibration_file,
        }
    }
}

impl CalibrationSink for SystemSink<'_> {
    fn persist(&mut self, result: &CalibrationResult) -> Result<()> {
        save_calibration(&self.calibration_file, result)
    }

    fn apply(&mut self, result: &CalibrationResult) -> Result<()> {
        apply_calibration(self.device, &self.device_name, result)
    }
}
