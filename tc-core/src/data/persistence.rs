//! Saved calibration files
//!
//! Two on-disk encodings, one per output form:
//!
//! - bounds: a single line `"<min_x> <max_x> <min_y> <max_y>"`
//! - matrix: an X.org `InputClass` section carrying libinput's
//!   `CalibrationMatrix` option with nine floats
//!
//! Loading only checks field count and numeric type.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::constants::calibration::MATRIX_DECIMALS;
use crate::constants::paths;
use crate::data::{AffineMatrix, CalibrationResult, OutputForm, RawBounds};
use crate::error::{Result, TscalError};

const MATRIX_OPTION: &str = "CalibrationMatrix";

/// Default save location for a given output form
pub fn default_calibration_path(form: OutputForm) -> PathBuf {
    match form {
        OutputForm::Bounds => PathBuf::from(paths::BOUNDS_CALIBRATION_FILE),
        OutputForm::Matrix => PathBuf::from(paths::MATRIX_CALIBRATION_FILE),
    }
}

/// Space-separated matrix entries at fixed precision
pub fn format_matrix_values(matrix: &AffineMatrix) -> String {
    matrix
        .values
        .iter()
        .map(|v| format!("{:.*}", MATRIX_DECIMALS, v))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render a result in its file format
pub fn encode_calibration(result: &CalibrationResult) -> String {
    match result {
        CalibrationResult::Bounds(b) => {
            format!("{} {} {} {}\n", b.min_x, b.max_x, b.min_y, b.max_y)
        }
        CalibrationResult::Matrix(m) => format!(
            "Section \"InputClass\"\n\
             \tIdentifier \"touchscreen\"\n\
             \tMatchIsTouchscreen \"TRUE\"\n\
             \tMatchDriver \"libinput\"\n\
             \tOption \"{}\" \"{}\"\n\
             EndSection\n",
            MATRIX_OPTION,
            format_matrix_values(m)
        ),
    }
}

/// Parse file contents written by [`encode_calibration`]
pub fn decode_calibration(path: &Path, contents: &str, form: OutputForm) -> Result<CalibrationResult> {
    match form {
        OutputForm::Bounds => decode_bounds(path, contents).map(CalibrationResult::Bounds),
        OutputForm::Matrix => decode_matrix(path, contents).map(CalibrationResult::Matrix),
    }
}

fn decode_bounds(path: &Path, contents: &str) -> Result<RawBounds> {
    let fields: Vec<&str> = contents.split_whitespace().collect();
    if fields.len() != 4 {
        return Err(TscalError::malformed(
            path,
            format!("expected 4 integers, found {} fields", fields.len()),
        ));
    }
    let mut values = [0i32; 4];
    for (slot, field) in values.iter_mut().zip(&fields) {
        *slot = field
            .parse()
            .map_err(|e| TscalError::malformed(path, format!("'{}' is not an integer: {}", field, e)))?;
    }
    Ok(RawBounds {
        min_x: values[0],
        max_x: values[1],
        min_y: values[2],
        max_y: values[3],
    })
}

fn decode_matrix(path: &Path, contents: &str) -> Result<AffineMatrix> {
    let line = contents
        .lines()
        .map(str::trim)
        .find(|l| l.starts_with("Option") && l.contains(MATRIX_OPTION))
        .ok_or_else(|| TscalError::malformed(path, "no CalibrationMatrix option"))?;

    // Option "CalibrationMatrix" "<values>": the values are the fourth quote-delimited piece
    let quoted = line
        .split('"')
        .nth(3)
        .ok_or_else(|| TscalError::malformed(path, "CalibrationMatrix option has no value"))?;

    let fields: Vec<&str> = quoted.split_whitespace().collect();
    if fields.len() != 9 {
        return Err(TscalError::malformed(
            path,
            format!("expected 9 matrix entries, found {}", fields.len()),
        ));
    }
    let mut values = [0f32; 9];
    for (slot, field) in values.iter_mut().zip(&fields) {
        *slot = field
            .parse()
            .map_err(|e| TscalError::malformed(path, format!("'{}' is not a number: {}", field, e)))?;
    }
    Ok(AffineMatrix { values })
}

fn write_and_rename(temp_path: &Path, path: &Path, contents: &[u8]) -> Result<()> {
    let mut file = fs::File::create(temp_path)
        .map_err(|e| TscalError::persist_failed(temp_path, e.to_string()))?;
    file.write_all(contents)
        .map_err(|e| TscalError::persist_failed(temp_path, e.to_string()))?;
    file.sync_all()
        .map_err(|e| TscalError::persist_failed(temp_path, e.to_string()))?;
    drop(file);

    fs::rename(temp_path, path).map_err(|e| TscalError::persist_failed(path, e.to_string()))
}

/// Write a calibration file atomically
pub fn save_calibration(path: &Path, result: &CalibrationResult) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| TscalError::persist_failed(path, format!("cannot create {}: {}", parent.display(), e)))?;
    }

    let contents = encode_calibration(result);
    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);

    let written = write_and_rename(&temp_path, path, contents.as_bytes());
    if written.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    written?;

    info!("Saved {} calibration to {:?}", result.form(), path);
    Ok(())
}

/// Read a calibration file written by [`save_calibration`]
pub fn load_calibration(path: &Path, form: OutputForm) -> Result<CalibrationResult> {
    let contents = fs::read_to_string(path).map_err(|e| TscalError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let result = decode_calibration(path, &contents, form)?;
    debug!("Loaded {} calibration from {:?}", form, path);
    Ok(result)
}
