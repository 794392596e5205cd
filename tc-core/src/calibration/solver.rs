//! Scale/offset solver for four-corner calibration
//!
//! Each screen edge is located in raw units by averaging the two corner
//! samples that share it. The raw-units-per-pixel scale between opposite
//! edges is then used to extrapolate outward by the crosshair offset, giving
//! the raw coordinates of the true screen edges.

use tracing::debug;

use crate::constants::calibration::NUM_POINTS;
use crate::data::{AffineMatrix, CalibrationPoint, CalibrationResult, OutputForm, RawBounds, TargetLayout};
use crate::error::{Result, TscalError};

/// Raw coordinates of the screen edges, before any rounding
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtrapolatedBounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl ExtrapolatedBounds {
    /// Check the bounds lie inside `[0, range]` and are not inverted or empty
    pub fn validate(&self, range: i32) -> Result<()> {
        let range = range as f64;
        let all = [self.min_x, self.max_x, self.min_y, self.max_y];
        if all.iter().any(|v| !v.is_finite()) {
            return Err(TscalError::validation(format!(
                "non-finite bounds x=[{}, {}] y=[{}, {}]",
                self.min_x, self.max_x, self.min_y, self.max_y
            )));
        }
        if self.min_x < 0.0 || self.min_y < 0.0 {
            return Err(TscalError::validation(format!(
                "minimum ({:.1}, {:.1}) below 0",
                self.min_x, self.min_y
            )));
        }
        if self.max_x > range || self.max_y > range {
            return Err(TscalError::validation(format!(
                "maximum ({:.1}, {:.1}) above {}",
                self.max_x, self.max_y, range
            )));
        }
        if self.min_x >= self.max_x || self.min_y >= self.max_y {
            return Err(TscalError::validation(format!(
                "inverted or empty span x=[{:.1}, {:.1}] y=[{:.1}, {:.1}]",
                self.min_x, self.max_x, self.min_y, self.max_y
            )));
        }
        Ok(())
    }

    /// Nearest integer bounds, ties away from zero
    pub fn to_raw_bounds(&self) -> RawBounds {
        RawBounds {
            min_x: self.min_x.round() as i32,
            max_x: self.max_x.round() as i32,
            min_y: self.min_y.round() as i32,
            max_y: self.max_y.round() as i32,
        }
    }

    /// Matrix mapping normalized raw coordinates to normalized screen coordinates
    pub fn to_matrix(&self, range: i32) -> AffineMatrix {
        let range = range as f64;
        let a = range / (self.max_x - self.min_x);
        let c = self.min_x / (self.min_x - self.max_x);
        let e = range / (self.max_y - self.min_y);
        let f = self.min_y / (self.min_y - self.max_y);
        AffineMatrix::scale_translate(a as f32, c as f32, e as f32, f as f32)
    }

    pub fn encode(&self, form: OutputForm, range: i32) -> CalibrationResult {
        match form {
            OutputForm::Bounds => CalibrationResult::Bounds(self.to_raw_bounds()),
            OutputForm::Matrix => CalibrationResult::Matrix(self.to_matrix(range)),
        }
    }
}

/// Derive and validate the screen-edge bounds from four averaged corners
///
/// `points` must follow the layout order: top-left, top-right, bottom-right,
/// bottom-left.
pub fn solve(
    points: &[CalibrationPoint; NUM_POINTS],
    layout: &TargetLayout,
    range: i32,
) -> Result<ExtrapolatedBounds> {
    let left_x = (points[0].x + points[3].x) / 2.0;
    let right_x = (points[1].x + points[2].x) / 2.0;
    let top_y = (points[0].y + points[1].y) / 2.0;
    let bot_y = (points[2].y + points[3].y) / 2.0;

    let left_px = layout.targets[0].x as f64;
    let right_px = layout.targets[1].x as f64;
    let top_px = layout.targets[0].y as f64;
    let bot_px = layout.targets[2].y as f64;

    let scale_x = (right_x - left_x) / (right_px - left_px);
    let scale_y = (bot_y - top_y) / (bot_px - top_px);
    let offset = layout.offset as f64;

    let bounds = ExtrapolatedBounds {
        min_x: left_x - scale_x * offset,
        max_x: right_x + scale_x * offset,
        min_y: top_y - scale_y * offset,
        max_y: bot_y + scale_y * offset,
    };
    debug!(
        "Solved scale=({:.4}, {:.4}) bounds x=[{:.1}, {:.1}] y=[{:.1}, {:.1}]",
        scale_x, scale_y, bounds.min_x, bounds.max_x, bounds.min_y, bounds.max_y
    );

    bounds.validate(range)?;
    Ok(bounds)
}
