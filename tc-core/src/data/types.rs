//! Core data types for touch sampling and calibration results

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::calibration::NUM_POINTS;

// ============================================================================
// Touch Input
// ============================================================================

/// A position in raw digitizer units
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSample {
    pub x: i32,
    pub y: i32,
}

impl RawSample {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// One consistent touch state, emitted at every synchronization report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchReport {
    pub position: RawSample,
    pub pressed: bool,
}

impl TouchReport {
    pub const fn new(position: RawSample, pressed: bool) -> Self {
        Self { position, pressed }
    }
}

// ============================================================================
// Reference Points
// ============================================================================

/// A position in screen pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: i32,
    pub y: i32,
}

impl ScreenPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Crosshair positions for the four corners of the screen
///
/// Order is top-left, top-right, bottom-right, bottom-left. Each crosshair is
/// pulled inward from its corner by `offset` pixels on both axes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetLayout {
    pub width: u32,
    pub height: u32,
    pub offset: u32,
    pub targets: [ScreenPoint; NUM_POINTS],
}

impl TargetLayout {
    /// Build the corner layout for a screen of the given size
    pub fn for_screen(width: u32, height: u32, offset: u32) -> Self {
        let (w, h, o) = (width as i32, height as i32, offset as i32);
        Self {
            width,
            height,
            offset,
            targets: [
                ScreenPoint::new(o, o),
                ScreenPoint::new(w - o, o),
                ScreenPoint::new(w - o, h - o),
                ScreenPoint::new(o, h - o),
            ],
        }
    }

    /// Crosshair position for reference point `index`
    pub fn target(&self, index: usize) -> Option<ScreenPoint> {
        self.targets.get(index).copied()
    }
}

/// Averaged raw position collected at one reference point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationPoint {
    pub x: f64,
    pub y: f64,
}

impl CalibrationPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Nearest raw sample, ties rounded away from zero
    pub fn rounded(&self) -> RawSample {
        RawSample::new(self.x.round() as i32, self.y.round() as i32)
    }
}

impl From<RawSample> for CalibrationPoint {
    fn from(s: RawSample) -> Self {
        Self::new(s.x as f64, s.y as f64)
    }
}

// ============================================================================
// Calibration Results
// ============================================================================

/// Encoding expected by the downstream input stack
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputForm {
    /// Per-axis raw minimum/maximum, applied to the kernel device
    Bounds,
    /// 3x3 affine matrix for libinput
    #[default]
    Matrix,
}

impl fmt::Display for OutputForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputForm::Bounds => write!(f, "bounds"),
            OutputForm::Matrix => write!(f, "matrix"),
        }
    }
}

impl std::str::FromStr for OutputForm {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bounds" => Ok(OutputForm::Bounds),
            "matrix" => Ok(OutputForm::Matrix),
            other => Err(format!("unknown output form '{}' (expected bounds or matrix)", other)),
        }
    }
}

/// Raw axis bounds covering the full visible screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawBounds {
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
    pub max_y: i32,
}

/// Row-major 3x3 calibration matrix
///
/// Maps `[x, y, 1]` in normalized raw coordinates to normalized screen
/// coordinates. Only scale and translation terms are ever non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AffineMatrix {
    pub values: [f32; 9],
}

impl AffineMatrix {
    pub const IDENTITY: AffineMatrix = AffineMatrix {
        values: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
    };

    /// Scale/translate matrix with no rotation terms
    pub fn scale_translate(scale_x: f32, offset_x: f32, scale_y: f32, offset_y: f32) -> Self {
        Self {
            values: [
                scale_x, 0.0, offset_x,
                0.0, scale_y, offset_y,
                0.0, 0.0, 1.0,
            ],
        }
    }

    /// Apply to a normalized point
    pub fn transform(&self, x: f32, y: f32) -> (f32, f32) {
        let m = &self.values;
        (m[0] * x + m[1] * y + m[2], m[3] * x + m[4] * y + m[5])
    }
}

/// A finished calibration in the form the downstream consumer expects
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "form", rename_all = "lowercase")]
pub enum CalibrationResult {
    Bounds(RawBounds),
    Matrix(AffineMatrix),
}

impl CalibrationResult {
    pub fn form(&self) -> OutputForm {
        match self {
            CalibrationResult::Bounds(_) => OutputForm::Bounds,
            CalibrationResult::Matrix(_) => OutputForm::Matrix,
        }
    }
}
