//! Unified error handling for tscal
//!
//! One error type shared by the core library and the front-end. Every variant
//! renders a message that can be shown to the user or written to the log.

use std::io;
use std::path::PathBuf;

/// Result type alias using TscalError
pub type Result<T> = std::result::Result<T, TscalError>;

/// Unified error type for all tscal operations
#[derive(thiserror::Error, Debug)]
pub enum TscalError {
    // ============================================================================
    // I/O and File System Errors
    // ============================================================================
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: io::Error,
    },

    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        source: io::Error,
    },

    // ============================================================================
    // Input Device Errors
    // ============================================================================
    #[error("Touchscreen not found: {0}")]
    DeviceNotFound(String),

    #[error("Input device error on {path}: {reason}")]
    DeviceIo {
        path: PathBuf,
        reason: String,
    },

    // ============================================================================
    // Calibration Errors
    // ============================================================================
    #[error("Calibration validation failed: {0}")]
    ValidationFailed(String),

    #[error("Failed to save calibration to {path}: {reason}")]
    PersistFailed {
        path: PathBuf,
        reason: String,
    },

    #[error("Failed to apply calibration: {0}")]
    ApplyFailed(String),

    #[error("Malformed calibration file {path}: {reason}")]
    MalformedCalibration {
        path: PathBuf,
        reason: String,
    },

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid configuration value for {field}: {reason}")]
    InvalidConfig {
        field: String,
        reason: String,
    },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Generic(String),
}

impl TscalError {
    /// Create a generic error from a string
    pub fn generic(msg: impl Into<String>) -> Self {
        Self::Generic(msg.into())
    }

    /// Create a config error from a string
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid config error for a named field
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a device I/O error
    pub fn device_io(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::DeviceIo {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a validation error from a string
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationFailed(msg.into())
    }

    /// Create a persistence error
    pub fn persist_failed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::PersistFailed {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a live-apply error from a string
    pub fn apply_failed(msg: impl Into<String>) -> Self {
        Self::ApplyFailed(msg.into())
    }

    /// Create a malformed calibration file error
    pub fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::MalformedCalibration {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

// Allow converting from String to TscalError
impl From<String> for TscalError {
    fn from(s: String) -> Self {
        Self::Generic(s)
    }
}

// Allow converting from &str to TscalError
impl From<&str> for TscalError {
    fn from(s: &str) -> Self {
        Self::Generic(s.to_string())
    }
}
