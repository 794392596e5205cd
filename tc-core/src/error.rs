//! Error types, re-exported from the shared `tc-error` crate

pub use tc_error::{Result, TscalError};
