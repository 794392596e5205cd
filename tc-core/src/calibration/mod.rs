//! Sample collection and transform solving

mod session;
mod solver;
mod window;

pub use session::{CalibrationSession, CalibrationSink, CalibrationState, SessionConfig};
pub use solver::{solve, ExtrapolatedBounds};
pub use window::SampleWindow;

#[cfg(test)]
pub use session::MockCalibrationSink;
