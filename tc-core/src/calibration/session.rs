//! Calibration state machine
//!
//! Walks the four reference points in order. While the screen is pressed
//! every report is pushed into the sample window; the release edge collapses
//! the window into one calibration point and advances. After the fourth
//! point the solver runs synchronously. Once a result (or an error) is on
//! screen the next tap saves and applies it, and the tap after that asks the
//! front-end to exit.

use tracing::{debug, error, info, warn};

use crate::calibration::solver::{solve, ExtrapolatedBounds};
use crate::calibration::window::SampleWindow;
use crate::constants::calibration::{NUM_POINTS, RAW_RANGE};
use crate::constants::messages;
use crate::data::{CalibrationPoint, CalibrationResult, OutputForm, ScreenPoint, TargetLayout, TouchReport};
use crate::error::Result;

/// Side effects performed when the user accepts a calibration
#[cfg_attr(test, mockall::automock)]
pub trait CalibrationSink {
    /// Write the result durably
    fn persist(&mut self, result: &CalibrationResult) -> Result<()>;

    /// Push the result into the running input stack
    fn apply(&mut self, result: &CalibrationResult) -> Result<()>;
}

/// Where the session is in the calibration sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationState {
    /// No device was found; touch input is ignored
    AwaitingTouchscreen,
    /// Collecting samples for reference point `point`
    Calibrating { point: usize },
    /// All points captured, solver running
    Computing,
    /// A valid result is waiting to be saved, or has been saved
    Complete,
    /// Validation failed; the next tap exits
    Error,
}

/// Settings fixed for the lifetime of a session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub layout: TargetLayout,
    pub form: OutputForm,
    pub range: i32,
}

impl SessionConfig {
    pub fn new(layout: TargetLayout, form: OutputForm) -> Self {
        Self { layout, form, range: RAW_RANGE }
    }
}

#[derive(Debug)]
pub struct CalibrationSession {
    config: SessionConfig,
    state: CalibrationState,
    window: SampleWindow,
    points: Vec<CalibrationPoint>,
    bounds: Option<ExtrapolatedBounds>,
    touch_is_pressed: bool,
    message: &'static str,
    exit_requested: bool,
}

impl CalibrationSession {
    /// Start calibrating, or park in `AwaitingTouchscreen` when no device was found
    pub fn new(config: SessionConfig, device_found: bool) -> Self {
        let (state, message) = if device_found {
            (CalibrationState::Calibrating { point: 0 }, messages::INSTRUCTIONS)
        } else {
            (CalibrationState::AwaitingTouchscreen, messages::NO_TOUCHSCREEN)
        };
        info!("Calibration session starting in {:?}", state);
        Self {
            config,
            state,
            window: SampleWindow::new(),
            points: Vec::with_capacity(NUM_POINTS),
            bounds: None,
            touch_is_pressed: false,
            message,
            exit_requested: false,
        }
    }

    pub fn state(&self) -> CalibrationState {
        self.state
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Index of the reference point being collected, if any
    pub fn current_index(&self) -> Option<usize> {
        match self.state {
            CalibrationState::Calibrating { point } => Some(point),
            _ => None,
        }
    }

    /// Crosshair the renderer should draw, if any
    pub fn current_target(&self) -> Option<ScreenPoint> {
        self.current_index().and_then(|i| self.config.layout.target(i))
    }

    /// Text the renderer should show
    pub fn message(&self) -> &str {
        self.message
    }

    pub fn points(&self) -> &[CalibrationPoint] {
        &self.points
    }

    /// Solved bounds, present from `Complete` until the result is saved
    pub fn bounds(&self) -> Option<ExtrapolatedBounds> {
        self.bounds
    }

    /// Encoded result awaiting the confirmation tap
    pub fn pending_result(&self) -> Option<CalibrationResult> {
        self.bounds.map(|b| b.encode(self.config.form, self.config.range))
    }

    /// True once the dismissal tap has been seen
    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    /// Feed one touch report; returns the states entered, in order
    pub fn handle_report(
        &mut self,
        report: TouchReport,
        sink: &mut dyn CalibrationSink,
    ) -> Vec<CalibrationState> {
        let mut entered = Vec::new();
        if self.state == CalibrationState::AwaitingTouchscreen {
            return entered;
        }

        let just_pressed = report.pressed && !self.touch_is_pressed;
        let just_released = !report.pressed && self.touch_is_pressed;
        self.touch_is_pressed = report.pressed;

        match self.state {
            CalibrationState::Calibrating { point } => {
                if report.pressed {
                    if just_pressed {
                        debug!("Dwell started on point {}", point);
                    }
                    self.window.push(report.position);
                } else if just_released {
                    self.finish_point(point, &mut entered);
                }
            }
            CalibrationState::Complete | CalibrationState::Error if just_pressed => {
                self.dismiss(sink);
            }
            _ => {}
        }
        entered
    }

    fn enter(&mut self, state: CalibrationState, entered: &mut Vec<CalibrationState>) {
        debug!("Calibration state {:?} -> {:?}", self.state, state);
        self.state = state;
        entered.push(state);
    }

    fn finish_point(&mut self, point: usize, entered: &mut Vec<CalibrationState>) {
        let Some(averaged) = self.window.resolve() else {
            warn!("Release on point {} with no samples; ignoring", point);
            return;
        };
        let averaged = match self.config.form {
            OutputForm::Bounds => averaged.rounded().into(),
            OutputForm::Matrix => averaged,
        };
        info!("Point {} captured at ({:.1}, {:.1})", point, averaged.x, averaged.y);
        self.points.push(averaged);

        if point + 1 < NUM_POINTS {
            self.enter(CalibrationState::Calibrating { point: point + 1 }, entered);
        } else {
            self.enter(CalibrationState::Computing, entered);
            self.compute(entered);
        }
    }

    fn compute(&mut self, entered: &mut Vec<CalibrationState>) {
        let solved = <&[CalibrationPoint; NUM_POINTS]>::try_from(self.points.as_slice())
            .map_err(|_| crate::error::TscalError::generic("wrong number of calibration points"))
            .and_then(|points| solve(points, &self.config.layout, self.config.range));

        match solved {
            Ok(bounds) => {
                info!(
                    "Calibration solved: x=[{:.1}, {:.1}] y=[{:.1}, {:.1}]",
                    bounds.min_x, bounds.max_x, bounds.min_y, bounds.max_y
                );
                self.bounds = Some(bounds);
                self.message = messages::CALIBRATION_COMPLETE;
                self.enter(CalibrationState::Complete, entered);
            }
            Err(e) => {
                warn!("Calibration rejected: {}", e);
                self.points.clear();
                self.message = messages::CALIBRATION_ERROR;
                self.enter(CalibrationState::Error, entered);
            }
        }
    }

    /// Terminal tap: save and apply a fresh result, otherwise request exit
    fn dismiss(&mut self, sink: &mut dyn CalibrationSink) {
        if self.points.is_empty() {
            info!("Dismissal tap in {:?}; requesting exit", self.state);
            self.exit_requested = true;
            return;
        }

        if let Some(result) = self.pending_result() {
            self.message = match sink.persist(&result) {
                Err(e) => {
                    error!("Saving calibration failed: {}", e);
                    messages::SAVE_ERROR
                }
                Ok(()) => match sink.apply(&result) {
                    Err(e) => {
                        error!("Applying calibration failed: {}", e);
                        messages::APPLY_ERROR
                    }
                    Ok(()) => {
                        info!("Calibration saved and applied");
                        messages::SAVED_AND_APPLIED
                    }
                },
            };
        }

        // The next tap exits whatever happened above
        self.points.clear();
        self.bounds = None;
    }
}
