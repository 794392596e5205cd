/*
 * This file is part of tscal.
 *
 * Copyright (C) 2025 tscal contributors
 *
 * tscal is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * tscal is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with tscal. If not, see <https://www.gnu.org/licenses/>.
 */

use std::io::{self, Read, Stdout};
use std::os::unix::io::AsRawFd;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tc_core::constants::timing::POLL_TICK_MS;
use tc_core::{
    find_touchscreen, preferred_device_name, CalibrationSession, CalibrationSink, CalibrationState, EventDecoder,
    SessionConfig, SystemSink, TargetLayout, TouchDevice,
};
use tracing::{error, info, warn};

use crate::config::Settings;
use crate::system;
use crate::ui::ui;

/// Open the configured event node, or discover the touchscreen by name
pub fn open_device(settings: &Settings) -> tc_core::Result<TouchDevice> {
    match &settings.device_path {
        Some(path) => TouchDevice::open(path),
        None => find_touchscreen(&settings.device_name),
    }
}

/// Name to address the device by when applying a matrix through X
pub fn effective_device_name(settings: &Settings, device: Option<&TouchDevice>) -> String {
    preferred_device_name(&settings.device_name, device.map(|d| d.name())).to_string()
}

pub struct CalibrationApp {
    pub session: CalibrationSession,
    decoder: EventDecoder,
    device: Option<TouchDevice>,
    device_name: String,
    calibration_file: PathBuf,
    no_device_timeout: Duration,
    started: Instant,
}

impl CalibrationApp {
    pub fn new(settings: &Settings, device: Option<TouchDevice>) -> tc_core::Result<Self> {
        let screen = system::screen_size(settings)?;
        let layout = TargetLayout::for_screen(screen.width, screen.height, settings.crosshair_offset);
        let config = SessionConfig {
            layout,
            form: settings.output,
            range: settings.raw_range,
        };
        info!(
            "Calibrating {}x{} screen, offset {}, output {}",
            screen.width, screen.height, settings.crosshair_offset, settings.output
        );
        Ok(Self {
            session: CalibrationSession::new(config, device.is_some()),
            decoder: EventDecoder::new(),
            device_name: effective_device_name(settings, device.as_ref()),
            device,
            calibration_file: settings.calibration_path(),
            no_device_timeout: Duration::from_secs(settings.no_device_timeout_secs),
            started: Instant::now(),
        })
    }

    /// Decode everything readable from `reader` and feed it to the session
    pub fn drain<R: Read>(
        decoder: &mut EventDecoder,
        session: &mut CalibrationSession,
        reader: &mut R,
        sink: &mut dyn CalibrationSink,
    ) -> tc_core::Result<usize> {
        decoder.read_available(reader, |report| {
            for state in session.handle_report(report, sink) {
                info!("Entered {:?}", state);
            }
        })
    }

    /// Readiness callback for the touchscreen fd
    pub fn on_readable(&mut self) -> tc_core::Result<usize> {
        let Some(device) = self.device.as_ref() else {
            return Ok(0);
        };
        let mut sink = SystemSink::new(Some(device), self.device_name.clone(), self.calibration_file.clone());
        let mut reader = device;
        Self::drain(&mut self.decoder, &mut self.session, &mut reader, &mut sink)
    }

    /// Block up to `timeout_ms` for the device to become readable
    pub fn wait_readable(&self, timeout_ms: i32) -> io::Result<bool> {
        let Some(device) = self.device.as_ref() else {
            return Ok(false);
        };
        let mut fds = [libc::pollfd {
            fd: device.as_raw_fd(),
            events: libc::POLLIN,
            revents: 0,
        }];
        // SAFETY: fds is a valid array of one pollfd for the duration of the call.
        let rc = unsafe { libc::poll(fds.as_mut_ptr(), fds.len() as libc::nfds_t, timeout_ms) };
        if rc < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                return Ok(false);
            }
            return Err(err);
        }
        Ok(rc > 0 && fds[0].revents & (libc::POLLIN | libc::POLLERR | libc::POLLHUP) != 0)
    }

    pub fn has_device(&self) -> bool {
        self.device.is_some()
    }

    /// True when the process should end: dismissal tap or no-device timeout
    pub fn should_exit(&self) -> bool {
        if self.session.exit_requested() {
            return true;
        }
        self.session.state() == CalibrationState::AwaitingTouchscreen
            && self.started.elapsed() >= self.no_device_timeout
    }
}

fn run_loop(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut CalibrationApp) -> anyhow::Result<()> {
    loop {
        terminal.draw(|f| ui(f, &app.session))?;

        if app.should_exit() {
            return Ok(());
        }

        // The touchscreen fd paces the loop; without one, keyboard polling does
        let key_timeout = if app.has_device() {
            if app.wait_readable(POLL_TICK_MS)? {
                app.on_readable()?;
            }
            Duration::ZERO
        } else {
            Duration::from_millis(POLL_TICK_MS as u64)
        };

        if event::poll(key_timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && matches!(key.code, KeyCode::Esc | KeyCode::Char('q')) {
                    warn!("Calibration aborted from keyboard");
                    return Ok(());
                }
            }
        }
    }
}

/// Full-screen interactive calibration
pub fn run_calibration(settings: &Settings) -> anyhow::Result<()> {
    let device = match open_device(settings) {
        Ok(d) => Some(d),
        Err(e) => {
            error!("{}", e);
            None
        }
    };
    let mut app = CalibrationApp::new(settings, device)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.hide_cursor()?;

    let res = run_loop(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        error!("Calibration loop failed: {}", err);
    }
    info!("Calibration finished in state {:?}", app.session.state());
    res
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{bounds_settings, tap_stream};
    use mockall::mock;
    use std::io::Cursor;
    use tc_core::{CalibrationResult, OutputForm, Result as CoreResult};

    mock! {
        pub Sink {}
        impl CalibrationSink for Sink {
            fn persist(&mut self, result: &CalibrationResult) -> CoreResult<()>;
            fn apply(&mut self, result: &CalibrationResult) -> CoreResult<()>;
        }
    }

    #[test]
    fn test_effective_device_name_falls_back_to_settings() {
        let settings = bounds_settings();
        assert_eq!(effective_device_name(&settings, None), "Chumby 8 touchscreen");
    }

    #[test]
    fn test_oversized_offset_rejected() {
        let settings = Settings { crosshair_offset: 500, ..bounds_settings() };
        let err = CalibrationApp::new(&settings, None).err().unwrap();
        assert!(matches!(err, tc_core::TscalError::InvalidConfig { .. }));
    }

    #[test]
    fn test_no_device_times_out() {
        let settings = Settings { no_device_timeout_secs: 0, ..bounds_settings() };
        let app = CalibrationApp::new(&settings, None).unwrap();
        assert_eq!(app.session.state(), CalibrationState::AwaitingTouchscreen);
        assert!(!app.has_device());
        assert!(app.should_exit());
        assert!(!app.wait_readable(0).unwrap());
    }

    #[test]
    fn test_drain_runs_full_calibration() {
        let settings = bounds_settings();
        let mut app = CalibrationApp::new(&settings, None).unwrap();
        // Pretend the device was found
        app.session = CalibrationSession::new(app.session.config().clone(), true);

        let mut bytes = Vec::new();
        for (x, y) in [(300, 300), (3800, 300), (3800, 3800), (300, 3800)] {
            bytes.extend(tap_stream(x, y, 7));
        }
        bytes.extend(tap_stream(2000, 2000, 1));

        let mut sink = MockSink::new();
        sink.expect_persist()
            .withf(|r| r.form() == OutputForm::Bounds)
            .times(1)
            .returning(|_| Ok(()));
        sink.expect_apply().times(1).returning(|_| Ok(()));
        let mut reader = Cursor::new(bytes);
        CalibrationApp::drain(&mut app.decoder, &mut app.session, &mut reader, &mut sink).unwrap();

        assert_eq!(app.session.state(), CalibrationState::Complete);
        assert_eq!(app.session.message(), tc_core::constants::messages::SAVED_AND_APPLIED);
        assert!(!app.should_exit());

        let mut reader = Cursor::new(tap_stream(2000, 2000, 1));
        CalibrationApp::drain(&mut app.decoder, &mut app.session, &mut reader, &mut sink).unwrap();
        assert!(app.should_exit());
    }
}
