/*
 * Integration tests for tscal
 *
 * These drive the decoder, the calibration session and persistence together
 * the way the front-end does, plus the settings and discovery plumbing.
 */

use std::io::Cursor;
use std::path::PathBuf;

use serial_test::serial;
use tc_core::hw::find_touchscreen_in;
use tc_core::{
    load_calibration, save_calibration, CalibrationResult, CalibrationSession, CalibrationSink,
    CalibrationState, EventDecoder, OutputForm, RawBounds, RawEvent, SessionConfig, TargetLayout,
    TscalError,
};
use tempfile::TempDir;
use tscal::app::CalibrationApp;
use tscal::config::{load_settings, load_settings_from, ScreenSize, Settings};

// Test utilities
fn tap(x: i32, y: i32, reports: usize) -> Vec<u8> {
    let mut events = vec![RawEvent::touch(true)];
    for _ in 0..reports {
        events.extend([RawEvent::abs_x(x), RawEvent::abs_y(y), RawEvent::sync()]);
    }
    events.extend([RawEvent::touch(false), RawEvent::sync()]);
    events.iter().flat_map(|e| e.to_bytes()).collect()
}

fn corner_taps() -> Vec<u8> {
    [(300, 300), (3800, 300), (3800, 3800), (300, 3800)]
        .into_iter()
        .flat_map(|(x, y)| tap(x, y, 8))
        .collect()
}

/// Saves to a file like the real sink but records applies instead of touching the system
struct FileSink {
    path: PathBuf,
    applied: Vec<CalibrationResult>,
}

impl CalibrationSink for FileSink {
    fn persist(&mut self, result: &CalibrationResult) -> tc_core::Result<()> {
        save_calibration(&self.path, result)
    }

    fn apply(&mut self, result: &CalibrationResult) -> tc_core::Result<()> {
        self.applied.push(*result);
        Ok(())
    }
}

fn run_session(form: OutputForm, stream: Vec<u8>, sink: &mut FileSink) -> CalibrationSession {
    let config = SessionConfig::new(TargetLayout::for_screen(800, 480, 20), form);
    let mut session = CalibrationSession::new(config, true);
    let mut decoder = EventDecoder::new();
    let mut reader = Cursor::new(stream);
    CalibrationApp::drain(&mut decoder, &mut session, &mut reader, sink).unwrap();
    session
}

#[test]
fn test_bounds_calibration_end_to_end() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings").join("touchscreen.cal");
    let mut sink = FileSink { path: path.clone(), applied: Vec::new() };

    let mut stream = corner_taps();
    stream.extend(tap(2000, 2000, 1));
    let session = run_session(OutputForm::Bounds, stream, &mut sink);

    assert_eq!(session.state(), CalibrationState::Complete);
    let expected = CalibrationResult::Bounds(RawBounds { min_x: 208, max_x: 3892, min_y: 141, max_y: 3959 });
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "208 3892 141 3959\n");
    assert_eq!(load_calibration(&path, OutputForm::Bounds).unwrap(), expected);
    assert_eq!(sink.applied, vec![expected]);
}

#[test]
fn test_matrix_calibration_end_to_end() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("touchscreen.conf");
    let mut sink = FileSink { path: path.clone(), applied: Vec::new() };

    let mut stream = corner_taps();
    stream.extend(tap(2000, 2000, 1));
    let session = run_session(OutputForm::Matrix, stream, &mut sink);
    assert_eq!(session.state(), CalibrationState::Complete);

    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.contains("Section \"InputClass\""));
    assert!(contents.contains("CalibrationMatrix"));

    let CalibrationResult::Matrix(matrix) = load_calibration(&path, OutputForm::Matrix).unwrap() else {
        panic!("expected a matrix");
    };
    // Top-left crosshair lands on its pixel position
    let (sx, sy) = matrix.transform(300.0 / 4095.0, 300.0 / 4095.0);
    assert!((sx * 800.0 - 20.0).abs() < 1.0);
    assert!((sy * 480.0 - 20.0).abs() < 1.0);
}

#[test]
fn test_inverted_taps_are_rejected_and_nothing_saved() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("touchscreen.cal");
    let mut sink = FileSink { path: path.clone(), applied: Vec::new() };

    let stream: Vec<u8> = [(3800, 300), (300, 300), (300, 3800), (3800, 3800)]
        .into_iter()
        .flat_map(|(x, y)| tap(x, y, 5))
        .chain(tap(2000, 2000, 1))
        .collect();
    let session = run_session(OutputForm::Bounds, stream, &mut sink);

    assert_eq!(session.state(), CalibrationState::Error);
    assert!(session.exit_requested());
    assert!(!path.exists());
    assert!(sink.applied.is_empty());
}

#[test]
fn test_stream_split_across_reads() {
    let dir = TempDir::new().unwrap();
    let mut sink = FileSink { path: dir.path().join("t.cal"), applied: Vec::new() };
    let config = SessionConfig::new(TargetLayout::for_screen(800, 480, 20), OutputForm::Bounds);
    let mut session = CalibrationSession::new(config, true);
    let mut decoder = EventDecoder::new();

    // Pending axis state survives between drains
    let bytes = corner_taps();
    let half = bytes.len() / 2 / tc_core::RECORD_SIZE * tc_core::RECORD_SIZE;
    for chunk in [&bytes[..half], &bytes[half..]] {
        let mut reader = Cursor::new(chunk.to_vec());
        CalibrationApp::drain(&mut decoder, &mut session, &mut reader, &mut sink).unwrap();
    }
    assert_eq!(session.state(), CalibrationState::Complete);
}

#[test]
fn test_no_device_session_exits_after_timeout() {
    let settings = Settings {
        screen: Some(ScreenSize { width: 800, height: 480 }),
        no_device_timeout_secs: 0,
        ..Settings::default()
    };
    let app = CalibrationApp::new(&settings, None).unwrap();
    assert_eq!(app.session.state(), CalibrationState::AwaitingTouchscreen);
    assert_eq!(app.session.current_target(), None);
    assert!(app.should_exit());
}

#[test]
fn test_discovery_in_empty_directory() {
    let dir = TempDir::new().unwrap();
    let err = find_touchscreen_in(dir.path(), "Chumby 8 touchscreen").unwrap_err();
    assert!(matches!(err, TscalError::DeviceNotFound(_)));
}

#[test]
fn test_settings_file_rejects_unknown_fields() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{ "device_name": "x", "colour": "red" }"#).unwrap();
    assert!(load_settings_from(&path).is_err());
}

#[test]
#[serial]
fn test_settings_from_xdg_config_home() {
    let dir = TempDir::new().unwrap();
    let cfg_dir = dir.path().join("tscal");
    std::fs::create_dir_all(&cfg_dir).unwrap();
    std::fs::write(
        cfg_dir.join("config.json"),
        r#"{ "output": "bounds", "screen": { "width": 1024, "height": 600 } }"#,
    )
    .unwrap();

    let old = std::env::var("XDG_CONFIG_HOME").ok();
    std::env::set_var("XDG_CONFIG_HOME", dir.path());
    let settings = load_settings(None);
    match old {
        Some(v) => std::env::set_var("XDG_CONFIG_HOME", v),
        None => std::env::remove_var("XDG_CONFIG_HOME"),
    }

    let settings = settings.unwrap();
    assert_eq!(settings.output, OutputForm::Bounds);
    assert_eq!(settings.screen, Some(ScreenSize { width: 1024, height: 600 }));
    assert_eq!(settings.calibration_path(), PathBuf::from("/mnt/settings/touchscreen.cal"));
    assert_eq!(settings.crosshair_offset, 20);
}
