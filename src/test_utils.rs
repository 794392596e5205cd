/*
 * Test utilities for tscal
 *
 * Builders for evdev record streams and settings that never touch the
 * real framebuffer or settings partition.
 */

use tc_core::{OutputForm, RawEvent};

use crate::config::{ScreenSize, Settings};

/// Settings for an 800x480 screen producing raw bounds
pub fn bounds_settings() -> Settings {
    Settings {
        output: OutputForm::Bounds,
        screen: Some(ScreenSize { width: 800, height: 480 }),
        ..Settings::default()
    }
}

/// Settings for an 800x480 screen producing a matrix
pub fn matrix_settings() -> Settings {
    Settings {
        output: OutputForm::Matrix,
        ..bounds_settings()
    }
}

/// Serialize events into a kernel record stream
pub fn record_stream(events: &[RawEvent]) -> Vec<u8> {
    events.iter().flat_map(|e| e.to_bytes()).collect()
}

/// Press at (x, y), hold for `reports` sync frames, then release
pub fn tap_stream(x: i32, y: i32, reports: usize) -> Vec<u8> {
    let mut events = vec![RawEvent::touch(true)];
    for _ in 0..reports.max(1) {
        events.extend([RawEvent::abs_x(x), RawEvent::abs_y(y), RawEvent::sync()]);
    }
    events.extend([RawEvent::touch(false), RawEvent::sync()]);
    record_stream(&events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tc_core::{EventDecoder, RECORD_SIZE};

    #[test]
    fn test_tap_stream_decodes_to_press_and_release() {
        let bytes = tap_stream(100, 200, 3);
        assert_eq!(bytes.len() % RECORD_SIZE, 0);

        let mut decoder = EventDecoder::new();
        let mut reports = Vec::new();
        let mut reader = std::io::Cursor::new(bytes);
        decoder.read_available(&mut reader, |r| reports.push(r)).unwrap();

        assert_eq!(reports.len(), 4);
        assert!(reports[..3].iter().all(|r| r.pressed));
        assert!(!reports[3].pressed);
        assert_eq!(reports[3].position.x, 100);
    }

    #[test]
    fn test_settings_helpers_are_valid() {
        assert!(bounds_settings().validate().is_ok());
        assert_eq!(matrix_settings().output, OutputForm::Matrix);
    }
}
