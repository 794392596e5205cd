//! Decoder for the Linux evdev record stream
//!
//! Turns `struct input_event` records into [`TouchReport`]s. Key and axis
//! records update a pending state; each `SYN_REPORT` publishes that state as
//! one report. Axes that were not reported since the last sync keep their
//! previous value.

use std::io::{ErrorKind, Read};
use tracing::trace;

use crate::constants::evdev::{ABS_X, ABS_Y, BTN_TOUCH, EV_ABS, EV_KEY, EV_SYN, SYN_REPORT};
use crate::data::{RawSample, TouchReport};
use crate::error::Result;

/// Size in bytes of one kernel input record
pub const RECORD_SIZE: usize = std::mem::size_of::<libc::input_event>();

/// Type/code/value triple of one input record, timestamp dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEvent {
    pub event_type: u16,
    pub code: u16,
    pub value: i32,
}

impl RawEvent {
    pub const fn new(event_type: u16, code: u16, value: i32) -> Self {
        Self { event_type, code, value }
    }

    pub const fn touch(pressed: bool) -> Self {
        Self::new(EV_KEY, BTN_TOUCH, pressed as i32)
    }

    pub const fn abs_x(value: i32) -> Self {
        Self::new(EV_ABS, ABS_X, value)
    }

    pub const fn abs_y(value: i32) -> Self {
        Self::new(EV_ABS, ABS_Y, value)
    }

    pub const fn sync() -> Self {
        Self::new(EV_SYN, SYN_REPORT, 0)
    }

    /// Parse one native-endian record; the payload is the trailing 8 bytes
    pub fn from_bytes(buf: &[u8]) -> Option<Self> {
        if buf.len() < RECORD_SIZE {
            return None;
        }
        let p = &buf[RECORD_SIZE - 8..RECORD_SIZE];
        Some(Self {
            event_type: u16::from_ne_bytes([p[0], p[1]]),
            code: u16::from_ne_bytes([p[2], p[3]]),
            value: i32::from_ne_bytes([p[4], p[5], p[6], p[7]]),
        })
    }

    /// Encode as a record with a zero timestamp
    pub fn to_bytes(&self) -> [u8; RECORD_SIZE] {
        let mut buf = [0u8; RECORD_SIZE];
        buf[RECORD_SIZE - 8..RECORD_SIZE - 6].copy_from_slice(&self.event_type.to_ne_bytes());
        buf[RECORD_SIZE - 6..RECORD_SIZE - 4].copy_from_slice(&self.code.to_ne_bytes());
        buf[RECORD_SIZE - 4..].copy_from_slice(&self.value.to_ne_bytes());
        buf
    }
}

/// Accumulates records between synchronization boundaries
#[derive(Debug, Default)]
pub struct EventDecoder {
    pending_position: RawSample,
    pending_pressed: bool,
}

impl EventDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one record, returning a report when it closes a sync frame
    pub fn feed(&mut self, event: RawEvent) -> Option<TouchReport> {
        match event.event_type {
            EV_KEY if event.code == BTN_TOUCH => {
                self.pending_pressed = event.value != 0;
                None
            }
            EV_ABS => {
                match event.code {
                    ABS_X => self.pending_position.x = event.value,
                    ABS_Y => self.pending_position.y = event.value,
                    _ => {}
                }
                None
            }
            EV_SYN if event.code == SYN_REPORT => {
                Some(TouchReport::new(self.pending_position, self.pending_pressed))
            }
            _ => None,
        }
    }

    /// Drain every complete record currently available from `reader`
    ///
    /// `on_report` is called for each report as soon as it is decoded. The
    /// drain stops on `WouldBlock`, end of file, or a short read; a partial
    /// record is dropped. Returns the number of reports emitted.
    pub fn read_available<R, F>(&mut self, reader: &mut R, mut on_report: F) -> Result<usize>
    where
        R: Read,
        F: FnMut(TouchReport),
    {
        let mut buf = [0u8; RECORD_SIZE];
        let mut emitted = 0;
        loop {
            match reader.read(&mut buf) {
                Ok(n) if n == RECORD_SIZE => {
                    if let Some(report) = RawEvent::from_bytes(&buf).and_then(|ev| self.feed(ev)) {
                        emitted += 1;
                        on_report(report);
                    }
                }
                Ok(0) => break,
                Ok(n) => {
                    trace!("Dropping partial input record ({} of {} bytes)", n, RECORD_SIZE);
                    break;
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(emitted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor};

    fn stream(events: &[RawEvent]) -> Vec<u8> {
        events.iter().flat_map(|e| e.to_bytes()).collect()
    }

    fn collect(decoder: &mut EventDecoder, bytes: Vec<u8>) -> Vec<TouchReport> {
        let mut reports = Vec::new();
        decoder
            .read_available(&mut Cursor::new(bytes), |r| reports.push(r))
            .unwrap();
        reports
    }

    #[test]
    fn test_sync_publishes_pending_state() {
        let mut decoder = EventDecoder::new();
        let reports = collect(
            &mut decoder,
            stream(&[
                RawEvent::touch(true),
                RawEvent::abs_x(310),
                RawEvent::abs_y(290),
                RawEvent::sync(),
            ]),
        );
        assert_eq!(reports, vec![TouchReport::new(RawSample::new(310, 290), true)]);
    }

    #[test]
    fn test_unreported_axis_keeps_last_value() {
        let mut decoder = EventDecoder::new();
        let reports = collect(
            &mut decoder,
            stream(&[
                RawEvent::touch(true),
                RawEvent::abs_x(100),
                RawEvent::abs_y(200),
                RawEvent::sync(),
                RawEvent::abs_x(105),
                RawEvent::sync(),
                RawEvent::touch(false),
                RawEvent::sync(),
            ]),
        );
        assert_eq!(reports.len(), 3);
        assert_eq!(reports[1].position, RawSample::new(105, 200));
        assert_eq!(reports[2], TouchReport::new(RawSample::new(105, 200), false));
    }

    #[test]
    fn test_nothing_emitted_without_sync() {
        let mut decoder = EventDecoder::new();
        let reports = collect(&mut decoder, stream(&[RawEvent::touch(true), RawEvent::abs_x(5)]));
        assert!(reports.is_empty());

        // State carries over into the next drain
        let reports = collect(&mut decoder, stream(&[RawEvent::sync()]));
        assert_eq!(reports, vec![TouchReport::new(RawSample::new(5, 0), true)]);
    }

    #[test]
    fn test_other_records_ignored() {
        let mut decoder = EventDecoder::new();
        assert_eq!(decoder.feed(RawEvent::new(EV_ABS, 0x18, 77)), None); // ABS_PRESSURE
        assert_eq!(decoder.feed(RawEvent::new(EV_KEY, 0x110, 1)), None); // BTN_LEFT
        assert_eq!(decoder.feed(RawEvent::new(EV_SYN, 3, 0)), None); // SYN_DROPPED
        assert_eq!(decoder.feed(RawEvent::new(0x04, 0x04, 9)), None); // EV_MSC
        assert_eq!(
            decoder.feed(RawEvent::sync()),
            Some(TouchReport::new(RawSample::default(), false))
        );
    }

    #[test]
    fn test_partial_record_is_dropped() {
        let mut decoder = EventDecoder::new();
        let mut bytes = stream(&[RawEvent::abs_x(42), RawEvent::sync()]);
        bytes.extend_from_slice(&RawEvent::sync().to_bytes()[..RECORD_SIZE / 2]);
        let reports = collect(&mut decoder, bytes);
        assert_eq!(reports.len(), 1);
    }

    #[test]
    fn test_record_layout_roundtrip() {
        let ev = RawEvent::new(EV_ABS, ABS_Y, -17);
        let bytes = ev.to_bytes();
        assert_eq!(bytes.len(), RECORD_SIZE);
        assert_eq!(RawEvent::from_bytes(&bytes), Some(ev));
        assert_eq!(RawEvent::from_bytes(&bytes[..RECORD_SIZE - 1]), None);
    }

    /// Reader that hands out queued chunks, then reports WouldBlock
    struct NonBlocking {
        chunks: Vec<io::Result<Vec<u8>>>,
    }

    impl Read for NonBlocking {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.chunks.is_empty() {
                return Err(io::Error::from(ErrorKind::WouldBlock));
            }
            let chunk = self.chunks.remove(0)?;
            buf[..chunk.len()].copy_from_slice(&chunk);
            Ok(chunk.len())
        }
    }

    #[test]
    fn test_would_block_ends_drain() {
        let mut decoder = EventDecoder::new();
        let mut reader = NonBlocking {
            chunks: vec![
                Ok(RawEvent::abs_x(1).to_bytes().to_vec()),
                Err(io::Error::from(ErrorKind::Interrupted)),
                Ok(RawEvent::sync().to_bytes().to_vec()),
            ],
        };
        let mut count = 0;
        let emitted = decoder.read_available(&mut reader, |_| count += 1).unwrap();
        assert_eq!(emitted, 1);
        assert_eq!(count, 1);
    }

    #[test]
    fn test_hard_read_error_is_returned() {
        let mut decoder = EventDecoder::new();
        let mut reader = NonBlocking {
            chunks: vec![Err(io::Error::from_raw_os_error(libc::ENODEV))],
        };
        assert!(decoder.read_available(&mut reader, |_| {}).is_err());
    }
}
