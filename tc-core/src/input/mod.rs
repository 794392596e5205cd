//! Raw input stream handling

mod decoder;

pub use decoder::{EventDecoder, RawEvent, RECORD_SIZE};
