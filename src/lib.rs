//! Self-describing binary framing for structured log records.
//!
//! Every record is a small fixed header (severity, event code, timestamp and
//! a variable width payload length) followed by a payload produced by a
//! [`PayloadProvider`]. The header can be read and skipped without decoding
//! the payload.

pub mod cursor;
pub mod error;
pub mod frame;
pub mod header;
pub mod options;
pub mod priority;
pub mod provider;
pub mod reader;
pub mod std_format;
pub mod timestamp;
pub mod types;
mod utils;

pub use cursor::{CursorState, FrameCursor};
pub use error::{Error, Result};
pub use frame::{assemble, verify, Frame};
pub use header::{header_width_for, parse_header, EventCode, FrameHeader, LengthTag};
pub use options::ReaderOptions;
pub use priority::Severity;
pub use provider::{PayloadCodec, PayloadProvider, ProviderRegistry};
pub use reader::{write_frame, FrameReader};
pub use timestamp::Timestamp;

#[cfg(test)]
#[ctor::ctor]
fn init() {
    color_backtrace::install();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(true)
        .with_file(true)
        .with_level(true)
        .without_time()
        .with_thread_ids(true)
        .with_test_writer()
        .try_init();
}
