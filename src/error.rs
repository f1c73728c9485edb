#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),

    #[error("Invalid severity code: {0}")]
    InvalidSeverity(u8),

    #[error("Unknown severity name: {0:?}")]
    UnknownSeverityName(String),

    #[error("Invalid timestamp: nanoseconds {0} out of range")]
    InvalidTimestamp(u32),

    #[error("Timestamp out of range: {0}")]
    TimestampOutOfRange(String),

    #[error("Malformed header: {0}")]
    MalformedHeader(String),

    #[error("Truncated frame: need {needed} bytes, {available} available")]
    TruncatedFrame { needed: usize, available: usize },

    #[error("Length mismatch: expected {expected}, actual {actual}")]
    LengthMismatch { expected: u64, actual: u64 },

    #[error("Payload too large: {len} bytes, limit {max}")]
    PayloadTooLarge { len: u64, max: u64 },

    #[error("Unknown event code: {0:#06x}")]
    UnknownEventCode(u16),

    #[error("Duplicate event code: {0:#06x}")]
    DuplicateEventCode(u16),

    #[error("Payload corrupted: {0}")]
    PayloadCorrupted(String),
}

impl Error {
    /// `true` when more input may turn this failure into a success.
    pub fn is_truncated(&self) -> bool {
        matches!(self, Error::TruncatedFrame { .. })
    }

    pub(crate) fn truncated(needed: usize, available: usize) -> Self {
        Error::TruncatedFrame { needed, available }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
