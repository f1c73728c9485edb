/// Limits applied while reading frames from a stream.
#[derive(Debug, Clone)]
pub struct ReaderOptions {
    /// Frames declaring a larger payload are rejected before any payload
    /// byte is buffered.
    pub max_payload_len: u64,

    /// Size of a single read from the underlying stream.
    pub read_buf_size: usize,
}

pub const DEFAULT_MAX_PAYLOAD_LEN: u64 = 16 * 1024 * 1024;

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            max_payload_len: DEFAULT_MAX_PAYLOAD_LEN,
            read_buf_size: 8 * 1024,
        }
    }
}

impl ReaderOptions {
    pub fn max_payload_len(mut self, len: u64) -> Self {
        self.max_payload_len = len;
        self
    }

    pub fn read_buf_size(mut self, size: usize) -> Self {
        self.read_buf_size = size.max(1);
        self
    }
}
