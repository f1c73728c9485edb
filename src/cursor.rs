use bytes::{Buf, BytesMut};

use crate::{
    error::{Error, Result},
    frame::Frame,
    header::{header_width_for, parse_header, peek_tag, FrameHeader, MAX_HEADER_LEN, PREFIX_LEN},
    options::ReaderOptions,
};

/// Where a [`FrameCursor`] is within the current frame.
///
/// ```text
///   Prefix --> LengthTail --> Payload --> Complete
/// ```
///
/// States are only ever entered in this order. `reset` starts a new frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    /// Reading the constant width bytes up to and including the length tag.
    Prefix,
    /// Reading the 1, 2 or 8 length bytes.
    LengthTail,
    Payload,
    Complete,
}

/// Incremental frame parser for bytes that arrive in pieces.
///
/// Shortage of input is never an error here, `feed` just returns `Ok(None)`
/// and waits for more. Malformed headers are hard errors.
#[derive(Debug)]
pub struct FrameCursor {
    state: CursorState,
    buf: BytesMut,
    header: Option<FrameHeader>,

    // Total buffered length at which the current state is left.
    target: usize,
    max_payload_len: u64,
}

impl Default for FrameCursor {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameCursor {
    pub fn new() -> Self {
        Self::with_options(&ReaderOptions::default())
    }

    pub fn with_options(options: &ReaderOptions) -> Self {
        Self {
            state: CursorState::Prefix,
            buf: BytesMut::with_capacity(MAX_HEADER_LEN),
            header: None,
            target: PREFIX_LEN,
            max_payload_len: options.max_payload_len,
        }
    }

    #[inline]
    pub fn state(&self) -> CursorState {
        self.state
    }

    /// Header of the frame in progress, known once the length tail is read.
    #[inline]
    pub fn header(&self) -> Option<&FrameHeader> {
        self.header.as_ref()
    }

    /// Bytes still required to leave the current state.
    #[inline]
    pub fn needed(&self) -> usize {
        self.target - self.buf.len()
    }

    /// Nothing of a new frame has been consumed yet.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.state == CursorState::Prefix && self.buf.is_empty()
    }

    pub fn reset(&mut self) {
        self.state = CursorState::Prefix;
        self.buf.clear();
        self.header = None;
        self.target = PREFIX_LEN;
    }

    /// Consumes bytes from `src` until the frame is complete or `src` runs dry.
    ///
    /// Bytes past the end of the frame stay in `src`. Once a frame has been
    /// returned the cursor sits in `Complete` and consumes nothing until
    /// `reset` is called.
    pub fn feed(&mut self, src: &mut impl Buf) -> Result<Option<Frame>> {
        loop {
            match self.state {
                CursorState::Complete => return Ok(None),
                CursorState::Prefix => {
                    if !self.fill(src) {
                        return Ok(None);
                    }
                    let tag = peek_tag(&self.buf)?;
                    self.target = header_width_for(tag);
                    self.state = CursorState::LengthTail;
                    tracing::trace!("prefix read, length tag: {:?}", tag);
                }
                CursorState::LengthTail => {
                    if !self.fill(src) {
                        return Ok(None);
                    }
                    let header = parse_header(&self.buf)?;
                    self.target = self.payload_target(&header)?;
                    self.header = Some(header);
                    self.state = CursorState::Payload;
                    tracing::trace!(
                        "header read, event code: {:#06x}, payload len: {}",
                        header.event_code(),
                        header.payload_len()
                    );
                }
                CursorState::Payload => {
                    if !self.fill(src) {
                        return Ok(None);
                    }
                    let header = self.header.take().ok_or_else(|| {
                        Error::MalformedHeader("cursor lost the frame header".into())
                    })?;
                    self.state = CursorState::Complete;
                    self.target = 0;

                    let data = self.buf.split().freeze();
                    return Ok(Some(Frame::from_parts(header, data)));
                }
            }
        }
    }

    /// Error describing the partial frame, if any, left when input ends.
    pub fn finish(&self) -> Result<()> {
        if self.is_idle() || self.state == CursorState::Complete {
            return Ok(());
        }
        Err(Error::truncated(self.target, self.buf.len()))
    }

    fn payload_target(&self, header: &FrameHeader) -> Result<usize> {
        let len = header.payload_len();
        if len > self.max_payload_len {
            return Err(Error::PayloadTooLarge {
                len,
                max: self.max_payload_len,
            });
        }
        header
            .frame_len()
            .and_then(|n| usize::try_from(n).ok())
            .ok_or(Error::PayloadTooLarge {
                len,
                max: self.max_payload_len,
            })
    }

    /// Returns `true` once `target` bytes are buffered.
    ///
    /// The buffer only grows by what `src` actually supplies, never by the
    /// declared payload length.
    fn fill(&mut self, src: &mut impl Buf) -> bool {
        while self.buf.len() < self.target && src.has_remaining() {
            let chunk = src.chunk();
            let n = chunk.len().min(self.target - self.buf.len());
            self.buf.extend_from_slice(&chunk[..n]);
            src.advance(n);
        }
        self.buf.len() == self.target
    }
}

#[cfg(test)]
mod tests {
    use bytes::{Buf, Bytes};

    use super::{CursorState, FrameCursor};
    use crate::{
        error::Error,
        frame::Frame,
        header::{PREFIX_LEN, TAG_OFFSET},
        options::ReaderOptions,
        priority::Severity,
        timestamp::Timestamp,
    };

    fn frame(payload: &[u8]) -> Frame {
        Frame::assemble(
            Severity::Info,
            0x0042,
            Timestamp::new(1_700_000_000, 500).unwrap(),
            payload,
        )
    }

    #[test]
    fn whole_frame_at_once() -> anyhow::Result<()> {
        let expected = frame(b"gsName\x01");
        let mut src = expected.clone().into_bytes();

        let mut cursor = FrameCursor::new();
        let got = cursor.feed(&mut src)?.expect("frame complete");
        assert_eq!(got, expected);
        assert_eq!(cursor.state(), CursorState::Complete);
        assert!(!src.has_remaining());
        Ok(())
    }

    #[test]
    fn byte_by_byte_walks_states_forward() -> anyhow::Result<()> {
        let expected = frame(&[7_u8; 300]);
        let bytes = expected.as_bytes().to_vec();

        let mut cursor = FrameCursor::new();
        let mut seen = vec![cursor.state()];
        let mut result = None;
        for (i, b) in bytes.iter().enumerate() {
            let single = [*b];
            let mut one = &single[..];
            let r = cursor.feed(&mut one)?;
            if *seen.last().unwrap() != cursor.state() {
                seen.push(cursor.state());
            }
            if i + 1 < bytes.len() {
                assert!(r.is_none(), "early frame at byte {i}");
            } else {
                result = r;
            }
        }

        assert_eq!(result, Some(expected));
        assert_eq!(
            seen,
            vec![
                CursorState::Prefix,
                CursorState::LengthTail,
                CursorState::Payload,
                CursorState::Complete
            ]
        );
        Ok(())
    }

    #[test]
    fn needed_tracks_each_state() -> anyhow::Result<()> {
        let bytes = frame(&[1_u8; 10]).into_bytes();
        let mut cursor = FrameCursor::new();
        assert_eq!(cursor.needed(), PREFIX_LEN);

        cursor.feed(&mut bytes.slice(..PREFIX_LEN))?;
        assert_eq!(cursor.state(), CursorState::LengthTail);
        assert_eq!(cursor.needed(), 1);

        cursor.feed(&mut bytes.slice(PREFIX_LEN..PREFIX_LEN + 1))?;
        assert_eq!(cursor.state(), CursorState::Payload);
        assert_eq!(cursor.needed(), 10);
        assert_eq!(cursor.header().map(|h| h.payload_len()), Some(10));
        Ok(())
    }

    #[test]
    fn leaves_following_bytes() -> anyhow::Result<()> {
        let first = frame(b"one");
        let second = frame(b"second");
        let mut src = Bytes::from([first.as_bytes(), second.as_bytes()].concat());

        let mut cursor = FrameCursor::new();
        assert_eq!(cursor.feed(&mut src)?, Some(first));
        assert_eq!(cursor.feed(&mut src)?, None);
        assert_eq!(src.remaining(), second.len());

        cursor.reset();
        assert_eq!(cursor.feed(&mut src)?, Some(second));
        Ok(())
    }

    #[test]
    fn malformed_tag_is_hard_error() {
        let mut bytes = frame(b"abc").as_bytes().to_vec();
        bytes[TAG_OFFSET] = 3;
        let mut cursor = FrameCursor::new();
        assert!(matches!(
            cursor.feed(&mut &bytes[..]),
            Err(Error::MalformedHeader(_))
        ));
    }

    #[test]
    fn payload_limit() {
        let bytes = frame(&[0_u8; 2048]).into_bytes();
        let mut cursor = FrameCursor::with_options(&ReaderOptions::default().max_payload_len(1024));
        assert!(matches!(
            cursor.feed(&mut bytes.clone()),
            Err(Error::PayloadTooLarge {
                len: 2048,
                max: 1024
            })
        ));
    }

    #[test]
    fn huge_declared_length_waits_for_bytes() -> anyhow::Result<()> {
        let mut bytes = frame(&[9_u8; 70_000]).as_bytes()[..PREFIX_LEN + 8 + 16].to_vec();
        bytes[PREFIX_LEN..PREFIX_LEN + 8].copy_from_slice(&(u64::MAX / 2).to_le_bytes());

        let mut cursor =
            FrameCursor::with_options(&ReaderOptions::default().max_payload_len(u64::MAX));
        assert_eq!(cursor.feed(&mut &bytes[..])?, None);
        assert_eq!(cursor.state(), CursorState::Payload);
        assert_eq!(cursor.header().map(|h| h.payload_len()), Some(u64::MAX / 2));
        assert_eq!(cursor.needed() as u64, u64::MAX / 2 - 16);
        assert!(cursor.finish().unwrap_err().is_truncated());
        Ok(())
    }

    #[test]
    fn length_beyond_address_space_is_error() {
        let mut bytes = frame(&[9_u8; 70_000]).as_bytes()[..PREFIX_LEN + 8].to_vec();
        bytes[PREFIX_LEN..PREFIX_LEN + 8].copy_from_slice(&u64::MAX.to_le_bytes());

        let mut cursor =
            FrameCursor::with_options(&ReaderOptions::default().max_payload_len(u64::MAX));
        assert!(matches!(
            cursor.feed(&mut &bytes[..]),
            Err(Error::PayloadTooLarge { .. })
        ));
    }

    #[test]
    fn finish_reports_partial_frame() -> anyhow::Result<()> {
        let bytes = frame(b"abcdef").into_bytes();
        let mut cursor = FrameCursor::new();
        assert!(cursor.finish().is_ok());

        cursor.feed(&mut bytes.slice(..20))?;
        match cursor.finish() {
            Err(Error::TruncatedFrame { needed, available }) => {
                assert_eq!(needed, bytes.len());
                assert_eq!(available, 20);
            }
            other => panic!("unexpected {other:?}"),
        }
        Ok(())
    }
}
