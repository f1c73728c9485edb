//! Fixed layout header placed in front of every log record payload.
//!
//! ```text
//!   +-------------------------------------------------------------+
//!   | severity: 1 byte | event code: 2 bytes | timestamp: 12 bytes |
//!   +-------------------------------------------------------------+
//!   | len tag: 1 byte  | payload len: 1, 2 or 8 bytes (per tag)    |
//!   +-------------------------------------------------------------+
//!   | payload: payload len bytes                                  |
//!   +-------------------------------------------------------------+
//! ```
//!
//! Everything up to and including the tag is the constant width prefix, so a
//! reader learns how many more header bytes it needs from the first
//! `PREFIX_LEN` bytes alone.

pub mod msg_len;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::{
    error::{Error, Result},
    priority::Severity,
    timestamp::Timestamp,
};

pub use msg_len::LengthTag;

pub type EventCode = u16;

pub const SEVERITY_OFFSET: usize = 0;
pub const EVENT_CODE_OFFSET: usize = SEVERITY_OFFSET + 1;
pub const TIMESTAMP_OFFSET: usize = EVENT_CODE_OFFSET + 2;
pub const TAG_OFFSET: usize = TIMESTAMP_OFFSET + Timestamp::PACKED_LEN;
pub const PREFIX_LEN: usize = TAG_OFFSET + 1;
pub const MAX_HEADER_LEN: usize = PREFIX_LEN + 8;

/// Header width is a function of the tag alone.
#[inline]
pub const fn header_width_for(tag: LengthTag) -> usize {
    PREFIX_LEN + tag as usize
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    severity: Severity,
    event_code: EventCode,
    timestamp: Timestamp,
    payload_len: u64,
    tag: LengthTag,
}

impl FrameHeader {
    pub fn new(
        severity: Severity,
        event_code: EventCode,
        timestamp: Timestamp,
        payload_len: u64,
    ) -> Self {
        Self {
            severity,
            event_code,
            timestamp,
            payload_len,
            tag: LengthTag::choose(payload_len),
        }
    }

    /// Header for a payload held in memory.
    pub fn for_payload(
        severity: Severity,
        event_code: EventCode,
        timestamp: Timestamp,
        payload: &[u8],
    ) -> Self {
        Self::new(severity, event_code, timestamp, payload.len() as u64)
    }

    #[inline]
    pub fn severity(&self) -> Severity {
        self.severity
    }

    #[inline]
    pub fn event_code(&self) -> EventCode {
        self.event_code
    }

    #[inline]
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    #[inline]
    pub fn payload_len(&self) -> u64 {
        self.payload_len
    }

    #[inline]
    pub fn tag(&self) -> LengthTag {
        self.tag
    }

    #[inline]
    pub fn width(&self) -> usize {
        header_width_for(self.tag)
    }

    /// Header width plus payload length, or `None` if that overflows.
    pub fn frame_len(&self) -> Option<u64> {
        (self.width() as u64).checked_add(self.payload_len)
    }

    pub fn encode_to(&self, buf: &mut impl BufMut) {
        buf.put_u8(self.severity.code());
        buf.put_u16_le(self.event_code);
        self.timestamp.pack_into(buf);
        buf.put_u8(self.tag as u8);
        msg_len::put_len(self.tag, self.payload_len, buf);
    }

    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.width());
        self.encode_to(&mut buf);
        buf.freeze()
    }
}

/// Reads the constant width prefix and returns the length tag it declares.
///
/// Used by streaming readers to learn the full header width early.
pub fn peek_tag(data: &[u8]) -> Result<LengthTag> {
    if data.len() < PREFIX_LEN {
        return Err(Error::truncated(PREFIX_LEN, data.len()));
    }
    LengthTag::try_from(data[TAG_OFFSET])
}

/// Parses the header at the start of `data`. Trailing bytes are ignored.
pub fn parse_header(data: &[u8]) -> Result<FrameHeader> {
    let tag = peek_tag(data)?;
    let width = header_width_for(tag);
    if data.len() < width {
        return Err(Error::truncated(width, data.len()));
    }

    let mut ptr = data;
    let severity = Severity::try_from(ptr.get_u8())?;
    let event_code = ptr.get_u16_le();
    let timestamp = Timestamp::unpack(&ptr[..Timestamp::PACKED_LEN])?;
    ptr.advance(Timestamp::PACKED_LEN + 1);
    let payload_len = msg_len::get_len(tag, ptr)?;

    Ok(FrameHeader {
        severity,
        event_code,
        timestamp,
        payload_len,
        tag,
    })
}
