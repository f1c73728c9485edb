use bytes::{Buf, BufMut};

use crate::error::{Error, Result};

pub const MAX_SMALL_LEN: u64 = u8::MAX as u64;
pub const MAX_MEDIUM_LEN: u64 = u16::MAX as u64;

/// Width of the payload length field.
///
/// The tag byte is written before the length itself, and its value is the
/// number of length bytes that follow. The narrowest width that can hold the
/// length is always chosen, boundaries included.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LengthTag {
    Small = 1,
    Medium = 2,
    Large = 8,
}

impl LengthTag {
    pub fn choose(len: u64) -> Self {
        if len <= MAX_SMALL_LEN {
            LengthTag::Small
        } else if len <= MAX_MEDIUM_LEN {
            LengthTag::Medium
        } else {
            LengthTag::Large
        }
    }

    #[inline]
    pub fn width(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn max_len(self) -> u64 {
        match self {
            LengthTag::Small => MAX_SMALL_LEN,
            LengthTag::Medium => MAX_MEDIUM_LEN,
            LengthTag::Large => u64::MAX,
        }
    }
}

impl TryFrom<u8> for LengthTag {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(LengthTag::Small),
            2 => Ok(LengthTag::Medium),
            8 => Ok(LengthTag::Large),
            _ => Err(Error::MalformedHeader(format!(
                "invalid length tag: {}",
                value
            ))),
        }
    }
}

/// Writes `len` using exactly `tag.width()` bytes.
///
/// The caller guarantees `len <= tag.max_len()`.
pub(crate) fn put_len(tag: LengthTag, len: u64, buf: &mut impl BufMut) {
    debug_assert!(len <= tag.max_len(), "length {len} does not fit {tag:?}");
    match tag {
        LengthTag::Small => buf.put_u8(len as u8),
        LengthTag::Medium => buf.put_u16_le(len as u16),
        LengthTag::Large => buf.put_u64_le(len),
    }
}

pub(crate) fn get_len(tag: LengthTag, mut data: &[u8]) -> Result<u64> {
    if data.len() < tag.width() {
        return Err(Error::truncated(tag.width(), data.len()));
    }
    let len = match tag {
        LengthTag::Small => data.get_u8() as u64,
        LengthTag::Medium => data.get_u16_le() as u64,
        LengthTag::Large => data.get_u64_le(),
    };
    Ok(len)
}
