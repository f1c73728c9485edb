use std::fmt::{Debug, Display};

use bytes::{Buf, BufMut, Bytes};

use crate::error::{Error, Result};

pub(crate) const MAX_VAR_UINT_SIZE: usize = 10;

/// LEB128 unsigned integer, 7 bits per byte, low bits first.
#[derive(Clone, PartialEq, Eq)]
pub(crate) struct VarUInt {
    bytes: Bytes,
}

impl VarUInt {
    pub(crate) fn len(&self) -> usize {
        self.bytes.len()
    }

    pub(crate) fn try_to_u64(&self) -> Result<u64> {
        let mut result: u64 = 0;
        let mut shift = 0_u32;
        for byte in &self.bytes {
            let part = ((byte & 0b0111_1111) as u64)
                .checked_shl(shift)
                .filter(|v| v >> shift == (byte & 0b0111_1111) as u64)
                .ok_or_else(|| corrupted("varint too long for u64"))?;
            result = result
                .checked_add(part)
                .ok_or_else(|| corrupted("varint too long for u64"))?;
            shift += 7;
        }
        Ok(result)
    }
}

impl TryFrom<&[u8]> for VarUInt {
    type Error = Error;

    /// Takes the leading varint of `value`; trailing bytes are ignored.
    fn try_from(value: &[u8]) -> Result<Self> {
        let last = value
            .iter()
            .take(MAX_VAR_UINT_SIZE)
            .position(|b| (b & 0b1000_0000) == 0)
            .ok_or_else(|| corrupted("unterminated varint"))?;

        Ok(VarUInt {
            bytes: Bytes::copy_from_slice(&value[..=last]),
        })
    }
}

impl Display for VarUInt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.try_to_u64() {
            Ok(v) => write!(f, "{}", v),
            Err(_) => write!(f, "<invalid varint>"),
        }
    }
}

impl Debug for VarUInt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VarUInt")
            .field("bytes", &self.bytes)
            .field("value", &self.try_to_u64().ok())
            .finish()
    }
}

pub(crate) fn put_varint(mut value: u64, buf: &mut impl BufMut) {
    while value >= 0b1000_0000 {
        buf.put_u8((value as u8 & 0b0111_1111) | 0b1000_0000);
        value >>= 7;
    }
    buf.put_u8(value as u8);
}

/// Reads a varint from the front of `buf` and advances past it.
pub(crate) fn get_varint(buf: &mut &[u8]) -> Result<u64> {
    let v = VarUInt::try_from(*buf)?;
    let value = v.try_to_u64()?;
    buf.advance(v.len());
    Ok(value)
}

fn corrupted(msg: &str) -> Error {
    Error::PayloadCorrupted(msg.to_string())
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::{get_varint, put_varint, VarUInt};

    #[test]
    fn encode_and_read_u64() {
        let cases = [
            (0b0_1111111_u64, Bytes::copy_from_slice(&[0b0111_1111_u8])),
            (0b1_1111111_u64, Bytes::copy_from_slice(&[0xFF, 0x01])),
            (
                0b0010100_0101010_u64,
                Bytes::copy_from_slice(&[0b10101010, 0b00010100]),
            ),
            (
                0b11111111_11111111_11111111_11111111_u64,
                Bytes::copy_from_slice(&[0xFF, 0xFF, 0xFF, 0xFF, 0x0F]),
            ),
            (
                u64::MAX,
                Bytes::copy_from_slice(&[
                    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01,
                ]),
            ),
        ];

        for (value, expected) in cases {
            let mut buf = Vec::new();
            put_varint(value, &mut buf);
            assert_eq!(buf, expected);

            let varint = VarUInt::try_from(&buf[..]).unwrap();
            assert_eq!(varint.len(), expected.len());
            assert_eq!(varint.try_to_u64().unwrap(), value);
        }
    }

    #[test]
    fn get_advances_past_varint() {
        let data = [0xAC, 0x02, 0x07, 0xFF];
        let mut ptr = &data[..];
        assert_eq!(get_varint(&mut ptr).unwrap(), 300);
        assert_eq!(get_varint(&mut ptr).unwrap(), 7);
        assert_eq!(ptr, &[0xFF]);
    }

    #[test]
    fn unterminated_or_overlong() {
        assert!(VarUInt::try_from(&[0x80, 0x80][..]).is_err());
        assert!(VarUInt::try_from(&[0xFF; 11][..]).is_err());

        let overflow = [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x7F];
        let varint = VarUInt::try_from(&overflow[..]).unwrap();
        assert!(varint.try_to_u64().is_err());
        assert_eq!(varint.to_string(), "<invalid varint>");
    }
}
