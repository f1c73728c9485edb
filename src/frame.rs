use bytes::{Bytes, BytesMut};

use crate::{
    error::{Error, Result},
    header::{parse_header, EventCode, FrameHeader},
    priority::Severity,
    timestamp::Timestamp,
};

/// One complete log record: header bytes immediately followed by the payload.
///
/// The header is parsed out of `data` and never stored separately, so the
/// recorded payload length always agrees with the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    header: FrameHeader,
    data: Bytes,
}

impl Frame {
    pub fn assemble(
        severity: Severity,
        event_code: EventCode,
        timestamp: Timestamp,
        payload: &[u8],
    ) -> Self {
        let header = FrameHeader::for_payload(severity, event_code, timestamp, payload);
        let mut buf = BytesMut::with_capacity(header.width() + payload.len());
        header.encode_to(&mut buf);
        buf.extend_from_slice(payload);

        Self {
            header,
            data: buf.freeze(),
        }
    }

    /// Takes ownership of a buffer that must hold exactly one frame.
    pub fn from_bytes(data: Bytes) -> Result<Self> {
        let header = parse_header(&data)?;
        check_frame_len(&header, data.len())?;
        Ok(Self { header, data })
    }

    /// `data` must already be checked against `header`.
    pub(crate) fn from_parts(header: FrameHeader, data: Bytes) -> Self {
        debug_assert_eq!(header.frame_len(), Some(data.len() as u64));
        Self { header, data }
    }

    #[inline]
    pub fn header(&self) -> &FrameHeader {
        &self.header
    }

    /// Zero-copy view of the payload.
    pub fn payload(&self) -> Bytes {
        self.data.slice(self.header.width()..)
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Bytes {
        self.data
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Builds the frame buffer for `payload`.
pub fn assemble(
    severity: Severity,
    event_code: EventCode,
    timestamp: Timestamp,
    payload: &[u8],
) -> Bytes {
    Frame::assemble(severity, event_code, timestamp, payload).into_bytes()
}

/// Checks that `buffer` is one structurally valid frame and hands its payload
/// to `payload_verifier`.
///
/// Framing problems are errors; `Ok(false)` only ever comes from the payload
/// verifier.
pub fn verify(
    buffer: &[u8],
    declared_len: Option<u64>,
    payload_verifier: impl FnOnce(&[u8]) -> bool,
) -> Result<bool> {
    let header = parse_header(buffer)?;

    if let Some(declared) = declared_len {
        if declared != header.payload_len() {
            return Err(Error::LengthMismatch {
                expected: declared,
                actual: header.payload_len(),
            });
        }
    }

    check_frame_len(&header, buffer.len())?;

    let width = header.width();
    Ok(payload_verifier(&buffer[width..]))
}

/// Short buffers are truncated, long buffers are corrupt.
fn check_frame_len(header: &FrameHeader, actual: usize) -> Result<()> {
    let available = (actual - header.width()) as u64;
    let expected = header.payload_len();

    if available < expected {
        let needed = header
            .frame_len()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(usize::MAX);
        return Err(Error::truncated(needed, actual));
    }
    if available > expected {
        return Err(Error::LengthMismatch {
            expected: header.width() as u64 + expected,
            actual: actual as u64,
        });
    }
    Ok(())
}
