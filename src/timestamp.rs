use std::{
    fmt::Display,
    time::{SystemTime, UNIX_EPOCH},
};

use bytes::{Buf, BufMut};
use chrono::{DateTime, Utc};

use crate::error::{Error, Result};

pub const NANOS_PER_SEC: u32 = 1_000_000_000;

/// Wall-clock time of a log record.
///
/// Packed format, little endian:
///
/// ```text
///   +-----------------------------------------------+
///   | seconds: i64, 8 bytes | nanoseconds: u32, 4 b |
///   +-----------------------------------------------+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp {
    seconds: i64,
    nanoseconds: u32,
}

impl Timestamp {
    pub const PACKED_LEN: usize = 8 + 4;

    pub fn new(seconds: i64, nanoseconds: u32) -> Result<Self> {
        if nanoseconds >= NANOS_PER_SEC {
            return Err(Error::InvalidTimestamp(nanoseconds));
        }
        Ok(Self {
            seconds,
            nanoseconds,
        })
    }

    /// Current wall time. Not monotonic.
    pub fn now() -> Self {
        Utc::now().into()
    }

    #[inline]
    pub fn seconds(&self) -> i64 {
        self.seconds
    }

    #[inline]
    pub fn nanoseconds(&self) -> u32 {
        self.nanoseconds
    }

    pub fn pack_into(&self, buf: &mut impl BufMut) {
        buf.put_i64_le(self.seconds);
        buf.put_u32_le(self.nanoseconds);
    }

    pub fn pack(&self) -> [u8; Self::PACKED_LEN] {
        let mut out = [0_u8; Self::PACKED_LEN];
        self.pack_into(&mut &mut out[..]);
        out
    }

    pub fn unpack(data: &[u8]) -> Result<Self> {
        if data.len() < Self::PACKED_LEN {
            return Err(Error::truncated(Self::PACKED_LEN, data.len()));
        }
        let mut ptr = data;
        let seconds = ptr.get_i64_le();
        let nanoseconds = ptr.get_u32_le();
        Self::new(seconds, nanoseconds)
    }

    /// `YYYY-MM-DDTHH:MM:SS.nnnnnnnnn`, UTC.
    ///
    /// Falls back to the raw `seconds.nanos` pair outside chrono's range.
    pub fn to_iso8601(&self) -> String {
        match DateTime::<Utc>::try_from(*self) {
            Ok(dt) => dt.format("%Y-%m-%dT%H:%M:%S%.9f").to_string(),
            Err(_) => format!("{}.{:09}", self.seconds, self.nanoseconds),
        }
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        // chrono reports leap seconds as nanos >= 1e9; fold them back.
        Self {
            seconds: dt.timestamp(),
            nanoseconds: dt.timestamp_subsec_nanos() % NANOS_PER_SEC,
        }
    }
}

/// Fails only when the seconds do not fit an `i64`.
impl TryFrom<SystemTime> for Timestamp {
    type Error = Error;

    fn try_from(t: SystemTime) -> Result<Self> {
        let out_of_range = || Error::TimestampOutOfRange(format!("{:?}", t));
        match t.duration_since(UNIX_EPOCH) {
            Ok(d) => {
                let seconds = i64::try_from(d.as_secs()).map_err(|_| out_of_range())?;
                Self::new(seconds, d.subsec_nanos())
            }
            Err(e) => {
                // Before the epoch: borrow one second when there are nanos.
                let d = e.duration();
                let seconds = i64::try_from(d.as_secs()).map_err(|_| out_of_range())?;
                match d.subsec_nanos() {
                    0 => Self::new(-seconds, 0),
                    nanos => {
                        let seconds = (-seconds).checked_sub(1).ok_or_else(out_of_range)?;
                        Self::new(seconds, NANOS_PER_SEC - nanos)
                    }
                }
            }
        }
    }
}

impl TryFrom<Timestamp> for DateTime<Utc> {
    type Error = Error;

    fn try_from(ts: Timestamp) -> Result<Self> {
        DateTime::from_timestamp(ts.seconds, ts.nanoseconds)
            .ok_or(Error::InvalidTimestamp(ts.nanoseconds))
    }
}
