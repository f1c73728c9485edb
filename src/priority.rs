use std::{fmt::Display, str::FromStr};

use crate::error::{Error, Result};

/// Severity of a log record, stored as a single byte in the frame header.
///
/// Lower codes are more urgent, so the derived `Ord` sorts the most severe
/// records first. `Default` is what a record gets when the caller does not
/// choose a level.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Severity {
    /// The system is unusable.
    Emergency = 0,
    Alert = 1,
    Critical = 2,
    Error = 3,
    Warning = 4,
    Notice = 5,
    Info = 6,
    Debug = 7,
    /// Second, more verbose, debug level.
    Debug2 = 8,
    #[default]
    Default = 126,
}

impl Severity {
    pub const ALL: [Severity; 10] = [
        Severity::Emergency,
        Severity::Alert,
        Severity::Critical,
        Severity::Error,
        Severity::Warning,
        Severity::Notice,
        Severity::Info,
        Severity::Debug,
        Severity::Debug2,
        Severity::Default,
    ];

    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Severity::Emergency => "EMERGENCY",
            Severity::Alert => "ALERT",
            Severity::Critical => "CRITICAL",
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
            Severity::Notice => "NOTICE",
            Severity::Info => "INFO",
            Severity::Debug => "DEBUG",
            Severity::Debug2 => "DEBUG2",
            Severity::Default => "DEFAULT",
        }
    }

    /// Whether a record at this level passes a filter set to `min`.
    #[inline]
    pub fn is_at_least(self, min: Severity) -> bool {
        self <= min
    }
}

impl TryFrom<u8> for Severity {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Severity::Emergency),
            1 => Ok(Severity::Alert),
            2 => Ok(Severity::Critical),
            3 => Ok(Severity::Error),
            4 => Ok(Severity::Warning),
            5 => Ok(Severity::Notice),
            6 => Ok(Severity::Info),
            7 => Ok(Severity::Debug),
            8 => Ok(Severity::Debug2),
            126 => Ok(Severity::Default),
            _ => Err(Error::InvalidSeverity(value)),
        }
    }
}

impl Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Severity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let upper = s.trim().to_ascii_uppercase();
        let severity = match upper.as_str() {
            "EMERGENCY" | "EMER" => Severity::Emergency,
            "ALERT" => Severity::Alert,
            "CRITICAL" | "CRIT" => Severity::Critical,
            "ERROR" | "ERR" => Severity::Error,
            "WARNING" | "WARN" => Severity::Warning,
            "NOTICE" => Severity::Notice,
            "INFO" => Severity::Info,
            "DEBUG" | "DBG" => Severity::Debug,
            "DEBUG2" | "DBG2" => Severity::Debug2,
            "DEFAULT" => Severity::Default,
            _ => return Err(Error::UnknownSeverityName(s.to_string())),
        };
        Ok(severity)
    }
}
