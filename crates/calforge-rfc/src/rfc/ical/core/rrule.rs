//! Recurrence rules (RFC 5545 §3.3.10), limited to the frequencies
//! event producers may request.

use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

use crate::error::RfcError;

/// Supported recurrence frequencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    /// Returns the `FREQ` value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "DAILY",
            Self::Weekly => "WEEKLY",
            Self::Monthly => "MONTHLY",
        }
    }
}

impl FromStr for Frequency {
    type Err = RfcError;

    /// Parses a frequency case-insensitively, ignoring surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DAILY" => Ok(Self::Daily),
            "WEEKLY" => Ok(Self::Weekly),
            "MONTHLY" => Ok(Self::Monthly),
            other => Err(RfcError::ValidationError(format!(
                "unsupported recurrence frequency: {other}"
            ))),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A repeating pattern attached to one event.
///
/// A rule without `count` repeats indefinitely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    pub interval: NonZeroU32,
    pub count: Option<NonZeroU32>,
}

impl RecurrenceRule {
    #[must_use]
    pub const fn new(
        frequency: Frequency,
        interval: NonZeroU32,
        count: Option<NonZeroU32>,
    ) -> Self {
        Self {
            frequency,
            interval,
            count,
        }
    }
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FREQ={};INTERVAL={}", self.frequency, self.interval)?;
        if let Some(count) = self.count {
            write!(f, ";COUNT={count}")?;
        }
        Ok(())
    }
}
