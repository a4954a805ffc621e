//! Typed property values (RFC 5545 §3.3).

use chrono::{NaiveDate, NaiveDateTime};

use super::RecurrenceRule;

/// A property value with its RFC 5545 data type.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// TEXT (§3.3.11).
    Text(String),
    /// DATE (§3.3.4), rendered `YYYYMMDD`.
    Date(NaiveDate),
    /// DATE-TIME in local (non-UTC) form (§3.3.5), rendered `YYYYMMDDTHHMMSS`.
    ///
    /// The zone is carried by the property's `TZID` parameter.
    LocalDateTime(NaiveDateTime),
    /// RECUR (§3.3.10).
    Recur(RecurrenceRule),
}

impl Value {
    /// Renders non-text values in their wire format.
    ///
    /// Text is returned as-is; escaping is the serializer's decision.
    #[must_use]
    pub fn to_ical(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Date(d) => d.format("%Y%m%d").to_string(),
            Self::LocalDateTime(dt) => dt.format("%Y%m%dT%H%M%S").to_string(),
            Self::Recur(rule) => rule.to_string(),
        }
    }
}
