//! iCalendar property types (RFC 5545 §3.8).

use chrono::{NaiveDate, NaiveDateTime};

use super::{Parameter, RecurrenceRule, Value};

/// An iCalendar property ready for serialization.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    /// Property name (normalized to uppercase).
    pub name: String,
    /// Parameters in order of insertion.
    pub params: Vec<Parameter>,
    /// Typed value.
    pub value: Value,
}

impl Property {
    /// Creates a property with a text value.
    #[must_use]
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            params: Vec::new(),
            value: Value::Text(value.into()),
        }
    }

    /// Creates a property with a date value and `VALUE=DATE`.
    #[must_use]
    pub fn date(name: impl Into<String>, d: NaiveDate) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            params: vec![Parameter::value_type("DATE")],
            value: Value::Date(d),
        }
    }

    /// Creates a property with a wall-clock datetime qualified by `TZID`.
    #[must_use]
    pub fn zoned_datetime(
        name: impl Into<String>,
        local: NaiveDateTime,
        tzid: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            params: vec![Parameter::tzid(tzid)],
            value: Value::LocalDateTime(local),
        }
    }

    /// Creates an `RRULE` property.
    #[must_use]
    pub fn rrule(rule: RecurrenceRule) -> Self {
        Self {
            name: names::RRULE.to_string(),
            params: Vec::new(),
            value: Value::Recur(rule),
        }
    }
}

/// Property names used by this crate.
pub mod names {
    // Calendar properties
    pub const CALSCALE: &str = "CALSCALE";
    pub const PRODID: &str = "PRODID";
    pub const VERSION: &str = "VERSION";

    // Descriptive properties
    pub const DESCRIPTION: &str = "DESCRIPTION";
    pub const LOCATION: &str = "LOCATION";
    pub const SUMMARY: &str = "SUMMARY";

    // Date and time properties
    pub const DTEND: &str = "DTEND";
    pub const DTSTART: &str = "DTSTART";

    // Relationship properties
    pub const UID: &str = "UID";

    // Recurrence properties
    pub const RRULE: &str = "RRULE";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rfc::ical::core::Parameter;

    #[test]
    fn property_text() {
        let prop = Property::text("summary", "Meeting");
        assert_eq!(prop.name, "SUMMARY");
        assert!(prop.params.is_empty());
        assert_eq!(prop.value, Value::Text("Meeting".to_string()));
    }

    #[test]
    fn property_date_carries_value_type() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let prop = Property::date("dtstart", date);
        assert_eq!(prop.name, "DTSTART");
        assert_eq!(prop.params, vec![Parameter::value_type("DATE")]);
        assert_eq!(prop.value, Value::Date(date));
    }

    #[test]
    fn property_zoned_datetime_carries_only_tzid() {
        let local = NaiveDate::from_ymd_opt(2025, 3, 10)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let prop = Property::zoned_datetime("DTEND", local, "Australia/Adelaide");
        assert_eq!(prop.params, vec![Parameter::tzid("Australia/Adelaide")]);
        assert_eq!(prop.value.to_ical(), "20250310T100000");
    }
}
