//! iCalendar serializer (RFC 5545).
//!
//! Serializes iCalendar structures to text. Properties and child components
//! are written in insertion order, so equal inputs give byte-identical output.

use super::escape::{escape_text, neutralize_line_breaks};
use super::fold::fold_line;
use crate::rfc::ical::core::{Component, ICalendar, Property, Value};

/// How TEXT values are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextEscaping {
    /// Written as supplied; only raw line breaks are encoded.
    #[default]
    Verbatim,
    /// Backslash, comma, semicolon and newline escaped per RFC 5545 §3.3.11.
    Rfc5545,
}

/// Serialization switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SerializeOptions {
    pub text_escaping: TextEscaping,
    /// Fold content lines longer than 75 octets.
    pub fold_lines: bool,
}

/// Serializes an iCalendar document to a string.
#[must_use]
pub fn serialize(ical: &ICalendar, options: SerializeOptions) -> String {
    serialize_component(&ical.root, options)
}

/// Serializes a component and its children to a string.
#[must_use]
pub fn serialize_component(component: &Component, options: SerializeOptions) -> String {
    let mut result = String::new();

    result.push_str(&terminate(&format!("BEGIN:{}", component.name()), options));

    for prop in &component.properties {
        result.push_str(&serialize_property(prop, options));
    }

    for child in &component.children {
        result.push_str(&serialize_component(child, options));
    }

    result.push_str(&terminate(&format!("END:{}", component.name()), options));

    result
}

/// Serializes a property to a CRLF-terminated content line.
#[must_use]
pub fn serialize_property(prop: &Property, options: SerializeOptions) -> String {
    let mut line = prop.name.clone();

    for param in &prop.params {
        line.push(';');
        line.push_str(&param.to_string());
    }

    line.push(':');
    line.push_str(&serialize_value(&prop.value, options.text_escaping));

    terminate(&line, options)
}

fn serialize_value(value: &Value, escaping: TextEscaping) -> String {
    match (value, escaping) {
        (Value::Text(s), TextEscaping::Rfc5545) => escape_text(s),
        (Value::Text(s), TextEscaping::Verbatim) => neutralize_line_breaks(s),
        _ => value.to_ical(),
    }
}

fn terminate(line: &str, options: SerializeOptions) -> String {
    if options.fold_lines {
        fold_line(line)
    } else {
        format!("{line}\r\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rfc::ical::core::{Frequency, RecurrenceRule};
    use chrono::NaiveDate;
    use std::num::NonZeroU32;

    fn sample_event() -> Component {
        let start = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let mut event = Component::event();
        event.add_property(Property::text("SUMMARY", "Planning, Q2; final"));
        event.add_property(Property::date("DTSTART", start));
        event.add_property(Property::date("DTEND", start.succ_opt().unwrap()));
        event.add_property(Property::rrule(RecurrenceRule::new(
            Frequency::Weekly,
            NonZeroU32::new(2).unwrap(),
            None,
        )));
        event
    }

    #[test]
    fn serialize_empty_calendar() {
        let ical = ICalendar::new("-//Test//Test//EN");
        assert_eq!(
            serialize(&ical, SerializeOptions::default()),
            "BEGIN:VCALENDAR\r\n\
             VERSION:2.0\r\n\
             PRODID:-//Test//Test//EN\r\n\
             CALSCALE:GREGORIAN\r\n\
             END:VCALENDAR\r\n"
        );
    }

    #[test]
    fn serialize_event_verbatim() {
        let out = serialize_component(&sample_event(), SerializeOptions::default());
        assert_eq!(
            out,
            "BEGIN:VEVENT\r\n\
             SUMMARY:Planning, Q2; final\r\n\
             DTSTART;VALUE=DATE:20250310\r\n\
             DTEND;VALUE=DATE:20250311\r\n\
             RRULE:FREQ=WEEKLY;INTERVAL=2\r\n\
             END:VEVENT\r\n"
        );
    }

    #[test]
    fn serialize_event_escaped() {
        let options = SerializeOptions {
            text_escaping: TextEscaping::Rfc5545,
            fold_lines: false,
        };
        let out = serialize_component(&sample_event(), options);
        assert!(out.contains("SUMMARY:Planning\\, Q2\\; final\r\n"));
        // Non-text values are never escaped
        assert!(out.contains("RRULE:FREQ=WEEKLY;INTERVAL=2\r\n"));
    }

    #[test]
    fn serialize_zoned_datetime() {
        let local = NaiveDate::from_ymd_opt(2025, 3, 10)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let prop = Property::zoned_datetime("DTSTART", local, "Australia/Adelaide");
        assert_eq!(
            serialize_property(&prop, SerializeOptions::default()),
            "DTSTART;TZID=Australia/Adelaide:20250310T100000\r\n"
        );
    }

    #[test]
    fn serialize_folds_when_enabled() {
        let prop = Property::text("DESCRIPTION", "x".repeat(200));

        let unfolded = serialize_property(&prop, SerializeOptions::default());
        assert_eq!(unfolded.matches("\r\n").count(), 1);

        let folded = serialize_property(
            &prop,
            SerializeOptions {
                fold_lines: true,
                ..SerializeOptions::default()
            },
        );
        assert!(folded.contains("\r\n "));
        assert_eq!(folded.replace("\r\n ", ""), unfolded);
    }
}
