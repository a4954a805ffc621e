//! Field extraction: the boundary between loosely-typed JSON event records and
//! the strict [`EventDescriptor`] used by every later stage.

use std::num::NonZeroU32;

use calforge_core::constants::{EVENTS_FIELD, NONE_SENTINEL, UNNAMED_EVENT_SUMMARY};
use calforge_rfc::rfc::ical::core::{Frequency, RecurrenceRule};
use serde_json::{Map, Value};

use crate::error::{ServiceError, ServiceResult};

/// A raw event record as supplied by the producer.
pub type RawEvent = Map<String, Value>;

/// Normalized event fields with every default applied.
///
/// The `"none"` sentinel is recognized in `start_date` and `timezone` only,
/// where it becomes `None`. Elsewhere it is ordinary text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDescriptor {
    pub summary: String,
    /// `YYYY-MM-DD`, still unparsed. `None` when absent, null or the sentinel;
    /// a blank value is kept and fails to parse later.
    pub start_date: Option<String>,
    /// Defaults to `start_date`.
    pub end_date: String,
    /// `HH:MM`, or empty for an all-day event.
    pub start_time: String,
    /// Defaults to `start_time`.
    pub end_time: String,
    /// `None` means the host's local timezone.
    pub timezone: Option<String>,
    pub location: String,
    pub description: String,
    pub recurrence: Option<RecurrenceRule>,
    /// Note left by the producer when it converted times between zones.
    pub tz_conversion: Option<String>,
}

impl EventDescriptor {
    /// ## Summary
    /// Extracts a descriptor from one raw record. Never fails: absent,
    /// null or unusable fields take their defaults.
    #[must_use]
    pub fn from_json(raw: &RawEvent) -> Self {
        let summary = text_field(raw, "summary")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| UNNAMED_EVENT_SUMMARY.to_string());

        let start_date = text_field(raw, "start_date")
            .map(|s| s.trim().to_string())
            .filter(|s| !is_sentinel(s));
        let end_date = trimmed_field(raw, "end_date")
            .or_else(|| start_date.clone())
            .unwrap_or_default();

        let start_time = trimmed_field(raw, "start_time").unwrap_or_default();
        let end_time = trimmed_field(raw, "end_time").unwrap_or_else(|| start_time.clone());

        let recurrence = raw
            .get("recurrence")
            .and_then(Value::as_object)
            .and_then(|rec| recurrence_rule(rec, &summary));

        Self {
            start_date,
            end_date,
            start_time,
            end_time,
            timezone: trimmed_field(raw, "timezone").filter(|s| !is_sentinel(s)),
            location: text_field(raw, "location").unwrap_or_default(),
            description: text_field(raw, "description").unwrap_or_default(),
            recurrence,
            tz_conversion: text_field(raw, "tz_conversion").filter(|s| !s.trim().is_empty()),
            summary,
        }
    }

    /// Whether the event has no time of day and spans whole dates.
    #[must_use]
    pub fn is_all_day(&self) -> bool {
        self.start_time.is_empty()
    }
}

/// ## Summary
/// Returns the event records carried by `input`, which is either an array of
/// records or an object holding that array under `events`.
///
/// ## Errors
/// Returns `ServiceError::InvalidInputShape` if `input` has neither shape or
/// any element is not an object.
pub fn event_records(input: &Value) -> ServiceResult<Vec<&RawEvent>> {
    let items = match input {
        Value::Array(items) => items,
        Value::Object(wrapper) => match wrapper.get(EVENTS_FIELD) {
            Some(Value::Array(items)) => items,
            Some(_) => {
                return Err(ServiceError::InvalidInputShape(format!(
                    "`{EVENTS_FIELD}` field is not an array"
                )));
            }
            None => {
                return Err(ServiceError::InvalidInputShape(format!(
                    "object has no `{EVENTS_FIELD}` field"
                )));
            }
        },
        other => {
            return Err(ServiceError::InvalidInputShape(format!(
                "expected an array of events or an object with an `{EVENTS_FIELD}` array, found {}",
                json_kind(other)
            )));
        }
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            item.as_object().ok_or_else(|| {
                ServiceError::InvalidInputShape(format!(
                    "event at index {index} is {}, not an object",
                    json_kind(item)
                ))
            })
        })
        .collect()
}

/// Reads a scalar as text. Numbers and booleans keep their JSON spelling;
/// null, objects and arrays count as absent.
fn text_field(raw: &RawEvent, key: &str) -> Option<String> {
    match raw.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Reads a trimmed text field where empty means absent.
fn trimmed_field(raw: &RawEvent, key: &str) -> Option<String> {
    text_field(raw, key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn is_sentinel(value: &str) -> bool {
    value.eq_ignore_ascii_case(NONE_SENTINEL)
}

fn recurrence_rule(rec: &RawEvent, summary: &str) -> Option<RecurrenceRule> {
    let frequency_text = text_field(rec, "frequency")?;
    let frequency = match frequency_text.parse::<Frequency>() {
        Ok(frequency) => frequency,
        Err(e) => {
            tracing::debug!(summary, error = %e, "Dropping recurrence");
            return None;
        }
    };

    let interval = match rec.get("interval") {
        None | Some(Value::Null) => NonZeroU32::MIN,
        Some(value) => positive_integer(value).unwrap_or_else(|| {
            tracing::warn!(summary, interval = %value, "Invalid recurrence interval, using 1");
            NonZeroU32::MIN
        }),
    };

    let count = rec.get("count").and_then(positive_integer);

    Some(RecurrenceRule::new(frequency, interval, count))
}

fn positive_integer(value: &Value) -> Option<NonZeroU32> {
    let n = match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    };
    n.and_then(NonZeroU32::new)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn extract(value: Value) -> EventDescriptor {
        EventDescriptor::from_json(value.as_object().expect("test input is an object"))
    }

    #[test]
    fn empty_record_takes_all_defaults() {
        let desc = extract(json!({}));

        assert_eq!(desc.summary, UNNAMED_EVENT_SUMMARY);
        assert_eq!(desc.start_date, None);
        assert_eq!(desc.end_date, "");
        assert_eq!(desc.start_time, "");
        assert_eq!(desc.end_time, "");
        assert_eq!(desc.timezone, None);
        assert_eq!(desc.location, "");
        assert_eq!(desc.description, "");
        assert_eq!(desc.recurrence, None);
        assert_eq!(desc.tz_conversion, None);
        assert!(desc.is_all_day());
    }

    #[test]
    fn empty_summary_uses_placeholder() {
        assert_eq!(extract(json!({"summary": ""})).summary, UNNAMED_EVENT_SUMMARY);
        assert_eq!(extract(json!({"summary": null})).summary, UNNAMED_EVENT_SUMMARY);
        assert_eq!(extract(json!({"summary": "Standup"})).summary, "Standup");
    }

    #[test]
    fn end_date_defaults_to_trimmed_start_date() {
        let desc = extract(json!({"start_date": " 2025-03-10 "}));
        assert_eq!(desc.start_date.as_deref(), Some("2025-03-10"));
        assert_eq!(desc.end_date, "2025-03-10");

        let desc = extract(json!({"start_date": "2025-03-10", "end_date": null}));
        assert_eq!(desc.end_date, "2025-03-10");

        let desc = extract(json!({"start_date": "2025-03-10", "end_date": " 2025-03-12\n"}));
        assert_eq!(desc.end_date, "2025-03-12");
    }

    #[test]
    fn end_time_defaults_to_start_time() {
        let desc = extract(json!({"start_time": "10:00", "end_time": ""}));
        assert_eq!(desc.end_time, "10:00");
        assert!(!desc.is_all_day());

        let desc = extract(json!({"start_time": "10:00"}));
        assert_eq!(desc.end_time, "10:00");

        let desc = extract(json!({"start_time": "10:00", "end_time": "11:30"}));
        assert_eq!(desc.end_time, "11:30");
    }

    #[test]
    fn sentinel_becomes_absent() {
        let desc = extract(json!({"start_date": "None", "timezone": "NONE"}));
        assert_eq!(desc.start_date, None);
        assert_eq!(desc.timezone, None);

        let desc = extract(json!({"timezone": "Australia/Adelaide"}));
        assert_eq!(desc.timezone.as_deref(), Some("Australia/Adelaide"));
    }

    #[test]
    fn sentinel_is_plain_text_in_other_fields() {
        let desc = extract(json!({
            "start_date": "2025-03-10",
            "end_date": "none",
            "start_time": "none",
            "end_time": "None"
        }));
        assert_eq!(desc.end_date, "none");
        assert_eq!(desc.start_time, "none");
        assert_eq!(desc.end_time, "None");
        assert!(!desc.is_all_day());
    }

    #[test]
    fn blank_start_date_is_kept() {
        let desc = extract(json!({"start_date": "  "}));
        assert_eq!(desc.start_date.as_deref(), Some(""));
    }

    #[test]
    fn non_text_scalars_are_coerced() {
        let desc = extract(json!({"summary": 42, "location": true, "description": {"x": 1}}));
        assert_eq!(desc.summary, "42");
        assert_eq!(desc.location, "true");
        assert_eq!(desc.description, "");
    }

    #[test]
    fn recurrence_with_all_fields() {
        let desc = extract(json!({
            "recurrence": {"frequency": "daily", "interval": 2, "count": 5}
        }));
        let rule = desc.recurrence.expect("rule should be present");
        assert_eq!(rule.frequency, Frequency::Daily);
        assert_eq!(rule.interval.get(), 2);
        assert_eq!(rule.count.map(NonZeroU32::get), Some(5));
    }

    #[test]
    fn recurrence_defaults_interval_and_leaves_count_unbounded() {
        let rule = extract(json!({"recurrence": {"frequency": "Weekly"}}))
            .recurrence
            .expect("rule should be present");
        assert_eq!(rule.interval, NonZeroU32::MIN);
        assert_eq!(rule.count, None);
    }

    #[test]
    fn recurrence_tolerates_bad_numbers() {
        let rule = extract(json!({
            "recurrence": {"frequency": "monthly", "interval": 0, "count": 0}
        }))
        .recurrence
        .expect("rule should be present");
        assert_eq!(rule.interval, NonZeroU32::MIN);
        assert_eq!(rule.count, None);

        let rule = extract(json!({
            "recurrence": {"frequency": "monthly", "interval": "3", "count": "4"}
        }))
        .recurrence
        .expect("rule should be present");
        assert_eq!(rule.interval.get(), 3);
        assert_eq!(rule.count.map(NonZeroU32::get), Some(4));
    }

    #[test]
    fn unrecognized_recurrence_is_dropped() {
        for rec in [
            json!({"frequency": "yearly", "interval": 1}),
            json!({"interval": 2}),
            json!({"frequency": null}),
            json!("daily"),
            json!(null),
        ] {
            let desc = extract(json!({"recurrence": rec}));
            assert_eq!(desc.recurrence, None, "{rec} should yield no rule");
        }
    }

    #[test]
    fn event_records_accepts_both_shapes() {
        let list = json!([{"summary": "A"}, {"summary": "B"}]);
        assert_eq!(event_records(&list).unwrap().len(), 2);

        let wrapped = json!({"events": [{"summary": "A"}]});
        assert_eq!(event_records(&wrapped).unwrap().len(), 1);

        let empty = json!({"events": []});
        assert!(event_records(&empty).unwrap().is_empty());
    }

    #[test]
    fn event_records_rejects_other_shapes() {
        for input in [
            json!({"items": []}),
            json!({"events": {"summary": "A"}}),
            json!("events"),
            json!(null),
            json!([{"summary": "A"}, 7]),
        ] {
            let err = event_records(&input).unwrap_err();
            assert!(
                matches!(err, ServiceError::InvalidInputShape(_)),
                "{input} should be rejected"
            );
        }
    }
}
