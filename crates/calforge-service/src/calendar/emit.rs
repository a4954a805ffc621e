//! Document emission: resolved events to VEVENT components, and the final
//! VCALENDAR text.

use calforge_core::config::CalendarConfig;
use calforge_core::constants::DEFAULT_PRODUCT_ID;
use calforge_rfc::rfc::ical::build::{SerializeOptions, TextEscaping, serialize};
use calforge_rfc::rfc::ical::core::{Component, ICalendar, Property, names};
use uuid::Uuid;

use super::resolve::{EventTiming, ResolvedEvent};

/// Output switches for one generated document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitOptions {
    pub product_id: String,
    pub text_escaping: TextEscaping,
    pub fold_lines: bool,
    /// When set, every event gets a `UID` derived from its position and content.
    pub uid_namespace: Option<Uuid>,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            product_id: DEFAULT_PRODUCT_ID.to_string(),
            text_escaping: TextEscaping::Verbatim,
            fold_lines: false,
            uid_namespace: None,
        }
    }
}

impl From<&CalendarConfig> for EmitOptions {
    fn from(config: &CalendarConfig) -> Self {
        Self {
            product_id: config.product_id.clone(),
            text_escaping: if config.escape_text {
                TextEscaping::Rfc5545
            } else {
                TextEscaping::Verbatim
            },
            fold_lines: config.fold_lines,
            uid_namespace: config.uid_namespace,
        }
    }
}

/// Accumulates events into one calendar, preserving insertion order.
#[derive(Debug)]
pub struct CalendarEmitter<'a> {
    options: &'a EmitOptions,
    calendar: ICalendar,
}

impl<'a> CalendarEmitter<'a> {
    #[must_use]
    pub fn new(options: &'a EmitOptions) -> Self {
        Self {
            options,
            calendar: ICalendar::new(options.product_id.clone()),
        }
    }

    /// Number of events appended so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.calendar.events().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends one event as a VEVENT block.
    pub fn push(&mut self, event: &ResolvedEvent) {
        let uid = self
            .options
            .uid_namespace
            .map(|namespace| event_uid(&namespace, self.len(), event));
        self.calendar.add_event(event_component(event, uid));
    }

    /// Renders the finished document.
    #[must_use]
    pub fn finish(self) -> String {
        serialize(
            &self.calendar,
            SerializeOptions {
                text_escaping: self.options.text_escaping,
                fold_lines: self.options.fold_lines,
            },
        )
    }
}

/// ## Summary
/// Builds the VEVENT for one resolved event.
///
/// Property order: `UID`, `SUMMARY`, `DTSTART`, `DTEND`, `LOCATION`,
/// `DESCRIPTION`, `RRULE`. Location and description are written even when
/// empty.
#[must_use]
pub fn event_component(event: &ResolvedEvent, uid: Option<String>) -> Component {
    let mut component = Component::event();

    if let Some(uid) = uid {
        component.add_property(Property::text(names::UID, uid));
    }
    component.add_property(Property::text(names::SUMMARY, event.summary.as_str()));

    match &event.timing {
        EventTiming::AllDay {
            start,
            end_exclusive,
        } => {
            component.add_property(Property::date(names::DTSTART, *start));
            component.add_property(Property::date(names::DTEND, *end_exclusive));
        }
        EventTiming::Timed { start, end, tzid } => {
            component.add_property(Property::zoned_datetime(
                names::DTSTART,
                start.wall,
                tzid.as_str(),
            ));
            component.add_property(Property::zoned_datetime(
                names::DTEND,
                end.wall,
                tzid.as_str(),
            ));
        }
    }

    component.add_property(Property::text(names::LOCATION, event.location.as_str()));
    component.add_property(Property::text(names::DESCRIPTION, event.description.as_str()));

    if let Some(rule) = event.recurrence {
        component.add_property(Property::rrule(rule));
    }

    component
}

/// Deterministic UID: equal input at the same position always maps to the
/// same value, and duplicate events at different positions stay distinct.
fn event_uid(namespace: &Uuid, position: usize, event: &ResolvedEvent) -> String {
    let timing = match &event.timing {
        EventTiming::AllDay {
            start,
            end_exclusive,
        } => format!("{start}/{end_exclusive}"),
        EventTiming::Timed { start, end, tzid } => {
            format!("{}/{}/{tzid}", start.wall, end.wall)
        }
    };
    let name = format!(
        "{position}\u{1f}{}\u{1f}{timing}\u{1f}{}",
        event.summary, event.location
    );
    Uuid::new_v5(namespace, name.as_bytes()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::resolve::ZonedTime;
    use calforge_rfc::rfc::ical::build::serialize_component;
    use calforge_rfc::rfc::ical::core::{Frequency, RecurrenceRule};
    use chrono::{NaiveDate, TimeZone};
    use chrono_tz::Tz;
    use std::num::NonZeroU32;

    fn zoned(tz: Tz, hour: u32, minute: u32) -> ZonedTime {
        let instant = tz.with_ymd_and_hms(2025, 3, 10, hour, minute, 0).unwrap();
        ZonedTime {
            wall: instant.naive_local(),
            instant,
        }
    }

    fn all_day(summary: &str) -> ResolvedEvent {
        ResolvedEvent {
            summary: summary.to_string(),
            timing: EventTiming::AllDay {
                start: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
                end_exclusive: NaiveDate::from_ymd_opt(2025, 3, 11).unwrap(),
            },
            location: String::new(),
            description: String::new(),
            recurrence: None,
        }
    }

    fn timed(summary: &str) -> ResolvedEvent {
        let tz = Tz::Australia__Adelaide;
        ResolvedEvent {
            summary: summary.to_string(),
            timing: EventTiming::Timed {
                start: zoned(tz, 10, 0),
                end: zoned(tz, 11, 30),
                tzid: "Australia/Adelaide".to_string(),
            },
            location: "Room 101".to_string(),
            description: "Quarterly planning".to_string(),
            recurrence: Some(RecurrenceRule::new(
                Frequency::Daily,
                NonZeroU32::MIN,
                NonZeroU32::new(5),
            )),
        }
    }

    #[test]
    fn all_day_block() {
        let options = EmitOptions::default();
        let mut emitter = CalendarEmitter::new(&options);
        emitter.push(&all_day("Holiday"));

        let doc = emitter.finish();
        assert!(doc.contains(
            "BEGIN:VEVENT\r\n\
             SUMMARY:Holiday\r\n\
             DTSTART;VALUE=DATE:20250310\r\n\
             DTEND;VALUE=DATE:20250311\r\n\
             LOCATION:\r\n\
             DESCRIPTION:\r\n\
             END:VEVENT\r\n"
        ));
    }

    #[test]
    fn timed_block_uses_wall_clock_and_tzid() {
        let component = event_component(&timed("Team Meeting"), None);

        assert_eq!(
            serialize_component(&component, SerializeOptions::default()),
            "BEGIN:VEVENT\r\n\
             SUMMARY:Team Meeting\r\n\
             DTSTART;TZID=Australia/Adelaide:20250310T100000\r\n\
             DTEND;TZID=Australia/Adelaide:20250310T113000\r\n\
             LOCATION:Room 101\r\n\
             DESCRIPTION:Quarterly planning\r\n\
             RRULE:FREQ=DAILY;INTERVAL=1;COUNT=5\r\n\
             END:VEVENT\r\n"
        );
    }

    #[test]
    fn gap_time_is_written_as_given() {
        let tz = Tz::America__New_York;
        let wall = NaiveDate::from_ymd_opt(2025, 3, 9)
            .unwrap()
            .and_hms_opt(2, 30, 0)
            .unwrap();
        let instant = tz.with_ymd_and_hms(2025, 3, 9, 3, 30, 0).unwrap();
        let at = ZonedTime { wall, instant };

        let event = ResolvedEvent {
            timing: EventTiming::Timed {
                start: at,
                end: at,
                tzid: "America/New_York".to_string(),
            },
            ..timed("Early")
        };
        let block = serialize_component(&event_component(&event, None), SerializeOptions::default());
        assert!(block.contains("DTSTART;TZID=America/New_York:20250309T023000\r\n"));
    }

    #[test]
    fn header_and_footer_without_events() {
        let options = EmitOptions {
            product_id: "-//Test//Emit//EN".to_string(),
            ..EmitOptions::default()
        };
        let emitter = CalendarEmitter::new(&options);
        assert!(emitter.is_empty());

        assert_eq!(
            emitter.finish(),
            "BEGIN:VCALENDAR\r\n\
             VERSION:2.0\r\n\
             PRODID:-//Test//Emit//EN\r\n\
             CALSCALE:GREGORIAN\r\n\
             END:VCALENDAR\r\n"
        );
    }

    #[test]
    fn uids_are_stable_and_position_dependent() {
        let options = EmitOptions {
            uid_namespace: Some(Uuid::NAMESPACE_URL),
            ..EmitOptions::default()
        };

        let render = || {
            let mut emitter = CalendarEmitter::new(&options);
            emitter.push(&all_day("Duplicate"));
            emitter.push(&all_day("Duplicate"));
            emitter.finish()
        };

        let first = render();
        assert_eq!(first, render());

        let uids: Vec<&str> = first
            .lines()
            .filter_map(|line| line.strip_prefix("UID:"))
            .collect();
        assert_eq!(uids.len(), 2);
        assert_ne!(uids[0], uids[1]);
    }

    #[test]
    fn options_from_config() {
        let config = CalendarConfig {
            product_id: "-//Acme//Planner//EN".to_string(),
            local_timezone: None,
            escape_text: true,
            fold_lines: true,
            uid_namespace: None,
        };

        let options = EmitOptions::from(&config);
        assert_eq!(options.product_id, "-//Acme//Planner//EN");
        assert_eq!(options.text_escaping, TextEscaping::Rfc5545);
        assert!(options.fold_lines);
    }
}
