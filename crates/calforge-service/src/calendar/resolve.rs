//! Temporal resolution: all-day vs timed disambiguation, date parsing and
//! timezone localization for one descriptor at a time.

use calforge_rfc::rfc::ical::core::RecurrenceRule;
use calforge_rfc::rfc::ical::expand::{ConversionError, TimeZoneResolver};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta};
use chrono_tz::Tz;

use super::descriptor::EventDescriptor;
use crate::error::{ServiceError, ServiceResult};
use crate::local_tz::LocalTimezoneProvider;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// When an event happens. Exactly one shape per event.
#[derive(Debug, Clone, PartialEq)]
pub enum EventTiming {
    /// Whole days. `end_exclusive` is the day after the last covered date.
    AllDay {
        start: NaiveDate,
        end_exclusive: NaiveDate,
    },
    /// Clock times in `tzid`.
    Timed {
        start: ZonedTime,
        end: ZonedTime,
        /// Identifier as it should appear in `TZID`.
        tzid: String,
    },
}

/// A clock time as written by the producer, and the instant it denotes.
///
/// `wall` is what gets emitted. The two differ only for a time skipped by a
/// DST gap, where `instant` is the first valid instant after it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZonedTime {
    pub wall: NaiveDateTime,
    pub instant: DateTime<Tz>,
}

/// An event that passed validation and is ready to render.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedEvent {
    pub summary: String,
    pub timing: EventTiming,
    pub location: String,
    pub description: String,
    pub recurrence: Option<RecurrenceRule>,
}

impl ResolvedEvent {
    #[must_use]
    pub fn is_all_day(&self) -> bool {
        matches!(self.timing, EventTiming::AllDay { .. })
    }
}

/// Why a single event was left out of the document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SkipReason {
    #[error("missing start date")]
    MissingStartDate,

    #[error("invalid date format: {0}")]
    InvalidDateFormat(String),

    #[error("local time does not exist: {0}")]
    NonExistentLocalTime(String),
}

/// Resolves descriptors against the timezone database.
///
/// Holds the zone cache for one run; the local timezone is asked for at most
/// once, on the first event that needs it.
pub struct TemporalResolver<'a, P: LocalTimezoneProvider + ?Sized> {
    timezones: TimeZoneResolver,
    local: &'a P,
    local_tzid: Option<String>,
}

impl<'a, P: LocalTimezoneProvider + ?Sized> TemporalResolver<'a, P> {
    #[must_use]
    pub fn new(local: &'a P) -> Self {
        Self {
            timezones: TimeZoneResolver::new(),
            local,
            local_tzid: None,
        }
    }

    /// ## Summary
    /// Resolves one descriptor into a [`ResolvedEvent`], or the reason it
    /// must be skipped.
    ///
    /// The timezone is resolved before any date is parsed, so an unknown zone
    /// aborts the run even for all-day events.
    ///
    /// ## Errors
    /// Returns `ServiceError::UnresolvableTimezone` if the effective timezone
    /// is not in the timezone database.
    pub fn resolve(
        &mut self,
        descriptor: &EventDescriptor,
    ) -> ServiceResult<Result<ResolvedEvent, SkipReason>> {
        let Some(start_date) = descriptor.start_date.as_deref() else {
            return Ok(Err(SkipReason::MissingStartDate));
        };

        let tzid = self.effective_tzid(descriptor);
        self.timezones
            .resolve(&tzid)
            .map_err(|_e| ServiceError::UnresolvableTimezone(tzid.clone()))?;

        let timing = if descriptor.is_all_day() {
            all_day_timing(start_date, &descriptor.end_date)
        } else {
            self.timed_timing(start_date, descriptor, tzid)?
        };

        Ok(timing.map(|timing| {
            warn_if_inverted(&descriptor.summary, &timing);
            ResolvedEvent {
                summary: descriptor.summary.clone(),
                timing,
                location: descriptor.location.clone(),
                description: descriptor.description.clone(),
                recurrence: descriptor.recurrence,
            }
        }))
    }

    fn effective_tzid(&mut self, descriptor: &EventDescriptor) -> String {
        if let Some(tzid) = &descriptor.timezone {
            return tzid.clone();
        }
        self.local_tzid
            .get_or_insert_with(|| self.local.timezone_id())
            .clone()
    }

    fn timed_timing(
        &mut self,
        start_date: &str,
        descriptor: &EventDescriptor,
        tzid: String,
    ) -> ServiceResult<Result<EventTiming, SkipReason>> {
        let start_local = match parse_local(start_date, &descriptor.start_time) {
            Ok(dt) => dt,
            Err(reason) => return Ok(Err(reason)),
        };
        let end_local = match parse_local(&descriptor.end_date, &descriptor.end_time) {
            Ok(dt) => dt,
            Err(reason) => return Ok(Err(reason)),
        };

        let start = match self.localize(start_local, &tzid)? {
            Ok(dt) => dt,
            Err(reason) => return Ok(Err(reason)),
        };
        let end = match self.localize(end_local, &tzid)? {
            Ok(dt) => dt,
            Err(reason) => return Ok(Err(reason)),
        };

        Ok(Ok(EventTiming::Timed { start, end, tzid }))
    }

    fn localize(
        &mut self,
        local: NaiveDateTime,
        tzid: &str,
    ) -> ServiceResult<Result<ZonedTime, SkipReason>> {
        match self.timezones.localize(local, tzid) {
            Ok(instant) => {
                if instant.naive_local() != local {
                    tracing::warn!(%local, tzid, "Local time falls in a DST gap, emitting it as given");
                }
                Ok(Ok(ZonedTime {
                    wall: local,
                    instant,
                }))
            }
            Err(ConversionError::NonExistentTime(detail)) => {
                Ok(Err(SkipReason::NonExistentLocalTime(detail)))
            }
            Err(ConversionError::UnknownTimezone(id)) => {
                Err(ServiceError::UnresolvableTimezone(id))
            }
        }
    }
}

fn all_day_timing(start_date: &str, end_date: &str) -> Result<EventTiming, SkipReason> {
    let start = parse_date(start_date)?;
    let end = parse_date(end_date)?;
    let end_exclusive = end
        .checked_add_signed(TimeDelta::days(1))
        .ok_or_else(|| SkipReason::InvalidDateFormat(format!("{end_date} is the last representable date")))?;

    Ok(EventTiming::AllDay {
        start,
        end_exclusive,
    })
}

fn parse_date(value: &str) -> Result<NaiveDate, SkipReason> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|e| SkipReason::InvalidDateFormat(format!("{value:?} is not YYYY-MM-DD: {e}")))
}

fn parse_local(date: &str, time: &str) -> Result<NaiveDateTime, SkipReason> {
    let text = format!("{date} {time}");
    NaiveDateTime::parse_from_str(&text, DATETIME_FORMAT).map_err(|e| {
        SkipReason::InvalidDateFormat(format!("{text:?} is not YYYY-MM-DD HH:MM: {e}"))
    })
}

/// Inverted ranges are emitted as given; this only makes them visible.
fn warn_if_inverted(summary: &str, timing: &EventTiming) {
    let inverted = match timing {
        EventTiming::AllDay {
            start,
            end_exclusive,
        } => end_exclusive <= start,
        EventTiming::Timed { start, end, .. } => end.instant < start.instant,
    };
    if inverted {
        tracing::warn!(summary, "Event ends before it starts, emitting as given");
    }
}
