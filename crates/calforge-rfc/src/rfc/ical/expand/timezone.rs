//! Timezone resolution and wall-clock localization for iCalendar date-times.
//!
//! Uses ICU4X for Windows timezone ID to IANA mapping and timezone canonicalization,
//! and `chrono-tz` for the offset rules themselves.

use chrono::{DateTime, LocalResult, NaiveDateTime, TimeDelta, TimeZone};
use chrono_tz::Tz;
use icu::time::zone::WindowsParser;
use icu::time::zone::iana::IanaParserExtended;
use std::collections::HashMap;
use std::str::FromStr;

/// Error during timezone resolution or localization.
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    /// Unknown or invalid timezone identifier.
    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    /// Wall-clock time that falls inside a DST gap and cannot be shifted out of it.
    #[error("Non-existent time (DST gap): {0}")]
    NonExistentTime(String),
}

/// Resolver for timezone identifiers.
///
/// Caches resolved zones by the identifier as supplied, so repeated events in
/// the same zone skip normalization.
#[derive(Debug, Default)]
pub struct TimeZoneResolver {
    cache: HashMap<String, Tz>,
}

impl TimeZoneResolver {
    /// Creates a new timezone resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// ## Summary
    /// Resolves a timezone identifier to a `chrono_tz::Tz`.
    ///
    /// The identifier is normalized first: vendor prefixes are stripped and
    /// Windows names and IANA aliases map to canonical IANA names.
    ///
    /// ## Errors
    ///
    /// Returns `ConversionError::UnknownTimezone` if the TZID cannot be resolved.
    ///
    /// ## Side Effects
    ///
    /// Caches successful resolutions to avoid repeated parsing.
    pub fn resolve(&mut self, tzid: &str) -> Result<Tz, ConversionError> {
        if let Some(tz) = self.cache.get(tzid) {
            return Ok(*tz);
        }

        let normalized = normalize_tzid(tzid.trim());

        let tz = Tz::from_str(&normalized)
            .map_err(|_e| ConversionError::UnknownTimezone(tzid.to_string()))?;

        tracing::trace!(tzid, resolved = %tz, "Resolved timezone");
        self.cache.insert(tzid.to_string(), tz);

        Ok(tz)
    }

    /// ## Summary
    /// Interprets `local` as wall-clock time in `tzid`.
    ///
    /// A time repeated by a DST fold resolves to its first occurrence
    /// (RFC 5545 §3.3.5). A time skipped by a DST gap resolves to the instant
    /// one hour later, which lands after every gap in the current database.
    /// Callers that emit wall-clock values keep `local`, not the instant's
    /// local time.
    ///
    /// ## Errors
    ///
    /// Returns `ConversionError::UnknownTimezone` if the TZID cannot be resolved,
    /// or `ConversionError::NonExistentTime` if the shifted time is still
    /// inside a gap.
    pub fn localize(
        &mut self,
        local: NaiveDateTime,
        tzid: &str,
    ) -> Result<DateTime<Tz>, ConversionError> {
        let tz = self.resolve(tzid)?;

        match tz.from_local_datetime(&local) {
            LocalResult::Single(dt) => Ok(dt),
            LocalResult::Ambiguous(earliest, _latest) => {
                tracing::debug!(%local, tzid, "Ambiguous local time, using first occurrence");
                Ok(earliest)
            }
            LocalResult::None => {
                let shifted = local + TimeDelta::hours(1);
                tracing::debug!(%local, %shifted, tzid, "Local time falls in DST gap, shifting forward");
                tz.from_local_datetime(&shifted)
                    .earliest()
                    .ok_or_else(|| ConversionError::NonExistentTime(format!("{local} in timezone {tzid}")))
            }
        }
    }
}

/// Normalizes common CalDAV/iCalendar timezone identifiers to IANA names.
///
/// Uses ICU4X for Windows timezone ID mapping and IANA canonicalization.
fn normalize_tzid(tzid: &str) -> String {
    let stripped = tzid
        .strip_prefix("/mozilla.org/")
        .or_else(|| tzid.strip_prefix("/softwarestudio.org/"))
        .unwrap_or(tzid);

    let windows_parser = WindowsParser::new();
    if let Some(tz) = windows_parser.parse(stripped, None) {
        let iana_parser = IanaParserExtended::new();
        if let Some(entry) = iana_parser.iter().find(|entry| entry.time_zone == tz) {
            return entry.canonical.to_string();
        }
    }

    // Canonicalizes aliases such as Europe/Kiev -> Europe/Kyiv
    let iana_parser = IanaParserExtended::new();
    let parsed = iana_parser.parse(stripped);
    if parsed.time_zone != icu::time::TimeZone::UNKNOWN {
        return parsed.canonical.to_string();
    }

    stripped.to_string()
}
