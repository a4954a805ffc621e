//! Providers for the host's local timezone, used for events that name none.

use std::path::Path;

/// Supplies the IANA identifier of the timezone events fall back to.
pub trait LocalTimezoneProvider {
    fn timezone_id(&self) -> String;
}

impl<P: LocalTimezoneProvider + ?Sized> LocalTimezoneProvider for Box<P> {
    fn timezone_id(&self) -> String {
        (**self).timezone_id()
    }
}

/// A configured identifier, independent of the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedLocalTimezone(String);

impl FixedLocalTimezone {
    #[must_use]
    pub fn new(tzid: impl Into<String>) -> Self {
        Self(tzid.into())
    }
}

impl LocalTimezoneProvider for FixedLocalTimezone {
    fn timezone_id(&self) -> String {
        self.0.clone()
    }
}

/// Detects the host timezone from `TZ`, `/etc/timezone` and the
/// `/etc/localtime` link, in that order, falling back to `UTC`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLocalTimezone;

const FALLBACK_TZID: &str = "UTC";
const ZONEINFO_MARKER: &str = "zoneinfo/";

impl LocalTimezoneProvider for SystemLocalTimezone {
    fn timezone_id(&self) -> String {
        let detected = std::env::var("TZ")
            .ok()
            .and_then(|tz| from_tz_variable(&tz))
            .or_else(|| {
                std::fs::read_to_string("/etc/timezone")
                    .ok()
                    .and_then(|content| from_etc_timezone(&content))
            })
            .or_else(|| {
                std::fs::read_link("/etc/localtime")
                    .ok()
                    .and_then(|target| from_zoneinfo_path(&target))
            });

        match detected {
            Some(tzid) => {
                tracing::debug!(tzid = %tzid, "Detected host timezone");
                tzid
            }
            None => {
                tracing::warn!("Could not detect host timezone, using {FALLBACK_TZID}");
                FALLBACK_TZID.to_string()
            }
        }
    }
}

/// Interprets a `TZ` value: a zone name, optionally `:`-prefixed, or a path
/// into a zoneinfo tree.
fn from_tz_variable(value: &str) -> Option<String> {
    let value = value.trim();
    let value = value.strip_prefix(':').unwrap_or(value);
    if value.is_empty() {
        return None;
    }
    if value.starts_with('/') {
        return from_zoneinfo_path(Path::new(value));
    }
    Some(value.to_string())
}

fn from_etc_timezone(content: &str) -> Option<String> {
    content
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
}

fn from_zoneinfo_path(path: &Path) -> Option<String> {
    let path = path.to_str()?;
    let (_, zone) = path.rsplit_once(ZONEINFO_MARKER)?;
    // Some distributions nest full zone copies under posix/ or right/
    let zone = zone
        .strip_prefix("posix/")
        .or_else(|| zone.strip_prefix("right/"))
        .unwrap_or(zone);
    (!zone.is_empty()).then(|| zone.to_string())
}
