/// Product naming shared across crates
pub const PRODUCT_NAME: &str = "Calforge";
pub const DEFAULT_PRODUCT_ID: &str =
    const_str::concat!("-//", PRODUCT_NAME, "//", PRODUCT_NAME, " Calendar Engine//EN");

/// Placeholder used when an event carries no usable summary.
pub const UNNAMED_EVENT_SUMMARY: &str = "Unnamed Event";

/// Literal that event producers use in place of an absent value.
pub const NONE_SENTINEL: &str = "none";

/// Key under which a wrapping object carries its event list.
pub const EVENTS_FIELD: &str = "events";

pub const ENV_PREFIX: &str = "CALFORGE";
pub const ENV_SEPARATOR: &str = "__";
pub const CONFIG_FILE_NAME: &str = "calforge.toml";
pub const DEFAULT_OUTPUT_FILE: &str = "calendar.ics";
