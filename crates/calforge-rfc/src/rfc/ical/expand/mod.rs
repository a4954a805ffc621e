//! Timezone resolution for zoned iCalendar date-times.

mod timezone;

pub use timezone::{ConversionError, TimeZoneResolver};
