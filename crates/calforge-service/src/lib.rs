pub mod calendar;
pub mod error;
pub mod local_tz;
