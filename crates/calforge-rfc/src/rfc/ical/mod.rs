//! iCalendar (RFC 5545) support: document model, serialization and timezone
//! resolution.

pub mod build;
pub mod core;
pub mod expand;
