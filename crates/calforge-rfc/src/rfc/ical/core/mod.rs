//! iCalendar core models (RFC 5545).
//!
//! This module defines the data structures used to build iCalendar content
//! before serialization:
//! - Components and properties in insertion order, so output is deterministic
//! - Typed values, so each property renders in its RFC 5545 value format
//! - Recurrence rules restricted to the frequencies this engine emits

mod component;
mod parameter;
mod property;
mod rrule;
mod value;

pub use component::{Component, ComponentKind, ICalendar};
pub use parameter::Parameter;
pub use property::{Property, names};
pub use rrule::{Frequency, RecurrenceRule};
pub use value::Value;
