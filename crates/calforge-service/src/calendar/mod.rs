//! Event normalization and calendar generation.

mod descriptor;
mod emit;
mod engine;
mod resolve;

pub use calforge_rfc::rfc::ical::build::TextEscaping;
pub use descriptor::{EventDescriptor, RawEvent, event_records};
pub use emit::{CalendarEmitter, EmitOptions, event_component};
pub use engine::{CalendarEngine, GenerationReport, SkippedEvent};
pub use resolve::{EventTiming, ResolvedEvent, SkipReason, TemporalResolver, ZonedTime};
