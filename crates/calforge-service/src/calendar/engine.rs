//! Pipeline orchestration: extract, resolve and emit every record in order.

use serde_json::Value;

use super::descriptor::{EventDescriptor, event_records};
use super::emit::{CalendarEmitter, EmitOptions};
use super::resolve::{SkipReason, TemporalResolver};
use crate::error::ServiceResult;
use crate::local_tz::LocalTimezoneProvider;

/// An event left out of the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEvent {
    /// Position in the input list.
    pub index: usize,
    pub summary: String,
    pub reason: SkipReason,
}

/// Outcome of one generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    /// The complete VCALENDAR text.
    pub document: String,
    /// Number of VEVENT blocks in `document`.
    pub emitted: usize,
    pub skipped: Vec<SkippedEvent>,
}

/// Turns event descriptors into one iCalendar document.
///
/// Holds no state between runs: the timezone cache and the local timezone
/// lookup are scoped to a single [`generate`](Self::generate) call.
#[derive(Debug, Clone)]
pub struct CalendarEngine<P> {
    local: P,
    options: EmitOptions,
}

impl<P: LocalTimezoneProvider> CalendarEngine<P> {
    #[must_use]
    pub fn new(local: P, options: EmitOptions) -> Self {
        Self { local, options }
    }

    /// ## Summary
    /// Generates a calendar from `input`, which is either an array of event
    /// records or an object with an `events` array.
    ///
    /// Records that cannot be placed in time are skipped and listed in the
    /// report. Output order follows input order.
    ///
    /// ## Errors
    /// Returns `ServiceError::InvalidInputShape` if `input` has neither
    /// accepted shape, or `ServiceError::UnresolvableTimezone` if any
    /// event's effective timezone is unknown. No partial document is
    /// produced in either case.
    pub fn generate(&self, input: &Value) -> ServiceResult<GenerationReport> {
        let records = event_records(input)?;
        tracing::debug!(count = records.len(), "Generating calendar");

        let mut resolver = TemporalResolver::new(&self.local);
        let mut emitter = CalendarEmitter::new(&self.options);
        let mut skipped = Vec::new();

        for (index, raw) in records.into_iter().enumerate() {
            let descriptor = EventDescriptor::from_json(raw);

            if let Some(note) = &descriptor.tz_conversion {
                tracing::info!(
                    index,
                    summary = %descriptor.summary,
                    note = %note,
                    "Timezone conversion noted"
                );
            }

            match resolver.resolve(&descriptor)? {
                Ok(event) => emitter.push(&event),
                Err(reason) => {
                    tracing::warn!(
                        index,
                        summary = %descriptor.summary,
                        reason = %reason,
                        "Skipping event"
                    );
                    skipped.push(SkippedEvent {
                        index,
                        summary: descriptor.summary,
                        reason,
                    });
                }
            }
        }

        let emitted = emitter.len();
        tracing::debug!(emitted, skipped = skipped.len(), "Calendar generated");

        Ok(GenerationReport {
            document: emitter.finish(),
            emitted,
            skipped,
        })
    }

    /// ## Summary
    /// Like [`generate`](Self::generate), returning only the document text.
    ///
    /// ## Errors
    /// Same as [`generate`](Self::generate).
    pub fn render(&self, input: &Value) -> ServiceResult<String> {
        self.generate(input).map(|report| report.document)
    }
}
