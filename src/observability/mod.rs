//! Observability for shuffle runs
//!
//! - Structured JSON logging on stderr
//! - Typed lifecycle events
//! - Begin/complete scopes around each phase
//!
//! Observability is read-only: nothing here influences the shuffle.
//!
//! ```ignore
//! use chunkshuf::observability::{log_event_with_fields, Event, ObservationScope};
//!
//! log_event_with_fields(Event::TempDirCreated, &[("path", "/tmp/.chunkshuf-x")]);
//!
//! let scope = ObservationScope::new("MERGE");
//! // ... do work ...
//! scope.complete();
//! ```

mod events;
mod logger;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use scope::{ObservationScope, Timer};

fn event_severity(event: Event) -> Severity {
    if event.is_fatal() {
        Severity::Fatal
    } else {
        Severity::Info
    }
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event_severity(event), event.as_str(), fields);
}

/// Log a per-chunk event at TRACE
pub fn trace_event(event: Event, fields: &[(&str, &str)]) {
    Logger::trace(event.as_str(), fields);
}
