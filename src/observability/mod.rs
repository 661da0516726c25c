//! Observability for emberdb
//!
//! Structured JSON-line logging and typed lifecycle events.
//!
//! # Principles
//!
//! 1. Observability is read-only: no side effects on execution
//! 2. No async or background threads
//! 3. Logging failures are swallowed, never surfaced
//!
//! # Usage
//!
//! ```ignore
//! use emberdb::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::DocumentAppended, &[("id", "doc-1"), ("offset", "0")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    let severity = if event.is_warning() {
        Severity::Warn
    } else {
        Severity::Info
    };
    Logger::log(severity, event.as_str(), fields);
}
