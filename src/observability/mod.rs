//! Observability for rcsync
//!
//! Structured JSON logs for every exchange with the remote store.
//! Bearer tokens and credential blobs are never logged; payload bodies
//! only at TRACE.
//!
//! ```ignore
//! use rcsync::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::RefreshComplete, &[("project", "demo"), ("version", "12")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};

/// Environment variable that overrides the configured minimum severity
pub const LOG_LEVEL_ENV: &str = "RCSYNC_LOG";

/// Sets the minimum severity, letting `RCSYNC_LOG` take precedence
pub fn init(configured: Severity) {
    let severity = std::env::var(LOG_LEVEL_ENV)
        .ok()
        .and_then(|v| Severity::parse(&v))
        .unwrap_or(configured);
    Logger::set_min_severity(severity);
}

pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}
