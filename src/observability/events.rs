//! Observable sync events

use std::fmt;

use super::logger::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Host
    /// Client configuration loaded
    ConfigLoaded,

    // Exchange
    /// Request handed to the transport
    RequestSent,
    /// Response received from the transport
    ResponseReceived,
    /// Service-account assertion sent to the token endpoint
    CredentialExchange,

    // Operations
    /// Unconditional first write begins
    InitializeBegin,
    /// First write accepted
    InitializeComplete,
    /// Remote state read into a document
    RefreshComplete,
    /// Conditional write accepted
    UpdateComplete,
    /// Conditional write rejected because the etag moved
    ConflictDetected,
    /// Operation failed
    OperationFailed,
    /// Caller dropped its record; remote state untouched
    Discarded,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::RequestSent => "REQUEST_SENT",
            Event::ResponseReceived => "RESPONSE_RECEIVED",
            Event::CredentialExchange => "CREDENTIAL_EXCHANGE",
            Event::InitializeBegin => "INITIALIZE_BEGIN",
            Event::InitializeComplete => "INITIALIZE_COMPLETE",
            Event::RefreshComplete => "REFRESH_COMPLETE",
            Event::UpdateComplete => "UPDATE_COMPLETE",
            Event::ConflictDetected => "CONFLICT_DETECTED",
            Event::OperationFailed => "OPERATION_FAILED",
            Event::Discarded => "DISCARDED",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Event::RequestSent | Event::ResponseReceived => Severity::Trace,
            Event::ConflictDetected => Severity::Warn,
            Event::OperationFailed => Severity::Error,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
