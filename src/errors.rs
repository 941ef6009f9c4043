//! # Sync Errors
//!
//! Error types shared by the mapper, client and reconciler.
//!
//! Every failure is returned as a value. Nothing in the core retries, and
//! nothing aborts the process.

use thiserror::Error;

/// Result type for sync operations
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors produced while reconciling against the remote store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    // ==================
    // Exchange Errors
    // ==================

    /// The HTTP exchange could not complete (network, TLS, timeout, unreadable body)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Desired state could not be encoded to the wire format
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Response body did not decode, or the ETag header was missing
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Conditional write rejected: remote state moved past the supplied token
    #[error("Concurrency conflict: remote configuration no longer matches etag {expected}")]
    Conflict { expected: String },

    /// Remote store answered with a non-success status that is not a conflict
    #[error("Remote store rejected request with status {status}: {body}")]
    RemoteRejected { status: u16, body: String },

    // ==================
    // Local Errors
    // ==================

    /// Bearer token could not be obtained
    #[error("Credential error: {0}")]
    Credential(String),

    /// Client configuration is unusable
    #[error("Configuration error: {0}")]
    Config(String),

    /// Caller passed arguments that cannot produce a valid request
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl SyncError {
    /// Stable machine-readable code for this error
    pub fn code(&self) -> &'static str {
        match self {
            SyncError::Transport(_) => "RCSYNC_TRANSPORT",
            SyncError::Serialization(_) => "RCSYNC_SERIALIZATION",
            SyncError::MalformedResponse(_) => "RCSYNC_MALFORMED_RESPONSE",
            SyncError::Conflict { .. } => "RCSYNC_CONFLICT",
            SyncError::RemoteRejected { .. } => "RCSYNC_REMOTE_REJECTED",
            SyncError::Credential(_) => "RCSYNC_CREDENTIAL",
            SyncError::Config(_) => "RCSYNC_CONFIG",
            SyncError::InvalidInput(_) => "RCSYNC_INVALID_INPUT",
        }
    }

    /// True when a conditional write lost the race
    pub fn is_conflict(&self) -> bool {
        matches!(self, SyncError::Conflict { .. })
    }

    /// Whether the caller should refresh before deciding to try again.
    ///
    /// Only a conflict means the local view is stale; every other error leaves
    /// the caller's last observed token as good as it was.
    pub fn should_refresh(&self) -> bool {
        self.is_conflict()
    }

    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        SyncError::MalformedResponse(msg.into())
    }

    pub(crate) fn transport(msg: impl Into<String>) -> Self {
        SyncError::Transport(msg.into())
    }

    pub(crate) fn credential(msg: impl Into<String>) -> Self {
        SyncError::Credential(msg.into())
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(e: serde_json::Error) -> Self {
        SyncError::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_distinct() {
        let errors = vec![
            SyncError::Transport("x".into()),
            SyncError::Serialization("x".into()),
            SyncError::MalformedResponse("x".into()),
            SyncError::Conflict { expected: "e".into() },
            SyncError::RemoteRejected { status: 400, body: String::new() },
            SyncError::Credential("x".into()),
            SyncError::Config("x".into()),
            SyncError::InvalidInput("x".into()),
        ];
        let mut codes: Vec<_> = errors.iter().map(|e| e.code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_only_conflict_asks_for_refresh() {
        assert!(SyncError::Conflict { expected: "etag-1".into() }.should_refresh());
        assert!(!SyncError::malformed("no etag").should_refresh());
        assert!(!SyncError::transport("timeout").should_refresh());
    }

    #[test]
    fn test_conflict_message_names_token() {
        let err = SyncError::Conflict { expected: "etag-7".into() };
        assert!(err.to_string().contains("etag-7"));
    }
}
