//! CLI-specific error types
//!
//! Sync failures keep their own code so scripts can branch on
//! `RCSYNC_CONFLICT` and friends.

use std::fmt;
use std::io;

use crate::errors::SyncError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file or arguments unusable
    ConfigError,
    /// Reading or writing local files failed
    IoError,
    /// A state file already exists
    AlreadyInitialized,
    /// No usable state file
    NotInitialized,
    /// The sync operation failed; carries the sync error code
    Sync(&'static str),
}

impl CliErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "RCSYNC_CLI_CONFIG_ERROR",
            Self::IoError => "RCSYNC_CLI_IO_ERROR",
            Self::AlreadyInitialized => "RCSYNC_CLI_ALREADY_INITIALIZED",
            Self::NotInitialized => "RCSYNC_CLI_NOT_INITIALIZED",
            Self::Sync(code) => *code,
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn already_initialized(state: &str) -> Self {
        Self::new(
            CliErrorCode::AlreadyInitialized,
            format!("State file {} already exists. Use 'rcsync refresh' or remove it.", state),
        )
    }

    pub fn not_initialized(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::NotInitialized, msg)
    }

    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<SyncError> for CliError {
    fn from(e: SyncError) -> Self {
        match e {
            SyncError::Config(msg) => Self::config_error(msg),
            other => Self::new(CliErrorCode::Sync(other.code()), other.to_string()),
        }
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_error_keeps_code() {
        let err = CliError::from(SyncError::Conflict { expected: "e1".into() });
        assert_eq!(err.code_str(), "RCSYNC_CONFLICT");
        assert!(err.to_string().contains("e1"));
    }

    #[test]
    fn test_sync_config_error_maps_to_config_code() {
        let err = CliError::from(SyncError::Config("bad endpoint".into()));
        assert_eq!(err.code(), &CliErrorCode::ConfigError);
    }
}
