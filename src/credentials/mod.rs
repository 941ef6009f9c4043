//! # Credential Providers
//!
//! Every store request carries `Authorization: Bearer {token}`. A
//! [`CredentialProvider`] produces that token, using the client's own
//! transport when it has to talk to an identity service.
//!
//! Failures are returned as [`SyncError::Credential`]; a bad key never
//! aborts the process.

mod service_account;

pub use service_account::{ServiceAccount, ServiceAccountKey, CLOUD_PLATFORM_SCOPE};

use crate::errors::{SyncError, SyncResult};
use crate::transport::Transport;

/// Source of short-lived bearer tokens
pub trait CredentialProvider: Send + Sync {
    fn bearer_token(&self, transport: &dyn Transport) -> SyncResult<String>;
}

/// A pre-minted access token (e.g. from `gcloud auth print-access-token`)
#[derive(Clone)]
pub struct StaticToken {
    token: String,
}

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

// Keep the token out of debug output.
impl std::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticToken").field("token", &"[REDACTED]").finish()
    }
}

impl CredentialProvider for StaticToken {
    fn bearer_token(&self, _transport: &dyn Transport) -> SyncResult<String> {
        let token = self.token.trim();
        if token.is_empty() {
            return Err(SyncError::credential("access token is empty"));
        }
        Ok(token.to_string())
    }
}
