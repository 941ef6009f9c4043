//! Client configuration
//!
//! Loaded from a JSON file by the host:
//!
//! ```json
//! {
//!   "endpoint": "https://firebaseremoteconfig.googleapis.com",
//!   "credentials": { "service_account_file": "/secrets/deployer.json" },
//!   "timeouts": { "request_secs": 15, "connect_secs": 30, "read_secs": 10 },
//!   "log_level": "info"
//! }
//! ```
//!
//! `RCSYNC_ENDPOINT` overrides `endpoint`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::client::RemoteStoreClient;
use crate::credentials::{CredentialProvider, ServiceAccount, StaticToken};
use crate::errors::{SyncError, SyncResult};
use crate::observability::Severity;
use crate::transport::UreqTransport;

pub const ENDPOINT_ENV: &str = "RCSYNC_ENDPOINT";

/// Where bearer tokens come from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialSource {
    /// Pre-minted access token
    AccessToken(String),
    /// Path to a service-account JSON key
    ServiceAccountFile(PathBuf),
    /// Service-account JSON key inline
    ServiceAccountJson(String),
}

impl CredentialSource {
    /// Builds the provider, reading the key file if needed
    pub fn provider(&self) -> SyncResult<Box<dyn CredentialProvider>> {
        match self {
            CredentialSource::AccessToken(token) => Ok(Box::new(StaticToken::new(token.clone()))),
            CredentialSource::ServiceAccountJson(blob) => {
                Ok(Box::new(ServiceAccount::from_json(blob)?))
            }
            CredentialSource::ServiceAccountFile(path) => {
                let blob = fs::read_to_string(path).map_err(|e| {
                    SyncError::credential(format!(
                        "cannot read service account file {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                Ok(Box::new(ServiceAccount::from_json(&blob)?))
            }
        }
    }
}

/// HTTP timeouts in seconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Whole request, including body transfer (default: 15)
    #[serde(default = "default_request_secs")]
    pub request_secs: u64,

    /// TCP connect (default: 30)
    #[serde(default = "default_connect_secs")]
    pub connect_secs: u64,

    /// Individual socket reads, i.e. waiting for response headers (default: 10)
    #[serde(default = "default_read_secs")]
    pub read_secs: u64,
}

fn default_request_secs() -> u64 {
    15
}

fn default_connect_secs() -> u64 {
    30
}

fn default_read_secs() -> u64 {
    10
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: default_request_secs(),
            connect_secs: default_connect_secs(),
            read_secs: default_read_secs(),
        }
    }
}

/// Remote store client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the remote config API
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    pub credentials: CredentialSource,

    #[serde(default)]
    pub timeouts: TimeoutConfig,

    /// Minimum log severity: trace, info, warn, error
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_endpoint() -> String {
    "https://firebaseremoteconfig.googleapis.com".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl ClientConfig {
    pub fn with_access_token(token: impl Into<String>) -> Self {
        Self {
            endpoint: default_endpoint(),
            credentials: CredentialSource::AccessToken(token.into()),
            timeouts: TimeoutConfig::default(),
            log_level: default_log_level(),
        }
    }

    /// Reads, applies the environment override, and validates
    pub fn load(path: &Path) -> SyncResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            SyncError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let mut config: ClientConfig = serde_json::from_str(&content).map_err(|e| {
            SyncError::Config(format!("invalid config {}: {}", path.display(), e))
        })?;

        config.apply_endpoint_override(std::env::var(ENDPOINT_ENV).ok());
        config.validate()?;
        Ok(config)
    }

    /// Replaces the endpoint with a non-blank override
    pub fn apply_endpoint_override(&mut self, endpoint: Option<String>) {
        if let Some(endpoint) = endpoint.filter(|e| !e.trim().is_empty()) {
            self.endpoint = endpoint;
        }
    }

    /// Trims a trailing `/` from the endpoint and checks the scheme and log level
    pub fn validate(&mut self) -> SyncResult<()> {
        let endpoint = self.endpoint.trim().trim_end_matches('/').to_string();
        if endpoint.is_empty() {
            return Err(SyncError::Config("endpoint must not be empty".into()));
        }
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(SyncError::Config(format!(
                "endpoint must be an http(s) URL, got '{}'",
                endpoint
            )));
        }
        self.endpoint = endpoint;

        self.severity()?;
        Ok(())
    }

    pub fn severity(&self) -> SyncResult<Severity> {
        Severity::parse(&self.log_level)
            .ok_or_else(|| SyncError::Config(format!("unknown log level '{}'", self.log_level)))
    }

    /// Builds a client over the blocking HTTP transport
    pub fn build_client(&self) -> SyncResult<RemoteStoreClient> {
        let credentials = self.credentials.provider()?;
        let transport = UreqTransport::new(&self.timeouts);
        Ok(RemoteStoreClient::new(
            self.endpoint.clone(),
            Box::new(transport),
            credentials,
        ))
    }
}
