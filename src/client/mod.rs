//! # Remote Store Client
//!
//! An explicit value holding the transport, the credential provider and the
//! endpoint. Constructed once by the host and lent to a
//! [`Reconciler`](crate::reconciler::Reconciler).
//!
//! ## Protocol
//! - `GET  {endpoint}/v1/projects/{project}/remoteConfig`
//! - `PUT  {endpoint}/v1/projects/{project}/remoteConfig` with `If-Match`
//!
//! Successful responses must carry an `ETag` header; its absence is a
//! malformed response. `412`/`409` on a write means the precondition failed.

use crate::credentials::CredentialProvider;
use crate::errors::{SyncError, SyncResult};
use crate::model::Revision;
use crate::observability::{log_event_with_fields, Event, Logger, Severity};
use crate::transport::{HttpRequest, HttpResponse, Method, Transport};
use crate::wire::{RemoteConfigRead, RemoteConfigUpdate};

/// If-Match value that satisfies any remote state
pub const WILDCARD_TOKEN: &str = "*";

const ETAG_HEADER: &str = "ETag";

/// Precondition attached to a write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IfMatch {
    /// Overwrite whatever is there
    Any,
    /// Only write if the remote etag still equals this token
    Token(String),
}

impl IfMatch {
    pub fn header_value(&self) -> &str {
        match self {
            IfMatch::Any => WILDCARD_TOKEN,
            IfMatch::Token(token) => token,
        }
    }
}

/// Decoded body plus revision from a successful exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observed {
    pub body: RemoteConfigRead,
    pub revision: Revision,
}

pub struct RemoteStoreClient {
    endpoint: String,
    transport: Box<dyn Transport>,
    credentials: Box<dyn CredentialProvider>,
}

impl RemoteStoreClient {
    pub fn new(
        endpoint: impl Into<String>,
        transport: Box<dyn Transport>,
        credentials: Box<dyn CredentialProvider>,
    ) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            transport,
            credentials,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn remote_config_url(&self, project_id: &str) -> String {
        format!("{}/v1/projects/{}/remoteConfig", self.endpoint, project_id)
    }

    /// Reads the current remote configuration
    pub fn fetch(&self, project_id: &str) -> SyncResult<Observed> {
        let request = HttpRequest::new(Method::Get, self.remote_config_url(project_id));
        let response = self.send(request)?;

        if !response.is_success() {
            return Err(rejected(response));
        }
        decode_observed(&response)
    }

    /// Writes `payload` if `if_match` still holds remotely
    pub fn publish(
        &self,
        project_id: &str,
        payload: &RemoteConfigUpdate,
        if_match: &IfMatch,
    ) -> SyncResult<Observed> {
        let body = serde_json::to_string(payload)?;
        if Logger::enabled(Severity::Trace) {
            Logger::trace(
                "PUBLISH_PAYLOAD",
                &[("if_match", if_match.header_value()), ("payload", &body)],
            );
        }

        let request = HttpRequest::new(Method::Put, self.remote_config_url(project_id))
            .header("If-Match", if_match.header_value())
            .body(body);
        let response = self.send(request)?;

        match response.status {
            409 | 412 => Err(SyncError::Conflict {
                expected: if_match.header_value().to_string(),
            }),
            _ if !response.is_success() => Err(rejected(response)),
            _ => decode_observed(&response),
        }
    }

    /// Authorizes and sends exactly one request to the store
    fn send(&self, request: HttpRequest) -> SyncResult<HttpResponse> {
        let token = self.credentials.bearer_token(self.transport.as_ref())?;
        let request = request
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", token));

        log_event_with_fields(
            Event::RequestSent,
            &[("method", request.method.as_str()), ("url", &request.url)],
        );
        let response = self.transport.execute(&request)?;

        let status = response.status.to_string();
        log_event_with_fields(
            Event::ResponseReceived,
            &[
                ("etag", response.header(ETAG_HEADER).unwrap_or("")),
                ("status", &status),
                ("url", &request.url),
            ],
        );
        Ok(response)
    }
}

impl std::fmt::Debug for RemoteStoreClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteStoreClient")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

fn rejected(response: HttpResponse) -> SyncError {
    SyncError::RemoteRejected {
        status: response.status,
        body: response.body,
    }
}

// Body is decoded before the ETag check so both failures surface as malformed.
fn decode_observed(response: &HttpResponse) -> SyncResult<Observed> {
    let body: RemoteConfigRead = serde_json::from_str(&response.body).map_err(|e| {
        SyncError::malformed(format!("cannot decode remote config: {}", e))
    })?;

    let etag = response.header(ETAG_HEADER).ok_or_else(|| {
        SyncError::malformed(format!("ETag header is missing from response: {}", response.body))
    })?;

    Ok(Observed {
        revision: Revision {
            version_number: body.version.version_number.clone(),
            concurrency_token: etag.to_string(),
        },
        body,
    })
}
