//! Blocking HTTP transport backed by `ureq`

use std::time::Duration;

use super::{Headers, HttpRequest, HttpResponse, Transport};
use crate::config::TimeoutConfig;
use crate::errors::{SyncError, SyncResult};

/// Production transport.
///
/// One agent is built per client and reused, so connections are pooled
/// across the credential exchange and the store request.
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeouts: &TimeoutConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .timeout_connect(Duration::from_secs(timeouts.connect_secs))
            .timeout_read(Duration::from_secs(timeouts.read_secs))
            .build();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(&TimeoutConfig::default())
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> SyncResult<HttpResponse> {
        let mut call = self.agent.request(request.method.as_str(), &request.url);
        for (name, value) in request.headers.iter() {
            call = call.set(name, value);
        }

        let outcome = match &request.body {
            Some(body) => call.send_string(body),
            None => call.call(),
        };

        // ureq reports 4xx/5xx as errors; the store protocol needs them as responses.
        let response = match outcome {
            Ok(response) => response,
            Err(ureq::Error::Status(_, response)) => response,
            Err(err) => {
                return Err(SyncError::transport(format!(
                    "{} {} failed: {}",
                    request.method, request.url, err
                )))
            }
        };

        let status = response.status();
        let mut headers = Headers::new();
        for name in response.headers_names() {
            if let Some(value) = response.header(&name) {
                headers.set(name.clone(), value);
            }
        }

        let body = response.into_string().map_err(|e| {
            SyncError::transport(format!("failed to read response body: {}", e))
        })?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
