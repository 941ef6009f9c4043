//! In-process transports
//!
//! [`MemoryRemoteStore`] speaks the remote-config protocol against an
//! in-memory map: it checks `If-Match`, issues a fresh ETag and version on
//! every accepted write, and answers `412` when the precondition fails.
//! [`ScriptedTransport`] replays canned responses in order.
//!
//! Both record every request they receive.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde_json::json;

use super::{HttpRequest, HttpResponse, Method, Transport};
use crate::client::WILDCARD_TOKEN;
use crate::errors::{SyncError, SyncResult};
use crate::wire::{RemoteConfigRead, RemoteConfigUpdate, WireUpdateUser, WireVersion};

const DEFAULT_PUBLISHER: &str = "service-account@rcsync.local";

#[derive(Debug, Clone)]
struct StoredConfig {
    content: RemoteConfigUpdate,
    version: u64,
    etag: String,
    update_time: DateTime<Utc>,
    update_type: &'static str,
    update_user: String,
}

impl StoredConfig {
    fn to_read(&self) -> RemoteConfigRead {
        let mut read = RemoteConfigRead::from(self.content.clone());
        read.version = WireVersion {
            version_number: self.version.to_string(),
            update_time: Some(self.update_time),
            update_user: Some(WireUpdateUser {
                email: self.update_user.clone(),
            }),
            update_origin: "REST_API".to_string(),
            update_type: self.update_type.to_string(),
        };
        read
    }
}

/// In-memory remote configuration store
#[derive(Debug)]
pub struct MemoryRemoteStore {
    projects: Mutex<BTreeMap<String, StoredConfig>>,
    requests: Mutex<Vec<HttpRequest>>,
    publisher: String,
}

impl Default for MemoryRemoteStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRemoteStore {
    pub fn new() -> Self {
        Self {
            projects: Mutex::new(BTreeMap::new()),
            requests: Mutex::new(Vec::new()),
            publisher: DEFAULT_PUBLISHER.to_string(),
        }
    }

    /// Publishes `content` out of band (as another writer would) and returns the new ETag
    pub fn seed(&self, project_id: &str, content: RemoteConfigUpdate) -> SyncResult<String> {
        let mut projects = self.lock_projects()?;
        let stored = Self::commit(
            &mut projects,
            project_id,
            content,
            "INCREMENTAL_UPDATE",
            "console@rcsync.local",
        );
        Ok(stored.etag)
    }

    pub fn current_etag(&self, project_id: &str) -> Option<String> {
        self.projects
            .lock()
            .ok()
            .and_then(|p| p.get(project_id).map(|s| s.etag.clone()))
    }

    pub fn current_version(&self, project_id: &str) -> Option<u64> {
        self.projects
            .lock()
            .ok()
            .and_then(|p| p.get(project_id).map(|s| s.version))
    }

    pub fn content(&self, project_id: &str) -> Option<RemoteConfigUpdate> {
        self.projects
            .lock()
            .ok()
            .and_then(|p| p.get(project_id).map(|s| s.content.clone()))
    }

    /// Every request received so far, oldest first
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    fn lock_projects(
        &self,
    ) -> SyncResult<std::sync::MutexGuard<'_, BTreeMap<String, StoredConfig>>> {
        self.projects
            .lock()
            .map_err(|_| SyncError::transport("memory store lock poisoned"))
    }

    fn commit(
        projects: &mut BTreeMap<String, StoredConfig>,
        project_id: &str,
        content: RemoteConfigUpdate,
        update_type: &'static str,
        update_user: &str,
    ) -> StoredConfig {
        let version = projects.get(project_id).map_or(1, |s| s.version + 1);
        let stored = StoredConfig {
            content,
            version,
            etag: format!("etag-{}-{}", project_id, version),
            update_time: Utc::now(),
            update_type,
            update_user: update_user.to_string(),
        };
        projects.insert(project_id.to_string(), stored.clone());
        stored
    }

    fn handle_get(&self, project_id: &str) -> SyncResult<HttpResponse> {
        let projects = self.lock_projects()?;
        match projects.get(project_id) {
            Some(stored) => ok_response(stored),
            None => Ok(error_response(404, "NOT_FOUND", "Remote config not found")),
        }
    }

    fn handle_put(&self, project_id: &str, request: &HttpRequest) -> SyncResult<HttpResponse> {
        let if_match = match request.headers.get("If-Match") {
            Some(v) if !v.is_empty() => v.to_string(),
            _ => {
                return Ok(error_response(
                    400,
                    "FAILED_PRECONDITION",
                    "If-Match header is required",
                ))
            }
        };

        let content: RemoteConfigUpdate =
            match serde_json::from_str(request.body.as_deref().unwrap_or("")) {
                Ok(content) => content,
                Err(e) => {
                    return Ok(error_response(
                        400,
                        "INVALID_ARGUMENT",
                        &format!("Invalid remote config: {}", e),
                    ))
                }
            };

        let mut projects = self.lock_projects()?;
        let forced = if_match == WILDCARD_TOKEN;
        let matches = forced
            || projects
                .get(project_id)
                .map_or(false, |stored| stored.etag == if_match);
        if !matches {
            return Ok(error_response(
                412,
                "FAILED_PRECONDITION",
                "ETag does not match the current remote config version",
            ));
        }

        let update_type = if forced { "FORCED_UPDATE" } else { "INCREMENTAL_UPDATE" };
        let stored = Self::commit(
            &mut projects,
            project_id,
            content,
            update_type,
            &self.publisher,
        );
        ok_response(&stored)
    }
}

impl Transport for MemoryRemoteStore {
    fn execute(&self, request: &HttpRequest) -> SyncResult<HttpResponse> {
        self.requests
            .lock()
            .map_err(|_| SyncError::transport("memory store lock poisoned"))?
            .push(request.clone());

        let project_id = match project_from_url(&request.url) {
            Some(project_id) => project_id,
            None => return Ok(error_response(404, "NOT_FOUND", "Unknown resource")),
        };

        let authorized = request
            .headers
            .get("Authorization")
            .and_then(|v| v.strip_prefix("Bearer "))
            .map_or(false, |token| !token.is_empty());
        if !authorized {
            return Ok(error_response(401, "UNAUTHENTICATED", "Missing bearer token"));
        }

        match request.method {
            Method::Get => self.handle_get(&project_id),
            Method::Put => self.handle_put(&project_id, request),
            Method::Post => Ok(error_response(405, "METHOD_NOT_ALLOWED", "Unsupported method")),
        }
    }
}

/// Extracts `{project}` from `.../v1/projects/{project}/remoteConfig`
fn project_from_url(url: &str) -> Option<String> {
    let rest = url.split_once("/v1/projects/")?.1;
    let project_id = rest.strip_suffix("/remoteConfig")?;
    if project_id.is_empty() || project_id.contains('/') {
        return None;
    }
    Some(project_id.to_string())
}

fn ok_response(stored: &StoredConfig) -> SyncResult<HttpResponse> {
    let body = serde_json::to_string(&stored.to_read())?;
    Ok(HttpResponse::new(200, body)
        .with_header("Content-Type", "application/json; charset=UTF-8")
        .with_header("ETag", stored.etag.clone()))
}

fn error_response(status: u16, code: &str, message: &str) -> HttpResponse {
    let body = json!({
        "error": {
            "code": status,
            "message": message,
            "status": code,
        }
    });
    HttpResponse::new(status, body.to_string())
        .with_header("Content-Type", "application/json; charset=UTF-8")
}

/// Replays queued responses in order and records requests
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<SyncResult<HttpResponse>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(self, response: HttpResponse) -> Self {
        self.push(Ok(response));
        self
    }

    pub fn with_error(self, error: SyncError) -> Self {
        self.push(Err(error));
        self
    }

    pub fn push(&self, outcome: SyncResult<HttpResponse>) {
        if let Ok(mut queue) = self.responses.lock() {
            queue.push_back(outcome);
        }
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Number of queued responses not yet consumed
    pub fn remaining(&self) -> usize {
        self.responses.lock().map(|r| r.len()).unwrap_or(0)
    }
}

impl Transport for ScriptedTransport {
    fn execute(&self, request: &HttpRequest) -> SyncResult<HttpResponse> {
        self.requests
            .lock()
            .map_err(|_| SyncError::transport("scripted transport lock poisoned"))?
            .push(request.clone());

        self.responses
            .lock()
            .map_err(|_| SyncError::transport("scripted transport lock poisoned"))?
            .pop_front()
            .unwrap_or_else(|| {
                Err(SyncError::transport(format!(
                    "no scripted response for {} {}",
                    request.method, request.url
                )))
            })
    }
}
