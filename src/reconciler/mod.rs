//! # Reconciler
//!
//! State transitions for one project's remote configuration:
//!
//! ```text
//! Uninitialized --initialize--> Live
//! Live --refresh--> Live
//! Live --update(token)--> Live     (ConflictError if token is stale)
//! Live --discard--> Discarded      (no remote call, no client)
//! ```
//!
//! ## Invariants
//! - Each operation performs at most one store request and never retries.
//! - The wildcard token is only ever sent by `initialize`.
//! - Revisions come from server responses only.
//! - On error the caller's document is untouched; operations borrow the input
//!   and return a new document.

use uuid::Uuid;

use crate::client::{IfMatch, Observed, RemoteStoreClient, WILDCARD_TOKEN};
use crate::errors::{SyncError, SyncResult};
use crate::mapper;
use crate::model::ConfigurationDocument;
use crate::observability::{log_event_with_fields, Event};

pub struct Reconciler<'a> {
    client: &'a RemoteStoreClient,
}

impl<'a> Reconciler<'a> {
    pub fn new(client: &'a RemoteStoreClient) -> Self {
        Self { client }
    }

    /// Publishes `desired` unconditionally and returns the live document.
    ///
    /// Destructive: whatever the store held for the project is replaced.
    /// Use [`Reconciler::import`] to adopt existing remote state instead.
    pub fn initialize(
        &self,
        project_id: &str,
        desired: &ConfigurationDocument,
    ) -> SyncResult<ConfigurationDocument> {
        require_project(project_id)?;
        let op = Uuid::new_v4().to_string();
        log_event_with_fields(Event::InitializeBegin, &[("op", &op), ("project", project_id)]);

        let payload = mapper::to_wire(desired);
        let observed = self
            .client
            .publish(project_id, &payload, &IfMatch::Any)
            .map_err(|e| failed(&op, "initialize", project_id, e))?;

        let doc = written_document(project_id, desired, observed);
        log_event_with_fields(
            Event::InitializeComplete,
            &[
                ("etag", doc.concurrency_token().unwrap_or("")),
                ("op", &op),
                ("project", project_id),
                ("version", doc.version_number().unwrap_or("")),
            ],
        );
        Ok(doc)
    }

    /// Reads remote state into a fresh document.
    ///
    /// `known_id` is kept as the document id. An empty `project_id` falls back
    /// to `known_id` (the import path).
    pub fn refresh(&self, project_id: &str, known_id: &str) -> SyncResult<ConfigurationDocument> {
        let project_id = if project_id.is_empty() { known_id } else { project_id };
        require_project(project_id)?;
        let op = Uuid::new_v4().to_string();

        let observed = self
            .client
            .fetch(project_id)
            .map_err(|e| failed(&op, "refresh", project_id, e))?;

        let mut doc = mapper::from_wire(project_id, &observed.body);
        doc.id = Some(if known_id.is_empty() { project_id } else { known_id }.to_string());
        doc.revision = Some(observed.revision);

        log_event_with_fields(
            Event::RefreshComplete,
            &[
                ("etag", doc.concurrency_token().unwrap_or("")),
                ("op", &op),
                ("parameters", &doc.parameters.len().to_string()),
                ("project", project_id),
                ("version", doc.version_number().unwrap_or("")),
            ],
        );
        Ok(doc)
    }

    /// Adopts existing remote state for a project without writing to it
    pub fn import(&self, id: &str) -> SyncResult<ConfigurationDocument> {
        self.refresh("", id)
    }

    /// Publishes `desired` only if the remote etag still equals `current_token`
    pub fn update(
        &self,
        project_id: &str,
        desired: &ConfigurationDocument,
        current_token: &str,
    ) -> SyncResult<ConfigurationDocument> {
        require_project(project_id)?;
        if current_token.is_empty() {
            return Err(SyncError::InvalidInput(
                "update requires the last observed concurrency token".into(),
            ));
        }
        if current_token == WILDCARD_TOKEN {
            return Err(SyncError::InvalidInput(
                "the wildcard token is reserved for initialize".into(),
            ));
        }
        let op = Uuid::new_v4().to_string();

        let payload = mapper::to_wire(desired);
        let observed = match self.client.publish(
            project_id,
            &payload,
            &IfMatch::Token(current_token.to_string()),
        ) {
            Ok(observed) => observed,
            Err(err) if err.is_conflict() => {
                log_event_with_fields(
                    Event::ConflictDetected,
                    &[("etag", current_token), ("op", &op), ("project", project_id)],
                );
                return Err(err);
            }
            Err(err) => return Err(failed(&op, "update", project_id, err)),
        };

        let mut doc = written_document(project_id, desired, observed);
        if let Some(id) = &desired.id {
            doc.id = Some(id.clone());
        }
        log_event_with_fields(
            Event::UpdateComplete,
            &[
                ("etag", doc.concurrency_token().unwrap_or("")),
                ("op", &op),
                ("previous_etag", current_token),
                ("project", project_id),
                ("version", doc.version_number().unwrap_or("")),
            ],
        );
        Ok(doc)
    }

    /// Drops the caller's record. The remote configuration is left as is,
    /// so no client is needed.
    pub fn discard(doc: ConfigurationDocument) {
        log_event_with_fields(
            Event::Discarded,
            &[
                ("etag", doc.concurrency_token().unwrap_or("")),
                ("project", &doc.project_id),
            ],
        );
    }
}

fn require_project(project_id: &str) -> SyncResult<()> {
    if project_id.trim().is_empty() {
        return Err(SyncError::InvalidInput("project id must not be empty".into()));
    }
    Ok(())
}

/// Desired content in canonical order, stamped with the server's revision
fn written_document(
    project_id: &str,
    desired: &ConfigurationDocument,
    observed: Observed,
) -> ConfigurationDocument {
    let mut doc = mapper::canonicalize(desired);
    doc.id = Some(project_id.to_string());
    doc.project_id = project_id.to_string();
    doc.revision = Some(observed.revision);
    doc.version_metadata = None;
    doc
}

fn failed(op: &str, operation: &str, project_id: &str, err: SyncError) -> SyncError {
    let message = err.to_string();
    log_event_with_fields(
        Event::OperationFailed,
        &[
            ("code", err.code()),
            ("error", &message),
            ("op", op),
            ("operation", operation),
            ("project", project_id),
        ],
    );
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::StaticToken;
    use crate::model::Parameter;
    use crate::transport::{HttpResponse, MemoryRemoteStore, ScriptedTransport};
    use std::sync::Arc;

    fn memory_client(store: Arc<MemoryRemoteStore>) -> RemoteStoreClient {
        RemoteStoreClient::new(
            "http://store.test",
            Box::new(store),
            Box::new(StaticToken::new("tok")),
        )
    }

    fn desired() -> ConfigurationDocument {
        ConfigurationDocument::new("demo")
            .with_parameter(Parameter::new("b_flag", "b", "BOOLEAN", "true"))
            .with_parameter(Parameter::new("A_flag", "a", "STRING", "x"))
    }

    #[test]
    fn test_initialize_sends_wildcard_and_sorts() {
        let store = Arc::new(MemoryRemoteStore::new());
        let client = memory_client(store.clone());

        let doc = Reconciler::new(&client).initialize("demo", &desired()).unwrap();

        assert_eq!(doc.id.as_deref(), Some("demo"));
        assert_eq!(doc.concurrency_token(), Some("etag-demo-1"));
        assert_eq!(doc.version_number(), Some("1"));
        assert_eq!(doc.parameters[0].name, "A_flag");
        assert_eq!(store.requests()[0].headers.get("If-Match"), Some("*"));
    }

    #[test]
    fn test_initialize_rejects_empty_project() {
        let store = Arc::new(MemoryRemoteStore::new());
        let client = memory_client(store.clone());
        let err = Reconciler::new(&client).initialize(" ", &desired()).unwrap_err();
        assert!(matches!(err, SyncError::InvalidInput(_)));
        assert!(store.requests().is_empty());
    }

    #[test]
    fn test_update_refuses_wildcard_token() {
        let store = Arc::new(MemoryRemoteStore::new());
        let client = memory_client(store.clone());
        let err = Reconciler::new(&client).update("demo", &desired(), "*").unwrap_err();
        assert!(matches!(err, SyncError::InvalidInput(_)));
        assert!(store.requests().is_empty());
    }

    #[test]
    fn test_update_refuses_empty_token() {
        let store = Arc::new(MemoryRemoteStore::new());
        let client = memory_client(store);
        let err = Reconciler::new(&client).update("demo", &desired(), "").unwrap_err();
        assert!(matches!(err, SyncError::InvalidInput(_)));
    }

    #[test]
    fn test_refresh_keeps_known_id() {
        let store = Arc::new(MemoryRemoteStore::new());
        let client = memory_client(store);
        let reconciler = Reconciler::new(&client);
        reconciler.initialize("demo", &desired()).unwrap();

        let doc = reconciler.refresh("demo", "tracked-id").unwrap();
        assert_eq!(doc.id.as_deref(), Some("tracked-id"));
        assert_eq!(doc.project_id, "demo");
        assert!(doc.version_metadata.is_some());
    }

    #[test]
    fn test_import_uses_id_as_project() {
        let store = Arc::new(MemoryRemoteStore::new());
        let client = memory_client(store);
        let reconciler = Reconciler::new(&client);
        reconciler.initialize("demo", &desired()).unwrap();

        let doc = reconciler.import("demo").unwrap();
        assert_eq!(doc.project_id, "demo");
        assert_eq!(doc.id.as_deref(), Some("demo"));
        assert_eq!(doc.parameters.len(), 2);
    }

    #[test]
    fn test_update_without_etag_is_malformed() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .with_response(HttpResponse::new(200, r#"{"version":{"versionNumber":"2"}}"#)),
        );
        let client = RemoteStoreClient::new(
            "http://store.test",
            Box::new(transport),
            Box::new(StaticToken::new("tok")),
        );
        let err = Reconciler::new(&client).update("demo", &desired(), "etag-1").unwrap_err();
        assert!(matches!(err, SyncError::MalformedResponse(_)));
    }

    #[test]
    fn test_discard_makes_no_request() {
        let store = Arc::new(MemoryRemoteStore::new());
        let client = memory_client(store.clone());
        let reconciler = Reconciler::new(&client);
        let doc = reconciler.initialize("demo", &desired()).unwrap();
        let before = store.requests().len();

        Reconciler::discard(doc);
        assert_eq!(store.requests().len(), before);
        assert_eq!(store.current_version("demo"), Some(1));
    }
}
