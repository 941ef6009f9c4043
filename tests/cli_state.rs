//! CLI state-file tests
//!
//! The host persists the reconciled document between invocations. These
//! tests drive the command functions against the in-memory store.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rcsync::cli::{self, CliErrorCode};
use rcsync::credentials::StaticToken;
use rcsync::transport::{MemoryRemoteStore, Method};
use rcsync::wire::RemoteConfigUpdate;
use rcsync::RemoteStoreClient;
use serde_json::json;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup() -> (TempDir, Arc<MemoryRemoteStore>, RemoteStoreClient) {
    let tmp = TempDir::new().unwrap();
    let store = Arc::new(MemoryRemoteStore::new());
    let client = RemoteStoreClient::new(
        "http://remoteconfig.test",
        Box::new(store.clone()),
        Box::new(StaticToken::new("tok")),
    );
    (tmp, store, client)
}

fn write_desired(dir: &Path, banner: &str) -> PathBuf {
    let path = dir.join("desired.json");
    let desired = json!({
        "project_id": "demo",
        "parameters": [
            {"name": "welcome", "description": "banner", "value_type": "STRING", "default_value": banner},
            {"name": "Android_min", "description": "min build", "value_type": "NUMBER", "default_value": "42"}
        ],
        "parameter_groups": {
            "beta": {
                "description": "beta features",
                "parameters": {
                    "dark_mode": {"name": "dark_mode", "value_type": "BOOLEAN", "default_value": "false"}
                }
            }
        }
    });
    fs::write(&path, desired.to_string()).unwrap();
    path
}

// =============================================================================
// Lifecycle Tests
// =============================================================================

#[test]
fn test_init_then_update_uses_stored_etag() {
    let (tmp, store, client) = setup();
    let state = tmp.path().join("state.json");

    let desired = write_desired(tmp.path(), "hello");
    let live = cli::init(&client, &desired, &state, None).unwrap();
    assert_eq!(live.project_id, "demo");
    assert_eq!(live.parameters[0].name, "Android_min");
    assert_eq!(cli::read_state(&state).unwrap(), live);

    let desired = write_desired(tmp.path(), "hello again");
    let next = cli::update(&client, &desired, &state).unwrap();
    assert_eq!(next.version_number(), Some("2"));

    let puts: Vec<_> = store
        .requests()
        .into_iter()
        .filter(|r| r.method == Method::Put)
        .collect();
    assert_eq!(puts[0].headers.get("If-Match"), Some("*"));
    assert_eq!(puts[1].headers.get("If-Match"), Some("etag-demo-1"));
}

#[test]
fn test_init_refuses_existing_state() {
    let (tmp, _store, client) = setup();
    let state = tmp.path().join("state.json");
    let desired = write_desired(tmp.path(), "hello");

    cli::init(&client, &desired, &state, None).unwrap();
    let err = cli::init(&client, &desired, &state, None).unwrap_err();
    assert_eq!(err.code(), &CliErrorCode::AlreadyInitialized);
}

#[test]
fn test_init_project_flag_overrides_file() {
    let (tmp, store, client) = setup();
    let state = tmp.path().join("state.json");
    let desired = write_desired(tmp.path(), "hello");

    let live = cli::init(&client, &desired, &state, Some("staging")).unwrap();
    assert_eq!(live.project_id, "staging");
    assert!(store.current_etag("staging").is_some());
    assert!(store.current_etag("demo").is_none());
}

#[test]
fn test_conflict_leaves_state_file_unchanged() {
    let (tmp, store, client) = setup();
    let state = tmp.path().join("state.json");
    let desired = write_desired(tmp.path(), "hello");

    cli::init(&client, &desired, &state, None).unwrap();
    let before = fs::read_to_string(&state).unwrap();
    store.seed("demo", RemoteConfigUpdate::default()).unwrap();

    let err = cli::update(&client, &desired, &state).unwrap_err();
    assert_eq!(err.code_str(), "RCSYNC_CONFLICT");
    assert_eq!(fs::read_to_string(&state).unwrap(), before);

    // Refresh picks up the new etag; the retry then succeeds.
    let refreshed = cli::refresh(&client, &state).unwrap();
    assert_eq!(refreshed.concurrency_token(), Some("etag-demo-2"));
    let retried = cli::update(&client, &desired, &state).unwrap();
    assert_eq!(retried.version_number(), Some("3"));
}

#[test]
fn test_update_without_state_is_not_initialized() {
    let (tmp, store, client) = setup();
    let desired = write_desired(tmp.path(), "hello");

    let err = cli::update(&client, &desired, &tmp.path().join("missing.json")).unwrap_err();
    assert_eq!(err.code(), &CliErrorCode::NotInitialized);
    assert!(store.requests().is_empty());
}

#[test]
fn test_update_rejects_other_project() {
    let (tmp, _store, client) = setup();
    let state = tmp.path().join("state.json");
    let desired = write_desired(tmp.path(), "hello");
    cli::init(&client, &desired, &state, Some("staging")).unwrap();

    let err = cli::update(&client, &desired, &state).unwrap_err();
    assert_eq!(err.code(), &CliErrorCode::ConfigError);
}

#[test]
fn test_import_then_discard() {
    let (tmp, store, client) = setup();
    let state = tmp.path().join("state.json");
    store.seed("demo", RemoteConfigUpdate::default()).unwrap();

    let imported = cli::import(&client, "demo", &state).unwrap();
    assert_eq!(imported.id.as_deref(), Some("demo"));
    assert!(state.exists());

    let requests_before = store.requests().len();
    let discarded = cli::discard(&state).unwrap();
    assert_eq!(discarded, imported);
    assert!(!state.exists());
    assert_eq!(store.requests().len(), requests_before);
    assert_eq!(store.current_version("demo"), Some(1));
}

#[test]
fn test_load_config_skips_credentials_that_connect_needs() {
    let tmp = TempDir::new().unwrap();
    let config = tmp.path().join("rcsync.json");
    let key = tmp.path().join("absent-key.json");
    fs::write(
        &config,
        json!({"credentials": {"service_account_file": key.display().to_string()}}).to_string(),
    )
    .unwrap();

    assert!(cli::load_config(&config).is_ok());
    assert!(cli::connect(&config).is_err());
}
