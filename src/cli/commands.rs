//! CLI command implementations
//!
//! Each command reads local files, asks the [`Reconciler`] for exactly one
//! transition, and persists the result.
//! A failed operation never rewrites the state file.

use std::fs;
use std::path::Path;

use crate::client::RemoteStoreClient;
use crate::config::ClientConfig;
use crate::model::ConfigurationDocument;
use crate::observability::{self, log_event_with_fields, Event};
use crate::reconciler::Reconciler;

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{read_desired, read_state, write_error, write_response, write_state};

/// Main CLI entry point
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    let result = match &cmd {
        // Discard never talks to the store, so credentials are not loaded.
        Command::Discard { config, state } => load_config(config).and_then(|_| discard(state)),
        _ => connect(cmd.config_path()).and_then(|client| dispatch(&client, &cmd)),
    };

    match result {
        Ok(doc) => write_response(serde_json::to_value(&doc)?),
        Err(e) => {
            write_error(e.code_str(), e.message())?;
            Err(e)
        }
    }
}

fn dispatch(client: &RemoteStoreClient, cmd: &Command) -> CliResult<ConfigurationDocument> {
    match cmd {
        Command::Init {
            desired,
            state,
            project,
            ..
        } => init(client, desired, state, project.as_deref()),
        Command::Refresh { state, .. } => refresh(client, state),
        Command::Import { id, state, .. } => import(client, id, state),
        Command::Update { desired, state, .. } => update(client, desired, state),
        Command::Discard { state, .. } => discard(state),
    }
}

/// Loads the client configuration and sets up logging
pub fn load_config(config_path: &Path) -> CliResult<ClientConfig> {
    let config = ClientConfig::load(config_path)?;
    observability::init(config.severity()?);
    log_event_with_fields(
        Event::ConfigLoaded,
        &[
            ("config", &config_path.display().to_string()),
            ("endpoint", &config.endpoint),
        ],
    );
    Ok(config)
}

/// Loads the configuration and builds the client, reading credentials
pub fn connect(config_path: &Path) -> CliResult<RemoteStoreClient> {
    let config = load_config(config_path)?;
    Ok(config.build_client()?)
}

/// Publishes the desired file unconditionally and creates the state file
pub fn init(
    client: &RemoteStoreClient,
    desired_path: &Path,
    state_path: &Path,
    project: Option<&str>,
) -> CliResult<ConfigurationDocument> {
    if state_path.exists() {
        return Err(CliError::already_initialized(&state_path.display().to_string()));
    }
    let desired = read_desired(desired_path)?;
    let project_id = project.unwrap_or(desired.project_id.as_str()).to_string();
    if project_id.is_empty() {
        return Err(CliError::config_error(
            "no project id: pass --project or set project_id in the desired file",
        ));
    }

    let doc = Reconciler::new(client).initialize(&project_id, &desired)?;
    write_state(state_path, &doc)?;
    Ok(doc)
}

/// Replaces the state file with what the store currently holds
pub fn refresh(client: &RemoteStoreClient, state_path: &Path) -> CliResult<ConfigurationDocument> {
    let state = read_state(state_path)?;
    let known_id = state.id.as_deref().unwrap_or("");

    let doc = Reconciler::new(client).refresh(&state.project_id, known_id)?;
    write_state(state_path, &doc)?;
    Ok(doc)
}

/// Creates the state file from existing remote state
pub fn import(
    client: &RemoteStoreClient,
    id: &str,
    state_path: &Path,
) -> CliResult<ConfigurationDocument> {
    if state_path.exists() {
        return Err(CliError::already_initialized(&state_path.display().to_string()));
    }
    let doc = Reconciler::new(client).import(id)?;
    write_state(state_path, &doc)?;
    Ok(doc)
}

/// Publishes the desired file using the etag stored in the state file
pub fn update(
    client: &RemoteStoreClient,
    desired_path: &Path,
    state_path: &Path,
) -> CliResult<ConfigurationDocument> {
    let state = read_state(state_path)?;
    let token = state.concurrency_token().ok_or_else(|| {
        CliError::not_initialized("state has no etag. Run 'rcsync refresh' first.")
    })?;

    let mut desired = read_desired(desired_path)?;
    if !desired.project_id.is_empty() && desired.project_id != state.project_id {
        return Err(CliError::config_error(format!(
            "desired project '{}' does not match state project '{}'",
            desired.project_id, state.project_id
        )));
    }
    desired.id = state.id.clone();

    let doc = Reconciler::new(client).update(&state.project_id, &desired, token)?;
    write_state(state_path, &doc)?;
    Ok(doc)
}

/// Removes the state file. No request is made to the store.
pub fn discard(state_path: &Path) -> CliResult<ConfigurationDocument> {
    let state = read_state(state_path)?;
    Reconciler::discard(state.clone());
    fs::remove_file(state_path)?;
    Ok(state)
}
