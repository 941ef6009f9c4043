//! Local file and stdout handling for the CLI
//!
//! - State and desired files are JSON
//! - State is written to a sibling temp file and renamed into place
//! - Output: single JSON object on stdout

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use serde_json::Value;

use super::errors::{CliError, CliResult};
use crate::model::ConfigurationDocument;

/// Reads the desired configuration declaration
pub fn read_desired(path: &Path) -> CliResult<ConfigurationDocument> {
    let content = fs::read_to_string(path).map_err(|e| {
        CliError::config_error(format!("cannot read desired file {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        CliError::config_error(format!("invalid desired file {}: {}", path.display(), e))
    })
}

/// Reads a previously written state file
pub fn read_state(path: &Path) -> CliResult<ConfigurationDocument> {
    if !path.exists() {
        return Err(CliError::not_initialized(format!(
            "no state at {}. Run 'rcsync init' or 'rcsync import' first.",
            path.display()
        )));
    }
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| {
        CliError::not_initialized(format!("corrupt state file {}: {}", path.display(), e))
    })
}

pub fn write_state(path: &Path, doc: &ConfigurationDocument) -> CliResult<()> {
    let tmp = path.with_extension("tmp");
    let content = serde_json::to_string_pretty(doc)?;
    fs::write(&tmp, content)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "ok",
        "data": data
    });

    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, &response)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}

/// Write an error response to stdout
pub fn write_error(code: &str, message: &str) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "error",
        "code": code,
        "message": message
    });

    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, &response)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}
