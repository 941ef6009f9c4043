//! CLI host for rcsync
//!
//! Keeps the reconciled document in a local state file between invocations:
//! - init: publish desired configuration unconditionally
//! - refresh: re-read remote state into the state file
//! - import: adopt existing remote state for a project
//! - update: conditional publish using the stored etag
//! - discard: forget the state file (remote untouched)

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{connect, discard, import, init, load_config, refresh, run, run_command, update};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_desired, read_state, write_error, write_response, write_state};
