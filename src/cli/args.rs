//! CLI argument definitions using clap
//!
//! Commands:
//! - rcsync init --config <path> --desired <path> --state <path> [--project <id>]
//! - rcsync refresh --config <path> --state <path>
//! - rcsync import --config <path> --id <project> --state <path>
//! - rcsync update --config <path> --desired <path> --state <path>
//! - rcsync discard --config <path> --state <path>

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// rcsync - reconcile declared parameters against a remote config store
#[derive(Parser, Debug)]
#[command(name = "rcsync")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Publish the desired configuration, overwriting remote state
    Init {
        /// Path to client configuration file
        #[arg(long, default_value = "./rcsync.json")]
        config: PathBuf,

        /// Desired configuration (JSON)
        #[arg(long)]
        desired: PathBuf,

        /// State file to create
        #[arg(long, default_value = "./rcsync.state.json")]
        state: PathBuf,

        /// Project id; defaults to `project_id` in the desired file
        #[arg(long)]
        project: Option<String>,
    },

    /// Re-read remote state into the state file
    Refresh {
        #[arg(long, default_value = "./rcsync.json")]
        config: PathBuf,

        #[arg(long, default_value = "./rcsync.state.json")]
        state: PathBuf,
    },

    /// Adopt existing remote state without writing to it
    Import {
        #[arg(long, default_value = "./rcsync.json")]
        config: PathBuf,

        /// Project id to import
        #[arg(long)]
        id: String,

        #[arg(long, default_value = "./rcsync.state.json")]
        state: PathBuf,
    },

    /// Publish the desired configuration if remote state is unchanged
    Update {
        #[arg(long, default_value = "./rcsync.json")]
        config: PathBuf,

        #[arg(long)]
        desired: PathBuf,

        #[arg(long, default_value = "./rcsync.state.json")]
        state: PathBuf,
    },

    /// Forget the state file; the remote configuration is left as is
    Discard {
        #[arg(long, default_value = "./rcsync.json")]
        config: PathBuf,

        #[arg(long, default_value = "./rcsync.state.json")]
        state: PathBuf,
    },
}

impl Command {
    pub fn config_path(&self) -> &Path {
        match self {
            Command::Init { config, .. }
            | Command::Refresh { config, .. }
            | Command::Import { config, .. }
            | Command::Update { config, .. }
            | Command::Discard { config, .. } => config,
        }
    }
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
