//! Clap front end for the `htconfig` binary.
//!
//! The only bridge to the core is [`Cli::into_action()`], which converts
//! clap-parsed arguments into a [`ConfigAction`](crate::ConfigAction). From
//! there, all logic flows through the clap-free
//! [`Loader::handle()`](crate::Loader::handle) API.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::types::ConfigAction;

/// Inspect agent configuration and generate config types from a schema.
#[derive(Debug, Parser)]
#[command(name = "htconfig", version)]
pub struct Cli {
    /// Load this JSON or YAML file instead of the one named by HT_CONFIG_FILE.
    #[arg(short, long, global = true)]
    pub file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show every resolved configuration key.
    Show {
        /// Print the resolved config as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Show the resolved value and documentation for a config key.
    Get {
        /// Dotted key path (e.g. "reporting.endpoint").
        key: String,
    },
    /// List the environment variables the agent reads.
    Env,
    /// Generate Rust config types from a schema file.
    Gen {
        /// Schema file (TOML).
        schema: PathBuf,
        /// Output directory. The file is named after the schema.
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Path under which generated code finds the htconfig runtime.
        #[arg(long)]
        runtime: Option<String>,
    },
}

impl Cli {
    /// Convert clap-parsed args into a framework-agnostic `ConfigAction`.
    ///
    /// A bare `htconfig` (no subcommand) maps to `show`.
    pub fn into_action(self) -> ConfigAction {
        match self.command {
            None => ConfigAction::Show { json: false },
            Some(Command::Show { json }) => ConfigAction::Show { json },
            Some(Command::Get { key }) => ConfigAction::Get { key },
            Some(Command::Env) => ConfigAction::Env,
            Some(Command::Gen {
                schema,
                output,
                runtime,
            }) => ConfigAction::Gen {
                schema,
                output,
                runtime,
            },
        }
    }
}
