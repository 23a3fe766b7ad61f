//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Interactive shell arguments.
#[derive(Debug, Args)]
pub struct InteractiveCommand {
    /// Do not print a prompt before each command
    #[arg(long)]
    pub no_prompt: bool,
}

/// Script runner arguments.
#[derive(Debug, Args)]
pub struct RunCommand {
    /// Script file with one shell command per line
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Print the final session as JSON instead of tables
    #[arg(short, long)]
    pub json: bool,

    /// Exit with an error if any command in the script failed
    #[arg(long)]
    pub strict: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}
