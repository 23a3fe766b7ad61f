//! Command-line interface for qcsampling.
//!
//! This module provides the CLI structure for the `qcs` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::logging::Verbosity;

pub use commands::{ConfigCommand, InteractiveCommand, RunCommand};

/// qcs - Quality-control sampling for truck deliveries
///
/// Register trucks, attach GRNs, record moisture and quality measurements,
/// and move each GRN through QC and MC approval.
#[derive(Debug, Parser)]
#[command(name = "qcs")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start an interactive session
    Shell(InteractiveCommand),

    /// Run a command script against a fresh session
    Run(RunCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.verbose, self.quiet)
    }

    /// The configuration file this invocation works with.
    ///
    /// `config validate --file F` targets `F`; otherwise `--config` or the
    /// default location.
    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        let validate_file = match &self.command {
            Command::Config(ConfigCommand::Validate { file }) => file.clone(),
            _ => None,
        };
        validate_file
            .or_else(|| self.config.clone())
            .unwrap_or_else(crate::config::Config::default_config_path)
    }
}
