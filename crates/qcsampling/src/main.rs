//! `qcs` - CLI for qcsampling
//!
//! This binary provides an interactive shell and a script runner over an
//! in-memory QC sampling session, plus configuration inspection.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;

use qcsampling::cli::{Cli, Command, ConfigCommand, InteractiveCommand, RunCommand};
use qcsampling::{init_logging, render, Config, Session, Shell};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Each command loads only the configuration it works with
    let config_path = cli.config_path();

    match cli.command {
        Command::Shell(shell_cmd) => handle_shell(&Config::load_from(Some(config_path))?, &shell_cmd),
        Command::Run(run_cmd) => handle_run(&Config::load_from(Some(config_path))?, &run_cmd),
        Command::Config(config_cmd) => handle_config(config_path, config_cmd),
    }
}

fn handle_shell(config: &Config, cmd: &InteractiveCommand) -> anyhow::Result<()> {
    let session = Session::new(config.limits());
    let stdin = io::stdin().lock();
    let stdout = io::stdout().lock();

    let mut shell = Shell::new(session, stdin, stdout);
    if !cmd.no_prompt {
        shell = shell.with_prompt(config.shell.prompt.clone());
    }
    shell.run()?;
    Ok(())
}

fn handle_run(config: &Config, cmd: &RunCommand) -> anyhow::Result<()> {
    let file = File::open(&cmd.file)
        .with_context(|| format!("failed to open script {}", cmd.file.display()))?;
    let input = BufReader::new(file);
    let session = Session::new(config.limits());

    // With --json, stdout carries only the export.
    let (session, stats) = if cmd.json {
        let mut shell = Shell::new(session, input, io::stderr().lock());
        let stats = shell.run()?;
        (shell.into_session(), stats)
    } else {
        let mut shell = Shell::new(session, input, io::stdout().lock());
        let stats = shell.run()?;
        (shell.into_session(), stats)
    };

    let mut stdout = io::stdout().lock();
    if cmd.json {
        writeln!(stdout, "{}", render::to_json(session.registry())?)?;
    } else {
        let capacity = session.limits().grn_capacity;
        writeln!(stdout)?;
        writeln!(stdout, "{}", render::render_registry(session.registry(), capacity))?;
        writeln!(stdout)?;
        writeln!(stdout, "{}", render::render_summary(&session.registry().summary()))?;
    }

    if cmd.strict && stats.failed > 0 {
        bail!(
            "{} of {} commands in {} failed",
            stats.failed,
            stats.commands,
            cmd.file.display()
        );
    }
    Ok(())
}

fn handle_config(path: PathBuf, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let config = &Config::load_from(Some(path))?;
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Registry]");
                println!(
                    "  Max GRNs per truck: {}",
                    config.registry.max_grns_per_truck
                );
                println!();
                println!("[Measurement]");
                println!("  Min:                {}", config.measurement.min);
                println!("  Max:                {}", config.measurement.max);
                println!(
                    "  Enforce range:      {}",
                    config.measurement.enforce_range
                );
                println!();
                println!("[Approval]");
                println!(
                    "  Strict transitions: {}",
                    config.approval.strict_transitions
                );
                println!();
                println!("[Shell]");
                println!("  Prompt:             {:?}", config.shell.prompt);
            }
        }
        ConfigCommand::Path => {
            println!("{}", path.display());
        }
        ConfigCommand::Validate { .. } => {
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => bail!("configuration error: {e}"),
            }
        }
    }
    Ok(())
}
