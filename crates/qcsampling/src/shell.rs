//! Line-oriented command shell over a [`Session`].
//!
//! The shell reads one command per line, applies it to the session and
//! prints the result. Rejected commands are reported as a single
//! `error: ...` line and the shell moves on to the next command; only I/O
//! failures end the loop early.

use std::io::{BufRead, Write};

use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use tracing::info;

use crate::error::{Error, Result};
use crate::form::EntryForm;
use crate::model::{ApprovalKind, GrnField, Transition};
use crate::render;
use crate::session::Session;

/// Text printed by the `help` command.
pub const HELP: &str = "\
Commands:
  truck add NUMBER               register a truck (quote numbers with spaces)
  grn add TRUCK NUMBER           attach a GRN to a truck
  set TRUCK GRN FIELD [VALUE]    enter a measurement (no value clears it)
  approve TRUCK GRN qc|mc        approve a GRN
  show [TRUCK]                   print trucks and their GRNs
  summary                        print totals by status
  export                         print the session as JSON
  help                           print this help
  quit | exit                    leave the shell

Fields: moisture, mold, deadSeeds, whiteSeeds, brokenSeeds, holeSeeds, foreignMaterial";

#[derive(Debug, Parser)]
#[command(
    name = "qcs",
    no_binary_name = true,
    disable_help_flag = true,
    disable_version_flag = true,
    disable_help_subcommand = true
)]
struct Line {
    #[command(subcommand)]
    command: ShellCommand,
}

/// A parsed shell command.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum ShellCommand {
    /// Manage trucks
    #[command(subcommand)]
    Truck(TruckAction),

    /// Manage GRNs
    #[command(subcommand)]
    Grn(GrnAction),

    /// Enter or clear a measurement
    Set {
        /// Truck number
        #[arg(allow_hyphen_values = true)]
        truck: String,
        /// GRN number
        #[arg(allow_hyphen_values = true)]
        grn: String,
        /// Field name
        field: String,
        /// New value; omit to clear
        #[arg(allow_hyphen_values = true)]
        value: Option<String>,
    },

    /// Approve a GRN
    Approve {
        /// Truck number
        #[arg(allow_hyphen_values = true)]
        truck: String,
        /// GRN number
        #[arg(allow_hyphen_values = true)]
        grn: String,
        /// Approval kind: qc or mc
        kind: String,
    },

    /// Print trucks and their GRNs
    Show {
        /// Only this truck
        #[arg(allow_hyphen_values = true)]
        truck: Option<String>,
    },

    /// Print totals by status
    Summary,

    /// Print the session as JSON
    Export,

    /// Print available commands
    Help,

    /// Leave the shell
    #[command(alias = "exit")]
    Quit,
}

/// Truck commands.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum TruckAction {
    /// Register a truck
    Add {
        /// Truck number
        #[arg(allow_hyphen_values = true)]
        number: String,
    },
}

/// GRN commands.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum GrnAction {
    /// Attach a GRN to a truck
    Add {
        /// Truck number
        #[arg(allow_hyphen_values = true)]
        truck: String,
        /// GRN number
        #[arg(allow_hyphen_values = true)]
        number: String,
    },
}

impl ShellCommand {
    /// Parse one input line.
    ///
    /// Words are split the way a POSIX shell splits them, so numbers with
    /// spaces can be quoted and `""` passes an empty argument. Returns
    /// `Ok(None)` for blank lines and `#` comments.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Command`] if the line is not a valid command.
    pub fn parse_line(line: &str) -> Result<Option<Self>> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(None);
        }

        let words = shlex::split(trimmed)
            .ok_or_else(|| Error::command(format!("unbalanced quotes in '{trimmed}'")))?;

        Line::try_parse_from(words)
            .map(|parsed| Some(parsed.command))
            .map_err(|err| match err.kind() {
                ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                | ErrorKind::MissingSubcommand => {
                    Error::command(format!("incomplete command '{trimmed}', try 'help'"))
                }
                _ => {
                    let rendered = err.to_string();
                    let first = rendered.lines().next().unwrap_or_default();
                    Error::command(first.trim_start_matches("error: "))
                }
            })
    }
}

/// Whether the shell should keep reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Read the next command.
    Continue,
    /// Stop reading.
    Quit,
}

/// Counters for one shell run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Commands read (blank lines and comments excluded).
    pub commands: usize,
    /// Commands that were rejected.
    pub failed: usize,
}

/// A command shell bound to an input and an output stream.
#[derive(Debug)]
pub struct Shell<R, W> {
    session: Session,
    form: EntryForm,
    input: R,
    output: W,
    prompt: Option<String>,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    /// Create a shell without a prompt, suitable for scripts.
    pub fn new(session: Session, input: R, output: W) -> Self {
        Self {
            session,
            form: EntryForm::new(),
            input,
            output,
            prompt: None,
        }
    }

    /// Print `prompt` before reading each command.
    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    /// Consume the shell and return its session.
    pub fn into_session(self) -> Session {
        self.session
    }

    /// Read and execute commands until end of input or `quit`.
    ///
    /// # Errors
    ///
    /// Returns an error only if reading input or writing output fails.
    pub fn run(&mut self) -> Result<RunStats> {
        info!(interactive = self.prompt.is_some(), "shell started");
        let mut stats = RunStats::default();
        let mut line = String::new();
        let mut line_no = 0;

        loop {
            if let Some(prompt) = &self.prompt {
                write!(self.output, "{prompt}")?;
                self.output.flush()?;
            }

            line.clear();
            if self.input.read_line(&mut line)? == 0 {
                break;
            }
            line_no += 1;

            let command = match ShellCommand::parse_line(&line) {
                Ok(Some(command)) => Ok(command),
                Ok(None) => continue,
                Err(err) => Err(err),
            };
            stats.commands += 1;

            match command.and_then(|command| self.execute(command)) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Quit) => break,
                Err(err) if err.is_user_error() => {
                    stats.failed += 1;
                    if self.prompt.is_some() {
                        writeln!(self.output, "error: {err}")?;
                    } else {
                        writeln!(self.output, "error: line {line_no}: {err}")?;
                    }
                }
                Err(err) => return Err(err),
            }
        }

        info!(
            commands = stats.commands,
            failed = stats.failed,
            "shell finished"
        );
        Ok(stats)
    }

    /// Execute a single parsed command.
    ///
    /// # Errors
    ///
    /// Returns the session error for a rejected command, or an I/O error if
    /// writing output fails.
    pub fn execute(&mut self, command: ShellCommand) -> Result<Flow> {
        match command {
            ShellCommand::Truck(TruckAction::Add { number }) => {
                self.form.set_truck_number(number);
                let index = self.form.submit_truck(&mut self.session)?;
                let truck = self.truck_at(index)?;
                writeln!(self.output, "Added truck '{truck}'.")?;
            }
            ShellCommand::Grn(GrnAction::Add { truck, number }) => {
                let truck_index = self.truck_index(&truck)?;
                self.form.set_grn_number(number);
                self.form.submit_grn(&mut self.session, truck_index)?;
                let count = self
                    .session
                    .registry()
                    .truck(truck_index)
                    .map_or(0, crate::model::Truck::len);
                let capacity = self.session.limits().grn_capacity;
                writeln!(
                    self.output,
                    "Added GRN to truck '{truck}' ({count}/{capacity})."
                )?;
            }
            ShellCommand::Set {
                truck,
                grn,
                field,
                value,
            } => {
                let (truck_index, grn_index) = self.grn_position(&truck, &grn)?;
                let field: GrnField = field.parse()?;
                let value = value.unwrap_or_default();
                self.session
                    .update_field(truck_index, grn_index, field, &value)?;
                if value.trim().is_empty() {
                    writeln!(self.output, "GRN '{grn}' {field} cleared.")?;
                } else {
                    writeln!(self.output, "GRN '{grn}' {field} = {}.", value.trim())?;
                }
            }
            ShellCommand::Approve { truck, grn, kind } => {
                let (truck_index, grn_index) = self.grn_position(&truck, &grn)?;
                let kind: ApprovalKind = kind.parse()?;
                match self.session.approve(truck_index, grn_index, kind)? {
                    Transition::Advanced { from, to } => writeln!(
                        self.output,
                        "GRN '{grn}' on truck '{truck}': {} -> {}.",
                        from.label(),
                        to.label()
                    )?,
                    Transition::Ignored { status } if status.is_terminal() => writeln!(
                        self.output,
                        "GRN '{grn}' is already fully approved; {kind} approval ignored."
                    )?,
                    Transition::Ignored { status } => writeln!(
                        self.output,
                        "GRN '{grn}' is {}; {kind} approval ignored.",
                        status.label()
                    )?,
                }
            }
            ShellCommand::Show { truck } => {
                let capacity = self.session.limits().grn_capacity;
                let text = match truck {
                    Some(number) => {
                        let index = self.truck_index(&number)?;
                        self.session
                            .registry()
                            .truck(index)
                            .map(|truck| render::render_truck(truck, capacity))
                            .unwrap_or_default()
                    }
                    None => render::render_registry(self.session.registry(), capacity),
                };
                writeln!(self.output, "{text}")?;
            }
            ShellCommand::Summary => {
                let summary = self.session.registry().summary();
                writeln!(self.output, "{}", render::render_summary(&summary))?;
            }
            ShellCommand::Export => {
                writeln!(self.output, "{}", render::to_json(self.session.registry())?)?;
            }
            ShellCommand::Help => {
                writeln!(self.output, "{HELP}")?;
            }
            ShellCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn truck_index(&self, truck_number: &str) -> Result<usize> {
        self.session
            .registry()
            .truck_index(truck_number)
            .ok_or_else(|| Error::TruckNotFound(format!("'{truck_number}'")))
    }

    fn truck_at(&self, index: usize) -> Result<String> {
        self.session
            .registry()
            .truck(index)
            .map(|truck| truck.truck_number().to_string())
            .ok_or_else(|| Error::TruckNotFound(format!("#{index}")))
    }

    fn grn_position(&self, truck_number: &str, grn_number: &str) -> Result<(usize, usize)> {
        let truck_index = self.truck_index(truck_number)?;
        let grn_index = self
            .session
            .registry()
            .truck(truck_index)
            .and_then(|truck| truck.grn_index(grn_number))
            .ok_or_else(|| Error::GrnNotFound {
                truck_number: truck_number.to_string(),
                grn: format!("'{grn_number}'"),
            })?;
        Ok((truck_index, grn_index))
    }
}
