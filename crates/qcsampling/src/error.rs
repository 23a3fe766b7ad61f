//! Error types for qcsampling.
//!
//! This module defines all error types used throughout the qcsampling crate.
//! Session errors are recoverable and are reported to the user as one-line
//! notices; the remaining variants describe failures of the surrounding
//! tooling (configuration, I/O, serialization).

use thiserror::Error;

use crate::model::{ApprovalKind, GrnStatus};

/// The main error type for qcsampling operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Session Errors ===
    /// A required text input was blank after trimming.
    #[error("please enter a {what}")]
    EmptyInput {
        /// Which input was blank (e.g. "truck number").
        what: &'static str,
    },

    /// A truck with the same number is already registered.
    #[error("truck number '{truck_number}' already exists")]
    DuplicateTruck {
        /// The rejected truck number.
        truck_number: String,
    },

    /// The truck already has a GRN with the same number.
    #[error("GRN number '{grn_number}' already exists for truck '{truck_number}'")]
    DuplicateGrn {
        /// The owning truck.
        truck_number: String,
        /// The rejected GRN number.
        grn_number: String,
    },

    /// The truck already holds the maximum number of GRNs.
    #[error("maximum {capacity} GRNs allowed per truck (truck '{truck_number}' is full)")]
    Capacity {
        /// The full truck.
        truck_number: String,
        /// The configured capacity.
        capacity: usize,
    },

    /// A measurement was edited after the GRN left the draft state.
    #[error("GRN '{grn_number}' is {status} and can no longer be edited")]
    ReadOnlyField {
        /// The GRN that was edited.
        grn_number: String,
        /// Its current status.
        status: GrnStatus,
    },

    /// A measurement value could not be parsed as a finite number.
    #[error("'{value}' is not a valid number")]
    InvalidNumber {
        /// The rejected input.
        value: String,
    },

    /// A measurement value lies outside the allowed range.
    #[error("{value} is outside the allowed range [{min}, {max}]")]
    OutOfRange {
        /// The rejected value.
        value: f64,
        /// Lower bound (inclusive).
        min: f64,
        /// Upper bound (inclusive).
        max: f64,
    },

    /// An approval did not match the GRN's current status.
    #[error("cannot {kind}-approve GRN '{grn_number}' while it is {status}")]
    InvalidTransition {
        /// The GRN that was approved.
        grn_number: String,
        /// Its current status.
        status: GrnStatus,
        /// The requested approval.
        kind: ApprovalKind,
    },

    /// No truck exists at the given position or with the given number.
    #[error("truck not found: {0}")]
    TruckNotFound(String),

    /// No GRN exists at the given position or with the given number.
    #[error("GRN not found: {grn} on truck '{truck_number}'")]
    GrnNotFound {
        /// The truck that was searched.
        truck_number: String,
        /// The GRN position or number that was requested.
        grn: String,
    },

    /// A field name did not match any editable field.
    #[error("unknown field '{0}'")]
    UnknownField(String),

    /// A shell command could not be parsed.
    #[error("{0}")]
    Command(String),

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// Reading commands or writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Serialization Errors ===
    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for qcsampling operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new command error.
    #[must_use]
    pub fn command(message: impl Into<String>) -> Self {
        Self::Command(message.into())
    }

    /// Check if this error was caused by user input and leaves the session intact.
    ///
    /// User errors are surfaced as notices; everything else is fatal for the
    /// current shell.
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        !matches!(
            self,
            Self::ConfigLoad(_) | Self::ConfigValidation { .. } | Self::Io(_) | Self::Json(_)
        )
    }
}
