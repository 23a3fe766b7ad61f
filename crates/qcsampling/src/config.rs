//! Configuration management for qcsampling.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{MeasurementRange, DEFAULT_MAX, DEFAULT_MIN};
use crate::session::{Limits, DEFAULT_GRN_CAPACITY};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default config directory name.
const CONFIG_DIR_NAME: &str = "qcsampling";

/// Prefix for environment variable overrides.
const ENV_PREFIX: &str = "QCSAMPLING_";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `QCSAMPLING_`, nested keys split on `__`)
/// 2. TOML config file at `~/.config/qcsampling/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Registry limits.
    pub registry: RegistryConfig,
    /// Measurement bounds.
    pub measurement: MeasurementConfig,
    /// Approval workflow behaviour.
    pub approval: ApprovalConfig,
    /// Interactive shell settings.
    pub shell: ShellConfig,
}

/// Registry-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Maximum number of GRNs a single truck may hold.
    pub max_grns_per_truck: usize,
}

/// Measurement-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeasurementConfig {
    /// Lowest accepted value.
    pub min: f64,
    /// Highest accepted value.
    pub max: f64,
    /// Reject values outside `[min, max]`.
    pub enforce_range: bool,
}

/// Approval-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApprovalConfig {
    /// Report mismatched approvals as errors instead of ignoring them.
    pub strict_transitions: bool,
}

/// Shell-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Prompt printed before each interactive command.
    pub prompt: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_grns_per_truck: DEFAULT_GRN_CAPACITY,
        }
    }
}

impl Default for MeasurementConfig {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN,
            max: DEFAULT_MAX,
            enforce_range: true,
        }
    }
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            prompt: "qc> ".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.registry.max_grns_per_truck == 0 {
            return Err(Error::ConfigValidation {
                message: "max_grns_per_truck must be greater than 0".to_string(),
            });
        }

        let MeasurementConfig { min, max, .. } = self.measurement;
        if !min.is_finite() || !max.is_finite() {
            return Err(Error::ConfigValidation {
                message: format!("measurement bounds must be finite (min = {min}, max = {max})"),
            });
        }
        if min >= max {
            return Err(Error::ConfigValidation {
                message: format!("measurement min ({min}) must be less than max ({max})"),
            });
        }

        Ok(())
    }

    /// Bounds applied to measurement input.
    #[must_use]
    pub fn measurement_range(&self) -> MeasurementRange {
        MeasurementRange {
            min: self.measurement.min,
            max: self.measurement.max,
            enforce: self.measurement.enforce_range,
        }
    }

    /// Session limits derived from this configuration.
    #[must_use]
    pub fn limits(&self) -> Limits {
        Limits {
            grn_capacity: self.registry.max_grns_per_truck,
            range: self.measurement_range(),
            strict_transitions: self.approval.strict_transitions,
        }
    }
}
