//! Serializable controller configuration

use std::path::PathBuf;
#[cfg(feature = "ser")]
use std::path::Path;

#[cfg(feature = "ser")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::controller::{DEFAULT_SETTLING_BAND, Limits};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "ser")]
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Settling band must be finite and positive, got {0}")]
    InvalidSettlingBand(f64),
}

/// Gains, limits, and tracking parameters for a `Controller`.
///
/// Only the gains are required when deserializing;
/// limits default to disabled and the settling band to 5%.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "ser", derive(Serialize, Deserialize))]
pub struct PidConfig {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,

    /// Clamp on requested setpoints
    #[cfg_attr(feature = "ser", serde(default))]
    pub input_limits: Limits,

    /// Clamp on the integrator and the control output
    #[cfg_attr(feature = "ser", serde(default))]
    pub output_limits: Limits,

    /// Relative half-width of the band the process variable
    /// must enter for the step response to count as settled
    #[cfg_attr(feature = "ser", serde(default = "default_settling_band"))]
    pub settling_band: f64,
}

#[cfg(feature = "ser")]
fn default_settling_band() -> f64 {
    DEFAULT_SETTLING_BAND
}

impl Default for PidConfig {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}

impl PidConfig {
    /// Gains only, with limits disabled
    pub fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self {
            kp,
            ki,
            kd,
            input_limits: Limits::DISABLED,
            output_limits: Limits::DISABLED,
            settling_band: DEFAULT_SETTLING_BAND,
        }
    }

    pub fn with_input_limits(mut self, lower: f64, upper: f64) -> Self {
        self.input_limits = Limits::new(lower, upper);
        self
    }

    pub fn with_output_limits(mut self, lower: f64, upper: f64) -> Self {
        self.output_limits = Limits::new(lower, upper);
        self
    }

    pub fn with_settling_band(mut self, settling_band: f64) -> Self {
        self.settling_band = settling_band;
        self
    }

    /// Check values that have no meaningful interpretation.
    /// Gains and limits are accepted as-is.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.settling_band.is_finite() && self.settling_band > 0.0) {
            return Err(ConfigError::InvalidSettlingBand(self.settling_band));
        }
        Ok(())
    }

    /// Parse and validate a JSON config
    #[cfg(feature = "ser")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read, parse, and validate a JSON config file
    #[cfg(feature = "ser")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    #[cfg(feature = "ser")]
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
