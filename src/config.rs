//! User configuration.
//!
//! Read from `$XDG_CONFIG_HOME/redstone-calc/config.toml`. Every field is
//! optional; a missing file yields the defaults.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("progress_step must be between 1 and 100 and divide 100, got {0}")]
    ProgressStep(u8),
    #[error("capacity_ceiling must be a finite number, got {0}")]
    CapacityCeiling(f64),
    #[error("perturbation_min ({min}) is greater than perturbation_max ({max})")]
    PerturbationRange { min: i64, max: i64 },
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Delay between progress ticks.
    pub tick_interval_ms: u64,
    /// Progress added per tick.
    pub progress_step: u8,
    /// How long the completed progress stays visible.
    pub close_delay_ms: u64,
    /// Perturbed results strictly above this are rejected.
    pub capacity_ceiling: f64,
    pub perturbation_min: i64,
    pub perturbation_max: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_interval_ms: 100,
            progress_step: 10,
            close_delay_ms: 500,
            capacity_ceiling: 250.0,
            perturbation_min: 1,
            perturbation_max: 3,
        }
    }
}

impl Config {
    /// Default config file location, if a config directory exists.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("redstone-calc").join("config.toml"))
    }

    /// Load from `path`, or defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents).map_err(|err| match err {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let step = self.progress_step;
        if step == 0 || step > 100 || 100 % step != 0 {
            return Err(ConfigError::ProgressStep(step));
        }
        if !self.capacity_ceiling.is_finite() {
            return Err(ConfigError::CapacityCeiling(self.capacity_ceiling));
        }
        if self.perturbation_min > self.perturbation_max {
            return Err(ConfigError::PerturbationRange {
                min: self.perturbation_min,
                max: self.perturbation_max,
            });
        }
        Ok(())
    }

    /// Drop all visual delays.
    pub fn instant(mut self) -> Self {
        self.tick_interval_ms = 0;
        self.close_delay_ms = 0;
        self
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn close_delay(&self) -> Duration {
        Duration::from_millis(self.close_delay_ms)
    }
}
