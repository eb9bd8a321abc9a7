//! Tool configuration.
//!
//! Settings come from an optional YAML file. Every key may be omitted and
//! falls back to its default.
//!
//! # Example YAML
//!
//! ```yaml
//! database: construction.db
//! default_location: warehouse
//! low_stock_threshold: 10
//! ```

use std::io::BufReader;
use std::path::{Path, PathBuf};

use construction_core::DEFAULT_STOCK_LOCATION;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Config file picked up from the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "buildcli.yaml";

const DEFAULT_DATABASE: &str = "construction.db";
const DEFAULT_LOW_STOCK_THRESHOLD: f64 = 10.0;

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config '{}': {source}", path.display())]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("invalid config '{}': low_stock_threshold must be a non-negative number", path.display())]
    InvalidThreshold { path: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite database file, used unless `--db` is given.
    pub database: PathBuf,
    /// Stock location recorded when none is entered.
    pub default_location: String,
    /// Quantity at or below which `materials inventory --low-stock` lists a
    /// material.
    pub low_stock_threshold: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: PathBuf::from(DEFAULT_DATABASE),
            default_location: DEFAULT_STOCK_LOCATION.to_string(),
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
        }
    }
}

impl Config {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if parsing fails, or
    /// [`ConfigError::InvalidThreshold`] for a negative threshold.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self =
            serde_yaml::from_reader(BufReader::new(file)).map_err(|source| ConfigError::Yaml {
                path: path.to_path_buf(),
                source,
            })?;

        if !config.low_stock_threshold.is_finite() || config.low_stock_threshold < 0.0 {
            return Err(ConfigError::InvalidThreshold {
                path: path.to_path_buf(),
            });
        }
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Loads `explicit` if given, otherwise [`DEFAULT_CONFIG_FILE`] from the
    /// working directory if it exists, otherwise the defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        Self::resolve_with_fallback(explicit, Path::new(DEFAULT_CONFIG_FILE))
    }

    fn resolve_with_fallback(explicit: Option<&Path>, fallback: &Path) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load(path),
            None if fallback.is_file() => Self::load(fallback),
            None => Ok(Self::default()),
        }
    }
}
