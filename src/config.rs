// Configuration module
// CLI flags override ~/.config/hashkit/config.toml, which overrides defaults

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::hash::{HashError, Options, OutputFormat, Result};
use crate::hash::format::DEFAULT_BUFFER_SIZE;

/// User configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub algorithm: String,
    pub format: OutputFormat,
    pub prefix: bool,
    /// Worker threads; zero or negative means one per CPU.
    pub workers: i64,
    pub buffer_size: usize,
    pub recursive: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            algorithm: "sha256".to_string(),
            format: OutputFormat::Hex,
            prefix: false,
            workers: 0,
            buffer_size: DEFAULT_BUFFER_SIZE,
            recursive: false,
        }
    }
}

impl Config {
    /// Default config file location, if the platform has a config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("hashkit").join("config.toml"))
    }

    /// Load from an explicit path, or from the default location when `None`.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.is_file() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| HashError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&text).map_err(|e| match e {
            HashError::Config { reason, .. } => HashError::Config {
                path: path.to_path_buf(),
                reason,
            },
            other => other,
        })
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| HashError::Config {
            path: PathBuf::from("<inline>"),
            reason: e.to_string(),
        })
    }

    /// Worker count with non-positive values mapped to "auto".
    pub fn worker_count(&self) -> usize {
        usize::try_from(self.workers).unwrap_or(0)
    }

    /// Per-call options derived from this configuration.
    pub fn options(&self) -> Options {
        Options {
            format: self.format,
            prefix: self.prefix,
            workers: self.worker_count(),
            buffer_size: if self.buffer_size == 0 {
                DEFAULT_BUFFER_SIZE
            } else {
                self.buffer_size
            },
        }
    }
}
