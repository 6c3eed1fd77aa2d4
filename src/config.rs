use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// File the binary looks for in the working directory.
pub const CONFIG_FILE: &str = "fault-demo.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Where each scenario points its fault trigger.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DemoConfig {
    /// Must not exist.
    pub missing_path: PathBuf,
    /// Must hold at least one record.
    pub records_path: PathBuf,
    /// Must not be openable without creating it.
    pub database_path: PathBuf,
    /// Must not be in the type registry.
    pub unknown_type: String,
    pub connect_timeout_ms: u64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            missing_path: PathBuf::from("nonexistent.txt"),
            records_path: PathBuf::from("test.txt"),
            database_path: PathBuf::from("nonexistent/nonexistentdb.sqlite"),
            unknown_type: "com.example.NonExistentClass".to_string(),
            connect_timeout_ms: 250,
        }
    }
}

impl DemoConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Load `path` if it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}
