//! Configuration management for minislotd.
//!
//! Settings come from an optional TOML file named by `MINISLOT_CONFIG`,
//! then environment overrides (`PORT`, `MINISLOT_TEMPLATE`,
//! `MINISLOT_NAMESPACE`, `MINISLOT_CREATE_TIMEOUT_SECS`).

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// Env var naming the config file
pub const CONFIG_ENV: &str = "MINISLOT_CONFIG";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value for {var}: {value:?}")]
    InvalidEnv { var: &'static str, value: String },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Daemon configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Manifest template, read and parsed once at startup
    #[serde(default = "default_template_path")]
    pub template_path: PathBuf,

    /// Namespace used when a request leaves it empty
    #[serde(default = "default_namespace")]
    pub default_namespace: String,

    /// Deadline for each individual create call against the cluster
    #[serde(default = "default_create_timeout")]
    pub create_timeout_secs: u64,
}

fn default_port() -> u16 {
    8080
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_template_path() -> PathBuf {
    PathBuf::from("katana-template.yaml")
}

fn default_namespace() -> String {
    "default".to_string()
}

fn default_create_timeout() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind_address: default_bind_address(),
            template_path: default_template_path(),
            default_namespace: default_namespace(),
            create_timeout_secs: default_create_timeout(),
        }
    }
}

impl ServerConfig {
    /// Load from `MINISLOT_CONFIG` (if set) and apply environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var(CONFIG_ENV) {
            Ok(path) if !path.is_empty() => Self::load_from_path(&path)?,
            _ => Self::default(),
        };
        config.apply_env(|var| std::env::var(var).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from a TOML file. A missing file yields the defaults.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!("Config {} not found, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let config: ServerConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Reject settings that would make every deployment fail
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.create_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "create_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.default_namespace.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "default_namespace must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Apply environment overrides. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        if let Some(port) = get("PORT") {
            self.port = port.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                var: "PORT",
                value: port.clone(),
            })?;
        }
        if let Some(path) = get("MINISLOT_TEMPLATE") {
            self.template_path = PathBuf::from(path);
        }
        if let Some(namespace) = get("MINISLOT_NAMESPACE") {
            self.default_namespace = namespace;
        }
        if let Some(secs) = get("MINISLOT_CREATE_TIMEOUT_SECS") {
            self.create_timeout_secs = secs
                .trim()
                .parse()
                .ok()
                .filter(|s| *s > 0)
                .ok_or_else(|| ConfigError::InvalidEnv {
                    var: "MINISLOT_CREATE_TIMEOUT_SECS",
                    value: secs.clone(),
                })?;
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    pub fn create_timeout(&self) -> Duration {
        Duration::from_secs(self.create_timeout_secs)
    }
}
