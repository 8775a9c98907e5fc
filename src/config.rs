//! Startup configuration.
//!
//! Settings come from two places: CLI flags (listen address, hostname,
//! repository root) and a TOML file, by default `<repos>/gitcode.toml`:
//!
//! ```toml
//! secret = "<64 hex chars>"
//! username = "admin"
//! password = "<sha256 hex>"
//! ignore = ["scratch"]
//!
//! [annotate]
//! concurrency = 16
//! timeout_secs = 30
//!
//! [[policy]]
//! subject = "*"
//! org = "public"
//! actions = ["read"]
//! ```
//!
//! Any problem here is fatal: the server refuses to start rather than run
//! with a half-valid configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::auth::{PolicyRule, SecretKey};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid secret: {0}")]
    InvalidSecret(String),

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    secret: String,
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    ignore: Vec<String>,
    #[serde(default)]
    annotate: AnnotateConfig,
    #[serde(default)]
    policy: Vec<PolicyRule>,
}

/// Limits for the per-listing history walks.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnnotateConfig {
    /// Maximum number of history walks running at once for one listing.
    pub concurrency: usize,
    pub timeout_secs: u64,
}

impl Default for AnnotateConfig {
    fn default() -> Self {
        Self {
            concurrency: 16,
            timeout_secs: 30,
        }
    }
}

impl AnnotateConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub secret: SecretKey,
    pub username: String,
    pub password: String,
    pub ignore: Vec<String>,
    pub annotate: AnnotateConfig,
    pub policy: Vec<PolicyRule>,
    pub repos_dir: PathBuf,
    pub hostname: String,
}

impl AppConfig {
    pub fn load(path: &Path, repos_dir: PathBuf, hostname: String) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path, repos_dir, hostname)
    }

    pub fn parse(
        content: &str,
        path: &Path,
        repos_dir: PathBuf,
        hostname: String,
    ) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        if file.annotate.concurrency == 0 {
            return Err(ConfigError::InvalidValue(
                "annotate.concurrency must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            secret: SecretKey::from_hex(&file.secret)?,
            username: file.username,
            password: file.password,
            ignore: file.ignore,
            annotate: file.annotate,
            policy: file.policy,
            repos_dir,
            hostname,
        })
    }

    pub fn is_ignored(&self, org: &str) -> bool {
        self.ignore.iter().any(|i| i == org)
    }
}
