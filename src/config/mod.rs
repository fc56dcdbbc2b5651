//! Typed configuration.
//!
//! Layered lowest to highest: defaults, optional TOML file, environment.
//! The CLI applies its own flags on top. Loaded once at startup.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::engine::FailurePolicy;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory histogram records are written to.
    pub output_dir: PathBuf,
    /// Abort the whole run on the first per-job failure.
    pub strict: bool,
    /// Worker executable. Defaults to the running binary.
    pub worker: Option<PathBuf>,
    pub otel_endpoint: Option<String>,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            strict: false,
            worker: None,
            otel_endpoint: None,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Defaults, then `file` if given, then environment variables.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut config = match file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env()?;
        Ok(config)
    }

    /// Defaults overridden by environment variables.
    pub fn from_env() -> Result<Self> {
        Self::load(None)
    }

    /// Parse a TOML config file. Missing keys take their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml(&content)
            .map_err(|e| Error::Config(format!("bad config {}: {e}", path.display())))
    }

    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(dir) = std::env::var("LETTERFREQ_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }
        if let Ok(value) = std::env::var("LETTERFREQ_STRICT") {
            self.strict = parse_bool("LETTERFREQ_STRICT", &value)?;
        }
        if let Ok(worker) = std::env::var("LETTERFREQ_WORKER") {
            self.worker = Some(PathBuf::from(worker));
        }
        if let Ok(endpoint) = std::env::var("OTEL_ENDPOINT") {
            self.otel_endpoint = Some(endpoint);
        }
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            self.log_level = level;
        }
        Ok(())
    }

    pub fn policy(&self) -> FailurePolicy {
        if self.strict {
            FailurePolicy::Strict
        } else {
            FailurePolicy::Isolate
        }
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(Error::Config(format!(
            "{name} must be a boolean, got '{other}'"
        ))),
    }
}
