//! Configuration loading and validation for the probe agent

use mcprobe::{Endpoint, endpoint};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use validator::{Validate, ValidationError, ValidationErrors};

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(#[from] ValidationErrors),

    #[error("Parameter memcached_inst_ports must be defined, example: 11211,11212")]
    MissingPorts,
}

/// Whether the instance list has to be present
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Optional,
    Required,
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Comma separated `host:port` or bare `port` tokens
    #[serde(default)]
    pub memcached_inst_ports: Option<String>,

    #[serde(default)]
    pub probe: ProbeSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Validate for Config {
    fn validate(&self) -> Result<(), ValidationErrors> {
        self.probe.validate()?;

        if let Some(format) = &self.logging.format
            && let Err(e) = validate_log_format(format)
        {
            let mut errors = ValidationErrors::new();
            errors.add("format", e);
            return Err(errors);
        }

        Ok(())
    }
}

/// Query settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ProbeSettings {
    /// Per-step timeout, `0s` selects the library default
    #[serde(with = "humantime_serde")]
    #[validate(custom = "validate_timeout")]
    pub timeout: Duration,
}

/// Log level used when neither the file nor `RUST_LOG` sets one
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Logging settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingSettings {
    pub level: Option<String>,
    pub format: Option<String>,
}

impl LoggingSettings {
    /// Configured level, or [`DEFAULT_LOG_LEVEL`]
    pub fn level(&self) -> &str {
        self.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    /// Whether JSON log output was requested
    pub fn is_json(&self) -> bool {
        self.format.as_deref() == Some("json")
    }
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            timeout: mcprobe::DEFAULT_TIMEOUT,
        }
    }
}

// Custom validators

fn validate_timeout(timeout: &Duration) -> Result<(), ValidationError> {
    if *timeout > Duration::from_secs(30) {
        return Err(ValidationError::new("timeout_out_of_range"));
    }
    Ok(())
}

fn validate_log_format(format: &str) -> Result<(), ValidationError> {
    match format {
        "text" | "json" => Ok(()),
        _ => Err(ValidationError::new("log_format_invalid")),
    }
}

// Configuration loading implementation

impl Config {
    /// Load configuration from `path`, or from the default search paths
    /// when no path is given.
    pub fn load(path: Option<&Path>, requirement: Requirement) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) if !path.is_file() => {
                return Err(ConfigError::FileNotFound(path.to_path_buf()));
            }
            Some(path) => {
                tracing::info!("Loading configuration from: {}", path.display());
                Self::load_from_file(path)?
            }
            None => match Self::find_config_file() {
                Some(path) => {
                    tracing::info!("Loading configuration from: {}", path.display());
                    Self::load_from_file(&path)?
                }
                None => {
                    tracing::info!("No configuration file found, using defaults");
                    Self::default()
                }
            },
        };

        config.check(requirement)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&contents)
    }

    /// Parse and validate a YAML document
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Enforce presence of the instance list when required
    pub fn check(&self, requirement: Requirement) -> Result<(), ConfigError> {
        if requirement == Requirement::Required && self.memcached_inst_ports.is_none() {
            tracing::warn!("Parameter memcached_inst_ports must be defined, example: 11211,11212");
            return Err(ConfigError::MissingPorts);
        }
        Ok(())
    }

    /// Endpoints listed in `memcached_inst_ports`
    pub fn endpoints(&self) -> Vec<Endpoint> {
        self.memcached_inst_ports
            .as_deref()
            .map(endpoint::parse)
            .unwrap_or_default()
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let mut paths = vec![PathBuf::from("/etc/mcprobe/mcprobe.yaml")];

        if let Some(home_path) = Self::home_config_path() {
            paths.push(home_path);
        }

        paths.push(PathBuf::from("./mcprobe.yaml"));

        paths.into_iter().find(|p: &PathBuf| p.is_file())
    }

    /// Get home directory config path
    fn home_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".config/mcprobe/mcprobe.yaml"))
    }
}
