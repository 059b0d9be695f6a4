//! Configuration management for the XMLMC client
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from YAML files and environment variables.

use crate::error::{Result, XmlmcError};
use crate::session::{DEFAULT_TIMEOUT_SECONDS, DEFAULT_USER_AGENT};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for an XMLMC client
///
/// Holds the defaults applied to new instances, the zone lookup hosts and
/// the logging setup used by the command-line front end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Request timeout in seconds; zero or negative disables the timeout
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: i64,

    /// `User-Agent` header sent on every call
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Ask the server for JSON responses
    #[serde(default)]
    pub json_response: bool,

    /// API key for `ESP-APIKEY` authorization
    #[serde(default)]
    pub api_key: Option<String>,

    /// Trace tag embedded in every method call
    #[serde(default)]
    pub trace: Option<String>,

    /// Reject invocations whose element open/close calls do not balance
    #[serde(default)]
    pub strict_elements: bool,

    /// Zone lookup settings
    #[serde(default)]
    pub zone: ZoneConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_timeout_seconds() -> i64 {
    DEFAULT_TIMEOUT_SECONDS
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout_seconds(),
            user_agent: default_user_agent(),
            json_response: false,
            api_key: None,
            trace: None,
            strict_elements: false,
            zone: ZoneConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Zone lookup configuration
///
/// The primary host is always tried first; the secondary host is tried once
/// when the primary cannot be reached or answers with a non-200 status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneConfig {
    /// Base URL of the primary lookup host
    #[serde(default = "default_zone_primary_url")]
    pub primary_url: String,

    /// Base URL of the fallback lookup host
    #[serde(default = "default_zone_secondary_url")]
    pub secondary_url: String,

    /// Timeout for a single lookup request (seconds)
    #[serde(default = "default_zone_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_zone_primary_url() -> String {
    "https://files.hornbill.com".to_string()
}

fn default_zone_secondary_url() -> String {
    "https://files.hornbill.co".to_string()
}

fn default_zone_timeout_seconds() -> u64 {
    30
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            primary_url: default_zone_primary_url(),
            secondary_url: default_zone_secondary_url(),
            timeout_seconds: default_zone_timeout_seconds(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json_format: bool,

    /// Also append log output to this file
    #[serde(default)]
    pub file_path: Option<PathBuf>,
}

fn default_log_level() -> String {
    "xmlmc=info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
            file_path: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from file with environment overrides
    ///
    /// A missing file is not an error: defaults are used and a warning is
    /// logged.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path.display());
            Self::default()
        };

        config.apply_env_vars();

        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| XmlmcError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| XmlmcError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(api_key) = std::env::var("XMLMC_API_KEY") {
            self.api_key = Some(api_key);
            tracing::debug!("Env override: XMLMC_API_KEY");
        }

        if let Ok(trace) = std::env::var("XMLMC_TRACE") {
            tracing::debug!(trace = %trace, "Env override: XMLMC_TRACE");
            self.trace = Some(trace);
        }

        if let Ok(user_agent) = std::env::var("XMLMC_USER_AGENT") {
            tracing::debug!(user_agent = %user_agent, "Env override: XMLMC_USER_AGENT");
            self.user_agent = user_agent;
        }

        if let Ok(timeout) = std::env::var("XMLMC_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.timeout_seconds = value;
            } else {
                tracing::warn!("Invalid XMLMC_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(json_response) = std::env::var("XMLMC_JSON_RESPONSE") {
            match json_response.parse::<bool>() {
                Ok(v) => self.json_response = v,
                Err(_) => {
                    tracing::warn!("Invalid value for XMLMC_JSON_RESPONSE: {}", json_response);
                }
            }
        }

        if let Ok(primary) = std::env::var("XMLMC_ZONE_PRIMARY_URL") {
            tracing::debug!(primary = %primary, "Env override: XMLMC_ZONE_PRIMARY_URL");
            self.zone.primary_url = primary;
        }

        if let Ok(secondary) = std::env::var("XMLMC_ZONE_SECONDARY_URL") {
            tracing::debug!(secondary = %secondary, "Env override: XMLMC_ZONE_SECONDARY_URL");
            self.zone.secondary_url = secondary;
        }

        if let Ok(level) = std::env::var("XMLMC_LOG_LEVEL") {
            self.logging.level = level;
        }
    }

    /// Validate the configuration
    ///
    /// The request timeout is not range-checked: zero or negative values
    /// are meaningful and disable the timeout.
    ///
    /// # Errors
    ///
    /// Returns error if a zone URL is not an absolute http(s) URL or the
    /// user agent is empty
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("zone.primary_url", &self.zone.primary_url),
            ("zone.secondary_url", &self.zone.secondary_url),
        ] {
            let parsed = url::Url::parse(value).map_err(|e| {
                XmlmcError::Config(format!("{} is not a valid URL ({}): {}", field, value, e))
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(XmlmcError::Config(format!(
                    "{} must use http or https, got: {}",
                    field,
                    parsed.scheme()
                ))
                .into());
            }
        }

        if self.user_agent.trim().is_empty() {
            return Err(XmlmcError::Config("user_agent cannot be empty".to_string()).into());
        }

        Ok(())
    }
}
