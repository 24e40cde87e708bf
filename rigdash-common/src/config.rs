use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::keyexpr::{KEY_PREFIX, KeyExprBuilder};
use crate::serialization::Format;

/// Zenoh connection configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ZenohConfig {
    /// Zenoh mode: "client", "peer", or "router".
    #[serde(default = "default_mode")]
    pub mode: String,

    /// Endpoints to connect to (for client mode).
    #[serde(default)]
    pub connect: Vec<String>,

    /// Endpoints to listen on (for peer/router mode).
    #[serde(default)]
    pub listen: Vec<String>,
}

fn default_mode() -> String {
    "peer".to_string()
}

impl Default for ZenohConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            connect: Vec::new(),
            listen: Vec::new(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text format (default).
    #[default]
    Text,
    /// Structured JSON format.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format: "text" or "json".
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Dashboard behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Key expression prefix shared with the feed (default: "rigdash").
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    /// Encoding of outgoing control payloads. Incoming payloads are auto-detected.
    #[serde(default)]
    pub serialization: Format,

    /// URL scheme of a device's management page (default: "http").
    #[serde(default = "default_management_scheme")]
    pub management_scheme: String,

    /// How long a toggle state check waits for its reply.
    #[serde(default = "default_check_timeout_ms")]
    pub check_timeout_ms: u64,
}

fn default_key_prefix() -> String {
    KEY_PREFIX.to_string()
}

fn default_management_scheme() -> String {
    "http".to_string()
}

fn default_check_timeout_ms() -> u64 {
    3000
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            key_prefix: default_key_prefix(),
            serialization: Format::default(),
            management_scheme: default_management_scheme(),
            check_timeout_ms: default_check_timeout_ms(),
        }
    }
}

impl DashboardConfig {
    /// Key expression builder for the configured prefix.
    pub fn keys(&self) -> KeyExprBuilder {
        KeyExprBuilder::with_prefix(self.key_prefix.clone())
    }

    pub fn check_timeout(&self) -> Duration {
        Duration::from_millis(self.check_timeout_ms)
    }

    /// URL of a device's management page.
    pub fn management_url(&self, address: &str) -> String {
        format!("{}://{}", self.management_scheme, address)
    }

    /// Reject values the dashboard cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.key_prefix.trim_matches('/').is_empty() {
            return Err(Error::Config("key_prefix must not be empty".to_string()));
        }
        if self.key_prefix.contains(['*', '$', '?', '#']) {
            return Err(Error::Config(format!(
                "key_prefix '{}' contains wildcard or reserved characters",
                self.key_prefix
            )));
        }
        if self.management_scheme.is_empty() {
            return Err(Error::Config(
                "management_scheme must not be empty".to_string(),
            ));
        }
        if self.check_timeout_ms == 0 {
            return Err(Error::Config(
                "check_timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Complete rigdash configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RigdashConfig {
    /// Zenoh connection settings.
    #[serde(default)]
    pub zenoh: ZenohConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Dashboard settings.
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

impl RigdashConfig {
    /// Load and validate a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let config: Self = load_config(path)?;
        config.dashboard.validate()?;
        Ok(config)
    }
}

/// Load a configuration file in JSON5 format.
pub fn load_config<T: for<'de> Deserialize<'de>>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!(
            "Failed to read config file '{}': {}",
            path.display(),
            e
        ))
    })?;

    json5::from_str(&content).map_err(|e| {
        Error::Config(format!(
            "Failed to parse config file '{}': {}",
            path.display(),
            e
        ))
    })
}

/// Load a configuration from a JSON5 string.
pub fn parse_config<T: for<'de> Deserialize<'de>>(content: &str) -> Result<T> {
    json5::from_str(content).map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
}
