//! Server configuration loading from file and environment variables.

use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use thiserror::Error;
use voxrag_voice::{DispatchConfig, LiveKitConfig};

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server network settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Room platform connection and signing credentials.
    #[serde(default)]
    pub livekit: LiveKitConfig,

    /// Room naming and agent dispatch.
    #[serde(default)]
    pub dispatch: DispatchConfig,
}

/// Network configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "voxrag_server=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// A required value is absent from both the file and the environment.
    #[error("missing required configuration: {key} (set {env})")]
    Missing { key: &'static str, env: &'static str },

    /// A value is present but unusable.
    #[error("invalid configuration for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl Config {
    /// Checks that the platform credentials are present and that tokens
    /// name an agent to dispatch.
    ///
    /// # Errors
    ///
    /// Returns the first missing or invalid value found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            (&self.livekit.url, "livekit.url", "LIVEKIT_URL"),
            (&self.livekit.api_key, "livekit.api_key", "LIVEKIT_API_KEY"),
            (&self.livekit.api_secret, "livekit.api_secret", "LIVEKIT_API_SECRET"),
        ];
        for (value, key, env) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Missing { key, env });
            }
        }

        if self.dispatch.agent_name.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "dispatch.agent_name",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Environment variable overrides:
/// - `LIVEKIT_URL`, `LIVEKIT_API_KEY`, `LIVEKIT_API_SECRET`
/// - `VOXRAG_TOKEN_TTL_SECONDS` overrides `livekit.token_ttl_seconds`
/// - `VOXRAG_AGENT_NAME` overrides `dispatch.agent_name`
/// - `VOXRAG_ROOM_PREFIX` overrides `dispatch.room_prefix`
/// - `VOXRAG_DISPATCH_METADATA` overrides `dispatch.include_metadata`
/// - `VOXRAG_EXPLICIT_GRANTS` overrides `dispatch.explicit_grants`
/// - `VOXRAG_HOST` overrides `server.host`
/// - `VOXRAG_PORT` overrides `server.port`
/// - `VOXRAG_LOG_LEVEL` overrides `logging.level`
/// - `VOXRAG_LOG_JSON` overrides `logging.json` (set to "true" to enable)
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

fn parse_flag(value: &str) -> bool {
    value == "true" || value == "1"
}

/// Applies overrides from `lookup`, which maps a variable name to its value.
pub fn apply_env_overrides(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(url) = lookup("LIVEKIT_URL") {
        config.livekit.url = url;
    }
    if let Some(key) = lookup("LIVEKIT_API_KEY") {
        config.livekit.api_key = key;
    }
    if let Some(secret) = lookup("LIVEKIT_API_SECRET") {
        config.livekit.api_secret = secret;
    }
    if let Some(ttl) = lookup("VOXRAG_TOKEN_TTL_SECONDS") {
        if let Ok(parsed) = ttl.parse() {
            config.livekit.token_ttl_seconds = parsed;
        }
    }
    if let Some(name) = lookup("VOXRAG_AGENT_NAME") {
        config.dispatch.agent_name = name;
    }
    if let Some(prefix) = lookup("VOXRAG_ROOM_PREFIX") {
        config.dispatch.room_prefix = prefix;
    }
    if let Some(flag) = lookup("VOXRAG_DISPATCH_METADATA") {
        config.dispatch.include_metadata = parse_flag(&flag);
    }
    if let Some(flag) = lookup("VOXRAG_EXPLICIT_GRANTS") {
        config.dispatch.explicit_grants = parse_flag(&flag);
    }
    if let Some(host) = lookup("VOXRAG_HOST") {
        if let Ok(parsed) = host.parse() {
            config.server.host = parsed;
        }
    }
    if let Some(port) = lookup("VOXRAG_PORT") {
        if let Ok(parsed) = port.parse() {
            config.server.port = parsed;
        }
    }
    if let Some(level) = lookup("VOXRAG_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(json) = lookup("VOXRAG_LOG_JSON") {
        config.logging.json = parse_flag(&json);
    }
}
