//! Agent process configuration loading from file and environment variables.

use serde::Deserialize;
use thiserror::Error;
use voxrag_retrieval::{EmbeddingConfig, PineconeConfig, RetrievalConfig};
use voxrag_voice::OpenAiConfig;

/// Top-level agent configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub agent: AgentSettings,

    /// Hosted LLM, transcription and speech provider.
    #[serde(default)]
    pub openai: OpenAiConfig,

    #[serde(default)]
    pub embedding: EmbeddingSettings,

    #[serde(default)]
    pub pinecone: PineconeConfig,

    #[serde(default)]
    pub retrieval: RetrievalConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Identity and opening behaviour of the agent.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentSettings {
    /// Name the agent registers under. Must equal the token server's
    /// `dispatch.agent_name`.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Extra instruction for the opening reply of every session.
    #[serde(default = "default_greeting")]
    pub greeting: String,
}

/// Embedding model used for retrieval queries. Credentials and base URL are
/// shared with the `openai` section.
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingSettings {
    #[serde(default = "default_embedding_model")]
    pub model: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "voxrag_agent=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

fn default_agent_name() -> String {
    "voice-agent".to_string()
}

fn default_greeting() -> String {
    "Greet the user and offer assistance.".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-ada-002".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            greeting: default_greeting(),
        }
    }
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            model: default_embedding_model(),
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
    /// Embedding client settings derived from the provider section.
    pub fn embedding_config(&self) -> EmbeddingConfig {
        EmbeddingConfig {
            api_key: self.openai.api_key.clone(),
            base_url: self.openai.base_url.clone(),
            model: self.embedding.model.clone(),
            request_timeout_seconds: self.openai.request_timeout_seconds,
        }
    }

    /// Checks that every required value is present and usable.
    ///
    /// # Errors
    ///
    /// Returns the first missing or invalid value found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            (&self.pinecone.api_key, "pinecone.api_key", "PINECONE_API_KEY"),
            (&self.pinecone.index, "pinecone.index", "PINECONE_INDEX"),
            (&self.openai.api_key, "openai.api_key", "OPENAI_API_KEY"),
        ];
        for (value, key, env) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Missing { key, env });
            }
        }

        if self.agent.name.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "agent.name",
                reason: "must not be empty".to_string(),
            });
        }
        if self.retrieval.top_k == 0 {
            return Err(ConfigError::Invalid {
                key: "retrieval.top_k",
                reason: "must be at least 1".to_string(),
            });
        }
        if !self.retrieval.score_threshold.is_finite() {
            return Err(ConfigError::Invalid {
                key: "retrieval.score_threshold",
                reason: "must be a finite number".to_string(),
            });
        }
        Ok(())
    }
}

/// Loads configuration from a TOML file, falling back to defaults, then
/// applies environment overrides. Does not validate.
///
/// Environment variable overrides:
/// - `PINECONE_API_KEY`, `PINECONE_INDEX`, `PINECONE_HOST`
/// - `OPENAI_API_KEY`, `OPENAI_BASE_URL`
/// - `VOXRAG_AGENT_NAME` overrides `agent.name`
/// - `VOXRAG_TOP_K` overrides `retrieval.top_k`
/// - `VOXRAG_SCORE_THRESHOLD` overrides `retrieval.score_threshold`
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

/// Applies overrides from `lookup`, which maps a variable name to its value.
pub fn apply_env_overrides(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(key) = lookup("PINECONE_API_KEY") {
        config.pinecone.api_key = key;
    }
    if let Some(index) = lookup("PINECONE_INDEX") {
        config.pinecone.index = index;
    }
    if let Some(host) = lookup("PINECONE_HOST").filter(|h| !h.trim().is_empty()) {
        config.pinecone.host = Some(host);
    }
    if let Some(key) = lookup("OPENAI_API_KEY") {
        config.openai.api_key = key;
    }
    if let Some(url) = lookup("OPENAI_BASE_URL").filter(|u| !u.trim().is_empty()) {
        config.openai.base_url = url;
    }
    if let Some(name) = lookup("VOXRAG_AGENT_NAME") {
        config.agent.name = name;
    }
    if let Some(top_k) = lookup("VOXRAG_TOP_K") {
        match top_k.parse() {
            Ok(parsed) => config.retrieval.top_k = parsed,
            Err(_) => tracing::warn!(value = %top_k, "ignoring unparseable VOXRAG_TOP_K"),
        }
    }
    if let Some(threshold) = lookup("VOXRAG_SCORE_THRESHOLD") {
        match threshold.parse() {
            Ok(parsed) => config.retrieval.score_threshold = parsed,
            Err(_) => {
                tracing::warn!(value = %threshold, "ignoring unparseable VOXRAG_SCORE_THRESHOLD")
            }
        }
    }
    if let Some(level) = lookup("VOXRAG_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(json) = lookup("VOXRAG_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    fn complete_env() -> Vec<(&'static str, &'static str)> {
        vec![
            ("PINECONE_API_KEY", "pc-key"),
            ("PINECONE_INDEX", "kb"),
            ("OPENAI_API_KEY", "sk-key"),
        ]
    }

    #[test]
    fn defaults_match_the_deployed_agent() {
        let config = Config::default();
        assert_eq!(config.agent.name, "voice-agent");
        assert_eq!(config.agent.greeting, "Greet the user and offer assistance.");
        assert_eq!(config.embedding.model, "text-embedding-ada-002");
        assert_eq!(config.openai.llm_model, "gpt-4o-mini");
        assert_eq!(config.retrieval.top_k, 4);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn env_supplies_required_values() {
        let mut config = Config::default();
        apply_env_overrides(&mut config, env(&complete_env()));
        assert!(config.validate().is_ok());
        assert_eq!(config.pinecone.index, "kb");
    }

    #[test]
    fn each_missing_value_names_its_variable() {
        for missing in ["PINECONE_API_KEY", "PINECONE_INDEX", "OPENAI_API_KEY"] {
            let pairs: Vec<_> = complete_env()
                .into_iter()
                .filter(|(k, _)| *k != missing)
                .collect();
            let mut config = Config::default();
            apply_env_overrides(&mut config, env(&pairs));

            match config.validate() {
                Err(ConfigError::Missing { env, .. }) => assert_eq!(env, missing),
                other => panic!("Expected Missing for {}, got {:?}", missing, other),
            }
        }
    }

    #[test]
    fn retrieval_overrides_parse_and_bad_values_are_ignored() {
        let mut config = Config::default();
        apply_env_overrides(
            &mut config,
            env(&[("VOXRAG_TOP_K", "8"), ("VOXRAG_SCORE_THRESHOLD", "nope")]),
        );
        assert_eq!(config.retrieval.top_k, 8);
        assert!((config.retrieval.score_threshold - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn zero_top_k_is_rejected() {
        let mut config = Config::default();
        apply_env_overrides(&mut config, env(&complete_env()));
        config.retrieval.top_k = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                key: "retrieval.top_k",
                ..
            })
        ));
    }

    #[test]
    fn embedding_config_shares_provider_credentials() {
        let mut config = Config::default();
        config.openai.api_key = "sk-key".to_string();
        config.openai.base_url = "http://localhost:9999/v1".to_string();
        config.embedding.model = "text-embedding-3-small".to_string();

        let embedding = config.embedding_config();
        assert_eq!(embedding.api_key, "sk-key");
        assert_eq!(embedding.base_url, "http://localhost:9999/v1");
        assert_eq!(embedding.model, "text-embedding-3-small");
    }
}
