//! Configuration management.

mod file_config;

pub use file_config::{find_config_file, load_config, ConfigError, ConfigFile};

use serde::{Deserialize, Serialize};

use crate::llm::{DEFAULT_MAX_TOKENS, DEFAULT_MODEL};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API keys for external services
    #[serde(default)]
    pub api_keys: ApiKeys,

    /// Relevance-model settings
    #[serde(default)]
    pub llm: LlmConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_keys: ApiKeys::default(),
            llm: LlmConfig::default(),
        }
    }
}

/// API keys for external services
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeys {
    /// Anthropic API key used for relevance analysis
    #[serde(default)]
    pub anthropic: Option<String>,
}

impl Default for ApiKeys {
    fn default() -> Self {
        Self {
            anthropic: std::env::var("ANTHROPIC_API_KEY").ok(),
        }
    }
}

/// Relevance-model settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Model identifier sent to the Messages API
    #[serde(default = "default_model")]
    pub model: String,

    /// Response token bound
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            max_tokens: default_max_tokens(),
        }
    }
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

/// Get the effective configuration from the environment only.
pub fn get_config() -> Config {
    Config::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_llm_settings() {
        let config = Config::default();
        assert_eq!(config.llm.model, DEFAULT_MODEL);
        assert_eq!(config.llm.max_tokens, DEFAULT_MAX_TOKENS);
    }
}
