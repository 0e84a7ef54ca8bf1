//! Configuration file support.
//!
//! TOML configuration with environment variable overrides for secrets.
//!
//! # Configuration File Format
//!
//! ```toml
//! [api_keys]
//! anthropic = "your-api-key"
//!
//! [llm]
//! model = "claude-3-5-haiku-20241022"
//! max_tokens = 8000
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{ApiKeys, Config, LlmConfig};

/// Configuration file structure
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    /// API keys section
    #[serde(default)]
    pub api_keys: FileApiKeys,

    /// Relevance-model section
    #[serde(default)]
    pub llm: LlmConfig,
}

/// API keys as written in the file (no env fallback at parse time)
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct FileApiKeys {
    #[serde(default)]
    pub anthropic: Option<String>,
}

/// Errors loading a configuration file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Load a configuration file and resolve it against the environment.
///
/// `ANTHROPIC_API_KEY` in the environment takes precedence over the file.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    let file: ConfigFile = toml::from_str(&contents)?;

    let env_keys = ApiKeys::default();
    Ok(Config {
        api_keys: ApiKeys {
            anthropic: env_keys.anthropic.or(file.api_keys.anthropic),
        },
        llm: file.llm,
    })
}

/// Look for a config file in the standard locations: the working directory
/// first, then the user config directory.
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("clinical-trials-mcp.toml");
    if local.exists() {
        return Some(local);
    }

    let user = dirs::config_dir()?
        .join("clinical-trials-mcp")
        .join("config.toml");
    user.exists().then_some(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let file: ConfigFile = toml::from_str(
            r#"
            [api_keys]
            anthropic = "sk-test"

            [llm]
            model = "claude-3-5-haiku-20241022"
            max_tokens = 4000
            "#,
        )
        .unwrap();

        assert_eq!(file.api_keys.anthropic.as_deref(), Some("sk-test"));
        assert_eq!(file.llm.max_tokens, 4000);
    }

    #[test]
    fn empty_config_uses_defaults() {
        let file: ConfigFile = toml::from_str("").unwrap();
        assert!(file.api_keys.anthropic.is_none());
        assert_eq!(file.llm.model, crate::llm::DEFAULT_MODEL);
    }
}
