//! Configuration loading for breve.
//!
//! Loads settings from `breve.toml` with an environment variable override
//! for the API key. Everything has a default, so no file is required.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";
pub const DEFAULT_API_BASE: &str = "https://api.groq.com/openai/v1";

const CONFIG_FILE: &str = "breve.toml";
const API_KEY_VAR: &str = "GROQ_API_KEY";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// LLM settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Model identifier passed to the completions endpoint
    pub model: String,
    /// Base URL of the OpenAI-compatible API
    pub api_base: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

/// API key configuration. A key set here skips the interactive prompt;
/// it is never written back to disk by the tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub groq_key: Option<String>,
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub agent: AgentConfig,
    pub api: ApiConfig,
}

impl Config {
    /// Load configuration from the default locations (`breve.toml` in the
    /// current directory, then under `~/.config/breve/`), falling back to
    /// built-in defaults when no file exists. `GROQ_API_KEY` always wins
    /// over a key from the file.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match Self::find_config_file() {
            Some(path) => Self::load_from(&path)?,
            None => Config::default(),
        };
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Apply environment overrides; the lookup is injectable for tests.
    pub fn apply_env(&mut self, get: impl Fn(&str) -> Option<String>) {
        if let Some(key) = get(API_KEY_VAR) {
            self.api.groq_key = Some(key);
        }
    }

    /// Find the config file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let local_config = PathBuf::from(CONFIG_FILE);
        if local_config.exists() {
            return Some(local_config);
        }

        let home_config = dirs::home_dir()?
            .join(".config")
            .join("breve")
            .join(CONFIG_FILE);
        home_config.exists().then_some(home_config)
    }
}
