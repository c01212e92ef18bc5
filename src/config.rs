//! Configuration loading and management for newsbrief.
//!
//! Loads settings from `newsbrief.toml` with environment variable overrides for sensitive data.
//! Every section has defaults, so a missing config file is not an error, but a missing
//! `NEWS_API_KEY` is.

use crate::summary::SummarySettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const CONFIG_FILE: &str = "newsbrief.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("missing required API key: set {0}")]
    MissingApiKey(String),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// News provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsConfig {
    /// Search endpoint (NewsAPI `everything` compatible)
    pub base_url: String,
    /// Language filter sent with every query
    pub language: String,
    /// Maximum number of articles per digest
    pub max_articles: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Summarizer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Summarizer: "extractive" (offline) or "gemini"
    pub provider: String,
    /// Model identifier (e.g., "gemini-2.0-flash")
    pub model: String,
    /// System persona for the LLM summarizer
    pub persona: String,
}

/// API keys configuration (loaded from environment)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiConfig {
    #[serde(default, skip_serializing)]
    pub news_key: Option<String>,
    #[serde(default, skip_serializing)]
    pub gemini_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// How long a digest stays valid for an identical topic
    pub ttl_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default filter when `RUST_LOG` is unset
    pub level: String,
    /// Log file used while the TUI owns the terminal
    pub file: Option<PathBuf>,
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub news: NewsConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub summary: SummarySettings,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub log: LogConfig,
}

impl Config {
    /// Load configuration from the default location (newsbrief.toml in cwd or home),
    /// falling back to built-in defaults when no file exists.
    pub fn load() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        let mut config = match Self::find_config_file() {
            Some(path) => Self::parse_file(&path)?,
            None => Config::default(),
        };
        config.apply_env(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        let mut config = Self::parse_file(path)?;
        config.apply_env(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    fn parse_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration text without touching the environment
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Override API keys from environment variables
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("NEWS_API_KEY").filter(|k| !k.trim().is_empty()) {
            self.api.news_key = Some(key);
        }
        if let Some(key) = lookup("GEMINI_API_KEY").filter(|k| !k.trim().is_empty()) {
            self.api.gemini_key = Some(key);
        }
    }

    /// Check the settings the pipeline cannot run without
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.news_api_key()?;
        if self.news.max_articles == 0 {
            return Err(ConfigError::Invalid("news.max_articles must be at least 1".into()));
        }
        if self.summary.min_words > self.summary.max_words {
            return Err(ConfigError::Invalid(format!(
                "summary.min_words ({}) exceeds summary.max_words ({})",
                self.summary.min_words, self.summary.max_words
            )));
        }
        if self.summary.max_input_chars == 0 {
            return Err(ConfigError::Invalid("summary.max_input_chars must be positive".into()));
        }
        Ok(())
    }

    /// Find the config file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        // Check current directory first
        let local_config = PathBuf::from(CONFIG_FILE);
        if local_config.exists() {
            return Some(local_config);
        }

        // Check home directory
        let home = dirs::home_dir()?;
        let home_config = home.join(".config").join("newsbrief").join(CONFIG_FILE);
        home_config.exists().then_some(home_config)
    }

    /// The news provider key; required for every run
    pub fn news_api_key(&self) -> Result<&str, ConfigError> {
        self.api
            .news_key
            .as_deref()
            .ok_or_else(|| ConfigError::MissingApiKey("NEWS_API_KEY".to_string()))
    }

    /// Get the API key for the configured summarizer provider
    pub fn agent_api_key(&self) -> Result<&str, ConfigError> {
        match self.agent.provider.as_str() {
            "gemini" => self
                .api
                .gemini_key
                .as_deref()
                .ok_or_else(|| ConfigError::MissingApiKey("GEMINI_API_KEY".to_string())),
            other => Err(ConfigError::Invalid(format!(
                "summarizer provider '{}' does not use an API key",
                other
            ))),
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.ttl_secs)
    }
}

impl NewsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://newsapi.org/v2/everything".to_string(),
            language: "en".to_string(),
            max_articles: 5,
            timeout_secs: 10,
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            provider: "extractive".to_string(),
            model: "gemini-2.0-flash".to_string(),
            persona: "You are a news editor who writes short, neutral, factual briefs.".to_string(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_secs: 900 }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            file: None,
        }
    }
}
