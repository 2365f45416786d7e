//! Configuration loading, validation, and persistence for Tally.
//!
//! Loads configuration from `~/.tally/config.toml` with environment
//! variable overrides. The result is an explicit [`AppConfig`] value that
//! the caller reads once at startup and passes to the assistant client;
//! nothing here is global.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tally_core::ApiKey;

/// Environment variables consulted for the API key, highest priority first.
pub const API_KEY_ENV_VARS: [&str; 2] = ["DEEPSEEK_API_KEY", "TALLY_API_KEY"];

/// The root configuration structure.
///
/// Maps directly to `~/.tally/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Provider API key (environment variables take precedence)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Chat-completion endpoint
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Model identifier sent with every request
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens per reply
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Rate-limit retry policy
    #[serde(default)]
    pub retry: RetryConfig,

    /// HTTP transport timeouts
    #[serde(default)]
    pub http: HttpConfig,

    /// Conversation history limits
    #[serde(default)]
    pub history: HistoryConfig,
}

fn default_api_url() -> String {
    "https://api.deepseek.com/v1/chat/completions".into()
}
fn default_model() -> String {
    "deepseek-chat".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    1000
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("retry", &self.retry)
            .field("http", &self.http)
            .field("history", &self.history)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts, including the first one
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Wait before the first retry; doubles for each later retry
    #[serde(default = "default_base_delay_secs")]
    pub base_delay_secs: u64,
}

fn default_max_attempts() -> u32 {
    3
}
fn default_base_delay_secs() -> u64 {
    5
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_secs: default_base_delay_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_timeout_secs")]
    pub read_timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_timeout_secs(),
            read_timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Sliding-window size in messages; 0 keeps the whole conversation
    #[serde(default)]
    pub max_messages: usize,
}

impl HistoryConfig {
    pub fn window(&self) -> Option<usize> {
        (self.max_messages > 0).then_some(self.max_messages)
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.tally/config.toml).
    ///
    /// Environment variables override the file:
    /// - `DEEPSEEK_API_KEY` (highest priority), then `TALLY_API_KEY`
    /// - `TALLY_MODEL`
    /// - `TALLY_API_URL`
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from(&Self::config_path())?;
        config.apply_env_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Load configuration from a specific file path. A missing file yields
    /// defaults; the file is never created here.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides through `lookup` (normally `std::env::var`).
    /// Blank values are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(key) = API_KEY_ENV_VARS.iter().find_map(|name| non_blank(*name)) {
            self.api_key = Some(key);
        }
        if let Some(model) = non_blank("TALLY_MODEL") {
            self.model = model;
        }
        if let Some(url) = non_blank("TALLY_API_URL") {
            self.api_url = url;
        }
    }

    /// Resolve the API key, failing when none is configured.
    pub fn api_key(&self) -> Result<ApiKey, ConfigError> {
        let raw = self.api_key.as_deref().unwrap_or_default();
        ApiKey::new(raw).map_err(|_| ConfigError::MissingApiKey)
    }

    /// Check if a non-blank API key is available (from file or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key().is_ok()
    }

    /// Get the configuration directory path (`TALLY_CONFIG_DIR` or `~/.tally`).
    pub fn config_dir() -> PathBuf {
        match std::env::var("TALLY_CONFIG_DIR") {
            Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
            _ => dirs_home().join(".tally"),
        }
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Write a default config file if none exists. Returns whether a file
    /// was created.
    pub fn init_default_file(path: &Path) -> Result<bool, ConfigError> {
        if path.exists() {
            return Ok(false);
        }
        Self::default().save_to(path)?;
        tracing::info!("Created default config at {}", path.display());
        Ok(true)
    }

    /// Persist an API key into the file at `path`, keeping every other
    /// setting. A blank key removes the stored one.
    pub fn save_api_key(path: &Path, key: &str) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;
        let key = key.trim();
        config.api_key = (!key.is_empty()).then(|| key.to_string());
        config.save_to(path)?;
        tracing::info!("Updated API key in {}", path.display());
        Ok(config)
    }

    /// Serialize this configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        self.validate()?;
        let write_err = |e: std::io::Error| ConfigError::WriteError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        std::fs::write(path, content).map_err(write_err)
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::ValidationError(
                "temperature must be between 0.0 and 2.0".into(),
            ));
        }
        if self.max_tokens == 0 {
            return Err(ConfigError::ValidationError("max_tokens must be > 0".into()));
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "retry.max_attempts must be at least 1".into(),
            ));
        }
        if self.http.connect_timeout_secs == 0 || self.http.read_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "http timeouts must be > 0".into(),
            ));
        }
        if self.api_url.trim().is_empty() {
            return Err(ConfigError::ValidationError("api_url cannot be empty".into()));
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_api_url(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            retry: RetryConfig::default(),
            http: HttpConfig::default(),
            history: HistoryConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Failed to write config file at {path}: {reason}")]
    WriteError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    #[error("No API key configured (set DEEPSEEK_API_KEY or run `tally set-key`)")]
    MissingApiKey,
}
