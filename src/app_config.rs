//! Application configuration module
//!
//! This module handles loading, validating and saving the settings
//! shared by every translation session.

use std::fs;
use std::path::{Path, PathBuf};

use log::{LevelFilter, warn};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::ConfigError;
use crate::language_utils;
use crate::model_limits::ModelTokenLimits;
use crate::providers::{CacheMode, RetryMode};
use crate::providers::client::DEFAULT_USER_AGENT;
use crate::translation::TruncationMode;

/// Directory name under the platform config dir
const APP_DIR_NAME: &str = "subctx";

/// Config file name
const CONFIG_FILE_NAME: &str = "config.json";

/// Bare numeric login tokens at or above this value are delays, below it retry modes
const LOGIN_DELAY_THRESHOLD: u64 = 1000;

/// Source language spellings that mean "detect automatically"
const AUTO_DETECT_ALIASES: [&str; 4] = ["", "auto", "auto detect", "auto_detect"];

/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Bearer credential, empty when the endpoint needs none
    pub api_key: String,

    /// Model identifier sent with every request
    #[serde(alias = "selected_model")]
    pub model: String,

    /// Chat completions URL; the responses URL is derived from it
    pub api_url: String,

    /// Fixed delay between attempts in milliseconds
    pub delay_ms: u64,

    /// Retry policy, 0..=3
    pub retry_mode: RetryMode,

    /// Token budget for prior dialogue
    pub context_token_budget: usize,

    /// What to do with the entry that overflows the budget
    pub context_truncation_mode: TruncationMode,

    /// Whether the caching endpoint is tried first
    pub context_cache_mode: CacheMode,

    /// Per-model token ceilings
    pub model_token_limits: ModelTokenLimits,

    pub user_agent: String,

    /// Source language code (ISO), empty for auto detection
    pub source_language: String,

    /// Target language code (ISO)
    pub target_language: String,

    /// Temperature parameter for text generation
    pub temperature: f32,

    /// Per-request transport timeout in seconds
    pub timeout_secs: u64,

    /// Log level
    pub log_level: LogLevel,
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            Self::Error => LevelFilter::Error,
            Self::Warn => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
            Self::Trace => LevelFilter::Trace,
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            other => Err(format!("Invalid log level: {}", other)),
        }
    }
}

fn default_model() -> String {
    "gpt-5-nano".to_string()
}

fn default_api_url() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_context_token_budget() -> usize {
    6000
}

fn default_target_language() -> String {
    "en".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            api_key: String::new(),
            model: default_model(),
            api_url: default_api_url(),
            delay_ms: 0,
            retry_mode: RetryMode::default(),
            context_token_budget: default_context_token_budget(),
            context_truncation_mode: TruncationMode::default(),
            context_cache_mode: CacheMode::default(),
            model_token_limits: ModelTokenLimits::default(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            source_language: String::new(),
            target_language: default_target_language(),
            temperature: 0.0,
            timeout_secs: default_timeout_secs(),
            log_level: LogLevel::default(),
        }
    }
}

/// Platform config location, e.g. `~/.config/subctx/config.json` on Linux
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
        .join(CONFIG_FILE_NAME)
}

impl Config {
    /// Load the config at `path`, or the defaults if it does not exist
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Write the config as pretty JSON, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Token ceiling for the configured model
    pub fn max_model_tokens(&self) -> usize {
        self.model_token_limits.max_tokens_for(&self.model)
    }

    /// Apply a `model|url|nullkey|delay=N|retryN|cache=M|N` login string.
    ///
    /// The first token is always the model. Unrecognised tokens are ignored.
    pub fn update_from_login_string(&mut self, login: &str) {
        let mut tokens = login.split('|').map(str::trim).filter(|t| !t.is_empty());

        let Some(model) = tokens.next() else {
            return;
        };
        self.model = model.to_string();

        for token in tokens {
            let lowered = token.to_lowercase();
            if lowered.starts_with("http://") || lowered.starts_with("https://") {
                self.api_url = token.to_string();
            } else if lowered == "nullkey" {
                self.api_key.clear();
            } else if let Some(value) = lowered.strip_prefix("delay=") {
                self.delay_ms = value.trim().parse().unwrap_or(0);
            } else if lowered.starts_with("retry") {
                let digits: String = lowered.chars().filter(char::is_ascii_digit).collect();
                if !digits.is_empty() {
                    self.set_retry_mode_from_token(&digits);
                }
            } else if let Some(mode) = lowered.strip_prefix("cache=") {
                self.context_cache_mode = mode.parse().unwrap_or_default();
            } else if !lowered.is_empty() && lowered.chars().all(|c| c.is_ascii_digit()) {
                match lowered.parse::<u64>() {
                    Ok(value) if value >= LOGIN_DELAY_THRESHOLD => self.delay_ms = value,
                    Ok(_) => self.set_retry_mode_from_token(&lowered),
                    Err(_) => warn!("Ignoring numeric login token '{}'", token),
                }
            }
        }
    }

    fn set_retry_mode_from_token(&mut self, digits: &str) {
        let mode = digits
            .parse::<u8>()
            .map_err(|e| e.to_string())
            .and_then(RetryMode::try_from);
        match mode {
            Ok(mode) => self.retry_mode = mode,
            Err(reason) => warn!("Ignoring retry token '{}': {}", digits, reason),
        }
    }

    /// Map the auto-detect spellings to an empty source and default the target
    pub fn normalise_languages(&mut self) {
        let source = self.source_language.trim().to_lowercase();
        if AUTO_DETECT_ALIASES.contains(&source.as_str()) {
            self.source_language.clear();
        }
        if self.target_language.trim().is_empty() {
            self.target_language = default_target_language();
        }
    }

    /// Sorted `key=value` lines; nested values are rendered as JSON
    pub fn to_key_value_lines(&self) -> Result<Vec<String>, ConfigError> {
        let value = serde_json::to_value(self)?;
        let Some(map) = value.as_object() else {
            return Ok(Vec::new());
        };

        let mut keys: Vec<&String> = map.keys().collect();
        keys.sort();

        let lines = keys
            .into_iter()
            .map(|key| match &map[key] {
                serde_json::Value::String(text) => format!("{}={}", key, text),
                other => format!("{}={}", key, other),
            })
            .collect();
        Ok(lines)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<(), ConfigError> {
        Url::parse(&self.api_url).map_err(|e| ConfigError::InvalidValue {
            field: "api_url",
            reason: e.to_string(),
        })?;

        language_utils::validate_language_code(&self.target_language).map_err(|e| ConfigError::InvalidValue {
            field: "target_language",
            reason: e.to_string(),
        })?;

        if !self.source_language.is_empty() {
            language_utils::validate_language_code(&self.source_language).map_err(|e| {
                ConfigError::InvalidValue {
                    field: "source_language",
                    reason: e.to_string(),
                }
            })?;
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::InvalidValue {
                field: "temperature",
                reason: format!("must be between 0.0 and 2.0, got {}", self.temperature),
            });
        }

        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "timeout_secs",
                reason: "must be at least 1 second".to_string(),
            });
        }

        Ok(())
    }
}
