use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;
use crate::poll::PollPolicy;

pub const IMAGE_KEY_ENV: &str = "MAGIC_HOUR_API_KEY";
pub const TEXT_KEY_ENV: &str = "GEMINI_API_KEY";

pub const DEFAULT_IMAGE_BASE_URL: &str = "https://api.magichour.ai/v1";
pub const DEFAULT_TEXT_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent";
const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
const DEFAULT_POLL_MAX_ATTEMPTS: u32 = 10;
const DEFAULT_FUN_FACT_INTERVAL_SECS: u64 = 5;

/// On-disk configuration. Every field is optional; `resolve` fills defaults
/// and checks that the required keys are present.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Config {
    pub image_api_key: Option<String>,
    pub text_api_key: Option<String>,
    pub image_base_url: Option<String>,
    pub text_endpoint: Option<String>,
    pub poll_interval_secs: Option<u64>,
    pub poll_max_attempts: Option<u32>,
    pub fun_fact_interval_secs: Option<u64>,
    pub speech_command: Option<String>,
    pub backend_url: Option<String>,
}

/// Validated runtime settings, injected into the clients at construction.
#[derive(Debug, Clone)]
pub struct Settings {
    pub image_api_key: String,
    pub text_api_key: String,
    pub image_base_url: String,
    pub text_endpoint: String,
    pub poll: PollPolicy,
    pub fun_fact_interval: Duration,
    pub speech_command: String,
    pub backend_url: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    /// Load the stored config, apply `edit` and write it back. Returns the
    /// path written.
    pub fn update<F>(edit: F) -> Result<PathBuf, ConfigError>
    where
        F: FnOnce(&mut Config),
    {
        let config_path = Self::get_config_path()?;
        Self::update_at(&config_path, edit)?;
        Ok(config_path)
    }

    /// A file that fails to parse is left untouched and the error returned.
    pub fn update_at<F>(path: &Path, edit: F) -> Result<(), ConfigError>
    where
        F: FnOnce(&mut Config),
    {
        let mut config = Self::load_from(path)?;
        edit(&mut config);
        config.save_to(path)
    }

    /// Resolve against the process environment.
    pub fn resolve(&self) -> Result<Settings, ConfigError> {
        self.resolve_with(|name| std::env::var(name).ok())
    }

    /// Merge environment overrides (env first, then file) and validate.
    pub fn resolve_with<F>(&self, env: F) -> Result<Settings, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let image_api_key = pick_key(env(IMAGE_KEY_ENV), self.image_api_key.as_deref())
            .ok_or(ConfigError::MissingKey {
                name: "image API key",
                env: IMAGE_KEY_ENV,
            })?;
        let text_api_key = pick_key(env(TEXT_KEY_ENV), self.text_api_key.as_deref())
            .ok_or(ConfigError::MissingKey {
                name: "text API key",
                env: TEXT_KEY_ENV,
            })?;

        let poll_interval_secs = self.poll_interval_secs.unwrap_or(DEFAULT_POLL_INTERVAL_SECS);
        let max_attempts = self.poll_max_attempts.unwrap_or(DEFAULT_POLL_MAX_ATTEMPTS);
        if max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "poll_max_attempts",
                reason: "must be at least 1".to_string(),
            });
        }

        let fun_fact_secs = self
            .fun_fact_interval_secs
            .unwrap_or(DEFAULT_FUN_FACT_INTERVAL_SECS);
        if fun_fact_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "fun_fact_interval_secs",
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(Settings {
            image_api_key,
            text_api_key,
            image_base_url: trim_base(self.image_base_url.as_deref(), DEFAULT_IMAGE_BASE_URL),
            text_endpoint: self
                .text_endpoint
                .clone()
                .unwrap_or_else(|| DEFAULT_TEXT_ENDPOINT.to_string()),
            poll: PollPolicy::new(Duration::from_secs(poll_interval_secs), max_attempts),
            fun_fact_interval: Duration::from_secs(fun_fact_secs),
            speech_command: self
                .speech_command
                .clone()
                .unwrap_or_else(|| default_speech_command().to_string()),
            backend_url: self
                .backend_url
                .as_deref()
                .map(|url| url.trim_end_matches('/').to_string()),
        })
    }

    fn get_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;

        Ok(config_dir.join("shallowseek").join("config.json"))
    }
}

fn pick_key(env_value: Option<String>, file_value: Option<&str>) -> Option<String> {
    env_value
        .filter(|k| !k.trim().is_empty())
        .or_else(|| file_value.filter(|k| !k.trim().is_empty()).map(str::to_string))
}

fn trim_base(value: Option<&str>, default: &str) -> String {
    value.unwrap_or(default).trim_end_matches('/').to_string()
}

fn default_speech_command() -> &'static str {
    if cfg!(target_os = "macos") {
        "say"
    } else {
        "espeak"
    }
}
