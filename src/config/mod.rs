use crate::constants::{self, env_vars};
use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;

pub mod paths;
pub mod validation;

use paths::{get_config_path, get_log_dir_path};
use validation::validate_config;

/// Configuration structure for the application.
/// Handles loading, saving, and managing application settings.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Base URL of the versioned SportsData MLB API.
    #[serde(default = "default_api_domain")]
    pub api_domain: String,
    /// API key appended to every request as the `api_key` query parameter.
    #[serde(default)]
    pub api_key: String,
    /// Path to the log file. If not specified, logs will be written to a default location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file_path: Option<String>,
    /// HTTP timeout in seconds for API requests. Defaults to 30 seconds if not specified.
    #[serde(default = "default_http_timeout")]
    pub http_timeout_seconds: u64,
    /// Client-side request budget per second.
    #[serde(default = "default_rate_limit")]
    pub rate_limit_per_second: u32,
    /// Number of feed fragments kept in the in-memory cache.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
    /// Expiry for date-partitioned fragments. Absent means entries live until evicted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fragment_ttl_seconds: Option<u64>,
    /// UTC offset, in hours, of the calendar the daily feeds are keyed by.
    /// Absent means the offset carried by each game's start time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_date_utc_offset_hours: Option<i32>,
}

fn default_api_domain() -> String {
    constants::DEFAULT_API_DOMAIN.to_string()
}

/// Default HTTP timeout in seconds
fn default_http_timeout() -> u64 {
    constants::DEFAULT_HTTP_TIMEOUT_SECONDS
}

fn default_rate_limit() -> u32 {
    constants::rate_limit::DEFAULT_REQUESTS_PER_SECOND
}

fn default_cache_capacity() -> usize {
    constants::cache::DEFAULT_CAPACITY
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_domain: default_api_domain(),
            api_key: String::new(),
            log_file_path: None,
            http_timeout_seconds: default_http_timeout(),
            rate_limit_per_second: default_rate_limit(),
            cache_capacity: default_cache_capacity(),
            fragment_ttl_seconds: None,
            game_date_utc_offset_hours: None,
        }
    }
}

impl Config {
    /// Loads configuration from the default config file location.
    /// Missing files fall back to defaults; environment variables override
    /// whatever the file says.
    ///
    /// # Environment Variables
    /// - `SPORTSDATA_API_DOMAIN` - Override API domain
    /// - `SPORTSDATA_API_KEY` - Override API key
    /// - `SPORTSDATA_LOG_FILE` - Override log file path
    /// - `SPORTSDATA_HTTP_TIMEOUT` - Override HTTP timeout in seconds
    pub async fn load() -> Result<Self, AppError> {
        let config = Self::read().await?;
        config.validate()?;
        Ok(config)
    }

    /// Reads the config file and environment overrides without validating,
    /// so a half-configured setup can still be displayed or edited.
    pub async fn read() -> Result<Self, AppError> {
        let config_path = get_config_path();

        let mut config = if Path::new(&config_path).exists() {
            Self::load_from_path(&config_path).await?
        } else {
            Config::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Applies `SPORTSDATA_*` environment overrides in place
    pub fn apply_env_overrides(&mut self) {
        if let Ok(api_domain) = std::env::var(env_vars::API_DOMAIN) {
            self.api_domain = api_domain;
        }

        if let Ok(api_key) = std::env::var(env_vars::API_KEY) {
            self.api_key = api_key;
        }

        if let Ok(log_file_path) = std::env::var(env_vars::LOG_FILE) {
            self.log_file_path = Some(log_file_path);
        }

        if let Some(timeout) = std::env::var(env_vars::HTTP_TIMEOUT)
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
        {
            self.http_timeout_seconds = timeout;
        }
    }

    /// Validates the configuration settings
    pub fn validate(&self) -> Result<(), AppError> {
        validate_config(self)
    }

    /// Saves current configuration to the default config file location.
    pub async fn save(&self) -> Result<(), AppError> {
        let config_path = get_config_path();
        self.save_to_path(&config_path).await
    }

    /// Returns the platform-specific path for the config file.
    pub fn get_config_path() -> String {
        paths::get_config_path()
    }

    /// Returns the platform-specific path for the log directory.
    pub fn get_log_dir_path() -> String {
        paths::get_log_dir_path()
    }

    /// Displays current configuration settings to stdout. The API key is masked.
    pub async fn display() -> Result<(), AppError> {
        let config_path = get_config_path();
        let log_dir = get_log_dir_path();
        let config = Config::read().await?;

        println!("\nCurrent Configuration");
        println!("────────────────────────────────────");
        println!("Config Location:");
        if Path::new(&config_path).exists() {
            println!("{config_path}");
        } else {
            println!("{config_path} (not created yet, using defaults)");
        }
        println!("────────────────────────────────────");
        println!("API Domain:");
        println!("{}", config.api_domain);
        println!("API Key:");
        println!("{}", mask_api_key(&config.api_key));
        println!("────────────────────────────────────");
        println!("HTTP Timeout: {} seconds", config.http_timeout_seconds);
        println!("Rate Limit: {} requests/second", config.rate_limit_per_second);
        println!("Cache Capacity: {} fragments", config.cache_capacity);
        match config.fragment_ttl_seconds {
            Some(ttl) => println!("Fragment TTL: {ttl} seconds"),
            None => println!("Fragment TTL: none (evicted by capacity only)"),
        }
        if let Some(hours) = config.game_date_utc_offset_hours {
            println!("Game Date UTC Offset: {hours:+} hours");
        }
        println!("────────────────────────────────────");
        println!("Log File Location:");
        if let Some(custom_path) = &config.log_file_path {
            println!("{custom_path}");
        } else {
            println!("{log_dir}/mlb_sportsdata.log");
            println!("(Default location)");
        }

        Ok(())
    }

    /// Saves configuration to a custom file path, creating the parent
    /// directory when needed.
    ///
    /// # Errors
    /// * `AppError::Config` - If the provided path has no parent directory
    /// * `AppError::Io` - If there's an I/O error creating directories or writing the file
    /// * `AppError::TomlSerialize` - If there's an error serializing the configuration
    pub async fn save_to_path(&self, path: &str) -> Result<(), AppError> {
        let config_dir = Path::new(path).parent().ok_or_else(|| {
            AppError::config_error(format!("Path '{path}' has no parent directory"))
        })?;

        if !config_dir.exists() {
            fs::create_dir_all(config_dir).await?;
        }
        let content = toml::to_string_pretty(self)?;
        let mut file = fs::File::create(path).await?;
        file.write_all(content.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    /// Loads configuration from a custom file path without env overrides.
    pub async fn load_from_path(path: &str) -> Result<Self, AppError> {
        let content = fs::read_to_string(path).await?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

fn mask_api_key(api_key: &str) -> String {
    if api_key.is_empty() {
        return "(not set)".to_string();
    }
    let skip = api_key.chars().count().saturating_sub(4);
    let visible: String = api_key.chars().skip(skip).collect();
    format!("****{visible}")
}
