use super::Config;
use crate::error::AppError;
use std::path::Path;

/// Validates the configuration settings
///
/// # Validation Rules
/// - API domain cannot be empty and must carry an http(s) scheme
/// - API key cannot be empty
/// - Rate limit and cache capacity must be positive
/// - The game date UTC offset, when set, must be a real zone offset
/// - If log file path is provided, it cannot be empty and its parent must be creatable
pub fn validate_config(config: &Config) -> Result<(), AppError> {
    if config.api_domain.is_empty() {
        return Err(AppError::config_error("API domain cannot be empty"));
    }

    if !config.api_domain.starts_with("http://") && !config.api_domain.starts_with("https://") {
        return Err(AppError::config_error(
            "API domain must start with http:// or https://",
        ));
    }

    if config.api_key.trim().is_empty() {
        return Err(AppError::config_error(
            "API key is not set (use --config <API_KEY> or SPORTSDATA_API_KEY)",
        ));
    }

    if config.rate_limit_per_second == 0 {
        return Err(AppError::config_error(
            "rate_limit_per_second must be at least 1",
        ));
    }

    if config.cache_capacity == 0 {
        return Err(AppError::config_error("cache_capacity must be at least 1"));
    }

    if let Some(hours) = config.game_date_utc_offset_hours
        && !(-12..=14).contains(&hours)
    {
        return Err(AppError::config_error(format!(
            "game_date_utc_offset_hours must be between -12 and 14, got {hours}"
        )));
    }

    if let Some(log_path) = &config.log_file_path {
        if log_path.is_empty() {
            return Err(AppError::config_error("Log file path cannot be empty"));
        }

        if let Some(parent) = Path::new(log_path).parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::config_error(format!(
                    "Cannot create log directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    Ok(())
}
