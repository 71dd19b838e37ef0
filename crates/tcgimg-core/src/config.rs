use std::path::PathBuf;

use crate::app_config::{AppConfig, DEFAULT_BASE_URL, DEFAULT_USER_AGENT};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is set to an unparseable value.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is set to an unparseable value.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default; only malformed values are rejected.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let base_url = or_default("TCGIMG_BASE_URL", DEFAULT_BASE_URL);
    let log_level = or_default("TCGIMG_LOG_LEVEL", "info");
    let input_dir = PathBuf::from(or_default("TCGIMG_INPUT_DIR", "input"));
    let output_dir = PathBuf::from(or_default("TCGIMG_OUTPUT_DIR", "."));

    let scraper_request_timeout_secs = parse_u64("TCGIMG_REQUEST_TIMEOUT_SECS", "30")?;
    let scraper_user_agent = or_default("TCGIMG_USER_AGENT", DEFAULT_USER_AGENT);
    let scraper_inter_request_delay_ms = parse_u64("TCGIMG_INTER_REQUEST_DELAY_MS", "1000")?;
    let scraper_max_retries = parse_u32("TCGIMG_MAX_RETRIES", "0")?;
    let scraper_retry_backoff_base_secs = parse_u64("TCGIMG_RETRY_BACKOFF_BASE_SECS", "2")?;

    Ok(AppConfig {
        base_url,
        log_level,
        input_dir,
        output_dir,
        scraper_request_timeout_secs,
        scraper_user_agent,
        scraper_inter_request_delay_ms,
        scraper_max_retries,
        scraper_retry_backoff_base_secs,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
