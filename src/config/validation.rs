//! Configuration validation module
//!
//! This module rejects misconfiguration that would make the bot unable to
//! serve, before anything connects to the outside world.

use crate::utils::errors::{LiraError, Result};
use super::Settings;
use std::net::SocketAddr;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_bot_config(&settings.bot)?;
    validate_database_config(&settings.database)?;
    validate_redis_config(&settings.redis)?;
    validate_polling_config(&settings.polling)?;
    validate_http_config(&settings.http)?;
    validate_storage_config(&settings.storage)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

/// Validate bot configuration
fn validate_bot_config(config: &super::BotConfig) -> Result<()> {
    if config.token.trim().is_empty() {
        return Err(LiraError::Config(
            "Bot token is required (set LIRA__BOT__TOKEN or TELEGRAM_BOT_TOKEN)".to_string()
        ));
    }

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(LiraError::Config(
            "Database URL is required".to_string()
        ));
    }

    if config.max_connections == 0 {
        return Err(LiraError::Config(
            "Max connections must be greater than 0".to_string()
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(LiraError::Config(
            "Min connections cannot be greater than max connections".to_string()
        ));
    }

    Ok(())
}

/// Validate Redis configuration
fn validate_redis_config(config: &super::RedisConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(LiraError::Config(
            "Redis URL is required".to_string()
        ));
    }

    if config.ttl_seconds == 0 {
        return Err(LiraError::Config(
            "Conversation TTL must be greater than 0".to_string()
        ));
    }

    Ok(())
}

fn validate_polling_config(config: &super::PollingConfig) -> Result<()> {
    if config.timeout_seconds == 0 {
        return Err(LiraError::Config(
            "Long-poll timeout must be greater than 0".to_string()
        ));
    }

    if config.conflict_backoff() <= config.interval() {
        return Err(LiraError::Config(format!(
            "Conflict backoff ({}s) must be longer than the poll interval ({}ms)",
            config.conflict_backoff_seconds, config.interval_ms
        )));
    }

    if config.lock_file.as_os_str().is_empty() {
        return Err(LiraError::Config(
            "Lock file path is required".to_string()
        ));
    }

    Ok(())
}

fn validate_http_config(config: &super::HttpConfig) -> Result<()> {
    config.bind_address.parse::<SocketAddr>().map_err(|e| {
        LiraError::Config(format!("Invalid bind address '{}': {}", config.bind_address, e))
    })?;

    Ok(())
}

fn validate_storage_config(config: &super::StorageConfig) -> Result<()> {
    url::Url::parse(&config.public_base_url).map_err(|e| {
        LiraError::Config(format!("Invalid public base URL '{}': {}", config.public_base_url, e))
    })?;

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(LiraError::Config(
            "Log level is required".to_string()
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(LiraError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, valid_levels)
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn valid_settings() -> Settings {
        let mut settings = Settings::default();
        settings.bot.token = "123456:TEST".to_string();
        settings
    }

    #[test]
    fn test_defaults_with_token_are_valid() {
        assert!(validate_settings(&valid_settings()).is_ok());
    }

    #[test]
    fn test_missing_token_is_fatal() {
        let mut settings = valid_settings();
        settings.bot.token = "   ".to_string();
        let err = validate_settings(&settings).unwrap_err();
        assert_matches!(err, LiraError::Config(ref msg) if msg.contains("Bot token"));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_connection_bounds() {
        let mut settings = valid_settings();
        settings.database.min_connections = 20;
        assert_matches!(validate_settings(&settings), Err(LiraError::Config(_)));
    }

    #[test]
    fn test_conflict_backoff_must_exceed_interval() {
        let mut settings = valid_settings();
        settings.polling.conflict_backoff_seconds = 2;
        settings.polling.interval_ms = 2000;
        assert_matches!(validate_settings(&settings), Err(LiraError::Config(_)));
    }

    #[test]
    fn test_zero_long_poll_timeout() {
        let mut settings = valid_settings();
        settings.polling.timeout_seconds = 0;
        assert_matches!(validate_settings(&settings), Err(LiraError::Config(_)));
    }

    #[test]
    fn test_bad_urls_and_addresses() {
        let mut settings = valid_settings();
        settings.http.bind_address = "not-an-address".to_string();
        assert_matches!(validate_settings(&settings), Err(LiraError::Config(_)));

        let mut settings = valid_settings();
        settings.storage.public_base_url = "storage/".to_string();
        assert_matches!(validate_settings(&settings), Err(LiraError::Config(_)));
    }

    #[test]
    fn test_log_level() {
        let mut settings = valid_settings();
        settings.logging.level = "verbose".to_string();
        assert_matches!(validate_settings(&settings), Err(LiraError::Config(_)));
    }
}
