//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from defaults, a TOML file and environment variables.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable prefix, e.g. `LIRA__BOT__TOKEN`
pub const ENV_PREFIX: &str = "LIRA";

/// Legacy variable consulted when no token is configured
pub const TOKEN_FALLBACK_VAR: &str = "TELEGRAM_BOT_TOKEN";

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub bot: BotConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub polling: PollingConfig,
    pub http: HttpConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

/// Telegram bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BotConfig {
    pub token: String,
    pub mode: BotMode,
}

/// Who drives the poll iterations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BotMode {
    /// Internal loop with a fixed sleep between batches
    Polling,
    /// External scheduler hitting the one-batch endpoint
    Http,
}

impl BotMode {
    /// Parse the command line override (`poll` / `serve`)
    pub fn from_cli_arg(arg: &str) -> Option<Self> {
        match arg {
            "poll" | "polling" => Some(BotMode::Polling),
            "serve" | "http" => Some(BotMode::Http),
            _ => None,
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Redis configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RedisConfig {
    pub url: String,
    pub prefix: String,
    pub ttl_seconds: u64,
}

/// Poll loop timing and the single-instance lock location
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PollingConfig {
    pub timeout_seconds: u32,
    pub interval_ms: u64,
    pub error_backoff_seconds: u64,
    pub conflict_backoff_seconds: u64,
    pub lock_file: PathBuf,
}

impl PollingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn error_backoff(&self) -> Duration {
        Duration::from_secs(self.error_backoff_seconds)
    }

    pub fn conflict_backoff(&self) -> Duration {
        Duration::from_secs(self.conflict_backoff_seconds)
    }
}

/// HTTP one-batch endpoint configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    pub bind_address: String,
}

/// Local file storage for ingested images
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    pub root: PathBuf,
    pub public_base_url: String,
    pub temp_dir: PathBuf,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub directory: PathBuf,
}

impl Settings {
    /// Load settings from defaults, `config.toml` and `LIRA__*` environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&Settings::default())?)
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        let mut settings: Settings = settings.try_deserialize()?;
        if settings.bot.token.trim().is_empty() {
            if let Ok(token) = std::env::var(TOKEN_FALLBACK_VAR) {
                settings.bot.token = token;
            }
        }

        Ok(settings)
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::LiraError> {
        super::validation::validate_settings(self)
    }

    /// Per-chat conversation TTL
    pub fn state_ttl(&self) -> Duration {
        Duration::from_secs(self.redis.ttl_seconds)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bot: BotConfig {
                token: String::new(),
                mode: BotMode::Polling,
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/lira_market".to_string(),
                max_connections: 10,
                min_connections: 1,
            },
            redis: RedisConfig {
                url: "redis://localhost:6379".to_string(),
                prefix: "lira_market:".to_string(),
                ttl_seconds: 3600,
            },
            polling: PollingConfig {
                timeout_seconds: 10,
                interval_ms: 2000,
                error_backoff_seconds: 5,
                conflict_backoff_seconds: 10,
                lock_file: PathBuf::from("storage/app/telegram_poll.lock"),
            },
            http: HttpConfig {
                bind_address: "0.0.0.0:8080".to_string(),
            },
            storage: StorageConfig {
                root: PathBuf::from("storage/app/public"),
                public_base_url: "http://localhost:8000/storage/".to_string(),
                temp_dir: PathBuf::from("storage/app/temp"),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                directory: PathBuf::from("storage/logs"),
            },
        }
    }
}
