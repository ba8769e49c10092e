//! Logging configuration and setup
//!
//! This module provides logging initialization and the structured logging
//! helpers used by the bot, including the operator log channel.

use std::fmt::Display;
use tracing::{info, warn, error};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use crate::config::LoggingConfig;
use crate::utils::errors::{LiraError, Result};

/// Tracing target for events an operator must look at
pub const OPERATOR_TARGET: &str = "operator";

/// Initialize logging based on configuration
///
/// The returned guard flushes the file writer when dropped, so it has to be
/// held for the lifetime of the process.
pub fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    let file_appender = tracing_appender::rolling::daily(&config.directory, "lira_market.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(non_blocking))
        .try_init()
        .map_err(|e| LiraError::Config(format!("Failed to install tracing subscriber: {}", e)))?;

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log user actions with structured data
pub fn log_user_action(chat_id: i64, action: &str, details: Option<&str>) {
    info!(
        chat_id = chat_id,
        action = action,
        details = details,
        "User action performed"
    );
}

/// Log admin decisions
pub fn log_admin_action(action: &str, target_id: i64, details: Option<&str>) {
    warn!(
        action = action,
        target_id = target_id,
        details = details,
        "Admin action performed"
    );
}

/// Report a failure that needs operator attention.
///
/// Used for resource errors (downloads, storage writes) and unexpected
/// handler failures; the user only ever sees a short apology.
pub fn report_operator_error(chat_id: i64, stage: &str, error: &dyn Display) {
    error!(
        target: OPERATOR_TARGET,
        chat_id = chat_id,
        stage = stage,
        error = %error,
        "Operation failed"
    );
}

/// Log API errors with context
pub fn log_api_error(api: &str, error: &dyn Display, context: Option<&str>) {
    error!(
        api = api,
        error = %error,
        context = context,
        "API error occurred"
    );
}
