//! Error handling for Lira Market
//!
//! This module defines the main error type used throughout the application
//! and classifies errors for the poll loop and the operator log channel.

use thiserror::Error;

/// Main error type for the Lira Market bot
#[derive(Error, Debug)]
pub enum LiraError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Telegram API error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    #[error("Telegram download error: {0}")]
    Download(#[from] teloxide::DownloadError),

    #[error("Conflict: another consumer is polling for updates ({0})")]
    Conflict(String),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Another poller instance is already running (pid {pid})")]
    AlreadyRunning { pid: u32 },

    #[error("No image found in message")]
    NoImageFound,

    #[error("File is not a valid image: {0}")]
    InvalidImage(String),

    #[error("Member not found: {member_id}")]
    MemberNotFound { member_id: i64 },

    #[error("Conversion request not found: {request_id}")]
    RequestNotFound { request_id: i64 },

    #[error("Missing flow data '{key}' for chat {chat_id}")]
    MissingFlowData { chat_id: i64, key: String },

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type alias for Lira Market operations
pub type Result<T> = std::result::Result<T, LiraError>;

impl LiraError {
    /// Whether the transport reported a concurrent long-poll consumer
    pub fn is_conflict(&self) -> bool {
        matches!(self, LiraError::Conflict(_))
    }

    /// Check if the error is recoverable by retrying later
    pub fn is_recoverable(&self) -> bool {
        match self {
            LiraError::Database(_) => true,
            LiraError::Migration(_) => false,
            LiraError::Telegram(_) => true,
            LiraError::Download(_) => true,
            LiraError::Conflict(_) => true,
            LiraError::Redis(_) => true,
            LiraError::Serialization(_) => false,
            LiraError::Io(_) => true,
            LiraError::UrlParse(_) => false,
            LiraError::Config(_) => false,
            LiraError::AlreadyRunning { .. } => false,
            LiraError::NoImageFound => true,
            LiraError::InvalidImage(_) => true,
            LiraError::MemberNotFound { .. } => false,
            LiraError::RequestNotFound { .. } => false,
            LiraError::MissingFlowData { .. } => false,
            LiraError::InvalidStateTransition { .. } => false,
            LiraError::InvalidInput(_) => true,
            LiraError::Storage(_) => true,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            LiraError::Migration(_) => ErrorSeverity::Critical,
            LiraError::Config(_) => ErrorSeverity::Critical,
            LiraError::AlreadyRunning { .. } => ErrorSeverity::Critical,
            LiraError::Conflict(_) => ErrorSeverity::Warning,
            LiraError::MissingFlowData { .. } => ErrorSeverity::Warning,
            LiraError::NoImageFound => ErrorSeverity::Info,
            LiraError::InvalidImage(_) => ErrorSeverity::Info,
            LiraError::InvalidInput(_) => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
