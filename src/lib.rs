//! Lira Market Telegram Bot
//!
//! Member verification and lira/rial conversion requests over a Telegram
//! bot. The conversation state machine is driven either by a long-poll loop
//! guarded by a single-instance lock or by an HTTP endpoint that processes
//! one batch per call.

pub mod bot;
pub mod config;
pub mod database;
pub mod handlers;
pub mod models;
pub mod services;
pub mod state;
pub mod telegram;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{LiraError, Result};

// Re-export main components for easy access
pub use bot::{BatchReport, InstanceLock, Poller, UpdateDispatcher};
pub use database::{DatabaseService, InMemoryRegistry, Registry};
pub use state::{BotContext, ConversationState};
pub use telegram::{TeloxideSource, UpdateSource};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
