//! Lira Market Telegram Bot
//!
//! Operator entry point: `lira_market [poll|serve]`

use std::sync::Arc;
use anyhow::Context;
use tracing::{error, info, warn};

use lira_market::{
    bot::{self, HttpState, InstanceLock, Poller, UpdateDispatcher},
    config::{BotMode, Settings},
    database::{self, DatabaseService, PoolConfig},
    services::{ImageIngestor, LocalDiskStorage},
    state::{BotContext, ConversationState, RedisChatStateStore, RedisCursorStore},
    telegram::{TeloxideSource, UpdateSource},
    utils::logging,
    LiraError,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let mut settings = Settings::new().context("Failed to load configuration")?;
    if let Some(arg) = std::env::args().nth(1) {
        settings.bot.mode = BotMode::from_cli_arg(&arg)
            .with_context(|| format!("Unknown mode '{}', expected 'poll' or 'serve'", arg))?;
    }
    if let Err(e) = settings.validate() {
        eprintln!("Refusing to start: {}", e);
        std::process::exit(1);
    }

    // Initialize logging; the guard flushes the log file on exit
    let _log_guard = logging::init_logging(&settings.logging)?;
    info!("Starting {}...", lira_market::info());

    // Initialize database connection
    info!("Connecting to database...");
    let pool = database::create_pool(&PoolConfig::from(&settings.database)).await?;
    info!("Running database migrations...");
    database::run_migrations(&pool).await?;
    let registry = Arc::new(DatabaseService::new(pool));

    // Initialize Redis-backed state
    info!("Connecting to Redis...");
    let chat_state = Arc::new(RedisChatStateStore::new(&settings.redis).await?);
    let cursor_store = Arc::new(RedisCursorStore::new(&settings.redis).await?);

    let source: Arc<dyn UpdateSource> = Arc::new(TeloxideSource::new(&settings.bot.token));
    let storage = Arc::new(LocalDiskStorage::new(
        &settings.storage.root,
        &settings.storage.public_base_url,
    )?);
    let ingestor = ImageIngestor::new(source.clone(), storage, &settings.storage.temp_dir);

    let ctx = BotContext::new(
        source.clone(),
        registry,
        ConversationState::new(chat_state, settings.state_ttl()),
        ingestor,
    );
    let dispatcher = Arc::new(UpdateDispatcher::new(
        ctx,
        cursor_store,
        settings.polling.timeout_seconds,
    ));

    match settings.bot.mode {
        BotMode::Polling => {
            let _lock = match InstanceLock::acquire(&settings.polling.lock_file) {
                Ok(lock) => lock,
                Err(LiraError::AlreadyRunning { pid }) => {
                    error!(pid = pid, "Telegram polling is already running");
                    std::process::exit(1);
                }
                Err(e) => return Err(e.into()),
            };

            if let Err(e) = source.clear_webhook().await {
                warn!(error = %e, "Failed to clear webhook, long polling may conflict");
            }

            Poller::new(dispatcher, settings.polling.clone())
                .run_until(bot::shutdown_signal())
                .await;
        }
        BotMode::Http => {
            bot::http::serve(&settings.http, HttpState::new(dispatcher), bot::shutdown_signal()).await?;
        }
    }

    info!("Lira Market bot stopped");
    Ok(())
}
