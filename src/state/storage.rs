//! State storage implementation
//!
//! Two stores with different lifetime contracts live here: the per-chat
//! conversation store, where every entry expires, and the poll cursor, which
//! is written without expiry. Each has a Redis backend and an in-memory one.

use std::sync::Arc;
use std::time::{Duration, Instant};
use moka::sync::Cache;
use moka::Expiry;
use redis::AsyncCommands;
use tokio::sync::Mutex;
use tracing::debug;
use crate::config::RedisConfig;
use crate::utils::errors::Result;

/// Key of the durable poll cursor, relative to the store prefix
pub const CURSOR_KEY: &str = "telegram_last_update_id";

/// Ephemeral per-chat key-value state
#[async_trait::async_trait]
pub trait ChatStateStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;
    async fn forget(&self, key: &str) -> Result<()>;
}

/// Highest fully processed update id
#[async_trait::async_trait]
pub trait CursorStore: Send + Sync {
    async fn load(&self) -> Result<Option<i64>>;
    /// Persist without expiry
    async fn store(&self, update_id: i64) -> Result<()>;
}

async fn connect(config: &RedisConfig) -> Result<redis::aio::ConnectionManager> {
    let client = redis::Client::open(config.url.as_str())?;
    let connection_manager = redis::aio::ConnectionManager::new(client).await?;
    Ok(connection_manager)
}

/// Redis-backed conversation state
#[derive(Clone)]
pub struct RedisChatStateStore {
    connection_manager: redis::aio::ConnectionManager,
    prefix: String,
}

impl RedisChatStateStore {
    pub async fn new(config: &RedisConfig) -> Result<Self> {
        Ok(Self::with_connection(connect(config).await?, &config.prefix))
    }

    pub fn with_connection(connection_manager: redis::aio::ConnectionManager, prefix: &str) -> Self {
        Self {
            connection_manager,
            prefix: prefix.to_string(),
        }
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }
}

#[async_trait::async_trait]
impl ChatStateStore for RedisChatStateStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.connection_manager.clone();
        let value: Option<String> = conn.get(self.full_key(key)).await?;
        Ok(value)
    }

    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let mut conn = self.connection_manager.clone();
        let ttl_seconds = ttl.as_secs().max(1);
        conn.set_ex::<_, _, ()>(self.full_key(key), value, ttl_seconds).await?;
        debug!(key = key, ttl_seconds = ttl_seconds, "Chat state saved");
        Ok(())
    }

    async fn forget(&self, key: &str) -> Result<()> {
        let mut conn = self.connection_manager.clone();
        conn.del::<_, ()>(self.full_key(key)).await?;
        Ok(())
    }
}

/// Redis-backed poll cursor
#[derive(Clone)]
pub struct RedisCursorStore {
    connection_manager: redis::aio::ConnectionManager,
    key: String,
}

impl RedisCursorStore {
    pub async fn new(config: &RedisConfig) -> Result<Self> {
        Ok(Self::with_connection(connect(config).await?, &config.prefix))
    }

    pub fn with_connection(connection_manager: redis::aio::ConnectionManager, prefix: &str) -> Self {
        Self {
            connection_manager,
            key: format!("{}{}", prefix, CURSOR_KEY),
        }
    }
}

#[async_trait::async_trait]
impl CursorStore for RedisCursorStore {
    async fn load(&self) -> Result<Option<i64>> {
        let mut conn = self.connection_manager.clone();
        let value: Option<i64> = conn.get(&self.key).await?;
        Ok(value)
    }

    async fn store(&self, update_id: i64) -> Result<()> {
        let mut conn = self.connection_manager.clone();
        conn.set::<_, _, ()>(&self.key, update_id).await?;
        debug!(cursor = update_id, "Poll cursor persisted");
        Ok(())
    }
}

/// Expiry policy that honours the TTL passed with each write
struct PerEntryTtl;

impl Expiry<String, (String, Duration)> for PerEntryTtl {
    fn expire_after_create(&self, _key: &String, value: &(String, Duration), _created_at: Instant) -> Option<Duration> {
        Some(value.1)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &(String, Duration),
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.1)
    }
}

/// In-process conversation state on a moka cache
#[derive(Clone)]
pub struct MemoryChatStateStore {
    inner: Arc<Cache<String, (String, Duration)>>,
}

impl MemoryChatStateStore {
    pub fn new(max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(PerEntryTtl)
            .build();

        Self { inner: Arc::new(cache) }
    }
}

impl Default for MemoryChatStateStore {
    fn default() -> Self {
        Self::new(10_000)
    }
}

#[async_trait::async_trait]
impl ChatStateStore for MemoryChatStateStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.inner.get(key).map(|(value, _)| value))
    }

    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        self.inner.insert(key.to_string(), (value.to_string(), ttl));
        Ok(())
    }

    async fn forget(&self, key: &str) -> Result<()> {
        self.inner.invalidate(key);
        Ok(())
    }
}

/// In-process poll cursor
#[derive(Default)]
pub struct MemoryCursorStore {
    value: Mutex<Option<i64>>,
}

impl MemoryCursorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(update_id: i64) -> Self {
        Self { value: Mutex::new(Some(update_id)) }
    }
}

#[async_trait::async_trait]
impl CursorStore for MemoryCursorStore {
    async fn load(&self) -> Result<Option<i64>> {
        Ok(*self.value.lock().await)
    }

    async fn store(&self, update_id: i64) -> Result<()> {
        *self.value.lock().await = Some(update_id);
        Ok(())
    }
}
