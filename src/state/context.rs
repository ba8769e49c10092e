//! Conversation context management
//!
//! `ConversationState` is the typed view over the per-chat state store and
//! `BotContext` bundles everything a handler needs to serve one update.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use crate::database::Registry;
use crate::handlers::{keyboards, texts};
use crate::models::Member;
use crate::services::ingestion::ImageIngestor;
use crate::telegram::{Keyboard, UpdateSource};
use crate::utils::errors::Result;
use super::step::{ChatStep, ScratchKey};
use super::storage::ChatStateStore;

/// Per-chat step and scratch data, every entry written with the same TTL
#[derive(Clone)]
pub struct ConversationState {
    store: Arc<dyn ChatStateStore>,
    ttl: Duration,
}

impl ConversationState {
    pub fn new(store: Arc<dyn ChatStateStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Current step; unknown stored values are treated as idle
    pub async fn step(&self, chat_id: i64) -> Result<ChatStep> {
        let stored = self.store.get(&ScratchKey::Step.for_chat(chat_id)).await?;
        Ok(match stored {
            None => ChatStep::Idle,
            Some(value) => value.parse().unwrap_or_else(|e| {
                warn!(chat_id = chat_id, error = %e, "Ignoring unknown chat step");
                ChatStep::Idle
            }),
        })
    }

    pub async fn set_step(&self, chat_id: i64, step: ChatStep) -> Result<()> {
        debug!(chat_id = chat_id, step = %step, "Chat step changed");
        if step.is_idle() {
            return self.clear_step(chat_id).await;
        }
        self.remember(chat_id, ScratchKey::Step, step.as_str()).await
    }

    pub async fn clear_step(&self, chat_id: i64) -> Result<()> {
        self.store.forget(&ScratchKey::Step.for_chat(chat_id)).await
    }

    pub async fn get(&self, chat_id: i64, key: ScratchKey) -> Result<Option<String>> {
        self.store.get(&key.for_chat(chat_id)).await
    }

    pub async fn remember(&self, chat_id: i64, key: ScratchKey, value: &str) -> Result<()> {
        self.store.put(&key.for_chat(chat_id), value, self.ttl).await
    }

    pub async fn forget(&self, chat_id: i64, keys: &[ScratchKey]) -> Result<()> {
        for key in keys {
            self.store.forget(&key.for_chat(chat_id)).await?;
        }
        Ok(())
    }
}

/// Everything a handler needs to serve one update
#[derive(Clone)]
pub struct BotContext {
    pub source: Arc<dyn UpdateSource>,
    pub registry: Arc<dyn Registry>,
    pub state: ConversationState,
    pub ingestor: ImageIngestor,
}

impl BotContext {
    pub fn new(
        source: Arc<dyn UpdateSource>,
        registry: Arc<dyn Registry>,
        state: ConversationState,
        ingestor: ImageIngestor,
    ) -> Self {
        Self {
            source,
            registry,
            state,
            ingestor,
        }
    }

    pub async fn send(&self, chat_id: i64, text: &str) -> Result<()> {
        self.source.send_message(chat_id, text, None).await
    }

    pub async fn send_with_keyboard(&self, chat_id: i64, text: &str, keyboard: Keyboard) -> Result<()> {
        self.source.send_message(chat_id, text, Some(keyboard)).await
    }

    pub async fn send_main_menu(&self, chat_id: i64) -> Result<()> {
        self.send_with_keyboard(chat_id, texts::MAIN_MENU, keyboards::main_menu()).await
    }

    pub async fn send_verification_prompt(&self, chat_id: i64) -> Result<()> {
        self.send_with_keyboard(chat_id, texts::VERIFICATION_PROMPT, keyboards::verification()).await
    }

    /// Member bound to this chat, if any
    pub async fn member_for_chat(&self, chat_id: i64) -> Result<Option<Member>> {
        self.registry.find_member_by_telegram_id(&chat_id.to_string()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::storage::MemoryChatStateStore;

    fn state() -> ConversationState {
        ConversationState::new(Arc::new(MemoryChatStateStore::default()), Duration::from_secs(3600))
    }

    #[tokio::test]
    async fn test_step_defaults_to_idle() {
        let state = state();
        assert_eq!(state.step(1).await.unwrap(), ChatStep::Idle);

        state.set_step(1, ChatStep::AwaitingAmount).await.unwrap();
        assert_eq!(state.step(1).await.unwrap(), ChatStep::AwaitingAmount);
        assert_eq!(state.step(2).await.unwrap(), ChatStep::Idle);

        state.set_step(1, ChatStep::Idle).await.unwrap();
        assert_eq!(state.step(1).await.unwrap(), ChatStep::Idle);
    }

    #[tokio::test]
    async fn test_unknown_step_is_idle() {
        let store = Arc::new(MemoryChatStateStore::default());
        store
            .put(&ScratchKey::Step.for_chat(5), "waiting_for_legacy", Duration::from_secs(60))
            .await
            .unwrap();
        let state = ConversationState::new(store, Duration::from_secs(60));
        assert_eq!(state.step(5).await.unwrap(), ChatStep::Idle);
    }

    #[tokio::test]
    async fn test_forget_scratch_keys() {
        let state = state();
        state.remember(3, ScratchKey::Amount, "100").await.unwrap();
        state.remember(3, ScratchKey::DestinationCode, "IR12").await.unwrap();
        state.forget(3, &[ScratchKey::Amount]).await.unwrap();

        assert_eq!(state.get(3, ScratchKey::Amount).await.unwrap(), None);
        assert_eq!(state.get(3, ScratchKey::DestinationCode).await.unwrap().as_deref(), Some("IR12"));
    }
}
