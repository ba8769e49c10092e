//! State management module
//!
//! This module handles conversation state, the poll cursor and the handler context

pub mod context;
pub mod step;
pub mod storage;

// Re-export commonly used state components
pub use context::{BotContext, ConversationState};
pub use step::{ChatStep, ScratchKey};
pub use storage::{
    ChatStateStore, CursorStore, RedisChatStateStore, RedisCursorStore, MemoryChatStateStore,
    MemoryCursorStore, CURSOR_KEY,
};
