//! Telegram transport boundary

pub mod types;
pub mod client;

pub use types::{
    InboundUpdate, CallbackEvent, ChatInfo, MessageEvent, MediaVariant, PhotoVariant, DocumentRef,
    RemoteFile, Keyboard, Button,
};
pub use client::{UpdateSource, TeloxideSource, convert_update};
