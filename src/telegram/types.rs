//! Normalized update and media types
//!
//! Transport shapes are converted into these once, at the boundary, so the
//! conversation handlers never inspect raw Telegram payloads.

use serde::{Deserialize, Serialize};

/// One update from the bot transport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundUpdate {
    pub id: i64,
    pub callback: Option<CallbackEvent>,
    pub message: Option<MessageEvent>,
}

impl InboundUpdate {
    /// Chat the update belongs to, callback first
    pub fn chat_id(&self) -> Option<i64> {
        match &self.callback {
            Some(callback) => Some(callback.chat()),
            None => self.message.as_ref().map(|m| m.chat.id),
        }
    }
}

/// Inline keyboard button press
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallbackEvent {
    pub id: String,
    pub data: Option<String>,
    /// Chat of the message carrying the keyboard, if still accessible
    pub chat_id: Option<i64>,
    pub from_id: u64,
}

impl CallbackEvent {
    /// Private chats share the sender's id, so the sender stands in when the
    /// keyboard message is gone
    pub fn chat(&self) -> i64 {
        self.chat_id.unwrap_or(self.from_id as i64)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChatInfo {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageEvent {
    pub chat: ChatInfo,
    pub text: Option<String>,
    pub media: Option<MediaVariant>,
}

/// Media attached to a message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MediaVariant {
    /// The same photo in several compressed resolutions
    Photo(Vec<PhotoVariant>),
    /// A file sent without compression
    Document(DocumentRef),
    /// Anything else (stickers, voice, video...)
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoVariant {
    pub file_id: String,
    pub file_size: Option<u64>,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRef {
    pub file_id: String,
    pub mime_type: Option<String>,
    pub file_name: Option<String>,
}

/// Resolved file, ready to download
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteFile {
    pub file_id: String,
    pub path: String,
    pub size: Option<u64>,
}

/// Inline keyboard, one `Vec` per row
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Keyboard {
    pub rows: Vec<Vec<Button>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Button {
    pub text: String,
    pub callback_data: String,
}

impl Keyboard {
    pub fn single(text: &str, callback_data: &str) -> Self {
        Self::default().row(text, callback_data)
    }

    /// Append a row holding one button
    pub fn row(mut self, text: &str, callback_data: &str) -> Self {
        self.rows.push(vec![Button {
            text: text.to_string(),
            callback_data: callback_data.to_string(),
        }]);
        self
    }

    /// Every callback payload on the keyboard
    pub fn callback_data(&self) -> Vec<&str> {
        self.rows
            .iter()
            .flatten()
            .map(|b| b.callback_data.as_str())
            .collect()
    }
}
