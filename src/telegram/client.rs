//! Update Source backed by the Telegram Bot API
//!
//! `UpdateSource` is the only way the bot talks to the transport. The
//! teloxide implementation below converts raw updates into
//! [`InboundUpdate`](super::types::InboundUpdate) and maps the
//! "terminated by other getUpdates" API error to `LiraError::Conflict`.

use std::path::{Path, PathBuf};
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::{
    ChatId, InlineKeyboardButton, InlineKeyboardMarkup, MediaKind, MessageKind, Update,
    UpdateKind,
};
use teloxide::{ApiError, RequestError};
use tracing::{debug, warn};
use crate::utils::errors::{LiraError, Result};
use super::types::*;

#[async_trait::async_trait]
pub trait UpdateSource: Send + Sync {
    /// Updates with an id greater than `after_id`, waiting up to `timeout_seconds`
    async fn fetch_updates(&self, after_id: Option<i64>, timeout_seconds: u32) -> Result<Vec<InboundUpdate>>;
    async fn send_message(&self, chat_id: i64, text: &str, keyboard: Option<Keyboard>) -> Result<()>;
    async fn answer_callback(&self, callback_id: &str) -> Result<()>;
    async fn get_file(&self, file_id: &str) -> Result<RemoteFile>;
    /// Download into `dest_dir`, returning the local path
    async fn download_file(&self, file: &RemoteFile, dest_dir: &Path) -> Result<PathBuf>;
    async fn clear_webhook(&self) -> Result<()>;
}

/// teloxide-backed Update Source
#[derive(Clone)]
pub struct TeloxideSource {
    bot: Bot,
}

impl TeloxideSource {
    pub fn new(token: &str) -> Self {
        Self { bot: Bot::new(token) }
    }
}

fn map_request_error(error: RequestError) -> LiraError {
    match &error {
        RequestError::Api(ApiError::TerminatedByOtherGetUpdates) => LiraError::Conflict(error.to_string()),
        RequestError::Api(api) if api.to_string().contains("Conflict") => LiraError::Conflict(error.to_string()),
        _ => LiraError::Telegram(error),
    }
}

fn to_markup(keyboard: Keyboard) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(keyboard.rows.into_iter().map(|row| {
        row.into_iter()
            .map(|button| InlineKeyboardButton::callback(button.text, button.callback_data))
            .collect::<Vec<_>>()
    }))
}

fn convert_message(msg: &Message) -> MessageEvent {
    let chat = ChatInfo {
        id: msg.chat.id.0,
        username: msg.chat.username().map(str::to_string),
        first_name: msg.chat.first_name().map(str::to_string),
        last_name: msg.chat.last_name().map(str::to_string),
    };

    let media = if let Some(sizes) = msg.photo() {
        Some(MediaVariant::Photo(
            sizes
                .iter()
                .map(|size| PhotoVariant {
                    file_id: size.file.id.to_string(),
                    file_size: (size.file.size > 0).then_some(size.file.size as u64),
                    width: size.width,
                    height: size.height,
                })
                .collect(),
        ))
    } else if let Some(document) = msg.document() {
        Some(MediaVariant::Document(DocumentRef {
            file_id: document.file.id.to_string(),
            mime_type: document.mime_type.as_ref().map(|m| m.essence_str().to_string()),
            file_name: document.file_name.clone(),
        }))
    } else if matches!(&msg.kind, MessageKind::Common(common) if !matches!(common.media_kind, MediaKind::Text(_))) {
        Some(MediaVariant::Other)
    } else {
        None
    };

    MessageEvent {
        chat,
        text: msg.text().map(str::to_string),
        media,
    }
}

/// Normalize a raw update; kinds the bot does not handle carry neither part
pub fn convert_update(update: &Update) -> InboundUpdate {
    let id = update.id.0 as i64;

    match &update.kind {
        UpdateKind::CallbackQuery(query) => InboundUpdate {
            id,
            callback: Some(CallbackEvent {
                id: query.id.to_string(),
                data: query.data.clone(),
                chat_id: query.message.as_ref().map(|m| m.chat().id.0),
                from_id: query.from.id.0,
            }),
            message: None,
        },
        UpdateKind::Message(msg) => InboundUpdate {
            id,
            callback: None,
            message: Some(convert_message(msg)),
        },
        _ => InboundUpdate {
            id,
            callback: None,
            message: None,
        },
    }
}

#[async_trait::async_trait]
impl UpdateSource for TeloxideSource {
    async fn fetch_updates(&self, after_id: Option<i64>, timeout_seconds: u32) -> Result<Vec<InboundUpdate>> {
        let mut request = self.bot.get_updates().timeout(timeout_seconds);
        if let Some(after) = after_id {
            request = request.offset(i32::try_from(after + 1).unwrap_or(i32::MAX));
        }

        let updates = request.await.map_err(map_request_error)?;
        debug!(count = updates.len(), "Fetched updates");
        Ok(updates.iter().map(convert_update).collect())
    }

    async fn send_message(&self, chat_id: i64, text: &str, keyboard: Option<Keyboard>) -> Result<()> {
        let mut request = self.bot.send_message(ChatId(chat_id), text);
        if let Some(keyboard) = keyboard {
            request = request.reply_markup(to_markup(keyboard));
        }
        request.await.map_err(map_request_error)?;
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str) -> Result<()> {
        self.bot
            .answer_callback_query(callback_id.to_string())
            .await
            .map_err(map_request_error)?;
        Ok(())
    }

    async fn get_file(&self, file_id: &str) -> Result<RemoteFile> {
        let file = self
            .bot
            .get_file(file_id.to_string())
            .await
            .map_err(map_request_error)?;

        Ok(RemoteFile {
            file_id: file_id.to_string(),
            path: file.path.clone(),
            size: (file.meta.size > 0).then_some(file.meta.size as u64),
        })
    }

    async fn download_file(&self, file: &RemoteFile, dest_dir: &Path) -> Result<PathBuf> {
        tokio::fs::create_dir_all(dest_dir).await?;
        let file_name = Path::new(&file.path)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.file_id.clone());
        let local_path = dest_dir.join(format!("{}_{}", uuid::Uuid::new_v4().simple(), file_name));

        let mut destination = tokio::fs::File::create(&local_path).await?;
        if let Err(e) = self.bot.download_file(&file.path, &mut destination).await {
            warn!(path = %local_path.display(), error = %e, "Download failed, removing partial file");
            let _ = tokio::fs::remove_file(&local_path).await;
            return Err(e.into());
        }

        Ok(local_path)
    }

    async fn clear_webhook(&self) -> Result<()> {
        self.bot.delete_webhook().await.map_err(map_request_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_mapping() {
        let err = map_request_error(RequestError::Api(ApiError::TerminatedByOtherGetUpdates));
        assert!(err.is_conflict());

        let err = map_request_error(RequestError::Api(ApiError::BotBlocked));
        assert!(!err.is_conflict());
    }

    #[test]
    fn test_keyboard_markup_layout() {
        let markup = to_markup(Keyboard::single("a", "x").row("b", "y"));
        assert_eq!(markup.inline_keyboard.len(), 2);
        assert_eq!(markup.inline_keyboard[0].len(), 1);
    }
}
