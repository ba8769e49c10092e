//! Bot handlers module
//!
//! The conversation state machine, organized by input type:
//! - Callback handlers for inline keyboard buttons
//! - Command handlers for `/start`
//! - Message handlers for text and media, routed by the chat's current step
//!
//! The verification and conversion flows hold the step logic shared by those
//! entry points.

pub mod callbacks;
pub mod commands;
pub mod conversion;
pub mod keyboards;
pub mod messages;
pub mod texts;
pub mod verification;

use serde::Serialize;
use tracing::{debug, warn};
use crate::state::BotContext;
use crate::telegram::InboundUpdate;
use crate::utils::errors::Result;
use crate::utils::logging::report_operator_error;

pub use callbacks::CallbackAction;

/// How one update ended, as counted by the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateOutcome {
    Processed,
    /// Nothing the bot reacts to: no callback, no message, or no chat
    Skipped,
    /// A handler error; reported to the operator and apologised for
    Failed,
}

/// Route one update through the state machine.
///
/// A callback takes precedence over a message carried by the same update.
pub async fn handle_update(ctx: &BotContext, update: &InboundUpdate) -> UpdateOutcome {
    if let Some(callback) = &update.callback {
        let chat_id = callback.chat();

        if let Err(e) = ctx.source.answer_callback(&callback.id).await {
            warn!(update_id = update.id, callback_id = %callback.id, error = %e, "Failed to answer callback query");
        }

        let Some(data) = callback.data.as_deref() else {
            debug!(update_id = update.id, "Callback without data skipped");
            return UpdateOutcome::Skipped;
        };

        let result = callbacks::handle_callback(ctx, chat_id, data).await;
        return finish(ctx, chat_id, "callback", result).await;
    }

    if let Some(message) = &update.message {
        let chat_id = message.chat.id;
        let result = messages::handle_message(ctx, message).await;
        return finish(ctx, chat_id, "message", result).await;
    }

    debug!(update_id = update.id, "Update without callback or message skipped");
    UpdateOutcome::Skipped
}

async fn finish(ctx: &BotContext, chat_id: i64, stage: &str, result: Result<()>) -> UpdateOutcome {
    match result {
        Ok(()) => UpdateOutcome::Processed,
        Err(e) => {
            report_operator_error(chat_id, stage, &e);
            if let Err(send_error) = ctx.send(chat_id, texts::GENERIC_ERROR).await {
                warn!(chat_id = chat_id, error = %send_error, "Failed to send error reply");
            }
            UpdateOutcome::Failed
        }
    }
}
