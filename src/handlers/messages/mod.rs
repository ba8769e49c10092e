//! Message handlers module
//!
//! Routes text and media by the chat's current step. An active step wins
//! over commands; `/start` is only recognised from the idle step.

use tracing::debug;
use crate::handlers::commands::{self, Command};
use crate::handlers::{conversion, texts, verification};
use crate::services::ingestion::IngestedImage;
use crate::services::storage::StorageArea;
use crate::state::{BotContext, ChatStep};
use crate::telegram::{MediaVariant, MessageEvent};
use crate::utils::errors::{LiraError, Result};
use crate::utils::logging::report_operator_error;

/// Handle one inbound message
pub async fn handle_message(ctx: &BotContext, message: &MessageEvent) -> Result<()> {
    let chat_id = message.chat.id;
    let step = ctx.state.step(chat_id).await?;
    debug!(chat_id = chat_id, step = %step, "Processing message");

    match step {
        ChatStep::AwaitingVerificationImage => return verification::receive_identity_image(ctx, message).await,
        ChatStep::AwaitingRequestImage => return conversion::receive_proof_image(ctx, message).await,
        _ => {}
    }

    let Some(text) = message.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) else {
        debug!(chat_id = chat_id, step = %step, "Message without text ignored");
        return Ok(());
    };

    match step {
        ChatStep::Idle => match Command::parse(text) {
            Some(command) => commands::handle_command(ctx, &message.chat, command).await,
            None => show_menu_if_verified(ctx, chat_id).await,
        },
        ChatStep::AwaitingPhoneNumber => verification::receive_phone_number(ctx, chat_id, text).await,
        ChatStep::AwaitingVerifyCode => verification::receive_verify_code(ctx, &message.chat, text).await,
        ChatStep::AwaitingAmount => conversion::receive_amount(ctx, chat_id, text).await,
        ChatStep::AwaitingDestinationCode => conversion::receive_destination_code(ctx, chat_id, text).await,
        ChatStep::AwaitingDestinationName => conversion::receive_destination_name(ctx, chat_id, text).await,
        ChatStep::AwaitingVerificationImage | ChatStep::AwaitingRequestImage => Ok(()),
    }
}

async fn show_menu_if_verified(ctx: &BotContext, chat_id: i64) -> Result<()> {
    match ctx.member_for_chat(chat_id).await? {
        Some(member) if member.is_verified && !member.is_blocked => ctx.send_main_menu(chat_id).await,
        _ => Ok(()),
    }
}

/// Whether the message carries something the ingestion pipeline can look at
pub(crate) fn has_file(message: &MessageEvent) -> bool {
    matches!(
        message.media,
        Some(MediaVariant::Photo(_)) | Some(MediaVariant::Document(_))
    )
}

/// Ingest the message's image, replying to the user on every failure.
///
/// `None` means the user has been told what went wrong and the step is
/// left as it was so the next attempt starts clean.
pub(crate) async fn ingest_or_reply(
    ctx: &BotContext,
    chat_id: i64,
    message: &MessageEvent,
    area: StorageArea,
    no_image_reply: &str,
) -> Result<Option<IngestedImage>> {
    match ctx.ingestor.ingest(message.media.as_ref(), area).await {
        Ok(image) => Ok(Some(image)),
        Err(LiraError::NoImageFound) => {
            ctx.send(chat_id, no_image_reply).await?;
            Ok(None)
        }
        Err(LiraError::InvalidImage(reason)) => {
            debug!(chat_id = chat_id, reason = %reason, "Rejected invalid image");
            ctx.send(chat_id, texts::INVALID_IMAGE).await?;
            Ok(None)
        }
        Err(e) => {
            report_operator_error(chat_id, area.directory(), &e);
            ctx.send(chat_id, texts::IMAGE_UPLOAD_FAILED).await?;
            Ok(None)
        }
    }
}
