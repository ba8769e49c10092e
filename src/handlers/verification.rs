//! Identity verification flow
//!
//! Two methods, picked by the `bot_verify` setting: an activation code sent
//! out of band to a phone number the admins registered, or an identity
//! image reviewed by the admins.

use tracing::{info, warn};
use crate::models::{CreateDocumentRequest, DocumentType, UpdateMemberRequest, VerificationMethod};
use crate::services::storage::StorageArea;
use crate::state::{BotContext, ChatStep, ScratchKey};
use crate::telegram::{ChatInfo, MessageEvent};
use crate::utils::errors::Result;
use crate::utils::helpers::digits_only;
use crate::utils::logging::log_user_action;
use super::messages::{has_file, ingest_or_reply};
use super::texts;

/// `verify_account` button
pub async fn start_verification(ctx: &BotContext, chat_id: i64) -> Result<()> {
    match ctx.registry.verification_method().await? {
        VerificationMethod::Code => {
            ctx.state.set_step(chat_id, ChatStep::AwaitingPhoneNumber).await?;
            ctx.send(chat_id, texts::ASK_PHONE).await
        }
        VerificationMethod::Image => {
            ctx.state.set_step(chat_id, ChatStep::AwaitingVerificationImage).await?;
            ctx.send(chat_id, texts::ASK_IDENTITY_IMAGE).await
        }
    }
}

pub async fn receive_phone_number(ctx: &BotContext, chat_id: i64, text: &str) -> Result<()> {
    let phone = digits_only(text);

    let member = if phone.is_empty() {
        None
    } else {
        ctx.registry.find_member_by_phone(&phone).await?
    };

    match member {
        None => {
            ctx.send(chat_id, texts::PHONE_NOT_FOUND).await?;
            ctx.send(chat_id, texts::ASK_PHONE).await
        }
        Some(member) if member.is_verified => {
            ctx.state.clear_step(chat_id).await?;
            ctx.send(chat_id, texts::ALREADY_VERIFIED).await?;
            ctx.send_main_menu(chat_id).await
        }
        Some(_) => {
            ctx.state.remember(chat_id, ScratchKey::Phone, &phone).await?;
            ctx.state.set_step(chat_id, ChatStep::AwaitingVerifyCode).await?;
            ctx.send(chat_id, texts::ASK_VERIFY_CODE).await
        }
    }
}

/// Match phone + code; on success the matched record becomes the chat's member
pub async fn receive_verify_code(ctx: &BotContext, chat: &ChatInfo, text: &str) -> Result<()> {
    let chat_id = chat.id;
    let code = digits_only(text);

    let Some(phone) = ctx.state.get(chat_id, ScratchKey::Phone).await? else {
        warn!(chat_id = chat_id, "Phone missing while awaiting verify code");
        ctx.state.clear_step(chat_id).await?;
        ctx.send(chat_id, texts::PHONE_SESSION_LOST).await?;
        return ctx.send_verification_prompt(chat_id).await;
    };

    let matched = if code.is_empty() {
        None
    } else {
        ctx.registry.find_member_by_phone_and_code(&phone, &code).await?
    };

    let Some(member) = matched else {
        return ctx.send(chat_id, texts::WRONG_VERIFY_CODE).await;
    };

    let telegram_id = chat_id.to_string();
    let mut username = member.telegram_username.clone();

    // A record created by /start before verification is superseded
    if let Some(duplicate) = ctx.registry.find_member_by_telegram_id(&telegram_id).await? {
        if duplicate.id != member.id {
            if username.is_none() {
                username = duplicate.telegram_username.clone();
            }
            ctx.registry.delete_member(duplicate.id).await?;
            info!(chat_id = chat_id, kept = member.id, removed = duplicate.id, "Merged duplicate member");
        }
    }

    ctx.registry
        .update_member(
            member.id,
            UpdateMemberRequest {
                telegram_id: Some(telegram_id),
                telegram_username: username.or_else(|| chat.username.clone()),
                is_verified: Some(true),
                ..Default::default()
            },
        )
        .await?;

    ctx.state.forget(chat_id, &[ScratchKey::Step, ScratchKey::Phone]).await?;
    log_user_action(chat_id, "verified_by_code", None);

    ctx.send(chat_id, texts::VERIFIED_BY_CODE).await?;
    ctx.send_main_menu(chat_id).await
}

/// Any message while an identity image is expected
pub async fn receive_identity_image(ctx: &BotContext, message: &MessageEvent) -> Result<()> {
    let chat_id = message.chat.id;

    if !has_file(message) {
        let prompt = if message.text.is_some() {
            texts::ASK_IDENTITY_IMAGE_WITH_FORMATS
        } else {
            texts::ASK_IDENTITY_IMAGE
        };
        return ctx.send(chat_id, prompt).await;
    }

    let Some(member) = ctx.member_for_chat(chat_id).await? else {
        ctx.state.clear_step(chat_id).await?;
        return ctx.send(chat_id, texts::MEMBER_NOT_FOUND).await;
    };

    let Some(image) = ingest_or_reply(
        ctx,
        chat_id,
        message,
        StorageArea::Verification,
        texts::ASK_IDENTITY_IMAGE_WITH_FORMATS,
    )
    .await?
    else {
        return Ok(());
    };

    ctx.registry
        .create_document(CreateDocumentRequest {
            member_id: member.id,
            name: texts::VERIFICATION_DOCUMENT_NAME.to_string(),
            file_type: DocumentType::Verification,
            file_path: image.relative_path,
            file_url: image.url,
        })
        .await?;

    ctx.state.clear_step(chat_id).await?;
    log_user_action(chat_id, "identity_image", Some(&image.extension));
    ctx.send(chat_id, texts::IDENTITY_IMAGE_RECEIVED).await
}
