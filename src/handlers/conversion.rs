//! Currency conversion flow
//!
//! amount -> destination code -> destination name -> proof image. The
//! request row is created at the destination-name step and completed when
//! the proof image arrives.

use tracing::{info, warn};
use crate::models::{CreateConversionRequest, FlowDirection, Member, RequestStatus};
use crate::services::storage::StorageArea;
use crate::state::{BotContext, ChatStep, ScratchKey};
use crate::telegram::MessageEvent;
use crate::utils::errors::{LiraError, Result};
use crate::utils::helpers::{canonical_amount, generate_reference_code, is_valid_amount, normalize_digits};
use crate::utils::logging::log_user_action;
use super::messages::{has_file, ingest_or_reply};
use super::{keyboards, texts};

/// Member allowed to run a conversion; replies and returns `None` otherwise
async fn eligible_member(ctx: &BotContext, chat_id: i64) -> Result<Option<Member>> {
    let Some(member) = ctx.member_for_chat(chat_id).await? else {
        ctx.send(chat_id, texts::MEMBER_NOT_FOUND).await?;
        return Ok(None);
    };

    if member.is_blocked {
        ctx.send(chat_id, texts::BLOCKED_NOTICE).await?;
        return Ok(None);
    }

    if !member.is_verified {
        ctx.send_verification_prompt(chat_id).await?;
        return Ok(None);
    }

    Ok(Some(member))
}

/// `lir_to_rial` / `rial_to_lir` buttons
pub async fn start_conversion(ctx: &BotContext, chat_id: i64, direction: FlowDirection) -> Result<()> {
    let Some(member) = eligible_member(ctx, chat_id).await? else {
        return Ok(());
    };

    if let Some(pending) = ctx
        .registry
        .find_request_by_member_and_status(member.id, RequestStatus::Pending)
        .await?
    {
        info!(chat_id = chat_id, request_id = pending.id, "Conversion refused, pending request exists");
        return ctx
            .send_with_keyboard(
                chat_id,
                &texts::pending_request_summary(&pending),
                keyboards::cancel_pending_request(),
            )
            .await;
    }

    log_user_action(chat_id, direction.as_str(), None);
    ctx.state.forget(chat_id, &ScratchKey::CONVERSION).await?;
    ctx.state.remember(chat_id, ScratchKey::FlowDirection, direction.as_str()).await?;
    ctx.state.set_step(chat_id, ChatStep::AwaitingAmount).await?;
    ctx.send(chat_id, &texts::ask_amount(direction)).await
}

async fn flow_direction(ctx: &BotContext, chat_id: i64) -> Result<FlowDirection> {
    let stored = ctx.state.get(chat_id, ScratchKey::FlowDirection).await?;
    Ok(stored
        .as_deref()
        .and_then(FlowDirection::parse)
        .unwrap_or(FlowDirection::LiraToRial))
}

pub async fn receive_amount(ctx: &BotContext, chat_id: i64, text: &str) -> Result<()> {
    let direction = flow_direction(ctx, chat_id).await?;
    let amount = normalize_digits(text).trim().to_string();

    if !is_valid_amount(&amount) {
        return ctx.send(chat_id, &texts::invalid_amount(direction)).await;
    }
    let Some(amount) = canonical_amount(&amount) else {
        return ctx.send(chat_id, &texts::amount_out_of_range(direction)).await;
    };

    ctx.state.remember(chat_id, ScratchKey::Amount, &amount).await?;
    ctx.state.set_step(chat_id, ChatStep::AwaitingDestinationCode).await?;
    ctx.send(chat_id, texts::ask_destination_code(direction)).await
}

pub async fn receive_destination_code(ctx: &BotContext, chat_id: i64, text: &str) -> Result<()> {
    let code = normalize_digits(text).trim().to_string();

    ctx.state.remember(chat_id, ScratchKey::DestinationCode, &code).await?;
    ctx.state.set_step(chat_id, ChatStep::AwaitingDestinationName).await?;
    ctx.send(chat_id, texts::ASK_DESTINATION_NAME).await
}

/// Creates the request; a redelivered update reuses the request it created
pub async fn receive_destination_name(ctx: &BotContext, chat_id: i64, text: &str) -> Result<()> {
    let name = text.trim();

    let Some(member) = ctx.member_for_chat(chat_id).await? else {
        ctx.state.forget(chat_id, &ScratchKey::ALL).await?;
        return ctx.send(chat_id, texts::MEMBER_NOT_FOUND).await;
    };

    let scratch = async {
        let amount = required_scratch(ctx, chat_id, ScratchKey::Amount).await?;
        let destination_code = required_scratch(ctx, chat_id, ScratchKey::DestinationCode).await?;
        Ok::<_, LiraError>((amount, destination_code))
    }
    .await;
    let (amount, destination_code) = match scratch {
        Ok(values) => values,
        Err(e @ LiraError::MissingFlowData { .. }) => {
            warn!(error = %e, "Conversion aborted at destination name");
            ctx.state.forget(chat_id, &[ScratchKey::Step, ScratchKey::FlowDirection]).await?;
            ctx.send(chat_id, texts::FLOW_DATA_LOST).await?;
            return ctx.send_main_menu(chat_id).await;
        }
        Err(e) => return Err(e),
    };

    let existing = ctx
        .registry
        .find_request_by_member_and_status(member.id, RequestStatus::Pending)
        .await?;

    let request = match existing {
        Some(request) => {
            info!(chat_id = chat_id, request_id = request.id, "Reusing pending request");
            request
        }
        None => {
            let direction = flow_direction(ctx, chat_id).await?;
            ctx.registry
                .create_request(CreateConversionRequest {
                    member_id: member.id,
                    direction,
                    amount,
                    receive_code: destination_code,
                    receive_name: name.to_string(),
                    code: generate_reference_code(),
                })
                .await?
        }
    };

    info!(chat_id = chat_id, request_id = request.id, code = %request.code, "Conversion request created");
    ctx.state.remember(chat_id, ScratchKey::RequestId, &request.id.to_string()).await?;
    ctx.state.remember(chat_id, ScratchKey::DestinationName, name).await?;
    ctx.state.forget(chat_id, &[ScratchKey::Amount, ScratchKey::DestinationCode]).await?;
    ctx.state.set_step(chat_id, ChatStep::AwaitingRequestImage).await?;
    ctx.send(chat_id, texts::REQUEST_CREATED).await
}

/// Scratch value a step cannot continue without
async fn required_scratch(ctx: &BotContext, chat_id: i64, key: ScratchKey) -> Result<String> {
    ctx.state
        .get(chat_id, key)
        .await?
        .ok_or_else(|| LiraError::MissingFlowData {
            chat_id,
            key: key.purpose().to_string(),
        })
}

/// Any message while the proof-of-payment image is expected
pub async fn receive_proof_image(ctx: &BotContext, message: &MessageEvent) -> Result<()> {
    let chat_id = message.chat.id;

    if !has_file(message) {
        if message.text.is_some() {
            return ctx.send(chat_id, texts::ASK_PROOF_IMAGE).await;
        }
        return Ok(());
    }

    let Some(member) = ctx.member_for_chat(chat_id).await? else {
        ctx.state.forget(chat_id, &ScratchKey::ALL).await?;
        return ctx.send(chat_id, texts::MEMBER_NOT_FOUND).await;
    };

    let Some(image) = ingest_or_reply(
        ctx,
        chat_id,
        message,
        StorageArea::Requests,
        texts::ASK_PROOF_IMAGE_WITH_FORMATS,
    )
    .await?
    else {
        return Ok(());
    };

    let attached = ctx.registry.attach_proof(member.id, &image.url).await?;
    let destination_name = ctx.state.get(chat_id, ScratchKey::DestinationName).await?;
    ctx.state.forget(chat_id, &ScratchKey::CONVERSION).await?;
    ctx.state.clear_step(chat_id).await?;

    match attached {
        Some(request) => {
            info!(
                chat_id = chat_id,
                request_id = request.id,
                destination_name = destination_name.as_deref().unwrap_or("---"),
                "Proof image attached"
            );
            log_user_action(chat_id, "request_submitted", Some(&request.code));
            ctx.send(chat_id, texts::REQUEST_SUBMITTED).await?;
        }
        None => {
            warn!(chat_id = chat_id, member_id = member.id, "No pending request awaiting a proof image");
            ctx.send(chat_id, texts::FLOW_DATA_LOST).await?;
        }
    }

    ctx.send_main_menu(chat_id).await
}

/// `cancel_pending_request` button
pub async fn cancel_pending_request(ctx: &BotContext, chat_id: i64) -> Result<()> {
    let Some(member) = ctx.member_for_chat(chat_id).await? else {
        return ctx.send(chat_id, texts::MEMBER_NOT_FOUND).await;
    };

    let pending = ctx
        .registry
        .find_request_by_member_and_status(member.id, RequestStatus::Pending)
        .await?;

    let cancelled = match pending {
        Some(request) => {
            ctx.registry
                .transition_request(request.id, RequestStatus::Cancelled, None)
                .await?
        }
        None => None,
    };

    ctx.state.forget(chat_id, &ScratchKey::CONVERSION).await?;
    ctx.state.clear_step(chat_id).await?;

    match cancelled {
        Some(request) => {
            info!(chat_id = chat_id, request_id = request.id, "Pending request cancelled");
            log_user_action(chat_id, "cancel_pending_request", Some(&request.code));
            ctx.send(chat_id, texts::REQUEST_CANCELLED).await?;
        }
        None => ctx.send(chat_id, texts::NO_ACTIVE_REQUEST).await?,
    }

    ctx.send_main_menu(chat_id).await
}
