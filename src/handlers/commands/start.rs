//! Start command handler
//!
//! Handles `/start`: registers new chats as unverified members and points
//! every member at the next thing they can do.

use tracing::{debug, info};
use crate::handlers::texts;
use crate::models::CreateMemberRequest;
use crate::state::BotContext;
use crate::telegram::ChatInfo;
use crate::utils::errors::Result;
use crate::utils::helpers::display_name;
use crate::utils::logging::log_user_action;

/// Handle /start command - main entry point for member onboarding
pub async fn handle_start(ctx: &BotContext, chat: &ChatInfo) -> Result<()> {
    let chat_id = chat.id;
    debug!(chat_id = chat_id, "Processing /start command");

    match ctx.member_for_chat(chat_id).await? {
        Some(member) if member.is_blocked => {
            info!(chat_id = chat_id, member_id = member.id, "Blocked member started bot");
            ctx.send(chat_id, texts::BLOCKED_NOTICE).await
        }
        Some(member) if member.is_verified => ctx.send_main_menu(chat_id).await,
        Some(_) => ctx.send_verification_prompt(chat_id).await,
        None => {
            let (first, last) = (chat.first_name.as_deref(), chat.last_name.as_deref());
            let has_name = [first, last].into_iter().flatten().any(|part| !part.trim().is_empty());
            let name = display_name(first, last);

            let member = ctx
                .registry
                .create_member(CreateMemberRequest {
                    name: has_name.then(|| name.clone()),
                    telegram_id: Some(chat_id.to_string()),
                    telegram_username: chat.username.clone(),
                    ..Default::default()
                })
                .await?;

            info!(chat_id = chat_id, member_id = member.id, "New member registered");
            log_user_action(chat_id, "start", Some("registered"));

            ctx.send(chat_id, &texts::welcome(&name)).await?;
            ctx.send_verification_prompt(chat_id).await
        }
    }
}
