//! Callback query handlers module
//!
//! Inline keyboard buttons carry a bare action name as callback data.

use std::fmt;
use tracing::{info, warn};
use crate::models::FlowDirection;
use crate::state::BotContext;
use crate::utils::errors::Result;
use crate::utils::logging::log_user_action;
use super::{conversion, verification};

/// Every button the bot sends
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    VerifyAccount,
    LiraToRial,
    RialToLira,
    CancelPendingRequest,
    /// Data from an old keyboard or a foreign client
    Unknown(String),
}

impl CallbackAction {
    pub fn parse(data: &str) -> Self {
        match data.trim() {
            "verify_account" => CallbackAction::VerifyAccount,
            "lir_to_rial" => CallbackAction::LiraToRial,
            "rial_to_lir" => CallbackAction::RialToLira,
            "cancel_pending_request" => CallbackAction::CancelPendingRequest,
            other => CallbackAction::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            CallbackAction::VerifyAccount => "verify_account",
            CallbackAction::LiraToRial => FlowDirection::LiraToRial.as_str(),
            CallbackAction::RialToLira => FlowDirection::RialToLira.as_str(),
            CallbackAction::CancelPendingRequest => "cancel_pending_request",
            CallbackAction::Unknown(data) => data,
        }
    }
}

impl fmt::Display for CallbackAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Main callback dispatcher; runs whatever step the chat is in
pub async fn handle_callback(ctx: &BotContext, chat_id: i64, data: &str) -> Result<()> {
    let action = CallbackAction::parse(data);
    info!(chat_id = chat_id, action = %action, "Processing callback");

    match action {
        CallbackAction::VerifyAccount => {
            log_user_action(chat_id, "verify_account", None);
            verification::start_verification(ctx, chat_id).await
        }
        CallbackAction::LiraToRial => conversion::start_conversion(ctx, chat_id, FlowDirection::LiraToRial).await,
        CallbackAction::RialToLira => conversion::start_conversion(ctx, chat_id, FlowDirection::RialToLira).await,
        CallbackAction::CancelPendingRequest => conversion::cancel_pending_request(ctx, chat_id).await,
        CallbackAction::Unknown(data) => {
            warn!(chat_id = chat_id, callback_data = %data, "Unrecognized callback action");
            Ok(())
        }
    }
}
