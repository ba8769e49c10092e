//! Notification service implementation
//!
//! Outbound messages that are not replies to an inbound update, such as the
//! result of an admin decision. Delivery is best effort: a failed send is
//! logged and never undoes the decision that triggered it.

use std::sync::Arc;
use tracing::{debug, info, warn};
use crate::models::Member;
use crate::telegram::{Keyboard, UpdateSource};
use crate::utils::logging::log_api_error;

/// Best-effort sender for member notifications
#[derive(Clone)]
pub struct NotificationService {
    source: Arc<dyn UpdateSource>,
}

impl NotificationService {
    pub fn new(source: Arc<dyn UpdateSource>) -> Self {
        Self { source }
    }

    /// Send `text` to `chat_id`, returning whether the transport accepted it
    pub async fn notify(&self, chat_id: i64, text: &str, keyboard: Option<Keyboard>) -> bool {
        debug!(chat_id = chat_id, "Sending notification");

        match self.source.send_message(chat_id, text, keyboard).await {
            Ok(()) => {
                info!(chat_id = chat_id, "Notification sent successfully");
                true
            }
            Err(e) => {
                log_api_error("sendMessage", &e, Some("member notification"));
                false
            }
        }
    }

    /// Notify the chat bound to `member`; members without a bot identity are skipped
    pub async fn notify_member(&self, member: &Member, text: &str, keyboard: Option<Keyboard>) -> bool {
        match member.chat_id() {
            Some(chat_id) => self.notify(chat_id, text, keyboard).await,
            None => {
                warn!(member_id = member.id, "Member has no bound chat, notification skipped");
                false
            }
        }
    }
}
