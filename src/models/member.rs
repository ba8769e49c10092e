//! Member model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Identity record, created by an admin (phone first) or by `/start` (chat first)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Member {
    pub id: i64,
    pub name: Option<String>,
    pub phone: Option<String>,
    /// Telegram chat id as text, bound on verification
    pub telegram_id: Option<String>,
    pub telegram_username: Option<String>,
    /// One-time code for code-based verification
    pub verify_code: Option<String>,
    pub is_verified: bool,
    pub is_blocked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Member {
    /// The chat id this member can be messaged at, if bound
    pub fn chat_id(&self) -> Option<i64> {
        self.telegram_id.as_deref().and_then(|id| id.parse().ok())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateMemberRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub telegram_id: Option<String>,
    pub telegram_username: Option<String>,
    pub verify_code: Option<String>,
    pub is_verified: bool,
}

/// Partial update; `None` leaves the column untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateMemberRequest {
    pub name: Option<String>,
    pub telegram_id: Option<String>,
    pub telegram_username: Option<String>,
    pub is_verified: Option<bool>,
    pub is_blocked: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_id_parsing() {
        let now = Utc::now();
        let mut member = Member {
            id: 1,
            name: None,
            phone: None,
            telegram_id: Some("987654321".to_string()),
            telegram_username: None,
            verify_code: None,
            is_verified: false,
            is_blocked: false,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(member.chat_id(), Some(987654321));

        member.telegram_id = Some("not-a-number".to_string());
        assert_eq!(member.chat_id(), None);
    }
}
