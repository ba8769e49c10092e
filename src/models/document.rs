//! Member document model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MemberDocument {
    pub id: i64,
    pub member_id: i64,
    pub name: String,
    pub file_type: String,
    pub file_path: String,
    pub file_url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDocumentRequest {
    pub member_id: i64,
    pub name: String,
    pub file_type: DocumentType,
    pub file_path: String,
    pub file_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentType {
    Verification,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Verification => "verification",
        }
    }
}
