//! Member document repository implementation

use sqlx::PgPool;
use chrono::Utc;
use crate::models::document::{MemberDocument, CreateDocumentRequest, DocumentType};
use crate::utils::errors::LiraError;

#[derive(Clone)]
#[derive(Debug)]
pub struct DocumentRepository {
    pool: PgPool,
}

impl DocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record a stored file for a member
    pub async fn create(&self, request: CreateDocumentRequest) -> Result<MemberDocument, LiraError> {
        let document = sqlx::query_as::<_, MemberDocument>(
            r#"
            INSERT INTO member_documents (member_id, name, file_type, file_path, file_url, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, member_id, name, file_type, file_path, file_url, created_at
            "#
        )
        .bind(request.member_id)
        .bind(request.name)
        .bind(request.file_type.as_str())
        .bind(request.file_path)
        .bind(request.file_url)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(document)
    }

    /// List a member's documents of one type, oldest first
    pub async fn list_by_member(&self, member_id: i64, file_type: DocumentType) -> Result<Vec<MemberDocument>, LiraError> {
        let documents = sqlx::query_as::<_, MemberDocument>(
            r#"
            SELECT id, member_id, name, file_type, file_path, file_url, created_at
            FROM member_documents
            WHERE member_id = $1 AND file_type = $2
            ORDER BY id
            "#
        )
        .bind(member_id)
        .bind(file_type.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(documents)
    }

    /// Delete a member's documents of one type, returning the removed rows
    pub async fn delete_by_member(&self, member_id: i64, file_type: DocumentType) -> Result<Vec<MemberDocument>, LiraError> {
        let documents = sqlx::query_as::<_, MemberDocument>(
            r#"
            DELETE FROM member_documents
            WHERE member_id = $1 AND file_type = $2
            RETURNING id, member_id, name, file_type, file_path, file_url, created_at
            "#
        )
        .bind(member_id)
        .bind(file_type.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(documents)
    }
}
