//! Conversion request repository implementation

use sqlx::PgPool;
use chrono::Utc;
use crate::models::request::{ConversionRequest, CreateConversionRequest, RequestStatus};
use crate::utils::errors::LiraError;

// amount is NUMERIC in the table and text in the model
const REQUEST_COLUMNS: &str = "id, member_id, from_currency, to_currency, amount::text AS amount, file_url, receive_code, receive_name, code, status, rejection_reason, created_at, updated_at";

#[derive(Clone)]
#[derive(Debug)]
pub struct RequestRepository {
    pool: PgPool,
}

impl RequestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new pending request
    pub async fn create(&self, request: CreateConversionRequest) -> Result<ConversionRequest, LiraError> {
        let sql = format!(
            r#"
            INSERT INTO member_requests (member_id, from_currency, to_currency, amount, receive_code, receive_name, code, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4::numeric, $5, $6, $7, $8, $9, $9)
            RETURNING {}
            "#,
            REQUEST_COLUMNS
        );
        let created = sqlx::query_as::<_, ConversionRequest>(&sql)
            .bind(request.member_id)
            .bind(request.direction.source().code())
            .bind(request.direction.target().code())
            .bind(request.amount)
            .bind(request.receive_code)
            .bind(request.receive_name)
            .bind(request.code)
            .bind(RequestStatus::Pending.as_str())
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }

    /// Find request by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<ConversionRequest>, LiraError> {
        let sql = format!("SELECT {} FROM member_requests WHERE id = $1", REQUEST_COLUMNS);
        let request = sqlx::query_as::<_, ConversionRequest>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(request)
    }

    /// Most recent request of a member with the given status
    pub async fn find_by_member_and_status(&self, member_id: i64, status: RequestStatus) -> Result<Option<ConversionRequest>, LiraError> {
        let sql = format!(
            "SELECT {} FROM member_requests WHERE member_id = $1 AND status = $2 ORDER BY id DESC LIMIT 1",
            REQUEST_COLUMNS
        );
        let request = sqlx::query_as::<_, ConversionRequest>(&sql)
            .bind(member_id)
            .bind(status.as_str())
            .fetch_optional(&self.pool)
            .await?;

        Ok(request)
    }

    /// Attach a proof URL to the member's newest pending request that has none yet
    pub async fn attach_proof(&self, member_id: i64, file_url: &str) -> Result<Option<ConversionRequest>, LiraError> {
        let sql = format!(
            r#"
            UPDATE member_requests
            SET file_url = $2, updated_at = $3
            WHERE id = (
                SELECT id FROM member_requests
                WHERE member_id = $1 AND status = 'pending' AND file_url IS NULL
                ORDER BY id DESC
                LIMIT 1
            )
            RETURNING {}
            "#,
            REQUEST_COLUMNS
        );
        let request = sqlx::query_as::<_, ConversionRequest>(&sql)
            .bind(member_id)
            .bind(file_url)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?;

        Ok(request)
    }

    /// Move a pending request to a terminal status.
    ///
    /// Returns `None` when the request does not exist or is no longer pending.
    pub async fn transition_from_pending(
        &self,
        id: i64,
        status: RequestStatus,
        rejection_reason: Option<&str>,
    ) -> Result<Option<ConversionRequest>, LiraError> {
        let sql = format!(
            r#"
            UPDATE member_requests
            SET status = $2,
                rejection_reason = COALESCE($3, rejection_reason),
                updated_at = $4
            WHERE id = $1 AND status = 'pending'
            RETURNING {}
            "#,
            REQUEST_COLUMNS
        );
        let request = sqlx::query_as::<_, ConversionRequest>(&sql)
            .bind(id)
            .bind(status.as_str())
            .bind(rejection_reason)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?;

        Ok(request)
    }
}
