//! Member repository implementation

use sqlx::PgPool;
use chrono::Utc;
use crate::models::member::{Member, CreateMemberRequest, UpdateMemberRequest};
use crate::utils::errors::LiraError;

const MEMBER_COLUMNS: &str = "id, name, phone, telegram_id, telegram_username, verify_code, is_verified, is_blocked, created_at, updated_at";

#[derive(Clone)]
#[derive(Debug)]
pub struct MemberRepository {
    pool: PgPool,
}

impl MemberRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new member
    pub async fn create(&self, request: CreateMemberRequest) -> Result<Member, LiraError> {
        let sql = format!(
            r#"
            INSERT INTO members (name, phone, telegram_id, telegram_username, verify_code, is_verified, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            RETURNING {}
            "#,
            MEMBER_COLUMNS
        );
        let member = sqlx::query_as::<_, Member>(&sql)
            .bind(request.name)
            .bind(request.phone)
            .bind(request.telegram_id)
            .bind(request.telegram_username)
            .bind(request.verify_code)
            .bind(request.is_verified)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await?;

        Ok(member)
    }

    /// Find member by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Member>, LiraError> {
        let sql = format!("SELECT {} FROM members WHERE id = $1", MEMBER_COLUMNS);
        let member = sqlx::query_as::<_, Member>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(member)
    }

    /// Find the oldest member bound to a Telegram chat
    pub async fn find_by_telegram_id(&self, telegram_id: &str) -> Result<Option<Member>, LiraError> {
        let sql = format!(
            "SELECT {} FROM members WHERE telegram_id = $1 ORDER BY id LIMIT 1",
            MEMBER_COLUMNS
        );
        let member = sqlx::query_as::<_, Member>(&sql)
            .bind(telegram_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(member)
    }

    /// Find member by normalized phone number
    pub async fn find_by_phone(&self, phone: &str) -> Result<Option<Member>, LiraError> {
        let sql = format!(
            "SELECT {} FROM members WHERE phone = $1 ORDER BY id LIMIT 1",
            MEMBER_COLUMNS
        );
        let member = sqlx::query_as::<_, Member>(&sql)
            .bind(phone)
            .fetch_optional(&self.pool)
            .await?;

        Ok(member)
    }

    /// Find member by phone and one-time verification code
    pub async fn find_by_phone_and_code(&self, phone: &str, code: &str) -> Result<Option<Member>, LiraError> {
        let sql = format!(
            "SELECT {} FROM members WHERE phone = $1 AND verify_code = $2 ORDER BY id LIMIT 1",
            MEMBER_COLUMNS
        );
        let member = sqlx::query_as::<_, Member>(&sql)
            .bind(phone)
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;

        Ok(member)
    }

    /// Update member
    pub async fn update(&self, id: i64, request: UpdateMemberRequest) -> Result<Member, LiraError> {
        let sql = format!(
            r#"
            UPDATE members
            SET name = COALESCE($2, name),
                telegram_id = COALESCE($3, telegram_id),
                telegram_username = COALESCE($4, telegram_username),
                is_verified = COALESCE($5, is_verified),
                is_blocked = COALESCE($6, is_blocked),
                updated_at = $7
            WHERE id = $1
            RETURNING {}
            "#,
            MEMBER_COLUMNS
        );
        let member = sqlx::query_as::<_, Member>(&sql)
            .bind(id)
            .bind(request.name)
            .bind(request.telegram_id)
            .bind(request.telegram_username)
            .bind(request.is_verified)
            .bind(request.is_blocked)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?;

        member.ok_or(LiraError::MemberNotFound { member_id: id })
    }

    /// Delete member
    pub async fn delete(&self, id: i64) -> Result<(), LiraError> {
        sqlx::query("DELETE FROM members WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
