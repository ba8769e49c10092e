//! System settings repository implementation

use sqlx::PgPool;
use crate::models::setting::SystemSetting;
use crate::utils::errors::LiraError;

#[derive(Clone)]
#[derive(Debug)]
pub struct SettingRepository {
    pool: PgPool,
}

impl SettingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a setting value by name
    pub async fn get(&self, name: &str) -> Result<Option<String>, LiraError> {
        let setting = sqlx::query_as::<_, SystemSetting>(
            "SELECT setting_name, setting_value FROM system_settings WHERE setting_name = $1"
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(setting.and_then(|s| s.setting_value))
    }
}
