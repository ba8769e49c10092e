//! System settings

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Setting that selects how members verify their account
pub const VERIFICATION_METHOD_SETTING: &str = "bot_verify";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SystemSetting {
    pub setting_name: String,
    pub setting_value: Option<String>,
}

/// How a member proves their identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerificationMethod {
    /// Phone number plus a one-time code issued by an admin
    Code,
    /// Photo of an identity document, reviewed by an admin
    Image,
}

impl VerificationMethod {
    /// Interpret a stored setting value; anything but `code` means image
    pub fn from_setting(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("code") => VerificationMethod::Code,
            _ => VerificationMethod::Image,
        }
    }
}
