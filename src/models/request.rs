//! Conversion request model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

/// A member's request to convert between lira and rials
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ConversionRequest {
    pub id: i64,
    pub member_id: i64,
    pub from_currency: String,
    pub to_currency: String,
    /// Decimal amount as entered, after digit normalization
    pub amount: String,
    /// Public URL of the proof-of-payment image
    pub file_url: Option<String>,
    /// Destination IBAN, card or account number
    pub receive_code: Option<String>,
    /// Destination account holder
    pub receive_name: Option<String>,
    /// 8-digit human reference code
    pub code: String,
    pub status: String,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ConversionRequest {
    pub fn status(&self) -> Option<RequestStatus> {
        self.status.parse().ok()
    }

    pub fn is_pending(&self) -> bool {
        self.status() == Some(RequestStatus::Pending)
    }

    /// Flow direction derived from the source currency
    pub fn direction(&self) -> FlowDirection {
        match Currency::from_code(&self.from_currency) {
            Some(Currency::Rials) => FlowDirection::RialToLira,
            _ => FlowDirection::LiraToRial,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateConversionRequest {
    pub member_id: i64,
    pub direction: FlowDirection,
    pub amount: String,
    pub receive_code: String,
    pub receive_name: String,
    pub code: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestStatus {
    Pending,
    Done,
    Rejected,
    Cancelled,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Done => "done",
            RequestStatus::Rejected => "rejected",
            RequestStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RequestStatus::Pending),
            "done" => Ok(RequestStatus::Done),
            "rejected" => Ok(RequestStatus::Rejected),
            // older rows were written with the short form
            "cancelled" | "cancel" => Ok(RequestStatus::Cancelled),
            other => Err(format!("unknown request status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    Lira,
    Rials,
}

impl Currency {
    /// Code persisted in the request ledger
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Lira => "lira",
            Currency::Rials => "rials",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "lira" => Some(Currency::Lira),
            "rials" => Some(Currency::Rials),
            _ => None,
        }
    }

    /// Persian name shown to members
    pub fn label(&self) -> &'static str {
        match self {
            Currency::Lira => "لیر",
            Currency::Rials => "ریال",
        }
    }

    /// Persian label for a stored code, falling back to the raw code
    pub fn label_for_code(code: &str) -> &str {
        Currency::from_code(code).map(|c| c.label()).unwrap_or(code)
    }
}

/// Which of the two conversion flows a chat is in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowDirection {
    LiraToRial,
    RialToLira,
}

impl FlowDirection {
    /// Value kept in the conversation scratch data
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowDirection::LiraToRial => "lir_to_rial",
            FlowDirection::RialToLira => "rial_to_lir",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "lir_to_rial" => Some(FlowDirection::LiraToRial),
            "rial_to_lir" => Some(FlowDirection::RialToLira),
            _ => None,
        }
    }

    pub fn source(&self) -> Currency {
        match self {
            FlowDirection::LiraToRial => Currency::Lira,
            FlowDirection::RialToLira => Currency::Rials,
        }
    }

    pub fn target(&self) -> Currency {
        match self {
            FlowDirection::LiraToRial => Currency::Rials,
            FlowDirection::RialToLira => Currency::Lira,
        }
    }
}
