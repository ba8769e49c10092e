//! Conversation steps and scratch keys
//!
//! A chat is either idle (nothing stored) or waiting for one specific input.
//! Step names are the values persisted in the state store, so they must stay
//! stable across releases.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChatStep {
    Idle,
    AwaitingVerificationImage,
    AwaitingPhoneNumber,
    AwaitingVerifyCode,
    AwaitingAmount,
    AwaitingDestinationCode,
    AwaitingDestinationName,
    AwaitingRequestImage,
}

impl ChatStep {
    /// Stored representation; `Idle` is never stored
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatStep::Idle => "idle",
            ChatStep::AwaitingVerificationImage => "waiting_for_verification_image",
            ChatStep::AwaitingPhoneNumber => "waiting_for_phone_number",
            ChatStep::AwaitingVerifyCode => "waiting_for_verify_code",
            ChatStep::AwaitingAmount => "waiting_for_amount",
            ChatStep::AwaitingDestinationCode => "waiting_for_receive_code",
            ChatStep::AwaitingDestinationName => "waiting_for_receive_name",
            ChatStep::AwaitingRequestImage => "waiting_for_request_image",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, ChatStep::Idle)
    }
}

impl fmt::Display for ChatStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChatStep {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "idle" | "" => Ok(ChatStep::Idle),
            "waiting_for_verification_image" => Ok(ChatStep::AwaitingVerificationImage),
            "waiting_for_phone_number" => Ok(ChatStep::AwaitingPhoneNumber),
            "waiting_for_verify_code" => Ok(ChatStep::AwaitingVerifyCode),
            "waiting_for_amount" => Ok(ChatStep::AwaitingAmount),
            "waiting_for_receive_code" => Ok(ChatStep::AwaitingDestinationCode),
            "waiting_for_receive_name" => Ok(ChatStep::AwaitingDestinationName),
            "waiting_for_request_image" => Ok(ChatStep::AwaitingRequestImage),
            other => Err(format!("unknown chat step: {}", other)),
        }
    }
}

/// Per-chat values kept in the state store, one key each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScratchKey {
    Step,
    Phone,
    Amount,
    DestinationCode,
    DestinationName,
    FlowDirection,
    RequestId,
}

impl ScratchKey {
    pub const ALL: [ScratchKey; 7] = [
        ScratchKey::Step,
        ScratchKey::Phone,
        ScratchKey::Amount,
        ScratchKey::DestinationCode,
        ScratchKey::DestinationName,
        ScratchKey::FlowDirection,
        ScratchKey::RequestId,
    ];

    /// Keys that belong to a conversion flow
    pub const CONVERSION: [ScratchKey; 5] = [
        ScratchKey::Amount,
        ScratchKey::DestinationCode,
        ScratchKey::DestinationName,
        ScratchKey::FlowDirection,
        ScratchKey::RequestId,
    ];

    pub fn purpose(&self) -> &'static str {
        match self {
            ScratchKey::Step => "state",
            ScratchKey::Phone => "phone",
            ScratchKey::Amount => "amount",
            ScratchKey::DestinationCode => "receive_code",
            ScratchKey::DestinationName => "receive_name",
            ScratchKey::FlowDirection => "flow_type",
            ScratchKey::RequestId => "request_id",
        }
    }

    /// Store key for this purpose in one chat, e.g. `chat:42:amount`
    pub fn for_chat(&self, chat_id: i64) -> String {
        format!("chat:{}:{}", chat_id, self.purpose())
    }
}
