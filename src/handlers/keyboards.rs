//! Inline keyboards

use crate::telegram::Keyboard;
use super::callbacks::CallbackAction;
use super::texts;

pub fn verification() -> Keyboard {
    Keyboard::single(texts::VERIFY_BUTTON, CallbackAction::VerifyAccount.as_str())
}

pub fn main_menu() -> Keyboard {
    Keyboard::single(texts::LIRA_TO_RIAL_BUTTON, CallbackAction::LiraToRial.as_str())
        .row(texts::RIAL_TO_LIRA_BUTTON, CallbackAction::RialToLira.as_str())
}

pub fn cancel_pending_request() -> Keyboard {
    Keyboard::single(texts::CANCEL_REQUEST_BUTTON, CallbackAction::CancelPendingRequest.as_str())
}
