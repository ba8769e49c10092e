//! Update builders and file fixtures

use lira_market::telegram::{
    CallbackEvent, ChatInfo, DocumentRef, InboundUpdate, MediaVariant, MessageEvent, PhotoVariant,
};

/// PNG signature followed by the start of an IHDR chunk
pub const PNG_BYTES: &[u8] = &[
    0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, b'I', b'H', b'D', b'R',
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x02, 0x00, 0x00, 0x00,
];

pub const PDF_BYTES: &[u8] = b"%PDF-1.4\n%\xe2\xe3\xcf\xd3\n1 0 obj\n<< /Type /Catalog >>\nendobj\n";

pub fn chat(chat_id: i64) -> ChatInfo {
    ChatInfo {
        id: chat_id,
        username: Some("ali_r".to_string()),
        first_name: Some("Ali".to_string()),
        last_name: Some("Rezaei".to_string()),
    }
}

fn message_update(update_id: i64, message: MessageEvent) -> InboundUpdate {
    InboundUpdate {
        id: update_id,
        callback: None,
        message: Some(message),
    }
}

pub fn text_update(update_id: i64, chat_id: i64, text: &str) -> InboundUpdate {
    message_update(
        update_id,
        MessageEvent {
            chat: chat(chat_id),
            text: Some(text.to_string()),
            media: None,
        },
    )
}

/// Photo with `(file_id, byte_size)` variants
pub fn photo_update(update_id: i64, chat_id: i64, variants: &[(&str, u64)]) -> InboundUpdate {
    let variants = variants
        .iter()
        .map(|(file_id, size)| PhotoVariant {
            file_id: file_id.to_string(),
            file_size: Some(*size),
            width: 320,
            height: 320,
        })
        .collect();

    message_update(
        update_id,
        MessageEvent {
            chat: chat(chat_id),
            text: None,
            media: Some(MediaVariant::Photo(variants)),
        },
    )
}

pub fn document_update(
    update_id: i64,
    chat_id: i64,
    file_id: &str,
    mime_type: Option<&str>,
    file_name: Option<&str>,
) -> InboundUpdate {
    message_update(
        update_id,
        MessageEvent {
            chat: chat(chat_id),
            text: None,
            media: Some(MediaVariant::Document(DocumentRef {
                file_id: file_id.to_string(),
                mime_type: mime_type.map(str::to_string),
                file_name: file_name.map(str::to_string),
            })),
        },
    )
}

/// Sticker, voice note or anything else without text or file
pub fn sticker_update(update_id: i64, chat_id: i64) -> InboundUpdate {
    message_update(
        update_id,
        MessageEvent {
            chat: chat(chat_id),
            text: None,
            media: Some(MediaVariant::Other),
        },
    )
}

pub fn callback_update(update_id: i64, chat_id: i64, data: &str) -> InboundUpdate {
    InboundUpdate {
        id: update_id,
        callback: Some(CallbackEvent {
            id: format!("cb-{}", update_id),
            data: Some(data.to_string()),
            chat_id: Some(chat_id),
            from_id: chat_id as u64,
        }),
        message: None,
    }
}

/// Update kind the bot does not handle (edited message, poll, ...)
pub fn unsupported_update(update_id: i64) -> InboundUpdate {
    InboundUpdate {
        id: update_id,
        callback: None,
        message: None,
    }
}
