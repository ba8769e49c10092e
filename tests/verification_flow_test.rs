//! Scenario tests for /start and both verification methods

mod helpers;

use helpers::*;
use lira_market::database::Registry;
use lira_market::handlers::{texts, UpdateOutcome};
use lira_market::models::{CreateMemberRequest, DocumentType};
use lira_market::state::{ChatStep, ScratchKey};

const CHAT: i64 = 700;

#[tokio::test]
async fn test_start_registers_member_and_image_verification_completes() {
    let tc = TestContext::new();

    assert_eq!(tc.deliver(text_update(1, CHAT, "/start")).await, UpdateOutcome::Processed);

    let member = tc.member(CHAT).await.expect("member created");
    assert!(!member.is_verified);
    assert_eq!(member.name.as_deref(), Some("Ali Rezaei"));
    assert_eq!(member.telegram_username.as_deref(), Some("ali_r"));

    let sent = tc.source.sent_to(CHAT);
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].text, texts::welcome("Ali Rezaei"));
    assert_eq!(sent[1].text, texts::VERIFICATION_PROMPT);
    assert_eq!(sent[1].callback_data(), vec!["verify_account"]);

    tc.deliver(callback_update(2, CHAT, "verify_account")).await;
    assert_eq!(tc.step(CHAT).await, ChatStep::AwaitingVerificationImage);
    assert_eq!(tc.source.last_to(CHAT).unwrap().text, texts::ASK_IDENTITY_IMAGE);

    // Only the largest variant is downloadable
    tc.source.add_file("photo-large", PNG_BYTES);
    tc.deliver(photo_update(3, CHAT, &[("photo-small", 100), ("photo-large", 500), ("photo-thumb", 50)]))
        .await;

    let documents = tc.registry.documents().await;
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].member_id, member.id);
    assert_eq!(documents[0].file_type, DocumentType::Verification.as_str());
    assert_eq!(documents[0].name, texts::VERIFICATION_DOCUMENT_NAME);
    assert!(documents[0].file_url.starts_with(PUBLIC_BASE_URL));
    assert!(documents[0].file_path.starts_with("members/verification/"));
    assert!(tc.storage_root().join(&documents[0].file_path).exists());

    assert_eq!(tc.step(CHAT).await, ChatStep::Idle);
    assert_eq!(tc.source.last_to(CHAT).unwrap().text, texts::IDENTITY_IMAGE_RECEIVED);
}

#[tokio::test]
async fn test_start_for_existing_members() {
    let tc = TestContext::new();
    tc.deliver(text_update(1, CHAT, "/start")).await;
    tc.source.clear_sent();

    tc.deliver(text_update(2, CHAT, "/start@LiraMarketBot")).await;
    assert_eq!(tc.source.texts_to(CHAT), vec![texts::VERIFICATION_PROMPT.to_string()]);
    assert_eq!(tc.registry.members().await.len(), 1);

    tc.verified_member(701).await;
    tc.deliver(text_update(3, 701, "/start")).await;
    let last = tc.source.last_to(701).unwrap();
    assert_eq!(last.text, texts::MAIN_MENU);
    assert_eq!(last.callback_data(), vec!["lir_to_rial", "rial_to_lir"]);
}

#[tokio::test]
async fn test_awaiting_image_reprompts_without_changing_state() {
    let tc = TestContext::new();
    tc.deliver(text_update(1, CHAT, "/start")).await;
    tc.deliver(callback_update(2, CHAT, "verify_account")).await;
    tc.source.clear_sent();

    // Text, even a command, gets the prompt with the format list
    tc.deliver(text_update(3, CHAT, "/start")).await;
    tc.deliver(sticker_update(4, CHAT)).await;

    assert_eq!(
        tc.source.texts_to(CHAT),
        vec![
            texts::ASK_IDENTITY_IMAGE_WITH_FORMATS.to_string(),
            texts::ASK_IDENTITY_IMAGE.to_string(),
        ]
    );
    assert_eq!(tc.step(CHAT).await, ChatStep::AwaitingVerificationImage);
    assert!(tc.registry.documents().await.is_empty());
}

#[tokio::test]
async fn test_non_image_document_is_rejected() {
    let tc = TestContext::new();
    tc.deliver(text_update(1, CHAT, "/start")).await;
    tc.deliver(callback_update(2, CHAT, "verify_account")).await;

    tc.source.add_file("scan", PDF_BYTES);
    tc.deliver(document_update(3, CHAT, "scan", Some("application/pdf"), Some("scan.pdf"))).await;

    assert_eq!(tc.source.last_to(CHAT).unwrap().text, texts::INVALID_IMAGE);
    assert_eq!(tc.step(CHAT).await, ChatStep::AwaitingVerificationImage);
    assert!(tc.registry.documents().await.is_empty());
}

#[tokio::test]
async fn test_download_failure_keeps_state_for_retry() {
    let tc = TestContext::new();
    tc.deliver(text_update(1, CHAT, "/start")).await;
    tc.deliver(callback_update(2, CHAT, "verify_account")).await;

    let outcome = tc.deliver(photo_update(3, CHAT, &[("missing", 10)])).await;
    assert_eq!(outcome, UpdateOutcome::Processed);
    assert_eq!(tc.source.last_to(CHAT).unwrap().text, texts::IMAGE_UPLOAD_FAILED);
    assert_eq!(tc.step(CHAT).await, ChatStep::AwaitingVerificationImage);

    tc.source.add_file("retry", PNG_BYTES);
    tc.deliver(photo_update(4, CHAT, &[("retry", 10)])).await;
    assert_eq!(tc.step(CHAT).await, ChatStep::Idle);
    assert_eq!(tc.registry.documents().await.len(), 1);
}

#[tokio::test]
async fn test_code_verification_merges_duplicate_member() {
    let tc = TestContext::new();
    tc.registry.set_setting("bot_verify", "code").await;

    let authoritative = tc
        .registry
        .create_member(CreateMemberRequest {
            name: Some("Ali Rezaei".to_string()),
            phone: Some("989123334455".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    tc.registry.set_verify_code(authoritative.id, "123456").await.unwrap();

    tc.deliver(text_update(1, CHAT, "/start")).await;
    assert_eq!(tc.registry.members().await.len(), 2);

    tc.deliver(callback_update(2, CHAT, "verify_account")).await;
    assert_eq!(tc.step(CHAT).await, ChatStep::AwaitingPhoneNumber);
    assert_eq!(tc.source.last_to(CHAT).unwrap().text, texts::ASK_PHONE);

    tc.deliver(text_update(3, CHAT, "+۹۸ ۹۱۲ ۳۳۳ ۴۴۵۵")).await;
    assert_eq!(tc.step(CHAT).await, ChatStep::AwaitingVerifyCode);
    assert_eq!(tc.scratch(CHAT, ScratchKey::Phone).await.as_deref(), Some("989123334455"));

    tc.deliver(text_update(4, CHAT, "000000")).await;
    assert_eq!(tc.source.last_to(CHAT).unwrap().text, texts::WRONG_VERIFY_CODE);
    assert_eq!(tc.step(CHAT).await, ChatStep::AwaitingVerifyCode);

    tc.deliver(text_update(5, CHAT, "۱۲۳۴۵۶")).await;

    let members = tc.registry.members().await;
    assert_eq!(members.len(), 1);
    let merged = &members[0];
    assert_eq!(merged.id, authoritative.id);
    assert_eq!(merged.phone.as_deref(), Some("989123334455"));
    assert_eq!(merged.telegram_id.as_deref(), Some("700"));
    assert_eq!(merged.telegram_username.as_deref(), Some("ali_r"));
    assert!(merged.is_verified);

    assert_eq!(tc.step(CHAT).await, ChatStep::Idle);
    assert_eq!(tc.scratch(CHAT, ScratchKey::Phone).await, None);
    let texts_sent = tc.source.texts_to(CHAT);
    assert_eq!(texts_sent[texts_sent.len() - 2], texts::VERIFIED_BY_CODE);
    assert_eq!(texts_sent[texts_sent.len() - 1], texts::MAIN_MENU);
}

#[tokio::test]
async fn test_unknown_and_verified_phone_numbers() {
    let tc = TestContext::new();
    tc.registry.set_setting("bot_verify", "code").await;
    tc.registry
        .create_member(CreateMemberRequest {
            phone: Some("989120000000".to_string()),
            is_verified: true,
            ..Default::default()
        })
        .await
        .unwrap();

    tc.deliver(callback_update(1, CHAT, "verify_account")).await;
    tc.source.clear_sent();

    tc.deliver(text_update(2, CHAT, "989111111111")).await;
    assert_eq!(
        tc.source.texts_to(CHAT),
        vec![texts::PHONE_NOT_FOUND.to_string(), texts::ASK_PHONE.to_string()]
    );
    assert_eq!(tc.step(CHAT).await, ChatStep::AwaitingPhoneNumber);

    tc.source.clear_sent();
    tc.deliver(text_update(3, CHAT, "989120000000")).await;
    assert_eq!(
        tc.source.texts_to(CHAT),
        vec![texts::ALREADY_VERIFIED.to_string(), texts::MAIN_MENU.to_string()]
    );
    assert_eq!(tc.step(CHAT).await, ChatStep::Idle);
}

#[tokio::test]
async fn test_lost_phone_restarts_verification() {
    let tc = TestContext::new();
    tc.state.set_step(CHAT, ChatStep::AwaitingVerifyCode).await.unwrap();

    tc.deliver(text_update(1, CHAT, "123456")).await;

    assert_eq!(
        tc.source.texts_to(CHAT),
        vec![texts::PHONE_SESSION_LOST.to_string(), texts::VERIFICATION_PROMPT.to_string()]
    );
    assert_eq!(tc.step(CHAT).await, ChatStep::Idle);
}
