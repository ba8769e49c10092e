//! Admin decisions and the notifications members receive for them

mod helpers;

use assert_matches::assert_matches;
use helpers::*;
use lira_market::database::Registry;
use lira_market::handlers::texts;
use lira_market::models::{CreateDocumentRequest, DocumentType, RequestStatus};
use lira_market::services::{FileStorage, StorageArea};
use lira_market::LiraError;

const CHAT: i64 = 950;

#[tokio::test]
async fn test_reject_request_stores_reason_and_notifies_once() {
    let tc = TestContext::new();
    let member = tc.verified_member(CHAT).await;
    let request = tc.pending_request(member.id, "1500").await;

    let rejected = tc
        .admin()
        .reject_request(request.id, "Receipt is unreadable")
        .await
        .unwrap();

    assert_eq!(rejected.status(), Some(RequestStatus::Rejected));
    let stored = tc.registry.find_request(request.id).await.unwrap().unwrap();
    assert_eq!(stored.status(), Some(RequestStatus::Rejected));
    assert_eq!(stored.rejection_reason.as_deref(), Some("Receipt is unreadable"));

    let sent = tc.source.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].chat_id, CHAT);
    assert!(sent[0].text.contains("Receipt is unreadable"));
}

#[tokio::test]
async fn test_reject_request_validation() {
    let tc = TestContext::new();
    let member = tc.verified_member(CHAT).await;
    let request = tc.pending_request(member.id, "1500").await;
    let admin = tc.admin();

    assert_matches!(admin.reject_request(request.id, "   ").await, Err(LiraError::InvalidInput(_)));
    let too_long = "x".repeat(2001);
    assert_matches!(admin.reject_request(request.id, &too_long).await, Err(LiraError::InvalidInput(_)));
    assert_matches!(
        admin.reject_request(request.id + 100, "reason").await,
        Err(LiraError::RequestNotFound { .. })
    );

    admin.approve_request(request.id).await.unwrap();
    assert_matches!(
        admin.reject_request(request.id, "reason").await,
        Err(LiraError::InvalidStateTransition { from, to }) if from == "done" && to == "rejected"
    );
    assert_matches!(
        admin.approve_request(request.id).await,
        Err(LiraError::InvalidStateTransition { .. })
    );
    assert_eq!(tc.source.sent().len(), 1);
}

#[tokio::test]
async fn test_approve_request_notifies_with_amount() {
    let tc = TestContext::new();
    let member = tc.verified_member(CHAT).await;
    let request = tc.pending_request(member.id, "1500000").await;

    let approved = tc.admin().approve_request(request.id).await.unwrap();

    assert_eq!(approved.status(), Some(RequestStatus::Done));
    let sent = tc.source.texts_to(CHAT);
    assert_eq!(sent, vec![texts::request_approved(&approved)]);
    assert!(sent[0].contains("1,500,000"));
}

#[tokio::test]
async fn test_notification_failure_does_not_undo_decision() {
    let tc = TestContext::new();
    let member = tc.verified_member(CHAT).await;
    let request = tc.pending_request(member.id, "10").await;
    tc.source.fail_sends(true);

    let approved = tc.admin().approve_request(request.id).await.unwrap();
    assert_eq!(approved.status(), Some(RequestStatus::Done));
}

#[tokio::test]
async fn test_approve_member_sends_main_menu() {
    let tc = TestContext::new();
    tc.deliver(text_update(1, CHAT, "/start")).await;
    tc.source.clear_sent();
    let member = tc.member(CHAT).await.unwrap();

    let approved = tc.admin().approve_member(member.id).await.unwrap();

    assert!(approved.is_verified);
    let last = tc.source.last_to(CHAT).unwrap();
    assert_eq!(last.text, texts::MEMBER_APPROVED);
    assert_eq!(last.callback_data(), vec!["lir_to_rial", "rial_to_lir"]);
}

#[tokio::test]
async fn test_reject_member_purges_verification_documents() {
    let tc = TestContext::new();
    tc.deliver(text_update(1, CHAT, "/start")).await;
    let member = tc.member(CHAT).await.unwrap();

    let scratch = tc.temp_dir.path().join("id.png");
    std::fs::write(&scratch, PNG_BYTES).unwrap();
    let stored = tc.storage.store(StorageArea::Verification, &scratch, "png").await.unwrap();
    tc.registry
        .create_document(CreateDocumentRequest {
            member_id: member.id,
            name: texts::VERIFICATION_DOCUMENT_NAME.to_string(),
            file_type: DocumentType::Verification,
            file_path: stored.relative_path.clone(),
            file_url: stored.public_url.clone(),
        })
        .await
        .unwrap();
    assert_eq!(tc.admin().verification_documents(member.id).await.unwrap().len(), 1);
    tc.source.clear_sent();

    tc.admin().reject_member(member.id, Some("Photo is blurry")).await.unwrap();

    assert!(tc.admin().verification_documents(member.id).await.unwrap().is_empty());
    assert!(!tc.storage_root().join(&stored.relative_path).exists());

    let sent = tc.source.sent_to(CHAT);
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].text, texts::member_rejected(Some("Photo is blurry")));
    assert!(sent[0].text.contains("Photo is blurry"));
    assert_eq!(sent[1].text, texts::VERIFICATION_PROMPT);
    assert_eq!(sent[1].callback_data(), vec!["verify_account"]);
}

#[tokio::test]
async fn test_reject_member_without_reason_uses_default_text() {
    let tc = TestContext::new();
    tc.deliver(text_update(1, CHAT, "/start")).await;
    let member = tc.member(CHAT).await.unwrap();
    tc.source.clear_sent();

    tc.admin().reject_member(member.id, None).await.unwrap();
    assert_eq!(tc.source.texts_to(CHAT)[0], texts::MEMBER_REJECTED_DEFAULT);

    assert_matches!(
        tc.admin().reject_member(member.id + 100, None).await,
        Err(LiraError::MemberNotFound { .. })
    );
}

#[tokio::test]
async fn test_blocked_member_gets_notice_on_start() {
    let tc = TestContext::new();
    let member = tc.verified_member(CHAT).await;

    let blocked = tc.admin().set_member_blocked(member.id, true).await.unwrap();
    assert!(blocked.is_blocked);

    tc.deliver(text_update(1, CHAT, "/start")).await;
    assert_eq!(tc.source.texts_to(CHAT), vec![texts::BLOCKED_NOTICE.to_string()]);

    tc.admin().set_member_blocked(member.id, false).await.unwrap();
    tc.deliver(text_update(2, CHAT, "/start")).await;
    assert_eq!(tc.source.last_to(CHAT).unwrap().text, texts::MAIN_MENU);
}
