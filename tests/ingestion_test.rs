//! Image ingestion against the scripted source and local disk storage

mod helpers;

use assert_matches::assert_matches;
use helpers::*;
use lira_market::services::StorageArea;
use lira_market::telegram::MediaVariant;
use lira_market::LiraError;

fn media(update: lira_market::telegram::InboundUpdate) -> Option<MediaVariant> {
    update.message.and_then(|m| m.media)
}

fn scratch_is_empty(tc: &TestContext) -> bool {
    match std::fs::read_dir(tc.scratch_dir()) {
        Ok(mut entries) => entries.next().is_none(),
        Err(_) => true,
    }
}

#[tokio::test]
async fn test_photo_uses_largest_variant() {
    let tc = TestContext::new();
    tc.source.add_file("p500", PNG_BYTES);
    let media = media(photo_update(1, 1, &[("p100", 100), ("p500", 500), ("p50", 50)]));

    let image = tc.ctx.ingestor.ingest(media.as_ref(), StorageArea::Requests).await.unwrap();

    assert_eq!(image.extension, "png");
    assert!(image.relative_path.starts_with("images/requests/"));
    assert_eq!(image.url, format!("{}{}", PUBLIC_BASE_URL, image.relative_path));
    assert_eq!(std::fs::read(tc.storage_root().join(&image.relative_path)).unwrap(), PNG_BYTES);
    assert!(scratch_is_empty(&tc));
}

#[tokio::test]
async fn test_detected_type_wins_over_declared() {
    let tc = TestContext::new();
    tc.source.add_file("doc", PNG_BYTES);
    let media = media(document_update(1, 1, "doc", Some("image/jpeg"), Some("id.jpg")));

    let image = tc.ctx.ingestor.ingest(media.as_ref(), StorageArea::Verification).await.unwrap();
    assert_eq!(image.extension, "png");
    assert!(image.relative_path.ends_with(".png"));
}

#[tokio::test]
async fn test_unlabelled_document_is_probed() {
    let tc = TestContext::new();
    tc.source.add_file("blob", PNG_BYTES);
    let media = media(document_update(1, 1, "blob", Some("application/octet-stream"), Some("scan.dat")));

    let image = tc.ctx.ingestor.ingest(media.as_ref(), StorageArea::Verification).await.unwrap();
    assert_eq!(image.extension, "png");
}

#[tokio::test]
async fn test_svg_document_is_accepted() {
    let tc = TestContext::new();
    tc.source.add_file("logo", br#"<?xml version="1.0"?><svg xmlns="http://www.w3.org/2000/svg"></svg>"#);
    let media = media(document_update(1, 1, "logo", Some("image/svg+xml"), Some("logo.svg")));

    let image = tc.ctx.ingestor.ingest(media.as_ref(), StorageArea::Verification).await.unwrap();
    assert_eq!(image.extension, "svg");
}

#[tokio::test]
async fn test_spoofed_extension_is_rejected_and_cleaned_up() {
    let tc = TestContext::new();
    tc.source.add_file("fake", PDF_BYTES);
    let media = media(document_update(1, 1, "fake", Some("image/png"), Some("fake.png")));

    let result = tc.ctx.ingestor.ingest(media.as_ref(), StorageArea::Verification).await;

    assert_matches!(result, Err(LiraError::InvalidImage(_)));
    assert!(scratch_is_empty(&tc));
    assert!(!tc.storage_root().join("members/verification").exists()
        || std::fs::read_dir(tc.storage_root().join("members/verification")).unwrap().next().is_none());
}

#[tokio::test]
async fn test_messages_without_files_have_no_image() {
    let tc = TestContext::new();

    assert_matches!(
        tc.ctx.ingestor.ingest(None, StorageArea::Requests).await,
        Err(LiraError::NoImageFound)
    );
    assert_matches!(
        tc.ctx.ingestor.ingest(Some(&MediaVariant::Other), StorageArea::Requests).await,
        Err(LiraError::NoImageFound)
    );
    assert_matches!(
        tc.ctx.ingestor.ingest(Some(&MediaVariant::Photo(Vec::new())), StorageArea::Requests).await,
        Err(LiraError::NoImageFound)
    );
}

#[tokio::test]
async fn test_download_failure_is_a_resource_error() {
    let tc = TestContext::new();
    let media = media(photo_update(1, 1, &[("gone", 10)]));

    let result = tc.ctx.ingestor.ingest(media.as_ref(), StorageArea::Requests).await;
    assert_matches!(result, Err(LiraError::Storage(_)));
}
