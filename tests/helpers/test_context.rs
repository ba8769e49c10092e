//! Test context for unified test setup
//!
//! Wires a `BotContext` to the scripted source, the in-memory registry and
//! state stores, and local disk storage in a temporary directory.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use lira_market::bot::UpdateDispatcher;
use lira_market::database::{InMemoryRegistry, Registry};
use lira_market::handlers::{handle_update, UpdateOutcome};
use lira_market::models::{CreateConversionRequest, CreateMemberRequest, ConversionRequest, FlowDirection, Member};
use lira_market::services::{AdminService, ImageIngestor, LocalDiskStorage, NotificationService};
use lira_market::state::{BotContext, ChatStep, ConversationState, MemoryChatStateStore, MemoryCursorStore, ScratchKey};
use lira_market::telegram::InboundUpdate;

use super::telegram_mock::FakeSource;

pub const PUBLIC_BASE_URL: &str = "http://localhost:8000/storage/";

pub struct TestContext {
    pub source: Arc<FakeSource>,
    pub registry: Arc<InMemoryRegistry>,
    pub storage: Arc<LocalDiskStorage>,
    pub cursor: Arc<MemoryCursorStore>,
    pub state: ConversationState,
    pub ctx: BotContext,
    pub temp_dir: TempDir,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_cursor(MemoryCursorStore::new())
    }

    pub fn with_cursor(cursor: MemoryCursorStore) -> Self {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let source = Arc::new(FakeSource::new());
        let registry = Arc::new(InMemoryRegistry::new());
        let storage = Arc::new(
            LocalDiskStorage::new(temp_dir.path().join("public"), PUBLIC_BASE_URL)
                .expect("Failed to create storage"),
        );
        let state = ConversationState::new(Arc::new(MemoryChatStateStore::default()), Duration::from_secs(3600));
        let ingestor = ImageIngestor::new(source.clone(), storage.clone(), temp_dir.path().join("scratch"));
        let ctx = BotContext::new(source.clone(), registry.clone(), state.clone(), ingestor);

        Self {
            source,
            registry,
            storage,
            cursor: Arc::new(cursor),
            state,
            ctx,
            temp_dir,
        }
    }

    pub fn storage_root(&self) -> PathBuf {
        self.temp_dir.path().join("public")
    }

    pub fn scratch_dir(&self) -> PathBuf {
        self.temp_dir.path().join("scratch")
    }

    pub fn dispatcher(&self) -> UpdateDispatcher {
        UpdateDispatcher::new(self.ctx.clone(), self.cursor.clone(), 10)
    }

    pub fn admin(&self) -> AdminService {
        AdminService::new(
            self.registry.clone(),
            NotificationService::new(self.source.clone()),
            self.storage.clone(),
        )
    }

    /// Run one update through the state machine
    pub async fn deliver(&self, update: InboundUpdate) -> UpdateOutcome {
        handle_update(&self.ctx, &update).await
    }

    pub async fn step(&self, chat_id: i64) -> ChatStep {
        self.state.step(chat_id).await.expect("Failed to read step")
    }

    pub async fn scratch(&self, chat_id: i64, key: ScratchKey) -> Option<String> {
        self.state.get(chat_id, key).await.expect("Failed to read scratch")
    }

    pub async fn member(&self, chat_id: i64) -> Option<Member> {
        self.registry
            .find_member_by_telegram_id(&chat_id.to_string())
            .await
            .expect("Failed to look up member")
    }

    /// Member bound to `chat_id` and already verified
    pub async fn verified_member(&self, chat_id: i64) -> Member {
        self.registry
            .create_member(CreateMemberRequest {
                name: Some("Ali Rezaei".to_string()),
                telegram_id: Some(chat_id.to_string()),
                is_verified: true,
                ..Default::default()
            })
            .await
            .expect("Failed to create member")
    }

    pub async fn pending_request(&self, member_id: i64, amount: &str) -> ConversionRequest {
        self.registry
            .create_request(CreateConversionRequest {
                member_id,
                direction: FlowDirection::LiraToRial,
                amount: amount.to_string(),
                receive_code: "IR120000000000000000000001".to_string(),
                receive_name: "Ali".to_string(),
                code: "00012345".to_string(),
            })
            .await
            .expect("Failed to create request")
    }
}
