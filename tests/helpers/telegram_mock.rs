//! Scripted Update Source
//!
//! Serves queued batches, records every outbound call and serves file bytes
//! from a map keyed by file id.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use lira_market::telegram::{InboundUpdate, Keyboard, RemoteFile, UpdateSource};
use lira_market::{LiraError, Result};

/// One recorded `send_message` call
#[derive(Debug, Clone, PartialEq)]
pub struct SentMessage {
    pub chat_id: i64,
    pub text: String,
    pub keyboard: Option<Keyboard>,
}

impl SentMessage {
    pub fn callback_data(&self) -> Vec<String> {
        self.keyboard
            .as_ref()
            .map(|k| k.callback_data().into_iter().map(str::to_string).collect())
            .unwrap_or_default()
    }
}

#[derive(Default)]
pub struct FakeSource {
    batches: Mutex<VecDeque<Result<Vec<InboundUpdate>>>>,
    fetch_calls: Mutex<Vec<Option<i64>>>,
    sent: Mutex<Vec<SentMessage>>,
    answered: Mutex<Vec<String>>,
    files: Mutex<HashMap<String, Vec<u8>>>,
    fail_sends: AtomicBool,
    fetch_delay: Mutex<Option<Duration>>,
    webhook_cleared: AtomicBool,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_batch(&self, updates: Vec<InboundUpdate>) {
        self.batches.lock().unwrap().push_back(Ok(updates));
    }

    pub fn push_error(&self, error: LiraError) {
        self.batches.lock().unwrap().push_back(Err(error));
    }

    pub fn add_file(&self, file_id: &str, bytes: &[u8]) {
        self.files.lock().unwrap().insert(file_id.to_string(), bytes.to_vec());
    }

    pub fn fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    pub fn delay_fetches(&self, delay: Duration) {
        *self.fetch_delay.lock().unwrap() = Some(delay);
    }

    pub fn fetch_calls(&self) -> Vec<Option<i64>> {
        self.fetch_calls.lock().unwrap().clone()
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, chat_id: i64) -> Vec<SentMessage> {
        self.sent().into_iter().filter(|m| m.chat_id == chat_id).collect()
    }

    pub fn texts_to(&self, chat_id: i64) -> Vec<String> {
        self.sent_to(chat_id).into_iter().map(|m| m.text).collect()
    }

    pub fn last_to(&self, chat_id: i64) -> Option<SentMessage> {
        self.sent_to(chat_id).pop()
    }

    pub fn clear_sent(&self) {
        self.sent.lock().unwrap().clear();
    }

    pub fn answered(&self) -> Vec<String> {
        self.answered.lock().unwrap().clone()
    }

    pub fn webhook_cleared(&self) -> bool {
        self.webhook_cleared.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl UpdateSource for FakeSource {
    async fn fetch_updates(&self, after_id: Option<i64>, _timeout_seconds: u32) -> Result<Vec<InboundUpdate>> {
        self.fetch_calls.lock().unwrap().push(after_id);

        let delay = *self.fetch_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let next = self.batches.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn send_message(&self, chat_id: i64, text: &str, keyboard: Option<Keyboard>) -> Result<()> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(LiraError::Storage("sendMessage unavailable".to_string()));
        }
        self.sent.lock().unwrap().push(SentMessage {
            chat_id,
            text: text.to_string(),
            keyboard,
        });
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str) -> Result<()> {
        self.answered.lock().unwrap().push(callback_id.to_string());
        Ok(())
    }

    async fn get_file(&self, file_id: &str) -> Result<RemoteFile> {
        let size = self.files.lock().unwrap().get(file_id).map(|b| b.len() as u64);
        Ok(RemoteFile {
            file_id: file_id.to_string(),
            path: format!("files/{}", file_id),
            size,
        })
    }

    async fn download_file(&self, file: &RemoteFile, dest_dir: &Path) -> Result<PathBuf> {
        let bytes = self
            .files
            .lock()
            .unwrap()
            .get(&file.file_id)
            .cloned()
            .ok_or_else(|| LiraError::Storage(format!("download of {} failed", file.file_id)))?;

        tokio::fs::create_dir_all(dest_dir).await?;
        let path = dest_dir.join(format!("{}.download", uuid::Uuid::new_v4().simple()));
        tokio::fs::write(&path, bytes).await?;
        Ok(path)
    }

    async fn clear_webhook(&self) -> Result<()> {
        self.webhook_cleared.store(true, Ordering::SeqCst);
        Ok(())
    }
}
