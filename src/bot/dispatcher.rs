//! Update dispatcher
//!
//! One batch: fetch after the cursor, handle every update in ascending id
//! order, then advance the durable cursor once.

use std::sync::Arc;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info};
use crate::handlers::{handle_update, UpdateOutcome};
use crate::state::{BotContext, CursorStore};
use crate::utils::errors::Result;

/// Counts for one processed batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub total_updates: usize,
    /// Highest update id handled so far
    pub cursor: Option<i64>,
}

impl BatchReport {
    fn record(&mut self, outcome: UpdateOutcome) {
        match outcome {
            UpdateOutcome::Processed => self.processed += 1,
            UpdateOutcome::Skipped => self.skipped += 1,
            UpdateOutcome::Failed => self.failed += 1,
        }
    }
}

pub struct UpdateDispatcher {
    ctx: BotContext,
    cursor_store: Arc<dyn CursorStore>,
    /// In-memory copy of the durable cursor; `None` means reload
    cached_cursor: Mutex<Option<i64>>,
    timeout_seconds: u32,
}

impl UpdateDispatcher {
    pub fn new(ctx: BotContext, cursor_store: Arc<dyn CursorStore>, timeout_seconds: u32) -> Self {
        Self {
            ctx,
            cursor_store,
            cached_cursor: Mutex::new(None),
            timeout_seconds,
        }
    }

    pub fn context(&self) -> &BotContext {
        &self.ctx
    }

    /// Fetch and handle one batch.
    ///
    /// Skipped and failed updates still move the cursor; the durable value
    /// only ever grows.
    pub async fn run_once(&self) -> Result<BatchReport> {
        let mut cached = self.cached_cursor.lock().await;
        let last = match *cached {
            Some(cursor) => Some(cursor),
            None => self.cursor_store.load().await?,
        };

        let mut updates = self.ctx.source.fetch_updates(last, self.timeout_seconds).await?;
        updates.sort_by_key(|update| update.id);

        let mut report = BatchReport {
            total_updates: updates.len(),
            ..Default::default()
        };
        let mut candidate = last;

        for update in &updates {
            let outcome = handle_update(&self.ctx, update).await;
            debug!(update_id = update.id, chat_id = ?update.chat_id(), outcome = ?outcome, "Update handled");
            report.record(outcome);
            candidate = candidate.max(Some(update.id));
        }

        if candidate > last {
            if let Some(cursor) = candidate {
                self.cursor_store.store(cursor).await?;
            }
        }
        *cached = candidate;
        report.cursor = candidate;

        if report.total_updates > 0 {
            info!(
                processed = report.processed,
                skipped = report.skipped,
                failed = report.failed,
                cursor = ?report.cursor,
                "Batch processed"
            );
        }
        Ok(report)
    }

    /// Forget the in-memory cursor so the next batch reloads the durable one
    pub async fn reset_cursor_cache(&self) {
        *self.cached_cursor.lock().await = None;
    }
}
