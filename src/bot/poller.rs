//! Long-poll loop
//!
//! Drives the dispatcher until the shutdown future resolves. A single
//! failed iteration never ends the loop.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use crate::config::PollingConfig;
use crate::utils::errors::LiraError;
use super::dispatcher::UpdateDispatcher;

pub struct Poller {
    dispatcher: Arc<UpdateDispatcher>,
    config: PollingConfig,
}

impl Poller {
    pub fn new(dispatcher: Arc<UpdateDispatcher>, config: PollingConfig) -> Self {
        Self { dispatcher, config }
    }

    /// Delay before the next iteration after `err`.
    ///
    /// Conflicts and errors a retry cannot fix get the long backoff.
    pub fn backoff_for(&self, err: &LiraError) -> Duration {
        if err.is_conflict() || !err.is_recoverable() {
            self.config.conflict_backoff()
        } else {
            self.config.error_backoff()
        }
    }

    /// Run one iteration and return how long to sleep afterwards
    pub async fn tick(&self) -> Duration {
        match self.dispatcher.run_once().await {
            Ok(_) => self.config.interval(),
            Err(e) if e.is_conflict() => {
                warn!(error = %e, "Another consumer is polling, backing off");
                self.dispatcher.reset_cursor_cache().await;
                self.backoff_for(&e)
            }
            Err(e) => {
                error!(
                    error = %e,
                    severity = %e.severity(),
                    recoverable = e.is_recoverable(),
                    "Poll iteration failed"
                );
                self.backoff_for(&e)
            }
        }
    }

    pub async fn run_until<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        info!(
            timeout_seconds = self.config.timeout_seconds,
            interval_ms = self.config.interval_ms,
            "Starting long polling"
        );

        loop {
            let delay = self.tick().await;

            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested, stopping poll loop");
                    break;
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }
}
