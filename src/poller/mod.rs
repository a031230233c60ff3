//! Long-polling update loop.
//!
//! A single sequential loop fetches updates and owns the cursor. Every
//! update of a batch is handed to its own task with an independent deadline;
//! the cursor moves past the batch as soon as the tasks are launched.

mod sink;

pub use sink::{ErrorOrigin, ErrorSink, LogErrorSink};

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, trace};

use crate::handlers::HandlerError;
use crate::telegram::{TelegramApi, TelegramError, TelegramResult, Update};

/// Flat delay between a failed fetch and the next attempt.
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_secs(1);

/// Entry point the poller invokes once per received update.
#[async_trait]
pub trait UpdateHandler: Send + Sync {
    async fn handle(&self, api: &dyn TelegramApi, update: Update) -> Result<(), HandlerError>;
}

#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Deadline of one `getUpdates` call, including the server-side wait.
    pub fetch_timeout: Duration,
    /// Deadline of one dispatched update.
    pub handler_timeout: Duration,
    /// Server-side long-poll wait in seconds.
    pub long_poll_secs: u64,
    /// Maximum number of updates requested per call.
    pub batch_limit: Option<u32>,
    pub retry_backoff: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(10),
            handler_timeout: Duration::from_secs(20),
            long_poll_secs: 1,
            batch_limit: Some(1),
            retry_backoff: DEFAULT_RETRY_BACKOFF,
        }
    }
}

pub struct Poller {
    api: Arc<dyn TelegramApi>,
    config: PollerConfig,
    offset: Option<i64>,
}

impl Poller {
    pub fn new(api: Arc<dyn TelegramApi>, config: PollerConfig) -> Self {
        Self {
            api,
            config,
            offset: None,
        }
    }

    /// Next update identifier to request; `None` until the first batch arrives.
    pub fn offset(&self) -> Option<i64> {
        self.offset
    }

    /// Poll until `cancel` fires.
    ///
    /// Fetch failures are reported to `sink` and retried forever, so the only
    /// way out is cancellation, which yields `Ok(())`. In-flight dispatches
    /// observe the same token; `run` waits for them before returning.
    pub async fn run(
        &mut self,
        cancel: CancellationToken,
        handler: Arc<dyn UpdateHandler>,
        sink: Arc<dyn ErrorSink>,
    ) -> TelegramResult<()> {
        info!("Starting update poller");

        let tasks = TaskTracker::new();
        let result = self.poll_loop(&cancel, &tasks, &handler, &sink).await;

        tasks.close();
        if !tasks.is_empty() {
            debug!("Waiting for {} in-flight update(s) to finish", tasks.len());
        }
        tasks.wait().await;

        info!("Update poller stopped");
        result
    }

    async fn poll_loop(
        &mut self,
        cancel: &CancellationToken,
        tasks: &TaskTracker,
        handler: &Arc<dyn UpdateHandler>,
        sink: &Arc<dyn ErrorSink>,
    ) -> TelegramResult<()> {
        loop {
            if cancel.is_cancelled() {
                return Ok(());
            }

            let updates = match self.fetch(cancel).await {
                Ok(updates) => updates,
                Err(e) if e.is_cancelled() => return Ok(()),
                Err(e) => {
                    sink.report(ErrorOrigin::Poller, &e);
                    tokio::select! {
                        _ = cancel.cancelled() => return Ok(()),
                        _ = sleep(self.config.retry_backoff) => {}
                    }
                    continue;
                }
            };

            // Empty batch: the server-side wait already throttled us.
            let Some(next) = next_offset(self.offset, &updates) else {
                continue;
            };

            debug!("Received {} update(s)", updates.len());
            for update in updates {
                self.dispatch(tasks, cancel, handler, sink, update);
            }
            self.offset = Some(next);
        }
    }

    async fn fetch(&self, cancel: &CancellationToken) -> TelegramResult<Vec<Update>> {
        let request = self.api.get_updates(
            self.offset,
            self.config.batch_limit,
            self.config.long_poll_secs,
        );

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(TelegramError::Cancelled),
            res = timeout(self.config.fetch_timeout, request) => {
                res.unwrap_or(Err(TelegramError::Timeout(self.config.fetch_timeout)))
            }
        }
    }

    fn dispatch(
        &self,
        tasks: &TaskTracker,
        cancel: &CancellationToken,
        handler: &Arc<dyn UpdateHandler>,
        sink: &Arc<dyn ErrorSink>,
        update: Update,
    ) {
        let api = Arc::clone(&self.api);
        let handler = Arc::clone(handler);
        let sink = Arc::clone(sink);
        let cancel = cancel.clone();
        let deadline = self.config.handler_timeout;

        tasks.spawn(async move {
            let update_id = update.update_id;
            let outcome = tokio::select! {
                biased;
                res = timeout(deadline, handler.handle(api.as_ref(), update)) => {
                    res.unwrap_or(Err(HandlerError::Timeout(deadline)))
                }
                _ = cancel.cancelled() => Err(HandlerError::Cancelled),
            };

            match outcome {
                Ok(()) => trace!(update_id, "update handled"),
                Err(e) if e.is_cancelled() => debug!(update_id, "update dispatch cancelled"),
                Err(e) => sink.report(ErrorOrigin::Handler, &e),
            }
        });
    }
}

/// Cursor after a batch: one past its highest identifier, never moving back.
/// `None` for an empty batch.
pub fn next_offset(current: Option<i64>, updates: &[Update]) -> Option<i64> {
    let highest = updates.iter().map(|u| u.update_id).max()?;
    let next = highest + 1;
    Some(current.map_or(next, |c| c.max(next)))
}
