//! Background deletion of expired refresh token records
//!
//! The sweeper is a single long-lived task. It wakes once per configured
//! interval, deletes every record whose expiry lies before the current clock
//! instant and goes back to sleep. Failures are logged and retried on the next
//! tick; they never stop the task.

use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn, Instrument, Span};

use crate::clock::Clock;
use crate::errors::StoreError;
use crate::repositories::TokenRepository;

use super::config::ExpirySweeperConfig;

/// Periodically deletes expired refresh token records
pub struct ExpirySweeper<R: TokenRepository + 'static> {
    repository: Arc<R>,
    clock: Arc<dyn Clock>,
    config: ExpirySweeperConfig,
}

impl<R: TokenRepository + 'static> ExpirySweeper<R> {
    pub fn new(repository: Arc<R>, clock: Arc<dyn Clock>, config: ExpirySweeperConfig) -> Self {
        Self {
            repository,
            clock,
            config,
        }
    }

    /// Run a single sweep
    ///
    /// # Returns
    /// * `Ok(u64)` - Number of deleted records
    /// * `Err(StoreError)` - The store failed; nothing is retried here
    pub async fn run_once(&self) -> Result<u64, StoreError> {
        let now = self.clock.now();
        let deleted = self.repository.delete_expired_tokens(now).await?;

        if deleted > 0 {
            info!(deleted, "Deleted expired refresh tokens");
        } else {
            debug!("No expired refresh tokens to delete");
        }

        Ok(deleted)
    }

    /// Spawn the sweep loop as a background task
    ///
    /// Returns `None` when the sweeper is disabled or has a zero interval.
    pub fn spawn(self: Arc<Self>, span: Span) -> Option<SweeperHandle> {
        if !self.config.enabled {
            warn!("Expiry sweeper is disabled");
            return None;
        }
        if self.config.interval.is_zero() {
            warn!("Expiry sweeper interval is zero, not starting");
            return None;
        }

        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();
        let handle = tokio::spawn(async move { self.run(task_cancel).await }.instrument(span));

        Some(SweeperHandle { cancel, handle })
    }

    /// Sweep once per interval until `cancel` fires
    ///
    /// The first sweep runs one full interval after the call. Cancellation
    /// also aborts a sweep that is in flight.
    pub async fn run(&self, cancel: CancellationToken) {
        let period = self.config.interval;
        info!(interval_secs = period.as_secs(), "Expiry sweeper started");

        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => break,
                        result = self.run_once() => {
                            if let Err(e) = result {
                                error!(error = %e, "Expiry sweep failed, retrying next interval");
                            }
                        }
                    }
                }
            }
        }

        info!("Expiry sweeper stopped");
    }
}

/// Handle to a running sweeper task
#[derive(Debug)]
pub struct SweeperHandle {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl SweeperHandle {
    /// Signal the task to stop without waiting for it
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Cancel the task and wait for it to exit
    pub async fn stop(self) {
        self.cancel.cancel();
        if let Err(e) = self.handle.await {
            error!(error = %e, "Expiry sweeper task ended abnormally");
        }
    }
}
