//! Relay loop - the orchestrating state machine
//!
//! One loop instance drives one relay direction. Each iteration derives the
//! sync range from live chain state, builds and submits batches, then picks
//! the next delay from the outcome. A monotonic stall deadline bounds the
//! total time without a successful submission; it is re-armed on every
//! success and queried (not raced) at iteration boundaries. Fatal errors
//! terminate the loop immediately.
//!
//! Nonce sequencing is strictly serial per account, which is why one
//! iteration always completes before the next begins. If the relayer
//! account is shared with other processes, nonce serialization must move to
//! the account layer; this engine assumes exclusive use.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{error, info, warn};

use crate::batch::BatchBuilder;
use crate::chain::{DestChain, SourceChain};
use crate::codec::HeaderCodec;
use crate::config::RelayConfig;
use crate::cursor::{SyncCursor, SyncDecision};
use crate::error::RelayError;
use crate::metrics;
use crate::submitter::TransactionSubmitter;
use crate::types::SyncRange;

/// Delay schedule applied between loop iterations. Re-evaluated after every
/// iteration; durations are unsigned so a delay can never go negative.
#[derive(Debug, Clone)]
pub struct DelayPolicy {
    /// Delay when the bridge is caught up and there is nothing to relay.
    pub idle: Duration,
    /// Fixed delay after a retryable error.
    pub error: Duration,
    /// Longer delay while a destination fork/rollback is suspected.
    pub fork: Duration,
    /// Per-batch cool-down after a successful cycle. Sending more batches
    /// earns a longer pause, spreading destination-chain load.
    pub success_per_batch: Duration,
    /// Maximum time without a successful submission before the loop
    /// terminates with [`RelayError::Stalled`].
    pub stall_timeout: Duration,
}

impl DelayPolicy {
    pub fn from_config(config: &RelayConfig) -> Self {
        Self {
            idle: Duration::from_secs(config.idle_delay_secs),
            error: Duration::from_secs(config.error_delay_secs),
            fork: Duration::from_secs(config.fork_delay_secs),
            success_per_batch: Duration::from_secs(config.success_delay_secs),
            stall_timeout: Duration::from_secs(config.stall_timeout_secs),
        }
    }

    /// Throughput-aware pacing: cool-down proportional to batches sent.
    pub fn after_success(&self, batches_sent: usize) -> Duration {
        self.success_per_batch
            .saturating_mul(batches_sent.max(1) as u32)
    }
}

pub struct RelayLoop {
    source: Arc<dyn SourceChain>,
    dest: Arc<dyn DestChain>,
    codec: Arc<dyn HeaderCodec>,
    submitter: TransactionSubmitter,
    cursor: SyncCursor,
    policy: DelayPolicy,
    batch_size: u64,
}

impl RelayLoop {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        source: Arc<dyn SourceChain>,
        dest: Arc<dyn DestChain>,
        codec: Arc<dyn HeaderCodec>,
        submitter: TransactionSubmitter,
        cursor: SyncCursor,
        policy: DelayPolicy,
        batch_size: u64,
    ) -> Self {
        Self {
            source,
            dest,
            codec,
            submitter,
            cursor,
            policy,
            batch_size,
        }
    }

    /// Run until shutdown, a fatal error, or the stall deadline.
    ///
    /// Shutdown is cooperative: the signal is observed at iteration
    /// boundaries, so an iteration already in flight completes first.
    pub async fn run(mut self, mut shutdown: mpsc::Receiver<()>) -> Result<(), RelayError> {
        let mut deadline = Instant::now() + self.policy.stall_timeout;
        let mut delay = Duration::from_secs(1);
        let mut last_range: Option<SyncRange> = None;
        let mut last_error: Option<String> = None;

        info!(stall_timeout_secs = self.policy.stall_timeout.as_secs(), "relay loop started");

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    info!("shutdown signal received, stopping relay loop");
                    return Ok(());
                }
                _ = tokio::time::sleep(delay) => {}
            }

            if Instant::now() >= deadline {
                error!(
                    window_secs = self.policy.stall_timeout.as_secs(),
                    last_range = ?last_range,
                    last_error = ?last_error,
                    "stall window elapsed with no successful submission"
                );
                return Err(RelayError::Stalled {
                    window: self.policy.stall_timeout,
                    last_range,
                    last_error,
                });
            }

            let decision = match self
                .cursor
                .next_decision(self.source.as_ref(), self.dest.as_ref())
                .await
            {
                Ok(decision) => decision,
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    warn!(error = %e, "range derivation failed, will retry");
                    metrics::RELAY_ERRORS.with_label_values(&[e.class()]).inc();
                    last_error = Some(e.to_string());
                    delay = self.policy.error;
                    continue;
                }
            };

            match decision {
                SyncDecision::Idle => {
                    delay = self.policy.idle;
                }
                SyncDecision::Fork { synced, confirmed } => {
                    warn!(
                        synced,
                        confirmed,
                        delay_secs = self.policy.fork.as_secs(),
                        "destination bridge ahead of confirmable source height, \
                         suspecting fork/rollback"
                    );
                    metrics::RELAY_ERRORS.with_label_values(&["fork"]).inc();
                    delay = self.policy.fork;
                }
                SyncDecision::Range(range) => {
                    last_range = Some(range);
                    let (sent, headers, err) = self.relay_range(range).await;

                    if let Some(e) = err {
                        if e.is_fatal() {
                            error!(error = %e, range = %range, "fatal error, terminating relay loop");
                            metrics::RELAY_ERRORS.with_label_values(&[e.class()]).inc();
                            return Err(e);
                        }
                        warn!(error = %e, range = %range, batches_sent = sent, "relay cycle failed");
                        metrics::RELAY_ERRORS.with_label_values(&[e.class()]).inc();
                        last_error = Some(e.to_string());
                    }

                    if sent > 0 {
                        // Progress was made: re-arm the stall deadline. The
                        // next range is re-derived from the contract, so the
                        // submitted heights are never replayed once mined.
                        deadline = Instant::now() + self.policy.stall_timeout;
                        delay = self.policy.after_success(sent);
                        metrics::HEADERS_RELAYED.inc_by(headers as f64);
                        if let Ok(now) = SystemTime::now().duration_since(UNIX_EPOCH) {
                            metrics::LAST_SUCCESSFUL_SUBMISSION.set(now.as_secs_f64());
                        }
                        info!(
                            range = %range,
                            batches_sent = sent,
                            headers,
                            next_delay_secs = delay.as_secs(),
                            "relay cycle complete"
                        );
                    } else {
                        delay = self.policy.error;
                    }
                }
            }
        }
    }

    /// Build and submit every batch in `range`, serially.
    ///
    /// Returns (batches sent, headers sent, error). The nonce for batch k
    /// is exactly `initial + k - 1`; a failure aborts the cycle so the
    /// sequence stays gap-free.
    async fn relay_range(&self, range: SyncRange) -> (usize, u64, Option<RelayError>) {
        let account = self.submitter.signer_address();
        let initial_nonce = match self.dest.nonce(account).await {
            Ok(nonce) => nonce,
            Err(e) => return (0, 0, Some(e)),
        };

        let mut builder =
            BatchBuilder::new(self.source.as_ref(), self.codec.as_ref(), range, self.batch_size);
        let mut sent = 0usize;
        let mut headers = 0u64;

        loop {
            let batch = match builder.next_batch().await {
                Ok(Some(batch)) => batch,
                Ok(None) => return (sent, headers, None),
                Err(e) => return (sent, headers, Some(e)),
            };

            let nonce = initial_nonce + sent as u64;
            match self.submitter.submit(&batch, nonce).await {
                Ok(_) => {
                    sent += 1;
                    headers += batch.count;
                    metrics::BATCHES_SUBMITTED.with_label_values(&["ok"]).inc();
                }
                Err(e) => {
                    metrics::BATCHES_SUBMITTED
                        .with_label_values(&["failed"])
                        .inc();
                    return (sent, headers, Some(e));
                }
            }
        }
    }
}
