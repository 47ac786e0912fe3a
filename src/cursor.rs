//! Sync cursor - derives the next range of headers to relay
//!
//! The engine owns no persisted sync state. Every cycle the cursor reads
//! the bridge contract's synchronized height and the source chain's latest
//! height, and derives the range from those alone, which keeps the relayer
//! safely restartable.

use tracing::debug;

use crate::chain::{DestChain, SourceChain};
use crate::error::RelayError;
use crate::metrics;
use crate::types::SyncRange;

/// Outcome of one cursor poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncDecision {
    /// Headers are available; relay this range.
    Range(SyncRange),
    /// Nothing new to relay yet. Apply the idle delay.
    Idle,
    /// The bridge's recorded height exceeds what the source can currently
    /// confirm while the source is actively advancing. Apply the longer
    /// fork-recovery delay and re-derive from fresh state next cycle.
    Fork { synced: u64, confirmed: u64 },
}

pub struct SyncCursor {
    /// Number of most-recent source blocks withheld from relay so that
    /// headers still subject to reorganization are never submitted.
    confirmation_depth: u64,
    /// Source height seen at the previous poll, used only to tell a
    /// stalled source apart from a destination rollback.
    last_source_height: Option<u64>,
}

impl SyncCursor {
    pub fn new(confirmation_depth: u64) -> Self {
        Self {
            confirmation_depth,
            last_source_height: None,
        }
    }

    /// Compute the next sync decision from live chain state.
    ///
    /// Fetch errors from either chain propagate as retryable errors, never
    /// as an empty range.
    pub async fn next_decision(
        &mut self,
        source: &dyn SourceChain,
        dest: &dyn DestChain,
    ) -> Result<SyncDecision, RelayError> {
        let synced = dest.bridge_height().await?;
        let latest = source.latest_height().await?;

        let advancing = self.last_source_height.is_some_and(|prev| latest > prev);
        self.last_source_height = Some(latest);

        let confirmed = latest.saturating_sub(self.confirmation_depth);
        metrics::BRIDGE_SYNCED_HEIGHT.set(synced as f64);
        metrics::SOURCE_CONFIRMED_HEIGHT.set(confirmed as f64);

        let low = synced + 1;
        debug!(
            synced,
            latest, confirmed, advancing, "computed sync heights"
        );

        if low <= confirmed {
            return Ok(SyncDecision::Range(SyncRange::new(low, confirmed)));
        }

        // The bridge is at or past the confirmable tip. A recorded height
        // strictly beyond it while the source keeps producing blocks means
        // the two chains disagree about history.
        if advancing && synced > confirmed {
            return Ok(SyncDecision::Fork { synced, confirmed });
        }

        Ok(SyncDecision::Idle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::consensus::TxEnvelope;
    use alloy::primitives::{Address, Bytes, B256, U256};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU64, Ordering};

    use crate::types::SourceHeader;

    struct FixedSource {
        latest: AtomicU64,
        fail: bool,
    }

    impl FixedSource {
        fn at(latest: u64) -> Self {
            Self {
                latest: AtomicU64::new(latest),
                fail: false,
            }
        }
    }

    #[async_trait]
    impl SourceChain for FixedSource {
        async fn header_by_height(&self, height: u64) -> Result<SourceHeader, RelayError> {
            Ok(SourceHeader {
                height,
                data: Bytes::new(),
            })
        }

        async fn latest_height(&self) -> Result<u64, RelayError> {
            if self.fail {
                return Err(RelayError::Rpc("source unreachable".to_string()));
            }
            Ok(self.latest.load(Ordering::SeqCst))
        }
    }

    struct FixedDest {
        synced: u64,
        fail: bool,
    }

    #[async_trait]
    impl DestChain for FixedDest {
        async fn bridge_height(&self) -> Result<u64, RelayError> {
            if self.fail {
                return Err(RelayError::Rpc("dest unreachable".to_string()));
            }
            Ok(self.synced)
        }

        async fn gas_price(&self) -> Result<u128, RelayError> {
            Ok(1)
        }

        async fn estimate_gas(
            &self,
            _from: Address,
            _gas_price: u128,
            _calldata: Bytes,
        ) -> Result<u64, RelayError> {
            Ok(21_000)
        }

        async fn balance(&self, _account: Address) -> Result<U256, RelayError> {
            Ok(U256::MAX)
        }

        async fn nonce(&self, _account: Address) -> Result<u64, RelayError> {
            Ok(0)
        }

        async fn send_transaction(&self, _tx: TxEnvelope) -> Result<B256, RelayError> {
            Ok(B256::ZERO)
        }
    }

    #[tokio::test]
    async fn test_range_derived_from_chain_state() {
        let source = FixedSource::at(106);
        let dest = FixedDest {
            synced: 99,
            fail: false,
        };
        let mut cursor = SyncCursor::new(2);

        let decision = cursor.next_decision(&source, &dest).await.unwrap();
        assert_eq!(decision, SyncDecision::Range(SyncRange::new(100, 104)));
    }

    #[tokio::test]
    async fn test_caught_up_is_idle_not_fork() {
        // destinationSyncedHeight=999, sourceConfirmedHeight=999, depth=0
        let source = FixedSource::at(999);
        let dest = FixedDest {
            synced: 999,
            fail: false,
        };
        let mut cursor = SyncCursor::new(0);

        assert_eq!(
            cursor.next_decision(&source, &dest).await.unwrap(),
            SyncDecision::Idle
        );
        // Still idle on a later poll with the source advancing but the
        // bridge keeping pace with the confirmable tip.
        source.latest.store(1000, Ordering::SeqCst);
        let dest = FixedDest {
            synced: 1000,
            fail: false,
        };
        assert_eq!(
            cursor.next_decision(&source, &dest).await.unwrap(),
            SyncDecision::Idle
        );
    }

    #[tokio::test]
    async fn test_fork_requires_advancing_source() {
        // Bridge claims 1005 but the source can only confirm 1000.
        let source = FixedSource::at(1000);
        let dest = FixedDest {
            synced: 1005,
            fail: false,
        };
        let mut cursor = SyncCursor::new(0);

        // First poll has no baseline, so this reads as idle.
        assert_eq!(
            cursor.next_decision(&source, &dest).await.unwrap(),
            SyncDecision::Idle
        );

        // Source advances and the inconsistency persists: fork.
        source.latest.store(1002, Ordering::SeqCst);
        assert_eq!(
            cursor.next_decision(&source, &dest).await.unwrap(),
            SyncDecision::Fork {
                synced: 1005,
                confirmed: 1002
            }
        );
    }

    #[tokio::test]
    async fn test_stalled_source_is_idle() {
        let source = FixedSource::at(1000);
        let dest = FixedDest {
            synced: 1005,
            fail: false,
        };
        let mut cursor = SyncCursor::new(0);

        cursor.next_decision(&source, &dest).await.unwrap();
        // Same source height again: could just be a quiet chain.
        assert_eq!(
            cursor.next_decision(&source, &dest).await.unwrap(),
            SyncDecision::Idle
        );
    }

    #[tokio::test]
    async fn test_fetch_errors_propagate() {
        let source = FixedSource {
            latest: AtomicU64::new(100),
            fail: true,
        };
        let dest = FixedDest {
            synced: 50,
            fail: false,
        };
        let mut cursor = SyncCursor::new(0);
        let err = cursor.next_decision(&source, &dest).await.unwrap_err();
        assert!(err.is_retryable());

        let source = FixedSource::at(100);
        let dest = FixedDest {
            synced: 50,
            fail: true,
        };
        let err = cursor.next_decision(&source, &dest).await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_confirmation_depth_saturates() {
        let source = FixedSource::at(1);
        let dest = FixedDest {
            synced: 0,
            fail: false,
        };
        let mut cursor = SyncCursor::new(10);
        // confirmed saturates to 0, low = 1 > 0: nothing to relay.
        assert_eq!(
            cursor.next_decision(&source, &dest).await.unwrap(),
            SyncDecision::Idle
        );
    }
}
