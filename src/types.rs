//! Core data types for the header relay engine

use std::fmt;

use alloy::consensus::TxLegacy;
use alloy::primitives::{Address, Bytes, TxKind, U256};

/// An opaque source-chain block header, identified by height.
/// Immutable once fetched; the byte layout belongs to the source SDK.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceHeader {
    pub height: u64,
    pub data: Bytes,
}

/// Inclusive height range to relay. Empty when `low > high` (the bridge is
/// caught up); the invariant `low <= high + 1` always holds for ranges
/// produced by the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncRange {
    pub low: u64,
    pub high: u64,
}

impl SyncRange {
    pub fn new(low: u64, high: u64) -> Self {
        Self { low, high }
    }

    pub fn is_empty(&self) -> bool {
        self.low > self.high
    }

    /// Number of heights in the range.
    pub fn len(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            self.high - self.low + 1
        }
    }
}

impl fmt::Display for SyncRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.low, self.high)
    }
}

/// An ordered byte sequence of concatenated encoded headers covering
/// `range`, holding at most the configured batch size. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBatch {
    /// Heights covered by this batch, contiguous and ascending.
    pub range: SyncRange,
    /// Number of headers in the payload.
    pub count: u64,
    /// Encoded headers, concatenated in height order.
    pub payload: Bytes,
}

/// One batch priced and sequenced for submission. Owned exclusively by the
/// submitter for the duration of one send; the nonce belongs to the chain
/// once broadcast.
#[derive(Debug, Clone)]
pub struct PendingSubmission {
    pub nonce: u64,
    pub gas_price: u128,
    pub gas_limit: u64,
    pub batch: EncodedBatch,
}

impl PendingSubmission {
    /// Worst-case cost of this submission in wei.
    pub fn cost(&self) -> U256 {
        U256::from(self.gas_price) * U256::from(self.gas_limit)
    }

    /// Build the legacy transaction carrying `calldata` to the bridge.
    pub fn into_transaction(self, chain_id: u64, bridge: Address, calldata: Bytes) -> TxLegacy {
        TxLegacy {
            chain_id: Some(chain_id),
            nonce: self.nonce,
            gas_price: self.gas_price,
            gas_limit: self.gas_limit,
            to: TxKind::Call(bridge),
            value: U256::ZERO,
            input: calldata,
        }
    }
}
