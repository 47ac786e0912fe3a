//! Cross-chain block header relayer for a light-client bridge
//!
//! Tracks how far the destination bridge contract has synchronized, pulls
//! the next range of source-chain headers, batches and encodes them, and
//! submits signed transactions with gap-free nonce sequencing, recovering
//! from RPC failures, chain forks, and stalled progress.
//!
//! - **Cursor** - derives the sync range from live chain state each cycle
//! - **Batch** - groups encoded headers into bounded submissions
//! - **Submitter** - prices, signs, verifies, and broadcasts one batch
//! - **Relay** - the orchestrating loop with delay and stall policy
//! - **Chain / Codec** - capability traits for chain access, signing, and
//!   header encoding; concrete implementations in `evm` and `source`
//!
//! The engine persists nothing: synchronization progress is re-derived
//! every cycle from the bridge contract, so the relayer is safely
//! restartable. One relay direction runs as one independent task.

pub mod api;
pub mod batch;
pub mod chain;
pub mod codec;
pub mod config;
pub mod contracts;
pub mod cursor;
pub mod error;
pub mod evm;
pub mod metrics;
pub mod relay;
pub mod source;
pub mod submitter;
pub mod types;

pub use batch::BatchBuilder;
pub use chain::{DestChain, RelaySigner, SourceChain};
pub use codec::{ConcatHeaderCodec, HeaderCodec};
pub use config::Config;
pub use cursor::{SyncCursor, SyncDecision};
pub use error::RelayError;
pub use evm::{EvmBridgeClient, LocalRelaySigner};
pub use relay::{DelayPolicy, RelayLoop};
pub use source::SourceRpcClient;
pub use submitter::TransactionSubmitter;
pub use types::{EncodedBatch, PendingSubmission, SourceHeader, SyncRange};
