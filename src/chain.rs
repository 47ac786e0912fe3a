//! Capability traits consumed by the relay engine
//!
//! The engine never talks to chain SDKs directly. It reads the source chain
//! and drives the destination chain through these narrow interfaces, and
//! signing happens through an injected [`RelaySigner`] capability rather
//! than ambient signer state. Concrete implementations live in
//! [`crate::source`] and [`crate::evm`]; tests substitute in-memory mocks.

use alloy::consensus::{Signed, TxEnvelope, TxLegacy};
use alloy::primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;

use crate::error::RelayError;
use crate::types::SourceHeader;

/// Read access to the chain whose headers are being relayed.
#[async_trait]
pub trait SourceChain: Send + Sync {
    /// Fetch the header at `height`. Failure is retryable.
    async fn header_by_height(&self, height: u64) -> Result<SourceHeader, RelayError>;

    /// Latest height the source chain reports. The cursor subtracts the
    /// confirmation depth from this before relaying.
    async fn latest_height(&self) -> Result<u64, RelayError>;
}

/// Read/write access to the destination chain carrying the bridge contract.
#[async_trait]
pub trait DestChain: Send + Sync {
    /// Current synchronized height reported by the bridge contract.
    async fn bridge_height(&self) -> Result<u64, RelayError>;

    /// Current gas price on the destination chain, in wei.
    async fn gas_price(&self) -> Result<u128, RelayError>;

    /// Simulate the bridge call with `calldata` and return a gas limit.
    async fn estimate_gas(
        &self,
        from: Address,
        gas_price: u128,
        calldata: Bytes,
    ) -> Result<u64, RelayError>;

    /// Native token balance of `account`, in wei.
    async fn balance(&self, account: Address) -> Result<U256, RelayError>;

    /// Next transaction nonce for `account`.
    async fn nonce(&self, account: Address) -> Result<u64, RelayError>;

    /// Broadcast a signed transaction, returning its hash.
    async fn send_transaction(&self, tx: TxEnvelope) -> Result<B256, RelayError>;
}

/// Transaction signing capability bound to a single configured account.
///
/// Implementations must reject a `from` address that does not match the
/// configured account with [`RelayError::SignerMismatch`].
#[async_trait]
pub trait RelaySigner: Send + Sync {
    /// Address of the configured account.
    fn address(&self) -> Address;

    /// Sign `tx` on behalf of `from`.
    async fn sign(&self, from: Address, tx: TxLegacy) -> Result<Signed<TxLegacy>, RelayError>;
}
