//! Error taxonomy for the relay engine
//!
//! Every error is classified as retryable (the loop backs off and tries
//! again) or fatal (the loop terminates and propagates). The stall variant
//! is terminal but reported separately so operators can tell "broken" from
//! "just stuck".

use std::time::Duration;

use alloy::primitives::{Address, U256};
use thiserror::Error;

use crate::types::SyncRange;

#[derive(Debug, Error)]
pub enum RelayError {
    /// RPC-level failure talking to either chain.
    #[error("rpc request failed: {0}")]
    Rpc(String),

    /// A source header could not be fetched. Aborts the batch in progress.
    #[error("header fetch failed at height {height}: {reason}")]
    HeaderFetch { height: u64, reason: String },

    /// Gas estimation for a batch payload failed.
    #[error("gas estimation failed: {0}")]
    GasEstimation(String),

    /// Broadcast of a signed transaction failed at the RPC layer.
    #[error("transaction broadcast failed: {0}")]
    Send(String),

    /// The relayer account cannot cover the worst-case gas cost.
    /// Retrying without funding changes nothing, so this is fatal.
    #[error("account {account} has insufficient funds: balance {balance} <= required {required}")]
    InsufficientFunds {
        account: Address,
        balance: U256,
        required: U256,
    },

    /// The signing request named an address other than the configured
    /// account. A configuration error, never retried.
    #[error("signing address mismatch: requested {requested}, configured {configured}")]
    SignerMismatch {
        requested: Address,
        configured: Address,
    },

    /// The signer itself failed to produce a signature.
    #[error("transaction signing failed: {0}")]
    Signing(String),

    /// Re-validation of a signed transaction did not recover the expected
    /// address. Indicates a signing-path bug; the transaction is never sent.
    #[error("signature verification failed: {0}")]
    SignatureInvalid(String),

    /// No successful submission within the stall window.
    #[error(
        "no successful submission within {window:?} (last range: {last_range:?}, last error: {last_error:?})"
    )]
    Stalled {
        window: Duration,
        last_range: Option<SyncRange>,
        last_error: Option<String>,
    },
}

impl RelayError {
    /// Fatal errors terminate the relay loop immediately and are never
    /// retried.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            RelayError::InsufficientFunds { .. }
                | RelayError::SignerMismatch { .. }
                | RelayError::Signing(_)
                | RelayError::SignatureInvalid(_)
        )
    }

    /// Retryable errors apply a fixed delay and keep the loop running.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RelayError::Rpc(_)
                | RelayError::HeaderFetch { .. }
                | RelayError::GasEstimation(_)
                | RelayError::Send(_)
        )
    }

    /// Label used for the error metrics counter.
    pub fn class(&self) -> &'static str {
        match self {
            RelayError::Rpc(_) => "rpc",
            RelayError::HeaderFetch { .. } => "header_fetch",
            RelayError::GasEstimation(_) => "gas_estimation",
            RelayError::Send(_) => "send",
            RelayError::InsufficientFunds { .. } => "insufficient_funds",
            RelayError::SignerMismatch { .. } => "signer_mismatch",
            RelayError::Signing(_) => "signing",
            RelayError::SignatureInvalid(_) => "signature_invalid",
            RelayError::Stalled { .. } => "stalled",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        let err = RelayError::InsufficientFunds {
            account: Address::ZERO,
            balance: U256::from(1u64),
            required: U256::from(2u64),
        };
        assert!(err.is_fatal());
        assert!(!err.is_retryable());

        let err = RelayError::SignerMismatch {
            requested: Address::ZERO,
            configured: Address::ZERO,
        };
        assert!(err.is_fatal());

        let err = RelayError::SignatureInvalid("bad sig".to_string());
        assert!(err.is_fatal());
    }

    #[test]
    fn test_retryable_classification() {
        assert!(RelayError::Rpc("timeout".to_string()).is_retryable());
        assert!(RelayError::GasEstimation("revert".to_string()).is_retryable());
        assert!(RelayError::Send("conn reset".to_string()).is_retryable());
        assert!(RelayError::HeaderFetch {
            height: 42,
            reason: "timeout".to_string()
        }
        .is_retryable());
    }

    #[test]
    fn test_stalled_is_neither_fatal_nor_retryable() {
        let err = RelayError::Stalled {
            window: Duration::from_secs(60),
            last_range: Some(SyncRange::new(100, 104)),
            last_error: Some("rpc request failed".to_string()),
        };
        assert!(!err.is_fatal());
        assert!(!err.is_retryable());
        assert_eq!(err.class(), "stalled");
    }
}
