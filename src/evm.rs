//! Destination chain access and transaction signing over alloy
//!
//! [`EvmBridgeClient`] implements [`DestChain`] against a JSON-RPC endpoint
//! and the bridge contract. [`LocalRelaySigner`] implements [`RelaySigner`]
//! from an encrypted keystore file or a raw private key, bound to exactly
//! one account.

use alloy::consensus::{SignableTransaction, Signed, TxEnvelope, TxLegacy};
use alloy::eips::eip2718::Encodable2718;
use alloy::network::TxSignerSync;
use alloy::primitives::{Address, Bytes, TxKind, B256, U256};
use alloy::providers::{Provider, RootProvider};
use alloy::rpc::types::{TransactionInput, TransactionRequest};
use alloy::signers::local::PrivateKeySigner;
use alloy::sol_types::SolCall;
use alloy::transports::http::{Client, Http};
use async_trait::async_trait;
use eyre::{eyre, Result, WrapErr};
use tracing::info;

use crate::chain::{DestChain, RelaySigner};
use crate::config::AccountConfig;
use crate::contracts::LightClientBridge;
use crate::error::RelayError;

fn rpc_err(e: impl std::fmt::Display) -> RelayError {
    RelayError::Rpc(e.to_string())
}

/// Destination-chain RPC facade bound to one bridge contract.
pub struct EvmBridgeClient {
    provider: RootProvider<Http<Client>>,
    bridge: Address,
}

impl EvmBridgeClient {
    pub fn new(rpc_url: &str, bridge: Address) -> Result<Self> {
        let url = rpc_url.parse().wrap_err("Invalid destination RPC URL")?;
        let provider = RootProvider::new_http(url);

        info!(rpc_url = %rpc_url, bridge = %bridge, "destination chain client initialized");

        Ok(Self { provider, bridge })
    }
}

#[async_trait]
impl DestChain for EvmBridgeClient {
    async fn bridge_height(&self) -> Result<u64, RelayError> {
        let calldata: Bytes = LightClientBridge::syncedHeightCall {}.abi_encode().into();
        let tx = TransactionRequest {
            to: Some(TxKind::Call(self.bridge)),
            input: TransactionInput::new(calldata),
            ..Default::default()
        };
        let ret = self.provider.call(&tx).await.map_err(rpc_err)?;
        let height = LightClientBridge::syncedHeightCall::abi_decode_returns(&ret, true)
            .map_err(rpc_err)?
            ._0;
        u64::try_from(height)
            .map_err(|_| RelayError::Rpc(format!("bridge height {height} out of u64 range")))
    }

    async fn gas_price(&self) -> Result<u128, RelayError> {
        self.provider.get_gas_price().await.map_err(rpc_err)
    }

    async fn estimate_gas(
        &self,
        from: Address,
        gas_price: u128,
        calldata: Bytes,
    ) -> Result<u64, RelayError> {
        let tx = TransactionRequest {
            from: Some(from),
            to: Some(TxKind::Call(self.bridge)),
            gas_price: Some(gas_price),
            value: Some(U256::ZERO),
            input: TransactionInput::new(calldata),
            ..Default::default()
        };
        self.provider.estimate_gas(&tx).await.map_err(rpc_err)
    }

    async fn balance(&self, account: Address) -> Result<U256, RelayError> {
        self.provider.get_balance(account).await.map_err(rpc_err)
    }

    async fn nonce(&self, account: Address) -> Result<u64, RelayError> {
        self.provider
            .get_transaction_count(account)
            .await
            .map_err(rpc_err)
    }

    async fn send_transaction(&self, tx: TxEnvelope) -> Result<B256, RelayError> {
        let encoded = tx.encoded_2718();
        let pending = self
            .provider
            .send_raw_transaction(&encoded)
            .await
            .map_err(rpc_err)?;
        Ok(*pending.tx_hash())
    }
}

/// Signing capability backed by a locally held key.
pub struct LocalRelaySigner {
    inner: PrivateKeySigner,
}

impl LocalRelaySigner {
    pub fn new(inner: PrivateKeySigner) -> Self {
        Self { inner }
    }

    /// Load the account from the configured keystore or raw private key.
    pub fn from_config(account: &AccountConfig) -> Result<Self> {
        let inner = if let Some(key) = &account.private_key {
            key.parse().wrap_err("Invalid relayer private key")?
        } else {
            let path = account
                .keystore_path
                .as_ref()
                .ok_or_else(|| eyre!("either RELAYER_PRIVATE_KEY or KEYSTORE_PATH is required"))?;
            let passphrase = account.keystore_passphrase.as_deref().unwrap_or("");
            PrivateKeySigner::decrypt_keystore(path, passphrase)
                .wrap_err_with(|| format!("Failed to decrypt keystore at {path}"))?
        };

        info!(address = %inner.address(), "relayer account loaded");
        Ok(Self { inner })
    }
}

#[async_trait]
impl RelaySigner for LocalRelaySigner {
    fn address(&self) -> Address {
        self.inner.address()
    }

    async fn sign(&self, from: Address, mut tx: TxLegacy) -> Result<Signed<TxLegacy>, RelayError> {
        if from != self.inner.address() {
            return Err(RelayError::SignerMismatch {
                requested: from,
                configured: self.inner.address(),
            });
        }
        let signature = self
            .inner
            .sign_transaction_sync(&mut tx)
            .map_err(|e| RelayError::Signing(e.to_string()))?;
        Ok(tx.into_signed(signature))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn legacy_tx() -> TxLegacy {
        TxLegacy {
            chain_id: Some(31337),
            nonce: 0,
            gas_price: 1_000_000_000,
            gas_limit: 21_000,
            to: TxKind::Call(Address::repeat_byte(0xbb)),
            value: U256::ZERO,
            input: Bytes::new(),
        }
    }

    #[tokio::test]
    async fn test_sign_rejects_foreign_address() {
        let signer = LocalRelaySigner::new(PrivateKeySigner::random());
        let other = Address::repeat_byte(0x11);

        let err = signer.sign(other, legacy_tx()).await.unwrap_err();
        assert!(matches!(err, RelayError::SignerMismatch { .. }));
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn test_signature_recovers_to_configured_account() {
        let signer = LocalRelaySigner::new(PrivateKeySigner::random());
        let address = signer.address();

        let signed = signer.sign(address, legacy_tx()).await.unwrap();
        assert_eq!(signed.recover_signer().unwrap(), address);
    }
}
