//! Transaction submitter - prices, signs, and broadcasts one batch
//!
//! Each submission walks a fixed sequence of failure points: gas price
//! query, gas estimation against the concrete payload, balance check,
//! transaction construction, signing through the injected capability,
//! optional signature re-verification, broadcast. The caller owns nonce
//! bookkeeping across batches; the submitter advances no state of its own.

use std::sync::Arc;

use alloy::consensus::TxEnvelope;
use alloy::primitives::{Address, Bytes, B256};
use alloy::sol_types::SolCall;
use tracing::{debug, info};

use crate::chain::{DestChain, RelaySigner};
use crate::contracts::LightClientBridge;
use crate::error::RelayError;
use crate::types::{EncodedBatch, PendingSubmission};

pub struct TransactionSubmitter {
    dest: Arc<dyn DestChain>,
    signer: Arc<dyn RelaySigner>,
    bridge: Address,
    chain_id: u64,
    /// When set, cryptographically re-validate every signature before
    /// broadcasting. Validation failure indicates a signing-path bug and
    /// is fatal; the transaction is never sent.
    verify_signature: bool,
}

impl TransactionSubmitter {
    pub fn new(
        dest: Arc<dyn DestChain>,
        signer: Arc<dyn RelaySigner>,
        bridge: Address,
        chain_id: u64,
        verify_signature: bool,
    ) -> Self {
        Self {
            dest,
            signer,
            bridge,
            chain_id,
            verify_signature,
        }
    }

    /// Address of the relayer account used for submissions.
    pub fn signer_address(&self) -> Address {
        self.signer.address()
    }

    /// Submit one batch under the given nonce, returning the tx hash.
    pub async fn submit(&self, batch: &EncodedBatch, nonce: u64) -> Result<B256, RelayError> {
        let from = self.signer.address();

        let gas_price = self.dest.gas_price().await?;

        let calldata: Bytes = LightClientBridge::syncHeadersCall {
            headers: batch.payload.clone(),
        }
        .abi_encode()
        .into();

        let gas_limit = self
            .dest
            .estimate_gas(from, gas_price, calldata.clone())
            .await
            .map_err(|e| RelayError::GasEstimation(e.to_string()))?;

        let submission = PendingSubmission {
            nonce,
            gas_price,
            gas_limit,
            batch: batch.clone(),
        };

        // Fail fast before signing: retrying an underfunded account
        // changes nothing.
        let balance = self.dest.balance(from).await?;
        if balance <= submission.cost() {
            return Err(RelayError::InsufficientFunds {
                account: from,
                balance,
                required: submission.cost(),
            });
        }

        debug!(
            range = %submission.batch.range,
            headers = submission.batch.count,
            nonce = submission.nonce,
            gas_price = submission.gas_price,
            gas_limit = submission.gas_limit,
            "submitting header batch"
        );

        let tx = submission.into_transaction(self.chain_id, self.bridge, calldata);
        let signed = self.signer.sign(from, tx).await?;

        if self.verify_signature {
            let recovered = signed
                .recover_signer()
                .map_err(|e| RelayError::SignatureInvalid(e.to_string()))?;
            if recovered != from {
                return Err(RelayError::SignatureInvalid(format!(
                    "recovered {recovered}, expected {from}"
                )));
            }
        }

        let hash = self
            .dest
            .send_transaction(TxEnvelope::Legacy(signed))
            .await
            .map_err(|e| RelayError::Send(e.to_string()))?;

        info!(tx_hash = %hash, range = %batch.range, nonce, "header batch broadcast");
        Ok(hash)
    }
}
