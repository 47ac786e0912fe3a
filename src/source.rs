//! Source chain JSON-RPC client
//!
//! The source chain exposes relay headers through two JSON-RPC methods:
//! the latest block height and the encoded header blob for one height.
//! Header bytes arrive hex-encoded and are treated as opaque; their layout
//! belongs to the source SDK and the bridge contract.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use alloy::primitives::Bytes;
use async_trait::async_trait;
use eyre::{Result, WrapErr};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::chain::SourceChain;
use crate::error::RelayError;
use crate::types::SourceHeader;

const METHOD_LATEST_HEIGHT: &str = "relay_getLatestBlockHeight";
const METHOD_HEADER_BY_HEIGHT: &str = "relay_getBlockHeaderByHeight";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<Value>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

pub struct SourceRpcClient {
    http: reqwest::Client,
    rpc_url: String,
    request_id: AtomicU64,
}

impl SourceRpcClient {
    pub fn new(rpc_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .wrap_err("Failed to build HTTP client")?;

        info!(rpc_url = %rpc_url, "source chain client initialized");

        Ok(Self {
            http,
            rpc_url: rpc_url.to_string(),
            request_id: AtomicU64::new(1),
        })
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value, RelayError> {
        let body = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": self.request_id.fetch_add(1, Ordering::Relaxed),
        });

        let response: RpcResponse = self
            .http
            .post(&self.rpc_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| RelayError::Rpc(format!("{method}: {e}")))?
            .json()
            .await
            .map_err(|e| RelayError::Rpc(format!("{method}: invalid response: {e}")))?;

        if let Some(err) = response.error {
            return Err(RelayError::Rpc(format!(
                "{method}: rpc error {}: {}",
                err.code, err.message
            )));
        }
        response
            .result
            .ok_or_else(|| RelayError::Rpc(format!("{method}: empty result")))
    }
}

#[async_trait]
impl SourceChain for SourceRpcClient {
    async fn header_by_height(&self, height: u64) -> Result<SourceHeader, RelayError> {
        let result = self
            .call(METHOD_HEADER_BY_HEIGHT, json!([height]))
            .await
            .map_err(|e| RelayError::HeaderFetch {
                height,
                reason: e.to_string(),
            })?;

        let data = result
            .as_str()
            .and_then(decode_hex_payload)
            .ok_or_else(|| RelayError::HeaderFetch {
                height,
                reason: format!("malformed header payload: {result}"),
            })?;

        Ok(SourceHeader { height, data })
    }

    async fn latest_height(&self) -> Result<u64, RelayError> {
        let result = self.call(METHOD_LATEST_HEIGHT, json!([])).await?;
        parse_quantity(&result)
            .ok_or_else(|| RelayError::Rpc(format!("malformed height value: {result}")))
    }
}

/// Parse a height from either a JSON number or a 0x-prefixed hex string.
fn parse_quantity(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => {
            let trimmed = s.strip_prefix("0x").unwrap_or(s);
            u64::from_str_radix(trimmed, 16).ok()
        }
        _ => None,
    }
}

/// Decode a 0x-prefixed hex blob into raw header bytes.
fn decode_hex_payload(payload: &str) -> Option<Bytes> {
    let trimmed = payload.strip_prefix("0x").unwrap_or(payload);
    hex::decode(trimmed).ok().map(Bytes::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quantity_number() {
        assert_eq!(parse_quantity(&json!(1000)), Some(1000));
    }

    #[test]
    fn test_parse_quantity_hex_string() {
        assert_eq!(parse_quantity(&json!("0x3e8")), Some(1000));
        assert_eq!(parse_quantity(&json!("3e8")), Some(1000));
    }

    #[test]
    fn test_parse_quantity_rejects_garbage() {
        assert_eq!(parse_quantity(&json!("0xzz")), None);
        assert_eq!(parse_quantity(&json!(null)), None);
        assert_eq!(parse_quantity(&json!(-1)), None);
    }

    #[test]
    fn test_decode_hex_payload() {
        assert_eq!(
            decode_hex_payload("0xdeadbeef"),
            Some(Bytes::from(vec![0xde, 0xad, 0xbe, 0xef]))
        );
        assert_eq!(decode_hex_payload("not hex"), None);
    }
}
