//! Header batch encoding
//!
//! The bridge contract accepts one byte blob per transaction holding the
//! encoded headers back to back. The per-header byte layout belongs to the
//! source SDK; headers arrive here already encoded and this module only
//! concatenates them. Encoding must be deterministic and order-preserving
//! so re-building a range yields byte-identical batches.

use alloy::primitives::Bytes;

use crate::types::SourceHeader;

/// Serializes a sequence of source headers into the byte layout the bridge
/// contract expects.
pub trait HeaderCodec: Send + Sync {
    /// Encode `headers` in the given order. Deterministic.
    fn encode_headers(&self, headers: &[SourceHeader]) -> Bytes;
}

/// Concatenates pre-encoded header bytes in height order.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConcatHeaderCodec;

impl HeaderCodec for ConcatHeaderCodec {
    fn encode_headers(&self, headers: &[SourceHeader]) -> Bytes {
        let total: usize = headers.iter().map(|h| h.data.len()).sum();
        let mut out = Vec::with_capacity(total);
        for header in headers {
            out.extend_from_slice(&header.data);
        }
        out.into()
    }
}
