//! Batch builder - groups encoded headers into bounded submissions
//!
//! Walks a sync range in ascending order and yields batches of at most
//! `batch_size` headers, lazily, so the caller can submit each batch before
//! the next is fetched. A fetch failure aborts the batch in progress and
//! surfaces the error; batches yielded earlier form the successfully
//! encoded prefix. A batch is never yielded with a silently skipped height.

use crate::chain::SourceChain;
use crate::codec::HeaderCodec;
use crate::error::RelayError;
use crate::types::{EncodedBatch, SyncRange};

pub struct BatchBuilder<'a> {
    source: &'a dyn SourceChain,
    codec: &'a dyn HeaderCodec,
    range: SyncRange,
    batch_size: u64,
    /// Next height to fetch. Past `range.high` once exhausted.
    next: u64,
}

impl<'a> BatchBuilder<'a> {
    pub fn new(
        source: &'a dyn SourceChain,
        codec: &'a dyn HeaderCodec,
        range: SyncRange,
        batch_size: u64,
    ) -> Self {
        Self {
            source,
            codec,
            range,
            batch_size: batch_size.max(1),
            next: range.low,
        }
    }

    /// Fetch and encode the next batch, or `None` when the range is
    /// exhausted. The final batch may hold fewer than `batch_size` headers.
    pub async fn next_batch(&mut self) -> Result<Option<EncodedBatch>, RelayError> {
        if self.range.is_empty() || self.next > self.range.high {
            return Ok(None);
        }

        let low = self.next;
        let mut headers = Vec::new();

        while self.next <= self.range.high && (headers.len() as u64) < self.batch_size {
            let header = self.source.header_by_height(self.next).await?;
            headers.push(header);
            self.next += 1;
        }

        let high = self.next - 1;
        Ok(Some(EncodedBatch {
            range: SyncRange::new(low, high),
            count: headers.len() as u64,
            payload: self.codec.encode_headers(&headers),
        }))
    }
}
