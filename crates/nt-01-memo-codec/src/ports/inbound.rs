//! Inbound Port - MemoCodecApi
//!
//! Driving port used by the orchestrator (decode side) and by message
//! senders (encode side).

use chrono::{DateTime, Utc};
use shared_types::{Memo, TokenAmount, Transaction};

use crate::domain::{ChunkIdentifier, CodecError, DecodeReport, OutboundChunk};

/// Primary API for the Memo Codec.
///
/// All operations are synchronous and pure apart from identifier
/// generation, which reads the supplied clock value and a random source.
pub trait MemoCodecApi: Send + Sync {
    /// Fresh identifier for a message issued at `now`.
    fn new_identifier(&self, now: DateTime<Utc>) -> ChunkIdentifier;

    /// Split `payload` into chunk memos under `identifier`.
    ///
    /// # Errors
    /// - `OverheadExceedsChunkSize`: configuration leaves no room for data
    /// - `ChunkBudgetTooSmall`: header plus one character exceeds the budget
    fn encode_chunks(
        &self,
        payload: &str,
        memo_type: &str,
        identifier: &ChunkIdentifier,
    ) -> Result<Vec<Memo>, CodecError>;

    /// Group, order and completeness-check the chunks in `transactions`.
    fn decode_chunks(&self, transactions: &[Transaction]) -> DecodeReport;

    /// Per-chunk amounts under the configured policy.
    ///
    /// # Errors
    /// - `InvalidChunkCount`: zero chunks
    /// - `AmountBelowMinimum`: share under the minimum transfer unit
    fn distribute_amount(
        &self,
        total: TokenAmount,
        chunk_count: usize,
    ) -> Result<Vec<TokenAmount>, CodecError>;

    /// Encode a payload and attach amounts, ready to hand to a ledger sender.
    fn plan_outbound(
        &self,
        payload: &str,
        memo_type: &str,
        total: TokenAmount,
        now: DateTime<Utc>,
    ) -> Result<Vec<OutboundChunk>, CodecError>;
}
