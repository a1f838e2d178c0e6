//! # Chunking
//!
//! Splitting outbound payloads into memo-sized chunks and regrouping observed
//! chunks into logical messages.
//!
//! ## Grouping
//!
//! Chunks belong to the same message when identifier, sender and receiver all
//! match. Groups are reported whether complete or not; the caller re-decodes
//! the accumulated transaction set on every pass.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use shared_types::{Address, Memo, TokenAmount, Transaction, TxHash};

use super::chunk_id::{parse_chunk, ChunkHeader, ChunkIdentifier, ChunkParse};
use super::errors::{ChunkParseError, CodecError};

/// Memo format hint written on every chunk.
pub const CHUNKED_MEMO_FORMAT: &str = "text/chunked";

/// Split `payload` into framed chunk memos.
///
/// Each memo's data (header included) is at most
/// `max_chunk_size - structural_overhead` bytes. Pieces never split a UTF-8
/// character. An empty payload yields a single empty chunk.
///
/// # Errors
///
/// - `OverheadExceedsChunkSize` if `structural_overhead >= max_chunk_size`
/// - `ChunkBudgetTooSmall` if a header plus one character does not fit
pub fn encode_chunks(
    payload: &str,
    memo_type: &str,
    identifier: &ChunkIdentifier,
    max_chunk_size: usize,
    structural_overhead: usize,
) -> Result<Vec<Memo>, CodecError> {
    let budget = max_chunk_size
        .checked_sub(structural_overhead)
        .filter(|b| *b > 0)
        .ok_or(CodecError::OverheadExceedsChunkSize {
            max_chunk_size,
            overhead: structural_overhead,
        })?;

    let identifier_len = identifier.to_string().len();
    let mut total_digits = 1;

    // The header grows with the chunk count, so re-split until the digit
    // width assumed for the header matches the count it produced.
    loop {
        let header_len = ChunkHeader::framing_len(identifier_len, total_digits);
        let piece_budget = budget
            .checked_sub(header_len)
            .filter(|b| *b > 0)
            .ok_or(CodecError::ChunkBudgetTooSmall { budget, header_len })?;

        let pieces = split_on_char_boundaries(payload, piece_budget)
            .ok_or(CodecError::ChunkBudgetTooSmall { budget, header_len })?;

        let needed = decimal_digits(pieces.len());
        if needed > total_digits {
            total_digits = needed;
            continue;
        }

        let total =
            u32::try_from(pieces.len()).map_err(|_| CodecError::TooManyChunks(pieces.len()))?;
        return Ok(pieces
            .iter()
            .zip(1u32..)
            .map(|(piece, index)| {
                let header = ChunkHeader {
                    identifier: identifier.clone(),
                    index,
                    total,
                };
                Memo::new(memo_type, CHUNKED_MEMO_FORMAT, header.frame(piece))
            })
            .collect());
    }
}

fn decimal_digits(n: usize) -> usize {
    n.to_string().len()
}

/// Split into pieces of at most `limit` bytes on character boundaries.
///
/// Returns `None` if a single character is wider than `limit`.
fn split_on_char_boundaries(payload: &str, limit: usize) -> Option<Vec<&str>> {
    if payload.is_empty() {
        return Some(vec![""]);
    }
    let mut pieces = Vec::new();
    let mut rest = payload;
    while !rest.is_empty() {
        let mut end = limit.min(rest.len());
        while !rest.is_char_boundary(end) {
            end -= 1;
        }
        if end == 0 {
            return None;
        }
        let (piece, tail) = rest.split_at(end);
        pieces.push(piece);
        rest = tail;
    }
    Some(pieces)
}

/// A chunk memo paired with the amount its transaction carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundChunk {
    /// Memo to attach.
    pub memo: Memo,
    /// Amount to send with it (zero for memo-only transactions).
    pub amount: TokenAmount,
}

/// One received chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkPiece {
    /// Transaction that carried the chunk (first observed, for retries).
    pub tx_hash: TxHash,
    /// Piece text after the header.
    pub data: String,
}

/// Completeness of a message bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleStatus {
    /// Every index from 1 to total has been observed.
    Complete,
    /// Waiting on the listed indices.
    Incomplete {
        /// 1-based indices not yet observed.
        missing: Vec<u32>,
    },
    /// Chunks contradict each other; the group can never assemble.
    Corrupt(String),
}

/// Chunks sharing one identifier between one sender and receiver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBundle {
    /// Shared identifier.
    pub identifier: ChunkIdentifier,
    /// Sending address.
    pub sender: Address,
    /// Receiving address.
    pub receiver: Address,
    /// Memo type of the first observed chunk.
    pub memo_type: String,
    /// Declared chunk count.
    pub total: u32,
    /// Observed pieces by 1-based index.
    pub pieces: BTreeMap<u32, ChunkPiece>,
    /// Every transaction that contributed a chunk, retries included.
    pub contributors: BTreeSet<TxHash>,
    /// Set when chunks contradict each other.
    pub corruption: Option<String>,
}

impl MessageBundle {
    fn new(header: &ChunkHeader, sender: &str, receiver: &str, memo_type: &str) -> Self {
        Self {
            identifier: header.identifier.clone(),
            sender: sender.to_string(),
            receiver: receiver.to_string(),
            memo_type: memo_type.to_string(),
            total: header.total,
            pieces: BTreeMap::new(),
            contributors: BTreeSet::new(),
            corruption: None,
        }
    }

    fn absorb(&mut self, header: &ChunkHeader, tx_hash: &str, piece: &str) {
        self.contributors.insert(tx_hash.to_string());
        if self.corruption.is_some() {
            return;
        }
        if header.total != self.total {
            self.corruption = Some(format!(
                "chunk {} declares {} chunks, group declares {}",
                header.index, header.total, self.total
            ));
            return;
        }
        match self.pieces.get(&header.index) {
            Some(existing) if existing.data != piece => {
                self.corruption = Some(format!(
                    "conflicting content for chunk {} in {} and {}",
                    header.index, existing.tx_hash, tx_hash
                ));
            }
            Some(_) => {} // identical retry
            None => {
                self.pieces.insert(
                    header.index,
                    ChunkPiece {
                        tx_hash: tx_hash.to_string(),
                        data: piece.to_string(),
                    },
                );
            }
        }
    }

    /// Completeness of the group.
    pub fn status(&self) -> BundleStatus {
        if let Some(reason) = &self.corruption {
            return BundleStatus::Corrupt(reason.clone());
        }
        let missing = self.missing_indices();
        if missing.is_empty() {
            BundleStatus::Complete
        } else {
            BundleStatus::Incomplete { missing }
        }
    }

    /// Whether every chunk has arrived and none conflict.
    pub fn is_complete(&self) -> bool {
        matches!(self.status(), BundleStatus::Complete)
    }

    /// Indices not yet observed, ascending.
    pub fn missing_indices(&self) -> Vec<u32> {
        (1..=self.total)
            .filter(|i| !self.pieces.contains_key(i))
            .collect()
    }

    /// Reassembled payload in position order, if complete.
    pub fn assemble(&self) -> Option<String> {
        if !self.is_complete() {
            return None;
        }
        Some(self.pieces.values().map(|p| p.data.as_str()).collect())
    }
}

/// A memo that carried an identifier but could not be read as a chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedChunk {
    /// Carrying transaction.
    pub tx_hash: TxHash,
    /// What was wrong with it.
    pub error: ChunkParseError,
}

/// Everything [`decode_chunks`] found in a transaction set.
#[derive(Debug, Clone, Default)]
pub struct DecodeReport {
    /// Chunk groups ordered by identifier, then sender and receiver.
    pub bundles: Vec<MessageBundle>,
    /// Transactions whose memos carry no chunk identifier.
    pub standalone: Vec<TxHash>,
    /// Transactions with an identifier but an unusable header.
    pub malformed: Vec<MalformedChunk>,
}

type GroupKey = (ChunkIdentifier, Address, Address);

/// Group the chunk memos in `transactions` into message bundles.
///
/// Transactions are considered in ledger order so that the first observed copy
/// of a retried chunk is the one kept. Only identifiers with
/// `expected_version` are grouped; others are reported as malformed.
pub fn decode_chunks(transactions: &[Transaction], expected_version: u16) -> DecodeReport {
    let mut ordered: Vec<&Transaction> = transactions.iter().collect();
    ordered.sort_by(|a, b| a.ordering_key().cmp(&b.ordering_key()));

    let mut groups: BTreeMap<GroupKey, MessageBundle> = BTreeMap::new();
    let mut report = DecodeReport::default();

    for tx in ordered {
        let mut carried_chunk = false;
        for memo in &tx.memos {
            match parse_chunk(&memo.memo_data) {
                ChunkParse::NotAChunk => {}
                ChunkParse::Malformed(error) => {
                    carried_chunk = true;
                    report.malformed.push(MalformedChunk {
                        tx_hash: tx.hash.clone(),
                        error,
                    });
                }
                ChunkParse::Chunk { header, .. } if header.identifier.version != expected_version => {
                    carried_chunk = true;
                    report.malformed.push(MalformedChunk {
                        tx_hash: tx.hash.clone(),
                        error: ChunkParseError::UnsupportedVersion {
                            found: header.identifier.version,
                            expected: expected_version,
                        },
                    });
                }
                ChunkParse::Chunk { header, piece } => {
                    carried_chunk = true;
                    let key = (
                        header.identifier.clone(),
                        tx.account.clone(),
                        tx.destination.clone(),
                    );
                    groups
                        .entry(key)
                        .or_insert_with(|| {
                            MessageBundle::new(&header, &tx.account, &tx.destination, &memo.memo_type)
                        })
                        .absorb(&header, &tx.hash, piece);
                }
            }
        }
        if !carried_chunk {
            report.standalone.push(tx.hash.clone());
        }
    }

    report.bundles = groups.into_values().collect();
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use shared_types::TimestampTag;

    fn identifier() -> ChunkIdentifier {
        ChunkIdentifier::new(1, TimestampTag::parse_exact("2024-08-17_17:57__TO94").unwrap())
    }

    fn carrier(hash: &str, second: u32, memo: Memo) -> Transaction {
        Transaction {
            hash: hash.to_string(),
            account: "rSender".to_string(),
            destination: "rNode".to_string(),
            close_time: Utc.with_ymd_and_hms(2024, 8, 17, 18, 0, second).unwrap(),
            ledger_index: 100 + u64::from(second),
            transaction_result: "tesSUCCESS".to_string(),
            amount: None,
            memos: vec![memo],
        }
    }

    #[test]
    fn test_encode_respects_budget() {
        let payload = "x".repeat(2_000);
        let memos = encode_chunks(&payload, "2024-08-17_17:57__TO94", &identifier(), 200, 40).unwrap();

        assert!(memos.len() > 1);
        for memo in &memos {
            assert!(memo.memo_data.len() <= 160, "chunk too large: {}", memo.memo_data.len());
            assert_eq!(memo.memo_format, CHUNKED_MEMO_FORMAT);
        }
        assert!(memos[0].memo_data.starts_with("v1.2024-08-17_17:57__TO94#1/"));
    }

    #[test]
    fn test_overhead_at_or_above_max_is_config_error() {
        let result = encode_chunks("abc", "t", &identifier(), 100, 100);
        assert_eq!(
            result,
            Err(CodecError::OverheadExceedsChunkSize {
                max_chunk_size: 100,
                overhead: 100
            })
        );
    }

    #[test]
    fn test_budget_smaller_than_header_rejected() {
        let result = encode_chunks("abc", "t", &identifier(), 40, 10);
        assert!(matches!(result, Err(CodecError::ChunkBudgetTooSmall { .. })));
    }

    #[test]
    fn test_multibyte_characters_not_split() {
        let payload = "é".repeat(100);
        let memos = encode_chunks(&payload, "t", &identifier(), 62, 0).unwrap();
        let txs: Vec<_> = memos
            .into_iter()
            .enumerate()
            .map(|(i, m)| carrier(&format!("H{}", i), i as u32, m))
            .collect();

        let report = decode_chunks(&txs, 1);
        assert_eq!(report.bundles[0].assemble().unwrap(), payload);
    }

    #[test]
    fn test_header_width_grows_with_chunk_count() {
        // Enough pieces to need two-digit positions.
        let payload = "abcdefghij".repeat(20);
        let memos = encode_chunks(&payload, "t", &identifier(), 40, 0).unwrap();
        assert!(memos.len() >= 10);
        assert!(memos.iter().all(|m| m.memo_data.len() <= 40));
    }

    #[test]
    fn test_out_of_order_reassembly() {
        let memos = encode_chunks(&"0123456789".repeat(12), "t", &identifier(), 70, 0).unwrap();
        assert_eq!(memos.len(), 3, "expected three chunks");

        let second = carrier("B", 1, memos[1].clone());
        let first = carrier("A", 2, memos[0].clone());
        let third = carrier("C", 3, memos[2].clone());

        let partial = decode_chunks(&[second.clone(), first.clone()], 1);
        assert_eq!(
            partial.bundles[0].status(),
            BundleStatus::Incomplete { missing: vec![3] }
        );
        assert!(partial.bundles[0].assemble().is_none());

        let full = decode_chunks(&[third, second, first], 1);
        assert_eq!(full.bundles.len(), 1);
        assert_eq!(full.bundles[0].assemble().unwrap(), "0123456789".repeat(12));
        assert_eq!(full.bundles[0].contributors.len(), 3);
    }

    #[test]
    fn test_identical_retry_tolerated() {
        let memos = encode_chunks("hello", "t", &identifier(), 100, 0).unwrap();
        let txs = vec![carrier("A", 1, memos[0].clone()), carrier("A2", 2, memos[0].clone())];

        let report = decode_chunks(&txs, 1);
        let bundle = &report.bundles[0];
        assert!(bundle.is_complete());
        assert_eq!(bundle.pieces[&1].tx_hash, "A");
        assert_eq!(bundle.contributors.len(), 2);
    }

    #[test]
    fn test_conflicting_chunk_marks_corrupt() {
        let a = Memo::new("t", CHUNKED_MEMO_FORMAT, "v1.2024-08-17_17:57__TO94#1/2|one");
        let b = Memo::new("t", CHUNKED_MEMO_FORMAT, "v1.2024-08-17_17:57__TO94#1/2|uno");
        let report = decode_chunks(&[carrier("A", 1, a), carrier("B", 2, b)], 1);
        assert!(matches!(report.bundles[0].status(), BundleStatus::Corrupt(_)));
    }

    #[test]
    fn test_disagreeing_totals_mark_corrupt() {
        let a = Memo::new("t", CHUNKED_MEMO_FORMAT, "v1.2024-08-17_17:57__TO94#1/2|one");
        let b = Memo::new("t", CHUNKED_MEMO_FORMAT, "v1.2024-08-17_17:57__TO94#2/3|two");
        let report = decode_chunks(&[carrier("A", 1, a), carrier("B", 2, b)], 1);
        assert!(matches!(report.bundles[0].status(), BundleStatus::Corrupt(_)));
    }

    #[test]
    fn test_standalone_and_malformed_reported() {
        let plain = carrier("P", 1, Memo::new("HANDSHAKE", "text/plain", "02AB"));
        let bad = carrier("M", 2, Memo::new("t", CHUNKED_MEMO_FORMAT, "v1.2024-08-17_17:57__TO94#9/2|x"));
        let other_version =
            carrier("V", 3, Memo::new("t", CHUNKED_MEMO_FORMAT, "v7.2024-08-17_17:57__TO94#1/1|x"));

        let report = decode_chunks(&[plain, bad, other_version], 1);
        assert_eq!(report.standalone, vec!["P".to_string()]);
        assert_eq!(report.malformed.len(), 2);
        assert_eq!(
            report.malformed[1].error,
            ChunkParseError::UnsupportedVersion { found: 7, expected: 1 }
        );
        assert!(report.bundles.is_empty());
    }

    #[test]
    fn test_same_identifier_different_pair_not_merged() {
        let memo = Memo::new("t", CHUNKED_MEMO_FORMAT, "v1.2024-08-17_17:57__TO94#1/1|hi");
        let mut other = carrier("B", 2, memo.clone());
        other.account = "rSomeoneElse".to_string();

        let report = decode_chunks(&[carrier("A", 1, memo), other], 1);
        assert_eq!(report.bundles.len(), 2);
    }

    proptest::proptest! {
        #[test]
        fn prop_reassembles_in_order(payload in "\\PC{0,600}", max in 60usize..400) {
            let memos = encode_chunks(&payload, "t", &identifier(), max, 20).unwrap();
            let mut txs: Vec<_> = memos
                .into_iter()
                .enumerate()
                .map(|(i, m)| carrier(&format!("H{:04}", i), (i % 60) as u32, m))
                .collect();
            txs.reverse();

            let report = decode_chunks(&txs, 1);
            proptest::prop_assert_eq!(report.bundles.len(), 1);
            proptest::prop_assert_eq!(report.bundles[0].assemble(), Some(payload));
        }
    }
}
