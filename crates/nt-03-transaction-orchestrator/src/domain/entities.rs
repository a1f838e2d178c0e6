//! Core entities for the Transaction Orchestrator

use chrono::{DateTime, Utc};
use nt_01_memo_codec::ChunkIdentifier;
use serde::{Deserialize, Serialize};
use shared_types::{Address, Transaction, TxHash};

/// Durable outcome of evaluating one transaction under one rule.
///
/// At most one exists per `(tx_hash, rule_name)`. Rows are never updated;
/// reprocessing deletes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingResult {
    /// Evaluated transaction.
    pub tx_hash: TxHash,
    /// Rule (or pipeline stage) that produced the outcome.
    pub rule_name: String,
    /// Whether the transaction needs no further review.
    pub processed: bool,
    /// Whether the rule accepted the transaction.
    pub success: bool,
    /// Structured details.
    pub payload: serde_json::Value,
    /// When the outcome was computed.
    pub recorded_at: DateTime<Utc>,
}

impl ProcessingResult {
    /// A successful outcome.
    pub fn succeeded(tx_hash: &str, rule_name: &str, payload: serde_json::Value) -> Self {
        Self {
            tx_hash: tx_hash.to_string(),
            rule_name: rule_name.to_string(),
            processed: true,
            success: true,
            payload,
            recorded_at: Utc::now(),
        }
    }

    /// A recorded failure.
    pub fn failed(tx_hash: &str, rule_name: &str, payload: serde_json::Value) -> Self {
        Self {
            success: false,
            ..Self::succeeded(tx_hash, rule_name, payload)
        }
    }

    /// Uniqueness key.
    pub fn key(&self) -> (&str, &str) {
        (&self.tx_hash, &self.rule_name)
    }
}

/// Result of a store attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreOutcome {
    /// New row written.
    Inserted,
    /// A row for this `(tx_hash, rule_name)` already existed; nothing changed.
    AlreadyExists,
}

/// Fetch order for unverified transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderBy {
    /// Oldest close time first (causal order).
    #[default]
    CloseTimeAsc,
    /// Newest close time first.
    CloseTimeDesc,
    /// Ascending ledger index.
    LedgerIndexAsc,
}

impl OrderBy {
    /// Sort `transactions` in place. Ties fall back to the transaction hash.
    pub fn sort(self, transactions: &mut [Transaction]) {
        match self {
            OrderBy::CloseTimeAsc => {
                transactions.sort_by(|a, b| a.ordering_key().cmp(&b.ordering_key()))
            }
            OrderBy::CloseTimeDesc => {
                transactions.sort_by(|a, b| b.ordering_key().cmp(&a.ordering_key()))
            }
            OrderBy::LedgerIndexAsc => transactions
                .sort_by(|a, b| (a.ledger_index, &a.hash).cmp(&(b.ledger_index, &b.hash))),
        }
    }
}

/// Parameters for fetching unverified transactions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnverifiedQuery {
    /// Fetch order.
    pub order_by: OrderBy,
    /// Maximum number of transactions.
    pub limit: Option<usize>,
    /// Return every transaction regardless of stored results.
    pub include_processed: bool,
}

/// Filters for reading stored results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultFilter {
    /// Only this rule.
    pub rule_name: Option<String>,
    /// Only this processed state.
    pub processed: Option<bool>,
    /// Only results for this transaction.
    pub tx_hash: Option<TxHash>,
    /// Maximum rows.
    pub limit: Option<usize>,
}

impl ResultFilter {
    /// Whether `result` passes every set filter (limit aside).
    pub fn accepts(&self, result: &ProcessingResult) -> bool {
        self.rule_name.as_ref().map_or(true, |r| *r == result.rule_name)
            && self.processed.map_or(true, |p| p == result.processed)
            && self.tx_hash.as_ref().map_or(true, |h| *h == result.tx_hash)
    }
}

/// Lookup for the transaction answering a request.
///
/// The response travels from `request_destination` back to
/// `request_account`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseQuery {
    /// Requesting address.
    pub request_account: Address,
    /// Address the request was sent to.
    pub request_destination: Address,
    /// Close time of the request.
    pub request_time: DateTime<Utc>,
    /// Memo type the response must carry. Prefixed handshake types count
    /// as `HANDSHAKE`.
    pub response_memo_type: String,
    /// Text the response memo data must contain, if any.
    pub response_marker: Option<String>,
    /// Only accept responses closed after the request.
    pub require_after_request: bool,
}

impl ResponseQuery {
    /// Whether `tx` answers this request.
    pub fn matches(&self, tx: &Transaction) -> bool {
        tx.is_successful()
            && tx.account == self.request_destination
            && tx.destination == self.request_account
            && (!self.require_after_request || tx.close_time > self.request_time)
            && tx.memos.iter().any(|memo| {
                memo.kind().as_str() == self.response_memo_type
                    && self
                        .response_marker
                        .as_ref()
                        .map_or(true, |marker| memo.memo_data.contains(marker.as_str()))
            })
    }
}

/// Role of a transaction in a request/response workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Needs a response before it is fully processed.
    Request,
    /// Answers a request.
    Response,
    /// Stands alone.
    Standalone,
}

/// A decoded logical message, ready for classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Transaction carrying the message (first chunk for chunked messages).
    pub transaction: Transaction,
    /// Every transaction the message spans.
    pub tx_hashes: Vec<TxHash>,
    /// Memo type.
    pub memo_type: String,
    /// Plaintext body.
    pub body: String,
    /// Chunk identifier, for multi-chunk messages.
    pub message_id: Option<ChunkIdentifier>,
    /// Whether the body arrived encrypted.
    pub was_encrypted: bool,
}

impl InboundMessage {
    /// Sending address.
    pub fn sender(&self) -> &str {
        &self.transaction.account
    }

    /// Receiving address.
    pub fn receiver(&self) -> &str {
        &self.transaction.destination
    }
}

/// Tally of one pipeline pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassSummary {
    /// Transactions returned by the repository.
    pub fetched: usize,
    /// Results newly stored with `success == true`.
    pub resolved: usize,
    /// Results newly stored with `success == false`.
    pub failed: usize,
    /// Transactions left for a later pass (incomplete chunks, malformed
    /// headers, requests awaiting a response).
    pub deferred: usize,
    /// Store attempts that found an existing row.
    pub already_resolved: usize,
}

impl PassSummary {
    /// Whether the pass stored anything new.
    pub fn stored_any(&self) -> bool {
        self.resolved + self.failed > 0
    }
}
