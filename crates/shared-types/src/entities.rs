//! # Core Domain Entities
//!
//! Ledger transactions and the memo fields they carry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::amount::TokenAmount;
use crate::memo_types::MemoType;

/// Ledger transaction hash (uppercase hex as reported by the ledger).
pub type TxHash = String;

/// Ledger account address.
pub type Address = String;

/// Engine result code of a successfully applied transaction.
pub const TX_SUCCESS: &str = "tesSUCCESS";

/// A memo field attached to a ledger transaction.
///
/// Fields are held decoded (the ledger stores them hex-encoded; the ingestion
/// layer decodes them before they reach the core).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Memo {
    /// Memo type: a system vocabulary entry or an application-defined tag.
    pub memo_type: String,
    /// Encoding hint.
    pub memo_format: String,
    /// Payload.
    pub memo_data: String,
}

impl Memo {
    /// Create a memo.
    pub fn new(
        memo_type: impl Into<String>,
        memo_format: impl Into<String>,
        memo_data: impl Into<String>,
    ) -> Self {
        Self {
            memo_type: memo_type.into(),
            memo_format: memo_format.into(),
            memo_data: memo_data.into(),
        }
    }

    /// Classified memo type.
    pub fn kind(&self) -> MemoType {
        MemoType::parse(&self.memo_type)
    }
}

/// A transaction as observed on the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique transaction hash (primary key).
    pub hash: TxHash,
    /// Sending account.
    pub account: Address,
    /// Receiving account.
    pub destination: Address,
    /// Ledger close time.
    pub close_time: DateTime<Utc>,
    /// Ledger index the transaction was validated in.
    pub ledger_index: u64,
    /// Engine result code (`tesSUCCESS` on success).
    pub transaction_result: String,
    /// Delivered token amount, if any.
    pub amount: Option<TokenAmount>,
    /// Memo fields in ledger order.
    pub memos: Vec<Memo>,
}

impl Transaction {
    /// Whether the ledger applied the transaction successfully.
    pub fn is_successful(&self) -> bool {
        self.transaction_result == TX_SUCCESS
    }

    /// Whether `address` is either end of this transaction.
    pub fn involves(&self, address: &str) -> bool {
        self.account == address || self.destination == address
    }

    /// Sort key for causal ordering: close time, then ledger index, then hash.
    pub fn ordering_key(&self) -> (DateTime<Utc>, u64, &str) {
        (self.close_time, self.ledger_index, self.hash.as_str())
    }
}
