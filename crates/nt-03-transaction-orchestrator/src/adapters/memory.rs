//! In-memory transaction repository.
//!
//! Backs the node runtime and tests. Both maps sit behind `parking_lot`
//! locks; the result map is keyed by `(tx_hash, rule_name)` so inserts are
//! race-free under a single write lock.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use nt_02_encryption_channel::{ChannelError, HandshakeSource};
use parking_lot::RwLock;
use serde_json::{json, Value};
use shared_types::{Transaction, TxHash};

use crate::domain::{
    ProcessingResult, RepositoryError, ResponseQuery, ResultFilter, StoreOutcome, UnverifiedQuery,
};
use crate::ports::outbound::{QueryParams, QueryRow, TransactionRepository};

type ResultKey = (TxHash, String);

/// Transactions and processing results held in memory.
pub struct InMemoryTransactionRepository {
    transactions: RwLock<BTreeMap<TxHash, Transaction>>,
    results: RwLock<BTreeMap<ResultKey, ProcessingResult>>,
    available: AtomicBool,
}

impl InMemoryTransactionRepository {
    /// Empty repository.
    pub fn new() -> Self {
        Self {
            transactions: RwLock::new(BTreeMap::new()),
            results: RwLock::new(BTreeMap::new()),
            available: AtomicBool::new(true),
        }
    }

    /// Record an observed transaction. Re-inserting a hash replaces it.
    pub fn insert_transaction(&self, tx: Transaction) {
        self.transactions.write().insert(tx.hash.clone(), tx);
    }

    /// Number of stored transactions.
    pub fn transaction_count(&self) -> usize {
        self.transactions.read().len()
    }

    /// Every stored result, ordered by `(tx_hash, rule_name)`.
    pub fn result_rows(&self) -> Vec<ProcessingResult> {
        self.results.read().values().cloned().collect()
    }

    /// Simulate an outage: while unavailable every call fails.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), RepositoryError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(RepositoryError::Unavailable("in-memory store offline".to_string()))
        }
    }

    fn has_result(&self, tx_hash: &str) -> bool {
        self.results.read().keys().any(|(hash, _)| hash == tx_hash)
    }

    fn string_param<'a>(params: &'a QueryParams, name: &str) -> Result<&'a str, RepositoryError> {
        params
            .get(name)
            .and_then(Value::as_str)
            .ok_or_else(|| RepositoryError::InvalidParameter {
                name: name.to_string(),
                reason: "expected a string".to_string(),
            })
    }
}

impl Default for InMemoryTransactionRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TransactionRepository for InMemoryTransactionRepository {
    async fn get_unverified_transactions(
        &self,
        query: &UnverifiedQuery,
    ) -> Result<Vec<Transaction>, RepositoryError> {
        self.check_available()?;
        let mut selected: Vec<Transaction> = self
            .transactions
            .read()
            .values()
            .filter(|tx| query.include_processed || !self.has_result(&tx.hash))
            .cloned()
            .collect();
        query.order_by.sort(&mut selected);
        if let Some(limit) = query.limit {
            selected.truncate(limit);
        }
        Ok(selected)
    }

    async fn get_message_transactions(
        &self,
        sender: &str,
        receiver: &str,
        memo_type: &str,
    ) -> Result<Vec<Transaction>, RepositoryError> {
        self.check_available()?;
        let mut selected: Vec<Transaction> = self
            .transactions
            .read()
            .values()
            .filter(|tx| {
                tx.account == sender
                    && tx.destination == receiver
                    && tx.memos.iter().any(|m| m.memo_type == memo_type)
            })
            .cloned()
            .collect();
        selected.sort_by(|a, b| a.ordering_key().cmp(&b.ordering_key()));
        Ok(selected)
    }

    async fn find_transaction_response(
        &self,
        query: &ResponseQuery,
    ) -> Result<Option<Transaction>, RepositoryError> {
        self.check_available()?;
        Ok(self
            .transactions
            .read()
            .values()
            .filter(|tx| query.matches(tx))
            .min_by(|a, b| a.ordering_key().cmp(&b.ordering_key()))
            .cloned())
    }

    async fn reprocess_transactions(&self, tx_hashes: &[TxHash]) -> Result<u64, RepositoryError> {
        self.check_available()?;
        let mut results = self.results.write();
        let before = results.len();
        results.retain(|(hash, _), _| !tx_hashes.contains(hash));
        Ok((before - results.len()) as u64)
    }

    async fn store_processing_result(
        &self,
        result: &ProcessingResult,
    ) -> Result<StoreOutcome, RepositoryError> {
        self.check_available()?;
        let mut results = self.results.write();
        let key = (result.tx_hash.clone(), result.rule_name.clone());
        if results.contains_key(&key) {
            return Ok(StoreOutcome::AlreadyExists);
        }
        results.insert(key, result.clone());
        Ok(StoreOutcome::Inserted)
    }

    async fn get_processing_results(
        &self,
        filter: &ResultFilter,
    ) -> Result<Vec<ProcessingResult>, RepositoryError> {
        self.check_available()?;
        let results = self.results.read();
        let matching = results.values().filter(|r| filter.accepts(r)).cloned();
        Ok(match filter.limit {
            Some(limit) => matching.take(limit).collect(),
            None => matching.collect(),
        })
    }

    async fn execute_query(
        &self,
        query: &str,
        params: &QueryParams,
    ) -> Result<Vec<QueryRow>, RepositoryError> {
        self.check_available()?;
        let rows = match query {
            "count_transactions" => vec![json!({ "count": self.transaction_count() })],
            "count_unverified" => {
                let count = self
                    .transactions
                    .read()
                    .keys()
                    .filter(|hash| !self.has_result(hash))
                    .count();
                vec![json!({ "count": count })]
            }
            "results_by_rule" => {
                let rule_name = Self::string_param(params, "rule_name")?;
                self.results
                    .read()
                    .values()
                    .filter(|r| r.rule_name == rule_name)
                    .map(|r| {
                        json!({
                            "tx_hash": r.tx_hash,
                            "success": r.success,
                            "recorded_at": r.recorded_at.to_rfc3339(),
                        })
                    })
                    .collect()
            }
            other => return Err(RepositoryError::UnsupportedQuery(other.to_string())),
        };

        Ok(rows
            .into_iter()
            .filter_map(|row| match row {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect())
    }
}

#[async_trait]
impl HandshakeSource for InMemoryTransactionRepository {
    async fn handshake_transactions(
        &self,
        a: &str,
        b: &str,
    ) -> Result<Vec<Transaction>, ChannelError> {
        self.check_available()?;
        Ok(self
            .transactions
            .read()
            .values()
            .filter(|tx| {
                ((tx.account == a && tx.destination == b) || (tx.account == b && tx.destination == a))
                    && tx.memos.iter().any(|m| m.kind().is_handshake())
            })
            .cloned()
            .collect())
    }
}
