//! Outbound Ports (Driven Ports / SPI)

use async_trait::async_trait;
use shared_types::{Transaction, TxHash};

use crate::domain::{
    ArbitrationError, ProcessingResult, RepositoryError, ResponseQuery, ResultFilter,
    StoreOutcome, UnverifiedQuery,
};

/// Named parameters for [`TransactionRepository::execute_query`].
pub type QueryParams = serde_json::Map<String, serde_json::Value>;

/// One row returned by [`TransactionRepository::execute_query`].
pub type QueryRow = serde_json::Map<String, serde_json::Value>;

/// Durable store of observed transactions and their processing results.
///
/// Every call is a suspension point. Implementations must enforce
/// uniqueness of `(tx_hash, rule_name)` so that concurrent passes cannot
/// duplicate a result.
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// Transactions without any stored result (or all, with
    /// `include_processed`), in the requested order.
    async fn get_unverified_transactions(
        &self,
        query: &UnverifiedQuery,
    ) -> Result<Vec<Transaction>, RepositoryError>;

    /// Every transaction from `sender` to `receiver` carrying `memo_type`,
    /// processed or not. Used to gather the sibling chunks of a message.
    async fn get_message_transactions(
        &self,
        sender: &str,
        receiver: &str,
        memo_type: &str,
    ) -> Result<Vec<Transaction>, RepositoryError>;

    /// Earliest transaction answering a request.
    async fn find_transaction_response(
        &self,
        query: &ResponseQuery,
    ) -> Result<Option<Transaction>, RepositoryError>;

    /// Delete stored results for `tx_hashes`. Returns the number of rows removed.
    async fn reprocess_transactions(&self, tx_hashes: &[TxHash]) -> Result<u64, RepositoryError>;

    /// Insert a result unless one exists for the same `(tx_hash, rule_name)`.
    async fn store_processing_result(
        &self,
        result: &ProcessingResult,
    ) -> Result<StoreOutcome, RepositoryError>;

    /// Stored results matching `filter`.
    async fn get_processing_results(
        &self,
        filter: &ResultFilter,
    ) -> Result<Vec<ProcessingResult>, RepositoryError>;

    /// Ad-hoc reporting query. Not used by the pipeline itself.
    async fn execute_query(
        &self,
        query: &str,
        params: &QueryParams,
    ) -> Result<Vec<QueryRow>, RepositoryError>;
}

/// External scoring collaborator.
#[async_trait]
pub trait RewardArbiter: Send + Sync {
    /// Send the rendered request and return the raw reply text.
    async fn evaluate(&self, rendered_request: &str) -> Result<String, ArbitrationError>;
}
