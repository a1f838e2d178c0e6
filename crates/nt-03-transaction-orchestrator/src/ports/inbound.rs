//! Inbound Port - TransactionProcessingApi

use async_trait::async_trait;
use shared_types::TxHash;

use crate::domain::{OrchestratorError, PassSummary, ProcessingResult, ResultFilter, UnverifiedQuery};

/// Primary API for the Transaction Orchestrator.
#[async_trait]
pub trait TransactionProcessingApi: Send + Sync {
    /// Fetch unverified transactions and record one outcome per message.
    ///
    /// Incomplete chunk groups and requests still awaiting a response are
    /// left for a later pass. Decode, decryption and validation failures are
    /// recorded as failed results.
    ///
    /// # Errors
    /// Repository failures abort the pass. Rows stored before the failure stay
    /// stored; rerunning the pass is safe.
    async fn run_pass(&self, query: &UnverifiedQuery) -> Result<PassSummary, OrchestratorError>;

    /// Delete results for `tx_hashes` so the next pass re-evaluates them.
    async fn reprocess(&self, tx_hashes: &[TxHash]) -> Result<u64, OrchestratorError>;

    /// Stored results matching `filter`.
    async fn processing_results(
        &self,
        filter: &ResultFilter,
    ) -> Result<Vec<ProcessingResult>, OrchestratorError>;
}
