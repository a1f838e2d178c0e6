//! Shared builders for integration tests.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use nt_02_encryption_channel::{EcdhKeyPair, StaticKeyring};
use nt_03_transaction_orchestrator::{
    InMemoryTransactionRepository, OrchestratorConfig, TransactionOrchestrator,
};
use shared_types::{Memo, Transaction};

/// The node's address.
pub const NODE: &str = "rNode";
/// A participant's address.
pub const USER: &str = "rUser";
/// Task id used across workflow fixtures.
pub const TASK_ID: &str = "2024-08-17_12:00__AB12";

/// 2024-08-17T12:00:00Z
const FIXTURE_EPOCH: i64 = 1_723_896_000;

/// Orchestrator type under test.
pub type Orchestrator = TransactionOrchestrator<InMemoryTransactionRepository, StaticKeyring>;

/// Deterministic node channel key.
pub fn node_keys() -> EcdhKeyPair {
    EcdhKeyPair::from_seed("integration-node-seed").expect("seed derives a key")
}

/// Close time `second` seconds after the fixture epoch.
pub fn at(second: u32) -> DateTime<Utc> {
    Utc.timestamp_opt(FIXTURE_EPOCH + i64::from(second), 0).unwrap()
}

/// Successful transaction carrying one memo.
pub fn tx(hash: &str, from: &str, to: &str, second: u32, memo: Memo) -> Transaction {
    Transaction {
        hash: hash.to_string(),
        account: from.to_string(),
        destination: to.to_string(),
        close_time: at(second),
        ledger_index: 1_000 + u64::from(second),
        transaction_result: "tesSUCCESS".to_string(),
        amount: None,
        memos: vec![memo],
    }
}

/// Plain task memo.
pub fn task_memo(body: &str) -> Memo {
    Memo::new(TASK_ID, "text/plain", body)
}

/// Repository plus a node orchestrator using small test chunks.
pub fn node_with(config: OrchestratorConfig) -> (Arc<InMemoryTransactionRepository>, Orchestrator) {
    let repo = Arc::new(InMemoryTransactionRepository::new());
    let keyring = StaticKeyring::new().with_key(NODE, node_keys());
    let orchestrator = TransactionOrchestrator::new(Arc::clone(&repo), keyring, config)
        .expect("test codec config is valid");
    (repo, orchestrator)
}

/// [`node_with`] the testing configuration.
pub fn node() -> (Arc<InMemoryTransactionRepository>, Orchestrator) {
    node_with(OrchestratorConfig::for_testing())
}
