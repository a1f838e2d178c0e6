//! # NT-03: Transaction Orchestrator Subsystem
//!
//! Classifies observed ledger transactions exactly once per rule.
//!
//! ## Pipeline
//!
//! ```text
//! Repository ──unverified──→ MemoCodec ──messages──→ EncryptionChannel
//!     ↑                                                   │ plaintext
//!     └──── ProcessingResult (tx_hash, rule) ←── RuleSet ←┘
//! ```
//!
//! A transaction leaves the unverified set once any result row exists for
//! it. Rows are insert-once and never updated, so reruns and overlapping
//! passes are harmless. `reprocess` deletes rows to force re-evaluation.
//!
//! ## Architecture
//!
//! - **Domain**: results, queries, classification rules, arbitration contract
//! - **Ports**: Inbound (`TransactionProcessingApi`), Outbound (`TransactionRepository`, `RewardArbiter`)
//! - **Adapters**: `InMemoryTransactionRepository`
//! - **Application**: `TransactionOrchestrator`, `ArbitrationService`

#![warn(missing_docs)]

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

pub use adapters::InMemoryTransactionRepository;
pub use application::{ArbitrationService, PreparedMessage, TaskContext, TransactionOrchestrator};
pub use config::OrchestratorConfig;
pub use domain::*;
pub use ports::inbound::TransactionProcessingApi;
pub use ports::outbound::{QueryParams, QueryRow, RewardArbiter, TransactionRepository};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
