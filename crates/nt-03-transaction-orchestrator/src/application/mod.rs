//! Application layer for the Transaction Orchestrator

pub mod arbitration;
pub mod service;

pub use arbitration::{ArbitrationService, TaskContext};
pub use service::{PreparedMessage, TransactionOrchestrator};
