//! Adapters for the Transaction Orchestrator

pub mod memory;

pub use memory::InMemoryTransactionRepository;
