//! Ports module for the Transaction Orchestrator
//!
//! Defines inbound (API) and outbound (SPI) port traits.

pub mod inbound;
pub mod outbound;

pub use inbound::TransactionProcessingApi;
pub use outbound::{QueryParams, QueryRow, RewardArbiter, TransactionRepository};
