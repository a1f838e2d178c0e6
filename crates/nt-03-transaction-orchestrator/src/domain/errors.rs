//! # Orchestrator Errors
//!
//! Only repository failures abort a pass. Decode, decryption and rule
//! failures become recorded results instead.

use nt_02_encryption_channel::ChannelError;
use thiserror::Error;

/// Errors raised by a transaction repository.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    /// The backing store could not be reached.
    #[error("Repository unavailable: {0}")]
    Unavailable(String),

    /// The store rejected a read or write.
    #[error("Repository operation failed: {0}")]
    OperationFailed(String),

    /// `execute_query` was given a query the store does not understand.
    #[error("Unsupported query: {0}")]
    UnsupportedQuery(String),

    /// A query parameter was missing or had the wrong type.
    #[error("Invalid query parameter `{name}`: {reason}")]
    InvalidParameter { name: String, reason: String },
}

impl From<RepositoryError> for ChannelError {
    fn from(err: RepositoryError) -> Self {
        ChannelError::HandshakeLookup(err.to_string())
    }
}

/// Errors that abort an orchestrator operation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OrchestratorError {
    /// Repository failure; rerun the pass once the store recovers.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Handshake lookup failed while resolving a channel.
    #[error("Channel lookup failed: {0}")]
    ChannelLookup(String),
}

/// Errors from the reward arbitration contract.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ArbitrationError {
    /// The arbiter's reply does not have the expected two-row table.
    #[error("Malformed arbitration response: {0}")]
    MalformedResponse(String),

    /// Awarded more than the proposed maximum.
    #[error("Reward {awarded} exceeds proposed maximum {maximum}")]
    RewardExceedsMaximum { awarded: u64, maximum: u64 },

    /// The arbiter could not be reached.
    #[error("Arbiter unavailable: {0}")]
    Unavailable(String),
}
