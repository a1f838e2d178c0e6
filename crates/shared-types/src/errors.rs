//! # Error Types
//!
//! Parse errors for the shared value types.

use thiserror::Error;

/// Errors raised while parsing shared value types from their text form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypesError {
    /// Amount string is not a non-negative decimal.
    #[error("Invalid token amount: {0}")]
    InvalidAmount(String),

    /// Amount has more fractional digits than the ledger supports.
    #[error("Too many decimal places in {value}: at most {max} allowed")]
    ExcessPrecision { value: String, max: u32 },

    /// Amount does not fit in the base-unit representation.
    #[error("Token amount overflow: {0}")]
    AmountOverflow(String),

    /// Timestamp tag is malformed.
    #[error("Invalid timestamp tag: {0}")]
    InvalidTag(String),
}
