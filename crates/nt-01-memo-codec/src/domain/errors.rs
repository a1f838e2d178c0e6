//! # Codec Errors
//!
//! Error types for chunk encoding and amount distribution.

use shared_types::TokenAmount;
use thiserror::Error;

/// Errors raised while preparing outbound chunks.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    /// Configured overhead leaves no room for chunk data.
    #[error("Structural overhead {overhead} leaves no room in a {max_chunk_size}-byte chunk")]
    OverheadExceedsChunkSize {
        max_chunk_size: usize,
        overhead: usize,
    },

    /// The chunk header alone (or one character after it) does not fit.
    #[error("Chunk budget of {budget} bytes cannot hold a {header_len}-byte header plus data")]
    ChunkBudgetTooSmall { budget: usize, header_len: usize },

    /// More chunks than the position field can express.
    #[error("Message needs {0} chunks, more than a header can number")]
    TooManyChunks(usize),

    /// Cannot distribute over zero chunks.
    #[error("Chunk count must be at least 1")]
    InvalidChunkCount,

    /// Per-chunk share would fall below the ledger's minimum unit.
    #[error("Cannot split {total} over {chunk_count} chunks: share below minimum {minimum}")]
    AmountBelowMinimum {
        total: TokenAmount,
        chunk_count: usize,
        minimum: TokenAmount,
    },

    /// Amount arithmetic overflowed.
    #[error("Amount overflow while distributing {0}")]
    AmountOverflow(TokenAmount),
}

/// Why a memo carrying a chunk identifier could not be read as a chunk.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChunkParseError {
    /// Identifier is not followed by `#<index>/<total>|`.
    #[error("Chunk position missing after identifier")]
    MissingPosition,

    /// Position is not a valid 1-based `index/total` pair.
    #[error("Invalid chunk position: {0}")]
    BadPosition(String),

    /// Identifier uses a wire version this node does not read.
    #[error("Unsupported chunk format version {found} (expected {expected})")]
    UnsupportedVersion { found: u16, expected: u16 },
}
