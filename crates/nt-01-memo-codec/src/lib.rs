//! # NT-01: Memo Codec Subsystem
//!
//! Splits outbound payloads into ledger-memo-sized chunks, regroups observed
//! chunks into messages, and spreads a token amount over chunk transactions.
//!
//! ## Chunk Wire Format
//!
//! ```text
//! v1.2024-08-17_17:57__TO94#2/3|<piece>
//! └┬┘└────────┬──────────┘ └┬┘ └──┬──┘
//! version  timestamp tag  index/total  payload piece
//! ```
//!
//! The whole memo data, header included, stays within
//! `max_chunk_size - structural_overhead` bytes.
//!
//! ## Architecture
//!
//! - **Domain**: identifiers, chunking/reassembly, amount distribution
//! - **Ports**: Inbound (`MemoCodecApi`)
//! - **Application**: `MemoCodecService`
//!
//! The codec keeps no state between calls. Completeness across ledger passes
//! is tracked by re-decoding the accumulated transaction set.

#![warn(missing_docs)]

pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

pub use application::MemoCodecService;
pub use config::CodecConfig;
pub use domain::*;
pub use ports::inbound::MemoCodecApi;

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
