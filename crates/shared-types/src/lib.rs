//! # Shared Types Crate
//!
//! Ledger-facing types shared by the codec, the encryption channel and the
//! processing orchestrator.
//!
//! ## Design Principles
//!
//! - **Read-only input**: a [`Transaction`] is immutable once observed. The
//!   ingestion layer owns it; the core only reads it.
//! - **Integer amounts**: [`TokenAmount`] is fixed-point, never a float.
//! - **One parser per tag**: timestamp tags (task ids, chunk identifiers) are
//!   parsed in exactly one place, [`TimestampTag::parse_prefix`].

pub mod amount;
pub mod entities;
pub mod errors;
pub mod memo_types;
pub mod tags;

pub use amount::{TokenAmount, TOKEN_DECIMALS};
pub use entities::*;
pub use errors::*;
pub use memo_types::*;
pub use tags::{TimestampTag, TIMESTAMP_FORMAT, TIMESTAMP_LEN};
