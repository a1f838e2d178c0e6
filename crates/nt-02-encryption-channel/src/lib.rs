//! # NT-02: Encryption Channel Subsystem
//!
//! Pairwise encrypted channels over a public ledger.
//!
//! ## Handshake Protocol
//!
//! ```text
//! A ──HANDSHAKE(pk_A)──→ B      get_handshake(A, B) == (pk_A, None)
//! B ──HANDSHAKE(pk_B)──→ A      get_handshake(A, B) == (pk_A, pk_B)
//!
//! secret = SHA-256(ECDH(sk_A, pk_B).x) == SHA-256(ECDH(sk_B, pk_A).x)
//! ```
//!
//! A channel is established only once both directions are observed. Until
//! then it resolves to `Pending`, which is not an error.
//!
//! ## Message Format
//!
//! Encrypted memo data is `WHISPER__` followed by the hex of
//! `nonce || XChaCha20-Poly1305 ciphertext`. Unmarked data is plaintext.
//!
//! ## Architecture
//!
//! - **Domain**: handshake parsing, message format, errors
//! - **Ports**: Inbound (`EncryptionChannelApi`), Outbound (`HandshakeSource`, `ChannelKeyring`)
//! - **Adapters**: `StaticKeyring`
//! - **Application**: `EncryptionChannelService`

#![warn(missing_docs)]

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

pub use adapters::StaticKeyring;
pub use application::EncryptionChannelService;
pub use config::ChannelConfig;
pub use domain::*;
pub use ports::inbound::EncryptionChannelApi;
pub use ports::outbound::{ChannelKeyring, HandshakeSource};
pub use shared_crypto::{derive_shared_secret, EcdhKeyPair, EcdhPublicKey, SharedSecret};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
