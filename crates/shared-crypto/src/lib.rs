//! # Shared Crypto - Channel Cryptography
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `ecdh` | secp256k1 ECDH + SHA-256 | Pairwise shared secrets from handshake keys |
//! | `symmetric` | XChaCha20-Poly1305 | Sealing memo payloads under a shared secret |
//!
//! ## Security Properties
//!
//! - **ECDH**: `derive(pk_b, sk_a) == derive(pk_a, sk_b)` for matching pairs
//! - **XChaCha20**: 192-bit random nonce per message, authenticated
//! - **Zeroize**: secret material is wiped on drop

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ecdh;
pub mod errors;
pub mod symmetric;

// Re-exports
pub use ecdh::{derive_shared_secret, EcdhKeyPair, EcdhPublicKey, SharedSecret};
pub use errors::CryptoError;
pub use symmetric::{open, seal, NONCE_LEN};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
