//! # Channel Errors
//!
//! Error types for handshake resolution and payload encryption.

use shared_crypto::CryptoError;
use shared_types::Address;
use thiserror::Error;

/// Errors that can occur on an encryption channel.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChannelError {
    /// Key agreement or AEAD failure (wrong key, tampered payload).
    #[error("Cryptographic failure: {0}")]
    Crypto(#[from] CryptoError),

    /// Marked as encrypted but the body is not valid hex.
    #[error("Malformed ciphertext encoding: {0}")]
    MalformedCiphertext(String),

    /// Decrypted bytes are not UTF-8 text.
    #[error("Decrypted payload is not valid UTF-8")]
    InvalidPlaintext,

    /// One or both handshakes have not been observed yet.
    #[error("Channel pending: no handshake observed from {missing:?}")]
    ChannelPending {
        /// Addresses whose handshake is still missing.
        missing: Vec<Address>,
    },

    /// No key pair is held for a local address.
    #[error("No channel key held for local address {0}")]
    UnknownLocalAddress(Address),

    /// The handshake source could not be queried.
    #[error("Handshake lookup failed: {0}")]
    HandshakeLookup(String),
}

impl ChannelError {
    /// Whether this is a "not yet ready" condition that a later handshake
    /// can clear, as opposed to a definite failure.
    pub fn is_pending(&self) -> bool {
        matches!(self, ChannelError::ChannelPending { .. })
    }
}
