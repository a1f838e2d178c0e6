//! Crypto error types.

use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// Encryption failed
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Decryption failed (wrong key or tampered ciphertext)
    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    /// Sealed payload shorter than a nonce plus tag
    #[error("Sealed payload too short: {len} bytes")]
    TruncatedCiphertext {
        /// Length actually received
        len: usize,
    },

    /// Invalid public key
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    /// Invalid private key
    #[error("Invalid private key")]
    InvalidPrivateKey,
}
