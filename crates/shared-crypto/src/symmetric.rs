//! # Symmetric Encryption
//!
//! XChaCha20-Poly1305 sealing keyed by an ECDH [`SharedSecret`].
//!
//! A sealed payload is `nonce (24 bytes) || ciphertext || tag (16 bytes)`,
//! so it is self-contained and can travel inside a single memo string.

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    XChaCha20Poly1305, XNonce,
};

use crate::ecdh::SharedSecret;
use crate::CryptoError;

/// XChaCha20 nonce length.
pub const NONCE_LEN: usize = 24;

const TAG_LEN: usize = 16;

fn random_nonce() -> [u8; NONCE_LEN] {
    let mut bytes = [0u8; NONCE_LEN];
    rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut bytes);
    bytes
}

/// Encrypt `plaintext` under `secret` with a fresh random nonce.
///
/// # Errors
///
/// Returns `CryptoError::EncryptionFailed` if encryption fails.
pub fn seal(secret: &SharedSecret, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let cipher = XChaCha20Poly1305::new(secret.as_bytes().into());
    let nonce = random_nonce();

    let ciphertext = cipher
        .encrypt(XNonce::from_slice(&nonce), plaintext)
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

    let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    sealed.extend_from_slice(&nonce);
    sealed.extend_from_slice(&ciphertext);
    Ok(sealed)
}

/// Decrypt a payload produced by [`seal`].
///
/// # Errors
///
/// - `CryptoError::TruncatedCiphertext` if the payload cannot hold a nonce and tag
/// - `CryptoError::DecryptionFailed` on a wrong key or tampered payload
pub fn open(secret: &SharedSecret, sealed: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if sealed.len() < NONCE_LEN + TAG_LEN {
        return Err(CryptoError::TruncatedCiphertext { len: sealed.len() });
    }
    let (nonce, ciphertext) = sealed.split_at(NONCE_LEN);
    let cipher = XChaCha20Poly1305::new(secret.as_bytes().into());

    cipher
        .decrypt(XNonce::from_slice(nonce), ciphertext)
        .map_err(|e| CryptoError::DecryptionFailed(e.to_string()))
}
