//! # Encrypted Memo Payloads
//!
//! `WHISPER__<hex(nonce || ciphertext)>`. Anything without the marker is
//! plaintext and passes through decryption untouched.

use shared_crypto::{open, seal, SharedSecret};

use super::errors::ChannelError;

/// Marker prefixed to encrypted memo data.
pub const WHISPER_PREFIX: &str = "WHISPER__";

/// Whether `message` carries the encryption marker.
pub fn is_encrypted(message: &str) -> bool {
    message.starts_with(WHISPER_PREFIX)
}

/// Encrypt `plaintext` and tag it with the marker.
pub fn encrypt_message(plaintext: &str, secret: &SharedSecret) -> Result<String, ChannelError> {
    let sealed = seal(secret, plaintext.as_bytes())?;
    Ok(format!("{}{}", WHISPER_PREFIX, hex::encode(sealed)))
}

/// Decrypt a marked message; unmarked input is returned unchanged.
///
/// # Errors
/// - `MalformedCiphertext` if the body is not hex
/// - `Crypto` on a wrong secret or tampered ciphertext
/// - `InvalidPlaintext` if the result is not UTF-8
pub fn decrypt_message(message: &str, secret: &SharedSecret) -> Result<String, ChannelError> {
    let Some(body) = message.strip_prefix(WHISPER_PREFIX) else {
        return Ok(message.to_string());
    };
    let sealed =
        hex::decode(body.trim()).map_err(|e| ChannelError::MalformedCiphertext(e.to_string()))?;
    let plaintext = open(secret, &sealed)?;
    String::from_utf8(plaintext).map_err(|_| ChannelError::InvalidPlaintext)
}
