//! Domain module for the Encryption Channel
//!
//! Handshake bookkeeping and the encrypted memo format. Key agreement and
//! sealing primitives live in `shared-crypto`.

pub mod errors;
pub mod handshake;
pub mod message;

pub use errors::ChannelError;
pub use handshake::{
    handshake_memo, latest_keys, parse_handshake, ChannelResolution, HandshakeRecord,
    HANDSHAKE_MEMO_FORMAT,
};
pub use message::{decrypt_message, encrypt_message, is_encrypted, WHISPER_PREFIX};
