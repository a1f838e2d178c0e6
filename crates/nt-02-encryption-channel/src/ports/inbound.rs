//! Inbound Port - EncryptionChannelApi

use async_trait::async_trait;
use shared_crypto::EcdhPublicKey;
use shared_types::{Memo, Transaction};

use crate::domain::{ChannelError, ChannelResolution};

/// Primary API for the Encryption Channel.
///
/// "Not yet established" is never an error on lookup: it surfaces as `None`
/// keys or [`ChannelResolution::Pending`]. Only the encrypt/decrypt helpers
/// turn it into `ChannelError::ChannelPending`.
#[async_trait]
pub trait EncryptionChannelApi: Send + Sync {
    /// Keys published by `a` to `b` and by `b` to `a`, latest of each.
    async fn get_handshake(
        &self,
        a: &str,
        b: &str,
    ) -> Result<(Option<EcdhPublicKey>, Option<EcdhPublicKey>), ChannelError>;

    /// Channel state between a local address and a counterparty.
    ///
    /// # Errors
    /// - `UnknownLocalAddress`: no key pair held for `local`
    /// - `HandshakeLookup`: the handshake source failed
    async fn resolve_channel(
        &self,
        local: &str,
        counterparty: &str,
    ) -> Result<ChannelResolution, ChannelError>;

    /// Encrypt `plaintext` for `counterparty`.
    async fn encrypt_for(
        &self,
        local: &str,
        counterparty: &str,
        plaintext: &str,
    ) -> Result<String, ChannelError>;

    /// Decrypt `message` received from `counterparty`. Unmarked messages pass
    /// through without a channel lookup.
    async fn decrypt_from(
        &self,
        local: &str,
        counterparty: &str,
        message: &str,
    ) -> Result<String, ChannelError>;

    /// Handshake memo publishing the channel key of `local`.
    fn build_handshake_memo(&self, local: &str) -> Result<Memo, ChannelError>;

    /// Whether `handshake` was sent to an auto-responding local address that
    /// has not yet published its own key back to the sender.
    async fn should_auto_respond(&self, handshake: &Transaction) -> Result<bool, ChannelError>;
}
