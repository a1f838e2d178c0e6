//! Encryption Channel Service
//!
//! Resolves channel secrets from observed handshakes and the local keyring.

use async_trait::async_trait;
use shared_crypto::{derive_shared_secret, EcdhKeyPair, EcdhPublicKey};
use shared_types::{Memo, Transaction};
use tracing::{debug, info};

use crate::config::ChannelConfig;
use crate::domain::{
    self, handshake_memo, latest_keys, parse_handshake, ChannelError, ChannelResolution,
};
use crate::ports::inbound::EncryptionChannelApi;
use crate::ports::outbound::{ChannelKeyring, HandshakeSource};

/// Encryption Channel Service
pub struct EncryptionChannelService<H, K> {
    handshakes: H,
    keyring: K,
    config: ChannelConfig,
}

impl<H, K> EncryptionChannelService<H, K>
where
    H: HandshakeSource,
    K: ChannelKeyring,
{
    /// Create a service with the default configuration.
    pub fn new(handshakes: H, keyring: K) -> Self {
        Self::with_config(handshakes, keyring, ChannelConfig::default())
    }

    /// Create a service with a custom configuration.
    pub fn with_config(handshakes: H, keyring: K, config: ChannelConfig) -> Self {
        Self {
            handshakes,
            keyring,
            config,
        }
    }

    /// The keyring backing this service.
    pub fn keyring(&self) -> &K {
        &self.keyring
    }

    fn local_key(&self, local: &str) -> Result<&EcdhKeyPair, ChannelError> {
        self.keyring
            .key_pair(local)
            .ok_or_else(|| ChannelError::UnknownLocalAddress(local.to_string()))
    }

    async fn established_secret(
        &self,
        local: &str,
        counterparty: &str,
    ) -> Result<shared_crypto::SharedSecret, ChannelError> {
        match self.resolve_channel(local, counterparty).await? {
            ChannelResolution::Established(secret) => Ok(secret),
            ChannelResolution::Pending { missing } => Err(ChannelError::ChannelPending { missing }),
        }
    }
}

#[async_trait]
impl<H, K> EncryptionChannelApi for EncryptionChannelService<H, K>
where
    H: HandshakeSource,
    K: ChannelKeyring,
{
    async fn get_handshake(
        &self,
        a: &str,
        b: &str,
    ) -> Result<(Option<EcdhPublicKey>, Option<EcdhPublicKey>), ChannelError> {
        let transactions = self.handshakes.handshake_transactions(a, b).await?;
        Ok(latest_keys(&transactions, a, b))
    }

    async fn resolve_channel(
        &self,
        local: &str,
        counterparty: &str,
    ) -> Result<ChannelResolution, ChannelError> {
        let local_key = self.local_key(local)?;
        let (ours, theirs) = self.get_handshake(local, counterparty).await?;

        let mut missing = Vec::new();
        if ours.is_none() {
            missing.push(local.to_string());
        }
        let Some(remote) = theirs else {
            missing.push(counterparty.to_string());
            debug!(local, counterparty, ?missing, "Channel pending");
            return Ok(ChannelResolution::Pending { missing });
        };
        if !missing.is_empty() {
            debug!(local, counterparty, ?missing, "Channel pending");
            return Ok(ChannelResolution::Pending { missing });
        }

        let secret = derive_shared_secret(&remote, local_key)?;
        Ok(ChannelResolution::Established(secret))
    }

    async fn encrypt_for(
        &self,
        local: &str,
        counterparty: &str,
        plaintext: &str,
    ) -> Result<String, ChannelError> {
        let secret = self.established_secret(local, counterparty).await?;
        domain::encrypt_message(plaintext, &secret)
    }

    async fn decrypt_from(
        &self,
        local: &str,
        counterparty: &str,
        message: &str,
    ) -> Result<String, ChannelError> {
        if !domain::is_encrypted(message) {
            return Ok(message.to_string());
        }
        let secret = self.established_secret(local, counterparty).await?;
        domain::decrypt_message(message, &secret)
    }

    fn build_handshake_memo(&self, local: &str) -> Result<Memo, ChannelError> {
        Ok(handshake_memo(&self.local_key(local)?.public_key()))
    }

    async fn should_auto_respond(&self, handshake: &Transaction) -> Result<bool, ChannelError> {
        let Some(record) = parse_handshake(handshake) else {
            return Ok(false);
        };
        if !self.config.auto_responds(&record.receiver)
            || self.keyring.key_pair(&record.receiver).is_none()
        {
            return Ok(false);
        }

        let (ours, _) = self.get_handshake(&record.receiver, &record.sender).await?;
        let respond = ours.is_none();
        if respond {
            info!(
                tx_hash = %record.tx_hash,
                local = %record.receiver,
                counterparty = %record.sender,
                "Inbound handshake needs a reply"
            );
        }
        Ok(respond)
    }
}
