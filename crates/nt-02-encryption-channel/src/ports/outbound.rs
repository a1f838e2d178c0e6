//! Outbound Ports (Driven Ports / SPI)

use std::sync::Arc;

use async_trait::async_trait;
use shared_crypto::EcdhKeyPair;
use shared_types::{Address, Transaction};

use crate::domain::ChannelError;

/// Source of observed handshake transactions.
///
/// Implemented by the transaction repository.
#[async_trait]
pub trait HandshakeSource: Send + Sync {
    /// Successful or not, every handshake-type transaction exchanged between
    /// `a` and `b` in either direction.
    async fn handshake_transactions(
        &self,
        a: &str,
        b: &str,
    ) -> Result<Vec<Transaction>, ChannelError>;
}

#[async_trait]
impl<H: HandshakeSource + ?Sized> HandshakeSource for Arc<H> {
    async fn handshake_transactions(
        &self,
        a: &str,
        b: &str,
    ) -> Result<Vec<Transaction>, ChannelError> {
        (**self).handshake_transactions(a, b).await
    }
}

/// Local channel keys, one per node address.
pub trait ChannelKeyring: Send + Sync {
    /// Key pair held for `address`.
    fn key_pair(&self, address: &str) -> Option<&EcdhKeyPair>;

    /// Addresses this node holds keys for.
    fn local_addresses(&self) -> Vec<Address>;
}

/// Mock implementations for testing
#[cfg(test)]
pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    /// Handshake source backed by a plain list.
    #[derive(Default)]
    pub struct MockHandshakeSource {
        pub transactions: Mutex<Vec<Transaction>>,
        pub fail: bool,
    }

    impl MockHandshakeSource {
        pub fn push(&self, tx: Transaction) {
            self.transactions.lock().unwrap().push(tx);
        }
    }

    #[async_trait]
    impl HandshakeSource for MockHandshakeSource {
        async fn handshake_transactions(
            &self,
            a: &str,
            b: &str,
        ) -> Result<Vec<Transaction>, ChannelError> {
            if self.fail {
                return Err(ChannelError::HandshakeLookup("store offline".to_string()));
            }
            Ok(self
                .transactions
                .lock()
                .unwrap()
                .iter()
                .filter(|tx| tx.involves(a) && tx.involves(b))
                .cloned()
                .collect())
        }
    }
}
