//! Static keyring: channel keys loaded once at startup.

use std::collections::HashMap;

use shared_crypto::{CryptoError, EcdhKeyPair};
use shared_types::Address;

use crate::ports::outbound::ChannelKeyring;

/// In-process keyring keyed by node address.
#[derive(Debug, Default)]
pub struct StaticKeyring {
    keys: HashMap<Address, EcdhKeyPair>,
}

impl StaticKeyring {
    /// Empty keyring.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the key pair for `address`.
    pub fn insert(&mut self, address: impl Into<Address>, key_pair: EcdhKeyPair) {
        self.keys.insert(address.into(), key_pair);
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with_key(mut self, address: impl Into<Address>, key_pair: EcdhKeyPair) -> Self {
        self.insert(address, key_pair);
        self
    }

    /// Derive a key pair for each `(address, wallet seed)`.
    pub fn from_seeds<'a, I>(entries: I) -> Result<Self, CryptoError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut keyring = Self::new();
        for (address, seed) in entries {
            keyring.insert(address, EcdhKeyPair::from_seed(seed)?);
        }
        Ok(keyring)
    }
}

impl ChannelKeyring for StaticKeyring {
    fn key_pair(&self, address: &str) -> Option<&EcdhKeyPair> {
        self.keys.get(address)
    }

    fn local_addresses(&self) -> Vec<Address> {
        let mut addresses: Vec<_> = self.keys.keys().cloned().collect();
        addresses.sort();
        addresses
    }
}
