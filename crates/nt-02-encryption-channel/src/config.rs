//! Configuration for the Encryption Channel

use serde::{Deserialize, Serialize};
use shared_types::Address;

/// Channel configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Local addresses that answer inbound handshakes automatically.
    pub auto_handshake_addresses: Vec<Address>,
}

impl ChannelConfig {
    /// Config for tests: auto-respond on `rNode`.
    pub fn for_testing() -> Self {
        Self {
            auto_handshake_addresses: vec!["rNode".to_string()],
        }
    }

    /// Whether `address` answers handshakes automatically.
    pub fn auto_responds(&self, address: &str) -> bool {
        self.auto_handshake_addresses.iter().any(|a| a == address)
    }
}
