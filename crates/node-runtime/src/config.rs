//! # Node Configuration
//!
//! Defaults for every subsystem, overridable from `NT_*` environment
//! variables.

use nt_03_transaction_orchestrator::OrchestratorConfig;
use serde::{Deserialize, Serialize};
use shared_types::Address;
use thiserror::Error;

/// Complete node configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Orchestrator, codec and channel settings.
    pub orchestrator: OrchestratorConfig,
    /// Seconds between scheduled passes.
    pub pass_interval_secs: u64,
    /// The node's ledger address.
    pub node_address: Address,
    /// Wallet seed the node's channel key is derived from.
    pub node_seed: Option<String>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            orchestrator: OrchestratorConfig::default(),
            pass_interval_secs: 30,
            node_address: "rNode".to_string(),
            node_seed: None,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable was set but could not be parsed.
    #[error("{name}: invalid value `{value}`")]
    InvalidValue { name: &'static str, value: String },

    /// No wallet seed, so the node cannot decrypt anything.
    #[error("NT_NODE_SEED is not set")]
    MissingSeed,

    /// Pass interval of zero.
    #[error("pass interval must be at least one second")]
    ZeroInterval,
}

impl NodeConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(size) = parse_var(&lookup, "NT_MAX_CHUNK_SIZE")? {
            config.orchestrator.codec.max_chunk_size = size;
        }
        if let Some(overhead) = parse_var(&lookup, "NT_CHUNK_OVERHEAD")? {
            config.orchestrator.codec.structural_overhead = overhead;
        }
        if let Some(secs) = parse_var(&lookup, "NT_PASS_INTERVAL_SECS")? {
            config.pass_interval_secs = secs;
        }
        if let Some(limit) = parse_var(&lookup, "NT_PASS_LIMIT")? {
            config.orchestrator.pass_limit = Some(limit);
        }
        if let Some(address) = lookup("NT_NODE_ADDRESS") {
            config.node_address = address;
        }
        config.node_seed = lookup("NT_NODE_SEED");

        let node = config.node_address.clone();
        config.orchestrator.channel.auto_handshake_addresses = vec![node];
        Ok(config)
    }

    /// Check the configuration can start a node.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.node_seed.as_deref().map_or(true, str::is_empty) {
            return Err(ConfigError::MissingSeed);
        }
        if self.pass_interval_secs == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        Ok(())
    }
}

fn parse_var<F, T>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { name, value }),
    }
}
