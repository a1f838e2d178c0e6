//! Configuration for the Transaction Orchestrator

use nt_01_memo_codec::CodecConfig;
use nt_02_encryption_channel::ChannelConfig;
use serde::{Deserialize, Serialize};

use crate::domain::{OrderBy, UnverifiedQuery};

/// Orchestrator configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Chunk codec settings.
    pub codec: CodecConfig,
    /// Encryption channel settings.
    pub channel: ChannelConfig,
    /// Fetch order for scheduled passes.
    pub order_by: OrderBy,
    /// Maximum transactions fetched per scheduled pass.
    pub pass_limit: Option<usize>,
}

impl OrchestratorConfig {
    /// Small chunks, auto-handshake on `rNode`, no pass limit.
    pub fn for_testing() -> Self {
        Self {
            codec: CodecConfig::for_testing(),
            channel: ChannelConfig::for_testing(),
            ..Self::default()
        }
    }

    /// Query used by scheduled passes.
    pub fn pass_query(&self) -> UnverifiedQuery {
        UnverifiedQuery {
            order_by: self.order_by,
            limit: self.pass_limit,
            include_processed: false,
        }
    }
}
