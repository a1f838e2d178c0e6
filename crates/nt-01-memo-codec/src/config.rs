//! Configuration for the Memo Codec

use serde::{Deserialize, Serialize};
use shared_types::TokenAmount;

use crate::domain::{CodecError, DistributionPolicy};

/// Codec configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecConfig {
    /// Maximum memo data size per transaction, in bytes.
    pub max_chunk_size: usize,
    /// Bytes reserved for the structure wrapping a chunk in a ledger memo.
    pub structural_overhead: usize,
    /// Smallest amount a single transaction may carry.
    pub min_transfer_unit: TokenAmount,
    /// How amounts are spread over chunks.
    pub distribution_policy: DistributionPolicy,
    /// Chunk identifier format version written and accepted.
    pub identifier_version: u16,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: 900,
            structural_overhead: 140,
            min_transfer_unit: TokenAmount::MIN_UNIT,
            distribution_policy: DistributionPolicy::EvenSplit,
            identifier_version: 1,
        }
    }
}

impl CodecConfig {
    /// Small chunks so tests exercise multi-chunk paths with short payloads.
    pub fn for_testing() -> Self {
        Self {
            max_chunk_size: 96,
            structural_overhead: 16,
            ..Self::default()
        }
    }

    /// Reject settings that leave no room for chunk data.
    pub fn validate(&self) -> Result<(), CodecError> {
        if self.structural_overhead >= self.max_chunk_size {
            return Err(CodecError::OverheadExceedsChunkSize {
                max_chunk_size: self.max_chunk_size,
                overhead: self.structural_overhead,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CodecConfig::default();
        assert_eq!(config.max_chunk_size, 900);
        assert_eq!(config.identifier_version, 1);
        assert_eq!(config.distribution_policy, DistributionPolicy::EvenSplit);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overhead_must_leave_room() {
        let config = CodecConfig {
            structural_overhead: 900,
            ..CodecConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
