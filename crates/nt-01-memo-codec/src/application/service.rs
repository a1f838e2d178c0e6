//! Memo Codec Service
//!
//! Main service implementing MemoCodecApi over a validated [`CodecConfig`].

use chrono::{DateTime, Utc};
use shared_types::{Memo, TokenAmount, Transaction};
use tracing::{debug, warn};

use crate::config::CodecConfig;
use crate::domain::{
    self, ChunkIdentifier, CodecError, DecodeReport, DistributionPolicy, OutboundChunk,
};
use crate::ports::inbound::MemoCodecApi;

/// Memo Codec Service
///
/// Stateless apart from its configuration; safe to share across tasks.
#[derive(Debug, Clone)]
pub struct MemoCodecService {
    config: CodecConfig,
}

impl MemoCodecService {
    /// Create a service with the default configuration.
    pub fn new() -> Self {
        Self {
            config: CodecConfig::default(),
        }
    }

    /// Create a service with a custom configuration.
    ///
    /// # Errors
    /// `OverheadExceedsChunkSize` if the configuration leaves no room for data.
    pub fn with_config(config: CodecConfig) -> Result<Self, CodecError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Active configuration.
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    fn policy(&self) -> DistributionPolicy {
        self.config.distribution_policy
    }
}

impl Default for MemoCodecService {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoCodecApi for MemoCodecService {
    fn new_identifier(&self, now: DateTime<Utc>) -> ChunkIdentifier {
        ChunkIdentifier::generate(self.config.identifier_version, now, &mut rand::thread_rng())
    }

    fn encode_chunks(
        &self,
        payload: &str,
        memo_type: &str,
        identifier: &ChunkIdentifier,
    ) -> Result<Vec<Memo>, CodecError> {
        let memos = domain::encode_chunks(
            payload,
            memo_type,
            identifier,
            self.config.max_chunk_size,
            self.config.structural_overhead,
        )?;
        debug!(
            message_id = %identifier,
            chunks = memos.len(),
            payload_bytes = payload.len(),
            "Encoded message into chunks"
        );
        Ok(memos)
    }

    fn decode_chunks(&self, transactions: &[Transaction]) -> DecodeReport {
        let report = domain::decode_chunks(transactions, self.config.identifier_version);
        for malformed in &report.malformed {
            warn!(
                tx_hash = %malformed.tx_hash,
                error = %malformed.error,
                "Unreadable chunk header"
            );
        }
        debug!(
            transactions = transactions.len(),
            bundles = report.bundles.len(),
            complete = report.bundles.iter().filter(|b| b.is_complete()).count(),
            standalone = report.standalone.len(),
            "Decoded chunk groups"
        );
        report
    }

    fn distribute_amount(
        &self,
        total: TokenAmount,
        chunk_count: usize,
    ) -> Result<Vec<TokenAmount>, CodecError> {
        domain::distribute_amount(total, chunk_count, self.policy(), self.config.min_transfer_unit)
    }

    fn plan_outbound(
        &self,
        payload: &str,
        memo_type: &str,
        total: TokenAmount,
        now: DateTime<Utc>,
    ) -> Result<Vec<OutboundChunk>, CodecError> {
        let identifier = self.new_identifier(now);
        let memos = self.encode_chunks(payload, memo_type, &identifier)?;
        let amounts = self.distribute_amount(total, memos.len())?;

        Ok(memos
            .into_iter()
            .zip(amounts)
            .map(|(memo, amount)| OutboundChunk { memo, amount })
            .collect())
    }
}
