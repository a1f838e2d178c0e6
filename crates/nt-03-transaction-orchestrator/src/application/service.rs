//! Transaction Orchestrator Service
//!
//! Drives one pass of the pipeline:
//!
//! ```text
//! fetch unverified ─→ decode chunks ─→ decrypt ─→ classify ─→ store
//!        │                 │              │           │
//!        │           incomplete:     failure:    awaiting
//!        │             defer          record     response:
//!        │                                        defer
//! ```
//!
//! Each `(tx_hash, rule)` result is committed on its own, so an interrupted
//! pass leaves only complete rows behind and the next pass resumes.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use nt_01_memo_codec::{BundleStatus, CodecError, MemoCodecApi, MemoCodecService, MessageBundle};
use nt_02_encryption_channel::{
    is_encrypted, ChannelError, ChannelKeyring, EncryptionChannelApi, EncryptionChannelService,
    HandshakeSource,
};
use serde_json::{json, Value};
use shared_types::{Transaction, TxHash};
use tracing::{debug, info, warn};

use crate::config::OrchestratorConfig;
use crate::domain::{
    InboundMessage, OrchestratorError, PassSummary, ProcessingResult, ResultFilter, RuleSet,
    StoreOutcome, TransactionKind, UnverifiedQuery, CHUNK_ASSEMBLY, MESSAGE_DECRYPTION, NO_RULE,
    PIPELINE_STAGES,
};
use crate::ports::inbound::TransactionProcessingApi;
use crate::ports::outbound::TransactionRepository;

/// A fetched unit of work after decoding and decryption.
#[derive(Debug, Clone, PartialEq)]
pub enum PreparedMessage {
    /// Plaintext message ready for classification.
    Ready(InboundMessage),
    /// Not decodable yet; left for a later pass.
    Deferred {
        /// Transactions left unverified.
        tx_hashes: Vec<TxHash>,
        /// Why.
        reason: String,
    },
    /// Definite failure to be recorded under a pipeline stage.
    Failed {
        /// Transactions the failure is recorded for.
        tx_hashes: Vec<TxHash>,
        /// Pipeline stage name.
        stage: &'static str,
        /// Failure details.
        payload: Value,
    },
}

/// Transaction Orchestrator
///
/// Generic over the repository (which also serves handshake lookups) and the
/// local keyring.
pub struct TransactionOrchestrator<R, K> {
    repository: Arc<R>,
    codec: MemoCodecService,
    channel: EncryptionChannelService<Arc<R>, K>,
    rules: RuleSet,
    config: OrchestratorConfig,
}

impl<R, K> TransactionOrchestrator<R, K>
where
    R: TransactionRepository + HandshakeSource + 'static,
    K: ChannelKeyring,
{
    /// Create an orchestrator with the standard rule set.
    ///
    /// # Errors
    /// `CodecError` if the codec configuration is unusable.
    pub fn new(
        repository: Arc<R>,
        keyring: K,
        config: OrchestratorConfig,
    ) -> Result<Self, CodecError> {
        let codec = MemoCodecService::with_config(config.codec.clone())?;
        let channel = EncryptionChannelService::with_config(
            Arc::clone(&repository),
            keyring,
            config.channel.clone(),
        );
        Ok(Self {
            repository,
            codec,
            channel,
            rules: RuleSet::standard(),
            config,
        })
    }

    /// Replace the rule set.
    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    /// The encryption channel used for decryption.
    pub fn channel(&self) -> &EncryptionChannelService<Arc<R>, K> {
        &self.channel
    }

    /// The chunk codec.
    pub fn codec(&self) -> &MemoCodecService {
        &self.codec
    }

    /// Run a pass with the configured order and limit.
    pub async fn run_scheduled_pass(&self) -> Result<PassSummary, OrchestratorError> {
        self.run_pass(&self.config.pass_query()).await
    }

    /// Decode and decrypt `transactions` into messages, in input order.
    ///
    /// Sibling chunks missing from `transactions` are looked up in the
    /// repository before a group is declared incomplete.
    pub async fn prepare_messages(
        &self,
        transactions: &[Transaction],
    ) -> Result<Vec<PreparedMessage>, OrchestratorError> {
        let position: HashMap<&str, usize> = transactions
            .iter()
            .enumerate()
            .map(|(i, tx)| (tx.hash.as_str(), i))
            .collect();
        let mut known: HashMap<TxHash, Transaction> = transactions
            .iter()
            .map(|tx| (tx.hash.clone(), tx.clone()))
            .collect();

        let report = self.codec.decode_chunks(transactions);
        let mut work: Vec<(usize, PreparedMessage)> = Vec::new();

        for malformed in &report.malformed {
            let at = position.get(malformed.tx_hash.as_str()).copied().unwrap_or(usize::MAX);
            work.push((
                at,
                PreparedMessage::Deferred {
                    tx_hashes: vec![malformed.tx_hash.clone()],
                    reason: malformed.error.to_string(),
                },
            ));
        }

        for hash in &report.standalone {
            let Some(tx) = known.get(hash) else { continue };
            let at = position.get(hash.as_str()).copied().unwrap_or(usize::MAX);
            let prepared = self.prepare_single(tx).await?;
            work.push((at, prepared));
        }

        for bundle in report.bundles {
            let at = bundle
                .contributors
                .iter()
                .filter_map(|h| position.get(h.as_str()).copied())
                .min()
                .unwrap_or(usize::MAX);
            let bundle = match bundle.status() {
                BundleStatus::Incomplete { .. } => self.gather_siblings(bundle, &mut known).await?,
                _ => bundle,
            };
            let prepared = self.prepare_bundle(bundle, &known).await?;
            work.push((at, prepared));
        }

        work.sort_by_key(|(at, _)| *at);
        Ok(work.into_iter().map(|(_, prepared)| prepared).collect())
    }

    /// Re-decode a group from every transaction carrying its memo type.
    async fn gather_siblings(
        &self,
        bundle: MessageBundle,
        known: &mut HashMap<TxHash, Transaction>,
    ) -> Result<MessageBundle, OrchestratorError> {
        let siblings = self
            .repository
            .get_message_transactions(&bundle.sender, &bundle.receiver, &bundle.memo_type)
            .await?;
        let regrouped = self
            .codec
            .decode_chunks(&siblings)
            .bundles
            .into_iter()
            .find(|b| {
                b.identifier == bundle.identifier
                    && b.sender == bundle.sender
                    && b.receiver == bundle.receiver
            });
        for tx in siblings {
            known.entry(tx.hash.clone()).or_insert(tx);
        }

        // Keep the original if the store has not yet caught up with the fetch.
        Ok(match regrouped {
            Some(found) if found.pieces.len() >= bundle.pieces.len() => found,
            _ => bundle,
        })
    }

    /// The message of an unchunked transaction is its handshake memo when it
    /// carries one, otherwise its first memo.
    async fn prepare_single(&self, tx: &Transaction) -> Result<PreparedMessage, OrchestratorError> {
        let (memo_type, data) = tx
            .memos
            .iter()
            .find(|m| m.kind().is_handshake())
            .or_else(|| tx.memos.first())
            .map(|m| (m.memo_type.clone(), m.memo_data.clone()))
            .unwrap_or_default();
        self.decrypt_into_message(tx.clone(), vec![tx.hash.clone()], memo_type, data, None)
            .await
    }

    async fn prepare_bundle(
        &self,
        bundle: MessageBundle,
        known: &HashMap<TxHash, Transaction>,
    ) -> Result<PreparedMessage, OrchestratorError> {
        let tx_hashes: Vec<TxHash> = bundle.contributors.iter().cloned().collect();
        match bundle.status() {
            BundleStatus::Incomplete { missing } => {
                debug!(
                    message_id = %bundle.identifier,
                    ?missing,
                    "Chunk group incomplete, deferring"
                );
                Ok(PreparedMessage::Deferred {
                    tx_hashes,
                    reason: format!("waiting for chunks {:?}", missing),
                })
            }
            BundleStatus::Corrupt(reason) => {
                warn!(message_id = %bundle.identifier, %reason, "Corrupt chunk group");
                Ok(PreparedMessage::Failed {
                    tx_hashes,
                    stage: CHUNK_ASSEMBLY,
                    payload: json!({
                        "reason": "corrupt_chunk_group",
                        "message_id": bundle.identifier.to_string(),
                        "detail": reason,
                    }),
                })
            }
            BundleStatus::Complete => {
                let first = bundle.pieces.values().next().map(|p| p.tx_hash.clone());
                let (Some(body), Some(carrier)) =
                    (bundle.assemble(), first.and_then(|h| known.get(&h)))
                else {
                    return Ok(PreparedMessage::Deferred {
                        tx_hashes,
                        reason: "chunk carrier not available".to_string(),
                    });
                };
                self.decrypt_into_message(
                    carrier.clone(),
                    tx_hashes,
                    bundle.memo_type.clone(),
                    body,
                    Some(bundle.identifier),
                )
                .await
            }
        }
    }

    async fn decrypt_into_message(
        &self,
        transaction: Transaction,
        tx_hashes: Vec<TxHash>,
        memo_type: String,
        data: String,
        message_id: Option<nt_01_memo_codec::ChunkIdentifier>,
    ) -> Result<PreparedMessage, OrchestratorError> {
        let was_encrypted = is_encrypted(&data);
        let body = if was_encrypted {
            match self.decrypt(&transaction, &data).await? {
                Ok(plaintext) => plaintext,
                Err(payload) => {
                    warn!(tx_hash = %transaction.hash, %payload, "Message decryption failed");
                    return Ok(PreparedMessage::Failed {
                        tx_hashes,
                        stage: MESSAGE_DECRYPTION,
                        payload,
                    });
                }
            }
        } else {
            data
        };

        Ok(PreparedMessage::Ready(InboundMessage {
            transaction,
            tx_hashes,
            memo_type,
            body,
            message_id,
            was_encrypted,
        }))
    }

    /// Outer error aborts the pass; inner error is a recordable failure.
    async fn decrypt(
        &self,
        tx: &Transaction,
        data: &str,
    ) -> Result<Result<String, Value>, OrchestratorError> {
        let keyring = self.channel.keyring();
        let (local, counterparty) = if keyring.key_pair(&tx.destination).is_some() {
            (tx.destination.as_str(), tx.account.as_str())
        } else if keyring.key_pair(&tx.account).is_some() {
            (tx.account.as_str(), tx.destination.as_str())
        } else {
            return Ok(Err(json!({
                "reason": "no_local_key",
                "detail": "neither party is a local address",
            })));
        };

        match self.channel.decrypt_from(local, counterparty, data).await {
            Ok(plaintext) => Ok(Ok(plaintext)),
            Err(ChannelError::HandshakeLookup(e)) => Err(OrchestratorError::ChannelLookup(e)),
            Err(ChannelError::ChannelPending { missing }) => Ok(Err(json!({
                "reason": "channel_pending",
                "missing_handshakes": missing,
            }))),
            Err(e) => Ok(Err(json!({
                "reason": "decryption_failed",
                "detail": e.to_string(),
            }))),
        }
    }

    /// Classify a ready message into the result to store, or `None` to defer.
    async fn evaluate(
        &self,
        message: &InboundMessage,
    ) -> Result<Option<(String, bool, Value)>, OrchestratorError> {
        let mut details = json!({
            "memo_type": message.memo_type,
            "encrypted": message.was_encrypted,
            "chunk_count": message.tx_hashes.len(),
        });
        if let Some(id) = &message.message_id {
            details["message_id"] = json!(id.to_string());
        }

        let Some(rule) = self.rules.classify(message) else {
            details["notes"] = json!("no matching pattern");
            return Ok(Some((NO_RULE.to_string(), true, details)));
        };
        let name = rule.name().to_string();
        details["kind"] = json!(rule.kind());

        if !message.transaction.is_successful() {
            details["reason"] = json!("transaction_failed");
            details["transaction_result"] = json!(message.transaction.transaction_result);
            return Ok(Some((name, false, details)));
        }
        if let Err(reason) = rule.validate(message) {
            details["reason"] = json!("validation_failed");
            details["detail"] = json!(reason);
            return Ok(Some((name, false, details)));
        }

        if rule.kind() == TransactionKind::Request {
            if let Some(query) = rule.response_query(message) {
                match self.repository.find_transaction_response(&query).await? {
                    Some(response) => {
                        details["response_tx_hash"] = json!(response.hash);
                    }
                    None => {
                        debug!(
                            tx_hash = %message.transaction.hash,
                            rule = %name,
                            "Request awaiting response, deferring"
                        );
                        return Ok(None);
                    }
                }
            }
        }

        Ok(Some((name, true, details)))
    }

    /// Clear pipeline-stage rows that an outcome under `rule_name` replaces.
    ///
    /// Reprocessing one chunk re-evaluates its whole group, so sibling chunks
    /// may still hold the failure recorded by an earlier pass.
    async fn clear_superseded(
        &self,
        tx_hashes: &[TxHash],
        rule_name: &str,
    ) -> Result<(), OrchestratorError> {
        let mut stale = Vec::new();
        for hash in tx_hashes {
            let rows = self
                .repository
                .get_processing_results(&ResultFilter {
                    tx_hash: Some(hash.clone()),
                    ..Default::default()
                })
                .await?;
            if rows
                .iter()
                .any(|r| r.rule_name != rule_name && PIPELINE_STAGES.contains(&r.rule_name.as_str()))
            {
                stale.push(hash.clone());
            }
        }
        if !stale.is_empty() {
            let removed = self.repository.reprocess_transactions(&stale).await?;
            info!(count = stale.len(), removed, rule = rule_name, "Superseded stale pipeline results");
        }
        Ok(())
    }

    async fn store_all(
        &self,
        tx_hashes: &[TxHash],
        rule_name: &str,
        success: bool,
        payload: &Value,
        summary: &mut PassSummary,
    ) -> Result<(), OrchestratorError> {
        self.clear_superseded(tx_hashes, rule_name).await?;
        for hash in tx_hashes {
            let result = if success {
                ProcessingResult::succeeded(hash, rule_name, payload.clone())
            } else {
                ProcessingResult::failed(hash, rule_name, payload.clone())
            };
            match self.repository.store_processing_result(&result).await? {
                StoreOutcome::Inserted if success => summary.resolved += 1,
                StoreOutcome::Inserted => summary.failed += 1,
                StoreOutcome::AlreadyExists => summary.already_resolved += 1,
            }
            debug!(tx_hash = %hash, rule = rule_name, success, "Stored processing result");
        }
        Ok(())
    }
}

#[async_trait]
impl<R, K> TransactionProcessingApi for TransactionOrchestrator<R, K>
where
    R: TransactionRepository + HandshakeSource + 'static,
    K: ChannelKeyring,
{
    async fn run_pass(&self, query: &UnverifiedQuery) -> Result<PassSummary, OrchestratorError> {
        let transactions = self.repository.get_unverified_transactions(query).await?;
        let mut summary = PassSummary {
            fetched: transactions.len(),
            ..Default::default()
        };
        if transactions.is_empty() {
            debug!("No unverified transactions");
            return Ok(summary);
        }

        for prepared in self.prepare_messages(&transactions).await? {
            match prepared {
                PreparedMessage::Deferred { tx_hashes, reason } => {
                    debug!(count = tx_hashes.len(), %reason, "Deferred");
                    summary.deferred += tx_hashes.len();
                }
                PreparedMessage::Failed {
                    tx_hashes,
                    stage,
                    payload,
                } => {
                    self.store_all(&tx_hashes, stage, false, &payload, &mut summary)
                        .await?;
                }
                PreparedMessage::Ready(message) => match self.evaluate(&message).await? {
                    Some((rule, success, payload)) => {
                        self.store_all(&message.tx_hashes, &rule, success, &payload, &mut summary)
                            .await?;
                    }
                    None => summary.deferred += message.tx_hashes.len(),
                },
            }
        }

        info!(
            fetched = summary.fetched,
            resolved = summary.resolved,
            failed = summary.failed,
            deferred = summary.deferred,
            already_resolved = summary.already_resolved,
            "Processing pass complete"
        );
        Ok(summary)
    }

    async fn reprocess(&self, tx_hashes: &[TxHash]) -> Result<u64, OrchestratorError> {
        let removed = self.repository.reprocess_transactions(tx_hashes).await?;
        info!(requested = tx_hashes.len(), removed, "Cleared results for reprocessing");
        Ok(removed)
    }

    async fn processing_results(
        &self,
        filter: &ResultFilter,
    ) -> Result<Vec<ProcessingResult>, OrchestratorError> {
        Ok(self.repository.get_processing_results(filter).await?)
    }
}
