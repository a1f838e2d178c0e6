//! # Channel Flows
//!
//! Encrypted traffic through the whole pipeline:
//!
//! 1. Encrypted, chunked message decrypted after reassembly
//! 2. Message sent before the node's handshake recorded as a decryption
//!    failure, then recovered by reprocessing
//! 3. Decrypted verification response handed to reward arbitration

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use nt_01_memo_codec::MemoCodecApi;
    use nt_02_encryption_channel::{
        derive_shared_secret, encrypt_message, handshake_memo, EcdhKeyPair, EncryptionChannelApi,
        EncryptionChannelService, StaticKeyring,
    };
    use nt_03_transaction_orchestrator::{
        ArbitrationError, ArbitrationService, PreparedMessage, ResultFilter, RewardArbiter,
        TaskContext, TransactionProcessingApi, TransactionRepository, UnverifiedQuery,
        MESSAGE_DECRYPTION,
    };
    use serde_json::json;
    use shared_types::Memo;

    use crate::integration::fixtures::*;

    fn user_keys() -> EcdhKeyPair {
        EcdhKeyPair::from_seed("integration-user-seed").unwrap()
    }

    fn insert_handshakes(repo: &nt_03_transaction_orchestrator::InMemoryTransactionRepository) {
        repo.insert_transaction(tx("HS_USER", USER, NODE, 1, handshake_memo(&user_keys().public_key())));
        repo.insert_transaction(tx("HS_NODE", NODE, USER, 2, handshake_memo(&node_keys().public_key())));
    }

    fn insert_chunks(
        repo: &nt_03_transaction_orchestrator::InMemoryTransactionRepository,
        orchestrator: &Orchestrator,
        sealed: &str,
        first_second: u32,
    ) -> Vec<String> {
        let codec = orchestrator.codec();
        let id = codec.new_identifier(at(first_second));
        let memos = codec.encode_chunks(sealed, TASK_ID, &id).unwrap();
        memos
            .into_iter()
            .enumerate()
            .map(|(i, memo)| {
                let hash = format!("E{}", i + 1);
                repo.insert_transaction(tx(&hash, USER, NODE, first_second + i as u32, memo));
                hash
            })
            .collect()
    }

    async fn results_for(orchestrator: &Orchestrator, hash: &str) -> Vec<(String, bool)> {
        orchestrator
            .processing_results(&ResultFilter {
                tx_hash: Some(hash.to_string()),
                ..Default::default()
            })
            .await
            .unwrap()
            .into_iter()
            .map(|r| (r.rule_name, r.success))
            .collect()
    }

    #[tokio::test]
    async fn test_encrypted_chunked_message_end_to_end() {
        let (repo, orchestrator) = node();
        insert_handshakes(&repo);

        // The participant encrypts through their own channel service.
        let user_side = EncryptionChannelService::new(
            Arc::clone(&repo),
            StaticKeyring::new().with_key(USER, user_keys()),
        );
        let body = format!("ACCEPTANCE REASON ___ {}", "Ready to start today. ".repeat(4));
        let sealed = user_side.encrypt_for(USER, NODE, &body).await.unwrap();
        let hashes = insert_chunks(&repo, &orchestrator, &sealed, 10);
        assert!(hashes.len() > 1);

        let summary = orchestrator.run_pass(&UnverifiedQuery::default()).await.unwrap();
        assert_eq!(summary.resolved, hashes.len() + 2);

        for hash in &hashes {
            assert_eq!(results_for(&orchestrator, hash).await, vec![("acceptance".to_string(), true)]);
        }
        let rows = orchestrator
            .processing_results(&ResultFilter {
                tx_hash: Some(hashes[0].clone()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(rows[0].payload["encrypted"], json!(true));
        assert_eq!(rows[0].payload["chunk_count"], json!(hashes.len()));
    }

    #[tokio::test]
    async fn test_message_before_node_handshake_recovers_on_reprocess() {
        let (repo, orchestrator) = node();
        repo.insert_transaction(tx("HS_USER", USER, NODE, 1, handshake_memo(&user_keys().public_key())));

        // The participant already knows the node's key from elsewhere.
        let secret = derive_shared_secret(&node_keys().public_key(), &user_keys()).unwrap();
        let sealed = encrypt_message("REFUSAL REASON ___ Not my area", &secret).unwrap();
        let hashes = insert_chunks(&repo, &orchestrator, &sealed, 10);

        let first = orchestrator.run_pass(&UnverifiedQuery::default()).await.unwrap();
        assert_eq!(first.failed, hashes.len());
        let failures = orchestrator
            .processing_results(&ResultFilter {
                rule_name: Some(MESSAGE_DECRYPTION.to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(failures.len(), hashes.len());
        assert_eq!(failures[0].payload["reason"], json!("channel_pending"));
        assert_eq!(failures[0].payload["missing_handshakes"], json!([NODE]));

        repo.insert_transaction(tx("HS_NODE", NODE, USER, 40, handshake_memo(&node_keys().public_key())));
        orchestrator.reprocess(&hashes).await.unwrap();
        orchestrator.run_pass(&UnverifiedQuery::default()).await.unwrap();

        for hash in &hashes {
            assert_eq!(results_for(&orchestrator, hash).await, vec![("refusal".to_string(), true)]);
        }
        assert_eq!(
            results_for(&orchestrator, "HS_USER").await,
            vec![("handshake".to_string(), true)]
        );
    }

    struct FixedArbiter(&'static str);

    #[async_trait]
    impl RewardArbiter for FixedArbiter {
        async fn evaluate(&self, rendered_request: &str) -> Result<String, ArbitrationError> {
            if !rendered_request.contains("https://example.com/pr/7") {
                return Err(ArbitrationError::MalformedResponse("evidence missing".to_string()));
            }
            Ok(self.0.to_string())
        }
    }

    #[tokio::test]
    async fn test_decrypted_verification_feeds_arbitration() {
        let (repo, orchestrator) = node();
        insert_handshakes(&repo);

        let secret = derive_shared_secret(&node_keys().public_key(), &user_keys()).unwrap();
        let sealed =
            encrypt_message("VERIFICATION RESPONSE ___ https://example.com/pr/7", &secret).unwrap();
        repo.insert_transaction(tx("VRESP", USER, NODE, 10, Memo::new(TASK_ID, "text/plain", sealed)));

        let pending = repo
            .get_unverified_transactions(&UnverifiedQuery::default())
            .await
            .unwrap();
        let message = orchestrator
            .prepare_messages(&pending)
            .await
            .unwrap()
            .into_iter()
            .find_map(|prepared| match prepared {
                PreparedMessage::Ready(m) if m.transaction.hash == "VRESP" => Some(m),
                _ => None,
            })
            .unwrap();
        assert!(message.was_encrypted);

        let request = ArbitrationService::<FixedArbiter>::request_for(
            &message,
            TaskContext {
                task_description: "Ship the indexer fix".to_string(),
                verification_question: "Link the PR".to_string(),
                proposed_reward: 1_000,
                ..Default::default()
            },
        );
        assert_eq!(request.verification_response, "https://example.com/pr/7");

        let arbiter = ArbitrationService::new(FixedArbiter(
            "| Summary Judgment | Fix merged with tests. |\n| Total PFT Rewarded | 950 |",
        ));
        let decision = arbiter.arbitrate(&request).await.unwrap();
        assert_eq!(decision.reward, 950);
        assert!(!decision.is_suspicious());

        // The verification response itself waits for the node's reward memo.
        let summary = orchestrator.run_pass(&UnverifiedQuery::default()).await.unwrap();
        assert_eq!(summary.deferred, 1);
    }
}
