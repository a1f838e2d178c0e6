//! # Pipeline Flows
//!
//! Codec and orchestrator working together on plaintext traffic:
//!
//! 1. Chunked messages reassembled regardless of ledger order
//! 2. Sibling chunks gathered when a pass limit splits a message
//! 3. Exactly one result per `(tx_hash, rule)` across reruns and reprocessing
//! 4. A full task workflow resolved request by response

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use nt_01_memo_codec::MemoCodecApi;
    use nt_03_transaction_orchestrator::{
        OrchestratorConfig, PreparedMessage, ResultFilter, TransactionProcessingApi,
        TransactionRepository, UnverifiedQuery,
    };
    use serde_json::json;
    use shared_types::{Memo, TokenAmount};

    use crate::integration::fixtures::*;

    /// 120 characters; three 50-character pieces under the test codec config.
    fn three_chunk_body() -> String {
        format!("{:<120}", "ACCEPTANCE REASON ___ I can take this on this week.")
    }

    fn chunk_memos(orchestrator: &Orchestrator, body: &str) -> Vec<Memo> {
        let codec = orchestrator.codec();
        let id = codec.new_identifier(at(0));
        codec.encode_chunks(body, TASK_ID, &id).unwrap()
    }

    async fn rules_for(orchestrator: &Orchestrator, hash: &str) -> Vec<(String, bool)> {
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

    // =========================================================================
    // CHUNKING
    // =========================================================================

    #[tokio::test]
    async fn test_out_of_order_chunks_reassemble() {
        let (repo, orchestrator) = node();
        let body = three_chunk_body();
        let memos = chunk_memos(&orchestrator, &body);
        assert_eq!(memos.len(), 3);

        // Chunk 3 lands first on the ledger, chunk 1 last.
        for (i, memo) in memos.iter().enumerate() {
            repo.insert_transaction(tx(&format!("C{}", i + 1), USER, NODE, 30 - i as u32, memo.clone()));
        }

        let fetched = repo
            .get_unverified_transactions(&UnverifiedQuery::default())
            .await
            .unwrap();
        assert_eq!(fetched[0].hash, "C3");

        let prepared = orchestrator.prepare_messages(&fetched).await.unwrap();
        assert_eq!(prepared.len(), 1);
        let PreparedMessage::Ready(message) = &prepared[0] else {
            panic!("expected a ready message, got {:?}", prepared[0]);
        };
        assert_eq!(message.body, body);
        assert_eq!(message.tx_hashes.len(), 3);

        let summary = orchestrator.run_pass(&UnverifiedQuery::default()).await.unwrap();
        assert_eq!(summary.resolved, 3);
        for hash in ["C1", "C2", "C3"] {
            assert_eq!(rules_for(&orchestrator, hash).await, vec![("acceptance".to_string(), true)]);
        }
    }

    #[tokio::test]
    async fn test_pass_limit_gathers_sibling_chunks() {
        let (repo, orchestrator) = node_with(OrchestratorConfig {
            pass_limit: Some(1),
            ..OrchestratorConfig::for_testing()
        });
        let memos = chunk_memos(&orchestrator, &three_chunk_body());
        for (i, memo) in memos.iter().enumerate() {
            repo.insert_transaction(tx(&format!("C{}", i + 1), USER, NODE, i as u32 + 1, memo.clone()));
        }

        let summary = orchestrator.run_scheduled_pass().await.unwrap();
        assert_eq!(summary.fetched, 1);
        assert_eq!(summary.resolved, 3);

        let next = orchestrator.run_scheduled_pass().await.unwrap();
        assert_eq!(next.fetched, 0);
    }

    #[tokio::test]
    async fn test_missing_chunk_defers_whole_message() {
        let (repo, orchestrator) = node();
        let memos = chunk_memos(&orchestrator, &three_chunk_body());
        repo.insert_transaction(tx("C1", USER, NODE, 1, memos[0].clone()));
        repo.insert_transaction(tx("C3", USER, NODE, 3, memos[2].clone()));

        let summary = orchestrator.run_pass(&UnverifiedQuery::default()).await.unwrap();
        assert_eq!(summary.deferred, 2);
        assert!(repo.result_rows().is_empty());

        repo.insert_transaction(tx("C2", USER, NODE, 2, memos[1].clone()));
        let summary = orchestrator.run_pass(&UnverifiedQuery::default()).await.unwrap();
        assert_eq!(summary.resolved, 3);
    }

    #[test]
    fn test_even_split_over_three_chunks() {
        let (_, orchestrator) = node();
        let total: TokenAmount = "10".parse().unwrap();

        let amounts = orchestrator.codec().distribute_amount(total, 3).unwrap();
        let expected: Vec<TokenAmount> = ["3.333333", "3.333333", "3.333334"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        assert_eq!(amounts, expected);

        let planned = orchestrator
            .codec()
            .plan_outbound(&three_chunk_body(), TASK_ID, total, Utc::now())
            .unwrap();
        assert_eq!(planned.len(), 3);
        let sum = planned
            .iter()
            .try_fold(TokenAmount::ZERO, |acc, chunk| acc.checked_add(chunk.amount))
            .unwrap();
        assert_eq!(sum, total);
    }

    // =========================================================================
    // EXACTLY-ONCE
    // =========================================================================

    #[tokio::test]
    async fn test_reprocess_does_not_duplicate() {
        let (repo, orchestrator) = node();
        repo.insert_transaction(tx("T1", USER, NODE, 1, task_memo("REFUSAL REASON ___ too busy")));
        repo.insert_transaction(tx("T2", USER, NODE, 2, Memo::new("misc", "text/plain", "hello")));

        orchestrator.run_pass(&UnverifiedQuery::default()).await.unwrap();
        assert_eq!(repo.result_rows().len(), 2);

        // Overlapping passes over the full set store nothing new.
        let forced = UnverifiedQuery {
            include_processed: true,
            ..Default::default()
        };
        let (a, b) = tokio::join!(orchestrator.run_pass(&forced), orchestrator.run_pass(&forced));
        assert!(!a.unwrap().stored_any());
        assert!(!b.unwrap().stored_any());
        assert_eq!(repo.result_rows().len(), 2);

        assert_eq!(orchestrator.reprocess(&["T1".to_string()]).await.unwrap(), 1);
        let summary = orchestrator.run_pass(&UnverifiedQuery::default()).await.unwrap();
        assert_eq!(summary.fetched, 1);
        assert_eq!(summary.resolved, 1);
        assert_eq!(repo.result_rows().len(), 2);
        assert_eq!(rules_for(&orchestrator, "T1").await, vec![("refusal".to_string(), true)]);
    }

    // =========================================================================
    // TASK WORKFLOW
    // =========================================================================

    #[tokio::test]
    async fn test_full_task_workflow() {
        let (repo, orchestrator) = node();
        let steps = [
            ("REQ", USER, NODE, "REQUEST_POST_FIAT ___ Give me a documentation task"),
            ("PROP", NODE, USER, "PROPOSED PF ___ Write the deployment guide .. 900"),
            ("ACC", USER, NODE, "ACCEPTANCE REASON ___ On it"),
            ("OUT", USER, NODE, "COMPLETION JUSTIFICATION ___ Guide merged"),
            ("PROMPT", NODE, USER, "VERIFICATION PROMPT ___ Link the merged PR"),
            ("VRESP", USER, NODE, "VERIFICATION RESPONSE ___ https://example.com/pr/1"),
            ("REWARD", NODE, USER, "REWARD RESPONSE __ 850 PFT for a clear guide"),
        ];
        for (i, (hash, from, to, body)) in steps.iter().enumerate() {
            repo.insert_transaction(tx(hash, from, to, i as u32 + 1, task_memo(body)));
        }

        let summary = orchestrator.run_pass(&UnverifiedQuery::default()).await.unwrap();
        assert_eq!(summary.resolved, steps.len());
        assert_eq!(summary.deferred, 0);

        let pairs = [("REQ", "PROP"), ("OUT", "PROMPT"), ("VRESP", "REWARD")];
        for (request, response) in pairs {
            let results = orchestrator
                .processing_results(&ResultFilter {
                    tx_hash: Some(request.to_string()),
                    ..Default::default()
                })
                .await
                .unwrap();
            assert_eq!(results[0].payload["response_tx_hash"], json!(response), "{}", request);
        }
    }

    #[tokio::test]
    async fn test_initiation_rite_waits_for_reward() {
        let (repo, orchestrator) = node();
        repo.insert_transaction(tx(
            "RITE",
            USER,
            NODE,
            1,
            Memo::new("INITIATION_RITE", "text/plain", "I commit to building useful tools"),
        ));

        let first = orchestrator.run_pass(&UnverifiedQuery::default()).await.unwrap();
        assert_eq!(first.deferred, 1);

        repo.insert_transaction(tx(
            "GRANT",
            NODE,
            USER,
            2,
            Memo::new("INITIATION_REWARD", "text/plain", "Welcome"),
        ));
        let second = orchestrator.run_pass(&UnverifiedQuery::default()).await.unwrap();
        assert_eq!(second.resolved, 2);
        assert_eq!(rules_for(&orchestrator, "RITE").await, vec![("initiation_rite".to_string(), true)]);
        assert_eq!(rules_for(&orchestrator, "GRANT").await, vec![("initiation_reward".to_string(), true)]);
    }
}
