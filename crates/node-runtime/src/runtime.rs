//! Node runtime: scheduled processing passes over the local repository.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use nt_02_encryption_channel::{EncryptionChannelApi, StaticKeyring};
use nt_03_transaction_orchestrator::{
    InMemoryTransactionRepository, PassSummary, TransactionOrchestrator, TransactionRepository,
    UnverifiedQuery,
};
use parking_lot::Mutex;
use shared_types::{Address, Memo, TxHash};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::config::NodeConfig;

/// Orchestrator wired to the in-memory repository and static keyring.
pub type NodeOrchestrator = TransactionOrchestrator<InMemoryTransactionRepository, StaticKeyring>;

/// A memo the node wants sent. Submission happens outside the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMemo {
    /// Recipient.
    pub destination: Address,
    /// Memo to attach.
    pub memo: Memo,
    /// Transaction that prompted it.
    pub in_reply_to: TxHash,
}

/// The node runtime.
pub struct NodeRuntime {
    config: NodeConfig,
    repository: Arc<InMemoryTransactionRepository>,
    orchestrator: NodeOrchestrator,
    outbox: Mutex<Vec<OutboundMemo>>,
    answered: Mutex<HashSet<TxHash>>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl NodeRuntime {
    /// Wire repository, keyring and orchestrator from `config`.
    pub fn new(config: NodeConfig) -> Result<Self> {
        config.validate().context("Invalid node configuration")?;
        let seed = config.node_seed.as_deref().unwrap_or_default();
        let keyring = StaticKeyring::from_seeds([(config.node_address.as_str(), seed)])
            .context("Failed to derive node channel key")?;

        let repository = Arc::new(InMemoryTransactionRepository::new());
        let orchestrator = TransactionOrchestrator::new(
            Arc::clone(&repository),
            keyring,
            config.orchestrator.clone(),
        )
        .context("Failed to create orchestrator")?;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Ok(Self {
            config,
            repository,
            orchestrator,
            outbox: Mutex::new(Vec::new()),
            answered: Mutex::new(HashSet::new()),
            shutdown_tx,
            shutdown_rx,
        })
    }

    /// The repository the ledger feed writes into.
    pub fn repository(&self) -> Arc<InMemoryTransactionRepository> {
        Arc::clone(&self.repository)
    }

    /// The orchestrator.
    pub fn orchestrator(&self) -> &NodeOrchestrator {
        &self.orchestrator
    }

    /// Run one pass, then queue replies to unanswered handshakes.
    pub async fn run_once(&self) -> Result<PassSummary> {
        let summary = self
            .orchestrator
            .run_scheduled_pass()
            .await
            .context("Processing pass failed")?;
        self.queue_handshake_replies()
            .await
            .context("Handshake reply check failed")?;
        Ok(summary)
    }

    async fn queue_handshake_replies(&self) -> Result<()> {
        let node = self.config.node_address.as_str();
        let pending = self
            .repository
            .get_unverified_transactions(&UnverifiedQuery::default())
            .await?;

        for tx in pending.iter().filter(|tx| {
            tx.destination == node && tx.memos.iter().any(|m| m.kind().is_handshake())
        }) {
            if self.answered.lock().contains(&tx.hash) {
                continue;
            }
            if !self.orchestrator.channel().should_auto_respond(tx).await? {
                continue;
            }
            let memo = self.orchestrator.channel().build_handshake_memo(node)?;
            self.answered.lock().insert(tx.hash.clone());
            self.outbox.lock().push(OutboundMemo {
                destination: tx.account.clone(),
                memo,
                in_reply_to: tx.hash.clone(),
            });
            info!(counterparty = %tx.account, tx_hash = %tx.hash, "Queued handshake reply");
        }
        Ok(())
    }

    /// Drain memos waiting to be sent.
    pub fn take_outbox(&self) -> Vec<OutboundMemo> {
        std::mem::take(&mut *self.outbox.lock())
    }

    /// Run passes on the configured interval until [`shutdown`](Self::shutdown).
    ///
    /// A failed pass is logged and retried on the next tick.
    pub async fn run(&self) {
        let period = Duration::from_secs(self.config.pass_interval_secs);
        let mut ticker = tokio::time::interval(period);
        let mut shutdown = self.shutdown_rx.clone();
        info!(interval_secs = self.config.pass_interval_secs, "Pass loop started");

        loop {
            tokio::select! {
                _ = ticker.tick() => match self.run_once().await {
                    Ok(summary) if summary.stored_any() => debug!(?summary, "Pass stored results"),
                    Ok(_) => {}
                    Err(e) => warn!(error = %e, "Pass failed, retrying next tick"),
                },
                _ = shutdown.changed() => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }
    }

    /// Stop the pass loop.
    pub fn shutdown(&self) {
        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }
    }
}
