//! # Handshakes
//!
//! A handshake is a successful transaction whose memo type is `HANDSHAKE`
//! (or `<id>_HANDSHAKE`) and whose memo data is the sender's compressed
//! ECDH public key in hex. Each direction of a pair is tracked on its own;
//! the latest handshake in ledger order wins.

use shared_crypto::{EcdhPublicKey, SharedSecret};
use shared_types::{Address, Memo, SystemMemoType, Transaction, TxHash};
use tracing::warn;

/// Memo format written on handshake memos.
pub const HANDSHAKE_MEMO_FORMAT: &str = "text/plain";

/// A public key published by `sender` for `receiver`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeRecord {
    /// Carrying transaction.
    pub tx_hash: TxHash,
    /// Publishing address.
    pub sender: Address,
    /// Address the key was published to.
    pub receiver: Address,
    /// Published key.
    pub public_key: EcdhPublicKey,
}

/// Extract the handshake carried by `tx`, if any.
///
/// Failed transactions and unparsable keys yield `None`.
pub fn parse_handshake(tx: &Transaction) -> Option<HandshakeRecord> {
    if !tx.is_successful() {
        return None;
    }
    let memo = tx.memos.iter().find(|m| m.kind().is_handshake())?;
    match EcdhPublicKey::from_hex(&memo.memo_data) {
        Ok(public_key) => Some(HandshakeRecord {
            tx_hash: tx.hash.clone(),
            sender: tx.account.clone(),
            receiver: tx.destination.clone(),
            public_key,
        }),
        Err(e) => {
            warn!(tx_hash = %tx.hash, error = %e, "Ignoring handshake with invalid key");
            None
        }
    }
}

/// Latest key each side of `(a, b)` published to the other.
///
/// Returns `(key published by a, key published by b)`.
pub fn latest_keys(
    transactions: &[Transaction],
    a: &str,
    b: &str,
) -> (Option<EcdhPublicKey>, Option<EcdhPublicKey>) {
    let mut ordered: Vec<&Transaction> = transactions.iter().collect();
    ordered.sort_by(|x, y| x.ordering_key().cmp(&y.ordering_key()));

    let mut from_a = None;
    let mut from_b = None;
    for record in ordered.into_iter().filter_map(parse_handshake) {
        if record.sender == a && record.receiver == b {
            from_a = Some(record.public_key);
        } else if record.sender == b && record.receiver == a {
            from_b = Some(record.public_key);
        }
    }
    (from_a, from_b)
}

/// Handshake memo publishing `public_key`.
pub fn handshake_memo(public_key: &EcdhPublicKey) -> Memo {
    Memo::new(
        SystemMemoType::Handshake.as_str(),
        HANDSHAKE_MEMO_FORMAT,
        public_key.to_hex(),
    )
}

/// State of the channel between a local and a remote address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelResolution {
    /// Both handshakes observed; the secret is ready.
    Established(SharedSecret),
    /// Waiting on handshakes from the listed addresses.
    Pending {
        /// Addresses that have not yet published a key to the other side.
        missing: Vec<Address>,
    },
}

impl ChannelResolution {
    /// The shared secret, if established.
    pub fn secret(&self) -> Option<&SharedSecret> {
        match self {
            ChannelResolution::Established(secret) => Some(secret),
            ChannelResolution::Pending { .. } => None,
        }
    }
}
