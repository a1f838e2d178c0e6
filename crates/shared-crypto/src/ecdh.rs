//! # ECDH Key Agreement (secp256k1)
//!
//! Channel keys published in handshake memos and the shared secret two
//! parties derive from them.
//!
//! ## Security Properties
//!
//! - Commutative: A's secret from B's public key equals B's secret from A's
//! - The raw x-coordinate is never used directly; it is hashed with SHA-256
//! - Secret keys and derived secrets are zeroized on drop

use std::fmt;

use k256::ecdh::diffie_hellman;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::{PublicKey, SecretKey};
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::CryptoError;

/// Compressed secp256k1 public key (33 bytes) as published in a handshake.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct EcdhPublicKey([u8; 33]);

impl EcdhPublicKey {
    /// Create from compressed bytes (33 bytes, starting with 0x02 or 0x03).
    pub fn from_bytes(bytes: [u8; 33]) -> Result<Self, CryptoError> {
        PublicKey::from_sec1_bytes(&bytes)
            .map_err(|_| CryptoError::InvalidPublicKey("not a curve point".to_string()))?;
        Ok(Self(bytes))
    }

    /// Parse the hex form carried in handshake memo data.
    pub fn from_hex(text: &str) -> Result<Self, CryptoError> {
        let raw = hex::decode(text.trim())
            .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))?;
        let bytes: [u8; 33] = raw.as_slice().try_into().map_err(|_| {
            CryptoError::InvalidPublicKey(format!("expected 33 bytes, got {}", raw.len()))
        })?;
        Self::from_bytes(bytes)
    }

    /// Hex form (uppercase, as the ledger tooling prints keys).
    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.0)
    }

    /// Get raw compressed bytes.
    pub fn as_bytes(&self) -> &[u8; 33] {
        &self.0
    }

    fn to_point(self) -> Result<PublicKey, CryptoError> {
        PublicKey::from_sec1_bytes(&self.0)
            .map_err(|_| CryptoError::InvalidPublicKey("not a curve point".to_string()))
    }
}

impl fmt::Debug for EcdhPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EcdhPublicKey({})", self.to_hex())
    }
}

/// 256-bit secret shared by both ends of a channel.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SharedSecret([u8; 32]);

impl SharedSecret {
    /// Create from bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get inner bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl PartialEq for SharedSecret {
    fn eq(&self, other: &Self) -> bool {
        // Fold over every byte so the comparison does not short-circuit.
        self.0
            .iter()
            .zip(other.0.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

impl Eq for SharedSecret {}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedSecret(..)")
    }
}

/// secp256k1 key pair for one end of a channel.
pub struct EcdhKeyPair {
    secret: SecretKey,
}

impl EcdhKeyPair {
    /// Generate random keypair.
    pub fn generate() -> Self {
        Self {
            secret: SecretKey::random(&mut rand::thread_rng()),
        }
    }

    /// Create from secret key bytes (32 bytes).
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, CryptoError> {
        let secret = SecretKey::from_slice(&bytes).map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(Self { secret })
    }

    /// Derive the channel key from a wallet seed string.
    ///
    /// The secret scalar is SHA-256 of the seed, so the same wallet always
    /// publishes the same handshake key.
    pub fn from_seed(seed: &str) -> Result<Self, CryptoError> {
        let mut digest: [u8; 32] = Sha256::digest(seed.as_bytes()).into();
        let pair = Self::from_bytes(digest);
        digest.zeroize();
        pair
    }

    /// Get public key (compressed, 33 bytes).
    pub fn public_key(&self) -> EcdhPublicKey {
        let encoded = self.secret.public_key().to_encoded_point(true);
        let mut bytes = [0u8; 33];
        bytes.copy_from_slice(encoded.as_bytes());
        EcdhPublicKey(bytes)
    }
}

impl fmt::Debug for EcdhKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EcdhKeyPair")
            .field("public_key", &self.public_key())
            .finish_non_exhaustive()
    }
}

/// Derive the shared secret between a local key pair and a remote public key.
pub fn derive_shared_secret(
    remote: &EcdhPublicKey,
    local: &EcdhKeyPair,
) -> Result<SharedSecret, CryptoError> {
    let remote_point = remote.to_point()?;
    let shared = diffie_hellman(local.secret.to_nonzero_scalar(), remote_point.as_affine());
    let digest: [u8; 32] = Sha256::digest(shared.raw_secret_bytes()).into();
    Ok(SharedSecret(digest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_secret_is_commutative() {
        let alice = EcdhKeyPair::generate();
        let bob = EcdhKeyPair::generate();

        let at_alice = derive_shared_secret(&bob.public_key(), &alice).unwrap();
        let at_bob = derive_shared_secret(&alice.public_key(), &bob).unwrap();

        assert_eq!(at_alice, at_bob);
    }

    #[test]
    fn test_different_counterparties_differ() {
        let alice = EcdhKeyPair::generate();
        let bob = EcdhKeyPair::generate();
        let carol = EcdhKeyPair::generate();

        let with_bob = derive_shared_secret(&bob.public_key(), &alice).unwrap();
        let with_carol = derive_shared_secret(&carol.public_key(), &alice).unwrap();

        assert_ne!(with_bob, with_carol);
    }

    #[test]
    fn test_seed_derivation_is_deterministic() {
        let first = EcdhKeyPair::from_seed("sEdTM1uX8pu2do5XvTnutH6HsouMaM2").unwrap();
        let second = EcdhKeyPair::from_seed("sEdTM1uX8pu2do5XvTnutH6HsouMaM2").unwrap();
        assert_eq!(first.public_key(), second.public_key());
    }

    #[test]
    fn test_public_key_hex_roundtrip() {
        let pair = EcdhKeyPair::generate();
        let hex_form = pair.public_key().to_hex();
        assert_eq!(hex_form.len(), 66);
        assert_eq!(EcdhPublicKey::from_hex(&hex_form).unwrap(), pair.public_key());
    }

    #[test]
    fn test_invalid_public_key_rejected() {
        assert!(EcdhPublicKey::from_hex("zz").is_err());
        assert!(EcdhPublicKey::from_hex("02ab").is_err());
        assert!(EcdhPublicKey::from_bytes([0x05; 33]).is_err());
    }

    #[test]
    fn test_zero_secret_rejected() {
        assert!(matches!(
            EcdhKeyPair::from_bytes([0u8; 32]),
            Err(CryptoError::InvalidPrivateKey)
        ));
    }

    proptest::proptest! {
        #[test]
        fn prop_commutative_for_seeded_pairs(a in "[a-zA-Z0-9]{8,32}", b in "[a-zA-Z0-9]{8,32}") {
            let left = EcdhKeyPair::from_seed(&a).unwrap();
            let right = EcdhKeyPair::from_seed(&b).unwrap();
            let x = derive_shared_secret(&right.public_key(), &left).unwrap();
            let y = derive_shared_secret(&left.public_key(), &right).unwrap();
            proptest::prop_assert_eq!(x, y);
        }
    }
}
