//! Keypair generation seam

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use solvanity_crypto::ed25519::{KEYPAIR_LEN, SEED_LEN};
use solvanity_crypto::encoding::base58_encode;
use solvanity_crypto::{hex, Ed25519Error, Ed25519Keypair};

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Entropy source failure: {0}")]
    Entropy(String),
    #[error("Keypair generator failed: {0}")]
    Backend(String),
}

impl From<Ed25519Error> for GenerationError {
    fn from(err: Ed25519Error) -> Self {
        match err {
            Ed25519Error::Entropy(msg) => GenerationError::Entropy(msg),
            other => GenerationError::Backend(other.to_string()),
        }
    }
}

/// A generated keypair: the base58 address plus the 64-byte Solana keypair
/// material (`seed || public key`).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedKeypair {
    address: String,
    keypair_bytes: Vec<u8>,
}

impl GeneratedKeypair {
    /// Build from an ed25519 keypair
    pub fn from_ed25519(keypair: &Ed25519Keypair) -> Self {
        Self {
            address: base58_encode(&keypair.public_key_bytes()),
            keypair_bytes: keypair.keypair_bytes().to_vec(),
        }
    }

    /// Deterministic keypair from a 32-byte seed
    pub fn from_seed(seed: &[u8; SEED_LEN]) -> Self {
        Self::from_ed25519(&Ed25519Keypair::from_seed(seed))
    }

    /// Assemble from an address and raw keypair bytes without checking that
    /// they belong together. Meant for generators that encode addresses
    /// themselves and for test doubles.
    pub fn from_parts(address: impl Into<String>, keypair_bytes: [u8; KEYPAIR_LEN]) -> Self {
        Self {
            address: address.into(),
            keypair_bytes: keypair_bytes.to_vec(),
        }
    }

    /// The base58 public address
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Public key bytes (last 32 bytes of the keypair)
    pub fn public_key_bytes(&self) -> &[u8] {
        &self.keypair_bytes[SEED_LEN..]
    }

    /// Public key in hex format
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key_bytes())
    }

    /// Secret seed bytes (first 32 bytes of the keypair)
    pub fn secret_bytes(&self) -> &[u8] {
        &self.keypair_bytes[..SEED_LEN]
    }

    /// Secret seed in base58, the format users paste into wallets
    pub fn secret_base58(&self) -> String {
        base58_encode(self.secret_bytes())
    }

    /// Full 64-byte keypair
    pub fn keypair_bytes(&self) -> &[u8] {
        &self.keypair_bytes
    }

    /// Keypair as a JSON byte array, the layout `solana-keygen` reads
    pub fn keypair_bytes_json(&self) -> String {
        format!(
            "[{}]",
            self.keypair_bytes
                .iter()
                .map(|b| b.to_string())
                .collect::<Vec<_>>()
                .join(",")
        )
    }
}

impl fmt::Debug for GeneratedKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratedKeypair")
            .field("address", &self.address)
            .field("keypair_bytes", &"<redacted>")
            .finish()
    }
}

/// Source of fresh random keypairs
pub trait KeypairGenerator: Send + Sync {
    /// Generate one keypair with its address already encoded
    fn generate(&self) -> Result<GeneratedKeypair, GenerationError>;
}

impl<G: KeypairGenerator + ?Sized> KeypairGenerator for Arc<G> {
    fn generate(&self) -> Result<GeneratedKeypair, GenerationError> {
        (**self).generate()
    }
}

impl<G: KeypairGenerator + ?Sized> KeypairGenerator for Box<G> {
    fn generate(&self) -> Result<GeneratedKeypair, GenerationError> {
        (**self).generate()
    }
}

/// Solana keypairs from the operating system RNG
#[derive(Debug, Clone, Copy, Default)]
pub struct SolanaKeypairGenerator;

impl KeypairGenerator for SolanaKeypairGenerator {
    fn generate(&self) -> Result<GeneratedKeypair, GenerationError> {
        let keypair = Ed25519Keypair::generate()?;
        Ok(GeneratedKeypair::from_ed25519(&keypair))
    }
}
