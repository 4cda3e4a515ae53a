//! Ed25519 elliptic curve operations for Solana

use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;
use rand::RngCore;
use thiserror::Error;

/// Length of an ed25519 seed (the Solana "secret")
pub const SEED_LEN: usize = 32;

/// Length of a Solana keypair (seed || public key)
pub const KEYPAIR_LEN: usize = 64;

#[derive(Error, Debug)]
pub enum Ed25519Error {
    #[error("Entropy source failure: {0}")]
    Entropy(String),
}

/// An Ed25519 keypair for Solana
#[derive(Clone)]
pub struct Ed25519Keypair {
    signing_key: SigningKey,
}

impl Ed25519Keypair {
    /// Generate a new random keypair from the operating system RNG.
    ///
    /// Fails only if the OS entropy source does; callers must not treat
    /// that as a non-matching attempt.
    pub fn generate() -> Result<Self, Ed25519Error> {
        let mut seed = [0u8; SEED_LEN];
        OsRng
            .try_fill_bytes(&mut seed)
            .map_err(|e| Ed25519Error::Entropy(e.to_string()))?;
        Ok(Self::from_seed(&seed))
    }

    /// Create from raw 32-byte seed (private key)
    pub fn from_seed(seed: &[u8; SEED_LEN]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Get the private key seed as bytes (32 bytes)
    pub fn seed_bytes(&self) -> [u8; SEED_LEN] {
        self.signing_key.to_bytes()
    }

    /// Get the full keypair bytes (64 bytes: privkey || pubkey) - Solana format
    pub fn keypair_bytes(&self) -> [u8; KEYPAIR_LEN] {
        self.signing_key.to_keypair_bytes()
    }

    /// Get the public key as bytes (32 bytes)
    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }
}
