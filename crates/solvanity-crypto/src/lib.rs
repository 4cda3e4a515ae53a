//! SolVanity Crypto Primitives
//!
//! Ed25519 keypairs and base58 encoding for Solana vanity address generation.

pub mod ed25519;
pub mod encoding;

pub use self::ed25519::{Ed25519Error, Ed25519Keypair};

// Re-exported for other crates
pub use hex;
