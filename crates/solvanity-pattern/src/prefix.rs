//! Prefix validation and matching

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The base58 alphabet used by Solana addresses. `0`, `O`, `I` and `l` are absent.
pub const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Longest prefix accepted unless the caller configures otherwise
pub const DEFAULT_MAX_PREFIX_LEN: usize = 8;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PrefixError {
    #[error("Prefix cannot be empty")]
    Empty,
    #[error("Prefix cannot be longer than {max} characters (got {len})")]
    TooLong { len: usize, max: usize },
    #[error("Invalid characters in prefix: {}", join_chars(.0))]
    InvalidCharacters(BTreeSet<char>),
}

fn join_chars(chars: &BTreeSet<char>) -> String {
    chars
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Check whether a character belongs to the base58 alphabet
pub fn is_base58_char(c: char) -> bool {
    BASE58_ALPHABET.contains(c)
}

/// Byte-exact prefix match; no case folding.
pub fn matches_prefix(address: &str, prefix: &str) -> bool {
    address.as_bytes().starts_with(prefix.as_bytes())
}

/// Validates prefixes against the alphabet and a maximum length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefixValidator {
    max_len: usize,
}

impl Default for PrefixValidator {
    fn default() -> Self {
        Self {
            max_len: DEFAULT_MAX_PREFIX_LEN,
        }
    }
}

impl PrefixValidator {
    /// Create a validator with a custom maximum length
    pub fn new(max_len: usize) -> Self {
        Self { max_len }
    }

    /// Maximum accepted length in characters
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Validate a prefix.
    ///
    /// Emptiness is checked first, then length, then the alphabet. The
    /// `InvalidCharacters` variant lists every offending character once.
    pub fn validate(&self, prefix: &str) -> Result<(), PrefixError> {
        if prefix.is_empty() {
            return Err(PrefixError::Empty);
        }

        let len = prefix.chars().count();
        if len > self.max_len {
            return Err(PrefixError::TooLong {
                len,
                max: self.max_len,
            });
        }

        let invalid: BTreeSet<char> = prefix.chars().filter(|c| !is_base58_char(*c)).collect();
        if !invalid.is_empty() {
            return Err(PrefixError::InvalidCharacters(invalid));
        }

        Ok(())
    }
}

/// Validate with the default maximum length
pub fn validate_prefix(prefix: &str) -> Result<(), PrefixError> {
    PrefixValidator::default().validate(prefix)
}
