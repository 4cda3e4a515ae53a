//! SolVanity Prefix Rules
//!
//! Validation of user supplied prefixes against the base58 alphabet, plus
//! the coarse time estimates shown to users before a search starts.

mod estimate;
mod prefix;

pub use estimate::{estimate, estimate_time_50pct, expected_attempts, format_difficulty, format_duration, TimeEstimate};
pub use prefix::{
    is_base58_char, matches_prefix, validate_prefix, PrefixError, PrefixValidator, BASE58_ALPHABET,
    DEFAULT_MAX_PREFIX_LEN,
};
