//! SolVanity Core Engine
//!
//! Prefix search over freshly generated Solana keypairs, with cooperative
//! cancellation, non-blocking progress reporting and a per-owner registry
//! for dispatch layers that run many searches at once.

mod cancel;
mod handle;
mod keypair;
mod outcome;
mod progress;
mod registry;
mod search;

pub use cancel::CancellationToken;
pub use handle::{SearchHandle, SearchStatus};
pub use keypair::{GeneratedKeypair, GenerationError, KeypairGenerator, SolanaKeypairGenerator};
pub use outcome::{OutcomeKind, SearchOutcome, SearchSummary};
pub use progress::{progress_channel, ChannelProgress, LogProgress, NoProgress, ProgressReport, ProgressSink, PROGRESS_INTERVAL};
pub use registry::{GenerationStats, LogEntry, LogResult, RegistryError, SearchRegistry, SearchTicket, MAX_LOG_ENTRIES};
pub use search::{SearchConfig, SearchError, VanitySearch};

// Re-exports for convenience
pub use solvanity_pattern::{
    estimate, estimate_time_50pct, expected_attempts, format_difficulty, format_duration, validate_prefix, PrefixError,
    PrefixValidator, TimeEstimate, BASE58_ALPHABET, DEFAULT_MAX_PREFIX_LEN,
};
