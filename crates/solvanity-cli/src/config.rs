//! Runtime settings, taken from flags or the environment

use clap::Args;
use solvanity_core::{PrefixValidator, SearchConfig, DEFAULT_MAX_PREFIX_LEN, PROGRESS_INTERVAL};

/// Attempts allowed per search unless configured otherwise
pub const DEFAULT_MAX_ATTEMPTS: u64 = 1_000_000;

/// Cluster label printed next to results
pub const DEFAULT_NETWORK: &str = "mainnet-beta";

#[derive(Debug, Clone, Args)]
pub struct Settings {
    /// Maximum keypairs to generate before giving up
    #[arg(long, env = "SOLVANITY_MAX_ATTEMPTS", default_value_t = DEFAULT_MAX_ATTEMPTS)]
    pub max_attempts: u64,

    /// Longest prefix accepted
    #[arg(long, env = "SOLVANITY_MAX_PREFIX_LENGTH", default_value_t = DEFAULT_MAX_PREFIX_LEN)]
    pub max_prefix_length: usize,

    /// Solana cluster the keypair is meant for (devnet, testnet, mainnet-beta)
    #[arg(long, env = "SOLANA_NETWORK", default_value = DEFAULT_NETWORK)]
    pub network: String,

    /// Worker threads per search (0 = all cores)
    #[arg(long, env = "SOLVANITY_THREADS", default_value_t = 1)]
    pub threads: usize,
}

impl Settings {
    pub fn validator(&self) -> PrefixValidator {
        PrefixValidator::new(self.max_prefix_length)
    }

    pub fn search_config(&self) -> SearchConfig {
        SearchConfig {
            threads: self.threads,
            progress_interval: PROGRESS_INTERVAL,
        }
    }

    /// Resolved thread count, for display
    pub fn thread_count(&self) -> usize {
        if self.threads == 0 {
            num_cpus::get()
        } else {
            self.threads
        }
    }
}
