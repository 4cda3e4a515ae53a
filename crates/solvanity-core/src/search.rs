//! Vanity search engine

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::bounded;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use solvanity_pattern::matches_prefix;

use crate::cancel::CancellationToken;
use crate::handle::SearchHandle;
use crate::keypair::{GeneratedKeypair, GenerationError, KeypairGenerator};
use crate::outcome::SearchOutcome;
use crate::progress::{NoProgress, ProgressReport, ProgressSink, PROGRESS_INTERVAL};

/// Search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Worker threads per search (0 = one per core, 1 = sequential)
    pub threads: usize,
    /// Attempts between progress reports (0 = never report)
    pub progress_interval: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            threads: 1,
            progress_interval: PROGRESS_INTERVAL,
        }
    }
}

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Keypair generation failed on attempt {attempts}: {source}")]
    Generation {
        attempts: u64,
        #[source]
        source: GenerationError,
    },
}

/// Vanity search engine.
///
/// Holds no per-search state: every call to [`VanitySearch::search`] gets a
/// fresh [`SearchHandle`], so one engine can serve many concurrent searches.
pub struct VanitySearch<G> {
    generator: G,
    progress: Arc<dyn ProgressSink>,
    config: SearchConfig,
}

impl<G: KeypairGenerator> VanitySearch<G> {
    /// Create a sequential search with no progress reporting
    pub fn new(generator: G) -> Self {
        Self {
            generator,
            progress: Arc::new(NoProgress),
            config: SearchConfig::default(),
        }
    }

    pub fn with_config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    /// Send progress samples to `sink`
    pub fn with_progress(mut self, sink: impl ProgressSink + 'static) -> Self {
        self.progress = Arc::new(sink);
        self
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Search for an address starting with `prefix` (exact, case-sensitive).
    ///
    /// Returns an outcome for every normal ending; only a failing generator
    /// produces an error.
    ///
    /// # Panics
    /// If `prefix` is empty. Validate user input before calling.
    pub fn search(
        &self,
        prefix: &str,
        max_attempts: u64,
        cancel: &CancellationToken,
    ) -> Result<SearchOutcome, SearchError> {
        let handle = SearchHandle::new(prefix, cancel.clone());
        self.run(&handle, max_attempts)
    }

    /// Run a search on a caller-provided handle, so other threads can watch
    /// its attempt counter or cancel it.
    ///
    /// # Panics
    /// If the handle's prefix is empty or the handle was used before.
    pub fn run(&self, handle: &SearchHandle, max_attempts: u64) -> Result<SearchOutcome, SearchError> {
        assert!(!handle.prefix().is_empty(), "vanity search requires a non-empty prefix");
        handle.begin();

        let threads = self.worker_count();
        info!(
            "Searching for address starting with {} (max {} attempts, {} thread(s))",
            handle.prefix(),
            max_attempts,
            threads
        );

        let result = if threads > 1 {
            self.run_parallel(handle, max_attempts, threads)
        } else {
            self.run_sequential(handle, max_attempts)
        };
        handle.finish();

        match &result {
            Ok(outcome) => info!(
                "Search for {} {} after {} attempts in {:.2}s",
                handle.prefix(),
                outcome.kind(),
                outcome.attempts(),
                outcome.elapsed().as_secs_f64()
            ),
            Err(e) => warn!("Search for {} aborted: {}", handle.prefix(), e),
        }

        result
    }

    fn worker_count(&self) -> usize {
        if self.config.threads == 0 {
            num_cpus::get()
        } else {
            self.config.threads
        }
    }

    /// One attempt at a time; attempt N is checked before N+1 starts.
    fn run_sequential(&self, handle: &SearchHandle, max_attempts: u64) -> Result<SearchOutcome, SearchError> {
        while !handle.is_cancelled() {
            let Some(attempt) = handle.claim_attempt(max_attempts) else {
                break;
            };

            let keypair = self
                .generator
                .generate()
                .map_err(|source| SearchError::Generation { attempts: attempt, source })?;

            if matches_prefix(keypair.address(), handle.prefix()) {
                return Ok(SearchOutcome::Found {
                    keypair,
                    attempts: attempt,
                    elapsed: handle.elapsed(),
                });
            }

            self.report_progress(handle, attempt);
        }

        Ok(Self::exit_outcome(handle, max_attempts))
    }

    /// Workers claim attempt numbers from the shared handle, so the total
    /// never passes `max_attempts`. A `Found` outcome reports every attempt
    /// claimed across workers, not the index of the winning one.
    fn run_parallel(
        &self,
        handle: &SearchHandle,
        max_attempts: u64,
        threads: usize,
    ) -> Result<SearchOutcome, SearchError> {
        let pool = match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
            Ok(pool) => pool,
            Err(e) => {
                warn!("Failed to create thread pool ({}), searching on one thread", e);
                return self.run_sequential(handle, max_attempts);
            }
        };

        // First match or first failure wins
        let (found_tx, found_rx) = bounded::<GeneratedKeypair>(1);
        let (err_tx, err_rx) = bounded::<SearchError>(1);
        let stop = AtomicBool::new(false);

        pool.install(|| {
            (0..threads).into_par_iter().for_each(|_| {
                while !stop.load(Ordering::Relaxed) && !handle.is_cancelled() {
                    let Some(attempt) = handle.claim_attempt(max_attempts) else {
                        break;
                    };

                    match self.generator.generate() {
                        Ok(keypair) if matches_prefix(keypair.address(), handle.prefix()) => {
                            let _ = found_tx.try_send(keypair);
                            stop.store(true, Ordering::Relaxed);
                            return;
                        }
                        Ok(_) => self.report_progress(handle, attempt),
                        Err(source) => {
                            let _ = err_tx.try_send(SearchError::Generation { attempts: attempt, source });
                            stop.store(true, Ordering::Relaxed);
                            return;
                        }
                    }
                }
            });
        });

        if let Ok(keypair) = found_rx.try_recv() {
            return Ok(SearchOutcome::Found {
                keypair,
                attempts: handle.attempts(),
                elapsed: handle.elapsed(),
            });
        }
        if let Ok(err) = err_rx.try_recv() {
            return Err(err);
        }

        Ok(Self::exit_outcome(handle, max_attempts))
    }

    fn report_progress(&self, handle: &SearchHandle, attempt: u64) {
        let interval = self.config.progress_interval;
        if interval > 0 && attempt % interval == 0 {
            self.progress.report(ProgressReport::new(attempt, handle.elapsed()));
        }
    }

    /// Reaching the cap counts as exhaustion even if a cancel arrived at the same time.
    fn exit_outcome(handle: &SearchHandle, max_attempts: u64) -> SearchOutcome {
        let attempts = handle.attempts();
        let elapsed = handle.elapsed();
        if attempts >= max_attempts {
            SearchOutcome::Exhausted { attempts, elapsed }
        } else {
            SearchOutcome::Cancelled { attempts, elapsed }
        }
    }
}
