//! Registry of running searches, keyed by owner
//!
//! Dispatch layers (chat bots, HTTP handlers) own one registry and use it to
//! enforce a single active search per owner, answer status and stop
//! requests, and keep a bounded history of finished searches.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use serde::{Deserialize, Serialize};
use solvanity_pattern::{PrefixError, PrefixValidator};
use thiserror::Error;
use tracing::{info, warn};

use crate::cancel::CancellationToken;
use crate::handle::{SearchHandle, SearchStatus};
use crate::keypair::KeypairGenerator;
use crate::outcome::SearchOutcome;
use crate::progress::{NoProgress, ProgressSink};
use crate::search::{SearchConfig, SearchError, VanitySearch};

/// Finished searches kept in the log by default
pub const MAX_LOG_ENTRIES: usize = 100;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("A search is already running for {0}")]
    AlreadyActive(String),
    #[error(transparent)]
    InvalidPrefix(#[from] PrefixError),
    #[error("Failed to spawn search worker: {0}")]
    Spawn(#[from] std::io::Error),
}

/// How a logged search ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogResult {
    Success,
    Failed,
    Stopped,
    Error,
}

impl LogResult {
    fn from_result(result: &Result<SearchOutcome, SearchError>) -> Self {
        match result {
            Ok(SearchOutcome::Found { .. }) => LogResult::Success,
            Ok(SearchOutcome::Exhausted { .. }) => LogResult::Failed,
            Ok(SearchOutcome::Cancelled { .. }) => LogResult::Stopped,
            Err(_) => LogResult::Error,
        }
    }
}

/// One finished search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry<K> {
    pub owner: K,
    pub prefix: String,
    pub result: LogResult,
    pub attempts: u64,
    pub time_secs: f64,
}

/// Aggregates over the log
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    pub total_generations: usize,
    pub successful: usize,
    pub failed: usize,
    pub stopped: usize,
    pub errors: usize,
    pub total_attempts: u64,
    pub total_time_secs: f64,
    pub avg_attempts: f64,
    pub avg_time_secs: f64,
}

/// A search started through the registry
pub struct SearchTicket {
    handle: Arc<SearchHandle>,
    join: JoinHandle<Result<SearchOutcome, SearchError>>,
}

impl SearchTicket {
    /// Live state of the search
    pub fn handle(&self) -> &Arc<SearchHandle> {
        &self.handle
    }

    /// Block until the search ends. A panic in the worker is re-raised here.
    pub fn wait(self) -> Result<SearchOutcome, SearchError> {
        match self.join.join() {
            Ok(result) => result,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}

/// Per-owner search registry
pub struct SearchRegistry<K> {
    generator: Arc<dyn KeypairGenerator>,
    progress: Arc<dyn ProgressSink>,
    config: SearchConfig,
    validator: PrefixValidator,
    active: Mutex<HashMap<K, Arc<SearchHandle>>>,
    log: Mutex<VecDeque<LogEntry<K>>>,
    log_capacity: usize,
}

impl<K> SearchRegistry<K>
where
    K: Eq + Hash + Clone + fmt::Display + Send + Sync + 'static,
{
    pub fn new(generator: impl KeypairGenerator + 'static) -> Self {
        Self {
            generator: Arc::new(generator),
            progress: Arc::new(NoProgress),
            config: SearchConfig::default(),
            validator: PrefixValidator::default(),
            active: Mutex::new(HashMap::new()),
            log: Mutex::new(VecDeque::new()),
            log_capacity: MAX_LOG_ENTRIES,
        }
    }

    /// Search configuration applied to every search started from now on
    pub fn with_config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    /// Progress sink shared by all searches
    pub fn with_progress(mut self, sink: impl ProgressSink + 'static) -> Self {
        self.progress = Arc::new(sink);
        self
    }

    /// Rules applied to every prefix passed to [`SearchRegistry::start`]
    pub fn with_validator(mut self, validator: PrefixValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_log_capacity(mut self, capacity: usize) -> Self {
        self.log_capacity = capacity;
        self
    }

    /// Start a search for `owner` on its own worker thread.
    ///
    /// The prefix is checked against the registry's validator before the
    /// owner's slot is taken.
    pub fn start(
        self: &Arc<Self>,
        owner: K,
        prefix: impl Into<String>,
        max_attempts: u64,
    ) -> Result<SearchTicket, RegistryError> {
        let prefix = prefix.into();
        self.validator.validate(&prefix)?;

        let handle = {
            let mut active = self.lock_active();
            if active.contains_key(&owner) {
                return Err(RegistryError::AlreadyActive(owner.to_string()));
            }
            let handle = SearchHandle::new(prefix, CancellationToken::new());
            active.insert(owner.clone(), Arc::clone(&handle));
            handle
        };

        let registry = Arc::clone(self);
        let worker_handle = Arc::clone(&handle);
        let worker_owner = owner.clone();
        let spawned = thread::Builder::new()
            .name(format!("search-{}", owner))
            .spawn(move || registry.execute(worker_owner, worker_handle, max_attempts));

        match spawned {
            Ok(join) => {
                info!("Started search for {} with prefix {}", owner, handle.prefix());
                Ok(SearchTicket { handle, join })
            }
            Err(e) => {
                self.lock_active().remove(&owner);
                Err(RegistryError::Spawn(e))
            }
        }
    }

    fn execute(
        &self,
        owner: K,
        handle: Arc<SearchHandle>,
        max_attempts: u64,
    ) -> Result<SearchOutcome, SearchError> {
        let slot = ActiveSlot { registry: self, owner };
        let search = VanitySearch::new(Arc::clone(&self.generator))
            .with_config(self.config.clone())
            .with_progress(Arc::clone(&self.progress));
        let result = search.run(&handle, max_attempts);

        self.record(&slot.owner, &handle, &result);
        result
    }

    fn record(&self, owner: &K, handle: &SearchHandle, result: &Result<SearchOutcome, SearchError>) {
        if self.log_capacity == 0 {
            return;
        }

        let (attempts, time_secs) = match result {
            Ok(outcome) => (outcome.attempts(), outcome.elapsed().as_secs_f64()),
            Err(e) => {
                warn!("Search for {} failed: {}", owner, e);
                (handle.attempts(), handle.elapsed().as_secs_f64())
            }
        };

        let mut log = self.lock_log();
        log.push_back(LogEntry {
            owner: owner.clone(),
            prefix: handle.prefix().to_string(),
            result: LogResult::from_result(result),
            attempts,
            time_secs,
        });
        while log.len() > self.log_capacity {
            log.pop_front();
        }
    }

    /// Request cancellation of the owner's search. Returns false when the
    /// owner has nothing running.
    pub fn stop(&self, owner: &K) -> bool {
        match self.lock_active().get(owner) {
            Some(handle) => {
                handle.cancel();
                info!("Stop requested for {}", owner);
                true
            }
            None => false,
        }
    }

    /// Status of the owner's running search
    pub fn status(&self, owner: &K) -> Option<SearchStatus> {
        self.lock_active().get(owner).map(|handle| handle.status())
    }

    pub fn is_active(&self, owner: &K) -> bool {
        self.lock_active().contains_key(owner)
    }

    pub fn active_count(&self) -> usize {
        self.lock_active().len()
    }

    /// Finished searches, oldest first
    pub fn log(&self) -> Vec<LogEntry<K>> {
        self.lock_log().iter().cloned().collect()
    }

    /// The most recent `n` finished searches, newest first
    pub fn recent(&self, n: usize) -> Vec<LogEntry<K>> {
        self.lock_log().iter().rev().take(n).cloned().collect()
    }

    pub fn stats(&self) -> GenerationStats {
        let log = self.lock_log();
        if log.is_empty() {
            return GenerationStats::default();
        }

        let mut stats = GenerationStats {
            total_generations: log.len(),
            ..Default::default()
        };
        for entry in log.iter() {
            match entry.result {
                LogResult::Success => stats.successful += 1,
                LogResult::Failed => stats.failed += 1,
                LogResult::Stopped => stats.stopped += 1,
                LogResult::Error => stats.errors += 1,
            }
            stats.total_attempts += entry.attempts;
            stats.total_time_secs += entry.time_secs;
        }
        stats.avg_attempts = stats.total_attempts as f64 / stats.total_generations as f64;
        stats.avg_time_secs = stats.total_time_secs / stats.total_generations as f64;
        stats
    }

    fn lock_active(&self) -> MutexGuard<'_, HashMap<K, Arc<SearchHandle>>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_log(&self) -> MutexGuard<'_, VecDeque<LogEntry<K>>> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Frees the owner's slot when the worker ends, including by panic
struct ActiveSlot<'a, K>
where
    K: Eq + Hash + Clone + fmt::Display + Send + Sync + 'static,
{
    registry: &'a SearchRegistry<K>,
    owner: K,
}

impl<K> Drop for ActiveSlot<'_, K>
where
    K: Eq + Hash + Clone + fmt::Display + Send + Sync + 'static,
{
    fn drop(&mut self) {
        if thread::panicking() {
            warn!("Search worker for {} panicked", self.owner);
        }
        self.registry.lock_active().remove(&self.owner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::Duration;

    use crate::keypair::{GeneratedKeypair, GenerationError};

    /// Addresses are `Hit...` on every `every`-th call, `zzz...` otherwise
    struct PeriodicGenerator {
        calls: AtomicU64,
        every: u64,
    }

    impl PeriodicGenerator {
        fn new(every: u64) -> Self {
            Self {
                calls: AtomicU64::new(0),
                every,
            }
        }
    }

    impl KeypairGenerator for PeriodicGenerator {
        fn generate(&self) -> Result<GeneratedKeypair, GenerationError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            let address = if n % self.every == 0 { "HitHitHit" } else { "zzzzzzzzz" };
            Ok(GeneratedKeypair::from_parts(address, [0u8; 64]))
        }
    }

    struct BrokenGenerator;

    impl KeypairGenerator for BrokenGenerator {
        fn generate(&self) -> Result<GeneratedKeypair, GenerationError> {
            Err(GenerationError::Backend("device unplugged".into()))
        }
    }

    struct PanickingGenerator;

    impl KeypairGenerator for PanickingGenerator {
        fn generate(&self) -> Result<GeneratedKeypair, GenerationError> {
            panic!("generator bug");
        }
    }

    fn wait_until(mut condition: impl FnMut() -> bool) {
        for _ in 0..5_000 {
            if condition() {
                return;
            }
            std::thread::sleep(Duration::from_millis(1));
        }
        panic!("condition not reached in time");
    }

    #[test]
    fn test_found_is_logged_and_released() {
        let registry = Arc::new(SearchRegistry::new(PeriodicGenerator::new(5)));
        let ticket = registry.start(1u64, "Hit", 100).unwrap();
        let outcome = ticket.wait().unwrap();

        assert!(outcome.is_found());
        assert!(!registry.is_active(&1));
        let log = registry.log();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].result, LogResult::Success);
        assert_eq!(log[0].prefix, "Hit");
    }

    #[test]
    fn test_one_active_search_per_owner() {
        let registry = Arc::new(SearchRegistry::new(PeriodicGenerator::new(u64::MAX)));
        let ticket = registry.start(7u64, "Hit", u64::MAX).unwrap();

        let err = registry.start(7u64, "Other", 10).err().unwrap();
        assert!(matches!(err, RegistryError::AlreadyActive(ref owner) if owner == "7"));

        // A different owner is unaffected
        let other = registry.start(8u64, "Hit", 0).unwrap();
        assert!(matches!(other.wait().unwrap(), SearchOutcome::Exhausted { attempts: 0, .. }));

        assert!(registry.stop(&7));
        let outcome = ticket.wait().unwrap();
        assert!(matches!(outcome, SearchOutcome::Cancelled { .. }));
        assert_eq!(registry.active_count(), 0);
    }

    #[test]
    fn test_status_tracks_running_search() {
        let registry = Arc::new(SearchRegistry::new(PeriodicGenerator::new(u64::MAX)));
        let ticket = registry.start("alice".to_string(), "Hit", u64::MAX).unwrap();
        let owner = "alice".to_string();

        wait_until(|| registry.status(&owner).map_or(false, |s| s.attempts > 0));
        let status = registry.status(&owner).unwrap();
        assert!(status.running);
        assert_eq!(status.prefix, "Hit");

        registry.stop(&owner);
        let outcome = ticket.wait().unwrap();
        assert!(outcome.attempts() >= status.attempts);
        assert!(registry.status(&owner).is_none());
        assert_eq!(registry.log()[0].result, LogResult::Stopped);
    }

    #[test]
    fn test_stop_unknown_owner() {
        let registry: Arc<SearchRegistry<u64>> = Arc::new(SearchRegistry::new(PeriodicGenerator::new(2)));
        assert!(!registry.stop(&42));
        assert!(registry.status(&42).is_none());
    }

    #[test]
    fn test_owner_can_restart_after_finish() {
        let registry = Arc::new(SearchRegistry::new(PeriodicGenerator::new(3)));
        registry.start(1u64, "Hit", 10).unwrap().wait().unwrap();
        let outcome = registry.start(1u64, "Hit", 10).unwrap().wait().unwrap();
        assert!(outcome.is_found());
        assert_eq!(registry.log().len(), 2);
    }

    #[test]
    fn test_log_is_bounded() {
        let registry = Arc::new(SearchRegistry::new(PeriodicGenerator::new(2)).with_log_capacity(3));
        for owner in 0u64..5 {
            registry.start(owner, "Hit", 0).unwrap().wait().unwrap();
        }

        let log = registry.log();
        assert_eq!(log.len(), 3);
        let owners: Vec<u64> = log.iter().map(|e| e.owner).collect();
        assert_eq!(owners, vec![2, 3, 4]);

        let recent: Vec<u64> = registry.recent(2).iter().map(|e| e.owner).collect();
        assert_eq!(recent, vec![4, 3]);
    }

    #[test]
    fn test_stats() {
        let registry = Arc::new(SearchRegistry::new(PeriodicGenerator::new(4)));
        // Calls 1..=4: found on the 4th
        registry.start(1u64, "Hit", 100).unwrap().wait().unwrap();
        // Calls 5..=6: exhausted before the 8th
        registry.start(2u64, "Hit", 2).unwrap().wait().unwrap();

        let stats = registry.stats();
        assert_eq!(stats.total_generations, 2);
        assert_eq!(stats.successful, 1);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.stopped, 0);
        assert_eq!(stats.total_attempts, 6);
        assert_eq!(stats.avg_attempts, 3.0);
    }

    #[test]
    fn test_empty_stats() {
        let registry: SearchRegistry<u64> = SearchRegistry::new(PeriodicGenerator::new(2));
        assert_eq!(registry.stats(), GenerationStats::default());
    }

    #[test]
    fn test_generator_failure_is_logged() {
        let registry = Arc::new(SearchRegistry::new(BrokenGenerator));
        let result = registry.start(9u64, "Hit", 10).unwrap().wait();

        assert!(matches!(result, Err(SearchError::Generation { attempts: 1, .. })));
        assert_eq!(registry.stats().errors, 1);
        assert!(!registry.is_active(&9));
    }

    #[test]
    fn test_invalid_prefix_is_rejected_before_start() {
        let registry = Arc::new(SearchRegistry::new(PeriodicGenerator::new(2)));

        let err = registry.start(1u64, "", 10).err().unwrap();
        assert!(matches!(err, RegistryError::InvalidPrefix(PrefixError::Empty)));
        assert!(!registry.is_active(&1));

        let err = registry.start(1u64, "S0L", 10).err().unwrap();
        assert!(matches!(err, RegistryError::InvalidPrefix(PrefixError::InvalidCharacters(_))));
        assert!(registry.log().is_empty());

        let outcome = registry.start(1u64, "Hit", 10).unwrap().wait().unwrap();
        assert!(outcome.is_found());
    }

    #[test]
    fn test_validator_limits_length() {
        let registry = Arc::new(SearchRegistry::new(PeriodicGenerator::new(2)).with_validator(PrefixValidator::new(2)));
        let err = registry.start(1u64, "Hit", 10).err().unwrap();
        assert!(matches!(err, RegistryError::InvalidPrefix(PrefixError::TooLong { len: 3, max: 2 })));
        assert_eq!(registry.active_count(), 0);
    }

    #[test]
    fn test_panicking_worker_releases_owner() {
        let registry = Arc::new(SearchRegistry::new(PanickingGenerator));
        let ticket = registry.start(1u64, "Hit", 10).unwrap();

        let waited = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| ticket.wait()));
        assert!(waited.is_err());
        assert!(!registry.is_active(&1));
        assert!(registry.start(1u64, "Hit", 10).is_ok());
    }

    #[test]
    fn test_many_owners_concurrently() {
        let registry = Arc::new(SearchRegistry::new(PeriodicGenerator::new(u64::MAX)));
        let tickets: Vec<_> = (0u64..8)
            .map(|owner| registry.start(owner, "Hit", 1_000 * (owner + 1)).unwrap())
            .collect();

        for (owner, ticket) in tickets.into_iter().enumerate() {
            let outcome = ticket.wait().unwrap();
            assert!(matches!(outcome, SearchOutcome::Exhausted { .. }));
            assert_eq!(outcome.attempts(), 1_000 * (owner as u64 + 1));
        }
        assert_eq!(registry.stats().total_generations, 8);
    }
}
