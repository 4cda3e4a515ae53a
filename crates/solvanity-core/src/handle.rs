//! Live state of one search

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use solvanity_pattern::{estimate_time_50pct, format_duration};

use crate::cancel::CancellationToken;

/// Thread-safe state of a single search.
///
/// The search loop is the only writer of the attempt counter and running
/// flag; any thread may read them or request cancellation.
#[derive(Debug)]
pub struct SearchHandle {
    prefix: String,
    /// Total attempts claimed
    attempts: AtomicU64,
    /// Set when the search loop takes ownership of the handle
    start_time: OnceLock<Instant>,
    /// Whether search is running
    running: AtomicBool,
    cancel: CancellationToken,
}

/// Point-in-time view of a handle, for status queries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchStatus {
    pub prefix: String,
    pub attempts: u64,
    pub elapsed_secs: f64,
    pub keys_per_second: f64,
    pub running: bool,
    pub cancel_requested: bool,
}

impl SearchHandle {
    /// Create a handle for a search that has not started yet
    pub fn new(prefix: impl Into<String>, cancel: CancellationToken) -> Arc<Self> {
        Arc::new(Self {
            prefix: prefix.into(),
            attempts: AtomicU64::new(0),
            start_time: OnceLock::new(),
            running: AtomicBool::new(true),
            cancel,
        })
    }

    /// Prefix being searched for
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Get total attempts made
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::Relaxed)
    }

    /// Time since the search began, zero before it starts
    pub fn elapsed(&self) -> Duration {
        self.start_time.get().map_or(Duration::ZERO, Instant::elapsed)
    }

    /// Get attempts per second
    pub fn keys_per_second(&self) -> f64 {
        let elapsed = self.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.attempts() as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Check if running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Request cancellation; the search stops at its next attempt boundary
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Check whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Snapshot for status queries
    pub fn status(&self) -> SearchStatus {
        SearchStatus {
            prefix: self.prefix.clone(),
            attempts: self.attempts(),
            elapsed_secs: self.elapsed().as_secs_f64(),
            keys_per_second: self.keys_per_second(),
            running: self.is_running(),
            cancel_requested: self.is_cancelled(),
        }
    }

    /// Mark the handle as owned by a search loop.
    ///
    /// # Panics
    /// If the handle was already used by another search.
    pub(crate) fn begin(&self) {
        let fresh = self.start_time.set(Instant::now()).is_ok();
        assert!(fresh, "SearchHandle for prefix {:?} reused", self.prefix);
    }

    /// Claim the next attempt number, or `None` once `max_attempts` is reached.
    /// The counter never exceeds `max_attempts`, even with several workers.
    pub(crate) fn claim_attempt(&self, max_attempts: u64) -> Option<u64> {
        self.attempts
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| {
                (n < max_attempts).then_some(n + 1)
            })
            .ok()
            .map(|previous| previous + 1)
    }

    /// Leave the running state. Terminal.
    pub(crate) fn finish(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    /// Get formatted stats string
    pub fn format(&self, difficulty: f64) -> String {
        let keys = self.attempts();
        let kps = self.keys_per_second();

        // Probability of at least one match so far
        let prob = if difficulty > 0.0 {
            1.0 - (-(keys as f64) / difficulty).exp()
        } else {
            0.0
        };

        // Remaining time to 50%
        let remaining_for_50 = if prob < 0.5 && kps > 0.0 {
            estimate_time_50pct(difficulty, kps) - keys as f64 / kps
        } else {
            0.0
        };

        format!(
            "[{:.2} Kkey/s][Total {}][Prob {:.1}%][50% in {}]",
            kps / 1_000.0,
            format_keys(keys),
            prob * 100.0,
            format_remaining(remaining_for_50)
        )
    }
}

fn format_keys(keys: u64) -> String {
    if keys >= 1_000_000_000 {
        format!("{:.2}G", keys as f64 / 1e9)
    } else if keys >= 1_000_000 {
        format!("{:.2}M", keys as f64 / 1e6)
    } else if keys >= 1000 {
        format!("{:.2}K", keys as f64 / 1e3)
    } else {
        format!("{}", keys)
    }
}

fn format_remaining(seconds: f64) -> String {
    if seconds <= 0.0 {
        return "now".to_string();
    }
    format_duration(seconds)
}
