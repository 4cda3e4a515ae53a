//! Difficulty and time estimates for vanity prefixes

use std::fmt;

use serde::{Deserialize, Serialize};

/// Size of the base58 alphabet
const ALPHABET_SIZE: f64 = 58.0;

/// Coarse wall-clock bucket for a prefix, derived from its length only.
///
/// Variants are declared in increasing order so the derived `Ord` follows
/// difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TimeEstimate {
    Invalid,
    Seconds,
    TensOfSeconds,
    Minutes,
    TensOfMinutes,
    Hours,
    TensOfHours,
    VeryLong,
}

impl fmt::Display for TimeEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TimeEstimate::Invalid => "invalid prefix",
            TimeEstimate::Seconds => "~1-10 seconds",
            TimeEstimate::TensOfSeconds => "~10-60 seconds",
            TimeEstimate::Minutes => "~1-10 minutes",
            TimeEstimate::TensOfMinutes => "~10-60 minutes",
            TimeEstimate::Hours => "~1-10 hours",
            TimeEstimate::TensOfHours => "~10-100 hours",
            TimeEstimate::VeryLong => "~100+ hours (very long)",
        };
        f.write_str(text)
    }
}

/// Estimate how long a search for `prefix` takes
pub fn estimate(prefix: &str) -> TimeEstimate {
    match prefix.chars().count() {
        0 => TimeEstimate::Invalid,
        1 | 2 => TimeEstimate::Seconds,
        3 => TimeEstimate::TensOfSeconds,
        4 => TimeEstimate::Minutes,
        5 => TimeEstimate::TensOfMinutes,
        6 => TimeEstimate::Hours,
        7 => TimeEstimate::TensOfHours,
        _ => TimeEstimate::VeryLong,
    }
}

/// Expected number of attempts for a prefix of `len` characters (58^len)
pub fn expected_attempts(len: usize) -> f64 {
    ALPHABET_SIZE.powi(len as i32)
}

/// Format difficulty as human-readable string
pub fn format_difficulty(difficulty: f64) -> String {
    if difficulty >= 1e15 {
        format!("{:.2}P", difficulty / 1e15)
    } else if difficulty >= 1e12 {
        format!("{:.2}T", difficulty / 1e12)
    } else if difficulty >= 1e9 {
        format!("{:.2}G", difficulty / 1e9)
    } else if difficulty >= 1e6 {
        format!("{:.2}M", difficulty / 1e6)
    } else if difficulty >= 1e3 {
        format!("{:.2}K", difficulty / 1e3)
    } else {
        format!("{:.0}", difficulty)
    }
}

/// Seconds until a 50% chance of a match at the given rate
pub fn estimate_time_50pct(difficulty: f64, keys_per_second: f64) -> f64 {
    if keys_per_second <= 0.0 {
        return f64::INFINITY;
    }
    (difficulty * std::f64::consts::LN_2) / keys_per_second
}

/// Format duration in human-readable format
pub fn format_duration(seconds: f64) -> String {
    if !seconds.is_finite() {
        "never".to_string()
    } else if seconds < 1.0 {
        format!("{:.0}ms", seconds * 1000.0)
    } else if seconds < 60.0 {
        format!("{:.1}s", seconds)
    } else if seconds < 3600.0 {
        format!("{:.1}m", seconds / 60.0)
    } else if seconds < 86400.0 {
        format!("{:.1}h", seconds / 3600.0)
    } else if seconds < 86400.0 * 365.0 {
        format!("{:.1}d", seconds / 86400.0)
    } else {
        format!("{:.1}y", seconds / (86400.0 * 365.0))
    }
}
