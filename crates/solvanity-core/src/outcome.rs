//! Terminal results of a search

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::keypair::GeneratedKeypair;

/// How a search ended
#[derive(Debug, Clone)]
pub enum SearchOutcome {
    /// An address with the prefix was generated
    Found {
        keypair: GeneratedKeypair,
        attempts: u64,
        elapsed: Duration,
    },
    /// `max_attempts` keypairs were generated without a match
    Exhausted { attempts: u64, elapsed: Duration },
    /// Cancellation was requested before a match or exhaustion
    Cancelled { attempts: u64, elapsed: Duration },
}

/// Outcome variant without payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeKind {
    Found,
    Exhausted,
    Cancelled,
}

impl OutcomeKind {
    /// Message shown to the person who asked for the search
    pub fn user_message(&self) -> &'static str {
        match self {
            OutcomeKind::Found => "Vanity address found",
            OutcomeKind::Exhausted => "No match within the attempt limit, try a shorter prefix",
            OutcomeKind::Cancelled => "Search stopped by request",
        }
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutcomeKind::Found => write!(f, "found"),
            OutcomeKind::Exhausted => write!(f, "exhausted"),
            OutcomeKind::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl SearchOutcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            SearchOutcome::Found { .. } => OutcomeKind::Found,
            SearchOutcome::Exhausted { .. } => OutcomeKind::Exhausted,
            SearchOutcome::Cancelled { .. } => OutcomeKind::Cancelled,
        }
    }

    pub fn attempts(&self) -> u64 {
        match self {
            SearchOutcome::Found { attempts, .. }
            | SearchOutcome::Exhausted { attempts, .. }
            | SearchOutcome::Cancelled { attempts, .. } => *attempts,
        }
    }

    pub fn elapsed(&self) -> Duration {
        match self {
            SearchOutcome::Found { elapsed, .. }
            | SearchOutcome::Exhausted { elapsed, .. }
            | SearchOutcome::Cancelled { elapsed, .. } => *elapsed,
        }
    }

    /// Attempts per second over the whole search
    pub fn keys_per_second(&self) -> f64 {
        let secs = self.elapsed().as_secs_f64();
        if secs > 0.0 {
            self.attempts() as f64 / secs
        } else {
            0.0
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, SearchOutcome::Found { .. })
    }

    /// The matching keypair, if any
    pub fn keypair(&self) -> Option<&GeneratedKeypair> {
        match self {
            SearchOutcome::Found { keypair, .. } => Some(keypair),
            _ => None,
        }
    }

    /// Secret-free summary suitable for logs and JSON output
    pub fn summary(&self, prefix: &str) -> SearchSummary {
        SearchSummary {
            status: self.kind(),
            prefix: prefix.to_string(),
            address: self.keypair().map(|kp| kp.address().to_string()),
            attempts: self.attempts(),
            time_secs: self.elapsed().as_secs_f64(),
            keys_per_second: self.keys_per_second(),
        }
    }
}

/// Serializable description of an outcome that never carries secret material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSummary {
    pub status: OutcomeKind,
    pub prefix: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub attempts: u64,
    pub time_secs: f64,
    pub keys_per_second: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let outcome = SearchOutcome::Exhausted {
            attempts: 100,
            elapsed: Duration::from_secs(4),
        };
        assert_eq!(outcome.kind(), OutcomeKind::Exhausted);
        assert_eq!(outcome.attempts(), 100);
        assert_eq!(outcome.keys_per_second(), 25.0);
        assert!(outcome.keypair().is_none());
    }

    #[test]
    fn test_summary_has_no_secret() {
        let keypair = GeneratedKeypair::from_seed(&[3u8; 32]);
        let secret = keypair.secret_base58();
        let outcome = SearchOutcome::Found {
            keypair: keypair.clone(),
            attempts: 7,
            elapsed: Duration::from_millis(10),
        };
        let summary = outcome.summary("A");
        assert_eq!(summary.address.as_deref(), Some(keypair.address()));

        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"status\":\"found\""));
        assert!(!json.contains(&secret));
    }

    #[test]
    fn test_cancelled_summary_omits_address() {
        let outcome = SearchOutcome::Cancelled {
            attempts: 0,
            elapsed: Duration::ZERO,
        };
        let json = serde_json::to_string(&outcome.summary("A")).unwrap();
        assert!(!json.contains("address"));
        assert_eq!(outcome.keys_per_second(), 0.0);
    }
}
