//! Progress reporting

use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Attempts between two progress reports
pub const PROGRESS_INTERVAL: u64 = 10_000;

/// A progress sample emitted by a running search
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressReport {
    /// Attempts completed so far
    pub attempts: u64,
    /// Attempts per second since the search started
    pub rate: f64,
    /// Time since the search started
    pub elapsed: Duration,
}

impl ProgressReport {
    pub fn new(attempts: u64, elapsed: Duration) -> Self {
        let secs = elapsed.as_secs_f64();
        let rate = if secs > 0.0 { attempts as f64 / secs } else { 0.0 };
        Self {
            attempts,
            rate,
            elapsed,
        }
    }
}

/// Receiver of progress samples.
///
/// Implementations are called from the search loop and must return without
/// waiting on the consumer.
pub trait ProgressSink: Send + Sync {
    fn report(&self, report: ProgressReport);
}

impl<S: ProgressSink + ?Sized> ProgressSink for Arc<S> {
    fn report(&self, report: ProgressReport) {
        (**self).report(report)
    }
}

impl<S: ProgressSink + ?Sized> ProgressSink for Box<S> {
    fn report(&self, report: ProgressReport) {
        (**self).report(report)
    }
}

/// Discards every sample
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _report: ProgressReport) {}
}

/// Writes samples to the `tracing` log
#[derive(Debug, Clone)]
pub struct LogProgress {
    label: String,
}

impl LogProgress {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl ProgressSink for LogProgress {
    fn report(&self, report: ProgressReport) {
        info!(
            search = %self.label,
            attempts = report.attempts,
            rate = report.rate.round(),
            elapsed_secs = report.elapsed.as_secs_f64(),
            "search progress"
        );
    }
}

/// Forwards samples into a bounded channel, dropping them when it is full
#[derive(Debug, Clone)]
pub struct ChannelProgress {
    tx: Sender<ProgressReport>,
}

impl ProgressSink for ChannelProgress {
    fn report(&self, report: ProgressReport) {
        match self.tx.try_send(report) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                debug!(attempts = report.attempts, "progress consumer is behind, sample dropped");
            }
            Err(TrySendError::Disconnected(_)) => {}
        }
    }
}

/// Create a bounded progress channel. A capacity of zero is raised to one so
/// that `try_send` can succeed without a waiting receiver.
pub fn progress_channel(capacity: usize) -> (ChannelProgress, Receiver<ProgressReport>) {
    let (tx, rx) = bounded(capacity.max(1));
    (ChannelProgress { tx }, rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate() {
        let report = ProgressReport::new(10_000, Duration::from_secs(2));
        assert_eq!(report.rate, 5_000.0);
        assert_eq!(ProgressReport::new(5, Duration::ZERO).rate, 0.0);
    }

    #[test]
    fn test_channel_drops_when_full() {
        let (sink, rx) = progress_channel(2);
        for i in 1..=5 {
            sink.report(ProgressReport::new(i, Duration::from_secs(1)));
        }
        let received: Vec<u64> = rx.try_iter().map(|r| r.attempts).collect();
        assert_eq!(received, vec![1, 2]);
    }

    #[test]
    fn test_channel_ignores_disconnected_receiver() {
        let (sink, rx) = progress_channel(1);
        drop(rx);
        sink.report(ProgressReport::new(1, Duration::from_secs(1)));
    }
}
