//! Trigger timing samples.
//!
//! The engine measures every trigger it runs and hands the sample to a
//! [`TimingSink`]. Aggregation and reporting belong to the sink.

use std::time::Duration;

/// Receives one sample per executed trigger.
pub trait TimingSink: Send + Sync {
    /// Record how long the trigger labelled `label` took.
    fn record(&self, label: &str, elapsed: Duration);
}

/// Emits samples as `tracing` events under the `script_dispatch::timings`
/// target, at trace level.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingTimings;

impl TimingSink for TracingTimings {
    fn record(&self, label: &str, elapsed: Duration) {
        tracing::trace!(
            target: "script_dispatch::timings",
            label,
            elapsed_us = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX),
            "trigger timing"
        );
    }
}
