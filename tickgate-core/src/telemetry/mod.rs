//! Pipeline telemetry
//!
//! Lock-free counters and an ingress→decision latency histogram. The
//! data-path thread is the only writer; the configuration thread reads
//! snapshots. All increments are relaxed - there is nothing to order,
//! only totals to read eventually.

pub mod counters;
pub mod histogram;

pub use counters::{Counters, CountersSnapshot};
pub use histogram::{HistogramSnapshot, LatencyHistogram, LATENCY_BIN_WIDTH_NS};

/// Aggregate read-only view returned by `snapshot_stats`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatsSnapshot {
    pub counters: CountersSnapshot,
    pub latency: histogram::LatencySummary,
}
