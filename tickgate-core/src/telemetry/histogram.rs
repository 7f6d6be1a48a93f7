//! Ingress→decision latency histogram
//!
//! 256 fixed-width bins plus running min/max/sum for the mean; the top
//! bin saturates. Percentiles are computed offline from a snapshot -
//! nothing on the data path ever scans the bins.

use std::sync::atomic::{AtomicU64, Ordering};

/// Number of histogram bins
pub const LATENCY_BINS: usize = 256;

/// Width of one bin in nanoseconds (software target; the source design
/// used its 13 ns clock tick here)
pub const LATENCY_BIN_WIDTH_NS: u64 = 100;

/// Live histogram (data path writes, config thread snapshots).
pub struct LatencyHistogram {
    bins: [AtomicU64; LATENCY_BINS],
    count: AtomicU64,
    sum: AtomicU64,
    min: AtomicU64,
    max: AtomicU64,
}

impl LatencyHistogram {
    pub fn new() -> Self {
        const ZERO: AtomicU64 = AtomicU64::new(0);
        Self {
            bins: [ZERO; LATENCY_BINS],
            count: AtomicU64::new(0),
            sum: AtomicU64::new(0),
            min: AtomicU64::new(u64::MAX),
            max: AtomicU64::new(0),
        }
    }

    /// Record one published decision's latency.
    #[inline]
    pub fn record(&self, latency_ns: u64) {
        let bin = ((latency_ns / LATENCY_BIN_WIDTH_NS) as usize).min(LATENCY_BINS - 1);
        self.bins[bin].fetch_add(1, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
        self.sum.fetch_add(latency_ns, Ordering::Relaxed);

        // Single-writer: plain load-compare-store is race-free.
        if latency_ns < self.min.load(Ordering::Relaxed) {
            self.min.store(latency_ns, Ordering::Relaxed);
        }
        if latency_ns > self.max.load(Ordering::Relaxed) {
            self.max.store(latency_ns, Ordering::Relaxed);
        }
    }

    /// Copy every bin and the running aggregates.
    pub fn snapshot(&self) -> HistogramSnapshot {
        let mut bins = [0u64; LATENCY_BINS];
        for (out, bin) in bins.iter_mut().zip(self.bins.iter()) {
            *out = bin.load(Ordering::Relaxed);
        }
        HistogramSnapshot {
            bins,
            summary: self.summary(),
        }
    }

    /// Aggregates only (cheap, for the stats snapshot).
    pub fn summary(&self) -> LatencySummary {
        let count = self.count.load(Ordering::Relaxed);
        LatencySummary {
            count,
            sum_ns: self.sum.load(Ordering::Relaxed),
            min_ns: if count == 0 {
                0
            } else {
                self.min.load(Ordering::Relaxed)
            },
            max_ns: self.max.load(Ordering::Relaxed),
        }
    }
}

impl Default for LatencyHistogram {
    fn default() -> Self {
        Self::new()
    }
}

/// Min/max/sum/count aggregates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LatencySummary {
    pub count: u64,
    pub sum_ns: u64,
    pub min_ns: u64,
    pub max_ns: u64,
}

impl LatencySummary {
    pub fn mean_ns(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum_ns as f64 / self.count as f64
        }
    }
}

/// Full offline view of the histogram.
#[derive(Debug, Clone)]
pub struct HistogramSnapshot {
    pub bins: [u64; LATENCY_BINS],
    pub summary: LatencySummary,
}

impl HistogramSnapshot {
    /// Latency at quantile `q` in [0, 1], reported as the upper edge of
    /// the containing bin. The saturating top bin reports its lower
    /// edge (the true value may be anything above it).
    pub fn quantile_ns(&self, q: f64) -> u64 {
        if self.summary.count == 0 {
            return 0;
        }
        let q = q.clamp(0.0, 1.0);
        let rank = ((self.summary.count as f64) * q).ceil().max(1.0) as u64;

        let mut seen = 0u64;
        for (i, &bin) in self.bins.iter().enumerate() {
            seen += bin;
            if seen >= rank {
                return if i == LATENCY_BINS - 1 {
                    i as u64 * LATENCY_BIN_WIDTH_NS
                } else {
                    (i as u64 + 1) * LATENCY_BIN_WIDTH_NS
                };
            }
        }
        (LATENCY_BINS as u64 - 1) * LATENCY_BIN_WIDTH_NS
    }
}
