//! Time sources for the data path
//!
//! The risk gate needs "now" for token replenishment, age-based
//! staleness and the decision timestamp. Taking the clock as a type
//! parameter keeps the hot path monomorphized (no `dyn` dispatch) and
//! makes replays reproducible: with [`ManualClock`] the same input
//! stream yields byte-identical decision records.

use std::time::Instant;

/// Monotonic nanosecond time source
pub trait Clock {
    /// Current time in nanoseconds. Must be monotonically non-decreasing.
    fn now_ns(&self) -> u64;
}

/// Production clock backed by [`Instant`]
///
/// Nanoseconds since construction; comparable with ingress timestamps
/// produced by the same clock instance.
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    epoch: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    #[inline(always)]
    fn now_ns(&self) -> u64 {
        self.epoch.elapsed().as_nanos() as u64
    }
}

/// Deterministic clock for tests and replay
///
/// The owner advances time explicitly; reads never change it. Clones
/// share the underlying counter, so a test can hold one handle while
/// the pipeline owns the other.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: std::sync::Arc<std::sync::atomic::AtomicU64>,
}

impl ManualClock {
    pub fn new(start_ns: u64) -> Self {
        Self {
            now: std::sync::Arc::new(std::sync::atomic::AtomicU64::new(start_ns)),
        }
    }

    /// Advance the clock by `delta_ns`.
    pub fn advance(&self, delta_ns: u64) {
        self.now
            .fetch_add(delta_ns, std::sync::atomic::Ordering::Relaxed);
    }

    /// Jump to an absolute time. Panics in debug builds if it would
    /// move backwards.
    pub fn set(&self, now_ns: u64) {
        debug_assert!(
            now_ns >= self.now_ns(),
            "manual clock moved backwards"
        );
        self.now.store(now_ns, std::sync::atomic::Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    #[inline(always)]
    fn now_ns(&self) -> u64 {
        self.now.load(std::sync::atomic::Ordering::Relaxed)
    }
}
