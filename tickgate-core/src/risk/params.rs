//! Risk parameters and their shared atomic mirror
//!
//! The data path reads parameters with acquire loads at the start of
//! each risk evaluation; the configuration thread publishes them with
//! release stores, one word per field. Changes take effect at message
//! granularity, never mid-check.

use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU16, AtomicU32, Ordering};

/// Plain-value risk parameter set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskParams {
    /// Allowed |mid − reference| band in basis points; 0 disables
    pub price_band_bps: u16,
    /// Tokens replenished per millisecond
    pub token_rate_per_ms: u16,
    /// Token bucket capacity (also the re-armed fill level)
    pub token_bucket_max: u16,
    /// Maximum aggregate TOB quantity per side; negative clamps to 0
    pub position_limit: i32,
    /// Maximum event age before the age-staleness check rejects
    pub stale_threshold_ns: u32,
    /// In-order run that clears the sequence stale latch
    pub seq_gap_threshold: u16,
    /// Reject everything while set
    pub kill: bool,
}

impl RiskParams {
    /// Standard production limits
    pub fn standard() -> Self {
        Self {
            price_band_bps: 100, // 1.0%
            token_rate_per_ms: 1_000,
            token_bucket_max: 1_000,
            position_limit: 50_000,
            stale_threshold_ns: 100_000_000, // 100 ms
            seq_gap_threshold: 16,
            kill: false,
        }
    }

    /// Wider band, faster replenishment, larger positions
    pub fn aggressive() -> Self {
        Self {
            price_band_bps: 200, // 2.0%
            token_rate_per_ms: 2_000,
            token_bucket_max: 2_000,
            position_limit: 100_000,
            stale_threshold_ns: 100_000_000,
            seq_gap_threshold: 16,
            kill: false,
        }
    }

    /// Tight band, slow replenishment, small positions
    pub fn conservative() -> Self {
        Self {
            price_band_bps: 50, // 0.5%
            token_rate_per_ms: 500,
            token_bucket_max: 500,
            position_limit: 25_000,
            stale_threshold_ns: 50_000_000, // 50 ms
            seq_gap_threshold: 16,
            kill: false,
        }
    }
}

impl Default for RiskParams {
    fn default() -> Self {
        Self::standard()
    }
}

/// Atomic mirror shared between the configuration thread and the data
/// path. Field stores are release, loads are acquire; there is no
/// cross-field atomicity and none is needed (each check reads the
/// fields it uses once).
pub struct SharedRiskParams {
    price_band_bps: AtomicU16,
    token_rate_per_ms: AtomicU16,
    token_bucket_max: AtomicU16,
    position_limit: AtomicI32,
    stale_threshold_ns: AtomicU32,
    seq_gap_threshold: AtomicU16,
    kill: AtomicBool,
    /// Bumped on every store; the gate re-arms its token bucket when
    /// it observes a new generation.
    generation: AtomicU32,
}

impl SharedRiskParams {
    pub fn new(initial: RiskParams) -> Self {
        let shared = Self {
            price_band_bps: AtomicU16::new(initial.price_band_bps),
            token_rate_per_ms: AtomicU16::new(initial.token_rate_per_ms),
            token_bucket_max: AtomicU16::new(initial.token_bucket_max),
            position_limit: AtomicI32::new(initial.position_limit),
            stale_threshold_ns: AtomicU32::new(initial.stale_threshold_ns),
            seq_gap_threshold: AtomicU16::new(initial.seq_gap_threshold),
            kill: AtomicBool::new(initial.kill),
            generation: AtomicU32::new(0),
        };
        shared.generation.store(1, Ordering::Release);
        shared
    }

    /// Publish a full parameter set (configuration thread).
    pub fn store(&self, params: RiskParams) {
        self.price_band_bps
            .store(params.price_band_bps, Ordering::Release);
        self.token_rate_per_ms
            .store(params.token_rate_per_ms, Ordering::Release);
        self.token_bucket_max
            .store(params.token_bucket_max, Ordering::Release);
        self.position_limit
            .store(params.position_limit, Ordering::Release);
        self.stale_threshold_ns
            .store(params.stale_threshold_ns, Ordering::Release);
        self.seq_gap_threshold
            .store(params.seq_gap_threshold, Ordering::Release);
        self.kill.store(params.kill, Ordering::Release);
        self.generation.fetch_add(1, Ordering::Release);
    }

    /// Flip only the kill flag (observed within O(1) messages).
    #[inline]
    pub fn set_kill(&self, kill: bool) {
        self.kill.store(kill, Ordering::Release);
    }

    /// Read the full set (data path, once per risk evaluation).
    #[inline]
    pub fn load(&self) -> RiskParams {
        RiskParams {
            price_band_bps: self.price_band_bps.load(Ordering::Acquire),
            token_rate_per_ms: self.token_rate_per_ms.load(Ordering::Acquire),
            token_bucket_max: self.token_bucket_max.load(Ordering::Acquire),
            position_limit: self.position_limit.load(Ordering::Acquire),
            stale_threshold_ns: self.stale_threshold_ns.load(Ordering::Acquire),
            seq_gap_threshold: self.seq_gap_threshold.load(Ordering::Acquire),
            kill: self.kill.load(Ordering::Acquire),
        }
    }

    #[inline(always)]
    pub fn generation(&self) -> u32 {
        self.generation.load(Ordering::Acquire)
    }

    #[inline(always)]
    pub fn seq_gap_threshold(&self) -> u16 {
        self.seq_gap_threshold.load(Ordering::Acquire)
    }
}
