//! Common utilities for the tickgate binaries
//!
//! Shared logging initialization and the final statistics report.

use anyhow::Result;
use tickgate_core::telemetry::HistogramSnapshot;
use tickgate_core::StatsSnapshot;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize tracing/logging
pub fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();

    Ok(())
}

/// Print the end-of-run statistics report
pub fn print_stats(stats: &StatsSnapshot, histogram: &HistogramSnapshot) {
    let c = &stats.counters;
    tracing::info!("=== Final Statistics ===");
    tracing::info!(
        "Packets: {} ({} bytes), intake drops: {}, desyncs: {}",
        c.rx_packets,
        c.rx_bytes,
        c.intake_drops,
        c.desyncs
    );
    tracing::info!(
        "Messages: {} parsed, {} book updates, gaps: {}, dupes: {}",
        c.parsed_messages,
        c.book_updates,
        c.seq_gaps,
        c.seq_dupes
    );
    tracing::info!(
        "Symbols: {} unknown, {} unresolved order refs",
        c.unknown_symbol,
        c.unresolved_refs
    );
    tracing::info!(
        "Risk: {} accepts, {} rejects (kill {}, stale-gap {}, band {}, token {}, position {}, stale-age {})",
        c.risk_accepts,
        c.risk_rejects(),
        c.rejects_kill,
        c.rejects_stale_gap,
        c.rejects_price_band,
        c.rejects_token,
        c.rejects_position,
        c.rejects_stale_age
    );
    tracing::info!(
        "Ring: {} published, {} dropped, {} bank conflicts",
        c.dma_records,
        c.dma_drops,
        c.bank_conflicts
    );

    let lat = &stats.latency;
    if lat.count > 0 {
        tracing::info!(
            "Latency: min {} ns, mean {:.0} ns, max {} ns over {} records",
            lat.min_ns,
            lat.mean_ns(),
            lat.max_ns,
            lat.count
        );
        tracing::info!(
            "Latency percentiles: p50 <= {} ns, p99 <= {} ns, p99.9 <= {} ns",
            histogram.quantile_ns(0.50),
            histogram.quantile_ns(0.99),
            histogram.quantile_ns(0.999)
        );
    }
}

/// Exit status conventions for the driver binaries.
pub mod exit_codes {
    /// Normal termination
    pub const OK: i32 = 0;
    /// Adapter failure (input unreadable, I/O error)
    pub const ADAPTER_FAILURE: i32 = 1;
    /// Configuration rejected (bad config, symbol table full, ...)
    pub const CONFIG_REJECTED: i32 = 2;
}
