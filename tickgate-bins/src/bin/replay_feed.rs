//! Replay a captured ITCH byte stream through the pipeline
//!
//! Loads symbols and reference prices, applies a risk profile, then
//! streams the capture file in UDP-sized chunks while a consumer
//! thread drains the decision ring. Ends with a statistics report.
//!
//! Exit codes: 0 normal, 1 adapter failure (input unreadable),
//! 2 configuration rejected.

use std::path::PathBuf;
use std::process::exit;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use tickgate_bins::{exit_codes, init_logging, print_stats};
use tickgate_core::config::{read_price_file, read_symbol_file, Config, ProfileName};
use tickgate_core::prelude::*;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// ITCH capture file to replay
    feed: PathBuf,

    /// Optional TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Symbol table file (SYMBOL,INDEX); overrides the config file
    #[arg(short, long)]
    symbols: Option<PathBuf>,

    /// Reference price file (INDEX,PRICE); overrides the config file
    #[arg(long)]
    prices: Option<PathBuf>,

    /// Risk profile: standard, aggressive or conservative
    #[arg(short, long)]
    profile: Option<String>,

    /// Payload chunk size fed to the pipeline
    #[arg(long, default_value = "1400")]
    chunk_bytes: usize,

    /// Print every consumed decision record
    #[arg(long)]
    dump: bool,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn main() {
    let args = Args::parse();
    if let Err(e) = init_logging(&args.log_level) {
        eprintln!("logging init failed: {e:#}");
        exit(exit_codes::ADAPTER_FAILURE);
    }

    // Configuration phase: any failure here is a rejected config.
    let (pipeline, config_handle, consumer, clock) = match configure(&args) {
        Ok(parts) => parts,
        Err(e) => {
            tracing::error!("configuration rejected: {e:#}");
            exit(exit_codes::CONFIG_REJECTED);
        }
    };

    match replay(&args, pipeline, config_handle, consumer, clock) {
        Ok(()) => exit(exit_codes::OK),
        Err(e) => {
            tracing::error!("adapter failure: {e:#}");
            exit(exit_codes::ADAPTER_FAILURE);
        }
    }
}

type PipelineParts = (
    Pipeline<MonotonicClock>,
    ConfigHandle,
    RingConsumer,
    MonotonicClock,
);

/// Build the pipeline and apply symbols, prices and risk parameters.
fn configure(args: &Args) -> Result<PipelineParts> {
    let config = match &args.config {
        Some(path) => Some(Config::load(path)?),
        None => None,
    };

    let ring_len = config
        .as_ref()
        .map(|c| c.pipeline.ring_len)
        .unwrap_or(4096);

    // The pipeline and the ingress stamps share one epoch.
    let clock = MonotonicClock::new();
    let (pipeline, handle, consumer) = Pipeline::new(clock.clone(), ring_len)?;

    if let Some(config) = &config {
        handle.set_seq_check_enabled(config.pipeline.seq_check_enabled);
    }

    let symbols_path = args
        .symbols
        .clone()
        .or_else(|| config.as_ref().and_then(|c| c.pipeline.symbols_file.clone()));
    if let Some(path) = symbols_path {
        let entries = read_symbol_file(&path)?;
        for (key, index) in &entries {
            handle.load_symbol(*key, *index)?;
        }
        handle.commit_symbols();
        tracing::info!("loaded {} symbols from {}", entries.len(), path.display());
    }

    let prices_path = args
        .prices
        .clone()
        .or_else(|| config.as_ref().and_then(|c| c.pipeline.prices_file.clone()));
    if let Some(path) = prices_path {
        let entries = read_price_file(&path)?;
        for (index, price) in &entries {
            handle.set_reference_price(*index, *price);
        }
        tracing::info!(
            "loaded {} reference prices from {}",
            entries.len(),
            path.display()
        );
    }

    let params = match &args.profile {
        Some(name) => profile_by_name(name)?.params(),
        None => config
            .as_ref()
            .map(|c| c.risk.resolve())
            .unwrap_or_default(),
    };
    handle.set_risk_params(params);

    Ok((pipeline, handle, consumer, clock))
}

fn profile_by_name(name: &str) -> Result<ProfileName> {
    match name {
        "standard" => Ok(ProfileName::Standard),
        "aggressive" => Ok(ProfileName::Aggressive),
        "conservative" => Ok(ProfileName::Conservative),
        other => anyhow::bail!("unknown risk profile '{other}'"),
    }
}

/// Stream the capture through the pipeline and drain the ring.
fn replay(
    args: &Args,
    mut pipeline: Pipeline<MonotonicClock>,
    handle: ConfigHandle,
    mut consumer: RingConsumer,
    clock: MonotonicClock,
) -> Result<()> {
    let feed = std::fs::read(&args.feed)
        .with_context(|| format!("cannot read feed file {}", args.feed.display()))?;
    tracing::info!("replaying {} bytes from {}", feed.len(), args.feed.display());

    // SIGINT/SIGTERM request a cooperative shutdown.
    let interrupted = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGINT, Arc::clone(&interrupted))?;
    signal_hook::flag::register(signal_hook::consts::SIGTERM, Arc::clone(&interrupted))?;

    let dump = args.dump;
    let consumer_handle = {
        let handle = handle.clone();
        std::thread::spawn(move || {
            let mut consumed = 0u64;
            let mut crc_failures = 0u64;
            loop {
                match consumer.try_next() {
                    Some(record) => {
                        if !record.crc_ok() {
                            crc_failures += 1;
                        }
                        if dump {
                            println!(
                                "seq={} sym={} side={} flags={:#04x} px={} qty={} lat={}ns",
                                record.seq,
                                record.symbol_index,
                                record.side,
                                record.flags,
                                record.price,
                                record.qty,
                                record.latency_ns()
                            );
                        }
                        consumer.commit(1);
                        consumed += 1;
                    }
                    None if handle.is_shutdown() => break,
                    None => std::thread::yield_now(),
                }
            }
            (consumed, crc_failures)
        })
    };

    let chunk = args.chunk_bytes.max(64);
    for payload in feed.chunks(chunk) {
        if interrupted.load(Ordering::Relaxed) {
            tracing::warn!("interrupted, stopping replay");
            break;
        }
        pipeline.on_payload(payload, clock.now_ns());
    }

    handle.shutdown();
    let (consumed, crc_failures) = consumer_handle
        .join()
        .map_err(|_| anyhow::anyhow!("consumer thread panicked"))?;
    tracing::info!("consumed {} records ({} CRC failures)", consumed, crc_failures);

    print_stats(&handle.snapshot_stats(), &handle.latency_histogram());
    Ok(())
}
