//! Generate a synthetic ITCH capture for replay testing
//!
//! Produces a weighted mix of Add / Delete / Trade messages with
//! sequential sequence numbers and prices around $150, plus optional
//! matching symbol and reference-price files.

use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use std::process::exit;

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use tickgate_bins::{exit_codes, init_logging};
use tickgate_core::fixed_point;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Output capture file (.itch)
    output: PathBuf,

    /// Number of messages to generate
    #[arg(short = 'c', long, default_value = "10000")]
    count: u32,

    /// Comma-separated ticker list
    #[arg(short, long, default_value = "AAPL,MSFT,GOOGL,AMZN,TSLA")]
    symbols: String,

    /// RNG seed for reproducible captures
    #[arg(long, default_value = "7")]
    seed: u64,

    /// Also write a matching symbol table file
    #[arg(long)]
    symbols_out: Option<PathBuf>,

    /// Also write a matching reference price file
    #[arg(long)]
    prices_out: Option<PathBuf>,

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

    if let Err(e) = run(&args) {
        tracing::error!("generation failed: {e:#}");
        exit(exit_codes::ADAPTER_FAILURE);
    }
    exit(exit_codes::OK);
}

struct Generator {
    rng: StdRng,
    seq: u32,
    timestamp_ns: u64,
    order_id: u64,
    /// ticker -> live order references, so deletes hit real orders
    active_orders: HashMap<String, Vec<u64>>,
}

impl Generator {
    fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seq: 1,
            timestamp_ns: 34_200_000_000_000, // 09:30:00 in ns since midnight
            order_id: 1_000_000,
            active_orders: HashMap::new(),
        }
    }

    fn next_header(&mut self, msg: &mut [u8]) {
        msg[1..5].copy_from_slice(&self.seq.to_be_bytes());
        self.seq += 1;
        self.timestamp_ns += 100_000; // 100 µs between messages
        // 48-bit timestamp, truncated to the low six bytes.
        msg[5..11].copy_from_slice(&self.timestamp_ns.to_be_bytes()[2..8]);
    }

    fn pack_symbol(ticker: &str) -> [u8; 8] {
        let mut key = [b' '; 8];
        let bytes = ticker.as_bytes();
        key[..bytes.len().min(8)].copy_from_slice(&bytes[..bytes.len().min(8)]);
        key
    }

    fn random_price(&mut self, spread_dollars: f64) -> u32 {
        let price = 150.0 + self.rng.gen_range(-spread_dollars..spread_dollars);
        fixed_point::from_f64(price)
    }

    fn add_order(&mut self, ticker: &str) -> Vec<u8> {
        self.order_id += 1;
        let order_id = self.order_id;
        let buy = self.rng.gen_bool(0.5);
        let shares: u32 = [100, 200, 500, 1_000][self.rng.gen_range(0..4)];
        let price = self.random_price(5.0);

        self.active_orders
            .entry(ticker.to_string())
            .or_default()
            .push(order_id);

        let mut msg = vec![0u8; 36];
        msg[0] = b'A';
        self.next_header(&mut msg);
        msg[11..19].copy_from_slice(&order_id.to_be_bytes());
        msg[19] = if buy { b'B' } else { b'S' };
        msg[20..24].copy_from_slice(&shares.to_be_bytes());
        msg[24..32].copy_from_slice(&Self::pack_symbol(ticker));
        msg[32..36].copy_from_slice(&price.to_be_bytes());
        msg
    }

    fn delete_order(&mut self, ticker: &str) -> Option<Vec<u8>> {
        let orders = self.active_orders.get_mut(ticker)?;
        if orders.is_empty() {
            return None;
        }
        let pick = self.rng.gen_range(0..orders.len());
        let order_id = orders.swap_remove(pick);

        let mut msg = vec![0u8; 19];
        msg[0] = b'D';
        self.next_header(&mut msg);
        msg[11..19].copy_from_slice(&order_id.to_be_bytes());
        Some(msg)
    }

    fn trade(&mut self, ticker: &str) -> Vec<u8> {
        let shares: u32 = [100, 200, 500][self.rng.gen_range(0..3)];
        let price = self.random_price(2.0);
        let order_id = self.order_id;

        let mut msg = vec![0u8; 44];
        msg[0] = b'P';
        self.next_header(&mut msg);
        msg[11..19].copy_from_slice(&order_id.to_be_bytes());
        msg[19] = b'B';
        msg[20..24].copy_from_slice(&shares.to_be_bytes());
        msg[24..32].copy_from_slice(&Self::pack_symbol(ticker));
        msg[32..36].copy_from_slice(&price.to_be_bytes());
        msg[36..44].copy_from_slice(&(order_id + 1).to_be_bytes());
        msg
    }

    /// 50% adds, 30% deletes, 20% trades.
    fn random_message(&mut self, ticker: &str) -> Option<Vec<u8>> {
        let roll: f64 = self.rng.gen();
        if roll < 0.5 {
            Some(self.add_order(ticker))
        } else if roll < 0.8 {
            self.delete_order(ticker)
        } else {
            Some(self.trade(ticker))
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let tickers: Vec<String> = args
        .symbols
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    anyhow::ensure!(!tickers.is_empty(), "no symbols given");
    anyhow::ensure!(
        tickers.iter().all(|t| t.len() <= 8),
        "tickers must be at most 8 characters"
    );

    let mut generator = Generator::new(args.seed);
    let mut out = std::fs::File::create(&args.output)
        .with_context(|| format!("cannot create {}", args.output.display()))?;

    let mut written = 0u32;
    while written < args.count {
        let pick = generator.rng.gen_range(0..tickers.len());
        if let Some(msg) = generator.random_message(tickers[pick].as_str()) {
            out.write_all(&msg)?;
            written += 1;
        }
    }

    tracing::info!(
        "wrote {} messages ({} sequences) to {}",
        written,
        generator.seq - 1,
        args.output.display()
    );

    if let Some(path) = &args.symbols_out {
        let mut file = std::fs::File::create(path)
            .with_context(|| format!("cannot create {}", path.display()))?;
        writeln!(file, "# tickgate symbol table")?;
        writeln!(file, "# Format: SYMBOL,INDEX")?;
        for (index, ticker) in tickers.iter().enumerate() {
            writeln!(file, "{},{}", ticker, index)?;
        }
        tracing::info!("wrote symbol table to {}", path.display());
    }

    if let Some(path) = &args.prices_out {
        let mut file = std::fs::File::create(path)
            .with_context(|| format!("cannot create {}", path.display()))?;
        writeln!(file, "# tickgate reference prices")?;
        writeln!(file, "# Format: INDEX,PRICE")?;
        for index in 0..tickers.len() {
            writeln!(file, "{},150.00", index)?;
        }
        tracing::info!("wrote reference prices to {}", path.display());
    }

    Ok(())
}
