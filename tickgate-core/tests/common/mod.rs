//! Shared helpers for the integration suites: message builders and a
//! pre-wired pipeline with a manual clock.

#![allow(dead_code)]

use tickgate_core::prelude::*;

pub const AAPL: [u8; 8] = *b"AAPL    ";
pub const MSFT: [u8; 8] = *b"MSFT    ";

/// Risk parameters with every check effectively disabled except the
/// ones a test turns back on.
pub fn generous_params() -> RiskParams {
    RiskParams {
        price_band_bps: 0,
        token_rate_per_ms: 1_000,
        token_bucket_max: 1_000,
        position_limit: i32::MAX,
        stale_threshold_ns: u32::MAX,
        seq_gap_threshold: 10,
        kill: false,
    }
}

/// Pipeline with AAPL loaded at index 0 and generous parameters.
pub fn pipeline(
    ring_len: u32,
) -> (Pipeline<ManualClock>, ConfigHandle, RingConsumer, ManualClock) {
    let clock = ManualClock::new(1_000_000);
    let (pipeline, config, consumer) = Pipeline::new(clock.clone(), ring_len).unwrap();
    config.load_symbol(AAPL, 0).unwrap();
    config.commit_symbols();
    config.set_risk_params(generous_params());
    (pipeline, config, consumer, clock)
}

fn header(msg: &mut [u8], msg_type: u8, seq: u32) {
    msg[0] = msg_type;
    msg[1..5].copy_from_slice(&seq.to_be_bytes());
    // 48-bit venue timestamp: derived from the sequence, content is
    // irrelevant to the pipeline (packet ingress time is authoritative).
    msg[5..11].copy_from_slice(&(seq as u64 * 1_000).to_be_bytes()[2..8]);
}

/// Add Order ('A', 36 bytes)
pub fn add_order(seq: u32, side: u8, shares: u32, stock: &[u8; 8], price: u32) -> Vec<u8> {
    let mut msg = vec![0u8; 36];
    header(&mut msg, b'A', seq);
    msg[11..19].copy_from_slice(&(900_000 + seq as u64).to_be_bytes());
    msg[19] = side;
    msg[20..24].copy_from_slice(&shares.to_be_bytes());
    msg[24..32].copy_from_slice(stock);
    msg[32..36].copy_from_slice(&price.to_be_bytes());
    msg
}

/// Order Executed ('E', 31 bytes)
pub fn executed(seq: u32, order_ref: u64, shares: u32) -> Vec<u8> {
    let mut msg = vec![0u8; 31];
    header(&mut msg, b'E', seq);
    msg[11..19].copy_from_slice(&order_ref.to_be_bytes());
    msg[19..23].copy_from_slice(&shares.to_be_bytes());
    msg
}

/// Order Delete ('D', 19 bytes)
pub fn delete(seq: u32, order_ref: u64) -> Vec<u8> {
    let mut msg = vec![0u8; 19];
    header(&mut msg, b'D', seq);
    msg[11..19].copy_from_slice(&order_ref.to_be_bytes());
    msg
}

/// Trade ('P', 44 bytes)
pub fn trade(seq: u32, side: u8, shares: u32, stock: &[u8; 8], price: u32) -> Vec<u8> {
    let mut msg = vec![0u8; 44];
    header(&mut msg, b'P', seq);
    msg[11..19].copy_from_slice(&(700_000 + seq as u64).to_be_bytes());
    msg[19] = side;
    msg[20..24].copy_from_slice(&shares.to_be_bytes());
    msg[24..32].copy_from_slice(stock);
    msg[32..36].copy_from_slice(&price.to_be_bytes());
    msg[36..44].copy_from_slice(&(800_000 + seq as u64).to_be_bytes());
    msg
}

/// Drain every available record, committing as we go.
pub fn drain(consumer: &mut RingConsumer) -> Vec<DecisionRecord> {
    let mut records = Vec::new();
    while let Some(record) = consumer.try_next() {
        consumer.commit(1);
        records.push(record);
    }
    records
}
