//! Tickgate Core - Software Tick-to-Trade Pipeline
//!
//! A deterministic, single-threaded market-data pipeline: NASDAQ ITCH 5.0
//! payloads in, 64-byte risk-gated decision records out over a lock-free
//! SPSC ring.
//!
//! ## System Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                       DATA-PATH THREAD                           │
//! │                                                                  │
//! │  on_payload(bytes, ingress_ts)                                   │
//! │        │                                                         │
//! │        ▼                                                         │
//! │  ┌──────────┐   ┌──────────┐   ┌─────────┐   ┌──────┐   ┌─────┐ │
//! │  │  Frame   │──▶│ Message  │──▶│ Decoder │──▶│ Book │──▶│Risk │ │
//! │  │  Intake  │   │ Splitter │   │         │   │ TOB  │   │Gate │ │
//! │  └──────────┘   └──────────┘   └─────────┘   └──────┘   └──┬──┘ │
//! │                      │              │                       │    │
//! │                  seq gaps       symbol lookup          decision  │
//! │                  stale latch    (active map)           records   │
//! │                                                             │    │
//! └─────────────────────────────────────────────────────────────┼────┘
//!                                                               ▼
//!                                                   ┌───────────────────┐
//!                                                   │  SPSC ring (64-B  │
//!                                                   │  records, acquire │
//!                                                   │  /release indices)│
//!                                                   └─────────┬─────────┘
//!                                                             │
//!                                              consumer thread (try_next)
//!
//!  Config thread ──▶ ConfigHandle: risk params, kill flag, symbol
//!  loads + commit, reference prices - single-word release stores,
//!  applied at message granularity without pausing the data path.
//! ```
//!
//! ## Design Principles
//!
//! - **Zero allocation on the hot path** - every per-message structure is
//!   a fixed-size value type; the only growth is the intake assembly
//!   buffer, which stabilizes at one MTU.
//! - **Single-writer data path** - splitter, book, token bucket and
//!   histogram are owned by one thread; no synchronization inside the
//!   pipeline itself.
//! - **Acquire/release at the seams** - configuration arrives through
//!   single-word atomics; the ring is synchronized by its two indices
//!   alone.
//! - **Determinism** - with a [`clock::ManualClock`], replaying the same
//!   byte stream from the same initial state produces byte-identical
//!   decision records.
//!
//! ## Core Modules
//!
//! - [`feed`] - frame intake, ITCH message splitter, typed decoder
//! - [`symbols`] - double-buffered symbol table with atomic commit
//! - [`book`] - banked per-symbol top-of-book state
//! - [`risk`] - six-check pre-trade gate with token bucket
//! - [`ring`] - decision records and the SPSC publisher ring
//! - [`telemetry`] - counters and the ingress→decision latency histogram
//! - [`pipeline`] - the assembled data path and its configuration handle
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use tickgate_core::prelude::*;
//!
//! let (mut pipeline, config, mut consumer) =
//!     Pipeline::new(MonotonicClock::new(), 4096).unwrap();
//!
//! config.load_symbol(*b"AAPL    ", 0).unwrap();
//! config.commit_symbols();
//! config.set_reference_price(0, 1_955_000);
//! config.set_risk_params(RiskParams::default());
//!
//! // Data path: feed UDP payloads as they arrive.
//! # let payload: &[u8] = &[];
//! # let ingress_ts = 0u64;
//! pipeline.on_payload(payload, ingress_ts);
//!
//! // Consumer side (separate thread in production).
//! while let Some(record) = consumer.try_next() {
//!     println!("seq={} accepted={}", record.seq, record.is_accept());
//!     consumer.commit(1);
//! }
//! ```

pub mod book;
pub mod clock;
pub mod config;
pub mod core;
pub mod feed;
pub mod pipeline;
pub mod refprice;
pub mod ring;
pub mod risk;
pub mod symbols;
pub mod telemetry;

pub use crate::core::{fixed_point, Side, MAX_SYMBOLS};
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use pipeline::{ConfigHandle, Pipeline};
pub use ring::{DecisionRecord, RingConsumer};
pub use risk::RiskParams;
pub use telemetry::StatsSnapshot;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::clock::{Clock, ManualClock, MonotonicClock};
    pub use crate::core::{fixed_point, Side, MAX_SYMBOLS};
    pub use crate::pipeline::{ConfigHandle, Pipeline};
    pub use crate::ring::{DecisionRecord, RingConsumer};
    pub use crate::risk::RiskParams;
    pub use crate::telemetry::StatsSnapshot;
}
