//! The assembled data path
//!
//! [`Pipeline`] owns every data-path stage and is driven by one thread
//! calling [`Pipeline::on_payload`] per UDP payload. [`ConfigHandle`]
//! is the other side of the contract: a cloneable handle the
//! configuration thread uses to adjust risk parameters, load symbols,
//! write reference prices and read statistics - all through
//! single-word release stores that the data path observes at message
//! granularity.
//!
//! ```text
//! on_payload ─▶ intake ─▶ splitter ─▶ decoder ─▶ book ─▶ gate ─▶ ring
//!                                        ▲                ▲
//!                          active symbol map       params / ref prices
//!                                        └── ConfigHandle ─┘
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::book::{Book, BookEvent};
use crate::clock::Clock;
use crate::core::{ConfigError, LoadError, SymbolKey};
use crate::feed::types::carries_symbol;
use crate::feed::{decode, FrameIntake, MessageSplitter, RawFrame, SeqConfig};
use crate::refprice::ReferencePrices;
use crate::ring::{ring, DecisionRecord, RingConsumer, RingProducer};
use crate::risk::gate::RejectReason;
use crate::risk::{RiskGate, RiskParams, SharedRiskParams, Verdict};
use crate::symbols::SymbolTable;
use crate::telemetry::{Counters, HistogramSnapshot, LatencyHistogram, StatsSnapshot};

/// State shared between the data path and the configuration thread.
struct Shared {
    params: SharedRiskParams,
    symbols: SymbolTable,
    ref_prices: ReferencePrices,
    counters: Counters,
    histogram: LatencyHistogram,
    seq_check_enabled: AtomicBool,
    clear_stale_request: AtomicBool,
    shutdown: AtomicBool,
}

/// The single-threaded data path.
pub struct Pipeline<C: Clock> {
    clock: C,
    shared: Arc<Shared>,
    intake: FrameIntake,
    splitter: MessageSplitter,
    book: Book,
    gate: RiskGate,
    producer: RingProducer,
    /// Most recently referenced symbol, for order-reference messages
    last_symbol: Option<u16>,
}

impl<C: Clock> Pipeline<C> {
    /// Build a pipeline with a decision ring of `ring_len` records
    /// (nonzero power of two).
    pub fn new(
        clock: C,
        ring_len: u32,
    ) -> Result<(Self, ConfigHandle, RingConsumer), ConfigError> {
        let (producer, consumer) = ring(ring_len)?;
        let shared = Arc::new(Shared {
            params: SharedRiskParams::new(RiskParams::default()),
            symbols: SymbolTable::new(),
            ref_prices: ReferencePrices::new(),
            counters: Counters::new(),
            histogram: LatencyHistogram::new(),
            seq_check_enabled: AtomicBool::new(true),
            clear_stale_request: AtomicBool::new(false),
            shutdown: AtomicBool::new(false),
        });

        tracing::info!(ring_len, "pipeline initialized");

        Ok((
            Self {
                clock,
                shared: Arc::clone(&shared),
                intake: FrameIntake::new(),
                splitter: MessageSplitter::new(),
                book: Book::new(),
                gate: RiskGate::new(),
                producer,
                last_symbol: None,
            },
            ConfigHandle { shared },
            consumer,
        ))
    }

    /// Feed one UDP payload with its ingress timestamp.
    ///
    /// Consumes the bytes and returns; every failure mode inside is a
    /// counter, never an error.
    pub fn on_payload(&mut self, bytes: &[u8], ingress_ts_ns: u64) {
        let shared = &*self.shared;
        if shared.shutdown.load(Ordering::Acquire) {
            return;
        }

        Counters::inc(&shared.counters.rx_packets);
        Counters::add(&shared.counters.rx_bytes, bytes.len() as u64);

        if shared.clear_stale_request.swap(false, Ordering::AcqRel) {
            self.splitter.clear_stale();
        }

        if !self.intake.on_payload(bytes) {
            Counters::inc(&shared.counters.intake_drops);
            return;
        }

        let seq_cfg = SeqConfig {
            enabled: shared.seq_check_enabled.load(Ordering::Acquire),
            gap_threshold: shared.params.seq_gap_threshold(),
        };

        let clock = &self.clock;
        let book = &mut self.book;
        let gate = &mut self.gate;
        let producer = &mut self.producer;
        let last_symbol = &mut self.last_symbol;

        let stats = self.splitter.split(
            self.intake.buffered(),
            ingress_ts_ns,
            seq_cfg,
            |frame| {
                process_frame(
                    &frame, shared, clock, book, gate, producer, last_symbol,
                );
            },
        );

        Counters::add(&shared.counters.seq_gaps, stats.gaps as u64);
        Counters::add(&shared.counters.seq_dupes, stats.dupes as u64);

        if stats.desync {
            Counters::inc(&shared.counters.desyncs);
            self.intake.clear();
        } else {
            self.intake.consume(stats.consumed);
        }
    }

    /// Whether a cooperative shutdown has been requested.
    #[inline]
    pub fn should_stop(&self) -> bool {
        self.shared.shutdown.load(Ordering::Acquire)
    }

    /// Read a symbol's current top-of-book entry (diagnostics).
    pub fn book_entry(&self, index: u16) -> crate::book::BookEntry {
        *self.book.get(index)
    }
}

/// One frame: decode, resolve, update the book, gate, publish.
#[allow(clippy::too_many_arguments)]
fn process_frame<C: Clock>(
    frame: &RawFrame,
    shared: &Shared,
    clock: &C,
    book: &mut Book,
    gate: &mut RiskGate,
    producer: &mut RingProducer,
    last_symbol: &mut Option<u16>,
) {
    let counters = &shared.counters;
    Counters::inc(&counters.parsed_messages);

    let decoded = decode(frame, &shared.symbols, clock.now_ns());
    if !decoded.is_book_affecting {
        return;
    }

    // Resolve the symbol index: symbol-bearing messages carry their
    // own; order-reference messages fall back to the last one seen.
    let index = if carries_symbol(decoded.msg_type) {
        if !decoded.symbol_valid {
            Counters::inc(&counters.unknown_symbol);
            return;
        }
        *last_symbol = Some(decoded.symbol_index);
        decoded.symbol_index
    } else {
        match *last_symbol {
            Some(index) => index,
            None => {
                Counters::inc(&counters.unresolved_refs);
                return;
            }
        }
    };

    let event = book.apply(index, &decoded, clock.now_ns());
    Counters::inc(&counters.book_updates);
    if event.bank_conflict {
        Counters::inc(&counters.bank_conflicts);
    }

    let params = shared.params.load();
    let generation = shared.params.generation();
    let ref_price = shared.ref_prices.get(index);
    let decision_ts = clock.now_ns();
    let verdict = gate.evaluate(&event, &params, generation, ref_price, decision_ts);

    match verdict.reason {
        None => Counters::inc(&counters.risk_accepts),
        Some(RejectReason::Kill) => Counters::inc(&counters.rejects_kill),
        Some(RejectReason::StaleGap) => Counters::inc(&counters.rejects_stale_gap),
        Some(RejectReason::PriceBand) => Counters::inc(&counters.rejects_price_band),
        Some(RejectReason::Token) => Counters::inc(&counters.rejects_token),
        Some(RejectReason::Position) => Counters::inc(&counters.rejects_position),
        Some(RejectReason::StaleAge) => Counters::inc(&counters.rejects_stale_age),
    }

    let record = build_record(&event, &verdict, ref_price, decision_ts);
    if producer.publish(record) {
        Counters::inc(&counters.dma_records);
        shared
            .histogram
            .record(decision_ts.saturating_sub(event.ingress_ts));
    } else {
        Counters::inc(&counters.dma_drops);
    }
}

/// Assemble the wire record for one verdict.
fn build_record(
    event: &BookEvent,
    verdict: &Verdict,
    ref_price: u32,
    decision_ts: u64,
) -> DecisionRecord {
    let tob = &event.tob;
    let (side_px, side_qty) = tob.side(event.side);
    DecisionRecord {
        seq: event.seq,
        reserved0: 0,
        ts_ingress: event.ingress_ts,
        ts_decision: decision_ts,
        symbol_index: event.symbol_index,
        side: event.side as u8,
        flags: verdict.flags,
        qty: side_qty,
        price: side_px,
        ref_price,
        // Unsigned spread; a crossed book wraps, matching the source.
        feature0: tob.ask_px.wrapping_sub(tob.bid_px),
        feature1: (tob.bid_qty as i64 - tob.ask_qty as i64) as i32,
        feature2: tob.last_trade_px,
        payload_crc16: 0, // stamped by the ring at publish
        pad: 0,
        reserved1: 0,
    }
}

/// Configuration-thread handle: typed calls over the shared state.
#[derive(Clone)]
pub struct ConfigHandle {
    shared: Arc<Shared>,
}

impl ConfigHandle {
    /// Publish a full risk parameter set. Also re-arms the token
    /// bucket to the new capacity.
    pub fn set_risk_params(&self, params: RiskParams) {
        tracing::info!(?params, "risk parameters updated");
        self.shared.params.store(params);
    }

    /// Current risk parameters.
    pub fn risk_params(&self) -> RiskParams {
        self.shared.params.load()
    }

    /// Toggle the kill switch; observed by the gate within O(1) messages.
    pub fn set_kill(&self, kill: bool) {
        if kill {
            tracing::warn!("kill switch asserted");
        } else {
            tracing::info!("kill switch cleared");
        }
        self.shared.params.set_kill(kill);
    }

    /// Stage a symbol mapping in the shadow map.
    pub fn load_symbol(&self, key: SymbolKey, index: u16) -> Result<(), LoadError> {
        self.shared.symbols.load(&key, index)
    }

    /// Atomically activate all staged symbol loads.
    pub fn commit_symbols(&self) {
        self.shared.symbols.commit();
        tracing::info!("symbol table committed");
    }

    /// Write one reference price (0 disables the band check).
    pub fn set_reference_price(&self, index: u16, price: u32) {
        self.shared.ref_prices.set(index, price);
    }

    /// Enable or disable sequence checking in the splitter.
    pub fn set_seq_check_enabled(&self, enabled: bool) {
        self.shared
            .seq_check_enabled
            .store(enabled, Ordering::Release);
    }

    /// Ask the data path to drop its stale latch.
    pub fn clear_stale(&self) {
        self.shared
            .clear_stale_request
            .store(true, Ordering::Release);
    }

    /// Record a frame-check failure observed by the capture adapter.
    pub fn note_crc_error(&self) {
        Counters::inc(&self.shared.counters.crc_errors);
    }

    /// Request cooperative shutdown of the data path.
    pub fn shutdown(&self) {
        tracing::info!("shutdown requested");
        self.shared.shutdown.store(true, Ordering::Release);
    }

    pub fn is_shutdown(&self) -> bool {
        self.shared.shutdown.load(Ordering::Acquire)
    }

    /// Read-only aggregate of counters and latency summary.
    pub fn snapshot_stats(&self) -> StatsSnapshot {
        StatsSnapshot {
            counters: self.shared.counters.snapshot(),
            latency: self.shared.histogram.summary(),
        }
    }

    /// Full latency histogram for offline percentile work.
    pub fn latency_histogram(&self) -> HistogramSnapshot {
        self.shared.histogram.snapshot()
    }
}
