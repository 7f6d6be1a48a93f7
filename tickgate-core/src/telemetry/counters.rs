//! Monotonic event counters
//!
//! One atomic per counted event. The block is cache-line aligned as a
//! whole; with a single writer there is no cross-core contention to
//! pad away, only the occasional snapshot read from the configuration
//! thread.

use std::sync::atomic::{AtomicU64, Ordering};

macro_rules! counters {
    ($($(#[$doc:meta])* $name:ident),+ $(,)?) => {
        /// Live counter block (data path writes, config thread reads).
        #[repr(C, align(64))]
        #[derive(Debug, Default)]
        pub struct Counters {
            $($(#[$doc])* pub $name: AtomicU64,)+
        }

        /// Point-in-time copy of every counter.
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        pub struct CountersSnapshot {
            $($(#[$doc])* pub $name: u64,)+
        }

        impl Counters {
            pub const fn new() -> Self {
                Self {
                    $($name: AtomicU64::new(0),)+
                }
            }

            pub fn snapshot(&self) -> CountersSnapshot {
                CountersSnapshot {
                    $($name: self.$name.load(Ordering::Relaxed),)+
                }
            }
        }
    };
}

counters! {
    /// UDP payloads handed to the intake
    rx_packets,
    /// Bytes handed to the intake
    rx_bytes,
    /// Frame-check failures reported by the capture adapter
    crc_errors,
    /// Payloads dropped for being shorter than the ITCH header
    intake_drops,
    /// Framing desyncs (unknown type byte; packet remainder dropped)
    desyncs,
    /// Sequence gap events
    seq_gaps,
    /// Duplicate / out-of-order messages dropped
    seq_dupes,
    /// Messages framed and decoded
    parsed_messages,
    /// Book-affecting messages applied to the top-of-book
    book_updates,
    /// Symbol-bearing messages whose key missed the active map
    unknown_symbol,
    /// Order-reference messages with no prior symbol to resolve against
    unresolved_refs,
    /// Consecutive book updates landing in the same bank
    bank_conflicts,
    /// Decisions accepted by the risk gate
    risk_accepts,
    /// Rejects: kill switch active
    rejects_kill,
    /// Rejects: sequence-gap staleness
    rejects_stale_gap,
    /// Rejects: price band exceeded
    rejects_price_band,
    /// Rejects: token bucket empty
    rejects_token,
    /// Rejects: position limit exceeded
    rejects_position,
    /// Rejects: event age over threshold
    rejects_stale_age,
    /// Decision records published to the ring
    dma_records,
    /// Decision records dropped on a full ring
    dma_drops,
}

impl Counters {
    #[inline(always)]
    pub fn inc(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn add(counter: &AtomicU64, n: u64) {
        counter.fetch_add(n, Ordering::Relaxed);
    }
}

impl CountersSnapshot {
    /// Total rejects across every reason.
    pub fn risk_rejects(&self) -> u64 {
        self.rejects_kill
            + self.rejects_stale_gap
            + self.rejects_price_band
            + self.rejects_token
            + self.rejects_position
            + self.rejects_stale_age
    }
}
