//! Single-producer/single-consumer decision ring
//!
//! A power-of-two array of decision records synchronized by two
//! monotonically increasing `u32` indices. The low `log2(len)` bits of
//! each index select the slot; the ring is full when
//! `producer − consumer == len` and empty when they are equal.
//!
//! The producer owns a slot from the moment it starts writing until it
//! publishes the incremented producer index with a release store; the
//! consumer's acquire load of that index makes the slot's bytes
//! visible. Symmetrically, the consumer's release store of its index
//! returns slots to the producer. There is no blocking anywhere: a
//! full ring drops the newest record, and the caller counts the drop.

use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use crossbeam_utils::CachePadded;

use crate::core::ConfigError;

use super::record::DecisionRecord;

struct Shared {
    slots: Box<[UnsafeCell<DecisionRecord>]>,
    mask: u32,
    capacity: u32,
    /// Occupancy at or above this raises the almost-full flag
    almost_full_threshold: u32,
    producer: CachePadded<AtomicU32>,
    consumer: CachePadded<AtomicU32>,
    almost_full: AtomicBool,
}

// The UnsafeCell slots are safe to share: a slot is written only by
// the producer while unpublished, and read only by the consumer while
// published; the index pair carries the happens-before edges.
unsafe impl Sync for Shared {}
unsafe impl Send for Shared {}

/// Build a ring of `capacity` records (nonzero power of two).
///
/// The almost-full watermark defaults to `capacity − 64`, floored at
/// one slot for small rings; it is a status flag only and never
/// changes publish behavior.
pub fn ring(capacity: u32) -> Result<(RingProducer, RingConsumer), ConfigError> {
    if capacity == 0 || !capacity.is_power_of_two() {
        return Err(ConfigError::BadRingLen { len: capacity });
    }
    let shared = Arc::new(Shared {
        slots: (0..capacity)
            .map(|_| UnsafeCell::new(DecisionRecord::zeroed()))
            .collect(),
        mask: capacity - 1,
        capacity,
        almost_full_threshold: capacity.saturating_sub(64).max(1),
        producer: CachePadded::new(AtomicU32::new(0)),
        consumer: CachePadded::new(AtomicU32::new(0)),
        almost_full: AtomicBool::new(false),
    });
    Ok((
        RingProducer {
            shared: Arc::clone(&shared),
            head: 0,
        },
        RingConsumer {
            shared,
            read_cursor: 0,
            committed: 0,
        },
    ))
}

/// Producer half (data-path thread).
pub struct RingProducer {
    shared: Arc<Shared>,
    /// Local copy of the producer index (single writer)
    head: u32,
}

impl RingProducer {
    /// Publish one record.
    ///
    /// Returns false (record dropped, ring untouched) when the ring is
    /// full. The record's CRC is stamped immediately before the slot
    /// write, after every other field.
    pub fn publish(&mut self, mut record: DecisionRecord) -> bool {
        let consumer = self.shared.consumer.load(Ordering::Acquire);
        let occupancy = self.head.wrapping_sub(consumer);
        if occupancy == self.shared.capacity {
            return false;
        }

        record.seal();
        let slot = (self.head & self.shared.mask) as usize;
        unsafe {
            *self.shared.slots[slot].get() = record;
        }

        self.head = self.head.wrapping_add(1);
        self.shared.producer.store(self.head, Ordering::Release);

        self.shared.almost_full.store(
            occupancy + 1 >= self.shared.almost_full_threshold,
            Ordering::Relaxed,
        );
        true
    }

    /// Records currently buffered (producer's view).
    pub fn len(&self) -> u32 {
        self.head
            .wrapping_sub(self.shared.consumer.load(Ordering::Acquire))
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Almost-full status flag (watermark, not back-pressure).
    pub fn almost_full(&self) -> bool {
        self.shared.almost_full.load(Ordering::Relaxed)
    }

    /// Raw producer index (diagnostics / invariant tests).
    pub fn producer_index(&self) -> u32 {
        self.head
    }
}

/// Consumer half (external thread).
pub struct RingConsumer {
    shared: Arc<Shared>,
    /// Next slot to hand out via `try_next`
    read_cursor: u32,
    /// Index published back to the producer via `commit`
    committed: u32,
}

impl RingConsumer {
    /// Read the next unconsumed record without releasing its slot.
    ///
    /// Returns `None` when the ring is empty. Slots stay owned by the
    /// consumer until [`commit`](Self::commit) advances past them, so
    /// a batch can be read before a single commit.
    pub fn try_next(&mut self) -> Option<DecisionRecord> {
        let producer = self.shared.producer.load(Ordering::Acquire);
        if producer == self.read_cursor {
            return None;
        }
        let slot = (self.read_cursor & self.shared.mask) as usize;
        let record = unsafe { *self.shared.slots[slot].get() };
        self.read_cursor = self.read_cursor.wrapping_add(1);
        Some(record)
    }

    /// Return `n` consumed slots to the producer with a release store.
    pub fn commit(&mut self, n: u32) {
        debug_assert!(
            self.read_cursor.wrapping_sub(self.committed) >= n,
            "committing more records than were read"
        );
        self.committed = self.committed.wrapping_add(n);
        self.shared.consumer.store(self.committed, Ordering::Release);
    }

    /// Records currently buffered (consumer's view, committed basis).
    pub fn len(&self) -> u32 {
        self.shared
            .producer
            .load(Ordering::Acquire)
            .wrapping_sub(self.committed)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn almost_full(&self) -> bool {
        self.shared.almost_full.load(Ordering::Relaxed)
    }

    /// Raw consumer index (diagnostics / invariant tests).
    pub fn consumer_index(&self) -> u32 {
        self.committed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(seq: u32) -> DecisionRecord {
        let mut rec = DecisionRecord::zeroed();
        rec.seq = seq;
        rec.ts_ingress = seq as u64 * 10;
        rec.ts_decision = seq as u64 * 10 + 5;
        rec
    }

    #[test]
    fn test_capacity_must_be_power_of_two() {
        assert!(ring(0).is_err());
        assert!(ring(12).is_err());
        assert!(ring(8).is_ok());
        assert!(ring(1).is_ok());
    }

    #[test]
    fn test_publish_consume_in_order() {
        let (mut tx, mut rx) = ring(8).unwrap();
        for seq in 0..5 {
            assert!(tx.publish(rec(seq)));
        }

        for seq in 0..5 {
            let record = rx.try_next().expect("record available");
            assert_eq!(record.seq, seq);
            assert!(record.crc_ok());
            rx.commit(1);
        }
        assert!(rx.try_next().is_none());
    }

    #[test]
    fn test_full_ring_drops_newest() {
        let (mut tx, rx) = ring(8).unwrap();
        for seq in 0..8 {
            assert!(tx.publish(rec(seq)));
        }

        // Four more publishes drop, leaving the first eight intact.
        for seq in 8..12 {
            assert!(!tx.publish(rec(seq)));
        }

        assert_eq!(tx.len(), 8);
        assert_eq!(tx.producer_index().wrapping_sub(rx.consumer_index()), 8);
    }

    #[test]
    fn test_drops_recover_after_commit() {
        let (mut tx, mut rx) = ring(2).unwrap();
        assert!(tx.publish(rec(0)));
        assert!(tx.publish(rec(1)));
        assert!(!tx.publish(rec(2)));

        rx.try_next().unwrap();
        rx.commit(1);

        assert!(tx.publish(rec(3)));
        assert_eq!(rx.try_next().unwrap().seq, 1);
        assert_eq!(rx.try_next().unwrap().seq, 3);
    }

    #[test]
    fn test_batch_read_then_commit() {
        let (mut tx, mut rx) = ring(8).unwrap();
        for seq in 0..4 {
            tx.publish(rec(seq));
        }

        // Read all four before committing any.
        let batch: Vec<_> = std::iter::from_fn(|| rx.try_next()).collect();
        assert_eq!(batch.len(), 4);
        assert_eq!(tx.len(), 4, "slots not yet released");

        rx.commit(4);
        assert_eq!(tx.len(), 0);
    }

    #[test]
    fn test_index_invariant_holds_across_wrap() {
        let (mut tx, mut rx) = ring(4).unwrap();

        // Push the indices well past one lap.
        for seq in 0..40 {
            assert!(tx.publish(rec(seq)));
            let record = rx.try_next().unwrap();
            assert_eq!(record.seq, seq);
            rx.commit(1);

            let spread = tx.producer_index().wrapping_sub(rx.consumer_index());
            assert!(spread <= 4);
        }
    }

    #[test]
    fn test_almost_full_watermark() {
        let (mut tx, mut rx) = ring(8).unwrap();
        // Threshold for an 8-slot ring floors at one occupied slot.
        assert!(!tx.almost_full());
        tx.publish(rec(0));
        assert!(tx.almost_full());

        rx.try_next().unwrap();
        rx.commit(1);
        tx.publish(rec(1));
        assert!(tx.almost_full());
    }

    #[test]
    fn test_cross_thread_handoff() {
        let (mut tx, mut rx) = ring(64).unwrap();
        const N: u32 = 100_000;

        let consumer = std::thread::spawn(move || {
            let mut expected = 0u32;
            while expected < N {
                if let Some(record) = rx.try_next() {
                    assert_eq!(record.seq, expected, "out-of-order record");
                    assert!(record.crc_ok(), "torn record observed");
                    rx.commit(1);
                    expected += 1;
                } else {
                    std::hint::spin_loop();
                }
            }
        });

        let mut seq = 0u32;
        while seq < N {
            if tx.publish(rec(seq)) {
                seq += 1;
            } else {
                std::hint::spin_loop();
            }
        }
        consumer.join().unwrap();
    }
}
