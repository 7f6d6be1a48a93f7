//! Decision records and the SPSC publisher ring
//!
//! The output side of the pipeline: one 64-byte record per risk
//! verdict, published into a fixed-size single-producer/single-consumer
//! ring whose only synchronization is an acquire/release pair of
//! monotonically increasing indices - the software rendering of the
//! source design's Gray-coded pointer CDC.

pub mod record;
pub mod spsc;

pub use record::{crc16_ccitt, DecisionRecord, RECORD_SIZE};
pub use spsc::{ring, RingConsumer, RingProducer};
