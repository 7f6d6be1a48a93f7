//! Reference price table
//!
//! Flat array indexed by symbol index. Writes arrive from the
//! configuration channel as single-word stores; the risk gate reads
//! with single-word loads. A value of 0 means "no reference loaded"
//! and disables the price-band check for that symbol.
//!
//! Reference prices change rarely and the price-band thresholds are
//! coarse, so readers tolerate observing a store from either side of a
//! check boundary.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::core::MAX_SYMBOLS;

pub struct ReferencePrices {
    prices: Box<[AtomicU32]>,
}

impl ReferencePrices {
    pub fn new() -> Self {
        Self {
            prices: (0..MAX_SYMBOLS).map(|_| AtomicU32::new(0)).collect(),
        }
    }

    /// Set the reference price for a symbol index. Out-of-range
    /// indices are ignored (the config surface validates them first).
    #[inline]
    pub fn set(&self, index: u16, price: u32) {
        if let Some(slot) = self.prices.get(index as usize) {
            slot.store(price, Ordering::Release);
        }
    }

    /// Current reference price; 0 when none is loaded.
    #[inline(always)]
    pub fn get(&self, index: u16) -> u32 {
        self.prices
            .get(index as usize)
            .map(|slot| slot.load(Ordering::Acquire))
            .unwrap_or(0)
    }
}

impl Default for ReferencePrices {
    fn default() -> Self {
        Self::new()
    }
}
