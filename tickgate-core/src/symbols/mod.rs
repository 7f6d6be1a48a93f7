//! Double-buffered symbol table
//!
//! Fixed-capacity open-addressed hash map from the 8-byte padded
//! symbol key to its dense index. Two maps exist at all times: the
//! data path reads the *active* map, bulk loads accumulate in the
//! *shadow* map, and a commit swaps which is which with a single
//! release store. Lookups pair it with an acquire load, so the data
//! path observes each commit as all-or-nothing.
//!
//! Every slot is a pair of single-word atomics (the key is exactly one
//! `u64`), so no lock is ever taken and no torn key can be observed.
//! The shadow never deletes individual entries - it is only ever
//! cleared whole after a commit - so an empty slot terminates a probe
//! chain.
//!
//! Commits are expected to be infrequent and serialized by the load
//! adapter; exactly one may be in flight.

use std::sync::atomic::{AtomicU16, AtomicU64, AtomicUsize, Ordering};

use crate::core::{LoadError, SymbolKey, MAX_SYMBOLS};

/// Linear-probe schedule length; a miss is decisive after this many slots.
const PROBE_LIMIT: usize = 8;

/// Empty-slot sentinel. Symbol keys are ASCII (space-padded) and can
/// never encode to zero.
const EMPTY: u64 = 0;

/// Fold the 8-byte key to 32 bits and mix.
#[inline(always)]
fn fold_hash(key: u64) -> u32 {
    let mut h = (key as u32) ^ ((key >> 32) as u32);
    h ^= h >> 16;
    h ^= h >> 8;
    h
}

#[inline(always)]
fn key_word(key: &SymbolKey) -> u64 {
    u64::from_le_bytes(*key)
}

/// One open-addressed map: parallel key/index slot arrays.
struct ProbeMap {
    keys: Box<[AtomicU64]>,
    indices: Box<[AtomicU16]>,
}

impl ProbeMap {
    fn new() -> Self {
        Self {
            keys: (0..MAX_SYMBOLS).map(|_| AtomicU64::new(EMPTY)).collect(),
            indices: (0..MAX_SYMBOLS).map(|_| AtomicU16::new(0)).collect(),
        }
    }

    #[inline(always)]
    fn slot_of(&self, key: u64, probe: usize) -> usize {
        (fold_hash(key) as usize + probe) & (MAX_SYMBOLS - 1)
    }

    fn lookup(&self, key: u64) -> Option<u16> {
        for probe in 0..PROBE_LIMIT {
            let slot = self.slot_of(key, probe);
            let stored = self.keys[slot].load(Ordering::Acquire);
            if stored == key {
                return Some(self.indices[slot].load(Ordering::Relaxed));
            }
            if stored == EMPTY {
                return None;
            }
        }
        None
    }

    fn insert(&self, key: u64, index: u16) -> bool {
        for probe in 0..PROBE_LIMIT {
            let slot = self.slot_of(key, probe);
            let stored = self.keys[slot].load(Ordering::Acquire);
            if stored == key {
                // Re-load of an existing symbol updates its index.
                self.indices[slot].store(index, Ordering::Relaxed);
                return true;
            }
            if stored == EMPTY {
                // Index first, then the key with release: a reader that
                // sees the key also sees its index.
                self.indices[slot].store(index, Ordering::Relaxed);
                self.keys[slot].store(key, Ordering::Release);
                return true;
            }
        }
        false
    }

    fn clear(&self) {
        for slot in self.keys.iter() {
            slot.store(EMPTY, Ordering::Relaxed);
        }
    }
}

/// The double-buffered table.
pub struct SymbolTable {
    maps: [ProbeMap; 2],
    /// Which map the data path reads (0 or 1)
    active: AtomicUsize,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            maps: [ProbeMap::new(), ProbeMap::new()],
            active: AtomicUsize::new(0),
        }
    }

    /// Data-path lookup against the active map.
    ///
    /// The acquire load of the active index pairs with the release
    /// store in [`commit`](Self::commit).
    #[inline]
    pub fn lookup(&self, key: &SymbolKey) -> Option<u16> {
        let map = &self.maps[self.active.load(Ordering::Acquire)];
        map.lookup(key_word(key))
    }

    /// Stage a (key, index) mapping in the shadow map.
    ///
    /// Not visible to the data path until [`commit`](Self::commit).
    pub fn load(&self, key: &SymbolKey, index: u16) -> Result<(), LoadError> {
        if (index as usize) >= MAX_SYMBOLS {
            return Err(LoadError::IndexOutOfRange {
                index: index as u32,
            });
        }
        let shadow = &self.maps[1 - self.active.load(Ordering::Acquire)];
        if shadow.insert(key_word(key), index) {
            Ok(())
        } else {
            Err(LoadError::TableFull { key: *key })
        }
    }

    /// Activate the shadow map and clear the map it replaces.
    ///
    /// The swap is a single release store; after it, new lookups see
    /// the freshly loaded map and the old active map becomes the (now
    /// empty) shadow for the next load session.
    pub fn commit(&self) {
        let old_active = self.active.load(Ordering::Acquire);
        self.active.store(1 - old_active, Ordering::Release);
        self.maps[old_active].clear();
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}
