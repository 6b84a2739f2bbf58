//! # Counting Bloom Filter
//!
//! Bloom filter with a counter behind every bit, so items can be removed.
//!
//! - Insert: increment the counter at each hashed position; 0 -> 1 sets the bit
//! - Erase: decrement each hashed counter; -> 0 clears the bit
//! - Membership: possibly present iff every hashed counter is non-zero
//!
//! INVARIANT: `bit[i] == 1` iff `counter[i] > 0`.
//!
//! Counters are 8-bit and saturate at 255. A saturated counter is sticky: it
//! is never decremented again, since its true value is unknown and lowering
//! it could produce a false negative.
//!
//! Erasing an item that was never inserted is detected when one of its
//! counters is already zero and is then a no-op. An item whose slots are all
//! covered by other items cannot be told apart from an inserted one; erasing it
//! lowers shared counters and may cause false negatives for those items. That
//! is the intrinsic limitation of counting Bloom filters.

use std::hash::Hash;
use std::marker::PhantomData;

use tracing::debug;

use super::bit_array::FixedBitArray;
use super::config::{validate_hash_count, BloomConfig};
use super::hash_functions::{HashFamily, ItemHasher, SipItemHasher};
use super::outcome::QueryResult;
use super::parameters::false_positive_probability;
use crate::error::FilterError;
use crate::ports::observer::{FilterEvent, Observer, ObserverSlot, Operation, Outcome, Snapshot};

/// Counter value that is never decremented again.
pub const SATURATED_COUNTER: u8 = u8::MAX;

/// Counting Bloom filter with 8-bit counters
///
/// Supports both insert AND erase, unlike [`SimpleBloomFilter`](super::SimpleBloomFilter).
#[derive(Debug)]
pub struct CountingBloomFilter<T: ?Sized, H = SipItemHasher> {
    bits: FixedBitArray,
    counters: Vec<u8>,
    hashes: HashFamily<H>,
    /// Net successful inserts minus erases
    items: usize,
    observer: ObserverSlot,
    _item: PhantomData<fn(&T)>,
}

impl<T: ?Sized, H: Clone> Clone for CountingBloomFilter<T, H> {
    fn clone(&self) -> Self {
        Self {
            bits: self.bits.clone(),
            counters: self.counters.clone(),
            hashes: self.hashes.clone(),
            items: self.items,
            observer: self.observer.clone(),
            _item: PhantomData,
        }
    }
}

impl<T: Hash + ?Sized> CountingBloomFilter<T> {
    /// Create a filter with the default hasher
    pub fn new(config: BloomConfig) -> Result<Self, FilterError> {
        Self::with_hasher(config, SipItemHasher::default())
    }
}

impl<T: Hash + ?Sized, H: ItemHasher> CountingBloomFilter<T, H> {
    /// Create a filter with a custom base hasher
    pub fn with_hasher(config: BloomConfig, hasher: H) -> Result<Self, FilterError> {
        config.validate()?;
        debug!(
            hash_count = config.hash_count,
            size_bits = config.size_bits,
            "Counting Bloom filter created"
        );
        Ok(Self {
            bits: FixedBitArray::new(config.size_bits),
            counters: vec![0u8; config.size_bits],
            hashes: HashFamily::new(hasher, config.hash_count),
            items: 0,
            observer: ObserverSlot::default(),
            _item: PhantomData,
        })
    }

    /// Reset bits and counters and rebuild the hash family with `k` functions
    pub fn init(&mut self, k: usize) -> Result<(), FilterError> {
        validate_hash_count(k)?;
        self.reset();
        self.hashes.rebuild(k);
        debug!(
            hash_count = k,
            size_bits = self.capacity(),
            "Counting Bloom filter initialized"
        );
        self.notify(Operation::Init, Outcome::Applied, None);
        Ok(())
    }

    /// Insert an item (increment counters)
    pub fn insert(&mut self, item: &T) {
        let m = self.capacity();
        for idx in self.hashes.indices(item, m) {
            let counter = &mut self.counters[idx];
            if *counter == 0 {
                self.bits.set(idx);
            }
            *counter = counter.saturating_add(1);
        }
        self.items += 1;
        self.notify(Operation::Insert, Outcome::Applied, None);
    }

    /// Test whether an item might be in the set
    pub fn query(&self, item: &T) -> QueryResult {
        let m = self.capacity();
        for idx in self.hashes.indices(item, m) {
            if self.counters[idx] == 0 {
                self.notify(Operation::Query, Outcome::Miss, Some(idx));
                return QueryResult::Absent;
            }
        }

        self.notify(Operation::Query, Outcome::Hit, None);
        QueryResult::PossiblyPresent {
            false_positive_probability: self.false_positive_probability(),
        }
    }

    /// Shorthand for `query(item).is_possibly_present()`
    pub fn contains(&self, item: &T) -> bool {
        self.query(item).is_possibly_present()
    }

    /// Erase an item (decrement counters)
    ///
    /// Returns `false`, changing nothing, when the item is provably absent.
    pub fn erase(&mut self, item: &T) -> bool {
        let m = self.capacity();
        if let Some(idx) = self
            .hashes
            .indices(item, m)
            .find(|&idx| self.counters[idx] == 0)
        {
            debug!(index = idx, "Erase ignored: item not present");
            self.notify(Operation::Erase, Outcome::Rejected, Some(idx));
            return false;
        }

        for idx in self.hashes.indices(item, m) {
            let counter = &mut self.counters[idx];
            // A repeated index may already have reached zero in this loop.
            if *counter == 0 || *counter == SATURATED_COUNTER {
                continue;
            }
            *counter -= 1;
            if *counter == 0 {
                self.bits.reset(idx);
            }
        }
        self.items = self.items.saturating_sub(1);
        self.notify(Operation::Erase, Outcome::Applied, None);
        true
    }
}

impl<T: ?Sized, H> CountingBloomFilter<T, H> {
    /// Current false-positive estimate: `(1 - e^(-k*n/M))^k`
    pub fn false_positive_probability(&self) -> f64 {
        false_positive_probability(self.hashes.len(), self.bits.count_ones(), self.capacity())
    }

    /// Counter value at `index`, or `None` when out of range
    pub fn counter(&self, index: usize) -> Option<u8> {
        self.counters.get(index).copied()
    }

    /// Percentage of set bits, rounded down
    pub fn load_factor(&self) -> u32 {
        self.bits.load_percent()
    }

    /// Number of set bits
    pub fn size(&self) -> usize {
        self.bits.count_ones()
    }

    /// Indices of the set bits, ascending
    pub fn bits_set(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits.iter_ones()
    }

    /// True when no bit is set
    pub fn is_empty(&self) -> bool {
        self.bits.count_ones() == 0
    }

    /// Successful inserts minus successful erases
    pub fn items(&self) -> usize {
        self.items
    }

    /// Number of hash functions (k)
    pub fn hash_count(&self) -> usize {
        self.hashes.len()
    }

    /// Bit capacity (M)
    pub fn capacity(&self) -> usize {
        self.bits.capacity()
    }

    /// Zero every counter and bit, keeping k
    pub fn clear(&mut self) {
        self.reset();
    }

    /// Read-only view of the internal state
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot::CountingBloom {
            bits: &self.bits,
            counters: &self.counters,
            hash_count: self.hashes.len(),
        }
    }

    /// Attach an observer, returning the previous one
    pub fn set_observer(&mut self, observer: Box<dyn Observer>) -> Option<Box<dyn Observer>> {
        self.observer.attach(observer)
    }

    /// Detach the current observer
    pub fn take_observer(&mut self) -> Option<Box<dyn Observer>> {
        self.observer.detach()
    }

    fn reset(&mut self) {
        self.bits.reset_all();
        self.counters.fill(0);
        self.items = 0;
    }

    fn notify(&self, op: Operation, outcome: Outcome, highlight: Option<usize>) {
        self.observer.notify(|| FilterEvent {
            op,
            outcome,
            highlight,
            snapshot: self.snapshot(),
        });
    }
}
