//! Simple Bloom filter
//!
//! A bit array of fixed capacity M and k index-salted hash functions.
//!
//! INVARIANTS:
//! - `size()` equals the number of 1-bits and never decreases (no deletion)
//! - No false negatives: if inserted, `query()` MUST report possibly-present
//!
//! A positive answer carries the current false-positive estimate
//! `p = (1 - e^(-k*n/M))^k` with `n` the number of set bits.

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

/// Bloom filter for probabilistic membership testing
///
/// False positives are possible, false negatives are not. Items cannot be
/// removed; see [`CountingBloomFilter`](super::CountingBloomFilter) for that.
///
/// # Example
///
/// ```
/// use pds_filters::domain::{BloomConfig, SimpleBloomFilter};
///
/// let mut filter: SimpleBloomFilter<str> = SimpleBloomFilter::new(BloomConfig::new(3, 1024)?)?;
/// filter.insert("apple");
/// assert!(filter.query("apple").is_possibly_present());
/// # Ok::<(), pds_filters::FilterError>(())
/// ```
#[derive(Debug)]
pub struct SimpleBloomFilter<T: ?Sized, H = SipItemHasher> {
    bits: FixedBitArray,
    hashes: HashFamily<H>,
    observer: ObserverSlot,
    _item: PhantomData<fn(&T)>,
}

impl<T: ?Sized, H: Clone> Clone for SimpleBloomFilter<T, H> {
    fn clone(&self) -> Self {
        Self {
            bits: self.bits.clone(),
            hashes: self.hashes.clone(),
            observer: self.observer.clone(),
            _item: PhantomData,
        }
    }
}

impl<T: Hash + ?Sized> SimpleBloomFilter<T> {
    /// Create a filter with the default hasher
    pub fn new(config: BloomConfig) -> Result<Self, FilterError> {
        Self::with_hasher(config, SipItemHasher::default())
    }
}

impl<T: Hash + ?Sized, H: ItemHasher> SimpleBloomFilter<T, H> {
    /// Create a filter with a custom base hasher
    pub fn with_hasher(config: BloomConfig, hasher: H) -> Result<Self, FilterError> {
        config.validate()?;
        debug!(
            hash_count = config.hash_count,
            size_bits = config.size_bits,
            "Bloom filter created"
        );
        Ok(Self {
            bits: FixedBitArray::new(config.size_bits),
            hashes: HashFamily::new(hasher, config.hash_count),
            observer: ObserverSlot::default(),
            _item: PhantomData,
        })
    }

    /// Reset all state and rebuild the hash family with `k` functions
    ///
    /// The bit capacity is unchanged.
    pub fn init(&mut self, k: usize) -> Result<(), FilterError> {
        validate_hash_count(k)?;
        self.bits.reset_all();
        self.hashes.rebuild(k);
        debug!(hash_count = k, size_bits = self.capacity(), "Bloom filter initialized");
        self.notify(Operation::Init, Outcome::Applied, None);
        Ok(())
    }

    /// Insert an item
    ///
    /// The observer is notified once per hash index touched.
    pub fn insert(&mut self, item: &T) {
        let m = self.capacity();
        for idx in self.hashes.indices(item, m) {
            self.bits.set(idx);
            self.notify(Operation::Insert, Outcome::Applied, Some(idx));
        }
    }

    /// Test whether an item might be in the set
    ///
    /// Returns [`QueryResult::Absent`] as soon as one hashed bit is unset.
    pub fn query(&self, item: &T) -> QueryResult {
        let m = self.capacity();
        for idx in self.hashes.indices(item, m) {
            if !self.bits.test(idx) {
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
}

impl<T: ?Sized, H> SimpleBloomFilter<T, H> {
    /// Current false-positive estimate: `(1 - e^(-k*n/M))^k`
    pub fn false_positive_probability(&self) -> f64 {
        false_positive_probability(self.hashes.len(), self.bits.count_ones(), self.capacity())
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

    /// Number of hash functions (k)
    pub fn hash_count(&self) -> usize {
        self.hashes.len()
    }

    /// Bit capacity (M)
    pub fn capacity(&self) -> usize {
        self.bits.capacity()
    }

    /// Clear every bit, keeping k
    pub fn clear(&mut self) {
        self.bits.reset_all();
    }

    /// Read-only view of the internal state
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot::SimpleBloom {
            bits: &self.bits,
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

    fn notify(&self, op: Operation, outcome: Outcome, highlight: Option<usize>) {
        self.observer.notify(|| FilterEvent {
            op,
            outcome,
            highlight,
            snapshot: self.snapshot(),
        });
    }
}
