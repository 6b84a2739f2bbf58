//! # Cuckoo Filter
//!
//! Bucketized fingerprint table supporting deletion.
//!
//! ## Advantages over Bloom Filters
//!
//! | Feature | Bloom | Cuckoo |
//! |---------|-------|--------|
//! | Deletion | ❌ No | ✅ Yes |
//! | Space efficiency | Lower | Higher at low FPR |
//! | Capacity | Degrades gracefully | Inserts fail when full |
//!
//! ## Hashing
//!
//! ```text
//! fp = (top fingerprint_bits of hash(x)) + 1     -- in [1, 2^bits], never 0
//! i1 = hash(x) mod num_buckets
//! i2 = (i1 XOR hash(fp.to_string())) mod num_buckets
//! ```
//!
//! With a power-of-two bucket count `i2` maps back to `i1`, so a fingerprint
//! can be moved to its partner bucket without the original item.
//!
//! A slot holding 0 is empty.

use std::hash::Hash;
use std::marker::PhantomData;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

use super::config::CuckooConfig;
use super::hash_functions::{ItemHasher, SipItemHasher};
use super::outcome::Lookup;
use crate::error::FilterError;
use crate::ports::observer::{FilterEvent, Observer, ObserverSlot, Operation, Outcome, Snapshot};

/// Fingerprint stored in each slot (0 = empty).
pub type Fingerprint = u16;

/// A bucket containing a fixed number of fingerprint slots.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bucket {
    entries: Box<[Fingerprint]>,
}

impl Bucket {
    fn with_slots(slots: usize) -> Self {
        Self {
            entries: vec![0; slots].into_boxed_slice(),
        }
    }

    /// Slot contents, 0 for empty
    pub fn entries(&self) -> &[Fingerprint] {
        &self.entries
    }

    /// Number of slots
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the bucket has no slots
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of occupied slots
    pub fn occupied(&self) -> usize {
        self.entries.iter().filter(|&&e| e != 0).count()
    }

    /// Insert fingerprint if there's an empty slot.
    fn insert(&mut self, fp: Fingerprint) -> bool {
        for entry in self.entries.iter_mut() {
            if *entry == 0 {
                *entry = fp;
                return true;
            }
        }
        false
    }

    /// Check if fingerprint exists.
    fn contains(&self, fp: Fingerprint) -> bool {
        self.entries.iter().any(|&e| e == fp)
    }

    /// Clear the first slot holding `fp`.
    fn delete(&mut self, fp: Fingerprint) -> bool {
        for entry in self.entries.iter_mut() {
            if *entry == fp {
                *entry = 0;
                return true;
            }
        }
        false
    }

    /// Put `fp` in `slot`, returning the evicted fingerprint.
    fn swap(&mut self, slot: usize, fp: Fingerprint) -> Fingerprint {
        std::mem::replace(&mut self.entries[slot], fp)
    }

    fn clear(&mut self) {
        self.entries.fill(0);
    }
}

/// Cuckoo filter for probabilistic membership testing with deletion.
///
/// # Example
///
/// ```
/// use pds_filters::domain::{CuckooConfigBuilder, CuckooFilter};
///
/// let config = CuckooConfigBuilder::new().num_buckets(64).seed(1).build()?;
/// let mut filter: CuckooFilter<str> = CuckooFilter::new(config)?;
/// assert!(filter.insert("apple"));
/// assert!(filter.query("apple").is_found());
/// assert!(filter.erase("apple"));
/// assert!(filter.query("apple").is_absent());
/// # Ok::<(), pds_filters::FilterError>(())
/// ```
#[derive(Debug)]
pub struct CuckooFilter<T: ?Sized, H = SipItemHasher> {
    buckets: Vec<Bucket>,
    config: CuckooConfig,
    count: usize,
    hasher: H,
    rng: StdRng,
    observer: ObserverSlot,
    _item: PhantomData<fn(&T)>,
}

impl<T: ?Sized, H: Clone> Clone for CuckooFilter<T, H> {
    fn clone(&self) -> Self {
        Self {
            buckets: self.buckets.clone(),
            config: self.config.clone(),
            count: self.count,
            hasher: self.hasher.clone(),
            rng: self.rng.clone(),
            observer: self.observer.clone(),
            _item: PhantomData,
        }
    }
}

impl<T: Hash + ?Sized> CuckooFilter<T> {
    /// Create a filter with the default hasher
    pub fn new(config: CuckooConfig) -> Result<Self, FilterError> {
        Self::with_hasher(config, SipItemHasher::default())
    }
}

impl<T: Hash + ?Sized, H: ItemHasher> CuckooFilter<T, H> {
    /// Create a filter with a custom base hasher
    pub fn with_hasher(config: CuckooConfig, hasher: H) -> Result<Self, FilterError> {
        config.validate()?;
        debug!(
            num_buckets = config.num_buckets,
            entries_per_bucket = config.entries_per_bucket,
            fingerprint_bits = config.fingerprint_bits,
            max_kicks = config.max_kicks,
            "Cuckoo filter created"
        );
        Ok(Self {
            buckets: vec![Bucket::with_slots(config.entries_per_bucket); config.num_buckets],
            rng: seeded_rng(config.seed),
            config,
            count: 0,
            hasher,
            observer: ObserverSlot::default(),
            _item: PhantomData,
        })
    }

    /// Re-initialize with a new configuration, discarding all fingerprints
    pub fn init(&mut self, config: CuckooConfig) -> Result<(), FilterError> {
        config.validate()?;
        self.buckets = vec![Bucket::with_slots(config.entries_per_bucket); config.num_buckets];
        self.rng = seeded_rng(config.seed);
        self.config = config;
        self.count = 0;
        debug!(
            num_buckets = self.config.num_buckets,
            entries_per_bucket = self.config.entries_per_bucket,
            "Cuckoo filter initialized"
        );
        self.notify(Operation::Init, Outcome::Applied, None);
        Ok(())
    }

    /// Insert an item.
    ///
    /// Returns `true` if stored, `false` if no slot was found within
    /// `max_kicks` relocations. A failed insert leaves the relocations it made
    /// in place and drops the last evicted fingerprint; `size()` is unchanged.
    pub fn insert(&mut self, item: &T) -> bool {
        let (fp, i1, i2) = self.indices(item);

        for bucket in [i1, i2] {
            if self.buckets[bucket].insert(fp) {
                self.count += 1;
                self.notify(Operation::Insert, Outcome::Applied, Some(bucket));
                return true;
            }
        }

        let start = if self.rng.gen::<bool>() { i1 } else { i2 };
        self.relocate(fp, start)
    }

    /// Kick fingerprints between partner buckets to make room.
    fn relocate(&mut self, mut fp: Fingerprint, mut idx: usize) -> bool {
        for _ in 0..self.config.max_kicks {
            let slot = self.rng.gen_range(0..self.config.entries_per_bucket);
            fp = self.buckets[idx].swap(slot, fp);
            idx = self.alt_index(idx, fp);

            if self.buckets[idx].insert(fp) {
                self.count += 1;
                self.notify(Operation::Insert, Outcome::Applied, Some(idx));
                return true;
            }
        }

        warn!(
            max_kicks = self.config.max_kicks,
            count = self.count,
            capacity = self.capacity(),
            "Cuckoo filter insert failed: no free slot"
        );
        self.notify(Operation::Insert, Outcome::Rejected, None);
        false
    }

    /// Look an item up.
    ///
    /// [`Lookup::Absent`] is definite; [`Lookup::Found`] may be a false positive.
    pub fn query(&self, item: &T) -> Lookup {
        let (fp, i1, i2) = self.indices(item);

        for bucket in [i1, i2] {
            if self.buckets[bucket].contains(fp) {
                self.notify(Operation::Query, Outcome::Hit, Some(bucket));
                return Lookup::Found { bucket };
            }
        }

        self.notify(Operation::Query, Outcome::Miss, Some(i1));
        Lookup::Absent
    }

    /// Shorthand for `query(item).is_found()`
    pub fn contains(&self, item: &T) -> bool {
        self.query(item).is_found()
    }

    /// Erase an item.
    ///
    /// Returns `true` if a matching fingerprint was removed, `false` if none
    /// was found.
    pub fn erase(&mut self, item: &T) -> bool {
        let (fp, i1, i2) = self.indices(item);

        for bucket in [i1, i2] {
            if self.buckets[bucket].delete(fp) {
                self.count -= 1;
                self.notify(Operation::Erase, Outcome::Applied, Some(bucket));
                return true;
            }
        }

        debug!(fingerprint = fp, bucket = i1, "Erase ignored: fingerprint not found");
        self.notify(Operation::Erase, Outcome::Rejected, None);
        false
    }

    /// Non-zero fingerprint of an item, in `[1, 2^fingerprint_bits]`
    pub fn fingerprint(&self, item: &T) -> Fingerprint {
        self.fingerprint_of(self.hasher.hash_item(item))
    }

    /// Primary bucket of an item
    pub fn hash1(&self, item: &T) -> usize {
        self.bucket_of(self.hasher.hash_item(item))
    }

    /// Partner bucket of `bucket` for fingerprint `fp`
    pub fn hash2(&self, bucket: usize, fp: Fingerprint) -> usize {
        self.alt_index(bucket, fp)
    }

    /// Calculate fingerprint and both bucket indices.
    fn indices(&self, item: &T) -> (Fingerprint, usize, usize) {
        let hash = self.hasher.hash_item(item);
        let fp = self.fingerprint_of(hash);
        let i1 = self.bucket_of(hash);
        let i2 = self.alt_index(i1, fp);
        (fp, i1, i2)
    }

    fn fingerprint_of(&self, hash: u64) -> Fingerprint {
        let bits = u32::from(self.config.fingerprint_bits);
        let mask = (1u64 << bits) - 1;
        (((hash >> (64 - bits)) & mask) + 1) as Fingerprint
    }

    fn bucket_of(&self, hash: u64) -> usize {
        (hash % self.config.num_buckets as u64) as usize
    }

    /// Calculate alternate index using partial-key cuckoo hashing.
    fn alt_index(&self, idx: usize, fp: Fingerprint) -> usize {
        let fp_hash = self.hasher.hash_item(fp.to_string().as_str());
        ((idx as u64 ^ fp_hash) % self.config.num_buckets as u64) as usize
    }
}

impl<T: ?Sized, H> CuckooFilter<T, H> {
    /// Number of stored fingerprints
    pub fn size(&self) -> usize {
        self.count
    }

    /// True when no fingerprint is stored
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Total slot count
    pub fn capacity(&self) -> usize {
        self.config.capacity()
    }

    /// Percentage of occupied slots, rounded down
    pub fn load_factor(&self) -> u32 {
        (self.count * 100 / self.capacity()) as u32
    }

    /// Number of buckets
    pub fn num_buckets(&self) -> usize {
        self.config.num_buckets
    }

    /// Slots per bucket
    pub fn entries_per_bucket(&self) -> usize {
        self.config.entries_per_bucket
    }

    /// Fingerprint width
    pub fn fingerprint_bits(&self) -> u8 {
        self.config.fingerprint_bits
    }

    /// Relocation bound
    pub fn max_kicks(&self) -> usize {
        self.config.max_kicks
    }

    /// Empty every bucket, keeping the configuration
    pub fn clear(&mut self) {
        self.buckets.iter_mut().for_each(Bucket::clear);
        self.count = 0;
    }

    /// Read-only view of the internal state
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot::Cuckoo {
            buckets: &self.buckets,
            fingerprint_bits: self.config.fingerprint_bits,
            count: self.count,
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

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
