//! Hash functions for the filter family
//!
//! Every structure hashes items through a pluggable [`ItemHasher`]. The Bloom
//! filters derive their k functions from that single base hash by salting it
//! with a multiple of the golden-ratio constant:
//!
//! ```text
//! h_i(x) = hash(x) XOR (i * 0x9e3779b9)
//! ```
//!
//! Neither hasher here is cryptographic. SipHash-1-3 is the default because it
//! is fast and, with fixed keys, deterministic across runs.

use std::hash::{Hash, Hasher};
use std::io::Cursor;

use siphasher::sip::SipHasher13;

/// Salt multiplier used to derive the i-th Bloom hash function
pub const GOLDEN_RATIO_SALT: u64 = 0x9e37_79b9;

/// Base hash applied to every item
///
/// Implement this to plug a different hash function into any filter.
pub trait ItemHasher {
    /// Hash an item to 64 bits
    fn hash_item<T: Hash + ?Sized>(&self, item: &T) -> u64;
}

/// SipHash-1-3 with fixed keys (default base hash)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SipItemHasher {
    key0: u64,
    key1: u64,
}

impl SipItemHasher {
    /// Create a hasher with explicit SipHash keys
    pub fn with_keys(key0: u64, key1: u64) -> Self {
        Self { key0, key1 }
    }
}

impl Default for SipItemHasher {
    fn default() -> Self {
        Self::with_keys(0, 0)
    }
}

impl ItemHasher for SipItemHasher {
    fn hash_item<T: Hash + ?Sized>(&self, item: &T) -> u64 {
        let mut hasher = SipHasher13::new_with_keys(self.key0, self.key1);
        item.hash(&mut hasher);
        hasher.finish()
    }
}

/// MurmurHash3 x64/128 over the item's `Hash` byte stream, lower 64 bits
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Murmur3ItemHasher {
    seed: u32,
}

impl Murmur3ItemHasher {
    /// Create a hasher with a seed
    pub fn with_seed(seed: u32) -> Self {
        Self { seed }
    }
}

/// Collects the bytes a `Hash` impl writes so they can be fed to murmur3
#[derive(Default)]
struct ByteSink(Vec<u8>);

impl Hasher for ByteSink {
    fn finish(&self) -> u64 {
        0
    }

    fn write(&mut self, bytes: &[u8]) {
        self.0.extend_from_slice(bytes);
    }
}

impl ItemHasher for Murmur3ItemHasher {
    fn hash_item<T: Hash + ?Sized>(&self, item: &T) -> u64 {
        let mut sink = ByteSink::default();
        item.hash(&mut sink);

        let mut cursor = Cursor::new(sink.0.as_slice());
        let hash = murmur3::murmur3_x64_128(&mut cursor, self.seed).unwrap_or(0);
        hash as u64
    }
}

/// Family of k index-salted hash functions over one base hash
#[derive(Clone, Debug)]
pub struct HashFamily<H = SipItemHasher> {
    hasher: H,
    k: usize,
}

impl<H> HashFamily<H> {
    /// Build a family of `k` functions over `hasher`
    pub fn new(hasher: H, k: usize) -> Self {
        Self { hasher, k }
    }

    /// Rebuild the family with a new function count, keeping the base hash
    pub fn rebuild(&mut self, k: usize) {
        self.k = k;
    }

    /// Number of hash functions
    pub fn len(&self) -> usize {
        self.k
    }

    /// True when the family has no functions
    pub fn is_empty(&self) -> bool {
        self.k == 0
    }

    /// The base hasher
    pub fn hasher(&self) -> &H {
        &self.hasher
    }
}

impl<H: ItemHasher> HashFamily<H> {
    /// Value of the i-th hash function for `item`
    pub fn hash<T: Hash + ?Sized>(&self, item: &T, i: usize) -> u64 {
        salted(self.hasher.hash_item(item), i)
    }

    /// Index of the i-th hash function into an array of `m` slots
    pub fn index<T: Hash + ?Sized>(&self, item: &T, i: usize, m: usize) -> usize {
        (self.hash(item, i) % m as u64) as usize
    }

    /// All k indices for `item`, in function order
    ///
    /// The base hash is computed once and salted per function.
    pub fn indices<T: Hash + ?Sized>(&self, item: &T, m: usize) -> impl Iterator<Item = usize> {
        let base = self.hasher.hash_item(item);
        let m = m as u64;
        (0..self.k).map(move |i| (salted(base, i) % m) as usize)
    }
}

fn salted(base: u64, i: usize) -> u64 {
    base ^ (i as u64).wrapping_mul(GOLDEN_RATIO_SALT)
}
