//! Filter configuration and validation
//!
//! Each structure is sized by an explicit configuration:
//! - Bloom family: `{k}` plus the fixed bit capacity `M`
//! - Cuckoo filter: `{num_buckets, entries_per_bucket, fingerprint_bits, max_kicks}`
//! - Linear counter: `{m}`
//!
//! # Example
//!
//! ```
//! use pds_filters::domain::CuckooConfigBuilder;
//!
//! let config = CuckooConfigBuilder::new()
//!     .num_buckets(64)
//!     .entries_per_bucket(4)
//!     .fingerprint_bits(8)
//!     .max_kicks(500)
//!     .build()
//!     .expect("valid config");
//! assert_eq!(config.capacity(), 256);
//! ```

use serde::{Deserialize, Serialize};

use super::parameters::calculate_optimal_parameters;
use crate::error::FilterError;

/// Default bit capacity for the Bloom family and the linear counter.
pub const DEFAULT_BIT_ARRAY_SIZE: usize = 1024;

/// Largest supported fingerprint width (fingerprints live in `[1, 2^bits]`).
pub const MAX_FINGERPRINT_BITS: u8 = 15;

/// Configuration for [`SimpleBloomFilter`](super::SimpleBloomFilter) and
/// [`CountingBloomFilter`](super::CountingBloomFilter)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BloomConfig {
    /// Number of hash functions (k)
    pub hash_count: usize,
    /// Bit array capacity (M), fixed for the filter's lifetime
    pub size_bits: usize,
}

impl Default for BloomConfig {
    fn default() -> Self {
        Self {
            hash_count: 3,
            size_bits: DEFAULT_BIT_ARRAY_SIZE,
        }
    }
}

impl BloomConfig {
    /// Create a validated configuration
    pub fn new(hash_count: usize, size_bits: usize) -> Result<Self, FilterError> {
        let config = Self {
            hash_count,
            size_bits,
        };
        config.validate()?;
        Ok(config)
    }

    /// Size a filter for `expected_items` at `target_fpr`
    pub fn for_capacity(expected_items: usize, target_fpr: f64) -> Result<Self, FilterError> {
        if expected_items == 0 {
            return Err(FilterError::invalid("expected_items cannot be 0"));
        }
        if !(target_fpr > 0.0 && target_fpr < 1.0) {
            return Err(FilterError::invalid(format!(
                "target_fpr must be in (0, 1), got {}",
                target_fpr
            )));
        }
        let params = calculate_optimal_parameters(expected_items, target_fpr);
        Self::new(params.hash_count, params.size_bits)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), FilterError> {
        validate_hash_count(self.hash_count)?;
        if self.size_bits == 0 {
            return Err(FilterError::invalid("size_bits cannot be 0"));
        }
        Ok(())
    }
}

pub(crate) fn validate_hash_count(k: usize) -> Result<(), FilterError> {
    if k == 0 {
        return Err(FilterError::invalid("hash_count cannot be 0"));
    }
    Ok(())
}

/// Builder for [`BloomConfig`] with validation
#[derive(Default)]
pub struct BloomConfigBuilder {
    hash_count: Option<usize>,
    size_bits: Option<usize>,
}

impl BloomConfigBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set number of hash functions
    pub fn hash_count(mut self, k: usize) -> Self {
        self.hash_count = Some(k);
        self
    }

    /// Set bit array capacity
    pub fn size_bits(mut self, bits: usize) -> Self {
        self.size_bits = Some(bits);
        self
    }

    /// Build the configuration, validating all parameters
    pub fn build(self) -> Result<BloomConfig, FilterError> {
        let defaults = BloomConfig::default();
        let config = BloomConfig {
            hash_count: self.hash_count.unwrap_or(defaults.hash_count),
            size_bits: self.size_bits.unwrap_or(defaults.size_bits),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Configuration for [`CuckooFilter`](super::CuckooFilter)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CuckooConfig {
    /// Number of buckets (power of two)
    pub num_buckets: usize,
    /// Fingerprint slots per bucket
    pub entries_per_bucket: usize,
    /// Fingerprint width in bits (1..=15)
    pub fingerprint_bits: u8,
    /// Relocation attempts before an insert gives up
    pub max_kicks: usize,
    /// Seed for eviction choices; `None` seeds from OS entropy
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for CuckooConfig {
    fn default() -> Self {
        Self {
            num_buckets: 1024,
            entries_per_bucket: 4,
            fingerprint_bits: 8,
            max_kicks: 500,
            seed: None,
        }
    }
}

impl CuckooConfig {
    /// Total number of fingerprint slots
    pub fn capacity(&self) -> usize {
        self.num_buckets * self.entries_per_bucket
    }

    /// Validate the configuration
    ///
    /// The bucket count must be a power of two: the partner-bucket function
    /// is then an involution, so a kicked fingerprint always stays reachable
    /// from both of its buckets.
    pub fn validate(&self) -> Result<(), FilterError> {
        if self.num_buckets == 0 {
            return Err(FilterError::invalid("num_buckets cannot be 0"));
        }
        if !self.num_buckets.is_power_of_two() {
            return Err(FilterError::invalid(format!(
                "num_buckets must be a power of two, got {}",
                self.num_buckets
            )));
        }
        if self.entries_per_bucket == 0 {
            return Err(FilterError::invalid("entries_per_bucket cannot be 0"));
        }
        if self.fingerprint_bits == 0 || self.fingerprint_bits > MAX_FINGERPRINT_BITS {
            return Err(FilterError::invalid(format!(
                "fingerprint_bits must be in 1..={}, got {}",
                MAX_FINGERPRINT_BITS, self.fingerprint_bits
            )));
        }
        Ok(())
    }
}

/// Builder for [`CuckooConfig`] with validation
#[derive(Default)]
pub struct CuckooConfigBuilder {
    num_buckets: Option<usize>,
    entries_per_bucket: Option<usize>,
    fingerprint_bits: Option<u8>,
    max_kicks: Option<usize>,
    seed: Option<u64>,
}

impl CuckooConfigBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set number of buckets
    pub fn num_buckets(mut self, buckets: usize) -> Self {
        self.num_buckets = Some(buckets);
        self
    }

    /// Set slots per bucket
    pub fn entries_per_bucket(mut self, entries: usize) -> Self {
        self.entries_per_bucket = Some(entries);
        self
    }

    /// Set fingerprint width
    pub fn fingerprint_bits(mut self, bits: u8) -> Self {
        self.fingerprint_bits = Some(bits);
        self
    }

    /// Set relocation bound
    pub fn max_kicks(mut self, kicks: usize) -> Self {
        self.max_kicks = Some(kicks);
        self
    }

    /// Seed the eviction RNG for reproducible runs
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Build the configuration, validating all parameters
    pub fn build(self) -> Result<CuckooConfig, FilterError> {
        let defaults = CuckooConfig::default();
        let config = CuckooConfig {
            num_buckets: self.num_buckets.unwrap_or(defaults.num_buckets),
            entries_per_bucket: self.entries_per_bucket.unwrap_or(defaults.entries_per_bucket),
            fingerprint_bits: self.fingerprint_bits.unwrap_or(defaults.fingerprint_bits),
            max_kicks: self.max_kicks.unwrap_or(defaults.max_kicks),
            seed: self.seed,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Configuration for [`LinearCounter`](super::LinearCounter)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinearCounterConfig {
    /// Bitmap size (m)
    pub bitmap_size: usize,
}

impl Default for LinearCounterConfig {
    fn default() -> Self {
        Self {
            bitmap_size: DEFAULT_BIT_ARRAY_SIZE,
        }
    }
}

impl LinearCounterConfig {
    /// Create a validated configuration
    pub fn new(bitmap_size: usize) -> Result<Self, FilterError> {
        let config = Self { bitmap_size };
        config.validate()?;
        Ok(config)
    }

    /// Size a bitmap so `max_distinct` items leave it at most `load` full
    ///
    /// `load` is the target fraction of set bits, in `(0, 1)`. Solves
    /// `1 - e^(-n/m) = load` for m.
    pub fn for_cardinality(max_distinct: usize, load: f64) -> Result<Self, FilterError> {
        if max_distinct == 0 {
            return Err(FilterError::invalid("max_distinct cannot be 0"));
        }
        if !(load > 0.0 && load < 1.0) {
            return Err(FilterError::invalid(format!("load must be in (0, 1), got {}", load)));
        }
        let m = (max_distinct as f64 / -(1.0 - load).ln()).ceil() as usize;
        Self::new(m.max(1))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), FilterError> {
        validate_bitmap_size(self.bitmap_size)
    }
}

pub(crate) fn validate_bitmap_size(m: usize) -> Result<(), FilterError> {
    if m == 0 {
        return Err(FilterError::invalid("bitmap_size cannot be 0"));
    }
    Ok(())
}
