//! Domain Layer - Pure data-structure logic
//!
//! This layer contains:
//! - Fixed-capacity bit array
//! - Hash functions and the salted hash family
//! - Parameter calculations
//! - Configuration
//! - Simple and counting Bloom filters
//! - Cuckoo filter (deletion-capable)
//! - Linear counter (cardinality estimation)
//!
//! RULES:
//! - No I/O operations
//! - No async code
//! - Rendering only through the observer port

pub mod bit_array;
pub mod bloom_filter;
pub mod config;
pub mod counting_bloom;
pub mod cuckoo;
pub mod hash_functions;
pub mod linear_counter;
pub mod outcome;
pub mod parameters;

pub use bit_array::FixedBitArray;
pub use bloom_filter::SimpleBloomFilter;
pub use config::{
    BloomConfig, BloomConfigBuilder, CuckooConfig, CuckooConfigBuilder, LinearCounterConfig,
};
pub use counting_bloom::{CountingBloomFilter, SATURATED_COUNTER};
pub use cuckoo::{Bucket, CuckooFilter, Fingerprint};
pub use hash_functions::{HashFamily, ItemHasher, Murmur3ItemHasher, SipItemHasher};
pub use linear_counter::{EstimateBounds, LinearCounter};
pub use outcome::{Lookup, QueryResult};
pub use parameters::{calculate_optimal_parameters, BloomFilterParams};
