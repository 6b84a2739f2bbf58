//! # PDS Filters
//!
//! Fixed-memory probabilistic data structures for approximate set membership
//! and cardinality estimation.
//!
//! ## Architecture
//!
//! This crate follows Hexagonal Architecture (Ports & Adapters):
//!
//! - **Domain Layer** (`domain/`): Pure data-structure logic, no I/O
//!   - `SimpleBloomFilter`: Bit array membership test
//!   - `CountingBloomFilter`: Bloom filter with per-bit counters, supports erase
//!   - `CuckooFilter`: Bucketized fingerprint table, supports erase
//!   - `LinearCounter`: Distinct-count estimator
//!   - `HashFamily`: k salted hash functions over one base hash
//!
//! - **Ports Layer** (`ports/`): Trait definitions
//!   - `MembershipFilter`, `DeletableFilter`, `CardinalityEstimator`: Driving ports
//!   - `Observer`: Driven port receiving a read-only snapshot after each operation
//!
//! - **Adapters Layer** (`adapters/`): Observer implementations
//!   - `TracingObserver`: Structured log rendering
//!   - `RecordingObserver`: In-memory event capture
//!
//! - `metrics`: Atomic operation counters (an `Observer`)
//! - `diagnostics`: `GroundTruth` wrapper classifying false positives
//!
//! ## Invariants
//!
//! - **No false negatives**: if inserted (and not erased), a query MUST NOT
//!   report absent. A cuckoo insert that fails after `max_kicks` relocations
//!   is the one documented exception for the item it displaced.
//! - **FPR**: a positive Bloom answer carries `p = (1 - e^(-k*n/M))^k`, with
//!   `n` the number of set bits.
//! - **Counting**: `bit[i] == 1` iff `counter[i] > 0`.
//! - **Cuckoo**: `size()` equals successful inserts minus successful erases.
//! - **Linear counter**: `estimate()` is `None` once the bitmap is full,
//!   never zero.
//!
//! ## Usage Example
//!
//! ```
//! use pds_filters::{BloomConfigBuilder, SimpleBloomFilter};
//!
//! let config = BloomConfigBuilder::new().hash_count(3).size_bits(1024).build()?;
//! let mut filter: SimpleBloomFilter<str> = SimpleBloomFilter::new(config)?;
//!
//! for fruit in ["apple", "banana", "cherry"] {
//!     filter.insert(fruit);
//! }
//!
//! assert!(filter.contains("apple"));
//! # Ok::<(), pds_filters::FilterError>(())
//! ```

pub mod adapters;
pub mod diagnostics;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;

// Re-exports for convenience
pub use adapters::{RecordedEvent, RecordingObserver, TracingObserver};
pub use diagnostics::{AuditStats, GroundTruth, HitKind};
pub use domain::{
    BloomConfig, BloomConfigBuilder, CountingBloomFilter, CuckooConfig, CuckooConfigBuilder,
    CuckooFilter, EstimateBounds, LinearCounter, LinearCounterConfig, Lookup, QueryResult,
    SimpleBloomFilter,
};
pub use error::FilterError;
pub use metrics::{Metrics, MetricsSnapshot};
pub use ports::{
    CardinalityEstimator, DeletableFilter, FilterEvent, MembershipFilter, Observer, Operation,
    Outcome, Snapshot, StructureKind,
};
