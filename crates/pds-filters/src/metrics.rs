//! Operation counters for filter instrumentation
//!
//! [`Metrics`] implements the observer port, so attaching it (behind an `Rc`
//! or `Arc` to keep a handle) counts every event a structure emits.
//!
//! ## Usage
//!
//! ```
//! use std::sync::Arc;
//! use pds_filters::domain::{BloomConfig, SimpleBloomFilter};
//! use pds_filters::metrics::Metrics;
//!
//! let metrics = Arc::new(Metrics::new());
//! let mut filter: SimpleBloomFilter<str> = SimpleBloomFilter::new(BloomConfig::default())?;
//! filter.set_observer(Box::new(Arc::clone(&metrics)));
//!
//! filter.insert("apple");
//! filter.query("apple");
//! filter.query("durian");
//!
//! let snapshot = metrics.snapshot();
//! assert_eq!(snapshot.queries, 2);
//! assert!(snapshot.queries_positive >= 1);
//! # Ok::<(), pds_filters::FilterError>(())
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use crate::ports::observer::{FilterEvent, Observer, Operation, Outcome};

/// Metrics collector for filter operations
///
/// Thread-safe counters; all updates use relaxed ordering.
///
/// A simple Bloom filter emits one insert event per hash index, so for that
/// structure `insert_events` counts touched bits rather than items.
#[derive(Debug, Default)]
pub struct Metrics {
    /// Successful init calls
    pub inits: AtomicU64,
    /// Insert events with an applied outcome
    pub insert_events: AtomicU64,
    /// Cuckoo inserts that ran out of kicks
    pub inserts_rejected: AtomicU64,
    /// Membership queries and cardinality estimates
    pub queries: AtomicU64,
    /// Membership queries answered "possibly present"
    pub queries_positive: AtomicU64,
    /// Cardinality estimates that were undefined
    pub estimates_undefined: AtomicU64,
    /// Erases that removed something
    pub erases: AtomicU64,
    /// Erases of items that were not present
    pub erases_missed: AtomicU64,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one observer event
    pub fn record(&self, op: Operation, outcome: Outcome) {
        let counter = match (op, outcome) {
            (Operation::Init, _) => &self.inits,
            (Operation::Insert, Outcome::Rejected) => &self.inserts_rejected,
            (Operation::Insert, _) => &self.insert_events,
            (Operation::Query, outcome) => {
                self.queries.fetch_add(1, Ordering::Relaxed);
                match outcome {
                    Outcome::Hit => &self.queries_positive,
                    Outcome::Rejected => &self.estimates_undefined,
                    _ => return,
                }
            }
            (Operation::Erase, Outcome::Rejected) => &self.erases_missed,
            (Operation::Erase, _) => &self.erases,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            inits: self.inits.load(Ordering::Relaxed),
            insert_events: self.insert_events.load(Ordering::Relaxed),
            inserts_rejected: self.inserts_rejected.load(Ordering::Relaxed),
            queries: self.queries.load(Ordering::Relaxed),
            queries_positive: self.queries_positive.load(Ordering::Relaxed),
            estimates_undefined: self.estimates_undefined.load(Ordering::Relaxed),
            erases: self.erases.load(Ordering::Relaxed),
            erases_missed: self.erases_missed.load(Ordering::Relaxed),
        }
    }

    /// Ratio of positive answers to queries
    ///
    /// This includes both true positives and false positives.
    pub fn observed_positive_rate(&self) -> f64 {
        let total = self.queries.load(Ordering::Relaxed);
        let positive = self.queries_positive.load(Ordering::Relaxed);
        if total > 0 {
            positive as f64 / total as f64
        } else {
            0.0
        }
    }

    /// Reset all counters
    pub fn reset(&self) {
        self.inits.store(0, Ordering::Relaxed);
        self.insert_events.store(0, Ordering::Relaxed);
        self.inserts_rejected.store(0, Ordering::Relaxed);
        self.queries.store(0, Ordering::Relaxed);
        self.queries_positive.store(0, Ordering::Relaxed);
        self.estimates_undefined.store(0, Ordering::Relaxed);
        self.erases.store(0, Ordering::Relaxed);
        self.erases_missed.store(0, Ordering::Relaxed);
    }
}

impl Observer for Metrics {
    fn on_event(&self, event: &FilterEvent<'_>) {
        self.record(event.op, event.outcome);
    }
}

/// Point-in-time metrics snapshot
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub inits: u64,
    pub insert_events: u64,
    pub inserts_rejected: u64,
    pub queries: u64,
    pub queries_positive: u64,
    pub estimates_undefined: u64,
    pub erases: u64,
    pub erases_missed: u64,
}
