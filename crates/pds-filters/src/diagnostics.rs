//! Ground-truth auditing for membership filters
//!
//! [`GroundTruth`] wraps a filter and keeps the exact multiset of stored items
//! next to it, so each positive answer can be classified as a true hit or a
//! false positive. Deletable filters store duplicates, so an item stays in the
//! exact set until it has been erased as many times as it was inserted.
//!
//! The wrapped filter is driven through [`MembershipFilter`] only; its answers
//! are identical with or without the wrapper.

use std::collections::HashMap;
use std::hash::Hash;

use crate::ports::inbound::{DeletableFilter, MembershipFilter};

/// Classification of a query against the exact set
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HitKind {
    /// Filter said present, item is present
    TrueHit,
    /// Filter said present, item is absent
    FalsePositive,
    /// Filter said absent, item is absent
    Miss,
    /// Filter said absent, item is present
    ///
    /// A cuckoo insert that runs out of kicks drops the last evicted
    /// fingerprint, which can surface here.
    FalseNegative,
}

/// Running counts of classified queries
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AuditStats {
    pub true_hits: u64,
    pub false_positives: u64,
    pub misses: u64,
    pub false_negatives: u64,
}

impl AuditStats {
    /// Total classified queries
    pub fn total(&self) -> u64 {
        self.true_hits + self.false_positives + self.misses + self.false_negatives
    }

    /// False positives over queries for absent items
    ///
    /// `None` before any absent item has been queried.
    pub fn false_positive_rate(&self) -> Option<f64> {
        let negatives = self.false_positives + self.misses;
        if negatives == 0 {
            return None;
        }
        Some(self.false_positives as f64 / negatives as f64)
    }

    fn record(&mut self, kind: HitKind) {
        match kind {
            HitKind::TrueHit => self.true_hits += 1,
            HitKind::FalsePositive => self.false_positives += 1,
            HitKind::Miss => self.misses += 1,
            HitKind::FalseNegative => self.false_negatives += 1,
        }
    }
}

/// Filter plus the exact multiset of items it holds
///
/// # Example
///
/// ```
/// use pds_filters::diagnostics::{GroundTruth, HitKind};
/// use pds_filters::domain::{BloomConfig, SimpleBloomFilter};
///
/// let filter: SimpleBloomFilter<str> = SimpleBloomFilter::new(BloomConfig::new(3, 1024)?)?;
/// let mut audited: GroundTruth<_, str> = GroundTruth::new(filter);
/// audited.insert("apple");
///
/// assert_eq!(audited.query("apple"), HitKind::TrueHit);
/// assert_eq!(audited.stats().true_hits, 1);
/// # Ok::<(), pds_filters::FilterError>(())
/// ```
#[derive(Debug)]
pub struct GroundTruth<F, T: ?Sized + ToOwned> {
    filter: F,
    truth: HashMap<T::Owned, usize>,
    stats: AuditStats,
}

impl<F, T> GroundTruth<F, T>
where
    F: MembershipFilter<T>,
    T: ?Sized + ToOwned + Hash + Eq,
    T::Owned: Hash + Eq,
{
    /// Wrap an empty filter
    pub fn new(filter: F) -> Self {
        Self {
            filter,
            truth: HashMap::new(),
            stats: AuditStats::default(),
        }
    }

    /// Insert into the filter, recording the item only if the filter stored it
    pub fn insert(&mut self, item: &T) -> bool {
        let stored = self.filter.insert_item(item);
        if stored {
            *self.truth.entry(item.to_owned()).or_insert(0) += 1;
        }
        stored
    }

    /// Classify a query without recording it
    pub fn classify(&self, item: &T) -> HitKind {
        let present = self.truth.contains_key(item);
        match (self.filter.might_contain(item), present) {
            (true, true) => HitKind::TrueHit,
            (true, false) => HitKind::FalsePositive,
            (false, false) => HitKind::Miss,
            (false, true) => HitKind::FalseNegative,
        }
    }

    /// Classify a query and add it to the running stats
    pub fn query(&mut self, item: &T) -> HitKind {
        let kind = self.classify(item);
        self.stats.record(kind);
        kind
    }

    /// True when `item` is in the exact set
    pub fn truly_contains(&self, item: &T) -> bool {
        self.truth.contains_key(item)
    }

    /// Stored copies of `item` in the exact set
    pub fn copies(&self, item: &T) -> usize {
        self.truth.get(item).copied().unwrap_or(0)
    }

    /// Number of distinct items in the exact set
    pub fn distinct_items(&self) -> usize {
        self.truth.len()
    }

    pub fn stats(&self) -> AuditStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = AuditStats::default();
    }

    pub fn filter(&self) -> &F {
        &self.filter
    }

    /// Mutable access to the filter
    ///
    /// Items inserted or erased through this handle bypass the exact set.
    pub fn filter_mut(&mut self) -> &mut F {
        &mut self.filter
    }

    /// Drop the exact set and return the filter
    pub fn into_inner(self) -> F {
        self.filter
    }
}

impl<F, T> GroundTruth<F, T>
where
    F: DeletableFilter<T>,
    T: ?Sized + ToOwned + Hash + Eq,
    T::Owned: Hash + Eq,
{
    /// Erase from the filter and, if that succeeded, drop one copy from the
    /// exact set
    pub fn erase(&mut self, item: &T) -> bool {
        let erased = self.filter.erase_item(item);
        if erased {
            if let Some(copies) = self.truth.get_mut(item) {
                *copies -= 1;
                if *copies == 0 {
                    self.truth.remove(item);
                }
            }
        }
        erased
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        BloomConfig, CountingBloomFilter, CuckooConfigBuilder, CuckooFilter, SimpleBloomFilter,
    };

    #[test]
    fn test_classifies_hits_and_misses() {
        let filter: SimpleBloomFilter<str> =
            SimpleBloomFilter::new(BloomConfig::new(3, 4096).unwrap()).unwrap();
        let mut audited: GroundTruth<_, str> = GroundTruth::new(filter);
        audited.insert("apple");
        audited.insert("banana");

        assert_eq!(audited.query("apple"), HitKind::TrueHit);
        assert_eq!(audited.query("banana"), HitKind::TrueHit);

        let stats = audited.stats();
        assert_eq!(stats.true_hits, 2);
        assert_eq!(stats.false_negatives, 0);
        assert_eq!(stats.false_positive_rate(), None);
    }

    #[test]
    fn test_saturated_filter_reports_false_positives() {
        let filter: SimpleBloomFilter<str> =
            SimpleBloomFilter::new(BloomConfig::new(1, 1).unwrap()).unwrap();
        let mut audited: GroundTruth<_, str> = GroundTruth::new(filter);
        audited.insert("apple");

        assert_eq!(audited.query("durian"), HitKind::FalsePositive);
        assert_eq!(audited.stats().false_positive_rate(), Some(1.0));
    }

    #[test]
    fn test_erase_updates_exact_set() {
        let filter: CountingBloomFilter<str> =
            CountingBloomFilter::new(BloomConfig::new(3, 1024).unwrap()).unwrap();
        let mut audited: GroundTruth<_, str> = GroundTruth::new(filter);
        audited.insert("apple");
        assert!(audited.truly_contains("apple"));

        assert!(audited.erase("apple"));
        assert!(!audited.truly_contains("apple"));
        assert_eq!(audited.classify("apple"), HitKind::Miss);
        assert_eq!(audited.distinct_items(), 0);
    }

    #[test]
    fn test_counting_duplicate_survives_one_erase() {
        let filter: CountingBloomFilter<str> =
            CountingBloomFilter::new(BloomConfig::new(3, 1024).unwrap()).unwrap();
        let mut audited: GroundTruth<_, str> = GroundTruth::new(filter);
        audited.insert("apple");
        audited.insert("apple");
        assert_eq!(audited.copies("apple"), 2);
        assert_eq!(audited.distinct_items(), 1);

        assert!(audited.erase("apple"));
        assert!(audited.filter().contains("apple"));
        assert_eq!(audited.query("apple"), HitKind::TrueHit);
        assert_eq!(audited.copies("apple"), 1);

        assert!(audited.erase("apple"));
        assert_eq!(audited.query("apple"), HitKind::Miss);
        assert_eq!(audited.distinct_items(), 0);
        assert_eq!(audited.stats().false_positives, 0);
    }

    #[test]
    fn test_cuckoo_duplicate_survives_one_erase() {
        let config = CuckooConfigBuilder::new()
            .num_buckets(64)
            .entries_per_bucket(4)
            .seed(1)
            .build()
            .unwrap();
        let filter: CuckooFilter<str> = CuckooFilter::new(config).unwrap();
        let mut audited: GroundTruth<_, str> = GroundTruth::new(filter);
        assert!(audited.insert("apple"));
        assert!(audited.insert("apple"));

        assert!(audited.erase("apple"));
        assert_eq!(audited.filter().size(), 1);
        assert_eq!(audited.query("apple"), HitKind::TrueHit);

        assert!(audited.erase("apple"));
        assert_eq!(audited.query("apple"), HitKind::Miss);
        assert!(!audited.truly_contains("apple"));
    }

    #[test]
    fn test_wrapper_does_not_change_filter_answers() {
        let config = BloomConfig::new(3, 512).unwrap();
        let mut plain: SimpleBloomFilter<str> = SimpleBloomFilter::new(config.clone()).unwrap();
        let mut audited: GroundTruth<_, str> =
            GroundTruth::new(SimpleBloomFilter::<str>::new(config).unwrap());

        for i in 0..50 {
            let item = format!("item_{}", i);
            plain.insert(&item);
            audited.insert(&item);
        }

        for i in 0..200 {
            let probe = format!("probe_{}", i);
            assert_eq!(plain.contains(&probe), audited.filter().contains(&probe));
        }
    }
}
