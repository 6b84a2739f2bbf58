//! Inbound Ports (Driving Ports)
//!
//! Uniform API over the structures, so callers and wrappers such as
//! [`GroundTruth`](crate::diagnostics::GroundTruth) can be written once for
//! every filter.

use std::hash::Hash;

use crate::domain::{
    CountingBloomFilter, CuckooFilter, ItemHasher, LinearCounter, SimpleBloomFilter,
};

/// Probabilistic set membership
///
/// # Invariants
///
/// No false negatives: after `insert_item(x)` succeeds, `might_contain(x)`
/// MUST return `true` until `x` is erased.
pub trait MembershipFilter<T: ?Sized> {
    /// Add an item; `false` when the structure could not store it
    fn insert_item(&mut self, item: &T) -> bool;

    /// `false` means definitely absent
    fn might_contain(&self, item: &T) -> bool;

    /// Structure-specific size metric
    fn size(&self) -> usize;

    /// True when nothing has been stored
    fn is_empty(&self) -> bool {
        self.size() == 0
    }
}

/// Membership filter that supports removal
pub trait DeletableFilter<T: ?Sized>: MembershipFilter<T> {
    /// Remove one copy of an item; `false` when nothing was removed
    fn erase_item(&mut self, item: &T) -> bool;
}

/// Distinct-count estimation
pub trait CardinalityEstimator<T: ?Sized> {
    /// Record one occurrence of an item
    fn observe(&mut self, item: &T);

    /// Estimated distinct count, `None` when undefined
    fn estimate_cardinality(&self) -> Option<f64>;
}

impl<T: Hash + ?Sized, H: ItemHasher> MembershipFilter<T> for SimpleBloomFilter<T, H> {
    fn insert_item(&mut self, item: &T) -> bool {
        self.insert(item);
        true
    }

    fn might_contain(&self, item: &T) -> bool {
        self.contains(item)
    }

    fn size(&self) -> usize {
        SimpleBloomFilter::size(self)
    }
}

impl<T: Hash + ?Sized, H: ItemHasher> MembershipFilter<T> for CountingBloomFilter<T, H> {
    fn insert_item(&mut self, item: &T) -> bool {
        self.insert(item);
        true
    }

    fn might_contain(&self, item: &T) -> bool {
        self.contains(item)
    }

    fn size(&self) -> usize {
        CountingBloomFilter::size(self)
    }
}

impl<T: Hash + ?Sized, H: ItemHasher> DeletableFilter<T> for CountingBloomFilter<T, H> {
    fn erase_item(&mut self, item: &T) -> bool {
        self.erase(item)
    }
}

impl<T: Hash + ?Sized, H: ItemHasher> MembershipFilter<T> for CuckooFilter<T, H> {
    fn insert_item(&mut self, item: &T) -> bool {
        self.insert(item)
    }

    fn might_contain(&self, item: &T) -> bool {
        self.contains(item)
    }

    fn size(&self) -> usize {
        CuckooFilter::size(self)
    }
}

impl<T: Hash + ?Sized, H: ItemHasher> DeletableFilter<T> for CuckooFilter<T, H> {
    fn erase_item(&mut self, item: &T) -> bool {
        self.erase(item)
    }
}

impl<T: Hash + ?Sized, H: ItemHasher> CardinalityEstimator<T> for LinearCounter<T, H> {
    fn observe(&mut self, item: &T) {
        self.insert(item);
    }

    fn estimate_cardinality(&self) -> Option<f64> {
        self.estimate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BloomConfig, CuckooConfigBuilder, LinearCounterConfig};

    fn exercise<F: DeletableFilter<str>>(filter: &mut F) {
        assert!(filter.is_empty());
        assert!(filter.insert_item("apple"));
        assert!(filter.might_contain("apple"));
        assert!(filter.erase_item("apple"));
        assert!(!filter.might_contain("apple"));
        assert!(filter.is_empty());
    }

    #[test]
    fn test_deletable_filters_share_contract() {
        let mut counting: CountingBloomFilter<str> =
            CountingBloomFilter::new(BloomConfig::default()).unwrap();
        exercise(&mut counting);

        let config = CuckooConfigBuilder::new().num_buckets(64).seed(9).build().unwrap();
        let mut cuckoo: CuckooFilter<str> = CuckooFilter::new(config).unwrap();
        exercise(&mut cuckoo);
    }

    #[test]
    fn test_bloom_through_trait_object() {
        let mut bloom: SimpleBloomFilter<str> =
            SimpleBloomFilter::new(BloomConfig::default()).unwrap();
        let filter: &mut dyn MembershipFilter<str> = &mut bloom;

        filter.insert_item("kiwi");
        assert!(filter.might_contain("kiwi"));
        assert!(!filter.is_empty());
    }

    #[test]
    fn test_cardinality_estimator() {
        let mut counter: LinearCounter<str> =
            LinearCounter::new(LinearCounterConfig::default()).unwrap();
        counter.observe("a");
        counter.observe("a");
        counter.observe("b");

        let estimate = counter.estimate_cardinality().unwrap();
        assert!((estimate - 2.0).abs() < 0.5);
    }
}
