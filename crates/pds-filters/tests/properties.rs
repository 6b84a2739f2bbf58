//! Property tests over random item sets

use std::collections::HashSet;

use proptest::prelude::*;

use pds_filters::{
    BloomConfig, CountingBloomFilter, CuckooConfigBuilder, CuckooFilter, LinearCounter,
    LinearCounterConfig, SimpleBloomFilter,
};

fn item_vec(max: usize) -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z0-9]{1,12}", 0..max)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_simple_bloom_no_false_negatives(items in item_vec(200), k in 1usize..8) {
        let mut filter: SimpleBloomFilter<str> =
            SimpleBloomFilter::new(BloomConfig::new(k, 512).unwrap()).unwrap();
        let mut last_size = 0;
        for item in &items {
            filter.insert(item);
            prop_assert!(filter.size() >= last_size, "Set bits never decrease");
            last_size = filter.size();
        }
        for item in &items {
            prop_assert!(filter.contains(item));
        }
    }

    #[test]
    fn prop_counting_insert_erase_restores(
        base in item_vec(50),
        extra in "[A-Z]{1,8}",
        k in 1usize..6,
    ) {
        let mut filter: CountingBloomFilter<str> =
            CountingBloomFilter::new(BloomConfig::new(k, 256).unwrap()).unwrap();
        for item in &base {
            filter.insert(item);
        }
        let counters: Vec<u8> = (0..256).map(|i| filter.counter(i).unwrap()).collect();
        let bits = filter.size();

        filter.insert(&extra);
        prop_assert!(filter.erase(&extra));

        let restored: Vec<u8> = (0..256).map(|i| filter.counter(i).unwrap()).collect();
        prop_assert_eq!(counters, restored);
        prop_assert_eq!(bits, filter.size());
        for item in &base {
            prop_assert!(filter.contains(item));
        }
    }

    #[test]
    fn prop_cuckoo_no_false_negatives_after_kicking(seed in any::<u64>()) {
        let config = CuckooConfigBuilder::new()
            .num_buckets(64)
            .entries_per_bucket(4)
            .fingerprint_bits(12)
            .max_kicks(500)
            .seed(seed)
            .build()
            .unwrap();
        let mut filter: CuckooFilter<str> = CuckooFilter::new(config).unwrap();
        let mut stored = Vec::new();

        // Fill until the first failed insert, then roll back to the last good table.
        for i in 0.. {
            let item = format!("key_{}_{}", seed, i);
            let before = filter.clone();
            if !filter.insert(&item) {
                filter = before;
                break;
            }
            stored.push(item);
        }

        prop_assert!(
            stored.len() > filter.capacity() / 2,
            "Table fills past half before failing"
        );
        prop_assert_eq!(filter.size(), stored.len());
        for item in &stored {
            prop_assert!(filter.contains(item), "Stored item lost after relocation: {}", item);
        }
    }

    #[test]
    fn prop_cuckoo_count_invariant(
        items in item_vec(120),
        erase_every in 2usize..5,
        seed in any::<u64>(),
    ) {
        let config = CuckooConfigBuilder::new()
            .num_buckets(16)
            .entries_per_bucket(4)
            .max_kicks(100)
            .seed(seed)
            .build()
            .unwrap();
        let mut filter: CuckooFilter<str> = CuckooFilter::new(config).unwrap();

        let mut successful = 0usize;
        for item in &items {
            if filter.insert(item) {
                successful += 1;
            }
            prop_assert_eq!(filter.size(), successful);
        }
        for item in items.iter().step_by(erase_every) {
            if filter.erase(item) {
                successful -= 1;
            }
            prop_assert_eq!(filter.size(), successful);
        }
        prop_assert!(filter.size() <= filter.capacity());
    }

    #[test]
    fn prop_cuckoo_round_trip_below_capacity(
        items in prop::collection::hash_set("[a-z]{4,10}", 0..40),
        seed in any::<u64>(),
    ) {
        let config = CuckooConfigBuilder::new()
            .num_buckets(64)
            .fingerprint_bits(12)
            .seed(seed)
            .build()
            .unwrap();
        let mut filter: CuckooFilter<str> = CuckooFilter::new(config).unwrap();

        for item in &items {
            prop_assert!(filter.insert(item));
        }
        for item in &items {
            prop_assert!(filter.contains(item));
        }
    }

    #[test]
    fn prop_linear_counter_monotone(items in item_vec(300)) {
        let mut counter: LinearCounter<str> =
            LinearCounter::new(LinearCounterConfig::new(4096).unwrap()).unwrap();
        let mut last_bits = 0;
        let mut last_estimate = 0.0;
        for item in &items {
            counter.insert(item);
            let estimate = counter.estimate().unwrap();
            prop_assert!(counter.bits_set() >= last_bits);
            prop_assert!(estimate >= last_estimate);
            last_bits = counter.bits_set();
            last_estimate = estimate;
        }

        let distinct: HashSet<&String> = items.iter().collect();
        prop_assert!(counter.bits_set() <= distinct.len());
        prop_assert_eq!(counter.size(), items.len() as u64);
    }
}
