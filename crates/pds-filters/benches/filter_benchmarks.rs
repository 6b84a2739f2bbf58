//! # Filter Benchmarks
//!
//! | Structure | Operation | Expected cost |
//! |-----------|-----------|---------------|
//! | SimpleBloomFilter | insert / query | O(k) |
//! | CountingBloomFilter | insert / erase | O(k) |
//! | CuckooFilter | insert / query | O(1) amortized, bounded by max_kicks |
//! | LinearCounter | insert | O(1), estimate O(m / 64) |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::time::Duration;

use pds_filters::{
    BloomConfig, CountingBloomFilter, CuckooConfigBuilder, CuckooFilter, LinearCounter,
    LinearCounterConfig, SimpleBloomFilter,
};

// ============================================================================
// Bloom family
// ============================================================================

fn bench_bloom_insert_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("simple-bloom");
    group.measurement_time(Duration::from_secs(5));
    group.throughput(Throughput::Elements(1));

    for k in [3usize, 7, 14] {
        let config = BloomConfig::new(k, 1 << 16).unwrap();

        group.bench_with_input(BenchmarkId::new("insert", k), &config, |b, config| {
            let mut filter: SimpleBloomFilter<u64> =
                SimpleBloomFilter::new(config.clone()).unwrap();
            let mut i = 0u64;
            b.iter(|| {
                filter.insert(&i);
                i = i.wrapping_add(1);
            });
        });

        group.bench_with_input(BenchmarkId::new("query", k), &config, |b, config| {
            let mut filter: SimpleBloomFilter<u64> =
                SimpleBloomFilter::new(config.clone()).unwrap();
            for i in 0..4_000u64 {
                filter.insert(&i);
            }
            let mut i = 0u64;
            b.iter(|| {
                black_box(filter.query(&i));
                i = i.wrapping_add(1) % 8_000;
            });
        });
    }

    group.finish();
}

fn bench_counting_insert_erase(c: &mut Criterion) {
    let mut group = c.benchmark_group("counting-bloom");
    group.throughput(Throughput::Elements(1));

    group.bench_function("insert_erase", |b| {
        let mut filter: CountingBloomFilter<u64> =
            CountingBloomFilter::new(BloomConfig::new(7, 1 << 16).unwrap()).unwrap();
        let mut i = 0u64;
        b.iter(|| {
            filter.insert(&i);
            black_box(filter.erase(&i));
            i = i.wrapping_add(1);
        });
    });

    group.finish();
}

// ============================================================================
// Cuckoo
// ============================================================================

fn bench_cuckoo(c: &mut Criterion) {
    let mut group = c.benchmark_group("cuckoo");
    group.throughput(Throughput::Elements(1));

    let config = CuckooConfigBuilder::new()
        .num_buckets(1 << 14)
        .entries_per_bucket(4)
        .fingerprint_bits(12)
        .seed(7)
        .build()
        .unwrap();

    group.bench_function("insert_erase", |b| {
        let mut filter: CuckooFilter<u64> = CuckooFilter::new(config.clone()).unwrap();
        let mut i = 0u64;
        b.iter(|| {
            filter.insert(&i);
            black_box(filter.erase(&i));
            i = i.wrapping_add(1);
        });
    });

    for load in [25usize, 50, 90] {
        group.bench_with_input(BenchmarkId::new("query_at_load", load), &load, |b, &load| {
            let mut filter: CuckooFilter<u64> = CuckooFilter::new(config.clone()).unwrap();
            let target = filter.capacity() * load / 100;
            for i in 0..target as u64 {
                filter.insert(&i);
            }
            let mut i = 0u64;
            b.iter(|| {
                black_box(filter.query(&i));
                i = i.wrapping_add(1);
            });
        });
    }

    group.finish();
}

// ============================================================================
// Linear counter
// ============================================================================

fn bench_linear_counter(c: &mut Criterion) {
    let mut group = c.benchmark_group("linear-counter");

    group.bench_function("insert", |b| {
        let mut counter: LinearCounter<u64> =
            LinearCounter::new(LinearCounterConfig::new(1 << 16).unwrap()).unwrap();
        let mut i = 0u64;
        b.iter(|| {
            counter.insert(&i);
            i = i.wrapping_add(1) % 20_000;
        });
    });

    group.bench_function("estimate", |b| {
        let mut counter: LinearCounter<u64> =
            LinearCounter::new(LinearCounterConfig::new(1 << 16).unwrap()).unwrap();
        for i in 0..20_000u64 {
            counter.insert(&i);
        }
        b.iter(|| black_box(counter.estimate()));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_bloom_insert_query,
    bench_counting_insert_erase,
    bench_cuckoo,
    bench_linear_counter
);
criterion_main!(benches);
