//! # PDS Demo
//!
//! Walks each structure through a short scenario:
//!
//! - `bloom`: insert three fruits, query them and one stranger
//! - `counting`: insert, erase, and re-query
//! - `cuckoo`: insert ten fruits, erase three
//! - `linear`: six inserts, four distinct, then estimate
//!
//! ## Configuration
//!
//! - `PDS_LOG_LEVEL` (or `RUST_LOG`): log filter, default `info`
//! - `PDS_CONFIG`: path to a JSON file with `bloom`, `cuckoo`, `linear` sections
//! - `PDS_CUCKOO_SEED`: seed for cuckoo evictions

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn, Level};
use tracing_subscriber::EnvFilter;

use pds_filters::{
    BloomConfig, CountingBloomFilter, CuckooConfig, CuckooFilter, LinearCounter,
    LinearCounterConfig, Metrics, QueryResult, SimpleBloomFilter, TracingObserver,
};

const FRUITS: [&str; 10] = [
    "apple",
    "banana",
    "cherry",
    "date",
    "elderberry",
    "fig",
    "grape",
    "honeydew",
    "kiwi",
    "lemon",
];

/// Scenario parameters, loadable from JSON
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct DemoConfig {
    bloom: BloomConfig,
    cuckoo: CuckooConfig,
    linear: LinearCounterConfig,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Scenario {
    Bloom,
    Counting,
    Cuckoo,
    Linear,
    All,
}

impl FromStr for Scenario {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "bloom" => Ok(Scenario::Bloom),
            "counting" => Ok(Scenario::Counting),
            "cuckoo" => Ok(Scenario::Cuckoo),
            "linear" => Ok(Scenario::Linear),
            "all" => Ok(Scenario::All),
            other => bail!(
                "unknown scenario '{}', expected bloom|counting|cuckoo|linear|all",
                other
            ),
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Scenario::Bloom => "bloom",
            Scenario::Counting => "counting",
            Scenario::Cuckoo => "cuckoo",
            Scenario::Linear => "linear",
            Scenario::All => "all",
        };
        f.write_str(name)
    }
}

fn init_logging() -> Result<()> {
    let directive = std::env::var("PDS_LOG_LEVEL")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());
    let env_filter = EnvFilter::try_new(&directive)
        .with_context(|| format!("invalid log filter '{}'", directive))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))?;
    Ok(())
}

fn load_config() -> Result<DemoConfig> {
    let mut config = match std::env::var("PDS_CONFIG") {
        Ok(path) => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config file {}", path))?;
            let config: DemoConfig = serde_json::from_str(&raw)
                .with_context(|| format!("parsing config file {}", path))?;
            info!(path = %path, "Loaded configuration");
            config
        }
        Err(_) => DemoConfig::default(),
    };

    if let Ok(seed) = std::env::var("PDS_CUCKOO_SEED") {
        match seed.parse() {
            Ok(seed) => config.cuckoo.seed = Some(seed),
            Err(_) => warn!(value = %seed, "PDS_CUCKOO_SEED must be an unsigned integer"),
        }
    }

    Ok(config)
}

fn run_bloom(config: &DemoConfig) -> Result<()> {
    let mut filter: SimpleBloomFilter<str> = SimpleBloomFilter::new(config.bloom.clone())?;
    filter.set_observer(Box::new(TracingObserver::new(Level::DEBUG)));

    for fruit in &FRUITS[..3] {
        filter.insert(fruit);
    }

    for probe in ["apple", "banana", "cherry", "zucchini"] {
        match filter.query(probe) {
            QueryResult::PossiblyPresent {
                false_positive_probability,
            } => info!(item = probe, false_positive_probability, "possibly present"),
            QueryResult::Absent => info!(item = probe, "absent"),
        }
    }

    info!(
        size = filter.size(),
        load_factor = filter.load_factor(),
        hash_count = filter.hash_count(),
        "Bloom filter done"
    );
    Ok(())
}

fn run_counting(config: &DemoConfig) -> Result<()> {
    let mut filter: CountingBloomFilter<str> = CountingBloomFilter::new(config.bloom.clone())?;
    filter.set_observer(Box::new(TracingObserver::new(Level::DEBUG)));

    for fruit in &FRUITS[..4] {
        filter.insert(fruit);
    }

    let erased = filter.erase("banana");
    let ghost = filter.erase("zucchini");
    info!(erased, ghost, "Erase results");

    for probe in &FRUITS[..4] {
        info!(item = probe, present = filter.contains(probe), "query");
    }

    info!(
        size = filter.size(),
        items = filter.items(),
        load_factor = filter.load_factor(),
        "Counting Bloom filter done"
    );
    Ok(())
}

fn run_cuckoo(config: &DemoConfig) -> Result<()> {
    let mut filter: CuckooFilter<str> = CuckooFilter::new(config.cuckoo.clone())?;
    let metrics = Rc::new(Metrics::new());
    filter.set_observer(Box::new(Rc::clone(&metrics)));

    for fruit in FRUITS {
        if !filter.insert(fruit) {
            warn!(item = fruit, "insert rejected: table full");
        }
    }

    for fruit in &FRUITS[..3] {
        filter.erase(fruit);
    }

    for fruit in FRUITS {
        match filter.query(fruit) {
            pds_filters::Lookup::Found { bucket } => info!(item = fruit, bucket, "found"),
            pds_filters::Lookup::Absent => info!(item = fruit, "absent"),
        }
    }

    let snapshot = metrics.snapshot();
    info!(
        size = filter.size(),
        load_factor = filter.load_factor(),
        inserts = snapshot.insert_events,
        erases = snapshot.erases,
        queries = snapshot.queries,
        "Cuckoo filter done"
    );
    Ok(())
}

fn run_linear(config: &DemoConfig) -> Result<()> {
    let mut counter: LinearCounter<str> = LinearCounter::new(config.linear.clone())?;
    counter.set_observer(Box::new(TracingObserver::new(Level::DEBUG)));

    for word in ["apple", "banana", "apple", "cherry", "date", "banana"] {
        counter.insert(word);
    }

    match counter.estimate_with_bounds(2.0) {
        Some(bounds) => info!(
            estimate = bounds.estimate,
            lower = bounds.lower,
            upper = bounds.upper,
            inserted = counter.size(),
            "Linear counter done"
        ),
        None => warn!(inserted = counter.size(), "Cardinality unknown: bitmap saturated"),
    }
    Ok(())
}

fn run(scenario: Scenario, config: &DemoConfig) -> Result<()> {
    info!(%scenario, "Running scenario");
    match scenario {
        Scenario::Bloom => run_bloom(config),
        Scenario::Counting => run_counting(config),
        Scenario::Cuckoo => run_cuckoo(config),
        Scenario::Linear => run_linear(config),
        Scenario::All => {
            for scenario in [
                Scenario::Bloom,
                Scenario::Counting,
                Scenario::Cuckoo,
                Scenario::Linear,
            ] {
                run(scenario, config)?;
            }
            Ok(())
        }
    }
}

fn main() -> Result<()> {
    init_logging()?;
    let config = load_config()?;

    let scenario = match std::env::args().nth(1) {
        Some(arg) => arg.parse()?,
        None => Scenario::All,
    };

    run(scenario, &config)
}
