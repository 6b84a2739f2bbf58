//! # Linear Counter
//!
//! Cardinality estimation over a bitmap of `m` bits (Whang et al.).
//!
//! Each item sets bit `hash(item) mod m`. With `V` unset bits the number of
//! distinct items is estimated as `n = -m * ln(V / m)`. Once every bit is set
//! the estimator is undefined and [`LinearCounter::estimate`] returns `None`.

use std::hash::Hash;
use std::marker::PhantomData;

use tracing::debug;

use super::bit_array::FixedBitArray;
use super::config::{validate_bitmap_size, LinearCounterConfig};
use super::hash_functions::{ItemHasher, SipItemHasher};
use super::parameters::{linear_count_estimate, linear_count_standard_error};
use crate::error::FilterError;
use crate::ports::observer::{FilterEvent, Observer, ObserverSlot, Operation, Outcome, Snapshot};

/// Estimate with a symmetric error interval
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EstimateBounds {
    /// Lower bound, never below zero
    pub lower: f64,
    /// Point estimate
    pub estimate: f64,
    /// Upper bound
    pub upper: f64,
}

impl EstimateBounds {
    /// Check if a value falls within bounds
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }

    /// Width of the interval
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

/// Linear-counting cardinality estimator
///
/// # Example
///
/// ```
/// use pds_filters::domain::{LinearCounter, LinearCounterConfig};
///
/// let mut counter: LinearCounter<str> = LinearCounter::new(LinearCounterConfig::new(1024)?)?;
/// for word in ["a", "b", "a", "c"] {
///     counter.insert(word);
/// }
/// let estimate = counter.estimate().unwrap();
/// assert!((estimate - 3.0).abs() < 0.5);
/// assert_eq!(counter.size(), 4);
/// # Ok::<(), pds_filters::FilterError>(())
/// ```
#[derive(Debug)]
pub struct LinearCounter<T: ?Sized, H = SipItemHasher> {
    bits: FixedBitArray,
    /// Raw insert calls, duplicates included
    inserted: u64,
    hasher: H,
    observer: ObserverSlot,
    _item: PhantomData<fn(&T)>,
}

impl<T: ?Sized, H: Clone> Clone for LinearCounter<T, H> {
    fn clone(&self) -> Self {
        Self {
            bits: self.bits.clone(),
            inserted: self.inserted,
            hasher: self.hasher.clone(),
            observer: self.observer.clone(),
            _item: PhantomData,
        }
    }
}

impl<T: Hash + ?Sized> LinearCounter<T> {
    /// Create a counter with the default hasher
    pub fn new(config: LinearCounterConfig) -> Result<Self, FilterError> {
        Self::with_hasher(config, SipItemHasher::default())
    }
}

impl<T: Hash + ?Sized, H: ItemHasher> LinearCounter<T, H> {
    /// Create a counter with a custom base hasher
    pub fn with_hasher(config: LinearCounterConfig, hasher: H) -> Result<Self, FilterError> {
        config.validate()?;
        debug!(bitmap_size = config.bitmap_size, "Linear counter created");
        Ok(Self {
            bits: FixedBitArray::new(config.bitmap_size),
            inserted: 0,
            hasher,
            observer: ObserverSlot::default(),
            _item: PhantomData,
        })
    }

    /// Resize the bitmap to `m` bits and clear it
    pub fn init(&mut self, m: usize) -> Result<(), FilterError> {
        validate_bitmap_size(m)?;
        self.bits = FixedBitArray::new(m);
        self.inserted = 0;
        debug!(bitmap_size = m, "Linear counter initialized");
        self.notify(Operation::Init, Outcome::Applied, None);
        Ok(())
    }

    /// Record an item
    ///
    /// Returns `true` if the item's bit was previously unset.
    pub fn insert(&mut self, item: &T) -> bool {
        let idx = (self.hasher.hash_item(item) % self.bits.capacity() as u64) as usize;
        let newly_set = self.bits.set(idx);
        self.inserted += 1;
        self.notify(Operation::Insert, Outcome::Applied, Some(idx));
        newly_set
    }

    /// Estimated number of distinct items, `None` once the bitmap is full
    pub fn estimate(&self) -> Option<f64> {
        let estimate = linear_count_estimate(self.bits.capacity(), self.bits.count_zeros());
        match estimate {
            Some(_) => self.notify(Operation::Query, Outcome::Applied, None),
            None => {
                debug!(
                    bitmap_size = self.bits.capacity(),
                    inserted = self.inserted,
                    "Linear counting estimate undefined: bitmap saturated"
                );
                self.notify(Operation::Query, Outcome::Rejected, None);
            }
        }
        estimate
    }

    /// Estimate with a `sigmas`-standard-error interval
    pub fn estimate_with_bounds(&self, sigmas: f64) -> Option<EstimateBounds> {
        let estimate = self.estimate()?;
        let margin = sigmas * linear_count_standard_error(self.bits.capacity(), estimate);
        Some(EstimateBounds {
            lower: (estimate - margin).max(0.0),
            estimate,
            upper: estimate + margin,
        })
    }
}

impl<T: ?Sized, H> LinearCounter<T, H> {
    /// Raw insert-call count, duplicates included
    pub fn size(&self) -> u64 {
        self.inserted
    }

    /// True before the first insert
    pub fn is_empty(&self) -> bool {
        self.inserted == 0
    }

    /// Percentage of set bits, rounded down
    pub fn load_factor(&self) -> u32 {
        self.bits.load_percent()
    }

    /// Number of set bits
    pub fn bits_set(&self) -> usize {
        self.bits.count_ones()
    }

    /// Number of unset bits (V)
    pub fn unset_bits(&self) -> usize {
        self.bits.count_zeros()
    }

    /// Bitmap size (m)
    pub fn bitmap_size(&self) -> usize {
        self.bits.capacity()
    }

    /// Clear the bitmap and the insert count
    pub fn clear(&mut self) {
        self.bits.reset_all();
        self.inserted = 0;
    }

    /// Read-only view of the internal state
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot::LinearCounter {
            bits: &self.bits,
            inserted: self.inserted,
        }
    }

    /// Attach an observer, returning the previous one
    pub fn set_observer(&mut self, observer: Box<dyn Observer>) -> Option<Box<dyn Observer>> {
        self.observer.attach(observer)
    }

    /// Detach the current observer
    pub fn take_observer(&mut self) -> Option<Box<dyn Observer>> {
        self.observer.detach()
    }

    fn notify(&self, op: Operation, outcome: Outcome, highlight: Option<usize>) {
        self.observer.notify(|| FilterEvent {
            op,
            outcome,
            highlight,
            snapshot: self.snapshot(),
        });
    }
}
