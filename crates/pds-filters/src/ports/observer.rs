//! Observer port (driven)
//!
//! After `init`, `insert`, `query`, `erase` (and `estimate` for the linear
//! counter) a structure emits one [`FilterEvent`] to an attached
//! [`Observer`]. A simple Bloom filter insert emits one per hash index.
//!
//! The event borrows a read-only [`Snapshot`] of the structure's internals,
//! so an observer can render state but cannot change it, and it returns
//! nothing, so it cannot steer the operation.
//!
//! Every structure behaves identically with or without an observer.

use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use crate::domain::bit_array::FixedBitArray;
use crate::domain::cuckoo::{Bucket, Fingerprint};

/// Operation that produced an event
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    Init,
    Insert,
    Query,
    Erase,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Init => "INIT",
            Operation::Insert => "INSERT",
            Operation::Query => "QUERY",
            Operation::Erase => "ERASE",
        };
        f.write_str(name)
    }
}

/// How the operation ended
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The operation changed or read state as requested
    Applied,
    /// Cuckoo table full, erase of an absent item, or saturated estimator
    Rejected,
    /// Membership query answered "possibly present"
    Hit,
    /// Membership query answered "absent"
    Miss,
}

/// Which structure produced an event
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StructureKind {
    SimpleBloom,
    CountingBloom,
    Cuckoo,
    LinearCounter,
}

impl fmt::Display for StructureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StructureKind::SimpleBloom => "simple_bloom",
            StructureKind::CountingBloom => "counting_bloom",
            StructureKind::Cuckoo => "cuckoo",
            StructureKind::LinearCounter => "linear_counter",
        };
        f.write_str(name)
    }
}

/// Read-only view of a structure's internal state
#[derive(Clone, Copy, Debug)]
pub enum Snapshot<'a> {
    SimpleBloom {
        bits: &'a FixedBitArray,
        hash_count: usize,
    },
    CountingBloom {
        bits: &'a FixedBitArray,
        counters: &'a [u8],
        hash_count: usize,
    },
    Cuckoo {
        buckets: &'a [Bucket],
        fingerprint_bits: u8,
        count: usize,
    },
    LinearCounter {
        bits: &'a FixedBitArray,
        inserted: u64,
    },
}

impl<'a> Snapshot<'a> {
    /// The structure this snapshot was taken from
    pub fn kind(&self) -> StructureKind {
        match self {
            Snapshot::SimpleBloom { .. } => StructureKind::SimpleBloom,
            Snapshot::CountingBloom { .. } => StructureKind::CountingBloom,
            Snapshot::Cuckoo { .. } => StructureKind::Cuckoo,
            Snapshot::LinearCounter { .. } => StructureKind::LinearCounter,
        }
    }

    /// Occupied units: set bits, or non-empty cuckoo slots
    pub fn occupied(&self) -> usize {
        match self {
            Snapshot::SimpleBloom { bits, .. }
            | Snapshot::CountingBloom { bits, .. }
            | Snapshot::LinearCounter { bits, .. } => bits.count_ones(),
            Snapshot::Cuckoo { count, .. } => *count,
        }
    }

    /// Total units: bit capacity, or cuckoo slot count
    pub fn capacity(&self) -> usize {
        match self {
            Snapshot::SimpleBloom { bits, .. }
            | Snapshot::CountingBloom { bits, .. }
            | Snapshot::LinearCounter { bits, .. } => bits.capacity(),
            Snapshot::Cuckoo { buckets, .. } => buckets.iter().map(Bucket::len).sum(),
        }
    }

    /// Fingerprints of one cuckoo bucket, if this is a cuckoo snapshot
    pub fn bucket(&self, index: usize) -> Option<&'a [Fingerprint]> {
        match *self {
            Snapshot::Cuckoo { buckets, .. } => buckets.get(index).map(Bucket::entries),
            _ => None,
        }
    }
}

/// One observer notification
#[derive(Clone, Copy, Debug)]
pub struct FilterEvent<'a> {
    /// Operation kind
    pub op: Operation,
    /// How the operation ended
    pub outcome: Outcome,
    /// Bit index or bucket the operation touched, when there is one
    pub highlight: Option<usize>,
    /// State after the operation
    pub snapshot: Snapshot<'a>,
}

/// Presentation-layer consumer of filter events
pub trait Observer {
    /// Receive one event
    fn on_event(&self, event: &FilterEvent<'_>);
}

impl<O: Observer + ?Sized> Observer for Rc<O> {
    fn on_event(&self, event: &FilterEvent<'_>) {
        (**self).on_event(event)
    }
}

impl<O: Observer + ?Sized> Observer for Arc<O> {
    fn on_event(&self, event: &FilterEvent<'_>) {
        (**self).on_event(event)
    }
}

/// Optional observer owned by a structure
///
/// Cloning a structure does not clone its observer; the clone starts detached.
#[derive(Default)]
pub(crate) struct ObserverSlot(Option<Box<dyn Observer>>);

impl ObserverSlot {
    pub(crate) fn attach(&mut self, observer: Box<dyn Observer>) -> Option<Box<dyn Observer>> {
        self.0.replace(observer)
    }

    pub(crate) fn detach(&mut self) -> Option<Box<dyn Observer>> {
        self.0.take()
    }

    pub(crate) fn is_attached(&self) -> bool {
        self.0.is_some()
    }

    /// Build and deliver an event; the closure only runs when attached
    pub(crate) fn notify<'a>(&self, event: impl FnOnce() -> FilterEvent<'a>) {
        if let Some(observer) = &self.0 {
            observer.on_event(&event());
        }
    }
}

impl Clone for ObserverSlot {
    fn clone(&self) -> Self {
        Self(None)
    }
}

impl fmt::Debug for ObserverSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverSlot")
            .field("attached", &self.is_attached())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Counter(Cell<usize>);

    impl Observer for Counter {
        fn on_event(&self, _: &FilterEvent<'_>) {
            self.0.set(self.0.get() + 1);
        }
    }

    fn event(bits: &FixedBitArray) -> FilterEvent<'_> {
        FilterEvent {
            op: Operation::Insert,
            outcome: Outcome::Applied,
            highlight: Some(1),
            snapshot: Snapshot::SimpleBloom { bits, hash_count: 3 },
        }
    }

    #[test]
    fn test_detached_slot_skips_event_construction() {
        let slot = ObserverSlot::default();
        let bits = FixedBitArray::new(8);
        let built = Cell::new(false);

        slot.notify(|| {
            built.set(true);
            event(&bits)
        });

        assert!(!built.get(), "No observer means no snapshot is built");
    }

    #[test]
    fn test_attached_slot_delivers_through_rc() {
        let counter = Rc::new(Counter(Cell::new(0)));
        let mut slot = ObserverSlot::default();
        slot.attach(Box::new(Rc::clone(&counter)));

        let bits = FixedBitArray::new(8);
        slot.notify(|| event(&bits));
        slot.notify(|| event(&bits));

        assert_eq!(counter.0.get(), 2);
    }

    #[test]
    fn test_cloned_slot_is_detached() {
        let mut slot = ObserverSlot::default();
        slot.attach(Box::new(Counter(Cell::new(0))));
        assert!(slot.is_attached());
        assert!(!slot.clone().is_attached());
        assert!(slot.detach().is_some());
        assert!(!slot.is_attached());
    }

    #[test]
    fn test_snapshot_metrics() {
        let mut bits = FixedBitArray::new(16);
        bits.set(2);
        bits.set(5);
        let snapshot = Snapshot::LinearCounter { bits: &bits, inserted: 3 };

        assert_eq!(snapshot.kind(), StructureKind::LinearCounter);
        assert_eq!(snapshot.occupied(), 2);
        assert_eq!(snapshot.capacity(), 16);
        assert!(snapshot.bucket(0).is_none());
    }

    #[test]
    fn test_operation_display() {
        assert_eq!(Operation::Init.to_string(), "INIT");
        assert_eq!(Operation::Erase.to_string(), "ERASE");
        assert_eq!(StructureKind::Cuckoo.to_string(), "cuckoo");
    }
}
