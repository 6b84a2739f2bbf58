//! In-memory event recorder

use std::cell::RefCell;

use crate::domain::cuckoo::Fingerprint;
use crate::ports::observer::{FilterEvent, Observer, Operation, Outcome, StructureKind};

/// Owned summary of one [`FilterEvent`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedEvent {
    pub op: Operation,
    pub outcome: Outcome,
    pub structure: StructureKind,
    pub highlight: Option<usize>,
    /// Set bits, or occupied cuckoo slots, after the operation
    pub occupied: usize,
    /// Fingerprints of the highlighted cuckoo bucket
    pub bucket: Option<Vec<Fingerprint>>,
}

impl RecordedEvent {
    fn from_event(event: &FilterEvent<'_>) -> Self {
        Self {
            op: event.op,
            outcome: event.outcome,
            structure: event.snapshot.kind(),
            highlight: event.highlight,
            occupied: event.snapshot.occupied(),
            bucket: event
                .highlight
                .and_then(|i| event.snapshot.bucket(i))
                .map(<[Fingerprint]>::to_vec),
        }
    }
}

/// Observer that stores every event it receives
///
/// Single-threaded; share it with `Rc` to inspect the events afterwards.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: RefCell<Vec<RecordedEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// All events so far, oldest first
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.borrow().clone()
    }

    /// Number of events for `op`
    pub fn count(&self, op: Operation) -> usize {
        self.events.borrow().iter().filter(|e| e.op == op).count()
    }

    /// Most recent event
    pub fn last(&self) -> Option<RecordedEvent> {
        self.events.borrow().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl Observer for RecordingObserver {
    fn on_event(&self, event: &FilterEvent<'_>) {
        self.events.borrow_mut().push(RecordedEvent::from_event(event));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CuckooConfigBuilder, CuckooFilter};
    use std::rc::Rc;

    #[test]
    fn test_records_cuckoo_bucket_contents() {
        let recorder = Rc::new(RecordingObserver::new());
        let config = CuckooConfigBuilder::new().num_buckets(16).seed(1).build().unwrap();
        let mut filter: CuckooFilter<str> = CuckooFilter::new(config).unwrap();
        filter.set_observer(Box::new(Rc::clone(&recorder)));

        filter.insert("apple");
        let event = recorder.last().unwrap();

        assert_eq!(event.op, Operation::Insert);
        assert_eq!(event.structure, StructureKind::Cuckoo);
        let bucket = event.bucket.expect("Cuckoo insert highlights a bucket");
        assert!(bucket.contains(&filter.fingerprint("apple")));

        recorder.clear();
        assert!(recorder.is_empty());
    }
}
