//! Structured-log rendering of filter events

use tracing::{debug, error, info, trace, warn, Level};

use crate::ports::observer::{FilterEvent, Observer};

/// Logs every event through `tracing`
///
/// Fields: `op`, `structure`, `outcome`, `highlight`, `occupied`, `capacity`.
#[derive(Clone, Copy, Debug)]
pub struct TracingObserver {
    level: Level,
}

impl Default for TracingObserver {
    fn default() -> Self {
        Self::new(Level::TRACE)
    }
}

impl TracingObserver {
    /// Log at `level`
    pub fn new(level: Level) -> Self {
        Self { level }
    }

    /// The level events are logged at
    pub fn level(&self) -> Level {
        self.level
    }
}

macro_rules! render {
    (
        $macro:ident,
        $op:ident,
        $structure:ident,
        $outcome:ident,
        $highlight:ident,
        $occupied:ident,
        $capacity:ident
    ) => {
        $macro!(
            op = %$op,
            structure = %$structure,
            outcome = ?$outcome,
            highlight = ?$highlight,
            occupied = $occupied,
            capacity = $capacity,
            "filter event"
        )
    };
}

impl Observer for TracingObserver {
    fn on_event(&self, event: &FilterEvent<'_>) {
        let op = event.op;
        let structure = event.snapshot.kind();
        let outcome = event.outcome;
        let highlight = event.highlight;
        let occupied = event.snapshot.occupied();
        let capacity = event.snapshot.capacity();

        match self.level {
            Level::ERROR => render!(error, op, structure, outcome, highlight, occupied, capacity),
            Level::WARN => render!(warn, op, structure, outcome, highlight, occupied, capacity),
            Level::INFO => render!(info, op, structure, outcome, highlight, occupied, capacity),
            Level::DEBUG => render!(debug, op, structure, outcome, highlight, occupied, capacity),
            _ => render!(trace, op, structure, outcome, highlight, occupied, capacity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BloomConfig, SimpleBloomFilter};

    #[test]
    fn test_default_level_is_trace() {
        assert_eq!(TracingObserver::default().level(), Level::TRACE);
    }

    #[test]
    fn test_filter_behaves_identically_with_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_max_level(Level::TRACE)
            .with_test_writer()
            .try_init();

        let config = BloomConfig::new(3, 256).unwrap();
        let mut plain: SimpleBloomFilter<str> = SimpleBloomFilter::new(config.clone()).unwrap();
        let mut traced: SimpleBloomFilter<str> = SimpleBloomFilter::new(config).unwrap();
        traced.set_observer(Box::new(TracingObserver::new(Level::INFO)));

        for item in ["apple", "banana", "cherry"] {
            plain.insert(item);
            traced.insert(item);
        }

        assert_eq!(plain.size(), traced.size());
        assert_eq!(
            plain.bits_set().collect::<Vec<_>>(),
            traced.bits_set().collect::<Vec<_>>()
        );
        assert_eq!(plain.query("durian"), traced.query("durian"));
    }
}
