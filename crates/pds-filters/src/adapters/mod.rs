//! Adapters Layer (Driven Adapters)
//!
//! Implementations of the observer port.
//!
//! ## Adapters
//!
//! - `TracingObserver` - Renders each event as a structured `tracing` record
//! - `RecordingObserver` - Keeps owned event summaries for later inspection

pub mod recording;
pub mod tracing_observer;

pub use recording::{RecordedEvent, RecordingObserver};
pub use tracing_observer::TracingObserver;
