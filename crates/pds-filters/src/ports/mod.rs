//! Ports Layer
//!
//! Defines the interfaces (traits) for:
//! - Driving Ports (inbound) - uniform API over the structures
//! - Driven Ports (outbound) - the observer that renders operations

pub mod inbound;
pub mod observer;

pub use inbound::{CardinalityEstimator, DeletableFilter, MembershipFilter};
pub use observer::{FilterEvent, Observer, Operation, Outcome, Snapshot, StructureKind};
