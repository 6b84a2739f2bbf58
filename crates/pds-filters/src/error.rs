//! Error types for the filter family
//!
//! Probabilistic outcomes (definite negatives, false positives, a full cuckoo
//! table, a saturated linear counter) are reported through return values.
//! Only configuration misuse is an error.

use thiserror::Error;

/// Errors that can occur when configuring a filter or counter
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl FilterError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        FilterError::InvalidConfiguration(msg.into())
    }
}
