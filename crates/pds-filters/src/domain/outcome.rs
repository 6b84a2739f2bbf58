//! Result types for membership queries

/// Answer of a Bloom-family membership query
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum QueryResult {
    /// At least one hashed bit is unset: the item was never inserted
    Absent,
    /// Every hashed bit is set; the item may be a false positive
    PossiblyPresent {
        /// Current false-positive probability estimate
        false_positive_probability: f64,
    },
}

impl QueryResult {
    /// True unless the filter proved the item absent
    pub fn is_possibly_present(&self) -> bool {
        matches!(self, QueryResult::PossiblyPresent { .. })
    }

    /// True when the filter proved the item absent
    pub fn is_absent(&self) -> bool {
        matches!(self, QueryResult::Absent)
    }

    /// The false-positive estimate carried by a positive answer
    pub fn false_positive_probability(&self) -> Option<f64> {
        match self {
            QueryResult::Absent => None,
            QueryResult::PossiblyPresent {
                false_positive_probability,
            } => Some(*false_positive_probability),
        }
    }
}

/// Answer of a cuckoo filter lookup
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lookup {
    /// The item's fingerprint is in neither candidate bucket
    Absent,
    /// The fingerprint was found in the given bucket
    Found {
        /// Bucket that holds the fingerprint
        bucket: usize,
    },
}

impl Lookup {
    /// True when the fingerprint was found
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found { .. })
    }

    /// True when the fingerprint was found in neither bucket
    pub fn is_absent(&self) -> bool {
        matches!(self, Lookup::Absent)
    }
}
