//! Fixed-capacity bit array shared by the bit-backed structures
//!
//! Capacity is chosen at construction and never changes. The array keeps a
//! running count of set bits so load factor and the estimators never have to
//! scan the whole vector.

use bitvec::prelude::*;

/// Bit vector of fixed capacity `M`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FixedBitArray {
    bits: BitVec<u64, Lsb0>,
    ones: usize,
}

impl FixedBitArray {
    /// Create an all-zero array of `capacity` bits
    pub fn new(capacity: usize) -> Self {
        Self {
            bits: bitvec![u64, Lsb0; 0; capacity],
            ones: 0,
        }
    }

    /// Number of bits in the array
    pub fn capacity(&self) -> usize {
        self.bits.len()
    }

    /// Returns whether bit `index` is set.
    ///
    /// Out-of-range indices read as unset.
    pub fn test(&self, index: usize) -> bool {
        self.bits.get(index).map(|b| *b).unwrap_or(false)
    }

    /// Set bit `index`, returning `true` if it transitioned 0 -> 1
    pub fn set(&mut self, index: usize) -> bool {
        if index >= self.capacity() || self.bits[index] {
            return false;
        }
        self.bits.set(index, true);
        self.ones += 1;
        true
    }

    /// Clear bit `index`, returning `true` if it transitioned 1 -> 0
    pub fn reset(&mut self, index: usize) -> bool {
        if !self.test(index) {
            return false;
        }
        self.bits.set(index, false);
        self.ones -= 1;
        true
    }

    /// Clear every bit
    pub fn reset_all(&mut self) {
        self.bits.fill(false);
        self.ones = 0;
    }

    /// Number of set bits
    pub fn count_ones(&self) -> usize {
        self.ones
    }

    /// Number of unset bits
    pub fn count_zeros(&self) -> usize {
        self.capacity() - self.ones
    }

    /// Percentage of set bits, rounded down
    pub fn load_percent(&self) -> u32 {
        if self.capacity() == 0 {
            return 0;
        }
        (self.ones * 100 / self.capacity()) as u32
    }

    /// Iterate over the indices of set bits in ascending order
    pub fn iter_ones(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits.iter_ones()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_array_is_empty() {
        let bits = FixedBitArray::new(1024);
        assert_eq!(bits.capacity(), 1024);
        assert_eq!(bits.count_ones(), 0);
        assert_eq!(bits.count_zeros(), 1024);
        assert_eq!(bits.load_percent(), 0);
    }

    #[test]
    fn test_set_reports_transition_once() {
        let mut bits = FixedBitArray::new(64);

        assert!(bits.set(7), "First set should flip the bit");
        assert!(!bits.set(7), "Second set should be a no-op");
        assert!(bits.test(7));
        assert_eq!(bits.count_ones(), 1);
    }

    #[test]
    fn test_reset_keeps_count_in_sync() {
        let mut bits = FixedBitArray::new(64);
        bits.set(3);
        bits.set(9);

        assert!(bits.reset(3));
        assert!(!bits.reset(3), "Clearing an unset bit is a no-op");
        assert_eq!(bits.count_ones(), 1);
        assert_eq!(bits.iter_ones().collect::<Vec<_>>(), vec![9]);
    }

    #[test]
    fn test_out_of_range_is_ignored() {
        let mut bits = FixedBitArray::new(8);
        assert!(!bits.set(8));
        assert!(!bits.test(100));
        assert_eq!(bits.count_ones(), 0);
    }

    #[test]
    fn test_load_percent_rounds_down() {
        let mut bits = FixedBitArray::new(300);
        for i in 0..100 {
            bits.set(i);
        }
        assert_eq!(bits.load_percent(), 33);

        bits.reset_all();
        assert_eq!(bits.count_ones(), 0);
    }
}
