//! Sizing and probability math
//!
//! Bloom filters:
//! - FPR = (1 - e^(-kn/m))^k
//! - m = -n*ln(fpr) / (ln(2)^2)  -- optimal bits
//! - k = (m/n) * ln(2)           -- optimal hash functions
//!
//! Linear counting (Whang, Vander-Zanden, Taylor 1990):
//! - n̂ = -m * ln(V/m), V = number of zero bits
//! - std error of n̂/n = sqrt(m * (e^t - t - 1)) / n, t = n/m

use std::f64::consts::LN_2;

/// Bloom filter sizing parameters
#[derive(Clone, Debug, PartialEq)]
pub struct BloomFilterParams {
    /// Number of bits in the filter
    pub size_bits: usize,
    /// Number of hash functions
    pub hash_count: usize,
    /// Expected false positive rate with these parameters
    pub expected_fpr: f64,
}

/// False positive probability for `k` functions, `n` set bits/items and `m` bits
///
/// Clamped to `[0, 1]`. `k = 0`, `n = 0` or `m = 0` yields `0.0`.
pub fn false_positive_probability(k: usize, n: usize, m: usize) -> f64 {
    if k == 0 || n == 0 || m == 0 {
        return 0.0;
    }
    let exponent = -(k as f64) * (n as f64) / (m as f64);
    let base = (1.0 - exponent.exp()).clamp(0.0, 1.0);
    base.powi(k as i32).clamp(0.0, 1.0)
}

/// Calculate optimal Bloom filter parameters for `num_elements` at `target_fpr`
pub fn calculate_optimal_parameters(num_elements: usize, target_fpr: f64) -> BloomFilterParams {
    if num_elements == 0 {
        return BloomFilterParams {
            size_bits: 1,
            hash_count: 1,
            expected_fpr: 0.0,
        };
    }

    let m = minimum_bits(num_elements, target_fpr).max(1);
    let k = optimal_k(m, num_elements).clamp(1, 32);

    BloomFilterParams {
        size_bits: m,
        hash_count: k,
        expected_fpr: false_positive_probability(k, num_elements, m),
    }
}

/// Optimal k for `m` bits and `n` elements
pub fn optimal_k(m: usize, n: usize) -> usize {
    if n == 0 {
        return 1;
    }
    ((m as f64 / n as f64) * LN_2).round() as usize
}

/// Minimum m for `n` elements at `target_fpr`
pub fn minimum_bits(n: usize, target_fpr: f64) -> usize {
    let ln2_squared = LN_2 * LN_2;
    (-(n as f64) * target_fpr.ln() / ln2_squared).ceil() as usize
}

/// Linear-counting estimate from bitmap size `m` and `zeros` unset bits
///
/// Returns `None` when the bitmap is saturated (`zeros == 0`).
pub fn linear_count_estimate(m: usize, zeros: usize) -> Option<f64> {
    if zeros == 0 || m == 0 {
        return None;
    }
    let m = m as f64;
    Some(-m * (zeros as f64 / m).ln())
}

/// Standard error of a linear-counting estimate `n` over `m` bits
///
/// Absolute, in items. Zero for an empty estimate.
pub fn linear_count_standard_error(m: usize, n: f64) -> f64 {
    if m == 0 || n <= 0.0 {
        return 0.0;
    }
    let m = m as f64;
    let t = n / m;
    (m * (t.exp() - t - 1.0)).max(0.0).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optimal_parameters_n100_fpr001() {
        // For n=100, FPR=0.01 → expect k≈7, m≈959
        let params = calculate_optimal_parameters(100, 0.01);

        assert!(
            params.hash_count >= 5 && params.hash_count <= 9,
            "Expected k≈7, got k={}",
            params.hash_count
        );
        assert!(
            params.size_bits >= 800 && params.size_bits <= 1200,
            "Expected m≈959, got m={}",
            params.size_bits
        );
    }

    #[test]
    fn test_fpr_calculation() {
        // With m=1000, n=100, k=7, FPR should be around 0.008
        let fpr = false_positive_probability(7, 100, 1000);
        assert!(fpr > 0.005 && fpr < 0.02, "Expected FPR≈0.008, got {}", fpr);
    }

    #[test]
    fn test_fpr_zero_cases() {
        assert_eq!(false_positive_probability(0, 10, 1024), 0.0);
        assert_eq!(false_positive_probability(3, 0, 1024), 0.0);
        assert_eq!(false_positive_probability(3, 10, 0), 0.0);
    }

    #[test]
    fn test_fpr_saturates_at_one() {
        let fpr = false_positive_probability(1, 1_000_000, 8);
        assert!(fpr <= 1.0 && fpr > 0.99);
    }

    #[test]
    fn test_expected_fpr_meets_target() {
        let target_fpr = 0.01;
        let params = calculate_optimal_parameters(100, target_fpr);
        assert!(
            params.expected_fpr <= target_fpr * 1.1,
            "Expected FPR {} should be <= target {}",
            params.expected_fpr,
            target_fpr
        );
    }

    #[test]
    fn test_zero_elements() {
        let params = calculate_optimal_parameters(0, 0.01);
        assert_eq!(params.size_bits, 1);
        assert_eq!(params.hash_count, 1);
    }

    #[test]
    fn test_k_clamped_to_reasonable_range() {
        let params = calculate_optimal_parameters(10, 0.0000001);
        assert!(params.hash_count <= 32, "k should be clamped to max 32");
        assert!(params.hash_count >= 1, "k should be at least 1");
    }

    #[test]
    fn test_lower_fpr_needs_more_bits() {
        let loose = calculate_optimal_parameters(100, 0.1);
        let tight = calculate_optimal_parameters(100, 0.01);
        assert!(tight.size_bits > loose.size_bits, "Lower FPR should need more bits");
    }

    #[test]
    fn test_linear_count_estimate() {
        assert_eq!(linear_count_estimate(1024, 1024), Some(0.0));
        assert_eq!(linear_count_estimate(1024, 0), None);

        // 4 set bits out of 1024 → ≈ 4.008
        let n = linear_count_estimate(1024, 1020).unwrap();
        assert!((n - 4.0).abs() < 0.05, "Expected ≈4, got {}", n);
    }

    #[test]
    fn test_linear_count_standard_error_grows_with_load() {
        let light = linear_count_standard_error(1024, 10.0);
        let heavy = linear_count_standard_error(1024, 2000.0);
        assert!(light > 0.0);
        assert!(heavy / 2000.0 > light / 10.0 || heavy > light);
        assert_eq!(linear_count_standard_error(1024, 0.0), 0.0);
    }
}
