//! Closed-form sizing formulas for probabilistic filters.
//!
//! Given a capacity `n` and a target false-positive probability `p`, the
//! classic Bloom filter analysis yields:
//!
//! - required bit count: `m = ⌈-n · ln(p) / (ln 2)²⌉`
//! - required hash count: `k = ⌈-log₂(p)⌉`
//!
//! Backing stores round `m` up to a whole number of 64-bit words; the extra
//! padding bits slightly lower the effective false-positive probability.
//!
//! # References
//!
//! - Bloom, Burton H. (1970). "Space/Time Trade-offs in Hash Coding with
//!   Allowable Errors"

use crate::error::{Result, SketchError};
use std::f64::consts::LN_2;

/// (ln 2)², precomputed for the bit-count formula.
const LN2_SQUARED: f64 = LN_2 * LN_2;

/// Number of hash functions needed to hit a target false-positive
/// probability: `⌈-log₂(p)⌉`.
///
/// # Errors
///
/// Returns [`SketchError::FalsePositiveRateOutOfBounds`] unless `p ∈ (0, 1)`.
///
/// # Examples
///
/// ```
/// use atomsketch::core::params::required_hash_count;
///
/// assert_eq!(required_hash_count(0.01).unwrap(), 7);
/// assert_eq!(required_hash_count(0.5).unwrap(), 1);
/// ```
pub fn required_hash_count(p: f64) -> Result<usize> {
    validate_probability(p)?;
    Ok((-p.log2()).ceil().max(1.0) as usize)
}

/// Filter length in bits needed to hold `n` elements at false-positive
/// probability `p`: `⌈-n · ln(p) / (ln 2)²⌉`.
///
/// # Errors
///
/// - [`SketchError::InvalidCapacity`] if `n == 0`
/// - [`SketchError::FalsePositiveRateOutOfBounds`] unless `p ∈ (0, 1)`
///
/// # Examples
///
/// ```
/// use atomsketch::core::params::required_bit_count;
///
/// assert_eq!(required_bit_count(10_000, 0.01).unwrap(), 95_851);
/// ```
pub fn required_bit_count(n: usize, p: f64) -> Result<usize> {
    if n == 0 {
        return Err(SketchError::invalid_capacity(n));
    }
    validate_probability(p)?;

    let bits = -(n as f64) * p.ln() / LN2_SQUARED;
    Ok(bits.ceil() as usize)
}

/// Validate that a false-positive probability lies in the open interval
/// (0, 1).
pub(crate) fn validate_probability(p: f64) -> Result<()> {
    if p.is_nan() || p <= 0.0 || p >= 1.0 {
        return Err(SketchError::fp_rate_out_of_bounds(p));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_hash_count_reference_values() {
        assert_eq!(required_hash_count(0.01).unwrap(), 7);
        assert_eq!(required_hash_count(0.001).unwrap(), 10);
        assert_eq!(required_hash_count(0.1).unwrap(), 4);
    }

    #[test]
    fn test_required_hash_count_at_least_one() {
        assert_eq!(required_hash_count(0.9).unwrap(), 1);
    }

    #[test]
    fn test_required_bit_count_reference_values() {
        assert_eq!(required_bit_count(10_000, 0.01).unwrap(), 95_851);
        assert_eq!(required_bit_count(1000, 0.01).unwrap(), 9586);
    }

    #[test]
    fn test_required_bit_count_scales_linearly() {
        let small = required_bit_count(1000, 0.01).unwrap();
        let large = required_bit_count(100_000, 0.01).unwrap();
        let ratio = large as f64 / small as f64;
        assert!((ratio - 100.0).abs() < 0.1, "ratio was {}", ratio);
    }

    #[test]
    fn test_rejects_zero_capacity() {
        assert_eq!(
            required_bit_count(0, 0.01),
            Err(SketchError::invalid_capacity(0))
        );
    }

    #[test]
    fn test_rejects_probability_out_of_bounds() {
        for p in [0.0, 1.0, -0.5, 1.5, f64::NAN] {
            assert!(required_hash_count(p).is_err(), "accepted p={}", p);
            assert!(required_bit_count(100, p).is_err(), "accepted p={}", p);
        }
    }
}
