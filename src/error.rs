//! Error types for atomsketch operations.
//!
//! All fallible operations in this crate return [`Result<T>`] with
//! [`SketchError`] as the error type. Variants carry enough context to
//! diagnose the failure without re-running the operation.
//!
//! # Error Propagation
//!
//! ```
//! use atomsketch::{Result, SketchError};
//! use atomsketch::core::params::{required_bit_count, required_hash_count};
//!
//! fn plan_filter(capacity: usize, fpp: f64) -> Result<(usize, usize)> {
//!     let bits = required_bit_count(capacity, fpp)?;
//!     let hashes = required_hash_count(fpp)?;
//!     Ok((bits, hashes))
//! }
//! # assert!(plan_filter(1000, 0.01).is_ok());
//! ```

use std::fmt;

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SketchError>;

/// Errors that can occur while constructing or combining sketches.
///
/// `Clone + PartialEq` are derived so tests can compare errors directly.
#[derive(Debug, Clone, PartialEq)]
pub enum SketchError {
    /// Target false-positive probability outside the open interval (0, 1).
    ///
    /// A rate of 0 would require infinite memory; a rate of 1 accepts
    /// everything. Neither describes a usable filter.
    FalsePositiveRateOutOfBounds {
        /// The rejected probability.
        value: f64,
    },

    /// Capacity or expected cardinality of zero.
    ///
    /// The sizing formulas divide by or take logarithms of this value, so a
    /// zero-capacity structure cannot be constructed.
    InvalidCapacity {
        /// The rejected count.
        count: usize,
    },

    /// Hash-function list with an unusable length.
    ///
    /// A filter needs at least one hash function; an explicit empty list is
    /// rejected rather than silently producing a filter that accepts nothing.
    InvalidHashCount {
        /// The rejected count.
        count: usize,
    },

    /// Counter bit width outside the packable range `1..=63`.
    InvalidCounterBits {
        /// The rejected width.
        bits: u32,
    },

    /// Two structures combined with incompatible shapes.
    ///
    /// Raised by merge/intersection when filter lengths or hash
    /// configurations differ. Combining such filters would silently produce
    /// a meaningless result, so the mismatch is an error instead.
    ShapeMismatch {
        /// Description of the incompatibility.
        reason: String,
    },

    /// Malformed or truncated input while decoding a serialized filter.
    ///
    /// No partial structure is ever returned from a failed decode.
    Decode {
        /// Description of what failed.
        message: String,
    },
}

impl fmt::Display for SketchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FalsePositiveRateOutOfBounds { value } => {
                write!(
                    f,
                    "false positive probability {} is out of bounds; must be in (0, 1)",
                    value
                )
            }
            Self::InvalidCapacity { count } => {
                write!(f, "invalid capacity {}; must be greater than 0", count)
            }
            Self::InvalidHashCount { count } => {
                write!(
                    f,
                    "invalid hash function count {}; at least one is required",
                    count
                )
            }
            Self::InvalidCounterBits { bits } => {
                write!(
                    f,
                    "invalid counter width {} bits; must be in range [1, 63]",
                    bits
                )
            }
            Self::ShapeMismatch { reason } => {
                write!(f, "cannot combine incompatible sketches: {}", reason)
            }
            Self::Decode { message } => {
                write!(f, "decode error: {}", message)
            }
        }
    }
}

impl std::error::Error for SketchError {}

impl SketchError {
    /// Create a `FalsePositiveRateOutOfBounds` error.
    #[must_use]
    pub fn fp_rate_out_of_bounds(value: f64) -> Self {
        Self::FalsePositiveRateOutOfBounds { value }
    }

    /// Create an `InvalidCapacity` error.
    #[must_use]
    pub fn invalid_capacity(count: usize) -> Self {
        Self::InvalidCapacity { count }
    }

    /// Create an `InvalidHashCount` error.
    #[must_use]
    pub fn invalid_hash_count(count: usize) -> Self {
        Self::InvalidHashCount { count }
    }

    /// Create an `InvalidCounterBits` error.
    #[must_use]
    pub fn invalid_counter_bits(bits: u32) -> Self {
        Self::InvalidCounterBits { bits }
    }

    /// Create a `ShapeMismatch` error with a formatted reason.
    #[must_use]
    pub fn shape_mismatch(reason: impl Into<String>) -> Self {
        Self::ShapeMismatch {
            reason: reason.into(),
        }
    }

    /// Create a `Decode` error with a formatted message.
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}
