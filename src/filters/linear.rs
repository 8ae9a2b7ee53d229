//! Linear probabilistic counter.
//!
//! A linear counter estimates the number of distinct terms inserted into a
//! stream using a single hash function and a bit array — no k-way indexing
//! and no membership answers. Each `put` hashes the term to one bit; the
//! cardinality estimate is derived from the fraction of bits still unset:
//!
//! ```text
//! n ≈ -m · ln(u / m)
//! ```
//!
//! where `m` is the bit length and `u` the count of unset bits. Sizing the
//! array at ten bits per expected distinct element keeps the estimate
//! within roughly one percent.
//!
//! # Examples
//!
//! ```
//! use atomsketch::LinearCounter;
//!
//! let counter = LinearCounter::new(1000).unwrap();
//! for i in 0..500u32 {
//!     counter.put(&i.to_le_bytes());
//!     counter.put(&i.to_le_bytes()); // duplicates do not inflate the estimate
//! }
//!
//! let estimate = counter.cardinality();
//! assert!((480..=520).contains(&estimate), "estimate {}", estimate);
//! ```

use crate::core::AtomicWordStore;
use crate::error::Result;
use crate::hash::{HashFamily, HashFunction};

/// Bits allocated per expected distinct element (≈1% estimation error).
const BITS_PER_EXPECTED_ELEMENT: usize = 10;

/// Default seed for the single hash function.
const DEFAULT_SEED: u64 = 0;

/// Single-hash bit array for estimating distinct-element counts.
///
/// Shares the crate's concurrency model: `put` is one atomic bit set, any
/// number of threads may insert and read through `&self`.
#[derive(Debug, Clone)]
pub struct LinearCounter {
    store: AtomicWordStore,
    hash_function: HashFunction,
}

impl LinearCounter {
    /// Create a counter sized for `expected_cardinality` distinct elements,
    /// using a seeded 128-bit hash.
    ///
    /// # Errors
    ///
    /// Returns [`SketchError::InvalidCapacity`](crate::SketchError::InvalidCapacity)
    /// if `expected_cardinality` is 0.
    pub fn new(expected_cardinality: usize) -> Result<Self> {
        Self::with_hash_function(
            expected_cardinality,
            HashFunction::new(HashFamily::Xxh3_128, DEFAULT_SEED),
        )
    }

    /// Create a counter with a caller-supplied hash function descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`SketchError::InvalidCapacity`](crate::SketchError::InvalidCapacity)
    /// if `expected_cardinality` is 0.
    pub fn with_hash_function(
        expected_cardinality: usize,
        hash_function: HashFunction,
    ) -> Result<Self> {
        let bits = expected_cardinality.saturating_mul(BITS_PER_EXPECTED_ELEMENT);
        Ok(Self {
            store: AtomicWordStore::new(bits)?,
            hash_function,
        })
    }

    /// Bit length of the counter (a multiple of 64).
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Whether the counter has zero bits. Always `false` for a constructed
    /// counter.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// The counter's hash function descriptor.
    #[must_use]
    pub fn hash_function(&self) -> HashFunction {
        self.hash_function
    }

    /// Record a term: set the single bit it hashes to. Idempotent.
    pub fn put(&self, term: &[u8]) {
        let index = self.hash_function.index(term, self.len());
        self.store.set(index, true);
    }

    /// Estimate the number of distinct terms recorded:
    /// `round(-m · ln(u / m))`.
    ///
    /// A fully saturated array (no unset bits) reports the finite maximum
    /// estimate by clamping `u` to 1 rather than evaluating `ln(0)`.
    #[must_use]
    pub fn cardinality(&self) -> u64 {
        let m = self.len();
        let unset = (m - self.store.count_ones()).max(1);
        if unset == m {
            return 0;
        }
        let m = m as f64;
        (-m * (unset as f64 / m).ln()).round() as u64
    }

    /// Heap memory used by the bit store, in bytes.
    #[must_use]
    pub fn memory_usage(&self) -> usize {
        self.store.memory_usage()
    }
}
