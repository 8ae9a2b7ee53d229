//! Counting Bloom filter with probabilistic deletion.
//!
//! A counting Bloom filter pairs a [`BloomFilter`] with a [`CounterArray`]
//! holding one counter per filter bit. `put` increments the k counters a
//! term maps to alongside setting the k bits; `delete` decrements them and
//! clears a bit once its counter drops to zero or below. That makes
//! deletion possible at the cost of counter memory (8 bits per filter bit
//! by default).
//!
//! # Deleting absent terms
//!
//! Deleting a term that was never inserted is permitted and simply drives
//! the affected counters negative (the default counters are signed). This
//! mirrors the filter's tolerance of hash collisions: a delete cannot tell
//! whether the counts it sees belong to the deleted term or to colliding
//! ones, so no attempt is made to reject "impossible" deletes.
//!
//! # Counting
//!
//! [`count`](CountingBloomFilter::count) reports the **rounded mean** of
//! the k counter readings. In the collision-free case every counter holds
//! the exact insertion count, so the mean is exact; with isolated
//! collisions the mean moves less than a max-based aggregate and never
//! under-reports like a min-based one can after overlapping deletes. This
//! choice is a documented design decision.
//!
//! # Examples
//!
//! ```
//! use atomsketch::CountingBloomFilter;
//!
//! let filter = CountingBloomFilter::new(1000, 0.01).unwrap();
//! filter.put(b"hat");
//! filter.put(b"hat");
//! filter.delete(b"hat");
//!
//! assert!(filter.member(b"hat"));
//! assert_eq!(filter.count(b"hat"), 1);
//!
//! filter.delete(b"hat");
//! assert!(!filter.member(b"hat"));
//! ```

use crate::core::CounterArray;
use crate::error::Result;
use crate::filters::bloom::BloomFilter;
use crate::hash::HashFunction;

/// Default counter width in bits.
const DEFAULT_COUNTER_BITS: u32 = 8;

/// Bloom filter variant supporting probabilistic deletion via per-bit
/// counters.
///
/// All operations take `&self` and are lock-free; the same partial-update
/// visibility caveats as [`BloomFilter`] apply, extended to the counters: a
/// concurrent reader may observe an insertion's bits without its counter
/// increments or vice versa.
#[derive(Debug)]
pub struct CountingBloomFilter {
    filter: BloomFilter,
    counters: CounterArray,
}

impl CountingBloomFilter {
    /// Create a filter for `capacity` elements at false-positive
    /// probability `fpp`, with 8-bit signed counters.
    ///
    /// # Errors
    ///
    /// Same construction errors as [`BloomFilter::new`].
    pub fn new(capacity: usize, fpp: f64) -> Result<Self> {
        Self::with_counter_size(capacity, fpp, DEFAULT_COUNTER_BITS, true)
    }

    /// Create a filter with an explicit counter width and signedness.
    ///
    /// Unsigned counters saturate at zero on delete, so repeated deletes of
    /// absent terms cannot push them negative; signed counters (the
    /// default) record the deficit instead.
    ///
    /// # Errors
    ///
    /// Same as [`BloomFilter::new`], plus
    /// [`SketchError::InvalidCounterBits`](crate::SketchError::InvalidCounterBits)
    /// if `counter_bits` is outside `1..=63`.
    pub fn with_counter_size(
        capacity: usize,
        fpp: f64,
        counter_bits: u32,
        signed: bool,
    ) -> Result<Self> {
        let filter = BloomFilter::new(capacity, fpp)?;
        let counters = CounterArray::new(filter.len(), counter_bits, signed)?;
        Ok(Self { filter, counters })
    }

    /// Create a filter with a caller-supplied hash configuration and 8-bit
    /// signed counters.
    ///
    /// # Errors
    ///
    /// Same as [`BloomFilter::with_hash_functions`].
    pub fn with_hash_functions(
        capacity: usize,
        fpp: f64,
        hash_functions: Vec<HashFunction>,
    ) -> Result<Self> {
        let filter = BloomFilter::with_hash_functions(capacity, fpp, hash_functions)?;
        let counters = CounterArray::new(filter.len(), DEFAULT_COUNTER_BITS, true)?;
        Ok(Self { filter, counters })
    }

    /// Filter length in bits; also the number of counter slots.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.filter.len()
    }

    /// Whether the filter has zero bits. Always `false` for a constructed
    /// filter.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.filter.is_empty()
    }

    /// Number of hash functions (k).
    #[must_use]
    #[inline]
    pub fn hash_count(&self) -> usize {
        self.filter.hash_count()
    }

    /// Width of each counter in bits.
    #[must_use]
    pub fn counter_bits(&self) -> u32 {
        self.counters.counter_bits()
    }

    /// Insert a term: set its k bits and increment its k counters.
    ///
    /// The bit sets and counter increments are individually atomic but not
    /// atomic as a unit across the k positions.
    pub fn put(&self, term: &[u8]) {
        for index in self.filter.indices(term) {
            self.filter.store().set(index, true);
            self.counters.increment(index);
        }
    }

    /// Delete a term: decrement its k counters and clear each bit whose
    /// counter is now zero or below.
    ///
    /// Deleting a term that was never inserted is allowed; see the module
    /// docs.
    pub fn delete(&self, term: &[u8]) {
        for index in self.filter.indices(term) {
            if self.counters.decrement(index) <= 0 {
                self.filter.store().set(index, false);
            }
        }
    }

    /// Estimate how many times a term has been inserted (net of deletes),
    /// as the rounded mean of its k counter readings.
    ///
    /// Exact when no other term collides with any of the k slots; may be
    /// negative after deleting terms that were never inserted.
    #[must_use]
    pub fn count(&self, term: &[u8]) -> i64 {
        let mut sum = 0i64;
        let mut k = 0usize;
        for index in self.filter.indices(term) {
            sum += self.counters.get(index);
            k += 1;
        }
        (sum as f64 / k as f64).round() as i64
    }

    /// Test membership; delegates to the inner [`BloomFilter`].
    #[must_use]
    pub fn member(&self, term: &[u8]) -> bool {
        self.filter.member(term)
    }

    /// Estimate distinct insertions; delegates to the inner [`BloomFilter`].
    #[must_use]
    pub fn cardinality(&self) -> u64 {
        self.filter.cardinality()
    }

    /// Estimate the current false-positive probability; delegates to the
    /// inner [`BloomFilter`].
    #[must_use]
    pub fn false_positive_probability(&self) -> f64 {
        self.filter.false_positive_probability()
    }

    /// Heap memory used by the bit store and counter array, in bytes.
    #[must_use]
    pub fn memory_usage(&self) -> usize {
        self.filter.memory_usage() + self.counters.memory_usage()
    }
}
