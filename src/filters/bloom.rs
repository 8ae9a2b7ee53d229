//! Lock-free Bloom filter.
//!
//! A Bloom filter answers set-membership queries with tunable false-positive
//! probability and no false negatives. This implementation stores its bits
//! in an [`AtomicWordStore`], so any number of threads may `put` and
//! `member` through a shared reference (`Arc`) without locks.
//!
//! # Concurrency Model
//!
//! Each of the k bit updates in a `put` is individually atomic and
//! linearizable, but the k updates are **not atomic as a unit**: a
//! concurrent `member` may observe a partially applied insertion and report
//! `false` while the insertion is in flight. This is the documented
//! trade-off for lock freedom; callers that need atomic-as-a-whole inserts
//! must serialize writers externally. Once a `put` has returned, `member`
//! for that term is `true` forever.
//!
//! # Sizing
//!
//! `new` computes the bit length and hash count from the target
//! false-positive probability (see [`crate::core::params`]). The backing
//! store rounds the length up to a whole number of 64-bit words; the extra
//! bits are padding that marginally lowers the effective false-positive
//! probability.
//!
//! # Examples
//!
//! ```
//! use atomsketch::BloomFilter;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let filter = Arc::new(BloomFilter::new(10_000, 0.01).unwrap());
//!
//! let handles: Vec<_> = (0..4)
//!     .map(|t| {
//!         let filter = Arc::clone(&filter);
//!         thread::spawn(move || {
//!             for i in 0..1000 {
//!                 filter.put(format!("item-{}-{}", t, i).as_bytes());
//!             }
//!         })
//!     })
//!     .collect();
//!
//! for h in handles {
//!     h.join().unwrap();
//! }
//!
//! assert!(filter.member(b"item-0-42"));
//! ```

use crate::core::params::{required_bit_count, required_hash_count, validate_probability};
use crate::core::AtomicWordStore;
use crate::error::{Result, SketchError};
use crate::hash::{default_hash_functions, indices_for, HashFunction};

/// Read-only diagnostic snapshot of a filter's bit usage.
///
/// Produced by [`BloomFilter::bits_info`]. Under concurrent writers the
/// snapshot is best-effort, like every other estimator.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BitsInfo {
    /// Total bits in the filter.
    pub total_bits: usize,
    /// Bits currently set to 1.
    pub set_bits: usize,
    /// `set_bits / total_bits`.
    pub set_ratio: f64,
}

/// Concurrently accessible Bloom filter over byte-slice terms.
///
/// The hash configuration is an ordered list of [`HashFunction`]
/// descriptors; insertion order is significant (descriptor *i* always feeds
/// conceptual hash slot *i*) and two filters are combinable only when their
/// lists are identical.
#[derive(Debug)]
pub struct BloomFilter {
    store: AtomicWordStore,
    hash_functions: Vec<HashFunction>,
}

impl BloomFilter {
    /// Create a filter sized for `capacity` elements at false-positive
    /// probability `fpp`, with automatically selected hash functions.
    ///
    /// # Errors
    ///
    /// - [`SketchError::InvalidCapacity`] if `capacity == 0`
    /// - [`SketchError::FalsePositiveRateOutOfBounds`] unless `fpp ∈ (0, 1)`
    ///
    /// # Examples
    ///
    /// ```
    /// use atomsketch::BloomFilter;
    ///
    /// let filter = BloomFilter::new(1000, 0.01).unwrap();
    /// filter.put(b"hello");
    /// assert!(filter.member(b"hello"));
    /// assert!(!filter.member(b"goodbye"));
    /// ```
    pub fn new(capacity: usize, fpp: f64) -> Result<Self> {
        let bits = required_bit_count(capacity, fpp)?;
        let k = required_hash_count(fpp)?;
        Ok(Self {
            store: AtomicWordStore::new(bits)?,
            hash_functions: default_hash_functions(k),
        })
    }

    /// Create a filter with a caller-supplied hash configuration.
    ///
    /// The caller asserts that every filter later combined with this one via
    /// [`merge`](Self::merge) or [`intersection`](Self::intersection) was
    /// built with this exact list.
    ///
    /// # Errors
    ///
    /// - [`SketchError::InvalidCapacity`] if `capacity == 0`
    /// - [`SketchError::FalsePositiveRateOutOfBounds`] unless `fpp ∈ (0, 1)`
    /// - [`SketchError::InvalidHashCount`] if `hash_functions` is empty
    pub fn with_hash_functions(
        capacity: usize,
        fpp: f64,
        hash_functions: Vec<HashFunction>,
    ) -> Result<Self> {
        validate_probability(fpp)?;
        if hash_functions.is_empty() {
            return Err(SketchError::invalid_hash_count(0));
        }
        let bits = required_bit_count(capacity, fpp)?;
        Ok(Self {
            store: AtomicWordStore::new(bits)?,
            hash_functions,
        })
    }

    /// Create a filter with an explicit bit length and hash configuration.
    ///
    /// The length is rounded up to a whole number of words like every other
    /// constructor. Useful for tests and for shaping filters that must be
    /// combinable by construction.
    ///
    /// # Errors
    ///
    /// - [`SketchError::InvalidCapacity`] if `bit_length == 0`
    /// - [`SketchError::InvalidHashCount`] if `hash_functions` is empty
    pub fn with_bit_length(
        bit_length: usize,
        hash_functions: Vec<HashFunction>,
    ) -> Result<Self> {
        if hash_functions.is_empty() {
            return Err(SketchError::invalid_hash_count(0));
        }
        Ok(Self {
            store: AtomicWordStore::new(bit_length)?,
            hash_functions,
        })
    }

    /// Reassemble a filter from its parts (deserialization path).
    ///
    /// # Errors
    ///
    /// Returns [`SketchError::InvalidHashCount`] if `hash_functions` is
    /// empty.
    pub fn from_parts(
        store: AtomicWordStore,
        hash_functions: Vec<HashFunction>,
    ) -> Result<Self> {
        if hash_functions.is_empty() {
            return Err(SketchError::invalid_hash_count(0));
        }
        Ok(Self {
            store,
            hash_functions,
        })
    }

    /// Filter length in bits (a multiple of 64).
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Whether the filter has zero bits. Always `false` for a constructed
    /// filter.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// The filter's ordered hash configuration.
    #[must_use]
    pub fn hash_functions(&self) -> &[HashFunction] {
        &self.hash_functions
    }

    /// Number of hash functions (k).
    #[must_use]
    #[inline]
    pub fn hash_count(&self) -> usize {
        self.hash_functions.len()
    }

    /// Insert a term. Idempotent; never fails.
    pub fn put(&self, term: &[u8]) {
        for index in self.indices(term) {
            self.store.set(index, true);
        }
    }

    /// Test membership. Short-circuits to `false` on the first unset bit.
    ///
    /// Never reports `false` for a term whose `put` has completed; may
    /// report `true` for terms never inserted (false positive).
    #[must_use]
    pub fn member(&self, term: &[u8]) -> bool {
        self.indices(term).all(|index| self.store.get(index))
    }

    /// Estimate the number of distinct terms inserted, from the fill level.
    ///
    /// With `s` set bits, length `m`, and `k` hash functions:
    ///
    /// - `s == 0` → 0
    /// - `s ≤ k` → 1
    /// - `s == m` → `round(m / k)` — a saturated filter cannot be
    ///   distinguished beyond its theoretical maximum, and this branch keeps
    ///   `ln(0)` out of the formula
    /// - otherwise → `round(-(m/k) · ln((m - s) / m))`
    #[must_use]
    pub fn cardinality(&self) -> u64 {
        let s = self.store.count_ones();
        let m = self.len();
        let k = self.hash_count();

        if s == 0 {
            0
        } else if s <= k {
            1
        } else if s == m {
            (m as f64 / k as f64).round() as u64
        } else {
            let m = m as f64;
            let estimate = -(m / k as f64) * ((m - s as f64) / m).ln();
            estimate.round() as u64
        }
    }

    /// Estimate the current false-positive probability from the fill level:
    /// `(s / m)^k`.
    #[must_use]
    pub fn false_positive_probability(&self) -> f64 {
        let ratio = self.store.count_ones() as f64 / self.len() as f64;
        ratio.powi(self.hash_count() as i32)
    }

    /// Diagnostic snapshot of bit usage.
    #[must_use]
    pub fn bits_info(&self) -> BitsInfo {
        let total_bits = self.len();
        let set_bits = self.store.count_ones();
        BitsInfo {
            total_bits,
            set_bits,
            set_ratio: set_bits as f64 / total_bits as f64,
        }
    }

    /// Union of all `filters` into a freshly allocated filter.
    ///
    /// Inputs are read, never mutated. The result carries the first input's
    /// hash configuration. An empty slice yields `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`SketchError::ShapeMismatch`] if any two inputs differ in
    /// length or hash configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use atomsketch::{hash::default_hash_functions, BloomFilter};
    ///
    /// let functions = default_hash_functions(2);
    /// let a = BloomFilter::with_bit_length(1024, functions.clone()).unwrap();
    /// let b = BloomFilter::with_bit_length(1024, functions).unwrap();
    /// a.put(b"hello");
    /// b.put(b"world");
    ///
    /// let merged = BloomFilter::merge(&[&a, &b]).unwrap().unwrap();
    /// assert!(merged.member(b"hello"));
    /// assert!(merged.member(b"world"));
    /// ```
    pub fn merge(filters: &[&Self]) -> Result<Option<Self>> {
        let Some(first) = filters.first() else {
            return Ok(None);
        };
        Self::check_shapes(filters)?;

        let store = AtomicWordStore::new(first.len())?;
        for filter in filters {
            store.merge_from(&filter.store)?;
        }
        Ok(Some(Self {
            store,
            hash_functions: first.hash_functions.clone(),
        }))
    }

    /// Intersection of all `filters` into a freshly allocated filter.
    ///
    /// The result is conservative: a term reported absent is definitely not
    /// in every input, while a term reported present may still be a false
    /// positive of the intersection. An empty slice yields `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`SketchError::ShapeMismatch`] if any two inputs differ in
    /// length or hash configuration.
    pub fn intersection(filters: &[&Self]) -> Result<Option<Self>> {
        let Some(first) = filters.first() else {
            return Ok(None);
        };
        Self::check_shapes(filters)?;

        // Seed from the first input; ANDing into a zeroed store would always
        // produce the empty filter.
        let store = first.store.clone();
        for filter in &filters[1..] {
            store.intersect_from(&filter.store)?;
        }
        Ok(Some(Self {
            store,
            hash_functions: first.hash_functions.clone(),
        }))
    }

    /// Heap memory used by the bit store, in bytes.
    #[must_use]
    pub fn memory_usage(&self) -> usize {
        self.store.memory_usage()
    }

    pub(crate) fn indices<'a>(&'a self, term: &'a [u8]) -> impl Iterator<Item = usize> + 'a {
        indices_for(term, self.len(), &self.hash_functions)
    }

    pub(crate) fn store(&self) -> &AtomicWordStore {
        &self.store
    }

    fn check_shapes(filters: &[&Self]) -> Result<()> {
        let first = filters[0];
        for (i, filter) in filters.iter().enumerate().skip(1) {
            if filter.len() != first.len() {
                return Err(SketchError::shape_mismatch(format!(
                    "filter 0 has length {}, filter {} has length {}",
                    first.len(),
                    i,
                    filter.len()
                )));
            }
            if filter.hash_functions != first.hash_functions {
                return Err(SketchError::shape_mismatch(format!(
                    "filter {} uses a different hash configuration",
                    i
                )));
            }
        }
        Ok(())
    }
}

impl Clone for BloomFilter {
    /// Snapshot copy; the clone is fully independent.
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            hash_functions: self.hash_functions.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::{HashFamily, HashFunction};
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_new_sizes_from_formulas() {
        let filter = BloomFilter::new(10_000, 0.01).unwrap();
        // 95_851 required bits, rounded up to the next word multiple.
        assert_eq!(filter.len(), 95_872);
        assert_eq!(filter.hash_count(), 7);
    }

    #[test]
    fn test_new_rejects_bad_arguments() {
        assert!(BloomFilter::new(0, 0.01).is_err());
        assert!(BloomFilter::new(100, 0.0).is_err());
        assert!(BloomFilter::new(100, 1.0).is_err());
        assert!(BloomFilter::new(100, -0.3).is_err());
    }

    #[test]
    fn test_with_hash_functions_rejects_empty_list() {
        assert!(matches!(
            BloomFilter::with_hash_functions(100, 0.01, Vec::new()),
            Err(SketchError::InvalidHashCount { count: 0 })
        ));
    }

    #[test]
    fn test_empty_filter() {
        let filter = BloomFilter::new(1000, 0.01).unwrap();
        assert!(!filter.member(b"anything"));
        assert_eq!(filter.cardinality(), 0);
        assert_eq!(filter.false_positive_probability(), 0.0);
        assert_eq!(filter.bits_info().set_bits, 0);
    }

    #[test]
    fn test_put_member() {
        let filter = BloomFilter::new(1000, 0.01).unwrap();
        filter.put(b"hello");
        filter.put(b"world");

        assert!(filter.member(b"hello"));
        assert!(filter.member(b"world"));
        assert!(!filter.member(b"missing"));
    }

    #[test]
    fn test_put_idempotent() {
        let filter = BloomFilter::new(1000, 0.01).unwrap();
        filter.put(b"hello");
        let set_after_first = filter.bits_info().set_bits;
        filter.put(b"hello");
        assert_eq!(filter.bits_info().set_bits, set_after_first);
    }

    #[test]
    fn test_no_false_negatives() {
        let filter = BloomFilter::new(1000, 0.01).unwrap();
        for i in 0..1000u32 {
            filter.put(&i.to_le_bytes());
        }
        for i in 0..1000u32 {
            assert!(filter.member(&i.to_le_bytes()), "false negative for {}", i);
        }
    }

    #[test]
    fn test_cardinality_branches() {
        let functions = vec![
            HashFunction::new(HashFamily::Xxh3, 1),
            HashFunction::new(HashFamily::Xxh3, 2),
        ];
        let filter = BloomFilter::with_bit_length(64, functions).unwrap();
        assert_eq!(filter.cardinality(), 0);

        // One insertion sets at most k bits; the s <= k branch reports 1.
        filter.put(b"x");
        assert_eq!(filter.cardinality(), 1);

        // Saturate every bit; the s == m branch reports round(m / k).
        for i in 0..64 {
            filter.store().set(i, true);
        }
        assert_eq!(filter.cardinality(), 32);
    }

    #[test]
    fn test_cardinality_tracks_inserts() {
        let filter = BloomFilter::new(10_000, 0.01).unwrap();
        for i in 0..1000u32 {
            filter.put(&i.to_le_bytes());
        }
        let estimate = filter.cardinality();
        assert!(
            (900..=1100).contains(&estimate),
            "estimate was {}",
            estimate
        );
    }

    #[test]
    fn test_false_positive_probability_rises() {
        let filter = BloomFilter::new(1000, 0.01).unwrap();
        let empty = filter.false_positive_probability();
        for i in 0..1000u32 {
            filter.put(&i.to_le_bytes());
        }
        let loaded = filter.false_positive_probability();
        assert_eq!(empty, 0.0);
        assert!(loaded > 0.0 && loaded < 0.05, "fpp was {}", loaded);
    }

    #[test]
    fn test_bits_info_consistent() {
        let filter = BloomFilter::new(1000, 0.01).unwrap();
        filter.put(b"hello");

        let info = filter.bits_info();
        assert_eq!(info.total_bits, filter.len());
        assert!(info.set_bits >= 1 && info.set_bits <= filter.hash_count());
        assert!(
            (info.set_ratio - info.set_bits as f64 / info.total_bits as f64).abs()
                < f64::EPSILON
        );
    }

    #[test]
    fn test_merge_superset() {
        let functions = default_hash_functions(2);
        let a = BloomFilter::with_bit_length(1024, functions.clone()).unwrap();
        let b = BloomFilter::with_bit_length(1024, functions).unwrap();
        a.put(b"hello");
        b.put(b"world");

        let merged = BloomFilter::merge(&[&a, &b]).unwrap().unwrap();
        assert!(merged.member(b"hello"));
        assert!(merged.member(b"world"));

        // Inputs are untouched.
        assert!(!a.member(b"world"));
        assert!(!b.member(b"hello"));
    }

    #[test]
    fn test_intersection_conservative() {
        let functions = default_hash_functions(2);
        let a = BloomFilter::with_bit_length(1024, functions.clone()).unwrap();
        let b = BloomFilter::with_bit_length(1024, functions).unwrap();
        a.put(b"hello");
        b.put(b"hello");
        b.put(b"world");

        let common = BloomFilter::intersection(&[&a, &b]).unwrap().unwrap();
        assert!(common.member(b"hello"));
        assert!(!common.member(b"world"));
    }

    #[test]
    fn test_merge_empty_list() {
        assert!(BloomFilter::merge(&[]).unwrap().is_none());
        assert!(BloomFilter::intersection(&[]).unwrap().is_none());
    }

    #[test]
    fn test_merge_single_filter_copies() {
        let filter = BloomFilter::new(100, 0.01).unwrap();
        filter.put(b"solo");

        let merged = BloomFilter::merge(&[&filter]).unwrap().unwrap();
        assert!(merged.member(b"solo"));

        filter.put(b"later");
        assert!(!merged.member(b"later"), "result must be a fresh store");
    }

    #[test]
    fn test_merge_shape_mismatch() {
        let functions = default_hash_functions(2);
        let a = BloomFilter::with_bit_length(1024, functions.clone()).unwrap();
        let b = BloomFilter::with_bit_length(2048, functions.clone()).unwrap();
        assert!(matches!(
            BloomFilter::merge(&[&a, &b]),
            Err(SketchError::ShapeMismatch { .. })
        ));

        let c = BloomFilter::with_bit_length(1024, default_hash_functions(3)).unwrap();
        assert!(matches!(
            BloomFilter::intersection(&[&a, &c]),
            Err(SketchError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_concurrent_put_member() {
        let filter = Arc::new(BloomFilter::new(10_000, 0.01).unwrap());

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let filter = Arc::clone(&filter);
                thread::spawn(move || {
                    for i in 0..1000u32 {
                        filter.put(format!("item-{}-{}", t, i).as_bytes());
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }

        for t in 0..4 {
            for i in 0..1000u32 {
                assert!(filter.member(format!("item-{}-{}", t, i).as_bytes()));
            }
        }
    }

    #[test]
    fn test_clone_independent() {
        let filter = BloomFilter::new(100, 0.01).unwrap();
        filter.put(b"original");

        let copy = filter.clone();
        filter.put(b"after");

        assert!(copy.member(b"original"));
        assert!(!copy.member(b"after"));
    }
}
