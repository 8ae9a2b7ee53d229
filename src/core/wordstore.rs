//! Lock-free word array with atomic bit operations.
//!
//! [`AtomicWordStore`] is the single mutable shared resource in this crate:
//! a fixed-length array of 64-bit words, each read and modified atomically.
//! Every higher-level structure (Bloom filter, counting filter, linear
//! counter) stores its state in one of these.
//!
//! # Thread Safety
//!
//! - `set` / `get`: lock-free, thread-safe with `&self`
//! - `merge_from` / `intersect_from`: lock-free, element-wise atomic
//! - `count_ones`: best-effort snapshot (words are loaded independently, so
//!   the sum is not a synchronized point-in-time view under concurrent
//!   writers — acceptable for probabilistic estimators)
//!
//! # Why a CAS loop instead of `fetch_or`
//!
//! Setting a bit could be a single `fetch_or`, but the counting filter's
//! delete path must also *clear* bits, and two writers targeting different
//! bits of the same word must not lose each other's update. `set` therefore
//! uses a compare-and-swap retry loop that forces the target bit to the
//! requested value and retries on conflict. Each individual bit update is
//! linearizable at word granularity.
//!
//! # Memory Ordering
//!
//! `set` publishes through `compare_exchange_weak` with `AcqRel` success
//! ordering and `Acquire` on the initial load and on every failed attempt:
//! the release half makes the updated word visible to `Acquire` loads, and
//! the acquire half keeps each retry working from the freshest word rather
//! than a stale snapshot. `get` reads with `Acquire`. A reader that
//! observes a bit set by another thread therefore also observes every
//! write that happened before the publishing CAS, which is what prevents
//! false negatives in concurrent put/member scenarios.
//!
//! # Examples
//!
//! ```
//! use atomsketch::core::AtomicWordStore;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let store = Arc::new(AtomicWordStore::new(1024).unwrap());
//!
//! let handles: Vec<_> = (0..4)
//!     .map(|t| {
//!         let store = Arc::clone(&store);
//!         thread::spawn(move || {
//!             for i in 0..256 {
//!                 store.set(t * 256 + i, true);
//!             }
//!         })
//!     })
//!     .collect();
//!
//! for h in handles {
//!     h.join().unwrap();
//! }
//! assert_eq!(store.count_ones(), 1024);
//! ```

use crate::error::{Result, SketchError};
use std::sync::atomic::{AtomicU64, Ordering};

/// Number of bits per backing word.
pub const WORD_BITS: usize = 64;

/// Fixed-length array of atomically accessed 64-bit words.
///
/// The bit length is fixed at construction and always a whole multiple of
/// [`WORD_BITS`]; requests are rounded up, so `len()` may exceed the
/// requested bit count. The excess bits are ordinary padding: they are
/// addressable and participate in merges, and since no hash index ever maps
/// outside the reported length they simply stay zero.
#[derive(Debug)]
pub struct AtomicWordStore {
    words: Box<[AtomicU64]>,
    len: usize,
}

impl AtomicWordStore {
    /// Allocate a zeroed store with at least `num_bits` bits.
    ///
    /// The allocation is `⌈num_bits / 64⌉` words and `len()` reports the
    /// rounded-up bit count.
    ///
    /// # Errors
    ///
    /// Returns [`SketchError::InvalidCapacity`] if `num_bits` is 0.
    pub fn new(num_bits: usize) -> Result<Self> {
        if num_bits == 0 {
            return Err(SketchError::invalid_capacity(num_bits));
        }

        let num_words = (num_bits + WORD_BITS - 1) / WORD_BITS;
        let words = (0..num_words)
            .map(|_| AtomicU64::new(0))
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Ok(Self {
            words,
            len: num_words * WORD_BITS,
        })
    }

    /// Number of bits in the store (always a multiple of 64).
    #[must_use]
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether the store holds zero bits. Always `false` for a successfully
    /// constructed store; provided for API completeness.
    #[must_use]
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of backing words.
    #[must_use]
    #[inline]
    pub fn num_words(&self) -> usize {
        self.words.len()
    }

    /// Read a single bit.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`, matching slice indexing behavior.
    #[must_use]
    #[inline]
    pub fn get(&self, index: usize) -> bool {
        assert!(
            index < self.len,
            "bit index out of bounds: index={} len={}",
            index,
            self.len
        );

        let mask = 1u64 << (index % WORD_BITS);
        (self.words[index / WORD_BITS].load(Ordering::Acquire) & mask) != 0
    }

    /// Force a single bit to `value` (set or clear) atomically.
    ///
    /// Implemented as a compare-and-swap retry loop: read the word, compute
    /// the word with the bit forced to `value`, attempt the swap, retry on
    /// conflict. Returns early when the bit already holds the desired value,
    /// which makes repeated sets of the same bit no-ops.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    #[inline]
    pub fn set(&self, index: usize, value: bool) {
        assert!(
            index < self.len,
            "bit index out of bounds: index={} len={}",
            index,
            self.len
        );

        let word = &self.words[index / WORD_BITS];
        let mask = 1u64 << (index % WORD_BITS);

        let mut current = word.load(Ordering::Acquire);
        loop {
            let updated = if value { current | mask } else { current & !mask };
            if updated == current {
                return;
            }
            match word.compare_exchange_weak(
                current,
                updated,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return,
                Err(observed) => current = observed,
            }
        }
    }

    /// Bitwise-OR every word of `other` into `self`, element-wise and
    /// atomically.
    ///
    /// `other` is only read; concurrent writers to either store remain safe.
    ///
    /// # Errors
    ///
    /// Returns [`SketchError::ShapeMismatch`] if the word counts differ.
    pub fn merge_from(&self, other: &Self) -> Result<()> {
        self.check_shape(other)?;
        for (dst, src) in self.words.iter().zip(other.words.iter()) {
            dst.fetch_or(src.load(Ordering::Acquire), Ordering::AcqRel);
        }
        Ok(())
    }

    /// Bitwise-AND every word of `other` into `self`, element-wise and
    /// atomically.
    ///
    /// # Errors
    ///
    /// Returns [`SketchError::ShapeMismatch`] if the word counts differ.
    pub fn intersect_from(&self, other: &Self) -> Result<()> {
        self.check_shape(other)?;
        for (dst, src) in self.words.iter().zip(other.words.iter()) {
            dst.fetch_and(src.load(Ordering::Acquire), Ordering::AcqRel);
        }
        Ok(())
    }

    /// Count the bits currently set to 1.
    ///
    /// Words are loaded independently, so under concurrent writers the
    /// result is a best-effort snapshot rather than a synchronized view.
    #[must_use]
    pub fn count_ones(&self) -> usize {
        self.words
            .iter()
            .map(|w| w.load(Ordering::Acquire).count_ones() as usize)
            .sum()
    }

    /// Copy the word contents out as plain `u64`s, for serialization.
    #[must_use]
    pub fn to_raw(&self) -> Vec<u64> {
        self.words
            .iter()
            .map(|w| w.load(Ordering::Acquire))
            .collect()
    }

    /// Rebuild a store from raw words, for deserialization.
    ///
    /// # Errors
    ///
    /// Returns [`SketchError::Decode`] if `words` is empty or `bit_len` does
    /// not equal `words.len() * 64`.
    pub fn from_raw(words: Vec<u64>, bit_len: usize) -> Result<Self> {
        if words.is_empty() {
            return Err(SketchError::decode("word array cannot be empty"));
        }
        if bit_len != words.len() * WORD_BITS {
            return Err(SketchError::decode(format!(
                "bit length {} does not match {} words",
                bit_len,
                words.len()
            )));
        }

        let words: Box<[AtomicU64]> = words
            .into_iter()
            .map(AtomicU64::new)
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Ok(Self {
            words,
            len: bit_len,
        })
    }

    /// Total heap memory used by the backing words, in bytes.
    #[must_use]
    pub fn memory_usage(&self) -> usize {
        self.words.len() * std::mem::size_of::<AtomicU64>()
    }

    fn check_shape(&self, other: &Self) -> Result<()> {
        if self.words.len() != other.words.len() {
            return Err(SketchError::shape_mismatch(format!(
                "word store length {} vs {}",
                self.len, other.len
            )));
        }
        Ok(())
    }
}

impl Clone for AtomicWordStore {
    /// Snapshot copy. The clone is fully independent; under concurrent
    /// writers the snapshot is best-effort, word by word.
    fn clone(&self) -> Self {
        let words = self
            .words
            .iter()
            .map(|w| AtomicU64::new(w.load(Ordering::Acquire)))
            .collect();
        Self {
            words,
            len: self.len,
        }
    }
}
