//! Reproducible hash-function descriptors and index derivation.
//!
//! Filters in this crate never hold hash functions as opaque callables.
//! Each hash function is a [`HashFunction`] descriptor — a family identifier
//! plus an integer seed — resolved to a pure function at call time. This
//! keeps hash configuration serializable, comparable across filter
//! instances (merge and intersection require identical configurations), and
//! portable across processes.
//!
//! # Families
//!
//! | Family | Backing | Use |
//! |--------|---------|-----|
//! | [`HashFamily::Xxh3`] | `xxh3_64_with_seed` | default k-way indexing |
//! | [`HashFamily::Xxh3_128`] | `xxh3_128_with_seed`, folded to 64 bits | linear counter default |
//!
//! # Index Derivation
//!
//! Each descriptor maps a term to `hash(term, seed) mod filter_length`.
//! A filter with k descriptors derives k indices in order; duplicate
//! indices across different descriptors are possible and deliberately not
//! deduplicated — precision degrades marginally but put/member stay O(k)
//! with no allocation beyond the output.
//!
//! # Examples
//!
//! ```
//! use atomsketch::hash::{default_hash_functions, HashFunction};
//!
//! let functions = default_hash_functions(7);
//! assert_eq!(functions.len(), 7);
//!
//! // Same parameters produce the same descriptors, so independently
//! // constructed filters are merge-compatible.
//! assert_eq!(functions, default_hash_functions(7));
//!
//! let idx = functions[0].index(b"hello", 1024);
//! assert!(idx < 1024);
//! ```

use xxhash_rust::xxh3::{xxh3_128_with_seed, xxh3_64_with_seed};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Hash algorithm family a descriptor resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum HashFamily {
    /// 64-bit XXH3 with native seeding.
    Xxh3,
    /// 128-bit XXH3 with native seeding, XOR-folded down to 64 bits.
    Xxh3_128,
}

impl HashFamily {
    /// Stable single-byte identifier used by the wire format.
    #[must_use]
    pub const fn id(self) -> u8 {
        match self {
            Self::Xxh3 => 0,
            Self::Xxh3_128 => 1,
        }
    }

    /// Inverse of [`HashFamily::id`]. Returns `None` for unknown bytes.
    #[must_use]
    pub const fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(Self::Xxh3),
            1 => Some(Self::Xxh3_128),
            _ => None,
        }
    }
}

/// Reconstructible descriptor of one seeded hash function.
///
/// Two descriptors compare equal exactly when they resolve to the same pure
/// function, which is what merge/intersection compatibility checks rely on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HashFunction {
    /// Algorithm family.
    pub family: HashFamily,
    /// Seed mixed into the hash.
    pub seed: u64,
}

impl HashFunction {
    /// Create a descriptor for `family` with `seed`.
    #[must_use]
    pub const fn new(family: HashFamily, seed: u64) -> Self {
        Self { family, seed }
    }

    /// Hash `term` to a 64-bit value.
    #[must_use]
    pub fn hash(&self, term: &[u8]) -> u64 {
        match self.family {
            HashFamily::Xxh3 => xxh3_64_with_seed(term, self.seed),
            HashFamily::Xxh3_128 => {
                let wide = xxh3_128_with_seed(term, self.seed);
                (wide as u64) ^ ((wide >> 64) as u64)
            }
        }
    }

    /// Hash `term` to an index in `[0, filter_length)`.
    ///
    /// # Panics
    ///
    /// Panics if `filter_length` is 0 (a filter is never constructed with a
    /// zero length).
    #[must_use]
    #[inline]
    pub fn index(&self, term: &[u8], filter_length: usize) -> usize {
        (self.hash(term) % filter_length as u64) as usize
    }
}

/// SplitMix64 step, used to draw pseudorandom seed candidates.
fn splitmix64(x: u64) -> u64 {
    let mut z = x.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Produce `k` descriptors of family [`HashFamily::Xxh3`] with distinct
/// pseudorandom seeds.
///
/// Seeds are drawn without replacement from `1..=50·k` — a range small
/// enough to enumerate but large enough that independent draws rarely
/// collide before the skip-duplicates pass resolves them. The draw is
/// deterministic in `k`, so two filters built with the same parameters get
/// identical descriptor lists and can be merged or intersected.
///
/// # Examples
///
/// ```
/// use atomsketch::hash::default_hash_functions;
///
/// let functions = default_hash_functions(4);
/// let mut seeds: Vec<u64> = functions.iter().map(|f| f.seed).collect();
/// seeds.sort_unstable();
/// seeds.dedup();
/// assert_eq!(seeds.len(), 4);
/// ```
#[must_use]
pub fn default_hash_functions(k: usize) -> Vec<HashFunction> {
    let range = 50 * k.max(1) as u64;
    let mut functions = Vec::with_capacity(k);
    let mut attempt = 0u64;

    while functions.len() < k {
        let seed = splitmix64(attempt) % range + 1;
        attempt += 1;
        if functions.iter().any(|f: &HashFunction| f.seed == seed) {
            continue;
        }
        functions.push(HashFunction::new(HashFamily::Xxh3, seed));
    }
    functions
}

/// Derive the ordered sequence of indices for `term` under each descriptor.
///
/// Duplicates across descriptors are preserved (see module docs).
pub fn indices_for<'a>(
    term: &'a [u8],
    filter_length: usize,
    functions: &'a [HashFunction],
) -> impl Iterator<Item = usize> + 'a {
    functions.iter().map(move |f| f.index(term, filter_length))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_deterministic() {
        let f = HashFunction::new(HashFamily::Xxh3, 42);
        assert_eq!(f.hash(b"hello"), f.hash(b"hello"));
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = HashFunction::new(HashFamily::Xxh3, 1);
        let b = HashFunction::new(HashFamily::Xxh3, 2);
        assert_ne!(a.hash(b"hello"), b.hash(b"hello"));
    }

    #[test]
    fn test_families_differ() {
        let a = HashFunction::new(HashFamily::Xxh3, 7);
        let b = HashFunction::new(HashFamily::Xxh3_128, 7);
        assert_ne!(a.hash(b"hello"), b.hash(b"hello"));
    }

    #[test]
    fn test_index_in_range() {
        let f = HashFunction::new(HashFamily::Xxh3, 9);
        for term in [&b"a"[..], b"longer term", b""] {
            assert!(f.index(term, 1000) < 1000);
        }
    }

    #[test]
    fn test_family_id_round_trip() {
        for family in [HashFamily::Xxh3, HashFamily::Xxh3_128] {
            assert_eq!(HashFamily::from_id(family.id()), Some(family));
        }
        assert_eq!(HashFamily::from_id(200), None);
    }

    #[test]
    fn test_default_hash_functions_distinct_seeds() {
        for k in [1, 2, 7, 32] {
            let functions = default_hash_functions(k);
            assert_eq!(functions.len(), k);

            let mut seeds: Vec<u64> = functions.iter().map(|f| f.seed).collect();
            seeds.sort_unstable();
            seeds.dedup();
            assert_eq!(seeds.len(), k, "duplicate seeds for k={}", k);

            for f in &functions {
                assert!(f.seed >= 1 && f.seed <= 50 * k as u64);
                assert_eq!(f.family, HashFamily::Xxh3);
            }
        }
    }

    #[test]
    fn test_default_hash_functions_reproducible() {
        assert_eq!(default_hash_functions(7), default_hash_functions(7));
    }

    #[test]
    fn test_indices_for_order_and_count() {
        let functions = default_hash_functions(5);
        let indices: Vec<usize> = indices_for(b"term", 512, &functions).collect();
        assert_eq!(indices.len(), 5);

        let again: Vec<usize> = indices_for(b"term", 512, &functions).collect();
        assert_eq!(indices, again);
    }
}
