//! Serde support for filters (requires the `serde` feature).
//!
//! [`HashFamily`](crate::hash::HashFamily) and
//! [`HashFunction`](crate::hash::HashFunction) derive `Serialize` /
//! `Deserialize` directly. [`BloomFilter`] serializes through an
//! intermediate representation holding its parameters and raw words, and
//! deserialization re-validates the shape the same way
//! [`BloomFilter::from_bytes`] does — a corrupted document fails cleanly
//! instead of producing a filter that answers nonsense.
//!
//! The crate's own binary wire format (see [`crate::codec`]) does not
//! depend on serde and is always available; this module exists for
//! embedding filters in larger serde documents.
//!
//! # Examples
//!
//! ```
//! use atomsketch::BloomFilter;
//!
//! let filter = BloomFilter::new(1000, 0.01).unwrap();
//! filter.put(b"hello");
//!
//! let json = serde_json::to_string(&filter).unwrap();
//! let restored: BloomFilter = serde_json::from_str(&json).unwrap();
//! assert!(restored.member(b"hello"));
//! ```

use crate::core::wordstore::WORD_BITS;
use crate::core::AtomicWordStore;
use crate::filters::bloom::BloomFilter;
use crate::hash::HashFunction;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Intermediate serde representation of a [`BloomFilter`].
#[derive(Serialize, Deserialize)]
struct BloomFilterRepr {
    filter_length: usize,
    hash_functions: Vec<HashFunction>,
    words: Vec<u64>,
}

impl Serialize for BloomFilter {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        BloomFilterRepr {
            filter_length: self.len(),
            hash_functions: self.hash_functions().to_vec(),
            words: self.store().to_raw(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for BloomFilter {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let repr = BloomFilterRepr::deserialize(deserializer)?;

        if repr.hash_functions.is_empty() {
            return Err(de::Error::custom("hash function list cannot be empty"));
        }
        if repr.filter_length != repr.words.len() * WORD_BITS {
            return Err(de::Error::custom(format!(
                "filter length {} inconsistent with {} words",
                repr.filter_length,
                repr.words.len()
            )));
        }

        let store = AtomicWordStore::from_raw(repr.words, repr.filter_length)
            .map_err(de::Error::custom)?;
        BloomFilter::from_parts(store, repr.hash_functions).map_err(de::Error::custom)
    }
}
