//! Length-prefixed binary encoding of Bloom filters.
//!
//! The wire format is little-endian and self-describing:
//!
//! ```text
//! [filter_length: u64]
//! [descriptor_count: u64]
//! descriptor_count × { family: u8, seed: u64 }
//! [word_count: u64]
//! word_count × [word: u64]
//! ```
//!
//! Hash functions travel as descriptors (family id + seed), never as
//! executable code, so a buffer produced by one process decodes to an
//! identically behaving filter in another. Decoding validates every length
//! prefix against the remaining buffer and the internal consistency of the
//! header (`filter_length == word_count × 64`); any violation yields a
//! [`SketchError::Decode`] and no partial filter.
//!
//! # Examples
//!
//! ```
//! use atomsketch::BloomFilter;
//!
//! let filter = BloomFilter::new(1000, 0.01).unwrap();
//! filter.put(b"hello");
//!
//! let bytes = filter.to_bytes();
//! let restored = BloomFilter::from_bytes(&bytes).unwrap();
//!
//! assert!(restored.member(b"hello"));
//! assert_eq!(restored.bits_info(), filter.bits_info());
//! ```

use crate::core::wordstore::WORD_BITS;
use crate::core::AtomicWordStore;
use crate::error::{Result, SketchError};
use crate::filters::bloom::BloomFilter;
use crate::hash::{HashFamily, HashFunction};

impl BloomFilter {
    /// Encode the filter into the binary wire format.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let words = self.store().to_raw();
        let functions = self.hash_functions();

        let mut buf =
            Vec::with_capacity(24 + functions.len() * 9 + words.len() * 8);
        buf.extend_from_slice(&(self.len() as u64).to_le_bytes());
        buf.extend_from_slice(&(functions.len() as u64).to_le_bytes());
        for f in functions {
            buf.push(f.family.id());
            buf.extend_from_slice(&f.seed.to_le_bytes());
        }
        buf.extend_from_slice(&(words.len() as u64).to_le_bytes());
        for word in words {
            buf.extend_from_slice(&word.to_le_bytes());
        }
        buf
    }

    /// Decode a filter from the binary wire format.
    ///
    /// # Errors
    ///
    /// Returns [`SketchError::Decode`] if the buffer is truncated, carries
    /// an unknown hash family, declares inconsistent lengths, or has
    /// trailing bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(bytes);

        let filter_length = reader.read_u64()? as usize;
        let descriptor_count = reader.read_u64()? as usize;
        if descriptor_count == 0 {
            return Err(SketchError::decode("descriptor count must be at least 1"));
        }
        // An impossible count is caught here rather than by a failed
        // multi-gigabyte allocation below.
        if descriptor_count > reader.remaining() {
            return Err(SketchError::decode(format!(
                "descriptor count {} exceeds remaining buffer",
                descriptor_count
            )));
        }

        let mut hash_functions = Vec::with_capacity(descriptor_count);
        for _ in 0..descriptor_count {
            let family_id = reader.read_u8()?;
            let family = HashFamily::from_id(family_id).ok_or_else(|| {
                SketchError::decode(format!("unknown hash family id {}", family_id))
            })?;
            let seed = reader.read_u64()?;
            hash_functions.push(HashFunction::new(family, seed));
        }

        let word_count = reader.read_u64()? as usize;
        if filter_length != word_count * WORD_BITS {
            return Err(SketchError::decode(format!(
                "filter length {} inconsistent with {} words",
                filter_length, word_count
            )));
        }

        let mut words = Vec::with_capacity(word_count);
        for _ in 0..word_count {
            words.push(reader.read_u64()?);
        }

        if reader.remaining() != 0 {
            return Err(SketchError::decode(format!(
                "{} trailing bytes after filter data",
                reader.remaining()
            )));
        }

        let store = AtomicWordStore::from_raw(words, filter_length)?;
        Self::from_parts(store, hash_functions)
    }
}

/// Cursor over the input buffer; every read checks the remaining length.
struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn read_u8(&mut self) -> Result<u8> {
        if self.remaining() < 1 {
            return Err(SketchError::decode("unexpected end of input"));
        }
        let value = self.bytes[self.pos];
        self.pos += 1;
        Ok(value)
    }

    fn read_u64(&mut self) -> Result<u64> {
        if self.remaining() < 8 {
            return Err(SketchError::decode("unexpected end of input"));
        }
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&self.bytes[self.pos..self.pos + 8]);
        self.pos += 8;
        Ok(u64::from_le_bytes(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_filter() -> BloomFilter {
        let filter = BloomFilter::new(1000, 0.01).unwrap();
        filter.put(b"hello");
        filter.put(b"world");
        filter.put(b"hat");
        filter
    }

    #[test]
    fn test_round_trip_membership_and_info() {
        let filter = sample_filter();
        let restored = BloomFilter::from_bytes(&filter.to_bytes()).unwrap();

        for term in [&b"hello"[..], b"world", b"hat"] {
            assert_eq!(filter.member(term), restored.member(term));
            assert!(restored.member(term));
        }
        for term in [&b"absent"[..], b"probe", b"xyzzy"] {
            assert_eq!(filter.member(term), restored.member(term));
        }
        assert_eq!(filter.bits_info(), restored.bits_info());
        assert_eq!(filter.hash_functions(), restored.hash_functions());
    }

    #[test]
    fn test_round_trip_empty_filter() {
        let filter = BloomFilter::new(100, 0.01).unwrap();
        let restored = BloomFilter::from_bytes(&filter.to_bytes()).unwrap();
        assert_eq!(restored.bits_info().set_bits, 0);
        assert_eq!(restored.len(), filter.len());
    }

    #[test]
    fn test_decode_rejects_truncation_at_every_length() {
        let bytes = sample_filter().to_bytes();
        for cut in [0, 1, 7, 8, 16, 17, bytes.len() / 2, bytes.len() - 1] {
            let result = BloomFilter::from_bytes(&bytes[..cut]);
            assert!(
                matches!(result, Err(SketchError::Decode { .. })),
                "accepted a buffer truncated to {} bytes",
                cut
            );
        }
    }

    #[test]
    fn test_decode_rejects_trailing_bytes() {
        let mut bytes = sample_filter().to_bytes();
        bytes.push(0);
        assert!(matches!(
            BloomFilter::from_bytes(&bytes),
            Err(SketchError::Decode { .. })
        ));
    }

    #[test]
    fn test_decode_rejects_unknown_family() {
        let mut bytes = sample_filter().to_bytes();
        // First descriptor's family byte sits right after the two u64
        // prefixes.
        bytes[16] = 0xff;
        let result = BloomFilter::from_bytes(&bytes);
        match result {
            Err(SketchError::Decode { message }) => {
                assert!(message.contains("unknown hash family"));
            }
            other => panic!("expected decode error, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_rejects_zero_descriptors() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&64u64.to_le_bytes());
        bytes.extend_from_slice(&0u64.to_le_bytes());
        bytes.extend_from_slice(&1u64.to_le_bytes());
        bytes.extend_from_slice(&0u64.to_le_bytes());
        assert!(matches!(
            BloomFilter::from_bytes(&bytes),
            Err(SketchError::Decode { .. })
        ));
    }

    #[test]
    fn test_decode_rejects_inconsistent_lengths() {
        let filter = BloomFilter::new(100, 0.01).unwrap();
        let mut bytes = filter.to_bytes();
        // Corrupt the filter length so it no longer matches the word count.
        bytes[..8].copy_from_slice(&1u64.to_le_bytes());
        let result = BloomFilter::from_bytes(&bytes);
        match result {
            Err(SketchError::Decode { message }) => {
                assert!(message.contains("inconsistent"));
            }
            other => panic!("expected decode error, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_rejects_empty_input() {
        assert!(matches!(
            BloomFilter::from_bytes(&[]),
            Err(SketchError::Decode { .. })
        ));
    }
}
