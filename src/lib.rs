//! atomsketch: lock-free probabilistic set membership and cardinality
//! sketches backed by atomic word arrays.
//!
//! The crate provides three structures sharing one storage engine:
//!
//! - [`BloomFilter`] — set membership with tunable false positives and
//!   zero false negatives, plus cardinality and false-positive-rate
//!   estimation and a merge/intersection algebra
//! - [`CountingBloomFilter`] — adds probabilistic deletion and per-term
//!   counting on top of the Bloom filter via packed atomic counters
//! - [`LinearCounter`] — a single-hash bit array that only estimates the
//!   number of distinct elements inserted
//!
//! # Concurrency Without Locks
//!
//! Every operation is a bounded sequence of atomic word operations — no
//! locks, no blocking, no cooperative scheduling. All mutating operations
//! take `&self`, so sharing a structure across threads is just an `Arc`:
//!
//! ```
//! use atomsketch::BloomFilter;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let filter = Arc::new(BloomFilter::new(10_000, 0.01).unwrap());
//!
//! let writer = {
//!     let filter = Arc::clone(&filter);
//!     thread::spawn(move || filter.put(b"concurrent item"))
//! };
//! writer.join().unwrap();
//!
//! assert!(filter.member(b"concurrent item"));
//! ```
//!
//! Single bit and counter updates are linearizable (word-level
//! compare-and-swap with retry), but an insertion touching k positions is
//! not atomic as a unit: a concurrent `member` may observe a
//! partially-applied `put` and answer `false` while the insertion is in
//! flight. Estimators read words independently and return best-effort
//! snapshots. These are deliberate trade-offs in favor of lock freedom;
//! see the module docs on [`filters::bloom`] for details.
//!
//! # Reproducible Hashing
//!
//! Hash functions are [`hash::HashFunction`] descriptors (family + seed),
//! never opaque callables. Descriptors serialize with the filter, compare
//! across instances, and resolve to the same pure function in any process —
//! which is what makes the binary wire format portable and merge
//! compatibility checkable.
//!
//! # Quick Start
//!
//! ```
//! use atomsketch::{BloomFilter, CountingBloomFilter, LinearCounter};
//!
//! // Membership
//! let filter = BloomFilter::new(10_000, 0.01).unwrap();
//! filter.put(b"hello");
//! assert!(filter.member(b"hello"));
//! assert!(!filter.member(b"goodbye"));
//!
//! // Membership with deletion
//! let counting = CountingBloomFilter::new(10_000, 0.01).unwrap();
//! counting.put(b"hat");
//! counting.delete(b"hat");
//! assert!(!counting.member(b"hat"));
//!
//! // Distinct-count estimation
//! let counter = LinearCounter::new(10_000).unwrap();
//! counter.put(b"a");
//! counter.put(b"b");
//! counter.put(b"a");
//! assert_eq!(counter.cardinality(), 2);
//! ```
//!
//! # Serialization
//!
//! [`BloomFilter::to_bytes`] / [`BloomFilter::from_bytes`] implement a
//! length-prefixed binary format (see [`codec`]). With the `serde` feature,
//! filters and descriptors also work with any serde format.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::manual_div_ceil)]

pub mod codec;
pub mod core;
pub mod error;
pub mod filters;
pub mod hash;

#[cfg(feature = "serde")]
mod serde_support;

pub use error::{Result, SketchError};
pub use filters::{BitsInfo, BloomFilter, CountingBloomFilter, LinearCounter};

/// Convenient glob import for the common types.
///
/// ```
/// use atomsketch::prelude::*;
///
/// let filter = BloomFilter::new(1000, 0.01).unwrap();
/// filter.put(b"hello");
/// assert!(filter.member(b"hello"));
/// ```
pub mod prelude {
    pub use crate::core::{AtomicWordStore, CounterArray};
    pub use crate::error::{Result, SketchError};
    pub use crate::filters::{BitsInfo, BloomFilter, CountingBloomFilter, LinearCounter};
    pub use crate::hash::{default_hash_functions, HashFamily, HashFunction};
}
