//! Probabilistic structures built on the core storage engines.
//!
//! | Structure | Answers | Deletion | Hashing |
//! |-----------|---------|----------|---------|
//! | [`BloomFilter`] | membership + cardinality | no | k seeded functions |
//! | [`CountingBloomFilter`] | membership + per-term counts | yes | k seeded functions |
//! | [`LinearCounter`] | cardinality only | no | single 128-bit function |

pub mod bloom;
pub mod counting;
pub mod linear;

pub use bloom::{BitsInfo, BloomFilter};
pub use counting::CountingBloomFilter;
pub use linear::LinearCounter;
