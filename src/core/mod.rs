//! Core storage engines and sizing math.
//!
//! Everything that actually touches memory lives here: the atomic word
//! store, the packed counter array built on the same word layout, and the
//! closed-form parameter formulas the filters use to size themselves.

pub mod counters;
pub mod params;
pub mod wordstore;

pub use counters::CounterArray;
pub use wordstore::{AtomicWordStore, WORD_BITS};
