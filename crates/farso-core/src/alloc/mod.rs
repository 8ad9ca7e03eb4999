//! Collections used across Farso.
//!
//! - Re-exports of AHash based hash collections
//! - [`SparseSet`]: generational arena used for widget and renderer storage

pub mod sparse_set;

pub use ahash::{AHashMap as HashMap, AHashSet as HashSet, RandomState};
pub use sparse_set::{IndexSlot, SparseSet};
