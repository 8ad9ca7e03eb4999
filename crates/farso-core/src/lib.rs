//! Farso Core
//!
//! Value types and utilities shared by every Farso crate: geometry, the
//! generational arena backing the widget tree, hash collections, logging
//! and profiling setup.

pub mod alloc;
pub mod geometry;
pub mod logging;
pub mod profiling;
