//! Inspect RapidJSON values living in another process's memory.

/// Memory sources, value decoding and the lazy display tree.
pub mod inspect;
