//! Replacement Policies.
//!
//! Victim selection for the associative structures of the model.
//!
//! # Policies
//!
//! - `aging`: per-way age counters (approximate LRU) used by every cache level.
//! - `lru`: an ordered eviction list (exact LRU) used by the fully associative TLB.

/// Aging (approximate LRU) replacement for set-associative caches.
pub mod aging;

/// Least Recently Used eviction list.
pub mod lru;

pub use aging::Aged;
pub use lru::EvictionList;
