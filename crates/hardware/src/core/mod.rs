//! Address-path core.
//!
//! This module contains the translation and caching hardware and the access pipeline
//! that drives a single memory access through them.

/// Single-access pipeline: validate, translate, read or write through the caches.
pub mod access;

/// Address-path units (MMU and cache hierarchy).
pub mod units;

pub use self::access::{AccessResult, access};
