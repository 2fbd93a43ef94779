//! System-on-Chip (SoC) Components.
//!
//! This module holds the simulated physical memory that the page walker reads and the
//! cache hierarchy fills from and writes through to.

/// Simulated physical memory and its word-level access trait.
pub mod memory;

pub use memory::{Memory, PhysicalMemory};
