//! Error definitions.
//!
//! This module defines the single error type reported by every fallible operation of
//! the address path. It provides:
//! 1. **Parameter Errors:** Out-of-range fields, misaligned addresses, invalid geometry.
//! 2. **Bounds Errors:** Page walks or memory transfers beyond the simulated memory.
//! 3. **Setup Errors:** Backing-store allocation failures and memory-image I/O.
//!
//! No operation in the translation or cache core aborts; every precondition
//! violation is returned to the caller, and nothing is mutated before it is detected.

use thiserror::Error;

/// Errors reported by the address codec, page walker, TLBs, caches and memory.
#[derive(Debug, Error)]
pub enum Error {
    /// An argument is out of range: a field wider than its bit width, a misaligned
    /// physical address, an invalid access record, or an invalid configuration.
    #[error("bad parameter: {0}")]
    BadParameter(String),

    /// An access (page-table read or line transfer) falls outside simulated memory.
    #[error("access at offset {offset:#x} is out of bounds (memory size {len:#x})")]
    OutOfBounds {
        /// Byte offset of the first byte accessed.
        offset: u64,
        /// Size of the simulated memory in bytes.
        len: usize,
    },

    /// The backing store for simulated memory could not be allocated.
    #[error("failed to allocate {bytes} bytes of simulated memory")]
    Allocation {
        /// Requested size in bytes.
        bytes: usize,
    },

    /// Reading a memory image from disk failed.
    #[error("memory image I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
