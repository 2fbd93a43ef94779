//! Common utilities and types used throughout the address-path model.
//!
//! This module provides the building blocks shared by every component:
//! 1. **Address Types:** Strong types and the bit-exact codec for virtual and physical addresses.
//! 2. **Constants:** Page, directory, word and line geometry.
//! 3. **Memory Access:** The shape of one trace record (operation, kind, size, address).
//! 4. **Error Handling:** The crate-wide error enum and result alias.

/// Address type definitions (physical and virtual addresses).
pub mod addr;

/// Common constants used throughout the model.
pub mod constants;

/// Memory access type definitions.
pub mod data;

/// Error types.
pub mod error;

pub use addr::{PhysAddr, VirtAddr};
pub use constants::{LINE_BYTES, PAGE_SHIFT, WORD_SIZE, WORDS_PER_LINE};
pub use data::{AccessKind, AccessSize, MemoryAccess, MemoryOp};
pub use error::{Error, Result};
