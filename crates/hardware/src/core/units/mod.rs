//! Address-path units.
//!
//! This module contains the hardware blocks a memory access flows through:
//! the memory management unit (page walker and TLBs) and the cache hierarchy.

/// Cache hierarchy (split L1, unified L2) with aging replacement.
pub mod cache;

/// Memory Management Unit with TLBs and page table walker.
pub mod mmu;
