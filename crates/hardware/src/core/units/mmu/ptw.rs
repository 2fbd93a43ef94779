//! Hardware Page Table Walker (PTW).
//!
//! This module implements the four-level radix walk that resolves a virtual address
//! to a physical address. The page tables live in simulated physical memory:
//!
//! 1. **Entries:** Each table is one 4 KiB page of 512 little-endian 32-bit entries.
//! 2. **Chaining:** The walk starts at the table at byte 0. The entry selected by each
//!    level's index holds the byte address of the next level's table.
//! 3. **Leaf:** The entry selected at the last level holds the byte address of the
//!    destination page; the page offset is carried over unchanged.
//!
//! Entries have no presence bit, so every table on a walked path must be populated.

use tracing::trace;

use crate::common::constants::PTE_SIZE;
use crate::common::{PhysAddr, Result, VirtAddr};
use crate::soc::memory::PhysicalMemory;

/// Byte address of the top-level (PGD) table.
const ROOT_TABLE_BASE: u32 = 0;

/// Walks the page tables in `memory` and returns the physical address of `vaddr`.
///
/// The walk performs no caching; callers invoke it only on a translation-cache miss.
///
/// # Errors
///
/// [`crate::common::Error::OutOfBounds`] if any entry read lies outside `memory`.
pub fn page_walk<M: PhysicalMemory + ?Sized>(memory: &M, vaddr: &VirtAddr) -> Result<PhysAddr> {
    let mut base = ROOT_TABLE_BASE;
    for (level, index) in vaddr.directory_indices().into_iter().enumerate() {
        let entry_offset = base as usize + usize::from(index) * PTE_SIZE;
        base = memory.read_word(entry_offset)?;
        trace!(level, index, entry_offset, next = base, "page walk step");
    }
    PhysAddr::from_page_base(base, vaddr.page_offset())
}
