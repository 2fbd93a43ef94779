//! Global System Constants.
//!
//! This module defines the fixed geometry of the modelled address path. It includes:
//! 1. **Page Constants:** Page size, offset width, and directory index widths.
//! 2. **Address Widths:** Virtual and physical address widths and masks.
//! 3. **Line Constants:** Word size and words per cache line.

/// Page size in bytes (4KB).
pub const PAGE_SIZE: u64 = 4096;

/// Number of bits to shift to convert between bytes and pages.
pub const PAGE_SHIFT: u32 = 12;

/// Mask for extracting the page offset from an address.
pub const PAGE_OFFSET_MASK: u64 = PAGE_SIZE - 1;

/// Width of each page-directory index (PGD, PUD, PMD, PTE).
pub const DIRECTORY_INDEX_BITS: u32 = 9;

/// Mask for a single directory index.
pub const DIRECTORY_INDEX_MASK: u64 = (1 << DIRECTORY_INDEX_BITS) - 1;

/// Number of entries in one page-table level (one page of 4-byte entries).
pub const DIRECTORY_ENTRIES: usize = 1 << DIRECTORY_INDEX_BITS;

/// Number of page-table levels walked per translation.
pub const PAGE_TABLE_LEVELS: usize = 4;

/// Width of the virtual page number (four directory indices).
pub const VIRT_PAGE_NUM_BITS: u32 = DIRECTORY_INDEX_BITS * PAGE_TABLE_LEVELS as u32;

/// Mask of every bit a valid virtual address may use (bits 0..=48).
pub const VIRT_ADDR_MASK: u64 = 0x1_FFFF_FFFF_FFFF;

/// Width of the physical frame number.
pub const PHY_PAGE_NUM_BITS: u32 = 20;

/// Mask for a physical frame number.
pub const PHY_PAGE_NUM_MASK: u32 = (1 << PHY_PAGE_NUM_BITS) - 1;

/// Size of a page-table entry in bytes.
pub const PTE_SIZE: usize = 4;

/// Size of a machine word in bytes.
pub const WORD_SIZE: usize = 4;

/// Number of words held by one cache line.
pub const WORDS_PER_LINE: usize = 4;

/// Size of one cache line in bytes.
pub const LINE_BYTES: usize = WORD_SIZE * WORDS_PER_LINE;
