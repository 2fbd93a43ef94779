//! Physical and Virtual Address types.
//!
//! This module defines strong types for the two address spaces of the model and the
//! bit-exact codec between them and their flat integer encodings. It provides the following:
//! 1. **Virtual Addresses:** Four 9-bit directory indices plus a 12-bit page offset (49 bits).
//! 2. **Physical Addresses:** A 20-bit frame number plus a 12-bit page offset (32 bits).
//! 3. **Validation:** Every field constructor checks its bit width and rejects, never truncates.

use std::fmt;

use super::constants::{
    DIRECTORY_INDEX_BITS, DIRECTORY_INDEX_MASK, PAGE_OFFSET_MASK, PAGE_SHIFT, PHY_PAGE_NUM_MASK,
    VIRT_ADDR_MASK, WORD_SIZE,
};
use super::error::{Error, Result};

/// A virtual address decomposed into its page-table indices and page offset.
///
/// The top-level index (`pgd_entry`) selects an entry in the root table, followed by
/// `pud_entry`, `pmd_entry`, and finally `pte_entry`, which selects the page itself.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VirtAddr {
    pgd_entry: u16,
    pud_entry: u16,
    pmd_entry: u16,
    pte_entry: u16,
    page_offset: u16,
}

/// A physical address: frame number and page offset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PhysAddr {
    frame: u32,
    page_offset: u16,
}

fn check_index(name: &str, value: u16) -> Result<u16> {
    if u64::from(value) > DIRECTORY_INDEX_MASK {
        return Err(Error::BadParameter(format!(
            "{name} index {value:#x} does not fit in {DIRECTORY_INDEX_BITS} bits"
        )));
    }
    Ok(value)
}

fn check_offset(value: u16) -> Result<u16> {
    if u64::from(value) > PAGE_OFFSET_MASK {
        return Err(Error::BadParameter(format!(
            "page offset {value:#x} does not fit in {PAGE_SHIFT} bits"
        )));
    }
    Ok(value)
}

impl VirtAddr {
    /// Builds a virtual address from its five fields.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BadParameter`] if any index is wider than 9 bits or the
    /// offset is wider than 12 bits.
    pub fn new(
        pgd_entry: u16,
        pud_entry: u16,
        pmd_entry: u16,
        pte_entry: u16,
        page_offset: u16,
    ) -> Result<Self> {
        Ok(Self {
            pgd_entry: check_index("PGD", pgd_entry)?,
            pud_entry: check_index("PUD", pud_entry)?,
            pmd_entry: check_index("PMD", pmd_entry)?,
            pte_entry: check_index("PTE", pte_entry)?,
            page_offset: check_offset(page_offset)?,
        })
    }

    /// Decomposes a flat 64-bit virtual address.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BadParameter`] if any bit above bit 48 is set.
    pub fn from_u64(addr: u64) -> Result<Self> {
        if addr & !VIRT_ADDR_MASK != 0 {
            return Err(Error::BadParameter(format!(
                "virtual address {addr:#x} uses more than 49 bits"
            )));
        }
        let index = |level: u32| {
            ((addr >> (PAGE_SHIFT + level * DIRECTORY_INDEX_BITS)) & DIRECTORY_INDEX_MASK) as u16
        };
        Self::new(
            index(3),
            index(2),
            index(1),
            index(0),
            (addr & PAGE_OFFSET_MASK) as u16,
        )
    }

    /// Packs the address back into its flat encoding; inverse of [`VirtAddr::from_u64`].
    pub fn to_u64(&self) -> u64 {
        (self.page_number() << PAGE_SHIFT) | u64::from(self.page_offset)
    }

    /// Concatenates the four directory indices, PGD most significant, into a 36-bit
    /// virtual page number.
    pub fn page_number(&self) -> u64 {
        [self.pud_entry, self.pmd_entry, self.pte_entry]
            .iter()
            .fold(u64::from(self.pgd_entry), |vpn, &index| {
                (vpn << DIRECTORY_INDEX_BITS) | u64::from(index)
            })
    }

    /// Index into the top-level (root) directory.
    pub fn pgd_entry(&self) -> u16 {
        self.pgd_entry
    }

    /// Index into the upper directory.
    pub fn pud_entry(&self) -> u16 {
        self.pud_entry
    }

    /// Index into the middle directory.
    pub fn pmd_entry(&self) -> u16 {
        self.pmd_entry
    }

    /// Index into the last-level page table.
    pub fn pte_entry(&self) -> u16 {
        self.pte_entry
    }

    /// Byte offset within the page (0-4095).
    pub fn page_offset(&self) -> u16 {
        self.page_offset
    }

    /// The directory indices in walk order: PGD, PUD, PMD, PTE.
    pub fn directory_indices(&self) -> [u16; 4] {
        [
            self.pgd_entry,
            self.pud_entry,
            self.pmd_entry,
            self.pte_entry,
        ]
    }
}

impl fmt::Display for VirtAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PGD=0x{:X}; PUD=0x{:X}; PMD=0x{:X}; PTE=0x{:X}; offset=0x{:X}",
            self.pgd_entry, self.pud_entry, self.pmd_entry, self.pte_entry, self.page_offset
        )
    }
}

impl PhysAddr {
    /// Builds a physical address from a frame number and page offset.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BadParameter`] if the frame is wider than 20 bits or the
    /// offset wider than 12 bits.
    pub fn new(frame: u32, page_offset: u16) -> Result<Self> {
        if frame & !PHY_PAGE_NUM_MASK != 0 {
            return Err(Error::BadParameter(format!(
                "frame number {frame:#x} does not fit in 20 bits"
            )));
        }
        Ok(Self {
            frame,
            page_offset: check_offset(page_offset)?,
        })
    }

    /// Builds a physical address from the byte address of a page and an offset within it.
    ///
    /// The low 12 bits of `page_base` are discarded, as a page-table entry names the
    /// frame by the address of its first byte.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BadParameter`] if the offset is wider than 12 bits.
    pub fn from_page_base(page_base: u32, page_offset: u16) -> Result<Self> {
        Self::new(page_base >> PAGE_SHIFT, page_offset)
    }

    /// Decomposes a flat 32-bit physical address. Every 32-bit value is valid.
    pub fn from_u32(addr: u32) -> Self {
        Self {
            frame: addr >> PAGE_SHIFT,
            page_offset: (u64::from(addr) & PAGE_OFFSET_MASK) as u16,
        }
    }

    /// Packs frame and offset into the flat 32-bit encoding.
    pub fn val(&self) -> u32 {
        (self.frame << PAGE_SHIFT) | u32::from(self.page_offset)
    }

    /// Physical frame number.
    pub fn frame(&self) -> u32 {
        self.frame
    }

    /// Byte offset within the frame.
    pub fn page_offset(&self) -> u16 {
        self.page_offset
    }

    /// Whether the address falls on a word boundary.
    pub fn is_word_aligned(&self) -> bool {
        self.val() as usize % WORD_SIZE == 0
    }

    /// Rounds the address down to its containing word and returns the byte index
    /// (0-3, little-endian) of this address inside that word.
    pub fn align_to_word(&self) -> (Self, usize) {
        let byte = self.val() as usize % WORD_SIZE;
        (Self::from_u32(self.val() - byte as u32), byte)
    }
}

impl fmt::Display for PhysAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "page num = 0x{:X}; offset = 0x{:X}",
            self.frame, self.page_offset
        )
    }
}
