//! Memory Access Types.
//!
//! This module defines the shape of one memory access as it is fed to the
//! translation and cache pipeline. It provides:
//! 1. **Access Kind:** Instruction fetch versus data access, selecting the L1 array.
//! 2. **Access Size:** Byte or word granularity.
//! 3. **Operation:** Read, or write carrying the value to store.
//! 4. **Access Record:** The full `(op, kind, size, vaddr)` unit of work.

use std::fmt;

use super::addr::VirtAddr;
use super::constants::WORD_SIZE;
use super::error::{Error, Result};

/// Which side of the split L1 an access goes through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AccessKind {
    /// Instruction fetch; served by the L1 instruction cache and ITLB.
    Instruction,

    /// Data load or store; served by the L1 data cache and DTLB.
    Data,
}

/// Granularity of a memory access.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessSize {
    /// Single byte.
    Byte,
    /// 32-bit little-endian word.
    Word,
}

/// Direction of a memory access.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemoryOp {
    /// Load the addressed byte or word.
    Read,
    /// Store the given value (a byte value must fit in 8 bits).
    Write(u32),
}

/// One record of a memory trace: the unit of work driving the pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemoryAccess {
    /// Read or write (with value).
    pub op: MemoryOp,
    /// Instruction or data side.
    pub kind: AccessKind,
    /// Byte or word.
    pub size: AccessSize,
    /// Virtual address of the access.
    pub vaddr: VirtAddr,
}

impl MemoryAccess {
    /// Instruction fetch of one word.
    pub fn fetch(vaddr: VirtAddr) -> Self {
        Self {
            op: MemoryOp::Read,
            kind: AccessKind::Instruction,
            size: AccessSize::Word,
            vaddr,
        }
    }

    /// Data read of the given size.
    pub fn read(size: AccessSize, vaddr: VirtAddr) -> Self {
        Self {
            op: MemoryOp::Read,
            kind: AccessKind::Data,
            size,
            vaddr,
        }
    }

    /// Data write of the given size and value.
    pub fn write(size: AccessSize, value: u32, vaddr: VirtAddr) -> Self {
        Self {
            op: MemoryOp::Write(value),
            kind: AccessKind::Data,
            size,
            vaddr,
        }
    }

    /// Checks that the record describes an access the hierarchy can perform.
    ///
    /// Instructions are only ever fetched as whole words and never written;
    /// a byte write must carry a value that fits in 8 bits. Word accesses must be
    /// word aligned; the page offset carries over into the physical address, so this
    /// is decided before translation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BadParameter`] for any other combination.
    pub fn validate(&self) -> Result<()> {
        match (self.kind, self.op, self.size) {
            (AccessKind::Instruction, MemoryOp::Write(_), _) => Err(Error::BadParameter(
                "instructions cannot be written".to_string(),
            )),
            (AccessKind::Instruction, _, AccessSize::Byte) => Err(Error::BadParameter(
                "instruction fetches are word-sized".to_string(),
            )),
            (_, MemoryOp::Write(value), AccessSize::Byte) if value > 0xFF => {
                Err(Error::BadParameter(format!(
                    "byte write value {value:#x} does not fit in 8 bits"
                )))
            }
            (_, _, AccessSize::Word)
                if usize::from(self.vaddr.page_offset()) % WORD_SIZE != 0 =>
            {
                Err(Error::BadParameter(format!(
                    "word access at offset {:#05x} is not word aligned",
                    self.vaddr.page_offset()
                )))
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for MemoryAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let order = match self.op {
            MemoryOp::Read => 'R',
            MemoryOp::Write(_) => 'W',
        };
        let what = match (self.kind, self.size) {
            (AccessKind::Instruction, _) => "I",
            (AccessKind::Data, AccessSize::Word) => "DW",
            (AccessKind::Data, AccessSize::Byte) => "DB",
        };
        write!(f, "{order} {what} ")?;
        match (self.op, self.size) {
            (MemoryOp::Write(value), AccessSize::Byte) => write!(f, "0x{value:02X} ")?,
            (MemoryOp::Write(value), AccessSize::Word) => write!(f, "0x{value:08X} ")?,
            (MemoryOp::Read, _) => {}
        }
        write!(f, "@0x{:016X}", self.vaddr.to_u64())
    }
}
