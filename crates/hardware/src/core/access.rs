//! Memory Access Pipeline.
//!
//! This module drives one trace record through the whole address path:
//! 1. **Validation:** The record is checked before any state is touched.
//! 2. **Translation:** The TLB is consulted; a miss walks the page tables. The
//!    resulting physical address is checked against memory before the TLB is updated,
//!    so a rejected access leaves TLB and caches unchanged.
//! 3. **Caching:** The physical address is read or written through the cache hierarchy.

use tracing::trace;

use crate::common::{AccessSize, MemoryAccess, MemoryOp, PhysAddr, Result};
use crate::core::units::cache::hierarchy::{CacheHierarchy, HitLevel};
use crate::core::units::mmu::Mmu;
use crate::soc::memory::PhysicalMemory;

/// Outcome of one memory access.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AccessResult {
    /// Value read (zero-extended for byte reads); `None` for writes.
    pub value: Option<u32>,
    /// Physical address the access resolved to.
    pub paddr: PhysAddr,
    /// `true` if the translation hit in the TLB.
    pub tlb_hit: bool,
    /// Level of the cache hierarchy that held the line.
    pub level: HitLevel,
}

/// Performs one memory access: translate, then read or write through the caches.
///
/// # Errors
///
/// - [`crate::common::Error::BadParameter`] for an invalid record or a word access to
///   an address that is not word aligned.
/// - [`crate::common::Error::OutOfBounds`] if the page walk or the line transfer
///   leaves memory.
pub fn access(
    memory: &mut dyn PhysicalMemory,
    mmu: &mut Mmu,
    caches: &mut CacheHierarchy,
    request: &MemoryAccess,
) -> Result<AccessResult> {
    request.validate()?;
    let translation = mmu.translate_checked(&*memory, &request.vaddr, request.kind, |paddr| {
        CacheHierarchy::check_access(&*memory, paddr, request.size)
    })?;
    let paddr = translation.paddr;

    let (value, level) = match (request.op, request.size) {
        (MemoryOp::Read, AccessSize::Word) => {
            let (word, level) = caches.read(&*memory, paddr, request.kind)?;
            (Some(word), level)
        }
        (MemoryOp::Read, AccessSize::Byte) => {
            let (byte, level) = caches.read_byte(&*memory, paddr, request.kind)?;
            (Some(u32::from(byte)), level)
        }
        (MemoryOp::Write(word), AccessSize::Word) => (None, caches.write(memory, paddr, word)?),
        (MemoryOp::Write(byte), AccessSize::Byte) => {
            (None, caches.write_byte(memory, paddr, byte as u8)?)
        }
    };

    trace!(%request, %paddr, tlb_hit = translation.hit, ?level, "access");
    Ok(AccessResult {
        value,
        paddr,
        tlb_hit: translation.hit,
        level,
    })
}
