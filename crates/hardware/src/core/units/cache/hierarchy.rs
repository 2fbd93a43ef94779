//! Exclusive Two-Level Cache Hierarchy.
//!
//! Split L1 (instruction and data) in front of a unified L2, with an exclusive
//! inclusion policy:
//! 1. **L1 hit:** the word is returned; nothing moves.
//! 2. **L2 hit:** the line leaves L2 and moves into the matching L1.
//! 3. **Miss in both:** the line is fetched from memory straight into L1.
//!
//! Whenever installing into L1 evicts a line, the victim is demoted into L2, which
//! therefore behaves as a victim cache; a line evicted from L2 is dropped. A line is never
//! valid in an L1 and in L2 at the same time.
//!
//! Writes are data-only, write-through and write-allocate: memory is updated on every
//! write and the written line always ends up resident in L1-D.

use tracing::trace;

use super::{CacheLevel, CacheLineView};
use crate::common::{AccessKind, AccessSize, Error, PhysAddr, Result};
use crate::config::CacheHierarchyConfig;
use crate::soc::memory::{Line, PhysicalMemory};

/// Where an access was served from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HitLevel {
    /// First-level hit.
    L1,
    /// Second-level hit; the line was promoted into L1.
    L2,
    /// Missed both levels; the line was fetched from memory into L1.
    Memory,
}

/// L1-I, L1-D and L2 arrays.
#[derive(Clone, Debug)]
pub struct CacheHierarchy {
    l1i: CacheLevel,
    l1d: CacheLevel,
    l2: CacheLevel,
}

/// Installs `line` into `l1` and demotes whatever it evicts into `l2`.
///
/// A victim that is still resident in the other L1 is not demoted, so L2 never
/// shadows a line held by either first-level array.
fn promote(
    l1: &mut CacheLevel,
    other_l1: &CacheLevel,
    l2: &mut CacheLevel,
    base: PhysAddr,
    line: Line,
) {
    let Some(victim) = l1.install(base, line) else {
        return;
    };
    if other_l1.contains(victim.base) {
        trace!(line = %victim.base, "L1 victim still held by sibling L1, not demoted");
        return;
    }
    if let Some(dropped) = l2.install(victim.base, victim.line) {
        trace!(line = %dropped.base, "L2 victim discarded");
    }
}

fn check_aligned(paddr: PhysAddr) -> Result<()> {
    if paddr.is_word_aligned() {
        Ok(())
    } else {
        Err(Error::BadParameter(format!(
            "physical address {:#010x} is not word aligned",
            paddr.val()
        )))
    }
}

impl CacheHierarchy {
    /// Builds an empty hierarchy.
    ///
    /// # Errors
    ///
    /// [`Error::BadParameter`] if any level's geometry is invalid.
    pub fn new(config: &CacheHierarchyConfig) -> Result<Self> {
        Ok(Self {
            l1i: CacheLevel::new("L1I", &config.l1_i)?,
            l1d: CacheLevel::new("L1D", &config.l1_d)?,
            l2: CacheLevel::new("L2", &config.l2)?,
        })
    }

    /// The L1 instruction cache.
    pub fn l1i(&self) -> &CacheLevel {
        &self.l1i
    }

    /// The L1 data cache.
    pub fn l1d(&self) -> &CacheLevel {
        &self.l1d
    }

    /// The unified L2 cache.
    pub fn l2(&self) -> &CacheLevel {
        &self.l2
    }

    /// The L1 array serving `kind`.
    pub fn l1(&self, kind: AccessKind) -> &CacheLevel {
        match kind {
            AccessKind::Instruction => &self.l1i,
            AccessKind::Data => &self.l1d,
        }
    }

    /// Returns (matching L1, sibling L1, L2).
    fn split(&mut self, kind: AccessKind) -> (&mut CacheLevel, &mut CacheLevel, &mut CacheLevel) {
        match kind {
            AccessKind::Instruction => (&mut self.l1i, &mut self.l1d, &mut self.l2),
            AccessKind::Data => (&mut self.l1d, &mut self.l1i, &mut self.l2),
        }
    }

    /// Checks that an access of `size` at `paddr` can be served: word accesses must
    /// be aligned and the containing line must lie inside `memory`.
    ///
    /// # Errors
    ///
    /// The error [`CacheHierarchy::read`] or [`CacheHierarchy::write`] would return.
    pub fn check_access<M>(memory: &M, paddr: PhysAddr, size: AccessSize) -> Result<()>
    where
        M: PhysicalMemory + ?Sized,
    {
        if size == AccessSize::Word {
            check_aligned(paddr)?;
        }
        memory.check_line(CacheLevel::line_base(paddr).val() as usize)
    }

    /// Reads the word at `paddr` through the hierarchy.
    ///
    /// # Errors
    ///
    /// - [`Error::BadParameter`] if `paddr` is not word aligned.
    /// - [`Error::OutOfBounds`] if the containing line lies outside `memory`.
    ///
    /// No cache state changes when an error is returned.
    pub fn read<M>(&mut self, memory: &M, paddr: PhysAddr, kind: AccessKind) -> Result<(u32, HitLevel)>
    where
        M: PhysicalMemory + ?Sized,
    {
        check_aligned(paddr)?;
        let base = CacheLevel::line_base(paddr);
        memory.check_line(base.val() as usize)?;
        let word = CacheLevel::word_index(paddr);
        let (l1, other_l1, l2) = self.split(kind);

        if let Some(slot) = l1.lookup(paddr) {
            return Ok((l1.line(slot)[word], HitLevel::L1));
        }

        if let Some(slot) = l2.lookup(paddr) {
            let line = l2.invalidate(slot);
            promote(l1, other_l1, l2, base, line);
            trace!(%paddr, ?kind, "L2 hit, promoted");
            return Ok((line[word], HitLevel::L2));
        }

        let line = memory.read_line(base.val() as usize)?;
        promote(l1, other_l1, l2, base, line);
        trace!(%paddr, ?kind, "miss, filled from memory");
        Ok((line[word], HitLevel::Memory))
    }

    /// Reads the byte at `paddr` (any alignment) via a read of its containing word.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfBounds`] if the containing line lies outside `memory`.
    pub fn read_byte<M>(
        &mut self,
        memory: &M,
        paddr: PhysAddr,
        kind: AccessKind,
    ) -> Result<(u8, HitLevel)>
    where
        M: PhysicalMemory + ?Sized,
    {
        let (aligned, byte) = paddr.align_to_word();
        let (word, level) = self.read(memory, aligned, kind)?;
        Ok((((word >> (8 * byte)) & 0xFF) as u8, level))
    }

    /// Writes `value` to the word at `paddr`: write-through, write-allocate, data side.
    ///
    /// # Errors
    ///
    /// - [`Error::BadParameter`] if `paddr` is not word aligned.
    /// - [`Error::OutOfBounds`] if the containing line lies outside `memory`.
    ///
    /// Neither memory nor cache state changes when an error is returned.
    pub fn write<M>(&mut self, memory: &mut M, paddr: PhysAddr, value: u32) -> Result<HitLevel>
    where
        M: PhysicalMemory + ?Sized,
    {
        check_aligned(paddr)?;
        let base = CacheLevel::line_base(paddr);
        let offset = base.val() as usize;
        memory.check_line(offset)?;
        let word = CacheLevel::word_index(paddr);
        let (l1, other_l1, l2) = self.split(AccessKind::Data);

        let level = if let Some(slot) = l1.lookup(paddr) {
            let mut line = *l1.line(slot);
            line[word] = value;
            memory.write_line(offset, &line)?;
            l1.write_word(slot, word, value);
            HitLevel::L1
        } else if let Some(slot) = l2.lookup(paddr) {
            let mut line = *l2.line(slot);
            line[word] = value;
            memory.write_line(offset, &line)?;
            let _ = l2.invalidate(slot);
            promote(l1, other_l1, l2, base, line);
            trace!(%paddr, "write hit in L2, promoted");
            HitLevel::L2
        } else {
            let mut line = memory.read_line(offset)?;
            line[word] = value;
            memory.write_line(offset, &line)?;
            promote(l1, other_l1, l2, base, line);
            trace!(%paddr, "write miss, allocated");
            HitLevel::Memory
        };

        // A copy held by the instruction side stays coherent with memory.
        if let Some(slot) = other_l1.probe(paddr) {
            other_l1.write_word(slot, word, value);
        }
        Ok(level)
    }

    /// Writes one byte at `paddr` (any alignment) by read-modify-write of its word.
    ///
    /// Returns the level that served the read half of the operation.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfBounds`] if the containing line lies outside `memory`.
    pub fn write_byte<M>(&mut self, memory: &mut M, paddr: PhysAddr, value: u8) -> Result<HitLevel>
    where
        M: PhysicalMemory + ?Sized,
    {
        let (aligned, byte) = paddr.align_to_word();
        let (word, level) = self.read(memory, aligned, AccessKind::Data)?;
        let shift = 8 * byte as u32;
        let merged = (word & !(0xFF << shift)) | (u32::from(value) << shift);
        let _ = self.write(memory, aligned, merged)?;
        Ok(level)
    }

    /// Invalidates every line of every level.
    pub fn flush(&mut self) {
        self.l1i.flush();
        self.l1d.flush();
        self.l2.flush();
    }

    /// Snapshot of every line of the given level, for dumping.
    pub fn dump(&self, level: CacheLevelId) -> Vec<CacheLineView> {
        match level {
            CacheLevelId::L1I => self.l1i.lines().collect(),
            CacheLevelId::L1D => self.l1d.lines().collect(),
            CacheLevelId::L2 => self.l2.lines().collect(),
        }
    }
}

/// Identifies one array of the hierarchy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CacheLevelId {
    /// L1 instruction cache.
    L1I,
    /// L1 data cache.
    L1D,
    /// Unified L2 cache.
    L2,
}
