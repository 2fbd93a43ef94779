//! Memory Management Unit (MMU).
//!
//! This module implements virtual-to-physical address translation. It provides:
//! 1. **Walker:** The four-level page table walk in [`ptw`].
//! 2. **Translation Caches:** Two interchangeable TLB organizations behind the
//!    [`TranslationCache`] trait: [`tlb::FullyAssociativeTlb`] and
//!    [`hierarchy::HierarchicalTlb`].
//! 3. **Front End:** [`Mmu`], which owns the configured organization.
//!
//! A TLB miss is an expected outcome, reported through [`Translation::hit`]; only a
//! failing page walk is an error, and it leaves every TLB array untouched.
//! [`Mmu::translate_checked`] extends that to checks made on the physical address.

/// Two-level direct-mapped TLB (split L1, unified L2).
pub mod hierarchy;

/// Page table walker for the four-level radix tree.
pub mod ptw;

/// Fully associative TLB with LRU replacement.
pub mod tlb;

use std::fmt;

use tracing::debug;

use self::hierarchy::HierarchicalTlb;
use self::ptw::page_walk;
use self::tlb::FullyAssociativeTlb;
use crate::common::{AccessKind, PhysAddr, Result, VirtAddr};
use crate::config::{TlbConfig, TlbOrganization};
use crate::soc::memory::PhysicalMemory;

/// Outcome of servicing one translation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Translation {
    /// Translated physical address.
    pub paddr: PhysAddr,
    /// `true` if the translation came from a TLB, `false` if a page walk was needed.
    pub hit: bool,
}

/// Array a TLB entry belongs to, for dumping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TlbLevel {
    /// The single array of a fully associative TLB.
    Unified,
    /// First-level instruction TLB.
    L1I,
    /// First-level data TLB.
    L1D,
    /// Second-level TLB.
    L2,
}

impl fmt::Display for TlbLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unified => "TLB",
            Self::L1I => "L1 ITLB",
            Self::L1D => "L1 DTLB",
            Self::L2 => "L2 TLB",
        };
        f.write_str(name)
    }
}

/// Snapshot of one TLB entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TlbLineView {
    /// Array holding the entry.
    pub level: TlbLevel,
    /// Entry index within the array.
    pub index: usize,
    /// Validity flag.
    pub valid: bool,
    /// Tag: the full virtual page number, or its bits above the index for
    /// direct-mapped arrays.
    pub tag: u64,
    /// Physical frame number.
    pub frame: u32,
}

impl fmt::Display for TlbLineView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} #{:<3} V: {} TAG: 0x{:09X} PPN: 0x{:05X}",
            self.level,
            self.index,
            u8::from(self.valid),
            self.tag,
            self.frame
        )
    }
}

/// Common contract of the TLB organizations.
pub trait TranslationCache: fmt::Debug {
    /// Returns the frame cached for `vpn` at any level, leaving replacement state alone.
    fn probe(&self, vpn: u64, kind: AccessKind) -> Option<u32>;

    /// Looks up a virtual page number without walking.
    ///
    /// Returns the physical frame on a hit. A hit may update replacement state
    /// (LRU order, L2-to-L1 promotion).
    fn lookup(&mut self, vpn: u64, kind: AccessKind) -> Option<u32>;

    /// Installs the translation `vpn -> frame` following the organization's
    /// replacement rule.
    ///
    /// # Errors
    ///
    /// [`crate::common::Error::BadParameter`] if the replacement state is corrupt.
    fn insert(&mut self, vpn: u64, frame: u32, kind: AccessKind) -> Result<()>;

    /// Translates `vaddr`, walking the page tables and installing the result on a miss.
    ///
    /// # Errors
    ///
    /// Propagates page walk errors; no entry is installed in that case.
    fn service(
        &mut self,
        memory: &dyn PhysicalMemory,
        vaddr: &VirtAddr,
        kind: AccessKind,
    ) -> Result<Translation> {
        let vpn = vaddr.page_number();
        if let Some(frame) = self.lookup(vpn, kind) {
            return Ok(Translation {
                paddr: PhysAddr::new(frame, vaddr.page_offset())?,
                hit: true,
            });
        }
        let paddr = page_walk(memory, vaddr)?;
        self.insert(vpn, paddr.frame(), kind)?;
        Ok(Translation { paddr, hit: false })
    }

    /// Invalidates every entry.
    fn flush(&mut self);

    /// Snapshot of every entry in array order.
    fn dump(&self) -> Vec<TlbLineView>;
}

/// Memory Management Unit holding the configured translation cache.
#[derive(Debug)]
pub struct Mmu {
    organization: TlbOrganization,
    tlb: Box<dyn TranslationCache + Send>,
}

impl Mmu {
    /// Builds the organization selected by `config`.
    ///
    /// # Errors
    ///
    /// [`crate::common::Error::BadParameter`] if the TLB geometry is invalid.
    pub fn new(config: &TlbConfig) -> Result<Self> {
        config.validate()?;
        let tlb: Box<dyn TranslationCache + Send> = match config.organization {
            TlbOrganization::FullyAssociative => Box::new(FullyAssociativeTlb::new(config.entries)?),
            TlbOrganization::Hierarchical => Box::new(HierarchicalTlb::new(config)?),
        };
        debug!(organization = ?config.organization, "MMU initialized");
        Ok(Self {
            organization: config.organization,
            tlb,
        })
    }

    /// Organization in use.
    pub fn organization(&self) -> TlbOrganization {
        self.organization
    }

    /// Looks up a virtual page number without walking.
    pub fn lookup(&mut self, vpn: u64, kind: AccessKind) -> Option<u32> {
        self.tlb.lookup(vpn, kind)
    }

    /// Translates `vaddr` through the TLB, walking on a miss.
    ///
    /// # Errors
    ///
    /// Propagates page walk errors.
    pub fn translate(
        &mut self,
        memory: &dyn PhysicalMemory,
        vaddr: &VirtAddr,
        kind: AccessKind,
    ) -> Result<Translation> {
        self.tlb.service(memory, vaddr, kind)
    }

    /// Translates `vaddr` like [`Mmu::translate`], but hands the physical address to
    /// `check` before any TLB state changes. If `check` fails the TLB is left exactly
    /// as it was, including its replacement order.
    ///
    /// # Errors
    ///
    /// Propagates page walk errors and the error returned by `check`.
    pub fn translate_checked<F>(
        &mut self,
        memory: &dyn PhysicalMemory,
        vaddr: &VirtAddr,
        kind: AccessKind,
        check: F,
    ) -> Result<Translation>
    where
        F: FnOnce(PhysAddr) -> Result<()>,
    {
        let vpn = vaddr.page_number();
        let translation = match self.tlb.probe(vpn, kind) {
            Some(frame) => Translation {
                paddr: PhysAddr::new(frame, vaddr.page_offset())?,
                hit: true,
            },
            None => Translation {
                paddr: page_walk(memory, vaddr)?,
                hit: false,
            },
        };
        check(translation.paddr)?;
        if translation.hit {
            let _ = self.tlb.lookup(vpn, kind);
        } else {
            self.tlb.insert(vpn, translation.paddr.frame(), kind)?;
        }
        Ok(translation)
    }

    /// Invalidates every TLB entry.
    pub fn flush(&mut self) {
        self.tlb.flush();
    }

    /// Snapshot of every TLB entry.
    pub fn dump(&self) -> Vec<TlbLineView> {
        self.tlb.dump()
    }
}
