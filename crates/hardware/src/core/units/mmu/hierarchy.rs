//! Two-Level Translation Lookaside Buffer.
//!
//! Split first-level instruction and data TLBs sit in front of a unified second-level
//! TLB. All three arrays are direct-mapped:
//!
//! ```text
//! index = vpn mod LINES
//! tag   = vpn >> log2(LINES)
//! ```
//!
//! The second level is inclusive of the first: a translation enters L1 only after it
//! is present in L2, and when L2 replaces a translation every L1 copy of it is dropped.

use tracing::trace;

use super::{TlbLevel, TlbLineView, TranslationCache};
use crate::common::{AccessKind, Result};
use crate::config::TlbConfig;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct TlbEntry {
    valid: bool,
    tag: u64,
    frame: u32,
}

/// One direct-mapped TLB array.
#[derive(Clone, Debug)]
struct DirectMappedTlb {
    level: TlbLevel,
    index_bits: u32,
    entries: Vec<TlbEntry>,
}

impl DirectMappedTlb {
    fn new(level: TlbLevel, lines: usize) -> Self {
        Self {
            level,
            index_bits: lines.trailing_zeros(),
            entries: vec![TlbEntry::default(); lines],
        }
    }

    fn index(&self, vpn: u64) -> usize {
        (vpn % self.entries.len() as u64) as usize
    }

    fn tag(&self, vpn: u64) -> u64 {
        vpn >> self.index_bits
    }

    fn vpn_of(&self, tag: u64, index: usize) -> u64 {
        (tag << self.index_bits) | index as u64
    }

    fn lookup(&self, vpn: u64) -> Option<u32> {
        let entry = self.entries[self.index(vpn)];
        (entry.valid && entry.tag == self.tag(vpn)).then_some(entry.frame)
    }

    /// Installs a translation and returns the virtual page number it replaced, if any.
    fn insert(&mut self, vpn: u64, frame: u32) -> Option<u64> {
        let index = self.index(vpn);
        let entry = TlbEntry {
            valid: true,
            tag: self.tag(vpn),
            frame,
        };
        let old = std::mem::replace(&mut self.entries[index], entry);
        (old.valid && old.tag != entry.tag).then(|| self.vpn_of(old.tag, index))
    }

    fn invalidate(&mut self, vpn: u64) -> bool {
        let index = self.index(vpn);
        let tag = self.tag(vpn);
        let entry = &mut self.entries[index];
        let stale = entry.valid && entry.tag == tag;
        if stale {
            entry.valid = false;
        }
        stale
    }

    fn flush(&mut self) {
        self.entries.fill(TlbEntry::default());
    }

    fn views(&self) -> impl Iterator<Item = TlbLineView> + '_ {
        self.entries
            .iter()
            .enumerate()
            .map(move |(index, entry)| TlbLineView {
                level: self.level,
                index,
                valid: entry.valid,
                tag: entry.tag,
                frame: entry.frame,
            })
    }
}

/// Split direct-mapped L1 TLBs backed by a direct-mapped unified L2 TLB.
#[derive(Clone, Debug)]
pub struct HierarchicalTlb {
    itlb: DirectMappedTlb,
    dtlb: DirectMappedTlb,
    l2: DirectMappedTlb,
}

impl HierarchicalTlb {
    /// Creates empty arrays sized by `config.l1_lines` and `config.l2_lines`.
    ///
    /// # Errors
    ///
    /// [`crate::common::Error::BadParameter`] if a line count is not a power of two.
    pub fn new(config: &TlbConfig) -> Result<Self> {
        config.validate_lines()?;
        Ok(Self {
            itlb: DirectMappedTlb::new(TlbLevel::L1I, config.l1_lines),
            dtlb: DirectMappedTlb::new(TlbLevel::L1D, config.l1_lines),
            l2: DirectMappedTlb::new(TlbLevel::L2, config.l2_lines),
        })
    }

    fn l1_mut(&mut self, kind: AccessKind) -> &mut DirectMappedTlb {
        match kind {
            AccessKind::Instruction => &mut self.itlb,
            AccessKind::Data => &mut self.dtlb,
        }
    }

    fn l1(&self, kind: AccessKind) -> &DirectMappedTlb {
        match kind {
            AccessKind::Instruction => &self.itlb,
            AccessKind::Data => &self.dtlb,
        }
    }

    fn install(&mut self, vpn: u64, frame: u32, kind: AccessKind) {
        if let Some(evicted) = self.l2.insert(vpn, frame) {
            let dropped_i = self.itlb.invalidate(evicted);
            let dropped_d = self.dtlb.invalidate(evicted);
            trace!(vpn, evicted, dropped_i, dropped_d, "L2 TLB replace");
        }
        let _ = self.l1_mut(kind).insert(vpn, frame);
    }
}

impl TranslationCache for HierarchicalTlb {
    fn probe(&self, vpn: u64, kind: AccessKind) -> Option<u32> {
        self.l1(kind).lookup(vpn).or_else(|| self.l2.lookup(vpn))
    }

    fn lookup(&mut self, vpn: u64, kind: AccessKind) -> Option<u32> {
        if let Some(frame) = self.l1(kind).lookup(vpn) {
            return Some(frame);
        }
        let frame = self.l2.lookup(vpn)?;
        let _ = self.l1_mut(kind).insert(vpn, frame);
        trace!(vpn, ?kind, "L2 TLB hit, promoted");
        Some(frame)
    }

    fn insert(&mut self, vpn: u64, frame: u32, kind: AccessKind) -> Result<()> {
        self.install(vpn, frame, kind);
        Ok(())
    }

    fn flush(&mut self) {
        self.itlb.flush();
        self.dtlb.flush();
        self.l2.flush();
    }

    fn dump(&self) -> Vec<TlbLineView> {
        self.itlb
            .views()
            .chain(self.dtlb.views())
            .chain(self.l2.views())
            .collect()
    }
}
