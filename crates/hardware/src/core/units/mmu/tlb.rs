//! Fully Associative Translation Lookaside Buffer.
//!
//! Every entry can hold any virtual page; the tag is the full 36-bit virtual page
//! number. Replacement follows exact LRU order kept in an [`EvictionList`] over the
//! entry indices: the front is the next victim, the back the most recently used.

use tracing::trace;

use super::{TlbLevel, TlbLineView, TranslationCache};
use crate::common::{AccessKind, Error, Result};
use crate::core::units::cache::policies::EvictionList;

/// A single entry in the TLB.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct TlbEntry {
    /// Entry validity flag.
    valid: bool,
    /// Virtual page number (tag).
    vpn: u64,
    /// Physical frame number (data).
    frame: u32,
}

/// Fully associative TLB with LRU replacement.
#[derive(Clone, Debug)]
pub struct FullyAssociativeTlb {
    entries: Vec<TlbEntry>,
    order: EvictionList,
}

impl FullyAssociativeTlb {
    /// Creates an empty TLB of `size` entries.
    ///
    /// # Errors
    ///
    /// [`Error::BadParameter`] if `size` is zero.
    pub fn new(size: usize) -> Result<Self> {
        if size == 0 {
            return Err(Error::BadParameter(
                "fully associative TLB needs at least one entry".to_string(),
            ));
        }
        Ok(Self {
            entries: vec![TlbEntry::default(); size],
            order: EvictionList::new(size),
        })
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false`; a TLB has at least one entry.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry indices from least to most recently used.
    pub fn replacement_order(&self) -> Vec<usize> {
        self.order.iter().collect()
    }

    fn find(&self, vpn: u64) -> Option<usize> {
        // Most recently used entries sit at the back.
        self.order
            .iter()
            .rev()
            .find(|&i| self.entries[i].valid && self.entries[i].vpn == vpn)
    }

    fn replace(&mut self, vpn: u64, frame: u32) -> Result<()> {
        let Some(victim) = self.order.front() else {
            return Err(Error::BadParameter("TLB eviction list is empty".to_string()));
        };
        self.order.move_to_back(victim)?;
        let old = std::mem::replace(
            &mut self.entries[victim],
            TlbEntry {
                valid: true,
                vpn,
                frame,
            },
        );
        if old.valid {
            trace!(index = victim, evicted_vpn = old.vpn, vpn, "TLB replace");
        }
        Ok(())
    }
}

impl TranslationCache for FullyAssociativeTlb {
    fn probe(&self, vpn: u64, _kind: AccessKind) -> Option<u32> {
        self.find(vpn).map(|index| self.entries[index].frame)
    }

    fn lookup(&mut self, vpn: u64, _kind: AccessKind) -> Option<u32> {
        let index = self.find(vpn)?;
        // `index` is linked; the list always holds every entry index.
        let _ = self.order.move_to_back(index);
        Some(self.entries[index].frame)
    }

    fn insert(&mut self, vpn: u64, frame: u32, _kind: AccessKind) -> Result<()> {
        self.replace(vpn, frame)
    }

    fn flush(&mut self) {
        self.entries.fill(TlbEntry::default());
        self.order = EvictionList::new(self.entries.len());
    }

    fn dump(&self) -> Vec<TlbLineView> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, entry)| TlbLineView {
                level: TlbLevel::Unified,
                index,
                valid: entry.valid,
                tag: entry.vpn,
                frame: entry.frame,
            })
            .collect()
    }
}
