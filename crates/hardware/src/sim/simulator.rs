//! Simulator: owns memory and every address-path array side-by-side.
//!
//! All state that a memory access mutates lives in one [`Simulator`], so a run is a
//! plain sequence of `&mut self` calls with no hidden globals. The simulator is not
//! reentrant: share it across threads only behind external synchronization.

use tracing::{debug, warn};

use crate::common::{MemoryAccess, PhysAddr, Result, VirtAddr};
use crate::config::Config;
use crate::core::access::{AccessResult, access};
use crate::core::units::cache::hierarchy::CacheHierarchy;
use crate::core::units::mmu::Mmu;
use crate::core::units::mmu::ptw::page_walk;
use crate::soc::memory::Memory;
use crate::stats::SimStats;

/// Top-level simulator: memory, MMU, caches and statistics.
#[derive(Debug)]
pub struct Simulator {
    memory: Memory,
    mmu: Mmu,
    caches: CacheHierarchy,
    stats: SimStats,
}

impl Simulator {
    /// Creates a simulator over `memory` with cold TLBs and caches.
    ///
    /// # Errors
    ///
    /// [`crate::common::Error::BadParameter`] if `config` is invalid.
    pub fn new(config: &Config, memory: Memory) -> Result<Self> {
        config.validate()?;
        let mmu = Mmu::new(&config.tlb)?;
        let caches = CacheHierarchy::new(&config.cache)?;
        debug!(memory_bytes = memory.as_bytes().len(), "simulator ready");
        Ok(Self {
            memory,
            mmu,
            caches,
            stats: SimStats::default(),
        })
    }

    /// Performs one memory access and accounts for it in the statistics.
    ///
    /// # Errors
    ///
    /// Propagates validation, translation and cache errors; see [`access`].
    pub fn access(&mut self, request: &MemoryAccess) -> Result<AccessResult> {
        match access(&mut self.memory, &mut self.mmu, &mut self.caches, request) {
            Ok(result) => {
                self.stats.record(request, &result);
                Ok(result)
            }
            Err(e) => {
                self.stats.record_failure();
                warn!(%request, error = %e, "access failed");
                Err(e)
            }
        }
    }

    /// Replays `requests` in order, stopping at the first failing access.
    ///
    /// # Errors
    ///
    /// The error of the first failing access; earlier accesses keep their effects.
    pub fn run(&mut self, requests: &[MemoryAccess]) -> Result<Vec<AccessResult>> {
        let results = requests
            .iter()
            .map(|request| self.access(request))
            .collect::<Result<Vec<_>>>()?;
        debug!(accesses = results.len(), "run complete");
        Ok(results)
    }

    /// Translates `vaddr` by walking the page tables, bypassing and leaving untouched
    /// the TLB and caches.
    ///
    /// # Errors
    ///
    /// [`crate::common::Error::OutOfBounds`] if the walk leaves memory.
    pub fn translate(&self, vaddr: &VirtAddr) -> Result<PhysAddr> {
        page_walk(&self.memory, vaddr)
    }

    /// Invalidates every TLB entry and every cache line. Memory is unchanged.
    pub fn flush(&mut self) {
        self.mmu.flush();
        self.caches.flush();
        debug!("TLB and caches flushed");
    }

    /// Simulated memory.
    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Mutable simulated memory, for loading data between accesses.
    ///
    /// Writes made here bypass the caches; call [`Self::flush`] if cached copies
    /// must not go stale.
    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    /// The MMU.
    pub fn mmu(&self) -> &Mmu {
        &self.mmu
    }

    /// The cache hierarchy.
    pub fn caches(&self) -> &CacheHierarchy {
        &self.caches
    }

    /// Statistics gathered since creation or the last [`Self::reset_stats`].
    pub fn stats(&self) -> &SimStats {
        &self.stats
    }

    /// Clears the statistics.
    pub fn reset_stats(&mut self) {
        self.stats = SimStats::default();
    }
}
