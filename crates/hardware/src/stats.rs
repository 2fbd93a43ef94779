//! Simulation statistics collection and reporting.
//!
//! This module tracks what the address path did over a run. It provides:
//! 1. **Traffic:** Accesses by operation (read, write) and by kind (instruction, data).
//! 2. **Translation:** TLB hits and misses (page walks).
//! 3. **Cache hierarchy:** Where each access was served: L1, L2 or main memory.
//!
//! Statistics serialize with `serde` for machine-readable reports.

use std::fmt;

use serde::Serialize;

use crate::common::{AccessKind, Error, MemoryAccess, MemoryOp, Result};
use crate::core::access::AccessResult;
use crate::core::units::cache::hierarchy::HitLevel;

/// Counters for one simulation run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SimStats {
    /// Accesses completed successfully.
    pub accesses: u64,
    /// Accesses rejected with an error.
    pub failed_accesses: u64,

    /// Read accesses (fetches and loads).
    pub reads: u64,
    /// Write accesses.
    pub writes: u64,
    /// Instruction-side accesses.
    pub instruction_accesses: u64,
    /// Data-side accesses.
    pub data_accesses: u64,

    /// Translations served by a TLB.
    pub tlb_hits: u64,
    /// Translations that needed a page walk.
    pub tlb_misses: u64,

    /// Accesses served by the L1 instruction cache.
    pub l1i_hits: u64,
    /// Accesses served by the L1 data cache.
    pub l1d_hits: u64,
    /// Accesses served by the L2 cache.
    pub l2_hits: u64,
    /// Accesses that missed both levels and filled from memory.
    pub memory_fills: u64,
}

#[allow(clippy::cast_precision_loss)]
fn percent(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * part as f64 / total as f64
    }
}

impl SimStats {
    /// Accounts for one completed access.
    pub fn record(&mut self, request: &MemoryAccess, result: &AccessResult) {
        self.accesses += 1;
        match request.op {
            MemoryOp::Read => self.reads += 1,
            MemoryOp::Write(_) => self.writes += 1,
        }
        match request.kind {
            AccessKind::Instruction => self.instruction_accesses += 1,
            AccessKind::Data => self.data_accesses += 1,
        }
        if result.tlb_hit {
            self.tlb_hits += 1;
        } else {
            self.tlb_misses += 1;
        }
        match (result.level, request.kind) {
            (HitLevel::L1, AccessKind::Instruction) => self.l1i_hits += 1,
            (HitLevel::L1, AccessKind::Data) => self.l1d_hits += 1,
            (HitLevel::L2, _) => self.l2_hits += 1,
            (HitLevel::Memory, _) => self.memory_fills += 1,
        }
    }

    /// Accounts for one rejected access.
    pub fn record_failure(&mut self) {
        self.failed_accesses += 1;
    }

    /// Percentage of translations served by a TLB.
    pub fn tlb_hit_rate(&self) -> f64 {
        percent(self.tlb_hits, self.tlb_hits + self.tlb_misses)
    }

    /// Percentage of accesses served by either L1.
    pub fn l1_hit_rate(&self) -> f64 {
        percent(self.l1i_hits + self.l1d_hits, self.accesses)
    }

    /// Renders the counters as a JSON object.
    ///
    /// # Errors
    ///
    /// [`Error::BadParameter`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| Error::BadParameter(format!("cannot serialize statistics: {e}")))
    }
}

impl fmt::Display for SimStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "==========================================================")?;
        writeln!(f, "ADDRESS PATH STATISTICS")?;
        writeln!(f, "==========================================================")?;
        writeln!(f, "accesses                 {}", self.accesses)?;
        writeln!(f, "accesses.failed          {}", self.failed_accesses)?;
        writeln!(f, "op.read                  {}", self.reads)?;
        writeln!(f, "op.write                 {}", self.writes)?;
        writeln!(f, "kind.instruction         {}", self.instruction_accesses)?;
        writeln!(f, "kind.data                {}", self.data_accesses)?;
        writeln!(f, "----------------------------------------------------------")?;
        writeln!(f, "TRANSLATION")?;
        writeln!(
            f,
            "  tlb.hits               {} ({:.2}%)",
            self.tlb_hits,
            self.tlb_hit_rate()
        )?;
        writeln!(f, "  tlb.misses             {}", self.tlb_misses)?;
        writeln!(f, "----------------------------------------------------------")?;
        writeln!(f, "MEMORY HIERARCHY")?;
        writeln!(f, "  L1-I hits              {}", self.l1i_hits)?;
        writeln!(f, "  L1-D hits              {}", self.l1d_hits)?;
        writeln!(
            f,
            "  L2 hits                {} ({:.2}%)",
            self.l2_hits,
            percent(self.l2_hits, self.accesses)
        )?;
        writeln!(
            f,
            "  memory fills           {} ({:.2}%)",
            self.memory_fills,
            percent(self.memory_fills, self.accesses)
        )?;
        write!(f, "==========================================================")
    }
}
