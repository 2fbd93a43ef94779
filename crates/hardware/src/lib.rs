//! Virtual-memory address path simulator library.
//!
//! This crate models how a paged virtual-memory CPU turns a virtual address into the
//! value stored at the matching physical location:
//! 1. **Addresses:** Bit-exact codec for 49-bit virtual and 32-bit physical addresses.
//! 2. **Translation:** A four-level page table walker and two TLB organizations
//!    (fully associative with LRU, or split direct-mapped L1 over a unified L2).
//! 3. **Caching:** Split L1 instruction/data caches over a unified L2, exclusive,
//!    write-through and write-allocate, with aging replacement.
//! 4. **Memory:** Flat little-endian simulated physical memory, loadable from a dump.
//! 5. **Simulation:** Configuration, the access pipeline and statistics collection.
//!
//! # Examples
//!
//! ```
//! use vmsim_core::{Config, Memory, MemoryAccess, Simulator, VirtAddr};
//!
//! // Page tables at 0x0000, 0x1000, 0x2000 and 0x3000 map virtual page 0 to the
//! // page at 0x4000.
//! let mut memory = Memory::new(0x5000).unwrap();
//! for (table, next) in [(0x0000, 0x1000u32), (0x1000, 0x2000), (0x2000, 0x3000), (0x3000, 0x4000)] {
//!     memory.load(table, &next.to_le_bytes()).unwrap();
//! }
//! memory.load(0x4008, &0xDEAD_BEEFu32.to_le_bytes()).unwrap();
//!
//! let mut sim = Simulator::new(&Config::default(), memory).unwrap();
//! let vaddr = VirtAddr::from_u64(0x8).unwrap();
//! let first = sim.access(&MemoryAccess::fetch(vaddr)).unwrap();
//! assert_eq!(first.value, Some(0xDEAD_BEEF));
//! assert!(!first.tlb_hit);
//!
//! let second = sim.access(&MemoryAccess::fetch(vaddr)).unwrap();
//! assert!(second.tlb_hit);
//! ```

/// Common types and constants (addresses, access records, errors).
pub mod common;
/// Simulator configuration (defaults, TLB organization, cache geometry).
pub mod config;
/// Address-path core (MMU, caches, access pipeline).
pub mod core;
/// Simulation driver.
pub mod sim;
/// Simulated physical memory.
pub mod soc;
/// Simulation statistics collection and reporting.
pub mod stats;

/// Address types; decode with `VirtAddr::from_u64`, `PhysAddr::from_u32`.
pub use crate::common::{PhysAddr, VirtAddr};
/// Access records and the crate error type.
pub use crate::common::{AccessKind, AccessSize, Error, MemoryAccess, MemoryOp, Result};
/// Root configuration type; use `Config::default()` or `Config::from_json`.
pub use crate::config::Config;
/// Outcome of one access.
pub use crate::core::AccessResult;
/// Top-level simulator; construct with `Simulator::new`.
pub use crate::sim::Simulator;
/// Simulated memory.
pub use crate::soc::{Memory, PhysicalMemory};
/// Run statistics.
pub use crate::stats::SimStats;
