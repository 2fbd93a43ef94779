//! Test harness.
//!
//! Helpers shared by the unit suites:
//! - [`init_tracing`] routes crate logs to the test writer (filter with `RUST_LOG`).
//! - [`PageTables`] builds the four-level tables a walk expects in simulated memory.
//! - [`simulator`] assembles a simulator over prepared memory.

use std::collections::HashMap;
use std::sync::Once;

use tracing_subscriber::EnvFilter;
use vmsim_core::common::constants::{PAGE_SIZE, PTE_SIZE};
use vmsim_core::config::Config;
use vmsim_core::{Memory, Simulator, VirtAddr};

static TRACING: Once = Once::new();

/// Installs a fmt subscriber once per test binary.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Builds page tables in simulated memory.
///
/// The top-level table sits at byte 0. Intermediate tables are allocated on demand,
/// one page each, starting at `table_area`.
pub struct PageTables {
    memory: Memory,
    next_table: u32,
    links: HashMap<(u32, u16), u32>,
}

impl PageTables {
    /// Zeroed memory of `size` bytes; tables are allocated from `table_area` upwards.
    pub fn new(size: usize, table_area: u32) -> Self {
        Self {
            memory: Memory::new(size).expect("allocate test memory"),
            next_table: table_area,
            links: HashMap::new(),
        }
    }

    fn write_entry(&mut self, table: u32, index: u16, value: u32) {
        let offset = table as usize + usize::from(index) * PTE_SIZE;
        self.memory
            .load(offset, &value.to_le_bytes())
            .expect("page-table entry inside memory");
    }

    /// Maps the page containing `vaddr` to the page starting at byte `page_base`.
    pub fn map(&mut self, vaddr: VirtAddr, page_base: u32) {
        let [pgd, pud, pmd, pte] = vaddr.directory_indices();
        let mut table = 0;
        for index in [pgd, pud, pmd] {
            table = match self.links.get(&(table, index)) {
                Some(&next) => next,
                None => {
                    let next = self.next_table;
                    self.next_table += PAGE_SIZE as u32;
                    self.write_entry(table, index, next);
                    let _ = self.links.insert((table, index), next);
                    next
                }
            };
        }
        self.write_entry(table, pte, page_base);
    }

    /// Stores a little-endian word at a physical byte address.
    pub fn poke(&mut self, paddr: u32, value: u32) {
        self.memory
            .load(paddr as usize, &value.to_le_bytes())
            .expect("word inside memory");
    }

    /// Finishes building and returns the memory.
    pub fn into_memory(self) -> Memory {
        self.memory
    }
}

/// Builds a virtual address from its fields.
pub fn vaddr(pgd: u16, pud: u16, pmd: u16, pte: u16, offset: u16) -> VirtAddr {
    VirtAddr::new(pgd, pud, pmd, pte, offset).expect("fields within range")
}

/// A simulator over `memory` with the given configuration.
pub fn simulator(config: &Config, memory: Memory) -> Simulator {
    init_tracing();
    Simulator::new(config, memory).expect("valid configuration")
}
