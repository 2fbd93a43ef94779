//! Fully Associative TLB Tests.
//!
//! Verifies the fully associative organization and the MMU front end:
//! - Miss, walk and install; hit without walking
//! - Exact LRU replacement through the eviction list
//! - Failed walks leave the TLB untouched
//! - Flushing and dumping

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use vmsim_core::common::{AccessKind, Error, VirtAddr};
use vmsim_core::config::{TlbConfig, TlbOrganization};
use vmsim_core::core::units::mmu::tlb::FullyAssociativeTlb;
use vmsim_core::core::units::mmu::{Mmu, TlbLevel, TranslationCache};
use vmsim_core::soc::memory::Memory;

use crate::common::harness::{PageTables, vaddr};

// ══════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════

/// Virtual address of page `n` (page number `n`).
fn page(n: u16, offset: u16) -> VirtAddr {
    vaddr(0, 0, 0, n, offset)
}

/// Frame that page `n` maps to.
fn frame_of(n: u16) -> u32 {
    0x100 + u32::from(n)
}

/// Memory mapping pages `0..count` to frames `0x100..`.
fn mapped(count: u16) -> Memory {
    let mut tables = PageTables::new(0x4000, 0x1000);
    for n in 0..count {
        tables.map(page(n, 0), frame_of(n) << 12);
    }
    tables.into_memory()
}

// ══════════════════════════════════════════════════════════
// 1. Lookup and service
// ══════════════════════════════════════════════════════════

#[test]
fn empty_tlb_misses() {
    let mut tlb = FullyAssociativeTlb::new(4).unwrap();
    assert_eq!(tlb.lookup(0, AccessKind::Data), None);
    assert_eq!(tlb.len(), 4);
    assert!(!tlb.is_empty());
}

/// The first translation walks; the second is served by the TLB.
#[test]
fn service_miss_then_hit() {
    let memory = mapped(4);
    let mut tlb = FullyAssociativeTlb::new(4).unwrap();
    let va = page(2, 0x3A8);

    let first = tlb.service(&memory, &va, AccessKind::Data).unwrap();
    assert!(!first.hit);
    assert_eq!(first.paddr.frame(), frame_of(2));
    assert_eq!(first.paddr.page_offset(), 0x3A8);

    let second = tlb.service(&memory, &va, AccessKind::Instruction).unwrap();
    assert!(second.hit);
    assert_eq!(second.paddr, first.paddr);
    assert_eq!(tlb.lookup(va.page_number(), AccessKind::Data), Some(frame_of(2)));
}

/// The victim slot is the front of the list; it moves to the back once filled.
#[test]
fn install_uses_front_slot() {
    let memory = mapped(2);
    let mut tlb = FullyAssociativeTlb::new(3).unwrap();
    assert_eq!(tlb.replacement_order(), vec![0, 1, 2]);

    let _ = tlb.service(&memory, &page(0, 0), AccessKind::Data).unwrap();
    assert_eq!(tlb.replacement_order(), vec![1, 2, 0]);
    let _ = tlb.service(&memory, &page(1, 0), AccessKind::Data).unwrap();
    assert_eq!(tlb.replacement_order(), vec![2, 0, 1]);

    let _ = tlb.lookup(0, AccessKind::Data).unwrap();
    assert_eq!(tlb.replacement_order(), vec![2, 1, 0]);
}

// ══════════════════════════════════════════════════════════
// 2. LRU replacement
// ══════════════════════════════════════════════════════════

/// The least recently used translation is the one replaced.
#[test]
fn lru_translation_evicted() {
    let memory = mapped(5);
    let mut tlb = FullyAssociativeTlb::new(4).unwrap();
    for n in 0..4 {
        let _ = tlb.service(&memory, &page(n, 0), AccessKind::Data).unwrap();
    }
    assert_eq!(tlb.lookup(0, AccessKind::Data), Some(frame_of(0)));

    let miss = tlb.service(&memory, &page(4, 0), AccessKind::Data).unwrap();
    assert!(!miss.hit);
    assert_eq!(tlb.lookup(1, AccessKind::Data), None);
    for n in [0, 2, 3, 4] {
        assert_eq!(tlb.lookup(u64::from(n), AccessKind::Data), Some(frame_of(n)));
    }
}

proptest! {
    /// Hits and misses match an exact LRU model of the same capacity.
    #[test]
    fn matches_lru_model(pages in proptest::collection::vec(0u16..12, 1..100)) {
        let memory = mapped(12);
        let mut tlb = FullyAssociativeTlb::new(8).unwrap();
        let mut model: Vec<u16> = Vec::new();
        for n in pages {
            let expected_hit = model.contains(&n);
            model.retain(|&m| m != n);
            if !expected_hit && model.len() == 8 {
                let _ = model.remove(0);
            }
            model.push(n);

            let translation = tlb.service(&memory, &page(n, 0), AccessKind::Data).unwrap();
            prop_assert_eq!(translation.hit, expected_hit);
            prop_assert_eq!(translation.paddr.frame(), frame_of(n));
        }
    }
}

// ══════════════════════════════════════════════════════════
// 3. Failure, flush and dump
// ══════════════════════════════════════════════════════════

/// A walk that leaves memory installs nothing and keeps the LRU order.
#[test]
fn failed_walk_leaves_tlb_untouched() {
    let memory = Memory::new(0x100).unwrap();
    let mut tlb = FullyAssociativeTlb::new(4).unwrap();
    let before = tlb.dump();

    let err = tlb
        .service(&memory, &vaddr(200, 0, 0, 0, 0), AccessKind::Data)
        .unwrap_err();
    assert!(matches!(err, Error::OutOfBounds { .. }));
    assert_eq!(tlb.dump(), before);
    assert_eq!(tlb.replacement_order(), vec![0, 1, 2, 3]);
}

#[test]
fn flush_forgets_translations() {
    let memory = mapped(2);
    let mut tlb = FullyAssociativeTlb::new(4).unwrap();
    let _ = tlb.service(&memory, &page(1, 0), AccessKind::Data).unwrap();
    tlb.flush();
    assert_eq!(tlb.lookup(1, AccessKind::Data), None);
    assert!(tlb.dump().iter().all(|line| !line.valid));
    assert_eq!(tlb.replacement_order(), vec![0, 1, 2, 3]);
}

/// Dumped entries carry the full page number as tag.
#[test]
fn dump_shows_full_vpn() {
    let memory = mapped(4);
    let mut tlb = FullyAssociativeTlb::new(2).unwrap();
    let _ = tlb.service(&memory, &page(3, 0), AccessKind::Data).unwrap();
    let lines = tlb.dump();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].level, TlbLevel::Unified);
    assert!(lines[0].valid);
    assert_eq!(lines[0].tag, 3);
    assert_eq!(lines[0].frame, frame_of(3));
    assert!(!lines[1].valid);
    assert_eq!(
        lines[0].to_string(),
        "TLB #0   V: 1 TAG: 0x000000003 PPN: 0x00103"
    );
}

#[test]
fn zero_entries_rejected() {
    assert!(matches!(
        FullyAssociativeTlb::new(0),
        Err(Error::BadParameter(_))
    ));
}

// ══════════════════════════════════════════════════════════
// 4. MMU front end
// ══════════════════════════════════════════════════════════

#[test]
fn mmu_builds_configured_organization() {
    let fully = Mmu::new(&TlbConfig::default()).unwrap();
    assert_eq!(fully.organization(), TlbOrganization::FullyAssociative);
    assert_eq!(fully.dump().len(), 128);

    let hierarchical = Mmu::new(&TlbConfig {
        organization: TlbOrganization::Hierarchical,
        ..TlbConfig::default()
    })
    .unwrap();
    assert_eq!(hierarchical.organization(), TlbOrganization::Hierarchical);
    assert_eq!(hierarchical.dump().len(), 16 + 16 + 64);
}

#[test]
fn mmu_translates_and_flushes() {
    let memory = mapped(3);
    let mut mmu = Mmu::new(&TlbConfig::default()).unwrap();
    let va = page(2, 0x10);
    assert!(!mmu.translate(&memory, &va, AccessKind::Data).unwrap().hit);
    assert_eq!(mmu.lookup(2, AccessKind::Data), Some(frame_of(2)));
    mmu.flush();
    assert_eq!(mmu.lookup(2, AccessKind::Data), None);
}

fn reject(_: vmsim_core::common::PhysAddr) -> vmsim_core::Result<()> {
    Err(Error::BadParameter("rejected".to_string()))
}

/// A rejected miss installs nothing.
#[test]
fn checked_miss_rejection_installs_nothing() {
    let memory = mapped(3);
    let mut mmu = Mmu::new(&TlbConfig::default()).unwrap();
    let before = mmu.dump();
    let result = mmu.translate_checked(&memory, &page(2, 0x10), AccessKind::Data, reject);
    assert!(matches!(result, Err(Error::BadParameter(_))));
    assert_eq!(mmu.dump(), before);
}

/// A rejected hit leaves the replacement order alone, so the untouched
/// translation is still the next victim.
#[test]
fn checked_hit_rejection_keeps_lru_order() {
    let memory = mapped(3);
    let mut mmu = Mmu::new(&TlbConfig {
        entries: 2,
        ..TlbConfig::default()
    })
    .unwrap();
    let _ = mmu.translate(&memory, &page(0, 0), AccessKind::Data).unwrap();
    let _ = mmu.translate(&memory, &page(1, 0), AccessKind::Data).unwrap();

    let result = mmu.translate_checked(&memory, &page(0, 0x4), AccessKind::Data, reject);
    assert!(matches!(result, Err(Error::BadParameter(_))));

    let _ = mmu.translate(&memory, &page(2, 0), AccessKind::Data).unwrap();
    assert_eq!(mmu.lookup(0, AccessKind::Data), None);
    assert_eq!(mmu.lookup(1, AccessKind::Data), Some(frame_of(1)));
}

/// An accepted translation behaves like an unchecked one.
#[test]
fn checked_translation_installs_on_accept() {
    let memory = mapped(3);
    let mut mmu = Mmu::new(&TlbConfig::default()).unwrap();
    let va = page(1, 0x24);
    let cold = mmu
        .translate_checked(&memory, &va, AccessKind::Data, |_| Ok(()))
        .unwrap();
    assert!(!cold.hit);
    assert_eq!(cold.paddr.val(), (frame_of(1) << 12) | 0x24);
    let warm = mmu
        .translate_checked(&memory, &va, AccessKind::Data, |_| Ok(()))
        .unwrap();
    assert!(warm.hit);
    assert_eq!(warm.paddr, cold.paddr);
}
