//! Cache Level Tests.
//!
//! Verifies one set-associative level in isolation:
//! - Physical address decomposition (set, tag, word, line base)
//! - Hit and cold-fill bookkeeping
//! - Replacement and eviction reporting
//! - Geometry validation

use pretty_assertions::assert_eq;
use rstest::rstest;
use vmsim_core::common::{Error, PhysAddr};
use vmsim_core::config::CacheConfig;
use vmsim_core::core::units::cache::{CacheLevel, Evicted};

// ══════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════

fn level(ways: usize, sets: usize) -> CacheLevel {
    CacheLevel::new("test", &CacheConfig { ways, sets }).unwrap()
}

fn pa(raw: u32) -> PhysAddr {
    PhysAddr::from_u32(raw)
}

fn line(seed: u32) -> [u32; 4] {
    [seed, seed + 1, seed + 2, seed + 3]
}

/// Ages of every way of `set`, in way order.
fn ages(cache: &CacheLevel, set: usize) -> Vec<u8> {
    cache
        .lines()
        .filter(|view| view.set == set)
        .map(|view| view.age)
        .collect()
}

// ══════════════════════════════════════════════════════════
// 1. Address decomposition
// ══════════════════════════════════════════════════════════

/// With 64 sets of 16-byte lines the tag starts at bit 10.
#[test]
fn decomposition_l1_geometry() {
    let cache = level(4, 64);
    assert_eq!(cache.set_index(pa(0x1234)), 35);
    assert_eq!(cache.tag(pa(0x1234)), 4);
    assert_eq!(CacheLevel::word_index(pa(0x1238)), 2);
    assert_eq!(CacheLevel::line_base(pa(0x123F)), pa(0x1230));
}

/// With 512 sets the tag starts at bit 13.
#[test]
fn decomposition_l2_geometry() {
    let cache = level(8, 512);
    assert_eq!(cache.set_index(pa(0x0001_2340)), 0x34);
    assert_eq!(cache.tag(pa(0x0001_2340)), 0x9);
    assert_eq!(cache.ways(), 8);
    assert_eq!(cache.sets(), 512);
}

// ══════════════════════════════════════════════════════════
// 2. Hits and cold fills
// ══════════════════════════════════════════════════════════

#[test]
fn empty_level_misses() {
    let mut cache = level(4, 64);
    assert_eq!(cache.lookup(pa(0x100)), None);
    assert!(cache.lines().all(|view| !view.valid));
}

/// An installed line is found by any address inside it.
#[test]
fn install_then_hit_anywhere_in_line() {
    let mut cache = level(4, 64);
    assert_eq!(cache.install(pa(0x1230), line(7)), None);
    for offset in [0x1230, 0x1234, 0x1238, 0x123C] {
        let slot = cache.lookup(pa(offset)).unwrap();
        assert_eq!(cache.line(slot), &line(7));
    }
    assert_eq!(cache.lookup(pa(0x1240)), None);
}

/// Probing does not disturb the ages; a lookup does.
#[test]
fn probe_is_side_effect_free() {
    let mut cache = level(4, 4);
    for (i, base) in [0x00, 0x40, 0x80].into_iter().enumerate() {
        assert_eq!(cache.install(pa(base), line(i as u32)), None);
    }
    assert_eq!(ages(&cache, 0), vec![2, 1, 0, 3]);

    assert!(cache.probe(pa(0x00)).is_some());
    assert!(cache.contains(pa(0x40)));
    assert_eq!(ages(&cache, 0), vec![2, 1, 0, 3]);

    let _ = cache.lookup(pa(0x00)).unwrap();
    assert_eq!(ages(&cache, 0), vec![0, 2, 1, 3]);
}

// ══════════════════════════════════════════════════════════
// 3. Replacement
// ══════════════════════════════════════════════════════════

/// A full set gives up its oldest line and reports it for demotion.
#[test]
fn full_set_evicts_oldest() {
    let mut cache = level(2, 4);
    assert_eq!(cache.install(pa(0x000), line(0x10)), None);
    assert_eq!(cache.install(pa(0x040), line(0x20)), None);

    let evicted = cache.install(pa(0x080), line(0x30));
    assert_eq!(
        evicted,
        Some(Evicted {
            base: pa(0x000),
            line: line(0x10),
        })
    );
    assert!(!cache.contains(pa(0x000)));
    assert!(cache.contains(pa(0x040)));
    assert!(cache.contains(pa(0x080)));
    assert_eq!(ages(&cache, 0), vec![0, 0]);
}

/// Replacing the oldest way leaves the other ages as they were.
#[test]
fn replacement_keeps_other_ages() {
    let mut cache = level(4, 4);
    for (i, base) in [0x000, 0x040, 0x080, 0x0C0].into_iter().enumerate() {
        assert_eq!(cache.install(pa(base), line(i as u32)), None);
    }
    assert_eq!(ages(&cache, 0), vec![3, 2, 1, 0]);

    let evicted = cache.install(pa(0x100), line(4)).unwrap();
    assert_eq!(evicted.base, pa(0x000));
    assert_eq!(ages(&cache, 0), vec![0, 2, 1, 0]);

    let evicted = cache.install(pa(0x140), line(5)).unwrap();
    assert_eq!(evicted.base, pa(0x040));
    assert_eq!(ages(&cache, 0), vec![0, 0, 1, 0]);
}

/// The rebuilt victim address keeps its set bits.
#[test]
fn evicted_base_reconstructs_set() {
    let mut cache = level(1, 64);
    assert_eq!(cache.install(pa(0x0001_2350), line(1)), None);
    let evicted = cache.install(pa(0x0002_2350), line(2)).unwrap();
    assert_eq!(evicted.base, pa(0x0001_2350));
}

/// A recently hit line survives the next replacement.
#[test]
fn hit_protects_line_from_eviction() {
    let mut cache = level(2, 4);
    assert_eq!(cache.install(pa(0x000), line(0)), None);
    assert_eq!(cache.install(pa(0x040), line(1)), None);
    let _ = cache.lookup(pa(0x000)).unwrap();

    let evicted = cache.install(pa(0x080), line(2)).unwrap();
    assert_eq!(evicted.base, pa(0x040));
    assert!(cache.contains(pa(0x000)));
}

// ══════════════════════════════════════════════════════════
// 4. Line maintenance
// ══════════════════════════════════════════════════════════

#[test]
fn write_word_and_invalidate() {
    let mut cache = level(4, 64);
    assert_eq!(cache.install(pa(0x200), line(0)), None);
    let slot = cache.probe(pa(0x208)).unwrap();
    cache.write_word(slot, CacheLevel::word_index(pa(0x208)), 0xCAFE);
    assert_eq!(cache.line(slot), &[0, 1, 0xCAFE, 3]);

    assert_eq!(cache.invalidate(slot), [0, 1, 0xCAFE, 3]);
    assert!(!cache.contains(pa(0x200)));
}

#[test]
fn flush_invalidates_everything() {
    let mut cache = level(2, 4);
    for base in [0x00, 0x10, 0x20, 0x40] {
        let _ = cache.install(pa(base), line(base));
    }
    cache.flush();
    assert!(cache.lines().all(|view| !view.valid && view.age == 0));
    assert_eq!(cache.lines().count(), 8);
}

/// Views are set-major, way-minor.
#[test]
fn lines_view_order() {
    let cache = level(2, 4);
    let order: Vec<_> = cache.lines().map(|view| (view.set, view.way)).collect();
    assert_eq!(
        order,
        vec![(0, 0), (0, 1), (1, 0), (1, 1), (2, 0), (2, 1), (3, 0), (3, 1)]
    );
}

// ══════════════════════════════════════════════════════════
// 5. Geometry validation
// ══════════════════════════════════════════════════════════

#[rstest]
#[case(0, 64)]
#[case(256, 64)]
#[case(4, 0)]
#[case(4, 48)]
#[case(4, 1 << 28)]
#[case(255, 1 << 27)]
#[case(2, 1 << 24)]
fn invalid_geometry_rejected(#[case] ways: usize, #[case] sets: usize) {
    let result = CacheLevel::new("bad", &CacheConfig { ways, sets });
    assert!(matches!(result, Err(Error::BadParameter(_))));
}

#[rstest]
#[case(1, 1)]
#[case(255, 2)]
#[case(8, 512)]
fn valid_geometry_accepted(#[case] ways: usize, #[case] sets: usize) {
    let cache = CacheLevel::new("ok", &CacheConfig { ways, sets }).unwrap();
    assert_eq!(cache.lines().count(), ways * sets);
    assert_eq!(cache.name(), "ok");
}
