//! Set-Associative Cache Level.
//!
//! This module implements one physically addressed, set-associative cache array that
//! holds line data (not just tags). A single runtime-configured [`CacheLevel`] models the
//! L1 instruction, L1 data and unified L2 arrays; [`hierarchy::CacheHierarchy`] wires
//! three of them into an exclusive two-level hierarchy.
//!
//! Address decomposition for a level with `S` sets and 16-byte lines:
//!
//! ```text
//! set = (paddr / 16) mod S
//! tag = paddr >> (log2(S) + 4)
//! ```
//!
//! Replacement uses the aging policy in [`policies::aging`].

/// Exclusive two-level cache hierarchy (split L1, unified L2).
pub mod hierarchy;

/// Replacement policy implementations (aging, LRU eviction list).
pub mod policies;

use tracing::trace;

use self::policies::Aged;
use self::policies::aging;
use crate::common::constants::{LINE_BYTES, WORD_SIZE, WORDS_PER_LINE};
use crate::common::{Error, PhysAddr, Result};
use crate::config::CacheConfig;
use crate::soc::memory::Line;

/// One way of one set: validity, age, tag and the line's words.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct CacheEntry {
    valid: bool,
    age: u8,
    tag: u32,
    line: Line,
}

impl Aged for CacheEntry {
    fn is_valid(&self) -> bool {
        self.valid
    }

    fn age(&self) -> u8 {
        self.age
    }

    fn set_age(&mut self, age: u8) {
        self.age = age;
    }
}

/// Position of a resident line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Slot {
    /// Set (line) index.
    pub set: usize,
    /// Way within the set.
    pub way: usize,
}

/// A valid line pushed out of a level by a replacement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Evicted {
    /// Physical address of the first byte of the line.
    pub base: PhysAddr,
    /// The line's words.
    pub line: Line,
}

/// Snapshot of one way of one set, for dumping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CacheLineView {
    /// Way within the set.
    pub way: usize,
    /// Set (line) index.
    pub set: usize,
    /// Validity flag.
    pub valid: bool,
    /// Aging counter.
    pub age: u8,
    /// Tag bits.
    pub tag: u32,
    /// Line contents.
    pub words: Line,
}

/// A set-associative array of lines with aging replacement.
#[derive(Clone, Debug)]
pub struct CacheLevel {
    name: &'static str,
    ways: usize,
    sets: usize,
    offset_bits: u32,
    tag_shift: u32,
    entries: Vec<CacheEntry>,
}

impl CacheLevel {
    /// Creates an empty (all-invalid) level with the configured geometry.
    ///
    /// # Errors
    ///
    /// - [`Error::BadParameter`] if the geometry is invalid
    ///   (see [`CacheConfig::validate`]).
    /// - [`Error::Allocation`] if the host cannot reserve the array.
    pub fn new(name: &'static str, config: &CacheConfig) -> Result<Self> {
        config.validate(name)?;
        let count = config.sets * config.ways;
        let mut entries = Vec::new();
        entries
            .try_reserve_exact(count)
            .map_err(|_| Error::Allocation {
                bytes: count.saturating_mul(size_of::<CacheEntry>()),
            })?;
        entries.resize(count, CacheEntry::default());
        let offset_bits = LINE_BYTES.trailing_zeros();
        Ok(Self {
            name,
            ways: config.ways,
            sets: config.sets,
            offset_bits,
            tag_shift: offset_bits + config.sets.trailing_zeros(),
            entries,
        })
    }

    /// Name used in logs (`"L1I"`, `"L1D"`, `"L2"`).
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Associativity.
    pub fn ways(&self) -> usize {
        self.ways
    }

    /// Number of sets.
    pub fn sets(&self) -> usize {
        self.sets
    }

    /// Set index of the line holding `paddr`.
    pub fn set_index(&self, paddr: PhysAddr) -> usize {
        (paddr.val() as usize / LINE_BYTES) % self.sets
    }

    /// Tag of the line holding `paddr`.
    pub fn tag(&self, paddr: PhysAddr) -> u32 {
        paddr.val() >> self.tag_shift
    }

    /// Word index of `paddr` inside its line.
    pub fn word_index(paddr: PhysAddr) -> usize {
        (paddr.val() as usize / WORD_SIZE) % WORDS_PER_LINE
    }

    /// Address of the first byte of the line holding `paddr`.
    pub fn line_base(paddr: PhysAddr) -> PhysAddr {
        PhysAddr::from_u32(paddr.val() & !(LINE_BYTES as u32 - 1))
    }

    fn base_of(&self, tag: u32, set: usize) -> PhysAddr {
        PhysAddr::from_u32((tag << self.tag_shift) | ((set as u32) << self.offset_bits))
    }

    fn set(&self, set: usize) -> &[CacheEntry] {
        &self.entries[set * self.ways..(set + 1) * self.ways]
    }

    fn set_mut(&mut self, set: usize) -> &mut [CacheEntry] {
        let ways = self.ways;
        &mut self.entries[set * ways..(set + 1) * ways]
    }

    /// Locates the line holding `paddr` without touching ages.
    pub fn probe(&self, paddr: PhysAddr) -> Option<Slot> {
        let set = self.set_index(paddr);
        let tag = self.tag(paddr);
        self.set(set)
            .iter()
            .position(|entry| entry.valid && entry.tag == tag)
            .map(|way| Slot { set, way })
    }

    /// Returns `true` if the line holding `paddr` is resident. Does not touch ages.
    pub fn contains(&self, paddr: PhysAddr) -> bool {
        self.probe(paddr).is_some()
    }

    /// Looks up the line holding `paddr`; on a hit the set's ages are updated.
    pub fn lookup(&mut self, paddr: PhysAddr) -> Option<Slot> {
        let slot = self.probe(paddr)?;
        let set = self.set_mut(slot.set);
        let prior_age = set[slot.way].age;
        aging::touch(set, slot.way, prior_age);
        trace!(cache = self.name, set = slot.set, way = slot.way, "hit");
        Some(slot)
    }

    /// Words of a resident line.
    pub fn line(&self, slot: Slot) -> &Line {
        &self.entries[slot.set * self.ways + slot.way].line
    }

    /// Overwrites one word of a resident line.
    pub fn write_word(&mut self, slot: Slot, word_index: usize, value: u32) {
        let ways = self.ways;
        self.entries[slot.set * ways + slot.way].line[word_index] = value;
    }

    /// Drops a resident line from this level and returns its words.
    pub fn invalidate(&mut self, slot: Slot) -> Line {
        let ways = self.ways;
        let entry = &mut self.entries[slot.set * ways + slot.way];
        entry.valid = false;
        entry.line
    }

    /// Installs `line` as the line holding `paddr`.
    ///
    /// An invalid way is filled first. Otherwise the oldest way is replaced and its
    /// previous contents are returned so the caller can demote them.
    pub fn install(&mut self, paddr: PhysAddr, line: Line) -> Option<Evicted> {
        let set_index = self.set_index(paddr);
        let entry = CacheEntry {
            valid: true,
            age: 0,
            tag: self.tag(paddr),
            line,
        };
        let name = self.name;
        let set = self.set_mut(set_index);

        if let Some(way) = aging::free_way(set) {
            set[way] = entry;
            aging::fill(set, way);
            trace!(cache = name, set = set_index, way, "cold fill");
            return None;
        }

        let way = aging::victim(set);
        let old = std::mem::replace(&mut set[way], entry);
        aging::replace(set, way);
        let evicted = Evicted {
            base: self.base_of(old.tag, set_index),
            line: old.line,
        };
        trace!(cache = name, set = set_index, way, victim = %evicted.base, "evict");
        Some(evicted)
    }

    /// Invalidates every line and clears all ages and tags.
    pub fn flush(&mut self) {
        self.entries.fill(CacheEntry::default());
    }

    /// Iterates over every way of every set, set-major.
    pub fn lines(&self) -> impl Iterator<Item = CacheLineView> + '_ {
        self.entries.iter().enumerate().map(|(i, entry)| CacheLineView {
            way: i % self.ways,
            set: i / self.ways,
            valid: entry.valid,
            age: entry.age,
            tag: entry.tag,
            words: entry.line,
        })
    }
}
