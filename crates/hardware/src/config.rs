//! Configuration system for the address-path model.
//!
//! This module defines the configuration structures used to size the translation and
//! cache arrays. It provides:
//! 1. **Defaults:** The baseline geometry (128-entry TLB, 4-way 64-set L1s, 8-way 512-set L2).
//! 2. **Structures:** TLB and cache hierarchy configuration.
//! 3. **Validation:** Geometry checks shared by every array constructor.
//!
//! Configuration is deserialized from JSON or built with `Config::default()`.

use serde::Deserialize;

use crate::common::constants::LINE_BYTES;
use crate::common::{Error, Result};

/// Default configuration constants.
mod defaults {
    /// Entries of the fully associative TLB.
    pub const TLB_ENTRIES: usize = 128;

    /// Lines of each direct-mapped first-level TLB (ITLB and DTLB).
    pub const TLB_L1_LINES: usize = 16;

    /// Lines of the direct-mapped second-level TLB.
    pub const TLB_L2_LINES: usize = 64;

    /// Associativity of each L1 cache.
    pub const L1_WAYS: usize = 4;

    /// Sets of each L1 cache (4 KiB with 16-byte lines and 4 ways).
    pub const L1_SETS: usize = 64;

    /// Associativity of the L2 cache.
    pub const L2_WAYS: usize = 8;

    /// Sets of the L2 cache (64 KiB with 16-byte lines and 8 ways).
    pub const L2_SETS: usize = 512;

    /// Upper bound on `ways * sets` for one cache array (256 MiB of line data).
    pub const MAX_CACHE_LINES: usize = 1 << 24;
}

fn require_power_of_two(what: &str, value: usize) -> Result<()> {
    if value.is_power_of_two() {
        Ok(())
    } else {
        Err(Error::BadParameter(format!(
            "{what} must be a non-zero power of two, got {value}"
        )))
    }
}

/// Organization of the translation cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum TlbOrganization {
    /// One fully associative array replaced in exact LRU order.
    #[default]
    FullyAssociative,
    /// Direct-mapped ITLB and DTLB backed by a direct-mapped unified L2 TLB.
    Hierarchical,
}

/// Translation cache configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct TlbConfig {
    /// Which organization to build.
    #[serde(default)]
    pub organization: TlbOrganization,
    /// Entries of the fully associative TLB.
    #[serde(default = "TlbConfig::default_entries")]
    pub entries: usize,
    /// Lines of each first-level TLB (hierarchical organization).
    #[serde(default = "TlbConfig::default_l1_lines")]
    pub l1_lines: usize,
    /// Lines of the second-level TLB (hierarchical organization).
    #[serde(default = "TlbConfig::default_l2_lines")]
    pub l2_lines: usize,
}

impl TlbConfig {
    fn default_entries() -> usize {
        defaults::TLB_ENTRIES
    }

    fn default_l1_lines() -> usize {
        defaults::TLB_L1_LINES
    }

    fn default_l2_lines() -> usize {
        defaults::TLB_L2_LINES
    }

    /// Checks the geometry of the selected organization.
    ///
    /// # Errors
    ///
    /// [`Error::BadParameter`] if the fully associative TLB is empty, or a
    /// direct-mapped line count is not a power of two.
    pub fn validate(&self) -> Result<()> {
        match self.organization {
            TlbOrganization::FullyAssociative => self.validate_entries(),
            TlbOrganization::Hierarchical => self.validate_lines(),
        }
    }

    /// Checks the size of the fully associative array.
    ///
    /// # Errors
    ///
    /// [`Error::BadParameter`] if `entries` is zero.
    pub fn validate_entries(&self) -> Result<()> {
        if self.entries == 0 {
            return Err(Error::BadParameter(
                "fully associative TLB needs at least one entry".to_string(),
            ));
        }
        Ok(())
    }

    /// Checks the line counts of the direct-mapped arrays.
    ///
    /// # Errors
    ///
    /// [`Error::BadParameter`] if `l1_lines` or `l2_lines` is not a power of two.
    pub fn validate_lines(&self) -> Result<()> {
        require_power_of_two("L1 TLB lines", self.l1_lines)?;
        require_power_of_two("L2 TLB lines", self.l2_lines)
    }
}

impl Default for TlbConfig {
    fn default() -> Self {
        Self {
            organization: TlbOrganization::default(),
            entries: defaults::TLB_ENTRIES,
            l1_lines: defaults::TLB_L1_LINES,
            l2_lines: defaults::TLB_L2_LINES,
        }
    }
}

/// Geometry of one cache array. Lines are always four 32-bit words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CacheConfig {
    /// Associativity (1-255).
    pub ways: usize,
    /// Number of sets (a power of two).
    pub sets: usize,
}

impl CacheConfig {
    /// Checks that the geometry can be decoded from a 32-bit physical address.
    ///
    /// # Errors
    ///
    /// [`Error::BadParameter`] if `ways` is outside 1-255, `sets` is not a power of two,
    /// the set index would leave no tag bits, or the array would hold more than
    /// 2^24 lines.
    pub fn validate(&self, name: &str) -> Result<()> {
        if self.ways == 0 || self.ways > usize::from(u8::MAX) {
            return Err(Error::BadParameter(format!(
                "{name}: ways must be in 1..=255, got {}",
                self.ways
            )));
        }
        require_power_of_two(&format!("{name} sets"), self.sets)?;
        let tag_shift = LINE_BYTES.trailing_zeros() + self.sets.trailing_zeros();
        if tag_shift >= u32::BITS {
            return Err(Error::BadParameter(format!(
                "{name}: {} sets leave no tag bits in a 32-bit physical address",
                self.sets
            )));
        }
        if self.ways * self.sets > defaults::MAX_CACHE_LINES {
            return Err(Error::BadParameter(format!(
                "{name}: {} ways x {} sets exceeds {} lines",
                self.ways,
                self.sets,
                defaults::MAX_CACHE_LINES
            )));
        }
        Ok(())
    }
}

/// Configuration of the three cache arrays.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheHierarchyConfig {
    /// L1 instruction cache.
    #[serde(default = "CacheHierarchyConfig::default_l1")]
    pub l1_i: CacheConfig,
    /// L1 data cache.
    #[serde(default = "CacheHierarchyConfig::default_l1")]
    pub l1_d: CacheConfig,
    /// Unified L2 cache.
    #[serde(default = "CacheHierarchyConfig::default_l2")]
    pub l2: CacheConfig,
}

impl CacheHierarchyConfig {
    fn default_l1() -> CacheConfig {
        CacheConfig {
            ways: defaults::L1_WAYS,
            sets: defaults::L1_SETS,
        }
    }

    fn default_l2() -> CacheConfig {
        CacheConfig {
            ways: defaults::L2_WAYS,
            sets: defaults::L2_SETS,
        }
    }
}

impl Default for CacheHierarchyConfig {
    fn default() -> Self {
        Self {
            l1_i: Self::default_l1(),
            l1_d: Self::default_l1(),
            l2: Self::default_l2(),
        }
    }
}

/// Root configuration structure.
///
/// # Examples
///
/// ```
/// use vmsim_core::config::{Config, TlbOrganization};
///
/// let config = Config::default();
/// assert_eq!(config.tlb.organization, TlbOrganization::FullyAssociative);
/// assert_eq!(config.cache.l2.ways, 8);
/// ```
///
/// Deserializing from JSON; omitted sections keep their defaults:
///
/// ```
/// use vmsim_core::config::{Config, TlbOrganization};
///
/// let json = r#"{
///     "tlb": { "organization": "Hierarchical", "l1_lines": 16, "l2_lines": 64 },
///     "cache": { "l1_d": { "ways": 2, "sets": 32 } }
/// }"#;
///
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.tlb.organization, TlbOrganization::Hierarchical);
/// assert_eq!(config.cache.l1_d.ways, 2);
/// assert_eq!(config.cache.l1_i.ways, 4);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Translation cache configuration.
    #[serde(default)]
    pub tlb: TlbConfig,
    /// Cache hierarchy configuration.
    #[serde(default)]
    pub cache: CacheHierarchyConfig,
}

impl Config {
    /// Parses and validates a JSON configuration.
    ///
    /// # Errors
    ///
    /// [`Error::BadParameter`] if the JSON is malformed or the geometry is invalid.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::BadParameter(format!("invalid configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates every section.
    ///
    /// # Errors
    ///
    /// [`Error::BadParameter`] describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        self.tlb.validate()?;
        self.cache.l1_i.validate("L1I")?;
        self.cache.l1_d.validate("L1D")?;
        self.cache.l2.validate("L2")
    }
}
