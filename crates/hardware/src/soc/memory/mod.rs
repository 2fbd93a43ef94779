//! Simulated Physical Memory.
//!
//! This module implements the flat, byte-addressable memory that the page walker reads
//! and the cache hierarchy fills from and writes through to. It provides:
//! 1. **Trait:** [`PhysicalMemory`], the word-level view the walker and caches depend on.
//! 2. **Buffer:** [`MemoryBuffer`], checked byte storage with fallible allocation.
//! 3. **Memory:** [`Memory`], the default implementation, loadable from a raw dump image.
//!
//! Words are 32-bit little-endian. Offsets are byte offsets from the start of memory.

/// Checked byte storage for simulated memory.
pub mod buffer;

use std::path::Path;

use tracing::debug;

pub use self::buffer::MemoryBuffer;
use crate::common::constants::{LINE_BYTES, WORD_SIZE, WORDS_PER_LINE};
use crate::common::{Error, Result};

/// One cache line worth of words.
pub type Line = [u32; WORDS_PER_LINE];

/// Word-granular access to simulated physical memory.
///
/// Implementations report any access that does not fit entirely inside memory as
/// [`Error::OutOfBounds`] and leave memory untouched in that case.
pub trait PhysicalMemory {
    /// Size of memory in bytes.
    fn len(&self) -> usize;

    /// Reads the little-endian word starting at byte `offset`.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfBounds`] if the word does not fit inside memory.
    fn read_word(&self, offset: usize) -> Result<u32>;

    /// Writes the little-endian word starting at byte `offset`.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfBounds`] if the word does not fit inside memory.
    fn write_word(&mut self, offset: usize, value: u32) -> Result<()>;

    /// Returns `true` if memory holds no bytes.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checks that the whole line starting at `offset` lies inside memory.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfBounds`] otherwise.
    fn check_line(&self, offset: usize) -> Result<()> {
        match offset.checked_add(LINE_BYTES) {
            Some(end) if end <= self.len() => Ok(()),
            _ => Err(Error::OutOfBounds {
                offset: offset as u64,
                len: self.len(),
            }),
        }
    }

    /// Reads the line starting at byte `offset`.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfBounds`] if the line does not fit inside memory.
    fn read_line(&self, offset: usize) -> Result<Line> {
        self.check_line(offset)?;
        let mut line = [0; WORDS_PER_LINE];
        for (i, word) in line.iter_mut().enumerate() {
            *word = self.read_word(offset + i * WORD_SIZE)?;
        }
        Ok(line)
    }

    /// Writes the line starting at byte `offset`.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfBounds`] if the line does not fit inside memory; nothing is written.
    fn write_line(&mut self, offset: usize, line: &Line) -> Result<()> {
        self.check_line(offset)?;
        for (i, &word) in line.iter().enumerate() {
            self.write_word(offset + i * WORD_SIZE, word)?;
        }
        Ok(())
    }
}

/// Simulated physical memory backed by a [`MemoryBuffer`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Memory {
    buffer: MemoryBuffer,
}

impl Memory {
    /// Creates zero-filled memory of `size` bytes.
    ///
    /// # Errors
    ///
    /// [`Error::Allocation`] if the backing store cannot be reserved.
    pub fn new(size: usize) -> Result<Self> {
        Ok(Self {
            buffer: MemoryBuffer::new(size)?,
        })
    }

    /// Creates memory holding exactly `bytes`.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            buffer: MemoryBuffer::from_vec(bytes),
        }
    }

    /// Loads a raw memory dump: the file's bytes become memory, byte for byte.
    ///
    /// # Errors
    ///
    /// [`Error::Io`] if the file cannot be read.
    pub fn from_image(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        debug!(path = %path.display(), size = bytes.len(), "loaded memory image");
        Ok(Self::from_bytes(bytes))
    }

    /// Copies `data` into memory at byte `offset`.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfBounds`] if the data does not fit; nothing is written.
    pub fn load(&mut self, offset: usize, data: &[u8]) -> Result<()> {
        self.buffer.write_slice(offset, data)
    }

    /// Borrows the raw bytes of memory.
    pub fn as_bytes(&self) -> &[u8] {
        self.buffer.as_slice()
    }
}

impl PhysicalMemory for Memory {
    fn len(&self) -> usize {
        self.buffer.len()
    }

    fn read_word(&self, offset: usize) -> Result<u32> {
        let bytes = self.buffer.read_slice(offset, WORD_SIZE)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn write_word(&mut self, offset: usize, value: u32) -> Result<()> {
        self.buffer.write_slice(offset, &value.to_le_bytes())
    }
}
