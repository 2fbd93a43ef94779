//! Memory Buffer Implementation.
//!
//! This module provides the byte storage behind simulated physical memory. It provides:
//! 1. **Fallible Allocation:** The buffer is reserved up front and reports failure as an error.
//! 2. **Checked Access:** Every slice read or write is bounds-checked before touching storage.

use crate::common::{Error, Result};

/// Zero-initialised, fixed-size byte storage.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryBuffer {
    bytes: Vec<u8>,
}

impl MemoryBuffer {
    /// Allocates a zeroed buffer of `size` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Allocation`] if the host cannot reserve the storage.
    pub fn new(size: usize) -> Result<Self> {
        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(size)
            .map_err(|_| Error::Allocation { bytes: size })?;
        bytes.resize(size, 0);
        Ok(Self { bytes })
    }

    /// Wraps existing bytes without copying.
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Returns the size of the buffer in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if the buffer holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Checks that `len` bytes starting at `offset` lie inside the buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] otherwise.
    pub fn check_range(&self, offset: usize, len: usize) -> Result<()> {
        match offset.checked_add(len) {
            Some(end) if end <= self.bytes.len() => Ok(()),
            _ => Err(Error::OutOfBounds {
                offset: offset as u64,
                len: self.bytes.len(),
            }),
        }
    }

    /// Reads a slice of memory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] if the range overruns the buffer.
    pub fn read_slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        self.check_range(offset, len)?;
        Ok(&self.bytes[offset..offset + len])
    }

    /// Writes a slice of memory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] if the range overruns the buffer; nothing is written.
    pub fn write_slice(&mut self, offset: usize, data: &[u8]) -> Result<()> {
        self.check_range(offset, data.len())?;
        self.bytes[offset..offset + data.len()].copy_from_slice(data);
        Ok(())
    }

    /// Borrows the whole buffer.
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }
}
