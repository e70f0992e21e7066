//! bootflash-mem - In-memory block storage for testing
//!
//! This crate provides a block storage backend that emulates a flash medium
//! in memory. It's useful for testing and development without real hardware:
//! plug it into [`FlashDevice::init`](bootflash_core::flash::FlashDevice)
//! and the device behaves as hardware-backed.

use bootflash_core::error::{Error, Result};
use bootflash_core::flash::{BlockAttributes, BlockStorage, ERASED_VALUE};
use thiserror::Error as ThisError;

/// Errors specific to the in-memory medium
#[derive(Debug, ThisError)]
pub enum MemStorageError {
    /// Access outside the backing buffer
    #[error("access outside the medium: block {lba}, offset {offset}, len {len}")]
    OutOfRange {
        /// Logical block of the failed access
        lba: u32,
        /// In-block offset of the failed access
        offset: u32,
        /// Length of the failed access
        len: usize,
    },
}

impl From<MemStorageError> for Error {
    fn from(e: MemStorageError) -> Self {
        log::error!("mem storage: {}", e);
        Error::DeviceError
    }
}

/// Configuration for the in-memory medium
#[derive(Debug, Clone)]
pub struct MemConfig {
    /// Sector (erase block) size in bytes
    pub sector_size: u32,
    /// Number of sectors
    pub sector_count: u32,
    /// Report the medium as write protected
    pub write_protected: bool,
}

impl Default for MemConfig {
    fn default() -> Self {
        Self {
            sector_size: 4096,
            sector_count: 4096, // 16 MiB
            write_protected: false,
        }
    }
}

impl MemConfig {
    /// Total medium size in bytes
    pub fn total_size(&self) -> usize {
        self.sector_size as usize * self.sector_count as usize
    }
}

/// In-memory block storage
///
/// Emulates a NOR-style medium: erase sets bytes to `0xFF`, writes can only
/// clear bits, reads return the backing buffer.
pub struct MemBlockStorage {
    config: MemConfig,
    data: Vec<u8>,
}

impl MemBlockStorage {
    /// Create a new medium, fully erased
    pub fn new(config: MemConfig) -> Self {
        let data = vec![ERASED_VALUE; config.total_size()];
        Self { config, data }
    }

    /// Create a new medium with the default 16 MiB geometry
    pub fn new_default() -> Self {
        Self::new(MemConfig::default())
    }

    /// Create a medium pre-filled with `initial_data`
    pub fn with_data(config: MemConfig, initial_data: &[u8]) -> Self {
        let mut storage = Self::new(config);
        let len = initial_data.len().min(storage.data.len());
        storage.data[..len].copy_from_slice(&initial_data[..len]);
        storage
    }

    /// Get a reference to the medium contents
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get a mutable reference to the medium contents
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Get the configuration
    pub fn config(&self) -> &MemConfig {
        &self.config
    }

    fn range(&self, lba: u32, offset: u32, len: usize) -> core::result::Result<core::ops::Range<usize>, MemStorageError> {
        let start = lba as usize * self.config.sector_size as usize + offset as usize;
        let end = start + len;
        if end > self.data.len() {
            return Err(MemStorageError::OutOfRange { lba, offset, len });
        }
        Ok(start..end)
    }
}

impl BlockStorage for MemBlockStorage {
    fn attributes(&self) -> Result<BlockAttributes> {
        Ok(BlockAttributes {
            write_protected: self.config.write_protected,
        })
    }

    fn block_size(&self, _index: u32) -> Result<(u32, u32)> {
        Ok((self.config.sector_size, self.config.sector_count))
    }

    fn read(&mut self, lba: u32, offset: u32, buf: &mut [u8]) -> Result<()> {
        let range = self.range(lba, offset, buf.len())?;
        buf.copy_from_slice(&self.data[range]);
        Ok(())
    }

    fn write(&mut self, lba: u32, offset: u32, data: &[u8]) -> Result<()> {
        let range = self.range(lba, offset, data.len())?;
        // NOR programming only clears bits; erase is what sets them
        for (dst, &src) in self.data[range].iter_mut().zip(data) {
            *dst &= src;
        }
        Ok(())
    }

    fn erase_blocks(&mut self, lba: u32, count: u32) -> Result<()> {
        let len = count as usize * self.config.sector_size as usize;
        let range = self.range(lba, 0, len)?;
        self.data[range].fill(ERASED_VALUE);
        Ok(())
    }
}
