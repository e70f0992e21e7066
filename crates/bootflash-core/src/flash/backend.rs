//! Flash storage backends
//!
//! The physical read/erase/write primitive is supplied by the host
//! environment through the [`BlockStorage`] trait. Whether such a
//! collaborator is present is resolved once, at device construction, into
//! the [`FlashBackend`] variant; every operation then dispatches through a
//! single match instead of repeating the presence check.

use alloc::boxed::Box;

use crate::error::Result;

/// Attributes reported by a block storage collaborator
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockAttributes {
    /// The whole device refuses writes
    pub write_protected: bool,
}

/// Block-granular storage collaborator interface.
///
/// Implementations service flat block reads/writes addressed by logical
/// block and in-block offset, and block-aligned erases. All failures are
/// mapped into the core [`Error`](crate::Error) type at this boundary.
pub trait BlockStorage {
    /// Query device-level attributes
    fn attributes(&self) -> Result<BlockAttributes>;

    /// Query block geometry starting at `index`.
    ///
    /// Returns `(block_size, block_count)` for the run of uniformly-sized
    /// blocks beginning at `index`.
    fn block_size(&self, index: u32) -> Result<(u32, u32)>;

    /// Read `buf.len()` bytes starting at `offset` into block `lba`.
    ///
    /// The range may extend past the end of the starting block.
    fn read(&mut self, lba: u32, offset: u32, buf: &mut [u8]) -> Result<()>;

    /// Write `data` starting at `offset` into block `lba`
    fn write(&mut self, lba: u32, offset: u32, data: &[u8]) -> Result<()>;

    /// Erase `count` whole blocks starting at block `lba`
    fn erase_blocks(&mut self, lba: u32, count: u32) -> Result<()>;
}

/// How flash operations are serviced.
///
/// Resolved once at [`FlashDevice::init`](super::FlashDevice::init):
/// either a real block storage collaborator was acquired, or the device
/// runs simulated (reads synthesize erased flash, writes and erases are
/// logged no-ops).
pub enum FlashBackend {
    /// Operations are dispatched to a block storage collaborator
    HardwareBacked(Box<dyn BlockStorage>),
    /// No collaborator available; operations are simulated
    Simulated,
}

impl FlashBackend {
    /// Whether this backend dispatches to real block storage
    pub fn is_hardware_backed(&self) -> bool {
        matches!(self, FlashBackend::HardwareBacked(_))
    }
}

impl core::fmt::Debug for FlashBackend {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::HardwareBacked(_) => f.write_str("HardwareBacked"),
            Self::Simulated => f.write_str("Simulated"),
        }
    }
}
