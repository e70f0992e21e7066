//! Flash device
//!
//! [`FlashDevice`] owns the region table and the storage backend and exposes
//! the bounds- and policy-checked operations. It is constructed with
//! [`FlashDevice::init`] and torn down with [`FlashDevice::cleanup`]; the
//! host owns the value and threads it through calls, there is no global
//! state.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use super::backend::{BlockStorage, FlashBackend};
use super::region::{RegionTable, MAX_TOTAL_SIZE, MIN_TOTAL_SIZE};
use super::ERASED_VALUE;
use crate::error::{Error, Result};

const DEFAULT_DEVICE_NAME: &str = "Generic SPI Flash";
const DEFAULT_DEVICE_ID: u32 = 0x1234_5678;
const DEFAULT_VENDOR_ID: u16 = 0xABCD;
const DEFAULT_TOTAL_SIZE: u64 = 16 * 1024 * 1024;
const DEFAULT_SECTOR_SIZE: u32 = 4096;

/// Identity and geometry of the flash device
///
/// Populated once at [`FlashDevice::init`], from backend attributes when a
/// collaborator is present and from fixed defaults otherwise. Read-only
/// afterwards.
#[derive(Debug, Clone, Default)]
pub struct FlashDeviceInfo {
    /// Device display name
    pub name: String,
    /// Device identifier
    pub device_id: u32,
    /// Vendor identifier
    pub vendor_id: u16,
    /// Medium size in bytes
    pub total_size: u64,
    /// Erase sector size in bytes
    pub sector_size: u32,
    /// Device-global write protection flag
    pub write_protected: bool,
    /// Number of sectors (`block_count * sector_size == total_size`)
    pub block_count: u32,
}

impl FlashDeviceInfo {
    fn detection_defaults() -> Self {
        Self {
            name: String::from(DEFAULT_DEVICE_NAME),
            device_id: DEFAULT_DEVICE_ID,
            vendor_id: DEFAULT_VENDOR_ID,
            total_size: DEFAULT_TOTAL_SIZE,
            sector_size: DEFAULT_SECTOR_SIZE,
            write_protected: false,
            block_count: (DEFAULT_TOTAL_SIZE / DEFAULT_SECTOR_SIZE as u64) as u32,
        }
    }
}

impl fmt::Display for FlashDeviceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Device: {}", self.name)?;
        writeln!(f, "  Device ID: {:#010x}", self.device_id)?;
        writeln!(f, "  Vendor ID: {:#06x}", self.vendor_id)?;
        writeln!(f, "  Total Size: {} KB", self.total_size / 1024)?;
        writeln!(f, "  Sector Size: {} bytes", self.sector_size)?;
        writeln!(f, "  Block Count: {}", self.block_count)?;
        write!(
            f,
            "  Write Protected: {}",
            if self.write_protected { "yes" } else { "no" }
        )
    }
}

/// The flash device: region table + backend behind checked operations
pub struct FlashDevice {
    backend: FlashBackend,
    info: FlashDeviceInfo,
    regions: RegionTable,
    initialized: bool,
}

impl FlashDevice {
    /// Initialize the flash device.
    ///
    /// When a block storage collaborator is supplied, its attributes and
    /// geometry override the defaults; when it is absent, or when its
    /// reported geometry is unusable, the device continues with defaults
    /// (16 MiB, 4 KiB sectors) and a warning. Absent hardware therefore
    /// never fails init - the device just runs simulated.
    pub fn init(backend: Option<Box<dyn BlockStorage>>) -> Self {
        let mut info = FlashDeviceInfo::detection_defaults();

        let backend = match backend {
            Some(mut storage) => {
                detect_device(&mut info, storage.as_mut());
                FlashBackend::HardwareBacked(storage)
            }
            None => {
                log::warn!("no block storage backend found, continuing in simulated mode");
                FlashBackend::Simulated
            }
        };

        log::info!(
            "flash device: {}, size: {} KB, sector: {} bytes, write-protected: {}",
            info.name,
            info.total_size / 1024,
            info.sector_size,
            info.write_protected
        );

        let regions = RegionTable::standard_layout(info.total_size);
        log::info!("initialized {} flash regions", regions.len());

        Self {
            backend,
            info,
            regions,
            initialized: true,
        }
    }

    /// Read `len` bytes starting at `addr`.
    ///
    /// # Errors
    /// * `InvalidParameter` - `len` is zero, or the device was cleaned up
    /// * `OutOfBounds` - `addr + len` extends beyond the medium
    /// * backend errors are surfaced as returned
    pub fn read(&mut self, addr: u32, len: usize) -> Result<Vec<u8>> {
        if len == 0 || !self.initialized {
            return Err(Error::InvalidParameter);
        }
        self.check_bounds(addr, len)?;

        let data = match &mut self.backend {
            FlashBackend::HardwareBacked(storage) => {
                let lba = addr / self.info.sector_size;
                let offset = addr % self.info.sector_size;
                let mut buf = vec![0u8; len];
                storage.read(lba, offset, &mut buf)?;
                buf
            }
            FlashBackend::Simulated => vec![ERASED_VALUE; len],
        };

        log::debug!("flash read: {:#010x}, {} bytes", addr, len);
        Ok(data)
    }

    /// Write `data` starting at `addr`.
    ///
    /// # Errors
    /// * `InvalidParameter` - `data` is empty, or the device was cleaned up
    /// * `OutOfBounds` - `addr + data.len()` extends beyond the medium
    /// * `WriteProtected` - the device-global flag is set, or the range
    ///   overlaps a write-protected region
    pub fn write(&mut self, addr: u32, data: &[u8]) -> Result<()> {
        if data.is_empty() || !self.initialized {
            return Err(Error::InvalidParameter);
        }
        self.check_bounds(addr, data.len())?;

        if self.info.write_protected {
            log::error!("flash is write protected");
            return Err(Error::WriteProtected);
        }
        if self.regions.write_protected_overlap(addr, data.len()) {
            log::error!("write overlaps a protected region: {:#010x}", addr);
            return Err(Error::WriteProtected);
        }

        match &mut self.backend {
            FlashBackend::HardwareBacked(storage) => {
                let lba = addr / self.info.sector_size;
                let offset = addr % self.info.sector_size;
                storage.write(lba, offset, data)?;
            }
            FlashBackend::Simulated => {
                log::warn!("simulated flash write (no block storage backend)");
            }
        }

        log::debug!("flash write: {:#010x}, {} bytes", addr, data.len());
        Ok(())
    }

    /// Erase the sector containing `addr`.
    ///
    /// # Errors
    /// * `NotReady` - the device was cleaned up
    /// * `InvalidParameter` - `addr` is beyond the medium
    /// * `WriteProtected` - the device-global flag is set
    /// * `Unsupported` / `NotFound` - per the containing region's policy
    pub fn erase_sector(&mut self, addr: u32) -> Result<()> {
        if !self.initialized {
            return Err(Error::NotReady);
        }
        if u64::from(addr) >= self.info.total_size {
            log::error!(
                "erase address beyond flash boundary: {:#010x} >= {:#010x}",
                addr,
                self.info.total_size
            );
            return Err(Error::InvalidParameter);
        }
        if self.info.write_protected {
            log::error!("flash is write protected");
            return Err(Error::WriteProtected);
        }
        self.regions.erase_supported(addr)?;

        match &mut self.backend {
            FlashBackend::HardwareBacked(storage) => {
                let lba = addr / self.info.sector_size;
                storage.erase_blocks(lba, 1)?;
            }
            FlashBackend::Simulated => {
                log::warn!("simulated flash erase (no block storage backend)");
            }
        }

        log::debug!("flash sector erased: {:#010x}", addr);
        Ok(())
    }

    /// Device identity and geometry.
    ///
    /// # Errors
    /// * `NotReady` - the device was cleaned up
    pub fn info(&self) -> Result<&FlashDeviceInfo> {
        if !self.initialized {
            return Err(Error::NotReady);
        }
        Ok(&self.info)
    }

    /// The region table built at init
    pub fn regions(&self) -> &RegionTable {
        &self.regions
    }

    /// Whether operations dispatch to real block storage
    pub fn is_hardware_backed(&self) -> bool {
        self.backend.is_hardware_backed()
    }

    /// Whether the device is usable (initialized and not cleaned up)
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Release the backend handle and zero the device state.
    ///
    /// Idempotent: calling cleanup on an already cleaned-up device is a
    /// successful no-op.
    pub fn cleanup(&mut self) {
        self.backend = FlashBackend::Simulated;
        self.info = FlashDeviceInfo::default();
        self.regions.clear();
        self.initialized = false;
        log::info!("flash device cleanup complete");
    }

    fn check_bounds(&self, addr: u32, len: usize) -> Result<()> {
        // u64 arithmetic so addr + len cannot wrap
        if u64::from(addr) + len as u64 > self.info.total_size {
            log::error!(
                "access beyond flash boundary: {:#010x} + {} > {:#010x}",
                addr,
                len,
                self.info.total_size
            );
            return Err(Error::OutOfBounds);
        }
        Ok(())
    }
}

impl fmt::Display for FlashDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.initialized {
            return write!(f, "Flash device: not initialized");
        }
        writeln!(f, "{}", self.info)?;
        writeln!(
            f,
            "  Backend: {}",
            if self.is_hardware_backed() {
                "block storage"
            } else {
                "simulated"
            }
        )?;
        writeln!(f, "Flash regions ({}):", self.regions.len())?;
        for (i, region) in self.regions.iter().enumerate() {
            writeln!(f, "  {}. {}", i + 1, region)?;
        }
        Ok(())
    }
}

/// Fill in device info from a block storage collaborator.
///
/// Attribute or geometry query failures keep the defaults; a backend that
/// reports unusable geometry (zero-sized blocks, a medium too small for the
/// standard region layout, or one too large for 32-bit addressing) is
/// treated the same way.
fn detect_device(info: &mut FlashDeviceInfo, storage: &mut dyn BlockStorage) {
    match storage.attributes() {
        Ok(attrs) => info.write_protected = attrs.write_protected,
        Err(e) => log::warn!("failed to query backend attributes: {}", e),
    }

    match storage.block_size(0) {
        Ok((size, count)) => {
            let total = u64::from(size) * u64::from(count);
            if size == 0 || count == 0 || !(MIN_TOTAL_SIZE..=MAX_TOTAL_SIZE).contains(&total) {
                log::warn!(
                    "backend geometry unusable ({} blocks of {} bytes), using defaults",
                    count,
                    size
                );
            } else {
                info.sector_size = size;
                info.block_count = count;
                info.total_size = total;
            }
        }
        Err(e) => log::warn!("failed to query backend geometry: {}", e),
    }
}
