//! Flash region table
//!
//! Core types describing the named address ranges of the flash medium and
//! their protection policy. These types are fully no_std: the table is
//! bounded and region names live in fixed-size storage.

use crate::error::{Error, Result};
use heapless::{String, Vec};

/// Maximum number of entries in a region table
pub const MAX_REGIONS: usize = 16;

/// Maximum length of a region name in characters
pub const MAX_REGION_NAME_LEN: usize = 64;

/// Smallest medium the standard layout can be built for (1 MiB)
pub const MIN_TOTAL_SIZE: u64 = 0x10_0000;

/// Largest medium addressable with 32-bit region offsets (4 GiB)
pub const MAX_TOTAL_SIZE: u64 = 1 << 32;

/// Bounded storage for a region name
pub type RegionName = String<MAX_REGION_NAME_LEN>;

// Standard layout offsets, all relative to the medium size.
const BOOT_BLOCK_SIZE: u32 = 0x10000;
const MAIN_FIRMWARE_TOP_GAP: u32 = 0x40000;
const NVRAM_TOP_GAP: u32 = 0x30000;
const NVRAM_SIZE: u32 = 0x20000;
const DESCRIPTOR_SIZE: u32 = 0x10000;

/// The role a region plays in the firmware layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKind {
    /// Reset vector and early boot code
    BootBlock,
    /// The main firmware volume
    MainFirmware,
    /// Non-volatile variable store
    Nvram,
    /// Flash descriptor
    Descriptor,
    /// Platform-specific region outside the standard layout
    Custom,
}

/// A named region within the flash medium
///
/// A region covers the half-open range `[start, start + size)` and carries
/// its own write/erase policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashRegion {
    /// The role of this region
    pub kind: RegionKind,
    /// Start address
    pub start: u32,
    /// Size in bytes
    pub size: u32,
    /// Writes overlapping this region are rejected
    pub write_protected: bool,
    /// Sector erase is meaningful within this region
    pub erase_required: bool,
    /// Name of the region
    pub name: RegionName,
}

impl FlashRegion {
    /// Create a new writable, erasable region.
    ///
    /// Names longer than [`MAX_REGION_NAME_LEN`] characters are truncated.
    pub fn new(kind: RegionKind, start: u32, size: u32, name: &str) -> Self {
        Self {
            kind,
            start,
            size,
            write_protected: false,
            erase_required: true,
            name: bounded_name(name),
        }
    }

    /// End address (exclusive). Computed in u64 so `start + size` cannot wrap.
    pub fn end(&self) -> u64 {
        u64::from(self.start) + u64::from(self.size)
    }

    /// Check if an address falls within this region
    pub fn contains(&self, addr: u32) -> bool {
        addr >= self.start && u64::from(addr) < self.end()
    }

    /// Check if this region intersects the operation range `[addr, addr + len)`
    pub fn overlaps(&self, addr: u32, len: usize) -> bool {
        let op_start = u64::from(addr);
        let op_end = op_start + len as u64;
        op_start < self.end() && u64::from(self.start) < op_end
    }
}

impl core::fmt::Display for FlashRegion {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{}: [{:#010x}, {:#010x}) ({} KB) {}{}",
            self.name,
            self.start,
            self.end(),
            self.size / 1024,
            if self.write_protected { "[RO]" } else { "[RW]" },
            if self.erase_required { " [E]" } else { "" },
        )
    }
}

/// Table of flash regions with protection policy lookups
///
/// The table is bounded at [`MAX_REGIONS`] entries; pushing beyond that is a
/// programming error and panics. Regions are scanned linearly, which is fine
/// at this scale.
#[derive(Debug, Clone, Default)]
pub struct RegionTable {
    regions: Vec<FlashRegion, MAX_REGIONS>,
}

impl RegionTable {
    /// Create an empty region table
    pub const fn new() -> Self {
        Self {
            regions: Vec::new(),
        }
    }

    /// Build the standard firmware layout for a medium of `total_size` bytes.
    ///
    /// The caller guarantees `total_size` is within
    /// [`MIN_TOTAL_SIZE`, `MAX_TOTAL_SIZE`]. The layout is fixed relative to
    /// the medium size: a write-protected boot block at the bottom, the main
    /// firmware volume, the variable store near the top, and a
    /// write-protected descriptor in the last sector group. The 64 KiB
    /// between the main firmware and the variable store is intentionally
    /// unmapped.
    pub fn standard_layout(total_size: u64) -> Self {
        debug_assert!((MIN_TOTAL_SIZE..=MAX_TOTAL_SIZE).contains(&total_size));

        let mut table = Self::new();

        let mut boot = FlashRegion::new(RegionKind::BootBlock, 0, BOOT_BLOCK_SIZE, "Boot Block");
        boot.write_protected = true;
        table.push(boot);

        let main_size = (total_size - u64::from(MAIN_FIRMWARE_TOP_GAP)) as u32 - BOOT_BLOCK_SIZE;
        table.push(FlashRegion::new(
            RegionKind::MainFirmware,
            BOOT_BLOCK_SIZE,
            main_size,
            "Main Firmware",
        ));

        let nvram_start = (total_size - u64::from(NVRAM_TOP_GAP)) as u32;
        table.push(FlashRegion::new(
            RegionKind::Nvram,
            nvram_start,
            NVRAM_SIZE,
            "NVRAM",
        ));

        let desc_start = (total_size - u64::from(DESCRIPTOR_SIZE)) as u32;
        let mut desc = FlashRegion::new(
            RegionKind::Descriptor,
            desc_start,
            DESCRIPTOR_SIZE,
            "Flash Descriptor",
        );
        desc.write_protected = true;
        desc.erase_required = false;
        table.push(desc);

        table
    }

    /// Append a region to the table.
    ///
    /// # Panics
    ///
    /// Panics if the table already holds [`MAX_REGIONS`] entries.
    pub fn push(&mut self, region: FlashRegion) {
        if self.regions.push(region).is_err() {
            panic!("region table overflow (max {} regions)", MAX_REGIONS);
        }
    }

    /// Returns true iff any write-protected region intersects
    /// `[addr, addr + len)`.
    pub fn write_protected_overlap(&self, addr: u32, len: usize) -> bool {
        self.regions
            .iter()
            .any(|r| r.write_protected && r.overlaps(addr, len))
    }

    /// Check whether sector erase is supported at `addr`.
    ///
    /// Finds the first region containing `addr` (point lookup, not overlap)
    /// and returns [`Error::Unsupported`] if that region does not require
    /// erase, or [`Error::NotFound`] if no region contains the address.
    pub fn erase_supported(&self, addr: u32) -> Result<()> {
        match self.find(addr) {
            Some(region) if region.erase_required => Ok(()),
            Some(region) => {
                log::error!("erase not supported in region: {}", region.name);
                Err(Error::Unsupported)
            }
            None => {
                log::error!("address not found in any region: {:#010x}", addr);
                Err(Error::NotFound)
            }
        }
    }

    /// Find the first region containing `addr`
    pub fn find(&self, addr: u32) -> Option<&FlashRegion> {
        self.regions.iter().find(|r| r.contains(addr))
    }

    /// Find the first region of the given kind
    pub fn find_by_kind(&self, kind: RegionKind) -> Option<&FlashRegion> {
        self.regions.iter().find(|r| r.kind == kind)
    }

    /// Iterate over all regions in table order
    pub fn iter(&self) -> impl Iterator<Item = &FlashRegion> {
        self.regions.iter()
    }

    /// Number of regions in the table
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Remove all regions
    pub fn clear(&mut self) {
        self.regions.clear();
    }
}

fn bounded_name(name: &str) -> RegionName {
    let mut out = RegionName::new();
    for ch in name.chars() {
        if out.push(ch).is_err() {
            break;
        }
    }
    out
}
