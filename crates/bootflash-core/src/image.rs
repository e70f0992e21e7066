//! Firmware image state
//!
//! [`FirmwareImage`] tracks the identity, version, capability set and
//! validation state of the firmware image handled by this build. It starts
//! out [`ImageStatus::Unknown`], becomes [`ImageStatus::Loaded`] once the
//! build-time identity is populated, and [`ImageStatus::Validated`] once a
//! checksum has been computed over the image bytes.

use alloc::string::String;
use bitflags::bitflags;
use core::fmt;

use crate::checksum;
use crate::config;
use crate::types::Identifier;

bitflags! {
    /// Feature flags advertised by a firmware image
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Capabilities: u32 {
        // Platform families
        /// Ryzen 7000 series platform support
        const PLATFORM_RYZEN_7000 = 0x0000_0001;
        /// Ryzen 9000 series platform support
        const PLATFORM_RYZEN_9000 = 0x0000_0002;

        // USB host controller classes
        /// xHCI (USB3) host controller support
        const USB_XHCI            = 0x0000_0010;
        /// EHCI (USB2) host controller support
        const USB_EHCI            = 0x0000_0020;

        // Optional services
        /// Network stack enabled
        const NETWORK             = 0x0000_0100;
        /// Remote debug access enabled
        const REMOTE_DEBUG        = 0x0000_0200;

        // Security features
        /// Secure boot support
        const SECURE_BOOT         = 0x0000_1000;
        /// TPM support
        const TPM                 = 0x0000_2000;

        /// In-field flash update support
        const FLASH_UPDATE        = 0x0001_0000;
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Capabilities::empty()
    }
}

impl Capabilities {
    /// Assemble the capability mask from the features this crate was built
    /// with.
    pub fn from_build_config() -> Self {
        let mut caps = Capabilities::empty();
        if cfg!(feature = "ryzen-7000") {
            caps |= Capabilities::PLATFORM_RYZEN_7000;
        }
        if cfg!(feature = "ryzen-9000") {
            caps |= Capabilities::PLATFORM_RYZEN_9000;
        }
        if cfg!(feature = "xhci") {
            caps |= Capabilities::USB_XHCI;
        }
        if cfg!(feature = "ehci") {
            caps |= Capabilities::USB_EHCI;
        }
        if cfg!(feature = "network") {
            caps |= Capabilities::NETWORK;
        }
        if cfg!(feature = "remote-debug") {
            caps |= Capabilities::REMOTE_DEBUG;
        }
        caps
    }
}

/// Validation state of the firmware image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageStatus {
    /// Nothing is known about the image yet
    #[default]
    Unknown,
    /// Identity and capability fields are populated
    Loaded,
    /// A checksum has been computed over the image bytes
    Validated,
    /// The image failed integrity validation
    Corrupted,
    /// The image does not match this platform
    Incompatible,
}

impl fmt::Display for ImageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unknown => "Unknown",
            Self::Loaded => "Loaded",
            Self::Validated => "Validated",
            Self::Corrupted => "Corrupted",
            Self::Incompatible => "Incompatible",
        };
        f.write_str(s)
    }
}

/// Build date of a firmware image, zeroed when not recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BuildDate {
    /// Calendar year
    pub year: u16,
    /// Month, 1-12
    pub month: u8,
    /// Day of month, 1-31
    pub day: u8,
}

/// Identity, version and validation state of a firmware image
#[derive(Debug, Clone, Default)]
pub struct FirmwareImage {
    /// Firmware display name
    pub name: String,
    /// Vendor string
    pub vendor: String,
    /// Copyright string
    pub copyright: String,
    /// Major version
    pub major_version: u16,
    /// Minor version
    pub minor_version: u16,
    /// Patch version
    pub patch_version: u16,
    /// Monotonic build number
    pub build_number: u32,
    /// Current lifecycle state
    pub status: ImageStatus,
    /// Advertised feature set
    pub capabilities: Capabilities,
    /// Additive checksum recorded by the last validation
    pub checksum: u32,
    /// Image size recorded by the last validation
    pub size: usize,
    /// Build date, zeroed when not recorded
    pub build_date: BuildDate,
    /// 128-bit image identity
    pub identifier: Identifier,
}

impl FirmwareImage {
    /// Create an image in the zeroed [`ImageStatus::Unknown`] state
    pub fn new() -> Self {
        Self::default()
    }

    /// Populate identity, version and capability fields from the build-time
    /// configuration and mark the image [`ImageStatus::Loaded`].
    pub fn load_identity(&mut self) {
        self.name = String::from(config::FIRMWARE_NAME);
        self.vendor = String::from(config::FIRMWARE_VENDOR);
        self.copyright = String::from(config::FIRMWARE_COPYRIGHT);
        self.major_version = config::FIRMWARE_VERSION_MAJOR;
        self.minor_version = config::FIRMWARE_VERSION_MINOR;
        self.patch_version = config::FIRMWARE_VERSION_PATCH;
        self.build_number = config::FIRMWARE_BUILD_NUMBER;
        self.capabilities = Capabilities::from_build_config();
        self.status = ImageStatus::Loaded;

        log::info!(
            "firmware: {} {}.{}.{}.{}, capabilities {:#010x}",
            self.name,
            self.major_version,
            self.minor_version,
            self.patch_version,
            self.build_number,
            self.capabilities.bits()
        );
    }

    /// Checksum `bytes` and record the result.
    ///
    /// Computes the additive checksum, records it together with the image
    /// size, and marks the image [`ImageStatus::Validated`]. This always
    /// succeeds; the additive checksum has no notion of an invalid image.
    pub fn validate(&mut self, bytes: &[u8]) {
        let checksum = checksum::additive(bytes);
        log::info!(
            "firmware validation: size={}, checksum={:#010x}",
            bytes.len(),
            checksum
        );
        self.checksum = checksum;
        self.size = bytes.len();
        self.status = ImageStatus::Validated;
    }

    /// Return the image to the zeroed [`ImageStatus::Unknown`] state
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Version as a `major.minor.patch.build` quadruple
    pub fn version(&self) -> (u16, u16, u16, u32) {
        (
            self.major_version,
            self.minor_version,
            self.patch_version,
            self.build_number,
        )
    }
}

impl fmt::Display for FirmwareImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Firmware: {}", self.name)?;
        writeln!(f, "  Vendor: {}", self.vendor)?;
        writeln!(
            f,
            "  Version: {}.{}.{}.{}",
            self.major_version, self.minor_version, self.patch_version, self.build_number
        )?;
        writeln!(f, "  Status: {}", self.status)?;
        write!(f, "  Capabilities: {:#010x}", self.capabilities.bits())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_image_is_unknown() {
        let image = FirmwareImage::new();
        assert_eq!(image.status, ImageStatus::Unknown);
        assert_eq!(image.checksum, 0);
        assert_eq!(image.size, 0);
        assert!(image.identifier.is_zero());
    }

    #[test]
    fn test_load_identity() {
        let mut image = FirmwareImage::new();
        image.load_identity();

        assert_eq!(image.status, ImageStatus::Loaded);
        assert_eq!(image.name, config::FIRMWARE_NAME);
        assert_eq!(image.vendor, config::FIRMWARE_VENDOR);
        assert_eq!(
            image.version(),
            (
                config::FIRMWARE_VERSION_MAJOR,
                config::FIRMWARE_VERSION_MINOR,
                config::FIRMWARE_VERSION_PATCH,
                config::FIRMWARE_BUILD_NUMBER
            )
        );
    }

    #[test]
    fn test_capabilities_follow_build_features() {
        let caps = Capabilities::from_build_config();
        assert_eq!(
            caps.contains(Capabilities::PLATFORM_RYZEN_7000),
            cfg!(feature = "ryzen-7000")
        );
        assert_eq!(caps.contains(Capabilities::USB_XHCI), cfg!(feature = "xhci"));
        assert_eq!(caps.contains(Capabilities::USB_EHCI), cfg!(feature = "ehci"));
        assert_eq!(caps.contains(Capabilities::NETWORK), cfg!(feature = "network"));
        // Nothing in the build config sets the security capabilities
        assert!(!caps.contains(Capabilities::SECURE_BOOT));
        assert!(!caps.contains(Capabilities::TPM));
    }

    #[test]
    fn test_validate_records_checksum_and_size() {
        let mut image = FirmwareImage::new();
        image.load_identity();

        let bytes = [1u8, 2, 3, 4];
        image.validate(&bytes);

        assert_eq!(image.status, ImageStatus::Validated);
        assert_eq!(image.checksum, checksum::additive(&bytes));
        assert_eq!(image.size, bytes.len());
    }

    #[test]
    fn test_revalidation_is_deterministic() {
        let mut image = FirmwareImage::new();
        let bytes = b"same content";

        image.validate(bytes);
        let first = image.checksum;
        image.validate(bytes);

        assert_eq!(image.checksum, first);
        assert_eq!(image.status, ImageStatus::Validated);
    }

    #[test]
    fn test_reset_returns_to_unknown() {
        let mut image = FirmwareImage::new();
        image.load_identity();
        image.validate(&[0xAB; 16]);

        image.reset();

        assert_eq!(image.status, ImageStatus::Unknown);
        assert!(image.name.is_empty());
        assert_eq!(image.checksum, 0);
        assert_eq!(image.size, 0);
        assert_eq!(image.capabilities, Capabilities::empty());
    }
}
