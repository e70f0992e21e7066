//! Build-time firmware configuration
//!
//! Identity of the firmware image built from this source tree. The values
//! here feed [`FirmwareImage::load_identity`](crate::image::FirmwareImage)
//! together with the capability features selected at compile time.

/// Firmware display name
pub const FIRMWARE_NAME: &str = "USB Pre-Boot Firmware";

/// Firmware vendor string
pub const FIRMWARE_VENDOR: &str = "Research Project";

/// Firmware copyright string
pub const FIRMWARE_COPYRIGHT: &str = "(C) 2025 Research Project";

/// Major version of the firmware image
pub const FIRMWARE_VERSION_MAJOR: u16 = 1;

/// Minor version of the firmware image
pub const FIRMWARE_VERSION_MINOR: u16 = 0;

/// Patch version of the firmware image
pub const FIRMWARE_VERSION_PATCH: u16 = 0;

/// Monotonic build number
pub const FIRMWARE_BUILD_NUMBER: u32 = 1;
