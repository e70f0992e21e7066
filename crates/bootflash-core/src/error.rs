//! Error types for bootflash-core
//!
//! This module provides a no_std compatible error type that is used
//! throughout the crate. Backend implementations map their native failures
//! into this type at the [`BlockStorage`](crate::flash::BlockStorage)
//! boundary.

use core::fmt;

/// Core error type - no_std compatible, Copy for efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    // Parameter errors
    /// An argument was invalid (zero-length buffer, uninitialized device, ...)
    InvalidParameter,

    // Addressing errors
    /// Address range extends beyond the flash medium
    OutOfBounds,
    /// Address is not covered by any flash region, or the source is missing
    NotFound,

    // Policy denials
    /// The device or an overlapping region is write protected
    WriteProtected,
    /// The operation is not supported in the containing region
    Unsupported,

    // Integrity errors
    /// Package or image framing/checksum validation failed
    Corrupted,
    /// Package or image does not match this platform
    Incompatible,

    // Lifecycle errors
    /// The device has not been initialized or has been cleaned up
    NotReady,

    // Backend failures
    /// The underlying storage backend reported a failure
    DeviceError,
    /// Resource allocation failed
    OutOfResources,
    /// A byte source returned fewer bytes than it reported
    Aborted,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameter => write!(f, "invalid parameter"),
            Self::OutOfBounds => write!(f, "address out of bounds"),
            Self::NotFound => write!(f, "not found"),
            Self::WriteProtected => write!(f, "write protected"),
            Self::Unsupported => write!(f, "operation not supported"),
            Self::Corrupted => write!(f, "data is corrupted"),
            Self::Incompatible => write!(f, "incompatible with this platform"),
            Self::NotReady => write!(f, "device not ready"),
            Self::DeviceError => write!(f, "storage backend failure"),
            Self::OutOfResources => write!(f, "out of resources"),
            Self::Aborted => write!(f, "operation aborted: partial read"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
