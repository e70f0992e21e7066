//! bootflash-core - Firmware update engine for pre-boot environments
//!
//! This crate provides the core functionality for managing a byte-addressable
//! flash medium divided into protected regions, and for parsing and validating
//! firmware update packages before they are committed to that medium. It is
//! designed to be `no_std` compatible for use in pre-boot environments.
//!
//! # Features
//!
//! - `std` - Enable standard library support (includes `alloc`)
//! - `alloc` - Enable heap allocation for the device, package and image APIs
//!
//! Additional features (`xhci`, `network`, ...) select which capabilities the
//! built firmware image advertises; see [`image::Capabilities`].
//!
//! # Example
//!
//! ```ignore
//! use bootflash_core::flash::FlashDevice;
//! use bootflash_core::package::PackageHeader;
//!
//! let mut device = FlashDevice::init(None);
//! let header = PackageHeader::validate(&package_bytes)?;
//! let payload = header.extract(&package_bytes)?;
//! device.write(0x10000, &payload)?;
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod checksum;
pub mod config;
pub mod error;
pub mod flash;
#[cfg(feature = "alloc")]
pub mod image;
#[cfg(feature = "alloc")]
pub mod package;
#[cfg(feature = "alloc")]
pub mod source;
pub mod types;

pub use error::{Error, Result};
