//! Firmware update packages
//!
//! An update package is a self-describing container: a fixed 164-byte packed
//! little-endian header followed by the firmware payload. The header records
//! the payload bounds and an additive checksum over the payload; validation
//! checks the framing and recomputes the checksum before the payload is
//! handed to the image layer.
//!
//! Header layout:
//!
//! | Offset | Size | Field                                    |
//! |--------|------|------------------------------------------|
//! | 0      | 4    | signature ("FWPK")                       |
//! | 4      | 4    | header_size                              |
//! | 8      | 4    | package_size                             |
//! | 12     | 4    | version                                  |
//! | 16     | 4    | checksum                                 |
//! | 20     | 16   | target_id                                |
//! | 36     | 128  | description (64 UTF-16 code units)       |

use alloc::string::String;
use alloc::vec::Vec;

use crate::checksum;
use crate::error::{Error, Result};
use crate::types::Identifier;

/// Package signature: "FWPK" read as a little-endian u32
pub const PACKAGE_SIGNATURE: u32 = u32::from_le_bytes(*b"FWPK");

/// Number of UTF-16 code units in the description field
const DESCRIPTION_UNITS: usize = 64;

/// Parsed firmware update package header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageHeader {
    /// Magic value, [`PACKAGE_SIGNATURE`] for a well-formed package
    pub signature: u32,
    /// Offset of the payload within the package buffer
    pub header_size: u32,
    /// Total package size; the payload ends here
    pub package_size: u32,
    /// Package format version
    pub version: u32,
    /// Additive checksum over the payload
    pub checksum: u32,
    /// Identity of the platform this package targets
    pub target_id: Identifier,
    /// Human-readable package description
    pub description: String,
}

impl PackageHeader {
    /// Size of the fixed binary header in bytes
    pub const FIXED_SIZE: usize = 164;

    /// Parse the fixed header from the front of `buffer` without semantic
    /// checks.
    ///
    /// # Errors
    /// * `InvalidParameter` - `buffer` is shorter than the fixed header
    pub fn parse(buffer: &[u8]) -> Result<Self> {
        if buffer.len() < Self::FIXED_SIZE {
            return Err(Error::InvalidParameter);
        }

        let signature = u32::from_le_bytes(buffer[0..4].try_into().unwrap());
        let header_size = u32::from_le_bytes(buffer[4..8].try_into().unwrap());
        let package_size = u32::from_le_bytes(buffer[8..12].try_into().unwrap());
        let version = u32::from_le_bytes(buffer[12..16].try_into().unwrap());
        let checksum = u32::from_le_bytes(buffer[16..20].try_into().unwrap());
        let target_id = Identifier::from_bytes(buffer[20..36].try_into().unwrap());
        let description = parse_description(&buffer[36..36 + DESCRIPTION_UNITS * 2]);

        Ok(Self {
            signature,
            header_size,
            package_size,
            version,
            checksum,
            target_id,
            description,
        })
    }

    /// Parse and validate a package buffer.
    ///
    /// Checks, in order: the buffer holds at least the fixed header; the
    /// signature matches; `header_size <= package_size <= buffer.len()`;
    /// and the additive checksum recomputed over the payload
    /// (`buffer[header_size..package_size]`) equals the header field.
    ///
    /// # Errors
    /// * `InvalidParameter` - buffer shorter than the fixed header
    /// * `Corrupted` - framing or checksum validation failed
    pub fn validate(buffer: &[u8]) -> Result<Self> {
        let header = Self::parse(buffer)?;

        if header.signature != PACKAGE_SIGNATURE {
            log::debug!(
                "package signature invalid: {:#010x} (expected 'FWPK')",
                header.signature
            );
            return Err(Error::Corrupted);
        }
        if header.header_size > header.package_size {
            log::debug!(
                "package header size {} exceeds package size {}",
                header.header_size,
                header.package_size
            );
            return Err(Error::Corrupted);
        }
        if header.package_size as usize > buffer.len() {
            log::debug!(
                "package size {} exceeds buffer length {}",
                header.package_size,
                buffer.len()
            );
            return Err(Error::Corrupted);
        }

        let payload = &buffer[header.header_size as usize..header.package_size as usize];
        let computed = checksum::additive(payload);
        if computed != header.checksum {
            log::debug!(
                "package checksum mismatch: computed {:#010x}, header {:#010x}",
                computed,
                header.checksum
            );
            return Err(Error::Corrupted);
        }

        Ok(header)
    }

    /// Extract an owned copy of the payload, `buffer[header_size..package_size]`.
    ///
    /// # Errors
    /// * `InvalidParameter` - the payload range is not contained in `buffer`
    pub fn extract(&self, buffer: &[u8]) -> Result<Vec<u8>> {
        let start = self.header_size as usize;
        let end = self.package_size as usize;
        if start > end || end > buffer.len() {
            return Err(Error::InvalidParameter);
        }
        Ok(buffer[start..end].to_vec())
    }

    /// Size of the payload described by this header
    pub fn payload_len(&self) -> usize {
        (self.package_size - self.header_size) as usize
    }
}

/// Decode the NUL-truncated UTF-16 description field
fn parse_description(bytes: &[u8]) -> String {
    let units = bytes
        .chunks_exact(2)
        .map(|ch| u16::from_le_bytes([ch[0], ch[1]]))
        .take_while(|&u| u != 0);
    char::decode_utf16(units)
        .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::vec;

    /// Build a valid package: fixed header + `payload`, checksum filled in.
    fn make_test_package(payload: &[u8]) -> Vec<u8> {
        let package_size = PackageHeader::FIXED_SIZE + payload.len();
        let mut data = vec![0u8; package_size];

        data[0..4].copy_from_slice(b"FWPK");
        data[4..8].copy_from_slice(&(PackageHeader::FIXED_SIZE as u32).to_le_bytes());
        data[8..12].copy_from_slice(&(package_size as u32).to_le_bytes());
        data[12..16].copy_from_slice(&2u32.to_le_bytes());
        data[16..20].copy_from_slice(&checksum::additive(payload).to_le_bytes());
        data[20..36].copy_from_slice(&[0xA5; 16]);

        // Description: "Test Update" as UTF-16LE
        for (i, unit) in "Test Update".encode_utf16().enumerate() {
            data[36 + i * 2..36 + i * 2 + 2].copy_from_slice(&unit.to_le_bytes());
        }

        data[PackageHeader::FIXED_SIZE..].copy_from_slice(payload);
        data
    }

    #[test]
    fn test_validate_well_formed() {
        let payload = [0x11u8, 0x22, 0x33, 0x44, 0x55];
        let package = make_test_package(&payload);

        let header = PackageHeader::validate(&package).unwrap();
        assert_eq!(header.signature, PACKAGE_SIGNATURE);
        assert_eq!(header.header_size as usize, PackageHeader::FIXED_SIZE);
        assert_eq!(header.package_size as usize, package.len());
        assert_eq!(header.version, 2);
        assert_eq!(header.checksum, checksum::additive(&payload));
        assert_eq!(header.target_id, Identifier::from_bytes([0xA5; 16]));
        assert_eq!(header.description, "Test Update");
        assert_eq!(header.payload_len(), payload.len());
    }

    #[test]
    fn test_short_buffer_rejected() {
        let package = make_test_package(&[1, 2, 3]);
        assert_eq!(
            PackageHeader::validate(&package[..PackageHeader::FIXED_SIZE - 1]),
            Err(Error::InvalidParameter)
        );
    }

    #[test]
    fn test_bad_magic_rejected() {
        let mut package = make_test_package(&[1, 2, 3]);
        package[0..4].copy_from_slice(b"NOPE");
        assert_eq!(PackageHeader::validate(&package), Err(Error::Corrupted));
    }

    #[test]
    fn test_header_size_beyond_package_rejected() {
        let mut package = make_test_package(&[1, 2, 3]);
        let bad = (package.len() as u32 + 1).to_le_bytes();
        package[4..8].copy_from_slice(&bad);
        assert_eq!(PackageHeader::validate(&package), Err(Error::Corrupted));
    }

    #[test]
    fn test_package_size_beyond_buffer_rejected() {
        let mut package = make_test_package(&[1, 2, 3]);
        let bad = (package.len() as u32 + 1).to_le_bytes();
        package[8..12].copy_from_slice(&bad);
        assert_eq!(PackageHeader::validate(&package), Err(Error::Corrupted));
    }

    #[test]
    fn test_checksum_mismatch_rejected() {
        let mut package = make_test_package(&[1, 2, 3]);
        let last = package.len() - 1;
        package[last] ^= 0xFF;
        assert_eq!(PackageHeader::validate(&package), Err(Error::Corrupted));
    }

    #[test]
    fn test_empty_payload_validates() {
        // package_size == header_size: empty payload, checksum 0
        let package = make_test_package(&[]);
        let header = PackageHeader::validate(&package).unwrap();
        assert_eq!(header.checksum, 0);
        assert_eq!(header.extract(&package).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_extract_payload() {
        let payload = b"firmware image bytes";
        let package = make_test_package(payload);

        let header = PackageHeader::validate(&package).unwrap();
        assert_eq!(header.extract(&package).unwrap(), payload);
    }

    #[test]
    fn test_extract_range_not_in_buffer() {
        let package = make_test_package(&[1, 2, 3]);
        let header = PackageHeader::validate(&package).unwrap();
        // A shorter view of the same package no longer contains the payload
        assert_eq!(
            header.extract(&package[..PackageHeader::FIXED_SIZE]),
            Err(Error::InvalidParameter)
        );
    }

    #[test]
    fn test_trailing_bytes_after_package_ignored() {
        let mut package = make_test_package(&[9, 9, 9]);
        package.extend_from_slice(&[0xEE; 8]);
        let header = PackageHeader::validate(&package).unwrap();
        assert_eq!(header.extract(&package).unwrap(), [9, 9, 9]);
    }
}
