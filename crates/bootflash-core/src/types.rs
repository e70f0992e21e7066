//! Shared identifier types

use core::fmt;

/// A 128-bit identifier.
///
/// Used both as the target id carried in a package header and as the identity
/// of a loaded firmware image. The byte layout matches the conventional GUID
/// encoding: the first three fields are little-endian, the rest is raw bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Identifier([u8; 16]);

impl Identifier {
    /// The all-zero identifier
    pub const ZERO: Identifier = Identifier([0; 16]);

    /// Create an identifier from its raw byte encoding
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Raw byte encoding of this identifier
    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Whether this is the all-zero identifier
    pub fn is_zero(&self) -> bool {
        self.0 == [0; 16]
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.0;
        let data1 = u32::from_le_bytes([b[0], b[1], b[2], b[3]]);
        let data2 = u16::from_le_bytes([b[4], b[5]]);
        let data3 = u16::from_le_bytes([b[6], b[7]]);
        write!(
            f,
            "{:08x}-{:04x}-{:04x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
            data1, data2, data3, b[8], b[9], b[10], b[11], b[12], b[13], b[14], b[15]
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::format;

    #[test]
    fn test_zero() {
        assert!(Identifier::ZERO.is_zero());
        assert!(!Identifier::from_bytes([1; 16]).is_zero());
    }

    #[test]
    fn test_display_field_order() {
        let id = Identifier::from_bytes([
            0x78, 0x56, 0x34, 0x12, // data1, little-endian
            0xcd, 0xab, // data2
            0xf0, 0xde, // data3
            0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08,
        ]);
        assert_eq!(
            format!("{}", id),
            "12345678-abcd-def0-0102-030405060708"
        );
    }
}
