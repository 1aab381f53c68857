//! Per-slot identifiers
//!
//! Every slot carries a 4-byte tag at offset 0x04. The device ships banks with
//! a fixed tag per slot position; the bytes are opaque and never interpreted.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::error::FormatError;
use crate::SLOT_COUNT;

/// Opaque 4-byte slot tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Identifier(pub [u8; 4]);

impl Identifier {
    pub const SIZE: usize = 4;

    /// Read an identifier from exactly four bytes (e.g. a sidecar file)
    pub fn from_slice(bytes: &[u8]) -> Result<Self, FormatError> {
        let raw: [u8; Self::SIZE] = bytes
            .try_into()
            .map_err(|_| FormatError::IdentifierLength(bytes.len()))?;
        Ok(Self(raw))
    }

    pub fn as_bytes(&self) -> &[u8; Self::SIZE] {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl Serialize for Identifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(self.0))
    }
}

/// Factory identifiers, indexed by slot
pub const CANONICAL_IDENTIFIERS: [Identifier; SLOT_COUNT] = [
    Identifier([0x00, 0x00, 0x00, 0x00]), // 00
    Identifier([0x12, 0x45, 0x76, 0xe3]), // 01
    Identifier([0xad, 0x8d, 0x97, 0xb2]), // 02
    Identifier([0x65, 0x55, 0xd0, 0x3b]), // 03
    Identifier([0xf2, 0xd0, 0xb3, 0x6f]), // 04
    Identifier([0x35, 0x82, 0xc2, 0xf8]), // 05
    Identifier([0x06, 0x33, 0x6f, 0xb9]), // 06
    Identifier([0x63, 0x55, 0x74, 0xbd]), // 07
    Identifier([0x67, 0xa2, 0x8f, 0xbd]), // 08
    Identifier([0xf0, 0x20, 0xf9, 0xd1]), // 09
    Identifier([0x14, 0x37, 0x17, 0xb0]), // 10
    Identifier([0xd2, 0x18, 0x93, 0x04]), // 11
    Identifier([0x7e, 0x7b, 0x65, 0xbd]), // 12
    Identifier([0x70, 0x97, 0x63, 0x21]), // 13
    Identifier([0xfd, 0x12, 0xda, 0x9c]), // 14
    Identifier([0xf1, 0x77, 0x62, 0xe7]), // 15
    Identifier([0x5d, 0x78, 0x4c, 0x83]), // 16
    Identifier([0xa4, 0xbb, 0x7f, 0x66]), // 17
    Identifier([0xa3, 0x86, 0xdb, 0xe9]), // 18
    Identifier([0xe3, 0x81, 0x21, 0x74]), // 19
    Identifier([0x0c, 0xc1, 0x75, 0x5f]), // 20
    Identifier([0xab, 0xe9, 0x46, 0x0d]), // 21
    Identifier([0x19, 0xce, 0x57, 0x03]), // 22
    Identifier([0x39, 0xbd, 0xea, 0xb0]), // 23
    Identifier([0x24, 0xee, 0x3e, 0x0f]), // 24
    Identifier([0x0c, 0x2c, 0x88, 0xde]), // 25
    Identifier([0x69, 0xd0, 0xd9, 0xb6]), // 26
    Identifier([0xde, 0x7a, 0x4b, 0xd8]), // 27
    Identifier([0xd2, 0xb0, 0x17, 0xce]), // 28
    Identifier([0xa1, 0xe2, 0x57, 0x51]), // 29
    Identifier([0x7f, 0xeb, 0xb4, 0xf4]), // 30
    Identifier([0xbc, 0x4a, 0x4f, 0x83]), // 31
    Identifier([0x3c, 0x60, 0xbb, 0x82]), // 32
    Identifier([0x27, 0x1f, 0xc3, 0x39]), // 33
    Identifier([0x9a, 0xb4, 0x2b, 0x4d]), // 34
    Identifier([0xea, 0x8d, 0xd8, 0x36]), // 35
    Identifier([0x3a, 0xcf, 0x4c, 0xe6]), // 36
    Identifier([0xd3, 0x65, 0x69, 0x48]), // 37
    Identifier([0x25, 0x1a, 0xb2, 0x46]), // 38
    Identifier([0xd4, 0xdd, 0xfc, 0xb6]), // 39
    Identifier([0x61, 0x73, 0x06, 0xd7]), // 40
    Identifier([0xeb, 0x92, 0xb5, 0x22]), // 41
    Identifier([0xf3, 0x70, 0x8d, 0xb7]), // 42
    Identifier([0x87, 0x82, 0x66, 0xaa]), // 43
    Identifier([0xfc, 0x7b, 0xe8, 0xdb]), // 44
    Identifier([0x7e, 0x61, 0x1f, 0xf1]), // 45
    Identifier([0x49, 0x32, 0x2d, 0x75]), // 46
    Identifier([0x41, 0x33, 0xf8, 0x2c]), // 47
    Identifier([0x7b, 0x59, 0xe0, 0x52]), // 48
    Identifier([0xde, 0x3a, 0x28, 0x87]), // 49
    Identifier([0x67, 0x36, 0xd4, 0x46]), // 50
    Identifier([0x82, 0xab, 0x5d, 0x61]), // 51
    Identifier([0xbe, 0xbe, 0xb6, 0x58]), // 52
    Identifier([0xc8, 0x60, 0x1d, 0xb1]), // 53
    Identifier([0xb8, 0xd3, 0x17, 0x30]), // 54
    Identifier([0x9e, 0x81, 0x17, 0x5d]), // 55
    Identifier([0x41, 0x1d, 0xea, 0x48]), // 56
    Identifier([0xc1, 0x90, 0x7f, 0x80]), // 57
    Identifier([0x81, 0xe3, 0x23, 0xeb]), // 58
    Identifier([0x04, 0x31, 0xf6, 0xcb]), // 59
    Identifier([0x40, 0xe4, 0xc3, 0x0e]), // 60
    Identifier([0x96, 0x0a, 0x50, 0x9e]), // 61
    Identifier([0x5e, 0x4c, 0x57, 0x79]), // 62
    Identifier([0x47, 0x02, 0x5f, 0x65]), // 63
];

/// Factory identifier for a slot position
pub fn canonical(slot_index: usize) -> Option<Identifier> {
    CANONICAL_IDENTIFIERS.get(slot_index).copied()
}

/// Pick the identifier to write for a slot
///
/// A caller-supplied identifier always wins; otherwise the factory tag for
/// the position is used. Positions past the table get all zeros.
pub fn assign(slot_index: usize, source: Option<Identifier>) -> Identifier {
    source
        .or_else(|| canonical(slot_index))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_edges() {
        assert_eq!(CANONICAL_IDENTIFIERS[0], Identifier([0, 0, 0, 0]));
        assert_eq!(CANONICAL_IDENTIFIERS[1], Identifier([0x12, 0x45, 0x76, 0xe3]));
        assert_eq!(CANONICAL_IDENTIFIERS[63], Identifier([0x47, 0x02, 0x5f, 0x65]));
    }

    #[test]
    fn test_table_entries_unique() {
        let mut seen = std::collections::HashSet::new();
        for id in CANONICAL_IDENTIFIERS {
            assert!(seen.insert(id), "duplicate identifier {id}");
        }
    }

    #[test]
    fn test_assign_prefers_source() {
        let custom = Identifier([1, 2, 3, 4]);
        assert_eq!(assign(5, Some(custom)), custom);
        assert_eq!(assign(5, None), CANONICAL_IDENTIFIERS[5]);
        assert_eq!(assign(64, None), Identifier::default());
    }

    #[test]
    fn test_from_slice() {
        assert_eq!(
            Identifier::from_slice(&[0xde, 0xad, 0xbe, 0xef]).unwrap().to_string(),
            "deadbeef"
        );
        assert_eq!(
            Identifier::from_slice(&[1, 2, 3]),
            Err(FormatError::IdentifierLength(3))
        );
    }
}
