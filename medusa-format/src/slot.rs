//! Slot records: header, payload, role

use crate::error::FormatError;
use crate::identifier::Identifier;
use crate::{PAYLOAD_LEN, PAYLOAD_OFFSET, SAMPLES_PER_SLOT};

/// Header marker for slot 0
pub const FIRST_MARKER: [u8; 4] = [0x21, 0x00, 0x01, 0x00];

/// Header marker for slots 1-63
pub const STANDARD_MARKER: [u8; 4] = [0x02, 0x00, 0x00, 0x3C];

/// Subheader marker at 0x40
pub const SUBHEADER_MARKER: [u8; 4] = [0x04, 0x00, 0x00, 0x3C];

/// Value of the subheader size field
pub const SUBHEADER_SIZE: u16 = 4;

/// Byte ranges of a slot header that are written as zero
pub const RESERVED_RANGES: [std::ops::Range<usize>; 2] = [0x08..0x40, 0x48..0x80];

/// Position-dependent role of a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotRole {
    First,
    Standard,
}

impl SlotRole {
    pub fn for_index(index: usize) -> Self {
        if index == 0 { Self::First } else { Self::Standard }
    }

    /// Header marker written for this role
    pub fn marker(self) -> [u8; 4] {
        match self {
            Self::First => FIRST_MARKER,
            Self::Standard => STANDARD_MARKER,
        }
    }
}

/// Fixed 128-byte slot header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotHeader {
    pub marker: [u8; 4],
    pub identifier: Identifier,
    pub subheader_marker: [u8; 4],
    pub subheader_size: u16,
    pub index: u16,
}

impl SlotHeader {
    pub const SIZE: usize = PAYLOAD_OFFSET;

    /// Well-formed header for a slot position
    pub fn new(index: usize, identifier: Identifier) -> Self {
        Self {
            marker: SlotRole::for_index(index).marker(),
            identifier,
            subheader_marker: SUBHEADER_MARKER,
            subheader_size: SUBHEADER_SIZE,
            index: index as u16,
        }
    }

    /// Write header to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0x00..0x04].copy_from_slice(&self.marker);
        bytes[0x04..0x08].copy_from_slice(self.identifier.as_bytes());
        bytes[0x40..0x44].copy_from_slice(&self.subheader_marker);
        bytes[0x44..0x46].copy_from_slice(&self.subheader_size.to_le_bytes());
        bytes[0x46..0x48].copy_from_slice(&self.index.to_le_bytes());
        // reserved regions stay 0
        bytes
    }

    /// Read header from bytes
    ///
    /// Fields are taken as found; nothing is validated here.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        Some(Self {
            marker: [bytes[0], bytes[1], bytes[2], bytes[3]],
            identifier: Identifier([bytes[4], bytes[5], bytes[6], bytes[7]]),
            subheader_marker: [bytes[0x40], bytes[0x41], bytes[0x42], bytes[0x43]],
            subheader_size: u16::from_le_bytes([bytes[0x44], bytes[0x45]]),
            index: u16::from_le_bytes([bytes[0x46], bytes[0x47]]),
        })
    }
}

/// Waveform payload: exactly 15872 bytes of i16 LE mono samples
#[derive(Clone, PartialEq, Eq)]
pub struct Payload(Box<[u8; PAYLOAD_LEN]>);

impl Payload {
    /// Silent payload
    pub fn zeroed() -> Self {
        Self(Box::new([0u8; PAYLOAD_LEN]))
    }

    /// Copy a payload from exactly [`PAYLOAD_LEN`] bytes
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let raw: &[u8; PAYLOAD_LEN] = bytes.try_into().ok()?;
        Some(Self(Box::new(*raw)))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0[..]
    }

    pub fn as_mut_bytes(&mut self) -> &mut [u8] {
        &mut self.0[..]
    }

    /// Decode the payload into samples
    pub fn to_samples(&self) -> Vec<i16> {
        let mut samples = Vec::with_capacity(SAMPLES_PER_SLOT);
        samples.extend(
            self.0
                .chunks_exact(2)
                .map(|pair| i16::from_le_bytes([pair[0], pair[1]])),
        );
        samples
    }
}

impl std::fmt::Debug for Payload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let peak = self.to_samples().iter().map(|s| s.unsigned_abs()).max().unwrap_or(0);
        f.debug_struct("Payload")
            .field("len", &PAYLOAD_LEN)
            .field("peak", &peak)
            .finish()
    }
}

/// One slot of a bank
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WavetableSlot {
    index: usize,
    identifier: Identifier,
    payload: Payload,
}

impl WavetableSlot {
    pub fn new(index: usize, identifier: Identifier, payload: Payload) -> Self {
        Self {
            index,
            identifier,
            payload,
        }
    }

    /// Build a slot from raw payload bytes, which must be exactly [`PAYLOAD_LEN`] long
    pub fn from_payload_bytes(
        index: usize,
        identifier: Identifier,
        bytes: &[u8],
    ) -> Result<Self, FormatError> {
        let payload = Payload::from_slice(bytes).ok_or(FormatError::PayloadLength {
            index,
            len: bytes.len(),
        })?;
        Ok(Self::new(index, identifier, payload))
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn role(&self) -> SlotRole {
        SlotRole::for_index(self.index)
    }

    pub fn identifier(&self) -> Identifier {
        self.identifier
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn header(&self) -> SlotHeader {
        SlotHeader::new(self.index, self.identifier)
    }
}
