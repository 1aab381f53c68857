//! Whole-bank container

use crate::codec::{self, ParseOptions};
use crate::error::FormatError;
use crate::slot::WavetableSlot;
use crate::SLOT_COUNT;

/// Length of the footer written into fresh banks
pub const SYNTHETIC_FOOTER_LEN: usize = 128;

/// Opaque trailing bytes after slot 63
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Footer(Vec<u8>);

impl Footer {
    /// Footer used when no source bank is available
    pub fn synthetic() -> Self {
        let mut bytes = vec![0u8; SYNTHETIC_FOOTER_LEN];
        bytes[0x00..0x08].copy_from_slice(&[0x02, 0x00, 0x00, 0x3C, 0x1F, 0x38, 0xF2, 0xE1]);
        bytes[0x40..0x44].copy_from_slice(&[0x21, 0x00, 0x00, 0x00]);
        Self(bytes)
    }

    /// Footer carried over byte-for-byte from an existing bank
    pub fn verbatim(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for Footer {
    fn default() -> Self {
        Self::synthetic()
    }
}

/// 64 slots in index order plus the footer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WavetableBank {
    slots: Vec<WavetableSlot>,
    footer: Footer,
}

impl WavetableBank {
    /// Assemble a bank, checking slot count and ordering
    pub fn new(slots: Vec<WavetableSlot>, footer: Footer) -> Result<Self, FormatError> {
        if slots.len() != SLOT_COUNT {
            return Err(FormatError::SlotCount { found: slots.len() });
        }
        if let Some((position, slot)) = slots
            .iter()
            .enumerate()
            .find(|(position, slot)| slot.index() != *position)
        {
            return Err(FormatError::SlotOrder {
                position,
                index: slot.index(),
            });
        }
        Ok(Self { slots, footer })
    }

    pub fn slots(&self) -> &[WavetableSlot] {
        &self.slots
    }

    pub fn slot(&self, index: usize) -> Option<&WavetableSlot> {
        self.slots.get(index)
    }

    pub fn footer(&self) -> &Footer {
        &self.footer
    }

    pub fn into_parts(self) -> (Vec<WavetableSlot>, Footer) {
        (self.slots, self.footer)
    }

    /// Serialize the bank
    pub fn to_bytes(&self) -> Vec<u8> {
        codec::serialize(self)
    }

    /// Parse a strict 64-slot bank, discarding diagnostics
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FormatError> {
        codec::parse(bytes, &ParseOptions::default())?.into_bank()
    }
}
