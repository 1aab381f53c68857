//! Codec errors

use crate::{PAYLOAD_LEN, SLOT_COUNT, SLOT_SIZE};

/// Structural errors that make a bank unusable
///
/// Field-level mismatches inside an otherwise well-formed bank are not
/// errors; see [`crate::Diagnostic`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("bank is {len} bytes, smaller than one {size}-byte slot", size = SLOT_SIZE)]
    Undersized { len: usize },

    #[error("bank has {found} slots (expected {expected})", expected = SLOT_COUNT)]
    SlotCount { found: usize },

    #[error("slot at position {position} claims index {index}")]
    SlotOrder { position: usize, index: usize },

    #[error("slot {index} payload is {len} bytes (expected {expected})", expected = PAYLOAD_LEN)]
    PayloadLength { index: usize, len: usize },

    #[error("identifier must be 4 bytes, got {0}")]
    IdentifierLength(usize),
}
