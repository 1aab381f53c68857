//! Polyend Medusa wavetable bank format (.polyend)
//!
//! A bank is 64 fixed-size slot records followed by an opaque footer.
//! POD format - no file magic, no length fields.
//!
//! # Layout
//! ```text
//! slot N (16000 bytes, N = 0..63) at N * 16000:
//!   0x00: marker [u8; 4]       21 00 01 00 (slot 0) / 02 00 00 3C (slots 1-63)
//!   0x04: identifier [u8; 4]   opaque, preserved verbatim
//!   0x08: reserved (56 bytes, zero)
//!   0x40: subheader marker     04 00 00 3C
//!   0x44: subheader size u16 LE (always 4)
//!   0x46: slot index u16 LE
//!   0x48: reserved (56 bytes, zero)
//!   0x80: payload (15872 bytes = 7936 x i16 LE, mono, 44100 Hz)
//! footer at 64 * 16000:
//!   opaque trailing bytes (128 bytes in a fresh bank)
//! ```

pub mod bank;
pub mod codec;
pub mod error;
pub mod identifier;
pub mod slot;

pub use bank::{Footer, WavetableBank};
pub use codec::{
    parse, serialize, DecodedBank, Diagnostic, DiagnosticKind, ParseMode, ParseOptions,
};
pub use error::FormatError;
pub use identifier::{assign, canonical, Identifier, CANONICAL_IDENTIFIERS};
pub use slot::{Payload, SlotHeader, SlotRole, WavetableSlot};

/// Size of one serialized slot record
pub const SLOT_SIZE: usize = 16_000;

/// Number of slots in a bank
pub const SLOT_COUNT: usize = 64;

/// Offset of the waveform payload inside a slot record
pub const PAYLOAD_OFFSET: usize = 0x80;

/// Payload length in bytes
pub const PAYLOAD_LEN: usize = SLOT_SIZE - PAYLOAD_OFFSET;

/// Samples per slot payload
pub const SAMPLES_PER_SLOT: usize = PAYLOAD_LEN / 2;

/// Device sample rate (fixed)
pub const SAMPLE_RATE: u32 = 44_100;

/// Size of the slot region of a bank (everything before the footer)
pub const SLOTS_LEN: usize = SLOT_SIZE * SLOT_COUNT;

/// Size of a freshly created bank file
pub const BANK_FILE_SIZE: usize = SLOTS_LEN + bank::SYNTHETIC_FOOTER_LEN;
