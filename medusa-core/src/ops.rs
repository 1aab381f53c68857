//! In-memory bank operations
//!
//! These work on byte buffers and PCM only; [`crate::files`] layers the
//! on-disk conventions on top.

use medusa_format::{
    assign, parse, serialize, Diagnostic, Footer, Identifier, ParseMode, ParseOptions,
    WavetableBank, WavetableSlot, SAMPLES_PER_SLOT, SAMPLE_RATE, SLOT_COUNT, SLOT_SIZE,
};
use serde::Serialize;

use crate::audio::SlotAudio;
use crate::config::MedusaConfig;
use crate::error::{MedusaError, Result};
use crate::process::fit;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecompileOptions {
    /// Require exactly 64 slots
    pub strict: bool,
    /// Collect header diagnostics
    pub validate: bool,
}

impl Default for DecompileOptions {
    fn default() -> Self {
        Self {
            strict: true,
            validate: true,
        }
    }
}

impl DecompileOptions {
    pub fn from_config(config: &MedusaConfig) -> Self {
        Self {
            strict: config.decompile.strict,
            validate: config.decompile.validate,
        }
    }

    fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            mode: if self.validate {
                ParseMode::Validated
            } else {
                ParseMode::Segmentation
            },
            strict_slot_count: self.strict,
        }
    }
}

/// Per-slot audio and the bank's footer
#[derive(Debug, Clone)]
pub struct Decompiled {
    pub slots: Vec<SlotAudio>,
    pub footer: Footer,
    pub diagnostics: Vec<Diagnostic>,
}

/// Split a bank into one mono 44.1 kHz buffer per slot
pub fn decompile(bytes: &[u8], options: &DecompileOptions) -> Result<Decompiled> {
    let decoded = parse(bytes, &options.parse_options())?;
    let slots = decoded
        .slots
        .iter()
        .map(|slot| SlotAudio::mono(slot.payload().to_samples(), Some(slot.identifier())))
        .collect();
    Ok(Decompiled {
        slots,
        footer: decoded.footer,
        diagnostics: decoded.diagnostics,
    })
}

/// Assemble 64 buffers into a bank
///
/// Buffers are fitted to the payload size; a missing identifier falls back to
/// the factory tag for its slot and a missing footer to the synthetic one.
pub fn recompile_bank(buffers: &[SlotAudio], footer: Option<Footer>) -> Result<WavetableBank> {
    if buffers.len() < SLOT_COUNT {
        return Err(MedusaError::MissingSlot {
            index: buffers.len(),
            path: None,
        });
    }

    let mut slots = Vec::with_capacity(SLOT_COUNT);
    for (index, buffer) in buffers.iter().enumerate() {
        if buffer.channels != 1 || buffer.sample_rate != SAMPLE_RATE {
            return Err(MedusaError::InvalidAudioFormat {
                index,
                path: None,
                channels: buffer.channels,
                bits: 16,
                sample_rate: buffer.sample_rate,
            });
        }
        if buffer.samples.len() != SAMPLES_PER_SLOT {
            tracing::debug!(
                "Slot {:02}: fitting {} samples to {}",
                index,
                buffer.samples.len(),
                SAMPLES_PER_SLOT
            );
        }
        slots.push(WavetableSlot::new(
            index,
            assign(index, buffer.identifier),
            fit(&buffer.samples),
        ));
    }

    Ok(WavetableBank::new(slots, footer.unwrap_or_default())?)
}

/// [`recompile_bank`], serialized
pub fn recompile(buffers: &[SlotAudio], footer: Option<Footer>) -> Result<Vec<u8>> {
    Ok(serialize(&recompile_bank(buffers, footer)?))
}

/// Byte comparison of two banks
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Verification {
    Identical {
        len: usize,
    },
    SizeMismatch {
        expected: usize,
        actual: usize,
    },
    Differs {
        offset: usize,
        /// Up to 16 bytes from `offset`, hex
        expected: String,
        actual: String,
    },
}

impl Verification {
    pub fn is_identical(&self) -> bool {
        matches!(self, Self::Identical { .. })
    }
}

const EXCERPT_LEN: usize = 16;

pub fn verify(expected: &[u8], actual: &[u8]) -> Verification {
    if expected.len() != actual.len() {
        return Verification::SizeMismatch {
            expected: expected.len(),
            actual: actual.len(),
        };
    }
    match expected.iter().zip(actual).position(|(a, b)| a != b) {
        None => Verification::Identical {
            len: expected.len(),
        },
        Some(offset) => {
            let end = (offset + EXCERPT_LEN).min(expected.len());
            Verification::Differs {
                offset,
                expected: hex_excerpt(&expected[offset..end]),
                actual: hex_excerpt(&actual[offset..end]),
            }
        }
    }
}

fn hex_excerpt(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// One line of a bank listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotListing {
    pub index: usize,
    pub offset: usize,
    pub identifier: Identifier,
    pub canonical: bool,
    pub peak: u16,
}

#[derive(Debug, Clone, Serialize)]
pub struct Inspection {
    pub slots: Vec<SlotListing>,
    pub footer_len: usize,
    pub diagnostics: Vec<Diagnostic>,
}

/// Summarize every slot of a bank
pub fn inspect(bytes: &[u8], options: &DecompileOptions) -> Result<Inspection> {
    let decoded = parse(bytes, &options.parse_options())?;
    let slots = decoded
        .slots
        .iter()
        .map(|slot| SlotListing {
            index: slot.index(),
            offset: slot.index() * SLOT_SIZE,
            identifier: slot.identifier(),
            canonical: medusa_format::canonical(slot.index()) == Some(slot.identifier()),
            peak: slot
                .payload()
                .to_samples()
                .iter()
                .map(|s| s.unsigned_abs())
                .max()
                .unwrap_or(0),
        })
        .collect();
    Ok(Inspection {
        slots,
        footer_len: decoded.footer.len(),
        diagnostics: decoded.diagnostics,
    })
}

/// A single slot: its audio and the full 16000-byte record as stored
pub fn extract_slot(bytes: &[u8], index: usize) -> Result<(SlotAudio, Vec<u8>)> {
    let decoded = parse(bytes, &ParseOptions::segmentation().with_strict_slot_count(false))?;
    let slot = decoded
        .slots
        .get(index)
        .ok_or(MedusaError::SlotIndex(index))?;
    let audio = SlotAudio::mono(slot.payload().to_samples(), Some(slot.identifier()));
    let record = bytes[index * SLOT_SIZE..(index + 1) * SLOT_SIZE].to_vec();
    Ok((audio, record))
}
