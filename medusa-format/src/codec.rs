//! Bank parsing and serialization
//!
//! Parsing never rejects a bank over field values. It splits the input into
//! 16000-byte records, takes identifier and payload from each, and keeps
//! whatever follows the last record as the footer. In validated mode every
//! field that differs from what [`serialize`] would write is reported as a
//! [`Diagnostic`].

use std::fmt;

use serde::Serialize;

use crate::bank::{Footer, WavetableBank, SYNTHETIC_FOOTER_LEN};
use crate::error::FormatError;
use crate::slot::{
    SlotHeader, SlotRole, WavetableSlot, RESERVED_RANGES, SUBHEADER_MARKER, SUBHEADER_SIZE,
};
use crate::{PAYLOAD_OFFSET, SLOTS_LEN, SLOT_COUNT, SLOT_SIZE};

/// How much checking [`parse`] performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    /// Split into records only
    Segmentation,
    /// Split and report field mismatches
    #[default]
    Validated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    pub mode: ParseMode,
    /// Require exactly 64 records
    pub strict_slot_count: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            mode: ParseMode::Validated,
            strict_slot_count: true,
        }
    }
}

impl ParseOptions {
    pub fn segmentation() -> Self {
        Self {
            mode: ParseMode::Segmentation,
            ..Self::default()
        }
    }

    pub fn with_strict_slot_count(mut self, strict: bool) -> Self {
        self.strict_slot_count = strict;
        self
    }
}

/// A field that differs from its canonical value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiagnosticKind {
    HeaderMarker { expected: [u8; 4], found: [u8; 4] },
    SubheaderMarker { found: [u8; 4] },
    SubheaderSize { found: u16 },
    SubheaderIndex { found: u16 },
    ReservedBytes { offset: usize },
    FooterLength { found: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Slot the finding belongs to; `None` for bank-level findings
    pub slot: Option<usize>,
    #[serde(flatten)]
    pub kind: DiagnosticKind,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(slot) = self.slot {
            write!(f, "slot {slot:02}: ")?;
        }
        match &self.kind {
            DiagnosticKind::HeaderMarker { expected, found } => write!(
                f,
                "header marker {} (expected {})",
                hex::encode(found),
                hex::encode(expected)
            ),
            DiagnosticKind::SubheaderMarker { found } => write!(
                f,
                "subheader marker {} (expected {})",
                hex::encode(found),
                hex::encode(SUBHEADER_MARKER)
            ),
            DiagnosticKind::SubheaderSize { found } => {
                write!(f, "subheader size {found} (expected {SUBHEADER_SIZE})")
            }
            DiagnosticKind::SubheaderIndex { found } => write!(
                f,
                "subheader index {found} (expected {})",
                self.slot.unwrap_or_default()
            ),
            DiagnosticKind::ReservedBytes { offset } => {
                write!(f, "non-zero reserved byte at 0x{offset:02x}")
            }
            DiagnosticKind::FooterLength { found } => {
                write!(f, "footer is {found} bytes (fresh banks use {SYNTHETIC_FOOTER_LEN})")
            }
        }
    }
}

/// Parse result: records, footer and anything worth reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedBank {
    pub slots: Vec<WavetableSlot>,
    pub footer: Footer,
    pub diagnostics: Vec<Diagnostic>,
}

impl DecodedBank {
    /// Convert to a bank; fails unless exactly 64 records were found
    pub fn into_bank(self) -> Result<WavetableBank, FormatError> {
        WavetableBank::new(self.slots, self.footer)
    }
}

/// Parse bank bytes
pub fn parse(bytes: &[u8], options: &ParseOptions) -> Result<DecodedBank, FormatError> {
    let count = bytes.len() / SLOT_SIZE;
    if count == 0 {
        return Err(FormatError::Undersized { len: bytes.len() });
    }
    if options.strict_slot_count && count != SLOT_COUNT {
        return Err(FormatError::SlotCount { found: count });
    }

    let mut slots = Vec::with_capacity(count);
    let mut diagnostics = Vec::new();

    for (index, record) in bytes.chunks_exact(SLOT_SIZE).enumerate() {
        let header = SlotHeader::from_bytes(record).ok_or(FormatError::Undersized {
            len: record.len(),
        })?;
        if options.mode == ParseMode::Validated {
            check_record(index, &header, record, &mut diagnostics);
        }
        slots.push(WavetableSlot::from_payload_bytes(
            index,
            header.identifier,
            &record[PAYLOAD_OFFSET..],
        )?);
    }

    let footer = Footer::verbatim(&bytes[count * SLOT_SIZE..]);
    if options.mode == ParseMode::Validated && footer.len() != SYNTHETIC_FOOTER_LEN {
        diagnostics.push(Diagnostic {
            slot: None,
            kind: DiagnosticKind::FooterLength {
                found: footer.len(),
            },
        });
    }

    for diagnostic in &diagnostics {
        tracing::warn!("{}", diagnostic);
    }
    tracing::debug!(
        "Parsed {} slots, {} footer bytes, {} diagnostics",
        slots.len(),
        footer.len(),
        diagnostics.len()
    );

    Ok(DecodedBank {
        slots,
        footer,
        diagnostics,
    })
}

fn check_record(index: usize, header: &SlotHeader, record: &[u8], out: &mut Vec<Diagnostic>) {
    let mut report = |kind| {
        out.push(Diagnostic {
            slot: Some(index),
            kind,
        })
    };

    let expected = SlotRole::for_index(index).marker();
    if header.marker != expected {
        report(DiagnosticKind::HeaderMarker {
            expected,
            found: header.marker,
        });
    }
    if header.subheader_marker != SUBHEADER_MARKER {
        report(DiagnosticKind::SubheaderMarker {
            found: header.subheader_marker,
        });
    }
    if header.subheader_size != SUBHEADER_SIZE {
        report(DiagnosticKind::SubheaderSize {
            found: header.subheader_size,
        });
    }
    if usize::from(header.index) != index {
        report(DiagnosticKind::SubheaderIndex {
            found: header.index,
        });
    }
    for range in RESERVED_RANGES {
        let start = range.start;
        if let Some(pos) = record[range].iter().position(|&b| b != 0) {
            report(DiagnosticKind::ReservedBytes { offset: start + pos });
        }
    }
}

/// Serialize a bank: 64 slot records, then the footer
pub fn serialize(bank: &WavetableBank) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(SLOTS_LEN + bank.footer().len());
    for slot in bank.slots() {
        bytes.extend_from_slice(&slot.header().to_bytes());
        bytes.extend_from_slice(slot.payload().as_bytes());
    }
    bytes.extend_from_slice(bank.footer().as_bytes());
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifier::{assign, Identifier, CANONICAL_IDENTIFIERS};
    use crate::slot::Payload;
    use crate::BANK_FILE_SIZE;

    fn ramp_bank(footer: Footer) -> WavetableBank {
        let slots = (0..SLOT_COUNT)
            .map(|i| {
                let mut payload = Payload::zeroed();
                for (n, b) in payload.as_mut_bytes().iter_mut().enumerate() {
                    *b = (n * 7 + i) as u8;
                }
                WavetableSlot::new(i, assign(i, None), payload)
            })
            .collect();
        WavetableBank::new(slots, footer).unwrap()
    }

    #[test]
    fn test_roundtrip_with_synthetic_footer() {
        let bank = ramp_bank(Footer::synthetic());
        let bytes = serialize(&bank);
        assert_eq!(bytes.len(), BANK_FILE_SIZE);

        let decoded = parse(&bytes, &ParseOptions::default()).unwrap();
        assert!(decoded.diagnostics.is_empty());
        assert_eq!(decoded.into_bank().unwrap(), bank);
    }

    #[test]
    fn test_roundtrip_preserves_odd_footer() {
        let bank = ramp_bank(Footer::verbatim(vec![9u8; 37]));
        let bytes = serialize(&bank);
        assert_eq!(bytes.len(), SLOTS_LEN + 37);

        let decoded = parse(&bytes, &ParseOptions::default()).unwrap();
        assert_eq!(decoded.footer.as_bytes(), &[9u8; 37][..]);
        assert_eq!(
            decoded.diagnostics,
            vec![Diagnostic {
                slot: None,
                kind: DiagnosticKind::FooterLength { found: 37 }
            }]
        );
        assert_eq!(decoded.into_bank().unwrap(), bank);
    }

    #[test]
    fn test_serialized_markers() {
        let bytes = serialize(&ramp_bank(Footer::synthetic()));
        assert_eq!(&bytes[0..4], &[0x21, 0x00, 0x01, 0x00]);
        assert_eq!(&bytes[SLOT_SIZE..SLOT_SIZE + 4], &[0x02, 0x00, 0x00, 0x3C]);
        assert_eq!(
            &bytes[SLOT_SIZE + 4..SLOT_SIZE + 8],
            CANONICAL_IDENTIFIERS[1].as_bytes()
        );
        let last = 63 * SLOT_SIZE;
        assert_eq!(&bytes[last + 0x40..last + 0x48], &[0x04, 0x00, 0x00, 0x3C, 0x04, 0x00, 63, 0x00]);
    }

    #[test]
    fn test_undersized() {
        assert_eq!(
            parse(&[0u8; 100], &ParseOptions::default()),
            Err(FormatError::Undersized { len: 100 })
        );
    }

    #[test]
    fn test_strict_slot_count() {
        let bytes = vec![0u8; SLOT_SIZE * 3];
        assert_eq!(
            parse(&bytes, &ParseOptions::default()),
            Err(FormatError::SlotCount { found: 3 })
        );

        let lenient = ParseOptions::segmentation().with_strict_slot_count(false);
        let decoded = parse(&bytes, &lenient).unwrap();
        assert_eq!(decoded.slots.len(), 3);
        assert!(decoded.footer.is_empty());
        assert!(decoded.diagnostics.is_empty());
        assert!(matches!(
            decoded.into_bank(),
            Err(FormatError::SlotCount { found: 3 })
        ));
    }

    #[test]
    fn test_validated_reports_without_aborting() {
        let mut bytes = serialize(&ramp_bank(Footer::synthetic()));
        let slot5 = 5 * SLOT_SIZE;
        bytes[slot5] = 0x21;
        bytes[slot5 + 0x46] = 9;
        bytes[slot5 + 0x10] = 1;

        let decoded = parse(&bytes, &ParseOptions::default()).unwrap();
        let kinds: Vec<_> = decoded.diagnostics.iter().map(|d| (d.slot, d.kind.clone())).collect();
        assert_eq!(
            kinds,
            vec![
                (
                    Some(5),
                    DiagnosticKind::HeaderMarker {
                        expected: [0x02, 0x00, 0x00, 0x3C],
                        found: [0x21, 0x00, 0x00, 0x3C],
                    }
                ),
                (Some(5), DiagnosticKind::SubheaderIndex { found: 9 }),
                (Some(5), DiagnosticKind::ReservedBytes { offset: 0x10 }),
            ]
        );
        // payload and identifier still extracted
        assert_eq!(decoded.slots[5].identifier(), CANONICAL_IDENTIFIERS[5]);
        assert_eq!(decoded.slots.len(), SLOT_COUNT);
    }

    #[test]
    fn test_segmentation_ignores_fields() {
        let mut bytes = serialize(&ramp_bank(Footer::synthetic()));
        bytes[0] = 0xFF;
        let decoded = parse(&bytes, &ParseOptions::segmentation()).unwrap();
        assert!(decoded.diagnostics.is_empty());
    }

    #[test]
    fn test_identifier_preserved_verbatim() {
        let mut bytes = serialize(&ramp_bank(Footer::synthetic()));
        bytes[4..8].copy_from_slice(&[0xCA, 0xFE, 0xBA, 0xBE]);
        let bank = WavetableBank::from_bytes(&bytes).unwrap();
        assert_eq!(bank.slots()[0].identifier(), Identifier([0xCA, 0xFE, 0xBA, 0xBE]));
        assert_eq!(bank.to_bytes(), bytes);
    }

    #[test]
    fn test_diagnostic_display() {
        let diagnostic = Diagnostic {
            slot: Some(7),
            kind: DiagnosticKind::SubheaderIndex { found: 3 },
        };
        assert_eq!(diagnostic.to_string(), "slot 07: subheader index 3 (expected 7)");
    }
}
