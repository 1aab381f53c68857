//! Byte-level checks against a bank assembled by hand from the documented layout

use medusa_format::{
    parse, serialize, Footer, Identifier, ParseOptions, SlotRole, WavetableBank, BANK_FILE_SIZE,
    CANONICAL_IDENTIFIERS, SLOT_COUNT, SLOT_SIZE,
};

/// Build a bank without going through the codec
fn hand_built_bank() -> Vec<u8> {
    let mut bytes = Vec::with_capacity(BANK_FILE_SIZE);
    for index in 0..SLOT_COUNT {
        let mut record = vec![0u8; SLOT_SIZE];
        let marker: [u8; 4] = if index == 0 {
            [0x21, 0x00, 0x01, 0x00]
        } else {
            [0x02, 0x00, 0x00, 0x3C]
        };
        record[0..4].copy_from_slice(&marker);
        record[4..8].copy_from_slice(CANONICAL_IDENTIFIERS[index].as_bytes());
        record[0x40..0x44].copy_from_slice(&[0x04, 0x00, 0x00, 0x3C]);
        record[0x44..0x46].copy_from_slice(&4u16.to_le_bytes());
        record[0x46..0x48].copy_from_slice(&(index as u16).to_le_bytes());

        // one sine-ish cycle per slot, different pitch per slot
        for n in 0..7936usize {
            let phase = (n * (index + 1)) as f64 / 7936.0 * std::f64::consts::TAU;
            let sample = (phase.sin() * 20000.0) as i16;
            let at = 0x80 + n * 2;
            record[at..at + 2].copy_from_slice(&sample.to_le_bytes());
        }
        bytes.extend_from_slice(&record);
    }

    let mut footer = vec![0u8; 128];
    footer[..8].copy_from_slice(&[0x02, 0x00, 0x00, 0x3C, 0x1F, 0x38, 0xF2, 0xE1]);
    footer[0x40..0x44].copy_from_slice(&[0x21, 0x00, 0x00, 0x00]);
    bytes.extend_from_slice(&footer);
    bytes
}

#[test]
fn test_reference_bank_roundtrip_is_byte_identical() {
    let original = hand_built_bank();
    assert_eq!(original.len(), 1_024_128);

    let decoded = parse(&original, &ParseOptions::default()).unwrap();
    assert!(decoded.diagnostics.is_empty(), "{:?}", decoded.diagnostics);

    let bank = decoded.into_bank().unwrap();
    assert_eq!(bank.footer(), &Footer::synthetic());
    assert_eq!(serialize(&bank), original);
}

#[test]
fn test_foreign_footer_survives_rebuild() {
    let mut original = hand_built_bank();
    original.truncate(SLOT_COUNT * SLOT_SIZE);
    original.extend_from_slice(b"\x02\x00\x00\x3cfooter-from-a-device");

    let bank = WavetableBank::from_bytes(&original).unwrap();
    let (slots, footer) = bank.into_parts();
    let rebuilt = WavetableBank::new(slots, footer).unwrap();
    assert_eq!(rebuilt.to_bytes(), original);
}

#[test]
fn test_slot_samples_decode() {
    let bank = WavetableBank::from_bytes(&hand_built_bank()).unwrap();
    let samples = bank.slot(0).unwrap().payload().to_samples();
    assert_eq!(samples.len(), 7936);
    assert_eq!(samples[0], 0);
    assert!(samples.iter().any(|&s| s > 19000));
    assert_eq!(bank.slot(10).unwrap().identifier(), Identifier([0x14, 0x37, 0x17, 0xb0]));
    assert_eq!(bank.slot(0).unwrap().role(), SlotRole::First);
    assert_eq!(bank.slot(1).unwrap().role(), SlotRole::Standard);
}
