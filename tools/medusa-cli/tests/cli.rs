//! Drives the `medusa` binary end to end

use std::path::Path;
use std::process::{Command, Output};

use medusa_core::medusa_format::{Footer, SAMPLES_PER_SLOT, SLOT_COUNT, SLOT_SIZE};
use medusa_core::ops::recompile;
use medusa_core::SlotAudio;

fn medusa(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_medusa"))
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run medusa")
}

fn json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

fn write_fixture_bank(path: &Path) {
    let slots: Vec<SlotAudio> = (0..SLOT_COUNT)
        .map(|i| {
            let samples = (0..SAMPLES_PER_SLOT)
                .map(|n| ((n % 64) as i16 - 32) * (i as i16 + 1))
                .collect();
            SlotAudio::mono(samples, None)
        })
        .collect();
    let bytes = recompile(&slots, Some(Footer::verbatim(vec![0x5A; 96]))).unwrap();
    std::fs::write(path, bytes).unwrap();
}

#[test]
fn test_list_json() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture_bank(&dir.path().join("bank.polyend"));

    let output = medusa(dir.path(), &["list", "bank.polyend", "--json"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let value = json(&output);
    assert_eq!(value["operation"], "inspect");
    assert_eq!(value["slots"], 64);
    assert_eq!(value["listing"]["footer_len"], 96);
    assert_eq!(value["listing"]["slots"][63]["offset"], 63 * 16000);
    assert_eq!(value["listing"]["slots"][1]["canonical"], true);
    // a 96-byte footer is reported, not rejected
    assert_eq!(value["diagnostics"][0]["kind"], "footer_length");
}

#[test]
fn test_decompile_recompile_verify() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture_bank(&dir.path().join("bank.polyend"));

    let output = medusa(dir.path(), &["decompile", "bank.polyend"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(dir.path().join("waves/wavetable_00.wav").is_file());
    assert!(dir.path().join("waves/footer.bin").is_file());

    let output = medusa(
        dir.path(),
        &["recompile", "waves", "rebuilt.polyend", "--verify-with", "bank.polyend", "--json"],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let value = json(&output);
    assert_eq!(value[0]["operation"], "recompile");
    assert_eq!(value[1]["verification"]["result"], "identical");

    assert_eq!(
        std::fs::read(dir.path().join("rebuilt.polyend")).unwrap(),
        std::fs::read(dir.path().join("bank.polyend")).unwrap()
    );
}

#[test]
fn test_verify_mismatch_fails() {
    let dir = tempfile::tempdir().unwrap();
    let bank = dir.path().join("bank.polyend");
    write_fixture_bank(&bank);
    let mut other = std::fs::read(&bank).unwrap();
    other[0x90] ^= 0xFF;
    std::fs::write(dir.path().join("other.polyend"), other).unwrap();

    let output = medusa(dir.path(), &["verify", "bank.polyend", "other.polyend", "--json"]);
    assert!(!output.status.success());
    let value = json(&output);
    assert_eq!(value["success"], false);
    assert_eq!(value["verification"]["result"], "differs");
    assert_eq!(value["verification"]["offset"], 0x90);
}

#[test]
fn test_extract_raw() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture_bank(&dir.path().join("bank.polyend"));

    let output = medusa(dir.path(), &["extract", "bank.polyend", "5", "-o", "out", "--raw"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let raw = std::fs::read(dir.path().join("out/wavetable_05.bin")).unwrap();
    assert_eq!(raw.len(), SLOT_SIZE);
    let bank = std::fs::read(dir.path().join("bank.polyend")).unwrap();
    assert_eq!(raw, bank[5 * SLOT_SIZE..6 * SLOT_SIZE]);
    assert!(dir.path().join("out/wavetable_05.id").is_file());

    let output = medusa(dir.path(), &["extract", "bank.polyend", "64"]);
    assert!(!output.status.success());
}

fn write_sources(dir: &Path, count: usize) {
    std::fs::create_dir(dir).unwrap();
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 44100,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    for i in 0..count {
        let mut writer = hound::WavWriter::create(dir.join(format!("{i:02}.wav")), spec).unwrap();
        writer.write_sample(100i16 * (i as i16 + 1)).unwrap();
        writer.finalize().unwrap();
    }
}

#[test]
fn test_create_needs_64_sources() {
    let dir = tempfile::tempdir().unwrap();
    write_sources(&dir.path().join("samples"), 3);

    let output = medusa(dir.path(), &["create", "samples", "new.polyend"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("only 3 usable"));
    assert!(!dir.path().join("new.polyend").exists());
}

#[test]
fn test_process_then_recompile() {
    let dir = tempfile::tempdir().unwrap();
    write_sources(&dir.path().join("samples"), SLOT_COUNT);

    let output = medusa(dir.path(), &["process", "samples", "waves", "--json"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let value = json(&output);
    assert_eq!(value["operation"], "process");
    assert_eq!(value["slots"], 64);
    assert!(dir.path().join("waves/wavetable_63.wav").is_file());
    assert!(dir.path().join("waves/wavetable_63.id").is_file());

    let output = medusa(dir.path(), &["recompile", "waves", "packed.polyend"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let output = medusa(dir.path(), &["create", "samples", "direct.polyend"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let output = medusa(dir.path(), &["verify", "direct.polyend", "packed.polyend"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stdout));
}

#[test]
fn test_bad_config_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("medusa.toml"), "[build]\nworkers = 0\n").unwrap();
    write_fixture_bank(&dir.path().join("bank.polyend"));

    let output = medusa(dir.path(), &["list", "bank.polyend"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("medusa.toml"));
}
