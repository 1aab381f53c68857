//! On-disk layout for decompiled banks
//!
//! A decompiled bank is a directory holding, per slot `NN` (00-63):
//! `wavetable_NN.wav` (mono, 16-bit, 44.1 kHz) and `wavetable_NN.id` (the raw
//! 4-byte identifier), plus `footer.bin` with the bank's trailing bytes.

use std::io::Write;
use std::path::{Path, PathBuf};

use medusa_format::{assign, Footer, Identifier, SAMPLE_RATE, SLOTS_LEN, SLOT_COUNT};
use serde::Serialize;

use crate::audio::{read_wav, wav_spec, write_wav, SlotAudio};
use crate::builder::BankBuilder;
use crate::error::{MedusaError, Result, SourceFailure};
use crate::ops::{decompile, extract_slot, recompile, DecompileOptions, Decompiled};
use crate::select::collect_sources;

/// Footer sidecar written by [`decompile_to_dir`]
pub const FOOTER_FILE: &str = "footer.bin";

/// Full source bank some older tooling leaves next to the WAVs
pub const LEGACY_BANK_FILE: &str = "original.polyend";

pub fn wav_name(index: usize) -> String {
    format!("wavetable_{index:02}.wav")
}

pub fn id_name(index: usize) -> String {
    format!("wavetable_{index:02}.id")
}

/// `waves/` next to the bank file
pub fn default_output_dir(bank: &Path) -> PathBuf {
    bank.parent().unwrap_or_else(|| Path::new(".")).join("waves")
}

pub fn read_bank(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| MedusaError::io(path, e))
}

/// Write a bank through a temporary file in the destination directory
///
/// The destination is replaced in one rename; a failed write leaves it
/// untouched.
pub fn write_bank(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(|e| MedusaError::io(parent, e))?;

    let mut staging = tempfile::Builder::new()
        .prefix(".medusa-")
        .suffix(".tmp")
        .tempfile_in(parent)
        .map_err(|e| MedusaError::io(parent, e))?;
    staging
        .write_all(bytes)
        .and_then(|_| staging.as_file().sync_all())
        .map_err(|e| MedusaError::io(staging.path(), e))?;
    staging
        .persist(path)
        .map_err(|e| MedusaError::io(path, e.error))?;

    tracing::info!("Wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

#[derive(Debug, Clone, Serialize)]
pub struct DirDecompile {
    pub output_dir: PathBuf,
    pub files: Vec<PathBuf>,
    #[serde(skip)]
    pub decompiled: Decompiled,
}

/// Decompile a bank file into a directory of WAVs and sidecars
pub fn decompile_to_dir(
    bank: &Path,
    output_dir: &Path,
    options: &DecompileOptions,
) -> Result<DirDecompile> {
    let bytes = read_bank(bank)?;
    let decompiled = decompile(&bytes, options)?;

    std::fs::create_dir_all(output_dir).map_err(|e| MedusaError::io(output_dir, e))?;

    let mut files = Vec::with_capacity(decompiled.slots.len());
    for (index, slot) in decompiled.slots.iter().enumerate() {
        let wav = output_dir.join(wav_name(index));
        write_wav(&wav, &slot.samples)?;

        if let Some(identifier) = slot.identifier {
            let id = output_dir.join(id_name(index));
            std::fs::write(&id, identifier.as_bytes()).map_err(|e| MedusaError::io(&id, e))?;
        }
        tracing::debug!("Slot {:02} -> {}", index, wav.display());
        files.push(wav);
    }

    let footer = output_dir.join(FOOTER_FILE);
    std::fs::write(&footer, decompiled.footer.as_bytes()).map_err(|e| MedusaError::io(&footer, e))?;

    tracing::info!(
        "Extracted {} wavetables from {} to {}",
        files.len(),
        bank.display(),
        output_dir.display()
    );

    Ok(DirDecompile {
        output_dir: output_dir.to_path_buf(),
        files,
        decompiled,
    })
}

fn read_slot(dir: &Path, index: usize) -> Result<SlotAudio> {
    let path = dir.join(wav_name(index));
    if !path.is_file() {
        return Err(MedusaError::MissingSlot {
            index,
            path: Some(path),
        });
    }

    let spec = wav_spec(&path).map_err(|e| MedusaError::wav(&path, e))?;
    if spec.channels != 1
        || spec.bits_per_sample != 16
        || spec.sample_format != hound::SampleFormat::Int
        || spec.sample_rate != SAMPLE_RATE
    {
        return Err(MedusaError::InvalidAudioFormat {
            index,
            path: Some(path),
            channels: spec.channels,
            bits: spec.bits_per_sample,
            sample_rate: spec.sample_rate,
        });
    }
    let audio = read_wav(&path).map_err(|e| MedusaError::wav(&path, e))?;

    let id_path = dir.join(id_name(index));
    let identifier = if id_path.is_file() {
        let raw = std::fs::read(&id_path).map_err(|e| MedusaError::io(&id_path, e))?;
        let identifier = Identifier::from_slice(&raw).map_err(|_| MedusaError::InvalidIdentifier {
            path: id_path.clone(),
            len: raw.len(),
        })?;
        Some(identifier)
    } else {
        None
    };

    Ok(SlotAudio::mono(audio.samples, identifier))
}

/// Footer to reuse for a directory, if it carries one
fn read_footer(dir: &Path) -> Result<Option<Footer>> {
    let sidecar = dir.join(FOOTER_FILE);
    if sidecar.is_file() {
        let bytes = std::fs::read(&sidecar).map_err(|e| MedusaError::io(&sidecar, e))?;
        return Ok(Some(Footer::verbatim(bytes)));
    }

    let legacy = dir.join(LEGACY_BANK_FILE);
    if legacy.is_file() {
        let bytes = read_bank(&legacy)?;
        if bytes.len() >= SLOTS_LEN {
            tracing::debug!("Using footer from {}", legacy.display());
            return Ok(Some(Footer::verbatim(&bytes[SLOTS_LEN..])));
        }
        tracing::warn!(
            "{} is too short to hold a footer, using the default",
            legacy.display()
        );
    }
    Ok(None)
}

/// Slot buffers and footer from a decompiled directory
pub fn read_slot_dir(dir: &Path) -> Result<(Vec<SlotAudio>, Option<Footer>)> {
    let slots = (0..SLOT_COUNT)
        .map(|index| read_slot(dir, index))
        .collect::<Result<Vec<_>>>()?;
    Ok((slots, read_footer(dir)?))
}

#[derive(Debug, Clone, Serialize)]
pub struct DirRecompile {
    pub output: PathBuf,
    pub files: Vec<PathBuf>,
    pub preserved_footer: bool,
}

/// Rebuild a bank file from a decompiled directory
pub fn recompile_from_dir(dir: &Path, output: &Path) -> Result<DirRecompile> {
    let (slots, footer) = read_slot_dir(dir)?;
    let preserved_footer = footer.is_some();
    let bytes = recompile(&slots, footer)?;
    write_bank(output, &bytes)?;

    Ok(DirRecompile {
        output: output.to_path_buf(),
        files: (0..SLOT_COUNT).map(|i| dir.join(wav_name(i))).collect(),
        preserved_footer,
    })
}

/// Write one slot as `wavetable_NN.wav` (or `.bin` with the whole 16000-byte record) plus its `.id`
pub fn extract_to_dir(bank: &Path, index: usize, output_dir: &Path, raw: bool) -> Result<PathBuf> {
    let bytes = read_bank(bank)?;
    let (audio, record) = extract_slot(&bytes, index)?;

    std::fs::create_dir_all(output_dir).map_err(|e| MedusaError::io(output_dir, e))?;
    if let Some(identifier) = audio.identifier {
        let id = output_dir.join(id_name(index));
        std::fs::write(&id, identifier.as_bytes()).map_err(|e| MedusaError::io(&id, e))?;
    }

    let output = if raw {
        let path = output_dir.join(format!("wavetable_{index:02}.bin"));
        std::fs::write(&path, record).map_err(|e| MedusaError::io(&path, e))?;
        path
    } else {
        let path = output_dir.join(wav_name(index));
        write_wav(&path, &audio.samples)?;
        path
    };

    tracing::info!("Extracted slot {:02} to {}", index, output.display());
    Ok(output)
}

#[derive(Debug, Clone, Serialize)]
pub struct DirProcess {
    pub output_dir: PathBuf,
    /// Source file per written slot, in slot order
    pub sources: Vec<PathBuf>,
    pub files: Vec<PathBuf>,
    pub failures: Vec<SourceFailure>,
}

/// Turn a folder of audio into an editable decompiled directory
///
/// Writes `wavetable_NN.wav` and `wavetable_NN.id` for each usable source,
/// the same layout [`recompile_from_dir`] reads, without building a bank.
/// Slot files left over from an earlier, larger run are removed.
pub fn process_to_dir(
    builder: &BankBuilder,
    input_dir: &Path,
    output_dir: &Path,
    extensions: &[String],
    recursive: bool,
) -> Result<DirProcess> {
    let candidates = collect_sources(input_dir, extensions, recursive)?;
    let processed = builder.process(&candidates)?;

    std::fs::create_dir_all(output_dir).map_err(|e| MedusaError::io(output_dir, e))?;

    let mut sources = Vec::with_capacity(processed.payloads.len());
    let mut files = Vec::with_capacity(processed.payloads.len());
    for (index, (source, payload)) in processed.payloads.into_iter().enumerate() {
        let wav = output_dir.join(wav_name(index));
        write_wav(&wav, &payload.to_samples())?;

        let id = output_dir.join(id_name(index));
        let identifier = assign(index, None);
        std::fs::write(&id, identifier.as_bytes()).map_err(|e| MedusaError::io(&id, e))?;

        tracing::debug!("{} -> {}", source.display(), wav.display());
        sources.push(source);
        files.push(wav);
    }

    for index in files.len()..SLOT_COUNT {
        for stale in [output_dir.join(wav_name(index)), output_dir.join(id_name(index))] {
            if stale.is_file() {
                std::fs::remove_file(&stale).map_err(|e| MedusaError::io(&stale, e))?;
            }
        }
    }
    if files.len() < SLOT_COUNT {
        tracing::warn!(
            "Only {} of {} slots written; add waves before recompiling",
            files.len(),
            SLOT_COUNT
        );
    }

    tracing::info!(
        "Processed {} sources from {} into {}",
        files.len(),
        input_dir.display(),
        output_dir.display()
    );
    Ok(DirProcess {
        output_dir: output_dir.to_path_buf(),
        sources,
        files,
        failures: processed.failures,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        assert_eq!(wav_name(3), "wavetable_03.wav");
        assert_eq!(id_name(63), "wavetable_63.id");
        assert_eq!(
            default_output_dir(Path::new("/banks/pads.polyend")),
            PathBuf::from("/banks/waves")
        );
    }

    #[test]
    fn test_write_bank_replaces_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out.polyend");
        write_bank(&path, b"first").unwrap();
        write_bank(&path, b"second").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"second");

        // no staging files left behind
        let leftovers: Vec<_> = std::fs::read_dir(path.parent().unwrap())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with(".medusa-"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_legacy_footer() {
        let dir = tempfile::tempdir().unwrap();
        let mut legacy = vec![0u8; SLOTS_LEN];
        legacy.extend_from_slice(b"tail");
        std::fs::write(dir.path().join(LEGACY_BANK_FILE), &legacy).unwrap();

        assert_eq!(read_footer(dir.path()).unwrap(), Some(Footer::verbatim(&b"tail"[..])));

        std::fs::write(dir.path().join(FOOTER_FILE), b"newer").unwrap();
        assert_eq!(read_footer(dir.path()).unwrap(), Some(Footer::verbatim(&b"newer"[..])));
    }

    #[test]
    fn test_bad_identifier_names_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        write_wav(&dir.path().join(wav_name(0)), &[0; 16]).unwrap();
        std::fs::write(dir.path().join(id_name(0)), [1u8, 2, 3]).unwrap();

        match read_slot(dir.path(), 0) {
            Err(err @ MedusaError::InvalidIdentifier { .. }) => {
                let message = err.to_string();
                assert!(message.contains("wavetable_00.id"), "{message}");
                assert!(message.contains("got 3"), "{message}");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_process_removes_stale_slots() {
        let sources = tempfile::tempdir().unwrap();
        for i in 0..3 {
            write_wav(&sources.path().join(format!("{i}.wav")), &[500; 32]).unwrap();
        }
        let out = tempfile::tempdir().unwrap();
        write_wav(&out.path().join(wav_name(10)), &[1]).unwrap();
        std::fs::write(out.path().join(id_name(10)), [0u8; 4]).unwrap();

        let builder = BankBuilder::new(crate::transcode::WavDecoder, Default::default());
        let extensions = vec!["wav".to_string()];
        let result = process_to_dir(&builder, sources.path(), out.path(), &extensions, false).unwrap();

        assert_eq!(result.files.len(), 3);
        assert_eq!(result.sources[2], sources.path().join("2.wav"));
        assert_eq!(std::fs::read(out.path().join(id_name(1))).unwrap(), assign(1, None).as_bytes());
        assert!(!out.path().join(wav_name(10)).exists());
        assert!(!out.path().join(id_name(10)).exists());

        let slot = read_slot(out.path(), 0).unwrap();
        assert_eq!(slot.samples.len(), medusa_format::SAMPLES_PER_SLOT);
        assert_eq!(&slot.samples[..32], &[500; 32]);
    }

    #[test]
    fn test_no_footer() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(read_footer(dir.path()).unwrap(), None);
    }
}
