//! Medusa wavetable toolkit core
//!
//! Decompiles `.polyend` banks into per-slot audio, recompiles them, and
//! builds new banks from arbitrary audio files.
//!
//! # Pipeline
//! ```text
//! source file -> Transcoder -> downmix -> resample 44.1k -> [normalize]
//!             -> [single cycle] -> fit 15872 bytes -> slot payload
//! ```
//!
//! Front ends talk to [`service::BankService`], which reports every result
//! as a serializable [`service::Outcome`].

pub mod audio;
pub mod builder;
pub mod config;
pub mod cycle;
pub mod error;
pub mod files;
pub mod ops;
pub mod process;
pub mod resample;
pub mod select;
pub mod service;
pub mod transcode;

pub use audio::{DecodedAudio, SlotAudio};
pub use builder::{BankBuilder, BuildOptions, BuildReport, ProcessedSources};
pub use config::MedusaConfig;
pub use error::{MedusaError, Result, SourceFailure};
pub use ops::{decompile, recompile, verify, DecompileOptions, Decompiled, Verification};
pub use select::SelectionPolicy;
pub use service::{BankService, LocalService, Operation, Outcome};
pub use transcode::{AutoTranscoder, FfmpegTranscoder, TranscodeError, Transcoder, WavDecoder};

// Re-export the codec so front ends need a single dependency
pub use medusa_format;

use std::path::Path;

/// Create a bank from candidate files and return its bytes
///
/// Convenience over [`BankBuilder`] for callers that handle writing
/// themselves.
pub fn create_bank(
    candidates: &[std::path::PathBuf],
    transcoder: impl Transcoder + 'static,
    options: BuildOptions,
) -> Result<BuildReport> {
    BankBuilder::new(transcoder, options).build(candidates)
}

/// Read, decompile, and report diagnostics for a bank file
pub fn decompile_file(path: &Path, options: &DecompileOptions) -> Result<Decompiled> {
    decompile(&files::read_bank(path)?, options)
}
