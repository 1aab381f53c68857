//! Bank creation from arbitrary audio files

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;

use medusa_format::{
    assign, Footer, Payload, WavetableBank, WavetableSlot, SAMPLES_PER_SLOT, SAMPLE_RATE,
    SLOT_COUNT,
};
use rayon::prelude::*;

use crate::audio::DecodedAudio;
use crate::config::MedusaConfig;
use crate::cycle::{extract_cycle, find_cycle};
use crate::error::{MedusaError, Result, SourceFailure};
use crate::process::{downmix, fit, normalize, resample_prefix, resampled_len};
use crate::select::{collect_sources, select_seeded, SelectionPolicy};
use crate::transcode::{TranscodeError, Transcoder};

#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub policy: SelectionPolicy,
    pub seed: Option<u64>,
    /// Worker threads; `None` lets rayon decide
    pub workers: Option<usize>,
    pub source_timeout: Duration,
    pub normalize: bool,
    pub single_cycle: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self::from_config(&MedusaConfig::default())
    }
}

impl BuildOptions {
    pub fn from_config(config: &MedusaConfig) -> Self {
        Self {
            policy: config.build.policy,
            seed: config.build.seed,
            workers: config.build.workers,
            source_timeout: config.source_timeout(),
            normalize: config.build.normalize,
            single_cycle: config.build.single_cycle,
        }
    }
}

/// A created bank and where each slot came from
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub bank: WavetableBank,
    /// Source file per slot, in slot order
    pub sources: Vec<PathBuf>,
    pub failures: Vec<SourceFailure>,
}

/// Resampled length searched for a cycle before widening (one second)
const CYCLE_WINDOW: usize = SAMPLE_RATE as usize;

/// Widest search; beyond this the head of the source is used
const MAX_CYCLE_WINDOW: usize = CYCLE_WINDOW * 8;

/// Resample just enough of `mono` to contain its first cycle
///
/// The window doubles until [`find_cycle`] succeeds, the source runs out, or
/// [`MAX_CYCLE_WINDOW`] is reached.
fn cycle_window(mono: &[i16], sample_rate: u32) -> Vec<i16> {
    let full = resampled_len(mono.len(), sample_rate, SAMPLE_RATE);
    let mut window = CYCLE_WINDOW;
    loop {
        let samples = resample_prefix(mono, sample_rate, SAMPLE_RATE, window);
        if find_cycle(&samples).is_some() || window >= full || window >= MAX_CYCLE_WINDOW {
            return samples;
        }
        window *= 2;
    }
}

/// Downmix, resample, and fit one decoded source
pub fn process_audio(audio: &DecodedAudio, normalize_peak: bool, single_cycle: bool) -> Payload {
    let mono = downmix(&audio.samples, audio.channels);

    // only resample what the slot (or the cycle search) can use
    let mut samples = if single_cycle {
        cycle_window(&mono, audio.sample_rate)
    } else {
        resample_prefix(&mono, audio.sample_rate, SAMPLE_RATE, SAMPLES_PER_SLOT)
    };
    if normalize_peak {
        samples = normalize(&samples);
    }
    if single_cycle {
        samples = extract_cycle(&samples);
    }
    fit(&samples)
}

/// Run `job` on its own thread and stop waiting after `timeout`
///
/// A job that never returns keeps its thread; the builder moves on.
fn run_with_timeout<T, F>(timeout: Duration, job: F) -> std::result::Result<T, TranscodeError>
where
    T: Send + 'static,
    F: FnOnce() -> std::result::Result<T, TranscodeError> + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    std::thread::Builder::new()
        .name("medusa-source".into())
        .spawn(move || {
            let _ = tx.send(job());
        })?;

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(RecvTimeoutError::Timeout) => Err(TranscodeError::Timeout(timeout)),
        Err(RecvTimeoutError::Disconnected) => {
            Err(std::io::Error::other("source thread panicked").into())
        }
    }
}

/// Processed sources in selection order, plus the ones that were skipped
#[derive(Debug, Clone)]
pub struct ProcessedSources {
    pub payloads: Vec<(PathBuf, Payload)>,
    pub failures: Vec<SourceFailure>,
}

pub struct BankBuilder {
    transcoder: Arc<dyn Transcoder>,
    options: BuildOptions,
}

impl BankBuilder {
    pub fn new(transcoder: impl Transcoder + 'static, options: BuildOptions) -> Self {
        Self {
            transcoder: Arc::new(transcoder),
            options,
        }
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Decode and process one source, both under the per-source timeout
    pub fn process_file(&self, path: &Path) -> Result<Payload> {
        let transcoder = Arc::clone(&self.transcoder);
        let owned = path.to_path_buf();
        let (normalize_peak, single_cycle) = (self.options.normalize, self.options.single_cycle);

        run_with_timeout(self.options.source_timeout, move || {
            let audio = transcoder.decode(&owned)?;
            tracing::debug!(
                "Decoded {}: {} frames, {}ch @ {}Hz",
                owned.display(),
                audio.frames(),
                audio.channels,
                audio.sample_rate
            );
            Ok(process_audio(&audio, normalize_peak, single_cycle))
        })
        .map_err(|e| MedusaError::SourceConversion {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Build from every matching file in a directory
    pub fn build_from_dir(
        &self,
        dir: &Path,
        extensions: &[String],
        recursive: bool,
    ) -> Result<BuildReport> {
        let candidates = collect_sources(dir, extensions, recursive)?;
        self.build(&candidates)
    }

    fn select(&self, candidates: &[PathBuf]) -> Vec<PathBuf> {
        let selected = select_seeded(candidates, SLOT_COUNT, self.options.policy, self.options.seed);
        tracing::info!(
            "Processing {} of {} candidates ({:?})",
            selected.len(),
            candidates.len(),
            self.options.policy
        );
        selected
    }

    /// Process the selection in parallel; slot order follows selection order
    fn process_selected(&self, selected: Vec<PathBuf>) -> Result<ProcessedSources> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.options.workers.unwrap_or(0))
            .thread_name(|i| format!("medusa-worker-{i}"))
            .build()?;

        let results: Vec<Result<Payload>> =
            pool.install(|| selected.par_iter().map(|path| self.process_file(path)).collect());

        let mut payloads = Vec::with_capacity(selected.len());
        let mut failures = Vec::new();
        for (path, result) in selected.into_iter().zip(results) {
            match result {
                Ok(payload) => payloads.push((path, payload)),
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", path.display(), e);
                    let reason = match e {
                        MedusaError::SourceConversion { reason, .. } => reason,
                        other => other.to_string(),
                    };
                    failures.push(SourceFailure { path, reason });
                }
            }
        }
        Ok(ProcessedSources { payloads, failures })
    }

    /// Select up to 64 candidates and process them without building a bank
    ///
    /// Any number of usable sources above zero is accepted.
    pub fn process(&self, candidates: &[PathBuf]) -> Result<ProcessedSources> {
        let processed = self.process_selected(self.select(candidates))?;
        if processed.payloads.is_empty() {
            return Err(MedusaError::InsufficientSources {
                usable: 0,
                failures: processed.failures,
            });
        }
        Ok(processed)
    }

    /// Select up to 64 candidates and turn them into a bank
    ///
    /// Slots are filled in selection order no matter which worker finishes
    /// first. Sources that fail are skipped; anything short of 64 usable
    /// sources is an error.
    pub fn build(&self, candidates: &[PathBuf]) -> Result<BuildReport> {
        let selected = self.select(candidates);
        if selected.len() < SLOT_COUNT {
            return Err(MedusaError::InsufficientSources {
                usable: selected.len(),
                failures: Vec::new(),
            });
        }

        let ProcessedSources { payloads, failures } = self.process_selected(selected)?;
        if payloads.len() < SLOT_COUNT {
            return Err(MedusaError::InsufficientSources {
                usable: payloads.len(),
                failures,
            });
        }

        let (sources, slots): (Vec<_>, Vec<_>) = payloads
            .into_iter()
            .enumerate()
            .map(|(index, (path, payload))| {
                (path, WavetableSlot::new(index, assign(index, None), payload))
            })
            .unzip();
        let bank = WavetableBank::new(slots, Footer::synthetic())?;

        tracing::info!("Built bank from {} sources", sources.len());
        Ok(BuildReport {
            bank,
            sources,
            failures,
        })
    }
}
