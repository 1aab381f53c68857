//! Front-end facing interface
//!
//! Every operation returns an [`Outcome`] instead of an error so callers
//! (CLI, GUI, web handlers) render one shape and never see a panic or a
//! raw error type.

use std::path::{Path, PathBuf};

use medusa_format::Diagnostic;
use serde::Serialize;

use crate::builder::{BankBuilder, BuildOptions};
use crate::config::MedusaConfig;
use crate::error::{MedusaError, Result, SourceFailure};
use crate::files::{
    decompile_to_dir, extract_to_dir, process_to_dir, read_bank, recompile_from_dir, write_bank,
};
use crate::ops::{inspect, verify, DecompileOptions, Inspection, Verification};
use crate::transcode::{AutoTranscoder, FfmpegTranscoder};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Inspect,
    Decompile,
    Recompile,
    Create,
    Process,
    Verify,
    Extract,
}

/// Result of one operation, success or not
#[derive(Debug, Clone, Serialize)]
pub struct Outcome {
    pub operation: Operation,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    pub slots: usize,
    /// Files written (decompile, process) or read (recompile, create)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<PathBuf>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<SourceFailure>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listing: Option<Inspection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification: Option<Verification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Outcome {
    fn new(operation: Operation) -> Self {
        Self {
            operation,
            success: true,
            output: None,
            slots: 0,
            files: Vec::new(),
            failures: Vec::new(),
            diagnostics: Vec::new(),
            listing: None,
            verification: None,
            error: None,
        }
    }

    fn failed(operation: Operation, error: MedusaError) -> Self {
        tracing::error!("{:?} failed: {}", operation, error);
        let message = error.to_string();
        let mut outcome = Self::new(operation);
        outcome.success = false;
        if let MedusaError::InsufficientSources { failures, .. } = error {
            outcome.failures = failures;
        }
        outcome.error = Some(message);
        outcome
    }

    fn settle(operation: Operation, result: Result<Self>) -> Self {
        result.unwrap_or_else(|e| Self::failed(operation, e))
    }
}

/// Operations a front end can request
pub trait BankService {
    /// List slots, identifiers and header diagnostics
    fn inspect(&self, bank: &Path) -> Outcome;

    /// Write one WAV and identifier per slot plus the footer
    fn decompile(&self, bank: &Path, output_dir: &Path) -> Outcome;

    /// Rebuild a bank from a decompiled directory
    fn recompile(&self, input_dir: &Path, output: &Path) -> Outcome;

    /// Build a bank from arbitrary audio files
    fn create_bank(&self, input_dir: &Path, output: &Path, options: &BuildOptions) -> Outcome;

    /// Turn arbitrary audio files into an editable decompiled directory
    fn process(&self, input_dir: &Path, output_dir: &Path, options: &BuildOptions) -> Outcome;

    /// Byte comparison of two bank files
    fn verify(&self, expected: &Path, actual: &Path) -> Outcome;

    /// Write one slot to a directory
    fn extract(&self, bank: &Path, index: usize, output_dir: &Path, raw: bool) -> Outcome;
}

/// Runs operations in-process against the local filesystem
#[derive(Debug, Clone, Default)]
pub struct LocalService {
    config: MedusaConfig,
}

impl LocalService {
    pub fn new(config: MedusaConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MedusaConfig {
        &self.config
    }

    fn decompile_options(&self) -> DecompileOptions {
        DecompileOptions::from_config(&self.config)
    }

    /// WAV natively, ffmpeg for other formats when it can be found
    pub fn transcoder(&self) -> AutoTranscoder {
        let ffmpeg = FfmpegTranscoder::locate(self.config.transcoder.ffmpeg.as_deref())
            .map(|program| FfmpegTranscoder::new(program, self.config.transcoder_timeout()));
        match &ffmpeg {
            Some(ffmpeg) => tracing::debug!("Using ffmpeg at {}", ffmpeg.program().display()),
            None => tracing::warn!("ffmpeg not found; only WAV sources can be used"),
        }
        AutoTranscoder::new(ffmpeg)
    }

    fn try_inspect(&self, bank: &Path) -> Result<Outcome> {
        let listing = inspect(&read_bank(bank)?, &self.decompile_options())?;
        let mut outcome = Outcome::new(Operation::Inspect);
        outcome.slots = listing.slots.len();
        outcome.diagnostics = listing.diagnostics.clone();
        outcome.listing = Some(listing);
        Ok(outcome)
    }

    fn try_decompile(&self, bank: &Path, output_dir: &Path) -> Result<Outcome> {
        let result = decompile_to_dir(bank, output_dir, &self.decompile_options())?;
        let mut outcome = Outcome::new(Operation::Decompile);
        outcome.output = Some(result.output_dir);
        outcome.slots = result.files.len();
        outcome.files = result.files;
        outcome.diagnostics = result.decompiled.diagnostics;
        Ok(outcome)
    }

    fn try_recompile(&self, input_dir: &Path, output: &Path) -> Result<Outcome> {
        let result = recompile_from_dir(input_dir, output)?;
        let mut outcome = Outcome::new(Operation::Recompile);
        outcome.output = Some(result.output);
        outcome.slots = result.files.len();
        outcome.files = result.files;
        Ok(outcome)
    }

    fn try_create(&self, input_dir: &Path, output: &Path, options: &BuildOptions) -> Result<Outcome> {
        let builder = BankBuilder::new(self.transcoder(), options.clone());
        let report = builder.build_from_dir(
            input_dir,
            &self.config.build.extensions,
            self.config.build.recursive,
        )?;
        write_bank(output, &report.bank.to_bytes())?;

        let mut outcome = Outcome::new(Operation::Create);
        outcome.output = Some(output.to_path_buf());
        outcome.slots = report.bank.slots().len();
        outcome.files = report.sources;
        outcome.failures = report.failures;
        Ok(outcome)
    }

    fn try_process(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        options: &BuildOptions,
    ) -> Result<Outcome> {
        let builder = BankBuilder::new(self.transcoder(), options.clone());
        let result = process_to_dir(
            &builder,
            input_dir,
            output_dir,
            &self.config.build.extensions,
            self.config.build.recursive,
        )?;

        let mut outcome = Outcome::new(Operation::Process);
        outcome.output = Some(result.output_dir);
        outcome.slots = result.files.len();
        outcome.files = result.files;
        outcome.failures = result.failures;
        Ok(outcome)
    }

    fn try_verify(&self, expected: &Path, actual: &Path) -> Result<Outcome> {
        let verification = verify(&read_bank(expected)?, &read_bank(actual)?);
        let mut outcome = Outcome::new(Operation::Verify);
        outcome.success = verification.is_identical();
        if !outcome.success {
            outcome.error = Some(format!(
                "{} does not match {}",
                actual.display(),
                expected.display()
            ));
        }
        outcome.verification = Some(verification);
        Ok(outcome)
    }

    fn try_extract(&self, bank: &Path, index: usize, output_dir: &Path, raw: bool) -> Result<Outcome> {
        let path = extract_to_dir(bank, index, output_dir, raw)?;
        let mut outcome = Outcome::new(Operation::Extract);
        outcome.slots = 1;
        outcome.output = Some(path);
        Ok(outcome)
    }
}

impl BankService for LocalService {
    fn inspect(&self, bank: &Path) -> Outcome {
        Outcome::settle(Operation::Inspect, self.try_inspect(bank))
    }

    fn decompile(&self, bank: &Path, output_dir: &Path) -> Outcome {
        Outcome::settle(Operation::Decompile, self.try_decompile(bank, output_dir))
    }

    fn recompile(&self, input_dir: &Path, output: &Path) -> Outcome {
        Outcome::settle(Operation::Recompile, self.try_recompile(input_dir, output))
    }

    fn create_bank(&self, input_dir: &Path, output: &Path, options: &BuildOptions) -> Outcome {
        Outcome::settle(Operation::Create, self.try_create(input_dir, output, options))
    }

    fn process(&self, input_dir: &Path, output_dir: &Path, options: &BuildOptions) -> Outcome {
        Outcome::settle(Operation::Process, self.try_process(input_dir, output_dir, options))
    }

    fn verify(&self, expected: &Path, actual: &Path) -> Outcome {
        Outcome::settle(Operation::Verify, self.try_verify(expected, actual))
    }

    fn extract(&self, bank: &Path, index: usize, output_dir: &Path, raw: bool) -> Outcome {
        Outcome::settle(Operation::Extract, self.try_extract(bank, index, output_dir, raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_outcome_serializes() {
        let service = LocalService::default();
        let outcome = service.inspect(Path::new("/definitely/not/here.polyend"));
        assert!(!outcome.success);
        assert!(outcome.error.as_deref().unwrap().contains("here.polyend"));

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["operation"], "inspect");
        assert_eq!(json["success"], false);
        assert!(json.get("listing").is_none());
    }

    #[test]
    fn test_insufficient_sources_outcome() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..3 {
            crate::audio::write_wav(&dir.path().join(format!("{i}.wav")), &[1, 2, 3]).unwrap();
        }
        let service = LocalService::default();
        let outcome = service.create_bank(
            dir.path(),
            &dir.path().join("out.polyend"),
            &BuildOptions::default(),
        );
        assert!(!outcome.success);
        assert!(outcome.error.unwrap().contains("only 3 usable"));
        assert!(!dir.path().join("out.polyend").exists());
    }
}
