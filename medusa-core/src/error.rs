//! Error types for bank operations

use std::path::PathBuf;

use medusa_format::{FormatError, SLOT_COUNT};
use serde::Serialize;

/// Whole-operation failures
///
/// Anything here aborts the operation before output is written.
#[derive(Debug, thiserror::Error)]
pub enum MedusaError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("missing wavetable for slot {index:02}{}", fmt_path(.path))]
    MissingSlot { index: usize, path: Option<PathBuf> },

    #[error(
        "slot {index:02} audio is {channels}ch/{bits}-bit/{sample_rate}Hz{} (need mono 16-bit 44100Hz)",
        fmt_path(.path)
    )]
    InvalidAudioFormat {
        index: usize,
        path: Option<PathBuf>,
        channels: u16,
        bits: u16,
        sample_rate: u32,
    },

    #[error("{}: identifier must be 4 bytes, got {len}", .path.display())]
    InvalidIdentifier { path: PathBuf, len: usize },

    #[error("failed to convert {}: {reason}", .path.display())]
    SourceConversion { path: PathBuf, reason: String },

    #[error(
        "only {usable} usable source files (need {required})",
        required = SLOT_COUNT
    )]
    InsufficientSources {
        usable: usize,
        failures: Vec<SourceFailure>,
    },

    #[error("slot index {0} out of range (0-63)")]
    SlotIndex(usize),

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: {source}", .path.display())]
    Wav {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },

    #[error("invalid config {}: {reason}", .path.display())]
    Config { path: PathBuf, reason: String },

    #[error("failed to start worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

/// A source file skipped during bank creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFailure {
    pub path: PathBuf,
    pub reason: String,
}

fn fmt_path(path: &Option<PathBuf>) -> String {
    match path {
        Some(path) => format!(" ({})", path.display()),
        None => String::new(),
    }
}

impl MedusaError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn wav(path: impl Into<PathBuf>, source: hound::Error) -> Self {
        Self::Wav {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, MedusaError>;
