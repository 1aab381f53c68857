//! medusa.toml configuration
//!
//! Every key is optional; an empty file is a valid configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{MedusaError, Result};
use crate::select::SelectionPolicy;

/// Default configuration file name
pub const CONFIG_FILE: &str = "medusa.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MedusaConfig {
    #[serde(default)]
    pub build: BuildSection,
    #[serde(default)]
    pub transcoder: TranscoderSection,
    #[serde(default)]
    pub decompile: DecompileSection,
}

/// Bank creation settings
#[derive(Debug, Clone, Deserialize)]
pub struct BuildSection {
    /// Source ordering: "alphabetical" or "random"
    #[serde(default)]
    pub policy: SelectionPolicy,

    /// Seed for random selection; unseeded runs use the thread RNG
    pub seed: Option<u64>,

    /// Worker threads for source processing.
    /// Default: available parallelism
    pub workers: Option<usize>,

    /// Per-source decode limit in seconds
    #[serde(default = "default_timeout_secs")]
    pub source_timeout_secs: u64,

    /// Peak-normalize each slot
    #[serde(default)]
    pub normalize: bool,

    /// Reduce each source to one cycle before fitting
    #[serde(default)]
    pub single_cycle: bool,

    /// Descend into subdirectories when collecting sources
    #[serde(default)]
    pub recursive: bool,

    /// File extensions considered audio (case-insensitive)
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            policy: SelectionPolicy::default(),
            seed: None,
            workers: None,
            source_timeout_secs: default_timeout_secs(),
            normalize: false,
            single_cycle: false,
            recursive: false,
            extensions: default_extensions(),
        }
    }
}

/// External decoder settings
#[derive(Debug, Clone, Deserialize)]
pub struct TranscoderSection {
    /// Explicit ffmpeg path; `PATH` is searched otherwise
    pub ffmpeg: Option<PathBuf>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for TranscoderSection {
    fn default() -> Self {
        Self {
            ffmpeg: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DecompileSection {
    /// Require exactly 64 slots
    #[serde(default = "default_true")]
    pub strict: bool,

    /// Report header mismatches
    #[serde(default = "default_true")]
    pub validate: bool,
}

impl Default for DecompileSection {
    fn default() -> Self {
        Self {
            strict: true,
            validate: true,
        }
    }
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_true() -> bool {
    true
}

fn default_extensions() -> Vec<String> {
    ["wav", "aif", "aiff", "mp3", "ogg", "flac", "m4a"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl MedusaConfig {
    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| MedusaError::io(path, e))?;
        let config = Self::parse(&content).map_err(|e| MedusaError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        config.validate().map_err(|reason| MedusaError::Config {
            path: path.to_path_buf(),
            reason,
        })?;
        Ok(config)
    }

    /// Load `path` if given, else `./medusa.toml` if present, else defaults
    pub fn discover(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None if Path::new(CONFIG_FILE).is_file() => Self::load(Path::new(CONFIG_FILE)),
            None => Ok(Self::default()),
        }
    }

    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.build.workers == Some(0) {
            return Err("build.workers must be at least 1".into());
        }
        if self.build.source_timeout_secs == 0 || self.transcoder.timeout_secs == 0 {
            return Err("timeouts must be at least 1 second".into());
        }
        if self.build.extensions.is_empty() {
            return Err("build.extensions must not be empty".into());
        }
        Ok(())
    }

    pub fn source_timeout(&self) -> Duration {
        Duration::from_secs(self.build.source_timeout_secs)
    }

    pub fn transcoder_timeout(&self) -> Duration {
        Duration::from_secs(self.transcoder.timeout_secs)
    }
}
