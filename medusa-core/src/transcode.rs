//! Source decoding
//!
//! WAV files are read directly with hound. Anything else goes through an
//! external `ffmpeg`, which writes a temporary WAV that is read back the same
//! way.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use crate::audio::{read_wav, DecodedAudio};

/// Why a single source could not be decoded
#[derive(Debug, thiserror::Error)]
pub enum TranscodeError {
    #[error("no decoder for this file (ffmpeg not found)")]
    NoDecoder,

    #[error("WAV decode failed: {0}")]
    Wav(#[from] hound::Error),

    #[error("ffmpeg exited with {status}: {stderr}")]
    Ffmpeg { status: ExitStatus, stderr: String },

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("no audio samples")]
    Empty,

    #[error("invalid stream ({channels} channels at {sample_rate} Hz)")]
    InvalidStream { channels: u16, sample_rate: u32 },
}

/// Turns an audio file into interleaved PCM
pub trait Transcoder: Send + Sync {
    fn decode(&self, path: &Path) -> Result<DecodedAudio, TranscodeError>;
}

fn checked(audio: DecodedAudio) -> Result<DecodedAudio, TranscodeError> {
    if audio.channels == 0 || audio.sample_rate == 0 {
        return Err(TranscodeError::InvalidStream {
            channels: audio.channels,
            sample_rate: audio.sample_rate,
        });
    }
    if audio.frames() == 0 {
        return Err(TranscodeError::Empty);
    }
    Ok(audio)
}

/// Native WAV reader
#[derive(Debug, Clone, Copy, Default)]
pub struct WavDecoder;

impl Transcoder for WavDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedAudio, TranscodeError> {
        checked(read_wav(path)?)
    }
}

/// External ffmpeg process
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    program: PathBuf,
    timeout: Duration,
}

impl FfmpegTranscoder {
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    /// Find ffmpeg: the configured path if it exists, otherwise `PATH`
    pub fn locate(configured: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = configured {
            if path.is_file() {
                return Some(path.to_path_buf());
            }
            tracing::warn!("Configured ffmpeg {} not found, searching PATH", path.display());
        }
        which::which("ffmpeg").ok()
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl Transcoder for FfmpegTranscoder {
    fn decode(&self, path: &Path) -> Result<DecodedAudio, TranscodeError> {
        let output = tempfile::Builder::new()
            .prefix("medusa-")
            .suffix(".wav")
            .tempfile()?;
        let mut log = tempfile::tempfile()?;

        tracing::debug!("ffmpeg {} -> {}", path.display(), output.path().display());

        let child = Command::new(&self.program)
            .args(["-nostdin", "-hide_banner", "-loglevel", "error", "-y", "-i"])
            .arg(path)
            .args(["-vn", "-acodec", "pcm_s16le", "-f", "wav"])
            .arg(output.path())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::from(log.try_clone()?))
            .spawn()?;

        let status = wait_with_timeout(child, self.timeout)?;
        if !status.success() {
            return Err(TranscodeError::Ffmpeg {
                status,
                stderr: read_log(&mut log),
            });
        }

        checked(read_wav(output.path())?)
    }
}

fn wait_with_timeout(mut child: Child, timeout: Duration) -> Result<ExitStatus, TranscodeError> {
    let started = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }
        if started.elapsed() >= timeout {
            // already-exited races are fine to ignore here
            let _ = child.kill();
            let _ = child.wait();
            return Err(TranscodeError::Timeout(timeout));
        }
        std::thread::sleep(Duration::from_millis(10));
    }
}

fn read_log(log: &mut File) -> String {
    let mut text = String::new();
    if log.seek(SeekFrom::Start(0)).is_ok() {
        let _ = log.read_to_string(&mut text);
    }
    text.trim().to_string()
}

/// WAV natively, everything else through ffmpeg when it is available
#[derive(Debug, Clone, Default)]
pub struct AutoTranscoder {
    ffmpeg: Option<FfmpegTranscoder>,
}

impl AutoTranscoder {
    pub fn new(ffmpeg: Option<FfmpegTranscoder>) -> Self {
        Self { ffmpeg }
    }
}

fn is_wav(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("wav") || e.eq_ignore_ascii_case("wave"))
}

impl Transcoder for AutoTranscoder {
    fn decode(&self, path: &Path) -> Result<DecodedAudio, TranscodeError> {
        if is_wav(path) {
            match WavDecoder.decode(path) {
                Ok(audio) => return Ok(audio),
                // e.g. WAVE_FORMAT_EXTENSIBLE variants hound rejects
                Err(e) if self.ffmpeg.is_some() => {
                    tracing::debug!("hound could not read {}: {}, trying ffmpeg", path.display(), e);
                }
                Err(e) => return Err(e),
            }
        }
        match &self.ffmpeg {
            Some(ffmpeg) => ffmpeg.decode(path),
            None => Err(TranscodeError::NoDecoder),
        }
    }
}
