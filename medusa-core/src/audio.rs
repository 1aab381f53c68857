//! PCM buffers and WAV I/O

use std::io::Cursor;
use std::path::Path;

use medusa_format::{Identifier, SAMPLE_RATE};
use serde::Serialize;

use crate::error::{MedusaError, Result};

/// Interleaved PCM as produced by a decoder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedAudio {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl DecodedAudio {
    pub fn frames(&self) -> usize {
        match self.channels {
            0 => 0,
            n => self.samples.len() / usize::from(n),
        }
    }
}

/// Per-slot audio exchanged with front ends
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotAudio {
    #[serde(skip)]
    pub samples: Vec<i16>,
    pub sample_rate: u32,
    pub channels: u16,
    pub identifier: Option<Identifier>,
}

impl SlotAudio {
    /// Mono 44.1 kHz buffer, the only layout a slot accepts
    pub fn mono(samples: Vec<i16>, identifier: Option<Identifier>) -> Self {
        Self {
            samples,
            sample_rate: SAMPLE_RATE,
            channels: 1,
            identifier,
        }
    }
}

fn mono_spec() -> hound::WavSpec {
    hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    }
}

/// Encode mono 16-bit 44.1 kHz samples as WAV bytes
pub fn encode_wav(samples: &[i16]) -> std::result::Result<Vec<u8>, hound::Error> {
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, mono_spec())?;
        for &sample in samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}

/// Write mono 16-bit 44.1 kHz samples to a WAV file
pub fn write_wav(path: &Path, samples: &[i16]) -> Result<()> {
    let bytes = encode_wav(samples).map_err(|e| MedusaError::wav(path, e))?;
    std::fs::write(path, bytes).map_err(|e| MedusaError::io(path, e))
}

/// Read any integer or float WAV as interleaved i16
pub fn read_wav(path: &Path) -> std::result::Result<DecodedAudio, hound::Error> {
    let reader = hound::WavReader::open(path)?;
    decode_reader(reader)
}

/// WAV header of a file without reading its samples
pub fn wav_spec(path: &Path) -> std::result::Result<hound::WavSpec, hound::Error> {
    Ok(hound::WavReader::open(path)?.spec())
}

fn decode_reader<R: std::io::Read>(
    mut reader: hound::WavReader<R>,
) -> std::result::Result<DecodedAudio, hound::Error> {
    let spec = reader.spec();

    let samples: Vec<i16> = match spec.sample_format {
        hound::SampleFormat::Int => match spec.bits_per_sample {
            16 => reader.samples::<i16>().collect::<std::result::Result<_, _>>()?,
            8 => reader
                .samples::<i8>()
                .map(|s| s.map(|s| i16::from(s) << 8))
                .collect::<std::result::Result<_, _>>()?,
            24 | 32 => {
                let shift = spec.bits_per_sample - 16;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|s| (s >> shift) as i16))
                    .collect::<std::result::Result<_, _>>()?
            }
            _ => return Err(hound::Error::Unsupported),
        },
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .map(|s| s.map(|s| (s.clamp(-1.0, 1.0) * 32767.0).round() as i16))
            .collect::<std::result::Result<_, _>>()?,
    };

    Ok(DecodedAudio {
        samples,
        sample_rate: spec.sample_rate,
        channels: spec.channels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wav_roundtrip_in_memory() {
        let samples: Vec<i16> = (0..500).map(|i| (i * 37 - 9000) as i16).collect();
        let bytes = encode_wav(&samples).unwrap();

        let reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
        let decoded = decode_reader(reader).unwrap();
        assert_eq!(decoded.samples, samples);
        assert_eq!(decoded.sample_rate, 44100);
        assert_eq!(decoded.channels, 1);
        assert_eq!(decoded.frames(), 500);
    }

    #[test]
    fn test_read_24_bit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deep.wav");
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 48000,
            bits_per_sample: 24,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for s in [0x12_3400, -0x40_0000, 256, -256] {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();

        let decoded = read_wav(&path).unwrap();
        assert_eq!(decoded.samples, vec![0x1234, -0x4000, 1, -1]);
        assert_eq!(decoded.channels, 2);
        assert_eq!(decoded.frames(), 2);
    }
}
