//! Slot payload processing
//!
//! Turns decoded PCM of any shape into the fixed payload a slot stores:
//! downmix to mono, resample to 44.1 kHz, optionally normalize, then fit to
//! exactly 15872 bytes.

use medusa_format::{Payload, PAYLOAD_LEN};

pub use crate::resample::{resample, resample_prefix, resample_to_length, resampled_len};

/// Full-scale peak used by [`normalize`]
pub const FULL_SCALE: i16 = i16::MAX;

/// Average interleaved channels into mono
///
/// Each frame's mean is rounded to nearest, ties away from zero. A partial
/// frame at the end of the buffer is dropped.
pub fn downmix(samples: &[i16], channels: u16) -> Vec<i16> {
    if channels <= 1 {
        return samples.to_vec();
    }
    let width = usize::from(channels);
    samples
        .chunks_exact(width)
        .map(|frame| {
            let sum: i32 = frame.iter().map(|&s| i32::from(s)).sum();
            (f64::from(sum) / f64::from(channels)).round() as i16
        })
        .collect()
}

/// Truncate or zero-pad bytes at the tail to exactly `target` bytes
pub fn fit_bytes(bytes: &[u8], target: usize) -> Vec<u8> {
    let mut out = bytes[..bytes.len().min(target)].to_vec();
    out.resize(target, 0);
    out
}

/// Fit samples into a slot payload (truncate or zero-pad, no interpolation)
pub fn fit(samples: &[i16]) -> Payload {
    let bytes: Vec<u8> = samples
        .iter()
        .take(PAYLOAD_LEN / 2)
        .flat_map(|s| s.to_le_bytes())
        .collect();
    let mut payload = Payload::zeroed();
    payload
        .as_mut_bytes()
        .copy_from_slice(&fit_bytes(&bytes, PAYLOAD_LEN));
    payload
}

/// Scale so the largest magnitude hits full scale; silence is left alone
pub fn normalize(samples: &[i16]) -> Vec<i16> {
    let peak = samples.iter().map(|s| s.unsigned_abs()).max().unwrap_or(0);
    if peak == 0 {
        return samples.to_vec();
    }
    let gain = f64::from(FULL_SCALE) / f64::from(peak);
    samples
        .iter()
        .map(|&s| {
            (f64::from(s) * gain)
                .round()
                .clamp(f64::from(i16::MIN), f64::from(i16::MAX)) as i16
        })
        .collect()
}
