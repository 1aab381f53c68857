//! Single-cycle extraction
//!
//! Reduces a waveform to its first clean period, stretched to a fixed length.

use crate::resample::resample_to_length;

/// Length of an extracted cycle
pub const CYCLE_LEN: usize = 2048;

/// Crossings closer than this are treated as noise
pub const MIN_CYCLE_LEN: usize = 20;

/// Indices `i` where `x[i]` and `x[i + 1]` fall on different sides of zero
///
/// Zero counts as non-negative.
pub fn zero_crossings(samples: &[i16]) -> Vec<usize> {
    samples
        .windows(2)
        .enumerate()
        .filter(|(_, pair)| (pair[0] < 0) != (pair[1] < 0))
        .map(|(i, _)| i)
        .collect()
}

/// Bounds of the first cycle: consecutive crossings more than
/// [`MIN_CYCLE_LEN`] samples apart
pub fn find_cycle(samples: &[i16]) -> Option<(usize, usize)> {
    zero_crossings(samples)
        .windows(2)
        .map(|pair| (pair[0], pair[1]))
        .find(|(start, end)| end - start > MIN_CYCLE_LEN)
}

/// Extract one cycle as exactly [`CYCLE_LEN`] samples
///
/// Uses [`find_cycle`]. Without one, the head of the buffer is stretched
/// instead.
pub fn extract_cycle(samples: &[i16]) -> Vec<i16> {
    let segment = match find_cycle(samples) {
        Some((start, end)) => &samples[start..end],
        None => {
            tracing::debug!("No usable cycle in {} samples, using head", samples.len());
            &samples[..samples.len().min(CYCLE_LEN)]
        }
    };

    resample_to_length(segment, CYCLE_LEN)
}
