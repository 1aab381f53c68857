//! Band-limited resampling (Blackman-windowed sinc)
//!
//! When downsampling, the kernel cutoff drops to the output Nyquist
//! frequency and the kernel widens to keep the same number of lobes.

use std::f64::consts::PI;

/// Kernel half-width in zero crossings
const HALF_WIDTH: f64 = 24.0;

/// Passband edge relative to the lower Nyquist frequency
const ROLLOFF: f64 = 0.95;

/// How samples outside the input are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Boundary {
    /// Silence before and after
    Zero,
    /// The input repeats (single waveform cycles)
    Periodic,
}

struct Kernel {
    cutoff: f64,
    /// Reach in input samples
    reach: f64,
}

impl Kernel {
    fn new(step: f64) -> Self {
        // step = input samples advanced per output sample
        let cutoff = if step > 1.0 { ROLLOFF / step } else { ROLLOFF };
        Self {
            cutoff,
            reach: HALF_WIDTH / cutoff,
        }
    }

    fn weight(&self, x: f64) -> f64 {
        if x.abs() >= self.reach {
            return 0.0;
        }
        self.cutoff * sinc(self.cutoff * x) * blackman(x / self.reach)
    }
}

fn sinc(x: f64) -> f64 {
    if x == 0.0 {
        1.0
    } else {
        let px = PI * x;
        px.sin() / px
    }
}

/// Blackman window over t in [-1, 1]
fn blackman(t: f64) -> f64 {
    0.42 + 0.5 * (PI * t).cos() + 0.08 * (2.0 * PI * t).cos()
}

fn render(samples: &[i16], step: f64, out_len: usize, boundary: Boundary) -> Vec<i16> {
    let kernel = Kernel::new(step);
    let len = samples.len() as i64;
    let mut out = Vec::with_capacity(out_len);

    for n in 0..out_len {
        let center = n as f64 * step;
        let first = (center - kernel.reach).ceil() as i64;
        let last = (center + kernel.reach).floor() as i64;

        let mut acc = 0.0;
        for k in first..=last {
            let sample = match boundary {
                Boundary::Zero if k < 0 || k >= len => continue,
                Boundary::Zero => samples[k as usize],
                Boundary::Periodic => samples[k.rem_euclid(len) as usize],
            };
            acc += f64::from(sample) * kernel.weight(center - k as f64);
        }
        out.push(acc.round().clamp(f64::from(i16::MIN), f64::from(i16::MAX)) as i16);
    }

    out
}

/// Output length for a rate change: `round(len * dst / src)`
pub fn resampled_len(len: usize, src_rate: u32, dst_rate: u32) -> usize {
    if src_rate == 0 {
        return 0;
    }
    (len as f64 * f64::from(dst_rate) / f64::from(src_rate)).round() as usize
}

/// Resample from `src_rate` to `dst_rate`
///
/// Identity when the rates match. A zero rate yields an empty buffer.
pub fn resample(samples: &[i16], src_rate: u32, dst_rate: u32) -> Vec<i16> {
    resample_prefix(samples, src_rate, dst_rate, usize::MAX)
}

/// First `limit` samples of [`resample`], without computing the rest
pub fn resample_prefix(samples: &[i16], src_rate: u32, dst_rate: u32, limit: usize) -> Vec<i16> {
    if src_rate == 0 || dst_rate == 0 || samples.is_empty() {
        return Vec::new();
    }
    let out_len = resampled_len(samples.len(), src_rate, dst_rate).min(limit);
    if src_rate == dst_rate {
        return samples[..out_len].to_vec();
    }
    let step = f64::from(src_rate) / f64::from(dst_rate);
    render(samples, step, out_len, Boundary::Zero)
}

/// Stretch one waveform period to exactly `out_len` samples
///
/// The input is treated as periodic so the ends join without a click.
pub fn resample_to_length(samples: &[i16], out_len: usize) -> Vec<i16> {
    if samples.is_empty() {
        return vec![0; out_len];
    }
    if samples.len() == out_len {
        return samples.to_vec();
    }
    let step = samples.len() as f64 / out_len as f64;
    render(samples, step, out_len, Boundary::Periodic)
}
