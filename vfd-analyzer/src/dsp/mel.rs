//! Mel-scale utilities, filterbank generation and cepstral transform
//!
//! Uses the Slaney mel scale (linear below 1 kHz, logarithmic above) with
//! Slaney area normalization, so each triangular filter has unit area.

use std::f64::consts::PI;

const F_SP: f64 = 200.0 / 3.0;
const MIN_LOG_HZ: f64 = 1000.0;
const MIN_LOG_MEL: f64 = MIN_LOG_HZ / F_SP;

/// Floor applied to mel power before taking the logarithm
pub const POWER_FLOOR: f64 = 1e-10;

fn log_step() -> f64 {
    6.4f64.ln() / 27.0
}

/// Converts frequency in Hz to the Slaney mel scale
pub fn hz_to_mel(hz: f64) -> f64 {
    if hz >= MIN_LOG_HZ {
        MIN_LOG_MEL + (hz / MIN_LOG_HZ).ln() / log_step()
    } else {
        hz / F_SP
    }
}

/// Converts Slaney mel back to Hz
pub fn mel_to_hz(mel: f64) -> f64 {
    if mel >= MIN_LOG_MEL {
        MIN_LOG_HZ * (log_step() * (mel - MIN_LOG_MEL)).exp()
    } else {
        mel * F_SP
    }
}

/// Triangular mel filterbank, `[n_mels][fft_size / 2 + 1]`
#[derive(Debug, Clone)]
pub struct MelFilterBank {
    filters: Vec<Vec<f64>>,
}

impl MelFilterBank {
    pub fn new(n_mels: usize, fft_size: usize, sample_rate: u32, fmin: f64, fmax: f64) -> Self {
        let n_bins = fft_size / 2 + 1;
        let bin_hz: Vec<f64> = (0..n_bins)
            .map(|k| k as f64 * sample_rate as f64 / fft_size as f64)
            .collect();

        // n_mels + 2 points evenly spaced in mel, converted back to Hz
        let mel_min = hz_to_mel(fmin);
        let mel_max = hz_to_mel(fmax);
        let hz_points: Vec<f64> = (0..n_mels + 2)
            .map(|i| mel_to_hz(mel_min + (mel_max - mel_min) * i as f64 / (n_mels + 1) as f64))
            .collect();

        let filters = (0..n_mels)
            .map(|m| {
                let (lo, center, hi) = (hz_points[m], hz_points[m + 1], hz_points[m + 2]);
                let norm = 2.0 / (hi - lo);
                bin_hz
                    .iter()
                    .map(|&f| {
                        let rising = (f - lo) / (center - lo);
                        let falling = (hi - f) / (hi - center);
                        rising.min(falling).max(0.0) * norm
                    })
                    .collect()
            })
            .collect();

        Self { filters }
    }

    pub fn n_mels(&self) -> usize {
        self.filters.len()
    }

    /// Mel band energies for one power spectrum
    pub fn apply(&self, power: &[f64]) -> Vec<f64> {
        self.filters
            .iter()
            .map(|filter| filter.iter().zip(power).map(|(w, p)| w * p).sum())
            .collect()
    }

    pub fn filters(&self) -> &[Vec<f64>] {
        &self.filters
    }
}

/// Converts a mel power spectrogram to decibels in place
///
/// `10·log10(max(S, floor))`, then every value is clamped to at most
/// `top_db` below the loudest bin of the whole spectrogram.
pub fn power_to_db(spectrogram: &mut [Vec<f64>], top_db: f64) {
    let mut peak = f64::NEG_INFINITY;
    for frame in spectrogram.iter_mut() {
        for value in frame.iter_mut() {
            *value = 10.0 * value.max(POWER_FLOOR).log10();
            peak = peak.max(*value);
        }
    }

    let floor = peak - top_db;
    for frame in spectrogram.iter_mut() {
        for value in frame.iter_mut() {
            if *value < floor {
                *value = floor;
            }
        }
    }
}

/// Orthonormal DCT-II basis truncated to the first `n_out` coefficients
#[derive(Debug, Clone)]
pub struct DctMatrix {
    rows: Vec<Vec<f64>>,
}

impl DctMatrix {
    pub fn new(n_out: usize, n_in: usize) -> Self {
        let rows = (0..n_out)
            .map(|k| {
                let scale = if k == 0 {
                    (1.0 / n_in as f64).sqrt()
                } else {
                    (2.0 / n_in as f64).sqrt()
                };
                (0..n_in)
                    .map(|n| scale * (PI * k as f64 * (2 * n + 1) as f64 / (2 * n_in) as f64).cos())
                    .collect()
            })
            .collect();
        Self { rows }
    }

    pub fn transform(&self, input: &[f64]) -> Vec<f64> {
        self.rows
            .iter()
            .map(|row| row.iter().zip(input).map(|(c, x)| c * x).sum())
            .collect()
    }
}
