//! Signal-processing building blocks
//!
//! - `stft`: windowed magnitude spectra and per-frame spectral scalars
//! - `mel`: mel filterbank, log compression and DCT for cepstral coefficients
//! - `chroma`: pitch-class folding of spectral energy
//! - `tempo`: onset envelope and autocorrelation tempo estimate

pub mod chroma;
pub mod mel;
pub mod stft;
pub mod tempo;

pub use stft::{FrameMatrix, SpectralFrameAnalyzer};

/// Arithmetic mean (0.0 for an empty slice)
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation around a precomputed mean
pub fn std_dev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance = values
        .iter()
        .map(|&v| {
            let d = v - mean;
            d * d
        })
        .sum::<f64>()
        / values.len() as f64;
    variance.sqrt()
}
