//! Pitch-class (chroma) projection of a magnitude spectrum

/// Number of pitch classes (C, C#, D, ... B)
pub const CHROMA_BINS: usize = 12;

/// Maps FFT bins to the nearest equal-tempered pitch class (A4 = 440 Hz)
#[derive(Debug, Clone)]
pub struct ChromaMap {
    /// Pitch class per FFT bin; `None` for the DC bin
    classes: Vec<Option<usize>>,
}

impl ChromaMap {
    pub fn new(fft_size: usize, sample_rate: u32) -> Self {
        let n_bins = fft_size / 2 + 1;
        let classes = (0..n_bins)
            .map(|k| {
                if k == 0 {
                    return None;
                }
                let hz = k as f64 * sample_rate as f64 / fft_size as f64;
                Some(pitch_class(hz))
            })
            .collect();
        Self { classes }
    }

    pub fn n_bins(&self) -> usize {
        self.classes.len()
    }

    /// Fold spectral power into 12 pitch classes, max-normalized
    ///
    /// Silent frames stay all-zero.
    pub fn project(&self, magnitudes: &[f64]) -> [f64; CHROMA_BINS] {
        let mut chroma = [0.0f64; CHROMA_BINS];
        for (class, &magnitude) in self.classes.iter().zip(magnitudes) {
            if let Some(class) = class {
                chroma[*class] += magnitude * magnitude;
            }
        }

        let peak = chroma.iter().cloned().fold(0.0f64, f64::max);
        if peak > f64::EPSILON {
            for value in chroma.iter_mut() {
                *value /= peak;
            }
        }
        chroma
    }
}

/// Pitch class of a frequency, C = 0 … B = 11
pub fn pitch_class(hz: f64) -> usize {
    let midi = 69.0 + 12.0 * (hz / 440.0).log2();
    (midi.round() as i64).rem_euclid(12) as usize
}
