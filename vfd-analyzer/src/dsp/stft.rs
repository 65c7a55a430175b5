//! Short-time Fourier analysis
//!
//! Slides a periodic Hann window of `fft_size` samples across the buffer in
//! steps of `hop_size` (no centre padding) and keeps the magnitude spectrum of
//! each window. Time-domain scalars (RMS, zero-crossing rate) are measured at
//! the same window positions on the raw samples.

use super::chroma::{ChromaMap, CHROMA_BINS};
use crate::audio::SampleBuffer;
use crate::error::{AnalysisError, AnalysisResult};
use realfft::{RealFftPlanner, RealToComplex};
use std::f64::consts::PI;
use std::fmt;
use std::sync::Arc;

/// Magnitude spectra plus time-domain scalars, one row per analysis frame
#[derive(Debug, Clone)]
pub struct FrameMatrix {
    magnitudes: Vec<Vec<f64>>,
    rms: Vec<f64>,
    zero_crossing_rate: Vec<f64>,
}

impl FrameMatrix {
    pub fn n_frames(&self) -> usize {
        self.magnitudes.len()
    }

    /// Magnitude spectra, `[n_frames][fft_size / 2 + 1]`
    pub fn magnitudes(&self) -> &[Vec<f64>] {
        &self.magnitudes
    }

    /// Time-domain RMS per frame
    pub fn rms(&self) -> &[f64] {
        &self.rms
    }

    /// Time-domain zero-crossing rate per frame
    pub fn zero_crossing_rate(&self) -> &[f64] {
        &self.zero_crossing_rate
    }
}

/// Windowed FFT front end shared by every feature
///
/// Holds an immutable FFT plan; each call to [`analyze`](Self::analyze)
/// allocates its own buffers, so one analyzer serves concurrent callers.
pub struct SpectralFrameAnalyzer {
    fft: Arc<dyn RealToComplex<f64>>,
    window: Vec<f64>,
    fft_size: usize,
    hop_size: usize,
    sample_rate: u32,
    rolloff_percent: f64,
    chroma: ChromaMap,
}

impl fmt::Debug for SpectralFrameAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpectralFrameAnalyzer")
            .field("fft_size", &self.fft_size)
            .field("hop_size", &self.hop_size)
            .field("sample_rate", &self.sample_rate)
            .field("rolloff_percent", &self.rolloff_percent)
            .finish()
    }
}

impl SpectralFrameAnalyzer {
    /// Plan the FFT for one window geometry
    ///
    /// # Errors
    /// * [`vfd_common::Error::Config`] for a window shorter than 2 samples, a
    ///   hop outside `1..=fft_size`, or a zero sample rate
    pub fn new(
        fft_size: usize,
        hop_size: usize,
        sample_rate: u32,
        rolloff_percent: f64,
    ) -> vfd_common::Result<Self> {
        if fft_size < 2 {
            return Err(vfd_common::Error::Config(format!(
                "FFT size must be >= 2 (got {})",
                fft_size
            )));
        }
        if hop_size == 0 || hop_size > fft_size {
            return Err(vfd_common::Error::Config(format!(
                "hop size must be in 1..={} (got {})",
                fft_size, hop_size
            )));
        }
        if sample_rate == 0 {
            return Err(vfd_common::Error::Config("sample rate must be > 0".to_string()));
        }

        let mut planner = RealFftPlanner::<f64>::new();
        let fft = planner.plan_fft_forward(fft_size);

        // Periodic Hann
        let window = (0..fft_size)
            .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f64 / fft_size as f64).cos())
            .collect();

        Ok(Self {
            fft,
            window,
            fft_size,
            hop_size,
            sample_rate,
            rolloff_percent,
            chroma: ChromaMap::new(fft_size, sample_rate),
        })
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    pub fn hop_size(&self) -> usize {
        self.hop_size
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn n_bins(&self) -> usize {
        self.fft_size / 2 + 1
    }

    /// Number of full windows that fit in `n_samples`
    pub fn frame_count(&self, n_samples: usize) -> usize {
        if n_samples < self.fft_size {
            0
        } else {
            (n_samples - self.fft_size) / self.hop_size + 1
        }
    }

    /// Centre frequency of FFT bin `k` in Hz
    pub fn bin_frequency(&self, k: usize) -> f64 {
        k as f64 * self.sample_rate as f64 / self.fft_size as f64
    }

    /// Compute the frame matrix for a buffer
    ///
    /// # Errors
    /// * [`AnalysisError::EmptyFrames`] if the buffer is shorter than one window
    /// * [`AnalysisError::Decode`] if the buffer is not at the analysis rate
    pub fn analyze(&self, buffer: &SampleBuffer) -> AnalysisResult<FrameMatrix> {
        if buffer.sample_rate() != self.sample_rate {
            return Err(AnalysisError::Decode(format!(
                "sample buffer is at {} Hz, analysis expects {} Hz",
                buffer.sample_rate(),
                self.sample_rate
            )));
        }

        let samples = buffer.samples();
        let n_frames = self.frame_count(samples.len());
        if n_frames == 0 {
            return Err(AnalysisError::EmptyFrames {
                samples: samples.len(),
                window: self.fft_size,
            });
        }

        let mut input = self.fft.make_input_vec();
        let mut output = self.fft.make_output_vec();
        let mut scratch = self.fft.make_scratch_vec();

        let mut magnitudes = Vec::with_capacity(n_frames);
        let mut rms = Vec::with_capacity(n_frames);
        let mut zero_crossing_rate = Vec::with_capacity(n_frames);

        for t in 0..n_frames {
            let start = t * self.hop_size;
            let segment = &samples[start..start + self.fft_size];

            for ((slot, &sample), &w) in input.iter_mut().zip(segment).zip(&self.window) {
                *slot = sample as f64 * w;
            }
            self.fft
                .process_with_scratch(&mut input, &mut output, &mut scratch)
                .map_err(|e| AnalysisError::Spectrum(e.to_string()))?;

            magnitudes.push(output.iter().map(|c| c.norm()).collect());
            rms.push(frame_rms(segment));
            zero_crossing_rate.push(frame_zero_crossing_rate(segment));
        }

        Ok(FrameMatrix {
            magnitudes,
            rms,
            zero_crossing_rate,
        })
    }

    /// Magnitude-weighted mean frequency; 0.0 for a silent frame
    pub fn spectral_centroid(&self, magnitudes: &[f64]) -> f64 {
        let total: f64 = magnitudes.iter().sum();
        if total <= 0.0 {
            return 0.0;
        }
        let weighted: f64 = magnitudes
            .iter()
            .enumerate()
            .map(|(k, &m)| self.bin_frequency(k) * m)
            .sum();
        weighted / total
    }

    /// Lowest bin frequency at which the cumulative magnitude reaches
    /// `rolloff_percent` of the frame total
    pub fn spectral_rolloff(&self, magnitudes: &[f64]) -> f64 {
        let total: f64 = magnitudes.iter().sum();
        if total <= 0.0 {
            return 0.0;
        }

        let threshold = self.rolloff_percent * total;
        let mut cumulative = 0.0;
        for (k, &m) in magnitudes.iter().enumerate() {
            cumulative += m;
            if cumulative >= threshold {
                return self.bin_frequency(k);
            }
        }
        self.bin_frequency(magnitudes.len().saturating_sub(1))
    }

    pub fn chroma(&self, magnitudes: &[f64]) -> [f64; CHROMA_BINS] {
        self.chroma.project(magnitudes)
    }
}

/// Root-mean-square amplitude of a window
pub fn frame_rms(samples: &[f32]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let energy: f64 = samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
    (energy / samples.len() as f64).sqrt()
}

/// Fraction of adjacent sample pairs whose sign differs
///
/// Zero counts as non-negative.
pub fn frame_zero_crossing_rate(samples: &[f32]) -> f64 {
    if samples.len() < 2 {
        return 0.0;
    }
    let crossings = samples
        .windows(2)
        .filter(|pair| (pair[0] < 0.0) != (pair[1] < 0.0))
        .count();
    crossings as f64 / (samples.len() - 1) as f64
}
