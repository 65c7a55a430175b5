//! Feature Extraction
//!
//! Reduces a decoded buffer to a fixed 55-value summary of cepstral, chroma,
//! spectral-shape, rhythmic and energy statistics.
//!
//! # Layout
//! | range | feature |
//! |---|---|
//! | 0..13 | MFCC mean |
//! | 13..26 | MFCC standard deviation |
//! | 26..38 | chroma mean |
//! | 38..50 | chroma standard deviation |
//! | 50 | spectral centroid (Hz) |
//! | 51 | spectral rolloff (Hz) |
//! | 52 | zero-crossing rate |
//! | 53 | tempo (BPM) |
//! | 54 | RMS mean |

use crate::audio::SampleBuffer;
use crate::dsp::chroma::CHROMA_BINS;
use crate::dsp::mel::{power_to_db, DctMatrix, MelFilterBank};
use crate::dsp::tempo::{onset_strength, TempoEstimator};
use crate::dsp::{mean, std_dev, FrameMatrix, SpectralFrameAnalyzer};
use crate::error::AnalysisResult;
use serde::ser::{Serialize, Serializer};
use std::ops::Range;
use tracing::debug;
use vfd_common::config::AnalysisConfig;

/// Cepstral coefficients kept per frame
pub const N_MFCC: usize = 13;

/// Total length of a [`FeatureVector`]
pub const FEATURE_LEN: usize = 55;

pub const MFCC_MEAN: Range<usize> = 0..13;
pub const MFCC_STD: Range<usize> = 13..26;
pub const CHROMA_MEAN: Range<usize> = 26..38;
pub const CHROMA_STD: Range<usize> = 38..50;
pub const SPECTRAL_CENTROID: usize = 50;
pub const SPECTRAL_ROLLOFF: usize = 51;
pub const ZERO_CROSSING_RATE: usize = 52;
pub const TEMPO: usize = 53;
pub const RMS_MEAN: usize = 54;

/// Fixed-length feature summary of one recording
///
/// Always fully populated; serializes as a flat JSON array.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; FEATURE_LEN]);

impl FeatureVector {
    pub fn from_array(values: [f64; FEATURE_LEN]) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        FEATURE_LEN
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn mfcc_mean(&self) -> &[f64] {
        &self.0[MFCC_MEAN]
    }

    pub fn mfcc_std(&self) -> &[f64] {
        &self.0[MFCC_STD]
    }

    pub fn chroma_mean(&self) -> &[f64] {
        &self.0[CHROMA_MEAN]
    }

    pub fn chroma_std(&self) -> &[f64] {
        &self.0[CHROMA_STD]
    }

    pub fn spectral_centroid(&self) -> f64 {
        self.0[SPECTRAL_CENTROID]
    }

    pub fn spectral_rolloff(&self) -> f64 {
        self.0[SPECTRAL_ROLLOFF]
    }

    pub fn zero_crossing_rate(&self) -> f64 {
        self.0[ZERO_CROSSING_RATE]
    }

    pub fn tempo(&self) -> f64 {
        self.0[TEMPO]
    }

    pub fn rms_mean(&self) -> f64 {
        self.0[RMS_MEAN]
    }
}

impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter())
    }
}

/// Derives a [`FeatureVector`] from decoded audio
///
/// Holds the FFT plan, mel filterbank and DCT basis; all immutable after
/// construction.
///
/// # Example
/// ```rust,ignore
/// use vfd_analyzer::features::FeatureExtractor;
///
/// let extractor = FeatureExtractor::new(&AnalysisConfig::default())?;
/// let features = extractor.extract(&buffer)?;
/// println!("centroid: {:.1} Hz", features.spectral_centroid());
/// ```
#[derive(Debug)]
pub struct FeatureExtractor {
    frames: SpectralFrameAnalyzer,
    mel: MelFilterBank,
    dct: DctMatrix,
    tempo: TempoEstimator,
    top_db: f64,
}

impl FeatureExtractor {
    /// Build every stage from a validated analysis section
    ///
    /// # Errors
    /// * [`vfd_common::Error::Config`] if `config` fails validation
    pub fn new(config: &AnalysisConfig) -> vfd_common::Result<Self> {
        config.validate()?;

        let sample_rate = config.target_sample_rate;
        let nyquist = sample_rate as f64 / 2.0;

        Ok(Self {
            frames: SpectralFrameAnalyzer::new(
                config.fft_size,
                config.hop_size,
                sample_rate,
                config.rolloff_percent,
            )?,
            mel: MelFilterBank::new(config.n_mels, config.fft_size, sample_rate, 0.0, nyquist),
            dct: DctMatrix::new(N_MFCC, config.n_mels),
            tempo: TempoEstimator::new(
                sample_rate,
                config.hop_size,
                config.start_bpm,
                config.max_bpm,
                config.tempo_window_seconds,
            ),
            top_db: config.top_db,
        })
    }

    pub fn frame_analyzer(&self) -> &SpectralFrameAnalyzer {
        &self.frames
    }

    /// Extract features from a buffer at the analysis sample rate
    ///
    /// # Errors
    /// Propagates [`AnalysisError::EmptyFrames`](crate::error::AnalysisError::EmptyFrames)
    /// for buffers shorter than one window.
    pub fn extract(&self, buffer: &SampleBuffer) -> AnalysisResult<FeatureVector> {
        let matrix = self.frames.analyze(buffer)?;
        let features = self.extract_from_frames(&matrix);

        debug!(
            frames = matrix.n_frames(),
            centroid = features.spectral_centroid(),
            tempo = features.tempo(),
            "Features extracted"
        );
        Ok(features)
    }

    /// Aggregate a non-empty frame matrix into the feature vector
    pub fn extract_from_frames(&self, matrix: &FrameMatrix) -> FeatureVector {
        // Mel power spectrogram → dB
        let mut mel_db: Vec<Vec<f64>> = matrix
            .magnitudes()
            .iter()
            .map(|frame| {
                let power: Vec<f64> = frame.iter().map(|m| m * m).collect();
                self.mel.apply(&power)
            })
            .collect();
        power_to_db(&mut mel_db, self.top_db);

        let mfcc: Vec<Vec<f64>> = mel_db.iter().map(|frame| self.dct.transform(frame)).collect();
        let chroma: Vec<[f64; CHROMA_BINS]> = matrix
            .magnitudes()
            .iter()
            .map(|frame| self.frames.chroma(frame))
            .collect();

        let mut values = [0.0f64; FEATURE_LEN];

        for c in 0..N_MFCC {
            let column: Vec<f64> = mfcc.iter().map(|frame| frame[c]).collect();
            let m = mean(&column);
            values[MFCC_MEAN.start + c] = m;
            values[MFCC_STD.start + c] = std_dev(&column, m);
        }

        for c in 0..CHROMA_BINS {
            let column: Vec<f64> = chroma.iter().map(|frame| frame[c]).collect();
            let m = mean(&column);
            values[CHROMA_MEAN.start + c] = m;
            values[CHROMA_STD.start + c] = std_dev(&column, m);
        }

        let centroids: Vec<f64> = matrix
            .magnitudes()
            .iter()
            .map(|frame| self.frames.spectral_centroid(frame))
            .collect();
        let rolloffs: Vec<f64> = matrix
            .magnitudes()
            .iter()
            .map(|frame| self.frames.spectral_rolloff(frame))
            .collect();

        values[SPECTRAL_CENTROID] = mean(&centroids);
        values[SPECTRAL_ROLLOFF] = mean(&rolloffs);
        values[ZERO_CROSSING_RATE] = mean(matrix.zero_crossing_rate());
        values[TEMPO] = self.tempo.estimate(&onset_strength(&mel_db));
        values[RMS_MEAN] = mean(matrix.rms());

        FeatureVector(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;
    use std::f64::consts::PI;

    fn tone(freq: f64, seconds: f64) -> SampleBuffer {
        let n = (seconds * 22050.0) as usize;
        let samples = (0..n)
            .map(|i| (2.0 * PI * freq * i as f64 / 22050.0).sin() as f32 * 0.5)
            .collect();
        SampleBuffer::from_samples(samples, 22050)
    }

    #[test]
    fn test_layout_is_contiguous() {
        assert_eq!(MFCC_MEAN.end, MFCC_STD.start);
        assert_eq!(MFCC_STD.end, CHROMA_MEAN.start);
        assert_eq!(CHROMA_MEAN.end, CHROMA_STD.start);
        assert_eq!(CHROMA_STD.end, SPECTRAL_CENTROID);
        assert_eq!(RMS_MEAN + 1, FEATURE_LEN);
    }

    #[test]
    fn test_accessors_follow_layout() {
        let mut values = [0.0; FEATURE_LEN];
        for (i, v) in values.iter_mut().enumerate() {
            *v = i as f64;
        }
        let features = FeatureVector::from_array(values);

        assert_eq!(features.mfcc_mean()[0], 0.0);
        assert_eq!(features.mfcc_std()[0], 13.0);
        assert_eq!(features.chroma_mean()[0], 26.0);
        assert_eq!(features.chroma_std()[11], 49.0);
        assert_eq!(features.spectral_centroid(), 50.0);
        assert_eq!(features.spectral_rolloff(), 51.0);
        assert_eq!(features.zero_crossing_rate(), 52.0);
        assert_eq!(features.tempo(), 53.0);
        assert_eq!(features.rms_mean(), 54.0);
    }

    #[test]
    fn test_serializes_as_flat_array() {
        let features = FeatureVector::from_array([1.5; FEATURE_LEN]);
        let json = serde_json::to_value(features).unwrap();
        let array = json.as_array().unwrap();
        assert_eq!(array.len(), FEATURE_LEN);
        assert_eq!(array[54], serde_json::json!(1.5));
    }

    #[test]
    fn test_tone_features() {
        let extractor = FeatureExtractor::new(&AnalysisConfig::default()).unwrap();
        let features = extractor.extract(&tone(1000.0, 2.0)).unwrap();

        assert_eq!(features.as_slice().len(), FEATURE_LEN);
        assert!(features.as_slice().iter().all(|v| v.is_finite()));
        assert!((features.spectral_centroid() - 1000.0).abs() < 50.0);
        assert!((features.rms_mean() - 0.5 / 2.0f64.sqrt()).abs() < 0.01);

        // A steady tone barely changes between frames
        for &std in features.chroma_std() {
            assert!(std < 1e-3, "chroma std = {}", std);
        }
        // 1000 Hz is nearest to B (midi 83)
        let peak = features
            .chroma_mean()
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(peak, 11);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let zero_hop = AnalysisConfig {
            hop_size: 0,
            ..AnalysisConfig::default()
        };
        assert!(FeatureExtractor::new(&zero_hop).is_err());

        let no_mels = AnalysisConfig {
            n_mels: 0,
            ..AnalysisConfig::default()
        };
        assert!(FeatureExtractor::new(&no_mels).is_err());
    }

    #[test]
    fn test_short_buffer_fails() {
        let extractor = FeatureExtractor::new(&AnalysisConfig::default()).unwrap();
        let result = extractor.extract(&SampleBuffer::from_samples(vec![0.2; 2047], 22050));
        assert!(matches!(result, Err(AnalysisError::EmptyFrames { .. })));
    }

    #[test]
    fn test_silence_is_finite() {
        let extractor = FeatureExtractor::new(&AnalysisConfig::default()).unwrap();
        let features = extractor
            .extract(&SampleBuffer::from_samples(vec![0.0; 22050], 22050))
            .unwrap();
        assert!(features.as_slice().iter().all(|v| v.is_finite()));
        assert_eq!(features.tempo(), 0.0);
        assert_eq!(features.spectral_centroid(), 0.0);
        assert_eq!(features.rms_mean(), 0.0);
    }
}
