//! Analysis Pipeline
//!
//! **Purpose:** Run decode → frames → features → {language, score} for one
//! recording and always return a verdict.
//!
//! **Flow:**
//! 1. [`AudioDecoder`] turns bytes into a mono [`SampleBuffer`]
//! 2. [`FeatureExtractor`] reduces the buffer to a [`FeatureVector`]
//! 3. A [`LanguageDetector`] labels the vector
//! 4. A [`Scorer`] produces the [`ScoreResult`]
//!
//! Any failure in steps 1-2 is logged and replaced by the scorer's
//! fail-closed verdict. `analyze` never returns an error and never panics on
//! malformed input.
//!
//! An [`Analyzer`] is immutable after construction and is meant to be shared
//! through `Arc` across threads.

use crate::audio::{AudioDecoder, SampleBuffer};
use crate::error::AnalysisResult;
use crate::features::{FeatureExtractor, FeatureVector};
use crate::language::{CentroidLanguageHeuristic, LanguageDetector};
use crate::scoring::{HeuristicScorer, Scorer};
use serde::Serialize;
use tracing::{debug, warn};
use vfd_common::config::TomlConfig;
use vfd_common::ScoreResult;

/// Decoder and feature extractor built once from configuration
#[derive(Debug)]
pub struct AnalysisModel {
    decoder: AudioDecoder,
    extractor: FeatureExtractor,
}

impl AnalysisModel {
    pub fn new(decoder: AudioDecoder, extractor: FeatureExtractor) -> Self {
        Self { decoder, extractor }
    }

    /// # Errors
    /// * [`vfd_common::Error::Config`] if the analysis section fails validation
    pub fn from_config(config: &TomlConfig) -> vfd_common::Result<Self> {
        Ok(Self::new(
            AudioDecoder::new(config.analysis.target_sample_rate),
            FeatureExtractor::new(&config.analysis)?,
        ))
    }

    pub fn decoder(&self) -> &AudioDecoder {
        &self.decoder
    }

    pub fn extractor(&self) -> &FeatureExtractor {
        &self.extractor
    }

    /// Decode and extract, propagating the first failure
    pub fn extract_features(&self, bytes: &[u8]) -> AnalysisResult<FeatureVector> {
        let buffer = self.decoder.decode(bytes)?;
        debug!(
            samples = buffer.len(),
            source_sample_rate = buffer.source_sample_rate(),
            source_channels = buffer.source_channels(),
            "Decoded input"
        );
        self.extractor.extract(&buffer)
    }
}

/// Verdict plus the features it was derived from
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub result: ScoreResult,
    /// `None` on the fail-closed path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<FeatureVector>,
}

/// Fraud analyzer for in-memory audio
///
/// # Example
/// ```rust,ignore
/// use std::sync::Arc;
/// use vfd_analyzer::Analyzer;
///
/// let analyzer = Arc::new(Analyzer::from_config(&config)?);
/// let result = analyzer.analyze(&bytes);
/// println!("fraud={} confidence={:.2}", result.is_fraud, result.confidence);
/// ```
pub struct Analyzer {
    model: AnalysisModel,
    language: Box<dyn LanguageDetector>,
    scorer: Box<dyn Scorer>,
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer")
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl Analyzer {
    pub fn new(
        model: AnalysisModel,
        language: Box<dyn LanguageDetector>,
        scorer: Box<dyn Scorer>,
    ) -> Self {
        Self {
            model,
            language,
            scorer,
        }
    }

    /// Build the heuristic pipeline from a validated configuration
    ///
    /// # Errors
    /// * [`vfd_common::Error::Config`] if any section fails validation
    pub fn from_config(config: &TomlConfig) -> vfd_common::Result<Self> {
        config.validate()?;
        Ok(Self::new(
            AnalysisModel::from_config(config)?,
            Box::new(CentroidLanguageHeuristic::from_config(&config.language)),
            Box::new(HeuristicScorer::from_config(&config.scoring)),
        ))
    }

    pub fn model(&self) -> &AnalysisModel {
        &self.model
    }

    /// Analyze encoded audio bytes
    pub fn analyze(&self, bytes: &[u8]) -> ScoreResult {
        self.analyze_detailed(bytes).result
    }

    /// Analyze encoded audio bytes, keeping the feature vector
    pub fn analyze_detailed(&self, bytes: &[u8]) -> AnalysisReport {
        match self.model.extract_features(bytes) {
            Ok(features) => self.report(features),
            Err(e) => {
                warn!("Audio processing failed: {}", e);
                AnalysisReport {
                    result: self.scorer.fail_closed(),
                    features: None,
                }
            }
        }
    }

    /// Analyze a buffer that is already decoded to the analysis rate
    pub fn analyze_samples(&self, buffer: &SampleBuffer) -> AnalysisReport {
        match self.model.extractor.extract(buffer) {
            Ok(features) => self.report(features),
            Err(e) => {
                warn!("Feature extraction failed: {}", e);
                AnalysisReport {
                    result: self.scorer.fail_closed(),
                    features: None,
                }
            }
        }
    }

    /// Decode and extract without scoring
    pub fn extract_features(&self, bytes: &[u8]) -> AnalysisResult<FeatureVector> {
        self.model.extract_features(bytes)
    }

    fn report(&self, features: FeatureVector) -> AnalysisReport {
        let language = self.language.detect(&features);
        let result = self.scorer.score(&features, language);
        debug!(
            language = %result.language,
            confidence = result.confidence,
            is_fraud = result.is_fraud,
            "Scored"
        );
        AnalysisReport {
            result,
            features: Some(features),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::FixedSource;
    use std::sync::Arc;
    use vfd_common::config::{RandomSourceConfig, ScoringConfig};
    use vfd_common::Language;

    fn fixed_analyzer(u: f64) -> Analyzer {
        let config = TomlConfig::default();
        Analyzer::new(
            AnalysisModel::from_config(&config).unwrap(),
            Box::new(CentroidLanguageHeuristic::default()),
            Box::new(HeuristicScorer::with_source(
                ScoringConfig::default(),
                Arc::new(FixedSource(u)),
            )),
        )
    }

    fn tone(freq: f64, seconds: f64) -> SampleBuffer {
        let n = (seconds * 22050.0) as usize;
        let samples = (0..n)
            .map(|i| (2.0 * std::f64::consts::PI * freq * i as f64 / 22050.0).sin() as f32 * 0.5)
            .collect();
        SampleBuffer::from_samples(samples, 22050)
    }

    #[test]
    fn test_garbage_bytes_fail_closed() {
        let analyzer = fixed_analyzer(0.0);
        let report = analyzer.analyze_detailed(b"definitely not audio");
        assert!(report.result.is_processing_failure());
        assert!(report.result.is_fraud);
        assert_eq!(report.result.confidence, 0.9);
        assert!(report.features.is_none());
    }

    #[test]
    fn test_empty_bytes_fail_closed() {
        let result = fixed_analyzer(0.0).analyze(&[]);
        assert!(result.is_processing_failure());
    }

    #[test]
    fn test_short_samples_fail_closed() {
        let buffer = SampleBuffer::from_samples(vec![0.1; 1000], 22050);
        let report = fixed_analyzer(0.0).analyze_samples(&buffer);
        assert!(report.result.is_processing_failure());
        assert_eq!(report.result.language, Language::Unknown);
        assert_eq!(report.result.robotic_score, 0.0);
    }

    #[test]
    fn test_tone_samples_scored() {
        let report = fixed_analyzer(0.0).analyze_samples(&tone(2500.0, 1.0));
        let features = report.features.unwrap();
        assert_eq!(features.as_slice().len(), 55);
        assert_eq!(report.result.language, Language::Telugu);
        assert!(!report.result.is_processing_failure());
    }

    #[test]
    fn test_from_config_rejects_invalid() {
        let mut config = TomlConfig::default();
        config.scoring.random = RandomSourceConfig::Fixed { value: 1.0 };
        assert!(Analyzer::from_config(&config).is_err());
    }

    #[test]
    fn test_model_rejects_zero_hop() {
        let mut config = TomlConfig::default();
        config.analysis.hop_size = 0;
        assert!(matches!(
            AnalysisModel::from_config(&config),
            Err(vfd_common::Error::Config(_))
        ));
        assert!(Analyzer::from_config(&config).is_err());
    }

    #[test]
    fn test_analyzer_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Analyzer>();
    }

    #[test]
    fn test_report_serialization_omits_missing_features() {
        let report = fixed_analyzer(0.0).analyze_detailed(&[]);
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("features").is_none());
        assert_eq!(json["result"]["reason"], "Audio processing failed");
        assert_eq!(json["result"]["language"], "unknown");
    }
}
