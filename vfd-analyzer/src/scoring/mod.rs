//! Fraud Scoring
//!
//! **Purpose:** Turn a feature vector into a fraud verdict.
//!
//! The shipped [`HeuristicScorer`] combines two binary indicators with a
//! bounded random term:
//!
//! ```text
//! score = w_r * robotic + w_v * high_variance + w_u * U     U ~ [0, 1)
//! is_fraud = score > fraud_threshold
//! ```
//!
//! - `robotic`: any mean cepstral coefficient exceeds the threshold
//! - `high_variance`: population std of vector slots 13..37 exceeds the threshold
//!
//! Extraction failures never reach the indicators; they map to the
//! fail-closed verdict from [`Scorer::fail_closed`].

pub mod random;

use crate::dsp::{mean, std_dev};
use crate::features::{FeatureVector, MFCC_STD};
use random::UniformSource;
use std::ops::Range;
use std::sync::Arc;
use vfd_common::config::ScoringConfig;
use vfd_common::{Language, ScoreResult};

pub use random::{EntropySource, FixedSource, SeededSource};

/// Feature slots feeding the variance indicator: all of `mfcc_std` plus the
/// first eleven `chroma_mean` values
pub const VARIANCE_WINDOW: Range<usize> = MFCC_STD.start..37;

pub const ROBOTIC_REASON: &str = "High MFCC variance detected";
pub const UNNATURAL_REASON: &str = "Unnatural speech patterns";

/// Turns features and a language label into a verdict
pub trait Scorer: Send + Sync {
    fn score(&self, features: &FeatureVector, language: Language) -> ScoreResult;

    /// Verdict for inputs whose features could not be extracted
    fn fail_closed(&self) -> ScoreResult;
}

/// Binary indicators derived from a feature vector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Indicators {
    pub robotic: bool,
    pub high_variance: bool,
}

/// Threshold heuristic with a bounded stochastic term
pub struct HeuristicScorer {
    config: ScoringConfig,
    random: Arc<dyn UniformSource>,
}

impl std::fmt::Debug for HeuristicScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeuristicScorer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl HeuristicScorer {
    /// Scorer with the random source named in `config.random`
    pub fn from_config(config: &ScoringConfig) -> Self {
        Self::with_source(config.clone(), random::from_config(&config.random))
    }

    pub fn with_source(config: ScoringConfig, random: Arc<dyn UniformSource>) -> Self {
        Self { config, random }
    }

    pub fn indicators(&self, features: &FeatureVector) -> Indicators {
        let robotic = features
            .mfcc_mean()
            .iter()
            .any(|&c| c > self.config.robotic_mfcc_threshold);

        let window = &features.as_slice()[VARIANCE_WINDOW];
        let spread = std_dev(window, mean(window));
        let high_variance = spread > self.config.variance_threshold;

        Indicators {
            robotic,
            high_variance,
        }
    }

    /// Weighted sum of the indicators and a draw `u`
    pub fn composite_score(&self, indicators: Indicators, u: f64) -> f64 {
        let as_unit = |flag: bool| if flag { 1.0 } else { 0.0 };
        self.config.robotic_weight * as_unit(indicators.robotic)
            + self.config.variance_weight * as_unit(indicators.high_variance)
            + self.config.random_weight * u
    }
}

impl Scorer for HeuristicScorer {
    fn score(&self, features: &FeatureVector, language: Language) -> ScoreResult {
        let indicators = self.indicators(features);
        let score = self.composite_score(indicators, self.random.next_unit());

        let reason = if indicators.robotic {
            ROBOTIC_REASON
        } else {
            UNNATURAL_REASON
        };

        ScoreResult {
            is_fraud: score > self.config.fraud_threshold,
            confidence: score.clamp(0.0, 1.0),
            language,
            robotic_score: if indicators.robotic { 1.0 } else { 0.0 },
            reason: reason.to_string(),
        }
    }

    fn fail_closed(&self) -> ScoreResult {
        ScoreResult::processing_failed(self.config.failure_confidence)
    }
}
