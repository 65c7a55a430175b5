//! Language bucket from spectral brightness
//!
//! A placeholder acoustic proxy: the aggregated spectral centroid is compared
//! against a descending ladder of thresholds. It does not identify language.

use crate::features::FeatureVector;
use vfd_common::config::LanguageConfig;
use vfd_common::Language;

/// Assigns a language label to an extracted feature vector
pub trait LanguageDetector: Send + Sync {
    fn detect(&self, features: &FeatureVector) -> Language;
}

/// Centroid threshold ladder, first match wins, strict `>`
#[derive(Debug, Clone, PartialEq)]
pub struct CentroidLanguageHeuristic {
    telugu_above_hz: f64,
    malayalam_above_hz: f64,
    hindi_above_hz: f64,
}

impl Default for CentroidLanguageHeuristic {
    fn default() -> Self {
        Self::from_config(&LanguageConfig::default())
    }
}

impl CentroidLanguageHeuristic {
    pub fn from_config(config: &LanguageConfig) -> Self {
        Self {
            telugu_above_hz: config.telugu_above_hz,
            malayalam_above_hz: config.malayalam_above_hz,
            hindi_above_hz: config.hindi_above_hz,
        }
    }

    pub fn classify_centroid(&self, centroid_hz: f64) -> Language {
        if centroid_hz > self.telugu_above_hz {
            Language::Telugu
        } else if centroid_hz > self.malayalam_above_hz {
            Language::Malayalam
        } else if centroid_hz > self.hindi_above_hz {
            Language::Hindi
        } else {
            Language::English
        }
    }
}

impl LanguageDetector for CentroidLanguageHeuristic {
    fn detect(&self, features: &FeatureVector) -> Language {
        self.classify_centroid(features.spectral_centroid())
    }
}
