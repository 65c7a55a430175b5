//! Result types shared between the analysis core and its callers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reason reported whenever decoding or feature extraction fails
pub const PROCESSING_FAILED_REASON: &str = "Audio processing failed";

/// Coarse spoken-language bucket
///
/// Produced by an acoustic proxy (spectral centroid), not by linguistic
/// identification. `Unknown` is reserved for inputs whose features could not
/// be extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Telugu,
    Malayalam,
    Hindi,
    English,
    Unknown,
}

impl Language {
    /// Lower-case label as reported to callers
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Telugu => "telugu",
            Language::Malayalam => "malayalam",
            Language::Hindi => "hindi",
            Language::English => "english",
            Language::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one analysis invocation
///
/// Transient: returned to the caller and discarded, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Fraud verdict
    pub is_fraud: bool,
    /// Composite score clamped to [0, 1]
    pub confidence: f64,
    /// Language bucket (`Unknown` when extraction failed)
    pub language: Language,
    /// 1.0 when the robotic indicator fired, 0.0 otherwise
    pub robotic_score: f64,
    /// Human-readable explanation
    pub reason: String,
}

impl ScoreResult {
    /// Fail-closed verdict used when no features could be extracted
    ///
    /// Absence of signal is treated as suspicious: the verdict is always
    /// fraud with the given fixed confidence.
    pub fn processing_failed(confidence: f64) -> Self {
        Self {
            is_fraud: true,
            confidence,
            language: Language::Unknown,
            robotic_score: 0.0,
            reason: PROCESSING_FAILED_REASON.to_string(),
        }
    }

    /// True if this result came from the fail-closed path
    pub fn is_processing_failure(&self) -> bool {
        self.reason == PROCESSING_FAILED_REASON && self.language == Language::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_serializes_lowercase() {
        let json = serde_json::to_string(&Language::Malayalam).unwrap();
        assert_eq!(json, "\"malayalam\"");

        let parsed: Language = serde_json::from_str("\"telugu\"").unwrap();
        assert_eq!(parsed, Language::Telugu);
    }

    #[test]
    fn test_language_display_matches_serde_label() {
        for lang in [
            Language::Telugu,
            Language::Malayalam,
            Language::Hindi,
            Language::English,
            Language::Unknown,
        ] {
            let json = serde_json::to_string(&lang).unwrap();
            assert_eq!(json, format!("\"{}\"", lang));
        }
    }

    #[test]
    fn test_processing_failed_shape() {
        let result = ScoreResult::processing_failed(0.9);
        assert!(result.is_fraud);
        assert_eq!(result.confidence, 0.9);
        assert_eq!(result.language, Language::Unknown);
        assert_eq!(result.robotic_score, 0.0);
        assert_eq!(result.reason, "Audio processing failed");
        assert!(result.is_processing_failure());
    }

    #[test]
    fn test_score_result_json_field_names() {
        let result = ScoreResult {
            is_fraud: false,
            confidence: 0.45,
            language: Language::English,
            robotic_score: 1.0,
            reason: "High MFCC variance detected".to_string(),
        };

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["is_fraud"], false);
        assert_eq!(value["confidence"], 0.45);
        assert_eq!(value["language"], "english");
        assert_eq!(value["robotic_score"], 1.0);
        assert_eq!(value["reason"], "High MFCC variance detected");
    }
}
