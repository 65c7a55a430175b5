//! vfd-analyzer library interface
//!
//! Voice fraud detection for in-memory audio: decoding, spectral features,
//! a centroid language heuristic and a threshold fraud scorer.

pub mod audio;
pub mod dsp;
pub mod error;
pub mod features;
pub mod language;
pub mod pipeline;
pub mod scoring;

pub use crate::error::{AnalysisError, AnalysisResult};
pub use audio::{AudioDecoder, SampleBuffer};
pub use features::{FeatureExtractor, FeatureVector, FEATURE_LEN};
pub use language::{CentroidLanguageHeuristic, LanguageDetector};
pub use pipeline::{AnalysisModel, AnalysisReport, Analyzer};
pub use scoring::{HeuristicScorer, Scorer};
pub use vfd_common::{Language, ScoreResult};
