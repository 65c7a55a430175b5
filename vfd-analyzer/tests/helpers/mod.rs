//! Test Helper Utilities
//!
//! Shared utilities for testing vfd-analyzer

#![allow(dead_code)]

pub mod audio_generator;

// Re-export commonly used items
pub use audio_generator::{click_train_wav, tone_wav, wav_bytes, AudioConfig};

use std::sync::Arc;
use vfd_analyzer::scoring::FixedSource;
use vfd_analyzer::{AnalysisModel, Analyzer, CentroidLanguageHeuristic, HeuristicScorer};
use vfd_common::config::{ScoringConfig, TomlConfig};

/// Analyzer with default settings and a constant random draw
pub fn fixed_draw_analyzer(u: f64) -> Analyzer {
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
