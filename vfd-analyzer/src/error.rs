//! Error types for vfd-analyzer
//!
//! No variant crosses the `analyze` boundary: the pipeline converts each
//! into the fail-closed verdict.

use thiserror::Error;

/// Analysis error
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Audio bytes are unreadable, corrupt, or contain no samples
    #[error("Audio decode failed: {0}")]
    Decode(String),

    /// Sample buffer is shorter than one analysis window
    #[error("Not enough audio for one analysis frame: {samples} samples < window of {window}")]
    EmptyFrames { samples: usize, window: usize },

    /// FFT buffers did not match the plan length
    #[error("Spectral transform failed: {0}")]
    Spectrum(String),
}

/// Result type for analysis stages
pub type AnalysisResult<T> = Result<T, AnalysisError>;
