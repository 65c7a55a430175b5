//! # VFD Common Library
//!
//! Shared code for the voice fraud detection crates:
//! - Error types
//! - Configuration model and TOML loading
//! - Result types returned by the analysis pipeline (`ScoreResult`, `Language`)

pub mod config;
pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{Language, ScoreResult};
