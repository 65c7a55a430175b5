//! Configuration model and TOML loading
//!
//! Every section is optional in the TOML file; missing keys fall back to the
//! compiled defaults, which reproduce the reference heuristic exactly.
//!
//! Config file resolution priority:
//! 1. Command-line argument (highest priority)
//! 2. `VFD_CONFIG` environment variable
//! 3. Platform config file (`~/.config/vfd/config.toml`, then `/etc/vfd/config.toml` on Linux)
//! 4. Compiled defaults (fallback)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "VFD_CONFIG";

/// Root of the TOML configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub logging: LoggingConfig,
    pub analysis: AnalysisConfig,
    pub language: LanguageConfig,
    pub scoring: ScoringConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset (e.g. "info", "vfd_analyzer=debug")
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Signal-processing parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Sample rate every input is resampled to (Hz)
    pub target_sample_rate: u32,
    /// Analysis window and FFT length in samples
    pub fft_size: usize,
    /// Hop between successive windows in samples
    pub hop_size: usize,
    /// Mel bands feeding the cepstral transform
    pub n_mels: usize,
    /// Fraction of spectral energy defining the rolloff frequency
    pub rolloff_percent: f64,
    /// Dynamic range kept below the loudest mel bin (dB)
    pub top_db: f64,
    /// Centre of the tempo prior (BPM)
    pub start_bpm: f64,
    /// Fastest tempo considered (BPM)
    pub max_bpm: f64,
    /// Longest autocorrelation lag considered for tempo (seconds)
    pub tempo_window_seconds: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            target_sample_rate: 22050,
            fft_size: 2048,
            hop_size: 512,
            n_mels: 128,
            rolloff_percent: 0.85,
            top_db: 80.0,
            start_bpm: 120.0,
            max_bpm: 320.0,
            tempo_window_seconds: 8.0,
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<()> {
        if self.target_sample_rate == 0 {
            return Err(Error::Config("analysis.target_sample_rate must be > 0".to_string()));
        }
        if self.fft_size < 2 {
            return Err(Error::Config("analysis.fft_size must be >= 2".to_string()));
        }
        if self.hop_size == 0 || self.hop_size > self.fft_size {
            return Err(Error::Config(format!(
                "analysis.hop_size must be in 1..={} (got {})",
                self.fft_size, self.hop_size
            )));
        }
        if self.n_mels == 0 {
            return Err(Error::Config("analysis.n_mels must be > 0".to_string()));
        }
        if !(self.rolloff_percent > 0.0 && self.rolloff_percent <= 1.0) {
            return Err(Error::Config(format!(
                "analysis.rolloff_percent must be in (0, 1] (got {})",
                self.rolloff_percent
            )));
        }
        if !(self.top_db.is_finite() && self.top_db > 0.0) {
            return Err(Error::Config("analysis.top_db must be a positive number".to_string()));
        }
        if !(self.start_bpm.is_finite() && self.start_bpm > 0.0) {
            return Err(Error::Config("analysis.start_bpm must be a positive number".to_string()));
        }
        if !(self.max_bpm.is_finite() && self.max_bpm > 0.0) {
            return Err(Error::Config("analysis.max_bpm must be a positive number".to_string()));
        }
        if !(self.tempo_window_seconds.is_finite() && self.tempo_window_seconds > 0.0) {
            return Err(Error::Config(
                "analysis.tempo_window_seconds must be a positive number".to_string(),
            ));
        }
        Ok(())
    }
}

/// Spectral-centroid thresholds for the language ladder (Hz, strict `>`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageConfig {
    pub telugu_above_hz: f64,
    pub malayalam_above_hz: f64,
    pub hindi_above_hz: f64,
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            telugu_above_hz: 2000.0,
            malayalam_above_hz: 1800.0,
            hindi_above_hz: 1600.0,
        }
    }
}

impl LanguageConfig {
    /// Thresholds must be finite and strictly descending so the ladder stays
    /// mutually exclusive
    pub fn validate(&self) -> Result<()> {
        let ladder = [self.telugu_above_hz, self.malayalam_above_hz, self.hindi_above_hz];
        if ladder.iter().any(|v| !v.is_finite()) {
            return Err(Error::Config("language thresholds must be finite".to_string()));
        }
        if !(ladder[0] > ladder[1] && ladder[1] > ladder[2]) {
            return Err(Error::Config(format!(
                "language thresholds must be strictly descending (got {} > {} > {})",
                ladder[0], ladder[1], ladder[2]
            )));
        }
        Ok(())
    }
}

/// Source of the uniform draw in the composite fraud score
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum RandomSourceConfig {
    /// Fresh OS-seeded generator per thread; verdicts are not reproducible
    #[default]
    Entropy,
    /// Single generator from an explicit seed; the sequence of draws is reproducible
    Seeded { seed: u64 },
    /// Constant draw; scoring becomes fully deterministic
    Fixed { value: f64 },
}

/// Fraud-scoring thresholds and weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Any mean cepstral coefficient above this marks the voice as robotic
    pub robotic_mfcc_threshold: f64,
    /// Spread of the variance window above this marks speech as inconsistent
    pub variance_threshold: f64,
    pub robotic_weight: f64,
    pub variance_weight: f64,
    pub random_weight: f64,
    /// Scores strictly above this are fraud
    pub fraud_threshold: f64,
    /// Confidence reported on the fail-closed path
    pub failure_confidence: f64,
    pub random: RandomSourceConfig,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            robotic_mfcc_threshold: 15.0,
            variance_threshold: 5.0,
            robotic_weight: 0.3,
            variance_weight: 0.4,
            random_weight: 0.3,
            fraud_threshold: 0.6,
            failure_confidence: 0.9,
            random: RandomSourceConfig::Entropy,
        }
    }
}

impl ScoringConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("robotic_mfcc_threshold", self.robotic_mfcc_threshold),
            ("variance_threshold", self.variance_threshold),
        ] {
            if !value.is_finite() {
                return Err(Error::Config(format!("scoring.{} must be finite", name)));
            }
        }
        for (name, value) in [
            ("robotic_weight", self.robotic_weight),
            ("variance_weight", self.variance_weight),
            ("random_weight", self.random_weight),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(Error::Config(format!(
                    "scoring.{} must be a non-negative number (got {})",
                    name, value
                )));
            }
        }
        for (name, value) in [
            ("fraud_threshold", self.fraud_threshold),
            ("failure_confidence", self.failure_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::Config(format!(
                    "scoring.{} must be in [0, 1] (got {})",
                    name, value
                )));
            }
        }
        if let RandomSourceConfig::Fixed { value } = self.random {
            if !(0.0..1.0).contains(&value) {
                return Err(Error::Config(format!(
                    "scoring.random.value must be in [0, 1) (got {})",
                    value
                )));
            }
        }
        Ok(())
    }
}

impl TomlConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Validate every section
    pub fn validate(&self) -> Result<()> {
        self.analysis.validate()?;
        self.language.validate()?;
        self.scoring.validate()?;
        Ok(())
    }
}

/// Resolves which config file (if any) to load
#[derive(Debug, Clone, Default)]
pub struct ConfigResolver {
    cli_path: Option<PathBuf>,
}

impl ConfigResolver {
    pub fn new(cli_path: Option<PathBuf>) -> Self {
        Self { cli_path }
    }

    /// Config file path following the documented priority order
    ///
    /// Explicit paths (CLI, environment) are returned even when they do not
    /// exist so the caller can report them; platform paths only when present.
    pub fn resolve(&self) -> Option<PathBuf> {
        // Priority 1: Command-line argument
        if let Some(path) = &self.cli_path {
            return Some(path.clone());
        }

        // Priority 2: Environment variable
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.trim().is_empty() {
                return Some(PathBuf::from(path));
            }
        }

        // Priority 3: Platform config file
        platform_config_paths().into_iter().find(|p| p.exists())
    }

    /// Load the resolved config, falling back to defaults
    ///
    /// A missing file is not fatal (warning + defaults). A file that exists
    /// but cannot be parsed or validated is an error.
    pub fn load(&self) -> Result<TomlConfig> {
        let Some(path) = self.resolve() else {
            info!("No config file found, using compiled defaults");
            return Ok(TomlConfig::default());
        };

        if !path.exists() {
            warn!(
                "Config file {} does not exist, using compiled defaults",
                path.display()
            );
            return Ok(TomlConfig::default());
        }

        let config = TomlConfig::load(&path)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }
}

/// Candidate config file locations for the current platform, in priority order
pub fn platform_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("vfd").join("config.toml"));
    }
    if cfg!(target_os = "linux") {
        paths.push(PathBuf::from("/etc/vfd/config.toml"));
    }
    paths
}
