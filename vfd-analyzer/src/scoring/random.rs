//! Uniform draws for the stochastic score term

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Arc, Mutex};
use vfd_common::config::RandomSourceConfig;

/// Source of uniform values in `[0, 1)`
///
/// Shared across concurrent analyses, so implementations must be `Sync`.
pub trait UniformSource: Send + Sync {
    fn next_unit(&self) -> f64;
}

/// OS-seeded per-thread generator
#[derive(Debug, Clone, Copy, Default)]
pub struct EntropySource;

impl UniformSource for EntropySource {
    fn next_unit(&self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

/// Single generator seeded explicitly
///
/// Draws are serialized through a mutex, so one seed yields one sequence
/// regardless of which thread asks.
#[derive(Debug)]
pub struct SeededSource {
    rng: Mutex<StdRng>,
}

impl SeededSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl UniformSource for SeededSource {
    fn next_unit(&self) -> f64 {
        // A panic mid-draw cannot leave the generator in a torn state
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.gen::<f64>()
    }
}

/// Constant draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedSource(pub f64);

impl UniformSource for FixedSource {
    fn next_unit(&self) -> f64 {
        self.0
    }
}

/// Build the source selected by configuration
pub fn from_config(config: &RandomSourceConfig) -> Arc<dyn UniformSource> {
    match config {
        RandomSourceConfig::Entropy => Arc::new(EntropySource),
        RandomSourceConfig::Seeded { seed } => Arc::new(SeededSource::new(*seed)),
        RandomSourceConfig::Fixed { value } => Arc::new(FixedSource(*value)),
    }
}
