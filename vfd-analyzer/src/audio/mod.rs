//! Audio input: container decoding, channel mixdown and resampling

pub mod decoder;

pub use decoder::AudioDecoder;

/// Mono f32 samples at the analysis sample rate
///
/// Created once per invocation by [`AudioDecoder`] and never mutated.
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
    source_sample_rate: u32,
    source_channels: usize,
}

impl SampleBuffer {
    /// Wrap samples that are already mono at `sample_rate`
    pub fn from_samples(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
            source_sample_rate: sample_rate,
            source_channels: 1,
        }
    }

    pub(crate) fn decoded(
        samples: Vec<f32>,
        sample_rate: u32,
        source_sample_rate: u32,
        source_channels: usize,
    ) -> Self {
        Self {
            samples,
            sample_rate,
            source_sample_rate,
            source_channels,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sample rate of `samples()` in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Sample rate of the container before resampling
    pub fn source_sample_rate(&self) -> u32 {
        self.source_sample_rate
    }

    /// Channel count of the container before mixdown
    pub fn source_channels(&self) -> usize {
        self.source_channels
    }

    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}
