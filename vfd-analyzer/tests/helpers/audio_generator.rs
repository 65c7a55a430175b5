//! Audio Test Fixture Generator
//!
//! Builds 16-bit PCM WAV files in memory with hound

use std::f32::consts::PI;
use std::io::Cursor;

/// Configuration for a generated sine tone
#[derive(Debug, Clone)]
pub struct AudioConfig {
    pub duration_seconds: f64,
    pub sample_rate: u32,
    pub channels: u16,
    pub frequency: f32,
    pub amplitude: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            duration_seconds: 2.0,
            sample_rate: 22050,
            channels: 1,
            frequency: 440.0,
            amplitude: 0.5,
        }
    }
}

/// Encode per-channel samples (equal lengths, range [-1, 1]) as a WAV file
pub fn wav_bytes(channels: &[Vec<f32>], sample_rate: u32) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: channels.len() as u16,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        let frames = channels.first().map(|c| c.len()).unwrap_or(0);
        for i in 0..frames {
            for channel in channels {
                let sample = (channel[i].clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
                writer.write_sample(sample).unwrap();
            }
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

/// Sine tone, identical on every channel
pub fn tone_wav(config: &AudioConfig) -> Vec<u8> {
    let total = (config.duration_seconds * config.sample_rate as f64) as usize;
    let samples: Vec<f32> = (0..total)
        .map(|i| {
            let t = i as f32 / config.sample_rate as f32;
            config.amplitude * (2.0 * PI * config.frequency * t).sin()
        })
        .collect();
    let channels = vec![samples; config.channels.max(1) as usize];
    wav_bytes(&channels, config.sample_rate)
}

/// Short 1 kHz bursts in silence, one every `period_samples`
pub fn click_train_wav(sample_rate: u32, duration_seconds: f64, period_samples: usize) -> Vec<u8> {
    let total = (duration_seconds * sample_rate as f64) as usize;
    let burst = (0.010 * sample_rate as f64) as usize;
    let samples: Vec<f32> = (0..total)
        .map(|i| {
            let offset = i % period_samples;
            if offset < burst {
                let t = offset as f32 / sample_rate as f32;
                0.8 * (2.0 * PI * 1000.0 * t).sin()
            } else {
                0.0
            }
        })
        .collect();
    wav_bytes(&[samples], sample_rate)
}
