//! Audio Decoding
//!
//! **Purpose:** Decode in-memory audio bytes to a mono f32 [`SampleBuffer`] at
//! the analysis sample rate.
//!
//! Uses symphonia for format-agnostic decoding (WAV, FLAC, MP3, OGG, AAC, ...)
//! and rubato for resampling.

use super::SampleBuffer;
use crate::error::{AnalysisError, AnalysisResult};
use rubato::{Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction};
use std::io::Cursor;
use symphonia::core::audio::{AudioBuffer, AudioBufferRef, Signal};
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::conv::FromSample;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::sample::Sample;
use tracing::{debug, warn};

/// Decodes audio bytes into mono samples at a fixed sample rate
#[derive(Debug, Clone)]
pub struct AudioDecoder {
    target_sample_rate: u32,
}

impl Default for AudioDecoder {
    fn default() -> Self {
        Self::new(22050)
    }
}

impl AudioDecoder {
    pub fn new(target_sample_rate: u32) -> Self {
        Self { target_sample_rate }
    }

    pub fn target_sample_rate(&self) -> u32 {
        self.target_sample_rate
    }

    /// Decode audio bytes, probing the container from its content
    pub fn decode(&self, bytes: &[u8]) -> AnalysisResult<SampleBuffer> {
        self.decode_with_hint(bytes, None)
    }

    /// Decode audio bytes with an optional file-extension hint for the prober
    ///
    /// **Algorithm:**
    /// 1. Probe the container from the byte stream
    /// 2. Find the first decodable audio track
    /// 3. Decode all packets, averaging channels to mono
    /// 4. Resample to the target rate if the source rate differs
    ///
    /// # Errors
    /// * [`AnalysisError::Decode`] for unreadable or corrupt input, or when no
    ///   samples are produced
    pub fn decode_with_hint(
        &self,
        bytes: &[u8],
        extension: Option<&str>,
    ) -> AnalysisResult<SampleBuffer> {
        if bytes.is_empty() {
            return Err(AnalysisError::Decode("empty input".to_string()));
        }

        let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes.to_vec())), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = extension {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
            .map_err(|e| AnalysisError::Decode(format!("Failed to probe audio format: {}", e)))?;

        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| AnalysisError::Decode("No audio track found".to_string()))?;

        let track_id = track.id;
        let source_sample_rate = track
            .codec_params
            .sample_rate
            .ok_or_else(|| AnalysisError::Decode("Sample rate unknown".to_string()))?;
        let source_channels = track.codec_params.channels.map(|c| c.count()).unwrap_or(0);

        debug!(
            bytes = bytes.len(),
            sample_rate = source_sample_rate,
            channels = source_channels,
            "Audio stream info"
        );

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| AnalysisError::Decode(format!("Failed to create decoder: {}", e)))?;

        let mut mono: Vec<f32> = Vec::new();

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    // End of stream
                    break;
                }
                Err(SymphoniaError::ResetRequired) => break,
                Err(e) => {
                    return Err(AnalysisError::Decode(format!("Error reading packet: {}", e)));
                }
            };

            if packet.track_id() != track_id {
                continue;
            }

            match decoder.decode(&packet) {
                Ok(decoded) => mono.extend(mix_to_mono(&decoded)),
                Err(SymphoniaError::DecodeError(msg)) => {
                    warn!("Skipping undecodable packet: {}", msg);
                }
                Err(e) => {
                    return Err(AnalysisError::Decode(format!("Failed to decode packet: {}", e)));
                }
            }
        }

        if mono.is_empty() {
            return Err(AnalysisError::Decode("No audio samples decoded".to_string()));
        }

        let samples = if source_sample_rate != self.target_sample_rate {
            debug!(
                "Resampling {} samples from {} Hz to {} Hz",
                mono.len(),
                source_sample_rate,
                self.target_sample_rate
            );
            self.resample(mono, source_sample_rate)?
        } else {
            mono
        };

        if samples.is_empty() {
            return Err(AnalysisError::Decode("Resampling produced no samples".to_string()));
        }

        debug!(
            total_samples = samples.len(),
            duration_seconds = format!("{:.2}", samples.len() as f64 / self.target_sample_rate as f64),
            "Audio decoding complete"
        );

        Ok(SampleBuffer::decoded(
            samples,
            self.target_sample_rate,
            source_sample_rate,
            source_channels,
        ))
    }

    /// Resample mono PCM to the target rate
    ///
    /// Sinc interpolation with a 256-tap BlackmanHarris2 filter and 0.95
    /// cutoff, processed as a single chunk. The filter tail is flushed with
    /// zeros and the leading delay dropped, so the output holds exactly
    /// `round(len * ratio)` samples aligned with the input.
    fn resample(&self, samples: Vec<f32>, source_rate: u32) -> AnalysisResult<Vec<f32>> {
        let num_frames = samples.len();

        let params = SincInterpolationParameters {
            sinc_len: 256,
            f_cutoff: 0.95,
            interpolation: SincInterpolationType::Linear,
            oversampling_factor: 256,
            window: WindowFunction::BlackmanHarris2,
        };

        let ratio = self.target_sample_rate as f64 / source_rate as f64;

        let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, num_frames, 1)
            .map_err(|e| AnalysisError::Decode(format!("Failed to create resampler: {}", e)))?;

        let delay = resampler.output_delay();
        let expected = (num_frames as f64 * ratio).round() as usize;

        let mut output = resampler
            .process(&[samples], None)
            .map_err(|e| AnalysisError::Decode(format!("Resampling failed: {}", e)))?
            .pop()
            .unwrap_or_default();

        while output.len() < expected + delay {
            let tail = resampler
                .process_partial(None::<&[Vec<f32>]>, None)
                .map_err(|e| AnalysisError::Decode(format!("Resampler flush failed: {}", e)))?
                .pop()
                .unwrap_or_default();
            if tail.is_empty() {
                break;
            }
            output.extend(tail);
        }

        output.drain(..delay.min(output.len()));
        output.truncate(expected);
        Ok(output)
    }
}

/// Average all channels of a decoded buffer into mono f32
fn mix_to_mono(decoded: &AudioBufferRef) -> Vec<f32> {
    match decoded {
        AudioBufferRef::U8(buf) => average_channels(buf),
        AudioBufferRef::U16(buf) => average_channels(buf),
        AudioBufferRef::U24(buf) => average_channels(buf),
        AudioBufferRef::U32(buf) => average_channels(buf),
        AudioBufferRef::S8(buf) => average_channels(buf),
        AudioBufferRef::S16(buf) => average_channels(buf),
        AudioBufferRef::S24(buf) => average_channels(buf),
        AudioBufferRef::S32(buf) => average_channels(buf),
        AudioBufferRef::F32(buf) => average_channels(buf),
        AudioBufferRef::F64(buf) => average_channels(buf),
    }
}

fn average_channels<S>(buf: &AudioBuffer<S>) -> Vec<f32>
where
    S: Sample,
    f32: FromSample<S>,
{
    let num_channels = buf.spec().channels.count();
    if num_channels == 0 {
        return Vec::new();
    }

    let mut mono = vec![0.0f32; buf.frames()];
    for ch in 0..num_channels {
        for (acc, &sample) in mono.iter_mut().zip(buf.chan(ch)) {
            *acc += f32::from_sample(sample);
        }
    }

    let scale = 1.0 / num_channels as f32;
    for value in mono.iter_mut() {
        *value *= scale;
    }
    mono
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_empty_bytes() {
        let result = AudioDecoder::default().decode(&[]);
        assert!(matches!(result, Err(AnalysisError::Decode(_))));
    }

    #[test]
    fn test_decode_garbage_bytes() {
        let garbage: Vec<u8> = (0..4096).map(|i| (i * 31 % 251) as u8).collect();
        let result = AudioDecoder::default().decode(&garbage);
        assert!(matches!(result, Err(AnalysisError::Decode(_))));
    }

    #[test]
    fn test_decode_truncated_wav_header() {
        let result = AudioDecoder::default().decode_with_hint(b"RIFF\x00\x00\x00\x00WAVE", Some("wav"));
        assert!(result.is_err());
    }

    #[test]
    fn test_resample_odd_length() {
        let decoder = AudioDecoder::new(22050);
        let output = decoder.resample(vec![0.1; 48001], 48000).unwrap();
        assert_eq!(output.len(), (48001.0f64 * 22050.0 / 48000.0).round() as usize);
    }

    #[test]
    fn test_resample_halves_length() {
        let decoder = AudioDecoder::new(22050);
        let samples: Vec<f32> = (0..44100)
            .map(|i| (2.0 * std::f32::consts::PI * 440.0 * i as f32 / 44100.0).sin() * 0.5)
            .collect();

        let output = decoder.resample(samples, 44100).unwrap();
        assert_eq!(output.len(), 22050);

        // Delay is trimmed, so the tone keeps its phase away from the edges
        for i in (1000..21000).step_by(997) {
            let expected = (2.0 * std::f32::consts::PI * 440.0 * i as f32 / 22050.0).sin() * 0.5;
            assert!(
                (output[i] - expected).abs() < 0.05,
                "sample {} = {}, expected {}",
                i,
                output[i],
                expected
            );
        }
    }
}
