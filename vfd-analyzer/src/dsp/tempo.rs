//! Global tempo estimate from onset-strength periodicity

/// Onset envelope from a mel dB spectrogram
///
/// Frame 0 is 0.0; every later frame is the mean over mel bands of the
/// positive first difference.
pub fn onset_strength(mel_db: &[Vec<f64>]) -> Vec<f64> {
    let mut envelope = Vec::with_capacity(mel_db.len());
    if mel_db.is_empty() {
        return envelope;
    }
    envelope.push(0.0);

    for pair in mel_db.windows(2) {
        let (prev, cur) = (&pair[0], &pair[1]);
        let n = cur.len().max(1) as f64;
        let rise: f64 = cur
            .iter()
            .zip(prev)
            .map(|(c, p)| (c - p).max(0.0))
            .sum();
        envelope.push(rise / n);
    }
    envelope
}

/// Autocorrelation tempo estimator with a log-normal prior over BPM
#[derive(Debug, Clone)]
pub struct TempoEstimator {
    sample_rate: u32,
    hop_size: usize,
    start_bpm: f64,
    max_bpm: f64,
    window_seconds: f64,
}

impl TempoEstimator {
    pub fn new(
        sample_rate: u32,
        hop_size: usize,
        start_bpm: f64,
        max_bpm: f64,
        window_seconds: f64,
    ) -> Self {
        Self {
            sample_rate,
            hop_size,
            start_bpm,
            max_bpm,
            window_seconds,
        }
    }

    fn frames_per_minute(&self) -> f64 {
        60.0 * self.sample_rate as f64 / self.hop_size as f64
    }

    /// BPM for a lag measured in frames
    pub fn lag_to_bpm(&self, lag: usize) -> f64 {
        self.frames_per_minute() / lag as f64
    }

    /// Estimate tempo in BPM
    ///
    /// Returns 0.0 when the envelope is too short or carries no periodic
    /// energy (e.g. silence).
    pub fn estimate(&self, onset: &[f64]) -> f64 {
        let n = onset.len();
        if n < 2 {
            return 0.0;
        }

        let min_lag = ((self.frames_per_minute() / self.max_bpm).ceil() as usize).max(1);
        let window_lag = (self.window_seconds * self.sample_rate as f64 / self.hop_size as f64)
            .round() as usize;
        let max_lag = window_lag.min(n - 1);
        if min_lag > max_lag {
            return 0.0;
        }

        let mut best: Option<(usize, f64)> = None;
        for lag in min_lag..=max_lag {
            let ac: f64 = onset[..n - lag]
                .iter()
                .zip(&onset[lag..])
                .map(|(a, b)| a * b)
                .sum();
            if ac <= 0.0 {
                continue;
            }

            let octaves = (self.lag_to_bpm(lag) / self.start_bpm).log2();
            let weighted = ac * (-0.5 * octaves * octaves).exp();
            if best.map_or(true, |(_, score)| weighted > score) {
                best = Some((lag, weighted));
            }
        }

        best.map_or(0.0, |(lag, _)| self.lag_to_bpm(lag))
    }
}
