//! Mono waveform representation.
//!
//! All conversion operates on mono samples at a single processing rate;
//! stereo inputs are downmixed before anything else touches them.

use crate::error::{ConvertError, ConvertResult, WaveformRole};

/// Amplitude below which a waveform is considered silent.
pub const SILENCE_EPSILON: f64 = 1e-8;

/// A mono audio signal with its sample rate.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    /// Audio samples, nominally in [-1.0, 1.0].
    pub samples: Vec<f64>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
}

impl Waveform {
    /// Creates a waveform from mono samples.
    pub fn new(samples: Vec<f64>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Creates a waveform by downmixing stereo channels (average of L/R).
    pub fn from_stereo(left: &[f64], right: &[f64], sample_rate: u32) -> Self {
        let samples = left
            .iter()
            .zip(right.iter())
            .map(|(l, r)| (l + r) * 0.5)
            .collect();
        Self {
            samples,
            sample_rate,
        }
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns true if the waveform has no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds.
    pub fn duration_seconds(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Peak amplitude (maximum absolute value).
    pub fn peak(&self) -> f64 {
        self.samples.iter().map(|s| s.abs()).fold(0.0, f64::max)
    }

    /// RMS (root mean square) level.
    pub fn rms(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let sum_sq: f64 = self.samples.iter().map(|s| s * s).sum();
        (sum_sq / self.samples.len() as f64).sqrt()
    }

    /// Returns true if every sample is below the silence threshold.
    pub fn is_silent(&self, epsilon: f64) -> bool {
        self.peak() < epsilon
    }

    /// Checks the conversion preconditions for this waveform.
    ///
    /// `role` names the input in error messages so callers can tell which
    /// of the two waveforms was rejected.
    pub fn validate(&self, role: WaveformRole) -> ConvertResult<()> {
        if self.samples.is_empty() {
            return Err(ConvertError::EmptyWaveform { which: role });
        }
        if self.sample_rate == 0 {
            return Err(ConvertError::InvalidSampleRate {
                rate: self.sample_rate,
            });
        }
        if let Some(index) = self.samples.iter().position(|s| !s.is_finite()) {
            return Err(ConvertError::NonFiniteSample { which: role, index });
        }
        Ok(())
    }
}
