//! Short-time Fourier transform with overlap-add reconstruction.
//!
//! Analysis uses Hann-windowed frames at 50% hop by default. Frames are
//! centered: the signal is zero-padded by half a frame on both sides so the
//! first and last samples get full window coverage. Reconstruction divides
//! by the accumulated window sum, which makes `synthesize(analyze(x))`
//! reproduce `x` within floating-point tolerance for any COLA-satisfying
//! hop. That exact round trip is what the alpha=0 identity contract of the
//! converter rests on.

use rustfft::num_complex::Complex;
use rustfft::FftPlanner;
use std::f64::consts::PI;

use crate::error::{ConvertError, ConvertResult};

/// Floor for the overlap-add window sum to avoid division by zero at the
/// padded edges.
const WINDOW_SUM_EPSILON: f64 = 1e-9;

/// Default analysis frame length in samples.
pub const DEFAULT_FRAME_SIZE: usize = 1024;

/// Default hop between frames (50% overlap).
pub const DEFAULT_HOP_SIZE: usize = 512;

/// One windowed frame in the frequency domain.
///
/// Holds positive frequencies only (`frame_size / 2 + 1` bins); the
/// negative half is reconstructed from Hermitian symmetry at synthesis.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralFrame {
    /// Amplitude per frequency bin.
    pub magnitude: Vec<f64>,
    /// Phase angle per frequency bin, in radians.
    pub phase: Vec<f64>,
}

impl SpectralFrame {
    /// Number of frequency bins.
    pub fn num_bins(&self) -> usize {
        self.magnitude.len()
    }
}

/// STFT analyzer/synthesizer with fixed frame and hop sizes.
#[derive(Debug, Clone)]
pub struct Stft {
    frame_size: usize,
    hop_size: usize,
    window: Vec<f64>,
}

impl Stft {
    /// Creates an STFT with the given frame and hop sizes.
    ///
    /// The frame size must be even (Hermitian reconstruction assumes a real
    /// Nyquist bin) and the hop must not exceed the frame size.
    pub fn new(frame_size: usize, hop_size: usize) -> ConvertResult<Self> {
        if frame_size < 2 || frame_size % 2 != 0 || hop_size == 0 || hop_size > frame_size {
            return Err(ConvertError::InvalidFrameConfig {
                frame_size,
                hop_size,
            });
        }
        let window = (0..frame_size)
            .map(|i| hann_window(i, frame_size))
            .collect();
        Ok(Self {
            frame_size,
            hop_size,
            window,
        })
    }

    /// Analysis frame length in samples.
    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    /// Hop between frames in samples.
    pub fn hop_size(&self) -> usize {
        self.hop_size
    }

    /// Number of frequency bins per frame.
    pub fn num_bins(&self) -> usize {
        self.frame_size / 2 + 1
    }

    /// Center-padding applied before framing.
    fn pad(&self) -> usize {
        self.frame_size / 2
    }

    /// Number of frames produced for an input of `len` samples.
    pub fn num_frames(&self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        (self.pad() + len).div_ceil(self.hop_size)
    }

    /// Computes magnitude and phase frames for a signal.
    ///
    /// An empty input yields no frames; any non-empty input yields at least
    /// one (short signals are zero-padded to a full frame).
    pub fn analyze(&self, samples: &[f64]) -> Vec<SpectralFrame> {
        let num_frames = self.num_frames(samples.len());
        if num_frames == 0 {
            return Vec::new();
        }

        let pad = self.pad();
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(self.frame_size);
        let num_bins = self.num_bins();

        let mut frames = Vec::with_capacity(num_frames);
        let mut buffer = vec![Complex::new(0.0, 0.0); self.frame_size];

        for k in 0..num_frames {
            let start = k * self.hop_size;
            for (i, slot) in buffer.iter_mut().enumerate() {
                // Padded index `start + i` maps to signal index minus the
                // center offset; anything outside the signal is zero.
                let padded_idx = start + i;
                let sample = if padded_idx >= pad && padded_idx - pad < samples.len() {
                    samples[padded_idx - pad]
                } else {
                    0.0
                };
                *slot = Complex::new(sample * self.window[i], 0.0);
            }

            fft.process(&mut buffer);

            let mut magnitude = Vec::with_capacity(num_bins);
            let mut phase = Vec::with_capacity(num_bins);
            for bin in buffer.iter().take(num_bins) {
                magnitude.push(bin.norm());
                phase.push(bin.arg());
            }
            frames.push(SpectralFrame { magnitude, phase });
        }

        frames
    }

    /// Reconstructs a time-domain signal of `output_len` samples from frames.
    ///
    /// Frames are inverse-transformed and overlap-added, then the result is
    /// divided by the accumulated window sum (floored at a small epsilon).
    /// Output is truncated or zero-padded to exactly `output_len`.
    pub fn synthesize(&self, frames: &[SpectralFrame], output_len: usize) -> Vec<f64> {
        if frames.is_empty() || output_len == 0 {
            return vec![0.0; output_len];
        }

        let pad = self.pad();
        let buf_len = (frames.len() - 1) * self.hop_size + self.frame_size;
        let mut accum = vec![0.0; buf_len];
        let mut window_sum = vec![0.0; buf_len];

        let mut planner = FftPlanner::new();
        let ifft = planner.plan_fft_inverse(self.frame_size);
        let mut buffer = vec![Complex::new(0.0, 0.0); self.frame_size];
        let num_bins = self.num_bins();

        for (k, frame) in frames.iter().enumerate() {
            // Rebuild the full spectrum from the positive half.
            for i in 0..num_bins {
                buffer[i] = Complex::from_polar(frame.magnitude[i], frame.phase[i]);
            }
            for i in 1..self.frame_size / 2 {
                buffer[self.frame_size - i] = buffer[i].conj();
            }

            ifft.process(&mut buffer);

            let start = k * self.hop_size;
            for i in 0..self.frame_size {
                // rustfft's inverse is unscaled; divide by N here.
                accum[start + i] += buffer[i].re / self.frame_size as f64;
                window_sum[start + i] += self.window[i];
            }
        }

        let mut output = vec![0.0; output_len];
        for (i, out) in output.iter_mut().enumerate() {
            let idx = pad + i;
            if idx < buf_len {
                *out = accum[idx] / window_sum[idx].max(WINDOW_SUM_EPSILON);
            }
        }
        output
    }
}

impl Default for Stft {
    fn default() -> Self {
        Stft::new(DEFAULT_FRAME_SIZE, DEFAULT_HOP_SIZE)
            .expect("default frame config is valid")
    }
}

/// Computes the Hann window value at a given index.
#[inline]
pub(crate) fn hann_window(i: usize, size: usize) -> f64 {
    0.5 * (1.0 - (2.0 * PI * i as f64 / size as f64).cos())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f64, sample_rate: f64, num_samples: usize) -> Vec<f64> {
        (0..num_samples)
            .map(|i| (2.0 * PI * freq * i as f64 / sample_rate).sin() * 0.8)
            .collect()
    }

    #[test]
    fn test_hann_window() {
        // Zero at the boundary, one at the center.
        assert!(hann_window(0, 1024).abs() < 1e-10);
        assert!((hann_window(512, 1024) - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_invalid_configs_rejected() {
        assert!(Stft::new(0, 1).is_err());
        assert!(Stft::new(1024, 0).is_err());
        assert!(Stft::new(1024, 2048).is_err());
        assert!(Stft::new(1023, 512).is_err());
    }

    #[test]
    fn test_empty_input_yields_no_frames() {
        let stft = Stft::default();
        assert!(stft.analyze(&[]).is_empty());
    }

    #[test]
    fn test_short_input_yields_one_frame() {
        let stft = Stft::default();
        let frames = stft.analyze(&[0.5; 100]);
        assert!(!frames.is_empty());
        assert_eq!(frames[0].num_bins(), 513);
    }

    #[test]
    fn test_frame_count_matches_num_frames() {
        let stft = Stft::new(1024, 512).unwrap();
        for len in [1, 511, 512, 1024, 5000, 32000] {
            let frames = stft.analyze(&vec![0.1; len]);
            assert_eq!(frames.len(), stft.num_frames(len), "len {len}");
        }
    }

    #[test]
    fn test_round_trip_reconstructs_sine() {
        let stft = Stft::new(1024, 512).unwrap();
        let signal = sine(440.0, 16000.0, 8000);

        let frames = stft.analyze(&signal);
        let rebuilt = stft.synthesize(&frames, signal.len());

        assert_eq!(rebuilt.len(), signal.len());
        for (i, (a, b)) in signal.iter().zip(rebuilt.iter()).enumerate() {
            assert!((a - b).abs() < 1e-9, "sample {i}: {a} vs {b}");
        }
    }

    #[test]
    fn test_round_trip_reconstructs_awkward_length() {
        // Length not a multiple of the hop exercises tail padding.
        let stft = Stft::new(1024, 512).unwrap();
        let signal = sine(333.0, 16000.0, 4999);

        let frames = stft.analyze(&signal);
        let rebuilt = stft.synthesize(&frames, signal.len());

        for (a, b) in signal.iter().zip(rebuilt.iter()) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn test_synthesize_truncates_and_pads() {
        let stft = Stft::default();
        let frames = stft.analyze(&[0.3; 2000]);

        assert_eq!(stft.synthesize(&frames, 100).len(), 100);
        assert_eq!(stft.synthesize(&frames, 50_000).len(), 50_000);
        assert_eq!(stft.synthesize(&[], 64), vec![0.0; 64]);
    }
}
