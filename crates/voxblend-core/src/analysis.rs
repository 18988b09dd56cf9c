//! Spectral metrics for inspecting conversion inputs and outputs.

use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

use crate::stft::{hann_window, SpectralFrame, Stft};
use crate::waveform::Waveform;

/// Floor for magnitudes entering a logarithm.
const LOG_EPSILON: f64 = 1e-10;

/// Computes the windowed magnitude spectrum of the first analysis block.
///
/// Uses up to 4096 samples (next power of two of the input length),
/// Hann-windowed, returning positive-frequency magnitudes.
fn magnitude_spectrum(samples: &[f64]) -> (Vec<f64>, usize) {
    let fft_size = samples.len().next_power_of_two().min(4096);
    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(fft_size);

    let mut buffer: Vec<Complex<f64>> = samples
        .iter()
        .take(fft_size)
        .enumerate()
        .map(|(i, &s)| Complex::new(s * hann_window(i, fft_size), 0.0))
        .collect();
    buffer.resize(fft_size, Complex::new(0.0, 0.0));

    fft.process(&mut buffer);

    let nyquist = fft_size / 2;
    let magnitudes = buffer.iter().take(nyquist).map(|c| c.norm()).collect();
    (magnitudes, fft_size)
}

/// Calculates the spectral centroid (energy-weighted mean frequency) in Hz.
pub fn spectral_centroid(samples: &[f64], sample_rate: u32) -> f64 {
    if samples.len() < 64 {
        return 0.0;
    }

    let (magnitudes, fft_size) = magnitude_spectrum(samples);
    let freq_resolution = sample_rate as f64 / fft_size as f64;

    let mut weighted_sum = 0.0;
    let mut magnitude_sum = 0.0;
    for (i, magnitude) in magnitudes.iter().enumerate() {
        weighted_sum += i as f64 * freq_resolution * magnitude;
        magnitude_sum += magnitude;
    }

    if magnitude_sum > 0.0 {
        weighted_sum / magnitude_sum
    } else {
        0.0
    }
}

/// Calculates the dominant frequency (strongest bin above 20 Hz) in Hz.
pub fn dominant_frequency(samples: &[f64], sample_rate: u32) -> f64 {
    if samples.len() < 64 {
        return 0.0;
    }

    let (magnitudes, fft_size) = magnitude_spectrum(samples);
    let freq_resolution = sample_rate as f64 / fft_size as f64;

    // Skip DC and very low frequencies
    let min_bin = (20.0 / freq_resolution).ceil() as usize;

    let mut max_magnitude = 0.0;
    let mut max_bin = 0;
    for (i, &magnitude) in magnitudes.iter().enumerate().skip(min_bin) {
        if magnitude > max_magnitude {
            max_magnitude = magnitude;
            max_bin = i;
        }
    }

    max_bin as f64 * freq_resolution
}

/// Averages STFT magnitudes over time into one spectrum per signal.
fn mean_magnitude(frames: &[SpectralFrame]) -> Vec<f64> {
    if frames.is_empty() {
        return Vec::new();
    }
    let num_bins = frames[0].num_bins();
    let mut mean = vec![0.0; num_bins];
    for frame in frames {
        for (m, v) in mean.iter_mut().zip(frame.magnitude.iter()) {
            *m += v;
        }
    }
    for m in &mut mean {
        *m /= frames.len() as f64;
    }
    mean
}

/// Log-spectral distance between two waveforms, in dB.
///
/// Compares time-averaged STFT magnitudes on the default analysis grid.
/// Zero means identical average spectra; magnitudes are floored at a small
/// epsilon so silence does not produce infinities.
pub fn log_spectral_distance(a: &Waveform, b: &Waveform) -> f64 {
    let stft = Stft::default();
    let mean_a = mean_magnitude(&stft.analyze(&a.samples));
    let mean_b = mean_magnitude(&stft.analyze(&b.samples));
    if mean_a.is_empty() || mean_b.is_empty() {
        return 0.0;
    }

    let sum_sq: f64 = mean_a
        .iter()
        .zip(mean_b.iter())
        .map(|(x, y)| {
            let db = 20.0 * ((x + LOG_EPSILON) / (y + LOG_EPSILON)).log10();
            db * db
        })
        .sum();
    (sum_sq / mean_a.len() as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn sine(freq: f64, sample_rate: f64, num_samples: usize) -> Vec<f64> {
        (0..num_samples)
            .map(|i| (2.0 * PI * freq * i as f64 / sample_rate).sin() * 0.8)
            .collect()
    }

    #[test]
    fn test_dominant_frequency_of_sine() {
        let samples = sine(440.0, 16000.0, 8192);
        let freq = dominant_frequency(&samples, 16000);
        // Bin resolution at 4096-point FFT and 16 kHz is ~3.9 Hz
        assert!((freq - 440.0).abs() < 8.0, "got {freq}");
    }

    #[test]
    fn test_centroid_of_sine_near_its_frequency() {
        let samples = sine(1000.0, 16000.0, 8192);
        let centroid = spectral_centroid(&samples, 16000);
        // Window sidelobes pull the centroid around a little
        assert!((centroid - 1000.0).abs() < 100.0, "got {centroid}");
    }

    #[test]
    fn test_short_input_yields_zero() {
        assert_eq!(dominant_frequency(&[0.1; 10], 16000), 0.0);
        assert_eq!(spectral_centroid(&[0.1; 10], 16000), 0.0);
    }

    #[test]
    fn test_log_spectral_distance_zero_for_identical() {
        let wave = Waveform::new(sine(440.0, 16000.0, 8000), 16000);
        let dist = log_spectral_distance(&wave, &wave);
        assert!(dist.abs() < 1e-9);
    }

    #[test]
    fn test_log_spectral_distance_positive_for_different() {
        let a = Waveform::new(sine(440.0, 16000.0, 8000), 16000);
        let b = Waveform::new(sine(880.0, 16000.0, 8000), 16000);
        assert!(log_spectral_distance(&a, &b) > 1.0);
    }
}
