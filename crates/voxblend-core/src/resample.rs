//! Linear resampling to the common processing rate.
//!
//! Conversion requires both inputs at one rate (16 kHz by default). Decoded
//! files arrive at whatever rate they were recorded at, so the caller
//! resamples them here before handing them to a converter.

use crate::error::{ConvertError, ConvertResult};
use crate::waveform::Waveform;

/// Resamples a waveform to `target_rate` using linear interpolation.
///
/// Returns the input unchanged when the rates already match. Linear
/// interpolation is adequate for speech-band material headed into a
/// magnitude-domain blend; no anti-aliasing filter is applied.
pub fn resample_linear(wave: &Waveform, target_rate: u32) -> ConvertResult<Waveform> {
    if target_rate == 0 {
        return Err(ConvertError::InvalidSampleRate { rate: target_rate });
    }
    if wave.sample_rate == target_rate {
        return Ok(wave.clone());
    }
    if wave.samples.is_empty() {
        return Ok(Waveform::new(Vec::new(), target_rate));
    }

    let ratio = wave.sample_rate as f64 / target_rate as f64;
    let out_len = ((wave.samples.len() as f64 / ratio).round() as usize).max(1);
    let last = wave.samples.len() - 1;

    let mut out = Vec::with_capacity(out_len);
    for i in 0..out_len {
        let pos = i as f64 * ratio;
        let idx = pos.floor() as usize;
        if idx >= last {
            out.push(wave.samples[last]);
        } else {
            let frac = pos - idx as f64;
            out.push(wave.samples[idx] * (1.0 - frac) + wave.samples[idx + 1] * frac);
        }
    }

    Ok(Waveform::new(out, target_rate))
}
