//! Fallback voice conversion by spectral magnitude blending.
//!
//! This is the conversion path used when no learned model is available:
//! blend the source's per-frame spectral magnitude toward the target's
//! while keeping the source phase untouched. Keeping the original phase
//! sidesteps phase-vocoder logic at the cost of occasional metallic
//! artifacts, an accepted trade-off for the fallback.

use serde::{Deserialize, Serialize};

use crate::error::{ConvertError, ConvertResult};
use crate::stft::{SpectralFrame, Stft, DEFAULT_FRAME_SIZE, DEFAULT_HOP_SIZE};
use crate::strategy::VoiceConverter;
use crate::waveform::Waveform;

/// Default blend factor, carried over from the tuning the fallback shipped
/// with. Treated as configuration, not a derived quantity.
pub const DEFAULT_ALPHA: f64 = 0.7;

/// Default output peak ceiling.
pub const DEFAULT_PEAK_CEILING: f64 = 0.95;

/// Guard against dividing by a vanishing peak when limiting.
const PEAK_EPSILON: f64 = 1e-12;

/// Parameters for the spectral blend converter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BlendParams {
    /// How much target magnitude replaces source magnitude, in [0, 1].
    pub alpha: f64,
    /// Analysis frame length for both signals, in samples.
    pub frame_size: usize,
    /// Hop between frames, in samples.
    pub hop_size: usize,
    /// Separate analysis frame length for the target, if its spectra are
    /// computed on a different grid. Bin counts are reconciled by linear
    /// interpolation onto the source grid.
    pub target_frame_size: Option<usize>,
    /// Maximum output peak amplitude; the output is scaled down (never up)
    /// when it exceeds this.
    pub peak_ceiling: f64,
}

impl Default for BlendParams {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            frame_size: DEFAULT_FRAME_SIZE,
            hop_size: DEFAULT_HOP_SIZE,
            target_frame_size: None,
            peak_ceiling: DEFAULT_PEAK_CEILING,
        }
    }
}

impl BlendParams {
    /// Validates parameter ranges.
    pub fn validate(&self) -> ConvertResult<()> {
        if !self.alpha.is_finite() || !(0.0..=1.0).contains(&self.alpha) {
            return Err(ConvertError::InvalidBlendFactor { alpha: self.alpha });
        }
        if !self.peak_ceiling.is_finite() || self.peak_ceiling <= 0.0 || self.peak_ceiling > 1.0 {
            return Err(ConvertError::InvalidPeakCeiling {
                ceiling: self.peak_ceiling,
            });
        }
        // Frame geometry is validated by Stft::new; checking here reports
        // bad configs before any audio is decoded.
        Stft::new(self.frame_size, self.hop_size)?;
        if let Some(target_frame_size) = self.target_frame_size {
            Stft::new(target_frame_size, (target_frame_size / 2).max(1))?;
        }
        Ok(())
    }
}

/// Spectral blend fallback converter.
///
/// Stateless between calls: each conversion is a pure function of the two
/// input waveforms and the parameters, so one instance can serve
/// independent conversions concurrently without locking.
#[derive(Debug, Clone)]
pub struct SpectralBlend {
    params: BlendParams,
}

impl SpectralBlend {
    /// Creates a converter after validating the parameters.
    pub fn new(params: BlendParams) -> ConvertResult<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    /// The converter's parameters.
    pub fn params(&self) -> &BlendParams {
        &self.params
    }

    fn target_stft(&self) -> ConvertResult<Stft> {
        match self.params.target_frame_size {
            Some(frame_size) => Stft::new(frame_size, (frame_size / 2).max(1)),
            None => Stft::new(self.params.frame_size, self.params.hop_size),
        }
    }
}

impl VoiceConverter for SpectralBlend {
    fn convert(&self, source: &Waveform, target: &Waveform) -> ConvertResult<Waveform> {
        use crate::error::WaveformRole::{Source, Target};

        source.validate(Source)?;
        target.validate(Target)?;
        if source.sample_rate != target.sample_rate {
            return Err(ConvertError::SampleRateMismatch {
                source_rate: source.sample_rate,
                target: target.sample_rate,
            });
        }

        let stft = Stft::new(self.params.frame_size, self.params.hop_size)?;
        let source_frames = stft.analyze(&source.samples);
        let target_frames = self.target_stft()?.analyze(&target.samples);

        let blended = blend_frames(&source_frames, &target_frames, self.params.alpha);
        let mut samples = stft.synthesize(&blended, source.len());

        // Scale down only: alpha=0 must reproduce the source exactly, so a
        // quiet output is never pushed up to the ceiling.
        let peak = samples.iter().map(|s| s.abs()).fold(0.0, f64::max);
        if peak > self.params.peak_ceiling {
            let scale = self.params.peak_ceiling / peak.max(PEAK_EPSILON);
            for s in &mut samples {
                *s *= scale;
            }
        }

        Ok(Waveform::new(samples, source.sample_rate))
    }

    fn id(&self) -> &'static str {
        "spectral-blend"
    }
}

/// Blends target magnitude into source frames.
///
/// Frame `k` of the source pairs with target frame `k % target_count`, so a
/// short target wraps cyclically over the source duration and a long target
/// is simply never indexed past what is needed. Phase is copied from the
/// source unchanged.
pub(crate) fn blend_frames(
    source_frames: &[SpectralFrame],
    target_frames: &[SpectralFrame],
    alpha: f64,
) -> Vec<SpectralFrame> {
    if target_frames.is_empty() {
        return source_frames.to_vec();
    }

    source_frames
        .iter()
        .enumerate()
        .map(|(k, src)| {
            let tgt = &target_frames[k % target_frames.len()];
            let target_mag: Vec<f64> = if tgt.num_bins() == src.num_bins() {
                tgt.magnitude.clone()
            } else {
                interpolate_bins(&tgt.magnitude, src.num_bins())
            };

            let magnitude = src
                .magnitude
                .iter()
                .zip(target_mag.iter())
                .map(|(s, t)| (1.0 - alpha) * s + alpha * t)
                .collect();

            SpectralFrame {
                magnitude,
                phase: src.phase.clone(),
            }
        })
        .collect()
}

/// Resamples a magnitude spectrum onto a different bin count by linear
/// interpolation.
pub(crate) fn interpolate_bins(magnitude: &[f64], num_bins: usize) -> Vec<f64> {
    if magnitude.is_empty() || num_bins == 0 {
        return vec![0.0; num_bins];
    }
    if magnitude.len() == 1 || num_bins == 1 {
        return vec![magnitude[0]; num_bins];
    }

    let last = magnitude.len() - 1;
    (0..num_bins)
        .map(|j| {
            let pos = j as f64 * last as f64 / (num_bins - 1) as f64;
            let idx = pos.floor() as usize;
            if idx >= last {
                magnitude[last]
            } else {
                let frac = pos - idx as f64;
                magnitude[idx] * (1.0 - frac) + magnitude[idx + 1] * frac
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn frame(mag: Vec<f64>) -> SpectralFrame {
        let phase = vec![0.0; mag.len()];
        SpectralFrame {
            magnitude: mag,
            phase,
        }
    }

    #[test]
    fn test_params_validation() {
        assert!(BlendParams::default().validate().is_ok());

        let bad_alpha = BlendParams {
            alpha: 1.5,
            ..BlendParams::default()
        };
        assert_eq!(bad_alpha.validate().unwrap_err().code(), "VC_005");

        let bad_frames = BlendParams {
            hop_size: 4096,
            ..BlendParams::default()
        };
        assert_eq!(bad_frames.validate().unwrap_err().code(), "VC_006");
    }

    #[test]
    fn test_bad_peak_ceiling_names_the_field() {
        let params = BlendParams {
            peak_ceiling: 1.2,
            ..BlendParams::default()
        };
        let err = params.validate().unwrap_err();
        assert_eq!(err.code(), "VC_010");
        assert!(err.to_string().contains("peak ceiling"), "{err}");

        let params = BlendParams {
            peak_ceiling: 0.0,
            ..BlendParams::default()
        };
        assert_eq!(params.validate().unwrap_err().code(), "VC_010");
    }

    #[test]
    fn test_blend_is_convex_combination() {
        let src = vec![frame(vec![1.0, 2.0, 3.0])];
        let tgt = vec![frame(vec![3.0, 2.0, 1.0])];

        let out = blend_frames(&src, &tgt, 0.5);
        assert_eq!(out[0].magnitude, vec![2.0, 2.0, 2.0]);

        let out = blend_frames(&src, &tgt, 1.0);
        assert_eq!(out[0].magnitude, vec![3.0, 2.0, 1.0]);

        let out = blend_frames(&src, &tgt, 0.0);
        assert_eq!(out[0].magnitude, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_blend_wraps_short_target() {
        // Four source frames against two target frames: frames 0 and 2 (and
        // 1 and 3) must reference the same wrapped target frame.
        let src = vec![
            frame(vec![0.0, 0.0]),
            frame(vec![0.0, 0.0]),
            frame(vec![0.0, 0.0]),
            frame(vec![0.0, 0.0]),
        ];
        let tgt = vec![frame(vec![2.0, 4.0]), frame(vec![6.0, 8.0])];

        let out = blend_frames(&src, &tgt, 1.0);
        assert_eq!(out[0].magnitude, out[2].magnitude);
        assert_eq!(out[1].magnitude, out[3].magnitude);
        assert_eq!(out[0].magnitude, vec![2.0, 4.0]);
        assert_eq!(out[1].magnitude, vec![6.0, 8.0]);
    }

    #[test]
    fn test_blend_keeps_source_phase() {
        let src = vec![SpectralFrame {
            magnitude: vec![1.0, 1.0],
            phase: vec![0.25, -0.5],
        }];
        let tgt = vec![SpectralFrame {
            magnitude: vec![9.0, 9.0],
            phase: vec![3.0, 3.0],
        }];

        let out = blend_frames(&src, &tgt, 1.0);
        assert_eq!(out[0].phase, vec![0.25, -0.5]);
    }

    #[test]
    fn test_interpolate_bins_endpoints() {
        let out = interpolate_bins(&[1.0, 2.0, 3.0], 5);
        assert_eq!(out.len(), 5);
        assert!((out[0] - 1.0).abs() < 1e-12);
        assert!((out[2] - 2.0).abs() < 1e-12);
        assert!((out[4] - 3.0).abs() < 1e-12);
        assert!((out[1] - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_interpolate_bins_downsamples() {
        let out = interpolate_bins(&[0.0, 1.0, 2.0, 3.0, 4.0], 3);
        assert_eq!(out.len(), 3);
        assert!((out[0] - 0.0).abs() < 1e-12);
        assert!((out[1] - 2.0).abs() < 1e-12);
        assert!((out[2] - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_interpolate_bins_degenerate() {
        assert_eq!(interpolate_bins(&[5.0], 3), vec![5.0, 5.0, 5.0]);
        assert_eq!(interpolate_bins(&[1.0, 2.0], 1), vec![1.0]);
    }

    #[test]
    fn test_convert_rejects_rate_mismatch() {
        let converter = SpectralBlend::new(BlendParams::default()).unwrap();
        let a = Waveform::new(vec![0.1; 2000], 16000);
        let b = Waveform::new(vec![0.1; 2000], 22050);

        let err = converter.convert(&a, &b).unwrap_err();
        assert_eq!(err.code(), "VC_002");
    }

    #[test]
    fn test_convert_rejects_empty_target() {
        let converter = SpectralBlend::new(BlendParams::default()).unwrap();
        let a = Waveform::new(vec![0.1; 2000], 16000);
        let b = Waveform::new(vec![], 16000);

        let err = converter.convert(&a, &b).unwrap_err();
        assert_eq!(err.code(), "VC_001");
    }

    #[test]
    fn test_convert_with_differing_target_frame_size() {
        // Target analyzed at 512-sample frames gets its 257 bins
        // interpolated onto the source's 513-bin grid.
        let params = BlendParams {
            target_frame_size: Some(512),
            ..BlendParams::default()
        };
        let converter = SpectralBlend::new(params).unwrap();

        let src = Waveform::new(vec![0.3; 4000], 16000);
        let tgt = Waveform::new(vec![0.2; 4000], 16000);
        let out = converter.convert(&src, &tgt).unwrap();

        assert_eq!(out.len(), src.len());
        assert!(out.samples.iter().all(|s| s.is_finite()));
    }
}
