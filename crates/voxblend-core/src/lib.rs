//! voxblend core library
//!
//! Voice conversion without a learned model: the source (synthesized
//! speech) is re-rendered with its per-frame spectral magnitude blended
//! toward a target speaker's, while the source phase and timing are kept.
//!
//! # Overview
//!
//! A conversion is a pure function of two mono waveforms at a common
//! sample rate (16 kHz in the shipped pipeline) and a blend factor
//! `alpha` in [0, 1]:
//!
//! - `alpha = 0` reproduces the source unchanged (within floating-point
//!   tolerance).
//! - `alpha = 1` carries the target's magnitude envelope on the source's
//!   phase and timing; this is an envelope transfer, not a full speaker
//!   transplant.
//! - A target shorter than the source wraps cyclically; a longer one is
//!   truncated.
//!
//! # Example
//!
//! ```ignore
//! use voxblend_core::{read_wav_file, select_converter, StrategyConfig, WavResult};
//!
//! let source = read_wav_file("tts_output.wav")?;
//! let target = read_wav_file("reference_voice.wav")?;
//!
//! let converter = select_converter(&StrategyConfig::default())?;
//! let converted = converter.convert(&source, &target)?;
//!
//! WavResult::from_waveform(&converted).write_to_file("converted.wav")?;
//! ```
//!
//! # Crate Structure
//!
//! - [`blend`] - Spectral blend fallback converter
//! - [`strategy`] - Strategy trait and startup-time selection
//! - [`external`] - Learned-model conversion over a subprocess boundary
//! - [`stft`] - Short-time Fourier transform and overlap-add
//! - [`waveform`] - Mono waveform model and input validation
//! - [`resample`] - Linear resampling to the processing rate
//! - [`analysis`] - Spectral metrics (dominant frequency, centroid)
//! - [`wav`] - WAV decoding and deterministic WAV writing

pub mod analysis;
pub mod blend;
pub mod error;
pub mod external;
pub mod resample;
pub mod stft;
pub mod strategy;
pub mod wav;
pub mod waveform;

// Re-export main types at crate root
pub use blend::{BlendParams, SpectralBlend, DEFAULT_ALPHA, DEFAULT_PEAK_CEILING};
pub use error::{ConvertError, ConvertResult, WaveformRole};
pub use external::{ExternalModelConfig, ExternalModelConverter, CONVERTER_ENV};
pub use resample::resample_linear;
pub use stft::{SpectralFrame, Stft, DEFAULT_FRAME_SIZE, DEFAULT_HOP_SIZE};
pub use strategy::{select_converter, StrategyConfig, VoiceConverter};
pub use wav::{read_wav_file, WavResult};
pub use waveform::{Waveform, SILENCE_EPSILON};
