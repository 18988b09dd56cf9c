//! Error types for voice conversion.

use thiserror::Error;

/// Result type for conversion operations.
pub type ConvertResult<T> = Result<T, ConvertError>;

/// Identifies which input waveform an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaveformRole {
    /// The synthesized speech being converted.
    Source,
    /// The reference voice sample.
    Target,
}

impl std::fmt::Display for WaveformRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WaveformRole::Source => write!(f, "source"),
            WaveformRole::Target => write!(f, "target"),
        }
    }
}

/// Errors that can occur during voice conversion.
///
/// Input-validation failures are local and fatal; they are surfaced to the
/// caller and never retried. Numeric degeneracy (silent targets, zero window
/// sums) is clamped with epsilon floors instead of being reported.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// A waveform contained no samples.
    #[error("{which} waveform is empty")]
    EmptyWaveform {
        /// Which input was empty.
        which: WaveformRole,
    },

    /// Source and target sample rates differ.
    #[error("sample rate mismatch: source {source_rate} Hz, target {target} Hz")]
    SampleRateMismatch {
        /// Source sample rate in Hz.
        source_rate: u32,
        /// Target sample rate in Hz.
        target: u32,
    },

    /// A waveform contained a NaN or infinite sample.
    #[error("{which} waveform has a non-finite sample at index {index}")]
    NonFiniteSample {
        /// Which input held the sample.
        which: WaveformRole,
        /// Index of the offending sample.
        index: usize,
    },

    /// Invalid sample rate.
    #[error("invalid sample rate: {rate}")]
    InvalidSampleRate {
        /// The invalid sample rate.
        rate: u32,
    },

    /// Blend factor outside [0, 1].
    #[error("invalid blend factor: {alpha} (must be in [0, 1])")]
    InvalidBlendFactor {
        /// The invalid blend factor.
        alpha: f64,
    },

    /// Invalid STFT frame configuration.
    #[error("invalid frame config: frame_size {frame_size}, hop_size {hop_size}")]
    InvalidFrameConfig {
        /// Analysis frame length in samples.
        frame_size: usize,
        /// Hop between frames in samples.
        hop_size: usize,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// WAV file could not be decoded.
    #[error("malformed WAV file '{path}': {message}")]
    MalformedWav {
        /// Path of the file.
        path: String,
        /// Decoder message.
        message: String,
    },

    /// External conversion model failed or is unavailable.
    #[error("external model error: {message}")]
    ExternalModel {
        /// Error message.
        message: String,
    },

    /// Peak ceiling outside (0, 1].
    #[error("invalid peak ceiling: {ceiling} (must be in (0, 1])")]
    InvalidPeakCeiling {
        /// The invalid peak ceiling.
        ceiling: f64,
    },
}

impl ConvertError {
    /// Creates an external model error.
    pub fn external(message: impl Into<String>) -> Self {
        Self::ExternalModel {
            message: message.into(),
        }
    }

    /// Returns a stable error code for machine-readable output.
    pub fn code(&self) -> &'static str {
        match self {
            ConvertError::EmptyWaveform { .. } => "VC_001",
            ConvertError::SampleRateMismatch { .. } => "VC_002",
            ConvertError::NonFiniteSample { .. } => "VC_003",
            ConvertError::InvalidSampleRate { .. } => "VC_004",
            ConvertError::InvalidBlendFactor { .. } => "VC_005",
            ConvertError::InvalidFrameConfig { .. } => "VC_006",
            ConvertError::Io(_) => "VC_007",
            ConvertError::MalformedWav { .. } => "VC_008",
            ConvertError::ExternalModel { .. } => "VC_009",
            ConvertError::InvalidPeakCeiling { .. } => "VC_010",
        }
    }
}
