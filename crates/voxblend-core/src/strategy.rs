//! Conversion strategy selection.
//!
//! Two strategies exist: the spectral blend fallback (always available) and
//! an external learned-model command. The choice is made once at startup;
//! per-call code never branches on model availability.

use serde::{Deserialize, Serialize};

use crate::blend::{BlendParams, SpectralBlend};
use crate::error::ConvertResult;
use crate::external::{ExternalModelConfig, ExternalModelConverter};
use crate::waveform::Waveform;

/// Trait implemented by all voice conversion strategies.
pub trait VoiceConverter: Send + Sync {
    /// Converts `source` toward the voice of `target`.
    fn convert(&self, source: &Waveform, target: &Waveform) -> ConvertResult<Waveform>;

    /// Stable identifier of the strategy (e.g. "spectral-blend").
    fn id(&self) -> &'static str;
}

/// Configuration used to pick a strategy at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    /// Parameters for the spectral blend fallback.
    pub blend: BlendParams,
    /// External learned-model command, if one is configured.
    pub external: Option<ExternalModelConfig>,
}

/// Selects the conversion strategy for this run.
///
/// The external model is preferred when it is configured and its program
/// and model file are actually present; otherwise the spectral blend
/// fallback is used.
pub fn select_converter(config: &StrategyConfig) -> ConvertResult<Box<dyn VoiceConverter>> {
    if let Some(external) = &config.external {
        let converter = ExternalModelConverter::new(external.clone());
        if converter.is_available() {
            return Ok(Box::new(converter));
        }
    }
    Ok(Box::new(SpectralBlend::new(config.blend.clone())?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_selects_fallback_without_external_config() {
        let converter = select_converter(&StrategyConfig::default()).unwrap();
        assert_eq!(converter.id(), "spectral-blend");
    }

    #[test]
    fn test_selects_fallback_when_external_unavailable() {
        let config = StrategyConfig {
            external: Some(ExternalModelConfig {
                program: Some(PathBuf::from("/nonexistent/quickvc-infer")),
                ..ExternalModelConfig::default()
            }),
            ..StrategyConfig::default()
        };
        let converter = select_converter(&config).unwrap();
        assert_eq!(converter.id(), "spectral-blend");
    }

    #[test]
    fn test_invalid_blend_params_propagate() {
        let config = StrategyConfig {
            blend: BlendParams {
                alpha: -0.1,
                ..BlendParams::default()
            },
            ..StrategyConfig::default()
        };
        assert!(select_converter(&config).is_err());
    }
}
