//! External learned-model conversion over a subprocess boundary.
//!
//! The learned model (e.g. a QuickVC checkpoint driven by a separate
//! inference tool) is treated as a black box: source and target are written
//! to temporary WAV files, the configured program is invoked, and its
//! output WAV is read back. Model inference itself is out of scope here.

use std::path::PathBuf;
use std::process::Command;

use serde::{Deserialize, Serialize};

use crate::error::{ConvertError, ConvertResult, WaveformRole};
use crate::resample::resample_linear;
use crate::strategy::VoiceConverter;
use crate::wav::{read_wav_file, WavResult};
use crate::waveform::Waveform;

/// Environment variable overriding the converter program path.
pub const CONVERTER_ENV: &str = "VOXBLEND_CONVERTER";

/// Program name looked up in PATH when nothing else is configured.
pub const DEFAULT_PROGRAM: &str = "voxblend-vc";

/// Configuration for the external conversion command.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalModelConfig {
    /// Explicit program path. Falls back to `VOXBLEND_CONVERTER`, then to a
    /// PATH lookup of `voxblend-vc`.
    pub program: Option<PathBuf>,
    /// Model checkpoint passed to the program via `--model`.
    pub model_path: Option<PathBuf>,
    /// Extra arguments appended verbatim.
    pub extra_args: Vec<String>,
}

/// Converter that shells out to an external learned model.
#[derive(Debug, Clone)]
pub struct ExternalModelConverter {
    config: ExternalModelConfig,
}

impl ExternalModelConverter {
    /// Creates a converter with the given configuration.
    pub fn new(config: ExternalModelConfig) -> Self {
        Self { config }
    }

    /// Finds the conversion program, if any.
    ///
    /// Resolution order: config override, `VOXBLEND_CONVERTER` environment
    /// variable, PATH lookup.
    pub fn resolve_program(&self) -> Option<PathBuf> {
        if let Some(path) = &self.config.program {
            if path.exists() {
                return Some(path.clone());
            }
            return None;
        }

        if let Ok(path) = std::env::var(CONVERTER_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
            return None;
        }

        which::which(DEFAULT_PROGRAM).ok()
    }

    /// Returns true when both the program and the model file (if any) exist.
    pub fn is_available(&self) -> bool {
        if self.resolve_program().is_none() {
            return false;
        }
        match &self.config.model_path {
            Some(model) => model.exists(),
            None => true,
        }
    }
}

impl VoiceConverter for ExternalModelConverter {
    fn convert(&self, source: &Waveform, target: &Waveform) -> ConvertResult<Waveform> {
        source.validate(WaveformRole::Source)?;
        target.validate(WaveformRole::Target)?;
        if source.sample_rate != target.sample_rate {
            return Err(ConvertError::SampleRateMismatch {
                source_rate: source.sample_rate,
                target: target.sample_rate,
            });
        }

        let program = self
            .resolve_program()
            .ok_or_else(|| ConvertError::external("conversion program not found"))?;

        let dir = tempfile::Builder::new().prefix("voxblend_vc_").tempdir()?;
        let source_path = dir.path().join("source.wav");
        let target_path = dir.path().join("target.wav");
        let output_path = dir.path().join("output.wav");

        std::fs::write(
            &source_path,
            WavResult::from_mono(&source.samples, source.sample_rate).wav_data,
        )?;
        std::fs::write(
            &target_path,
            WavResult::from_mono(&target.samples, target.sample_rate).wav_data,
        )?;

        let mut cmd = Command::new(&program);
        cmd.arg("--source")
            .arg(&source_path)
            .arg("--target")
            .arg(&target_path)
            .arg("--output")
            .arg(&output_path);
        if let Some(model) = &self.config.model_path {
            cmd.arg("--model").arg(model);
        }
        cmd.args(&self.config.extra_args);

        let output = cmd.output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ConvertError::external(format!(
                "{} exited with {}: {}",
                program.display(),
                output.status,
                stderr.trim()
            )));
        }
        if !output_path.exists() {
            return Err(ConvertError::external(format!(
                "{} produced no output file",
                program.display()
            )));
        }

        let converted = read_wav_file(&output_path)?;
        // The model is free to run at its own rate; bring the result back to
        // the common processing rate.
        resample_linear(&converted, source.sample_rate)
    }

    fn id(&self) -> &'static str {
        "external-model"
    }
}
