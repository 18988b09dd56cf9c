//! Convert command implementation
//!
//! Reads source and target WAV files, brings both to the processing rate,
//! runs the selected conversion strategy, and writes a deterministic WAV.

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

use voxblend_core::{
    resample_linear, select_converter, BlendParams, ExternalModelConfig, StrategyConfig, WavResult,
};

/// Options for a single conversion run.
#[derive(Debug)]
pub struct ConvertOptions<'a> {
    pub source: &'a str,
    pub target: &'a str,
    pub output: &'a str,
    pub alpha: Option<f64>,
    pub sample_rate: u32,
    pub external_program: Option<&'a str>,
    pub model: Option<&'a str>,
    pub json: bool,
}

#[derive(Serialize)]
struct ConvertReport {
    success: bool,
    strategy: String,
    output: String,
    sample_rate: u32,
    num_samples: usize,
    duration_seconds: f64,
    pcm_hash: String,
}

/// Run the convert command
///
/// # Returns
/// Exit code: 0 on success, 1 on error
pub fn run(opts: &ConvertOptions) -> Result<ExitCode> {
    let source = voxblend_core::read_wav_file(opts.source)
        .with_context(|| format!("Failed to read source: {}", opts.source))?;
    let target = voxblend_core::read_wav_file(opts.target)
        .with_context(|| format!("Failed to read target: {}", opts.target))?;

    // Both inputs are brought to the common processing rate before the
    // strategy sees them.
    let source = resample_linear(&source, opts.sample_rate)?;
    let target = resample_linear(&target, opts.sample_rate)?;

    let config = build_config(opts);
    let converter = select_converter(&config)?;

    let converted = converter.convert(&source, &target)?;
    let wav = WavResult::from_waveform(&converted);
    wav.write_to_file(opts.output)
        .with_context(|| format!("Failed to write output: {}", opts.output))?;

    if opts.json {
        let report = ConvertReport {
            success: true,
            strategy: converter.id().to_string(),
            output: opts.output.to_string(),
            sample_rate: wav.sample_rate,
            num_samples: wav.num_samples,
            duration_seconds: wav.duration_seconds(),
            pcm_hash: wav.pcm_hash.clone(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", "Conversion complete".green().bold());
        println!("  {} {}", "Strategy:".dimmed(), converter.id());
        println!("  {} {}", "Output:".dimmed(), opts.output);
        println!(
            "  {} {:.2}s @ {} Hz ({} samples)",
            "Audio:".dimmed(),
            wav.duration_seconds(),
            wav.sample_rate,
            wav.num_samples
        );
        println!("  {} {}", "Hash:".dimmed(), &wav.pcm_hash[..16]);
    }

    Ok(ExitCode::SUCCESS)
}

/// Builds the strategy configuration from CLI options.
fn build_config(opts: &ConvertOptions) -> StrategyConfig {
    let mut blend = BlendParams::default();
    if let Some(alpha) = opts.alpha {
        blend.alpha = alpha;
    }

    let external = if opts.external_program.is_some() || opts.model.is_some() {
        Some(ExternalModelConfig {
            program: opts.external_program.map(PathBuf::from),
            model_path: opts.model.map(PathBuf::from),
            ..ExternalModelConfig::default()
        })
    } else {
        None
    };

    StrategyConfig { blend, external }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn default_opts<'a>(source: &'a str, target: &'a str, output: &'a str) -> ConvertOptions<'a> {
        ConvertOptions {
            source,
            target,
            output,
            alpha: None,
            sample_rate: 16000,
            external_program: None,
            model: None,
            json: true,
        }
    }

    fn write_tone(path: &std::path::Path, freq: f64, num_samples: usize) {
        let samples: Vec<f64> = (0..num_samples)
            .map(|i| (2.0 * PI * freq * i as f64 / 16000.0).sin() * 0.5)
            .collect();
        WavResult::from_mono(&samples, 16000)
            .write_to_file(path)
            .unwrap();
    }

    #[test]
    fn test_build_config_defaults_to_blend() {
        let opts = default_opts("s.wav", "t.wav", "o.wav");
        let config = build_config(&opts);
        assert!(config.external.is_none());
        assert!((config.blend.alpha - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_build_config_with_alpha_override() {
        let mut opts = default_opts("s.wav", "t.wav", "o.wav");
        opts.alpha = Some(0.25);
        let config = build_config(&opts);
        assert!((config.blend.alpha - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_build_config_with_external_program() {
        let mut opts = default_opts("s.wav", "t.wav", "o.wav");
        opts.external_program = Some("/opt/quickvc/infer");
        opts.model = Some("/opt/quickvc/model.pth");
        let config = build_config(&opts);
        let external = config.external.unwrap();
        assert_eq!(
            external.program.as_deref(),
            Some(std::path::Path::new("/opt/quickvc/infer"))
        );
        assert_eq!(
            external.model_path.as_deref(),
            Some(std::path::Path::new("/opt/quickvc/model.pth"))
        );
    }

    #[test]
    fn test_convert_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let source_path = dir.path().join("source.wav");
        let target_path = dir.path().join("target.wav");
        let output_path = dir.path().join("output.wav");
        write_tone(&source_path, 440.0, 16000);
        write_tone(&target_path, 880.0, 16000);

        let opts = ConvertOptions {
            source: source_path.to_str().unwrap(),
            target: target_path.to_str().unwrap(),
            output: output_path.to_str().unwrap(),
            alpha: Some(0.5),
            sample_rate: 16000,
            external_program: None,
            model: None,
            json: true,
        };
        run(&opts).unwrap();

        let out = voxblend_core::read_wav_file(&output_path).unwrap();
        assert_eq!(out.sample_rate, 16000);
        assert_eq!(out.len(), 16000);
    }

    #[test]
    fn test_convert_resamples_mismatched_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let source_path = dir.path().join("source.wav");
        let target_path = dir.path().join("target.wav");
        let output_path = dir.path().join("output.wav");

        // Source at 8 kHz, target at 16 kHz; both get resampled to 16 kHz.
        let samples: Vec<f64> = (0..8000)
            .map(|i| (2.0 * PI * 440.0 * i as f64 / 8000.0).sin() * 0.5)
            .collect();
        WavResult::from_mono(&samples, 8000)
            .write_to_file(&source_path)
            .unwrap();
        write_tone(&target_path, 880.0, 16000);

        let opts = ConvertOptions {
            source: source_path.to_str().unwrap(),
            target: target_path.to_str().unwrap(),
            output: output_path.to_str().unwrap(),
            alpha: Some(0.5),
            sample_rate: 16000,
            external_program: None,
            model: None,
            json: true,
        };
        run(&opts).unwrap();

        let out = voxblend_core::read_wav_file(&output_path).unwrap();
        assert_eq!(out.sample_rate, 16000);
        // One second of 8 kHz audio becomes one second at 16 kHz.
        assert_eq!(out.len(), 16000);
    }

    #[test]
    fn test_convert_missing_source_errors() {
        let dir = tempfile::tempdir().unwrap();
        let target_path = dir.path().join("target.wav");
        write_tone(&target_path, 880.0, 1600);

        let output_path = dir.path().join("out.wav");
        let opts = ConvertOptions {
            source: "/nonexistent/source.wav",
            target: target_path.to_str().unwrap(),
            output: output_path.to_str().unwrap(),
            alpha: None,
            sample_rate: 16000,
            external_program: None,
            model: None,
            json: false,
        };
        assert!(run(&opts).is_err());
    }
}
