//! Analyze command implementation
//!
//! Reports level and spectral metrics for WAV files, either one file or a
//! directory scanned recursively.

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use std::process::ExitCode;
use walkdir::WalkDir;

use voxblend_core::{analysis, read_wav_file, Waveform, SILENCE_EPSILON};

/// Metrics computed for one audio file.
#[derive(Debug, Serialize)]
pub struct AudioMetrics {
    pub path: String,
    pub sample_rate: u32,
    pub num_samples: usize,
    pub duration_seconds: f64,
    pub peak: f64,
    pub rms: f64,
    pub dominant_frequency_hz: f64,
    pub spectral_centroid_hz: f64,
    pub silent: bool,
}

impl AudioMetrics {
    fn compute(path: &str, wave: &Waveform) -> Self {
        Self {
            path: path.to_string(),
            sample_rate: wave.sample_rate,
            num_samples: wave.len(),
            duration_seconds: wave.duration_seconds(),
            peak: wave.peak(),
            rms: wave.rms(),
            dominant_frequency_hz: analysis::dominant_frequency(&wave.samples, wave.sample_rate),
            spectral_centroid_hz: analysis::spectral_centroid(&wave.samples, wave.sample_rate),
            silent: wave.is_silent(SILENCE_EPSILON),
        }
    }
}

/// Run the analyze command
///
/// # Arguments
/// * `input` - Path to a single WAV file
/// * `input_dir` - Directory to recursively scan for .wav files (batch mode)
/// * `json` - Whether to output machine-readable JSON
///
/// # Returns
/// Exit code: 0 on success, 1 on error
pub fn run(input: Option<&str>, input_dir: Option<&str>, json: bool) -> Result<ExitCode> {
    match (input, input_dir) {
        (Some(path), None) => {
            let metrics = analyze_file(path)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&metrics)?);
            } else {
                print_metrics(&metrics);
            }
            Ok(ExitCode::SUCCESS)
        }
        (None, Some(dir)) => run_batch(dir, json),
        (Some(_), Some(_)) => {
            anyhow::bail!("--input and --input-dir are mutually exclusive")
        }
        (None, None) => {
            anyhow::bail!("either --input or --input-dir is required")
        }
    }
}

fn analyze_file(path: &str) -> Result<AudioMetrics> {
    let wave = read_wav_file(path).with_context(|| format!("Failed to read {path}"))?;
    Ok(AudioMetrics::compute(path, &wave))
}

fn run_batch(dir: &str, json: bool) -> Result<ExitCode> {
    let paths = collect_wav_files(dir);
    if paths.is_empty() {
        anyhow::bail!("no .wav files found under {dir}");
    }

    let mut results = Vec::new();
    let mut failures = 0usize;
    for path in &paths {
        match analyze_file(path) {
            Ok(metrics) => results.push(metrics),
            Err(e) => {
                failures += 1;
                if !json {
                    eprintln!("{} {}: {e:#}", "!!".yellow(), path);
                }
            }
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        println!(
            "{} {} file(s), {} failed",
            "Analyzed".cyan().bold(),
            results.len(),
            failures
        );
        for metrics in &results {
            println!();
            print_metrics(metrics);
        }
    }

    if failures > 0 {
        Ok(ExitCode::from(1))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

/// Recursively collects .wav paths under a directory, sorted for stable output.
fn collect_wav_files(dir: &str) -> Vec<String> {
    let mut paths: Vec<String> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"))
        })
        .map(|e| e.path().display().to_string())
        .collect();
    paths.sort();
    paths
}

fn print_metrics(metrics: &AudioMetrics) {
    println!("{}", metrics.path.cyan().bold());
    println!(
        "  {} {:.2}s @ {} Hz ({} samples)",
        "Audio:".dimmed(),
        metrics.duration_seconds,
        metrics.sample_rate,
        metrics.num_samples
    );
    println!(
        "  {} peak {:.4}, rms {:.4}",
        "Level:".dimmed(),
        metrics.peak,
        metrics.rms
    );
    println!(
        "  {} dominant {:.1} Hz, centroid {:.1} Hz",
        "Spectrum:".dimmed(),
        metrics.dominant_frequency_hz,
        metrics.spectral_centroid_hz
    );
    if metrics.silent {
        println!("  {} effectively silent", "!!".yellow());
    }
}
