//! voxblend CLI - Command-line interface for voice conversion
//!
//! This binary provides commands for converting synthesized speech toward a
//! target speaker's voice and inspecting the audio involved.

use clap::{Parser, Subcommand};
use std::process::ExitCode;

// Use modules from the library crate
use voxblend_cli::commands;

/// voxblend - Spectral voice conversion
#[derive(Parser)]
#[command(name = "voxblend")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a source recording toward a target speaker's voice
    Convert {
        /// Path to the source WAV (the speech to convert)
        #[arg(short, long)]
        source: String,

        /// Path to the target WAV (the voice to blend toward)
        #[arg(short, long)]
        target: String,

        /// Output WAV path
        #[arg(short, long)]
        output: String,

        /// Blend factor in [0, 1]; 0 keeps the source, 1 takes the target envelope
        #[arg(short, long)]
        alpha: Option<f64>,

        /// Processing sample rate in Hz; inputs are resampled to this
        #[arg(long, default_value = "16000")]
        sample_rate: u32,

        /// Path to an external learned-model conversion program
        #[arg(long)]
        external_program: Option<String>,

        /// Model checkpoint for the external program
        #[arg(long)]
        model: Option<String>,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Analyze WAV files and output level and spectral metrics
    Analyze {
        /// Path to the input WAV file to analyze
        #[arg(short, long)]
        input: Option<String>,

        /// Directory to recursively scan for .wav files (batch mode)
        #[arg(long)]
        input_dir: Option<String>,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Check system dependencies and configuration
    Doctor,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Convert {
            source,
            target,
            output,
            alpha,
            sample_rate,
            external_program,
            model,
            json,
        } => commands::convert::run(&commands::convert::ConvertOptions {
            source: &source,
            target: &target,
            output: &output,
            alpha,
            sample_rate,
            external_program: external_program.as_deref(),
            model: model.as_deref(),
            json,
        }),
        Commands::Analyze {
            input,
            input_dir,
            json,
        } => commands::analyze::run(input.as_deref(), input_dir.as_deref(), json),
        Commands::Doctor => commands::doctor::run(),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}
