//! Doctor command implementation
//!
//! Checks the environment the converter runs in.

use anyhow::Result;
use colored::Colorize;
use std::env;
use std::process::{Command, ExitCode};

use voxblend_core::{ExternalModelConfig, ExternalModelConverter, CONVERTER_ENV};

/// Run the doctor command
///
/// Checks:
/// - Version information
/// - External learned-model converter availability
/// - Working directory permissions
///
/// # Returns
/// Exit code: 0 if all checks pass, 1 if any fail
pub fn run() -> Result<ExitCode> {
    println!("{}", "voxblend Doctor".cyan().bold());
    println!("{}", "===============".cyan());
    println!();

    let mut all_ok = true;

    println!("{}", "Versions:".bold());
    println!(
        "  {} voxblend-cli v{}",
        "->".green(),
        env!("CARGO_PKG_VERSION")
    );
    match get_rustc_version() {
        Some(version) => println!("  {} rustc {}", "->".green(), version),
        None => println!("  {} rustc (not found)", "->".yellow()),
    }

    println!();

    println!("{}", "Conversion strategies:".bold());
    println!("  {} spectral-blend (built in)", "ok".green());
    let external = ExternalModelConverter::new(ExternalModelConfig::default());
    match external.resolve_program() {
        Some(program) => {
            println!(
                "  {} external-model ({})",
                "ok".green(),
                program.display()
            );
        }
        None => {
            println!("  {} external-model not found", "!!".yellow());
            println!(
                "     {}",
                format!(
                    "Set {CONVERTER_ENV} or put a conversion tool in PATH to enable it."
                )
                .dimmed()
            );
            // Not a hard failure, the spectral blend always works.
        }
    }

    println!();

    println!("{}", "Permissions:".bold());
    match env::current_dir() {
        Ok(dir) => {
            let test_file = dir.join(".voxblend_write_test");
            match std::fs::write(&test_file, "test") {
                Ok(_) => {
                    let _ = std::fs::remove_file(&test_file);
                    println!(
                        "  {} Current directory is writable ({})",
                        "ok".green(),
                        dir.display()
                    );
                }
                Err(e) => {
                    println!("  {} Cannot write to current directory: {}", "!!".red(), e);
                    all_ok = false;
                }
            }
        }
        Err(e) => {
            println!("  {} Cannot determine current directory: {}", "!!".red(), e);
            all_ok = false;
        }
    }

    println!();

    if all_ok {
        println!("{} All checks passed!", "SUCCESS".green().bold());
        Ok(ExitCode::SUCCESS)
    } else {
        println!(
            "{} Some checks failed. See above for details.",
            "WARNING".yellow().bold()
        );
        Ok(ExitCode::from(1))
    }
}

fn parse_rustc_version(output: &str) -> Option<String> {
    // Parse "rustc 1.75.0 (..."
    output.split_whitespace().nth(1).map(|s| s.to_string())
}

/// Get the rustc version
fn get_rustc_version() -> Option<String> {
    let output = Command::new("rustc").arg("--version").output().ok()?;

    if output.status.success() {
        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_rustc_version(&stdout)
    } else {
        None
    }
}
