//! CLI probe for the core crate.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `oficina_core` linkage.
//! - Run a backup file through the sanitizer for quick local checks.

use std::process::ExitCode;

fn main() -> ExitCode {
    let mut args = std::env::args().skip(1);
    match args.next() {
        None => {
            println!("oficina_core version={}", oficina_core::core_version());
            ExitCode::SUCCESS
        }
        Some(path) => check_file(&path),
    }
}

/// Parses and sanitizes `path`, reporting entity counts and repairs.
fn check_file(path: &str) -> ExitCode {
    let payload = match std::fs::read_to_string(path) {
        Ok(payload) => payload,
        Err(err) => {
            eprintln!("error: failed to read `{path}`: {err}");
            return ExitCode::FAILURE;
        }
    };

    let raw: serde_json::Value = match serde_json::from_str(&payload) {
        Ok(raw) => raw,
        Err(err) => {
            eprintln!("error: `{path}` is not valid JSON: {err}");
            return ExitCode::FAILURE;
        }
    };

    let outcome = oficina_core::sanitize(&raw);
    println!("characters={}", outcome.data.characters.len());
    println!("plots={}", outcome.data.plots.len());
    println!("worlds={}", outcome.data.worlds.len());
    println!("projects={}", outcome.data.projects.len());
    println!("issues_found={}", outcome.issues_found);
    ExitCode::SUCCESS
}
