//! CLI dispatch for the `confetti rules` command.

use std::path::Path;
use std::process::ExitCode;

use crate::models::Point;

use super::{load_or_report, start_emitter, EXIT_ERROR, EXIT_SUCCESS};

/// Print the installed session's rules as pretty JSON.
pub fn run_rules(config_path: Option<&Path>, at: Option<Point>, seed: Option<u64>) -> ExitCode {
    let config = match load_or_report(config_path) {
        Ok(config) => config,
        Err(code) => return code,
    };

    let seed = seed.unwrap_or(config.preview.seed);
    let emitter = match start_emitter(&config, at, seed) {
        Ok(emitter) => emitter,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let rules = emitter.session().map(|s| s.rules()).unwrap_or_default();
    match serde_json::to_string_pretty(rules) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}
