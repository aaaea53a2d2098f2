//! CLI dispatch for the `confetti preview` command.

use std::path::Path;
use std::process::ExitCode;

use tracing::info;

use crate::gif::{frame_delay_ms, render_gif};
use crate::models::Point;
use crate::particle::Simulation;

use super::{load_or_report, start_emitter, EXIT_ERROR, EXIT_SUCCESS};

/// Simulate an emission and write it as an animated GIF.
///
/// Command-line values override the `[preview]` section of the config.
pub fn run_preview(
    config_path: Option<&Path>,
    at: Option<Point>,
    frames: Option<u32>,
    fps: Option<u32>,
    seed: Option<u64>,
    output: &Path,
) -> ExitCode {
    let config = match load_or_report(config_path) {
        Ok(config) => config,
        Err(code) => return code,
    };

    let frames = frames.unwrap_or(config.preview.frames);
    let fps = fps.unwrap_or(config.preview.fps);
    let seed = seed.unwrap_or(config.preview.seed);
    let mut emitter = match start_emitter(&config, at, seed) {
        Ok(emitter) => emitter,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let mut simulation = Simulation::new(seed);
    let images = simulation.generate_frames(&mut emitter, frames, fps);
    info!(frames = images.len(), fps, live = simulation.live_count(), "preview simulated");

    if let Err(e) = render_gif(&images, frame_delay_ms(fps), true, output) {
        eprintln!("Error: Failed to write '{}': {}", output.display(), e);
        return ExitCode::from(EXIT_ERROR);
    }

    println!("Saved: {}", output.display());
    ExitCode::from(EXIT_SUCCESS)
}
