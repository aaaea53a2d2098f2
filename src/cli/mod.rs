//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod preview;
mod rules;
mod shapes;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::config::{load_config, ConfettiConfig, ConfigError, MAX_PREVIEW_FRAMES};
use crate::emitter::ConfettiEmitter;
use crate::models::{Point, Rect};

/// Process exit codes; usage errors exit with 2 through clap
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;

/// Confetti - particle emission model and preview renderer
#[derive(Parser)]
#[command(name = "confetti")]
#[command(about = "Confetti - inspect emission rules and render confetti previews")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write every catalog shape as a white PNG mask
    Shapes {
        /// Output directory
        #[arg(short, long, default_value = "shapes")]
        output: PathBuf,

        /// Integer upscale factor (nearest-neighbor)
        #[arg(long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..=16))]
        scale: u32,
    },

    /// Print the archetype rules an emission would install, as JSON
    Rules {
        /// Path to confetti.toml (default: discovered from the working directory)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Burst from X,Y instead of raining from the top edge
        #[arg(long, value_parser = parse_point)]
        at: Option<Point>,

        /// Seed for per-rule alpha sampling
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Render an animated GIF preview of an emission
    Preview {
        /// Path to confetti.toml (default: discovered from the working directory)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Burst from X,Y instead of raining from the top edge
        #[arg(long, value_parser = parse_point)]
        at: Option<Point>,

        /// Number of frames to render
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=MAX_PREVIEW_FRAMES as i64))]
        frames: Option<u32>,

        /// Playback rate in frames per second
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        fps: Option<u32>,

        /// Seed for the emitter and the simulation
        #[arg(long)]
        seed: Option<u64>,

        /// Output GIF path
        #[arg(short, long)]
        output: PathBuf,
    },
}

/// Parse an `X,Y` pair into a point.
pub(crate) fn parse_point(s: &str) -> Result<Point, String> {
    let (x, y) = s.split_once(',').ok_or_else(|| format!("expected X,Y, got '{}'", s))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<f32>()
            .ok()
            .filter(|n| n.is_finite())
            .ok_or_else(|| format!("invalid coordinate '{}'", v.trim()))
    };
    Ok(Point::new(parse(x)?, parse(y)?))
}

/// Install the stderr tracing subscriber.
///
/// `-v` forces `debug`; otherwise `RUST_LOG` is honored, falling back to `warn`.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Load the config or print the error, mapping it to an exit code.
pub(crate) fn load_or_report(path: Option<&Path>) -> Result<ConfettiConfig, ExitCode> {
    load_config(path).map_err(|e| {
        eprintln!("Error: {}", e);
        ExitCode::from(EXIT_ERROR)
    })
}

/// Build an emitter for the configured canvas and start it, raining by
/// default or bursting from `at`.
pub(crate) fn start_emitter(
    config: &ConfettiConfig,
    at: Option<Point>,
    seed: u64,
) -> Result<ConfettiEmitter, ConfigError> {
    let frame = Rect::from_size(config.canvas.size());
    let mut emitter = ConfettiEmitter::with_seed(frame, seed);
    emitter.configure(config.palette_colors()?, config.particle_kind()?, config.emission);

    match at {
        Some(point) => emitter.start_confetti_at(point),
        None => emitter.start_confetti(),
    }
    Ok(emitter)
}

/// Run the CLI application
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Shapes { output, scale } => shapes::run_shapes(&output, scale),
        Commands::Rules { config, at, seed } => rules::run_rules(config.as_deref(), at, seed),
        Commands::Preview { config, at, frames, fps, seed, output } => {
            preview::run_preview(config.as_deref(), at, frames, fps, seed, &output)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitter::EmitterShape;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_point() {
        assert_eq!(parse_point("10,20"), Ok(Point::new(10.0, 20.0)));
        assert_eq!(parse_point(" 1.5 , -2 "), Ok(Point::new(1.5, -2.0)));
        assert!(parse_point("10").is_err());
        assert!(parse_point("a,1").is_err());
        assert!(parse_point("1,inf").is_err());
    }

    #[test]
    fn test_parse_args() {
        let cli =
            Cli::try_parse_from(["confetti", "-v", "rules", "--at", "5,6", "--seed", "3"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Rules { config, at, seed } => {
                assert!(config.is_none());
                assert_eq!(at, Some(Point::new(5.0, 6.0)));
                assert_eq!(seed, Some(3));
            }
            _ => panic!("expected rules command"),
        }
    }

    #[test]
    fn test_preview_requires_output() {
        assert!(Cli::try_parse_from(["confetti", "preview"]).is_err());
        assert!(Cli::try_parse_from(["confetti", "preview", "--fps", "0", "-o", "x.gif"]).is_err());
    }

    #[test]
    fn test_preview_frames_bounded() {
        let parse =
            |n: &str| Cli::try_parse_from(["confetti", "preview", "--frames", n, "-o", "x.gif"]);
        assert!(parse("0").is_err());
        assert!(parse("600").is_ok());
        assert!(parse("601").is_err());
        assert!(parse("100000").is_err());
    }

    #[test]
    fn test_start_emitter_modes() {
        let config = ConfettiConfig::default();

        let rain = start_emitter(&config, None, 1).unwrap();
        assert_eq!(rain.session().unwrap().shape(), EmitterShape::Line);
        assert_eq!(rain.bounds(), Rect::new(0.0, 0.0, 320.0, 480.0));

        let burst = start_emitter(&config, Some(Point::new(3.0, 4.0)), 1).unwrap();
        assert_eq!(burst.session().unwrap().position(), Point::new(3.0, 4.0));
    }
}
