//! CLI dispatch for the `confetti shapes` command.

use std::path::Path;
use std::process::ExitCode;

use crate::catalog::{ShapeKind, CATALOG_SCALE};
use crate::output::{save_png, scale_image};

use super::{EXIT_ERROR, EXIT_SUCCESS};

/// Write `<name>.png` for every catalog shape into `output`.
pub fn run_shapes(output: &Path, scale: u32) -> ExitCode {
    for kind in ShapeKind::ALL {
        let mask = scale_image(kind.rasterize(CATALOG_SCALE), scale);
        let path = output.join(format!("{}.png", kind.name()));

        if let Err(e) = save_png(&mask, &path) {
            eprintln!("Error: Failed to write '{}': {}", path.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }
        println!("Saved: {}", path.display());
    }

    ExitCode::from(EXIT_SUCCESS)
}
