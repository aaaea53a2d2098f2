//! Built-in palette definitions.
//!
//! The default confetti palette is a set of seven soft party colors. More
//! colors means more confetti: every color gets a full per-shape share of
//! the configured birth rate.

use crate::color::Color;

/// Returns the default seven-color confetti palette.
pub fn default_palette() -> Vec<Color> {
    vec![
        Color::rgb(0.40, 0.64, 0.98), // Blue
        Color::rgb(0.98, 0.42, 0.62), // Pink
        Color::rgb(1.00, 0.78, 0.22), // Yellow
        Color::rgb(0.96, 0.50, 0.38), // Coral
        Color::rgb(0.30, 0.78, 0.60), // Green
        Color::rgb(0.70, 0.52, 0.90), // Purple
        Color::rgb(0.98, 0.56, 0.76), // Rose
    ]
}
