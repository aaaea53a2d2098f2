//! Data models for confetti emission (geometry, configuration, modes)

mod emission;
mod geometry;

// Re-export all public types
pub use emission::{EmissionConfiguration, EmissionMode};
pub use geometry::{Point, Rect, Size, UnitPoint, Vector};
