//! Archetype rule construction.
//!
//! Expands a palette, a shape set, an [`EmissionConfiguration`] and an
//! [`EmissionMode`] into one fully resolved [`ArchetypeRule`] per
//! (color, shape) pair. Rules are what a particle renderer consumes.
//!
//! Every color receives the full per-shape share of the birth rate, so the
//! total emission rate grows with palette size. Seven colors emit seven times
//! as much confetti as one.

use std::f32::consts::{FRAC_PI_2, PI};

use serde::{Serialize, Serializer};

use crate::catalog::ShapeArchetype;
use crate::color::Color;
use crate::models::{EmissionConfiguration, EmissionMode, Vector};

/// Per-rule alpha is sampled once, uniformly from this range.
pub const ALPHA_RANGE: (f32, f32) = (0.7, 1.0);

/// Point-mode multiplier applied to the per-rule birth rate
pub const BURST_RATE_FACTOR: f32 = 3.0;
/// Point-mode multiplier applied to velocity
pub const BURST_VELOCITY_FACTOR: f32 = 1.3;
/// Point-mode multiplier applied to velocity range
pub const BURST_VELOCITY_RANGE_FACTOR: f32 = 6.0;
/// Downward acceleration in points per second squared for point-mode particles
pub const BURST_GRAVITY: f32 = 50.0;

/// One (color, shape) pair's emission parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArchetypeRule {
    /// Particles per second
    pub birth_rate: f32,
    /// Seconds each particle lives
    pub lifetime: f32,
    /// Lifetime variance; always zero
    pub lifetime_range: f32,
    /// Tint applied to the shape mask, with per-rule alpha
    pub color: Color,
    pub velocity: f32,
    pub velocity_range: f32,
    /// Center of the emission cone in radians, in the source's frame: a
    /// point source measures from +x with y down (-π/2 is up), a line source
    /// from its outward normal (π is down, into the container).
    /// See [`EmitterShape::direction`](crate::emitter::EmitterShape::direction).
    pub emission_longitude: f32,
    /// Full width of the emission cone in radians; particles leave within
    /// `longitude ± range / 2`
    pub emission_range: f32,
    /// Constant acceleration applied to every particle
    pub acceleration: Vector,
    pub spin: f32,
    pub spin_range: f32,
    pub scale_range: f32,
    pub scale_speed: f32,
    #[serde(serialize_with = "serialize_shape")]
    pub shape: ShapeArchetype,
}

fn serialize_shape<S: Serializer>(
    shape: &ShapeArchetype,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(shape.name())
}

/// The birth-rate normalization factor: `max(shape_count, 1)`.
pub fn shape_divisor(shape_count: usize) -> f32 {
    shape_count.max(1) as f32
}

/// Build the cross product of `palette` × `shapes`, palette-major.
///
/// An empty palette or shape set yields no rules; the divisor never drops
/// below one.
pub fn build_rules(
    palette: &[Color],
    shapes: &[ShapeArchetype],
    config: &EmissionConfiguration,
    mode: &EmissionMode,
    rng: &mut fastrand::Rng,
) -> Vec<ArchetypeRule> {
    let divisor = shape_divisor(shapes.len());
    let mut rules = Vec::with_capacity(palette.len() * shapes.len());

    for &color in palette {
        for shape in shapes {
            let alpha = ALPHA_RANGE.0 + (ALPHA_RANGE.1 - ALPHA_RANGE.0) * rng.f32();
            let base = ArchetypeRule {
                birth_rate: config.birth_rate / divisor,
                lifetime: config.lifetime,
                lifetime_range: 0.0,
                color: color.with_alpha(alpha),
                velocity: config.velocity,
                velocity_range: config.velocity_range,
                emission_longitude: 0.0,
                emission_range: 0.0,
                acceleration: Vector::ZERO,
                spin: config.spin,
                spin_range: config.spin_range,
                scale_range: config.scale_range,
                scale_speed: config.scale_speed,
                shape: shape.clone(),
            };
            rules.push(apply_mode(base, mode));
        }
    }

    rules
}

/// Mode-specific physics, applied after the configuration copy.
fn apply_mode(mut rule: ArchetypeRule, mode: &EmissionMode) -> ArchetypeRule {
    match mode {
        // Downward hemisphere; rain needs no gravity
        EmissionMode::Line => {
            rule.emission_longitude = PI;
            rule.emission_range = PI;
        }
        // Narrow upward cone with a gravity arc
        EmissionMode::Point { .. } => {
            rule.birth_rate *= BURST_RATE_FACTOR;
            rule.velocity *= BURST_VELOCITY_FACTOR;
            rule.velocity_range *= BURST_VELOCITY_RANGE_FACTOR;
            rule.emission_longitude = -FRAC_PI_2;
            rule.emission_range = PI / 8.0;
            rule.acceleration = Vector::new(0.0, BURST_GRAVITY);
        }
    }
    rule
}

/// Sum of every rule's birth rate.
pub fn total_birth_rate(rules: &[ArchetypeRule]) -> f32 {
    rules.iter().map(|r| r.birth_rate).sum()
}
