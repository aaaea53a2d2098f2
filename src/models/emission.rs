//! Emission configuration and mode types.

use serde::{Deserialize, Serialize};

use super::geometry::Point;

fn default_birth_rate() -> f32 {
    8.5
}

fn default_lifetime() -> f32 {
    14.0
}

fn default_velocity() -> f32 {
    350.0
}

fn default_velocity_range() -> f32 {
    80.0
}

fn default_spin() -> f32 {
    3.5
}

fn default_spin_range() -> f32 {
    4.0
}

fn default_scale_range() -> f32 {
    1.0
}

fn default_scale_speed() -> f32 {
    -0.1
}

/// Particle physics parameters shared by every archetype of an emission.
///
/// Fields left out of a struct literal (via `..Default::default()`), a
/// builder chain, or a deserialized table always take the documented
/// defaults, never values from some earlier configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmissionConfiguration {
    /// Total particles per second for one color, split across the shape set
    #[serde(default = "default_birth_rate")]
    pub birth_rate: f32,
    /// Particle lifetime in seconds
    #[serde(default = "default_lifetime")]
    pub lifetime: f32,
    /// Initial speed in points per second
    #[serde(default = "default_velocity")]
    pub velocity: f32,
    /// Speed variance (±)
    #[serde(default = "default_velocity_range")]
    pub velocity_range: f32,
    /// Rotation speed in radians per second
    #[serde(default = "default_spin")]
    pub spin: f32,
    /// Rotation speed variance (±)
    #[serde(default = "default_spin_range")]
    pub spin_range: f32,
    /// Initial scale variance (±) around 1.0
    #[serde(default = "default_scale_range")]
    pub scale_range: f32,
    /// Scale change per second
    #[serde(default = "default_scale_speed")]
    pub scale_speed: f32,
}

impl Default for EmissionConfiguration {
    fn default() -> Self {
        Self {
            birth_rate: default_birth_rate(),
            lifetime: default_lifetime(),
            velocity: default_velocity(),
            velocity_range: default_velocity_range(),
            spin: default_spin(),
            spin_range: default_spin_range(),
            scale_range: default_scale_range(),
            scale_speed: default_scale_speed(),
        }
    }
}

impl EmissionConfiguration {
    pub fn with_birth_rate(mut self, birth_rate: f32) -> Self {
        self.birth_rate = birth_rate;
        self
    }

    pub fn with_lifetime(mut self, lifetime: f32) -> Self {
        self.lifetime = lifetime;
        self
    }

    pub fn with_velocity(mut self, velocity: f32, range: f32) -> Self {
        self.velocity = velocity;
        self.velocity_range = range;
        self
    }

    pub fn with_spin(mut self, spin: f32, range: f32) -> Self {
        self.spin = spin;
        self.spin_range = range;
        self
    }

    pub fn with_scale(mut self, range: f32, speed: f32) -> Self {
        self.scale_range = range;
        self.scale_speed = speed;
        self
    }

    /// Returns a description of every field outside its valid domain.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.birth_rate.is_nan() || self.birth_rate <= 0.0 {
            errors.push(format!("emission.birth_rate must be > 0 (got {})", self.birth_rate));
        }
        if self.lifetime.is_nan() || self.lifetime <= 0.0 {
            errors.push(format!("emission.lifetime must be > 0 (got {})", self.lifetime));
        }
        for (name, value) in [
            ("velocity_range", self.velocity_range),
            ("spin_range", self.spin_range),
            ("scale_range", self.scale_range),
        ] {
            if value.is_nan() || value < 0.0 {
                errors.push(format!("emission.{} must be >= 0 (got {})", name, value));
            }
        }
        errors
    }
}

/// Where particles are born.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum EmissionMode {
    /// Ambient rain from a line spanning the container's top edge
    #[default]
    Line,
    /// Upward burst from a fixed origin
    Point { origin: Point },
}

impl EmissionMode {
    pub fn point(x: f32, y: f32) -> Self {
        EmissionMode::Point { origin: Point::new(x, y) }
    }

    pub fn is_point(&self) -> bool {
        matches!(self, EmissionMode::Point { .. })
    }
}
