//! Configuration schema types for `confetti.toml`
//!
//! Every section and key is optional. Missing values take the same defaults
//! the library uses.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use crate::color::Color;
use crate::models::{EmissionConfiguration, Size};

/// Canvas the emitter is laid out in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasConfig {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
}

fn default_width() -> u32 {
    320
}

fn default_height() -> u32 {
    480
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self { width: default_width(), height: default_height() }
    }
}

impl CanvasConfig {
    pub fn size(&self) -> Size {
        Size::new(self.width as f32, self.height as f32)
    }
}

/// Palette override
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaletteConfig {
    /// CSS color strings; `None` keeps the built-in palette
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<Vec<String>>,
}

/// Which particle set to emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ParticleSource {
    /// The eight built-in confetti shapes
    #[default]
    Confetti,
    /// A single custom image
    Image,
}

/// Particle set section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParticlesConfig {
    #[serde(default)]
    pub kind: ParticleSource,
    /// Image path, relative to the config file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<PathBuf>,
}

/// Upper bound on preview length; every frame is held in memory before encoding.
pub const MAX_PREVIEW_FRAMES: u32 = 600;

/// GIF preview settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PreviewConfig {
    #[serde(default = "default_frames")]
    pub frames: u32,
    #[serde(default = "default_fps")]
    pub fps: u32,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_frames() -> u32 {
    90
}

fn default_fps() -> u32 {
    30
}

fn default_seed() -> u64 {
    42
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self { frames: default_frames(), fps: default_fps(), seed: default_seed() }
    }
}

/// Root `confetti.toml` configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfettiConfig {
    #[serde(default)]
    pub canvas: CanvasConfig,
    #[serde(default)]
    pub palette: PaletteConfig,
    #[serde(default)]
    pub particles: ParticlesConfig,
    #[serde(default)]
    pub emission: EmissionConfiguration,
    #[serde(default)]
    pub preview: PreviewConfig,
    /// Directory of the file this was loaded from; relative paths resolve here
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

impl ConfettiConfig {
    /// Validate the configuration and return every problem found.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = self.emission.validate();

        if self.canvas.width == 0 || self.canvas.height == 0 {
            errors.push(format!(
                "canvas must be non-zero (got {}x{})",
                self.canvas.width, self.canvas.height
            ));
        }

        if let Some(colors) = &self.palette.colors {
            if colors.is_empty() {
                errors.push("palette.colors must not be empty".to_string());
            }
            for (i, color) in colors.iter().enumerate() {
                if let Err(e) = Color::from_str(color) {
                    errors.push(format!("palette.colors[{}] '{}': {}", i, color, e));
                }
            }
        }

        if self.particles.kind == ParticleSource::Image && self.particles.image.is_none() {
            errors.push("particles.kind = \"image\" requires particles.image".to_string());
        }

        if self.preview.frames == 0 || self.preview.frames > MAX_PREVIEW_FRAMES {
            errors.push(format!(
                "preview.frames must be between 1 and {} (got {})",
                MAX_PREVIEW_FRAMES, self.preview.frames
            ));
        }

        if self.preview.fps == 0 {
            errors.push("preview.fps must be > 0".to_string());
        }

        errors
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}
