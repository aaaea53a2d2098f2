//! Configuration loading and discovery for `confetti.toml`
//!
//! Provides functions to find and load configuration and to turn it into the
//! palette and particle kind an emitter consumes.

use super::schema::{ConfettiConfig, ParticleSource};
use crate::catalog::ParticleKind;
use crate::color::{Color, ColorError};
use crate::palettes::default_palette;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

/// File name looked up during discovery
pub const CONFIG_FILE_NAME: &str = "confetti.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse confetti.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
    /// Palette entry that does not parse
    #[error("Invalid palette color: {0}")]
    Color(#[from] ColorError),
    /// Custom particle image that cannot be opened
    #[error("Failed to load particle image {}: {source}", .path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Find confetti.toml by walking up from the current working directory.
pub fn find_config() -> Option<PathBuf> {
    env::current_dir().ok().and_then(find_config_from)
}

/// Find confetti.toml by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration.
///
/// An explicit path wins. Otherwise `find_config()` is used, and when no file
/// is found the defaults are returned.
pub fn load_config(path: Option<&Path>) -> Result<ConfettiConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => load_config_file(&p),
        None => {
            debug!("no confetti.toml found, using defaults");
            Ok(ConfettiConfig::default())
        }
    }
}

/// Load configuration from a specific file path.
pub fn load_config_file(path: &Path) -> Result<ConfettiConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let mut config: ConfettiConfig = toml::from_str(&contents)?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors));
    }

    config.base_dir = path.parent().map(Path::to_path_buf);
    debug!(path = %path.display(), "loaded config");
    Ok(config)
}

/// Resolve a path relative to `base`.
///
/// Absolute paths are returned unchanged.
pub fn resolve_path(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

impl ConfettiConfig {
    /// The configured palette, or the built-in one when none is given.
    pub fn palette_colors(&self) -> Result<Vec<Color>, ConfigError> {
        match &self.palette.colors {
            Some(colors) => Ok(colors
                .iter()
                .map(|c| Color::from_str(c))
                .collect::<Result<Vec<_>, _>>()?),
            None => Ok(default_palette()),
        }
    }

    /// The configured particle set, loading the custom image if there is one.
    pub fn particle_kind(&self) -> Result<ParticleKind, ConfigError> {
        match (self.particles.kind, &self.particles.image) {
            (ParticleSource::Confetti, _) => Ok(ParticleKind::Confetti),
            (ParticleSource::Image, Some(image)) => {
                let base = self.base_dir.as_deref().unwrap_or_else(|| Path::new("."));
                let path = resolve_path(base, image);
                let img = image::open(&path)
                    .map_err(|source| ConfigError::Image { path: path.clone(), source })?;
                debug!(path = %path.display(), "loaded particle image");
                Ok(ParticleKind::image(img.to_rgba8()))
            }
            (ParticleSource::Image, None) => Err(ConfigError::Validation(vec![
                "particles.kind = \"image\" requires particles.image".to_string(),
            ])),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_config(dir: &Path, contents: &str) -> PathBuf {
        let path = dir.join(CONFIG_FILE_NAME);
        File::create(&path)
            .expect("should create config file")
            .write_all(contents.as_bytes())
            .expect("should write config content");
        path
    }

    #[test]
    fn test_find_config_in_current_dir() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(temp.path(), "");

        assert_eq!(find_config_from(temp.path().to_path_buf()), Some(config_path));
    }

    #[test]
    fn test_find_config_in_parent_dir() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(temp.path(), "");
        let nested = temp.path().join("a").join("b");
        fs::create_dir_all(&nested).expect("should create nested dirs");

        assert_eq!(find_config_from(nested), Some(config_path));
    }

    #[test]
    fn test_load_config_from_file() {
        let temp = TempDir::new().expect("should create temp dir");
        let path = write_config(temp.path(), "[emission]\nbirth_rate = 4.0\n");

        let config = load_config(Some(&path)).expect("should load");
        assert_eq!(config.emission.birth_rate, 4.0);
        assert_eq!(config.emission.velocity, 350.0);
        assert_eq!(config.base_dir.as_deref(), Some(temp.path()));
    }

    #[test]
    fn test_load_config_missing_file() {
        let temp = TempDir::new().expect("should create temp dir");
        let result = load_config(Some(&temp.path().join("nope.toml")));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let temp = TempDir::new().expect("should create temp dir");
        let path = write_config(temp.path(), "[canvas\nwidth = ");
        assert!(matches!(load_config(Some(&path)), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_validation_error() {
        let temp = TempDir::new().expect("should create temp dir");
        let path = write_config(temp.path(), "[emission]\nlifetime = -1.0\n");

        match load_config(Some(&path)) {
            Err(ConfigError::Validation(errors)) => {
                assert_eq!(errors.len(), 1);
                assert!(errors[0].contains("lifetime"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_palette_colors() {
        let config = ConfettiConfig::default();
        assert_eq!(config.palette_colors().unwrap().len(), 7);

        let config: ConfettiConfig =
            toml::from_str("[palette]\ncolors = [\"#ffffff\", \"red\", \"#00f\"]\n").unwrap();
        let colors = config.palette_colors().unwrap();
        assert_eq!(colors.len(), 3);
        assert_eq!(colors[1], Color::rgb(1.0, 0.0, 0.0));
        assert_eq!(colors[2], Color::rgb(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_particle_kind_image_relative_to_config() {
        let temp = TempDir::new().expect("should create temp dir");
        fs::create_dir_all(temp.path().join("sprites")).unwrap();
        RgbaImage::from_pixel(5, 3, Rgba([255, 255, 255, 255]))
            .save(temp.path().join("sprites/star.png"))
            .unwrap();
        let path = write_config(
            temp.path(),
            "[particles]\nkind = \"image\"\nimage = \"sprites/star.png\"\n",
        );

        let config = load_config(Some(&path)).unwrap();
        match config.particle_kind().unwrap() {
            ParticleKind::CustomImage(img) => assert_eq!(img.dimensions(), (5, 3)),
            other => panic!("expected custom image, got {:?}", other),
        }
    }

    #[test]
    fn test_particle_kind_missing_image_file() {
        let temp = TempDir::new().expect("should create temp dir");
        let path =
            write_config(temp.path(), "[particles]\nkind = \"image\"\nimage = \"gone.png\"\n");

        let config = load_config(Some(&path)).unwrap();
        assert!(matches!(config.particle_kind(), Err(ConfigError::Image { .. })));
    }

    #[test]
    fn test_resolve_path() {
        let base = Path::new("/project");
        assert_eq!(resolve_path(base, Path::new("/abs/x.png")), PathBuf::from("/abs/x.png"));
        assert_eq!(resolve_path(base, Path::new("x.png")), PathBuf::from("/project/x.png"));
    }
}
