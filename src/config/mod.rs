//! Configuration for the confetti CLI
//!
//! Provides types and parsing for `confetti.toml`.

pub mod loader;
pub mod schema;

pub use loader::{
    find_config, find_config_from, load_config, load_config_file, resolve_path, ConfigError,
    CONFIG_FILE_NAME,
};
pub use schema::*;
