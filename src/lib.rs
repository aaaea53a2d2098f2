//! Confetti - a confetti particle emission model
//!
//! This library provides:
//! - A catalog of eight built-in confetti shapes, rasterized to white masks
//! - Archetype rules: one fully resolved emission parameter set per
//!   (color, shape) pair
//! - An emitter controller that owns a single emission session, rains from the
//!   top edge or bursts from a point, and suppresses bursts after 100 ms
//! - Presentation helpers for timed overlays and boolean bindings
//! - A reference particle simulator and GIF preview renderer
//!
//! Time is driven by the host: call `advance` from the frame loop.

pub mod catalog;
pub mod cli;
pub mod color;
pub mod config;
pub mod emitter;
pub mod gif;
pub mod models;
pub mod output;
pub mod palettes;
pub mod particle;
pub mod presentation;
pub mod rules;
pub mod schedule;
pub mod shapes;

pub use catalog::{ParticleKind, ShapeArchetype, ShapeKind};
pub use color::Color;
pub use emitter::{ConfettiEmitter, EmissionSession, EmitterShape, EmitterState};
pub use models::{EmissionConfiguration, EmissionMode, Point, Rect, Size, UnitPoint, Vector};
pub use rules::ArchetypeRule;
