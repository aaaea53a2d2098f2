//! The built-in confetti shape catalog.
//!
//! Eight small vector outlines, each rasterized once into a white-on-transparent
//! mask. Particles are tinted per archetype rule at emission time, so the masks
//! themselves never carry color.

use std::f32::consts::PI;
use std::fmt;
use std::sync::{Arc, OnceLock};

use image::RgbaImage;
use crate::shapes::{
    arc_points, flatten_cubic, rasterize_ellipse, rasterize_polygon, rasterize_polyline,
    rounded_rect_points, to_mask, Vertex,
};

/// Pixels per point used for the memoized catalog.
pub const CATALOG_SCALE: u32 = 2;

/// Segment count used when flattening arcs and curves, per quarter turn or curve.
const CURVE_SEGMENTS: usize = 12;

/// The eight built-in confetti shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Dot,
    Triangle,
    Strip,
    SemiCircle,
    Arc,
    Squiggle,
    Star,
    Crown,
}

/// How a shape's outline becomes pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderMode {
    Fill,
    /// Stroked with round caps at the given line width (points)
    Stroke { width: f32 },
}

impl ShapeKind {
    /// Catalog order.
    pub const ALL: [ShapeKind; 8] = [
        ShapeKind::Dot,
        ShapeKind::Triangle,
        ShapeKind::Strip,
        ShapeKind::SemiCircle,
        ShapeKind::Arc,
        ShapeKind::Squiggle,
        ShapeKind::Star,
        ShapeKind::Crown,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ShapeKind::Dot => "dot",
            ShapeKind::Triangle => "triangle",
            ShapeKind::Strip => "strip",
            ShapeKind::SemiCircle => "semicircle",
            ShapeKind::Arc => "arc",
            ShapeKind::Squiggle => "squiggle",
            ShapeKind::Star => "star",
            ShapeKind::Crown => "crown",
        }
    }

    /// Raster bounds in points.
    pub fn size(self) -> (f32, f32) {
        match self {
            ShapeKind::Dot => (8.0, 8.0),
            ShapeKind::Triangle => (12.0, 10.0),
            ShapeKind::Strip => (12.0, 5.0),
            ShapeKind::SemiCircle => (12.0, 7.0),
            ShapeKind::Arc => (12.0, 12.0),
            ShapeKind::Squiggle => (10.0, 14.0),
            ShapeKind::Star => (14.0, 14.0),
            ShapeKind::Crown => (14.0, 9.0),
        }
    }

    pub fn render_mode(self) -> RenderMode {
        match self {
            ShapeKind::Dot
            | ShapeKind::Triangle
            | ShapeKind::Strip
            | ShapeKind::SemiCircle
            | ShapeKind::Crown => RenderMode::Fill,
            ShapeKind::Arc => RenderMode::Stroke { width: 2.5 },
            ShapeKind::Squiggle => RenderMode::Stroke { width: 2.0 },
            ShapeKind::Star => RenderMode::Stroke { width: 1.5 },
        }
    }

    /// Outline paths in points. Filled shapes have exactly one closed path;
    /// stroked shapes may have several open ones. The dot is filled as an
    /// exact ellipse, its outline here is the polygonal equivalent.
    fn paths(self) -> Vec<Vec<Vertex>> {
        let (w, h) = self.size();
        match self {
            ShapeKind::Dot => {
                vec![arc_points((w / 2.0, h / 2.0), w / 2.0, 0.0, 2.0 * PI, 4 * CURVE_SEGMENTS)]
            }
            ShapeKind::Triangle => vec![vec![(w / 2.0, 0.0), (w, h), (0.0, h)]],
            ShapeKind::Strip => vec![rounded_rect_points(w, h, 1.0, CURVE_SEGMENTS / 3)],
            ShapeKind::SemiCircle => {
                vec![arc_points((w / 2.0, h), w / 2.0, PI, 2.0 * PI, 2 * CURVE_SEGMENTS)]
            }
            ShapeKind::Arc => {
                vec![arc_points((w / 2.0, h / 2.0), 4.0, 0.3 * PI, 1.7 * PI, 4 * CURVE_SEGMENTS)]
            }
            ShapeKind::Squiggle => {
                let mid = (8.0, h / 2.0);
                let mut path = flatten_cubic(
                    (2.0, 0.0),
                    (12.0, h * 0.15),
                    (-2.0, h * 0.35),
                    mid,
                    CURVE_SEGMENTS,
                );
                let lower = flatten_cubic(
                    mid,
                    (12.0, h * 0.65),
                    (-2.0, h * 0.85),
                    (2.0, h),
                    CURVE_SEGMENTS,
                );
                path.extend(lower.into_iter().skip(1));
                vec![path]
            }
            ShapeKind::Star => {
                let (cx, cy, r) = (w / 2.0, h / 2.0, 6.0);
                (0..4)
                    .map(|i| {
                        let angle = i as f32 * PI / 4.0;
                        let (dx, dy) = (angle.cos() * r, angle.sin() * r);
                        vec![(cx + dx, cy + dy), (cx - dx, cy - dy)]
                    })
                    .collect()
            }
            ShapeKind::Crown => vec![vec![
                (0.0, h),
                (0.0, h * 0.4),
                (w * 0.25, 0.0),
                (w * 0.5, h * 0.4),
                (w * 0.75, 0.0),
                (w, h * 0.4),
                (w, h),
            ]],
        }
    }

    /// Render this shape into a white mask at `scale` pixels per point.
    pub fn rasterize(self, scale: u32) -> RgbaImage {
        let scale = scale.max(1);
        let s = scale as f32;
        let (w, h) = self.size();
        let (pw, ph) = ((w * s).ceil() as u32, (h * s).ceil() as u32);

        let pixels = match (self, self.render_mode()) {
            (ShapeKind::Dot, _) => {
                let (rx, ry) = (w * s / 2.0, h * s / 2.0);
                rasterize_ellipse(rx, ry, rx, ry)
            }
            (_, RenderMode::Fill) => {
                let outline: Vec<Vertex> =
                    self.paths().concat().into_iter().map(|(x, y)| (x * s, y * s)).collect();
                rasterize_polygon(&outline)
            }
            (_, RenderMode::Stroke { width }) => self
                .paths()
                .iter()
                .flat_map(|path| {
                    let scaled: Vec<Vertex> = path.iter().map(|&(x, y)| (x * s, y * s)).collect();
                    rasterize_polyline(&scaled, width * s)
                })
                .collect(),
        };

        to_mask(&pixels, pw, ph)
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where an archetype's bitmap came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchetypeSource {
    Builtin(ShapeKind),
    Custom,
}

/// An immutable particle bitmap shared by every rule that uses it.
#[derive(Debug, Clone)]
pub struct ShapeArchetype {
    source: ArchetypeSource,
    image: Arc<RgbaImage>,
}

impl ShapeArchetype {
    pub fn builtin(kind: ShapeKind, image: Arc<RgbaImage>) -> Self {
        Self { source: ArchetypeSource::Builtin(kind), image }
    }

    pub fn custom(image: Arc<RgbaImage>) -> Self {
        Self { source: ArchetypeSource::Custom, image }
    }

    pub fn source(&self) -> ArchetypeSource {
        self.source
    }

    pub fn name(&self) -> &'static str {
        match self.source {
            ArchetypeSource::Builtin(kind) => kind.name(),
            ArchetypeSource::Custom => "custom",
        }
    }

    pub fn image(&self) -> &Arc<RgbaImage> {
        &self.image
    }
}

impl PartialEq for ShapeArchetype {
    /// Two archetypes are equal when they share the same bitmap allocation.
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && Arc::ptr_eq(&self.image, &other.image)
    }
}

/// Which particle bitmaps an emission uses.
#[derive(Debug, Clone, Default)]
pub enum ParticleKind {
    /// The full built-in catalog
    #[default]
    Confetti,
    /// A single user-supplied bitmap, used as-is
    CustomImage(Arc<RgbaImage>),
}

impl ParticleKind {
    pub fn image(image: RgbaImage) -> Self {
        ParticleKind::CustomImage(Arc::new(image))
    }
}

/// The memoized built-in catalog, rasterized on first use.
pub fn catalog() -> &'static [ShapeArchetype] {
    static CATALOG: OnceLock<Vec<ShapeArchetype>> = OnceLock::new();
    CATALOG.get_or_init(|| {
        ShapeKind::ALL
            .iter()
            .map(|&kind| ShapeArchetype::builtin(kind, Arc::new(kind.rasterize(CATALOG_SCALE))))
            .collect()
    })
}

/// Returns the archetypes for a particle kind, in catalog order.
pub fn shapes_for(kind: &ParticleKind) -> Vec<ShapeArchetype> {
    match kind {
        ParticleKind::Confetti => catalog().to_vec(),
        ParticleKind::CustomImage(image) => vec![ShapeArchetype::custom(Arc::clone(image))],
    }
}
