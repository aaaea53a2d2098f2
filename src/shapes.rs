//! Shape rasterization primitives for particle masks.
//!
//! Geometry is described in floating-point pixel coordinates; each function
//! returns the set of integer pixels whose *centers* `(x + 0.5, y + 0.5)`
//! fall inside the shape. Callers clip to their canvas.

use std::collections::HashSet;

use image::{Rgba, RgbaImage};

/// A vertex in pixel space.
pub type Vertex = (f32, f32);

/// Rasterize a filled ellipse centered at `(cx, cy)` with radii `(rx, ry)`.
///
/// # Examples
///
/// ```
/// use confetti::shapes::rasterize_ellipse;
///
/// let pixels = rasterize_ellipse(4.0, 4.0, 4.0, 4.0);
/// assert!(pixels.contains(&(3, 3)));
/// assert!(!pixels.contains(&(0, 0)));
/// ```
pub fn rasterize_ellipse(cx: f32, cy: f32, rx: f32, ry: f32) -> HashSet<(i32, i32)> {
    let mut pixels = HashSet::new();

    if rx <= 0.0 || ry <= 0.0 {
        return pixels;
    }

    let min_y = (cy - ry).floor() as i32;
    let max_y = (cy + ry).ceil() as i32;
    let min_x = (cx - rx).floor() as i32;
    let max_x = (cx + rx).ceil() as i32;

    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let dx = (x as f32 + 0.5 - cx) / rx;
            let dy = (y as f32 + 0.5 - cy) / ry;
            if dx * dx + dy * dy <= 1.0 {
                pixels.insert((x, y));
            }
        }
    }

    pixels
}

/// Rasterize a filled polygon with the even-odd rule.
///
/// The polygon is implicitly closed. Fewer than three vertices yields no pixels.
///
/// # Examples
///
/// ```
/// use confetti::shapes::rasterize_polygon;
///
/// let square = [(0.0, 0.0), (3.0, 0.0), (3.0, 3.0), (0.0, 3.0)];
/// assert_eq!(rasterize_polygon(&square).len(), 9);
/// ```
pub fn rasterize_polygon(vertices: &[Vertex]) -> HashSet<(i32, i32)> {
    let mut pixels = HashSet::new();

    if vertices.len() < 3 {
        return pixels;
    }

    let (min_y, max_y) = vertices
        .iter()
        .fold((f32::MAX, f32::MIN), |(lo, hi), &(_, y)| (lo.min(y), hi.max(y)));

    for row in min_y.floor() as i32..=max_y.ceil() as i32 {
        let sy = row as f32 + 0.5;
        let mut crossings = Vec::new();

        for i in 0..vertices.len() {
            let (x1, y1) = vertices[i];
            let (x2, y2) = vertices[(i + 1) % vertices.len()];

            // Half-open rule so shared vertices are counted once
            if (y1 <= sy && sy < y2) || (y2 <= sy && sy < y1) {
                crossings.push(x1 + (sy - y1) * (x2 - x1) / (y2 - y1));
            }
        }

        crossings.sort_by(f32::total_cmp);

        for span in crossings.chunks_exact(2) {
            // Pixel x is inside when its center lies in [start, end)
            let first = (span[0] - 0.5).ceil() as i32;
            let last = (span[1] - 0.5).ceil() as i32 - 1;
            for x in first..=last {
                pixels.insert((x, row));
            }
        }
    }

    pixels
}

/// Rasterize a stroked polyline of the given width with round caps and joins.
///
/// A pixel is covered when its center lies within `width / 2` of any segment.
///
/// # Examples
///
/// ```
/// use confetti::shapes::rasterize_polyline;
///
/// let pixels = rasterize_polyline(&[(1.0, 2.0), (7.0, 2.0)], 2.0);
/// assert!(pixels.contains(&(4, 1)));
/// assert!(pixels.contains(&(0, 1))); // round cap reaches past the endpoint
/// assert!(!pixels.contains(&(4, 4)));
/// ```
pub fn rasterize_polyline(points: &[Vertex], width: f32) -> HashSet<(i32, i32)> {
    let mut pixels = HashSet::new();

    if points.is_empty() || width <= 0.0 {
        return pixels;
    }

    let half = width / 2.0;
    let segments: Vec<(Vertex, Vertex)> = if points.len() == 1 {
        vec![(points[0], points[0])]
    } else {
        points.windows(2).map(|w| (w[0], w[1])).collect()
    };

    for (a, b) in segments {
        let min_x = (a.0.min(b.0) - half).floor() as i32;
        let max_x = (a.0.max(b.0) + half).ceil() as i32;
        let min_y = (a.1.min(b.1) - half).floor() as i32;
        let max_y = (a.1.max(b.1) + half).ceil() as i32;

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let p = (x as f32 + 0.5, y as f32 + 0.5);
                if distance_to_segment(p, a, b) <= half {
                    pixels.insert((x, y));
                }
            }
        }
    }

    pixels
}

/// Distance from `p` to the segment `a`-`b`.
fn distance_to_segment(p: Vertex, a: Vertex, b: Vertex) -> f32 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq == 0.0 {
        0.0
    } else {
        (((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len_sq).clamp(0.0, 1.0)
    };
    let (qx, qy) = (a.0 + t * dx, a.1 + t * dy);
    ((p.0 - qx).powi(2) + (p.1 - qy).powi(2)).sqrt()
}

/// Sample points along a circular arc.
///
/// Angles are in radians and increase clockwise in y-down space. The result
/// has `segments + 1` points including both endpoints.
pub fn arc_points(
    center: Vertex,
    radius: f32,
    start: f32,
    end: f32,
    segments: usize,
) -> Vec<Vertex> {
    let segments = segments.max(1);
    (0..=segments)
        .map(|i| {
            let angle = start + (end - start) * i as f32 / segments as f32;
            (center.0 + radius * angle.cos(), center.1 + radius * angle.sin())
        })
        .collect()
}

/// Flatten a cubic Bézier curve into `segments + 1` points.
pub fn flatten_cubic(
    p0: Vertex,
    c1: Vertex,
    c2: Vertex,
    p3: Vertex,
    segments: usize,
) -> Vec<Vertex> {
    let segments = segments.max(1);
    (0..=segments)
        .map(|i| {
            let t = i as f32 / segments as f32;
            let u = 1.0 - t;
            let (a, b, c, d) = (u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t);
            (
                a * p0.0 + b * c1.0 + c * c2.0 + d * p3.0,
                a * p0.1 + b * c1.1 + c * c2.1 + d * p3.1,
            )
        })
        .collect()
}

/// Outline of a rectangle with rounded corners, clockwise from the top edge.
pub fn rounded_rect_points(width: f32, height: f32, radius: f32, segments: usize) -> Vec<Vertex> {
    use std::f32::consts::{FRAC_PI_2, PI};

    let r = radius.clamp(0.0, width.min(height) / 2.0);
    if r == 0.0 {
        return vec![(0.0, 0.0), (width, 0.0), (width, height), (0.0, height)];
    }

    let corners = [
        ((width - r, r), -FRAC_PI_2),
        ((width - r, height - r), 0.0),
        ((r, height - r), FRAC_PI_2),
        ((r, r), PI),
    ];

    corners
        .iter()
        .flat_map(|&(center, start)| arc_points(center, r, start, start + FRAC_PI_2, segments))
        .collect()
}

/// Paint a pixel set into a white-on-transparent mask, clipping to the canvas.
pub fn to_mask(pixels: &HashSet<(i32, i32)>, width: u32, height: u32) -> RgbaImage {
    let mut mask = RgbaImage::new(width, height);
    for &(x, y) in pixels {
        if x >= 0 && y >= 0 && (x as u32) < width && (y as u32) < height {
            mask.put_pixel(x as u32, y as u32, Rgba([255, 255, 255, 255]));
        }
    }
    mask
}
