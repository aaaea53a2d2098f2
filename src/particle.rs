//! Reference particle simulation and rendering.
//!
//! Steps particles out of a [`ConfettiEmitter`]'s installed session and
//! rasterizes them into RGBA frames. This is a preview renderer for the CLI
//! and for tests; a real host hands the session's rules to its own particle
//! system instead.
//!
//! # Architecture
//!
//! 1. Create a [`Simulation`] with a seed
//! 2. Call [`Simulation::step`] once per frame with the emitter and a time step,
//!    or let [`Simulation::generate_frames`] drive both the emitter clock and
//!    the simulation
//! 3. Use the resulting `Vec<RgbaImage>` with GIF output
//!
//! # Example
//!
//! ```
//! use confetti::emitter::ConfettiEmitter;
//! use confetti::models::Rect;
//! use confetti::particle::Simulation;
//!
//! let mut emitter = ConfettiEmitter::with_seed(Rect::new(0.0, 0.0, 64.0, 64.0), 1);
//! emitter.start_confetti();
//!
//! let mut sim = Simulation::new(42);
//! let frames = sim.generate_frames(&mut emitter, 10, 30);
//! assert_eq!(frames.len(), 10);
//! ```

use std::sync::Arc;
use std::time::Duration;

use image::{Rgba, RgbaImage};
use tracing::trace;

use crate::color::Color;
use crate::emitter::{ConfettiEmitter, EmissionSession, EmitterShape};
use crate::models::Vector;
use crate::rules::ArchetypeRule;
use crate::schedule::SessionId;

/// A live particle instance during simulation.
#[derive(Debug, Clone)]
struct LiveParticle {
    x: f32,
    y: f32,
    vx: f32,
    vy: f32,
    acceleration: Vector,
    /// Current rotation in radians
    rotation: f32,
    /// Radians per second
    spin: f32,
    scale: f32,
    scale_speed: f32,
    age: f32,
    lifetime: f32,
    color: Color,
    sprite: Arc<RgbaImage>,
}

impl LiveParticle {
    fn is_dead(&self) -> bool {
        self.age >= self.lifetime
    }
}

/// Particle simulation over an emitter's current session.
pub struct Simulation {
    particles: Vec<LiveParticle>,
    /// Fractional spawn accumulators, one per rule of the tracked session
    accumulators: Vec<f32>,
    tracked: Option<SessionId>,
    rng: fastrand::Rng,
}

impl Simulation {
    pub fn new(seed: u64) -> Self {
        Self {
            particles: Vec::new(),
            accumulators: Vec::new(),
            tracked: None,
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    /// Number of particles currently alive.
    pub fn live_count(&self) -> usize {
        self.particles.len()
    }

    /// Average position of all live particles, if any.
    pub fn centroid(&self) -> Option<(f32, f32)> {
        if self.particles.is_empty() {
            return None;
        }
        let n = self.particles.len() as f32;
        let (sx, sy) =
            self.particles.iter().fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        Some((sx / n, sy / n))
    }

    /// Advance the simulation by `dt` seconds.
    ///
    /// Particles from a replaced or stopped session keep moving; only
    /// spawning follows the emitter's current session.
    pub fn step(&mut self, emitter: &ConfettiEmitter, dt: f32) {
        if let Some(session) = emitter.session() {
            self.spawn(session, dt);
        }

        for p in &mut self.particles {
            p.vx += p.acceleration.x * dt;
            p.vy += p.acceleration.y * dt;
            p.x += p.vx * dt;
            p.y += p.vy * dt;
            p.rotation += p.spin * dt;
            p.scale = (p.scale + p.scale_speed * dt).max(0.0);
            p.age += dt;
        }

        self.particles.retain(|p| !p.is_dead());
        trace!(live = self.particles.len(), "simulation step");
    }

    fn spawn(&mut self, session: &EmissionSession, dt: f32) {
        if self.tracked != Some(session.id()) {
            self.tracked = Some(session.id());
            // Random phase so short bursts still emit a fraction of their rules
            let rng = &mut self.rng;
            self.accumulators = session.rules().iter().map(|_| rng.f32()).collect();
        }

        for (i, rule) in session.rules().iter().enumerate() {
            self.accumulators[i] += rule.birth_rate * session.birth_rate() * dt;
            let to_spawn = self.accumulators[i].floor();
            self.accumulators[i] -= to_spawn;

            for _ in 0..to_spawn as u32 {
                let particle = self.spawn_particle(session, rule);
                self.particles.push(particle);
            }
        }
    }

    /// Spawn a single particle on the session's source with randomized motion.
    fn spawn_particle(&mut self, session: &EmissionSession, rule: &ArchetypeRule) -> LiveParticle {
        let origin = session.position();
        let (x, y) = match session.shape() {
            EmitterShape::Line => {
                let half = session.size().width / 2.0;
                (origin.x + half * self.spread(), origin.y)
            }
            EmitterShape::Point => (origin.x, origin.y),
        };

        // The range is the full cone width
        let angle = rule.emission_longitude + rule.emission_range / 2.0 * self.spread();
        let direction = session.shape().direction(angle);
        let speed = rule.velocity + rule.velocity_range * self.spread();
        let scale = (1.0 + rule.scale_range * self.spread()).max(0.0);
        let spin = rule.spin + rule.spin_range * self.spread();

        LiveParticle {
            x,
            y,
            vx: direction.x * speed,
            vy: direction.y * speed,
            acceleration: rule.acceleration,
            rotation: 0.0,
            spin,
            scale,
            scale_speed: rule.scale_speed,
            age: 0.0,
            lifetime: rule.lifetime,
            color: rule.color,
            sprite: Arc::clone(rule.shape.image()),
        }
    }

    /// Uniform sample in [-1, 1].
    fn spread(&mut self) -> f32 {
        self.rng.f32() * 2.0 - 1.0
    }

    /// Render all live particles onto a transparent canvas.
    pub fn render(&self, width: u32, height: u32) -> RgbaImage {
        let mut canvas = RgbaImage::new(width, height);
        for p in &self.particles {
            blit_particle(&mut canvas, p);
        }
        canvas
    }

    /// Run the emitter and simulation in lockstep for `frame_count` frames at
    /// `fps`, rendering each frame at the emitter's bounds.
    pub fn generate_frames(
        &mut self,
        emitter: &mut ConfettiEmitter,
        frame_count: u32,
        fps: u32,
    ) -> Vec<RgbaImage> {
        let fps = fps.max(1);
        let dt = 1.0 / fps as f32;
        let tick = Duration::from_secs_f32(dt);
        let bounds = emitter.bounds();
        let (w, h) = (bounds.width().max(1.0) as u32, bounds.height().max(1.0) as u32);

        let mut frames = Vec::with_capacity(frame_count as usize);
        for _ in 0..frame_count {
            self.step(emitter, dt);
            frames.push(self.render(w, h));
            emitter.advance(tick);
        }
        frames
    }
}

/// Blit one particle's tinted, rotated and scaled sprite, centered on its position.
fn blit_particle(canvas: &mut RgbaImage, p: &LiveParticle) {
    if p.scale <= 0.0 {
        return;
    }

    let (sw, sh) = (p.sprite.width() as f32, p.sprite.height() as f32);
    // Bounding radius of the transformed sprite
    let radius = ((sw * sw + sh * sh).sqrt() / 2.0 * p.scale).ceil() as i32;
    let (cx, cy) = (p.x.round() as i32, p.y.round() as i32);
    let (cos, sin) = (p.rotation.cos(), p.rotation.sin());
    let (cw, ch) = (canvas.width() as i32, canvas.height() as i32);

    for dy in -radius..=radius {
        let ty = cy + dy;
        if ty < 0 || ty >= ch {
            continue;
        }
        for dx in -radius..=radius {
            let tx = cx + dx;
            if tx < 0 || tx >= cw {
                continue;
            }

            // Inverse-map the destination pixel into sprite space
            let (fx, fy) = (dx as f32 + 0.5, dy as f32 + 0.5);
            let sx = (fx * cos + fy * sin) / p.scale + sw / 2.0;
            let sy = (-fx * sin + fy * cos) / p.scale + sh / 2.0;
            if sx < 0.0 || sy < 0.0 || sx >= sw || sy >= sh {
                continue;
            }

            let src = *p.sprite.get_pixel(sx as u32, sy as u32);
            if src[3] == 0 {
                continue;
            }

            let tinted = Rgba([
                (src[0] as f32 * p.color.r).round() as u8,
                (src[1] as f32 * p.color.g).round() as u8,
                (src[2] as f32 * p.color.b).round() as u8,
                src[3],
            ]);
            let dst = *canvas.get_pixel(tx as u32, ty as u32);
            let alpha = src[3] as f32 / 255.0 * p.color.a;
            canvas.put_pixel(tx as u32, ty as u32, alpha_blend(&tinted, &dst, alpha));
        }
    }
}

/// Alpha-blend source over destination with modified source alpha.
fn alpha_blend(src: &Rgba<u8>, dst: &Rgba<u8>, src_alpha: f32) -> Rgba<u8> {
    let sa = src_alpha;
    let da = dst[3] as f32 / 255.0;

    // Standard "source over" compositing
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }

    let blend = |s: u8, d: u8| -> u8 {
        let sf = s as f32 / 255.0;
        let df = d as f32 / 255.0;
        let out = (sf * sa + df * da * (1.0 - sa)) / out_a;
        (out * 255.0).round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        blend(src[0], dst[0]),
        blend(src[1], dst[1]),
        blend(src[2], dst[2]),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ParticleKind;
    use crate::models::{EmissionConfiguration, Point, Rect};

    const DT: f32 = 1.0 / 30.0;

    fn emitter(width: f32, height: f32) -> ConfettiEmitter {
        ConfettiEmitter::with_seed(Rect::new(0.0, 0.0, width, height), 3)
    }

    fn run(sim: &mut Simulation, emitter: &mut ConfettiEmitter, steps: u32) {
        for _ in 0..steps {
            sim.step(emitter, DT);
            emitter.advance(Duration::from_secs_f32(DT));
        }
    }

    #[test]
    fn test_idle_emitter_spawns_nothing() {
        let e = emitter(64.0, 64.0);
        let mut sim = Simulation::new(1);
        sim.step(&e, 1.0);
        assert_eq!(sim.live_count(), 0);
    }

    #[test]
    fn test_line_spawn_rate() {
        let mut e = emitter(64.0, 64.0);
        e.set_configuration(EmissionConfiguration::default().with_birth_rate(8.0));
        e.set_palette(vec![Color::WHITE]);
        e.start_confetti();

        let mut sim = Simulation::new(1);
        // One second at one rule per shape: 8 / 8 per rule * 8 rules
        sim.step(&e, 1.0);
        assert_eq!(sim.live_count(), 8);
    }

    #[test]
    fn test_line_spawn_along_top_edge() {
        let mut e = emitter(100.0, 100.0);
        e.set_configuration(EmissionConfiguration::default().with_velocity(0.0, 0.0));
        e.start_confetti();

        let mut sim = Simulation::new(1);
        sim.spawn(e.session().unwrap(), 2.0);
        assert!(sim.live_count() > 0);
        for p in &sim.particles {
            assert!(p.x >= 0.0 && p.x <= 100.0);
            assert_eq!(p.y, 0.0);
        }
    }

    #[test]
    fn test_line_rain_only_moves_downward() {
        let mut e = emitter(100.0, 100.0);
        e.set_configuration(EmissionConfiguration::default().with_birth_rate(40.0));
        e.start_confetti();

        let mut sim = Simulation::new(4);
        sim.spawn(e.session().unwrap(), 2.0);
        assert!(sim.live_count() > 100);
        for p in &sim.particles {
            assert!(p.vy >= -1e-3, "rain particle heading up: vy = {}", p.vy);
        }
        // Spread covers both sides of straight down
        assert!(sim.particles.iter().any(|p| p.vx < -10.0));
        assert!(sim.particles.iter().any(|p| p.vx > 10.0));
    }

    #[test]
    fn test_burst_cone_is_narrow_and_upward() {
        let mut e = emitter(200.0, 200.0);
        e.set_configuration(
            EmissionConfiguration::default().with_birth_rate(40.0).with_velocity(100.0, 0.0),
        );
        e.start_confetti_at(Point::new(100.0, 150.0));

        let mut sim = Simulation::new(4);
        sim.spawn(e.session().unwrap(), 1.0);
        assert!(sim.live_count() > 0);
        // Half-angle π/16 around straight up
        let limit = (std::f32::consts::PI / 16.0).tan() + 1e-4;
        for p in &sim.particles {
            assert!(p.vy < 0.0);
            assert!(p.vx.abs() <= -p.vy * limit, "outside cone: ({}, {})", p.vx, p.vy);
        }
    }

    #[test]
    fn test_stop_halts_spawning_but_keeps_particles() {
        let mut e = emitter(64.0, 64.0);
        e.start_confetti();
        let mut sim = Simulation::new(1);
        run(&mut sim, &mut e, 30);
        let before = sim.live_count();
        assert!(before > 0);

        e.stop_confetti();
        sim.step(&e, DT);
        assert!(sim.live_count() <= before);
        assert!(sim.live_count() > 0);
    }

    #[test]
    fn test_burst_stops_spawning_after_suppression() {
        let mut e = emitter(200.0, 200.0);
        e.start_confetti_at(Point::new(100.0, 150.0));
        let mut sim = Simulation::new(1);

        run(&mut sim, &mut e, 6);
        let after_burst = sim.live_count();
        assert!(after_burst > 0);
        assert_eq!(e.session().unwrap().birth_rate(), 0.0);

        run(&mut sim, &mut e, 30);
        assert!(sim.live_count() <= after_burst);
    }

    #[test]
    fn test_gravity_bends_burst_downward() {
        let mut e = emitter(400.0, 400.0);
        e.set_kind(ParticleKind::image(RgbaImage::from_pixel(1, 1, Rgba([255; 4]))));
        e.set_palette(vec![Color::WHITE]);
        e.set_configuration(
            EmissionConfiguration::default().with_birth_rate(300.0).with_velocity(100.0, 0.0),
        );
        e.start_confetti_at(Point::new(200.0, 300.0));

        let mut sim = Simulation::new(1);
        sim.step(&e, 0.01);
        let start = sim.particles[0].vy;
        assert!(start < 0.0, "burst should start upward");

        // vy grows by 50 per second
        for _ in 0..100 {
            sim.step(&e, 0.05);
        }
        assert!(sim.particles[0].vy > start + 200.0);
    }

    #[test]
    fn test_particles_retire_after_lifetime() {
        let mut e = emitter(64.0, 64.0);
        e.set_configuration(EmissionConfiguration::default().with_lifetime(0.5));
        e.start_confetti();
        let mut sim = Simulation::new(1);
        run(&mut sim, &mut e, 5);
        e.stop_confetti();
        run(&mut sim, &mut e, 30);
        assert_eq!(sim.live_count(), 0);
        assert!(sim.centroid().is_none());
    }

    #[test]
    fn test_render_tints_sprite() {
        let mut e = emitter(16.0, 16.0);
        e.set_kind(ParticleKind::image(RgbaImage::from_pixel(2, 2, Rgba([255; 4]))));
        e.set_palette(vec![Color::rgb(1.0, 0.0, 0.0)]);
        e.set_configuration(
            EmissionConfiguration::default()
                .with_birth_rate(1.0)
                .with_velocity(0.0, 0.0)
                .with_spin(0.0, 0.0)
                .with_scale(0.0, 0.0),
        );
        e.start_confetti_at(Point::new(8.0, 8.0));

        // Spawn without integrating so gravity doesn't move the particles
        let mut sim = Simulation::new(1);
        sim.spawn(e.session().unwrap(), 1.0);
        assert_eq!(sim.live_count(), 3);

        let frame = sim.render(16, 16);
        let px = frame.get_pixel(8, 8);
        assert_eq!(px[0], 255);
        assert_eq!(px[1], 0);
        assert!(px[3] > 0);
        assert_eq!(frame.get_pixel(0, 0)[3], 0);
    }

    #[test]
    fn test_generate_frames_size_and_count() {
        let mut e = emitter(48.0, 32.0);
        e.start_confetti();
        let frames = Simulation::new(1).generate_frames(&mut e, 4, 30);
        assert_eq!(frames.len(), 4);
        assert_eq!(frames[0].dimensions(), (48, 32));
    }

    #[test]
    fn test_deterministic_with_seed() {
        let render = || {
            let mut e = emitter(64.0, 64.0);
            e.start_confetti();
            Simulation::new(9).generate_frames(&mut e, 8, 30)
        };
        assert_eq!(render(), render());
    }

    #[test]
    fn test_alpha_blend() {
        let result = alpha_blend(&Rgba([255, 0, 0, 255]), &Rgba([0, 0, 0, 0]), 1.0);
        assert_eq!(result, Rgba([255, 0, 0, 255]));

        let result = alpha_blend(&Rgba([255, 0, 0, 255]), &Rgba([0, 0, 255, 255]), 0.5);
        assert!(result[0] > 100);
        assert!(result[2] > 100);
        assert_eq!(result[3], 255);
    }
}
