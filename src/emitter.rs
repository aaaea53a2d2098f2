//! The confetti emitter controller.
//!
//! A [`ConfettiEmitter`] owns at most one live [`EmissionSession`]. Every
//! `start_*` call releases the previous session (and its pending timers)
//! before installing a new one, so repeated starts never stack sources.
//!
//! # Lifecycle
//!
//! ```text
//! Idle --start--> Active(mode) --stop--> Stopped --start--> Active(mode)
//! ```
//!
//! A point-mode start schedules a one-shot suppression 100 ms later that
//! zeroes the session's birth rate without clearing `is_active`. The result
//! is a single burst whose particles finish their lifetime naturally.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use confetti::emitter::ConfettiEmitter;
//! use confetti::models::{Point, Rect};
//!
//! let mut emitter = ConfettiEmitter::new(Rect::new(0.0, 0.0, 320.0, 480.0));
//! emitter.start_confetti_at(Point::new(160.0, 400.0));
//! assert!(emitter.is_active());
//!
//! emitter.advance(Duration::from_millis(100));
//! assert_eq!(emitter.session().unwrap().birth_rate(), 0.0);
//! assert!(emitter.is_active());
//! ```

use std::time::Duration;

use tracing::debug;

use crate::catalog::{shapes_for, ParticleKind};
use crate::color::Color;
use crate::models::{EmissionConfiguration, EmissionMode, Point, Rect, Size, Vector};
use crate::palettes::default_palette;
use crate::rules::{build_rules, ArchetypeRule};
use crate::schedule::{Scheduler, SessionId};

/// Delay after a point-mode start before emission is suppressed.
pub const BURST_SUPPRESS_DELAY: Duration = Duration::from_millis(100);

/// Geometry of the emission source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitterShape {
    Line,
    Point,
}

impl EmitterShape {
    /// Unit direction for an emission angle measured in this source's frame.
    ///
    /// A point source measures from +x in y-down coordinates, so -π/2 is up.
    /// A line source measures from its outward normal, so π points into the
    /// container (down) and any angle in [π/2, 3π/2] moves downward.
    pub fn direction(self, angle: f32) -> Vector {
        match self {
            EmitterShape::Point => Vector::new(angle.cos(), angle.sin()),
            EmitterShape::Line => Vector::new(angle.sin(), -angle.cos()),
        }
    }
}

/// Observable controller state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EmitterState {
    Idle,
    Active(EmissionMode),
    /// A session exists but was stopped; emitted particles may still be decaying
    Stopped,
}

/// The installed set of rules plus source geometry.
#[derive(Debug, Clone)]
pub struct EmissionSession {
    id: SessionId,
    mode: EmissionMode,
    shape: EmitterShape,
    position: Point,
    size: Size,
    rules: Vec<ArchetypeRule>,
    birth_rate: f32,
}

impl EmissionSession {
    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn mode(&self) -> EmissionMode {
        self.mode
    }

    pub fn shape(&self) -> EmitterShape {
        self.shape
    }

    /// Source position in the emitter's local coordinates.
    pub fn position(&self) -> Point {
        self.position
    }

    /// Source extent; a line source is `bounds.width × 1`, a point source is zero.
    pub fn size(&self) -> Size {
        self.size
    }

    pub fn rules(&self) -> &[ArchetypeRule] {
        &self.rules
    }

    /// Session-wide multiplier on every rule's birth rate (1 while emitting).
    pub fn birth_rate(&self) -> f32 {
        self.birth_rate
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerAction {
    SuppressBirth,
}

/// Drives a single confetti emission inside a container.
#[derive(Debug)]
pub struct ConfettiEmitter {
    /// Container rect in its parent's coordinate space
    frame: Rect,
    palette: Vec<Color>,
    kind: ParticleKind,
    configuration: EmissionConfiguration,
    mode: EmissionMode,
    session: Option<EmissionSession>,
    is_active: bool,
    next_session: u64,
    scheduler: Scheduler<TimerAction>,
    rng: fastrand::Rng,
}

impl ConfettiEmitter {
    /// Create an idle emitter with the default palette, kind and configuration.
    pub fn new(frame: Rect) -> Self {
        Self::with_rng(frame, fastrand::Rng::new())
    }

    /// Like [`ConfettiEmitter::new`], with reproducible per-rule alpha sampling.
    pub fn with_seed(frame: Rect, seed: u64) -> Self {
        Self::with_rng(frame, fastrand::Rng::with_seed(seed))
    }

    fn with_rng(frame: Rect, rng: fastrand::Rng) -> Self {
        Self {
            frame,
            palette: default_palette(),
            kind: ParticleKind::default(),
            configuration: EmissionConfiguration::default(),
            mode: EmissionMode::Line,
            session: None,
            is_active: false,
            next_session: 0,
            scheduler: Scheduler::new(),
            rng,
        }
    }

    // ------------------------------------------------------------------
    // Configuration (applied at the next start)
    // ------------------------------------------------------------------

    pub fn palette(&self) -> &[Color] {
        &self.palette
    }

    pub fn set_palette(&mut self, palette: Vec<Color>) {
        self.palette = palette;
    }

    pub fn kind(&self) -> &ParticleKind {
        &self.kind
    }

    pub fn set_kind(&mut self, kind: ParticleKind) {
        self.kind = kind;
    }

    pub fn configuration(&self) -> &EmissionConfiguration {
        &self.configuration
    }

    pub fn set_configuration(&mut self, configuration: EmissionConfiguration) {
        self.configuration = configuration;
    }

    /// Set palette, kind and configuration together.
    pub fn configure(
        &mut self,
        palette: Vec<Color>,
        kind: ParticleKind,
        configuration: EmissionConfiguration,
    ) {
        self.palette = palette;
        self.kind = kind;
        self.configuration = configuration;
    }

    // ------------------------------------------------------------------
    // Geometry
    // ------------------------------------------------------------------

    pub fn frame(&self) -> Rect {
        self.frame
    }

    /// The container in its own coordinate space.
    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.frame.size)
    }

    /// Move or resize the container and re-run layout.
    pub fn set_frame(&mut self, frame: Rect) {
        self.frame = frame;
        self.layout();
    }

    /// Resize in place, keeping the frame origin.
    pub fn resize(&mut self, size: Size) {
        self.set_frame(Rect { origin: self.frame.origin, size });
    }

    /// Layout hook; the host calls this whenever the container bounds change.
    ///
    /// Line sources follow the top edge. Point sources keep the origin they
    /// were started with.
    pub fn layout(&mut self) {
        let bounds = self.bounds();
        let Some(session) = self.session.as_mut() else {
            return;
        };

        match session.mode {
            EmissionMode::Line => {
                session.position = Point::new(bounds.mid_x(), 0.0);
                session.size = Size::new(bounds.width(), 1.0);
                debug!(
                    session = session.id.0,
                    x = session.position.x,
                    width = session.size.width,
                    "line source re-laid out"
                );
            }
            EmissionMode::Point { .. } => {}
        }
    }

    /// Convert a point from the parent's coordinate space into local coordinates.
    pub fn convert_from_parent(&self, point: Point) -> Point {
        Point::new(point.x - self.frame.origin.x, point.y - self.frame.origin.y)
    }

    // ------------------------------------------------------------------
    // Control surface
    // ------------------------------------------------------------------

    /// Rain confetti from the top edge.
    pub fn start_confetti(&mut self) {
        self.install(EmissionMode::Line);
    }

    /// Burst confetti upward from `point` (local coordinates).
    pub fn start_confetti_at(&mut self, point: Point) {
        self.install(EmissionMode::Point { origin: point });
    }

    /// Burst confetti from the center of `source`, a rect in the parent's
    /// coordinate space.
    pub fn start_confetti_from(&mut self, source: Rect) {
        let point = self.convert_from_parent(source.center());
        self.start_confetti_at(point);
    }

    /// Stop emitting. Already-emitted particles keep decaying on their own.
    /// A no-op when nothing was started.
    pub fn stop_confetti(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.birth_rate = 0.0;
            debug!(session = session.id.0, "emission stopped");
        }
        self.is_active = false;
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn session(&self) -> Option<&EmissionSession> {
        self.session.as_ref()
    }

    /// Mode of the most recent start.
    pub fn mode(&self) -> EmissionMode {
        self.mode
    }

    /// Number of live emission sources; always zero or one.
    pub fn installed_sources(&self) -> usize {
        usize::from(self.session.is_some())
    }

    pub fn state(&self) -> EmitterState {
        match (&self.session, self.is_active) {
            (None, _) => EmitterState::Idle,
            (Some(session), true) => EmitterState::Active(session.mode),
            (Some(_), false) => EmitterState::Stopped,
        }
    }

    /// Time elapsed on the emitter's clock.
    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    /// Advance the emitter clock, firing any delayed actions that came due.
    pub fn advance(&mut self, elapsed: Duration) {
        for (owner, action) in self.scheduler.advance(elapsed) {
            let Some(session) = self.session.as_mut().filter(|s| s.id == owner) else {
                // Belongs to a replaced session
                continue;
            };
            match action {
                TimerAction::SuppressBirth => {
                    session.birth_rate = 0.0;
                    debug!(session = session.id.0, "burst suppressed");
                }
            }
        }
    }

    fn install(&mut self, mode: EmissionMode) {
        if let Some(old) = self.session.take() {
            let cancelled = self.scheduler.cancel_session(old.id);
            debug!(session = old.id.0, cancelled, "emission session released");
        }

        let id = SessionId(self.next_session);
        self.next_session += 1;

        let shapes = shapes_for(&self.kind);
        let rules =
            build_rules(&self.palette, &shapes, &self.configuration, &mode, &mut self.rng);

        let bounds = self.bounds();
        let (shape, position, size) = match mode {
            EmissionMode::Line => (
                EmitterShape::Line,
                Point::new(bounds.mid_x(), 0.0),
                Size::new(bounds.width(), 1.0),
            ),
            EmissionMode::Point { origin } => (EmitterShape::Point, origin, Size::ZERO),
        };

        debug!(
            session = id.0,
            ?mode,
            rules = rules.len(),
            x = position.x,
            y = position.y,
            "emission session installed"
        );

        self.session =
            Some(EmissionSession { id, mode, shape, position, size, rules, birth_rate: 1.0 });
        self.mode = mode;
        self.is_active = true;

        if mode.is_point() {
            self.scheduler.schedule(BURST_SUPPRESS_DELAY, id, TimerAction::SuppressBirth);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    fn emitter() -> ConfettiEmitter {
        ConfettiEmitter::with_seed(Rect::new(0.0, 0.0, 320.0, 480.0), 1)
    }

    fn close(v: Vector, x: f32, y: f32) -> bool {
        (v.x - x).abs() < 1e-5 && (v.y - y).abs() < 1e-5
    }

    #[test]
    fn test_shape_direction_frames() {
        use std::f32::consts::{FRAC_PI_2, PI};

        assert!(close(EmitterShape::Line.direction(PI), 0.0, 1.0));
        assert!(close(EmitterShape::Line.direction(FRAC_PI_2), 1.0, 0.0));
        assert!(close(EmitterShape::Line.direction(3.0 * FRAC_PI_2), -1.0, 0.0));
        assert!(close(EmitterShape::Point.direction(-FRAC_PI_2), 0.0, -1.0));
        assert!(close(EmitterShape::Point.direction(0.0), 1.0, 0.0));
    }

    #[test]
    fn test_new_is_idle() {
        let e = emitter();
        assert!(!e.is_active());
        assert_eq!(e.state(), EmitterState::Idle);
        assert_eq!(e.installed_sources(), 0);
        assert_eq!(e.palette().len(), 7);
    }

    #[test]
    fn test_start_line_geometry() {
        let mut e = emitter();
        e.start_confetti();

        let session = e.session().unwrap();
        assert_eq!(session.shape(), EmitterShape::Line);
        assert_eq!(session.position(), Point::new(160.0, 0.0));
        assert_eq!(session.size(), Size::new(320.0, 1.0));
        assert_eq!(session.rules().len(), 7 * 8);
        assert_eq!(session.birth_rate(), 1.0);
        assert_eq!(e.state(), EmitterState::Active(EmissionMode::Line));
    }

    #[test]
    fn test_start_point_geometry() {
        let mut e = emitter();
        e.start_confetti_at(Point::new(160.0, 400.0));

        let session = e.session().unwrap();
        assert_eq!(session.shape(), EmitterShape::Point);
        assert_eq!(session.position(), Point::new(160.0, 400.0));
        assert_eq!(session.size(), Size::ZERO);
        assert!(e.mode().is_point());
    }

    #[test]
    fn test_repeated_start_replaces_session() {
        let mut e = emitter();
        e.start_confetti();
        let first = e.session().unwrap().id();
        e.start_confetti();
        e.start_confetti();

        assert_eq!(e.installed_sources(), 1);
        assert_ne!(e.session().unwrap().id(), first);
        assert_eq!(e.session().unwrap().rules().len(), 56);
    }

    #[test]
    fn test_stop_zeroes_birth_rate() {
        let mut e = emitter();
        e.start_confetti();
        e.stop_confetti();

        assert!(!e.is_active());
        assert_eq!(e.session().unwrap().birth_rate(), 0.0);
        assert_eq!(e.state(), EmitterState::Stopped);
    }

    #[test]
    fn test_stop_without_start() {
        let mut e = emitter();
        e.stop_confetti();
        assert!(!e.is_active());
        assert_eq!(e.state(), EmitterState::Idle);
    }

    #[test]
    fn test_burst_suppression_keeps_active() {
        let mut e = emitter();
        e.start_confetti_at(Point::new(10.0, 10.0));

        e.advance(Duration::from_millis(99));
        assert_eq!(e.session().unwrap().birth_rate(), 1.0);

        e.advance(Duration::from_millis(1));
        assert_eq!(e.session().unwrap().birth_rate(), 0.0);
        assert!(e.is_active());
    }

    #[test]
    fn test_line_mode_is_never_suppressed() {
        let mut e = emitter();
        e.start_confetti();
        e.advance(Duration::from_secs(5));
        assert_eq!(e.session().unwrap().birth_rate(), 1.0);
    }

    #[test]
    fn test_restart_cancels_stale_suppression() {
        let mut e = emitter();
        e.start_confetti_at(Point::new(10.0, 10.0));
        e.advance(Duration::from_millis(50));
        e.start_confetti();

        e.advance(Duration::from_millis(200));
        assert_eq!(e.session().unwrap().birth_rate(), 1.0);
    }

    #[test]
    fn test_second_burst_gets_its_own_full_delay() {
        let mut e = emitter();
        e.start_confetti_at(Point::new(10.0, 10.0));
        e.advance(Duration::from_millis(80));
        e.start_confetti_at(Point::new(20.0, 20.0));

        // The first burst's deadline passes without touching the new session
        e.advance(Duration::from_millis(30));
        assert_eq!(e.session().unwrap().birth_rate(), 1.0);

        e.advance(Duration::from_millis(70));
        assert_eq!(e.session().unwrap().birth_rate(), 0.0);
    }

    #[test]
    fn test_layout_line_follows_bounds() {
        let mut e = emitter();
        e.start_confetti();
        e.resize(Size::new(640.0, 960.0));

        let session = e.session().unwrap();
        assert_eq!(session.position().x, 320.0);
        assert_eq!(session.size().width, 640.0);
    }

    #[test]
    fn test_layout_point_keeps_origin() {
        let mut e = emitter();
        e.start_confetti_at(Point::new(100.0, 200.0));
        e.resize(Size::new(640.0, 960.0));
        assert_eq!(e.session().unwrap().position(), Point::new(100.0, 200.0));
    }

    #[test]
    fn test_layout_without_session() {
        let mut e = emitter();
        e.resize(Size::new(10.0, 10.0));
        assert!(e.session().is_none());
        assert_eq!(e.bounds(), Rect::new(0.0, 0.0, 10.0, 10.0));
    }

    #[test]
    fn test_start_from_converts_coordinates() {
        let mut e = ConfettiEmitter::with_seed(Rect::new(20.0, 40.0, 300.0, 400.0), 1);
        e.start_confetti_from(Rect::new(100.0, 100.0, 40.0, 20.0));
        // Center (120, 110) in parent space, minus frame origin
        assert_eq!(e.session().unwrap().position(), Point::new(100.0, 70.0));
    }

    #[test]
    fn test_configuration_applies_at_next_start() {
        let mut e = emitter();
        e.start_confetti();
        e.configure(
            vec![Color::WHITE],
            ParticleKind::image(RgbaImage::new(2, 2)),
            EmissionConfiguration::default().with_birth_rate(2.0),
        );
        assert_eq!(e.session().unwrap().rules().len(), 56);

        e.start_confetti();
        let rules = e.session().unwrap().rules();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].birth_rate, 2.0);
    }

    #[test]
    fn test_custom_palette_size() {
        let mut e = emitter();
        e.set_palette(vec![Color::WHITE, Color::rgb(1.0, 0.0, 0.0)]);
        assert_eq!(e.palette().len(), 2);
        e.start_confetti();
        assert_eq!(e.session().unwrap().rules().len(), 16);
    }
}
