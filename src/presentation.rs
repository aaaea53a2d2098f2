//! Presentation helpers built on top of [`ConfettiEmitter`].
//!
//! - [`TimedShow`]: a one-shot overlay that emits for a while, fades out,
//!   stops and detaches itself.
//! - [`ConfettiBinding`]: adapts a boolean "is active" flag into start/stop
//!   calls, with an optional auto-off duration.
//!
//! Both are driven from the host frame loop through `advance`, the same way
//! the emitter is.

use std::fmt;
use std::time::Duration;

use tracing::debug;

use crate::catalog::ParticleKind;
use crate::color::Color;
use crate::emitter::ConfettiEmitter;
use crate::models::{EmissionConfiguration, Point, Rect, Size, UnitPoint};

/// Default time a [`TimedShow`] emits before fading.
pub const DEFAULT_SHOW_DURATION: Duration = Duration::from_secs(3);

/// Length of the fade-out at the end of a [`TimedShow`].
pub const FADE_DURATION: Duration = Duration::from_millis(600);

/// Callback run once a [`TimedShow`] has finished and detached.
pub type CompletionHandler = Box<dyn FnOnce() + Send>;

/// How a [`TimedShow`] starts its emitter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShowOrigin {
    /// Rain from the top edge
    Rain,
    /// Burst from a point in the overlay's coordinates
    At(Point),
    /// Burst from the center of a rect in the host's coordinates
    From(Rect),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowPhase {
    Showing,
    Fading,
    Finished,
}

/// A self-dismissing confetti overlay.
///
/// The overlay covers the host bounds, emits for `duration`, fades its
/// opacity to zero over [`FADE_DURATION`], then stops the emitter, detaches
/// and runs the completion handler exactly once.
pub struct TimedShow {
    emitter: ConfettiEmitter,
    duration: Duration,
    elapsed: Duration,
    phase: ShowPhase,
    blocks_input: bool,
    on_complete: Option<CompletionHandler>,
}

impl fmt::Debug for TimedShow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimedShow")
            .field("emitter", &self.emitter)
            .field("duration", &self.duration)
            .field("elapsed", &self.elapsed)
            .field("phase", &self.phase)
            .field("blocks_input", &self.blocks_input)
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

impl TimedShow {
    /// Builder for a show covering `host_bounds`.
    pub fn builder(host_bounds: Rect) -> TimedShowBuilder {
        TimedShowBuilder {
            host_bounds,
            origin: ShowOrigin::Rain,
            kind: ParticleKind::Confetti,
            duration: DEFAULT_SHOW_DURATION,
            blocks_input: true,
            seed: None,
            on_complete: None,
        }
    }

    pub fn emitter(&self) -> &ConfettiEmitter {
        &self.emitter
    }

    pub fn phase(&self) -> ShowPhase {
        self.phase
    }

    /// Whether the overlay is still part of the host.
    pub fn is_attached(&self) -> bool {
        self.phase != ShowPhase::Finished
    }

    /// Whether the host should route pointer input to the overlay instead of
    /// the content beneath it.
    pub fn blocks_input(&self) -> bool {
        self.blocks_input && self.is_attached()
    }

    /// Overlay opacity: 1 while showing, linear to 0 while fading.
    pub fn opacity(&self) -> f32 {
        match self.phase {
            ShowPhase::Showing => 1.0,
            ShowPhase::Fading => {
                let into_fade = self.elapsed.saturating_sub(self.duration);
                1.0 - (into_fade.as_secs_f32() / FADE_DURATION.as_secs_f32()).min(1.0)
            }
            ShowPhase::Finished => 0.0,
        }
    }

    /// Advance the overlay and its emitter.
    pub fn advance(&mut self, dt: Duration) {
        if self.phase == ShowPhase::Finished {
            return;
        }

        self.emitter.advance(dt);
        self.elapsed += dt;

        if self.phase == ShowPhase::Showing && self.elapsed >= self.duration {
            self.phase = ShowPhase::Fading;
            debug!(elapsed_ms = self.elapsed.as_millis() as u64, "timed show fading");
        }

        if self.phase == ShowPhase::Fading && self.elapsed >= self.duration + FADE_DURATION {
            self.emitter.stop_confetti();
            self.phase = ShowPhase::Finished;
            debug!("timed show detached");
            if let Some(on_complete) = self.on_complete.take() {
                on_complete();
            }
        }
    }
}

/// Options for a [`TimedShow`].
pub struct TimedShowBuilder {
    host_bounds: Rect,
    origin: ShowOrigin,
    kind: ParticleKind,
    duration: Duration,
    blocks_input: bool,
    seed: Option<u64>,
    on_complete: Option<CompletionHandler>,
}

impl TimedShowBuilder {
    pub fn origin(mut self, origin: ShowOrigin) -> Self {
        self.origin = origin;
        self
    }

    pub fn kind(mut self, kind: ParticleKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn blocks_input(mut self, blocks_input: bool) -> Self {
        self.blocks_input = blocks_input;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn on_complete(mut self, handler: impl FnOnce() + Send + 'static) -> Self {
        self.on_complete = Some(Box::new(handler));
        self
    }

    /// Create the overlay and start emitting immediately.
    pub fn show(self) -> TimedShow {
        // The overlay fills the host, so host and overlay share coordinates
        let frame = Rect::from_size(self.host_bounds.size);
        let mut emitter = match self.seed {
            Some(seed) => ConfettiEmitter::with_seed(frame, seed),
            None => ConfettiEmitter::new(frame),
        };
        emitter.set_kind(self.kind);

        match self.origin {
            ShowOrigin::Rain => emitter.start_confetti(),
            ShowOrigin::At(point) => emitter.start_confetti_at(point),
            ShowOrigin::From(source) => emitter.start_confetti_from(source),
        }

        TimedShow {
            emitter,
            duration: self.duration,
            elapsed: Duration::ZERO,
            phase: ShowPhase::Showing,
            blocks_input: self.blocks_input,
            on_complete: self.on_complete,
        }
    }
}

/// Drives an emitter from a boolean flag.
///
/// Every [`sync`](ConfettiBinding::sync) re-applies kind, palette and
/// configuration, then starts the emitter when the flag is on but the emitter
/// is idle, or stops it when the flag is off but the emitter is active.
#[derive(Debug)]
pub struct ConfettiBinding {
    emitter: ConfettiEmitter,
    is_active: bool,
    kind: ParticleKind,
    palette: Option<Vec<Color>>,
    configuration: EmissionConfiguration,
    source: Option<UnitPoint>,
    duration: Option<Duration>,
    /// Time left before the flag is switched off automatically
    remaining: Option<Duration>,
}

impl ConfettiBinding {
    pub fn new(size: Size) -> Self {
        Self::with_emitter(ConfettiEmitter::new(Rect::from_size(size)))
    }

    pub fn with_emitter(emitter: ConfettiEmitter) -> Self {
        Self {
            emitter,
            is_active: false,
            kind: ParticleKind::Confetti,
            palette: None,
            configuration: EmissionConfiguration::default(),
            source: None,
            duration: None,
            remaining: None,
        }
    }

    pub fn kind(mut self, kind: ParticleKind) -> Self {
        self.kind = kind;
        self
    }

    /// Custom palette; `None` keeps the emitter's current palette.
    pub fn palette(mut self, palette: Option<Vec<Color>>) -> Self {
        self.palette = palette;
        self
    }

    pub fn configuration(mut self, configuration: EmissionConfiguration) -> Self {
        self.configuration = configuration;
        self
    }

    /// Burst from a normalized point instead of raining from the top.
    pub fn source(mut self, source: Option<UnitPoint>) -> Self {
        self.source = source;
        self
    }

    /// Switch the flag off automatically this long after it is switched on.
    pub fn duration(mut self, duration: Option<Duration>) -> Self {
        self.duration = duration;
        self
    }

    pub fn emitter(&self) -> &ConfettiEmitter {
        &self.emitter
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Change the bound flag. Any pending auto-off is cancelled and, when the
    /// flag turns on with a duration configured, a fresh one begins.
    pub fn set_active(&mut self, is_active: bool) {
        if is_active == self.is_active {
            return;
        }
        self.is_active = is_active;
        self.remaining = if is_active { self.duration } else { None };
        self.sync();
    }

    /// Forward a container resize to the emitter.
    pub fn resize(&mut self, size: Size) {
        self.emitter.resize(size);
        self.sync();
    }

    /// Advance the auto-off countdown and the emitter clock.
    pub fn advance(&mut self, dt: Duration) {
        self.emitter.advance(dt);

        if let Some(remaining) = self.remaining {
            if remaining <= dt {
                debug!("binding auto-duration elapsed");
                self.remaining = None;
                self.is_active = false;
                self.sync();
            } else {
                self.remaining = Some(remaining - dt);
            }
        }
    }

    /// Reconcile the emitter with the current flag and options.
    pub fn sync(&mut self) {
        self.emitter.set_kind(self.kind.clone());
        self.emitter.set_configuration(self.configuration);
        if let Some(palette) = &self.palette {
            self.emitter.set_palette(palette.clone());
        }

        if self.is_active && !self.emitter.is_active() {
            match self.source {
                Some(unit) => {
                    let point = unit.resolve(self.emitter.bounds().size);
                    self.emitter.start_confetti_at(point);
                }
                None => self.emitter.start_confetti(),
            }
        } else if !self.is_active && self.emitter.is_active() {
            self.emitter.stop_confetti();
        }
    }
}
