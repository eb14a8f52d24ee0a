//! Interactive slicing of a two-parameter diagram.
//!
//! The controller owns every plotted artifact. Slider changes and animation
//! ticks both end up in [`SliceController::apply`], and the [`Mode`] decides
//! which of the two is allowed to get there.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::config::AnimationConfig;
use crate::engine::HistoryWindow;
use crate::grid::Field;

/// Maps a control value in `[min, max]` onto `[0, grid_size)`.
///
/// Out-of-range values are clamped. A zero-width range maps to 0.
pub fn slice_index(value: f64, min: f64, max: f64, grid_size: usize) -> usize {
    if grid_size == 0 {
        return 0;
    }
    let span = max - min;
    if span == 0.0 || !span.is_finite() || !value.is_finite() {
        return 0;
    }
    let raw = (grid_size as f64 * (value - min) / span).round();
    raw.clamp(0.0, (grid_size - 1) as f64) as usize
}

/// Grid index shown at animation frame `frame` of `frames`.
pub fn frame_index(frame: usize, frames: usize, grid_size: usize) -> usize {
    if grid_size == 0 || frames == 0 {
        return 0;
    }
    (grid_size * frame / frames).min(grid_size - 1)
}

/// Points of one history snapshot for one variable, at the current slice.
#[derive(Clone, Debug, Default)]
pub struct Artifact {
    pub variable: usize,
    pub snapshot: usize,
    xs: Vec<f64>,
    ys: Vec<f64>,
    zs: Vec<f64>,
}

impl Artifact {
    pub fn new(variable: usize, snapshot: usize) -> Self {
        Artifact { variable, snapshot, ..Default::default() }
    }

    pub fn set_data(&mut self, x: &Field, y: &Field, col: usize) {
        x.column_into(col, &mut self.xs);
        y.column_into(col, &mut self.ys);
    }

    pub fn set_3d_properties(&mut self, z: &Field, col: usize) {
        z.column_into(col, &mut self.zs);
    }

    pub fn points(&self) -> impl Iterator<Item = [f64; 3]> + '_ {
        self.xs
            .iter()
            .zip(&self.ys)
            .zip(&self.zs)
            .map(|((&x, &y), &z)| [x, y, z])
    }

    pub fn zs(&self) -> &[f64] {
        &self.zs
    }
}

/// Vertical slider over the first parameter's range.
#[derive(Clone, Debug)]
pub struct Slider {
    pub label: String,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    value: f64,
}

impl Slider {
    pub fn new(label: &str, min: f64, max: f64, initial: f64, step: f64) -> Self {
        let mut slider = Slider { label: label.to_string(), min, max, step, value: min };
        slider.set(initial);
        slider
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Snaps to the step grid and clamps to the range. Returns the stored value.
    pub fn set(&mut self, value: f64) -> f64 {
        let (lo, hi) = if self.min <= self.max { (self.min, self.max) } else { (self.max, self.min) };
        let snapped = if self.step > 0.0 {
            self.min + ((value - self.min) / self.step).round() * self.step
        } else {
            value
        };
        self.value = snapped.clamp(lo, hi);
        self.value
    }

    /// Position of the value within the range, 0 at `min`.
    pub fn fraction(&self) -> f64 {
        let span = self.max - self.min;
        if span == 0.0 { 0.0 } else { ((self.value - self.min) / span).clamp(0.0, 1.0) }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimationState {
    Unstarted,
    Running { frame: usize },
    Paused { frame: usize },
}

/// Timer-driven sweep, created lazily on first start and resumed afterwards.
#[derive(Clone, Debug)]
pub struct AnimationController {
    state: AnimationState,
    frames: usize,
    interval: Duration,
    next_tick: Option<Instant>,
}

impl AnimationController {
    pub fn new(config: &AnimationConfig) -> Self {
        AnimationController {
            state: AnimationState::Unstarted,
            frames: config.frames.max(1),
            interval: config.interval(),
            next_tick: None,
        }
    }

    pub fn state(&self) -> AnimationState {
        self.state
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Returns true when this is the first start and the plot must be reset.
    fn start(&mut self, now: Instant) -> bool {
        let (frame, fresh) = match self.state {
            AnimationState::Unstarted => (0, true),
            AnimationState::Paused { frame } => (frame, false),
            AnimationState::Running { frame } => (frame, false),
        };
        self.state = AnimationState::Running { frame };
        // first frame fires immediately after a reset
        self.next_tick = Some(if fresh { now } else { now + self.interval });
        fresh
    }

    fn pause(&mut self) {
        if let AnimationState::Running { frame } = self.state {
            self.state = AnimationState::Paused { frame };
        }
        self.next_tick = None;
    }

    /// Frame to draw if the timer has fired. The sweep wraps around.
    fn poll(&mut self, now: Instant) -> Option<usize> {
        let AnimationState::Running { frame } = self.state else {
            return None;
        };
        let due = self.next_tick?;
        if now < due {
            return None;
        }
        self.state = AnimationState::Running { frame: (frame + 1) % self.frames };
        // skip missed ticks instead of bursting through them
        let late = now.duration_since(due);
        let next = if late >= self.interval { now } else { due };
        self.next_tick = Some(next + self.interval);
        Some(frame)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Idle,
    Animating,
}

pub struct SliceController {
    x: Field,
    y: Field,
    history: HistoryWindow,
    artifacts: Vec<Artifact>,
    slider: Slider,
    mode: Mode,
    animation: AnimationController,
    index: usize,
    mutations: u64,
}

impl SliceController {
    /// Takes ownership of the artifacts and draws them at `initial_index`.
    pub fn new(
        x: Field,
        y: Field,
        history: HistoryWindow,
        artifacts: Vec<Artifact>,
        slider: Slider,
        animation: &AnimationConfig,
        initial_index: usize,
    ) -> Self {
        let mut controller = SliceController {
            x,
            y,
            history,
            artifacts,
            slider,
            mode: Mode::Idle,
            animation: AnimationController::new(animation),
            index: initial_index,
            mutations: 0,
        };
        controller.apply(initial_index);
        controller.mutations = 0;
        controller
    }

    pub fn grid_size(&self) -> usize {
        self.x.cols()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn animation_state(&self) -> AnimationState {
        self.animation.state()
    }

    pub fn slider(&self) -> &Slider {
        &self.slider
    }

    pub fn artifacts(&self) -> &[Artifact] {
        &self.artifacts
    }

    /// Slice currently drawn.
    pub fn current_index(&self) -> usize {
        self.index
    }

    /// Number of artifact updates since construction.
    pub fn mutation_count(&self) -> u64 {
        self.mutations
    }

    /// Slider moved. Redraws only while idle; the widget itself always moves.
    pub fn slider_changed(&mut self, value: f64) -> bool {
        let value = self.slider.set(value);
        if self.mode != Mode::Idle {
            return false;
        }
        let (min, max) = (self.x.first(), self.x.get(0, self.x.cols() - 1));
        let index = slice_index(value, min, max, self.grid_size());
        self.apply(index);
        true
    }

    pub fn start(&mut self, now: Instant) {
        if self.mode == Mode::Animating {
            return;
        }
        self.mode = Mode::Animating;
        if self.animation.start(now) {
            self.apply(0);
        }
        debug!(state = ?self.animation.state(), "animation started");
    }

    pub fn stop(&mut self) {
        if self.mode == Mode::Idle {
            return;
        }
        self.animation.pause();
        self.mode = Mode::Idle;
        debug!(state = ?self.animation.state(), "animation stopped");
    }

    pub fn toggle(&mut self, now: Instant) {
        match self.mode {
            Mode::Idle => self.start(now),
            Mode::Animating => self.stop(),
        }
    }

    /// Advances the animation if its timer has fired. Returns whether the
    /// artifacts changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.mode != Mode::Animating {
            return false;
        }
        match self.animation.poll(now) {
            Some(frame) => {
                let index = frame_index(frame, self.animation.frames(), self.grid_size());
                self.apply(index);
                true
            }
            None => false,
        }
    }

    fn apply(&mut self, index: usize) {
        let index = index.min(self.grid_size().saturating_sub(1));
        for artifact in &mut self.artifacts {
            let z = &self.history.snapshot(artifact.snapshot)[artifact.variable];
            artifact.set_data(&self.x, &self.y, index);
            artifact.set_3d_properties(z, index);
        }
        self.index = index;
        self.mutations += 1;
        debug!(index, "slice updated");
    }
}
