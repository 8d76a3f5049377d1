//! Zoom/pan state shared between user interaction and the render tick.
//!
//! Scroll zooms around the cursor, drag pans, double-click resets to fit.
//! Every mutation and the per-tick read go through one mutex; listeners are
//! told about each change after the lock is released.

pub mod geometry;

use glam::{UVec2, Vec2};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

// ── Constants ───────────────────────────────────────────────────────────────

pub const SCALE_MIN: f32 = 0.1;
pub const SCALE_MAX: f32 = 50.0;
/// Multiplicative zoom per scroll-wheel line.
pub const ZOOM_STEP: f32 = 1.1;

// ── Types ───────────────────────────────────────────────────────────────────

/// View transform applied after the aspect fit. `offset` is in NDC units and
/// may move the video past the view edges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformState {
    pub scale: f32,
    pub offset: Vec2,
}

impl TransformState {
    pub const IDENTITY: Self = Self {
        scale: 1.0,
        offset: Vec2::ZERO,
    };
}

impl Default for TransformState {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Preset framings exposed to the toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZoomCommand {
    Fit,
    Fill,
    PixelPerfect,
}

/// Which framing produced the current state. Presets are re-applied when the
/// video or drawable size changes; gestures switch to `Custom`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Framing {
    Fit,
    Fill,
    PixelPerfect,
    Custom,
}

/// Raw pointer input routed to the view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    /// Scroll by `lines` (positive zooms in) with the cursor at screen
    /// position `at`.
    Scroll { lines: f32, at: Vec2 },
    /// Drag by `delta`, a fraction of the view size (x right, y down).
    Drag { delta: Vec2 },
    DoubleClick,
}

/// Consistent copy of everything the render tick needs from the view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewSnapshot {
    pub state: TransformState,
    pub framing: Framing,
    pub video_size: UVec2,
    pub drawable_size: UVec2,
}

impl ViewSnapshot {
    /// Video aspect, 1.0 until a frame size is known.
    pub fn video_aspect(&self) -> f32 {
        geometry::aspect_of(self.video_size).unwrap_or(1.0)
    }

    /// Drawable aspect, 1.0 until the drawable size is known.
    pub fn view_aspect(&self) -> f32 {
        geometry::aspect_of(self.drawable_size).unwrap_or(1.0)
    }

    /// Screen position to video UV, `None` outside the video.
    pub fn screen_to_video_uv(&self, screen: Vec2) -> Option<Vec2> {
        geometry::screen_to_video_uv(screen, self.video_aspect(), self.view_aspect(), &self.state)
    }

    /// Device pixel to video UV, `None` outside the video.
    pub fn device_to_video_uv(&self, device: Vec2) -> Option<Vec2> {
        if self.drawable_size.min_element() == 0 {
            return None;
        }
        self.screen_to_video_uv(device / self.drawable_size.as_vec2())
    }
}

/// Listener notified with the new state after each mutation.
pub type TransformListener = Box<dyn Fn(&ViewSnapshot) + Send + Sync>;

struct Inner {
    state: TransformState,
    framing: Framing,
    video_size: UVec2,
    drawable_size: UVec2,
}

impl Inner {
    fn snapshot(&self) -> ViewSnapshot {
        ViewSnapshot {
            state: self.state,
            framing: self.framing,
            video_size: self.video_size,
            drawable_size: self.drawable_size,
        }
    }

    fn aspects(&self) -> (f32, f32) {
        let snap = self.snapshot();
        (snap.video_aspect(), snap.view_aspect())
    }

    /// Recompute the state for a preset framing.
    fn apply_framing(&mut self, framing: Framing) {
        self.framing = framing;
        let scale = match framing {
            Framing::Fit => 1.0,
            Framing::Fill => {
                let (video, view) = self.aspects();
                geometry::fill_scale(video, view)
            }
            Framing::PixelPerfect => {
                match geometry::pixel_perfect_scale(self.video_size, self.drawable_size) {
                    Some(s) => s,
                    None => {
                        tracing::debug!("pixel-perfect framing without sizes, using fit");
                        1.0
                    }
                }
            }
            Framing::Custom => return,
        };
        self.state = TransformState {
            scale: clamp_scale(scale),
            offset: Vec2::ZERO,
        };
    }
}

/// Thread-safe zoom/pan state.
pub struct ViewTransform {
    inner: Mutex<Inner>,
    listeners: Mutex<Vec<TransformListener>>,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewTransform {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: TransformState::IDENTITY,
                framing: Framing::Fit,
                video_size: UVec2::ZERO,
                drawable_size: UVec2::ZERO,
            }),
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Register a change listener. Listeners run on the mutating thread and
    /// must not register further listeners from inside the callback.
    pub fn on_change(&self, listener: impl Fn(&ViewSnapshot) + Send + Sync + 'static) {
        self.listeners.lock().push(Box::new(listener));
    }

    /// Current transform.
    pub fn current(&self) -> TransformState {
        self.inner.lock().state
    }

    /// Transform plus sizes, read under a single lock acquisition.
    pub fn snapshot(&self) -> ViewSnapshot {
        self.inner.lock().snapshot()
    }

    /// Back to identity (fit).
    pub fn reset(&self) {
        self.mutate(|inner| inner.apply_framing(Framing::Fit));
    }

    pub fn fit(&self) {
        self.reset();
    }

    /// Cover the view entirely, cropping the overflowing axis.
    pub fn fill(&self) {
        self.mutate(|inner| inner.apply_framing(Framing::Fill));
    }

    /// One source pixel per device pixel.
    pub fn pixel_perfect(&self) {
        self.mutate(|inner| inner.apply_framing(Framing::PixelPerfect));
    }

    pub fn apply(&self, command: ZoomCommand) {
        match command {
            ZoomCommand::Fit => self.fit(),
            ZoomCommand::Fill => self.fill(),
            ZoomCommand::PixelPerfect => self.pixel_perfect(),
        }
    }

    /// Multiply the scale by `factor`, keeping the video point under screen
    /// position `at` fixed.
    pub fn zoom_by(&self, factor: f32, at: Vec2) {
        if !(factor > 0.0 && factor.is_finite()) {
            tracing::debug!(factor, "ignoring invalid zoom factor");
            return;
        }
        self.mutate(|inner| {
            let p = geometry::screen_to_ndc(at);
            let old = inner.state;
            let new_scale = clamp_scale(old.scale * factor);
            let anchored = (p - old.offset) / old.scale;
            inner.state = TransformState {
                scale: new_scale,
                offset: p - anchored * new_scale,
            };
            inner.framing = Framing::Custom;
        });
    }

    /// Shift by `delta`, a fraction of the view size (x right, y down).
    pub fn pan(&self, delta: Vec2) {
        if !delta.is_finite() {
            return;
        }
        self.mutate(|inner| {
            inner.state.offset += Vec2::new(delta.x * 2.0, -delta.y * 2.0);
            inner.framing = Framing::Custom;
        });
    }

    pub fn handle_gesture(&self, gesture: Gesture) {
        match gesture {
            Gesture::Scroll { lines, at } => self.zoom_by(ZOOM_STEP.powf(lines), at),
            Gesture::Drag { delta } => self.pan(delta),
            Gesture::DoubleClick => self.reset(),
        }
    }

    /// Record the decoded video size; preset framings are recomputed.
    pub fn set_video_size(&self, size: UVec2) {
        self.resize(|inner| {
            if inner.video_size == size {
                return false;
            }
            inner.video_size = size;
            true
        });
    }

    /// Record the drawable size in device pixels; preset framings are
    /// recomputed.
    pub fn set_drawable_size(&self, size: UVec2) {
        self.resize(|inner| {
            if inner.drawable_size == size {
                return false;
            }
            inner.drawable_size = size;
            true
        });
    }

    pub fn framing(&self) -> Framing {
        self.inner.lock().framing
    }

    fn resize(&self, update: impl FnOnce(&mut Inner) -> bool) {
        let snapshot = {
            let mut inner = self.inner.lock();
            if !update(&mut inner) {
                return;
            }
            let framing = inner.framing;
            inner.apply_framing(framing);
            inner.snapshot()
        };
        self.notify(&snapshot);
    }

    fn mutate(&self, f: impl FnOnce(&mut Inner)) {
        let snapshot = {
            let mut inner = self.inner.lock();
            f(&mut inner);
            inner.snapshot()
        };
        self.notify(&snapshot);
    }

    fn notify(&self, snapshot: &ViewSnapshot) {
        for listener in self.listeners.lock().iter() {
            listener(snapshot);
        }
    }
}

#[inline]
fn clamp_scale(scale: f32) -> f32 {
    if scale.is_nan() {
        1.0
    } else {
        scale.clamp(SCALE_MIN, SCALE_MAX)
    }
}
