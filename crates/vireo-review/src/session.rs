//! Per-tick orchestration of a review session.
//!
//! A `ReviewSession` is the only place display state changes. Gestures and
//! setting changes may arrive from any thread; `tick` captures everything
//! the next draw needs into one immutable [`TickOutput`].

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use glam::{UVec2, Vec2};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use vireo_core::HdrMode;
use vireo_core::overlay::OverlaySource;
use vireo_core::pixel::PixelBuffer;
use vireo_core::raster::{self, RasterImage, RasterInputs};
use vireo_core::scopes::{HistogramData, ScopeScheduler, VectorscopeData, WaveformData};
use vireo_core::transform::lut::LutError;
use vireo_core::transform::params::{ColorPipelineParams, CompareParams, HdrParams, LutParams};
use vireo_core::transform::slot::{LutHandle, LutSlot};
use vireo_core::view::{Gesture, ViewTransform, ZoomCommand};
use vireo_core::FrameProvider;

use crate::config::ReviewConfig;

/// Long-lived display toggles. Copied into every tick's snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    pub lut_enabled: bool,
    pub lut_intensity: f32,
    pub false_color: bool,
    pub hdr: HdrParams,
    pub compare: CompareParams,
    pub overlay_enabled: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            lut_enabled: true,
            lut_intensity: 1.0,
            false_color: false,
            hdr: HdrParams::default(),
            compare: CompareParams::default(),
            overlay_enabled: true,
        }
    }
}

/// Everything one draw consumes.
#[derive(Debug, Clone)]
pub struct TickOutput {
    pub params: ColorPipelineParams,
    pub frame: Option<PixelBuffer>,
    pub compare: Option<PixelBuffer>,
    pub overlay: Option<PixelBuffer>,
    /// Primary provider's frame sequence at this tick.
    pub sequence: u64,
    /// Whether a scope pass ran during this tick.
    pub scopes_ran: bool,
}

impl TickOutput {
    /// Software rendering of this tick, for hosts without a GPU.
    pub fn rasterize(&self, width: u32, height: u32) -> RasterImage {
        raster::render_frame(
            width,
            height,
            RasterInputs {
                primary: self.frame.as_ref(),
                compare: self.compare.as_ref(),
                overlay: self.overlay.as_ref(),
            },
            &self.params,
        )
    }
}

pub struct ReviewSession {
    primary: Arc<dyn FrameProvider>,
    compare: Option<Arc<dyn FrameProvider>>,
    overlay: Option<Arc<dyn OverlaySource>>,
    view: Arc<ViewTransform>,
    lut: LutSlot,
    settings: Mutex<DisplaySettings>,
    scopes: Mutex<ScopeScheduler>,
    last_frame: Mutex<Option<PixelBuffer>>,
    epoch: Instant,
}

impl ReviewSession {
    pub fn new(primary: Arc<dyn FrameProvider>, config: &ReviewConfig) -> Self {
        let settings = DisplaySettings {
            lut_intensity: clamp_unit(config.lut_intensity, 1.0),
            hdr: HdrParams {
                mode: config.hdr_mode,
                auto_tone_map: config.auto_tone_map,
            },
            ..Default::default()
        };
        Self {
            primary,
            compare: None,
            overlay: None,
            view: Arc::new(ViewTransform::new()),
            lut: LutSlot::new(),
            settings: Mutex::new(settings),
            scopes: Mutex::new(ScopeScheduler::new(
                config.scope_settings(),
                config.scope_rate_hz,
            )),
            last_frame: Mutex::new(None),
            epoch: Instant::now(),
        }
    }

    /// Attach the B side of the A/B wipe.
    pub fn with_compare(mut self, provider: Arc<dyn FrameProvider>) -> Self {
        self.compare = Some(provider);
        self
    }

    pub fn with_overlay(mut self, source: Arc<dyn OverlaySource>) -> Self {
        self.overlay = Some(source);
        self
    }

    /// Shared view state, for hosts that route input from another thread.
    pub fn view(&self) -> &Arc<ViewTransform> {
        &self.view
    }

    pub fn lut_slot(&self) -> &LutSlot {
        &self.lut
    }

    // ── Per-tick work ──────────────────────────────────────────────

    /// Pull frames, snapshot all state and run throttled scopes.
    pub fn tick(&self, now: Instant) -> TickOutput {
        let host_time = now.saturating_duration_since(self.epoch).as_secs_f64();
        let frame = self.primary.frame_for_host_time(host_time);
        let sequence = self.primary.frame_sequence();
        let compare = self
            .compare
            .as_ref()
            .and_then(|c| c.frame_for_host_time(host_time));

        if let Some(frame) = &frame {
            self.view
                .set_video_size(UVec2::new(frame.width(), frame.height()));
        }
        *self.last_frame.lock() = frame.clone();

        let view = self.view.snapshot();
        let settings = *self.settings.lock();

        let overlay = if settings.overlay_enabled {
            self.overlay
                .as_ref()
                .and_then(|source| source.overlay())
                .filter(|payload| payload.enabled)
                .map(|payload| payload.image)
        } else {
            None
        };

        let params = ColorPipelineParams {
            transform: view.state,
            video_aspect: view.video_aspect(),
            view_aspect: view.view_aspect(),
            lut: LutParams {
                handle: self.lut.current(),
                enabled: settings.lut_enabled,
                intensity: settings.lut_intensity,
            },
            false_color: settings.false_color,
            hdr: settings.hdr,
            compare: settings.compare,
            overlay_enabled: overlay.is_some(),
        };

        let scopes_ran = match &frame {
            Some(frame) => self.scopes.lock().maybe_analyze(now, frame, sequence),
            None => false,
        };

        TickOutput {
            params,
            frame,
            compare,
            overlay,
            sequence,
            scopes_ran,
        }
    }

    // ── View ───────────────────────────────────────────────────────

    pub fn apply_zoom_command(&self, command: ZoomCommand) {
        self.view.apply(command);
    }

    pub fn handle_gesture(&self, gesture: Gesture) {
        self.view.handle_gesture(gesture);
    }

    pub fn set_drawable_size(&self, size: UVec2) {
        self.view.set_drawable_size(size);
    }

    /// Colour under a device pixel of the drawable, from the last ticked
    /// frame. `None` outside the video or for unsupported formats.
    pub fn pick_color(&self, device: Vec2) -> Option<[f32; 3]> {
        let uv = self.view.snapshot().device_to_video_uv(device)?;
        self.last_frame.lock().as_ref()?.sample_uv(uv)
    }

    // ── LUT ────────────────────────────────────────────────────────

    /// Load a `.cube` file. On failure the current LUT stays active and the
    /// error is returned for the caller to surface.
    pub fn load_lut_file(&self, path: &Path) -> Result<LutHandle, LutError> {
        self.lut.load_file(path)
    }

    pub fn clear_lut(&self) {
        self.lut.clear();
    }

    // ── Settings ───────────────────────────────────────────────────

    pub fn settings(&self) -> DisplaySettings {
        *self.settings.lock()
    }

    /// Mutate settings in one critical section.
    pub fn update_settings(&self, f: impl FnOnce(&mut DisplaySettings)) {
        let mut settings = self.settings.lock();
        f(&mut settings);
        settings.lut_intensity = clamp_unit(settings.lut_intensity, 1.0);
        settings.compare.split = clamp_unit(settings.compare.split, 0.5);
    }

    pub fn set_lut_enabled(&self, enabled: bool) {
        self.update_settings(|s| s.lut_enabled = enabled);
    }

    pub fn set_lut_intensity(&self, intensity: f32) {
        self.update_settings(|s| s.lut_intensity = intensity);
    }

    pub fn set_false_color(&self, enabled: bool) {
        self.update_settings(|s| s.false_color = enabled);
    }

    pub fn set_hdr_mode(&self, mode: HdrMode) {
        self.update_settings(|s| s.hdr.mode = mode);
    }

    pub fn set_auto_tone_map(&self, enabled: bool) {
        self.update_settings(|s| s.hdr.auto_tone_map = enabled);
    }

    pub fn set_compare_enabled(&self, enabled: bool) {
        self.update_settings(|s| s.compare.enabled = enabled);
    }

    pub fn set_compare_split(&self, split: f32) {
        self.update_settings(|s| s.compare.split = split);
    }

    pub fn set_overlay_enabled(&self, enabled: bool) {
        self.update_settings(|s| s.overlay_enabled = enabled);
    }

    // ── Scopes ─────────────────────────────────────────────────────

    pub fn on_histogram(&self, callback: impl FnMut(&HistogramData) + Send + 'static) {
        self.scopes.lock().on_histogram(callback);
    }

    pub fn on_waveform(&self, callback: impl FnMut(&WaveformData) + Send + 'static) {
        self.scopes.lock().on_waveform(callback);
    }

    pub fn on_vectorscope(&self, callback: impl FnMut(&VectorscopeData) + Send + 'static) {
        self.scopes.lock().on_vectorscope(callback);
    }

    pub fn clear_scope_callbacks(&self) {
        self.scopes.lock().clear_callbacks();
    }
}

fn clamp_unit(v: f32, fallback: f32) -> f32 {
    if v.is_nan() { fallback } else { v.clamp(0.0, 1.0) }
}
