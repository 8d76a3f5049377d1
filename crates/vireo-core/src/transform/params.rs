//! Per-draw parameter snapshot for the colour pipeline.
//!
//! `ColorPipelineParams` is rebuilt from the long-lived settings on every
//! display tick and handed to the renderer by value. Nothing mutates a
//! snapshot after it is built, so it needs no locking.

use serde::{Deserialize, Serialize};

use crate::color_management::tone_map::HdrMode;
use crate::transform::lut::LutCube;
use crate::transform::slot::LutHandle;
use crate::view::TransformState;

/// A/B wipe configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompareParams {
    pub enabled: bool,
    /// Screen-space x fraction of the wipe line. Samples left of it show the
    /// compare source.
    pub split: f32,
}

impl Default for CompareParams {
    fn default() -> Self {
        Self {
            enabled: false,
            split: 0.5,
        }
    }
}

/// LUT application settings.
#[derive(Debug, Clone, PartialEq)]
pub struct LutParams {
    pub handle: Option<LutHandle>,
    pub enabled: bool,
    /// Blend between the original (0) and the LUT result (1).
    pub intensity: f32,
}

impl Default for LutParams {
    fn default() -> Self {
        Self {
            handle: None,
            enabled: true,
            intensity: 1.0,
        }
    }
}

/// Tone handling of the presented image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HdrParams {
    pub mode: HdrMode,
    /// Apply Reinhard compression + 2.2 gamma.
    pub auto_tone_map: bool,
}

/// Everything one draw needs, captured at the start of a tick.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorPipelineParams {
    pub transform: TransformState,
    /// `width / height` of the primary video.
    pub video_aspect: f32,
    /// `width / height` of the drawable.
    pub view_aspect: f32,
    pub lut: LutParams,
    pub false_color: bool,
    pub hdr: HdrParams,
    pub compare: CompareParams,
    pub overlay_enabled: bool,
}

impl Default for ColorPipelineParams {
    /// Pass-through pipeline: identity transform, no LUT, no overlays.
    fn default() -> Self {
        Self {
            transform: TransformState::IDENTITY,
            video_aspect: 1.0,
            view_aspect: 1.0,
            lut: LutParams::default(),
            false_color: false,
            hdr: HdrParams::default(),
            compare: CompareParams::default(),
            overlay_enabled: false,
        }
    }
}

impl ColorPipelineParams {
    /// The cube to apply this draw, if LUT application is switched on and a
    /// cube is loaded.
    pub fn active_lut(&self) -> Option<&LutCube> {
        if !self.lut.enabled {
            return None;
        }
        self.lut.handle.as_ref().map(|h| h.cube())
    }

    /// Intensity clamped to `[0, 1]`.
    pub fn lut_intensity(&self) -> f32 {
        if self.lut.intensity.is_nan() {
            0.0
        } else {
            self.lut.intensity.clamp(0.0, 1.0)
        }
    }

    /// Split fraction clamped to `[0, 1]`.
    pub fn compare_split(&self) -> f32 {
        if self.compare.split.is_nan() {
            0.5
        } else {
            self.compare.split.clamp(0.0, 1.0)
        }
    }
}
