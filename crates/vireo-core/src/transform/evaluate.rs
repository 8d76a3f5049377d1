//! Per-sample shading chain. `color_pipeline.wgsl` mirrors this exactly.
//!
//! Order, per screen sample:
//! 1. Source selection (A/B wipe by screen-space x)
//! 2. LUT application, blended by intensity
//! 3. False-colour classification (replaces the colour)
//! 4. Reinhard tone map + 2.2 gamma
//! 5. Overlay alpha composite

use crate::color_management::{false_color, luma, tone_map};
use crate::transform::params::{ColorPipelineParams, CompareParams};

/// Which texture a screen sample reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Primary,
    Compare,
}

/// Pick the source for a sample at screen-space x fraction `screen_x`
/// (`0` = left edge of the view).
///
/// The split is evaluated in screen space, so the wipe line stays vertical
/// and fixed while the video is zoomed or panned.
#[inline]
pub fn select_source(screen_x: f32, compare: &CompareParams) -> Source {
    if compare.enabled && screen_x < compare.split {
        Source::Compare
    } else {
        Source::Primary
    }
}

/// Steps 2 to 4 for one sampled colour.
pub fn shade(rgb: [f32; 3], params: &ColorPipelineParams) -> [f32; 3] {
    let mut color = rgb;

    if let Some(lut) = params.active_lut() {
        let graded = lut.sample(color);
        let t = params.lut_intensity();
        color = [
            mix(color[0], graded[0], t),
            mix(color[1], graded[1], t),
            mix(color[2], graded[2], t),
        ];
    }

    if params.false_color {
        color = false_color::classify(luma(color));
    }

    if params.hdr.auto_tone_map {
        color = tone_map::tone_map(color);
    }

    color
}

/// Step 5: straight-alpha composite of an overlay sample.
#[inline]
pub fn composite_overlay(rgb: [f32; 3], overlay: [f32; 4]) -> [f32; 3] {
    let a = overlay[3].clamp(0.0, 1.0);
    [
        mix(rgb[0], overlay[0], a),
        mix(rgb[1], overlay[1], a),
        mix(rgb[2], overlay[2], a),
    ]
}

#[inline]
fn mix(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
