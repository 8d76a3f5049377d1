//! Coordinate spaces of the viewer and the mappings between them.
//!
//! - *device*: drawable pixels, origin top-left.
//! - *screen*: device divided by the drawable size, `[0, 1]²`, y down.
//! - *NDC*: `[-1, 1]²`, y up, what the rasterizer consumes.
//! - *quad*: the unit quad `[-1, 1]²` before aspect fit and zoom/pan.
//! - *UV*: video texture coordinates `[0, 1]²`, `v = 0` at the top.
//!
//! The geometry stage computes `ndc = quad * fit * scale + offset`.

use glam::{UVec2, Vec2};

use super::TransformState;

/// Per-axis factor that letter- or pillar-boxes the video inside the view.
///
/// Whichever axis is relatively wider is scaled down so the whole video
/// fits without cropping. Degenerate aspects yield `(1, 1)`.
pub fn aspect_fit(video_aspect: f32, view_aspect: f32) -> Vec2 {
    if !(video_aspect > 0.0 && video_aspect.is_finite())
        || !(view_aspect > 0.0 && view_aspect.is_finite())
    {
        return Vec2::ONE;
    }
    if video_aspect > view_aspect {
        // Video wider than the view: width-limited.
        Vec2::new(1.0, view_aspect / video_aspect)
    } else {
        // Video taller than the view: height-limited.
        Vec2::new(video_aspect / view_aspect, 1.0)
    }
}

/// Scale at which the fitted video covers the view with no bars.
pub fn fill_scale(video_aspect: f32, view_aspect: f32) -> f32 {
    let fit = aspect_fit(video_aspect, view_aspect);
    1.0 / fit.min_element()
}

/// Scale at which one source pixel covers exactly one device pixel:
/// `max(video_w / drawable_w, video_h / drawable_h)`.
pub fn pixel_perfect_scale(video: UVec2, drawable: UVec2) -> Option<f32> {
    if video.min_element() == 0 || drawable.min_element() == 0 {
        return None;
    }
    let v = video.as_vec2();
    let d = drawable.as_vec2();
    Some((v.x / d.x).max(v.y / d.y))
}

/// `width / height`, `None` when either is zero.
pub fn aspect_of(size: UVec2) -> Option<f32> {
    (size.min_element() > 0).then(|| size.x as f32 / size.y as f32)
}

#[inline]
pub fn screen_to_ndc(screen: Vec2) -> Vec2 {
    Vec2::new(screen.x * 2.0 - 1.0, 1.0 - screen.y * 2.0)
}

#[inline]
pub fn ndc_to_screen(ndc: Vec2) -> Vec2 {
    Vec2::new((ndc.x + 1.0) * 0.5, (1.0 - ndc.y) * 0.5)
}

/// Device pixel to NDC for a drawable of `drawable` pixels.
#[inline]
pub fn device_to_ndc(device: Vec2, drawable: Vec2) -> Vec2 {
    screen_to_ndc(device / drawable)
}

/// Geometry stage: quad corner to NDC.
#[inline]
pub fn quad_to_ndc(quad: Vec2, fit: Vec2, state: &TransformState) -> Vec2 {
    quad * fit * state.scale + state.offset
}

/// Inverse of [`quad_to_ndc`].
#[inline]
pub fn ndc_to_quad(ndc: Vec2, fit: Vec2, state: &TransformState) -> Vec2 {
    (ndc - state.offset) / (fit * state.scale)
}

#[inline]
pub fn quad_to_uv(quad: Vec2) -> Vec2 {
    Vec2::new(quad.x * 0.5 + 0.5, 0.5 - quad.y * 0.5)
}

#[inline]
pub fn uv_to_quad(uv: Vec2) -> Vec2 {
    Vec2::new(uv.x * 2.0 - 1.0, 1.0 - uv.y * 2.0)
}

/// Map a screen position to video UV, `None` when it falls outside the video.
pub fn screen_to_video_uv(
    screen: Vec2,
    video_aspect: f32,
    view_aspect: f32,
    state: &TransformState,
) -> Option<Vec2> {
    let fit = aspect_fit(video_aspect, view_aspect);
    let uv = quad_to_uv(ndc_to_quad(screen_to_ndc(screen), fit, state));
    ((0.0..=1.0).contains(&uv.x) && (0.0..=1.0).contains(&uv.y)).then_some(uv)
}

/// Map video UV to its screen position (may lie outside `[0, 1]²`).
pub fn video_uv_to_screen(
    uv: Vec2,
    video_aspect: f32,
    view_aspect: f32,
    state: &TransformState,
) -> Vec2 {
    let fit = aspect_fit(video_aspect, view_aspect);
    ndc_to_screen(quad_to_ndc(uv_to_quad(uv), fit, state))
}
