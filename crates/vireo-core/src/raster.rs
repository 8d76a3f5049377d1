//! Software rendition of the colour pipeline.
//!
//! Runs the geometry stage and the shading chain of
//! [`transform::evaluate`](crate::transform::evaluate) for every device
//! pixel. Used when no GPU is available and as the reference the GPU output
//! is checked against. Textures are sampled nearest-neighbour, matching the
//! GPU sampler.

use glam::Vec2;

use crate::pixel::{PixelBuffer, PixelFormat, PixelReader};
use crate::transform::evaluate::{self, Source};
use crate::transform::params::{ColorPipelineParams, CompareParams};
use crate::view::geometry;

/// Colour outside the video quad.
pub const CLEAR_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

/// Side of one checkerboard cell in texels.
pub const CHECKER_CELL: u32 = 8;
/// Size of the fallback checkerboard texture.
pub const CHECKER_SIZE: u32 = 64;
const CHECKER_DARK: u8 = 64;
const CHECKER_LIGHT: u8 = 96;

/// Placeholder shown while no frame is available.
pub fn fallback_checkerboard() -> PixelBuffer {
    let mut data = Vec::with_capacity((CHECKER_SIZE * CHECKER_SIZE * 4) as usize);
    for y in 0..CHECKER_SIZE {
        for x in 0..CHECKER_SIZE {
            let v = if ((x / CHECKER_CELL) + (y / CHECKER_CELL)) % 2 == 0 {
                CHECKER_DARK
            } else {
                CHECKER_LIGHT
            };
            data.extend_from_slice(&[v, v, v, 255]);
        }
    }
    // Dimensions and length agree by construction.
    PixelBuffer::new(
        CHECKER_SIZE,
        CHECKER_SIZE,
        PixelFormat::Rgba8,
        (CHECKER_SIZE * 4) as usize,
        data,
    )
    .unwrap_or_else(|_| PixelBuffer::solid(1, 1, PixelFormat::Rgba8, [CHECKER_DARK; 4]))
}

/// Textures bound for one draw.
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterInputs<'a> {
    pub primary: Option<&'a PixelBuffer>,
    pub compare: Option<&'a PixelBuffer>,
    pub overlay: Option<&'a PixelBuffer>,
}

/// RGBA f32 image, row-major, top row first.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<[f32; 4]>,
}

impl RasterImage {
    pub fn pixel(&self, x: u32, y: u32) -> [f32; 4] {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Quantize to 8-bit RGBA as an `Rgba8Unorm` target stores it.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|px| px.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8))
            .collect()
    }
}

/// Render a `width` × `height` view of `inputs` under `params`.
pub fn render_frame(
    width: u32,
    height: u32,
    inputs: RasterInputs<'_>,
    params: &ColorPipelineParams,
) -> RasterImage {
    let fallback;
    let primary = match inputs.primary.and_then(PixelBuffer::reader) {
        Some(reader) => reader,
        None => {
            fallback = fallback_checkerboard();
            match fallback.reader() {
                Some(reader) => reader,
                None => return blank(width, height),
            }
        }
    };
    let compare = inputs.compare.and_then(PixelBuffer::reader);
    let overlay = if params.overlay_enabled {
        inputs.overlay.and_then(PixelBuffer::reader)
    } else {
        None
    };

    let fit = geometry::aspect_fit(params.video_aspect, params.view_aspect);
    let wipe = CompareParams {
        enabled: params.compare.enabled,
        split: params.compare_split(),
    };
    let size = Vec2::new(width as f32, height as f32);

    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for y in 0..height {
        for x in 0..width {
            let screen = (Vec2::new(x as f32, y as f32) + 0.5) / size;
            let ndc = geometry::screen_to_ndc(screen);
            let uv = geometry::quad_to_uv(geometry::ndc_to_quad(ndc, fit, &params.transform));
            if !(0.0..=1.0).contains(&uv.x) || !(0.0..=1.0).contains(&uv.y) {
                pixels.push(CLEAR_COLOR);
                continue;
            }

            let texture = match (evaluate::select_source(screen.x, &wipe), &compare) {
                (Source::Compare, Some(reader)) => reader,
                _ => &primary,
            };
            let [r, g, b, _] = nearest(texture, uv);
            let mut rgb = evaluate::shade([r, g, b], params);
            if let Some(reader) = &overlay {
                rgb = evaluate::composite_overlay(rgb, nearest(reader, screen));
            }
            pixels.push([rgb[0], rgb[1], rgb[2], 1.0]);
        }
    }

    RasterImage {
        width,
        height,
        pixels,
    }
}

fn blank(width: u32, height: u32) -> RasterImage {
    RasterImage {
        width,
        height,
        pixels: vec![CLEAR_COLOR; width as usize * height as usize],
    }
}

#[inline]
fn nearest(reader: &PixelReader<'_>, uv: Vec2) -> [f32; 4] {
    let x = ((uv.x * reader.width() as f32) as u32).min(reader.width() - 1);
    let y = ((uv.y * reader.height() as f32) as u32).min(reader.height() - 1);
    reader.rgba(x, y)
}
