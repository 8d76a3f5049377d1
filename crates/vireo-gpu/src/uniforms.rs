//! `Uniforms` block of `color_pipeline.wgsl`.

use bytemuck::{Pod, Zeroable};
use vireo_core::color_management::false_color::FALSE_COLOR_BANDS;
use vireo_core::transform::lut::LutDimension;
use vireo_core::transform::params::ColorPipelineParams;
use vireo_core::view::geometry;

/// LUT modes understood by the shader.
pub const LUT_OFF: u32 = 0;
pub const LUT_1D: u32 = 1;
pub const LUT_3D: u32 = 2;

/// Channel order of an uploaded 8-bit texture.
pub const SWIZZLE_RGBA: u32 = 0;
pub const SWIZZLE_ARGB: u32 = 1;

/// Per-draw uniforms. Layout matches the WGSL struct (std140-compatible:
/// every member is a 16-byte vector).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PipelineUniforms {
    pub transform: [f32; 4],
    pub fit_view: [f32; 4],
    pub domain_min: [f32; 4],
    pub domain_max: [f32; 4],
    pub flags: [u32; 4],
    pub compare: [f32; 4],
    pub swizzle: [u32; 4],
    pub bands: [[f32; 4]; 8],
}

/// Texture-side facts the snapshot does not carry.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundTextures {
    pub view_size: [u32; 2],
    pub primary_swizzle: u32,
    pub compare_swizzle: u32,
    pub overlay_swizzle: u32,
    /// Whether a real compare texture is bound.
    pub has_compare: bool,
    /// Whether a real overlay texture is bound.
    pub has_overlay: bool,
    /// Whether the active LUT's lattice is bound.
    pub has_lut: bool,
}

impl PipelineUniforms {
    pub fn new(params: &ColorPipelineParams, bound: &BoundTextures) -> Self {
        let fit = geometry::aspect_fit(params.video_aspect, params.view_aspect);
        let t = &params.transform;

        let (mode, size, min, max) = match params.active_lut().filter(|_| bound.has_lut) {
            Some(cube) => {
                let mode = match cube.dimension() {
                    LutDimension::OneD(_) => LUT_1D,
                    LutDimension::ThreeD(_) => LUT_3D,
                };
                (
                    mode,
                    cube.size() as f32,
                    cube.domain_min().to_array(),
                    cube.domain_max().to_array(),
                )
            }
            None => (LUT_OFF, 0.0, [0.0; 3], [1.0; 3]),
        };

        let bands = std::array::from_fn(|i| {
            let band = &FALSE_COLOR_BANDS[i];
            // Uniform buffers stay finite; the last band catches everything.
            let upper = if band.upper.is_finite() {
                band.upper
            } else {
                f32::MAX
            };
            [band.color[0], band.color[1], band.color[2], upper]
        });

        Self {
            transform: [t.scale, t.offset.x, t.offset.y, 0.0],
            fit_view: [
                fit.x,
                fit.y,
                bound.view_size[0].max(1) as f32,
                bound.view_size[1].max(1) as f32,
            ],
            domain_min: [min[0], min[1], min[2], params.lut_intensity()],
            domain_max: [max[0], max[1], max[2], size],
            flags: [
                mode,
                params.false_color as u32,
                params.hdr.auto_tone_map as u32,
                (params.overlay_enabled && bound.has_overlay) as u32,
            ],
            compare: [
                (params.compare.enabled && bound.has_compare) as u32 as f32,
                params.compare_split(),
                0.0,
                0.0,
            ],
            swizzle: [
                bound.primary_swizzle,
                bound.compare_swizzle,
                bound.overlay_swizzle,
                0,
            ],
            bands,
        }
    }
}
