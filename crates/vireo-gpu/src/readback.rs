//! Offscreen rendering with CPU readback, for headless runs and tests.

use half::f16;
use vireo_core::raster::RasterImage;
use vireo_core::transform::params::ColorPipelineParams;

use crate::error::GpuError;
use crate::pipeline::ColorPipeline;
use crate::target_format;

/// Render `params` into a fresh `width` × `height` target and download it.
///
/// The target format follows `params.hdr.mode` (8-bit UNORM for SDR,
/// half-float otherwise).
pub fn render_to_image(
    pipeline: &mut ColorPipeline,
    width: u32,
    height: u32,
    params: &ColorPipelineParams,
) -> Result<RasterImage, GpuError> {
    let width = width.max(1);
    let height = height.max(1);
    let format = target_format(params.hdr.mode);
    let texel_bytes = match format {
        wgpu::TextureFormat::Rgba16Float => 8,
        _ => 4,
    };

    let device = pipeline.device().clone();
    let queue = pipeline.queue().clone();

    let size = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };
    let target = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("vireo_offscreen_target"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });
    let view = target.create_view(&wgpu::TextureViewDescriptor::default());

    let unpadded_row = width * texel_bytes;
    let padded_row = unpadded_row.div_ceil(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT)
        * wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    let staging = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("vireo_offscreen_staging"),
        size: padded_row as u64 * height as u64,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("vireo_offscreen_encoder"),
    });
    pipeline.encode(&mut encoder, &view, format, [width, height], params);
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture: &target,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &staging,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(padded_row),
                rows_per_image: Some(height),
            },
        },
        size,
    );
    queue.submit(std::iter::once(encoder.finish()));

    staging.slice(..).map_async(wgpu::MapMode::Read, |_| {});
    device
        .poll(wgpu::PollType::wait_indefinitely())
        .map_err(|e| GpuError::Readback(e.to_string()))?;

    let mut pixels: Vec<[f32; 4]> = Vec::with_capacity(width as usize * height as usize);
    {
        let data = staging.slice(..).get_mapped_range();
        for row in data.chunks(padded_row as usize).take(height as usize) {
            let row = &row[..unpadded_row as usize];
            match texel_bytes {
                8 => pixels.extend(row.chunks_exact(8).map(|t| {
                    std::array::from_fn(|c| f16::from_le_bytes([t[c * 2], t[c * 2 + 1]]).to_f32())
                })),
                _ => pixels.extend(
                    row.chunks_exact(4)
                        .map(|t| std::array::from_fn(|c| t[c] as f32 / 255.0)),
                ),
            }
        }
    }
    staging.unmap();

    Ok(RasterImage {
        width,
        height,
        pixels,
    })
}
