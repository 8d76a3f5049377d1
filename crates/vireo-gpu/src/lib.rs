//! Vireo GPU: wgpu renderer for the review colour pipeline.
//!
//! This crate owns all GPU resources. It exposes a plain wgpu API: a host
//! hands it a device and queue (or lets [`create_device_blocking`] make
//! one), binds frames and LUTs, and draws a [`ColorPipelineParams`]
//! snapshot into any render target.
//!
//! [`ColorPipelineParams`]: vireo_core::ColorPipelineParams

pub mod error;
pub mod pipeline;
pub mod readback;
pub mod textures;
pub mod uniforms;

pub use error::GpuError;
pub use pipeline::ColorPipeline;
pub use readback::render_to_image;

use vireo_core::HdrMode;

/// Render target format for a presentation mode.
pub fn target_format(mode: HdrMode) -> wgpu::TextureFormat {
    if mode.is_extended_range() {
        wgpu::TextureFormat::Rgba16Float
    } else {
        wgpu::TextureFormat::Rgba8Unorm
    }
}

/// Create a device and queue on the default adapter.
pub fn create_device_blocking() -> Result<(wgpu::Device, wgpu::Queue), GpuError> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
    let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::HighPerformance,
        ..Default::default()
    }))
    .map_err(|e| {
        tracing::warn!("no GPU adapter: {e}");
        GpuError::NoAdapter
    })?;

    let info = adapter.get_info();
    let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
        label: Some("vireo_device"),
        required_features: wgpu::Features::empty(),
        required_limits: wgpu::Limits::default().using_resolution(adapter.limits()),
        ..Default::default()
    }))?;
    tracing::info!(adapter = %info.name, backend = ?info.backend, "GPU device created");
    Ok((device, queue))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_format_follows_hdr_mode() {
        assert_eq!(target_format(HdrMode::Sdr), wgpu::TextureFormat::Rgba8Unorm);
        assert_eq!(target_format(HdrMode::Hlg), wgpu::TextureFormat::Rgba16Float);
        assert_eq!(target_format(HdrMode::Pq), wgpu::TextureFormat::Rgba16Float);
    }
}
