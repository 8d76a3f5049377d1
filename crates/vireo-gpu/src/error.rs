//! Renderer construction and readback failures.

use vireo_core::PixelFormat;

#[derive(Debug, thiserror::Error)]
pub enum GpuError {
    #[error("no compatible GPU adapter")]
    NoAdapter,
    #[error("device request failed: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
    #[error("pixel format {0} cannot be uploaded")]
    UnsupportedFormat(PixelFormat),
    #[error("texture {width}x{height}x{depth} exceeds the device limit of {max}")]
    TextureTooLarge {
        width: u32,
        height: u32,
        depth: u32,
        max: u32,
    },
    #[error("pipeline creation failed: {0}")]
    Pipeline(String),
    #[error("readback failed: {0}")]
    Readback(String),
}
