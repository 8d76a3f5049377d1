//! Drives the GPU colour pipeline from session ticks.

use vireo_core::raster::RasterImage;
use vireo_gpu::{ColorPipeline, GpuError};

use crate::session::TickOutput;

/// Upload counters since the presenter was created.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UploadStats {
    pub frames: u64,
    pub compares: u64,
    pub overlays: u64,
    pub luts: u64,
    pub draws: u64,
}

/// Owns the [`ColorPipeline`] and binds only inputs that changed since the
/// previous tick: frame and overlay by buffer identity, the LUT by
/// generation.
pub struct Presenter {
    pipeline: ColorPipeline,
    stats: UploadStats,
}

impl Presenter {
    pub fn new(pipeline: ColorPipeline) -> Self {
        Self {
            pipeline,
            stats: UploadStats::default(),
        }
    }

    /// Create a device on the default adapter and build the pipeline on it.
    pub fn with_default_device() -> Result<Self, GpuError> {
        let (device, queue) = vireo_gpu::create_device_blocking()?;
        Ok(Self::new(ColorPipeline::new(device, queue)?))
    }

    pub fn pipeline(&self) -> &ColorPipeline {
        &self.pipeline
    }

    pub fn stats(&self) -> UploadStats {
        self.stats
    }

    /// Bind the tick's textures. Returns whether anything was uploaded.
    pub fn prepare(&mut self, tick: &TickOutput) -> bool {
        let frame = self.pipeline.set_frame(tick.frame.as_ref());
        let compare = self.pipeline.set_compare(tick.compare.as_ref());
        let overlay = self.pipeline.set_overlay(tick.overlay.as_ref());
        let lut = self.pipeline.set_lut(tick.params.lut.handle.as_ref());

        self.stats.frames += frame as u64;
        self.stats.compares += compare as u64;
        self.stats.overlays += overlay as u64;
        self.stats.luts += lut as u64;
        frame || compare || overlay || lut
    }

    /// Draw the tick into `target`.
    pub fn draw(
        &mut self,
        target: &wgpu::TextureView,
        format: wgpu::TextureFormat,
        view_size: [u32; 2],
        tick: &TickOutput,
    ) {
        self.prepare(tick);
        self.pipeline.render(target, format, view_size, &tick.params);
        self.stats.draws += 1;
    }

    /// Draw the tick offscreen and read it back.
    pub fn render_offscreen(
        &mut self,
        width: u32,
        height: u32,
        tick: &TickOutput,
    ) -> Result<RasterImage, GpuError> {
        self.prepare(tick);
        let image = vireo_gpu::render_to_image(&mut self.pipeline, width, height, &tick.params)?;
        self.stats.draws += 1;
        Ok(image)
    }
}
