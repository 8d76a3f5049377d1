//! The colour pipeline render pass.
//!
//! Owns every GPU resource the draw needs. Uploads happen only when the
//! bound frame, compare frame, overlay or LUT generation actually changes;
//! the per-tick cost is one uniform write and one four-vertex draw.

use std::num::NonZeroU64;

use vireo_core::pixel::PixelBuffer;
use vireo_core::raster::{CLEAR_COLOR, fallback_checkerboard};
use vireo_core::transform::params::ColorPipelineParams;
use vireo_core::transform::slot::LutHandle;

use crate::error::GpuError;
use crate::target_format;
use crate::textures::{FrameTexture, LutTexture, transparent_pixel};
use crate::uniforms::{BoundTextures, PipelineUniforms};

pub struct ColorPipeline {
    device: wgpu::Device,
    queue: wgpu::Queue,
    shader: wgpu::ShaderModule,
    bind_group_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    pipelines: Vec<(wgpu::TextureFormat, wgpu::RenderPipeline)>,
    uniform_buffer: wgpu::Buffer,
    fallback: FrameTexture,
    transparent: FrameTexture,
    lut_placeholder: LutTexture,
    frame: Option<FrameTexture>,
    compare: Option<FrameTexture>,
    overlay: Option<FrameTexture>,
    lut: Option<LutTexture>,
    /// Generation of the last lattice the device refused, so it is not
    /// retried every draw.
    rejected_lut: Option<u64>,
}

impl ColorPipeline {
    /// Compile `color_pipeline.wgsl` and create the fixed resources.
    ///
    /// Pipelines for the SDR and extended-range targets are built up front;
    /// any other target format is compiled on first use.
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Result<Self, GpuError> {
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("vireo_color_pipeline_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/color_pipeline.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("vireo_color_pipeline_layout"),
            entries: &[
                // binding 0: uniforms
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: NonZeroU64::new(
                            std::mem::size_of::<PipelineUniforms>() as u64,
                        ),
                    },
                    count: None,
                },
                // bindings 1-3: primary, compare, overlay
                texture_entry(1, wgpu::TextureViewDimension::D2),
                texture_entry(2, wgpu::TextureViewDimension::D2),
                texture_entry(3, wgpu::TextureViewDimension::D2),
                // binding 4: LUT lattice
                texture_entry(4, wgpu::TextureViewDimension::D3),
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("vireo_color_pipeline_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("vireo_color_pipeline_uniforms"),
            size: std::mem::size_of::<PipelineUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let fallback = FrameTexture::upload(
            &device,
            &queue,
            &fallback_checkerboard(),
            "vireo_fallback_checkerboard",
        )?;
        let transparent = FrameTexture::upload(
            &device,
            &queue,
            &transparent_pixel(),
            "vireo_transparent_overlay",
        )?;
        let lut_placeholder = LutTexture::placeholder(&device, &queue);

        let pipelines = [
            target_format(vireo_core::HdrMode::Sdr),
            target_format(vireo_core::HdrMode::Pq),
        ]
        .into_iter()
        .map(|format| (format, build_pipeline(&device, &shader, &pipeline_layout, format)))
        .collect();

        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            tracing::error!("color pipeline creation failed: {err}");
            return Err(GpuError::Pipeline(err.to_string()));
        }
        tracing::info!("color pipeline ready");

        Ok(Self {
            device,
            queue,
            shader,
            bind_group_layout,
            pipeline_layout,
            pipelines,
            uniform_buffer,
            fallback,
            transparent,
            lut_placeholder,
            frame: None,
            compare: None,
            overlay: None,
            lut: None,
            rejected_lut: None,
        })
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Bind the primary frame. `None` shows the fallback checkerboard.
    /// Returns whether a texture upload happened.
    pub fn set_frame(&mut self, frame: Option<&PixelBuffer>) -> bool {
        upload_slot(
            &self.device,
            &self.queue,
            &mut self.frame,
            frame,
            "vireo_primary_frame",
        )
    }

    /// Bind the A/B compare frame.
    pub fn set_compare(&mut self, frame: Option<&PixelBuffer>) -> bool {
        upload_slot(
            &self.device,
            &self.queue,
            &mut self.compare,
            frame,
            "vireo_compare_frame",
        )
    }

    /// Bind the overlay layer. `None` binds a 1×1 transparent texture.
    pub fn set_overlay(&mut self, overlay: Option<&PixelBuffer>) -> bool {
        upload_slot(
            &self.device,
            &self.queue,
            &mut self.overlay,
            overlay,
            "vireo_overlay",
        )
    }

    /// Upload `lut` if its generation differs from the bound lattice.
    pub fn set_lut(&mut self, lut: Option<&LutHandle>) -> bool {
        match (lut, &self.lut) {
            (None, None) => false,
            (None, Some(_)) => {
                self.lut = None;
                false
            }
            (Some(handle), Some(bound)) if bound.generation == handle.generation() => false,
            (Some(handle), _) if self.rejected_lut == Some(handle.generation()) => false,
            (Some(handle), _) => match LutTexture::upload(&self.device, &self.queue, handle) {
                Ok(texture) => {
                    self.lut = Some(texture);
                    self.rejected_lut = None;
                    tracing::debug!(
                        generation = handle.generation(),
                        size = handle.cube().size(),
                        "LUT uploaded"
                    );
                    true
                }
                Err(e) => {
                    tracing::warn!(
                        generation = handle.generation(),
                        "LUT not uploaded, drawing without it: {e}"
                    );
                    self.lut = None;
                    self.rejected_lut = Some(handle.generation());
                    false
                }
            },
        }
    }

    /// Bind everything `params` references: the LUT handle.
    pub fn sync_params(&mut self, params: &ColorPipelineParams) {
        self.set_lut(params.lut.handle.as_ref());
    }

    /// Record the draw into `encoder`, clearing `target` first.
    pub fn encode(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        format: wgpu::TextureFormat,
        view_size: [u32; 2],
        params: &ColorPipelineParams,
    ) {
        self.sync_params(params);

        let primary = self.frame.as_ref().unwrap_or(&self.fallback);
        let compare = self.compare.as_ref().unwrap_or(primary);
        let overlay = self.overlay.as_ref().unwrap_or(&self.transparent);
        let lut = self.lut.as_ref().unwrap_or(&self.lut_placeholder);

        let bound = BoundTextures {
            view_size,
            primary_swizzle: primary.swizzle,
            compare_swizzle: compare.swizzle,
            overlay_swizzle: overlay.swizzle,
            has_compare: self.compare.is_some(),
            has_overlay: self.overlay.is_some(),
            has_lut: self.lut.is_some(),
        };
        let uniforms = PipelineUniforms::new(params, &bound);
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("vireo_color_pipeline_bind_group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&primary.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&compare.view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(&overlay.view),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::TextureView(&lut.view),
                },
            ],
        });

        let pipeline = self.pipeline_for(format);

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("vireo_color_pipeline_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: CLEAR_COLOR[0] as f64,
                        g: CLEAR_COLOR[1] as f64,
                        b: CLEAR_COLOR[2] as f64,
                        a: CLEAR_COLOR[3] as f64,
                    }),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
        });
        pass.set_pipeline(&pipeline);
        pass.set_bind_group(0, &bind_group, &[]);
        pass.draw(0..4, 0..1);
    }

    /// Encode and submit one draw to `target`.
    pub fn render(
        &mut self,
        target: &wgpu::TextureView,
        format: wgpu::TextureFormat,
        view_size: [u32; 2],
        params: &ColorPipelineParams,
    ) {
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("vireo_color_pipeline_encoder"),
            });
        self.encode(&mut encoder, target, format, view_size, params);
        self.queue.submit(std::iter::once(encoder.finish()));
    }

    fn pipeline_for(&mut self, format: wgpu::TextureFormat) -> wgpu::RenderPipeline {
        if let Some((_, pipeline)) = self.pipelines.iter().find(|(f, _)| *f == format) {
            return pipeline.clone();
        }
        tracing::debug!(?format, "compiling color pipeline for new target format");
        let pipeline = build_pipeline(&self.device, &self.shader, &self.pipeline_layout, format);
        self.pipelines.push((format, pipeline.clone()));
        pipeline
    }
}

fn upload_slot(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    slot: &mut Option<FrameTexture>,
    frame: Option<&PixelBuffer>,
    label: &str,
) -> bool {
    let Some(frame) = frame else {
        *slot = None;
        return false;
    };
    if slot.as_ref().is_some_and(|bound| bound.holds(frame)) {
        return false;
    }
    match FrameTexture::upload(device, queue, frame, label) {
        Ok(texture) => {
            *slot = Some(texture);
            true
        }
        Err(e) => {
            tracing::warn!(label, "frame not uploaded, using placeholder: {e}");
            *slot = None;
            false
        }
    }
}

fn texture_entry(binding: u32, view_dimension: wgpu::TextureViewDimension) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: false },
            view_dimension,
            multisampled: false,
        },
        count: None,
    }
}

fn build_pipeline(
    device: &wgpu::Device,
    shader: &wgpu::ShaderModule,
    layout: &wgpu::PipelineLayout,
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("vireo_color_pipeline"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleStrip,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        multiview: None,
        cache: None,
    })
}
