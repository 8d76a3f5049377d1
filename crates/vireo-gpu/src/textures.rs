//! Texture uploads: decoded frames, the overlay layer and LUT lattices.

use vireo_core::pixel::{PixelBuffer, PixelFormat};
use vireo_core::transform::lut::{LutCube, LutDimension};
use vireo_core::transform::slot::LutHandle;

use crate::error::GpuError;
use crate::uniforms::{SWIZZLE_ARGB, SWIZZLE_RGBA};

/// Row length of the texture a 1D LUT is folded into. Matches
/// `LUT_1D_ROW` in the shader.
pub const LUT_1D_ROW: u32 = 2048;

/// A 2D texture holding one [`PixelBuffer`].
pub struct FrameTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub swizzle: u32,
    /// The buffer this texture was uploaded from.
    pub source: PixelBuffer,
}

impl FrameTexture {
    /// Upload `frame`. ARGB is uploaded as RGBA and reordered in the shader.
    ///
    /// Frames wider or taller than `max_texture_dimension_2d` are rejected
    /// with [`GpuError::TextureTooLarge`].
    pub fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        frame: &PixelBuffer,
        label: &str,
    ) -> Result<Self, GpuError> {
        let (format, swizzle) = match frame.format() {
            PixelFormat::Bgra8 => (wgpu::TextureFormat::Bgra8Unorm, SWIZZLE_RGBA),
            PixelFormat::Rgba8 => (wgpu::TextureFormat::Rgba8Unorm, SWIZZLE_RGBA),
            PixelFormat::Argb8 => (wgpu::TextureFormat::Rgba8Unorm, SWIZZLE_ARGB),
            PixelFormat::Rgba16Float => (wgpu::TextureFormat::Rgba16Float, SWIZZLE_RGBA),
            other => return Err(GpuError::UnsupportedFormat(other)),
        };
        if frame.is_empty() {
            return Err(GpuError::UnsupportedFormat(frame.format()));
        }
        let bpp = frame
            .format()
            .bytes_per_pixel()
            .ok_or(GpuError::UnsupportedFormat(frame.format()))?;

        let (width, height) = (frame.width(), frame.height());
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        check_extent(size, device.limits().max_texture_dimension_2d)?;
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        // Row padding that is not a whole number of texels is repacked.
        let stride = frame.bytes_per_row();
        let repacked;
        let (bytes, bytes_per_row) = if stride % bpp == 0 {
            (frame.data(), stride)
        } else {
            let row = width as usize * bpp;
            repacked = frame
                .data()
                .chunks(stride)
                .take(height as usize)
                .flat_map(|r| &r[..row])
                .copied()
                .collect::<Vec<u8>>();
            (repacked.as_slice(), row)
        };

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            bytes,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row as u32),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Ok(Self {
            texture,
            view,
            swizzle,
            source: frame.clone(),
        })
    }

    /// Whether this texture already holds `frame`.
    pub fn holds(&self, frame: &PixelBuffer) -> bool {
        self.source.same_buffer(frame)
    }
}

/// A LUT lattice as a 3D `Rgba32Float` texture, read with `textureLoad`.
///
/// 3D cubes map red to x, green to y and blue to z, which is the file order.
/// 1D tables are folded into rows of [`LUT_1D_ROW`] texels.
pub struct LutTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    /// Slot generation the lattice came from, 0 for the placeholder.
    pub generation: u64,
}

impl LutTexture {
    /// Upload the lattice behind `handle`. Both layouts live in a 3D texture,
    /// so every axis is checked against `max_texture_dimension_3d`.
    pub fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        handle: &LutHandle,
    ) -> Result<Self, GpuError> {
        let (size, texels) = lattice(handle.cube());
        check_extent(size, device.limits().max_texture_dimension_3d)?;
        Ok(Self::create(device, queue, size, &texels, handle.generation()))
    }

    /// 1×1×1 placeholder bound while no LUT is active.
    pub fn placeholder(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let size = wgpu::Extent3d {
            width: 1,
            height: 1,
            depth_or_array_layers: 1,
        };
        Self::create(device, queue, size, &[[0.0; 4]], 0)
    }

    fn create(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        size: wgpu::Extent3d,
        texels: &[[f32; 4]],
        generation: u64,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("vireo_lut_texture_3d"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D3,
            format: wgpu::TextureFormat::Rgba32Float,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            bytemuck::cast_slice(texels),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(size.width * 16),
                rows_per_image: Some(size.height),
            },
            size,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            generation,
        }
    }
}

fn check_extent(size: wgpu::Extent3d, max: u32) -> Result<(), GpuError> {
    let wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: depth,
    } = size;
    if width > max || height > max || depth > max {
        return Err(GpuError::TextureTooLarge {
            width,
            height,
            depth,
            max,
        });
    }
    Ok(())
}

/// Texture extent and texel data for a cube.
fn lattice(cube: &LutCube) -> (wgpu::Extent3d, Vec<[f32; 4]>) {
    let mut texels: Vec<[f32; 4]> = cube
        .values()
        .iter()
        .map(|v| [v.x, v.y, v.z, 1.0])
        .collect();
    let size = match cube.dimension() {
        LutDimension::ThreeD(n) => wgpu::Extent3d {
            width: n as u32,
            height: n as u32,
            depth_or_array_layers: n as u32,
        },
        LutDimension::OneD(n) => {
            let n = n as u32;
            let rows = n.div_ceil(LUT_1D_ROW);
            let width = n.min(LUT_1D_ROW);
            texels.resize((width * rows) as usize, [0.0; 4]);
            wgpu::Extent3d {
                width,
                height: rows,
                depth_or_array_layers: 1,
            }
        }
    };
    (size, texels)
}

/// 1×1 transparent texture bound while no overlay is set.
pub fn transparent_pixel() -> PixelBuffer {
    PixelBuffer::solid(1, 1, PixelFormat::Rgba8, [0, 0, 0, 0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use vireo_core::transform::lut::{MAX_1D_SIZE, MAX_3D_SIZE};

    #[test]
    fn test_3d_lattice_extent() {
        let (size, texels) = lattice(&LutCube::identity_3d(5));
        assert_eq!((size.width, size.height, size.depth_or_array_layers), (5, 5, 5));
        assert_eq!(texels.len(), 125);
        // x varies fastest: entry 1 is red = 0.25.
        assert_eq!(texels[1], [0.25, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_long_1d_table_folds_into_rows() {
        let (size, texels) = lattice(&LutCube::identity_1d(4096 + 10));
        assert_eq!(size.width, LUT_1D_ROW);
        assert_eq!(size.height, 3);
        assert_eq!(texels.len(), (LUT_1D_ROW * 3) as usize);
    }

    #[test]
    fn test_short_1d_table_is_one_row() {
        let (size, _) = lattice(&LutCube::identity_1d(33));
        assert_eq!((size.width, size.height), (33, 1));
    }

    fn extent(width: u32, height: u32, depth: u32) -> wgpu::Extent3d {
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: depth,
        }
    }

    #[test]
    fn test_extent_within_limit_is_accepted() {
        assert!(check_extent(extent(8192, 8192, 1), 8192).is_ok());
        assert!(check_extent(extent(1, 1, 1), 1).is_ok());
    }

    #[test]
    fn test_extent_over_limit_is_rejected() {
        let err = check_extent(extent(8193, 2, 1), 8192).unwrap_err();
        assert!(matches!(
            err,
            GpuError::TextureTooLarge {
                width: 8193,
                height: 2,
                depth: 1,
                max: 8192
            }
        ));
        assert!(check_extent(extent(4, 70_000, 1), 8192).is_err());
        assert!(check_extent(extent(300, 300, 300), 256).is_err());
    }

    #[test]
    fn test_largest_lattices_fit_default_3d_limit() {
        let max = wgpu::Limits::default().max_texture_dimension_3d;
        let (size, _) = lattice(&LutCube::identity_1d(MAX_1D_SIZE));
        assert_eq!((size.width, size.height), (LUT_1D_ROW, 32));
        assert!(check_extent(size, max).is_ok());
        let edge = MAX_3D_SIZE as u32;
        assert!(check_extent(extent(edge, edge, edge), max).is_ok());
    }
}
