//! Decoded pixel buffers handed to the color pipeline by the external decoder.
//!
//! A [`PixelBuffer`] is immutable once delivered. Cloning it shares the same
//! allocation, so the decoder, the frame feed and the renderer can all hold
//! the same frame and the last holder releases it.

use std::fmt;
use std::sync::Arc;

use glam::Vec2;
use half::f16;
use serde::{Deserialize, Serialize};

/// Interleaved pixel layouts the pipeline understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PixelFormat {
    /// 8-bit BGRA, the usual output of hardware video decoders.
    Bgra8,
    /// 8-bit ARGB.
    Argb8,
    /// 8-bit RGBA.
    Rgba8,
    /// 16-bit half-float RGBA, scene-linear HDR.
    Rgba16Float,
    /// A layout produced by a foreign decoder, identified by its four-cc.
    /// Never sampled; every consumer answers "no result" for it.
    Unknown(u32),
}

impl PixelFormat {
    /// Bytes per pixel, `None` for [`PixelFormat::Unknown`].
    pub const fn bytes_per_pixel(self) -> Option<usize> {
        match self {
            Self::Bgra8 | Self::Argb8 | Self::Rgba8 => Some(4),
            Self::Rgba16Float => Some(8),
            Self::Unknown(_) => None,
        }
    }

    /// Byte offsets of each channel inside a packed 32-bit pixel.
    ///
    /// Only the 8-bit formats have a packed layout.
    pub const fn channel_offsets(self) -> Option<ChannelOffsets> {
        match self {
            Self::Bgra8 => Some(ChannelOffsets {
                red: 2,
                green: 1,
                blue: 0,
                alpha: 3,
            }),
            Self::Argb8 => Some(ChannelOffsets {
                red: 1,
                green: 2,
                blue: 3,
                alpha: 0,
            }),
            Self::Rgba8 => Some(ChannelOffsets {
                red: 0,
                green: 1,
                blue: 2,
                alpha: 3,
            }),
            Self::Rgba16Float | Self::Unknown(_) => None,
        }
    }

    /// Whether samples may exceed 1.0 (extended range).
    pub const fn is_hdr(self) -> bool {
        matches!(self, Self::Rgba16Float)
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bgra8 => write!(f, "BGRA8"),
            Self::Argb8 => write!(f, "ARGB8"),
            Self::Rgba8 => write!(f, "RGBA8"),
            Self::Rgba16Float => write!(f, "RGBA16F"),
            Self::Unknown(code) => {
                let bytes = code.to_be_bytes();
                if bytes.iter().all(|b| b.is_ascii_graphic() || *b == b' ') {
                    write!(f, "'{}'", String::from_utf8_lossy(&bytes))
                } else {
                    write!(f, "0x{code:08x}")
                }
            }
        }
    }
}

/// Byte offset of each channel within one packed 32-bit pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelOffsets {
    pub red: usize,
    pub green: usize,
    pub blue: usize,
    pub alpha: usize,
}

/// Rejected buffer geometry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PixelBufferError {
    #[error("row stride of {stride} bytes is smaller than {min} bytes for one row")]
    RowStride { stride: usize, min: usize },
    #[error("buffer holds {actual} bytes, {expected} required")]
    Size { expected: usize, actual: usize },
}

struct Inner {
    width: u32,
    height: u32,
    bytes_per_row: usize,
    format: PixelFormat,
    data: Vec<u8>,
}

/// Shared handle to one decoded frame.
#[derive(Clone)]
pub struct PixelBuffer {
    inner: Arc<Inner>,
}

impl PixelBuffer {
    /// Wrap decoded bytes. Rows may carry trailing padding (`bytes_per_row`).
    ///
    /// Buffers in an unknown format are accepted as-is since their layout
    /// cannot be checked.
    pub fn new(
        width: u32,
        height: u32,
        format: PixelFormat,
        bytes_per_row: usize,
        data: Vec<u8>,
    ) -> Result<Self, PixelBufferError> {
        if let Some(bpp) = format.bytes_per_pixel() {
            let min = width as usize * bpp;
            if bytes_per_row < min {
                return Err(PixelBufferError::RowStride {
                    stride: bytes_per_row,
                    min,
                });
            }
            let expected = if height == 0 {
                0
            } else {
                bytes_per_row * (height as usize - 1) + min
            };
            if data.len() < expected {
                return Err(PixelBufferError::Size {
                    expected,
                    actual: data.len(),
                });
            }
        }
        Ok(Self {
            inner: Arc::new(Inner {
                width,
                height,
                bytes_per_row,
                format,
                data,
            }),
        })
    }

    /// Wrap tightly packed rows.
    pub fn packed(
        width: u32,
        height: u32,
        format: PixelFormat,
        data: Vec<u8>,
    ) -> Result<Self, PixelBufferError> {
        let stride = width as usize * format.bytes_per_pixel().unwrap_or(0);
        Self::new(width, height, format, stride, data)
    }

    /// Build a half-float buffer from RGBA f32 samples in row-major order.
    pub fn from_rgba_f32(
        width: u32,
        height: u32,
        pixels: &[[f32; 4]],
    ) -> Result<Self, PixelBufferError> {
        let mut data = Vec::with_capacity(pixels.len() * 8);
        for px in pixels {
            for c in px {
                data.extend_from_slice(&f16::from_f32(*c).to_le_bytes());
            }
        }
        Self::packed(width, height, PixelFormat::Rgba16Float, data)
    }

    /// Build an 8-bit buffer filled with one colour, mostly for placeholders
    /// and tests.
    pub fn solid(width: u32, height: u32, format: PixelFormat, rgba: [u8; 4]) -> Self {
        let offsets = format.channel_offsets().unwrap_or(ChannelOffsets {
            red: 0,
            green: 1,
            blue: 2,
            alpha: 3,
        });
        let mut px = [0u8; 4];
        px[offsets.red] = rgba[0];
        px[offsets.green] = rgba[1];
        px[offsets.blue] = rgba[2];
        px[offsets.alpha] = rgba[3];
        let data = px.repeat(width as usize * height as usize);
        Self {
            inner: Arc::new(Inner {
                width,
                height,
                bytes_per_row: width as usize * 4,
                format: if format.channel_offsets().is_some() {
                    format
                } else {
                    PixelFormat::Rgba8
                },
                data,
            }),
        }
    }

    pub fn width(&self) -> u32 {
        self.inner.width
    }

    pub fn height(&self) -> u32 {
        self.inner.height
    }

    pub fn format(&self) -> PixelFormat {
        self.inner.format
    }

    pub fn bytes_per_row(&self) -> usize {
        self.inner.bytes_per_row
    }

    /// Raw bytes including any row padding.
    pub fn data(&self) -> &[u8] {
        &self.inner.data
    }

    /// `width / height`, `None` for an empty buffer.
    pub fn aspect(&self) -> Option<f32> {
        if self.is_empty() {
            None
        } else {
            Some(self.inner.width as f32 / self.inner.height as f32)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.inner.width == 0 || self.inner.height == 0
    }

    /// True when both handles point at the same decoded frame.
    pub fn same_buffer(&self, other: &PixelBuffer) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Read-only accessor, `None` for empty buffers or unknown formats.
    pub fn reader(&self) -> Option<PixelReader<'_>> {
        if self.is_empty() {
            return None;
        }
        let layout = match self.inner.format {
            PixelFormat::Rgba16Float => Layout::Half,
            other => Layout::Packed8(other.channel_offsets()?),
        };
        Some(PixelReader {
            data: &self.inner.data,
            width: self.inner.width,
            height: self.inner.height,
            bytes_per_row: self.inner.bytes_per_row,
            layout,
        })
    }

    /// Normalized RGB at pixel `(x, y)`; `None` outside the buffer or for an
    /// unsupported format.
    pub fn sample_rgb(&self, x: u32, y: u32) -> Option<[f32; 3]> {
        let reader = self.reader()?;
        (x < reader.width && y < reader.height).then(|| reader.rgb(x, y))
    }

    /// Nearest-pixel sample at video UV (`v = 0` at the top).
    pub fn sample_uv(&self, uv: Vec2) -> Option<[f32; 3]> {
        if !(0.0..=1.0).contains(&uv.x) || !(0.0..=1.0).contains(&uv.y) {
            return None;
        }
        let reader = self.reader()?;
        let x = ((uv.x * reader.width as f32) as u32).min(reader.width - 1);
        let y = ((uv.y * reader.height as f32) as u32).min(reader.height - 1);
        Some(reader.rgb(x, y))
    }

    /// Decode the whole frame to RGBA f32, row-major without padding.
    pub fn to_rgba_f32(&self) -> Option<Vec<[f32; 4]>> {
        let reader = self.reader()?;
        let mut out = Vec::with_capacity(reader.width as usize * reader.height as usize);
        for y in 0..reader.height {
            for x in 0..reader.width {
                out.push(reader.rgba(x, y));
            }
        }
        Some(out)
    }
}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.inner.width)
            .field("height", &self.inner.height)
            .field("format", &self.inner.format)
            .field("bytes_per_row", &self.inner.bytes_per_row)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy)]
enum Layout {
    Packed8(ChannelOffsets),
    Half,
}

/// Borrowed decoder for the samples of a [`PixelBuffer`].
///
/// Coordinates passed to the accessors must be inside the buffer.
#[derive(Debug, Clone, Copy)]
pub struct PixelReader<'a> {
    data: &'a [u8],
    width: u32,
    height: u32,
    bytes_per_row: usize,
    layout: Layout,
}

impl PixelReader<'_> {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn offset(&self, x: u32, y: u32, bpp: usize) -> usize {
        debug_assert!(x < self.width && y < self.height);
        y as usize * self.bytes_per_row + x as usize * bpp
    }

    #[inline]
    fn half(&self, at: usize) -> f32 {
        f16::from_le_bytes([self.data[at], self.data[at + 1]]).to_f32()
    }

    /// RGBA with 8-bit channels scaled to `[0, 1]` and half floats as stored.
    #[inline]
    pub fn rgba(&self, x: u32, y: u32) -> [f32; 4] {
        match self.layout {
            Layout::Packed8(o) => {
                let at = self.offset(x, y, 4);
                let px = &self.data[at..at + 4];
                [
                    px[o.red] as f32 / 255.0,
                    px[o.green] as f32 / 255.0,
                    px[o.blue] as f32 / 255.0,
                    px[o.alpha] as f32 / 255.0,
                ]
            }
            Layout::Half => {
                let at = self.offset(x, y, 8);
                [
                    self.half(at),
                    self.half(at + 2),
                    self.half(at + 4),
                    self.half(at + 6),
                ]
            }
        }
    }

    #[inline]
    pub fn rgb(&self, x: u32, y: u32) -> [f32; 3] {
        let [r, g, b, _] = self.rgba(x, y);
        [r, g, b]
    }

    /// RGB quantized to 256 levels. 8-bit channels are returned verbatim;
    /// half floats are clamped to `[0, 1]` first.
    #[inline]
    pub fn rgb_levels(&self, x: u32, y: u32) -> [u8; 3] {
        match self.layout {
            Layout::Packed8(o) => {
                let at = self.offset(x, y, 4);
                let px = &self.data[at..at + 4];
                [px[o.red], px[o.green], px[o.blue]]
            }
            Layout::Half => {
                let [r, g, b] = self.rgb(x, y);
                [to_level(r), to_level(g), to_level(b)]
            }
        }
    }
}

#[inline]
fn to_level(v: f32) -> u8 {
    // NaN clamps to 0 through the `as` conversion.
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packed_formats_read_same_colour() {
        for format in [PixelFormat::Bgra8, PixelFormat::Argb8, PixelFormat::Rgba8] {
            let buf = PixelBuffer::solid(2, 2, format, [10, 20, 30, 255]);
            let reader = buf.reader().expect("packed format is readable");
            assert_eq!(reader.rgb_levels(1, 1), [10, 20, 30], "{format}");
        }
    }

    #[test]
    fn test_row_padding_is_skipped() {
        // 1x2 RGBA with 4 bytes of padding per row.
        let data = vec![255, 0, 0, 255, 9, 9, 9, 9, 0, 255, 0, 255];
        let buf = PixelBuffer::new(1, 2, PixelFormat::Rgba8, 8, data).unwrap();
        assert_eq!(buf.sample_rgb(0, 1), Some([0.0, 1.0, 0.0]));
    }

    #[test]
    fn test_short_buffer_is_rejected() {
        let err = PixelBuffer::packed(2, 2, PixelFormat::Bgra8, vec![0; 15]).unwrap_err();
        assert_eq!(
            err,
            PixelBufferError::Size {
                expected: 16,
                actual: 15
            }
        );
    }

    #[test]
    fn test_unknown_format_has_no_reader() {
        let buf = PixelBuffer::new(4, 4, PixelFormat::Unknown(0x7932_3076), 0, vec![]).unwrap();
        assert!(buf.reader().is_none());
        assert!(buf.sample_rgb(0, 0).is_none());
    }

    #[test]
    fn test_half_float_keeps_extended_range() {
        let buf = PixelBuffer::from_rgba_f32(1, 1, &[[2.0, 0.5, 0.0, 1.0]]).unwrap();
        assert_eq!(buf.sample_rgb(0, 0), Some([2.0, 0.5, 0.0]));
        assert_eq!(buf.reader().unwrap().rgb_levels(0, 0), [255, 128, 0]);
    }

    #[test]
    fn test_sample_uv_top_left_is_first_row() {
        let mut data = vec![0u8; 2 * 2 * 4];
        data[0..4].copy_from_slice(&[255, 255, 255, 255]);
        let buf = PixelBuffer::packed(2, 2, PixelFormat::Rgba8, data).unwrap();
        assert_eq!(buf.sample_uv(Vec2::new(0.1, 0.1)), Some([1.0, 1.0, 1.0]));
        assert_eq!(buf.sample_uv(Vec2::new(0.9, 0.9)), Some([0.0, 0.0, 0.0]));
        assert!(buf.sample_uv(Vec2::new(1.5, 0.0)).is_none());
    }

    #[test]
    fn test_clones_share_allocation() {
        let a = PixelBuffer::solid(1, 1, PixelFormat::Rgba8, [0; 4]);
        let b = a.clone();
        let c = PixelBuffer::solid(1, 1, PixelFormat::Rgba8, [0; 4]);
        assert!(a.same_buffer(&b));
        assert!(!a.same_buffer(&c));
    }
}
