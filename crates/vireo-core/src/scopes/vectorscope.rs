//! Vectorscope (chrominance) scope computation.
//!
//! Each sampled pixel is projected onto the Rec. 709 Cb/Cr plane and counted
//! in a square grid spanning `[-0.5, 0.5]` on both axes. The grid centre is
//! neutral; hue is the angle, saturation the distance from the centre.

use serde::{Deserialize, Serialize};

use super::{ScopeSampling, normalize};
use crate::color_management::chroma;
use crate::pixel::PixelBuffer;

/// Default vectorscope grid resolution.
pub const DEFAULT_RESOLUTION: u32 = 256;

/// Largest accepted grid resolution.
pub const MAX_RESOLUTION: u32 = 4096;

/// Vectorscope density grid, normalized to the single busiest cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorscopeData {
    /// Resolution of the square grid.
    pub resolution: u32,
    /// `density[row * resolution + col]`; columns follow Cb, rows follow Cr,
    /// both increasing from `-0.5`.
    pub density: Vec<f32>,
}

impl VectorscopeData {
    /// Density at the cell holding chroma `(cb, cr)`.
    pub fn at(&self, cb: f32, cr: f32) -> f32 {
        let n = self.resolution;
        self.density[index(cb, cr, n)]
    }
}

/// Compute the vectorscope of a frame.
pub fn compute(
    buffer: &PixelBuffer,
    sampling: ScopeSampling,
    resolution: u32,
) -> Option<VectorscopeData> {
    let reader = buffer.reader()?;
    let n = resolution.clamp(1, MAX_RESOLUTION);
    let mut counts = vec![0u32; n as usize * n as usize];

    sampling.for_each(&reader, |x, y| {
        let (cb, cr) = chroma(reader.rgb(x, y));
        counts[index(cb, cr, n)] += 1;
    });

    let peak = counts.iter().copied().max().unwrap_or(0);
    Some(VectorscopeData {
        resolution: n,
        density: normalize(&counts, peak),
    })
}

#[inline]
fn index(cb: f32, cr: f32, n: u32) -> usize {
    cell(cr, n) as usize * n as usize + cell(cb, n) as usize
}

/// Grid cell of a chroma component; out-of-range values land on the rim.
#[inline]
fn cell(c: f32, n: u32) -> u32 {
    let t = (c + 0.5) * n as f32;
    // NaN saturates to 0 in the cast.
    (t.max(0.0) as u32).min(n - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::PixelFormat;

    #[test]
    fn test_vectorscope_neutral_concentrates_at_center() {
        let frame = PixelBuffer::solid(10, 10, PixelFormat::Bgra8, [128, 128, 128, 255]);
        let vs = compute(&frame, ScopeSampling::FULL, DEFAULT_RESOLUTION).unwrap();
        let (cb, cr) = chroma([128.0 / 255.0; 3]);
        assert!(cb.abs() < 1e-6 && cr.abs() < 1e-6);
        assert_eq!(vs.at(cb, cr), 1.0);
        let lit = vs.density.iter().filter(|&&v| v > 0.0).count();
        assert_eq!(lit, 1);
    }

    #[test]
    fn test_vectorscope_red_sits_high_cr() {
        let frame = PixelBuffer::solid(4, 4, PixelFormat::Argb8, [255, 0, 0, 255]);
        let vs = compute(&frame, ScopeSampling::FULL, 64).unwrap();
        let (cb, cr) = chroma([1.0, 0.0, 0.0]);
        assert!(cr > 0.49 && cb < 0.0);
        assert_eq!(vs.at(cb, cr), 1.0);
    }

    #[test]
    fn test_vectorscope_global_peak() {
        // Three grey pixels and one blue: grey cell is the peak.
        let mut data = Vec::new();
        for i in 0..4 {
            let px = if i == 0 { [0, 0, 255, 255] } else { [90, 90, 90, 255] };
            data.extend_from_slice(&px);
        }
        let frame = PixelBuffer::packed(4, 1, PixelFormat::Rgba8, data).unwrap();
        let vs = compute(&frame, ScopeSampling::FULL, DEFAULT_RESOLUTION).unwrap();
        let (cb, cr) = chroma([90.0 / 255.0; 3]);
        assert_eq!(vs.at(cb, cr), 1.0);
        let (cb, cr) = chroma([0.0, 0.0, 1.0]);
        assert!((vs.at(cb, cr) - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_vectorscope_empty_frame() {
        let frame = PixelBuffer::solid(0, 0, PixelFormat::Rgba8, [0; 4]);
        assert!(compute(&frame, ScopeSampling::FULL, DEFAULT_RESOLUTION).is_none());
    }

    #[test]
    fn test_oversized_resolution_is_clamped() {
        let frame = PixelBuffer::solid(2, 2, PixelFormat::Rgba8, [40, 200, 90, 255]);
        let vs = compute(&frame, ScopeSampling::FULL, 65536).unwrap();
        assert_eq!(vs.resolution, MAX_RESOLUTION);
        assert_eq!(vs.density.len(), (MAX_RESOLUTION * MAX_RESOLUTION) as usize);
        let (cb, cr) = chroma([40.0 / 255.0, 200.0 / 255.0, 90.0 / 255.0]);
        assert_eq!(vs.at(cb, cr), 1.0);
    }
}
