//! RGB + luma histogram computation.

use serde::{Deserialize, Serialize};

use super::{LEVELS, ScopeSampling, luma_level, normalize};
use crate::pixel::PixelBuffer;

/// Histogram for R, G, B and luma, 256 bins each.
///
/// All four channels are divided by the largest R/G/B bin so relative
/// channel brightness survives normalization. Luma bins are clamped to 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramData {
    /// Normalized bins for `[R, G, B, Luma]`. Each `Vec` has 256 entries.
    pub bins: [Vec<f32>; 4],
    /// Raw count of the tallest R/G/B bin.
    pub peak: u32,
    /// Number of pixels sampled.
    pub samples: u32,
}

impl HistogramData {
    pub fn red(&self) -> &[f32] {
        &self.bins[0]
    }

    pub fn green(&self) -> &[f32] {
        &self.bins[1]
    }

    pub fn blue(&self) -> &[f32] {
        &self.bins[2]
    }

    pub fn luma(&self) -> &[f32] {
        &self.bins[3]
    }
}

/// Compute the histogram of a frame.
pub fn compute(buffer: &PixelBuffer, sampling: ScopeSampling) -> Option<HistogramData> {
    let reader = buffer.reader()?;
    let mut counts = [[0u32; LEVELS]; 4];
    let mut samples = 0u32;

    sampling.for_each(&reader, |x, y| {
        let rgb = reader.rgb_levels(x, y);
        counts[0][rgb[0] as usize] += 1;
        counts[1][rgb[1] as usize] += 1;
        counts[2][rgb[2] as usize] += 1;
        counts[3][luma_level(rgb)] += 1;
        samples += 1;
    });

    let peak = counts[..3]
        .iter()
        .flat_map(|c| c.iter().copied())
        .max()
        .unwrap_or(0);

    Some(HistogramData {
        bins: [
            normalize(&counts[0], peak),
            normalize(&counts[1], peak),
            normalize(&counts[2], peak),
            normalize(&counts[3], peak),
        ],
        peak,
        samples,
    })
}
