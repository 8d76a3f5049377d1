//! Scope computation: histogram, waveform and vectorscope.
//!
//! Every analyzer walks the frame on a fixed row/column stride, accumulates
//! per-bucket counts and normalizes them into `[0, 1]`. Empty frames and
//! unknown pixel formats yield `None`.

pub mod histogram;
pub mod scheduler;
pub mod vectorscope;
pub mod waveform;

pub use histogram::HistogramData;
pub use scheduler::ScopeScheduler;
pub use vectorscope::VectorscopeData;
pub use waveform::WaveformData;

use serde::{Deserialize, Serialize};

use crate::pixel::PixelReader;

/// Number of luma levels on the vertical axis of histogram and waveform.
pub const LEVELS: usize = 256;

/// Sub-sampling factors. A stride of 4 reads every 4th row and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeSampling {
    pub row_stride: u32,
    pub column_stride: u32,
}

impl Default for ScopeSampling {
    fn default() -> Self {
        Self {
            row_stride: 4,
            column_stride: 4,
        }
    }
}

impl ScopeSampling {
    /// Every pixel.
    pub const FULL: Self = Self {
        row_stride: 1,
        column_stride: 1,
    };

    /// Visit every sampled `(x, y)` of the reader.
    #[inline]
    pub(crate) fn for_each(&self, reader: &PixelReader<'_>, mut f: impl FnMut(u32, u32)) {
        let rows = self.row_stride.max(1) as usize;
        let cols = self.column_stride.max(1) as usize;
        for y in (0..reader.height()).step_by(rows) {
            for x in (0..reader.width()).step_by(cols) {
                f(x, y);
            }
        }
    }
}

/// Analyzer settings shared by the scheduler and the one-shot entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeSettings {
    pub sampling: ScopeSampling,
    pub waveform_columns: u32,
    pub vectorscope_resolution: u32,
}

impl Default for ScopeSettings {
    fn default() -> Self {
        Self {
            sampling: ScopeSampling::default(),
            waveform_columns: 256,
            vectorscope_resolution: vectorscope::DEFAULT_RESOLUTION,
        }
    }
}

/// Rec. 709 luma level of an 8-bit triple, rounded to the nearest bin.
#[inline]
pub(crate) fn luma_level(rgb: [u8; 3]) -> usize {
    let y = crate::color_management::luma([rgb[0] as f32, rgb[1] as f32, rgb[2] as f32]);
    (y.round() as usize).min(LEVELS - 1)
}

/// Divide `counts` by `peak`, clamping to 1.
pub(crate) fn normalize(counts: &[u32], peak: u32) -> Vec<f32> {
    if peak == 0 {
        return vec![0.0; counts.len()];
    }
    let inv = 1.0 / peak as f32;
    counts
        .iter()
        .map(|&c| if c >= peak { 1.0 } else { c as f32 * inv })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_peak_is_exactly_one() {
        let out = normalize(&[0, 3, 7, 7], 7);
        assert_eq!(out[2], 1.0);
        assert_eq!(out[3], 1.0);
        assert!(out.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_luma_level_extremes() {
        assert_eq!(luma_level([0, 0, 0]), 0);
        assert_eq!(luma_level([255, 255, 255]), 255);
    }
}
