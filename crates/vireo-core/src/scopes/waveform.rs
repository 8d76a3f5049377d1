//! Waveform (luma) scope computation.

use serde::{Deserialize, Serialize};

use super::{LEVELS, ScopeSampling, luma_level, normalize};
use crate::pixel::PixelBuffer;

/// Waveform scope data: luma level against horizontal position.
///
/// Image columns are bucketed into `columns` output columns by
/// `x * columns / width`; each output column holds a 256-level luma
/// histogram normalized to its own peak.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveformData {
    /// Number of output columns.
    pub columns: u32,
    /// Number of luma levels per column (always 256).
    pub levels: u32,
    /// Density, `density[column * levels + level]`.
    pub density: Vec<f32>,
}

impl WaveformData {
    /// Levels of one output column, bottom (black) first.
    pub fn column(&self, column: u32) -> &[f32] {
        let levels = self.levels as usize;
        let start = column as usize * levels;
        &self.density[start..start + levels]
    }
}

/// Largest accepted number of output columns.
pub const MAX_COLUMNS: u32 = 4096;

/// Compute the waveform of a frame.
pub fn compute(buffer: &PixelBuffer, sampling: ScopeSampling, columns: u32) -> Option<WaveformData> {
    let reader = buffer.reader()?;
    let columns = columns.clamp(1, MAX_COLUMNS);
    let width = reader.width() as u64;
    let mut counts = vec![0u32; columns as usize * LEVELS];

    sampling.for_each(&reader, |x, y| {
        let column = (x as u64 * columns as u64 / width) as usize;
        let level = luma_level(reader.rgb_levels(x, y));
        counts[column * LEVELS + level] += 1;
    });

    let mut density = Vec::with_capacity(counts.len());
    for column in counts.chunks_exact(LEVELS) {
        let peak = column.iter().copied().max().unwrap_or(0);
        density.extend(normalize(column, peak));
    }

    Some(WaveformData {
        columns,
        levels: LEVELS as u32,
        density,
    })
}
