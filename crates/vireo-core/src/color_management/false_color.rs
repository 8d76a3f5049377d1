//! Exposure false-colour classification.
//!
//! Luma is bucketed into eight fixed bands and each band replaces the pixel
//! with a flat indicator colour. The band edges are calibration data that
//! colourists compare against camera false-colour scales; keep them as-is.

/// One exposure band: every luma strictly below `upper` (and not caught by
/// an earlier band) is painted `color`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FalseColorBand {
    pub upper: f32,
    pub color: [f32; 3],
    pub label: &'static str,
}

/// Band table, ordered by increasing upper edge. The last band catches
/// everything above 0.95.
pub const FALSE_COLOR_BANDS: [FalseColorBand; 8] = [
    FalseColorBand {
        upper: 0.02,
        color: [0.35, 0.0, 0.45],
        label: "black clip",
    },
    FalseColorBand {
        upper: 0.10,
        color: [0.0, 0.2, 0.85],
        label: "under",
    },
    FalseColorBand {
        upper: 0.18,
        color: [0.3, 0.65, 1.0],
        label: "dark",
    },
    FalseColorBand {
        upper: 0.45,
        color: [0.1, 0.7, 0.2],
        label: "mid-low",
    },
    FalseColorBand {
        upper: 0.70,
        color: [0.5, 0.5, 0.5],
        label: "normal",
    },
    FalseColorBand {
        upper: 0.85,
        color: [1.0, 0.9, 0.0],
        label: "bright",
    },
    FalseColorBand {
        upper: 0.95,
        color: [1.0, 0.5, 0.0],
        label: "near clip",
    },
    FalseColorBand {
        upper: f32::INFINITY,
        color: [1.0, 0.0, 0.0],
        label: "clip",
    },
];

/// Index into [`FALSE_COLOR_BANDS`] for a luma value.
pub fn band_index(luma: f32) -> usize {
    FALSE_COLOR_BANDS
        .iter()
        .position(|band| luma < band.upper)
        .unwrap_or(FALSE_COLOR_BANDS.len() - 1)
}

/// Indicator colour for a luma value.
pub fn classify(luma: f32) -> [f32; 3] {
    FALSE_COLOR_BANDS[band_index(luma)].color
}
