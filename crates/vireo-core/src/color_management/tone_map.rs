//! HDR to SDR tone mapping applied by the shading stage.
//!
//! ```text
//! reinhard(c) = c / (1 + c)
//! encode(c)   = c ^ (1 / 2.2)
//! ```
//!
//! Negative inputs are clamped to zero before compression.

use serde::{Deserialize, Serialize};

/// Display gamma used after compression.
pub const DISPLAY_GAMMA: f32 = 2.2;

/// Dynamic range of the content being presented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HdrMode {
    /// Standard dynamic range, 8-bit presentation.
    #[default]
    Sdr,
    /// Hybrid Log-Gamma content.
    Hlg,
    /// Perceptual Quantizer (SMPTE ST 2084) content.
    Pq,
}

impl HdrMode {
    /// HLG and PQ present through an extended-range target.
    pub const fn is_extended_range(self) -> bool {
        !matches!(self, Self::Sdr)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Sdr => "SDR",
            Self::Hlg => "HLG",
            Self::Pq => "PQ",
        }
    }
}

/// Reinhard compression of one channel.
#[inline]
pub fn reinhard(c: f32) -> f32 {
    let c = c.max(0.0);
    c / (1.0 + c)
}

/// Compress and gamma-encode an RGB triple.
#[inline]
pub fn tone_map(rgb: [f32; 3]) -> [f32; 3] {
    rgb.map(|c| reinhard(c).powf(1.0 / DISPLAY_GAMMA))
}
