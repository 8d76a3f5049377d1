//! Colour math shared by the shading stage, the scopes and the CPU reference.

pub mod false_color;
pub mod tone_map;

/// Rec. 709 luma weights for R, G, B.
pub const REC709_LUMA: [f32; 3] = [0.2126, 0.7152, 0.0722];

/// Rec. 709 luma of a linear or display-encoded RGB triple.
#[inline]
pub fn luma(rgb: [f32; 3]) -> f32 {
    REC709_LUMA[0] * rgb[0] + REC709_LUMA[1] * rgb[1] + REC709_LUMA[2] * rgb[2]
}

/// Rec. 709 colour-difference components `(Cb, Cr)`, each in `[-0.5, 0.5]`
/// for inputs in `[0, 1]`.
///
/// ```text
/// Cb = (B - Y) / 1.8556
/// Cr = (R - Y) / 1.5748
/// ```
#[inline]
pub fn chroma(rgb: [f32; 3]) -> (f32, f32) {
    let y = luma(rgb);
    ((rgb[2] - y) / 1.8556, (rgb[0] - y) / 1.5748)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_luma_weights_sum_to_one() {
        assert!((luma([1.0, 1.0, 1.0]) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_chroma_extremes_stay_in_range() {
        let (cb, _) = chroma([0.0, 0.0, 1.0]);
        let (_, cr) = chroma([1.0, 0.0, 0.0]);
        assert!((cb - 0.5).abs() < 1e-4);
        assert!((cr - 0.5).abs() < 1e-4);
        let (cb, cr) = chroma([0.5, 0.5, 0.5]);
        assert!(cb.abs() < 1e-6 && cr.abs() < 1e-6);
    }
}
