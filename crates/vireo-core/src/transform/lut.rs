//! 1D/3D colour cubes and `.cube` text I/O.
//!
//! # Format
//!
//! ```text
//! # comment
//! TITLE "Show LUT"
//! LUT_3D_SIZE 33
//! DOMAIN_MIN 0.0 0.0 0.0
//! DOMAIN_MAX 1.0 1.0 1.0
//! 0.0 0.0 0.0
//! ...
//! ```
//!
//! Keywords are case-insensitive. Table rows are stored in file order: red
//! varies fastest, then green, then blue, so entry `(r, g, b)` lives at
//! `r + g * n + b * n²`. The GPU uploads the same order as a 3D texture with
//! `x = r`, `y = g`, `z = b`.
//!
//! Parsing is strict and single-pass: the first malformed line fails the
//! whole load and no partial cube is produced.

use std::fmt::Write as _;
use std::path::Path;
use std::str::FromStr;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::color_management::luma;

/// Largest accepted 3D edge length (256³ entries).
pub const MAX_3D_SIZE: usize = 256;
/// Largest accepted 1D length.
pub const MAX_1D_SIZE: usize = 65536;

/// Errors raised while loading a cube.
#[derive(Debug, thiserror::Error)]
pub enum LutError {
    #[error("missing LUT_1D_SIZE or LUT_3D_SIZE directive")]
    MissingSize,
    #[error("line {line}: {reason}")]
    InvalidLine { line: usize, reason: String },
    #[error("expected {expected} table entries, found {actual}")]
    InvalidDataCount { expected: usize, actual: usize },
    #[error("LUT size {size} outside 2..={max}")]
    InvalidSize { size: usize, max: usize },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LutError {
    fn line(line: usize, reason: impl Into<String>) -> Self {
        Self::InvalidLine {
            line,
            reason: reason.into(),
        }
    }
}

/// Shape of the lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LutDimension {
    /// `size` entries applied along luma.
    OneD(usize),
    /// `size³` entries sampled trilinearly.
    ThreeD(usize),
}

impl LutDimension {
    /// Entries per axis.
    pub const fn size(self) -> usize {
        match self {
            Self::OneD(n) | Self::ThreeD(n) => n,
        }
    }

    /// Total number of table rows this shape requires.
    pub const fn entry_count(self) -> usize {
        match self {
            Self::OneD(n) => n,
            Self::ThreeD(n) => n * n * n,
        }
    }

    pub const fn is_3d(self) -> bool {
        matches!(self, Self::ThreeD(_))
    }

    /// Largest size accepted for this kind of table.
    pub const fn max_size(self) -> usize {
        match self {
            Self::OneD(_) => MAX_1D_SIZE,
            Self::ThreeD(_) => MAX_3D_SIZE,
        }
    }
}

/// An immutable colour lookup lattice.
///
/// Replaced wholesale when a new file is loaded; never edited in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LutCubeData")]
pub struct LutCube {
    title: Option<String>,
    dimension: LutDimension,
    domain_min: Vec3,
    domain_max: Vec3,
    values: Vec<Vec3>,
}

impl LutCube {
    /// Build a cube from already-ordered values.
    ///
    /// Fails with [`LutError::InvalidSize`] when the edge length is below 2
    /// or above the parser limit, and with [`LutError::InvalidDataCount`]
    /// when `values` does not match the dimension.
    pub fn new(
        dimension: LutDimension,
        domain_min: Vec3,
        domain_max: Vec3,
        values: Vec<Vec3>,
    ) -> Result<Self, LutError> {
        let (size, max) = (dimension.size(), dimension.max_size());
        if !(2..=max).contains(&size) {
            return Err(LutError::InvalidSize { size, max });
        }
        let expected = dimension.entry_count();
        if values.len() != expected {
            return Err(LutError::InvalidDataCount {
                expected,
                actual: values.len(),
            });
        }
        Ok(Self {
            title: None,
            dimension,
            domain_min,
            domain_max,
            values,
        })
    }

    /// Identity 3D cube of edge `size`, clamped to `2..=MAX_3D_SIZE`.
    pub fn identity_3d(size: usize) -> Self {
        let size = size.clamp(2, MAX_3D_SIZE);
        let scale = 1.0 / (size - 1) as f32;
        let mut values = Vec::with_capacity(size * size * size);
        for b in 0..size {
            for g in 0..size {
                for r in 0..size {
                    values.push(Vec3::new(r as f32, g as f32, b as f32) * scale);
                }
            }
        }
        Self {
            title: None,
            dimension: LutDimension::ThreeD(size),
            domain_min: Vec3::ZERO,
            domain_max: Vec3::ONE,
            values,
        }
    }

    /// Identity 1D ramp of `size` entries, clamped to `2..=MAX_1D_SIZE`.
    pub fn identity_1d(size: usize) -> Self {
        let size = size.clamp(2, MAX_1D_SIZE);
        let values = (0..size)
            .map(|i| Vec3::splat(i as f32 / (size - 1) as f32))
            .collect();
        Self {
            title: None,
            dimension: LutDimension::OneD(size),
            domain_min: Vec3::ZERO,
            domain_max: Vec3::ONE,
            values,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_domain(mut self, min: Vec3, max: Vec3) -> Self {
        self.domain_min = min;
        self.domain_max = max;
        self
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn dimension(&self) -> LutDimension {
        self.dimension
    }

    pub fn size(&self) -> usize {
        self.dimension.size()
    }

    pub fn domain_min(&self) -> Vec3 {
        self.domain_min
    }

    pub fn domain_max(&self) -> Vec3 {
        self.domain_max
    }

    /// Table rows in file order (red fastest).
    pub fn values(&self) -> &[Vec3] {
        &self.values
    }

    /// Read and parse a `.cube` file.
    pub fn load(path: &Path) -> Result<Self, LutError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Parse `.cube` text.
    pub fn parse(text: &str) -> Result<Self, LutError> {
        let mut title = None;
        let mut dimension: Option<LutDimension> = None;
        let mut domain_min = Vec3::ZERO;
        let mut domain_max = Vec3::ONE;
        let mut domain_line = 0;
        let mut values = Vec::new();

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (keyword, rest) = match line.split_once(char::is_whitespace) {
                Some((k, r)) => (k, r.trim()),
                None => (line, ""),
            };

            if keyword.eq_ignore_ascii_case("TITLE") {
                title = Some(rest.trim_matches('"').to_string());
                continue;
            }

            let body = strip_comment(rest);
            if keyword.eq_ignore_ascii_case("LUT_3D_SIZE") {
                let size = parse_size(body, line_no, MAX_3D_SIZE)?;
                set_dimension(&mut dimension, line_no, LutDimension::ThreeD(size))?;
            } else if keyword.eq_ignore_ascii_case("LUT_1D_SIZE") {
                let size = parse_size(body, line_no, MAX_1D_SIZE)?;
                set_dimension(&mut dimension, line_no, LutDimension::OneD(size))?;
            } else if keyword.eq_ignore_ascii_case("DOMAIN_MIN") {
                domain_min = parse_triplet(body, line_no)?;
                domain_line = line_no;
            } else if keyword.eq_ignore_ascii_case("DOMAIN_MAX") {
                domain_max = parse_triplet(body, line_no)?;
                domain_line = line_no;
            } else if keyword.eq_ignore_ascii_case("LUT_1D_INPUT_RANGE")
                || keyword.eq_ignore_ascii_case("LUT_3D_INPUT_RANGE")
            {
                let [lo, hi] = parse_floats::<2>(body, line_no)?;
                domain_min = Vec3::splat(lo);
                domain_max = Vec3::splat(hi);
                domain_line = line_no;
            } else {
                values.push(parse_triplet(strip_comment(line), line_no)?);
            }
        }

        let dimension = dimension.ok_or(LutError::MissingSize)?;
        if domain_max.cmple(domain_min).any() {
            return Err(LutError::line(
                domain_line,
                format!("domain max {domain_max} must exceed domain min {domain_min}"),
            ));
        }

        let mut cube = Self::new(dimension, domain_min, domain_max, values)?;
        cube.title = title;
        tracing::debug!(
            size = dimension.size(),
            is_3d = dimension.is_3d(),
            "parsed LUT"
        );
        Ok(cube)
    }

    /// Write the cube back to `.cube` text that [`LutCube::parse`] reads to
    /// an identical value.
    pub fn serialize(&self) -> String {
        let mut out = String::with_capacity(self.values.len() * 24 + 128);
        if let Some(title) = &self.title {
            let _ = writeln!(out, "TITLE \"{title}\"");
        }
        match self.dimension {
            LutDimension::OneD(n) => {
                let _ = writeln!(out, "LUT_1D_SIZE {n}");
            }
            LutDimension::ThreeD(n) => {
                let _ = writeln!(out, "LUT_3D_SIZE {n}");
            }
        }
        let (lo, hi) = (self.domain_min, self.domain_max);
        let _ = writeln!(out, "DOMAIN_MIN {} {} {}", lo.x, lo.y, lo.z);
        let _ = writeln!(out, "DOMAIN_MAX {} {} {}", hi.x, hi.y, hi.z);
        for v in &self.values {
            let _ = writeln!(out, "{} {} {}", v.x, v.y, v.z);
        }
        out
    }

    /// Save as a `.cube` file.
    pub fn save(&self, path: &Path) -> Result<(), LutError> {
        std::fs::write(path, self.serialize())?;
        Ok(())
    }

    /// Normalize a colour into the lattice domain, clamped to `[0, 1]`.
    pub fn normalize(&self, rgb: [f32; 3]) -> [f32; 3] {
        let (lo, hi) = (self.domain_min, self.domain_max);
        [
            unit(rgb[0], lo.x, hi.x),
            unit(rgb[1], lo.y, hi.y),
            unit(rgb[2], lo.z, hi.z),
        ]
    }

    /// Look up a colour at full strength.
    ///
    /// 3D cubes interpolate trilinearly between the 8 surrounding lattice
    /// points. 1D tables are indexed by the Rec. 709 luma of the input,
    /// normalized against the red-channel domain.
    pub fn sample(&self, rgb: [f32; 3]) -> [f32; 3] {
        match self.dimension {
            LutDimension::ThreeD(n) => self.sample_3d(n, self.normalize(rgb)),
            LutDimension::OneD(n) => {
                let t = unit(luma(rgb), self.domain_min.x, self.domain_max.x);
                self.sample_1d(n, t)
            }
        }
    }

    fn sample_1d(&self, n: usize, t: f32) -> [f32; 3] {
        let (i0, f) = lattice_cell(t, n);
        self.values[i0].lerp(self.values[i0 + 1], f).to_array()
    }

    fn sample_3d(&self, n: usize, t: [f32; 3]) -> [f32; 3] {
        let (r0, fr) = lattice_cell(t[0], n);
        let (g0, fg) = lattice_cell(t[1], n);
        let (b0, fb) = lattice_cell(t[2], n);
        let at = |r: usize, g: usize, b: usize| self.values[r + g * n + b * n * n];

        let c00 = at(r0, g0, b0).lerp(at(r0 + 1, g0, b0), fr);
        let c10 = at(r0, g0 + 1, b0).lerp(at(r0 + 1, g0 + 1, b0), fr);
        let c01 = at(r0, g0, b0 + 1).lerp(at(r0 + 1, g0, b0 + 1), fr);
        let c11 = at(r0, g0 + 1, b0 + 1).lerp(at(r0 + 1, g0 + 1, b0 + 1), fr);

        let c0 = c00.lerp(c10, fg);
        let c1 = c01.lerp(c11, fg);
        c0.lerp(c1, fb).to_array()
    }
}

/// Wire shape of [`LutCube`]; deserialization goes through [`LutCube::new`].
#[derive(Deserialize)]
struct LutCubeData {
    title: Option<String>,
    dimension: LutDimension,
    domain_min: Vec3,
    domain_max: Vec3,
    values: Vec<Vec3>,
}

impl TryFrom<LutCubeData> for LutCube {
    type Error = LutError;

    fn try_from(data: LutCubeData) -> Result<Self, Self::Error> {
        let mut cube = Self::new(data.dimension, data.domain_min, data.domain_max, data.values)?;
        cube.title = data.title;
        Ok(cube)
    }
}

impl FromStr for LutCube {
    type Err = LutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

/// `(x - lo) / (hi - lo)` clamped to `[0, 1]`, NaN mapped to 0.
#[inline]
fn unit(x: f32, lo: f32, hi: f32) -> f32 {
    let t = (x - lo) / (hi - lo);
    if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) }
}

/// Lower lattice index and fractional offset for `t ∈ [0, 1]` on an axis of
/// `n >= 2` points.
#[inline]
fn lattice_cell(t: f32, n: usize) -> (usize, f32) {
    let pos = t * (n - 1) as f32;
    let i0 = (pos.floor() as usize).min(n - 2);
    (i0, pos - i0 as f32)
}

fn strip_comment(s: &str) -> &str {
    match s.find('#') {
        Some(at) => s[..at].trim_end(),
        None => s,
    }
}

fn set_dimension(
    slot: &mut Option<LutDimension>,
    line: usize,
    dimension: LutDimension,
) -> Result<(), LutError> {
    if let Some(existing) = slot {
        return Err(LutError::line(
            line,
            format!("size already declared as {existing:?}"),
        ));
    }
    *slot = Some(dimension);
    Ok(())
}

fn parse_size(body: &str, line: usize, max: usize) -> Result<usize, LutError> {
    let mut tokens = body.split_whitespace();
    let (Some(token), None) = (tokens.next(), tokens.next()) else {
        return Err(LutError::line(line, "size directive takes exactly one value"));
    };
    let size: usize = token
        .parse()
        .map_err(|_| LutError::line(line, format!("invalid size {token:?}")))?;
    if !(2..=max).contains(&size) {
        return Err(LutError::line(
            line,
            format!("size {size} outside 2..={max}"),
        ));
    }
    Ok(size)
}

fn parse_floats<const N: usize>(body: &str, line: usize) -> Result<[f32; N], LutError> {
    let mut out = [0.0f32; N];
    let mut tokens = body.split_whitespace();
    for slot in &mut out {
        let token = tokens
            .next()
            .ok_or_else(|| LutError::line(line, format!("expected {N} values")))?;
        let value: f32 = token
            .parse()
            .map_err(|_| LutError::line(line, format!("invalid number {token:?}")))?;
        if !value.is_finite() {
            return Err(LutError::line(line, format!("non-finite value {token:?}")));
        }
        *slot = value;
    }
    if tokens.next().is_some() {
        return Err(LutError::line(line, format!("expected {N} values")));
    }
    Ok(out)
}

fn parse_triplet(body: &str, line: usize) -> Result<Vec3, LutError> {
    parse_floats::<3>(body, line).map(Vec3::from_array)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn corners() -> String {
        let mut text = String::from("# corners\nLUT_3D_SIZE 2\n");
        for b in 0..2 {
            for g in 0..2 {
                for r in 0..2 {
                    text.push_str(&format!("{r} {g} {b}\n"));
                }
            }
        }
        text
    }

    #[test]
    fn test_parse_corner_cube() {
        let cube = LutCube::parse(&corners()).unwrap();
        assert_eq!(cube.dimension(), LutDimension::ThreeD(2));
        assert_eq!(cube.domain_min(), Vec3::ZERO);
        assert_eq!(cube.domain_max(), Vec3::ONE);
        assert_eq!(cube.values().len(), 8);
        assert_eq!(cube.values()[1], Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(cube.values()[4], Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_missing_size() {
        let err = LutCube::parse("0 0 0\n1 1 1\n").unwrap_err();
        assert!(matches!(err, LutError::MissingSize));
    }

    #[test]
    fn test_short_table_reports_counts() {
        let text: String = corners().lines().take(9).map(|l| format!("{l}\n")).collect();
        match LutCube::parse(&text).unwrap_err() {
            LutError::InvalidDataCount { expected, actual } => {
                assert_eq!(expected, 8);
                assert_eq!(actual, 7);
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_bad_data_line_fails_whole_parse() {
        let text = corners().replace("1 1 1", "1 1");
        match LutCube::parse(&text).unwrap_err() {
            LutError::InvalidLine { line, .. } => assert_eq!(line, 10),
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_bad_size_directive() {
        for text in ["LUT_3D_SIZE\n", "LUT_3D_SIZE two\n", "LUT_3D_SIZE 1\n", "LUT_3D_SIZE 2 3\n"] {
            assert!(
                matches!(LutCube::parse(text), Err(LutError::InvalidLine { line: 1, .. })),
                "{text:?}"
            );
        }
    }

    #[test]
    fn test_duplicate_size_is_rejected() {
        let text = format!("LUT_1D_SIZE 2\n{}", corners());
        assert!(matches!(
            LutCube::parse(&text),
            Err(LutError::InvalidLine { line: 3, .. })
        ));
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        let text = "title \"x\"\nlut_1d_size 2\ndomain_min 0 0 0\nDomain_Max 2 2 2\n0 0 0\n1 1 1\n";
        let cube = LutCube::parse(text).unwrap();
        assert_eq!(cube.title(), Some("x"));
        assert_eq!(cube.dimension(), LutDimension::OneD(2));
        assert_eq!(cube.domain_max(), Vec3::splat(2.0));
    }

    #[test]
    fn test_inverted_domain_is_rejected() {
        let text = "LUT_1D_SIZE 2\nDOMAIN_MIN 1 1 1\nDOMAIN_MAX 0 1 1\n0 0 0\n1 1 1\n";
        assert!(matches!(
            LutCube::parse(text),
            Err(LutError::InvalidLine { line: 3, .. })
        ));
    }

    #[test]
    fn test_non_finite_value_is_rejected() {
        let text = corners().replace("0 0 0\n", "nan 0 0\n");
        assert!(matches!(
            LutCube::parse(&text),
            Err(LutError::InvalidLine { .. })
        ));
    }

    #[test]
    fn test_identity_3d_reproduces_input() {
        let cube = LutCube::identity_3d(17);
        for rgb in [[0.0, 0.0, 0.0], [0.13, 0.57, 0.91], [1.0, 0.5, 0.25], [1.0, 1.0, 1.0]] {
            let out = cube.sample(rgb);
            for c in 0..3 {
                assert!((out[c] - rgb[c]).abs() < EPSILON, "{rgb:?} -> {out:?}");
            }
        }
    }

    #[test]
    fn test_trilinear_midpoint_of_corner_cube() {
        let cube = LutCube::parse(&corners()).unwrap();
        let out = cube.sample([0.5, 0.25, 0.75]);
        assert!((out[0] - 0.5).abs() < EPSILON);
        assert!((out[1] - 0.25).abs() < EPSILON);
        assert!((out[2] - 0.75).abs() < EPSILON);
    }

    #[test]
    fn test_sample_clamps_outside_domain() {
        let cube = LutCube::identity_3d(5).with_domain(Vec3::splat(0.0), Vec3::splat(2.0));
        let out = cube.sample([4.0, -1.0, 1.0]);
        assert!((out[0] - 1.0).abs() < EPSILON);
        assert!(out[1].abs() < EPSILON);
        assert!((out[2] - 0.5).abs() < EPSILON);
    }

    #[test]
    fn test_1d_indexes_by_luma() {
        let values = vec![Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0)];
        let cube = LutCube::new(LutDimension::OneD(2), Vec3::ZERO, Vec3::ONE, values).unwrap();
        let out = cube.sample([1.0, 1.0, 1.0]);
        assert!((out[0] - 1.0).abs() < EPSILON);
        let out = cube.sample([0.0, 1.0, 0.0]);
        assert!((out[0] - 0.7152).abs() < EPSILON);
        assert_eq!(out[1], 0.0);
    }

    #[test]
    fn test_round_trip_keeps_exact_values() {
        let mut cube = LutCube::identity_3d(3).with_title("grade v2");
        cube.values[5] = Vec3::new(0.123_456_79, 1.0e-7, 3.333_333_3);
        let cube = cube.with_domain(Vec3::new(-0.1, 0.0, 0.0), Vec3::new(1.5, 1.0, 1.0));
        let parsed = LutCube::parse(&cube.serialize()).unwrap();
        assert_eq!(parsed, cube);
    }

    #[test]
    fn test_inline_comment_after_values() {
        let text = corners().replace("1 1 1\n", "1 1 1 # white\n");
        assert_eq!(LutCube::parse(&text).unwrap().values()[7], Vec3::ONE);
    }

    #[test]
    fn test_new_rejects_degenerate_sizes() {
        for dimension in [LutDimension::ThreeD(0), LutDimension::OneD(0)] {
            assert!(matches!(
                LutCube::new(dimension, Vec3::ZERO, Vec3::ONE, Vec::new()),
                Err(LutError::InvalidSize { size: 0, .. })
            ));
        }
        let single = vec![Vec3::splat(0.5)];
        assert!(matches!(
            LutCube::new(LutDimension::ThreeD(1), Vec3::ZERO, Vec3::ONE, single.clone()),
            Err(LutError::InvalidSize { size: 1, max: MAX_3D_SIZE })
        ));
        assert!(matches!(
            LutCube::new(LutDimension::OneD(1), Vec3::ZERO, Vec3::ONE, single),
            Err(LutError::InvalidSize { size: 1, max: MAX_1D_SIZE })
        ));
    }

    #[test]
    fn test_new_rejects_sizes_above_parser_limit() {
        let err = LutCube::new(
            LutDimension::OneD(MAX_1D_SIZE + 1),
            Vec3::ZERO,
            Vec3::ONE,
            Vec::new(),
        )
        .unwrap_err();
        assert!(matches!(err, LutError::InvalidSize { max: MAX_1D_SIZE, .. }));
        assert!(matches!(
            LutCube::new(LutDimension::ThreeD(MAX_3D_SIZE + 1), Vec3::ZERO, Vec3::ONE, Vec::new()),
            Err(LutError::InvalidSize { .. })
        ));
    }

    #[test]
    fn test_deserialize_validates_shape() {
        let cube = LutCube::identity_1d(4).with_title("ramp");
        let json = serde_json::to_string(&cube).unwrap();
        assert_eq!(serde_json::from_str::<LutCube>(&json).unwrap(), cube);

        let degenerate = r#"{"title":null,"dimension":{"ThreeD":1},
            "domain_min":[0,0,0],"domain_max":[1,1,1],"values":[[0.5,0.5,0.5]]}"#;
        let err = serde_json::from_str::<LutCube>(degenerate).unwrap_err();
        assert!(err.to_string().contains("outside 2..="));

        let short = r#"{"title":null,"dimension":{"OneD":3},
            "domain_min":[0,0,0],"domain_max":[1,1,1],"values":[[0,0,0]]}"#;
        assert!(serde_json::from_str::<LutCube>(short).is_err());
    }

    #[test]
    fn test_1d_round_trip_keeps_exact_values() {
        let values: Vec<Vec3> = (0..17)
            .map(|i| {
                let t = i as f32 / 16.0;
                Vec3::new(t * t, t.sqrt(), 1.0 - t + 1.0e-7)
            })
            .collect();
        let cube = LutCube::new(
            LutDimension::OneD(17),
            Vec3::splat(-0.25),
            Vec3::splat(1.75),
            values,
        )
        .unwrap()
        .with_title("1d curve");
        let text = cube.serialize();
        assert!(text.contains("LUT_1D_SIZE 17"));
        let parsed = LutCube::parse(&text).unwrap();
        assert_eq!(parsed, cube);
        assert_eq!(parsed.sample([0.6, 0.6, 0.6]), cube.sample([0.6, 0.6, 0.6]));
    }
}
