//! Colour transform model: LUT lattices, the per-tick parameter snapshot and
//! the per-sample shading chain.

pub mod evaluate;
pub mod lut;
pub mod params;
pub mod slot;
