//! Vireo Core: domain layer for the review colour pipeline.
//!
//! Pixel buffers, the `.cube` LUT model, the per-draw parameter snapshot and
//! its CPU reference shading, zoom/pan view state, the live frame feed and
//! the scope analyzers. No GPU dependencies.

pub mod color_management;
pub mod feed;
pub mod overlay;
pub mod pixel;
pub mod raster;
pub mod scopes;
pub mod transform;
pub mod view;

// Re-exports for convenience.
pub use color_management::tone_map::HdrMode;
pub use feed::{FeedState, FrameFeed, FrameProvider, FrameSource};
pub use pixel::{PixelBuffer, PixelFormat};
pub use transform::evaluate::shade;
pub use transform::lut::{LutCube, LutDimension, LutError};
pub use transform::params::ColorPipelineParams;
pub use transform::slot::{LutHandle, LutSlot};
pub use view::{TransformState, ViewTransform, ZoomCommand};
