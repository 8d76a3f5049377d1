//! Vireo Review: host-side orchestration of the review pipeline.
//!
//! Ties the frame feeds, view transform, LUT slot and scope scheduler from
//! `vireo-core` to the `vireo-gpu` renderer. Hosts call
//! [`ReviewSession::tick`] once per display refresh and hand the result to a
//! [`Presenter`].

pub mod config;
pub mod presenter;
pub mod session;

pub use config::{ConfigError, ReviewConfig};
pub use presenter::{Presenter, UploadStats};
pub use session::{DisplaySettings, ReviewSession, TickOutput};
