//! Pre-rasterized overlay layer (HUD text, annotation strokes) composited
//! last. The pipeline treats it as an opaque straight-alpha image covering
//! the whole view.

use parking_lot::Mutex;

use crate::pixel::PixelBuffer;

#[derive(Debug, Clone)]
pub struct OverlayPayload {
    pub image: PixelBuffer,
    pub enabled: bool,
}

/// Pull interface for the overlay collaborator.
pub trait OverlaySource: Send + Sync {
    fn overlay(&self) -> Option<OverlayPayload>;
}

impl<F> OverlaySource for F
where
    F: Fn() -> Option<OverlayPayload> + Send + Sync,
{
    fn overlay(&self) -> Option<OverlayPayload> {
        self()
    }
}

/// Overlay set imperatively by the host.
#[derive(Debug, Default)]
pub struct OverlaySlot {
    current: Mutex<Option<OverlayPayload>>,
}

impl OverlaySlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, payload: OverlayPayload) {
        *self.current.lock() = Some(payload);
    }

    pub fn clear(&self) {
        *self.current.lock() = None;
    }
}

impl OverlaySource for OverlaySlot {
    fn overlay(&self) -> Option<OverlayPayload> {
        self.current.lock().clone()
    }
}
