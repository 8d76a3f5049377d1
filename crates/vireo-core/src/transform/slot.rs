//! Holder for the active LUT.
//!
//! A single writer replaces the cube wholesale; readers clone a cheap
//! [`LutHandle`]. Every replacement bumps a generation number so the GPU
//! side re-uploads only when the lattice actually changed.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::transform::lut::{LutCube, LutError};

/// Shared reference to a loaded cube plus the generation it was installed at.
#[derive(Debug, Clone)]
pub struct LutHandle {
    cube: Arc<LutCube>,
    generation: u64,
}

impl LutHandle {
    pub fn cube(&self) -> &LutCube {
        &self.cube
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl PartialEq for LutHandle {
    fn eq(&self, other: &Self) -> bool {
        self.generation == other.generation && Arc::ptr_eq(&self.cube, &other.cube)
    }
}

/// The active LUT, or none.
#[derive(Debug, Default)]
pub struct LutSlot {
    current: RwLock<Option<LutHandle>>,
    generation: AtomicU64,
}

impl LutSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently active cube.
    pub fn current(&self) -> Option<LutHandle> {
        self.current.read().clone()
    }

    /// Install `cube`, returning its handle.
    pub fn replace(&self, cube: LutCube) -> LutHandle {
        let handle = LutHandle {
            cube: Arc::new(cube),
            generation: self.generation.fetch_add(1, Ordering::AcqRel) + 1,
        };
        *self.current.write() = Some(handle.clone());
        handle
    }

    /// Remove the active cube.
    pub fn clear(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        *self.current.write() = None;
    }

    /// Parse `text` and install it. On error the previous cube stays active.
    pub fn load_str(&self, text: &str) -> Result<LutHandle, LutError> {
        let cube = LutCube::parse(text)?;
        Ok(self.replace(cube))
    }

    /// Read, parse and install a `.cube` file. On error the previous cube
    /// stays active.
    pub fn load_file(&self, path: &Path) -> Result<LutHandle, LutError> {
        match LutCube::load(path) {
            Ok(cube) => {
                let handle = self.replace(cube);
                tracing::info!(
                    path = %path.display(),
                    size = handle.cube().size(),
                    generation = handle.generation(),
                    "LUT loaded"
                );
                Ok(handle)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), "LUT load failed, keeping previous: {e}");
                Err(e)
            }
        }
    }
}
