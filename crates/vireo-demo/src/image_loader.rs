//! Image loading and the image-sequence frame source.

use std::path::{Path, PathBuf};

use vireo_core::feed::source::{DecodeSession, FeedError, FrameSource};
use vireo_core::pixel::{PixelBuffer, PixelBufferError, PixelFormat};

const EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "tif", "tiff", "exr", "bmp"];

/// Load an image from disk as a [`PixelBuffer`].
///
/// 8-bit images stay 8-bit RGBA; deeper images are converted to half-float
/// so extended-range values survive.
pub fn load_pixel_buffer(path: &Path) -> Result<PixelBuffer, ImageLoadError> {
    let img = image::open(path).map_err(ImageLoadError::Decode)?;
    let buffer = match img.color() {
        image::ColorType::L8
        | image::ColorType::La8
        | image::ColorType::Rgb8
        | image::ColorType::Rgba8 => {
            let rgba = img.to_rgba8();
            let (width, height) = rgba.dimensions();
            PixelBuffer::packed(width, height, PixelFormat::Rgba8, rgba.into_raw())?
        }
        _ => {
            let rgba = img.to_rgba32f();
            let (width, height) = rgba.dimensions();
            let pixels: Vec<[f32; 4]> = rgba.pixels().map(|p| p.0).collect();
            PixelBuffer::from_rgba_f32(width, height, &pixels)?
        }
    };
    Ok(buffer)
}

/// Errors that can occur during image loading.
#[derive(Debug, thiserror::Error)]
pub enum ImageLoadError {
    #[error("failed to decode image: {0}")]
    Decode(image::ImageError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("no images found in {0}")]
    Empty(PathBuf),
    #[error("unusable pixel data: {0}")]
    Buffer(#[from] PixelBufferError),
}

/// A directory of numbered stills played back at a fixed rate. Frames are
/// decoded on the feed's worker thread as they are pulled.
#[derive(Debug, Clone)]
pub struct ImageSequenceSource {
    paths: Vec<PathBuf>,
    fps: f32,
}

impl ImageSequenceSource {
    /// Collect the image files of `dir`, sorted by file name.
    pub fn from_dir(dir: &Path, fps: f32) -> Result<Self, ImageLoadError> {
        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
            })
            .collect();
        if paths.is_empty() {
            return Err(ImageLoadError::Empty(dir.to_path_buf()));
        }
        paths.sort();
        tracing::info!(dir = %dir.display(), frames = paths.len(), fps, "image sequence found");
        Ok(Self { paths, fps })
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }
}

impl FrameSource for ImageSequenceSource {
    fn open(&self, at_seconds: f64) -> Result<Box<dyn DecodeSession>, FeedError> {
        let start = (at_seconds.max(0.0) * self.fps.max(1.0) as f64).floor() as usize;
        if start >= self.paths.len() {
            return Err(FeedError::Open(format!(
                "{at_seconds:.3}s is past the last of {} frames",
                self.paths.len()
            )));
        }
        Ok(Box::new(ImageSequenceSession {
            paths: self.paths[start..].to_vec(),
            next: 0,
        }))
    }
}

struct ImageSequenceSession {
    paths: Vec<PathBuf>,
    next: usize,
}

impl DecodeSession for ImageSequenceSession {
    fn next_frame(&mut self) -> Result<Option<PixelBuffer>, FeedError> {
        let Some(path) = self.paths.get(self.next) else {
            return Ok(None);
        };
        self.next += 1;
        load_pixel_buffer(path)
            .map(Some)
            .map_err(|e| FeedError::Read(format!("{}: {e}", path.display())))
    }
}
