//! Decoder-facing traits and the pull interface the render loop consumes.

use crate::pixel::PixelBuffer;

/// Decode failures. The feed logs them and degrades to "no new frame".
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("cannot open decode session: {0}")]
    Open(String),
    #[error("source has no video track")]
    TrackMissing,
    #[error("decode failed: {0}")]
    Read(String),
}

/// Something that can be decoded from an arbitrary position.
pub trait FrameSource: Send + Sync {
    /// Open a session whose first frame is the one at `at_seconds`.
    fn open(&self, at_seconds: f64) -> Result<Box<dyn DecodeSession>, FeedError>;
}

/// A positioned decode session, driven by the feed's worker thread.
pub trait DecodeSession: Send {
    /// Decode the next frame. `Ok(None)` signals end of stream.
    fn next_frame(&mut self) -> Result<Option<PixelBuffer>, FeedError>;
}

/// Pull interface called once per render tick. Must not block.
pub trait FrameProvider: Send + Sync {
    /// Latest frame to show at `host_time` (seconds on the host clock), or
    /// `None` when nothing is available.
    fn frame_for_host_time(&self, host_time: f64) -> Option<PixelBuffer>;

    /// Changes whenever the provider may return a different frame.
    fn frame_sequence(&self) -> u64;
}

/// A fixed image, e.g. the reference side of an A/B compare.
#[derive(Debug, Clone)]
pub struct StillFrame {
    frame: PixelBuffer,
}

impl StillFrame {
    pub fn new(frame: PixelBuffer) -> Self {
        Self { frame }
    }

    pub fn frame(&self) -> &PixelBuffer {
        &self.frame
    }
}

impl FrameProvider for StillFrame {
    fn frame_for_host_time(&self, _host_time: f64) -> Option<PixelBuffer> {
        Some(self.frame.clone())
    }

    fn frame_sequence(&self) -> u64 {
        1
    }
}

/// In-memory source that replays a list of frames, starting at the frame
/// covering `at_seconds` for the given rate.
#[derive(Debug, Clone)]
pub struct FrameSequenceSource {
    frames: Vec<PixelBuffer>,
    fps: f32,
}

impl FrameSequenceSource {
    pub fn new(frames: Vec<PixelBuffer>, fps: f32) -> Self {
        Self { frames, fps }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl FrameSource for FrameSequenceSource {
    fn open(&self, at_seconds: f64) -> Result<Box<dyn DecodeSession>, FeedError> {
        if self.frames.is_empty() {
            return Err(FeedError::TrackMissing);
        }
        let start = (at_seconds.max(0.0) * self.fps.max(1.0) as f64).floor() as usize;
        let start = start.min(self.frames.len());
        Ok(Box::new(SequenceSession {
            frames: self.frames.clone(),
            next: start,
        }))
    }
}

struct SequenceSession {
    frames: Vec<PixelBuffer>,
    next: usize,
}

impl DecodeSession for SequenceSession {
    fn next_frame(&mut self) -> Result<Option<PixelBuffer>, FeedError> {
        let frame = self.frames.get(self.next).cloned();
        self.next = self.next.saturating_add(1);
        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::PixelFormat;

    #[test]
    fn test_sequence_source_seeks() {
        let frames: Vec<_> = (0..4)
            .map(|i| PixelBuffer::solid(1, 1, PixelFormat::Rgba8, [i, 0, 0, 255]))
            .collect();
        let source = FrameSequenceSource::new(frames.clone(), 2.0);
        let mut session = source.open(1.0).unwrap();
        let first = session.next_frame().unwrap().unwrap();
        assert!(first.same_buffer(&frames[2]));
        assert!(session.next_frame().unwrap().is_some());
        assert!(session.next_frame().unwrap().is_none());
    }

    #[test]
    fn test_seek_past_end_stays_exhausted() {
        let frames = vec![PixelBuffer::solid(1, 1, PixelFormat::Rgba8, [9, 0, 0, 255])];
        let source = FrameSequenceSource::new(frames, 24.0);
        for at in [f64::INFINITY, f64::MAX, 1.0e12] {
            let mut session = source.open(at).unwrap();
            for _ in 0..3 {
                assert!(session.next_frame().unwrap().is_none());
            }
        }
    }

    #[test]
    fn test_empty_source_has_no_track() {
        let source = FrameSequenceSource::new(Vec::new(), 24.0);
        assert!(matches!(source.open(0.0), Err(FeedError::TrackMissing)));
    }
}
