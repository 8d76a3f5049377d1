//! Live frame feed with freeze-last-frame semantics.
//!
//! A worker thread pulls one frame per `1 / fps` from a [`DecodeSession`] and
//! publishes it with a pointer swap. The render thread reads the current
//! buffer under the same short lock; decoding never happens under it.
//!
//! ```text
//! Idle ──start──▶ Reading ──stop──▶ Frozen (frame held) | Idle
//!                    └──end of stream / error──▶ Idle (frame kept)
//! ```

pub mod source;

pub use source::{
    DecodeSession, FeedError, FrameProvider, FrameSequenceSource, FrameSource, StillFrame,
};

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use serde::{Deserialize, Serialize};

use crate::pixel::PixelBuffer;

/// Lowest pull rate.
pub const MIN_FPS: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedState {
    Idle,
    Reading,
    Frozen,
}

struct Slots {
    /// Bumped by every start/stop; a worker publishes only while its own
    /// generation is current.
    generation: u64,
    state: FeedState,
    live: Option<PixelBuffer>,
    frozen: Option<PixelBuffer>,
    sequence: u64,
}

impl Slots {
    fn current(&self) -> Option<&PixelBuffer> {
        self.frozen.as_ref().or(self.live.as_ref())
    }

    fn held_state(&self) -> FeedState {
        if self.current().is_some() {
            FeedState::Frozen
        } else {
            FeedState::Idle
        }
    }
}

struct Shared {
    slots: Mutex<Slots>,
    wake: Condvar,
}

/// Timer-driven frame puller owned by whatever hosts playback.
pub struct FrameFeed {
    source: Arc<dyn FrameSource>,
    period: Duration,
    shared: Arc<Shared>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl FrameFeed {
    /// Feed pulling from `source` at `fps` (at least [`MIN_FPS`]).
    pub fn new(source: Arc<dyn FrameSource>, fps: f32) -> Self {
        let fps = if fps.is_finite() { fps.max(MIN_FPS) } else { MIN_FPS };
        Self {
            source,
            period: Duration::from_secs_f32(1.0 / fps),
            shared: Arc::new(Shared {
                slots: Mutex::new(Slots {
                    generation: 0,
                    state: FeedState::Idle,
                    live: None,
                    frozen: None,
                    sequence: 0,
                }),
                wake: Condvar::new(),
            }),
            worker: Mutex::new(None),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Open a session at `at_seconds` and start pulling.
    ///
    /// A running puller is stopped first. On failure the feed keeps whatever
    /// frame it already holds.
    pub fn start(&self, at_seconds: f64) -> Result<(), FeedError> {
        self.stop();

        let session = match self.source.open(at_seconds) {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(at_seconds, error = %e, "frame feed failed to open");
                return Err(e);
            }
        };

        let generation = {
            let mut slots = self.shared.slots.lock();
            slots.generation += 1;
            slots.state = FeedState::Reading;
            slots.generation
        };

        let shared = Arc::clone(&self.shared);
        let period = self.period;
        let spawned = thread::Builder::new()
            .name("vireo-feed".into())
            .spawn(move || pull_loop(shared, session, generation, period));

        match spawned {
            Ok(handle) => {
                *self.worker.lock() = Some(handle);
                tracing::info!(at_seconds, generation, "frame feed started");
                Ok(())
            }
            Err(e) => {
                let mut slots = self.shared.slots.lock();
                slots.state = slots.held_state();
                Err(FeedError::Open(format!("failed to spawn feed thread: {e}")))
            }
        }
    }

    /// Stop pulling. The last frame read stays available. When this returns
    /// the worker has exited and will not publish again.
    pub fn stop(&self) {
        let handle = self.worker.lock().take();
        {
            let mut slots = self.shared.slots.lock();
            slots.generation += 1;
            if slots.state == FeedState::Reading {
                slots.state = slots.held_state();
            }
        }
        self.shared.wake.notify_all();

        if let Some(handle) = handle {
            if handle.thread().id() == thread::current().id() {
                return;
            }
            if handle.join().is_err() {
                tracing::error!("frame feed worker panicked");
            }
            tracing::debug!("frame feed stopped");
        }
    }

    /// `stop` followed by `start`, used on seek.
    pub fn restart(&self, at_seconds: f64) -> Result<(), FeedError> {
        self.start(at_seconds)
    }

    /// Hold `frame` in front of the live buffer until cleared.
    pub fn set_frozen_frame(&self, frame: PixelBuffer) {
        let mut slots = self.shared.slots.lock();
        slots.frozen = Some(frame);
        slots.sequence += 1;
        if slots.state == FeedState::Idle {
            slots.state = FeedState::Frozen;
        }
    }

    pub fn clear_frozen_frame(&self) {
        let mut slots = self.shared.slots.lock();
        if slots.frozen.take().is_some() {
            slots.sequence += 1;
        }
        if slots.state == FeedState::Frozen {
            slots.state = slots.held_state();
        }
    }

    /// Frozen frame if set, else the latest live frame.
    pub fn current_pixel_buffer(&self) -> Option<PixelBuffer> {
        self.shared.slots.lock().current().cloned()
    }

    /// Current frame together with its sequence, read under one lock.
    pub fn current_with_sequence(&self) -> (Option<PixelBuffer>, u64) {
        let slots = self.shared.slots.lock();
        (slots.current().cloned(), slots.sequence)
    }

    /// Incremented on every publish and every freeze change.
    pub fn frame_sequence(&self) -> u64 {
        self.shared.slots.lock().sequence
    }

    pub fn state(&self) -> FeedState {
        self.shared.slots.lock().state
    }

    /// Whether a worker is currently pulling.
    pub fn is_reading(&self) -> bool {
        self.state() == FeedState::Reading
    }
}

impl Drop for FrameFeed {
    fn drop(&mut self) {
        self.stop();
    }
}

impl FrameProvider for FrameFeed {
    fn frame_for_host_time(&self, _host_time: f64) -> Option<PixelBuffer> {
        self.current_pixel_buffer()
    }

    fn frame_sequence(&self) -> u64 {
        FrameFeed::frame_sequence(self)
    }
}

fn pull_loop(
    shared: Arc<Shared>,
    mut session: Box<dyn DecodeSession>,
    generation: u64,
    period: Duration,
) {
    let mut deadline = Instant::now();
    let mut published = 0u64;

    loop {
        {
            let mut slots = shared.slots.lock();
            while slots.generation == generation && Instant::now() < deadline {
                shared.wake.wait_until(&mut slots, deadline);
            }
            if slots.generation != generation {
                return;
            }
        }

        let outcome = session.next_frame();

        let mut slots = shared.slots.lock();
        if slots.generation != generation {
            return;
        }
        match outcome {
            Ok(Some(frame)) => {
                slots.live = Some(frame);
                slots.sequence += 1;
                published += 1;
            }
            Ok(None) => {
                slots.state = FeedState::Idle;
                drop(slots);
                tracing::info!(frames = published, "frame feed reached end of stream");
                return;
            }
            Err(e) => {
                slots.state = FeedState::Idle;
                drop(slots);
                tracing::warn!(error = %e, frames = published, "frame feed read failed");
                return;
            }
        }
        drop(slots);

        // No catch-up burst after a slow decode.
        deadline = (deadline + period).max(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::PixelFormat;

    fn frames(n: u8) -> Vec<PixelBuffer> {
        (0..n)
            .map(|i| PixelBuffer::solid(2, 2, PixelFormat::Bgra8, [i, i, i, 255]))
            .collect()
    }

    fn wait_for(feed: &FrameFeed, mut done: impl FnMut(&FrameFeed) -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !done(feed) {
            assert!(Instant::now() < deadline, "timed out waiting for feed");
            thread::sleep(Duration::from_millis(2));
        }
    }

    #[test]
    fn test_idle_feed_has_no_frame() {
        let feed = FrameFeed::new(Arc::new(FrameSequenceSource::new(frames(1), 24.0)), 24.0);
        assert_eq!(feed.state(), FeedState::Idle);
        assert!(feed.current_pixel_buffer().is_none());
    }

    #[test]
    fn test_exhaustion_returns_to_idle_keeping_frame() {
        let clip = frames(3);
        let feed = FrameFeed::new(Arc::new(FrameSequenceSource::new(clip.clone(), 200.0)), 200.0);
        feed.start(0.0).unwrap();
        wait_for(&feed, |f| f.state() == FeedState::Idle);
        let last = feed.current_pixel_buffer().unwrap();
        assert!(last.same_buffer(&clip[2]));
        assert_eq!(feed.frame_sequence(), 3);
    }

    #[test]
    fn test_frozen_frame_wins() {
        let feed = FrameFeed::new(Arc::new(FrameSequenceSource::new(frames(2), 24.0)), 24.0);
        let still = PixelBuffer::solid(1, 1, PixelFormat::Rgba8, [9, 9, 9, 255]);
        feed.set_frozen_frame(still.clone());
        assert_eq!(feed.state(), FeedState::Frozen);
        assert!(feed.current_pixel_buffer().unwrap().same_buffer(&still));
        feed.clear_frozen_frame();
        assert_eq!(feed.state(), FeedState::Idle);
        assert!(feed.current_pixel_buffer().is_none());
    }

    #[test]
    fn test_open_failure_is_reported() {
        let feed = FrameFeed::new(Arc::new(FrameSequenceSource::new(Vec::new(), 24.0)), 24.0);
        assert!(matches!(feed.start(0.0), Err(FeedError::TrackMissing)));
        assert_eq!(feed.state(), FeedState::Idle);
    }

    #[test]
    fn test_fps_floor() {
        let feed = FrameFeed::new(Arc::new(FrameSequenceSource::new(frames(1), 0.1)), 0.1);
        assert_eq!(feed.period(), Duration::from_secs(1));
    }
}
