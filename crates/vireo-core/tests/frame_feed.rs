//! Frame feed lifecycle against an endless synthetic decoder.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use vireo_core::feed::{DecodeSession, FeedError, FeedState, FrameFeed, FrameSource};
use vireo_core::pixel::{PixelBuffer, PixelFormat};

/// Produces numbered frames forever; frame `n` has red level `n % 256`.
struct Counter {
    opened_at: Arc<parking_lot::Mutex<Vec<f64>>>,
}

struct CounterSession {
    next: u32,
}

impl FrameSource for Counter {
    fn open(&self, at_seconds: f64) -> Result<Box<dyn DecodeSession>, FeedError> {
        self.opened_at.lock().push(at_seconds);
        Ok(Box::new(CounterSession { next: 0 }))
    }
}

impl DecodeSession for CounterSession {
    fn next_frame(&mut self) -> Result<Option<PixelBuffer>, FeedError> {
        let level = (self.next % 256) as u8;
        self.next += 1;
        Ok(Some(PixelBuffer::solid(
            2,
            2,
            PixelFormat::Bgra8,
            [level, 0, 0, 255],
        )))
    }
}

/// Fails on the third read.
struct Flaky {
    reads: Arc<AtomicU32>,
}

impl FrameSource for Flaky {
    fn open(&self, _at_seconds: f64) -> Result<Box<dyn DecodeSession>, FeedError> {
        Ok(Box::new(FlakySession {
            reads: Arc::clone(&self.reads),
        }))
    }
}

struct FlakySession {
    reads: Arc<AtomicU32>,
}

impl DecodeSession for FlakySession {
    fn next_frame(&mut self) -> Result<Option<PixelBuffer>, FeedError> {
        if self.reads.fetch_add(1, Ordering::SeqCst) >= 2 {
            return Err(FeedError::Read("corrupt packet".into()));
        }
        Ok(Some(PixelBuffer::solid(1, 1, PixelFormat::Rgba8, [1, 2, 3, 255])))
    }
}

fn wait_until(mut done: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !done() {
        assert!(Instant::now() < deadline, "condition not reached in time");
        thread::sleep(Duration::from_millis(2));
    }
}

fn counter_feed(fps: f32) -> (FrameFeed, Arc<parking_lot::Mutex<Vec<f64>>>) {
    let opened_at = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let source = Counter {
        opened_at: Arc::clone(&opened_at),
    };
    (FrameFeed::new(Arc::new(source), fps), opened_at)
}

#[test]
fn test_stop_keeps_last_frame() {
    let (feed, _) = counter_feed(500.0);
    feed.start(0.0).unwrap();
    assert_eq!(feed.state(), FeedState::Reading);
    wait_until(|| feed.frame_sequence() >= 3);
    feed.stop();

    let held = feed.current_pixel_buffer().expect("frame held after stop");
    let sequence = feed.frame_sequence();
    assert_eq!(feed.state(), FeedState::Frozen);

    // Nothing publishes once stop has returned.
    thread::sleep(Duration::from_millis(30));
    assert_eq!(feed.frame_sequence(), sequence);
    assert!(feed.current_pixel_buffer().unwrap().same_buffer(&held));
}

#[test]
fn test_frozen_frame_overrides_live_feed() {
    let (feed, _) = counter_feed(500.0);
    let still = PixelBuffer::solid(4, 4, PixelFormat::Rgba8, [7, 7, 7, 255]);
    feed.start(0.0).unwrap();
    feed.set_frozen_frame(still.clone());

    let before = feed.frame_sequence();
    wait_until(|| feed.frame_sequence() > before + 2);
    assert!(feed.current_pixel_buffer().unwrap().same_buffer(&still));
    assert_eq!(feed.state(), FeedState::Reading);

    feed.clear_frozen_frame();
    assert!(!feed.current_pixel_buffer().unwrap().same_buffer(&still));
    feed.stop();
}

#[test]
fn test_restart_reopens_at_new_time() {
    let (feed, opened_at) = counter_feed(200.0);
    feed.start(1.0).unwrap();
    feed.restart(12.5).unwrap();
    assert_eq!(feed.state(), FeedState::Reading);
    assert_eq!(*opened_at.lock(), vec![1.0, 12.5]);
    feed.stop();
}

#[test]
fn test_read_error_degrades_to_idle() {
    let reads = Arc::new(AtomicU32::new(0));
    let feed = FrameFeed::new(
        Arc::new(Flaky {
            reads: Arc::clone(&reads),
        }),
        500.0,
    );
    feed.start(0.0).unwrap();
    wait_until(|| feed.state() == FeedState::Idle);
    assert_eq!(feed.frame_sequence(), 2);
    assert!(feed.current_pixel_buffer().is_some());
}

#[test]
fn test_stop_from_other_thread() {
    let (feed, _) = counter_feed(100.0);
    let feed = Arc::new(feed);
    feed.start(0.0).unwrap();
    let remote = Arc::clone(&feed);
    thread::spawn(move || remote.stop()).join().unwrap();
    assert!(!feed.is_reading());
}
