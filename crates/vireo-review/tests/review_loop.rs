//! Session ticks driven by a live frame feed, plus the GPU presenter when an
//! adapter is available.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use glam::UVec2;
use vireo_core::feed::source::{FrameSequenceSource, StillFrame};
use vireo_core::pixel::{PixelBuffer, PixelFormat};
use vireo_core::{FeedState, FrameFeed};
use vireo_gpu::GpuError;
use vireo_review::{Presenter, ReviewConfig, ReviewSession};

fn frames(count: u8) -> Vec<PixelBuffer> {
    (0..count)
        .map(|i| PixelBuffer::solid(16, 8, PixelFormat::Bgra8, [i * 20, 64, 128, 255]))
        .collect()
}

fn wait_for(mut done: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !done() {
        assert!(Instant::now() < deadline, "timed out");
        std::thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn test_ticks_follow_live_feed_and_freeze() {
    let source = Arc::new(FrameSequenceSource::new(frames(6), 120.0));
    let feed = Arc::new(FrameFeed::new(source, 120.0));
    let session = ReviewSession::new(feed.clone(), &ReviewConfig::default());
    session.set_drawable_size(UVec2::new(160, 90));

    let analyses = Arc::new(AtomicUsize::new(0));
    let counter = analyses.clone();
    session.on_waveform(move |data| {
        assert!(data.density.iter().all(|d| (0.0..=1.0).contains(d)));
        counter.fetch_add(1, Ordering::SeqCst);
    });

    assert!(session.tick(Instant::now()).frame.is_none());

    feed.start(0.0).unwrap();
    wait_for(|| feed.state() == FeedState::Idle && feed.current_pixel_buffer().is_some());

    let tick = session.tick(Instant::now());
    let last = tick.frame.clone().expect("last decoded frame");
    assert!((tick.params.video_aspect - 2.0).abs() < 1e-6);
    assert!(tick.scopes_ran);
    assert_eq!(analyses.load(Ordering::SeqCst), 1);

    let still = PixelBuffer::solid(4, 4, PixelFormat::Rgba8, [1, 2, 3, 255]);
    feed.set_frozen_frame(still.clone());
    let tick = session.tick(Instant::now() + Duration::from_secs(1));
    assert!(tick.frame.as_ref().is_some_and(|f| f.same_buffer(&still)));
    assert!((tick.params.video_aspect - 1.0).abs() < 1e-6);

    feed.clear_frozen_frame();
    let tick = session.tick(Instant::now() + Duration::from_secs(2));
    assert!(tick.frame.is_some_and(|f| f.same_buffer(&last)));
}

#[test]
fn test_rasterized_tick_shows_wipe() {
    let primary = Arc::new(StillFrame::new(PixelBuffer::solid(
        8,
        8,
        PixelFormat::Rgba8,
        [255, 0, 0, 255],
    )));
    let compare = Arc::new(StillFrame::new(PixelBuffer::solid(
        8,
        8,
        PixelFormat::Rgba8,
        [0, 0, 255, 255],
    )));
    let session = ReviewSession::new(primary, &ReviewConfig::default()).with_compare(compare);
    session.set_drawable_size(UVec2::new(32, 32));
    session.set_compare_enabled(true);
    session.set_compare_split(0.5);

    let image = session.tick(Instant::now()).rasterize(32, 32);
    // Compare on the left of the wipe, primary on the right.
    assert_eq!(image.pixel(4, 16)[..3], [0.0, 0.0, 1.0]);
    assert_eq!(image.pixel(28, 16)[..3], [1.0, 0.0, 0.0]);
}

#[test]
fn test_presenter_uploads_only_changes() {
    let mut presenter = match Presenter::with_default_device() {
        Ok(p) => p,
        Err(GpuError::NoAdapter) => {
            eprintln!("skipping GPU test: no adapter");
            return;
        }
        Err(e) => panic!("presenter creation failed: {e}"),
    };

    let primary = Arc::new(StillFrame::new(PixelBuffer::solid(
        8,
        8,
        PixelFormat::Bgra8,
        [30, 60, 90, 255],
    )));
    let session = ReviewSession::new(primary, &ReviewConfig::default());
    session.set_drawable_size(UVec2::new(32, 32));
    session
        .lut_slot()
        .load_str("LUT_1D_SIZE 2\n0 0 0\n1 1 1\n")
        .unwrap();

    let tick = session.tick(Instant::now());
    let image = presenter.render_offscreen(32, 32, &tick).unwrap();
    assert_eq!((image.width, image.height), (32, 32));
    let first = presenter.stats();
    assert_eq!((first.frames, first.luts, first.draws), (1, 1, 1));

    let tick = session.tick(Instant::now());
    assert!(!presenter.prepare(&tick));

    session.clear_lut();
    session
        .lut_slot()
        .load_str("LUT_1D_SIZE 2\n0 0 0\n0.5 0.5 0.5\n")
        .unwrap();
    let tick = session.tick(Instant::now());
    assert!(presenter.prepare(&tick));
    assert_eq!(presenter.stats().luts, 2);
    assert_eq!(presenter.stats().frames, 1);
}
