//! Vireo Demo: headless review run.
//!
//! Plays an image sequence through the frame feed for a number of display
//! ticks, renders the last tick through the colour pipeline (GPU when
//! available, software raster otherwise), writes it as a PNG and logs scope
//! summaries.

mod image_loader;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use glam::UVec2;
use parking_lot::Mutex;
use tracing_subscriber::EnvFilter;
use vireo_core::FrameFeed;
use vireo_core::feed::source::StillFrame;
use vireo_core::scopes::{HistogramData, VectorscopeData, WaveformData};
use vireo_review::{Presenter, ReviewConfig, ReviewSession, TickOutput};

use crate::image_loader::{ImageSequenceSource, load_pixel_buffer};

#[derive(Parser, Debug)]
#[command(name = "vireo-demo", about = "Headless colour review of an image sequence")]
struct Args {
    /// Directory of numbered stills.
    #[arg(long)]
    frames: PathBuf,
    /// `.cube` LUT to apply.
    #[arg(long)]
    lut: Option<PathBuf>,
    /// Reference image for the A/B wipe.
    #[arg(long)]
    compare: Option<PathBuf>,
    /// Display ticks to run before rendering.
    #[arg(long, default_value_t = 48)]
    ticks: u32,
    #[arg(long, default_value = "vireo_out.png")]
    out: PathBuf,
    /// JSON review config.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    false_color: bool,
    #[arg(long)]
    tone_map: bool,
    /// Wipe position as a fraction of the view width.
    #[arg(long, default_value_t = 0.5)]
    split: f32,
    #[arg(long, default_value_t = 1280)]
    width: u32,
    #[arg(long, default_value_t = 720)]
    height: u32,
    /// Skip the GPU and render with the software raster.
    #[arg(long)]
    cpu: bool,
}

#[derive(Default)]
struct LatestScopes {
    histogram: Option<HistogramData>,
    waveform: Option<WaveformData>,
    vectorscope: Option<VectorscopeData>,
    passes: u32,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => ReviewConfig::load(path)?,
        None => ReviewConfig::from_env(),
    };

    let source = ImageSequenceSource::from_dir(&args.frames, config.feed_fps)
        .with_context(|| format!("reading {}", args.frames.display()))?;
    let feed = Arc::new(FrameFeed::new(Arc::new(source), config.feed_fps));

    let mut session = ReviewSession::new(feed.clone(), &config);
    if let Some(path) = &args.compare {
        let still = load_pixel_buffer(path)
            .with_context(|| format!("loading compare image {}", path.display()))?;
        session = session.with_compare(Arc::new(StillFrame::new(still)));
        session.set_compare_enabled(true);
        session.set_compare_split(args.split);
    }
    if let Some(path) = &args.lut
        && let Err(e) = session.load_lut_file(path)
    {
        tracing::error!("continuing without LUT: {e}");
    }
    session.set_false_color(args.false_color);
    if args.tone_map {
        session.set_auto_tone_map(true);
    }
    session.set_drawable_size(UVec2::new(args.width, args.height));

    let scopes = Arc::new(Mutex::new(LatestScopes::default()));
    register_scopes(&session, &scopes);

    let mut presenter = if args.cpu {
        None
    } else {
        match Presenter::with_default_device() {
            Ok(p) => Some(p),
            Err(e) => {
                tracing::warn!("GPU unavailable, using software raster: {e}");
                None
            }
        }
    };

    feed.start(0.0)?;
    let period = config.display_period();
    let mut last = None;
    for _ in 0..args.ticks.max(1) {
        let started = Instant::now();
        let tick = session.tick(started);
        if let Some(presenter) = presenter.as_mut() {
            presenter.prepare(&tick);
        }
        last = Some(tick);
        if let Some(rest) = period.checked_sub(started.elapsed()) {
            std::thread::sleep(rest);
        }
    }
    feed.stop();

    let tick = last.context("no tick ran")?;
    write_output(&args, presenter.as_mut(), &tick)?;
    log_scopes(&scopes.lock());
    if let Some(presenter) = &presenter {
        tracing::info!(stats = ?presenter.stats(), "GPU uploads");
    }
    Ok(())
}

fn register_scopes(session: &ReviewSession, scopes: &Arc<Mutex<LatestScopes>>) {
    let latest = Arc::clone(scopes);
    session.on_histogram(move |data| {
        let mut latest = latest.lock();
        latest.histogram = Some(data.clone());
        latest.passes += 1;
    });
    let latest = Arc::clone(scopes);
    session.on_waveform(move |data| latest.lock().waveform = Some(data.clone()));
    let latest = Arc::clone(scopes);
    session.on_vectorscope(move |data| latest.lock().vectorscope = Some(data.clone()));
}

fn write_output(
    args: &Args,
    presenter: Option<&mut Presenter>,
    tick: &TickOutput,
) -> anyhow::Result<()> {
    let image = match presenter {
        Some(presenter) => match presenter.render_offscreen(args.width, args.height, tick) {
            Ok(image) => image,
            Err(e) => {
                tracing::warn!("GPU render failed, using software raster: {e}");
                tick.rasterize(args.width, args.height)
            }
        },
        None => tick.rasterize(args.width, args.height),
    };

    let png = image::RgbaImage::from_raw(image.width, image.height, image.to_rgba8())
        .context("rendered image has the wrong size")?;
    png.save(&args.out)
        .with_context(|| format!("writing {}", args.out.display()))?;
    tracing::info!(
        path = %args.out.display(),
        width = image.width,
        height = image.height,
        sequence = tick.sequence,
        "frame written"
    );
    Ok(())
}

fn log_scopes(scopes: &LatestScopes) {
    if let Some(h) = &scopes.histogram {
        let luma = h.luma();
        let weight: f32 = luma.iter().sum();
        let mean = if weight > 0.0 {
            luma.iter().enumerate().map(|(i, v)| i as f32 * v).sum::<f32>() / weight
        } else {
            0.0
        };
        tracing::info!(
            passes = scopes.passes,
            samples = h.samples,
            peak = h.peak,
            mean_luma_level = mean,
            "histogram"
        );
    }
    if let Some(w) = &scopes.waveform {
        let lit = w.density.iter().filter(|d| **d > 0.0).count();
        tracing::info!(columns = w.columns, lit_cells = lit, "waveform");
    }
    if let Some(v) = &scopes.vectorscope {
        let lit = v.density.iter().filter(|d| **d > 0.0).count();
        tracing::info!(resolution = v.resolution, lit_cells = lit, "vectorscope");
    }
}
