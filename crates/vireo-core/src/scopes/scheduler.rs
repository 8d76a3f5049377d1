//! Throttled scope dispatch from the render tick.
//!
//! Analysis runs at most once per `1 / max_rate_hz`, only for a frame
//! sequence it has not analysed yet, and only for analyzers that have a
//! registered callback.

use std::time::{Duration, Instant};

use super::{
    HistogramData, ScopeSettings, VectorscopeData, WaveformData, histogram, vectorscope,
    waveform,
};
use crate::pixel::PixelBuffer;

type Callback<T> = Box<dyn FnMut(&T) + Send>;

pub struct ScopeScheduler {
    settings: ScopeSettings,
    interval: Duration,
    budget: Duration,
    histogram: Option<Callback<HistogramData>>,
    waveform: Option<Callback<WaveformData>>,
    vectorscope: Option<Callback<VectorscopeData>>,
    last_run: Option<Instant>,
    last_sequence: Option<u64>,
}

impl ScopeScheduler {
    /// `max_rate_hz` below 1 is raised to 1.
    pub fn new(settings: ScopeSettings, max_rate_hz: f32) -> Self {
        let rate = if max_rate_hz.is_finite() {
            max_rate_hz.max(1.0)
        } else {
            1.0
        };
        Self {
            settings,
            interval: Duration::from_secs_f32(1.0 / rate),
            budget: Duration::from_millis(8),
            histogram: None,
            waveform: None,
            vectorscope: None,
            last_run: None,
            last_sequence: None,
        }
    }

    /// Passes slower than `budget` are logged.
    pub fn with_budget(mut self, budget: Duration) -> Self {
        self.budget = budget;
        self
    }

    pub fn settings(&self) -> ScopeSettings {
        self.settings
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn on_histogram(&mut self, callback: impl FnMut(&HistogramData) + Send + 'static) {
        self.histogram = Some(Box::new(callback));
    }

    pub fn on_waveform(&mut self, callback: impl FnMut(&WaveformData) + Send + 'static) {
        self.waveform = Some(Box::new(callback));
    }

    pub fn on_vectorscope(&mut self, callback: impl FnMut(&VectorscopeData) + Send + 'static) {
        self.vectorscope = Some(Box::new(callback));
    }

    pub fn clear_callbacks(&mut self) {
        self.histogram = None;
        self.waveform = None;
        self.vectorscope = None;
    }

    pub fn has_callbacks(&self) -> bool {
        self.histogram.is_some() || self.waveform.is_some() || self.vectorscope.is_some()
    }

    /// Run the registered analyzers on `frame` if the rate limit allows and
    /// `sequence` is new. Returns whether a pass ran.
    pub fn maybe_analyze(&mut self, now: Instant, frame: &PixelBuffer, sequence: u64) -> bool {
        if !self.has_callbacks() || self.last_sequence == Some(sequence) {
            return false;
        }
        if let Some(last) = self.last_run
            && now.saturating_duration_since(last) < self.interval
        {
            return false;
        }

        let started = Instant::now();
        let ScopeSettings {
            sampling,
            waveform_columns,
            vectorscope_resolution,
        } = self.settings;

        if let Some(callback) = self.histogram.as_mut()
            && let Some(data) = histogram::compute(frame, sampling)
        {
            callback(&data);
        }
        if let Some(callback) = self.waveform.as_mut()
            && let Some(data) = waveform::compute(frame, sampling, waveform_columns)
        {
            callback(&data);
        }
        if let Some(callback) = self.vectorscope.as_mut()
            && let Some(data) = vectorscope::compute(frame, sampling, vectorscope_resolution)
        {
            callback(&data);
        }

        self.last_run = Some(now);
        self.last_sequence = Some(sequence);

        let elapsed = started.elapsed();
        if elapsed > self.budget {
            tracing::debug!(
                elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                width = frame.width(),
                height = frame.height(),
                "scope pass over budget"
            );
        }
        true
    }
}
