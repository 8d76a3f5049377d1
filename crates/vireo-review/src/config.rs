//! Runtime configuration for a review session.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use vireo_core::HdrMode;
use vireo_core::scopes::{ScopeSampling, ScopeSettings, vectorscope, waveform};

/// Default display tick rate.
const DEFAULT_DISPLAY_HZ: f32 = 60.0;
/// Default maximum scope analysis rate.
const DEFAULT_SCOPE_HZ: f32 = 10.0;
/// Default frame feed rate.
const DEFAULT_FEED_FPS: f32 = 24.0;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Settings for the tick loop, the feed and the scopes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    /// Display tick rate in Hz.
    pub display_rate_hz: f32,
    /// Upper bound on scope analyses per second.
    pub scope_rate_hz: f32,
    /// Rate at which the feed pulls decoded frames.
    pub feed_fps: f32,
    pub scope_row_stride: u32,
    pub scope_column_stride: u32,
    pub waveform_columns: u32,
    pub vectorscope_resolution: u32,
    pub lut_intensity: f32,
    pub hdr_mode: HdrMode,
    pub auto_tone_map: bool,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            display_rate_hz: DEFAULT_DISPLAY_HZ,
            scope_rate_hz: DEFAULT_SCOPE_HZ,
            feed_fps: DEFAULT_FEED_FPS,
            scope_row_stride: 4,
            scope_column_stride: 4,
            waveform_columns: 256,
            vectorscope_resolution: 256,
            lut_intensity: 1.0,
            hdr_mode: HdrMode::Sdr,
            auto_tone_map: false,
        }
    }
}

impl ReviewConfig {
    /// Defaults with `VIREO_*` environment overrides applied.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok());
        config.sanitized()
    }

    /// Read a JSON file; missing keys take their defaults, then environment
    /// overrides apply.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let mut config: Self = serde_json::from_str(&text)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        tracing::info!(path = %path.display(), "review config loaded");
        Ok(config.sanitized())
    }

    /// Apply `VIREO_DISPLAY_HZ`, `VIREO_SCOPE_HZ` and `VIREO_FEED_FPS` from
    /// `lookup`. Unparseable values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let read = |key: &str| -> Option<f32> {
            let raw = lookup(key)?;
            match raw.trim().parse() {
                Ok(v) => Some(v),
                Err(_) => {
                    tracing::warn!(key, value = %raw, "ignoring unparseable override");
                    None
                }
            }
        };
        if let Some(v) = read("VIREO_DISPLAY_HZ") {
            self.display_rate_hz = v;
        }
        if let Some(v) = read("VIREO_SCOPE_HZ") {
            self.scope_rate_hz = v;
        }
        if let Some(v) = read("VIREO_FEED_FPS") {
            self.feed_fps = v;
        }
    }

    /// Clamp every field into its usable range.
    pub fn sanitized(mut self) -> Self {
        let rate = |v: f32, default: f32| if v.is_finite() { v.max(1.0) } else { default };
        self.display_rate_hz = rate(self.display_rate_hz, DEFAULT_DISPLAY_HZ);
        self.scope_rate_hz = rate(self.scope_rate_hz, DEFAULT_SCOPE_HZ);
        self.feed_fps = rate(self.feed_fps, DEFAULT_FEED_FPS);
        self.scope_row_stride = self.scope_row_stride.max(1);
        self.scope_column_stride = self.scope_column_stride.max(1);
        self.waveform_columns = self.waveform_columns.clamp(1, waveform::MAX_COLUMNS);
        self.vectorscope_resolution = self
            .vectorscope_resolution
            .clamp(1, vectorscope::MAX_RESOLUTION);
        self.lut_intensity = if self.lut_intensity.is_nan() {
            1.0
        } else {
            self.lut_intensity.clamp(0.0, 1.0)
        };
        self
    }

    pub fn display_period(&self) -> Duration {
        Duration::from_secs_f32(1.0 / self.display_rate_hz.max(1.0))
    }

    pub fn scope_settings(&self) -> ScopeSettings {
        ScopeSettings {
            sampling: ScopeSampling {
                row_stride: self.scope_row_stride,
                column_stride: self.scope_column_stride,
            },
            waveform_columns: self.waveform_columns,
            vectorscope_resolution: self.vectorscope_resolution,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: ReviewConfig =
            serde_json::from_str(r#"{ "scope_rate_hz": 5, "hdr_mode": "pq" }"#).unwrap();
        assert_eq!(config.scope_rate_hz, 5.0);
        assert_eq!(config.hdr_mode, HdrMode::Pq);
        assert_eq!(config.display_rate_hz, DEFAULT_DISPLAY_HZ);
        assert_eq!(config.scope_row_stride, 4);
    }

    #[test]
    fn test_overrides_replace_rates() {
        let mut config = ReviewConfig::default();
        config.apply_overrides(|key| match key {
            "VIREO_DISPLAY_HZ" => Some("120".into()),
            "VIREO_FEED_FPS" => Some("not a number".into()),
            _ => None,
        });
        assert_eq!(config.display_rate_hz, 120.0);
        assert_eq!(config.feed_fps, DEFAULT_FEED_FPS);
        assert_eq!(config.scope_rate_hz, DEFAULT_SCOPE_HZ);
    }

    #[test]
    fn test_sanitize_clamps_out_of_range_values() {
        let config = ReviewConfig {
            display_rate_hz: 0.0,
            scope_rate_hz: f32::NAN,
            scope_row_stride: 0,
            waveform_columns: 0,
            lut_intensity: 3.0,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(config.display_rate_hz, 1.0);
        assert_eq!(config.scope_rate_hz, DEFAULT_SCOPE_HZ);
        assert_eq!(config.scope_row_stride, 1);
        assert_eq!(config.waveform_columns, 1);
        assert_eq!(config.lut_intensity, 1.0);
    }

    #[test]
    fn test_sanitize_bounds_scope_grids() {
        let config = ReviewConfig {
            waveform_columns: u32::MAX,
            vectorscope_resolution: 65536,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(config.waveform_columns, waveform::MAX_COLUMNS);
        assert_eq!(config.vectorscope_resolution, vectorscope::MAX_RESOLUTION);
        let settings = config.scope_settings();
        assert_eq!(settings.vectorscope_resolution, vectorscope::MAX_RESOLUTION);
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let path = std::env::temp_dir().join(format!("vireo_config_{}.json", std::process::id()));
        std::fs::write(&path, "{ not json").unwrap();
        let err = ReviewConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        std::fs::remove_file(&path).ok();

        let missing = ReviewConfig::load(Path::new("/nonexistent/vireo.json")).unwrap_err();
        assert!(matches!(missing, ConfigError::Io(_)));
    }
}
