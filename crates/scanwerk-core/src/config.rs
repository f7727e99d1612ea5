// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Capture configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, ScanwerkError};
use crate::types::CaptureMode;

/// Longest reveal animation a config may ask for.
pub const MAX_REVEAL_DURATION_SECS: f64 = 10.0;

/// Tunables for the capture pipeline.
///
/// Defaults reproduce the reference capture screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Shutter behaviour when a session starts.
    pub mode: CaptureMode,
    /// Number of top-left samples in the stability window.
    pub window_capacity: usize,
    /// Both per-axis coefficients of variation must be below this to settle.
    pub settle_threshold: f64,
    /// Below this many samples a coefficient of variation reads as `1.0`.
    pub min_dispersion_samples: usize,
    /// Corners of a detection at or below this confidence fall back to the
    /// frame corners when projected.
    pub projection_confidence: f64,
    /// Live-frame detections at or below this confidence count as "not detected".
    pub live_detection_confidence: f64,
    /// Length of the reveal animation, in seconds.
    pub reveal_duration_secs: f64,
    /// Share of the viewport the corrected image may occupy on each axis.
    pub display_fill_fraction: f64,
    /// Vertical space kept free for controls when laying out the corrected image.
    pub display_reserved_height: f64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            mode: CaptureMode::Automatic,
            window_capacity: 30,
            settle_threshold: 0.15,
            min_dispersion_samples: 11,
            projection_confidence: 0.8,
            live_detection_confidence: 0.9,
            reveal_duration_secs: 0.5,
            display_fill_fraction: 0.8,
            display_reserved_height: 200.0,
        }
    }
}

impl CaptureConfig {
    /// Reveal animation length as a `Duration`, clamped to
    /// `[0, MAX_REVEAL_DURATION_SECS]`. NaN reads as zero.
    pub fn reveal_duration(&self) -> Duration {
        let secs = self
            .reveal_duration_secs
            .clamp(0.0, MAX_REVEAL_DURATION_SECS);
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO)
    }

    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.window_capacity == 0 {
            return Err(invalid("window_capacity must be at least 1"));
        }
        if self.min_dispersion_samples > self.window_capacity {
            return Err(invalid(
                "min_dispersion_samples must not exceed window_capacity",
            ));
        }
        if !(self.settle_threshold.is_finite() && self.settle_threshold > 0.0) {
            return Err(invalid("settle_threshold must be a positive number"));
        }
        for (name, value) in [
            ("projection_confidence", self.projection_confidence),
            ("live_detection_confidence", self.live_detection_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(&format!("{name} must lie in [0, 1], got {value}")));
            }
        }
        if !(0.0..=MAX_REVEAL_DURATION_SECS).contains(&self.reveal_duration_secs) {
            return Err(invalid(&format!(
                "reveal_duration_secs must lie in [0, {MAX_REVEAL_DURATION_SECS}], got {}",
                self.reveal_duration_secs
            )));
        }
        if !(self.display_fill_fraction > 0.0 && self.display_fill_fraction <= 1.0) {
            return Err(invalid("display_fill_fraction must lie in (0, 1]"));
        }
        if !(self.display_reserved_height.is_finite() && self.display_reserved_height >= 0.0) {
            return Err(invalid("display_reserved_height must be a non-negative number"));
        }
        Ok(())
    }

    /// Parse and validate a JSON document. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)?;
        let config = Self::from_json(&data)?;
        info!(path = %path.display(), "capture config loaded");
        Ok(config)
    }

    /// Write the config as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        debug!(path = %path.as_ref().display(), "capture config saved");
        Ok(())
    }
}

fn invalid(reason: &str) -> ScanwerkError {
    ScanwerkError::InvalidConfig(reason.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = CaptureConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.window_capacity, 30);
        assert_eq!(config.reveal_duration(), Duration::from_millis(500));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config = CaptureConfig::from_json(r#"{ "mode": "Manual", "window_capacity": 12 }"#)
            .expect("valid config");
        assert_eq!(config.mode, CaptureMode::Manual);
        assert_eq!(config.window_capacity, 12);
        assert_eq!(config.settle_threshold, 0.15);
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let err = CaptureConfig::from_json(r#"{ "window_capacity": 0 }"#).unwrap_err();
        assert!(matches!(err, ScanwerkError::InvalidConfig(_)));
    }

    #[test]
    fn window_shorter_than_sample_floor_is_rejected() {
        let err = CaptureConfig::from_json(r#"{ "window_capacity": 8 }"#).unwrap_err();
        assert!(matches!(err, ScanwerkError::InvalidConfig(_)));
    }

    #[test]
    fn confidence_out_of_range_is_rejected() {
        let config = CaptureConfig {
            projection_confidence: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn oversized_reveal_duration_is_rejected() {
        let config = CaptureConfig {
            reveal_duration_secs: 1e20,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ScanwerkError::InvalidConfig(_))
        ));
        assert_eq!(
            config.reveal_duration(),
            Duration::from_secs_f64(MAX_REVEAL_DURATION_SECS)
        );

        let nan = CaptureConfig {
            reveal_duration_secs: f64::NAN,
            ..Default::default()
        };
        assert!(nan.validate().is_err());
        assert_eq!(nan.reveal_duration(), Duration::ZERO);
    }

    #[test]
    fn malformed_json_is_serialization_error() {
        let err = CaptureConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ScanwerkError::Serialization(_)));
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("capture.json");
        let config = CaptureConfig {
            settle_threshold: 0.1,
            ..Default::default()
        };
        config.save(&path).expect("save");
        let loaded = CaptureConfig::load(&path).expect("load");
        assert_eq!(loaded, config);
    }
}
