// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Rolling-window stability test for a tracked document corner.
//
// The tracker keeps the last N positions of one reference point (the detected
// top-left corner) and judges the boundary "settled" once the coefficient of
// variation of both axes drops below a threshold.

use std::collections::VecDeque;

use scanwerk_core::{CaptureConfig, DispersionStat, Point2D};
use tracing::trace;

/// Window capacity used by the reference capture screen.
pub const DEFAULT_CAPACITY: usize = 30;
/// Per-axis coefficient of variation below which the window counts as settled.
pub const DEFAULT_SETTLE_THRESHOLD: f64 = 0.15;
/// Fewer samples than this make `coefficient_of_variation` report `1.0`.
pub const DEFAULT_MIN_SAMPLES: usize = 11;

/// Outcome of feeding one sample to the tracker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StabilityReading {
    /// Whether the window is full and both axes are below the threshold.
    pub settled: bool,
    /// Per-axis dispersion, present once the window is full.
    pub dispersion: Option<DispersionStat>,
}

/// Fixed-capacity FIFO of reference points plus the settle test.
#[derive(Debug, Clone)]
pub struct StabilityTracker {
    window: VecDeque<Point2D>,
    capacity: usize,
    threshold: f64,
    min_samples: usize,
}

impl Default for StabilityTracker {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_SETTLE_THRESHOLD)
    }
}

impl StabilityTracker {
    /// Create a tracker. A zero `capacity` is bumped to one.
    ///
    /// The sample floor is `DEFAULT_MIN_SAMPLES`, lowered to `capacity` for
    /// windows shorter than that so a full window can always settle.
    pub fn new(capacity: usize, threshold: f64) -> Self {
        let capacity = capacity.max(1);
        Self {
            window: VecDeque::with_capacity(capacity + 1),
            capacity,
            threshold,
            min_samples: DEFAULT_MIN_SAMPLES.min(capacity),
        }
    }

    /// Build a tracker from the capture configuration.
    pub fn from_config(config: &CaptureConfig) -> Self {
        Self::new(config.window_capacity, config.settle_threshold)
            .with_min_samples(config.min_dispersion_samples)
    }

    /// Override the minimum sample count for the dispersion statistic.
    /// Values above the capacity are clamped to it.
    pub fn with_min_samples(mut self, min_samples: usize) -> Self {
        self.min_samples = min_samples.min(self.capacity);
        self
    }

    pub fn min_samples(&self) -> usize {
        self.min_samples
    }

    /// Drop every sample.
    pub fn reset(&mut self) {
        self.window.clear();
    }

    /// Append a sample and evaluate the window.
    ///
    /// Until the window is full the reading is `(false, None)`.
    pub fn update(&mut self, point: Point2D) -> StabilityReading {
        self.window.push_back(point);
        while self.window.len() > self.capacity {
            self.window.pop_front();
        }

        if self.window.len() < self.capacity {
            return StabilityReading {
                settled: false,
                dispersion: None,
            };
        }

        let dispersion = self.dispersion();
        let settled = dispersion.is_within(self.threshold);
        trace!(
            coef_x = dispersion.coef_x,
            coef_y = dispersion.coef_y,
            settled,
            "stability window evaluated"
        );
        StabilityReading {
            settled,
            dispersion: Some(dispersion),
        }
    }

    /// Dispersion of the current window, whatever its length.
    pub fn dispersion(&self) -> DispersionStat {
        let xs: Vec<f64> = self.window.iter().map(|p| p.x).collect();
        let ys: Vec<f64> = self.window.iter().map(|p| p.y).collect();
        DispersionStat {
            coef_x: coefficient_of_variation(&xs, self.min_samples),
            coef_y: coefficient_of_variation(&ys, self.min_samples),
        }
    }

    /// Samples in arrival order, oldest first.
    pub fn points(&self) -> impl Iterator<Item = &Point2D> {
        self.window.iter()
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.window.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

/// Population coefficient of variation, `σ / |μ|`.
///
/// Returns `1.0` when fewer than `min_samples` values are given and
/// `f64::INFINITY` when the mean is zero, so neither case can settle.
pub fn coefficient_of_variation(values: &[f64], min_samples: usize) -> f64 {
    let n = values.len();
    if n == 0 || n < min_samples {
        return 1.0;
    }

    let count = n as f64;
    let mean = values.iter().sum::<f64>() / count;
    if mean == 0.0 || !mean.is_finite() {
        return f64::INFINITY;
    }

    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count;
    variance.sqrt() / mean.abs()
}
