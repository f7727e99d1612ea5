// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Synthetic camera and detector for running the capture flow on a desktop.
//
// The scene is a light page on a dark desk. The detector "sees" the page with
// a wobbling top-left corner for the first few frames, as if the phone were
// still being aimed, and then holds still.

use std::sync::atomic::{AtomicUsize, Ordering};

use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::draw_polygon_mut;
use imageproc::point::Point;
use scanwerk_bridge::{DocumentDetector, StillCamera};
use scanwerk_core::error::Result;
use scanwerk_core::{DetectionResult, Point2D, Quad};

const DESK: Rgb<u8> = Rgb([40, 36, 32]);
const PAPER: Rgb<u8> = Rgb([236, 234, 226]);

/// The page as the detector would report it when the phone is steady.
pub fn resting_page() -> Quad {
    Quad::new(
        Point2D::new(0.12, 0.88),
        Point2D::new(0.90, 0.90),
        Point2D::new(0.10, 0.12),
        Point2D::new(0.88, 0.10),
    )
}

/// Render the scene at `width` x `height`.
pub fn render_scene(width: u32, height: u32) -> DynamicImage {
    let mut canvas = RgbImage::from_pixel(width, height, DESK);
    let page = resting_page();
    // Perimeter order for the polygon fill.
    let outline: Vec<Point<i32>> = [
        page.top_left,
        page.top_right,
        page.bottom_right,
        page.bottom_left,
    ]
    .iter()
    .map(|p| {
        Point::new(
            (p.x * width as f64).round() as i32,
            ((1.0 - p.y) * height as f64).round() as i32,
        )
    })
    .collect();
    draw_polygon_mut(&mut canvas, &outline, PAPER);
    DynamicImage::ImageRgb8(canvas)
}

/// Reports the resting page, with a jittery top-left corner for the first
/// `settle_after` calls.
pub struct SimulatedDetector {
    calls: AtomicUsize,
    settle_after: usize,
}

impl SimulatedDetector {
    pub fn new(settle_after: usize) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            settle_after,
        }
    }
}

impl DocumentDetector for SimulatedDetector {
    fn detect(&self, _frame: &DynamicImage) -> Result<DetectionResult> {
        let n = self.calls.fetch_add(1, Ordering::Relaxed);
        let mut quad = resting_page();
        if n < self.settle_after {
            quad.top_left.x += ((n % 5) as f64 - 2.0) * 0.03;
        }
        Ok(DetectionResult::new(quad, 0.95))
    }
}

/// Still camera that photographs the synthetic scene.
pub struct SimulatedCamera {
    width: u32,
    height: u32,
}

impl SimulatedCamera {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl StillCamera for SimulatedCamera {
    fn capture_still(&self) -> Result<DynamicImage> {
        Ok(render_scene(self.width, self.height))
    }
}
