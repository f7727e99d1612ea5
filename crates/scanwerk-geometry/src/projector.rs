// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Quad projection: normalized detector coordinates to pixel coordinates.
//
// The detector reports corners in a unit square with the origin at the
// bottom-left and y pointing up. Views and images put the origin at the
// top-left with y pointing down, and usually show the image aspect-fitted
// (letterboxed) inside a rectangle of a different shape. Projection is split
// into two pure stages:
//
// 1. corner selection: low-confidence corners fall back to the frame corners;
// 2. coordinate conversion: flip y, scale to the fitted area, add the
//    letterbox offset.

use scanwerk_core::{GeometryError, Point2D, Quad, Rect, Size};
use tracing::trace;

/// Corners of a detection at or below this confidence are replaced by the
/// frame corners.
pub const DEFAULT_PROJECTION_CONFIDENCE: f64 = 0.8;

// -- Stage 1: corner selection ------------------------------------------------

/// Pick, per corner, the detected point or the matching full-frame corner.
///
/// A single confidence value covers the whole quad, so in practice either
/// all four corners are kept or all four fall back. The choice is still made
/// corner by corner.
pub fn select_corners(quad: &Quad, confidence: f64, threshold: f64) -> Quad {
    let frame = Quad::unit().corners();
    let detected = quad.corners();
    let mut chosen = frame;
    for (slot, point) in chosen.iter_mut().zip(detected) {
        if corner_is_trusted(confidence, threshold) {
            *slot = point;
        }
    }
    Quad::from_corners(chosen)
}

fn corner_is_trusted(confidence: f64, threshold: f64) -> bool {
    confidence > threshold
}

// -- Stage 2: coordinate conversion -------------------------------------------

/// Aspect-fit of an image inside a target area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AspectFit {
    /// Width of the fitted image, in target pixels.
    pub scaled_width: f64,
    /// Height of the fitted image, in target pixels.
    pub scaled_height: f64,
    /// Horizontal letterbox offset.
    pub offset_x: f64,
    /// Vertical letterbox offset.
    pub offset_y: f64,
}

impl AspectFit {
    /// Fit `image` inside `target`.
    ///
    /// When the image is relatively wider than the target the width is
    /// pinned and the image is centred vertically; otherwise the height is
    /// pinned and it is centred horizontally.
    pub fn new(image: Size, target: Size) -> Result<Self, GeometryError> {
        if !image.is_drawable() {
            return Err(GeometryError::Degenerate(format!(
                "image size {}x{} is not drawable",
                image.width, image.height
            )));
        }
        if !target.is_drawable() {
            return Err(GeometryError::Degenerate(format!(
                "target size {}x{} is not drawable",
                target.width, target.height
            )));
        }

        let width_ratio = image.width / target.width;
        let height_ratio = image.height / target.height;

        let fit = if width_ratio > height_ratio {
            let scaled_height = image.height * target.width / image.width;
            Self {
                scaled_width: target.width,
                scaled_height,
                offset_x: 0.0,
                offset_y: (target.height - scaled_height) / 2.0,
            }
        } else {
            let scaled_width = image.width * target.height / image.height;
            Self {
                scaled_width,
                scaled_height: target.height,
                offset_x: (target.width - scaled_width) / 2.0,
                offset_y: 0.0,
            }
        };
        Ok(fit)
    }

    /// Convert one normalized point (origin bottom-left) to target pixels
    /// (origin top-left).
    pub fn to_pixels(&self, normalized: Point2D) -> Point2D {
        Point2D::new(
            self.offset_x + normalized.x * self.scaled_width,
            self.offset_y + (1.0 - normalized.y) * self.scaled_height,
        )
    }

    /// The fitted image area inside the target.
    pub fn content_rect(&self) -> Rect {
        Rect::new(
            self.offset_x,
            self.offset_y,
            self.scaled_width,
            self.scaled_height,
        )
    }
}

// -- Full projection ----------------------------------------------------------

/// Project a normalized detection onto `target`.
///
/// The result is in pixels relative to `target`'s own origin; callers that
/// need global coordinates add `target.x` / `target.y` themselves.
pub fn project(
    image_size: Size,
    target: Rect,
    quad: &Quad,
    confidence: f64,
) -> Result<Quad, GeometryError> {
    project_with_threshold(
        image_size,
        target,
        quad,
        confidence,
        DEFAULT_PROJECTION_CONFIDENCE,
    )
}

/// [`project`] with an explicit fallback threshold.
pub fn project_with_threshold(
    image_size: Size,
    target: Rect,
    quad: &Quad,
    confidence: f64,
    threshold: f64,
) -> Result<Quad, GeometryError> {
    let selected = select_corners(quad, confidence, threshold);
    if !selected.is_finite() {
        return Err(GeometryError::NonFinite);
    }
    let fit = AspectFit::new(image_size, target.size())?;
    let projected = selected.map(|p| fit.to_pixels(p));
    trace!(
        confidence,
        offset_x = fit.offset_x,
        offset_y = fit.offset_y,
        "quad projected"
    );
    Ok(projected)
}

/// Project onto the full image bounds: the source points for the warp.
pub fn project_onto_image(
    image_size: Size,
    quad: &Quad,
    confidence: f64,
    threshold: f64,
) -> Result<Quad, GeometryError> {
    project_with_threshold(
        image_size,
        Rect::from_size(image_size),
        quad,
        confidence,
        threshold,
    )
}
