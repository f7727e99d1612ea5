// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Perspective warp: crop the document quad out of a still image and rectify
// it into an upright page.

use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use scanwerk_bridge::WarpRenderer;
use scanwerk_core::error::{Result, ScanwerkError};
use scanwerk_core::Quad;
use tracing::{debug, info, instrument, warn};

/// Quads smaller than this (in square pixels) are rejected as spurious.
const MIN_QUAD_AREA: f32 = 4.0;

/// Warps a pixel-space quad into an upright rectangle with bilinear sampling.
///
/// The output is as wide as the longer of the top and bottom edges and as
/// tall as the longer of the left and right edges, so no side of the page is
/// downsampled.
#[derive(Debug, Clone)]
pub struct ImageWarper {
    /// Fill for output pixels that map outside the source image.
    background: Rgba<u8>,
}

impl Default for ImageWarper {
    fn default() -> Self {
        Self {
            background: Rgba([255u8, 255, 255, 255]),
        }
    }
}

impl ImageWarper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_background(mut self, background: Rgba<u8>) -> Self {
        self.background = background;
        self
    }

    /// Output dimensions for `quad`, before any validation.
    pub fn output_size(quad: &Quad) -> (u32, u32) {
        let width = quad
            .top_left
            .distance_to(quad.top_right)
            .max(quad.bottom_left.distance_to(quad.bottom_right));
        let height = quad
            .top_left
            .distance_to(quad.bottom_left)
            .max(quad.top_right.distance_to(quad.bottom_right));
        (width.round() as u32, height.round() as u32)
    }

    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    fn rectify(&self, image: &DynamicImage, quad: &Quad) -> Result<DynamicImage> {
        if !quad.is_finite() {
            return Err(ScanwerkError::WarpFailed("quad has non-finite corners".into()));
        }

        // Shoelace wants the corners in perimeter order.
        let perimeter = [
            quad.top_left,
            quad.top_right,
            quad.bottom_right,
            quad.bottom_left,
        ]
        .map(|p| (p.x as f32, p.y as f32));
        let area = shoelace_area(&perimeter);
        if area < MIN_QUAD_AREA {
            warn!(area, "Quad encloses no usable area");
            return Err(ScanwerkError::WarpFailed(format!(
                "quad area {area:.1} px² is too small"
            )));
        }

        let (out_w, out_h) = Self::output_size(quad);
        if out_w == 0 || out_h == 0 {
            return Err(ScanwerkError::WarpFailed(format!(
                "output size {out_w}x{out_h} is empty"
            )));
        }
        debug!(out_w, out_h, area, "Warp target computed");

        let dest: [(f32, f32); 4] = [
            (0.0, 0.0),                   // top-left
            (out_w as f32, 0.0),          // top-right
            (out_w as f32, out_h as f32), // bottom-right
            (0.0, out_h as f32),          // bottom-left
        ];

        let projection = Projection::from_control_points(perimeter, dest).ok_or_else(|| {
            ScanwerkError::WarpFailed("failed to compute projective transform".into())
        })?;

        let rgba_input = image.to_rgba8();
        let mut output = RgbaImage::new(out_w, out_h);
        warp_into(
            &rgba_input,
            &projection,
            Interpolation::Bilinear,
            self.background,
            &mut output,
        );

        info!(out_w, out_h, "Perspective correction applied");
        Ok(DynamicImage::ImageRgba8(output))
    }
}

impl WarpRenderer for ImageWarper {
    fn warp(&self, image: &DynamicImage, quad: &Quad) -> Result<DynamicImage> {
        self.rectify(image, quad)
    }
}

/// Area of a quadrilateral using the shoelace formula.
///
/// Corners must be in perimeter order.
fn shoelace_area(corners: &[(f32, f32); 4]) -> f32 {
    let n = corners.len();
    let mut area = 0.0f32;
    for i in 0..n {
        let j = (i + 1) % n;
        area += corners[i].0 * corners[j].1;
        area -= corners[j].0 * corners[i].1;
    }
    area.abs() / 2.0
}

// -- Tests --------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, GrayImage, Luma};
    use scanwerk_core::{Point2D, Rect};

    /// Dark background with a white page from (20, 30) to (120, 230).
    fn page_on_desk() -> DynamicImage {
        let mut img = GrayImage::from_pixel(160, 260, Luma([20u8]));
        for y in 30..230 {
            for x in 20..120 {
                img.put_pixel(x, y, Luma([240u8]));
            }
        }
        DynamicImage::ImageLuma8(img)
    }

    #[test]
    fn output_size_uses_longer_edges() {
        let quad = Quad::new(
            Point2D::new(10.0, 10.0),
            Point2D::new(110.0, 10.0),
            Point2D::new(0.0, 210.0),
            Point2D::new(130.0, 210.0),
        );
        let (w, h) = ImageWarper::output_size(&quad);
        assert_eq!(w, 130);
        // right edge: (110,10)-(130,210) = sqrt(400 + 40000) ~ 201.0
        assert_eq!(h, 201);
    }

    #[test]
    fn axis_aligned_quad_crops_the_page() {
        let quad = Rect::new(20.0, 30.0, 100.0, 200.0).corner_quad();
        let out = ImageWarper::new()
            .warp(&page_on_desk(), &quad)
            .expect("warp");
        assert_eq!(out.dimensions(), (100, 200));
        let centre = out.get_pixel(50, 100);
        assert!(centre[0] > 200, "expected page white, got {:?}", centre);
    }

    #[test]
    fn collapsed_quad_is_rejected() {
        let p = Point2D::new(40.0, 40.0);
        let err = ImageWarper::new()
            .warp(&page_on_desk(), &Quad::new(p, p, p, p))
            .unwrap_err();
        assert!(matches!(err, ScanwerkError::WarpFailed(_)));
    }

    #[test]
    fn nan_quad_is_rejected() {
        let mut quad = Rect::new(20.0, 30.0, 100.0, 200.0).corner_quad();
        quad.bottom_right.x = f64::NAN;
        assert!(ImageWarper::new().warp(&page_on_desk(), &quad).is_err());
    }

    #[test]
    fn shoelace_area_rectangle() {
        let corners = [(0.0, 0.0), (10.0, 0.0), (10.0, 5.0), (0.0, 5.0)];
        let area = shoelace_area(&corners);
        assert!((area - 50.0).abs() < 1e-3, "Expected 50.0, got {}", area);
    }
}
