// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Scanwerk capture flow.
//
// Points and quads are used in two coordinate spaces: normalized detector
// space (unit square, origin bottom-left, y up) and pixel space (origin
// top-left, y down). Nothing in this module converts between them; that is
// the projector's job.

use serde::{Deserialize, Serialize};

/// A 2D point, either normalized or in pixels depending on context.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Offset by `(dx, dy)`.
    pub fn translated(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn distance_to(self, other: Point2D) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Four document corners in the fixed order top-left, top-right, bottom-left,
/// bottom-right.
///
/// The order is part of the contract with the detector and the renderer;
/// nothing downstream re-sorts the corners.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Quad {
    pub top_left: Point2D,
    pub top_right: Point2D,
    pub bottom_left: Point2D,
    pub bottom_right: Point2D,
}

impl Quad {
    pub const fn new(
        top_left: Point2D,
        top_right: Point2D,
        bottom_left: Point2D,
        bottom_right: Point2D,
    ) -> Self {
        Self {
            top_left,
            top_right,
            bottom_left,
            bottom_right,
        }
    }

    /// The whole frame in normalized detector space (origin bottom-left).
    pub const fn unit() -> Self {
        Self::new(
            Point2D::new(0.0, 1.0),
            Point2D::new(1.0, 1.0),
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, 0.0),
        )
    }

    /// Build from corners given in contract order.
    pub const fn from_corners(corners: [Point2D; 4]) -> Self {
        Self::new(corners[0], corners[1], corners[2], corners[3])
    }

    /// Corners in contract order: TL, TR, BL, BR.
    pub const fn corners(&self) -> [Point2D; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_left,
            self.bottom_right,
        ]
    }

    /// Apply `f` to each corner, keeping the order.
    pub fn map(&self, f: impl FnMut(Point2D) -> Point2D) -> Self {
        Self::from_corners(self.corners().map(f))
    }

    /// Offset every corner by `(dx, dy)`.
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        self.map(|p| p.translated(dx, dy))
    }

    pub fn is_finite(&self) -> bool {
        self.corners().iter().all(|p| p.is_finite())
    }
}

/// Width and height of an image or view, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Both dimensions are finite and strictly positive.
    pub fn is_drawable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

impl From<(u32, u32)> for Size {
    fn from((width, height): (u32, u32)) -> Self {
        Self::new(width as f64, height as f64)
    }
}

/// Axis-aligned rectangle in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle at the origin with the given size.
    pub const fn from_size(size: Size) -> Self {
        Self::new(0.0, 0.0, size.width, size.height)
    }

    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub const fn origin(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }

    /// The same rectangle moved to `(0, 0)`.
    pub const fn local(&self) -> Self {
        Self::new(0.0, 0.0, self.width, self.height)
    }

    /// The rectangle's own corners, in pixel space, in quad contract order.
    pub fn corner_quad(&self) -> Quad {
        let (x0, y0) = (self.x, self.y);
        let (x1, y1) = (self.x + self.width, self.y + self.height);
        Quad::new(
            Point2D::new(x0, y0),
            Point2D::new(x1, y0),
            Point2D::new(x0, y1),
            Point2D::new(x1, y1),
        )
    }
}

/// One detector answer: a normalized quad and a confidence in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub quad: Quad,
    pub confidence: f64,
}

impl DetectionResult {
    pub const fn new(quad: Quad, confidence: f64) -> Self {
        Self { quad, confidence }
    }
}

/// Coefficient of variation (stddev / mean) per axis over the stability window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DispersionStat {
    pub coef_x: f64,
    pub coef_y: f64,
}

impl DispersionStat {
    /// Both axes strictly below `threshold`.
    pub fn is_within(&self, threshold: f64) -> bool {
        self.coef_x < threshold && self.coef_y < threshold
    }
}

/// How the shutter fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CaptureMode {
    /// Fire once the detected boundary has settled.
    #[default]
    Automatic,
    /// Fire on any confident detection, skipping the stability window.
    Manual,
}

/// Lifecycle states of a capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaptureState {
    /// Session not started.
    Idle,
    /// Ready for the next frame, no samples collected.
    AwaitingFrame,
    /// A detection or its result handling is in flight; frames are dropped.
    Locked,
    /// Collecting stability samples between frames.
    Stabilizing,
    /// A still capture has been requested and is being processed.
    Capturing,
}

/// Status line shown over the camera preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaptureStatus {
    /// No document in the current frame.
    NotDetected,
    /// Document found, waiting for the boundary to settle.
    ReadyToCapture,
    /// Still collecting samples.
    HoldSteady,
    /// Shutter fired.
    Capturing,
    /// A page was added.
    Captured { page_count: usize },
    /// The camera failed to deliver a still image.
    CaptureFailed,
    /// The still image contained no document.
    NoDocumentInCapture,
    /// Cropping or geometry failed for this capture.
    CorrectionFailed,
}

impl CaptureStatus {
    /// Short message for the preview overlay.
    pub fn message(&self) -> String {
        match self {
            Self::NotDetected => "Place the document inside the frame".into(),
            Self::ReadyToCapture => "Ready to capture".into(),
            Self::HoldSteady => "Hold steady".into(),
            Self::Capturing => "Capturing...".into(),
            Self::Captured { page_count } => format!("{page_count} page(s) captured"),
            Self::CaptureFailed => "Could not capture the document".into(),
            Self::NoDocumentInCapture => "No document detected".into(),
            Self::CorrectionFailed => "Cropping failed".into(),
        }
    }

    /// Whether the status reports a failed capture cycle.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::CaptureFailed | Self::NoDocumentInCapture | Self::CorrectionFailed
        )
    }
}
