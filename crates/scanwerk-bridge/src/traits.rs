// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait definitions for the capture collaborators.
//
// The capture flow only needs three things from the outside world: a
// boundary detector, a still camera, and a perspective-warp renderer. Each is
// a small trait so the orchestrator can be driven by native code, by the
// desktop implementations in this workspace, or by test doubles.

use image::DynamicImage;
use scanwerk_core::error::Result;
use scanwerk_core::{DetectionResult, Quad};

/// Native capabilities a platform provides for scanning.
///
/// Platforms without a camera return `ScanwerkError::PlatformUnavailable`
/// from the stub implementation.
pub trait PlatformBridge: StillCamera + DocumentDetector {
    /// Human-readable platform name (e.g. "iOS 17", "Android 14").
    fn platform_name(&self) -> &str;
}

/// Finds a quadrilateral document boundary in an image.
pub trait DocumentDetector {
    /// Detect the document in `frame`.
    ///
    /// Corners are normalized (unit square, origin bottom-left). Returns
    /// `ScanwerkError::NoDocumentFound` when there is nothing to report.
    fn detect(&self, frame: &DynamicImage) -> Result<DetectionResult>;
}

/// Takes a full-resolution photo.
pub trait StillCamera {
    /// Capture one still. Failures surface as `ScanwerkError::CaptureFailed`.
    fn capture_still(&self) -> Result<DynamicImage>;
}

/// Crops and rectifies the region bounded by a pixel-space quad.
pub trait WarpRenderer {
    /// Warp `quad` (pixels, origin top-left, contract order) of `image` into
    /// an upright rectangle. Failures surface as `ScanwerkError::WarpFailed`.
    fn warp(&self, image: &DynamicImage, quad: &Quad) -> Result<DynamicImage>;
}

impl<T: DocumentDetector + ?Sized> DocumentDetector for Box<T> {
    fn detect(&self, frame: &DynamicImage) -> Result<DetectionResult> {
        (**self).detect(frame)
    }
}

impl<T: StillCamera + ?Sized> StillCamera for Box<T> {
    fn capture_still(&self) -> Result<DynamicImage> {
        (**self).capture_still()
    }
}

impl<T: WarpRenderer + ?Sized> WarpRenderer for Box<T> {
    fn warp(&self, image: &DynamicImage, quad: &Quad) -> Result<DynamicImage> {
        (**self).warp(image, quad)
    }
}
