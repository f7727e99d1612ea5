// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub bridge for desktop/CI builds where the native camera is unavailable.
//
// Every trait method returns `PlatformUnavailable`; native implementations are
// supplied by the host application.

use image::DynamicImage;
use scanwerk_core::error::{Result, ScanwerkError};
use scanwerk_core::DetectionResult;

use crate::traits::*;

/// No-op bridge returned on non-mobile platforms.
pub struct StubBridge;

impl PlatformBridge for StubBridge {
    fn platform_name(&self) -> &str {
        "Desktop (stub)"
    }
}

impl StillCamera for StubBridge {
    fn capture_still(&self) -> Result<DynamicImage> {
        tracing::warn!("StillCamera::capture_still called on stub bridge");
        Err(ScanwerkError::PlatformUnavailable)
    }
}

impl DocumentDetector for StubBridge {
    fn detect(&self, _frame: &DynamicImage) -> Result<DetectionResult> {
        tracing::warn!("DocumentDetector::detect called on stub bridge");
        Err(ScanwerkError::PlatformUnavailable)
    }
}
