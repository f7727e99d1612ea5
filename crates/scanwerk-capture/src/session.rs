// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Capture session state: the in-flight lock, the stability window, and the
// pages captured so far.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use image::DynamicImage;
use scanwerk_core::{
    CaptureConfig, CaptureMode, CaptureState, DetectionResult, Point2D, Quad, Rect,
};
use scanwerk_geometry::{ProjectiveTransform, StabilityReading, StabilityTracker};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// FrameLock
// ---------------------------------------------------------------------------

/// "A detection or its result handling is in flight."
///
/// Shared between whoever delivers frames and the session. Acquiring is a
/// single compare-exchange, so two frames can never both see it free.
#[derive(Debug, Clone, Default)]
pub struct FrameLock(Arc<AtomicBool>);

impl FrameLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the lock. Returns `false` if it was already held.
    pub fn try_acquire(&self) -> bool {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn release(&self) {
        self.0.store(false, Ordering::Release);
    }

    pub fn is_locked(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

/// Unique identifier for a captured page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageId(pub Uuid);

impl PageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One perspective-corrected page.
#[derive(Debug, Clone)]
pub struct CapturedPage {
    pub id: PageId,
    pub captured_at: DateTime<Utc>,
    /// Detection on the still image, normalized.
    pub detection: DetectionResult,
    /// The quad that was warped, in still-image pixels.
    pub source_quad: Quad,
    /// The rectified page.
    pub image: DynamicImage,
}

/// How the UI should reveal a freshly corrected page.
///
/// The page is laid out at `display_rect` and starts with `transform`
/// applied, which puts its corners where the document was seen in the
/// preview. Animating the transform to identity over `duration` "snaps" it
/// flat.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevealPlan {
    pub display_rect: Rect,
    pub transform: ProjectiveTransform,
    pub duration: Duration,
}

impl RevealPlan {
    /// Transform at `progress` in `[0, 1]` through the reveal.
    pub fn transform_at(&self, progress: f64) -> ProjectiveTransform {
        self.transform.blend_to_identity(progress)
    }
}

// ---------------------------------------------------------------------------
// CaptureSession
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Running,
    Capturing,
}

/// Mutable state of one capture screen.
///
/// Owned by the orchestrator; only the [`FrameLock`] is shared.
#[derive(Debug)]
pub struct CaptureSession {
    phase: Phase,
    mode: CaptureMode,
    detection_enabled: bool,
    tracker: StabilityTracker,
    lock: FrameLock,
    pages: Vec<Arc<CapturedPage>>,
}

impl CaptureSession {
    pub fn new(config: &CaptureConfig) -> Self {
        Self {
            phase: Phase::Idle,
            mode: config.mode,
            detection_enabled: true,
            tracker: StabilityTracker::from_config(config),
            lock: FrameLock::new(),
            pages: Vec::new(),
        }
    }

    /// Derived lifecycle state.
    pub fn state(&self) -> CaptureState {
        match self.phase {
            Phase::Idle => CaptureState::Idle,
            Phase::Capturing => CaptureState::Capturing,
            Phase::Running if self.lock.is_locked() => CaptureState::Locked,
            Phase::Running if !self.tracker.is_empty() => CaptureState::Stabilizing,
            Phase::Running => CaptureState::AwaitingFrame,
        }
    }

    pub fn lock(&self) -> &FrameLock {
        &self.lock
    }

    pub fn is_running(&self) -> bool {
        self.phase != Phase::Idle
    }

    /// Whether live frames should reach the detector at all.
    pub fn accepts_frames(&self) -> bool {
        self.phase == Phase::Running && self.detection_enabled
    }

    pub fn start(&mut self) {
        if self.phase == Phase::Idle {
            self.phase = Phase::Running;
            self.tracker.reset();
        }
    }

    /// Go idle and clear the window.
    ///
    /// The frame lock is left alone: it belongs to whoever took it, and a
    /// frame admitted by a gate before the stop releases it when handled.
    pub fn stop(&mut self) {
        self.phase = Phase::Idle;
        self.tracker.reset();
    }

    pub fn mode(&self) -> CaptureMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: CaptureMode) {
        self.mode = mode;
        self.tracker.reset();
    }

    pub fn detection_enabled(&self) -> bool {
        self.detection_enabled
    }

    pub fn set_detection_enabled(&mut self, enabled: bool) {
        self.detection_enabled = enabled;
        self.tracker.reset();
    }

    /// Feed the reference corner to the stability window.
    pub fn track(&mut self, point: Point2D) -> StabilityReading {
        self.tracker.update(point)
    }

    pub fn reset_window(&mut self) {
        self.tracker.reset();
    }

    pub fn window_len(&self) -> usize {
        self.tracker.len()
    }

    /// Enter the capturing phase. The lock must already be held.
    pub fn begin_capture(&mut self) {
        self.phase = Phase::Capturing;
    }

    /// A capture produced a page: record it, clear the window, unlock.
    pub fn complete_capture(&mut self, page: Arc<CapturedPage>) -> usize {
        self.pages.push(page);
        self.tracker.reset();
        self.end_capture();
        self.pages.len()
    }

    /// A capture failed: unlock and keep the window.
    pub fn abort_capture(&mut self) {
        self.end_capture();
    }

    fn end_capture(&mut self) {
        if self.phase == Phase::Capturing {
            self.phase = Phase::Running;
        }
        self.lock.release();
    }

    pub fn pages(&self) -> &[Arc<CapturedPage>] {
        &self.pages
    }

    pub fn take_pages(&mut self) -> Vec<Arc<CapturedPage>> {
        self.tracker.reset();
        std::mem::take(&mut self.pages)
    }
}
