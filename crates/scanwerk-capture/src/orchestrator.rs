// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Capture orchestrator: the per-frame state machine of the capture screen.
//
// Live frames run through the detector one at a time (the frame lock drops
// anything that arrives while a detection is in flight). In automatic mode
// the detected top-left corner feeds the stability window and a settled
// window fires the shutter; in manual mode any confident detection does. The
// still is then detected again, cropped, and planned for the reveal.

use std::sync::Arc;

use chrono::Utc;
use image::{DynamicImage, GenericImageView};
use scanwerk_bridge::{DocumentDetector, StillCamera, WarpRenderer};
use scanwerk_core::error::{Result, ScanwerkError};
use scanwerk_core::human_errors::status_for_error;
use scanwerk_core::{
    CaptureConfig, CaptureMode, CaptureState, CaptureStatus, DetectionResult, Rect, Size,
};
use scanwerk_geometry::{fit_display_rect, plan, project_onto_image, project_with_threshold};
use tracing::{debug, info, instrument, trace, warn};

use crate::session::{CaptureSession, CapturedPage, FrameLock, PageId, RevealPlan};
use crate::sink::CaptureSink;

/// What happened to one frame (or one shutter tap).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// A detection or capture was already in flight; the detector was not run.
    Dropped,
    /// The session is stopped or detection is switched off.
    Ignored,
    NotDetected,
    /// Detected, window still filling.
    HoldSteady,
    /// Detected, window full but not settled.
    ReadyToCapture,
    Captured { page_id: PageId, page_count: usize },
    /// The capture cycle failed with the given status.
    Failed(CaptureStatus),
}

/// Drives one capture screen.
pub struct CaptureOrchestrator<D, C, W, S> {
    detector: D,
    camera: C,
    warper: W,
    sink: S,
    config: CaptureConfig,
    session: CaptureSession,
    /// The preview's frame, in screen coordinates.
    viewport: Rect,
}

impl<D, C, W, S> CaptureOrchestrator<D, C, W, S>
where
    D: DocumentDetector,
    C: StillCamera,
    W: WarpRenderer,
    S: CaptureSink,
{
    /// Build an orchestrator. The session starts `Idle`.
    pub fn new(detector: D, camera: C, warper: W, sink: S, config: CaptureConfig) -> Result<Self> {
        config.validate()?;
        let session = CaptureSession::new(&config);
        Ok(Self {
            detector,
            camera,
            warper,
            sink,
            config,
            session,
            viewport: Rect::default(),
        })
    }

    pub fn with_viewport(mut self, viewport: Rect) -> Self {
        self.viewport = viewport;
        self
    }

    // -- Accessors ------------------------------------------------------------

    pub fn state(&self) -> CaptureState {
        self.session.state()
    }

    pub fn mode(&self) -> CaptureMode {
        self.session.mode()
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Shared handle on the in-flight lock, for frame producers that gate
    /// before handing frames over.
    pub fn frame_lock(&self) -> FrameLock {
        self.session.lock().clone()
    }

    pub fn pages(&self) -> &[Arc<CapturedPage>] {
        self.session.pages()
    }

    pub fn page_count(&self) -> usize {
        self.session.pages().len()
    }

    /// Samples currently in the stability window.
    pub fn window_len(&self) -> usize {
        self.session.window_len()
    }

    // -- Controls -------------------------------------------------------------

    pub fn set_viewport(&mut self, viewport: Rect) {
        debug!(?viewport, "Viewport updated");
        self.viewport = viewport;
    }

    pub fn start(&mut self) {
        info!(mode = ?self.session.mode(), "Capture session started");
        self.session.start();
    }

    pub fn stop(&mut self) {
        info!("Capture session stopped");
        self.session.stop();
        self.sink.on_outline(None);
    }

    pub fn set_mode(&mut self, mode: CaptureMode) {
        debug!(?mode, "Capture mode changed");
        self.session.set_mode(mode);
    }

    pub fn set_detection_enabled(&mut self, enabled: bool) {
        debug!(enabled, "Detection toggled");
        self.session.set_detection_enabled(enabled);
        if !enabled {
            self.sink.on_reset();
        }
    }

    /// Hand over every captured page and clear the screen.
    pub fn take_pages(&mut self) -> Vec<Arc<CapturedPage>> {
        let pages = self.session.take_pages();
        info!(count = pages.len(), "Captured pages handed over");
        self.sink.on_reset();
        pages
    }

    // -- Frames ---------------------------------------------------------------

    /// Process one live preview frame.
    pub fn handle_frame(&mut self, frame: &DynamicImage) -> FrameOutcome {
        if !self.session.lock().try_acquire() {
            trace!("Frame dropped: detection in flight");
            return FrameOutcome::Dropped;
        }
        self.handle_locked_frame(frame)
    }

    /// Process a frame whose producer already acquired [`Self::frame_lock`].
    pub fn handle_locked_frame(&mut self, frame: &DynamicImage) -> FrameOutcome {
        if !self.session.accepts_frames() {
            self.session.lock().release();
            return FrameOutcome::Ignored;
        }

        let Some(detection) = self.detect_live(frame) else {
            self.session.reset_window();
            self.session.lock().release();
            self.sink.on_outline(None);
            self.sink.on_status(CaptureStatus::NotDetected);
            return FrameOutcome::NotDetected;
        };

        self.show_outline(Size::from(frame.dimensions()), &detection);

        match self.session.mode() {
            CaptureMode::Manual => self.capture(),
            CaptureMode::Automatic => {
                let reading = self.session.track(detection.quad.top_left);
                if reading.dispersion.is_none() {
                    self.session.lock().release();
                    self.sink.on_status(CaptureStatus::HoldSteady);
                    FrameOutcome::HoldSteady
                } else if !reading.settled {
                    self.session.lock().release();
                    self.sink.on_status(CaptureStatus::ReadyToCapture);
                    FrameOutcome::ReadyToCapture
                } else {
                    debug!(dispersion = ?reading.dispersion, "Boundary settled");
                    self.capture()
                }
            }
        }
    }

    /// Shutter tap: capture now, whatever the mode and window say.
    pub fn trigger_capture(&mut self) -> FrameOutcome {
        if !self.session.is_running() {
            return FrameOutcome::Ignored;
        }
        if !self.session.lock().try_acquire() {
            debug!("Shutter tap ignored: capture in flight");
            return FrameOutcome::Dropped;
        }
        self.capture()
    }

    fn detect_live(&self, frame: &DynamicImage) -> Option<DetectionResult> {
        match self.detector.detect(frame) {
            Ok(detection) if detection.confidence > self.config.live_detection_confidence => {
                Some(detection)
            }
            Ok(detection) => {
                trace!(confidence = detection.confidence, "Detection below live threshold");
                None
            }
            Err(ScanwerkError::NoDocumentFound) => None,
            Err(err) => {
                warn!(error = %err, "Detector failed on live frame");
                None
            }
        }
    }

    fn show_outline(&self, frame_size: Size, detection: &DetectionResult) {
        let projected = project_with_threshold(
            frame_size,
            self.viewport,
            &detection.quad,
            detection.confidence,
            self.config.projection_confidence,
        );
        match projected {
            Ok(quad) => self
                .sink
                .on_outline(Some(quad.translated(self.viewport.x, self.viewport.y))),
            Err(err) => {
                trace!(error = %err, "Outline not drawable");
                self.sink.on_outline(None);
            }
        }
    }

    // -- Capture --------------------------------------------------------------

    /// Run one still capture. The frame lock must be held.
    #[instrument(level = "debug", skip_all)]
    fn capture(&mut self) -> FrameOutcome {
        self.session.begin_capture();
        self.sink.on_status(CaptureStatus::Capturing);
        info!("Still capture requested");

        let result = self
            .camera
            .capture_still()
            .and_then(|still| self.correct(&still));

        match result {
            Ok((page, reveal)) => {
                let page_id = page.id;
                self.sink.on_corrected_image(Arc::clone(&page), reveal);
                let page_count = self.session.complete_capture(page);
                self.sink.on_status(CaptureStatus::Captured { page_count });
                info!(%page_id, page_count, "Page captured");
                FrameOutcome::Captured {
                    page_id,
                    page_count,
                }
            }
            Err(err) => {
                let status = status_for_error(&err);
                warn!(error = %err, ?status, "Capture failed");
                self.session.abort_capture();
                self.sink.on_status(status);
                FrameOutcome::Failed(status)
            }
        }
    }

    /// Detect, crop, and plan the reveal for one still.
    fn correct(&self, still: &DynamicImage) -> Result<(Arc<CapturedPage>, RevealPlan)> {
        let detection = self.detector.detect(still).map_err(|err| {
            if !matches!(err, ScanwerkError::NoDocumentFound) {
                warn!(error = %err, "Detector failed on still image");
            }
            ScanwerkError::NoDocumentFound
        })?;

        let image_size = Size::from(still.dimensions());
        let threshold = self.config.projection_confidence;

        let source_quad =
            project_onto_image(image_size, &detection.quad, detection.confidence, threshold)?;
        let corrected = self.warper.warp(still, &source_quad)?;

        // Where the document sat in the preview, in screen coordinates.
        let destination = project_with_threshold(
            image_size,
            self.viewport,
            &detection.quad,
            detection.confidence,
            threshold,
        )?
        .translated(self.viewport.x, self.viewport.y);

        let display_rect = fit_display_rect(
            Size::from(corrected.dimensions()),
            self.viewport,
            self.config.display_fill_fraction,
            self.config.display_reserved_height,
        )?;
        let transform = plan(
            display_rect.local(),
            &destination.translated(-display_rect.x, -display_rect.y),
        )?;
        debug!(?display_rect, "Reveal planned");

        let page = Arc::new(CapturedPage {
            id: PageId::new(),
            captured_at: Utc::now(),
            detection,
            source_quad,
            image: corrected,
        });
        let reveal = RevealPlan {
            display_rect,
            transform,
            duration: self.config.reveal_duration(),
        };
        Ok((page, reveal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use scanwerk_core::{Point2D, Quad};
    use scanwerk_document::ImageWarper;

    use crate::sink::UiEvent;

    // -- Test doubles ---------------------------------------------------------

    /// Detector driven by a closure, counting calls.
    struct FnDetector<F> {
        calls: Arc<AtomicUsize>,
        answer: F,
    }

    impl<F> DocumentDetector for FnDetector<F>
    where
        F: Fn(&DynamicImage) -> Result<DetectionResult>,
    {
        fn detect(&self, frame: &DynamicImage) -> Result<DetectionResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.answer)(frame)
        }
    }

    struct TestCamera {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    impl StillCamera for TestCamera {
        fn capture_still(&self) -> Result<DynamicImage> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ScanwerkError::CaptureFailed("shutter jammed".into()));
            }
            Ok(DynamicImage::new_rgb8(STILL_W, STILL_H))
        }
    }

    struct BrokenWarper;

    impl WarpRenderer for BrokenWarper {
        fn warp(&self, _image: &DynamicImage, _quad: &Quad) -> Result<DynamicImage> {
            Err(ScanwerkError::WarpFailed("renderer offline".into()))
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<UiEvent>>,
    }

    impl RecordingSink {
        fn statuses(&self) -> Vec<CaptureStatus> {
            self.events
                .lock()
                .expect("sink lock")
                .iter()
                .filter_map(|e| match e {
                    UiEvent::Status(s) => Some(*s),
                    _ => None,
                })
                .collect()
        }

        fn reveals(&self) -> Vec<RevealPlan> {
            self.events
                .lock()
                .expect("sink lock")
                .iter()
                .filter_map(|e| match e {
                    UiEvent::CorrectedImage { reveal, .. } => Some(*reveal),
                    _ => None,
                })
                .collect()
        }

        fn resets(&self) -> usize {
            self.events
                .lock()
                .expect("sink lock")
                .iter()
                .filter(|e| matches!(e, UiEvent::Reset))
                .count()
        }
    }

    impl CaptureSink for RecordingSink {
        fn on_status(&self, status: CaptureStatus) {
            self.events.lock().expect("sink lock").push(UiEvent::Status(status));
        }

        fn on_outline(&self, outline: Option<Quad>) {
            self.events.lock().expect("sink lock").push(UiEvent::Outline(outline));
        }

        fn on_corrected_image(&self, page: Arc<CapturedPage>, reveal: RevealPlan) {
            self.events
                .lock()
                .expect("sink lock")
                .push(UiEvent::CorrectedImage { page, reveal });
        }

        fn on_reset(&self) {
            self.events.lock().expect("sink lock").push(UiEvent::Reset);
        }
    }

    // -- Fixtures -------------------------------------------------------------

    const STILL_W: u32 = 300;
    const STILL_H: u32 = 400;

    fn page_quad() -> Quad {
        Quad::new(
            Point2D::new(0.10, 0.90),
            Point2D::new(0.90, 0.90),
            Point2D::new(0.10, 0.10),
            Point2D::new(0.90, 0.10),
        )
    }

    fn steady(confidence: f64) -> impl Fn(&DynamicImage) -> Result<DetectionResult> {
        move |_| Ok(DetectionResult::new(page_quad(), confidence))
    }

    fn frame() -> DynamicImage {
        DynamicImage::new_rgb8(STILL_W, STILL_H)
    }

    struct Rig<F, W> {
        orchestrator: CaptureOrchestrator<FnDetector<F>, TestCamera, W, Arc<RecordingSink>>,
        detector_calls: Arc<AtomicUsize>,
        camera_calls: Arc<AtomicUsize>,
        sink: Arc<RecordingSink>,
    }

    fn rig_with<F, W>(answer: F, warper: W, camera_fails: bool, mode: CaptureMode) -> Rig<F, W>
    where
        F: Fn(&DynamicImage) -> Result<DetectionResult>,
        W: WarpRenderer,
    {
        let detector_calls = Arc::new(AtomicUsize::new(0));
        let camera_calls = Arc::new(AtomicUsize::new(0));
        let sink = Arc::new(RecordingSink::default());
        let config = CaptureConfig {
            mode,
            ..Default::default()
        };
        let mut orchestrator = CaptureOrchestrator::new(
            FnDetector {
                calls: Arc::clone(&detector_calls),
                answer,
            },
            TestCamera {
                calls: Arc::clone(&camera_calls),
                fail: camera_fails,
            },
            warper,
            Arc::clone(&sink),
            config,
        )
        .expect("valid config")
        .with_viewport(Rect::new(0.0, 0.0, 390.0, 844.0));
        orchestrator.start();
        Rig {
            orchestrator,
            detector_calls,
            camera_calls,
            sink,
        }
    }

    fn rig<F>(answer: F) -> Rig<F, ImageWarper>
    where
        F: Fn(&DynamicImage) -> Result<DetectionResult>,
    {
        rig_with(answer, ImageWarper::new(), false, CaptureMode::Automatic)
    }

    // -- Tests ----------------------------------------------------------------

    #[test]
    fn thirty_steady_frames_capture_exactly_once() {
        let mut rig = rig(steady(0.95));
        let frame = frame();

        for i in 1..30 {
            let outcome = rig.orchestrator.handle_frame(&frame);
            assert_eq!(outcome, FrameOutcome::HoldSteady, "frame {i}");
            assert_eq!(rig.camera_calls.load(Ordering::SeqCst), 0);
        }

        let outcome = rig.orchestrator.handle_frame(&frame);
        assert!(
            matches!(outcome, FrameOutcome::Captured { page_count: 1, .. }),
            "got {outcome:?}"
        );
        assert_eq!(rig.camera_calls.load(Ordering::SeqCst), 1);
        assert_eq!(rig.orchestrator.page_count(), 1);
        assert_eq!(rig.orchestrator.window_len(), 0);
        assert_eq!(rig.orchestrator.state(), CaptureState::AwaitingFrame);
        assert_eq!(
            rig.sink.statuses().last(),
            Some(&CaptureStatus::Captured { page_count: 1 })
        );
    }

    #[test]
    fn face_on_capture_reveals_without_distortion() {
        let mut rig = rig(steady(0.95));
        let frame = frame();
        for _ in 0..30 {
            rig.orchestrator.handle_frame(&frame);
        }

        let reveals = rig.sink.reveals();
        assert_eq!(reveals.len(), 1);
        let reveal = reveals[0];
        // 240x320 page fitted into 312 x 644 on a 390x844 screen.
        assert!((reveal.display_rect.x - 39.0).abs() < 1e-6);
        assert!((reveal.display_rect.y - 214.0).abs() < 1e-6);
        assert!((reveal.display_rect.width - 312.0).abs() < 1e-6);
        assert!((reveal.display_rect.height - 416.0).abs() < 1e-6);
        assert!(reveal.transform.is_identity(1e-6));
        assert_eq!(reveal.duration, std::time::Duration::from_millis(500));

        let page = &rig.orchestrator.pages()[0];
        assert_eq!(page.image.dimensions(), (240, 320));
        assert!((page.source_quad.top_left.x - 30.0).abs() < 1e-9);
        assert!((page.source_quad.top_left.y - 40.0).abs() < 1e-9);
    }

    #[test]
    fn frames_are_dropped_while_locked() {
        let mut rig = rig(steady(0.95));
        let lock = rig.orchestrator.frame_lock();
        assert!(lock.try_acquire());

        let before = rig.detector_calls.load(Ordering::SeqCst);
        assert_eq!(rig.orchestrator.handle_frame(&frame()), FrameOutcome::Dropped);
        assert_eq!(rig.detector_calls.load(Ordering::SeqCst), before);
        assert_eq!(rig.orchestrator.state(), CaptureState::Locked);

        lock.release();
        assert_eq!(rig.orchestrator.handle_frame(&frame()), FrameOutcome::HoldSteady);
        assert_eq!(rig.detector_calls.load(Ordering::SeqCst), before + 1);
    }

    #[test]
    fn low_confidence_clears_window() {
        let confident = Arc::new(std::sync::atomic::AtomicBool::new(true));
        let flag = Arc::clone(&confident);
        let mut rig = rig(move |_: &DynamicImage| {
            let confidence = if flag.load(Ordering::SeqCst) { 0.95 } else { 0.85 };
            Ok(DetectionResult::new(page_quad(), confidence))
        });
        let frame = frame();
        for _ in 0..5 {
            rig.orchestrator.handle_frame(&frame);
        }
        assert_eq!(rig.orchestrator.window_len(), 5);

        confident.store(false, Ordering::SeqCst);
        assert_eq!(rig.orchestrator.handle_frame(&frame), FrameOutcome::NotDetected);
        assert_eq!(rig.orchestrator.window_len(), 0);
        assert!(!rig.orchestrator.frame_lock().is_locked());
        assert_eq!(rig.sink.statuses().last(), Some(&CaptureStatus::NotDetected));
    }

    #[test]
    fn missing_document_is_not_detected() {
        let mut rig = rig(|_: &DynamicImage| Err(ScanwerkError::NoDocumentFound));
        assert_eq!(rig.orchestrator.handle_frame(&frame()), FrameOutcome::NotDetected);
        assert_eq!(rig.orchestrator.state(), CaptureState::AwaitingFrame);
    }

    #[test]
    fn jittery_window_is_ready_but_does_not_fire() {
        let tick = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&tick);
        let mut rig = rig(move |_: &DynamicImage| {
            let i = counter.fetch_add(1, Ordering::SeqCst);
            let mut quad = page_quad();
            quad.top_left.x = if i % 2 == 0 { 0.05 } else { 0.5 };
            Ok(DetectionResult::new(quad, 0.95))
        });
        let frame = frame();
        let mut last = FrameOutcome::Ignored;
        for _ in 0..40 {
            last = rig.orchestrator.handle_frame(&frame);
        }
        assert_eq!(last, FrameOutcome::ReadyToCapture);
        assert_eq!(rig.camera_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn camera_failure_unlocks_and_keeps_window() {
        let mut rig = rig_with(
            steady(0.95),
            ImageWarper::new(),
            true,
            CaptureMode::Automatic,
        );
        let frame = frame();
        for _ in 0..29 {
            rig.orchestrator.handle_frame(&frame);
        }
        let outcome = rig.orchestrator.handle_frame(&frame);
        assert_eq!(outcome, FrameOutcome::Failed(CaptureStatus::CaptureFailed));
        assert_eq!(rig.orchestrator.window_len(), 30);
        assert!(!rig.orchestrator.frame_lock().is_locked());

        // The window is still settled, so the next frame tries again.
        rig.orchestrator.handle_frame(&frame);
        assert_eq!(rig.camera_calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn still_without_document_reports_no_document() {
        // Live frames are smaller than the still, so the detector can tell them apart.
        let mut rig = rig(|img: &DynamicImage| {
            if img.width() == STILL_W {
                Err(ScanwerkError::NoDocumentFound)
            } else {
                Ok(DetectionResult::new(page_quad(), 0.95))
            }
        });
        let live = DynamicImage::new_rgb8(150, 200);
        for _ in 0..29 {
            rig.orchestrator.handle_frame(&live);
        }
        let outcome = rig.orchestrator.handle_frame(&live);
        assert_eq!(outcome, FrameOutcome::Failed(CaptureStatus::NoDocumentInCapture));
        assert_eq!(rig.orchestrator.page_count(), 0);
        assert_eq!(rig.orchestrator.state(), CaptureState::Stabilizing);
    }

    #[test]
    fn warp_failure_reports_correction_failed() {
        let mut rig = rig_with(steady(0.95), BrokenWarper, false, CaptureMode::Manual);
        let outcome = rig.orchestrator.handle_frame(&frame());
        assert_eq!(outcome, FrameOutcome::Failed(CaptureStatus::CorrectionFailed));
        assert!(!rig.orchestrator.frame_lock().is_locked());
    }

    #[test]
    fn degenerate_viewport_reports_correction_failed() {
        let mut rig = rig(steady(0.95));
        rig.orchestrator.set_viewport(Rect::new(0.0, 0.0, 390.0, 150.0));
        let outcome = rig.orchestrator.trigger_capture();
        assert_eq!(outcome, FrameOutcome::Failed(CaptureStatus::CorrectionFailed));
    }

    #[test]
    fn manual_mode_captures_on_first_detection() {
        let mut rig = rig_with(steady(0.95), ImageWarper::new(), false, CaptureMode::Manual);
        let outcome = rig.orchestrator.handle_frame(&frame());
        assert!(matches!(outcome, FrameOutcome::Captured { .. }));
        assert_eq!(rig.camera_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn shutter_tap_is_ignored_while_locked() {
        let mut rig = rig(steady(0.95));
        let lock = rig.orchestrator.frame_lock();
        assert!(lock.try_acquire());
        assert_eq!(rig.orchestrator.trigger_capture(), FrameOutcome::Dropped);
        lock.release();
        assert!(matches!(
            rig.orchestrator.trigger_capture(),
            FrameOutcome::Captured { .. }
        ));
    }

    #[test]
    fn disabled_detection_skips_detector() {
        let mut rig = rig(steady(0.95));
        rig.orchestrator.handle_frame(&frame());
        rig.orchestrator.set_detection_enabled(false);
        assert_eq!(rig.orchestrator.window_len(), 0);
        assert_eq!(rig.sink.resets(), 1);

        let before = rig.detector_calls.load(Ordering::SeqCst);
        assert_eq!(rig.orchestrator.handle_frame(&frame()), FrameOutcome::Ignored);
        assert_eq!(rig.detector_calls.load(Ordering::SeqCst), before);
        assert!(!rig.orchestrator.frame_lock().is_locked());
    }

    #[test]
    fn stopped_session_ignores_frames() {
        let mut rig = rig(steady(0.95));
        rig.orchestrator.stop();
        assert_eq!(rig.orchestrator.handle_frame(&frame()), FrameOutcome::Ignored);
        assert_eq!(rig.orchestrator.trigger_capture(), FrameOutcome::Ignored);
        assert_eq!(rig.orchestrator.state(), CaptureState::Idle);
    }

    #[test]
    fn mode_switch_resets_window() {
        let mut rig = rig(steady(0.95));
        for _ in 0..10 {
            rig.orchestrator.handle_frame(&frame());
        }
        rig.orchestrator.set_mode(CaptureMode::Manual);
        assert_eq!(rig.orchestrator.window_len(), 0);
        assert_eq!(rig.orchestrator.mode(), CaptureMode::Manual);
    }

    #[test]
    fn take_pages_hands_over_and_resets() {
        let mut rig = rig_with(steady(0.95), ImageWarper::new(), false, CaptureMode::Manual);
        rig.orchestrator.handle_frame(&frame());
        rig.orchestrator.handle_frame(&frame());
        let pages = rig.orchestrator.take_pages();
        assert_eq!(pages.len(), 2);
        assert_ne!(pages[0].id, pages[1].id);
        assert_eq!(rig.orchestrator.page_count(), 0);
        assert_eq!(rig.sink.resets(), 1);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = CaptureConfig {
            window_capacity: 0,
            ..Default::default()
        };
        let result = CaptureOrchestrator::new(
            FnDetector {
                calls: Arc::new(AtomicUsize::new(0)),
                answer: steady(0.95),
            },
            TestCamera {
                calls: Arc::new(AtomicUsize::new(0)),
                fail: false,
            },
            ImageWarper::new(),
            RecordingSink::default(),
            config,
        );
        assert!(matches!(result, Err(ScanwerkError::InvalidConfig(_))));
    }
}
