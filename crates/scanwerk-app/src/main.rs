// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanwerk: live document capture.
//
// Entry point. Initialises logging, loads the capture configuration, and runs
// a capture session against the synthetic camera until a few pages have been
// collected.

mod simulate;

use std::path::PathBuf;
use std::time::Duration;

use scanwerk_bridge::{PlatformBridge, StillCamera, platform_bridge};
use scanwerk_capture::{CaptureOrchestrator, CaptureService, ChannelSink, UiEvent};
use scanwerk_core::error::Result;
use scanwerk_core::human_errors::humanize_error;
use scanwerk_core::{CaptureConfig, CaptureStatus, Rect};
use scanwerk_document::ImageWarper;
use tracing::{debug, error, info, trace, warn};

use simulate::{SimulatedCamera, SimulatedDetector, render_scene};

/// Phone-sized preview.
const VIEWPORT: Rect = Rect::new(0.0, 0.0, 390.0, 844.0);
/// Roughly 30 fps.
const FRAME_INTERVAL: Duration = Duration::from_millis(33);
const PAGES_TO_CAPTURE: usize = 2;
/// Frames of jitter before the simulated phone holds still.
const AIMING_FRAMES: usize = 12;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Scanwerk starting");

    if let Err(err) = run().await {
        let human = humanize_error(&err);
        error!(error = %err, suggestion = %human.suggestion, "{}", human.message);
        std::process::exit(1);
    }
}

/// Config from the first argument, or the defaults.
fn load_config() -> Result<CaptureConfig> {
    match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => CaptureConfig::load(&path),
        None => {
            debug!("No config file given; using defaults");
            Ok(CaptureConfig::default())
        }
    }
}

async fn run() -> Result<()> {
    let config = load_config()?;

    let bridge = platform_bridge();
    info!(platform = bridge.platform_name(), "Platform bridge ready");
    if let Err(err) = bridge.capture_still() {
        let human = humanize_error(&err);
        warn!(error = %err, "{} Using the simulated camera.", human.message);
    }

    let (sink, mut ui) = ChannelSink::new();
    let orchestrator = CaptureOrchestrator::new(
        SimulatedDetector::new(AIMING_FRAMES),
        SimulatedCamera::new(900, 1200),
        ImageWarper::new(),
        sink,
        config,
    )?
    .with_viewport(VIEWPORT);

    let service = CaptureService::spawn(orchestrator);
    let handle = service.handle();
    let gate = service.frame_gate();
    handle.start()?;

    // Camera preview: offer frames at a fixed rate; the gate drops any that
    // arrive while a detection is in flight.
    let preview = render_scene(300, 400);
    let feeder = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(FRAME_INTERVAL);
        loop {
            ticker.tick().await;
            if !gate.offer(preview.clone()) {
                trace!("Preview frame dropped");
            }
        }
    });

    while let Some(event) = ui.recv().await {
        match event {
            UiEvent::Status(status) => {
                info!(?status, "{}", status.message());
                if let CaptureStatus::Captured { page_count } = status {
                    if page_count >= PAGES_TO_CAPTURE {
                        break;
                    }
                }
            }
            UiEvent::Outline(outline) => trace!(?outline, "Outline updated"),
            UiEvent::CorrectedImage { page, reveal } => {
                let halfway = reveal.transform_at(0.5);
                info!(
                    page_id = %page.id,
                    width = page.image.width(),
                    height = page.image.height(),
                    display = ?reveal.display_rect,
                    duration_ms = reveal.duration.as_millis() as u64,
                    "Revealing corrected page"
                );
                debug!(
                    start = ?reveal.transform.to_layer_transform(),
                    halfway = ?halfway.homography(),
                    "Reveal transform"
                );
            }
            UiEvent::Reset => debug!("Capture screen reset"),
        }
    }

    feeder.abort();
    handle.stop()?;
    let pages = handle.take_pages().await?;
    for page in &pages {
        info!(
            page_id = %page.id,
            captured_at = %page.captured_at,
            confidence = page.detection.confidence,
            "Page ready"
        );
    }
    service.shutdown().await?;
    info!(pages = pages.len(), "Scanwerk finished");
    Ok(())
}
