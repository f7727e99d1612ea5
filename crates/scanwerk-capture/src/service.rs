// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Capture service: runs an orchestrator on a dedicated blocking worker.
//
// Detection, still capture, and warping are blocking calls into native code,
// so the orchestrator lives on `spawn_blocking` and is driven over a command
// channel. Camera callbacks offer frames through a `FrameGate`, which takes
// the frame lock before enqueueing: while one frame is in flight, every other
// frame is dropped at the gate instead of queueing behind it.

use std::sync::Arc;

use image::DynamicImage;
use scanwerk_bridge::{DocumentDetector, StillCamera, WarpRenderer};
use scanwerk_core::error::{Result, ScanwerkError};
use scanwerk_core::{CaptureMode, CaptureState, Rect};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use crate::orchestrator::CaptureOrchestrator;
use crate::session::{CapturedPage, FrameLock};
use crate::sink::CaptureSink;

enum Command {
    /// A frame whose lock was taken by the gate.
    Frame(DynamicImage),
    Start,
    Stop,
    TriggerCapture,
    SetMode(CaptureMode),
    SetDetectionEnabled(bool),
    SetViewport(Rect),
    TakePages(oneshot::Sender<Vec<Arc<CapturedPage>>>),
    State(oneshot::Sender<CaptureState>),
    Shutdown,
}

/// A running capture worker.
pub struct CaptureService {
    handle: CaptureHandle,
    gate: FrameGate,
    task: JoinHandle<()>,
}

impl CaptureService {
    /// Move `orchestrator` onto a blocking worker. Must be called from within
    /// a Tokio runtime.
    pub fn spawn<D, C, W, S>(orchestrator: CaptureOrchestrator<D, C, W, S>) -> Self
    where
        D: DocumentDetector + Send + 'static,
        C: StillCamera + Send + 'static,
        W: WarpRenderer + Send + 'static,
        S: CaptureSink + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let lock = orchestrator.frame_lock();
        let task = tokio::task::spawn_blocking(move || run_worker(orchestrator, rx));
        info!("Capture worker spawned");

        Self {
            handle: CaptureHandle { tx: tx.clone() },
            gate: FrameGate { tx, lock },
            task,
        }
    }

    pub fn handle(&self) -> CaptureHandle {
        self.handle.clone()
    }

    pub fn frame_gate(&self) -> FrameGate {
        self.gate.clone()
    }

    /// Stop the worker and wait for it to exit.
    pub async fn shutdown(self) -> Result<()> {
        // The worker may already be gone; joining tells us either way.
        let _ = self.handle.tx.send(Command::Shutdown);
        self.task.await.map_err(|err| {
            warn!(error = %err, "Capture worker did not exit cleanly");
            ScanwerkError::SessionClosed
        })
    }
}

fn run_worker<D, C, W, S>(
    mut orchestrator: CaptureOrchestrator<D, C, W, S>,
    mut rx: mpsc::UnboundedReceiver<Command>,
) where
    D: DocumentDetector,
    C: StillCamera,
    W: WarpRenderer,
    S: CaptureSink,
{
    while let Some(command) = rx.blocking_recv() {
        match command {
            Command::Frame(frame) => {
                let outcome = orchestrator.handle_locked_frame(&frame);
                trace!(?outcome, "Frame processed");
            }
            Command::Start => orchestrator.start(),
            Command::Stop => orchestrator.stop(),
            Command::TriggerCapture => {
                let outcome = orchestrator.trigger_capture();
                debug!(?outcome, "Shutter tap processed");
            }
            Command::SetMode(mode) => orchestrator.set_mode(mode),
            Command::SetDetectionEnabled(enabled) => orchestrator.set_detection_enabled(enabled),
            Command::SetViewport(viewport) => orchestrator.set_viewport(viewport),
            Command::TakePages(reply) => {
                let _ = reply.send(orchestrator.take_pages());
            }
            Command::State(reply) => {
                let _ = reply.send(orchestrator.state());
            }
            Command::Shutdown => break,
        }
    }
    orchestrator.frame_lock().release();
    info!("Capture worker stopped");
}

// ---------------------------------------------------------------------------
// CaptureHandle
// ---------------------------------------------------------------------------

/// Cloneable control surface for the capture screen.
#[derive(Clone)]
pub struct CaptureHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl CaptureHandle {
    fn send(&self, command: Command) -> Result<()> {
        self.tx
            .send(command)
            .map_err(|_| ScanwerkError::SessionClosed)
    }

    pub fn start(&self) -> Result<()> {
        self.send(Command::Start)
    }

    pub fn stop(&self) -> Result<()> {
        self.send(Command::Stop)
    }

    /// Shutter tap.
    pub fn trigger_capture(&self) -> Result<()> {
        self.send(Command::TriggerCapture)
    }

    pub fn set_mode(&self, mode: CaptureMode) -> Result<()> {
        self.send(Command::SetMode(mode))
    }

    pub fn set_detection_enabled(&self, enabled: bool) -> Result<()> {
        self.send(Command::SetDetectionEnabled(enabled))
    }

    pub fn set_viewport(&self, viewport: Rect) -> Result<()> {
        self.send(Command::SetViewport(viewport))
    }

    /// The "done" button: collect every page captured so far.
    pub async fn take_pages(&self) -> Result<Vec<Arc<CapturedPage>>> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::TakePages(reply))?;
        rx.await.map_err(|_| ScanwerkError::SessionClosed)
    }

    pub async fn state(&self) -> Result<CaptureState> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::State(reply))?;
        rx.await.map_err(|_| ScanwerkError::SessionClosed)
    }
}

// ---------------------------------------------------------------------------
// FrameGate
// ---------------------------------------------------------------------------

/// Entry point for live preview frames.
#[derive(Clone)]
pub struct FrameGate {
    tx: mpsc::UnboundedSender<Command>,
    lock: FrameLock,
}

impl FrameGate {
    /// Offer a frame. Returns `false` if it was dropped because a detection
    /// or capture is in flight, or because the worker has stopped.
    pub fn offer(&self, frame: DynamicImage) -> bool {
        if !self.lock.try_acquire() {
            return false;
        }
        if self.tx.send(Command::Frame(frame)).is_err() {
            self.lock.release();
            return false;
        }
        true
    }

    pub fn is_busy(&self) -> bool {
        self.lock.is_locked()
    }
}
