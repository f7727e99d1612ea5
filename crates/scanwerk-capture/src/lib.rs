// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// scanwerk-capture: the capture screen's state machine.
//
// `CaptureOrchestrator` is the synchronous core and can be driven directly.
// `CaptureService` runs it on a blocking worker for hosts that deliver camera
// frames from their own threads.

pub mod orchestrator;
pub mod service;
pub mod session;
pub mod sink;

pub use orchestrator::{CaptureOrchestrator, FrameOutcome};
pub use service::{CaptureHandle, CaptureService, FrameGate};
pub use session::{CaptureSession, CapturedPage, FrameLock, PageId, RevealPlan};
pub use sink::{CaptureSink, ChannelSink, UiEvent};
