// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Hand-off from the capture pipeline to whatever draws the screen.
//
// The pipeline never touches UI state directly. It reports through a
// `CaptureSink`; `ChannelSink` turns those calls into `UiEvent`s on a channel
// drained by the UI-owned context.

use std::sync::Arc;

use scanwerk_core::{CaptureStatus, Quad};
use tokio::sync::mpsc;
use tracing::debug;

use crate::session::{CapturedPage, RevealPlan};

/// Receiver of pipeline output.
pub trait CaptureSink {
    /// New status line for the preview overlay.
    fn on_status(&self, status: CaptureStatus);

    /// Detected boundary in view coordinates, or `None` to hide the outline.
    fn on_outline(&self, outline: Option<Quad>);

    /// A page was corrected and should be revealed.
    fn on_corrected_image(&self, page: Arc<CapturedPage>, reveal: RevealPlan);

    /// Clear everything the capture screen is showing.
    fn on_reset(&self);
}

impl<T: CaptureSink + ?Sized> CaptureSink for Arc<T> {
    fn on_status(&self, status: CaptureStatus) {
        (**self).on_status(status)
    }

    fn on_outline(&self, outline: Option<Quad>) {
        (**self).on_outline(outline)
    }

    fn on_corrected_image(&self, page: Arc<CapturedPage>, reveal: RevealPlan) {
        (**self).on_corrected_image(page, reveal)
    }

    fn on_reset(&self) {
        (**self).on_reset()
    }
}

/// One sink call, as delivered over a channel.
#[derive(Debug, Clone)]
pub enum UiEvent {
    Status(CaptureStatus),
    Outline(Option<Quad>),
    CorrectedImage {
        page: Arc<CapturedPage>,
        reveal: RevealPlan,
    },
    Reset,
}

/// Forwards sink calls to a channel without blocking the capture worker.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<UiEvent>,
}

impl ChannelSink {
    /// Create a sink and the receiver the UI drains.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<UiEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, event: UiEvent) {
        // A closed receiver means the screen is gone; nothing left to update.
        if self.tx.send(event).is_err() {
            debug!("UI event receiver dropped");
        }
    }
}

impl CaptureSink for ChannelSink {
    fn on_status(&self, status: CaptureStatus) {
        self.send(UiEvent::Status(status));
    }

    fn on_outline(&self, outline: Option<Quad>) {
        self.send(UiEvent::Outline(outline));
    }

    fn on_corrected_image(&self, page: Arc<CapturedPage>, reveal: RevealPlan) {
        self.send(UiEvent::CorrectedImage { page, reveal });
    }

    fn on_reset(&self) {
        self.send(UiEvent::Reset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn channel_sink_forwards_in_order() {
        let (sink, mut rx) = ChannelSink::new();
        sink.on_status(CaptureStatus::HoldSteady);
        sink.on_outline(None);
        sink.on_reset();

        assert!(matches!(
            rx.recv().await,
            Some(UiEvent::Status(CaptureStatus::HoldSteady))
        ));
        assert!(matches!(rx.recv().await, Some(UiEvent::Outline(None))));
        assert!(matches!(rx.recv().await, Some(UiEvent::Reset)));
    }

    #[test]
    fn dropped_receiver_is_harmless() {
        let (sink, rx) = ChannelSink::new();
        drop(rx);
        sink.on_status(CaptureStatus::NotDetected);
    }
}
