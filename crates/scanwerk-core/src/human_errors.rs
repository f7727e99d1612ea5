// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the capture screen.
//
// Every technical error is mapped to plain English with a clear suggestion.
// The severity drives whether the UI shows a transient toast or an alert.

use crate::error::{GeometryError, ScanwerkError};
use crate::types::CaptureStatus;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The next frame or tap will likely succeed.
    Transient,
    /// User must do something (grant camera access, fix the config file).
    ActionRequired,
    /// Cannot be fixed by retrying.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether the capture loop simply carries on.
    pub retriable: bool,
    /// Severity level (drives icon/colour in UI).
    pub severity: Severity,
}

/// Convert a `ScanwerkError` into a `HumanError`.
pub fn humanize_error(err: &ScanwerkError) -> HumanError {
    match err {
        ScanwerkError::NoDocumentFound => HumanError {
            message: "No document detected.".into(),
            suggestion: "Lay the page on a contrasting surface and keep all four corners in view."
                .into(),
            retriable: true,
            severity: Severity::Transient,
        },

        ScanwerkError::CaptureFailed(_) => HumanError {
            message: "Could not capture the document.".into(),
            suggestion: "Hold the phone still and try again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        ScanwerkError::WarpFailed(_) => HumanError {
            message: "Cropping failed.".into(),
            suggestion: "Try again with the whole page visible and evenly lit.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        ScanwerkError::Geometry(GeometryError::Degenerate(_) | GeometryError::NonFinite) => {
            HumanError {
                message: "The page outline could not be used.".into(),
                suggestion: "Move a little further away so the page edges are clearly visible."
                    .into(),
                retriable: true,
                severity: Severity::Transient,
            }
        }

        ScanwerkError::SessionClosed => HumanError {
            message: "The camera has stopped.".into(),
            suggestion: "Close and reopen the scanner.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ScanwerkError::InvalidConfig(detail) => HumanError {
            message: "The scanner settings are not valid.".into(),
            suggestion: format!("Fix or delete the settings file. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ScanwerkError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                HumanError {
                    message: "The file couldn't be found.".into(),
                    suggestion: "It may have been moved or deleted.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "There was a problem reading or writing a file.".into(),
                    suggestion: "Try again. If this keeps happening, your device's storage may be full."
                        .into(),
                    retriable: true,
                    severity: Severity::Transient,
                }
            }
        }

        ScanwerkError::Serialization(_) => HumanError {
            message: "The scanner settings file is damaged.".into(),
            suggestion: "Delete the settings file to restore the defaults.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ScanwerkError::PlatformUnavailable => HumanError {
            message: "This feature isn't available on your device.".into(),
            suggestion: "Document scanning needs a device with a camera.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },
    }
}

/// The preview status line a failed capture cycle should show.
pub fn status_for_error(err: &ScanwerkError) -> CaptureStatus {
    match err {
        ScanwerkError::NoDocumentFound => CaptureStatus::NoDocumentInCapture,
        ScanwerkError::CaptureFailed(_) | ScanwerkError::PlatformUnavailable => {
            CaptureStatus::CaptureFailed
        }
        _ => CaptureStatus::CorrectionFailed,
    }
}
