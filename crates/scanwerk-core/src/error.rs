// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Scanwerk.

use thiserror::Error;

/// Failures of the pure geometry stages (projection, planning, layout).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    /// Zero-area rectangle, collinear corners, or a singular system.
    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("non-finite coordinate in geometry input")]
    NonFinite,
}

/// Top-level error type for all Scanwerk operations.
#[derive(Debug, Error)]
pub enum ScanwerkError {
    // -- Capture cycle --
    #[error("no document found")]
    NoDocumentFound,

    #[error("still capture failed: {0}")]
    CaptureFailed(String),

    #[error("perspective warp failed: {0}")]
    WarpFailed(String),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error("capture session closed")]
    SessionClosed,

    // -- Configuration / persistence --
    #[error("invalid capture configuration: {0}")]
    InvalidConfig(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // -- Platform bridge --
    #[error("feature not available on this platform")]
    PlatformUnavailable,
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ScanwerkError>;
