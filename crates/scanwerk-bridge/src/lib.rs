// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// scanwerk-bridge: collaborator traits and platform dispatch.
//
// Native camera and detector implementations are registered by the host
// application; on desktop and CI the stub bridge stands in for them.

pub mod stub;
pub mod traits;

pub use traits::{DocumentDetector, PlatformBridge, StillCamera, WarpRenderer};

/// The bridge for the current platform.
pub fn platform_bridge() -> Box<dyn PlatformBridge + Send + Sync> {
    Box::new(stub::StubBridge)
}
