// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// scanwerk-geometry: the pure geometry behind the capture screen.
//
// Nothing here touches pixels or threads. The stability tracker decides when
// a detected boundary has stopped moving, the projector maps normalized
// detector corners into view or image pixels, the planner computes the
// homography used for the reveal, and the layout places the corrected page.

pub mod layout;
pub mod perspective;
pub mod projector;
pub mod stability;

pub use layout::fit_display_rect;
pub use perspective::{ProjectiveTransform, plan};
pub use projector::{AspectFit, project, project_onto_image, project_with_threshold, select_corners};
pub use stability::{StabilityReading, StabilityTracker, coefficient_of_variation};
