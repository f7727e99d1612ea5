// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Where the corrected page is shown on screen after a capture.

use scanwerk_core::{GeometryError, Rect, Size};

/// Share of the viewport the corrected image may use on each axis.
pub const DEFAULT_FILL_FRACTION: f64 = 0.8;
/// Vertical space kept free for the controls under the preview.
pub const DEFAULT_RESERVED_HEIGHT: f64 = 200.0;

/// Aspect-fit `content` into a box of `bounds.width * fill` by
/// `min(bounds.height * fill, bounds.height - reserved)` and centre it in
/// `bounds`. The result is in the same coordinate space as `bounds`.
pub fn fit_display_rect(
    content: Size,
    bounds: Rect,
    fill_fraction: f64,
    reserved_height: f64,
) -> Result<Rect, GeometryError> {
    if !content.is_drawable() {
        return Err(GeometryError::Degenerate(format!(
            "content size {}x{} is not drawable",
            content.width, content.height
        )));
    }

    let max_width = bounds.width * fill_fraction;
    let max_height = (bounds.height * fill_fraction).min(bounds.height - reserved_height);
    if !Size::new(max_width, max_height).is_drawable() {
        return Err(GeometryError::Degenerate(format!(
            "no room to display the page in {}x{}",
            bounds.width, bounds.height
        )));
    }

    let (width, height) = if content.width / max_width > content.height / max_height {
        (max_width, content.height * max_width / content.width)
    } else {
        (content.width * max_height / content.height, max_height)
    };

    Ok(Rect::new(
        bounds.x + (bounds.width - width) / 2.0,
        bounds.y + (bounds.height - height) / 2.0,
        width,
        height,
    ))
}
