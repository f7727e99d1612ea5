// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Perspective planning: the projective transform that makes a displayed,
// already-corrected image appear to sit on the quad where the document was
// detected. The reveal animation then relaxes it back to identity.

use nalgebra::{Matrix3, SMatrix, SVector, Vector3};
use scanwerk_core::{GeometryError, Point2D, Quad, Rect};
use tracing::{debug, instrument};

/// Below this a length, area, or homogeneous weight counts as zero.
const EPS: f64 = 1e-9;

/// A plane-to-plane projective transform, stored with `h22 == 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectiveTransform {
    h: Matrix3<f64>,
}

impl Default for ProjectiveTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl ProjectiveTransform {
    pub fn identity() -> Self {
        Self {
            h: Matrix3::identity(),
        }
    }

    /// Wrap a homography, rescaling so the bottom-right entry is one.
    ///
    /// Returns `None` when that entry is zero or anything is non-finite.
    pub fn from_matrix(h: Matrix3<f64>) -> Option<Self> {
        let s = h[(2, 2)];
        if s.abs() < EPS || h.iter().any(|v| !v.is_finite()) {
            return None;
        }
        Some(Self { h: h / s })
    }

    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.h
    }

    /// Row-major 3x3 homography acting on column vectors `(x, y, 1)`.
    pub fn homography(&self) -> [[f64; 3]; 3] {
        [
            [self.h[(0, 0)], self.h[(0, 1)], self.h[(0, 2)]],
            [self.h[(1, 0)], self.h[(1, 1)], self.h[(1, 2)]],
            [self.h[(2, 0)], self.h[(2, 1)], self.h[(2, 2)]],
        ]
    }

    /// Map a point. `None` when it lands on the line at infinity.
    pub fn apply(&self, p: Point2D) -> Option<Point2D> {
        let v = self.h * Vector3::new(p.x, p.y, 1.0);
        let w = v[2];
        if w.abs() < EPS {
            return None;
        }
        Some(Point2D::new(v[0] / w, v[1] / w))
    }

    pub fn inverse(&self) -> Option<Self> {
        self.h.try_inverse().and_then(Self::from_matrix)
    }

    pub fn is_identity(&self, tolerance: f64) -> bool {
        (self.h - Matrix3::identity()).amax() <= tolerance
    }

    /// Element-wise interpolation towards identity: `t = 0` is `self`,
    /// `t = 1` is identity. `t` is clamped to `[0, 1]`.
    pub fn blend_to_identity(&self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self {
            h: self.h * (1.0 - t) + Matrix3::identity() * t,
        }
    }

    /// The same transform as a 4x4 matrix for layer renderers that multiply
    /// row vectors `(x, y, z, w)` from the left. z passes through untouched.
    pub fn to_layer_transform(&self) -> [[f64; 4]; 4] {
        let h = &self.h;
        [
            [h[(0, 0)], h[(1, 0)], 0.0, h[(2, 0)]],
            [h[(0, 1)], h[(1, 1)], 0.0, h[(2, 1)]],
            [0.0, 0.0, 1.0, 0.0],
            [h[(0, 2)], h[(1, 2)], 0.0, h[(2, 2)]],
        ]
    }
}

/// Transform taking the corners of `source` onto `destination`, corner for
/// corner (TL→TL, TR→TR, BL→BL, BR→BR).
///
/// Both are expressed in the same coordinate space; callers plan against a
/// display-local rectangle and a destination translated into it.
#[instrument(level = "debug", skip_all, err)]
pub fn plan(source: Rect, destination: &Quad) -> Result<ProjectiveTransform, GeometryError> {
    if !(source.x.is_finite()
        && source.y.is_finite()
        && source.width.is_finite()
        && source.height.is_finite())
        || !destination.is_finite()
    {
        return Err(GeometryError::Degenerate("non-finite coordinate".into()));
    }
    if source.width <= EPS || source.height <= EPS {
        return Err(GeometryError::Degenerate(format!(
            "source rectangle {}x{} has no area",
            source.width, source.height
        )));
    }
    if has_collinear_triple(destination) {
        return Err(GeometryError::Degenerate(
            "three destination corners are collinear".into(),
        ));
    }

    let src = source.corner_quad().corners();
    let dst = destination.corners();
    let (src_n, t_src) = normalize4(&src);
    let (dst_n, t_dst) = normalize4(&dst);

    // Unknowns h00..h21 with h22 = 1. Per correspondence (x, y) -> (u, v):
    //   h00 x + h01 y + h02 - u h20 x - u h21 y = u
    //   h10 x + h11 y + h12 - v h20 x - v h21 y = v
    let mut a = SMatrix::<f64, 8, 8>::zeros();
    let mut b = SVector::<f64, 8>::zeros();
    for k in 0..4 {
        let (x, y) = (src_n[k].x, src_n[k].y);
        let (u, v) = (dst_n[k].x, dst_n[k].y);

        let r0 = 2 * k;
        a[(r0, 0)] = x;
        a[(r0, 1)] = y;
        a[(r0, 2)] = 1.0;
        a[(r0, 6)] = -u * x;
        a[(r0, 7)] = -u * y;
        b[r0] = u;

        let r1 = 2 * k + 1;
        a[(r1, 3)] = x;
        a[(r1, 4)] = y;
        a[(r1, 5)] = 1.0;
        a[(r1, 6)] = -v * x;
        a[(r1, 7)] = -v * y;
        b[r1] = v;
    }

    let x = a
        .lu()
        .solve(&b)
        .ok_or_else(|| GeometryError::Degenerate("singular correspondence system".into()))?;

    let hn = Matrix3::new(
        x[0], x[1], x[2], //
        x[3], x[4], x[5], //
        x[6], x[7], 1.0,
    );
    let t_dst_inv = t_dst
        .try_inverse()
        .ok_or_else(|| GeometryError::Degenerate("destination normalisation".into()))?;
    let transform = ProjectiveTransform::from_matrix(t_dst_inv * hn * t_src)
        .ok_or_else(|| GeometryError::Degenerate("transform has no finite scale".into()))?;

    debug!(
        width = source.width,
        height = source.height,
        "perspective planned"
    );
    Ok(transform)
}

fn has_collinear_triple(q: &Quad) -> bool {
    let pts = q.corners();
    let scale = pts
        .iter()
        .flat_map(|a| pts.iter().map(move |b| a.distance_to(*b)))
        .fold(0.0_f64, f64::max);
    if scale <= EPS {
        return true;
    }
    let tolerance = EPS * scale * scale;
    const TRIPLES: [[usize; 3]; 4] = [[0, 1, 2], [0, 1, 3], [0, 2, 3], [1, 2, 3]];
    TRIPLES.iter().any(|&[i, j, k]| {
        let (a, b, c) = (pts[i], pts[j], pts[k]);
        let cross = (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x);
        cross.abs() <= tolerance
    })
}

/// Translate to the centroid and scale to a mean distance of sqrt(2).
fn normalize4(pts: &[Point2D; 4]) -> ([Point2D; 4], Matrix3<f64>) {
    let cx = pts.iter().map(|p| p.x).sum::<f64>() / 4.0;
    let cy = pts.iter().map(|p| p.y).sum::<f64>() / 4.0;
    let mean_dist = pts
        .iter()
        .map(|p| (p.x - cx).hypot(p.y - cy))
        .sum::<f64>()
        / 4.0;
    let s = if mean_dist > EPS {
        std::f64::consts::SQRT_2 / mean_dist
    } else {
        1.0
    };
    let t = Matrix3::new(s, 0.0, -s * cx, 0.0, s, -s * cy, 0.0, 0.0, 1.0);
    let out = (*pts).map(|p| Point2D::new(s * (p.x - cx), s * (p.y - cy)));
    (out, t)
}
