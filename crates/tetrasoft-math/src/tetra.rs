//! Tetrahedron geometry.
//!
//! Corner order is significant: the signed volume is positive when
//! `(p2 - p1) × (p3 - p1)` points towards `p4`.
//!
//! ## Barycentric basis
//!
//! The local affine frame uses the fourth corner as origin:
//!
//! ```text
//! P = [p1 - p4 | p2 - p4 | p3 - p4]
//! b = P⁻¹ · (v - p4)        w = 1 - b.x - b.y - b.z
//! ```

use glam::{Mat3, Vec3, Vec4};
use tetrasoft_types::constants::DEGENERATE_RELATIVE_VOLUME;

/// Signed volume of the tetrahedron `(p1, p2, p3, p4)`.
#[inline]
pub fn signed_volume(p1: Vec3, p2: Vec3, p3: Vec3, p4: Vec3) -> f32 {
    (p2 - p1).cross(p3 - p1).dot(p4 - p1) / 6.0
}

/// Gradients of [`signed_volume`] with respect to each corner.
///
/// The four gradients sum to zero.
#[inline]
pub fn volume_gradients(p1: Vec3, p2: Vec3, p3: Vec3, p4: Vec3) -> [Vec3; 4] {
    const SIXTH: f32 = 1.0 / 6.0;
    [
        (p4 - p2).cross(p3 - p2) * SIXTH,
        (p3 - p1).cross(p4 - p1) * SIXTH,
        (p4 - p1).cross(p2 - p1) * SIXTH,
        (p2 - p1).cross(p3 - p1) * SIXTH,
    ]
}

/// Average of the four corners.
#[inline]
pub fn centroid(corners: &[Vec3; 4]) -> Vec3 {
    (corners[0] + corners[1] + corners[2] + corners[3]) * 0.25
}

/// Largest corner-to-centroid distance.
#[inline]
pub fn bounding_radius(corners: &[Vec3; 4], center: Vec3) -> f32 {
    corners
        .iter()
        .map(|c| c.distance(center))
        .fold(0.0_f32, f32::max)
}

/// Length of the longest of the six edges.
#[inline]
pub fn max_edge_length(corners: &[Vec3; 4]) -> f32 {
    let mut longest = 0.0_f32;
    for i in 0..4 {
        for j in (i + 1)..4 {
            longest = longest.max(corners[i].distance(corners[j]));
        }
    }
    longest
}

/// Inverted edge matrix of a tetrahedron, used to express points
/// in barycentric coordinates.
#[derive(Debug, Clone, Copy)]
pub struct BarycentricBasis {
    inverse: Mat3,
    origin: Vec3,
}

impl BarycentricBasis {
    /// Builds the basis for the given corners.
    ///
    /// Returns `None` when the tetrahedron is flat relative to its own
    /// size: `|det| <= DEGENERATE_RELATIVE_VOLUME · (longest edge)³`.
    /// The test is scale-invariant, so uniformly scaling a mesh never
    /// changes which tetrahedra count as degenerate.
    pub fn new(corners: &[Vec3; 4]) -> Option<Self> {
        let origin = corners[3];
        let edges = Mat3::from_cols(corners[0] - origin, corners[1] - origin, corners[2] - origin);
        let scale = max_edge_length(corners).powi(3);
        if edges.determinant().abs() <= DEGENERATE_RELATIVE_VOLUME * scale {
            return None;
        }
        Some(Self {
            inverse: edges.inverse(),
            origin,
        })
    }

    /// First three barycentric weights of `v`.
    #[inline]
    pub fn weights3(&self, v: Vec3) -> Vec3 {
        self.inverse * (v - self.origin)
    }

    /// All four barycentric weights of `v`. They sum to one.
    #[inline]
    pub fn weights(&self, v: Vec3) -> Vec4 {
        complete_weights(self.weights3(v))
    }
}

/// Extends three barycentric weights with the implied fourth.
#[inline]
pub fn complete_weights(b: Vec3) -> Vec4 {
    Vec4::new(b.x, b.y, b.z, 1.0 - b.x - b.y - b.z)
}

/// How far outside the tetrahedron a point with weights `bary` lies.
///
/// Zero means inside (or on the boundary); positive values grow with
/// distance outside.
#[inline]
pub fn containment_score(bary: Vec4) -> f32 {
    0.0_f32
        .max(-bary.x)
        .max(-bary.y)
        .max(-bary.z)
        .max(-bary.w)
}

/// Point with barycentric weights `b` (first three) in the given tetrahedron.
#[inline]
pub fn interpolate(corners: &[Vec3; 4], b: Vec3) -> Vec3 {
    let w = complete_weights(b);
    corners[0] * w.x + corners[1] * w.y + corners[2] * w.z + corners[3] * w.w
}
