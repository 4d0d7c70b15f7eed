//! Single-constraint XPBD projections.
//!
//! Each function reads corner positions and inverse masses and returns the
//! position corrections to add, or `None` when the constraint is skipped
//! (zero total inverse mass or a degenerate gradient). `alpha` is the
//! compliance already divided by `dt²`.

use tetrasoft_math::tetra::{signed_volume, volume_gradients};
use tetrasoft_math::Vec3;

/// Distance constraint `|p1 - p2| = rest`.
#[inline]
pub fn edge_correction(p: [Vec3; 2], w: [f32; 2], rest: f32, alpha: f32) -> Option<[Vec3; 2]> {
    let w_sum = w[0] + w[1];
    if w_sum == 0.0 {
        return None;
    }
    let delta = p[0] - p[1];
    let len = delta.length();
    if len == 0.0 {
        return None;
    }
    let dir = delta / len;
    let c = len - rest;
    let lambda = -c / (w_sum + alpha);
    Some([dir * (lambda * w[0]), dir * (-lambda * w[1])])
}

/// Volume constraint `V(p1, p2, p3, p4) = rest`.
#[inline]
pub fn volume_correction(p: [Vec3; 4], w: [f32; 4], rest: f32, alpha: f32) -> Option<[Vec3; 4]> {
    let grads = volume_gradients(p[0], p[1], p[2], p[3]);
    let w_sum: f32 = grads
        .iter()
        .zip(w)
        .map(|(g, wi)| wi * g.length_squared())
        .sum();
    if w_sum == 0.0 {
        return None;
    }
    let c = signed_volume(p[0], p[1], p[2], p[3]) - rest;
    let lambda = -c / (w_sum + alpha);
    Some([0, 1, 2, 3].map(|i| grads[i] * (lambda * w[i])))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stretched_edge_is_pulled_back() {
        let p = [Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0)];
        let [d0, d1] = edge_correction(p, [1.0, 1.0], 1.0, 0.0).unwrap();
        assert!(((p[0] + d0).distance(p[1] + d1) - 1.0).abs() < 1e-6);
        assert!((d0 + d1).length() < 1e-6);
    }

    #[test]
    fn pinned_edge_is_skipped() {
        let p = [Vec3::ZERO, Vec3::X];
        assert!(edge_correction(p, [0.0, 0.0], 2.0, 0.0).is_none());
    }

    #[test]
    fn coincident_endpoints_are_skipped() {
        assert!(edge_correction([Vec3::ONE; 2], [1.0, 1.0], 1.0, 0.0).is_none());
    }

    #[test]
    fn compliance_softens_edge() {
        let p = [Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0)];
        let [stiff, _] = edge_correction(p, [1.0, 1.0], 1.0, 0.0).unwrap();
        let [soft, _] = edge_correction(p, [1.0, 1.0], 1.0, 10.0).unwrap();
        assert!(soft.length() < stiff.length());
    }

    #[test]
    fn fully_pinned_tetra_is_skipped() {
        let p = [Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::Z];
        assert!(volume_correction(p, [0.0; 4], 1.0, 0.0).is_none());
    }

    #[test]
    fn single_free_corner_restores_volume_exactly() {
        let mut p = [Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::new(0.1, 0.1, 1.3)];
        let d = volume_correction(p, [0.0, 0.0, 0.0, 1.0], 1.0 / 6.0, 0.0).unwrap();
        for i in 0..4 {
            p[i] += d[i];
        }
        assert!((signed_volume(p[0], p[1], p[2], p[3]) - 1.0 / 6.0).abs() < 1e-6);
        assert_eq!(p[0], Vec3::ZERO);
    }
}
