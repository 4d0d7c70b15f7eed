//! Parallel skinning precomputation.
//!
//! Each tetrahedron queries the spatial hash around its centroid and
//! scores the candidate visual vertices by how far outside it they lie.
//! The best `(score, tetrahedron)` per vertex is kept in one `AtomicU64`,
//! packed so that a plain integer `fetch_min` picks the lowest score and,
//! on ties, the lowest tetrahedron id. The outcome is independent of
//! thread scheduling.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use rayon::prelude::*;
use tetrasoft_math::tetra::{bounding_radius, centroid, containment_score, BarycentricBasis};
use tetrasoft_math::Vec3;
use tetrasoft_mesh::TetMesh;
use tetrasoft_solver::SimulationState;
use tetrasoft_spatial::SpatialHashGrid;
use tetrasoft_types::{SoftBodyError, SoftBodyResult, TetraId};
use tracing::{info, warn};

use crate::mapping::{SkinEntry, SkinMapping, SkinStats};

const UNBOUND: u64 = u64::MAX;

/// Query volume and local frame of one non-degenerate tetrahedron.
#[derive(Debug, Clone, Copy)]
struct TetraFrame {
    basis: BarycentricBasis,
    center: Vec3,
    radius: f32,
}

/// Packs a non-negative score and a tetrahedron id into one ordered key.
///
/// Non-negative floats order like their bit patterns, so comparing keys
/// compares scores first, then ids.
#[inline]
fn pack(score: f32, tetra: u32) -> u64 {
    let bits = if score > 0.0 { score.to_bits() } else { 0 };
    (u64::from(bits) << 32) | u64::from(tetra)
}

#[inline]
fn unpack(key: u64) -> (f32, u32) {
    (f32::from_bits((key >> 32) as u32), key as u32)
}

impl SkinMapping {
    /// Binds every point of `visual` to its best-fitting tetrahedron.
    ///
    /// Tetrahedron corners are read from `state.positions`, which must
    /// still match the rest shape of `visual`. `grid` must have been built
    /// over `visual`.
    pub fn precompute(
        state: &SimulationState,
        mesh: &TetMesh,
        visual: &[Vec3],
        grid: &SpatialHashGrid,
    ) -> SoftBodyResult<Self> {
        if grid.point_count() != visual.len() {
            return Err(SoftBodyError::MeshMismatch {
                expected: visual.len(),
                actual: grid.point_count(),
            });
        }
        if state.vertex_count() != mesh.vertex_count() {
            return Err(SoftBodyError::MeshMismatch {
                expected: mesh.vertex_count(),
                actual: state.vertex_count(),
            });
        }

        let positions = &state.positions;
        let slack = grid.cell_size();
        let frames: Vec<Option<TetraFrame>> = mesh
            .tetrahedra()
            .par_iter()
            .map(|tet| {
                let corners = tet.map(|v| positions[v.index()]);
                let basis = BarycentricBasis::new(&corners)?;
                let center = centroid(&corners);
                Some(TetraFrame {
                    basis,
                    center,
                    radius: bounding_radius(&corners, center) + slack,
                })
            })
            .collect();
        let degenerate_tetrahedra = frames.iter().filter(|f| f.is_none()).count();

        if !visual.is_empty() && degenerate_tetrahedra == frames.len() {
            return Err(SoftBodyError::InvalidMesh(format!(
                "Cannot bind {} visual vertices: no usable tetrahedra",
                visual.len()
            )));
        }

        let best: Vec<AtomicU64> = visual.iter().map(|_| AtomicU64::new(UNBOUND)).collect();

        frames.par_iter().enumerate().for_each(|(t, frame)| {
            let Some(frame) = frame else {
                return;
            };
            let t = t as u32;
            // A vertex already inside a lower-id tetrahedron cannot move here.
            let resolved = pack(0.0, t);
            let candidates = grid.query(frame.center, frame.radius);
            candidates.par_iter().for_each(|&i| {
                let slot = &best[i as usize];
                if slot.load(Ordering::Relaxed) < resolved {
                    return;
                }
                let p = visual[i as usize];
                if p.distance(frame.center) > frame.radius {
                    return;
                }
                let score = containment_score(frame.basis.weights(p));
                if score.is_finite() {
                    slot.fetch_min(pack(score, t), Ordering::Relaxed);
                }
            });
        });

        let fallback = AtomicUsize::new(0);
        let entries = best
            .into_par_iter()
            .zip(visual.par_iter())
            .map(|(slot, &p)| {
                let mut key = slot.into_inner();
                if key == UNBOUND {
                    fallback.fetch_add(1, Ordering::Relaxed);
                    key = exhaustive_best(&frames, p);
                }
                let (_, t) = unpack(key);
                let frame = frames.get(t as usize).and_then(Option::as_ref).ok_or_else(|| {
                    SoftBodyError::InvalidMesh(format!("No tetrahedron can bind the visual vertex at {p}"))
                })?;
                Ok(SkinEntry {
                    tetra: TetraId(t),
                    weights: frame.basis.weights3(p),
                })
            })
            .collect::<SoftBodyResult<Vec<_>>>()?;

        let fallback = fallback.into_inner();
        let contained = entries
            .iter()
            .zip(visual)
            .filter(|&(e, &p)| {
                frames[e.tetra.index()]
                    .as_ref()
                    .is_some_and(|f| containment_score(f.basis.weights(p)) == 0.0)
            })
            .count();

        let stats = SkinStats {
            vertices: entries.len(),
            contained,
            fallback,
            degenerate_tetrahedra,
        };
        if fallback > 0 {
            warn!(fallback, "Visual vertices outside every tetrahedron query; bound by exhaustive search");
        }
        if degenerate_tetrahedra > 0 {
            warn!(degenerate_tetrahedra, "Skipped degenerate tetrahedra during skinning");
        }
        info!(
            vertices = stats.vertices,
            contained = stats.contained,
            tetrahedra = mesh.tetra_count(),
            "Skinning precomputed"
        );

        Ok(Self { entries, stats })
    }
}

/// Best key for `p` over every usable tetrahedron.
fn exhaustive_best(frames: &[Option<TetraFrame>], p: Vec3) -> u64 {
    frames
        .iter()
        .enumerate()
        .filter_map(|(t, frame)| {
            let score = containment_score(frame.as_ref()?.basis.weights(p));
            score.is_finite().then(|| pack(score, t as u32))
        })
        .min()
        .unwrap_or(UNBOUND)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_keys_order_by_score_then_id() {
        assert!(pack(0.0, 5) < pack(0.0, 6));
        assert!(pack(0.0, 900) < pack(0.001, 0));
        assert!(pack(0.5, 1) < pack(2.0, 0));
        assert_eq!(pack(-0.0, 3), pack(0.0, 3));
    }

    #[test]
    fn unpack_inverts_pack() {
        assert_eq!(unpack(pack(0.25, 17)), (0.25, 17));
    }
}
