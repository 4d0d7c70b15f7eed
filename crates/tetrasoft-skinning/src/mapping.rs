//! Skin mapping storage and per-frame reconstruction.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tetrasoft_math::tetra::{complete_weights, interpolate};
use tetrasoft_math::{Vec3, Vec4};
use tetrasoft_mesh::TetMesh;
use tetrasoft_solver::SimulationState;
use tetrasoft_types::{SoftBodyError, SoftBodyResult, TetraId, VisualVertexId};

/// Binding of one visual vertex.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkinEntry {
    /// Owning tetrahedron.
    pub tetra: TetraId,
    /// First three barycentric weights; the fourth is `1 - x - y - z`.
    pub weights: Vec3,
}

impl SkinEntry {
    /// All four weights.
    #[inline]
    pub fn weights4(&self) -> Vec4 {
        complete_weights(self.weights)
    }
}

/// Counters from a precomputation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkinStats {
    /// Visual vertices bound.
    pub vertices: usize,
    /// Vertices that lie inside (or on) their tetrahedron.
    pub contained: usize,
    /// Vertices no tetrahedron query reached, bound by exhaustive search.
    pub fallback: usize,
    /// Tetrahedra skipped because their basis is singular.
    pub degenerate_tetrahedra: usize,
}

/// One entry per visual vertex, in visual-buffer order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkinMapping {
    pub(crate) entries: Vec<SkinEntry>,
    pub(crate) stats: SkinStats,
}

impl SkinMapping {
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[SkinEntry] {
        &self.entries
    }

    pub fn entry(&self, v: VisualVertexId) -> Option<&SkinEntry> {
        self.entries.get(v.index())
    }

    pub fn stats(&self) -> SkinStats {
        self.stats
    }

    /// Writes every visual vertex as the barycentric combination of its
    /// tetrahedron's current corner positions.
    ///
    /// Fails without writing when the buffers disagree in length or an
    /// entry names a tetrahedron `mesh` does not have.
    pub fn apply(
        &self,
        state: &SimulationState,
        mesh: &TetMesh,
        visual: &mut [Vec3],
    ) -> SoftBodyResult<()> {
        if visual.len() != self.entries.len() {
            return Err(SoftBodyError::MeshMismatch {
                expected: self.entries.len(),
                actual: visual.len(),
            });
        }
        if state.vertex_count() != mesh.vertex_count() {
            return Err(SoftBodyError::MeshMismatch {
                expected: mesh.vertex_count(),
                actual: state.vertex_count(),
            });
        }
        let tetrahedra = mesh.tetrahedra();
        for entry in &self.entries {
            TetraId::checked(i64::from(entry.tetra.0), tetrahedra.len())?;
        }

        let positions = &state.positions;
        visual
            .par_iter_mut()
            .zip(self.entries.par_iter())
            .for_each(|(out, entry)| {
                let corners = tetrahedra[entry.tetra.index()].map(|v| positions[v.index()]);
                *out = interpolate(&corners, entry.weights);
            });
        Ok(())
    }
}
