//! Simulation state: per-vertex dynamic buffers plus rest measurements.
//!
//! Topology lives in [`TetMesh`] and never changes; this is the data the
//! solver mutates every substep.

use rayon::prelude::*;
use tetrasoft_math::tetra::signed_volume;
use tetrasoft_math::Vec3;
use tetrasoft_mesh::TetMesh;
use tetrasoft_types::{SimVertexId, SoftBodyError, SoftBodyResult, TetraId};

/// Per-vertex simulation buffers.
///
/// All per-vertex arrays have length `vertex_count()`. Rest lengths are
/// indexed like `TetMesh::edges`, rest volumes like `TetMesh::tetrahedra`.
#[derive(Debug, Clone)]
pub struct SimulationState {
    // ─── Per-vertex ───
    pub positions: Vec<Vec3>,
    pub velocities: Vec<Vec3>,
    /// Position at the start of the current substep.
    pub prev_positions: Vec<Vec3>,
    /// Inverse mass; 0 means pinned.
    pub inv_mass: Vec<f32>,

    // ─── Per-constraint rest measurements ───
    pub rest_lengths: Vec<f32>,
    pub rest_volumes: Vec<f32>,
}

impl SimulationState {
    /// Initializes physics from a mesh's rest shape.
    ///
    /// Velocities start at zero. Each tetrahedron with positive rest volume
    /// contributes `1 / (volume / 4)` to the inverse mass of its four corners;
    /// vertices touched by no such tetrahedron stay pinned.
    pub fn from_tet_mesh(mesh: &TetMesh) -> Self {
        let n = mesh.vertex_count();

        let rest_lengths = (0..mesh.edge_count()).map(|e| mesh.rest_length(e)).collect();
        let rest_volumes: Vec<f32> = (0..mesh.tetra_count())
            .map(|t| mesh.rest_volume(TetraId(t as u32)))
            .collect();

        let mut inv_mass = vec![0.0_f32; n];
        for (tet, &volume) in mesh.tetrahedra().iter().zip(&rest_volumes) {
            if volume > 0.0 {
                let w = 1.0 / (volume / 4.0);
                for v in tet {
                    inv_mass[v.index()] += w;
                }
            }
        }

        Self {
            positions: mesh.positions().to_vec(),
            velocities: vec![Vec3::ZERO; n],
            prev_positions: mesh.positions().to_vec(),
            inv_mass,
            rest_lengths,
            rest_volumes,
        }
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of vertices free to move.
    pub fn free_count(&self) -> usize {
        self.inv_mass.iter().filter(|&&w| w > 0.0).count()
    }

    /// Pins a vertex in place (inverse mass 0).
    pub fn pin(&mut self, v: SimVertexId) -> SoftBodyResult<()> {
        let len = self.vertex_count();
        let w = self
            .inv_mass
            .get_mut(v.index())
            .ok_or(SoftBodyError::IndexOutOfRange {
                kind: "vertex",
                index: i64::from(v.0),
                len,
            })?;
        *w = 0.0;
        self.velocities[v.index()] = Vec3::ZERO;
        Ok(())
    }

    /// Pins every vertex whose current position satisfies `predicate`.
    /// Returns how many vertices were newly pinned.
    pub fn pin_where(&mut self, predicate: impl Fn(Vec3) -> bool) -> usize {
        let mut pinned = 0;
        for ((p, w), v) in self
            .positions
            .iter()
            .zip(self.inv_mass.iter_mut())
            .zip(self.velocities.iter_mut())
        {
            if predicate(*p) {
                if *w > 0.0 {
                    pinned += 1;
                }
                *w = 0.0;
                *v = Vec3::ZERO;
            }
        }
        pinned
    }

    /// Current signed volume of tetrahedron `t`.
    pub fn volume(&self, mesh: &TetMesh, t: TetraId) -> f32 {
        let [a, b, c, d] = mesh.tetrahedra()[t.index()].map(|v| self.positions[v.index()]);
        signed_volume(a, b, c, d)
    }

    /// Largest `|volume - rest volume|` over all tetrahedra.
    pub fn max_volume_error(&self, mesh: &TetMesh) -> f32 {
        (0..mesh.tetra_count())
            .into_par_iter()
            .map(|t| (self.volume(mesh, TetraId(t as u32)) - self.rest_volumes[t]).abs())
            .reduce(|| 0.0, f32::max)
    }

    /// Largest `|length - rest length|` over all edges.
    pub fn max_length_error(&self, mesh: &TetMesh) -> f32 {
        mesh.edges()
            .par_iter()
            .zip(self.rest_lengths.par_iter())
            .map(|([a, b], &rest)| {
                (self.positions[a.index()].distance(self.positions[b.index()]) - rest).abs()
            })
            .reduce(|| 0.0, f32::max)
    }

    /// Kinetic energy `0.5 * Σ m |v|²` over free vertices.
    pub fn kinetic_energy(&self) -> f64 {
        self.velocities
            .iter()
            .zip(&self.inv_mass)
            .filter(|(_, &w)| w > 0.0)
            .map(|(v, &w)| 0.5 * f64::from(v.length_squared()) / f64::from(w))
            .sum()
    }
}
