//! Tetrahedral simulation mesh topology.
//!
//! Holds the rest positions and the immutable connectivity of the coarse
//! simulation mesh: edges, tetrahedra, and the (reserved) tetrahedron
//! adjacency. Fields are private and every construction path, including
//! deserialization, goes through [`TetMesh::new`], so the solver can index
//! without bounds surprises.

use serde::{Deserialize, Serialize};
use tetrasoft_math::tetra::signed_volume;
use tetrasoft_math::Vec3;
use tetrasoft_types::{SimVertexId, SoftBodyError, SoftBodyResult, TetraId};

/// A tetrahedral mesh with validated topology.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTetMesh")]
pub struct TetMesh {
    positions: Vec<Vec3>,
    edges: Vec<[SimVertexId; 2]>,
    tetrahedra: Vec<[SimVertexId; 4]>,
    /// Per-tetrahedron neighbours across each face. Not used by the solver.
    neighbours: Vec<[Option<TetraId>; 4]>,
    /// Surface face records the asset declared (faces are not stored).
    face_count: usize,
}

/// Unchecked serialized form, validated into a [`TetMesh`].
#[derive(Deserialize)]
struct RawTetMesh {
    positions: Vec<Vec3>,
    edges: Vec<[i64; 2]>,
    tetrahedra: Vec<[i64; 4]>,
    #[serde(default)]
    neighbours: Vec<[Option<i64>; 4]>,
    #[serde(default)]
    face_count: usize,
}

impl TryFrom<RawTetMesh> for TetMesh {
    type Error = SoftBodyError;

    fn try_from(raw: RawTetMesh) -> SoftBodyResult<Self> {
        let neighbours: Vec<[i64; 4]> = raw
            .neighbours
            .iter()
            .map(|record| record.map(|n| n.unwrap_or(-1)))
            .collect();
        let mut mesh = Self::new(raw.positions, &raw.edges, &raw.tetrahedra)?
            .with_neighbours(&neighbours)?;
        mesh.face_count = raw.face_count;
        Ok(mesh)
    }
}

impl TetMesh {
    /// Builds a mesh from raw indices, rejecting out-of-range and
    /// repeated vertex references.
    pub fn new(
        positions: Vec<Vec3>,
        edges: &[[i64; 2]],
        tetrahedra: &[[i64; 4]],
    ) -> SoftBodyResult<Self> {
        let n = positions.len();

        let edges = edges
            .iter()
            .enumerate()
            .map(|(e, &[a, b])| {
                let ids = [SimVertexId::checked(a, n)?, SimVertexId::checked(b, n)?];
                if ids[0] == ids[1] {
                    return Err(SoftBodyError::InvalidMesh(format!(
                        "Edge {e} connects vertex {a} to itself"
                    )));
                }
                Ok(ids)
            })
            .collect::<SoftBodyResult<Vec<_>>>()?;

        let tetrahedra = tetrahedra
            .iter()
            .enumerate()
            .map(|(t, raw)| {
                let mut ids = [SimVertexId(0); 4];
                for (slot, &r) in ids.iter_mut().zip(raw) {
                    *slot = SimVertexId::checked(r, n)?;
                }
                for i in 0..4 {
                    for j in (i + 1)..4 {
                        if ids[i] == ids[j] {
                            return Err(SoftBodyError::InvalidMesh(format!(
                                "Tetrahedron {t} has repeated vertex indices: {raw:?}"
                            )));
                        }
                    }
                }
                Ok(ids)
            })
            .collect::<SoftBodyResult<Vec<_>>>()?;

        Ok(Self {
            positions,
            edges,
            tetrahedra,
            neighbours: Vec::new(),
            face_count: 0,
        })
    }

    /// Assembles a mesh from ids that are in range by construction.
    pub(crate) fn from_parts(
        positions: Vec<Vec3>,
        edges: Vec<[SimVertexId; 2]>,
        tetrahedra: Vec<[SimVertexId; 4]>,
    ) -> Self {
        Self {
            positions,
            edges,
            tetrahedra,
            neighbours: Vec::new(),
            face_count: 0,
        }
    }

    /// Attaches neighbour records. A negative index means "no neighbour".
    pub fn with_neighbours(mut self, records: &[[i64; 4]]) -> SoftBodyResult<Self> {
        let len = self.tetrahedra.len();
        self.neighbours = records
            .iter()
            .map(|raw| {
                let mut out = [None; 4];
                for (slot, &r) in out.iter_mut().zip(raw) {
                    if r >= 0 {
                        *slot = Some(TetraId::checked(r, len)?);
                    }
                }
                Ok(out)
            })
            .collect::<SoftBodyResult<Vec<_>>>()?;
        Ok(self)
    }

    /// Records how many surface faces the source asset declared.
    pub fn with_face_count(mut self, face_count: usize) -> Self {
        self.face_count = face_count;
        self
    }

    /// Rest positions of the simulation vertices.
    #[inline]
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Distance-constraint edges.
    #[inline]
    pub fn edges(&self) -> &[[SimVertexId; 2]] {
        &self.edges
    }

    /// Tetrahedra as four corner ids.
    #[inline]
    pub fn tetrahedra(&self) -> &[[SimVertexId; 4]] {
        &self.tetrahedra
    }

    /// Neighbour records, one per tetrahedron when present.
    #[inline]
    pub fn neighbours(&self) -> &[[Option<TetraId>; 4]] {
        &self.neighbours
    }

    #[inline]
    pub fn face_count(&self) -> usize {
        self.face_count
    }

    /// Returns the number of simulation vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Returns the number of edges.
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns the number of tetrahedra.
    #[inline]
    pub fn tetra_count(&self) -> usize {
        self.tetrahedra.len()
    }

    /// Rest positions of the four corners of tetrahedron `t`.
    #[inline]
    pub fn tetra_corners(&self, t: TetraId) -> [Vec3; 4] {
        self.tetrahedra[t.index()].map(|v| self.positions[v.index()])
    }

    /// Signed rest volume of tetrahedron `t`.
    pub fn rest_volume(&self, t: TetraId) -> f32 {
        let [a, b, c, d] = self.tetra_corners(t);
        signed_volume(a, b, c, d)
    }

    /// Rest length of edge `e`.
    pub fn rest_length(&self, e: usize) -> f32 {
        let [a, b] = self.edges[e];
        self.positions[a.index()].distance(self.positions[b.index()])
    }

    /// Sum of the rest volumes of all tetrahedra.
    pub fn total_volume(&self) -> f32 {
        (0..self.tetra_count())
            .map(|t| self.rest_volume(TetraId(t as u32)))
            .sum()
    }

    /// Axis-aligned bounds of the rest positions as `(min, max)`.
    pub fn bounds(&self) -> (Vec3, Vec3) {
        if self.positions.is_empty() {
            return (Vec3::ZERO, Vec3::ZERO);
        }
        self.positions.iter().fold(
            (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
            |(lo, hi), p| (lo.min(*p), hi.max(*p)),
        )
    }

    /// True when the mesh has nothing to simulate.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() || self.tetrahedra.is_empty()
    }
}
