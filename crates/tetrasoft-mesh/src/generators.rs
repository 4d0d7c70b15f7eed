//! Procedural mesh generators for tests and demos.
//!
//! These generators produce deterministic tetrahedral meshes with
//! positively oriented tetrahedra, plus matching visual point sets.

use std::collections::BTreeSet;

use tetrasoft_math::tetra::signed_volume;
use tetrasoft_math::Vec3;
use tetrasoft_types::SimVertexId;

use crate::tet_mesh::TetMesh;
use crate::visual::StaticMesh;

/// Cube corner offsets, indexed by `i + 2j + 4k`.
const CUBE_CORNERS: [[usize; 3]; 8] = [
    [0, 0, 0],
    [1, 0, 0],
    [0, 1, 0],
    [1, 1, 0],
    [0, 0, 1],
    [1, 0, 1],
    [0, 1, 1],
    [1, 1, 1],
];

/// Five-tetrahedron split of a cube. The second variant is the mirror
/// image, alternated between neighbouring cells so shared faces match.
const CUBE_SPLITS: [[[usize; 4]; 5]; 2] = [
    [
        [1, 2, 4, 7],
        [0, 1, 2, 4],
        [3, 1, 2, 7],
        [5, 1, 4, 7],
        [6, 2, 4, 7],
    ],
    [
        [0, 3, 5, 6],
        [1, 0, 3, 5],
        [2, 0, 3, 6],
        [4, 0, 5, 6],
        [7, 3, 5, 6],
    ],
];

/// The unit corner tetrahedron `(0,0,0), (1,0,0), (0,1,0), (0,0,1)`
/// with all six edges. Rest volume is 1/6.
pub fn single_tetra() -> TetMesh {
    let tetrahedra = [[0, 1, 2, 3]];
    build(
        vec![Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::Z],
        unique_edges(&tetrahedra),
        &tetrahedra,
    )
}

/// A box of `nx × ny × nz` cubes, each split into five tetrahedra.
///
/// The box spans `[0, n * cell]` on every axis, offset by `origin`.
pub fn tetra_box(nx: usize, ny: usize, nz: usize, cell: f32, origin: Vec3) -> TetMesh {
    let (vx, vy) = (nx + 1, ny + 1);
    let vertex = |i: usize, j: usize, k: usize| (i + vx * (j + vy * k)) as u32;

    let mut positions = Vec::with_capacity(vx * vy * (nz + 1));
    for k in 0..=nz {
        for j in 0..=ny {
            for i in 0..=nx {
                positions.push(origin + Vec3::new(i as f32, j as f32, k as f32) * cell);
            }
        }
    }

    let mut tetrahedra = Vec::with_capacity(nx * ny * nz * 5);
    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                let corner = |c: usize| {
                    let [di, dj, dk] = CUBE_CORNERS[c];
                    vertex(i + di, j + dj, k + dk)
                };
                for split in &CUBE_SPLITS[(i + j + k) % 2] {
                    let mut tet = split.map(corner);
                    let p = tet.map(|v| positions[v as usize]);
                    if signed_volume(p[0], p[1], p[2], p[3]) < 0.0 {
                        tet.swap(0, 1);
                    }
                    tetrahedra.push(tet);
                }
            }
        }
    }

    let edges = unique_edges(&tetrahedra);
    build(positions, edges, &tetrahedra)
}

/// Assembles a mesh from generator output, whose indices are in range by construction.
fn build(positions: Vec<Vec3>, edges: BTreeSet<[u32; 2]>, tetrahedra: &[[u32; 4]]) -> TetMesh {
    TetMesh::from_parts(
        positions,
        edges.into_iter().map(|e| e.map(SimVertexId)).collect(),
        tetrahedra.iter().map(|t| t.map(SimVertexId)).collect(),
    )
}

fn unique_edges(tetrahedra: &[[u32; 4]]) -> BTreeSet<[u32; 2]> {
    let mut edges = BTreeSet::new();
    for tet in tetrahedra {
        for a in 0..4 {
            for b in (a + 1)..4 {
                let (lo, hi) = (tet[a].min(tet[b]), tet[a].max(tet[b]));
                edges.insert([lo, hi]);
            }
        }
    }
    edges
}

/// A regular grid of `n³` points (`n ≥ 2`) filling `[min, max]`, as a visual mesh
/// without triangles.
pub fn point_grid(name: &str, min: Vec3, max: Vec3, n: usize) -> StaticMesh {
    let steps = n.max(2) - 1;
    let span = (max - min) / steps as f32;
    let mut positions = Vec::with_capacity(n * n * n);
    for k in 0..=steps {
        for j in 0..=steps {
            for i in 0..=steps {
                positions.push(min + Vec3::new(i as f32, j as f32, k as f32) * span);
            }
        }
    }
    StaticMesh {
        name: name.to_string(),
        positions,
        indices: Vec::new(),
    }
}
