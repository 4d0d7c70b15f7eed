//! Integration tests for tetrasoft-skinning.

use tetrasoft_math::Vec3;
use tetrasoft_mesh::generators::{point_grid, single_tetra, tetra_box};
use tetrasoft_mesh::TetMesh;
use tetrasoft_skinning::SkinMapping;
use tetrasoft_solver::SimulationState;
use tetrasoft_spatial::SpatialHashGrid;
use tetrasoft_types::{SoftBodyError, TetraId, VisualVertexId};

struct Fixture {
    mesh: TetMesh,
    state: SimulationState,
    visual: Vec<Vec3>,
    grid: SpatialHashGrid,
}

fn fixture(visual: Vec<Vec3>, cell: f32) -> Fixture {
    let mesh = tetra_box(3, 3, 3, 1.0 / 3.0, Vec3::ZERO);
    let state = SimulationState::from_tet_mesh(&mesh);
    let grid = SpatialHashGrid::from_points(cell, &visual).unwrap();
    Fixture { mesh, state, visual, grid }
}

fn interior_points() -> Vec<Vec3> {
    point_grid("visual", Vec3::splat(0.05), Vec3::splat(0.95), 7).positions
}

fn bind(f: &Fixture) -> SkinMapping {
    SkinMapping::precompute(&f.state, &f.mesh, &f.visual, &f.grid).unwrap()
}

// ─── Precomputation ───────────────────────────────────────────

#[test]
fn every_vertex_is_bound_with_unit_weights() {
    let f = fixture(interior_points(), 0.1);
    let mapping = bind(&f);
    assert_eq!(mapping.len(), f.visual.len());
    for entry in mapping.entries() {
        assert!(entry.tetra.index() < f.mesh.tetra_count());
        let w = entry.weights4();
        assert!((w.x + w.y + w.z + w.w - 1.0).abs() < 1e-5);
    }
}

#[test]
fn interior_points_are_contained() {
    let f = fixture(interior_points(), 0.1);
    let mapping = bind(&f);
    let stats = mapping.stats();
    assert_eq!(stats.vertices, f.visual.len());
    assert_eq!(stats.contained, f.visual.len());
    assert_eq!(stats.fallback, 0);
    assert_eq!(stats.degenerate_tetrahedra, 0);
    for entry in mapping.entries() {
        let w = entry.weights4();
        assert!(w.min_element() > -1e-5, "weights {w} not inside");
    }
}

#[test]
fn precompute_is_deterministic() {
    let f = fixture(interior_points(), 0.07);
    let first = bind(&f);
    let second = bind(&f);
    assert_eq!(first.entries(), second.entries());
}

#[test]
fn cell_size_does_not_change_binding_of_interior_points() {
    let coarse = bind(&fixture(interior_points(), 0.5));
    let fine = bind(&fixture(interior_points(), 0.05));
    for (a, b) in coarse.entries().iter().zip(fine.entries()) {
        assert_eq!(a.tetra, b.tetra);
    }
}

#[test]
fn ties_resolve_to_lowest_tetra() {
    let positions = vec![Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::Z, Vec3::ONE];
    let visual = vec![Vec3::Z];
    for tets in [[[0, 1, 2, 3], [1, 2, 4, 3]], [[1, 2, 4, 3], [0, 1, 2, 3]]] {
        let mesh = TetMesh::new(positions.clone(), &[], &tets).unwrap();
        let state = SimulationState::from_tet_mesh(&mesh);
        let grid = SpatialHashGrid::from_points(0.5, &visual).unwrap();
        let mapping = SkinMapping::precompute(&state, &mesh, &visual, &grid).unwrap();
        let entry = mapping.entry(VisualVertexId(0)).unwrap();
        assert_eq!(entry.tetra, TetraId(0));
        assert_eq!(entry.weights, Vec3::ZERO);
    }
}

#[test]
fn distant_vertex_falls_back_to_exhaustive_search() {
    let mut visual = interior_points();
    visual.push(Vec3::new(5.0, 0.5, 0.5));
    let f = fixture(visual, 0.1);
    let mapping = bind(&f);
    assert_eq!(mapping.stats().fallback, 1);
    assert_eq!(mapping.len(), f.visual.len());
    assert_eq!(mapping.stats().contained, f.visual.len() - 1);
}

#[test]
fn degenerate_tetrahedra_are_skipped() {
    let positions = vec![
        Vec3::ZERO,
        Vec3::X,
        Vec3::Y,
        Vec3::Z,
        Vec3::new(0.5, 0.5, 0.0),
    ];
    // The second tetrahedron lies flat in the z = 0 plane.
    let mesh = TetMesh::new(positions, &[], &[[0, 1, 2, 3], [0, 1, 4, 2]]).unwrap();
    let state = SimulationState::from_tet_mesh(&mesh);
    let visual = vec![Vec3::splat(0.1)];
    let grid = SpatialHashGrid::from_points(0.25, &visual).unwrap();
    let mapping = SkinMapping::precompute(&state, &mesh, &visual, &grid).unwrap();
    assert_eq!(mapping.stats().degenerate_tetrahedra, 1);
    assert_eq!(mapping.entries()[0].tetra, TetraId(0));
}

#[test]
fn sub_millimetre_mesh_has_no_degenerate_tetrahedra() {
    let mesh = tetra_box(2, 2, 2, 5e-5, Vec3::ZERO);
    let state = SimulationState::from_tet_mesh(&mesh);
    let visual = point_grid("visual", Vec3::splat(1e-5), Vec3::splat(9e-5), 3).positions;
    let grid = SpatialHashGrid::from_points(2e-5, &visual).unwrap();
    let mapping = SkinMapping::precompute(&state, &mesh, &visual, &grid).unwrap();
    assert_eq!(mapping.stats().degenerate_tetrahedra, 0);

    let mut out = vec![Vec3::ZERO; visual.len()];
    mapping.apply(&state, &mesh, &mut out).unwrap();
    for (a, b) in out.iter().zip(&visual) {
        assert!(a.distance(*b) < 1e-8);
    }
}

#[test]
fn all_degenerate_is_an_error() {
    let positions = vec![Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::new(1.0, 1.0, 0.0)];
    let mesh = TetMesh::new(positions, &[], &[[0, 1, 2, 3]]).unwrap();
    let state = SimulationState::from_tet_mesh(&mesh);
    let visual = vec![Vec3::ZERO];
    let grid = SpatialHashGrid::from_points(0.25, &visual).unwrap();
    let err = SkinMapping::precompute(&state, &mesh, &visual, &grid).unwrap_err();
    assert!(matches!(err, SoftBodyError::InvalidMesh(_)));
}

#[test]
fn grid_over_other_points_is_rejected() {
    let f = fixture(interior_points(), 0.1);
    let other = SpatialHashGrid::from_points(0.1, &[Vec3::ZERO]).unwrap();
    let err = SkinMapping::precompute(&f.state, &f.mesh, &f.visual, &other).unwrap_err();
    assert!(matches!(err, SoftBodyError::MeshMismatch { .. }));
}

#[test]
fn empty_visual_mesh_binds_nothing() {
    let mesh = single_tetra();
    let state = SimulationState::from_tet_mesh(&mesh);
    let grid = SpatialHashGrid::from_points(0.1, &[]).unwrap();
    let mapping = SkinMapping::precompute(&state, &mesh, &[], &grid).unwrap();
    assert!(mapping.is_empty());
}

// ─── Reconstruction ───────────────────────────────────────────

#[test]
fn apply_at_rest_reproduces_visual() {
    let f = fixture(interior_points(), 0.1);
    let mapping = bind(&f);
    let mut out = vec![Vec3::ZERO; f.visual.len()];
    mapping.apply(&f.state, &f.mesh, &mut out).unwrap();
    for (a, b) in out.iter().zip(&f.visual) {
        assert!(a.distance(*b) < 1e-5);
    }
}

#[test]
fn apply_follows_translation() {
    let mut f = fixture(interior_points(), 0.1);
    let mapping = bind(&f);
    let offset = Vec3::new(0.5, -2.0, 1.0);
    for p in &mut f.state.positions {
        *p += offset;
    }
    let mut out = f.visual.clone();
    mapping.apply(&f.state, &f.mesh, &mut out).unwrap();
    for (a, b) in out.iter().zip(&f.visual) {
        assert!(a.distance(*b + offset) < 1e-4);
    }
}

#[test]
fn apply_rejects_resized_buffer() {
    let f = fixture(interior_points(), 0.1);
    let mapping = bind(&f);
    let mut out = vec![Vec3::ZERO; f.visual.len() + 1];
    let err = mapping.apply(&f.state, &f.mesh, &mut out).unwrap_err();
    assert!(matches!(
        err,
        SoftBodyError::MeshMismatch { expected, actual } if expected == f.visual.len() && actual == expected + 1
    ));
}

#[test]
fn mapping_serializes() {
    let f = fixture(interior_points(), 0.1);
    let mapping = bind(&f);
    let json = serde_json::to_string(&mapping).unwrap();
    let back: SkinMapping = serde_json::from_str(&json).unwrap();
    assert_eq!(back, mapping);
}

#[test]
fn deserialized_mapping_with_unknown_tetra_fails_apply() {
    let f = fixture(interior_points(), 0.1);
    let mut json = serde_json::to_value(bind(&f)).unwrap();
    json["entries"][0]["tetra"] = serde_json::json!(99_999);
    let mapping: SkinMapping = serde_json::from_value(json).unwrap();

    let mut out = vec![Vec3::ZERO; f.visual.len()];
    let err = mapping.apply(&f.state, &f.mesh, &mut out).unwrap_err();
    assert!(matches!(
        err,
        SoftBodyError::IndexOutOfRange { kind: "tetrahedron", index: 99_999, len } if len == f.mesh.tetra_count()
    ));
    assert!(out.iter().all(|p| *p == Vec3::ZERO));
}

#[test]
fn apply_rejects_state_from_other_mesh() {
    let f = fixture(interior_points(), 0.1);
    let mapping = bind(&f);
    let small = SimulationState::from_tet_mesh(&single_tetra());
    let mut out = vec![Vec3::ZERO; f.visual.len()];
    let err = mapping.apply(&small, &f.mesh, &mut out).unwrap_err();
    assert!(matches!(
        err,
        SoftBodyError::MeshMismatch { expected, actual: 4 } if expected == f.mesh.vertex_count()
    ));
}
