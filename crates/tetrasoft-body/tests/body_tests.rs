//! Integration tests for tetrasoft-body.

use std::path::Path;

use tetrasoft_body::{tetra_path, SoftBody};
use tetrasoft_math::Vec3;
use tetrasoft_mesh::generators::{point_grid, single_tetra, tetra_box};
use tetrasoft_mesh::{save_tetra, StaticMesh, TetMesh, VisualMesh};
use tetrasoft_solver::XpbdConfig;
use tetrasoft_telemetry::{EventBus, EventKind, VecSink};
use tetrasoft_types::{SimVertexId, SoftBodyError, TetraId};

fn weightless() -> XpbdConfig {
    XpbdConfig {
        gravity: 0.0,
        edge_compliance: 0.0,
        volume_compliance: 0.0,
        substeps: 1,
        ..Default::default()
    }
}

/// Visual points strictly inside the unit corner tetrahedron.
fn tetra_visual(name: &str) -> StaticMesh {
    let positions = vec![
        Vec3::splat(0.1),
        Vec3::new(0.2, 0.1, 0.1),
        Vec3::new(0.1, 0.5, 0.2),
        Vec3::new(0.25, 0.25, 0.25),
    ];
    StaticMesh::new(name, positions, Vec::new()).unwrap()
}

/// A 2×2×2 box spanning [0, 0.5]³ lifted by `lift`, with a visual grid inside it.
fn box_body(lift: f32, config: XpbdConfig) -> (SoftBody, StaticMesh) {
    let origin = Vec3::new(0.0, lift, 0.0);
    let tet_mesh = tetra_box(2, 2, 2, 0.25, origin);
    let visual = point_grid("Box", origin + Vec3::splat(0.05), origin + Vec3::splat(0.45), 5);
    let body = SoftBody::from_tet_mesh(tet_mesh, &visual, config).unwrap();
    (body, visual)
}

fn write_asset(dir: &Path, name: &str, mesh: &TetMesh) {
    save_tetra(&tetra_path(dir, name), mesh).unwrap();
}

// ─── Loading ──────────────────────────────────────────────────

#[test]
fn load_resolves_asset_by_visual_name() {
    let dir = tempfile::tempdir().unwrap();
    write_asset(dir.path(), "Unit", &single_tetra());
    let visual = tetra_visual("Unit");
    let body = SoftBody::load(dir.path(), &visual, XpbdConfig::default()).unwrap();
    assert_eq!(body.name(), "Unit");
    assert_eq!(body.tet_mesh().tetra_count(), 1);
    assert_eq!(body.skin_mapping().len(), visual.vertex_count());
    assert!((body.tet_mesh().rest_volume(TetraId(0)) - 1.0 / 6.0).abs() < 1e-6);
}

#[test]
fn missing_asset_is_resource_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let err = SoftBody::load(dir.path(), &tetra_visual("Ghost"), XpbdConfig::default())
        .err()
        .unwrap();
    match err {
        SoftBodyError::ResourceNotFound { path } => {
            assert_eq!(path, dir.path().join("Tetra").join("Ghost.tetra"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn malformed_asset_fails_only_its_own_body() {
    let dir = tempfile::tempdir().unwrap();
    write_asset(dir.path(), "Good", &single_tetra());
    let bad = std::fs::read_to_string(tetra_path(dir.path(), "Good"))
        .unwrap()
        .replacen("vc 4", "vc 9", 1);
    std::fs::write(tetra_path(dir.path(), "Bad"), bad).unwrap();

    let err = SoftBody::load(dir.path(), &tetra_visual("Bad"), XpbdConfig::default())
        .err()
        .unwrap();
    assert!(matches!(
        err,
        SoftBodyError::MalformedInput { record: "v", expected: 9, actual: 4 }
    ));

    let mut visual = tetra_visual("Good");
    let mut good = SoftBody::load(dir.path(), &visual, XpbdConfig::default()).unwrap();
    assert!(good.step(&mut visual).is_ok());
}

#[test]
fn empty_tet_mesh_is_rejected() {
    let empty = TetMesh::new(vec![Vec3::ZERO], &[], &[]).unwrap();
    let err = SoftBody::from_tet_mesh(empty, &tetra_visual("Empty"), XpbdConfig::default())
        .err()
        .unwrap();
    assert!(matches!(err, SoftBodyError::InvalidMesh(_)));
}

#[test]
fn invalid_config_is_rejected_at_construction() {
    let config = XpbdConfig { substeps: 0, ..Default::default() };
    let result = SoftBody::from_tet_mesh(single_tetra(), &tetra_visual("Unit"), config);
    assert!(matches!(result, Err(SoftBodyError::InvalidConfig(_))));
}

// ─── Advancing ────────────────────────────────────────────────

#[test]
fn fully_pinned_tetra_stays_bit_exact() {
    let mut visual = tetra_visual("Unit");
    let rest_visual = visual.positions.clone();
    let mut body = SoftBody::from_tet_mesh(single_tetra(), &visual, weightless()).unwrap();
    for v in 0..4 {
        body.pin(SimVertexId(v)).unwrap();
    }
    let before = body.state().positions.clone();

    body.advance(1.0 / 60.0, &mut visual).unwrap();
    assert_eq!(body.state().positions, before);
    for (a, b) in visual.positions.iter().zip(&rest_visual) {
        assert!(a.distance(*b) < 1e-5);
    }
    assert_eq!(body.frame(), 1);
}

#[test]
fn free_corner_converges_to_rest_volume() {
    let positions = vec![Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::Z];
    let tet_mesh = TetMesh::new(positions, &[], &[[0, 1, 2, 3]]).unwrap();
    let mut visual = tetra_visual("Unit");
    let mut body = SoftBody::from_tet_mesh(tet_mesh, &visual, weightless()).unwrap();
    for v in 0..3 {
        body.pin(SimVertexId(v)).unwrap();
    }
    body.state_mut().positions[3] = Vec3::new(0.1, 0.1, 1.3);

    let mut errors = Vec::new();
    for _ in 0..5 {
        body.advance(1.0 / 60.0, &mut visual).unwrap();
        errors.push(body.state().max_volume_error(body.tet_mesh()));
    }
    assert!(errors.last().unwrap() < &1e-4, "errors: {errors:?}");
}

#[test]
fn visual_mesh_follows_free_fall() {
    let (mut body, mut visual) = box_body(2.0, XpbdConfig::default());
    let start = visual.positions.clone();
    for _ in 0..5 {
        body.step(&mut visual).unwrap();
    }
    for (now, then) in visual.positions.iter().zip(&start) {
        assert!(now.y < then.y);
        assert!((now.x - then.x).abs() < 1e-3);
    }
}

#[test]
fn visual_mesh_stays_above_floor() {
    let (mut body, mut visual) = box_body(0.05, XpbdConfig::default());
    for _ in 0..60 {
        body.step(&mut visual).unwrap();
    }
    let floor = body.config().floor_y;
    assert!(visual.positions.iter().all(|p| p.y >= floor - 1e-4));
    assert!(body.state().positions.iter().all(|p| p.y >= floor));
}

#[test]
fn pinned_vertices_hold_position() {
    let (mut body, mut visual) = box_body(1.0, XpbdConfig::default());
    let pinned = body.pin_where(|p| p.y >= 1.5 - 1e-6);
    assert_eq!(pinned, 9);
    let anchors: Vec<Vec3> = body
        .state()
        .positions
        .iter()
        .copied()
        .filter(|p| p.y >= 1.5 - 1e-6)
        .collect();
    for _ in 0..20 {
        body.step(&mut visual).unwrap();
    }
    let after: Vec<Vec3> = body
        .state()
        .positions
        .iter()
        .zip(&body.state().inv_mass)
        .filter(|(_, &w)| w == 0.0)
        .map(|(p, _)| *p)
        .collect();
    assert_eq!(after, anchors);
}

#[test]
fn resized_visual_mesh_is_rejected() {
    let (mut body, mut visual) = box_body(1.0, XpbdConfig::default());
    visual.positions.push(Vec3::ZERO);
    let before = body.state().positions.clone();
    let err = body.step(&mut visual).unwrap_err();
    assert!(matches!(err, SoftBodyError::MeshMismatch { .. }));
    assert_eq!(body.state().positions, before);
    assert_eq!(body.frame(), 0);
}

#[test]
fn config_changes_apply_on_next_advance() {
    let (mut body, mut visual) = box_body(1.0, XpbdConfig::default());
    body.config_mut().substeps = 0;
    assert!(matches!(body.step(&mut visual), Err(SoftBodyError::InvalidConfig(_))));
    assert!(body.advance(-1.0, &mut visual).is_err());

    body.config_mut().substeps = 3;
    let result = body.step(&mut visual).unwrap();
    assert_eq!(result.substeps, 3);
}

#[test]
fn rebind_uses_new_cell_size() {
    let (mut body, visual) = box_body(1.0, XpbdConfig::default());
    let before = body.skin_mapping().entries().to_vec();
    body.config_mut().cell_size = 0.5;
    body.rebind(&visual).unwrap();
    let after = body.skin_mapping().entries();
    for (a, b) in before.iter().zip(after) {
        assert_eq!(a.tetra, b.tetra);
    }

    body.config_mut().cell_size = 0.0;
    assert!(body.rebind(&visual).is_err());
}

// ─── Telemetry ────────────────────────────────────────────────

#[test]
fn telemetry_reports_load_and_frames() {
    let (body, mut visual) = box_body(1.0, XpbdConfig::default());
    let sink = VecSink::new();
    let mut body = body.with_telemetry(EventBus::new().with_sink(sink.clone()));
    assert!(sink.is_empty(), "load events delivered before the first frame");

    for _ in 0..2 {
        body.step(&mut visual).unwrap();
    }

    let events = sink.events();
    assert_eq!(events.len(), 6);
    assert!(matches!(events[0].kind, EventKind::BodyLoaded { tetrahedra: 40, .. }));
    match &events[1].kind {
        EventKind::SkinningComplete { visual_vertices, fallback, .. } => {
            assert_eq!(*visual_vertices, visual.vertex_count());
            assert_eq!(*fallback, 0);
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert!(matches!(events[2].kind, EventKind::FrameBegin { substeps: 10, .. }));
    assert!(matches!(events[3].kind, EventKind::FrameEnd { .. }));
    assert_eq!(events[4].frame, 1);
    assert_eq!(events[5].frame, 1);
}
