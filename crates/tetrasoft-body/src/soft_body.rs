//! The soft body: one tetrahedral simulation mesh skinned onto one visual mesh.

use std::path::Path;

use tetrasoft_math::Vec3;
use tetrasoft_mesh::{load_tetra, TetMesh, VisualMesh};
use tetrasoft_skinning::SkinMapping;
use tetrasoft_solver::{SimulationState, StepResult, XpbdConfig, XpbdSolver};
use tetrasoft_spatial::SpatialHashGrid;
use tetrasoft_telemetry::{EventBus, EventKind};
use tetrasoft_types::{SimVertexId, SoftBodyError, SoftBodyResult};
use tracing::{debug, info};

use crate::asset::tetra_path;

/// A deformable body.
///
/// Construction loads topology, initializes physics, and binds the visual
/// mesh. Errors are confined to the body being built.
pub struct SoftBody {
    name: String,
    tet_mesh: TetMesh,
    state: SimulationState,
    solver: XpbdSolver,
    skin: SkinMapping,
    config: XpbdConfig,
    frame: u64,
    telemetry: Option<EventBus>,
}

impl SoftBody {
    /// Loads `<asset_dir>/Tetra/<mesh name>.tetra` and binds `mesh` to it.
    pub fn load(asset_dir: &Path, mesh: &impl VisualMesh, config: XpbdConfig) -> SoftBodyResult<Self> {
        let path = tetra_path(asset_dir, mesh.name());
        let tet_mesh = load_tetra(&path)?;
        Self::from_tet_mesh(tet_mesh, mesh, config)
    }

    /// Builds a body from an already loaded tetrahedral mesh.
    ///
    /// The visual mesh's current positions are taken as its rest shape and
    /// must coincide with the tetrahedral rest shape.
    pub fn from_tet_mesh(
        tet_mesh: TetMesh,
        mesh: &impl VisualMesh,
        config: XpbdConfig,
    ) -> SoftBodyResult<Self> {
        config.validate()?;
        if tet_mesh.is_empty() {
            return Err(SoftBodyError::InvalidMesh(format!(
                "'{}' has no tetrahedra to simulate",
                mesh.name()
            )));
        }

        let state = SimulationState::from_tet_mesh(&tet_mesh);
        let solver = XpbdSolver::new(&tet_mesh);
        let skin = bind(&state, &tet_mesh, mesh.positions(), config.cell_size)?;

        info!(
            name = mesh.name(),
            vertices = tet_mesh.vertex_count(),
            edges = tet_mesh.edge_count(),
            tetrahedra = tet_mesh.tetra_count(),
            free = state.free_count(),
            visual_vertices = skin.len(),
            "Soft body ready"
        );

        Ok(Self {
            name: mesh.name().to_string(),
            tet_mesh,
            state,
            solver,
            skin,
            config,
            frame: 0,
            telemetry: None,
        })
    }

    /// Attaches an event bus and reports the load summary on it. The
    /// summary reaches the sinks with the first frame's flush.
    pub fn with_telemetry(mut self, bus: EventBus) -> Self {
        self.telemetry = Some(bus);
        self.emit(EventKind::BodyLoaded {
            name: self.name.clone(),
            vertices: self.tet_mesh.vertex_count(),
            edges: self.tet_mesh.edge_count(),
            tetrahedra: self.tet_mesh.tetra_count(),
        });
        self.emit_skinning();
        self
    }

    /// Advances one frame of `frame_dt` seconds, then writes every visual
    /// vertex from its tetrahedron's current corners.
    ///
    /// Nothing is touched when the configuration is invalid or the visual
    /// mesh no longer matches the skin mapping.
    pub fn advance(&mut self, frame_dt: f32, mesh: &mut impl VisualMesh) -> SoftBodyResult<StepResult> {
        self.config.validate()?;
        XpbdConfig::check_frame_dt(frame_dt)?;
        if mesh.vertex_count() != self.skin.len() {
            return Err(SoftBodyError::MeshMismatch {
                expected: self.skin.len(),
                actual: mesh.vertex_count(),
            });
        }
        self.emit(EventKind::FrameBegin {
            dt: frame_dt,
            substeps: self.config.substeps,
        });

        let result = self.solver.step(&mut self.state, &self.config, frame_dt)?;
        self.skin
            .apply(&self.state, &self.tet_mesh, mesh.positions_mut())?;

        self.emit(EventKind::FrameEnd {
            wall_time: result.wall_time,
            floor_contacts: result.floor_contacts,
            kinetic_energy: self.state.kinetic_energy(),
        });
        if let Some(bus) = &mut self.telemetry {
            let delivered = bus.flush();
            debug!(frame = self.frame, delivered, "Flushed telemetry");
        }
        self.frame += 1;
        Ok(result)
    }

    /// Advances one frame of the configured `dt`.
    pub fn step(&mut self, mesh: &mut impl VisualMesh) -> SoftBodyResult<StepResult> {
        self.advance(self.config.dt, mesh)
    }

    /// Rebuilds the spatial hash with the current `cell_size` and rebinds
    /// `mesh`, whose positions must match the current simulation shape.
    pub fn rebind(&mut self, mesh: &impl VisualMesh) -> SoftBodyResult<()> {
        self.config.validate()?;
        self.skin = bind(&self.state, &self.tet_mesh, mesh.positions(), self.config.cell_size)?;
        self.emit_skinning();
        Ok(())
    }

    /// Pins a simulation vertex in place.
    pub fn pin(&mut self, v: SimVertexId) -> SoftBodyResult<()> {
        self.state.pin(v)
    }

    /// Pins every simulation vertex whose position satisfies `predicate`.
    pub fn pin_where(&mut self, predicate: impl Fn(Vec3) -> bool) -> usize {
        let pinned = self.state.pin_where(predicate);
        debug!(name = %self.name, pinned, "Pinned vertices");
        pinned
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &XpbdConfig {
        &self.config
    }

    /// Configuration, editable between frames. Changes apply on the next
    /// `advance`; `cell_size` applies on the next `rebind`.
    pub fn config_mut(&mut self) -> &mut XpbdConfig {
        &mut self.config
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    /// Mutable simulation state, for scripted perturbations.
    pub fn state_mut(&mut self) -> &mut SimulationState {
        &mut self.state
    }

    pub fn tet_mesh(&self) -> &TetMesh {
        &self.tet_mesh
    }

    pub fn skin_mapping(&self) -> &SkinMapping {
        &self.skin
    }

    /// Frames advanced so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn telemetry_mut(&mut self) -> Option<&mut EventBus> {
        self.telemetry.as_mut()
    }

    fn emit(&mut self, kind: EventKind) {
        if let Some(bus) = &mut self.telemetry {
            bus.record(self.frame, kind);
        }
    }

    fn emit_skinning(&mut self) {
        let stats = self.skin.stats();
        self.emit(EventKind::SkinningComplete {
            visual_vertices: stats.vertices,
            contained: stats.contained,
            fallback: stats.fallback,
            degenerate_tetrahedra: stats.degenerate_tetrahedra,
        });
    }
}

fn bind(
    state: &SimulationState,
    tet_mesh: &TetMesh,
    visual: &[Vec3],
    cell_size: f32,
) -> SoftBodyResult<SkinMapping> {
    let grid = SpatialHashGrid::from_points(cell_size, visual)?;
    SkinMapping::precompute(state, tet_mesh, visual, &grid)
}
