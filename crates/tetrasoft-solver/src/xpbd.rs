//! XPBD substep pipeline.
//!
//! Each substep runs, strictly in order:
//!
//! 1. predict: `v += g·dt`, `x += v·dt` for free vertices
//! 2. one sweep over all edge constraints
//! 3. one sweep over all volume constraints
//! 4. velocity reconstruction `v = (x - x_prev) / dt`
//! 5. floor clamp
//!
//! Constraint sweeps walk colored batches. Within a batch corrections are
//! computed in parallel into scratch buffers, then applied serially, so a
//! step is deterministic regardless of thread count.

use std::time::Instant;

use rayon::prelude::*;
use tetrasoft_math::Vec3;
use tetrasoft_mesh::TetMesh;
use tetrasoft_types::{SimVertexId, SoftBodyError, SoftBodyResult};
use tracing::debug;

use crate::coloring::ColoredBatches;
use crate::config::XpbdConfig;
use crate::constraints::{edge_correction, volume_correction};
use crate::ground_plane::GroundPlane;
use crate::state::SimulationState;

/// Result of one frame step.
#[derive(Debug, Clone, Default)]
pub struct StepResult {
    /// Substeps performed.
    pub substeps: u32,
    /// Vertex clamps applied by the floor over all substeps.
    pub floor_contacts: usize,
    /// Wall-clock time for this step (seconds).
    pub wall_time: f64,
}

/// XPBD solver for one tetrahedral body.
///
/// Owns the constraint topology and its coloring; all mutable data lives
/// in [`SimulationState`].
#[derive(Debug, Clone)]
pub struct XpbdSolver {
    vertex_count: usize,
    edges: Vec<[SimVertexId; 2]>,
    tetrahedra: Vec<[SimVertexId; 4]>,
    edge_batches: ColoredBatches,
    tetra_batches: ColoredBatches,
    edge_scratch: Vec<Option<[Vec3; 2]>>,
    tetra_scratch: Vec<Option<[Vec3; 4]>>,
}

impl XpbdSolver {
    /// Builds constraint batches for `mesh`.
    pub fn new(mesh: &TetMesh) -> Self {
        let n = mesh.vertex_count();
        let edge_batches = ColoredBatches::new(mesh.edges(), n);
        let tetra_batches = ColoredBatches::new(mesh.tetrahedra(), n);
        debug!(
            edges = mesh.edge_count(),
            edge_batches = edge_batches.batch_count(),
            tetrahedra = mesh.tetra_count(),
            tetra_batches = tetra_batches.batch_count(),
            "Colored constraints"
        );
        Self {
            vertex_count: n,
            edges: mesh.edges().to_vec(),
            tetrahedra: mesh.tetrahedra().to_vec(),
            edge_batches,
            tetra_batches,
            edge_scratch: Vec::new(),
            tetra_scratch: Vec::new(),
        }
    }

    pub fn edge_batches(&self) -> &ColoredBatches {
        &self.edge_batches
    }

    pub fn tetra_batches(&self) -> &ColoredBatches {
        &self.tetra_batches
    }

    /// Advances one frame of `frame_dt` seconds in `config.substeps` substeps.
    pub fn step(
        &mut self,
        state: &mut SimulationState,
        config: &XpbdConfig,
        frame_dt: f32,
    ) -> SoftBodyResult<StepResult> {
        config.validate()?;
        XpbdConfig::check_frame_dt(frame_dt)?;
        self.check_state(state)?;

        let start = Instant::now();
        let sdt = config.substep_dt(frame_dt);
        let mut floor_contacts = 0;
        for _ in 0..config.substeps {
            floor_contacts += self.substep(state, config, sdt);
        }

        Ok(StepResult {
            substeps: config.substeps,
            floor_contacts,
            wall_time: start.elapsed().as_secs_f64(),
        })
    }

    /// Runs one substep of length `sdt`. Returns the number of floor clamps.
    ///
    /// `state` must have been initialized from the mesh this solver was
    /// built for.
    pub fn substep(&mut self, state: &mut SimulationState, config: &XpbdConfig, sdt: f32) -> usize {
        let alpha_scale = 1.0 / (sdt * sdt);
        predict(state, config.gravity, sdt);
        self.solve_edges(state, config.edge_compliance * alpha_scale);
        self.solve_volumes(state, config.volume_compliance * alpha_scale);
        update_velocities(state, sdt);
        GroundPlane::new(config.floor_y).clamp(state)
    }

    fn check_state(&self, state: &SimulationState) -> SoftBodyResult<()> {
        let n = self.vertex_count;
        for len in [
            state.positions.len(),
            state.velocities.len(),
            state.prev_positions.len(),
            state.inv_mass.len(),
        ] {
            if len != n {
                return Err(SoftBodyError::MeshMismatch {
                    expected: n,
                    actual: len,
                });
            }
        }
        if state.rest_lengths.len() != self.edges.len()
            || state.rest_volumes.len() != self.tetrahedra.len()
        {
            return Err(SoftBodyError::InvalidMesh(format!(
                "State has {} rest lengths and {} rest volumes, solver has {} edges and {} tetrahedra",
                state.rest_lengths.len(),
                state.rest_volumes.len(),
                self.edges.len(),
                self.tetrahedra.len()
            )));
        }
        Ok(())
    }

    fn solve_edges(&mut self, state: &mut SimulationState, alpha: f32) {
        let edges = &self.edges;
        for batch in self.edge_batches.batches() {
            let positions = &state.positions;
            let inv_mass = &state.inv_mass;
            let rest = &state.rest_lengths;
            batch
                .par_iter()
                .map(|&e| {
                    let e = e as usize;
                    let [a, b] = edges[e];
                    edge_correction(
                        [positions[a.index()], positions[b.index()]],
                        [inv_mass[a.index()], inv_mass[b.index()]],
                        rest[e],
                        alpha,
                    )
                })
                .collect_into_vec(&mut self.edge_scratch);

            for (&e, correction) in batch.iter().zip(&self.edge_scratch) {
                if let Some(deltas) = correction {
                    for (v, d) in edges[e as usize].iter().zip(deltas) {
                        state.positions[v.index()] += *d;
                    }
                }
            }
        }
    }

    fn solve_volumes(&mut self, state: &mut SimulationState, alpha: f32) {
        let tetrahedra = &self.tetrahedra;
        for batch in self.tetra_batches.batches() {
            let positions = &state.positions;
            let inv_mass = &state.inv_mass;
            let rest = &state.rest_volumes;
            batch
                .par_iter()
                .map(|&t| {
                    let t = t as usize;
                    let corners = tetrahedra[t];
                    volume_correction(
                        corners.map(|v| positions[v.index()]),
                        corners.map(|v| inv_mass[v.index()]),
                        rest[t],
                        alpha,
                    )
                })
                .collect_into_vec(&mut self.tetra_scratch);

            for (&t, correction) in batch.iter().zip(&self.tetra_scratch) {
                if let Some(deltas) = correction {
                    for (v, d) in tetrahedra[t as usize].iter().zip(deltas) {
                        state.positions[v.index()] += *d;
                    }
                }
            }
        }
    }
}

/// Integrates gravity and velocity for free vertices, recording the
/// pre-prediction position.
pub fn predict(state: &mut SimulationState, gravity: f32, sdt: f32) {
    let dv = Vec3::new(0.0, -gravity * sdt, 0.0);
    state
        .positions
        .par_iter_mut()
        .zip(state.velocities.par_iter_mut())
        .zip(state.prev_positions.par_iter_mut())
        .zip(state.inv_mass.par_iter())
        .for_each(|(((p, v), prev), &w)| {
            if w == 0.0 {
                return;
            }
            *v += dv;
            *prev = *p;
            *p += *v * sdt;
        });
}

/// Replaces the velocity of each free vertex with its displacement over
/// the substep divided by `sdt`.
pub fn update_velocities(state: &mut SimulationState, sdt: f32) {
    let inv_dt = 1.0 / sdt;
    state
        .velocities
        .par_iter_mut()
        .zip(state.positions.par_iter())
        .zip(state.prev_positions.par_iter())
        .zip(state.inv_mass.par_iter())
        .for_each(|(((v, p), prev), &w)| {
            if w > 0.0 {
                *v = (*p - *prev) * inv_dt;
            }
        });
}
