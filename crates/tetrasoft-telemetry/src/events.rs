//! Simulation event types.
//!
//! Events are small value types tagged with the frame they belong to.

use serde::{Deserialize, Serialize};

/// A simulation event emitted by a soft body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationEvent {
    /// Frame number (0-indexed). Load-time events use frame 0.
    pub frame: u64,
    /// Event payload.
    pub kind: EventKind,
}

/// Event payload variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventKind {
    /// Simulation mesh loaded and physics initialized.
    BodyLoaded {
        /// Visual asset name.
        name: String,
        vertices: usize,
        edges: usize,
        tetrahedra: usize,
    },

    /// Skinning precomputation finished.
    SkinningComplete {
        /// Visual vertices bound.
        visual_vertices: usize,
        /// Vertices lying inside their tetrahedron.
        contained: usize,
        /// Vertices bound by exhaustive search.
        fallback: usize,
        /// Tetrahedra skipped as degenerate.
        degenerate_tetrahedra: usize,
    },

    /// Frame started.
    FrameBegin {
        /// Frame timestep (seconds).
        dt: f32,
        /// Substeps that will run.
        substeps: u32,
    },

    /// Frame completed and the visual mesh written.
    FrameEnd {
        /// Wall-clock time for the frame (seconds).
        wall_time: f64,
        /// Floor clamps applied during the frame.
        floor_contacts: usize,
        /// Kinetic energy after the frame.
        kinetic_energy: f64,
    },
}

impl SimulationEvent {
    pub fn new(frame: u64, kind: EventKind) -> Self {
        Self { frame, kind }
    }
}
