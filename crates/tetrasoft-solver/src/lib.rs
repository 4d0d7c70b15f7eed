//! # tetrasoft-solver
//!
//! Extended Position-Based Dynamics for tetrahedral soft bodies.
//!
//! ## Key Types
//!
//! - [`SimulationState`]: Per-vertex positions, velocities, inverse masses,
//!   and per-constraint rest measurements
//! - [`XpbdSolver`]: The substep pipeline over colored constraint batches
//! - [`XpbdConfig`]: Compliances, timestep, substeps, gravity, floor
//! - [`GroundPlane`]: Y-axis floor clamp

pub mod coloring;
pub mod config;
pub mod constraints;
pub mod ground_plane;
pub mod state;
pub mod xpbd;

pub use coloring::ColoredBatches;
pub use config::XpbdConfig;
pub use ground_plane::GroundPlane;
pub use state::SimulationState;
pub use xpbd::{StepResult, XpbdSolver};
