//! Solver configuration.
//!
//! Every field may be changed between frames; the next step picks the
//! new values up. Invalid values are rejected by [`XpbdConfig::validate`],
//! never silently corrected.

use serde::{Deserialize, Serialize};
use tetrasoft_types::constants::{
    DEFAULT_CELL_SIZE, DEFAULT_DT, DEFAULT_EDGE_COMPLIANCE, DEFAULT_FLOOR_Y, DEFAULT_SUBSTEPS,
    DEFAULT_VOLUME_COMPLIANCE, GRAVITY,
};
use tetrasoft_types::{SoftBodyError, SoftBodyResult};

/// Configuration for the XPBD soft-body solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct XpbdConfig {
    /// Edge (distance) constraint compliance. Higher is softer.
    pub edge_compliance: f32,

    /// Volume constraint compliance. Zero is incompressible.
    pub volume_compliance: f32,

    /// Spatial hash cell size used by skinning precomputation.
    /// Takes effect on the next rebind.
    pub cell_size: f32,

    /// Frame timestep (seconds) used by `step`.
    pub dt: f32,

    /// Substeps per frame.
    pub substeps: u32,

    /// Gravitational acceleration magnitude, applied along -Y.
    pub gravity: f32,

    /// Floor height (Y coordinate).
    pub floor_y: f32,
}

impl Default for XpbdConfig {
    fn default() -> Self {
        Self {
            edge_compliance: DEFAULT_EDGE_COMPLIANCE,
            volume_compliance: DEFAULT_VOLUME_COMPLIANCE,
            cell_size: DEFAULT_CELL_SIZE,
            dt: DEFAULT_DT,
            substeps: DEFAULT_SUBSTEPS,
            gravity: GRAVITY,
            floor_y: DEFAULT_FLOOR_Y,
        }
    }
}

impl XpbdConfig {
    /// Rigid preset: zero compliances, more substeps.
    pub fn stiff() -> Self {
        Self {
            edge_compliance: 0.0,
            volume_compliance: 0.0,
            substeps: 20,
            ..Default::default()
        }
    }

    /// Jelly-like preset.
    pub fn soft() -> Self {
        Self {
            edge_compliance: 1000.0,
            volume_compliance: 0.01,
            substeps: 5,
            ..Default::default()
        }
    }

    /// Substep length for a frame of `frame_dt` seconds.
    #[inline]
    pub fn substep_dt(&self, frame_dt: f32) -> f32 {
        frame_dt / self.substeps as f32
    }

    /// Checks a frame timestep passed to `step`.
    pub fn check_frame_dt(frame_dt: f32) -> SoftBodyResult<()> {
        check_positive("frame dt", frame_dt)
    }

    /// Checks that the configuration can drive the solver.
    pub fn validate(&self) -> SoftBodyResult<()> {
        if self.substeps == 0 {
            return Err(invalid("substeps must be at least 1".into()));
        }
        check_positive("dt", self.dt)?;
        check_positive("cell_size", self.cell_size)?;
        check_non_negative("edge_compliance", self.edge_compliance)?;
        check_non_negative("volume_compliance", self.volume_compliance)?;
        if !self.gravity.is_finite() {
            return Err(invalid(format!("gravity must be finite, got {}", self.gravity)));
        }
        if !self.floor_y.is_finite() {
            return Err(invalid(format!("floor_y must be finite, got {}", self.floor_y)));
        }
        Ok(())
    }
}

fn invalid(message: String) -> SoftBodyError {
    SoftBodyError::InvalidConfig(message)
}

fn check_positive(name: &str, value: f32) -> SoftBodyResult<()> {
    if !(value.is_finite() && value > 0.0) {
        return Err(invalid(format!("{name} must be positive and finite, got {value}")));
    }
    Ok(())
}

fn check_non_negative(name: &str, value: f32) -> SoftBodyResult<()> {
    if !(value.is_finite() && value >= 0.0) {
        return Err(invalid(format!("{name} must be non-negative and finite, got {value}")));
    }
    Ok(())
}
