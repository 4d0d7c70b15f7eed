//! Floor clamp.
//!
//! Keeps every vertex at or above a horizontal plane `y = height`. Only
//! the Y coordinate is touched: no friction, no bounce, velocities are
//! left alone.

use rayon::prelude::*;

use crate::state::SimulationState;

/// Horizontal floor at a fixed Y height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundPlane {
    /// Height of the floor (Y coordinate).
    pub height: f32,
}

impl GroundPlane {
    pub fn new(height: f32) -> Self {
        Self { height }
    }

    /// Raises every vertex below the floor to exactly `height`.
    /// Returns the number of vertices clamped.
    pub fn clamp(&self, state: &mut SimulationState) -> usize {
        let height = self.height;
        state
            .positions
            .par_iter_mut()
            .map(|p| {
                if p.y < height {
                    p.y = height;
                    1
                } else {
                    0
                }
            })
            .sum()
    }
}
