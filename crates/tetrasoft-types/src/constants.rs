//! Physical constants and simulation defaults.

/// Gravitational acceleration magnitude (m/s²), applied along world-down.
pub const GRAVITY: f32 = 9.81;

/// Default frame timestep (seconds). 1/60th of a second.
pub const DEFAULT_DT: f32 = 1.0 / 60.0;

/// Default number of XPBD substeps per frame.
pub const DEFAULT_SUBSTEPS: u32 = 10;

/// Default edge (distance) constraint compliance.
pub const DEFAULT_EDGE_COMPLIANCE: f32 = 100.0;

/// Default volume constraint compliance. Zero keeps the body incompressible.
pub const DEFAULT_VOLUME_COMPLIANCE: f32 = 0.0;

/// Default spatial hash cell size (meters).
pub const DEFAULT_CELL_SIZE: f32 = 0.1;

/// Default floor height (Y coordinate).
pub const DEFAULT_FLOOR_Y: f32 = 0.0;

/// Epsilon for floating-point comparisons.
pub const EPSILON: f32 = 1.0e-7;

/// A tetrahedron basis is treated as singular when its determinant is at
/// most this fraction of the cube of its longest edge.
pub const DEGENERATE_RELATIVE_VOLUME: f32 = 1.0e-6;
