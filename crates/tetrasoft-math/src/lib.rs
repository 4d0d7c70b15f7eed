//! # tetrasoft-math
//!
//! Linear algebra primitives for the tetrasoft simulation.
//!
//! Provides:
//! - Re-exports of `glam` types (`Vec3`, `Mat3`, etc.)
//! - Tetrahedron geometry: signed volume, volume gradients,
//!   barycentric basis and containment scores

pub mod tetra;

// Re-export glam types as the canonical math types for tetrasoft.
pub use glam::{IVec3, Mat3, Vec3, Vec4};
