//! # tetrasoft-types
//!
//! Shared types, identifiers, error types, and physical constants
//! for the tetrasoft soft-body simulation.
//!
//! This crate has zero domain logic: it defines the vocabulary
//! that all other tetrasoft crates share.

pub mod constants;
pub mod error;
pub mod ids;

pub use error::{SoftBodyError, SoftBodyResult};
pub use ids::{SimVertexId, TetraId, VisualVertexId};
