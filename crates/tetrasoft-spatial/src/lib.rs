//! # tetrasoft-spatial
//!
//! Spatial acceleration for skinning precomputation.
//!
//! [`SpatialHashGrid`] bins the static rest positions of the visual mesh
//! into uniform cells keyed by a 64-bit hash, and answers cube-shaped
//! radius queries with a deduplicated candidate list.

pub mod spatial_hash;

pub use spatial_hash::SpatialHashGrid;
