//! # tetrasoft-mesh
//!
//! Mesh data for the soft-body simulation.
//!
//! ## Key Types
//!
//! - [`TetMesh`]: The coarse tetrahedral simulation mesh (rest positions,
//!   edges, tetrahedra, optional neighbour records).
//! - [`VisualMesh`]: Trait for the dense render mesh the simulation deforms.
//! - [`StaticMesh`]: In-memory [`VisualMesh`] implementation.
//! - `.tetra` and OBJ readers, plus procedural generators for tests.

pub mod generators;
pub mod obj;
pub mod tet_mesh;
pub mod tetra_file;
pub mod visual;

pub use obj::{format_obj, load_obj, parse_obj, save_obj};
pub use tet_mesh::TetMesh;
pub use tetra_file::{format_tetra, load_tetra, parse_header, parse_tetra, save_tetra, TetraHeader};
pub use visual::{StaticMesh, VisualMesh};
