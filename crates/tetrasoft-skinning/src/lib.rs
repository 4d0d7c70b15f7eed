//! # tetrasoft-skinning
//!
//! Transfers simulation deformation onto a dense visual mesh.
//!
//! [`SkinMapping::precompute`] binds every visual vertex to one
//! tetrahedron with barycentric weights, once, at rest.
//! [`SkinMapping::apply`] then rebuilds visual positions from the current
//! tetrahedron corners every frame.

pub mod mapping;
pub mod precompute;

pub use mapping::{SkinEntry, SkinMapping, SkinStats};
