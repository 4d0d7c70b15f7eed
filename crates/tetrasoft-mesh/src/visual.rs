//! Visual (render) mesh collaborator.
//!
//! The simulation never draws anything. It reads a dense visual mesh's
//! vertex positions once, during skinning precomputation, and overwrites
//! them every frame. Any render-side mesh type can take part by
//! implementing [`VisualMesh`].

use serde::{Deserialize, Serialize};
use tetrasoft_math::Vec3;
use tetrasoft_types::{SoftBodyError, SoftBodyResult};

/// A named mesh exposing a contiguous, mutable vertex-position buffer.
pub trait VisualMesh {
    /// Stable asset name. Used to resolve the matching `.tetra` file.
    fn name(&self) -> &str;

    /// Vertex positions.
    fn positions(&self) -> &[Vec3];

    /// Mutable vertex positions.
    fn positions_mut(&mut self) -> &mut [Vec3];

    /// Returns the number of vertices.
    fn vertex_count(&self) -> usize {
        self.positions().len()
    }
}

/// A plain triangle mesh held in memory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticMesh {
    /// Asset name.
    pub name: String,
    /// Vertex positions.
    pub positions: Vec<Vec3>,
    /// Triangle indices, three per triangle.
    pub indices: Vec<u32>,
}

impl StaticMesh {
    /// Creates a mesh and validates its indices.
    pub fn new(name: impl Into<String>, positions: Vec<Vec3>, indices: Vec<u32>) -> SoftBodyResult<Self> {
        let mesh = Self {
            name: name.into(),
            positions,
            indices,
        };
        mesh.validate()?;
        Ok(mesh)
    }

    /// Returns the number of triangles.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Checks index count and bounds.
    pub fn validate(&self) -> SoftBodyResult<()> {
        if self.indices.len() % 3 != 0 {
            return Err(SoftBodyError::InvalidMesh(
                "Index count is not divisible by 3".into(),
            ));
        }
        let n = self.positions.len();
        if let Some((i, &idx)) = self
            .indices
            .iter()
            .enumerate()
            .find(|(_, &idx)| idx as usize >= n)
        {
            return Err(SoftBodyError::InvalidMesh(format!(
                "Index {idx} at position {i} is out of range (vertex count: {n})"
            )));
        }
        Ok(())
    }
}

impl VisualMesh for StaticMesh {
    fn name(&self) -> &str {
        &self.name
    }

    fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    fn positions_mut(&mut self) -> &mut [Vec3] {
        &mut self.positions
    }
}
