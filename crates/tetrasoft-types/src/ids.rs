//! Strongly-typed identifiers for simulation entities.
//!
//! Newtype wrappers prevent accidental mixing of simulation vertex indices
//! with tetrahedron or visual vertex indices. `checked` constructors
//! validate a raw index against the length of the array it refers to.

use serde::{Deserialize, Serialize};

use crate::error::{SoftBodyError, SoftBodyResult};

/// Index into the simulation vertex arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SimVertexId(pub u32);

/// Index into the tetrahedron array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TetraId(pub u32);

/// Index into the visual mesh vertex buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VisualVertexId(pub u32);

fn check_range(kind: &'static str, raw: i64, len: usize) -> SoftBodyResult<u32> {
    if raw < 0 || raw as u64 >= len as u64 || raw > i64::from(u32::MAX) {
        return Err(SoftBodyError::IndexOutOfRange {
            kind,
            index: raw,
            len,
        });
    }
    Ok(raw as u32)
}

impl SimVertexId {
    /// Returns the raw index as `usize` for array indexing.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Validates `raw` against a vertex array of length `len`.
    pub fn checked(raw: i64, len: usize) -> SoftBodyResult<Self> {
        check_range("vertex", raw, len).map(Self)
    }
}

impl TetraId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Validates `raw` against a tetrahedron array of length `len`.
    pub fn checked(raw: i64, len: usize) -> SoftBodyResult<Self> {
        check_range("tetrahedron", raw, len).map(Self)
    }
}

impl VisualVertexId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for SimVertexId {
    fn from(val: u32) -> Self {
        Self(val)
    }
}

impl From<u32> for TetraId {
    fn from(val: u32) -> Self {
        Self(val)
    }
}

impl From<u32> for VisualVertexId {
    fn from(val: u32) -> Self {
        Self(val)
    }
}
