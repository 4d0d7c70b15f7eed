//! Sparse spatial hash over a static point set.
//!
//! Partitions space into a uniform grid of cubic cells and bins point
//! indices by a 64-bit hash of their cell coordinates. Distinct cells may
//! collide into one bucket, so a bucket is a candidate list only.
//! Queries return a superset of the points within the requested radius;
//! callers re-check true distance.

use std::collections::HashMap;

use tetrasoft_math::{IVec3, Vec3};
use tetrasoft_types::constants::EPSILON;
use tetrasoft_types::{SoftBodyError, SoftBodyResult};
use tracing::debug;

const HASH_X: u64 = 854_807;
const HASH_Y: u64 = 618_361;
const HASH_Z: u64 = 553_757;

/// Uniform-grid spatial hash with sparse buckets.
///
/// Built once from rest geometry; there is no incremental update.
#[derive(Debug, Clone)]
pub struct SpatialHashGrid {
    cell_size: f32,
    /// Inverse cell size (cached).
    inv_cell_size: f32,
    /// Cell hash → indices of the points binned there.
    buckets: HashMap<u64, Vec<u32>>,
    point_count: usize,
}

impl SpatialHashGrid {
    /// Creates an empty grid. The cell size must be positive and finite.
    pub fn new(cell_size: f32) -> SoftBodyResult<Self> {
        if !cell_size.is_finite() || cell_size <= EPSILON {
            return Err(SoftBodyError::InvalidConfig(format!(
                "cell_size must be positive and finite, got {cell_size}"
            )));
        }
        Ok(Self {
            cell_size,
            inv_cell_size: 1.0 / cell_size,
            buckets: HashMap::new(),
            point_count: 0,
        })
    }

    /// Creates a grid and builds it over `points` in one go.
    pub fn from_points(cell_size: f32, points: &[Vec3]) -> SoftBodyResult<Self> {
        let mut grid = Self::new(cell_size)?;
        grid.build(points);
        Ok(grid)
    }

    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Number of points indexed by the last build.
    #[inline]
    pub fn point_count(&self) -> usize {
        self.point_count
    }

    /// Number of non-empty buckets.
    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Integer cell containing `p`: component-wise `floor(p / cell_size)`.
    #[inline]
    pub fn cell_coord(&self, p: Vec3) -> IVec3 {
        (p * self.inv_cell_size).floor().as_ivec3()
    }

    /// 64-bit hash of a cell coordinate. Wrapping arithmetic; collisions are
    /// expected and harmless.
    #[inline]
    pub fn cell_hash(cell: IVec3) -> u64 {
        (cell.x as i64 as u64)
            .wrapping_mul(HASH_X)
            .wrapping_add((cell.y as i64 as u64).wrapping_mul(HASH_Y))
            .wrapping_add((cell.z as i64 as u64).wrapping_mul(HASH_Z))
    }

    /// Rebuilds the grid from scratch over `points`.
    pub fn build(&mut self, points: &[Vec3]) {
        self.buckets.clear();
        for (i, &p) in points.iter().enumerate() {
            let key = Self::cell_hash(self.cell_coord(p));
            self.buckets.entry(key).or_default().push(i as u32);
        }
        self.point_count = points.len();
        debug!(
            points = self.point_count,
            buckets = self.buckets.len(),
            cell_size = self.cell_size,
            "Built spatial hash"
        );
    }

    /// Indices of every point whose cell overlaps the cube of half-extent
    /// `radius` around `center`. Sorted and free of duplicates.
    pub fn query(&self, center: Vec3, radius: f32) -> Vec<u32> {
        let mut out = Vec::new();
        self.query_into(center, radius, &mut out);
        out
    }

    /// Like [`query`](Self::query), but reuses `out`'s allocation.
    pub fn query_into(&self, center: Vec3, radius: f32, out: &mut Vec<u32>) {
        out.clear();
        if self.buckets.is_empty() {
            return;
        }
        let r = Vec3::splat(radius.abs());
        let lo = self.cell_coord(center - r);
        let hi = self.cell_coord(center + r);
        let span = hi.as_i64vec3() - lo.as_i64vec3() + 1;
        let cells = span.x.saturating_mul(span.y).saturating_mul(span.z);

        if cells as u64 >= self.buckets.len() as u64 {
            // Visiting every bucket is cheaper than walking the cell range.
            for bucket in self.buckets.values() {
                out.extend_from_slice(bucket);
            }
        } else {
            for x in lo.x..=hi.x {
                for y in lo.y..=hi.y {
                    for z in lo.z..=hi.z {
                        if let Some(bucket) = self.buckets.get(&Self::cell_hash(IVec3::new(x, y, z))) {
                            out.extend_from_slice(bucket);
                        }
                    }
                }
            }
        }

        out.sort_unstable();
        out.dedup();
    }
}
