//! Graph coloring for conflict-free parallel constraint projection.
//!
//! Greedy coloring with per-vertex bitmasks: a constraint takes the
//! lowest color not yet used by any constraint sharing one of its
//! vertices. Constraints of one color touch disjoint vertex sets, so a
//! batch's corrections can be computed in parallel and applied without
//! write conflicts.

use tetrasoft_types::SimVertexId;

/// Constraint indices grouped into conflict-free batches.
#[derive(Debug, Clone, Default)]
pub struct ColoredBatches {
    /// Constraint indices, reordered so each batch is contiguous.
    order: Vec<u32>,
    /// Start of each batch in `order`, plus a final end offset.
    offsets: Vec<usize>,
}

impl ColoredBatches {
    /// Colors constraints over `vertex_count` vertices.
    ///
    /// Input order is preserved within each batch, so the result is
    /// deterministic.
    pub fn new<const N: usize>(constraints: &[[SimVertexId; N]], vertex_count: usize) -> Self {
        if constraints.is_empty() {
            return Self {
                order: Vec::new(),
                offsets: vec![0],
            };
        }

        let mut used: Vec<ColorMask> = vec![ColorMask::default(); vertex_count];
        let mut colors = Vec::with_capacity(constraints.len());
        let mut color_count = 0;

        for vertices in constraints {
            let mut mask = ColorMask::default();
            for v in vertices {
                mask.union_with(&used[v.index()]);
            }
            let color = mask.first_free();
            for v in vertices {
                used[v.index()].insert(color);
            }
            colors.push(color);
            color_count = color_count.max(color + 1);
        }

        // Counting sort by color.
        let mut offsets = vec![0usize; color_count + 1];
        for &c in &colors {
            offsets[c + 1] += 1;
        }
        for c in 0..color_count {
            offsets[c + 1] += offsets[c];
        }
        let mut cursor = offsets.clone();
        let mut order = vec![0u32; constraints.len()];
        for (i, &c) in colors.iter().enumerate() {
            order[cursor[c]] = i as u32;
            cursor[c] += 1;
        }

        Self { order, offsets }
    }

    /// Number of batches.
    #[inline]
    pub fn batch_count(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Total number of constraints across all batches.
    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Constraint indices of batch `b`.
    #[inline]
    pub fn batch(&self, b: usize) -> &[u32] {
        &self.order[self.offsets[b]..self.offsets[b + 1]]
    }

    /// Iterates over batches in color order.
    pub fn batches(&self) -> impl Iterator<Item = &[u32]> + '_ {
        (0..self.batch_count()).map(move |b| self.batch(b))
    }
}

/// Growable bitset of colors.
#[derive(Debug, Clone, Default)]
struct ColorMask {
    words: Vec<u64>,
}

impl ColorMask {
    fn insert(&mut self, color: usize) {
        let word = color / 64;
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        self.words[word] |= 1u64 << (color % 64);
    }

    fn union_with(&mut self, other: &ColorMask) {
        if other.words.len() > self.words.len() {
            self.words.resize(other.words.len(), 0);
        }
        for (a, b) in self.words.iter_mut().zip(&other.words) {
            *a |= b;
        }
    }

    fn first_free(&self) -> usize {
        for (i, &w) in self.words.iter().enumerate() {
            if w != u64::MAX {
                return i * 64 + (!w).trailing_zeros() as usize;
            }
        }
        self.words.len() * 64
    }
}
