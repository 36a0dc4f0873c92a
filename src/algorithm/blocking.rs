//! Diagonal block partitioning

use std::ops::Range;

/// Order of the diagonal blocks inverted ahead of a triangular solve
pub const TRSM_BLOCK: usize = 128;

/// Block configuration of the triangular solver
///
/// The inverse of block `b` lives at element offset `b * block * block`
/// of invA, with leading dimension `block`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BlockConfig {
    /// Diagonal block order
    pub block: usize,
}

impl BlockConfig {
    /// The configuration every routine in this crate uses
    pub const DEFAULT: Self = Self { block: TRSM_BLOCK };

    /// Elements of invA needed for a triangular matrix of order `k`
    pub const fn inv_a_elems(&self, k: usize) -> usize {
        k.div_ceil(self.block).saturating_mul(self.block * self.block)
    }

    /// Element offset of block `index` in invA
    pub const fn inv_a_offset(&self, index: usize) -> usize {
        index * self.block * self.block
    }
}

impl Default for BlockConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Number of blocks of size `block` needed to cover `k`
#[inline]
pub const fn block_count(k: usize, block: usize) -> usize {
    k.div_ceil(block)
}

/// Consecutive ranges of at most `block` covering `0..k`
///
/// The last range holds the `k % block` remainder when there is one.
pub fn block_ranges(k: usize, block: usize) -> impl DoubleEndedIterator<Item = Range<usize>> {
    (0..block_count(k, block)).map(move |b| {
        let start = b * block;
        start..(start + block).min(k)
    })
}
