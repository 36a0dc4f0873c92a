//! Blocked triangular solve using precomputed diagonal-block inverses
//!
//! Both strategies walk the diagonal blocks of op(A) in substitution order:
//! forward when the system is effectively lower triangular, reverse
//! otherwise. For each block the partial solution is `op(invA_II)` applied
//! to the current right-hand side block, followed by a single GEMM that
//! folds that block into every still-unsolved block.

use super::gemm::gemm_kernel;
use super::{copy_matrix_kernel, fill_matrix_kernel, op_block};
use crate::algorithm::{TRSM_BLOCK, block_ranges};
use crate::dtype::Element;
use crate::ops::{Fill, Operation, Side};
use std::ops::Range;

/// How the solution is staged while blocks are processed
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TrsmStrategy {
    /// X accumulates in a full M × N scratch (leading dimension M) and is
    /// copied into B at the end; B serves as the running right-hand side
    OutOfPlace,
    /// Only one block of X is staged at a time: `min(BS,K) × N` for the
    /// left side, `M × min(BS,K)` for the right side
    Panel,
}

/// Solve op(A) X = alpha B (left) or X op(A) = alpha B (right), X over B
///
/// `inv_a` holds the inverted diagonal blocks of A in the layout produced
/// by [`trtri_blocks_kernel`](super::trtri_blocks_kernel). `work` is the
/// scratch for `strategy`. A zero `alpha` zero-fills B and reads neither A
/// nor `inv_a`.
///
/// # Safety
/// - `a` valid for K × K (`lda`), `b` valid for m × n (`ldb`)
/// - `inv_a` valid for `BS * roundup(K, BS)` elements
/// - `work` valid for the strategy's scratch size
/// - no region aliases another
#[allow(clippy::too_many_arguments)]
pub unsafe fn trsm_kernel<T: Element>(
    strategy: TrsmStrategy,
    side: Side,
    uplo: Fill,
    trans: Operation,
    m: usize,
    n: usize,
    alpha: T,
    a: *const T,
    lda: usize,
    inv_a: *const T,
    b: *mut T,
    ldb: usize,
    work: *mut T,
) {
    if m == 0 || n == 0 {
        return;
    }
    if alpha.is_zero() {
        fill_matrix_kernel(m, n, T::zero(), b, ldb);
        return;
    }

    let k = if side == Side::Left { m } else { n };
    let effective_lower = (uplo == Fill::Lower) == (trans == Operation::None);
    // Left solves run forward on a lower op(A); right solves on an upper one
    let forward = (side == Side::Left) == effective_lower;

    let mut blocks: Vec<(usize, Range<usize>)> = block_ranges(k, TRSM_BLOCK).enumerate().collect();
    if !forward {
        blocks.reverse();
    }

    let bs = TRSM_BLOCK;
    let panel_ld = if side == Side::Left { bs.min(k) } else { m };

    for (step, (idx, blk)) in blocks.into_iter().enumerate() {
        let scale = if step == 0 { alpha } else { T::one() };
        let inv_blk = inv_a.add(idx * bs * bs);
        let size = blk.len();
        let rest = if forward { blk.end..k } else { 0..blk.start };

        match side {
            Side::Left => {
                // X_I = op(invA_II) * (scale * B_I)
                let (x_i, ldx) = match strategy {
                    TrsmStrategy::OutOfPlace => (work.add(blk.start), m),
                    TrsmStrategy::Panel => (work, panel_ld),
                };
                gemm_kernel(
                    trans,
                    Operation::None,
                    size,
                    n,
                    size,
                    scale,
                    inv_blk,
                    bs,
                    b.add(blk.start),
                    ldb,
                    T::zero(),
                    x_i,
                    ldx,
                );
                // B_R = scale * B_R - op(A)_{R,I} * X_I
                if !rest.is_empty() {
                    gemm_kernel(
                        trans,
                        Operation::None,
                        rest.len(),
                        n,
                        size,
                        -T::one(),
                        op_block(a, lda, trans, rest.start, blk.start),
                        lda,
                        x_i,
                        ldx,
                        scale,
                        b.add(rest.start),
                        ldb,
                    );
                }
                if strategy == TrsmStrategy::Panel {
                    copy_matrix_kernel(size, n, x_i, ldx, b.add(blk.start), ldb);
                }
            }
            _ => {
                // X_J = (scale * B_J) * op(invA_JJ)
                let x_j = match strategy {
                    TrsmStrategy::OutOfPlace => work.add(blk.start * m),
                    TrsmStrategy::Panel => work,
                };
                gemm_kernel(
                    Operation::None,
                    trans,
                    m,
                    size,
                    size,
                    scale,
                    b.add(blk.start * ldb),
                    ldb,
                    inv_blk,
                    bs,
                    T::zero(),
                    x_j,
                    m,
                );
                // B_R = scale * B_R - X_J * op(A)_{J,R}
                if !rest.is_empty() {
                    gemm_kernel(
                        Operation::None,
                        trans,
                        m,
                        rest.len(),
                        size,
                        -T::one(),
                        x_j,
                        m,
                        op_block(a, lda, trans, blk.start, rest.start),
                        lda,
                        scale,
                        b.add(rest.start * ldb),
                        ldb,
                    );
                }
                if strategy == TrsmStrategy::Panel {
                    copy_matrix_kernel(m, size, x_j, m, b.add(blk.start * ldb), ldb);
                }
            }
        }
    }

    if strategy == TrsmStrategy::OutOfPlace {
        copy_matrix_kernel(m, n, work, m, b, ldb);
    }
}
