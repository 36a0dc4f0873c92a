//! Triangular matrix multiply kernels

use super::gemm::gemm_kernel;
use super::{copy_matrix_kernel, fill_matrix_kernel, op_block};
use crate::algorithm::{TRSM_BLOCK, block_ranges};
use crate::dtype::Element;
use crate::ops::{Diagonal, Fill, Operation, Side};

/// Column (left side) or row (right side) chunk width of in-place TRMM
pub const TRMM_CHUNK: usize = 128;

/// C = alpha op(A) B (left) or C = alpha B op(A) (right)
///
/// Diagonal blocks are densified into a local BS × BS buffer (zeros outside
/// the triangle, ones on a unit diagonal) so the unit diagonal and the
/// unreferenced triangle of A are never read. Off-diagonal blocks are one
/// GEMM per output block.
///
/// # Safety
/// - `a` valid for K × K (`lda`), `b` valid for m × n (`ldb`), `c` valid
///   for m × n (`ldc`)
/// - `c` must not alias `a` or `b`
#[allow(clippy::too_many_arguments)]
pub unsafe fn trmm_outofplace_kernel<T: Element>(
    side: Side,
    uplo: Fill,
    trans: Operation,
    diag: Diagonal,
    m: usize,
    n: usize,
    alpha: T,
    a: *const T,
    lda: usize,
    b: *const T,
    ldb: usize,
    c: *mut T,
    ldc: usize,
) {
    if m == 0 || n == 0 {
        return;
    }
    if alpha.is_zero() {
        fill_matrix_kernel(m, n, T::zero(), c, ldc);
        return;
    }

    let k = if side == Side::Left { m } else { n };
    let effective_lower = (uplo == Fill::Lower) == (trans == Operation::None);
    let bs = TRSM_BLOCK;
    let mut dense = vec![T::zero(); bs * bs];

    for blk in block_ranges(k, bs) {
        let size = blk.len();
        densify_diagonal_block(uplo, diag, size, a.add(blk.start + blk.start * lda), lda, &mut dense);

        match side {
            Side::Left => {
                // C_I = alpha op(A)_II B_I + alpha op(A)_{I,R} B_R
                gemm_kernel(
                    trans,
                    Operation::None,
                    size,
                    n,
                    size,
                    alpha,
                    dense.as_ptr(),
                    bs,
                    b.add(blk.start),
                    ldb,
                    T::zero(),
                    c.add(blk.start),
                    ldc,
                );
                let rest = if effective_lower { 0..blk.start } else { blk.end..k };
                if !rest.is_empty() {
                    gemm_kernel(
                        trans,
                        Operation::None,
                        size,
                        n,
                        rest.len(),
                        alpha,
                        op_block(a, lda, trans, blk.start, rest.start),
                        lda,
                        b.add(rest.start),
                        ldb,
                        T::one(),
                        c.add(blk.start),
                        ldc,
                    );
                }
            }
            _ => {
                // C_J = alpha B_J op(A)_JJ + alpha B_R op(A)_{R,J}
                gemm_kernel(
                    Operation::None,
                    trans,
                    m,
                    size,
                    size,
                    alpha,
                    b.add(blk.start * ldb),
                    ldb,
                    dense.as_ptr(),
                    bs,
                    T::zero(),
                    c.add(blk.start * ldc),
                    ldc,
                );
                let rest = if effective_lower { blk.end..k } else { 0..blk.start };
                if !rest.is_empty() {
                    gemm_kernel(
                        Operation::None,
                        trans,
                        m,
                        size,
                        rest.len(),
                        alpha,
                        b.add(rest.start * ldb),
                        ldb,
                        op_block(a, lda, trans, rest.start, blk.start),
                        lda,
                        T::one(),
                        c.add(blk.start * ldc),
                        ldc,
                    );
                }
            }
        }
    }
}

/// B = alpha op(A) B (left) or B = alpha B op(A) (right), in place
///
/// B is processed in chunks of [`TRMM_CHUNK`] columns (left) or rows
/// (right); each chunk is staged in a local buffer and multiplied back
/// into B with [`trmm_outofplace_kernel`].
///
/// # Safety
/// - `a` valid for K × K (`lda`), `b` valid for m × n (`ldb`)
/// - `b` must not alias `a`
#[allow(clippy::too_many_arguments)]
pub unsafe fn trmm_kernel<T: Element>(
    side: Side,
    uplo: Fill,
    trans: Operation,
    diag: Diagonal,
    m: usize,
    n: usize,
    alpha: T,
    a: *const T,
    lda: usize,
    b: *mut T,
    ldb: usize,
) {
    if m == 0 || n == 0 {
        return;
    }
    if alpha.is_zero() {
        fill_matrix_kernel(m, n, T::zero(), b, ldb);
        return;
    }

    match side {
        Side::Left => {
            let mut scratch = vec![T::zero(); m * TRMM_CHUNK.min(n)];
            for cols in block_ranges(n, TRMM_CHUNK) {
                let chunk = b.add(cols.start * ldb);
                copy_matrix_kernel(m, cols.len(), chunk, ldb, scratch.as_mut_ptr(), m);
                trmm_outofplace_kernel(
                    side,
                    uplo,
                    trans,
                    diag,
                    m,
                    cols.len(),
                    alpha,
                    a,
                    lda,
                    scratch.as_ptr(),
                    m,
                    chunk,
                    ldb,
                );
            }
        }
        _ => {
            let mut scratch = vec![T::zero(); TRMM_CHUNK.min(m) * n];
            for rows in block_ranges(m, TRMM_CHUNK) {
                let chunk = b.add(rows.start);
                let h = rows.len();
                copy_matrix_kernel(h, n, chunk, ldb, scratch.as_mut_ptr(), h);
                trmm_outofplace_kernel(
                    side,
                    uplo,
                    trans,
                    diag,
                    h,
                    n,
                    alpha,
                    a,
                    lda,
                    scratch.as_ptr(),
                    h,
                    chunk,
                    ldb,
                );
            }
        }
    }
}

/// Copy the referenced triangle of a size × size block into `dense` (ld BS)
unsafe fn densify_diagonal_block<T: Element>(
    uplo: Fill,
    diag: Diagonal,
    size: usize,
    a: *const T,
    lda: usize,
    dense: &mut [T],
) {
    let bs = TRSM_BLOCK;
    for j in 0..size {
        for i in 0..size {
            let stored = match uplo {
                Fill::Lower => i >= j,
                _ => i <= j,
            };
            dense[i + j * bs] = if i == j && diag == Diagonal::Unit {
                T::one()
            } else if stored {
                *a.add(i + j * lda)
            } else {
                T::zero()
            };
        }
    }
}
