//! General matrix multiply used for every off-diagonal block update

use super::load_op;
use crate::dtype::Element;
use crate::ops::Operation;

/// Column-major GEMM: C = alpha * op(A) * op(B) + beta * C
///
/// `op(A)` is m × k and `op(B)` is k × n. When `beta` is zero, C is
/// overwritten without being read, so stale NaNs in C do not leak through.
///
/// # Arguments
/// * `a` - Pointer to A, leading dimension `lda`
/// * `b` - Pointer to B, leading dimension `ldb`
/// * `c` - Pointer to C (m × n), leading dimension `ldc`
///
/// # Safety
/// - All pointers must be valid for the specified dimensions and strides
/// - `c` must not alias with `a` or `b`
#[allow(clippy::too_many_arguments)]
pub unsafe fn gemm_kernel<T: Element>(
    trans_a: Operation,
    trans_b: Operation,
    m: usize,
    n: usize,
    k: usize,
    alpha: T,
    a: *const T,
    lda: usize,
    b: *const T,
    ldb: usize,
    beta: T,
    c: *mut T,
    ldc: usize,
) {
    if m == 0 || n == 0 {
        return;
    }

    for j in 0..n {
        let c_col = c.add(j * ldc);
        scale_column(c_col, m, beta);
        if k == 0 || alpha.is_zero() {
            continue;
        }

        match trans_a {
            // axpy form: walks columns of A contiguously
            Operation::None => {
                for l in 0..k {
                    let t = alpha * load_op(b, ldb, trans_b, l, j);
                    if t.is_zero() {
                        continue;
                    }
                    let a_col = a.add(l * lda);
                    for i in 0..m {
                        let out = c_col.add(i);
                        *out = *out + t * *a_col.add(i);
                    }
                }
            }
            // dot form: op(A) row i is column i of A
            Operation::Transpose | Operation::ConjugateTranspose => {
                let conj = trans_a == Operation::ConjugateTranspose;
                for i in 0..m {
                    let a_col = a.add(i * lda);
                    let mut acc = T::zero();
                    for l in 0..k {
                        let av = *a_col.add(l);
                        let av = if conj { av.conj() } else { av };
                        acc = acc + av * load_op(b, ldb, trans_b, l, j);
                    }
                    let out = c_col.add(i);
                    *out = *out + alpha * acc;
                }
            }
        }
    }
}

#[inline]
unsafe fn scale_column<T: Element>(col: *mut T, m: usize, beta: T) {
    if beta.is_one() {
        return;
    }
    if beta.is_zero() {
        for i in 0..m {
            *col.add(i) = T::zero();
        }
    } else {
        for i in 0..m {
            *col.add(i) = beta * *col.add(i);
        }
    }
}
