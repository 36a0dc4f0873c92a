//! CPU kernel implementations
//!
//! Low-level compute kernels over raw device addresses. All matrices are
//! column-major: element (i, j) of a matrix with leading dimension `ld`
//! lives at offset `i + j * ld`. Kernels are generic over `T: Element`.
//!
//! Every kernel is `unsafe`: callers guarantee that each pointer is valid
//! for the region its dimensions and leading dimension describe, and that
//! output regions do not alias inputs unless a kernel says otherwise.

#![allow(unsafe_op_in_unsafe_fn)] // Kernels are already marked unsafe, inner unsafe is redundant

pub mod band;
pub mod gemm;
pub mod packed;
pub mod trmm;
pub mod trsm;
pub mod trtri;

pub use band::{band_index, hbmv_kernel};
pub use gemm::gemm_kernel;
pub use packed::{packed_index, spmv_kernel, tpsv_kernel};
pub use trmm::{trmm_kernel, trmm_outofplace_kernel};
pub use trsm::{TrsmStrategy, trsm_kernel};
pub use trtri::{trtri_blocks_kernel, trtri_kernel};

use crate::dtype::Element;
use crate::ops::Operation;

/// Memory offset of logical element `k` of an n-vector with increment `inc`
///
/// With a negative increment logical element 0 sits at the far end.
#[inline]
pub(crate) fn vec_offset(k: usize, n: usize, inc: i64) -> usize {
    let step = inc.unsigned_abs() as usize;
    if inc > 0 { k * step } else { (n - 1 - k) * step }
}

/// Element `op(A)(i, j)`
#[inline]
pub(crate) unsafe fn load_op<T: Element>(
    a: *const T,
    lda: usize,
    op: Operation,
    i: usize,
    j: usize,
) -> T {
    match op {
        Operation::None => *a.add(i + j * lda),
        Operation::Transpose => *a.add(j + i * lda),
        Operation::ConjugateTranspose => (*a.add(j + i * lda)).conj(),
    }
}

/// Address of the source block holding `op(A)[row0.., col0..]`
#[inline]
pub(crate) unsafe fn op_block<T>(
    a: *const T,
    lda: usize,
    op: Operation,
    row0: usize,
    col0: usize,
) -> *const T {
    match op {
        Operation::None => a.add(row0 + col0 * lda),
        Operation::Transpose | Operation::ConjugateTranspose => a.add(col0 + row0 * lda),
    }
}

/// Copy an m × n matrix
///
/// # Safety
/// `src` and `dst` must be valid for their regions and must not overlap.
pub unsafe fn copy_matrix_kernel<T: Copy>(
    m: usize,
    n: usize,
    src: *const T,
    lds: usize,
    dst: *mut T,
    ldd: usize,
) {
    for j in 0..n {
        std::ptr::copy_nonoverlapping(src.add(j * lds), dst.add(j * ldd), m);
    }
}

/// Set every element of an m × n matrix to `value`
///
/// # Safety
/// `dst` must be valid for the m × n region with leading dimension `ld`.
pub unsafe fn fill_matrix_kernel<T: Copy>(m: usize, n: usize, value: T, dst: *mut T, ld: usize) {
    for j in 0..n {
        let col = dst.add(j * ld);
        for i in 0..m {
            *col.add(i) = value;
        }
    }
}

/// True when every element of the m × n region is finite
///
/// # Safety
/// `a` must be valid for the m × n region with leading dimension `ld`.
pub unsafe fn all_finite_kernel<T: Element>(m: usize, n: usize, a: *const T, ld: usize) -> bool {
    (0..n).all(|j| (0..m).all(|i| (*a.add(i + j * ld)).is_finite()))
}

/// `1 / x`, or zero when that would not be finite
///
/// Singular triangular blocks are not reported; this keeps their inverse
/// finite instead.
#[inline]
pub(crate) fn safe_recip<T: Element>(x: T) -> T {
    if x.is_zero() {
        return T::zero();
    }
    let r = T::one() / x;
    if r.is_finite() { r } else { T::zero() }
}
