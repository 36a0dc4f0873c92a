//! Banded-storage level 2 kernels (HBMV)
//!
//! An n × n band matrix with k super- (or sub-) diagonals is stored in a
//! (k+1) × n array, column by column:
//!
//! - upper: element (i, j), `j-k <= i <= j`, at row `k + i - j` of column j
//! - lower: element (i, j), `j <= i <= j+k`, at row `i - j` of column j
//!
//! The corners of the array outside the band are never read.

use super::vec_offset;
use crate::dtype::ComplexElement;
use crate::ops::Fill;

/// Band-array offset of stored element (i, j)
///
/// `(i, j)` must lie in the stored triangle of the band.
#[inline]
pub fn band_index(uplo: Fill, k: usize, lda: usize, i: usize, j: usize) -> usize {
    match uplo {
        Fill::Lower => (i - j) + j * lda,
        _ => (k + i - j) + j * lda,
    }
}

/// y = alpha A x + beta y for Hermitian banded A
///
/// The imaginary part of the stored diagonal is ignored. With
/// `beta == 0` y is overwritten without being read; with `alpha == 0`
/// neither A nor x is read.
///
/// # Safety
/// - `a` valid for a (k+1) × n band array with leading dimension `lda`
/// - `x`, `y` valid for their increments, and `y` must not alias `x` or `a`
#[allow(clippy::too_many_arguments)]
pub unsafe fn hbmv_kernel<T: ComplexElement>(
    uplo: Fill,
    n: usize,
    k: usize,
    alpha: T,
    a: *const T,
    lda: usize,
    x: *const T,
    incx: i64,
    beta: T,
    y: *mut T,
    incy: i64,
) {
    let hermitian = |i: usize, j: usize| -> T {
        let stored_here = match uplo {
            Fill::Lower => i >= j,
            _ => i <= j,
        };
        if i == j {
            (*a.add(band_index(uplo, k, lda, i, i))).real_part()
        } else if stored_here {
            *a.add(band_index(uplo, k, lda, i, j))
        } else {
            (*a.add(band_index(uplo, k, lda, j, i))).conj()
        }
    };

    for i in 0..n {
        let mut acc = T::zero();
        if !alpha.is_zero() {
            for j in i.saturating_sub(k)..n.min(i.saturating_add(k).saturating_add(1)) {
                acc = acc + hermitian(i, j) * *x.add(vec_offset(j, n, incx));
            }
        }
        let out = y.add(vec_offset(i, n, incy));
        let prior = if beta.is_zero() {
            T::zero()
        } else {
            beta * *out
        };
        *out = prior + alpha * acc;
    }
}
