//! Packed-storage level 2 kernels (TPSV, SPMV)
//!
//! Packed matrices store one triangle column by column: n(n+1)/2 elements.
//! Vector increments follow the BLAS convention: with a negative increment
//! the pointer still addresses the lowest element in memory and logical
//! element 0 sits at the far end.

use super::vec_offset;
use crate::dtype::Element;
use crate::ops::{Diagonal, Fill, Operation};

/// Offset of stored element (i, j) of an n × n packed matrix
///
/// `(i, j)` must lie in the stored triangle.
#[inline]
pub fn packed_index(uplo: Fill, n: usize, i: usize, j: usize) -> usize {
    match uplo {
        Fill::Lower => i - j + j * (2 * n - j + 1) / 2,
        _ => i + j * (j + 1) / 2,
    }
}

/// Element (i, j) of the full matrix described by a packed triangle
#[inline]
unsafe fn packed_triangular<T: Element>(uplo: Fill, n: usize, ap: *const T, i: usize, j: usize) -> T {
    let stored = match uplo {
        Fill::Lower => i >= j,
        _ => i <= j,
    };
    if stored {
        *ap.add(packed_index(uplo, n, i, j))
    } else {
        T::zero()
    }
}

/// Solve op(A) x = b for packed triangular A, b overwritten by x
///
/// Singular diagonals are not detected; the division produces inf/NaN
/// exactly as plain substitution would.
///
/// # Safety
/// - `ap` valid for n(n+1)/2 elements
/// - `x` valid for `1 + (n-1)*|incx|` elements, `incx != 0`
pub unsafe fn tpsv_kernel<T: Element>(
    uplo: Fill,
    trans: Operation,
    diag: Diagonal,
    n: usize,
    ap: *const T,
    x: *mut T,
    incx: i64,
) {
    if n == 0 {
        return;
    }
    let op_at = |i: usize, j: usize| match trans {
        Operation::None => packed_triangular(uplo, n, ap, i, j),
        Operation::Transpose => packed_triangular(uplo, n, ap, j, i),
        Operation::ConjugateTranspose => packed_triangular(uplo, n, ap, j, i).conj(),
    };
    let xi = |k: usize| x.add(vec_offset(k, n, incx));

    let effective_lower = (uplo == Fill::Lower) == (trans == Operation::None);
    let order: Box<dyn Iterator<Item = usize>> = if effective_lower {
        Box::new(0..n)
    } else {
        Box::new((0..n).rev())
    };

    for i in order {
        let mut s = *xi(i);
        let solved: Box<dyn Iterator<Item = usize>> = if effective_lower {
            Box::new(0..i)
        } else {
            Box::new(i + 1..n)
        };
        for j in solved {
            s = s - op_at(i, j) * *xi(j);
        }
        if diag == Diagonal::NonUnit {
            s = s / op_at(i, i);
        }
        *xi(i) = s;
    }
}

/// y = alpha A x + beta y for symmetric packed A
///
/// With `beta == 0` y is overwritten without being read.
///
/// # Safety
/// - `ap` valid for n(n+1)/2 elements
/// - `x`, `y` valid for their increments, and `y` must not alias `x` or `ap`
#[allow(clippy::too_many_arguments)]
pub unsafe fn spmv_kernel<T: Element>(
    uplo: Fill,
    n: usize,
    alpha: T,
    ap: *const T,
    x: *const T,
    incx: i64,
    beta: T,
    y: *mut T,
    incy: i64,
) {
    for i in 0..n {
        let mut acc = T::zero();
        if !alpha.is_zero() {
            for j in 0..n {
                let (r, c) = match uplo {
                    Fill::Lower if i < j => (j, i),
                    Fill::Lower => (i, j),
                    _ if i > j => (j, i),
                    _ => (i, j),
                };
                acc = acc + *ap.add(packed_index(uplo, n, r, c)) * *x.add(vec_offset(j, n, incx));
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packed_index() {
        // upper 3x3: (0,0) (0,1) (1,1) (0,2) (1,2) (2,2)
        assert_eq!(packed_index(Fill::Upper, 3, 1, 2), 4);
        // lower 3x3: (0,0) (1,0) (2,0) (1,1) (2,1) (2,2)
        assert_eq!(packed_index(Fill::Lower, 3, 2, 1), 4);
        assert_eq!(packed_index(Fill::Lower, 3, 2, 2), 5);
    }

    #[test]
    fn test_tpsv_lower_forward() {
        // L = [2 0; 1 4], x = [1, 1] -> b = [2, 5]
        let ap = [2.0, 1.0, 4.0];
        let mut x = [2.0, 5.0];
        unsafe {
            tpsv_kernel(Fill::Lower, Operation::None, Diagonal::NonUnit, 2, ap.as_ptr(), x.as_mut_ptr(), 1);
        }
        assert_eq!(x, [1.0, 1.0]);
    }

    #[test]
    fn test_tpsv_negative_increment() {
        // same system, logical element 0 stored last with stride 2
        let ap = [2.0, 1.0, 4.0];
        let mut x = [5.0, -1.0, 2.0];
        unsafe {
            tpsv_kernel(Fill::Lower, Operation::None, Diagonal::NonUnit, 2, ap.as_ptr(), x.as_mut_ptr(), -2);
        }
        assert_eq!(x, [1.0, -1.0, 1.0]);
    }

    #[test]
    fn test_tpsv_upper_transposed_unit() {
        // U = [1 3; 0 1] (unit), U^T x = b with x = [1, 2] -> b = [1, 5]
        let ap = [f64::NAN, 3.0, f64::NAN];
        let mut x = [1.0, 5.0];
        unsafe {
            tpsv_kernel(Fill::Upper, Operation::Transpose, Diagonal::Unit, 2, ap.as_ptr(), x.as_mut_ptr(), 1);
        }
        assert_eq!(x, [1.0, 2.0]);
    }

    #[test]
    fn test_spmv_symmetric() {
        // A = [1 2; 2 3] stored upper: [1, 2, 3]
        let ap = [1.0, 2.0, 3.0];
        let x = [1.0, 1.0];
        let mut y = [f64::NAN, f64::NAN];
        unsafe {
            spmv_kernel(Fill::Upper, 2, 2.0, ap.as_ptr(), x.as_ptr(), 1, 0.0, y.as_mut_ptr(), 1);
        }
        assert_eq!(y, [6.0, 10.0]);
    }
}
