//! Triangular inversion kernels

use super::safe_recip;
use crate::algorithm::TRSM_BLOCK;
use crate::dtype::Element;
use crate::ops::{Diagonal, Fill};

/// Invert an n × n triangular matrix: out = A^-1
///
/// Column-by-column (unblocked) inversion. The whole n × n region of `out`
/// is written: the opposite triangle is zeroed and a unit diagonal is
/// stored as explicit ones. For `Diagonal::Unit` the diagonal of A is never
/// read. Singular pivots yield a finite (zero) reciprocal rather than an
/// error.
///
/// # Safety
/// - `a` must be valid for n × n with leading dimension `lda`
/// - `out` must be valid for n × n with leading dimension `ldo` and must not
///   alias `a`
pub unsafe fn trtri_kernel<T: Element>(
    uplo: Fill,
    diag: Diagonal,
    n: usize,
    a: *const T,
    lda: usize,
    out: *mut T,
    ldo: usize,
) {
    let a_at = |i: usize, j: usize| *a.add(i + j * lda);
    let pivot = |j: usize| match diag {
        Diagonal::Unit => T::one(),
        Diagonal::NonUnit => safe_recip(a_at(j, j)),
    };

    match uplo {
        Fill::Lower => {
            for j in (0..n).rev() {
                let d = pivot(j);
                let col = out.add(j * ldo);
                for i in 0..j {
                    *col.add(i) = T::zero();
                }
                *col.add(j) = d;
                // out(i, j) = -d * sum_{l=j+1..=i} out(i, l) * a(l, j)
                for i in j + 1..n {
                    let mut s = T::zero();
                    for l in j + 1..=i {
                        s = s + *out.add(i + l * ldo) * a_at(l, j);
                    }
                    *col.add(i) = -(d * s);
                }
            }
        }
        _ => {
            for j in 0..n {
                let d = pivot(j);
                let col = out.add(j * ldo);
                // out(i, j) = -d * sum_{l=i..j} out(i, l) * a(l, j)
                for i in 0..j {
                    let mut s = T::zero();
                    for l in i..j {
                        s = s + *out.add(i + l * ldo) * a_at(l, j);
                    }
                    *col.add(i) = -(d * s);
                }
                *col.add(j) = d;
                for i in j + 1..n {
                    *col.add(i) = T::zero();
                }
            }
        }
    }
}

/// Invert each diagonal block of a K-order triangular matrix
///
/// Block `b` covers rows and columns `[b*BS, min((b+1)*BS, K))` and is
/// written to `inv_a + b*BS*BS` with leading dimension BS. The final
/// partial block is inverted at its own size; the padding of its slot is
/// left untouched.
///
/// # Safety
/// - `a` must be valid for K × K with leading dimension `lda`
/// - `inv_a` must hold `BS * roundup(K, BS)` elements and not alias `a`
pub unsafe fn trtri_blocks_kernel<T: Element>(
    uplo: Fill,
    diag: Diagonal,
    k: usize,
    a: *const T,
    lda: usize,
    inv_a: *mut T,
) {
    let bs = TRSM_BLOCK;
    for (b, r0) in (0..k).step_by(bs).enumerate() {
        let size = bs.min(k - r0);
        trtri_kernel(
            uplo,
            diag,
            size,
            a.add(r0 + r0 * lda),
            lda,
            inv_a.add(b * bs * bs),
            bs,
        );
    }
}
