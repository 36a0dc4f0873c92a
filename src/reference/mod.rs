//! Reference oracle
//!
//! Straightforward host implementations of every routine, used to judge
//! the blocked engine. They favour obviousness over speed: triangular
//! operands are expanded to a dense `op(A)` first and then solved by plain
//! forward or backward substitution.
//!
//! All matrices are column-major host slices, element (i, j) at
//! `i + j * ld`. Vector increments follow the BLAS convention (negative
//! increments start at the far end).

use crate::dtype::{ComplexElement, Element};
use crate::ops::{Diagonal, Fill, Operation, Side};

fn at<T: Element>(a: &[T], ld: usize, i: usize, j: usize) -> T {
    a[i + j * ld]
}

fn op_at<T: Element>(a: &[T], ld: usize, op: Operation, i: usize, j: usize) -> T {
    match op {
        Operation::None => at(a, ld, i, j),
        Operation::Transpose => at(a, ld, j, i),
        Operation::ConjugateTranspose => at(a, ld, j, i).conj(),
    }
}

fn vec_index(k: usize, n: usize, inc: i64) -> usize {
    let step = inc.unsigned_abs() as usize;
    if inc > 0 { k * step } else { (n - 1 - k) * step }
}

/// Dense k × k `op(A)` of a triangular A: zeros outside the triangle,
/// ones on a unit diagonal
fn dense_op<T: Element>(uplo: Fill, trans: Operation, diag: Diagonal, k: usize, a: &[T], lda: usize) -> Vec<T> {
    let mut tri = vec![T::zero(); k * k];
    for j in 0..k {
        for i in 0..k {
            let stored = match uplo {
                Fill::Lower => i >= j,
                _ => i <= j,
            };
            if i == j && diag == Diagonal::Unit {
                tri[i + j * k] = T::one();
            } else if stored {
                tri[i + j * k] = at(a, lda, i, j);
            }
        }
    }
    let mut out = vec![T::zero(); k * k];
    for j in 0..k {
        for i in 0..k {
            out[i + j * k] = op_at(&tri, k, trans, i, j);
        }
    }
    out
}

/// Whether `op(A)` is lower triangular
fn effective_lower(uplo: Fill, trans: Operation) -> bool {
    (uplo == Fill::Lower) == (trans == Operation::None)
}

/// Solve `t x = rhs` in place for a dense triangular t (ld k)
fn substitute<T: Element>(t: &[T], k: usize, lower: bool, x: &mut [T]) {
    if lower {
        for i in 0..k {
            let mut s = x[i];
            for l in 0..i {
                s = s - t[i + l * k] * x[l];
            }
            x[i] = s / t[i + i * k];
        }
    } else {
        for i in (0..k).rev() {
            let mut s = x[i];
            for l in i + 1..k {
                s = s - t[i + l * k] * x[l];
            }
            x[i] = s / t[i + i * k];
        }
    }
}

/// `C := alpha op(A) op(B) + beta C`
#[allow(clippy::too_many_arguments)]
pub fn ref_gemm<T: Element>(
    trans_a: Operation,
    trans_b: Operation,
    m: usize,
    n: usize,
    k: usize,
    alpha: T,
    a: &[T],
    lda: usize,
    b: &[T],
    ldb: usize,
    beta: T,
    c: &mut [T],
    ldc: usize,
) {
    for j in 0..n {
        for i in 0..m {
            let mut s = T::zero();
            for l in 0..k {
                s = s + op_at(a, lda, trans_a, i, l) * op_at(b, ldb, trans_b, l, j);
            }
            let prior = if beta.is_zero() { T::zero() } else { beta * c[i + j * ldc] };
            c[i + j * ldc] = alpha * s + prior;
        }
    }
}

/// `B := alpha op(A)^-1 B` (left) or `B := alpha B op(A)^-1` (right)
#[allow(clippy::too_many_arguments)]
pub fn ref_trsm<T: Element>(
    side: Side,
    uplo: Fill,
    trans: Operation,
    diag: Diagonal,
    m: usize,
    n: usize,
    alpha: T,
    a: &[T],
    lda: usize,
    b: &mut [T],
    ldb: usize,
) {
    let k = if side == Side::Left { m } else { n };
    let t = dense_op(uplo, trans, diag, k, a, lda);
    let lower = effective_lower(uplo, trans);
    match side {
        Side::Left => {
            let mut col = vec![T::zero(); m];
            for j in 0..n {
                for i in 0..m {
                    col[i] = alpha * b[i + j * ldb];
                }
                substitute(&t, m, lower, &mut col);
                for i in 0..m {
                    b[i + j * ldb] = col[i];
                }
            }
        }
        _ => {
            // x t = alpha b  <=>  t^T x^T = alpha b^T
            let mut tt = vec![T::zero(); n * n];
            for j in 0..n {
                for i in 0..n {
                    tt[i + j * n] = t[j + i * n];
                }
            }
            let mut row = vec![T::zero(); n];
            for i in 0..m {
                for j in 0..n {
                    row[j] = alpha * b[i + j * ldb];
                }
                substitute(&tt, n, !lower, &mut row);
                for j in 0..n {
                    b[i + j * ldb] = row[j];
                }
            }
        }
    }
}

/// `B := alpha op(A) B` (left) or `B := alpha B op(A)` (right)
#[allow(clippy::too_many_arguments)]
pub fn ref_trmm<T: Element>(
    side: Side,
    uplo: Fill,
    trans: Operation,
    diag: Diagonal,
    m: usize,
    n: usize,
    alpha: T,
    a: &[T],
    lda: usize,
    b: &mut [T],
    ldb: usize,
) {
    let k = if side == Side::Left { m } else { n };
    let t = dense_op(uplo, trans, diag, k, a, lda);
    let mut src = vec![T::zero(); m * n];
    for j in 0..n {
        for i in 0..m {
            src[i + j * m] = b[i + j * ldb];
        }
    }
    match side {
        Side::Left => ref_gemm(Operation::None, Operation::None, m, n, m, alpha, &t, m, &src, m, T::zero(), b, ldb),
        _ => ref_gemm(Operation::None, Operation::None, m, n, n, alpha, &src, m, &t, n, T::zero(), b, ldb),
    }
}

/// Full inverse of the `uplo` triangle of A into `inv` (n × n, `ldinv`)
///
/// The opposite triangle of `inv` is zero and a unit diagonal is explicit.
pub fn ref_trtri<T: Element>(
    uplo: Fill,
    diag: Diagonal,
    n: usize,
    a: &[T],
    lda: usize,
    inv: &mut [T],
    ldinv: usize,
) {
    let mut id = vec![T::zero(); n * n];
    for i in 0..n {
        id[i + i * n] = T::one();
    }
    ref_trsm(Side::Left, uplo, Operation::None, diag, n, n, T::one(), a, lda, &mut id, n);
    for j in 0..n {
        for i in 0..n {
            inv[i + j * ldinv] = id[i + j * n];
        }
    }
}

/// Expand a packed triangle into a dense n × n matrix (ld n)
fn unpack<T: Element>(uplo: Fill, n: usize, ap: &[T]) -> Vec<T> {
    let mut a = vec![T::zero(); n * n];
    let mut p = 0;
    for j in 0..n {
        let rows = match uplo {
            Fill::Lower => j..n,
            _ => 0..j + 1,
        };
        for i in rows {
            a[i + j * n] = ap[p];
            p += 1;
        }
    }
    a
}

/// Solve `op(A) x = b` for packed triangular A, b overwritten by x
#[allow(clippy::too_many_arguments)]
pub fn ref_tpsv<T: Element>(
    uplo: Fill,
    trans: Operation,
    diag: Diagonal,
    n: usize,
    ap: &[T],
    x: &mut [T],
    incx: i64,
) {
    let t = dense_op(uplo, trans, diag, n, &unpack(uplo, n, ap), n);
    let mut v: Vec<T> = (0..n).map(|k| x[vec_index(k, n, incx)]).collect();
    substitute(&t, n, effective_lower(uplo, trans), &mut v);
    for (k, value) in v.into_iter().enumerate() {
        x[vec_index(k, n, incx)] = value;
    }
}

/// `y := alpha A x + beta y` for symmetric packed A
#[allow(clippy::too_many_arguments)]
pub fn ref_spmv<T: Element>(
    uplo: Fill,
    n: usize,
    alpha: T,
    ap: &[T],
    x: &[T],
    incx: i64,
    beta: T,
    y: &mut [T],
    incy: i64,
) {
    let tri = unpack(uplo, n, ap);
    let sym = |i: usize, j: usize| {
        let (r, c) = match uplo {
            Fill::Lower => (i.max(j), i.min(j)),
            _ => (i.min(j), i.max(j)),
        };
        tri[r + c * n]
    };
    for i in 0..n {
        let mut s = T::zero();
        for j in 0..n {
            s = s + sym(i, j) * x[vec_index(j, n, incx)];
        }
        let yi = &mut y[vec_index(i, n, incy)];
        let prior = if beta.is_zero() { T::zero() } else { beta * *yi };
        *yi = alpha * s + prior;
    }
}

/// `y := alpha A x + beta y` for Hermitian A in (k+1) × n band storage
///
/// The band is expanded to a dense Hermitian matrix first; the diagonal
/// keeps only its real part.
#[allow(clippy::too_many_arguments)]
pub fn ref_hbmv<T: ComplexElement>(
    uplo: Fill,
    n: usize,
    k: usize,
    alpha: T,
    a: &[T],
    lda: usize,
    x: &[T],
    incx: i64,
    beta: T,
    y: &mut [T],
    incy: i64,
) {
    let mut full = vec![T::zero(); n * n];
    for j in 0..n {
        let rows = match uplo {
            Fill::Lower => j..n.min(j + k + 1),
            _ => j.saturating_sub(k)..j + 1,
        };
        for i in rows {
            let row = match uplo {
                Fill::Lower => i - j,
                _ => k + i - j,
            };
            let v = at(a, lda, row, j);
            if i == j {
                full[i + j * n] = v.real_part();
            } else {
                full[i + j * n] = v;
                full[j + i * n] = v.conj();
            }
        }
    }
    for i in 0..n {
        let mut s = T::zero();
        for j in 0..n {
            s = s + full[i + j * n] * x[vec_index(j, n, incx)];
        }
        let yi = &mut y[vec_index(i, n, incy)];
        let prior = if beta.is_zero() { T::zero() } else { beta * *yi };
        *yi = alpha * s + prior;
    }
}

/// Relative 1-norm of `x - y`: `|x - y|_1 / |x|_1`, both m × n
///
/// The 1-norm is the largest absolute column sum. `x` is the expected
/// matrix; when it is all zero the absolute norm of the difference is
/// returned.
pub fn matrix_norm_1<T: Element>(m: usize, n: usize, x: &[T], ldx: usize, y: &[T], ldy: usize) -> f64 {
    let mut diff_max = 0.0f64;
    let mut ref_max = 0.0f64;
    for j in 0..n {
        let mut diff = 0.0;
        let mut base = 0.0;
        for i in 0..m {
            let xv = x[i + j * ldx];
            diff += (xv - y[i + j * ldy]).magnitude();
            base += xv.magnitude();
        }
        diff_max = diff_max.max(diff);
        ref_max = ref_max.max(base);
    }
    if ref_max == 0.0 { diff_max } else { diff_max / ref_max }
}

/// Relative 1-norm of `x - y` for n-vectors with their increments
pub fn vector_norm_1<T: Element>(n: usize, x: &[T], incx: i64, y: &[T], incy: i64) -> f64 {
    let (diff, base) = (0..n).fold((0.0f64, 0.0f64), |(d, b), k| {
        let xv = x[vec_index(k, n, incx)];
        (d + (xv - y[vec_index(k, n, incy)]).magnitude(), b + xv.magnitude())
    });
    if base == 0.0 { diff } else { diff / base }
}
