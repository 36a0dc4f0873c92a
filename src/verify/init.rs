//! Deterministic test-matrix generators
//!
//! Every generator draws from a caller-provided RNG, so a fixed seed
//! (`StdRng::seed_from_u64`) reproduces the same operands on every run and
//! every device. Complex element types get an independent imaginary part.

use crate::dtype::Element;
use crate::ops::Fill;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// RNG for reproducible fixtures
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

fn sample<T: Element, R: Rng>(rng: &mut R) -> T {
    T::from_parts(rng.random_range(-1.0..1.0), rng.random_range(-1.0..1.0))
}

/// m × n matrix (leading dimension `ld`) of values in [-1, 1)
///
/// Rows `m..ld` of each column are padding and hold zeros.
pub fn general_matrix<T: Element, R: Rng>(rng: &mut R, m: usize, n: usize, ld: usize) -> Vec<T> {
    assert!(ld >= m, "ld ({ld}) < m ({m})");
    let mut a = vec![T::zero(); ld * n];
    for j in 0..n {
        for i in 0..m {
            a[i + j * ld] = sample(rng);
        }
    }
    a
}

/// k × k matrix whose `uplo` triangle is strictly diagonally dominant
///
/// Each diagonal entry exceeds the sum of the magnitudes of its row and
/// column within the triangle, so the triangle is well conditioned under
/// every `op`. The unreferenced triangle is filled with random values too,
/// which a correct triangular routine never reads.
pub fn diagonally_dominant_triangular<T: Element, R: Rng>(
    rng: &mut R,
    uplo: Fill,
    k: usize,
    lda: usize,
) -> Vec<T> {
    let mut a: Vec<T> = general_matrix(rng, k, k, lda);
    let in_triangle = |i: usize, j: usize| match uplo {
        Fill::Lower => i > j,
        _ => i < j,
    };
    for d in 0..k {
        let off: f64 = (0..k)
            .filter(|&l| l != d)
            .map(|l| {
                let row = if in_triangle(d, l) { a[d + l * lda].magnitude() } else { 0.0 };
                let col = if in_triangle(l, d) { a[l + d * lda].magnitude() } else { 0.0 };
                row + col
            })
            .sum();
        let sign = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
        a[d + d * lda] = T::from_f64(sign * (1.0 + off));
    }
    a
}

/// Scale the `uplo` triangle for a unit-diagonal solve
///
/// Off-diagonal entries of each column are divided by that column's
/// diagonal magnitude, keeping the unit-diagonal matrix well conditioned.
/// The stored diagonal is left as it is; unit-diagonal routines never read
/// it.
pub fn make_unit_diagonal<T: Element>(uplo: Fill, a: &mut [T], lda: usize, k: usize) {
    for j in 0..k {
        let d = a[j + j * lda].magnitude();
        if d == 0.0 {
            continue;
        }
        let scale = T::from_f64(1.0 / d);
        let rows = match uplo {
            Fill::Lower => j + 1..k,
            _ => 0..j,
        };
        for i in rows {
            a[i + j * lda] = a[i + j * lda] * scale;
        }
    }
}

/// Pack the `uplo` triangle of an n × n matrix column by column
pub fn regular_to_packed<T: Element>(uplo: Fill, a: &[T], lda: usize, n: usize) -> Vec<T> {
    let mut ap = Vec::with_capacity(n * (n + 1) / 2);
    for j in 0..n {
        let rows = match uplo {
            Fill::Lower => j..n,
            _ => 0..j + 1,
        };
        ap.extend(rows.map(|i| a[i + j * lda]));
    }
    ap
}

/// Packed `uplo` triangle of a random symmetric n × n matrix
pub fn symmetric_packed<T: Element, R: Rng>(rng: &mut R, n: usize) -> Vec<T> {
    (0..n * (n + 1) / 2).map(|_| sample(rng)).collect()
}
