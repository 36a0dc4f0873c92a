//! Common test utilities
#![allow(dead_code)]

use numr_blas::dtype::Element;
use numr_blas::handle::Handle;
use numr_blas::ops::{Diagonal, Fill, Operation, Side};
use numr_blas::reference::{matrix_norm_1, ref_trmm};
use numr_blas::runtime::DeviceBuffer;
use numr_blas::runtime::cpu::CpuDevice;
use numr_blas::verify::{
    ERROR_EPS_MULTIPLIER, RESIDUAL_EPS_MULTIPLIER, diagonally_dominant_triangular, general_matrix,
    make_unit_diagonal, seeded_rng, trsm_err_res_check,
};

/// Create a handle on a fresh CPU device for testing
pub fn create_handle() -> Handle {
    Handle::new(CpuDevice::new())
}

/// Upload host data to the handle's device
pub fn upload<T: bytemuck::Pod>(handle: &Handle, data: &[T]) -> DeviceBuffer<T> {
    DeviceBuffer::from_host(handle.client(), data).unwrap()
}

/// Assert two f64 slices are close within tolerance
///
/// Uses the formula: |a - b| <= atol + rtol * |b|
pub fn assert_allclose_f64(a: &[f64], b: &[f64], rtol: f64, atol: f64, msg: &str) {
    assert_eq!(a.len(), b.len(), "{}: length mismatch", msg);
    for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
        let diff = (x - y).abs();
        let tol = atol + rtol * y.abs();
        assert!(
            diff <= tol,
            "{}: element {} differs: {} vs {} (diff={}, tol={})",
            msg,
            i,
            x,
            y,
            diff,
            tol
        );
    }
}

/// A solve with a known answer
pub struct TrsmCase<T> {
    pub side: Side,
    pub uplo: Fill,
    pub trans: Operation,
    pub diag: Diagonal,
    pub m: usize,
    pub n: usize,
    pub lda: usize,
    pub ldb: usize,
    pub alpha: T,
    /// Triangular operand, K × K at lda
    pub a: Vec<T>,
    /// Expected solution, m × n at ldb
    pub x: Vec<T>,
    /// Right-hand side, m × n at ldb: op(A) X / alpha (or X op(A) / alpha)
    pub b: Vec<T>,
}

impl<T: Element> TrsmCase<T> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        seed: u64,
        side: Side,
        uplo: Fill,
        trans: Operation,
        diag: Diagonal,
        m: usize,
        n: usize,
        alpha: T,
    ) -> Self {
        let mut rng = seeded_rng(seed);
        let k = if side == Side::Left { m } else { n };
        let (lda, ldb) = (k + 3, m + 2);
        let mut a = diagonally_dominant_triangular(&mut rng, uplo, k, lda);
        if diag == Diagonal::Unit {
            make_unit_diagonal(uplo, &mut a, lda, k);
        }
        let x = general_matrix(&mut rng, m, n, ldb);
        let mut b = x.clone();
        ref_trmm(side, uplo, trans, diag, m, n, T::one() / alpha, &a, lda, &mut b, ldb);
        Self {
            side,
            uplo,
            trans,
            diag,
            m,
            n,
            lda,
            ldb,
            alpha,
            a,
            x,
            b,
        }
    }

    /// Check a computed solution by forward error and residual
    pub fn check(&self, computed: &[T]) {
        let eps = T::EPSILON;
        let err = matrix_norm_1(self.m, self.n, &self.x, self.ldb, computed, self.ldb);
        trsm_err_res_check(err, self.m, ERROR_EPS_MULTIPLIER, eps)
            .unwrap_or_else(|e| panic!("forward error, {}: {e}", self.describe()));

        let mut back = computed.to_vec();
        ref_trmm(
            self.side,
            self.uplo,
            self.trans,
            self.diag,
            self.m,
            self.n,
            T::one() / self.alpha,
            &self.a,
            self.lda,
            &mut back,
            self.ldb,
        );
        let res = matrix_norm_1(self.m, self.n, &self.b, self.ldb, &back, self.ldb);
        trsm_err_res_check(res, self.m, RESIDUAL_EPS_MULTIPLIER, eps)
            .unwrap_or_else(|e| panic!("residual, {}: {e}", self.describe()));
    }

    pub fn describe(&self) -> String {
        format!(
            "side={} uplo={} trans={} diag={} m={} n={}",
            self.side, self.uplo, self.trans, self.diag, self.m, self.n
        )
    }
}

/// Every legal (side, uplo, trans, diag) combination
pub fn all_modes() -> Vec<(Side, Fill, Operation, Diagonal)> {
    let mut modes = Vec::new();
    for side in [Side::Left, Side::Right] {
        for uplo in [Fill::Lower, Fill::Upper] {
            for trans in [Operation::None, Operation::Transpose, Operation::ConjugateTranspose] {
                for diag in [Diagonal::NonUnit, Diagonal::Unit] {
                    modes.push((side, uplo, trans, diag));
                }
            }
        }
    }
    modes
}
