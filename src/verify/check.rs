//! Accuracy checks for computed solutions
//!
//! A solve is judged twice: the forward error against the known solution
//! and the residual after multiplying the computed solution back. Both are
//! relative 1-norms (see [`crate::reference::matrix_norm_1`]) and must stay
//! within a multiple of the element type's machine epsilon.

use thiserror::Error;

/// Multiplier of epsilon allowed for the forward error
pub const ERROR_EPS_MULTIPLIER: f64 = 40.0;

/// Multiplier of epsilon allowed for the residual
pub const RESIDUAL_EPS_MULTIPLIER: f64 = 40.0;

/// A measured error above its tolerance
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("error {err:e} exceeds tolerance {tolerance:e} (m = {m})")]
pub struct ToleranceExceeded {
    /// Measured relative error
    pub err: f64,
    /// Allowed relative error
    pub tolerance: f64,
    /// Order of the problem
    pub m: usize,
}

/// Tolerance for a relative error of an order-`m` solve
///
/// Linear in the order: `||X - X'|| / (||X|| * m * eps) < multiplier`.
pub fn trsm_tolerance(m: usize, multiplier: f64, eps: f64) -> f64 {
    multiplier * eps * m.max(1) as f64
}

/// Check a relative error of an order-`m` solve against `multiplier * eps`
pub fn trsm_err_res_check(err: f64, m: usize, multiplier: f64, eps: f64) -> Result<(), ToleranceExceeded> {
    let tolerance = trsm_tolerance(m, multiplier, eps);
    // NaN must fail as well
    if err <= tolerance {
        Ok(())
    } else {
        Err(ToleranceExceeded { err, tolerance, m })
    }
}
