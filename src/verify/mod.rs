//! Verification toolkit
//!
//! Fixture generators, accuracy checks and the multi-device repeatability
//! harness used by the integration tests and benchmarks. Pair with
//! [`crate::reference`] for expected results.

mod check;
mod init;
mod repeat;

pub use check::{
    ERROR_EPS_MULTIPLIER, RESIDUAL_EPS_MULTIPLIER, ToleranceExceeded, trsm_err_res_check,
    trsm_tolerance,
};
pub use init::{
    diagonally_dominant_triangular, general_matrix, make_unit_diagonal, regular_to_packed,
    seeded_rng, symmetric_packed,
};
pub use repeat::{assert_repeatable, replicate};
