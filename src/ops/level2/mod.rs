//! Level 2 routines on packed and banded matrices

mod hbmv;
mod spmv;
mod tpsv;

pub use hbmv::{hbmv, hbmv_batched, hbmv_strided_batched};
pub use spmv::{spmv, spmv_batched, spmv_strided_batched};
pub use tpsv::{tpsv, tpsv_batched, tpsv_strided_batched};

/// Elements of an n × n packed triangle
pub(crate) fn packed_len(n: usize) -> usize {
    n * (n + 1) / 2
}
