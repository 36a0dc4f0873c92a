//! Level 3 routines: triangular solve, multiply and inversion

mod trmm;
mod trsm;
mod trtri;

pub use trmm::{
    trmm, trmm_batched, trmm_outofplace, trmm_outofplace_batched, trmm_outofplace_strided_batched,
    trmm_strided_batched,
};
pub use trsm::{
    TrsmWorkspace, trsm, trsm_batched, trsm_batched_ex, trsm_ex, trsm_strided_batched,
    trsm_strided_batched_ex, trsm_with_workspace,
};
pub use trtri::{trtri, trtri_strided_batched};
