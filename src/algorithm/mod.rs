//! Algorithm contracts shared by every routine
//!
//! - [`blocking`] fixes the diagonal block size of the triangular solver and
//!   the way a dimension is cut into blocks
//! - [`workspace`] is the workspace sizing oracle: the conservative
//!   [`trsm_max_workspace_sizes`] and the exact [`trsm_workspace_sizes`]
//!
//! # Blocked Triangular Solve
//!
//! ```text
//! op(A) X = alpha B, A of order K, blocks of BS = 128
//!
//! INVERT_BLOCKS:  invA_II = A_II^-1 for every diagonal block I
//! SUBSTITUTE:     for each block I in substitution order
//!                   X_I  = op(invA_II) * B_I
//!                   B_R -= op(A)_{R,I} * X_I      (R = unsolved blocks)
//! ```
//!
//! Substitution runs forward when op(A) is effectively lower triangular
//! (left side) and reverse otherwise; right-side solves mirror this on
//! columns. Because the unsolved region is always contiguous, each step is
//! exactly two GEMMs regardless of K.

pub mod blocking;
pub mod workspace;

pub use blocking::{BlockConfig, TRSM_BLOCK, block_count, block_ranges};
pub use workspace::{
    TrsmMaxWorkspaceSizes, TrsmWorkspaceSizes, inv_a_elems, panel_elems, trsm_max_workspace_sizes,
    trsm_workspace_sizes,
};
