//! Workspace sizing oracle for the blocked triangular solver
//!
//! Two functions with a domination contract: for a fixed side and batch
//! count, every component of [`trsm_workspace_sizes`] for `(M', N')` is at
//! most the matching component of [`trsm_max_workspace_sizes`] for
//! `(M, N)` whenever `M' <= M` and `N' <= N`, for every transpose mode and
//! supplied invA size.
//!
//! All sizes are in bytes and are zero when M, N or the batch count is 0.
//! Arithmetic saturates, so an absurd problem size turns into an
//! unsatisfiable allocation instead of an overflow.

use super::blocking::{BlockConfig, TRSM_BLOCK};
use crate::dtype::Element;
use crate::ops::{Operation, Side};

/// Bytes of one device pointer in a pointer-array workspace
const PTR_BYTES: usize = std::mem::size_of::<u64>();

/// Conservative workspace bounds for a (side, M, N, batch) triple
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TrsmMaxWorkspaceSizes {
    /// Solution scratch
    pub x_tmp: usize,
    /// Inverted diagonal blocks
    pub inv_a: usize,
    /// Reduced solution scratch of the fallback strategy
    pub x_tmp_backup: usize,
}

/// Exact workspace needs of one specific solve
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TrsmWorkspaceSizes {
    /// Solution scratch of the primary strategy
    pub x_tmp: usize,
    /// Per-member pointers into `x_tmp` (pointer-array batches)
    pub x_tmp_arr: usize,
    /// Inverted diagonal blocks; zero when the caller supplies enough
    pub inv_a: usize,
    /// Per-member pointers into `inv_a` (pointer-array batches)
    pub inv_a_arr: usize,
    /// Solution scratch of the fallback strategy; zero when there is none
    pub x_tmp_backup: usize,
}

impl TrsmWorkspaceSizes {
    /// Chunk sizes `[x_tmp, inv_a, x_tmp_arr, inv_a_arr]` of a workspace request
    ///
    /// `x_tmp` is the solution scratch of the chosen strategy. Pointer
    /// arrays exist only for pointer-array batches, and the invA array only
    /// when the blocks are inverted into workspace.
    pub fn request(&self, x_tmp: usize, pointer_array: bool) -> [usize; 4] {
        let arr = |bytes: usize| if pointer_array { bytes } else { 0 };
        let inv_a_arr = if self.inv_a == 0 { 0 } else { arr(self.inv_a_arr) };
        [x_tmp, self.inv_a, arr(self.x_tmp_arr), inv_a_arr]
    }

    /// Chunk sizes requested by the primary strategy
    pub fn primary_request(&self, pointer_array: bool) -> [usize; 4] {
        self.request(self.x_tmp, pointer_array)
    }

    /// True when no workspace at all is needed
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Elements of one member's in-place panel: `min(BS,K)` rows or columns
pub fn panel_elems(side: Side, m: usize, n: usize) -> usize {
    match side {
        Side::Left => TRSM_BLOCK.min(m).saturating_mul(n),
        _ => m.saturating_mul(TRSM_BLOCK.min(n)),
    }
}

/// Elements of one member's inverted diagonal blocks for order `k`
pub fn inv_a_elems(k: usize) -> usize {
    BlockConfig::DEFAULT.inv_a_elems(k)
}

fn bytes<T: Element>(elems: usize, batch_count: usize) -> usize {
    elems
        .saturating_mul(batch_count)
        .saturating_mul(std::mem::size_of::<T>())
}

/// Upper bound on the workspace of any solve with this side, M, N and batch
///
/// Covers both strategies, every transpose mode and the case where the
/// caller supplies no inverted blocks.
pub fn trsm_max_workspace_sizes<T: Element>(
    side: Side,
    m: usize,
    n: usize,
    batch_count: usize,
) -> TrsmMaxWorkspaceSizes {
    if m == 0 || n == 0 || batch_count == 0 {
        return TrsmMaxWorkspaceSizes::default();
    }
    let k = if side == Side::Left { m } else { n };
    TrsmMaxWorkspaceSizes {
        x_tmp: bytes::<T>(m.saturating_mul(n), batch_count),
        inv_a: bytes::<T>(inv_a_elems(k), batch_count),
        x_tmp_backup: bytes::<T>(panel_elems(side, m, n), batch_count),
    }
}

/// Exact workspace of one solve
///
/// Non-transposed solves run the in-place panel strategy directly and have
/// no backup. Transposed solves prefer the out-of-place strategy (full
/// M × N scratch per member) and fall back to the panel. `supplied_inv_a`
/// is the caller's invA size in elements per member; at least `BS * K`
/// elements means no invA workspace is needed.
pub fn trsm_workspace_sizes<T: Element>(
    side: Side,
    trans: Operation,
    m: usize,
    n: usize,
    batch_count: usize,
    supplied_inv_a: usize,
) -> TrsmWorkspaceSizes {
    if m == 0 || n == 0 || batch_count == 0 {
        return TrsmWorkspaceSizes::default();
    }
    let k = if side == Side::Left { m } else { n };
    let panel = panel_elems(side, m, n);

    let (x_elems, backup_elems) = match trans {
        Operation::None => (panel, 0),
        _ => (m.saturating_mul(n), panel),
    };
    let inv_a = if supplied_inv_a >= TRSM_BLOCK.saturating_mul(k) {
        0
    } else {
        bytes::<T>(inv_a_elems(k), batch_count)
    };

    TrsmWorkspaceSizes {
        x_tmp: bytes::<T>(x_elems, batch_count),
        x_tmp_arr: PTR_BYTES.saturating_mul(batch_count),
        inv_a,
        inv_a_arr: PTR_BYTES.saturating_mul(batch_count),
        x_tmp_backup: bytes::<T>(backup_elems, batch_count),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_dimensions_need_nothing() {
        assert!(trsm_workspace_sizes::<f64>(Side::Left, Operation::None, 0, 10, 4, 0).is_empty());
        assert!(trsm_workspace_sizes::<f64>(Side::Right, Operation::Transpose, 10, 10, 0, 0).is_empty());
        assert_eq!(
            trsm_max_workspace_sizes::<f32>(Side::Left, 10, 0, 1),
            TrsmMaxWorkspaceSizes::default()
        );
    }

    #[test]
    fn test_requests() {
        let s = trsm_workspace_sizes::<f64>(Side::Left, Operation::Transpose, 200, 10, 2, 0);
        assert_eq!(s.primary_request(false), [2 * 16000, 2 * 262144, 0, 0]);
        assert_eq!(s.primary_request(true), [2 * 16000, 2 * 262144, 16, 16]);
        assert_eq!(s.request(s.x_tmp_backup, true), [2 * 10240, 2 * 262144, 16, 16]);

        // enough caller-supplied invA: neither blocks nor their pointers
        let s = trsm_workspace_sizes::<f64>(Side::Left, Operation::None, 200, 10, 2, TRSM_BLOCK * 200);
        assert_eq!(s.primary_request(true), [2 * 10240, 0, 16, 0]);
    }

    #[test]
    fn test_left_sizes() {
        let s = trsm_workspace_sizes::<f64>(Side::Left, Operation::Transpose, 300, 20, 2, 0);
        assert_eq!(s.x_tmp, 300 * 20 * 2 * 8);
        assert_eq!(s.x_tmp_backup, 128 * 20 * 2 * 8);
        assert_eq!(s.inv_a, 128 * 384 * 2 * 8);
        assert_eq!(s.x_tmp_arr, 16);

        let s = trsm_workspace_sizes::<f64>(Side::Left, Operation::None, 300, 20, 2, 0);
        assert_eq!(s.x_tmp, 128 * 20 * 2 * 8);
        assert_eq!(s.x_tmp_backup, 0);
    }

    #[test]
    fn test_supplied_inv_a_skips_inversion_workspace() {
        let k = 200;
        let s = trsm_workspace_sizes::<f32>(Side::Right, Operation::None, 4, k, 1, 128 * k);
        assert_eq!(s.inv_a, 0);
        let s = trsm_workspace_sizes::<f32>(Side::Right, Operation::None, 4, k, 1, 128 * k - 1);
        assert_eq!(s.inv_a, 128 * 256 * 4);
    }

    #[test]
    fn test_skinny_non_transposed_needs_less() {
        let none = trsm_workspace_sizes::<f64>(Side::Left, Operation::None, 1000, 3, 1, 0);
        let trans = trsm_workspace_sizes::<f64>(Side::Left, Operation::Transpose, 1000, 3, 1, 0);
        assert!(none.x_tmp < trans.x_tmp);
    }

    #[test]
    fn test_max_dominates_small_sweep() {
        for side in [Side::Left, Side::Right] {
            let max = trsm_max_workspace_sizes::<f64>(side, 150, 140, 3);
            for m in 0..=150 {
                for n in (0..=140).step_by(7) {
                    for trans in [Operation::None, Operation::Transpose, Operation::ConjugateTranspose] {
                        let s = trsm_workspace_sizes::<f64>(side, trans, m, n, 3, 0);
                        assert!(s.x_tmp <= max.x_tmp, "x_tmp {side:?} {m} {n}");
                        assert!(s.inv_a <= max.inv_a, "inv_a {side:?} {m} {n}");
                        assert!(s.x_tmp_backup <= max.x_tmp_backup, "backup {side:?} {m} {n}");
                    }
                }
            }
        }
    }
}
