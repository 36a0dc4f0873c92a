//! Triangular solve with multiple right-hand sides (TRSM)
//!
//! `op(A) X = alpha B` (left side) or `X op(A) = alpha B` (right side),
//! X overwriting B, for one matrix or a batch.
//!
//! # Call sequence
//!
//! ```text
//! VALIDATE ──► REJECT | QUICK_RETURN
//!     │
//!     ├──► SIZE_QUERY (handle in memory-size query: record, return)
//!     │
//!     └──► COMPUTE: workspace ──► INVERT_BLOCKS ──► SUBSTITUTE ──► DONE
//!                                 (skipped when invA is supplied)
//! ```
//!
//! Workspace comes from the handle. Transposed solves try the out-of-place
//! strategy first and drop to the in-place panel strategy when the full
//! scratch cannot be obtained; non-transposed solves use the panel
//! strategy directly. See [`crate::algorithm::workspace`].

use super::super::args::{ArgCheck, trsm_arg_check};
use super::super::batch::{BatchAccessor, PointerArray, Single, Strided};
use super::super::boundary::api_boundary;
use super::super::enums::{Diagonal, Fill, Operation, Side};
use super::super::int::ApiInt;
use super::super::numerics::{check_matrix, check_triangle};
use super::super::scalar::{Scalar, ScalarPtr};
use crate::algorithm::{TRSM_BLOCK, inv_a_elems, panel_elems, trsm_workspace_sizes};
use crate::dtype::{DType, Element};
use crate::error::{Error, Result};
use crate::handle::Handle;
use crate::runtime::cpu::kernels::{TrsmStrategy, trsm_kernel, trtri_blocks_kernel};
use crate::runtime::cpu::{CpuClient, CpuRuntime};
use crate::runtime::{DevicePtr, Runtime};
use tracing::{debug, trace, warn};

/// Caller-provided workspace for [`trsm_with_workspace`]
///
/// Size each buffer with
/// [`trsm_workspace_sizes`](crate::algorithm::trsm_workspace_sizes). The
/// pointer arrays are only used by pointer-array batches and may be null
/// otherwise.
#[derive(Copy, Clone, Debug, Default)]
pub struct TrsmWorkspace<T> {
    /// Solution scratch (`x_tmp`, or `x_tmp_backup` with `optimal_mem`)
    pub x_tmp: DevicePtr<T>,
    /// Per-member pointers into `x_tmp`
    pub x_tmp_arr: DevicePtr<DevicePtr<T>>,
    /// Inverted diagonal blocks
    pub inv_a: DevicePtr<T>,
    /// Per-member pointers into `inv_a`
    pub inv_a_arr: DevicePtr<DevicePtr<T>>,
}

/// Validated problem shape in internal width
#[derive(Copy, Clone, Debug)]
struct Problem {
    side: Side,
    uplo: Fill,
    trans: Operation,
    diag: Diagonal,
    m: usize,
    n: usize,
    lda: usize,
    ldb: usize,
    batch_count: usize,
}

impl Problem {
    fn k(&self) -> usize {
        if self.side == Side::Left { self.m } else { self.n }
    }
}

/// Per-member scratch addressing, mirroring the batch form of B
enum WorkAccessor<T> {
    Strided(Strided<T>),
    Array(PointerArray<T>),
}

impl<T> WorkAccessor<T> {
    fn member(&self, index: usize) -> DevicePtr<T> {
        match self {
            Self::Strided(s) => s.member(index),
            Self::Array(a) => a.member(index),
        }
    }
}

/// Build the addressing of `batch_count` consecutive scratch slices
///
/// For pointer-array batches the per-member pointers are written to the
/// device array `arr`, and members are read back through it.
fn work_accessor<T: Element>(
    client: &CpuClient,
    base: DevicePtr<T>,
    elems: usize,
    batch_count: usize,
    arr: DevicePtr<DevicePtr<T>>,
) -> WorkAccessor<T> {
    if arr.is_null() {
        return WorkAccessor::Strided(Strided::new(base, elems as i64));
    }
    let ptrs: Vec<DevicePtr<T>> = (0..batch_count)
        .map(|i| base.offset((i * elems) as isize))
        .collect();
    // SAFETY: `arr` is a workspace chunk sized for `batch_count` pointers.
    unsafe {
        CpuRuntime::copy_to_device(bytemuck::cast_slice(&ptrs), arr.addr(), &client.device);
        WorkAccessor::Array(PointerArray::new(arr))
    }
}

fn require_members<T, A: BatchAccessor<T>>(arg: &'static str, acc: &A, batch_count: usize) -> Result<()> {
    match acc.first_null_member(batch_count) {
        Some(i) => {
            debug!(arg, member = i, "null batch member");
            Err(Error::invalid_pointer(arg))
        }
        None => Ok(()),
    }
}

/// Inverse blocks supplied by the caller of an `_ex` routine
struct SuppliedInverse<'a, V> {
    inv_a: &'a V,
    elems: i64,
    compute_type: DType,
}

#[allow(clippy::too_many_arguments)]
fn trsm_launch<T, A, B, V>(
    routine: &'static str,
    handle: Option<&Handle>,
    side: Side,
    uplo: Fill,
    trans: Operation,
    diag: Diagonal,
    m: i64,
    n: i64,
    alpha: ScalarPtr<'_, T>,
    a: &A,
    lda: i64,
    b: &B,
    ldb: i64,
    batch_count: i64,
    supplied: Option<SuppliedInverse<'_, V>>,
) -> Result<()>
where
    T: Element,
    A: BatchAccessor<T>,
    B: BatchAccessor<T>,
    V: BatchAccessor<T>,
{
    api_boundary(routine, || {
        debug!(
            routine,
            dtype = %T::DTYPE,
            %side,
            %uplo,
            %trans,
            %diag,
            m,
            n,
            lda,
            ldb,
            batch_count,
            "call"
        );
        // compute_type is checked right after the handle
        if let (Some(_), Some(s)) = (handle, &supplied) {
            if s.compute_type != T::DTYPE {
                return Err(Error::invalid_value("compute_type", s.compute_type));
            }
        }
        let check = trsm_arg_check(
            handle, side, uplo, trans, diag, m, n, alpha, a, lda, b, ldb, batch_count,
        )?;
        if check == ArgCheck::QuickReturn {
            return Ok(());
        }
        let handle = handle.ok_or(Error::InvalidHandle)?;
        let alpha = alpha
            .resolve(handle.pointer_mode())
            .ok_or_else(|| Error::invalid_pointer("alpha"))?;

        let p = Problem {
            side,
            uplo,
            trans,
            diag,
            m: m as usize,
            n: n as usize,
            lda: lda as usize,
            ldb: ldb as usize,
            batch_count: batch_count as usize,
        };

        // Only a non-null invA with at least BS * K elements is used
        let supplied = supplied.filter(|s| {
            let enough = !s.inv_a.is_null() && s.elems >= (TRSM_BLOCK * p.k()) as i64;
            if !enough {
                trace!(routine, elems = s.elems, "supplied invA unusable, inverting blocks");
            }
            enough
        });
        match &supplied {
            Some(s) => trsm_supplied(routine, handle, &p, alpha, a, b, s.inv_a, s.elems as usize),
            None => trsm_supplied::<T, A, B, Single<T>>(routine, handle, &p, alpha, a, b, &Single(DevicePtr::null()), 0),
        }
    })
}

#[allow(clippy::too_many_arguments)]
fn trsm_supplied<T, A, B, V>(
    routine: &'static str,
    handle: &Handle,
    p: &Problem,
    alpha: Scalar<T>,
    a: &A,
    b: &B,
    inv_a: &V,
    inv_a_elems_supplied: usize,
) -> Result<()>
where
    T: Element,
    A: BatchAccessor<T>,
    B: BatchAccessor<T>,
    V: BatchAccessor<T>,
{
    let supplied = !inv_a.is_null();
    require_members("B", b, p.batch_count)?;

    if alpha.is_zero_on(handle.device()) {
        if handle.is_querying_memory() {
            return Ok(());
        }
        trace!(routine, "alpha is zero, zero-filling B");
        let (m, n, ldb) = (p.m, p.n, p.ldb);
        handle.client().for_each_member(p.batch_count, |i| {
            // SAFETY: B validated non-null, m × n at ldb.
            unsafe {
                crate::runtime::cpu::kernels::fill_matrix_kernel(m, n, T::zero(), b.member(i).as_mut_ptr(), ldb)
            };
        });
        return check_outputs(handle, p, b);
    }

    require_members("A", a, p.batch_count)?;
    if supplied {
        require_members("invA", inv_a, p.batch_count)?;
    }

    let sizes = trsm_workspace_sizes::<T>(
        p.side,
        p.trans,
        p.m,
        p.n,
        p.batch_count,
        inv_a_elems_supplied,
    );

    if handle.is_querying_memory() {
        handle.record_memory_size(&sizes.primary_request(B::POINTER_ARRAY));
        return Ok(());
    }

    if handle.check_numerics() {
        check_triangle("A", a, p.batch_count, p.uplo, p.diag, p.k(), p.lda)?;
        check_matrix("B", b, p.batch_count, p.m, p.n, p.ldb)?;
    }

    let primary = if p.trans == Operation::None {
        TrsmStrategy::Panel
    } else {
        TrsmStrategy::OutOfPlace
    };
    let request = |x_bytes: usize| sizes.request(x_bytes, B::POINTER_ARRAY);

    let (ws, strategy) = match handle.acquire_workspace(&request(sizes.x_tmp)) {
        Ok(ws) => (ws, primary),
        Err(Error::OutOfMemory { size }) if sizes.x_tmp_backup > 0 => {
            warn!(
                routine,
                requested = size,
                backup = sizes.x_tmp_backup,
                "trsm workspace unavailable, falling back to in-place panel strategy"
            );
            (handle.acquire_workspace(&request(sizes.x_tmp_backup))?, TrsmStrategy::Panel)
        }
        Err(e) => return Err(e),
    };
    trace!(routine, ?strategy, supplied, "workspace acquired");

    let x_elems = match strategy {
        TrsmStrategy::OutOfPlace => p.m * p.n,
        TrsmStrategy::Panel => panel_elems(p.side, p.m, p.n),
    };
    let workspace = TrsmWorkspace {
        x_tmp: ws.chunk(0),
        inv_a: ws.chunk(1),
        x_tmp_arr: ws.chunk(2),
        inv_a_arr: ws.chunk(3),
    };
    solve_members(handle.client(), p, alpha, a, b, supplied.then_some(inv_a), &workspace, strategy, x_elems);
    drop(ws);

    check_outputs(handle, p, b)
}

fn check_outputs<T: Element, B: BatchAccessor<T>>(handle: &Handle, p: &Problem, b: &B) -> Result<()> {
    if handle.check_numerics() {
        check_matrix("B", b, p.batch_count, p.m, p.n, p.ldb)?;
    }
    Ok(())
}

/// INVERT_BLOCKS + SUBSTITUTE for every member
#[allow(clippy::too_many_arguments)]
fn solve_members<T, A, B, V>(
    client: &CpuClient,
    p: &Problem,
    alpha: Scalar<T>,
    a: &A,
    b: &B,
    supplied: Option<&V>,
    workspace: &TrsmWorkspace<T>,
    strategy: TrsmStrategy,
    x_elems: usize,
) where
    T: Element,
    A: BatchAccessor<T>,
    B: BatchAccessor<T>,
    V: BatchAccessor<T>,
{
    let k = p.k();
    let x = work_accessor(client, workspace.x_tmp, x_elems, p.batch_count, workspace.x_tmp_arr);
    let inv = work_accessor(client, workspace.inv_a, inv_a_elems(k), p.batch_count, workspace.inv_a_arr);

    client.for_each_member(p.batch_count, |i| {
        let alpha = alpha.load();
        let a_i = a.member(i);
        let inv_i = match supplied {
            Some(v) => v.member(i),
            None => inv.member(i),
        };
        // SAFETY: operands validated non-null and sized by the caller's
        // dimensions; workspace slices are disjoint per member.
        unsafe {
            if supplied.is_none() && !alpha.is_zero() {
                trtri_blocks_kernel(p.uplo, p.diag, k, a_i.as_ptr(), p.lda, inv_i.as_mut_ptr());
            }
            trsm_kernel(
                strategy,
                p.side,
                p.uplo,
                p.trans,
                p.m,
                p.n,
                alpha,
                a_i.as_ptr(),
                p.lda,
                inv_i.as_ptr(),
                b.member(i).as_mut_ptr(),
                p.ldb,
                x.member(i).as_mut_ptr(),
            );
        }
    });
}

/// Solve `op(A) X = alpha B` or `X op(A) = alpha B`, X overwriting B
///
/// # Arguments
/// * `side` - Whether op(A) is on the left or the right of X
/// * `uplo` - Triangle of A that is referenced
/// * `trans` - op(A): A, A^T or A^H
/// * `diag` - Whether A has an implicit unit diagonal
/// * `m`, `n` - Dimensions of B; A is K × K with K = m (left) or n (right)
/// * `alpha` - Scalar, read according to the handle's pointer mode
/// * `a`, `lda` - Triangular matrix, `lda >= K`
/// * `b`, `ldb` - Right-hand side and solution, `ldb >= m`
///
/// Singular A is not detected; the solution then has degraded accuracy.
///
/// # Safety
/// - non-null `a` and `b` must address live device memory covering the
///   K × K and m × n operands at their leading dimensions
/// - B must not overlap A
#[allow(clippy::too_many_arguments)]
pub unsafe fn trsm<T: Element, I: ApiInt>(
    handle: Option<&Handle>,
    side: Side,
    uplo: Fill,
    trans: Operation,
    diag: Diagonal,
    m: I,
    n: I,
    alpha: ScalarPtr<'_, T>,
    a: DevicePtr<T>,
    lda: I,
    b: DevicePtr<T>,
    ldb: I,
) -> Result<()> {
    trsm_launch::<T, _, _, Single<T>>(
        "trsm",
        handle,
        side,
        uplo,
        trans,
        diag,
        m.to_i64(),
        n.to_i64(),
        alpha,
        &Single(a),
        lda.to_i64(),
        &Single(b),
        ldb.to_i64(),
        1,
        None,
    )
}

/// [`trsm`] over a batch given as device arrays of per-member pointers
///
/// # Safety
/// As for [`trsm`], per member; non-null `a` and `b` must each hold
/// `batch_count` readable pointers.
#[allow(clippy::too_many_arguments)]
pub unsafe fn trsm_batched<T: Element, I: ApiInt>(
    handle: Option<&Handle>,
    side: Side,
    uplo: Fill,
    trans: Operation,
    diag: Diagonal,
    m: I,
    n: I,
    alpha: ScalarPtr<'_, T>,
    a: DevicePtr<DevicePtr<T>>,
    lda: I,
    b: DevicePtr<DevicePtr<T>>,
    ldb: I,
    batch_count: I,
) -> Result<()> {
    // SAFETY: the arrays are readable per this function's contract.
    let (a, b) = unsafe { (PointerArray::new(a), PointerArray::new(b)) };
    trsm_launch::<T, _, _, Single<T>>(
        "trsm_batched",
        handle,
        side,
        uplo,
        trans,
        diag,
        m.to_i64(),
        n.to_i64(),
        alpha,
        &a,
        lda.to_i64(),
        &b,
        ldb.to_i64(),
        batch_count.to_i64(),
        None,
    )
}

/// [`trsm`] over a batch at fixed element strides from one base pointer
///
/// # Safety
/// As for [`trsm`], for every member at its stride.
#[allow(clippy::too_many_arguments)]
pub unsafe fn trsm_strided_batched<T: Element, I: ApiInt>(
    handle: Option<&Handle>,
    side: Side,
    uplo: Fill,
    trans: Operation,
    diag: Diagonal,
    m: I,
    n: I,
    alpha: ScalarPtr<'_, T>,
    a: DevicePtr<T>,
    lda: I,
    stride_a: i64,
    b: DevicePtr<T>,
    ldb: I,
    stride_b: i64,
    batch_count: I,
) -> Result<()> {
    trsm_launch::<T, _, _, Single<T>>(
        "trsm_strided_batched",
        handle,
        side,
        uplo,
        trans,
        diag,
        m.to_i64(),
        n.to_i64(),
        alpha,
        &Strided::new(a, stride_a),
        lda.to_i64(),
        &Strided::new(b, stride_b),
        ldb.to_i64(),
        batch_count.to_i64(),
        None,
    )
}

/// [`trsm`] with caller-supplied inverted diagonal blocks
///
/// `inv_a` holds block j at element offset `j * BS * BS` with leading
/// dimension BS (see [`trtri_strided_batched`](super::trtri_strided_batched)
/// for one way to produce it). When `inv_a` is null or `inv_a_size` is
/// below `BS * K` the blocks are computed as in [`trsm`].
///
/// `compute_type` must be the element type of the operands, else
/// [`Error::InvalidValue`].
///
/// # Safety
/// As for [`trsm`]; a non-null `inv_a` must cover `inv_a_size` elements.
#[allow(clippy::too_many_arguments)]
pub unsafe fn trsm_ex<T: Element, I: ApiInt>(
    handle: Option<&Handle>,
    side: Side,
    uplo: Fill,
    trans: Operation,
    diag: Diagonal,
    m: I,
    n: I,
    alpha: ScalarPtr<'_, T>,
    a: DevicePtr<T>,
    lda: I,
    b: DevicePtr<T>,
    ldb: I,
    inv_a: DevicePtr<T>,
    inv_a_size: I,
    compute_type: DType,
) -> Result<()> {
    let inv_a = Single(inv_a);
    trsm_launch(
        "trsm_ex",
        handle,
        side,
        uplo,
        trans,
        diag,
        m.to_i64(),
        n.to_i64(),
        alpha,
        &Single(a),
        lda.to_i64(),
        &Single(b),
        ldb.to_i64(),
        1,
        Some(SuppliedInverse {
            inv_a: &inv_a,
            elems: inv_a_size.to_i64(),
            compute_type,
        }),
    )
}

/// [`trsm_batched`] with caller-supplied inverted blocks per member
///
/// # Safety
/// As for [`trsm_batched`]; a non-null `inv_a` must hold `batch_count`
/// pointers, each covering `inv_a_size` elements.
#[allow(clippy::too_many_arguments)]
pub unsafe fn trsm_batched_ex<T: Element, I: ApiInt>(
    handle: Option<&Handle>,
    side: Side,
    uplo: Fill,
    trans: Operation,
    diag: Diagonal,
    m: I,
    n: I,
    alpha: ScalarPtr<'_, T>,
    a: DevicePtr<DevicePtr<T>>,
    lda: I,
    b: DevicePtr<DevicePtr<T>>,
    ldb: I,
    batch_count: I,
    inv_a: DevicePtr<DevicePtr<T>>,
    inv_a_size: I,
    compute_type: DType,
) -> Result<()> {
    // SAFETY: the arrays are readable per this function's contract.
    let (inv_a, a, b) = unsafe { (PointerArray::new(inv_a), PointerArray::new(a), PointerArray::new(b)) };
    trsm_launch(
        "trsm_batched_ex",
        handle,
        side,
        uplo,
        trans,
        diag,
        m.to_i64(),
        n.to_i64(),
        alpha,
        &a,
        lda.to_i64(),
        &b,
        ldb.to_i64(),
        batch_count.to_i64(),
        Some(SuppliedInverse {
            inv_a: &inv_a,
            elems: inv_a_size.to_i64(),
            compute_type,
        }),
    )
}

/// [`trsm_strided_batched`] with caller-supplied inverted blocks at a
/// fixed stride
///
/// # Safety
/// As for [`trsm_strided_batched`]; a non-null `inv_a` must cover
/// `inv_a_size` elements for every member at `stride_inv_a`.
#[allow(clippy::too_many_arguments)]
pub unsafe fn trsm_strided_batched_ex<T: Element, I: ApiInt>(
    handle: Option<&Handle>,
    side: Side,
    uplo: Fill,
    trans: Operation,
    diag: Diagonal,
    m: I,
    n: I,
    alpha: ScalarPtr<'_, T>,
    a: DevicePtr<T>,
    lda: I,
    stride_a: i64,
    b: DevicePtr<T>,
    ldb: I,
    stride_b: i64,
    batch_count: I,
    inv_a: DevicePtr<T>,
    inv_a_size: I,
    stride_inv_a: i64,
    compute_type: DType,
) -> Result<()> {
    let inv_a = Strided::new(inv_a, stride_inv_a);
    trsm_launch(
        "trsm_strided_batched_ex",
        handle,
        side,
        uplo,
        trans,
        diag,
        m.to_i64(),
        n.to_i64(),
        alpha,
        &Strided::new(a, stride_a),
        lda.to_i64(),
        &Strided::new(b, stride_b),
        ldb.to_i64(),
        batch_count.to_i64(),
        Some(SuppliedInverse {
            inv_a: &inv_a,
            elems: inv_a_size.to_i64(),
            compute_type,
        }),
    )
}

/// Solve with workspace provided by the caller instead of the handle
///
/// Works with any batch form. With `optimal_mem` the in-place panel
/// strategy is used, so `workspace.x_tmp` only needs the `x_tmp_backup`
/// size; otherwise transposed solves need the full `x_tmp` size. Memory-size
/// queries record nothing, since no handle memory is used.
///
/// # Safety
/// - `a` and `b` must yield members valid as for [`trsm`]
/// - non-null `workspace` buffers must be live, at least as large as
///   [`trsm_workspace_sizes`](crate::algorithm::trsm_workspace_sizes)
///   reports, and disjoint from the operands
#[allow(clippy::too_many_arguments)]
pub unsafe fn trsm_with_workspace<T, A, B>(
    handle: Option<&Handle>,
    side: Side,
    uplo: Fill,
    trans: Operation,
    diag: Diagonal,
    m: i64,
    n: i64,
    alpha: ScalarPtr<'_, T>,
    a: &A,
    lda: i64,
    b: &B,
    ldb: i64,
    batch_count: i64,
    workspace: &TrsmWorkspace<T>,
    optimal_mem: bool,
) -> Result<()>
where
    T: Element,
    A: BatchAccessor<T>,
    B: BatchAccessor<T>,
{
    api_boundary("trsm_with_workspace", || {
        debug!(
            %side, %uplo, %trans, %diag, m, n, lda, ldb, batch_count, optimal_mem,
            "trsm_with_workspace call"
        );
        let check = trsm_arg_check(
            handle, side, uplo, trans, diag, m, n, alpha, a, lda, b, ldb, batch_count,
        )?;
        if check == ArgCheck::QuickReturn {
            return Ok(());
        }
        let handle = handle.ok_or(Error::InvalidHandle)?;
        let alpha = alpha
            .resolve(handle.pointer_mode())
            .ok_or_else(|| Error::invalid_pointer("alpha"))?;
        let p = Problem {
            side,
            uplo,
            trans,
            diag,
            m: m as usize,
            n: n as usize,
            lda: lda as usize,
            ldb: ldb as usize,
            batch_count: batch_count as usize,
        };
        if handle.is_querying_memory() {
            return Ok(());
        }
        require_members("B", b, p.batch_count)?;
        if !alpha.is_zero_on(handle.device()) {
            require_members("A", a, p.batch_count)?;
            if workspace.x_tmp.is_null() {
                return Err(Error::invalid_pointer("x_tmp"));
            }
            if workspace.inv_a.is_null() {
                return Err(Error::invalid_pointer("invA"));
            }
        }
        if handle.check_numerics() {
            if !alpha.is_zero_on(handle.device()) {
                check_triangle("A", a, p.batch_count, p.uplo, p.diag, p.k(), p.lda)?;
            }
            check_matrix("B", b, p.batch_count, p.m, p.n, p.ldb)?;
        }

        let strategy = if optimal_mem || trans == Operation::None {
            TrsmStrategy::Panel
        } else {
            TrsmStrategy::OutOfPlace
        };
        let x_elems = match strategy {
            TrsmStrategy::OutOfPlace => p.m * p.n,
            TrsmStrategy::Panel => panel_elems(p.side, p.m, p.n),
        };
        let ws = TrsmWorkspace {
            x_tmp_arr: if B::POINTER_ARRAY { workspace.x_tmp_arr } else { DevicePtr::null() },
            inv_a_arr: if B::POINTER_ARRAY { workspace.inv_a_arr } else { DevicePtr::null() },
            ..*workspace
        };
        solve_members::<T, A, B, Single<T>>(handle.client(), &p, alpha, a, b, None, &ws, strategy, x_elems);
        check_outputs(handle, &p, b)
    })
}
