//! Packed triangular solve (TPSV): `op(A) x = b`, x overwriting b

use super::super::args::{ArgCheck, tpsv_arg_check};
use super::super::batch::{BatchAccessor, PointerArray, Single, Strided};
use super::super::boundary::api_boundary;
use super::super::enums::{Diagonal, Fill, Operation};
use super::super::int::ApiInt;
use super::super::numerics::{check_contiguous, check_vector};
use super::packed_len;
use crate::dtype::Element;
use crate::error::{Error, Result};
use crate::handle::Handle;
use crate::runtime::DevicePtr;
use crate::runtime::cpu::kernels::tpsv_kernel;
use tracing::debug;

#[allow(clippy::too_many_arguments)]
fn tpsv_launch<T, A, X>(
    routine: &'static str,
    handle: Option<&Handle>,
    uplo: Fill,
    trans: Operation,
    diag: Diagonal,
    n: i64,
    ap: &A,
    x: &X,
    incx: i64,
    batch_count: i64,
) -> Result<()>
where
    T: Element,
    A: BatchAccessor<T>,
    X: BatchAccessor<T>,
{
    api_boundary(routine, || {
        debug!(routine, dtype = %T::DTYPE, %uplo, %trans, %diag, n, incx, batch_count, "call");
        let check = tpsv_arg_check::<T, _, _>(handle, uplo, trans, diag, n, ap, x, incx, batch_count)?;
        if check == ArgCheck::QuickReturn {
            return Ok(());
        }
        let handle = handle.ok_or(Error::InvalidHandle)?;
        if handle.is_querying_memory() {
            return Ok(());
        }
        let (n, count) = (n as usize, batch_count as usize);
        if ap.first_null_member(count).is_some() {
            return Err(Error::invalid_pointer("AP"));
        }
        if x.first_null_member(count).is_some() {
            return Err(Error::invalid_pointer("x"));
        }
        if handle.check_numerics() {
            check_contiguous("AP", ap, count, packed_len(n))?;
            check_vector("x", x, count, n, incx)?;
        }

        handle.client().for_each_member(count, |i| {
            // SAFETY: AP holds n(n+1)/2 elements and x covers n elements at
            // incx; both validated non-null.
            unsafe { tpsv_kernel(uplo, trans, diag, n, ap.member(i).as_ptr(), x.member(i).as_mut_ptr(), incx) };
        });

        if handle.check_numerics() {
            check_vector("x", x, count, n, incx)?;
        }
        Ok(())
    })
}

/// Solve `op(A) x = b` for a packed n × n triangular A
///
/// b is passed in x and overwritten with the solution. A negative `incx`
/// walks the vector from its far end. A zero pivot is not detected.
///
/// # Safety
/// Non-null `ap` must cover `n (n + 1) / 2` elements and non-null `x` n
/// elements at `incx`; x must not overlap A.
#[allow(clippy::too_many_arguments)]
pub unsafe fn tpsv<T: Element, I: ApiInt>(
    handle: Option<&Handle>,
    uplo: Fill,
    trans: Operation,
    diag: Diagonal,
    n: I,
    ap: DevicePtr<T>,
    x: DevicePtr<T>,
    incx: I,
) -> Result<()> {
    tpsv_launch("tpsv", handle, uplo, trans, diag, n.to_i64(), &Single(ap), &Single(x), incx.to_i64(), 1)
}

/// [`tpsv`] over device arrays of per-member pointers
///
/// # Safety
/// As for [`tpsv`], per member; each non-null array must hold
/// `batch_count` readable pointers.
#[allow(clippy::too_many_arguments)]
pub unsafe fn tpsv_batched<T: Element, I: ApiInt>(
    handle: Option<&Handle>,
    uplo: Fill,
    trans: Operation,
    diag: Diagonal,
    n: I,
    ap: DevicePtr<DevicePtr<T>>,
    x: DevicePtr<DevicePtr<T>>,
    incx: I,
    batch_count: I,
) -> Result<()> {
    // SAFETY: the arrays are readable per this function's contract.
    let (ap, x) = unsafe { (PointerArray::new(ap), PointerArray::new(x)) };
    tpsv_launch(
        "tpsv_batched",
        handle,
        uplo,
        trans,
        diag,
        n.to_i64(),
        &ap,
        &x,
        incx.to_i64(),
        batch_count.to_i64(),
    )
}

/// [`tpsv`] over members at fixed element strides
///
/// # Safety
/// As for [`tpsv`], for every member at its stride.
#[allow(clippy::too_many_arguments)]
pub unsafe fn tpsv_strided_batched<T: Element, I: ApiInt>(
    handle: Option<&Handle>,
    uplo: Fill,
    trans: Operation,
    diag: Diagonal,
    n: I,
    ap: DevicePtr<T>,
    stride_ap: i64,
    x: DevicePtr<T>,
    incx: I,
    stride_x: i64,
    batch_count: I,
) -> Result<()> {
    tpsv_launch(
        "tpsv_strided_batched",
        handle,
        uplo,
        trans,
        diag,
        n.to_i64(),
        &Strided::new(ap, stride_ap),
        &Strided::new(x, stride_x),
        incx.to_i64(),
        batch_count.to_i64(),
    )
}
