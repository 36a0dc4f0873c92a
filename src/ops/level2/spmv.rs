//! Symmetric packed matrix-vector product (SPMV): `y := alpha A x + beta y`

use super::super::args::{ArgCheck, spmv_arg_check};
use super::super::batch::{BatchAccessor, PointerArray, Single, Strided};
use super::super::boundary::api_boundary;
use super::super::enums::Fill;
use super::super::int::ApiInt;
use super::super::numerics::{check_contiguous, check_vector};
use super::super::scalar::ScalarPtr;
use super::packed_len;
use crate::dtype::Element;
use crate::error::{Error, Result};
use crate::handle::Handle;
use crate::runtime::DevicePtr;
use crate::runtime::cpu::kernels::spmv_kernel;
use tracing::debug;

#[allow(clippy::too_many_arguments)]
fn spmv_launch<T, A, X, Y>(
    routine: &'static str,
    handle: Option<&Handle>,
    uplo: Fill,
    n: i64,
    alpha: ScalarPtr<'_, T>,
    ap: &A,
    x: &X,
    incx: i64,
    beta: ScalarPtr<'_, T>,
    y: &Y,
    incy: i64,
    batch_count: i64,
) -> Result<()>
where
    T: Element,
    A: BatchAccessor<T>,
    X: BatchAccessor<T>,
    Y: BatchAccessor<T>,
{
    api_boundary(routine, || {
        debug!(routine, dtype = %T::DTYPE, %uplo, n, incx, incy, batch_count, "call");
        let check = spmv_arg_check(handle, uplo, n, alpha, ap, x, incx, beta, y, incy, batch_count)?;
        if check == ArgCheck::QuickReturn {
            return Ok(());
        }
        let handle = handle.ok_or(Error::InvalidHandle)?;
        if handle.is_querying_memory() {
            return Ok(());
        }
        let mode = handle.pointer_mode();
        let alpha = alpha.resolve(mode).ok_or_else(|| Error::invalid_pointer("alpha"))?;
        let beta = beta.resolve(mode).ok_or_else(|| Error::invalid_pointer("beta"))?;
        let (n, count) = (n as usize, batch_count as usize);

        let reads_a = !alpha.is_zero_on(handle.device());
        if reads_a {
            if ap.first_null_member(count).is_some() {
                return Err(Error::invalid_pointer("AP"));
            }
            if x.first_null_member(count).is_some() {
                return Err(Error::invalid_pointer("x"));
            }
        }
        if y.first_null_member(count).is_some() {
            return Err(Error::invalid_pointer("y"));
        }
        if handle.check_numerics() {
            if reads_a {
                check_contiguous("AP", ap, count, packed_len(n))?;
                check_vector("x", x, count, n, incx)?;
            }
            if !beta.is_zero_on(handle.device()) {
                check_vector("y", y, count, n, incy)?;
            }
        }

        handle.client().for_each_member(count, |i| {
            let (alpha, beta) = (alpha.load(), beta.load());
            let (ap_i, x_i) = if alpha.is_zero() {
                (std::ptr::null(), std::ptr::null())
            } else {
                (ap.member(i).as_ptr(), x.member(i).as_ptr())
            };
            // SAFETY: operands validated non-null wherever the kernel reads
            // them; A and x are not read when alpha is zero.
            unsafe { spmv_kernel(uplo, n, alpha, ap_i, x_i, incx, beta, y.member(i).as_mut_ptr(), incy) };
        });

        if handle.check_numerics() {
            check_vector("y", y, count, n, incy)?;
        }
        Ok(())
    })
}

/// `y := alpha A x + beta y` for a symmetric n × n packed A
///
/// Only the `uplo` triangle of A is stored. With `beta == 0`, y is
/// written without being read. `alpha == 0` with `beta == 1` returns
/// immediately in either pointer mode.
///
/// # Safety
/// - non-null `ap` must cover `n (n + 1) / 2` elements
/// - non-null `x` and `y` must cover n elements at their increments
/// - y must not overlap A or x
#[allow(clippy::too_many_arguments)]
pub unsafe fn spmv<T: Element, I: ApiInt>(
    handle: Option<&Handle>,
    uplo: Fill,
    n: I,
    alpha: ScalarPtr<'_, T>,
    ap: DevicePtr<T>,
    x: DevicePtr<T>,
    incx: I,
    beta: ScalarPtr<'_, T>,
    y: DevicePtr<T>,
    incy: I,
) -> Result<()> {
    spmv_launch(
        "spmv",
        handle,
        uplo,
        n.to_i64(),
        alpha,
        &Single(ap),
        &Single(x),
        incx.to_i64(),
        beta,
        &Single(y),
        incy.to_i64(),
        1,
    )
}

/// [`spmv`] over device arrays of per-member pointers
///
/// # Safety
/// As for [`spmv`], per member; each non-null array must hold
/// `batch_count` readable pointers.
#[allow(clippy::too_many_arguments)]
pub unsafe fn spmv_batched<T: Element, I: ApiInt>(
    handle: Option<&Handle>,
    uplo: Fill,
    n: I,
    alpha: ScalarPtr<'_, T>,
    ap: DevicePtr<DevicePtr<T>>,
    x: DevicePtr<DevicePtr<T>>,
    incx: I,
    beta: ScalarPtr<'_, T>,
    y: DevicePtr<DevicePtr<T>>,
    incy: I,
    batch_count: I,
) -> Result<()> {
    // SAFETY: the arrays are readable per this function's contract.
    let (ap, x, y) = unsafe { (PointerArray::new(ap), PointerArray::new(x), PointerArray::new(y)) };
    spmv_launch(
        "spmv_batched",
        handle,
        uplo,
        n.to_i64(),
        alpha,
        &ap,
        &x,
        incx.to_i64(),
        beta,
        &y,
        incy.to_i64(),
        batch_count.to_i64(),
    )
}

/// [`spmv`] over members at fixed element strides
///
/// # Safety
/// As for [`spmv`], for every member at its stride.
#[allow(clippy::too_many_arguments)]
pub unsafe fn spmv_strided_batched<T: Element, I: ApiInt>(
    handle: Option<&Handle>,
    uplo: Fill,
    n: I,
    alpha: ScalarPtr<'_, T>,
    ap: DevicePtr<T>,
    stride_ap: i64,
    x: DevicePtr<T>,
    incx: I,
    stride_x: i64,
    beta: ScalarPtr<'_, T>,
    y: DevicePtr<T>,
    incy: I,
    stride_y: i64,
    batch_count: I,
) -> Result<()> {
    spmv_launch(
        "spmv_strided_batched",
        handle,
        uplo,
        n.to_i64(),
        alpha,
        &Strided::new(ap, stride_ap),
        &Strided::new(x, stride_x),
        incx.to_i64(),
        beta,
        &Strided::new(y, stride_y),
        incy.to_i64(),
        batch_count.to_i64(),
    )
}
