//! Hermitian banded matrix-vector product (HBMV): `y := alpha A x + beta y`

use super::super::args::{ArgCheck, hbmv_arg_check};
use super::super::batch::{BatchAccessor, PointerArray, Single, Strided};
use super::super::boundary::api_boundary;
use super::super::enums::Fill;
use super::super::int::ApiInt;
use super::super::numerics::check_vector;
use super::super::scalar::ScalarPtr;
use crate::dtype::ComplexElement;
use crate::error::{Error, Result};
use crate::handle::Handle;
use crate::runtime::DevicePtr;
use crate::runtime::cpu::kernels::hbmv_kernel;
use tracing::{debug, trace};

#[allow(clippy::too_many_arguments)]
fn hbmv_launch<T, A, X, Y>(
    routine: &'static str,
    handle: Option<&Handle>,
    uplo: Fill,
    n: i64,
    k: i64,
    alpha: ScalarPtr<'_, T>,
    a: &A,
    lda: i64,
    x: &X,
    incx: i64,
    beta: ScalarPtr<'_, T>,
    y: &Y,
    incy: i64,
    batch_count: i64,
) -> Result<()>
where
    T: ComplexElement,
    A: BatchAccessor<T>,
    X: BatchAccessor<T>,
    Y: BatchAccessor<T>,
{
    api_boundary(routine, || {
        debug!(routine, dtype = %T::DTYPE, %uplo, n, k, lda, incx, incy, batch_count, "call");
        let check = hbmv_arg_check(
            handle, uplo, n, k, alpha, a, lda, x, incx, beta, y, incy, batch_count,
        )?;
        if check == ArgCheck::QuickReturn {
            return Ok(());
        }
        let handle = handle.ok_or(Error::InvalidHandle)?;
        // No workspace; a size query records nothing
        if handle.is_querying_memory() {
            return Ok(());
        }
        let mode = handle.pointer_mode();
        let alpha = alpha.resolve(mode).ok_or_else(|| Error::invalid_pointer("alpha"))?;
        let beta = beta.resolve(mode).ok_or_else(|| Error::invalid_pointer("beta"))?;
        let (n, k, lda, count) = (n as usize, k as usize, lda as usize, batch_count as usize);

        let reads_a = !alpha.is_zero_on(handle.device());
        if reads_a {
            if a.first_null_member(count).is_some() {
                return Err(Error::invalid_pointer("A"));
            }
            if x.first_null_member(count).is_some() {
                return Err(Error::invalid_pointer("x"));
            }
        } else {
            trace!(routine, "alpha is zero, scaling y only");
        }
        if y.first_null_member(count).is_some() {
            return Err(Error::invalid_pointer("y"));
        }
        // The band array has unreferenced corners, so only vectors are scanned
        if handle.check_numerics() {
            if reads_a {
                check_vector("x", x, count, n, incx)?;
            }
            if !beta.is_zero_on(handle.device()) {
                check_vector("y", y, count, n, incy)?;
            }
        }

        handle.client().for_each_member(count, |i| {
            let (alpha, beta) = (alpha.load(), beta.load());
            let (a_i, x_i) = if alpha.is_zero() {
                (std::ptr::null(), std::ptr::null())
            } else {
                (a.member(i).as_ptr(), x.member(i).as_ptr())
            };
            // SAFETY: operands validated non-null wherever the kernel reads
            // them; A and x are not read when alpha is zero.
            unsafe { hbmv_kernel(uplo, n, k, alpha, a_i, lda, x_i, incx, beta, y.member(i).as_mut_ptr(), incy) };
        });

        if handle.check_numerics() {
            check_vector("y", y, count, n, incy)?;
        }
        Ok(())
    })
}

/// `y := alpha A x + beta y` for a Hermitian n × n band matrix A with k
/// super-diagonals (upper) or sub-diagonals (lower)
///
/// A is the (k+1) × n band array of the `uplo` triangle, `lda >= k + 1`.
/// The imaginary part of the diagonal is taken as zero. Only complex
/// element types are accepted.
///
/// # Safety
/// - non-null `a` must cover the (k+1) × n band array at `lda`
/// - non-null `x` and `y` must cover n elements at their increments
/// - y must not overlap A or x
#[allow(clippy::too_many_arguments)]
pub unsafe fn hbmv<T: ComplexElement, I: ApiInt>(
    handle: Option<&Handle>,
    uplo: Fill,
    n: I,
    k: I,
    alpha: ScalarPtr<'_, T>,
    a: DevicePtr<T>,
    lda: I,
    x: DevicePtr<T>,
    incx: I,
    beta: ScalarPtr<'_, T>,
    y: DevicePtr<T>,
    incy: I,
) -> Result<()> {
    hbmv_launch(
        "hbmv",
        handle,
        uplo,
        n.to_i64(),
        k.to_i64(),
        alpha,
        &Single(a),
        lda.to_i64(),
        &Single(x),
        incx.to_i64(),
        beta,
        &Single(y),
        incy.to_i64(),
        1,
    )
}

/// [`hbmv`] over device arrays of per-member pointers
///
/// # Safety
/// As for [`hbmv`], per member; each non-null array must hold
/// `batch_count` readable pointers.
#[allow(clippy::too_many_arguments)]
pub unsafe fn hbmv_batched<T: ComplexElement, I: ApiInt>(
    handle: Option<&Handle>,
    uplo: Fill,
    n: I,
    k: I,
    alpha: ScalarPtr<'_, T>,
    a: DevicePtr<DevicePtr<T>>,
    lda: I,
    x: DevicePtr<DevicePtr<T>>,
    incx: I,
    beta: ScalarPtr<'_, T>,
    y: DevicePtr<DevicePtr<T>>,
    incy: I,
    batch_count: I,
) -> Result<()> {
    // SAFETY: the arrays are readable per this function's contract.
    let (a, x, y) = unsafe { (PointerArray::new(a), PointerArray::new(x), PointerArray::new(y)) };
    hbmv_launch(
        "hbmv_batched",
        handle,
        uplo,
        n.to_i64(),
        k.to_i64(),
        alpha,
        &a,
        lda.to_i64(),
        &x,
        incx.to_i64(),
        beta,
        &y,
        incy.to_i64(),
        batch_count.to_i64(),
    )
}

/// [`hbmv`] over members at fixed element strides
///
/// # Safety
/// As for [`hbmv`], for every member at its stride.
#[allow(clippy::too_many_arguments)]
pub unsafe fn hbmv_strided_batched<T: ComplexElement, I: ApiInt>(
    handle: Option<&Handle>,
    uplo: Fill,
    n: I,
    k: I,
    alpha: ScalarPtr<'_, T>,
    a: DevicePtr<T>,
    lda: I,
    stride_a: i64,
    x: DevicePtr<T>,
    incx: I,
    stride_x: i64,
    beta: ScalarPtr<'_, T>,
    y: DevicePtr<T>,
    incy: I,
    stride_y: i64,
    batch_count: I,
) -> Result<()> {
    hbmv_launch(
        "hbmv_strided_batched",
        handle,
        uplo,
        n.to_i64(),
        k.to_i64(),
        alpha,
        &Strided::new(a, stride_a),
        lda.to_i64(),
        &Strided::new(x, stride_x),
        incx.to_i64(),
        beta,
        &Strided::new(y, stride_y),
        incy.to_i64(),
        batch_count.to_i64(),
    )
}
