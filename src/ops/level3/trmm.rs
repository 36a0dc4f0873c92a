//! Triangular matrix multiply (TRMM)
//!
//! In place: `B := alpha op(A) B` (left) or `B := alpha B op(A)` (right).
//! Out of place: the same product written to C, B left untouched.

use super::super::args::{ArgCheck, trmm_arg_check};
use super::super::batch::{BatchAccessor, PointerArray, Single, Strided};
use super::super::boundary::api_boundary;
use super::super::enums::{Diagonal, Fill, Operation, Side};
use super::super::int::ApiInt;
use super::super::numerics::{check_matrix, check_triangle};
use super::super::scalar::ScalarPtr;
use crate::dtype::Element;
use crate::error::{Error, Result};
use crate::handle::Handle;
use crate::runtime::DevicePtr;
use crate::runtime::cpu::kernels::{fill_matrix_kernel, trmm_kernel, trmm_outofplace_kernel};
use tracing::{debug, trace};

fn first_null<T, A: BatchAccessor<T>>(arg: &'static str, acc: &A, batch_count: usize) -> Result<()> {
    if acc.first_null_member(batch_count).is_some() {
        return Err(Error::invalid_pointer(arg));
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn trmm_launch<T, A, B, C>(
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
    c: Option<(&C, i64)>,
    batch_count: i64,
) -> Result<()>
where
    T: Element,
    A: BatchAccessor<T>,
    B: BatchAccessor<T>,
    C: BatchAccessor<T>,
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
            ldc = c.map(|(_, ldc)| ldc),
            batch_count,
            "call"
        );
        let check = trmm_arg_check(
            handle, side, uplo, trans, diag, m, n, alpha, a, lda, b, ldb, c, batch_count,
        )?;
        if check == ArgCheck::QuickReturn {
            return Ok(());
        }
        let handle = handle.ok_or(Error::InvalidHandle)?;
        // No workspace from the handle; nothing to record in a size query
        if handle.is_querying_memory() {
            return Ok(());
        }
        let alpha = alpha
            .resolve(handle.pointer_mode())
            .ok_or_else(|| Error::invalid_pointer("alpha"))?;

        let (m, n, lda, ldb) = (m as usize, n as usize, lda as usize, ldb as usize);
        let count = batch_count as usize;
        let k = if side == Side::Left { m } else { n };
        // Output operand: C out of place, B in place
        let (out_name, ldo) = match c {
            Some((_, ldc)) => ("C", ldc as usize),
            None => ("B", ldb),
        };
        let out_member = |i: usize| match c {
            Some((c, _)) => c.member(i),
            None => b.member(i),
        };
        match c {
            Some((c, _)) => first_null(out_name, c, count)?,
            None => first_null(out_name, b, count)?,
        }

        if alpha.is_zero_on(handle.device()) {
            trace!(routine, "alpha is zero, zero-filling {out_name}");
            handle.client().for_each_member(count, |i| {
                // SAFETY: output validated non-null, m × n at ldo.
                unsafe { fill_matrix_kernel(m, n, T::zero(), out_member(i).as_mut_ptr(), ldo) };
            });
        } else {
            first_null("A", a, count)?;
            first_null("B", b, count)?;
            if handle.check_numerics() {
                check_triangle("A", a, count, uplo, diag, k, lda)?;
                check_matrix("B", b, count, m, n, ldb)?;
            }
            handle.client().for_each_member(count, |i| {
                let alpha = alpha.load();
                let a_i = a.member(i).as_ptr();
                let b_i = b.member(i);
                // SAFETY: operands validated non-null for their regions; C
                // does not alias A or B.
                unsafe {
                    match c {
                        Some((c, ldc)) => trmm_outofplace_kernel(
                            side,
                            uplo,
                            trans,
                            diag,
                            m,
                            n,
                            alpha,
                            a_i,
                            lda,
                            b_i.as_ptr(),
                            ldb,
                            c.member(i).as_mut_ptr(),
                            ldc as usize,
                        ),
                        None => trmm_kernel(side, uplo, trans, diag, m, n, alpha, a_i, lda, b_i.as_mut_ptr(), ldb),
                    }
                }
            });
        }

        if handle.check_numerics() {
            match c {
                Some((c, _)) => check_matrix(out_name, c, count, m, n, ldo)?,
                None => check_matrix(out_name, b, count, m, n, ldo)?,
            }
        }
        Ok(())
    })
}

/// `B := alpha op(A) B` (left) or `B := alpha B op(A)` (right)
///
/// A is K × K triangular with K = m (left) or n (right). With
/// `alpha == 0` B is zero-filled and A is not referenced.
///
/// # Safety
/// - non-null `a` and `b` must address live device memory covering the
///   K × K and m × n operands at their leading dimensions
/// - B must not overlap A
#[allow(clippy::too_many_arguments)]
pub unsafe fn trmm<T: Element, I: ApiInt>(
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
    trmm_launch::<T, _, _, Single<T>>(
        "trmm",
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
        None,
        1,
    )
}

/// [`trmm`] over device arrays of per-member pointers
///
/// # Safety
/// As for [`trmm`], per member; non-null `a` and `b` must each hold
/// `batch_count` readable pointers.
#[allow(clippy::too_many_arguments)]
pub unsafe fn trmm_batched<T: Element, I: ApiInt>(
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
    trmm_launch::<T, _, _, Single<T>>(
        "trmm_batched",
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
        None,
        batch_count.to_i64(),
    )
}

/// [`trmm`] over members at fixed element strides
///
/// # Safety
/// As for [`trmm`], for every member at its stride.
#[allow(clippy::too_many_arguments)]
pub unsafe fn trmm_strided_batched<T: Element, I: ApiInt>(
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
    trmm_launch::<T, _, _, Single<T>>(
        "trmm_strided_batched",
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
        None,
        batch_count.to_i64(),
    )
}

/// `C := alpha op(A) B` (left) or `C := alpha B op(A)` (right)
///
/// `ldc >= m`. With `alpha == 0` only C is referenced.
///
/// # Safety
/// As for [`trmm`]; a non-null `c` must cover m × n at `ldc` and overlap
/// neither A nor B.
#[allow(clippy::too_many_arguments)]
pub unsafe fn trmm_outofplace<T: Element, I: ApiInt>(
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
    c: DevicePtr<T>,
    ldc: I,
) -> Result<()> {
    trmm_launch(
        "trmm_outofplace",
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
        Some((&Single(c), ldc.to_i64())),
        1,
    )
}

/// [`trmm_outofplace`] over device arrays of per-member pointers
///
/// # Safety
/// As for [`trmm_outofplace`], per member; the three pointer arrays
/// must each hold `batch_count` readable pointers.
#[allow(clippy::too_many_arguments)]
pub unsafe fn trmm_outofplace_batched<T: Element, I: ApiInt>(
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
    c: DevicePtr<DevicePtr<T>>,
    ldc: I,
    batch_count: I,
) -> Result<()> {
    // SAFETY: the arrays are readable per this function's contract.
    let (a, b, c) = unsafe { (PointerArray::new(a), PointerArray::new(b), PointerArray::new(c)) };
    trmm_launch(
        "trmm_outofplace_batched",
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
        Some((&c, ldc.to_i64())),
        batch_count.to_i64(),
    )
}

/// [`trmm_outofplace`] over members at fixed element strides
///
/// # Safety
/// As for [`trmm_outofplace`], for every member at its stride.
#[allow(clippy::too_many_arguments)]
pub unsafe fn trmm_outofplace_strided_batched<T: Element, I: ApiInt>(
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
    c: DevicePtr<T>,
    ldc: I,
    stride_c: i64,
    batch_count: I,
) -> Result<()> {
    trmm_launch(
        "trmm_outofplace_strided_batched",
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
        Some((&Strided::new(c, stride_c), ldc.to_i64())),
        batch_count.to_i64(),
    )
}
