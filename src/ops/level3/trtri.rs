//! Triangular inversion (TRTRI)
//!
//! Produces the full inverse of a triangular matrix. Callers of the `_ex`
//! solves use it to prepare inverted diagonal blocks ahead of time.

use super::super::args::{ArgCheck, trtri_arg_check};
use super::super::batch::{BatchAccessor, Single, Strided};
use super::super::boundary::api_boundary;
use super::super::enums::{Diagonal, Fill};
use super::super::int::ApiInt;
use super::super::numerics::{check_matrix, check_triangle};
use crate::dtype::Element;
use crate::error::{Error, Result};
use crate::handle::Handle;
use crate::runtime::DevicePtr;
use crate::runtime::cpu::kernels::trtri_kernel;
use tracing::debug;

#[allow(clippy::too_many_arguments)]
fn trtri_launch<T, A, V>(
    routine: &'static str,
    handle: Option<&Handle>,
    uplo: Fill,
    diag: Diagonal,
    n: i64,
    a: &A,
    lda: i64,
    inv_a: &V,
    ld_inv_a: i64,
    batch_count: i64,
) -> Result<()>
where
    T: Element,
    A: BatchAccessor<T>,
    V: BatchAccessor<T>,
{
    api_boundary(routine, || {
        debug!(routine, dtype = %T::DTYPE, %uplo, %diag, n, lda, ld_inv_a, batch_count, "call");
        let check = trtri_arg_check::<T, _, _>(handle, uplo, diag, n, a, lda, inv_a, ld_inv_a, batch_count)?;
        if check == ArgCheck::QuickReturn {
            return Ok(());
        }
        let handle = handle.ok_or(Error::InvalidHandle)?;
        if handle.is_querying_memory() {
            return Ok(());
        }
        let (n, lda, ldi, count) = (n as usize, lda as usize, ld_inv_a as usize, batch_count as usize);
        if a.first_null_member(count).is_some() {
            return Err(Error::invalid_pointer("A"));
        }
        if inv_a.first_null_member(count).is_some() {
            return Err(Error::invalid_pointer("invA"));
        }
        if handle.check_numerics() {
            check_triangle("A", a, count, uplo, diag, n, lda)?;
        }

        handle.client().for_each_member(count, |i| {
            // SAFETY: A and invA validated non-null for n × n at their
            // leading dimensions; distinct members do not overlap.
            unsafe {
                trtri_kernel(uplo, diag, n, a.member(i).as_ptr(), lda, inv_a.member(i).as_mut_ptr(), ldi)
            };
        });

        if handle.check_numerics() {
            check_matrix("invA", inv_a, count, n, n, ldi)?;
        }
        Ok(())
    })
}

/// Invert the `uplo` triangle of the n × n matrix A into invA
///
/// The whole n × n region of invA is written: the opposite triangle is
/// zero and a unit diagonal is stored explicitly. Singular A is not
/// reported; a zero pivot inverts to zero.
///
/// # Safety
/// Non-null `a` and `inv_a` must address live, disjoint n × n matrices at
/// their leading dimensions.
#[allow(clippy::too_many_arguments)]
pub unsafe fn trtri<T: Element, I: ApiInt>(
    handle: Option<&Handle>,
    uplo: Fill,
    diag: Diagonal,
    n: I,
    a: DevicePtr<T>,
    lda: I,
    inv_a: DevicePtr<T>,
    ld_inv_a: I,
) -> Result<()> {
    trtri_launch(
        "trtri",
        handle,
        uplo,
        diag,
        n.to_i64(),
        &Single(a),
        lda.to_i64(),
        &Single(inv_a),
        ld_inv_a.to_i64(),
        1,
    )
}

/// [`trtri`] over members at fixed element strides
///
/// # Safety
/// As for [`trtri`], for every member at its stride.
#[allow(clippy::too_many_arguments)]
pub unsafe fn trtri_strided_batched<T: Element, I: ApiInt>(
    handle: Option<&Handle>,
    uplo: Fill,
    diag: Diagonal,
    n: I,
    a: DevicePtr<T>,
    lda: I,
    stride_a: i64,
    inv_a: DevicePtr<T>,
    ld_inv_a: I,
    stride_inv_a: i64,
    batch_count: I,
) -> Result<()> {
    trtri_launch(
        "trtri_strided_batched",
        handle,
        uplo,
        diag,
        n.to_i64(),
        &Strided::new(a, stride_a),
        lda.to_i64(),
        &Strided::new(inv_a, stride_inv_a),
        ld_inv_a.to_i64(),
        batch_count.to_i64(),
    )
}
