//! Argument validation
//!
//! Each check runs before any allocation or kernel launch and classifies a
//! call as erroneous (`Err`), trivially satisfied ([`ArgCheck::QuickReturn`])
//! or ready to compute ([`ArgCheck::Continue`]). Checks are ordered; the
//! first failure wins:
//!
//! 1. handle present, else [`Error::InvalidHandle`]
//! 2. mode flags legal for the routine, else [`Error::InvalidValue`]
//! 3. batch count non-negative; a zero batch returns early
//! 4. dimensions, leading dimensions and increments, else [`Error::InvalidSize`]
//! 5. empty problems return early, before any pointer is looked at
//! 6. scalar pointers, then operand pointers, else [`Error::InvalidPointer`]
//!
//! An `alpha == 0` solve or multiply never reads A, so A may be null. A
//! device-mode scalar is copied back synchronously for these shortcuts, so
//! both pointer modes accept the same calls.

use super::batch::BatchAccessor;
use super::enums::{Diagonal, Fill, Operation, Side};
use super::scalar::ScalarPtr;
use crate::dtype::Element;
use crate::error::{Error, Result, Status};
use crate::handle::Handle;

/// Result of a passed argument check
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ArgCheck {
    /// Nothing to compute; the call succeeds as is
    QuickReturn,
    /// Arguments are valid and the routine must compute
    Continue,
}

impl ArgCheck {
    /// The status code of this outcome
    pub fn status(self) -> Status {
        match self {
            Self::QuickReturn => Status::Success,
            Self::Continue => Status::Continue,
        }
    }

    /// Status of a whole check, as a validator returning a code would report it
    pub fn status_of(check: &Result<ArgCheck>) -> Status {
        match check {
            Ok(c) => c.status(),
            Err(e) => e.status(),
        }
    }
}

fn require_handle(handle: Option<&Handle>) -> Result<&Handle> {
    handle.ok_or(Error::InvalidHandle)
}

fn legal_side(side: Side) -> Result<()> {
    match side {
        Side::Both => Err(Error::invalid_value("side", side)),
        _ => Ok(()),
    }
}

fn legal_fill(uplo: Fill) -> Result<()> {
    match uplo {
        Fill::Full => Err(Error::invalid_value("uplo", uplo)),
        _ => Ok(()),
    }
}

/// `batch_count < 0` is an error, `== 0` a quick return
fn batch(batch_count: i64) -> Result<Option<ArgCheck>> {
    if batch_count < 0 {
        return Err(Error::invalid_size(
            "batch_count",
            format!("batch_count ({batch_count}) < 0"),
        ));
    }
    Ok((batch_count == 0).then_some(ArgCheck::QuickReturn))
}

fn non_negative(arg: &'static str, v: i64) -> Result<()> {
    if v < 0 {
        return Err(Error::invalid_size(arg, format!("{arg} ({v}) < 0")));
    }
    Ok(())
}

fn leading_dim(arg: &'static str, ld: i64, min: i64) -> Result<()> {
    if ld < min {
        return Err(Error::invalid_size(arg, format!("{arg} ({ld}) < {min}")));
    }
    Ok(())
}

fn increment(arg: &'static str, inc: i64) -> Result<()> {
    if inc == 0 {
        return Err(Error::invalid_size(arg, format!("{arg} is 0")));
    }
    Ok(())
}

fn pointer<T, P: BatchAccessor<T>>(arg: &'static str, p: &P) -> Result<()> {
    if p.is_null() {
        return Err(Error::invalid_pointer(arg));
    }
    Ok(())
}

/// Scalar must be present; returns its value
fn scalar<T: Element>(arg: &'static str, handle: &Handle, s: ScalarPtr<'_, T>) -> Result<T> {
    let resolved = s
        .resolve(handle.pointer_mode())
        .ok_or_else(|| Error::invalid_pointer(arg))?;
    Ok(resolved.fetch(handle.device()))
}

/// Validate a triangular solve
///
/// `K` is `m` for the left side and `n` for the right side;
/// `lda >= K` and `ldb >= m` are required.
#[allow(clippy::too_many_arguments)]
pub fn trsm_arg_check<T, A, B>(
    handle: Option<&Handle>,
    side: Side,
    uplo: Fill,
    _trans: Operation,
    _diag: Diagonal,
    m: i64,
    n: i64,
    alpha: ScalarPtr<'_, T>,
    a: &A,
    lda: i64,
    b: &B,
    ldb: i64,
    batch_count: i64,
) -> Result<ArgCheck>
where
    T: Element,
    A: BatchAccessor<T>,
    B: BatchAccessor<T>,
{
    let handle = require_handle(handle)?;
    legal_side(side)?;
    legal_fill(uplo)?;
    if let Some(quick) = batch(batch_count)? {
        return Ok(quick);
    }
    non_negative("m", m)?;
    non_negative("n", n)?;
    leading_dim("lda", lda, side.triangular_order(m, n))?;
    leading_dim("ldb", ldb, m)?;
    if m == 0 || n == 0 {
        return Ok(ArgCheck::QuickReturn);
    }

    if !scalar("alpha", handle, alpha)?.is_zero() {
        pointer("A", a)?;
    }
    pointer("B", b)?;
    Ok(ArgCheck::Continue)
}

/// Validate a triangular multiply
///
/// With `c = None` the multiply is in place on B. With `Some((c, ldc))`
/// the result goes to C, which needs `ldc >= m`; B is then only required
/// when alpha is not zero.
#[allow(clippy::too_many_arguments)]
pub fn trmm_arg_check<T, A, B, C>(
    handle: Option<&Handle>,
    side: Side,
    uplo: Fill,
    _trans: Operation,
    _diag: Diagonal,
    m: i64,
    n: i64,
    alpha: ScalarPtr<'_, T>,
    a: &A,
    lda: i64,
    b: &B,
    ldb: i64,
    c: Option<(&C, i64)>,
    batch_count: i64,
) -> Result<ArgCheck>
where
    T: Element,
    A: BatchAccessor<T>,
    B: BatchAccessor<T>,
    C: BatchAccessor<T>,
{
    let handle = require_handle(handle)?;
    legal_side(side)?;
    legal_fill(uplo)?;
    if let Some(quick) = batch(batch_count)? {
        return Ok(quick);
    }
    non_negative("m", m)?;
    non_negative("n", n)?;
    leading_dim("lda", lda, side.triangular_order(m, n))?;
    leading_dim("ldb", ldb, m)?;
    if let Some((_, ldc)) = c {
        leading_dim("ldc", ldc, m)?;
    }
    if m == 0 || n == 0 {
        return Ok(ArgCheck::QuickReturn);
    }

    let alpha_zero = scalar("alpha", handle, alpha)?.is_zero();
    match c {
        Some((c, _)) => {
            if !alpha_zero {
                pointer("A", a)?;
                pointer("B", b)?;
            }
            pointer("C", c)?;
        }
        None => {
            if !alpha_zero {
                pointer("A", a)?;
            }
            pointer("B", b)?;
        }
    }
    Ok(ArgCheck::Continue)
}

/// Validate a triangular inversion of order `n`
#[allow(clippy::too_many_arguments)]
pub fn trtri_arg_check<T, A, V>(
    handle: Option<&Handle>,
    uplo: Fill,
    _diag: Diagonal,
    n: i64,
    a: &A,
    lda: i64,
    inv_a: &V,
    ld_inv_a: i64,
    batch_count: i64,
) -> Result<ArgCheck>
where
    A: BatchAccessor<T>,
    V: BatchAccessor<T>,
{
    require_handle(handle)?;
    legal_fill(uplo)?;
    if let Some(quick) = batch(batch_count)? {
        return Ok(quick);
    }
    non_negative("n", n)?;
    leading_dim("lda", lda, n)?;
    leading_dim("ldinvA", ld_inv_a, n)?;
    if n == 0 {
        return Ok(ArgCheck::QuickReturn);
    }
    pointer("A", a)?;
    pointer("invA", inv_a)?;
    Ok(ArgCheck::Continue)
}

/// Validate a packed triangular solve
#[allow(clippy::too_many_arguments)]
pub fn tpsv_arg_check<T, A, X>(
    handle: Option<&Handle>,
    uplo: Fill,
    _trans: Operation,
    _diag: Diagonal,
    n: i64,
    ap: &A,
    x: &X,
    incx: i64,
    batch_count: i64,
) -> Result<ArgCheck>
where
    A: BatchAccessor<T>,
    X: BatchAccessor<T>,
{
    require_handle(handle)?;
    legal_fill(uplo)?;
    if let Some(quick) = batch(batch_count)? {
        return Ok(quick);
    }
    non_negative("n", n)?;
    increment("incx", incx)?;
    if n == 0 {
        return Ok(ArgCheck::QuickReturn);
    }
    pointer("AP", ap)?;
    pointer("x", x)?;
    Ok(ArgCheck::Continue)
}

/// Validate a symmetric packed matrix-vector product
///
/// `alpha == 0 && beta == 1` leaves y unchanged and returns early with every operand allowed to be null; `alpha == 0`
/// alone lets A and x be null.
#[allow(clippy::too_many_arguments)]
pub fn spmv_arg_check<T, A, X, Y>(
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
) -> Result<ArgCheck>
where
    T: Element,
    A: BatchAccessor<T>,
    X: BatchAccessor<T>,
    Y: BatchAccessor<T>,
{
    let handle = require_handle(handle)?;
    legal_fill(uplo)?;
    if let Some(quick) = batch(batch_count)? {
        return Ok(quick);
    }
    non_negative("n", n)?;
    increment("incx", incx)?;
    increment("incy", incy)?;
    if n == 0 {
        return Ok(ArgCheck::QuickReturn);
    }

    let alpha = scalar("alpha", handle, alpha)?;
    let beta = scalar("beta", handle, beta)?;
    let alpha_zero = alpha.is_zero();
    if alpha_zero && beta.is_one() {
        return Ok(ArgCheck::QuickReturn);
    }
    if !alpha_zero {
        pointer("AP", ap)?;
        pointer("x", x)?;
    }
    pointer("y", y)?;
    Ok(ArgCheck::Continue)
}

/// Validate a Hermitian banded matrix-vector product
///
/// A is stored as a (k+1) × n band array, so `lda >= k + 1`. Scalars and
/// operand pointers follow [`spmv_arg_check`].
#[allow(clippy::too_many_arguments)]
pub fn hbmv_arg_check<T, A, X, Y>(
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
) -> Result<ArgCheck>
where
    T: Element,
    A: BatchAccessor<T>,
    X: BatchAccessor<T>,
    Y: BatchAccessor<T>,
{
    let handle = require_handle(handle)?;
    legal_fill(uplo)?;
    if let Some(quick) = batch(batch_count)? {
        return Ok(quick);
    }
    non_negative("n", n)?;
    non_negative("k", k)?;
    leading_dim("lda", lda, k.saturating_add(1))?;
    increment("incx", incx)?;
    increment("incy", incy)?;
    if n == 0 {
        return Ok(ArgCheck::QuickReturn);
    }

    let alpha = scalar("alpha", handle, alpha)?;
    let beta = scalar("beta", handle, beta)?;
    let alpha_zero = alpha.is_zero();
    if alpha_zero && beta.is_one() {
        return Ok(ArgCheck::QuickReturn);
    }
    if !alpha_zero {
        pointer("A", a)?;
        pointer("x", x)?;
    }
    pointer("y", y)?;
    Ok(ArgCheck::Continue)
}
