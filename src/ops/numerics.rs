//! Check-numerics scans
//!
//! With check-numerics enabled on the handle, operands are scanned for NaN
//! and infinity before a routine computes (inputs) and after (outputs).
//! Only the region a routine actually references is scanned.

use super::batch::BatchAccessor;
use super::enums::{Diagonal, Fill};
use crate::dtype::Element;
use crate::error::{Error, Result};
use crate::runtime::cpu::kernels::all_finite_kernel;

fn scan<T, A, F>(arg: &'static str, acc: &A, batch_count: usize, member_finite: F) -> Result<()>
where
    A: BatchAccessor<T>,
    F: Fn(*const T) -> bool,
{
    for i in 0..batch_count {
        if !member_finite(acc.member(i).as_ptr()) {
            tracing::warn!(arg, member = i, "check numerics: non-finite value");
            return Err(Error::NumericsCheckFailed { arg });
        }
    }
    Ok(())
}

/// Scan an m × n general matrix of every member
pub(crate) fn check_matrix<T: Element, A: BatchAccessor<T>>(
    arg: &'static str,
    acc: &A,
    batch_count: usize,
    m: usize,
    n: usize,
    ld: usize,
) -> Result<()> {
    // SAFETY: operands were validated non-null and cover m × n at ld.
    scan(arg, acc, batch_count, |p| unsafe { all_finite_kernel(m, n, p, ld) })
}

/// Scan the referenced triangle of a k × k matrix of every member
pub(crate) fn check_triangle<T: Element, A: BatchAccessor<T>>(
    arg: &'static str,
    acc: &A,
    batch_count: usize,
    uplo: Fill,
    diag: Diagonal,
    k: usize,
    ld: usize,
) -> Result<()> {
    let skip_diag = usize::from(diag == Diagonal::Unit);
    scan(arg, acc, batch_count, |p| {
        (0..k).all(|j| {
            let rows = match uplo {
                Fill::Lower => j + skip_diag..k,
                _ => 0..(j + 1 - skip_diag),
            };
            // SAFETY: column j of a validated k × k operand.
            rows.is_empty() || unsafe { all_finite_kernel(rows.len(), 1, p.add(rows.start + j * ld), ld) }
        })
    })
}

/// Scan `len` contiguous elements of every member (packed matrices)
pub(crate) fn check_contiguous<T: Element, A: BatchAccessor<T>>(
    arg: &'static str,
    acc: &A,
    batch_count: usize,
    len: usize,
) -> Result<()> {
    // SAFETY: packed operand of `len` elements.
    scan(arg, acc, batch_count, |p| unsafe { all_finite_kernel(len, 1, p, len.max(1)) })
}

/// Scan an n-vector with increment `inc` of every member
pub(crate) fn check_vector<T: Element, A: BatchAccessor<T>>(
    arg: &'static str,
    acc: &A,
    batch_count: usize,
    n: usize,
    inc: i64,
) -> Result<()> {
    let step = inc.unsigned_abs() as usize;
    // SAFETY: vector spans 1 + (n-1)*|inc| elements from its base; viewed
    // as a 1 × n matrix with leading dimension |inc|.
    scan(arg, acc, batch_count, |p| unsafe { all_finite_kernel(1, n, p, step) })
}
