//! # numr-blas
//!
//! **Batched triangular solve and multiply with BLAS-style argument
//! validation and workspace negotiation.**
//!
//! numr-blas implements TRSM (`op(A) X = alpha B`), TRMM and the routines
//! around them: triangular inversion, packed triangular solve, symmetric
//! packed and Hermitian banded matrix-vector products. Each routine comes
//! in a single, pointer-array batched and strided batched form, over `f32`,
//! `f64`, [`Complex64`](dtype::Complex64) and
//! [`Complex128`](dtype::Complex128) (the Hermitian product is complex
//! only).
//!
//! ## How TRSM works
//!
//! - **Blocked inversion**: the diagonal of A is cut into 128 × 128 blocks
//!   that are inverted once, turning substitution into matrix products
//! - **Workspace negotiation**: a sizing oracle reports both the largest
//!   and the exact workspace a call needs; memory-size queries let callers
//!   pre-size a fixed pool on the [`Handle`](handle::Handle)
//! - **Graceful fallback**: when the full scratch is not available a
//!   transposed solve drops to an in-place panel strategy
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use numr_blas::prelude::*;
//!
//! let handle = Handle::new(CpuDevice::new());
//! let a = DeviceBuffer::from_host(handle.client(), &a_host)?;
//! let b = DeviceBuffer::from_host(handle.client(), &b_host)?;
//! let alpha = 1.0f64;
//!
//! // SAFETY: a and b are live buffers of lda × m and ldb × n elements.
//! unsafe {
//!     trsm(
//!         Some(&handle),
//!         Side::Left, Fill::Lower, Operation::None, Diagonal::NonUnit,
//!         m, n, ScalarPtr::host(&alpha),
//!         a.as_ptr(), lda, b.as_ptr(), ldb,
//!     )?;
//! }
//! let x = b.to_host();
//! ```
//!
//! ## Feature Flags
//!
//! - `rayon` (default): batch members run on the rayon thread pool

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod algorithm;
pub mod dtype;
pub mod error;
pub mod handle;
pub mod ops;
pub mod reference;
pub mod runtime;
pub mod verify;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::dtype::{Complex64, Complex128, ComplexElement, DType, Element};
    pub use crate::error::{Error, Result, Status};
    pub use crate::handle::{Handle, HandleConfig, PointerMode};
    pub use crate::ops::{Diagonal, Fill, Operation, ScalarPtr, Side};
    pub use crate::ops::{
        hbmv, hbmv_batched, hbmv_strided_batched, spmv, spmv_batched, spmv_strided_batched, tpsv,
        tpsv_batched, tpsv_strided_batched, trmm, trmm_batched, trmm_outofplace,
        trmm_outofplace_batched, trmm_outofplace_strided_batched, trmm_strided_batched, trsm,
        trsm_batched, trsm_batched_ex, trsm_ex, trsm_strided_batched, trsm_strided_batched_ex,
        trtri, trtri_strided_batched,
    };
    pub use crate::runtime::cpu::{CpuDevice, CpuRuntime};
    pub use crate::runtime::{DeviceBuffer, DevicePtr, Device, Runtime, RuntimeClient};
}
