//! BLAS operations
//!
//! The public routine surface: triangular solve and multiply (level 3) and
//! packed and banded products and solves (level 2), each in a non-batched,
//! pointer-array batched and strided batched form.
//!
//! The routines take raw device addresses ([`DevicePtr`](crate::runtime::DevicePtr)),
//! which carry no lifetime, so every routine is an `unsafe fn` whose
//! `# Safety` section states the extent each address must cover. Device
//! scalars and pointer arrays make the same promise when they are built
//! ([`ScalarPtr::device`], [`PointerArray::new`]).
//!
//! ```
//! use numr_blas::prelude::*;
//!
//! let handle = Handle::new(CpuDevice::new());
//! let a = DeviceBuffer::from_host(handle.client(), &[2.0f64]).unwrap();
//! let b = DeviceBuffer::from_host(handle.client(), &[6.0f64]).unwrap();
//! let alpha = 1.0f64;
//! // SAFETY: a and b are live 1 × 1 buffers.
//! unsafe {
//!     trsm(
//!         Some(&handle),
//!         Side::Left, Fill::Lower, Operation::None, Diagonal::NonUnit,
//!         1i64, 1, ScalarPtr::host(&alpha),
//!         a.as_ptr(), 1, b.as_ptr(), 1,
//!     )
//!     .unwrap();
//! }
//! assert_eq!(b.to_host(), vec![3.0]);
//! ```
//!
//! Calling a routine outside `unsafe` does not compile:
//!
//! ```compile_fail
//! use numr_blas::prelude::*;
//!
//! let handle = Handle::new(CpuDevice::new());
//! let alpha = 1.0f64;
//! let b = DevicePtr::<f64>::null();
//! let _ = trsm(
//!     Some(&handle),
//!     Side::Left, Fill::Lower, Operation::None, Diagonal::NonUnit,
//!     1i64, 1, ScalarPtr::host(&alpha),
//!     b, 1, b, 1,
//! );
//! ```
//!
//! # Design
//!
//! Every routine is a thin front end over one launch function:
//!
//! ```text
//! trsm / trsm_batched / trsm_strided_batched / trsm_*_ex
//!   └── BatchAccessor (Single | PointerArray | Strided)
//!         └── launch
//!               ├── *_arg_check       (ordered validation, quick returns)
//!               ├── memory-size query (record workspace, return)
//!               ├── check numerics    (inputs)
//!               ├── kernels, one call per batch member
//!               └── check numerics    (outputs)
//! ```
//!
//! All routines run inside a panic boundary, so a fault surfaces as
//! [`Error::Internal`](crate::error::Error::Internal) instead of unwinding
//! into the caller.
//!
//! Integer arguments are generic over [`ApiInt`] (`i32` or `i64`); strides
//! between batch members are always `i64`.

mod args;
mod batch;
mod boundary;
mod enums;
mod int;
mod numerics;
mod scalar;

pub mod level2;
pub mod level3;

pub use args::{
    ArgCheck, hbmv_arg_check, spmv_arg_check, tpsv_arg_check, trmm_arg_check, trsm_arg_check,
    trtri_arg_check,
};
pub use batch::{BatchAccessor, PointerArray, Single, Strided};
pub use enums::{Diagonal, Fill, Operation, Side};
pub use int::ApiInt;
pub use level2::*;
pub use level3::*;
pub use scalar::ScalarPtr;
