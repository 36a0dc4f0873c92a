//! CPU runtime implementation
//!
//! The CPU runtime emulates one or more BLAS devices on the host. Device
//! memory is ordinary heap memory, so a [`DevicePtr`](crate::runtime::DevicePtr)
//! is directly dereferenceable by the kernels in [`kernels`].
//!
//! Each [`CpuDevice`] carries its own memory accounting and an optional
//! capacity, which is how workspace exhaustion (and the backup workspace
//! path of the triangular solver) is exercised on a machine with plenty of
//! RAM.

mod client;
mod device;
pub(crate) mod kernels;
mod runtime;

pub use client::{CpuAllocator, CpuClient};
pub use device::CpuDevice;
pub use runtime::CpuRuntime;
