//! Scalars that may live in host or device memory

use crate::dtype::Element;
use crate::handle::PointerMode;
use crate::runtime::cpu::{CpuDevice, CpuRuntime};
use crate::runtime::{DevicePtr, Runtime};

/// A scalar argument as the caller passes it
///
/// Whether the value is read on the host at call time or at kernel launch
/// is decided by the handle's [`PointerMode`], not by how it was built: on
/// the CPU runtime a host reference is also a valid device address and a
/// device address is also readable from the host.
#[derive(Copy, Clone, Debug)]
pub struct ScalarPtr<'a, T>(Repr<'a, T>);

#[derive(Copy, Clone, Debug)]
enum Repr<'a, T> {
    Null,
    Host(&'a T),
    Device(DevicePtr<T>),
}

impl<T> Default for ScalarPtr<'_, T> {
    fn default() -> Self {
        Self(Repr::Null)
    }
}

impl<'a, T: Element> ScalarPtr<'a, T> {
    /// Scalar in host memory
    pub fn host(value: &'a T) -> Self {
        Self(Repr::Host(value))
    }

    /// Scalar in device memory
    ///
    /// # Safety
    ///
    /// A non-null `ptr` must stay valid for reads of one `T` for as long
    /// as the returned value is passed to routines. The value may be read
    /// during argument checking as well as by the kernels.
    pub unsafe fn device(ptr: DevicePtr<T>) -> Self {
        if ptr.is_null() {
            Self(Repr::Null)
        } else {
            Self(Repr::Device(ptr))
        }
    }

    /// The null scalar pointer
    pub fn null() -> Self {
        Self(Repr::Null)
    }

    /// True when no scalar was passed
    pub fn is_null(&self) -> bool {
        matches!(self.0, Repr::Null)
    }

    /// Resolve into the tagged form the kernels consume
    ///
    /// Returns `None` for a null pointer. In host mode the value is read
    /// now; in device mode only the address is kept.
    pub(crate) fn resolve(self, mode: PointerMode) -> Option<Scalar<T>> {
        match (self.0, mode) {
            (Repr::Null, _) => None,
            (Repr::Host(v), PointerMode::Host) => Some(Scalar::HostValue(*v)),
            // SAFETY: `ScalarPtr::device` requires the address to be
            // readable while the scalar is in use.
            (Repr::Device(p), PointerMode::Host) => Some(Scalar::HostValue(unsafe { read(p) })),
            (Repr::Host(v), PointerMode::Device) => {
                // SAFETY: the reference outlives the routine call.
                Some(Scalar::DevicePointer(unsafe {
                    DevicePtr::from_raw(v as *const T as u64)
                }))
            }
            (Repr::Device(p), PointerMode::Device) => Some(Scalar::DevicePointer(p)),
        }
    }
}

/// A resolved scalar: a value read on the host, or an address the kernel
/// dereferences at launch
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) enum Scalar<T> {
    /// Value read at call time
    HostValue(T),
    /// Value read by the kernel
    DevicePointer(DevicePtr<T>),
}

impl<T: Element> Scalar<T> {
    /// The value, copied back synchronously when it lives on the device
    ///
    /// Used for the zero and identity shortcuts, which must agree in both
    /// pointer modes.
    pub(crate) fn fetch(&self, device: &CpuDevice) -> T {
        match self {
            Self::HostValue(v) => *v,
            Self::DevicePointer(p) => {
                let mut v = T::zeroed();
                // SAFETY: see `load`.
                unsafe { CpuRuntime::copy_from_device(p.addr(), bytemuck::bytes_of_mut(&mut v), device) };
                v
            }
        }
    }

    /// True when the scalar equals zero, wherever it lives
    pub(crate) fn is_zero_on(&self, device: &CpuDevice) -> bool {
        self.fetch(device).is_zero()
    }

    /// The value as a kernel sees it at launch
    pub(crate) fn load(&self) -> T {
        match self {
            Self::HostValue(v) => *v,
            // SAFETY: only built by `resolve`, from a host reference or a
            // `ScalarPtr::device` address that is readable during the call.
            Self::DevicePointer(p) => unsafe { read(*p) },
        }
    }
}

unsafe fn read<T: Element>(p: DevicePtr<T>) -> T {
    unsafe { std::ptr::read(p.addr() as *const T) }
}
