//! Device addresses and owned device allocations

use super::cpu::{CpuClient, CpuRuntime};
use super::{Allocator, Runtime, RuntimeClient};
use crate::error::{Error, Result};
use bytemuck::{Pod, Zeroable};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Typed device address
///
/// A plain 64-bit address with the element type attached. The null address
/// is representable because the BLAS routines must detect and report it.
/// `DevicePtr` is `Pod`, so arrays of pointers can themselves live in
/// device memory (the batched pointer-array form).
#[repr(transparent)]
pub struct DevicePtr<T> {
    addr: u64,
    _marker: PhantomData<fn() -> T>,
}

impl<T> DevicePtr<T> {
    /// The null address
    pub const fn null() -> Self {
        Self {
            addr: 0,
            _marker: PhantomData,
        }
    }

    /// Wrap a raw device address
    ///
    /// # Safety
    ///
    /// `addr` must be null or point into a live device allocation holding
    /// values of type `T` for as long as the pointer is used.
    pub const unsafe fn from_raw(addr: u64) -> Self {
        Self {
            addr,
            _marker: PhantomData,
        }
    }

    /// The raw device address
    #[inline]
    pub const fn addr(self) -> u64 {
        self.addr
    }

    /// True for the null address
    #[inline]
    pub const fn is_null(self) -> bool {
        self.addr == 0
    }

    /// Host view of the address; device memory of the CPU runtime is host memory
    #[inline]
    pub fn as_ptr(self) -> *const T {
        self.addr as *const T
    }

    /// Mutable host view of the address
    #[inline]
    pub fn as_mut_ptr(self) -> *mut T {
        self.addr as *mut T
    }

    /// Pointer `elems` elements further on; null stays null
    #[inline]
    pub fn offset(self, elems: isize) -> Self {
        if self.is_null() {
            return self;
        }
        let bytes = elems.wrapping_mul(std::mem::size_of::<T>() as isize);
        Self {
            addr: self.addr.wrapping_add_signed(bytes as i64),
            _marker: PhantomData,
        }
    }
}

impl<T> Clone for DevicePtr<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for DevicePtr<T> {}

impl<T> PartialEq for DevicePtr<T> {
    fn eq(&self, other: &Self) -> bool {
        self.addr == other.addr
    }
}

impl<T> Eq for DevicePtr<T> {}

impl<T> Hash for DevicePtr<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr.hash(state);
    }
}

impl<T> Default for DevicePtr<T> {
    fn default() -> Self {
        Self::null()
    }
}

impl<T> fmt::Debug for DevicePtr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DevicePtr({:#x})", self.addr)
    }
}

// SAFETY: repr(transparent) over a u64; the marker is zero-sized.
unsafe impl<T: 'static> Zeroable for DevicePtr<T> {}
// SAFETY: as above, every bit pattern is a valid address value.
unsafe impl<T: 'static> Pod for DevicePtr<T> {}

/// Owned device allocation of `len` elements
///
/// Memory comes from the client's allocator and is returned on drop.
/// Allocation is zero-initialized.
pub struct DeviceBuffer<T: Pod> {
    ptr: u64,
    len: usize,
    client: CpuClient,
    _marker: PhantomData<T>,
}

impl<T: Pod> DeviceBuffer<T> {
    /// Allocate `len` zeroed elements on the client's device
    pub fn new(client: &CpuClient, len: usize) -> Result<Self> {
        let size = len
            .checked_mul(std::mem::size_of::<T>())
            .ok_or_else(|| Error::invalid_size("len", format!("{len} elements overflow")))?;
        let ptr = client.allocator().allocate(size)?;
        Ok(Self {
            ptr,
            len,
            client: client.clone(),
            _marker: PhantomData,
        })
    }

    /// Allocate and upload `data`
    pub fn from_host(client: &CpuClient, data: &[T]) -> Result<Self> {
        let mut buf = Self::new(client, data.len())?;
        buf.copy_from_host(data);
        Ok(buf)
    }

    /// Overwrite the buffer prefix with `data`
    ///
    /// # Panics
    ///
    /// Panics if `data` is longer than the buffer.
    pub fn copy_from_host(&mut self, data: &[T]) {
        assert!(
            data.len() <= self.len,
            "host data ({}) larger than device buffer ({})",
            data.len(),
            self.len
        );
        // SAFETY: the buffer owns at least `data.len()` elements.
        unsafe {
            CpuRuntime::copy_to_device(bytemuck::cast_slice(data), self.ptr, self.client.device());
        }
    }

    /// Download the whole buffer
    pub fn to_host(&self) -> Vec<T> {
        let mut out = vec![T::zeroed(); self.len];
        // SAFETY: `out` has exactly the buffer's length.
        unsafe {
            CpuRuntime::copy_from_device(self.ptr, bytemuck::cast_slice_mut(&mut out), self.client.device());
        }
        out
    }

    /// Device address of the first element (null for an empty buffer)
    #[inline]
    pub fn as_ptr(&self) -> DevicePtr<T> {
        // SAFETY: the address comes from our own live allocation.
        unsafe { DevicePtr::from_raw(self.ptr) }
    }

    /// Number of elements
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when the buffer holds no elements
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Size of the allocation in bytes
    #[inline]
    pub fn size_in_bytes(&self) -> usize {
        self.len * std::mem::size_of::<T>()
    }
}

impl<T: Pod> Drop for DeviceBuffer<T> {
    fn drop(&mut self) {
        // SAFETY: the buffer's own allocation, released once.
        unsafe { self.client.allocator().deallocate(self.ptr, self.size_in_bytes()) };
    }
}

impl<T: Pod> fmt::Debug for DeviceBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceBuffer")
            .field("ptr", &format_args!("{:#x}", self.ptr))
            .field("len", &self.len)
            .finish()
    }
}
