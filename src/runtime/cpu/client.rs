//! CPU client and allocator implementation

use super::device::CpuDevice;
use super::runtime::CpuRuntime;
use crate::error::{Error, Result};
use crate::runtime::{Allocator, RuntimeClient};
use std::alloc::{Layout as AllocLayout, alloc_zeroed, dealloc};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Alignment of every device allocation (AVX-512 width)
const ALIGN: usize = 64;

/// CPU client for operation dispatch
#[derive(Clone, Debug)]
pub struct CpuClient {
    pub(crate) device: CpuDevice,
    allocator: CpuAllocator,
}

impl CpuClient {
    /// Create a new CPU client
    pub fn new(device: CpuDevice) -> Self {
        let allocator = CpuAllocator {
            device: device.clone(),
        };
        Self { device, allocator }
    }

    /// Run `f` for every batch member `0..count`
    ///
    /// Members are independent, so with the `rayon` feature they run on the
    /// global thread pool; otherwise in index order. Results are identical
    /// either way because no member reads another member's output.
    pub(crate) fn for_each_member<F>(&self, count: usize, f: F)
    where
        F: Fn(usize) + Send + Sync,
    {
        #[cfg(feature = "rayon")]
        {
            if count > 1 {
                (0..count).into_par_iter().for_each(f);
                return;
            }
        }

        (0..count).for_each(f);
    }
}

impl RuntimeClient<CpuRuntime> for CpuClient {
    fn device(&self) -> &CpuDevice {
        &self.device
    }

    fn synchronize(&self) {
        // CPU kernels complete before returning, nothing to do
    }

    fn allocator(&self) -> &CpuAllocator {
        &self.allocator
    }
}

/// Heap allocator charging the owning device's memory accounting
///
/// Allocations are zeroed and 64-byte aligned. Exceeding the device's
/// memory limit, or a failing system allocator, is reported as
/// [`Error::OutOfMemory`].
#[derive(Clone, Debug)]
pub struct CpuAllocator {
    device: CpuDevice,
}

impl Allocator for CpuAllocator {
    fn allocate(&self, size_bytes: usize) -> Result<u64> {
        if size_bytes == 0 {
            return Ok(0);
        }
        let layout = AllocLayout::from_size_align(size_bytes, ALIGN)
            .map_err(|_| Error::OutOfMemory { size: size_bytes })?;
        if !self.device.try_reserve(size_bytes) {
            return Err(Error::OutOfMemory { size: size_bytes });
        }

        // SAFETY: layout has non-zero size.
        let ptr = unsafe { alloc_zeroed(layout) };
        if ptr.is_null() {
            self.device.release(size_bytes);
            return Err(Error::OutOfMemory { size: size_bytes });
        }
        Ok(ptr as u64)
    }

    unsafe fn deallocate(&self, ptr: u64, size_bytes: usize) {
        if ptr == 0 || size_bytes == 0 {
            return;
        }
        let Ok(layout) = AllocLayout::from_size_align(size_bytes, ALIGN) else {
            return;
        };
        // SAFETY: the caller passes an address from `allocate` with this
        // exact layout.
        unsafe {
            dealloc(ptr as *mut u8, layout);
        }
        self.device.release(size_bytes);
    }

    fn allocated_bytes(&self) -> usize {
        self.device.memory_usage()
    }

    fn capacity(&self) -> Option<usize> {
        self.device.memory_limit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocation_is_aligned_and_zeroed() {
        let client = CpuClient::new(CpuDevice::new());
        let alloc = client.allocator();
        let ptr = alloc.allocate(256).unwrap();
        assert_eq!(ptr % ALIGN as u64, 0);
        let bytes = unsafe { std::slice::from_raw_parts(ptr as *const u8, 256) };
        assert!(bytes.iter().all(|&b| b == 0));
        unsafe { alloc.deallocate(ptr, 256) };
        assert_eq!(alloc.allocated_bytes(), 0);
    }

    #[test]
    fn test_limit_reports_out_of_memory() {
        let client = CpuClient::new(CpuDevice::new().with_memory_limit(1024));
        let alloc = client.allocator();
        let ptr = alloc.allocate(1000).unwrap();
        assert_eq!(
            alloc.allocate(100),
            Err(Error::OutOfMemory { size: 100 })
        );
        assert_eq!(alloc.available_bytes(), Some(24));
        unsafe { alloc.deallocate(ptr, 1000) };
        let ptr = alloc.allocate(1024).unwrap();
        unsafe { alloc.deallocate(ptr, 1024) };
    }

    #[test]
    fn test_for_each_member_visits_all() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        let client = CpuClient::new(CpuDevice::new());
        let sum = AtomicUsize::new(0);
        client.for_each_member(10, |i| {
            sum.fetch_add(i, Ordering::Relaxed);
        });
        assert_eq!(sum.into_inner(), 45);
    }

    #[test]
    fn test_zero_size_is_null() {
        let client = CpuClient::new(CpuDevice::new());
        assert_eq!(client.allocator().allocate(0), Ok(0));
    }
}
