//! Memory allocator trait
//!
//! Allocators hand out device addresses (u64, 0 = null) and keep a running
//! count of live bytes so that a device-wide limit can be enforced.

use crate::error::Result;

/// Memory allocator trait for runtime backends
///
/// A failed allocation surfaces as [`Error::OutOfMemory`](crate::error::Error::OutOfMemory);
/// allocators never panic on exhaustion.
pub trait Allocator: Clone + Send + Sync {
    /// Allocate memory of given size
    ///
    /// Zero-byte requests succeed and return the null address.
    fn allocate(&self, size_bytes: usize) -> Result<u64>;

    /// Deallocate memory
    ///
    /// # Safety
    /// `ptr` must come from `allocate` on this allocator with the same
    /// `size_bytes`, and must not be used afterwards.
    unsafe fn deallocate(&self, ptr: u64, size_bytes: usize);

    /// Get the total allocated bytes
    fn allocated_bytes(&self) -> usize {
        0 // Default: tracking not supported
    }

    /// Upper bound on live bytes, if the device has one
    fn capacity(&self) -> Option<usize> {
        None
    }

    /// Bytes that can still be allocated before hitting the capacity
    fn available_bytes(&self) -> Option<usize> {
        self.capacity()
            .map(|cap| cap.saturating_sub(self.allocated_bytes()))
    }
}
