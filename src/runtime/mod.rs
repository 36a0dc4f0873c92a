//! Runtime backends for BLAS execution
//!
//! This module defines the `Runtime` trait and the CPU backend that emulates
//! a set of devices with host memory.
//!
//! # Architecture
//!
//! ```text
//! Runtime (backend identity)
//! ├── Device (identifies a specific device, owns its memory accounting)
//! ├── Client (dispatches work, owns the stream)
//! └── Allocator (device memory with a documented failure mode)
//! ```
//!
//! Device memory is addressed with [`DevicePtr`]; owned allocations are
//! [`DeviceBuffer`]s that free themselves on drop.

mod allocator;
mod memory;

pub mod cpu;

pub use allocator::Allocator;
pub use memory::{DeviceBuffer, DevicePtr};

/// Core trait for compute backends
///
/// `Runtime` abstracts over compute devices. It uses static dispatch via
/// generics for zero-cost abstraction.
///
/// # Associated Types
///
/// - `Device`: Identifies a specific compute unit (e.g., device 0, device 1)
/// - `Client`: Handles work dispatch and synchronization
/// - `Allocator`: Memory management with memory accounting
pub trait Runtime: Clone + Send + Sync + 'static {
    /// Device identifier type
    type Device: Device;

    /// Client for dispatching work
    type Client: RuntimeClient<Self>;

    /// Memory allocator type
    type Allocator: Allocator;

    /// Human-readable name of this runtime
    fn name() -> &'static str;

    /// Copy data from host to device
    ///
    /// # Safety
    /// A non-null `dst` must be valid for writes of `src.len()` bytes.
    unsafe fn copy_to_device(src: &[u8], dst: u64, device: &Self::Device);

    /// Copy data from device to host
    ///
    /// # Safety
    /// A non-null `src` must be valid for reads of `dst.len()` bytes.
    unsafe fn copy_from_device(src: u64, dst: &mut [u8], device: &Self::Device);

    /// Copy data within device (device to device)
    ///
    /// # Safety
    /// Non-null `src` and `dst` must be valid for `size_bytes` bytes.
    unsafe fn copy_within_device(src: u64, dst: u64, size_bytes: usize, device: &Self::Device);

    /// Get the default device
    fn default_device() -> Self::Device;

    /// Get the default client for a device
    fn default_client(device: &Self::Device) -> Self::Client;
}

/// Trait for device identification
pub trait Device: Clone + Send + Sync + 'static {
    /// Unique identifier for this device
    fn id(&self) -> usize;

    /// Check if two devices are the same
    fn is_same(&self, other: &Self) -> bool {
        self.id() == other.id()
    }

    /// Human-readable name
    fn name(&self) -> String {
        format!("Device({})", self.id())
    }
}

/// Trait for runtime clients that handle work dispatch
pub trait RuntimeClient<R: Runtime>: Clone + Send + Sync {
    /// Get the device this client operates on
    fn device(&self) -> &R::Device;

    /// Synchronize: wait for all pending work on the stream to complete
    fn synchronize(&self);

    /// Get the allocator for this client
    fn allocator(&self) -> &R::Allocator;
}
