//! CPU device implementation

use crate::runtime::Device;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// An emulated BLAS device backed by host memory
///
/// Clones share the same memory accounting, so every client and buffer
/// created from one device sees the same usage figure.
#[derive(Clone, Debug, Default)]
pub struct CpuDevice {
    id: usize,
    memory_limit: Option<usize>,
    usage: Arc<AtomicUsize>,
}

impl CpuDevice {
    /// Create device 0 with unlimited memory
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a device with the given ordinal
    pub fn with_id(id: usize) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Cap the bytes that may be live on this device at once
    pub fn with_memory_limit(mut self, bytes: usize) -> Self {
        self.memory_limit = Some(bytes);
        self
    }

    /// Configured capacity, if any
    pub fn memory_limit(&self) -> Option<usize> {
        self.memory_limit
    }

    /// Bytes currently allocated on this device
    pub fn memory_usage(&self) -> usize {
        self.usage.load(Ordering::Acquire)
    }

    /// Reserve `bytes` against the limit; false if it would be exceeded
    pub(crate) fn try_reserve(&self, bytes: usize) -> bool {
        let limit = self.memory_limit.unwrap_or(usize::MAX);
        self.usage
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                used.checked_add(bytes).filter(|&total| total <= limit)
            })
            .is_ok()
    }

    pub(crate) fn release(&self, bytes: usize) {
        self.usage.fetch_sub(bytes, Ordering::AcqRel);
    }
}

impl Device for CpuDevice {
    fn id(&self) -> usize {
        self.id
    }

    fn name(&self) -> String {
        format!("cpu:{}", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserve_respects_limit() {
        let dev = CpuDevice::new().with_memory_limit(100);
        assert!(dev.try_reserve(60));
        assert!(!dev.try_reserve(41));
        assert!(dev.try_reserve(40));
        assert_eq!(dev.memory_usage(), 100);
        dev.release(100);
        assert_eq!(dev.memory_usage(), 0);
    }

    #[test]
    fn test_clones_share_usage() {
        let dev = CpuDevice::with_id(3);
        let other = dev.clone();
        assert!(dev.try_reserve(8));
        assert_eq!(other.memory_usage(), 8);
        assert_eq!(other.name(), "cpu:3");
        assert!(dev.is_same(&other));
    }
}
