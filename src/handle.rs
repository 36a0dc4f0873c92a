//! Library handle: device binding, pointer mode, workspace memory and
//! check-numerics configuration
//!
//! Every routine takes an `Option<&Handle>`; `None` is the null handle and
//! is rejected with [`Error::InvalidHandle`].
//!
//! # Workspace memory
//!
//! Routines that need scratch memory obtain it through the handle, in one
//! of two modes:
//!
//! - **on demand** (default): each call allocates its workspace from the
//!   device and frees it on return
//! - **fixed size**: the handle owns one pre-allocated block of
//!   `device_memory_size` bytes; a call whose workspace does not fit fails
//!   with [`Error::OutOfMemory`] (or takes its fallback strategy)
//!
//! # Memory-size queries
//!
//! ```ignore
//! handle.start_memory_size_query()?;
//! unsafe { trsm(Some(&handle), ...)? }; // validated, sized, not computed
//! let bytes = handle.stop_memory_size_query()?;
//! ```

use crate::error::{Error, Result};
use crate::runtime::cpu::{CpuClient, CpuDevice};
use crate::runtime::{DeviceBuffer, DevicePtr};
use parking_lot::{Mutex, MutexGuard};
use std::fmt;

/// Workspace chunks are aligned to this many bytes
const WORKSPACE_ALIGN: usize = 64;

/// Environment variable selecting the default pointer mode
pub const ENV_POINTER_MODE: &str = "NUMR_BLAS_POINTER_MODE";
/// Environment variable fixing the handle's device memory size (bytes)
pub const ENV_DEVICE_MEMORY_SIZE: &str = "NUMR_BLAS_DEVICE_MEMORY_SIZE";
/// Environment variable enabling check-numerics mode
pub const ENV_CHECK_NUMERICS: &str = "NUMR_BLAS_CHECK_NUMERICS";

/// Where scalar arguments (alpha, beta) live
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum PointerMode {
    /// Scalars are host values read at call time
    #[default]
    Host,
    /// Scalars are device addresses read by the kernels
    Device,
}

/// Handle construction options
///
/// # Example
///
/// ```
/// use numr_blas::handle::{HandleConfig, PointerMode};
///
/// let config = HandleConfig::new()
///     .pointer_mode(PointerMode::Device)
///     .device_memory_size(Some(1 << 20))
///     .check_numerics(true);
/// assert_eq!(config.pointer_mode, PointerMode::Device);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HandleConfig {
    /// Scalar residency
    pub pointer_mode: PointerMode,
    /// Fixed workspace pool size in bytes; `None` allocates on demand
    pub device_memory_size: Option<usize>,
    /// Scan inputs and outputs for NaN/Inf
    pub check_numerics: bool,
}

impl HandleConfig {
    /// Default configuration: host pointers, on-demand memory, no checks
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the pointer mode
    pub fn pointer_mode(mut self, mode: PointerMode) -> Self {
        self.pointer_mode = mode;
        self
    }

    /// Set the fixed device memory size
    pub fn device_memory_size(mut self, bytes: Option<usize>) -> Self {
        self.device_memory_size = bytes;
        self
    }

    /// Enable or disable check-numerics mode
    pub fn check_numerics(mut self, enabled: bool) -> Self {
        self.check_numerics = enabled;
        self
    }

    /// Read the configuration from the environment
    ///
    /// Unset variables keep their defaults; unparsable values are
    /// [`Error::InvalidValue`].
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(v) = lookup(ENV_POINTER_MODE) {
            config.pointer_mode = match v.trim().to_ascii_lowercase().as_str() {
                "host" => PointerMode::Host,
                "device" => PointerMode::Device,
                _ => return Err(Error::invalid_value(ENV_POINTER_MODE, v)),
            };
        }
        if let Some(v) = lookup(ENV_DEVICE_MEMORY_SIZE) {
            let bytes = v
                .trim()
                .parse::<usize>()
                .map_err(|_| Error::invalid_value(ENV_DEVICE_MEMORY_SIZE, &v))?;
            config.device_memory_size = Some(bytes);
        }
        if let Some(v) = lookup(ENV_CHECK_NUMERICS) {
            config.check_numerics = match v.trim().to_ascii_lowercase().as_str() {
                "1" | "true" => true,
                "0" | "false" => false,
                _ => return Err(Error::invalid_value(ENV_CHECK_NUMERICS, v)),
            };
        }
        Ok(config)
    }
}

/// Library handle bound to one device
pub struct Handle {
    client: CpuClient,
    pointer_mode: PointerMode,
    check_numerics: bool,
    pool: Option<Mutex<DeviceBuffer<u8>>>,
    query: Mutex<Option<usize>>,
}

impl Handle {
    /// Handle with the default configuration
    pub fn new(device: CpuDevice) -> Self {
        Self {
            client: CpuClient::new(device),
            pointer_mode: PointerMode::Host,
            check_numerics: false,
            pool: None,
            query: Mutex::new(None),
        }
    }

    /// Handle with an explicit configuration
    ///
    /// Fails with [`Error::OutOfMemory`] if a fixed memory size is
    /// requested and the device cannot provide it.
    pub fn with_config(device: CpuDevice, config: HandleConfig) -> Result<Self> {
        let mut handle = Self::new(device);
        handle.pointer_mode = config.pointer_mode;
        handle.check_numerics = config.check_numerics;
        handle.set_device_memory_size(config.device_memory_size)?;
        Ok(handle)
    }

    /// The device this handle runs on
    pub fn device(&self) -> &CpuDevice {
        &self.client.device
    }

    /// The client used for allocations and dispatch
    pub fn client(&self) -> &CpuClient {
        &self.client
    }

    /// Current scalar residency
    pub fn pointer_mode(&self) -> PointerMode {
        self.pointer_mode
    }

    /// Change the scalar residency
    pub fn set_pointer_mode(&mut self, mode: PointerMode) {
        self.pointer_mode = mode;
    }

    /// Whether check-numerics mode is on
    pub fn check_numerics(&self) -> bool {
        self.check_numerics
    }

    /// Enable or disable check-numerics mode
    pub fn set_check_numerics(&mut self, enabled: bool) {
        self.check_numerics = enabled;
    }

    /// Fixed workspace pool size, `None` when allocating on demand
    pub fn device_memory_size(&self) -> Option<usize> {
        self.pool.as_ref().map(|p| p.lock().len())
    }

    /// Switch between a fixed pool of `bytes` and on-demand allocation
    pub fn set_device_memory_size(&mut self, bytes: Option<usize>) -> Result<()> {
        // release the old pool first so its memory counts as free
        self.pool = None;
        if let Some(bytes) = bytes {
            let buf = DeviceBuffer::<u8>::new(&self.client, bytes)?;
            self.pool = Some(Mutex::new(buf));
        }
        Ok(())
    }

    /// Begin a memory-size query
    ///
    /// Until [`stop_memory_size_query`](Self::stop_memory_size_query),
    /// routines validate their arguments and record the workspace they
    /// would need, without computing anything.
    pub fn start_memory_size_query(&self) -> Result<()> {
        let mut q = self.query.lock();
        if q.is_some() {
            return Err(Error::invalid_value("memory_size_query", "already active"));
        }
        *q = Some(0);
        Ok(())
    }

    /// End a memory-size query and return the largest workspace requested
    pub fn stop_memory_size_query(&self) -> Result<usize> {
        self.query
            .lock()
            .take()
            .ok_or_else(|| Error::invalid_value("memory_size_query", "not active"))
    }

    /// Whether a memory-size query is in progress
    pub fn is_querying_memory(&self) -> bool {
        self.query.lock().is_some()
    }

    /// Record a workspace requirement during a query
    pub(crate) fn record_memory_size(&self, sizes: &[usize]) {
        let total = aligned_total(sizes);
        if let Some(q) = self.query.lock().as_mut() {
            *q = (*q).max(total);
        }
    }

    /// Obtain workspace chunks of the given byte sizes
    ///
    /// Zero-sized chunks are the null address. The whole request either
    /// succeeds or fails with [`Error::OutOfMemory`]; nothing is held on
    /// failure.
    pub(crate) fn acquire_workspace(&self, sizes: &[usize]) -> Result<Workspace<'_>> {
        match &self.pool {
            None => {
                let buffers = sizes
                    .iter()
                    .map(|&size| DeviceBuffer::<u8>::new(&self.client, size))
                    .collect::<Result<Vec<_>>>()?;
                let ptrs = buffers.iter().map(|b| b.as_ptr().addr()).collect();
                Ok(Workspace {
                    ptrs,
                    _hold: Hold::Owned(buffers),
                })
            }
            Some(pool) => {
                let total = aligned_total(sizes);
                let guard = pool.lock();
                if total > guard.len() {
                    return Err(Error::OutOfMemory { size: total });
                }
                let base = guard.as_ptr().addr();
                let mut offset = 0u64;
                let ptrs = sizes
                    .iter()
                    .map(|&size| {
                        if size == 0 {
                            return 0;
                        }
                        let p = base + offset;
                        offset += align_up(size) as u64;
                        p
                    })
                    .collect();
                Ok(Workspace {
                    ptrs,
                    _hold: Hold::Pooled(guard),
                })
            }
        }
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("device", self.device())
            .field("pointer_mode", &self.pointer_mode)
            .field("check_numerics", &self.check_numerics)
            .field("device_memory_size", &self.device_memory_size())
            .finish()
    }
}

fn align_up(size: usize) -> usize {
    size.saturating_add(WORKSPACE_ALIGN - 1) / WORKSPACE_ALIGN * WORKSPACE_ALIGN
}

fn aligned_total(sizes: &[usize]) -> usize {
    sizes
        .iter()
        .fold(0usize, |acc, &s| acc.saturating_add(align_up(s)))
}

enum Hold<'h> {
    Owned(#[allow(dead_code)] Vec<DeviceBuffer<u8>>),
    Pooled(#[allow(dead_code)] MutexGuard<'h, DeviceBuffer<u8>>),
}

/// Workspace held for the duration of one call
pub(crate) struct Workspace<'h> {
    ptrs: Vec<u64>,
    _hold: Hold<'h>,
}

impl Workspace<'_> {
    /// Address of chunk `index`, typed
    pub(crate) fn chunk<T>(&self, index: usize) -> DevicePtr<T> {
        // SAFETY: the chunk lives as long as `self`.
        unsafe { DevicePtr::from_raw(self.ptrs[index]) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_config_from_lookup() {
        let env: HashMap<&str, &str> = [
            (ENV_POINTER_MODE, "Device"),
            (ENV_DEVICE_MEMORY_SIZE, "4096"),
            (ENV_CHECK_NUMERICS, "1"),
        ]
        .into_iter()
        .collect();
        let config = HandleConfig::from_lookup(|k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.pointer_mode, PointerMode::Device);
        assert_eq!(config.device_memory_size, Some(4096));
        assert!(config.check_numerics);
    }

    #[test]
    fn test_config_rejects_garbage() {
        let err = HandleConfig::from_lookup(|k| (k == ENV_POINTER_MODE).then(|| "both".into()))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidValue { .. }));
        assert_eq!(HandleConfig::from_lookup(|_| None).unwrap(), HandleConfig::default());
    }

    #[test]
    fn test_query_keeps_largest() {
        let handle = Handle::new(CpuDevice::new());
        assert!(handle.stop_memory_size_query().is_err());
        handle.start_memory_size_query().unwrap();
        assert!(handle.start_memory_size_query().is_err());
        handle.record_memory_size(&[100, 0]);
        handle.record_memory_size(&[10]);
        assert_eq!(handle.stop_memory_size_query().unwrap(), 128);
        assert!(!handle.is_querying_memory());
    }

    #[test]
    fn test_on_demand_workspace_is_freed() {
        let handle = Handle::new(CpuDevice::new());
        {
            let ws = handle.acquire_workspace(&[64, 0, 32]).unwrap();
            assert!(!ws.chunk::<u8>(0).is_null());
            assert!(ws.chunk::<u8>(1).is_null());
            assert_eq!(handle.device().memory_usage(), 96);
        }
        assert_eq!(handle.device().memory_usage(), 0);
    }

    #[test]
    fn test_fixed_pool() {
        let config = HandleConfig::new().device_memory_size(Some(256));
        let handle = Handle::with_config(CpuDevice::new(), config).unwrap();
        assert_eq!(handle.device_memory_size(), Some(256));
        {
            let ws = handle.acquire_workspace(&[100, 100]).unwrap();
            assert_eq!(ws.chunk::<u8>(1).addr() - ws.chunk::<u8>(0).addr(), 128);
        }
        assert_eq!(
            handle.acquire_workspace(&[200, 100]).err(),
            Some(Error::OutOfMemory { size: 384 })
        );
    }

    #[test]
    fn test_device_limit_blocks_on_demand() {
        let handle = Handle::new(CpuDevice::new().with_memory_limit(64));
        assert!(matches!(
            handle.acquire_workspace(&[32, 64]),
            Err(Error::OutOfMemory { size: 64 })
        ));
        assert_eq!(handle.device().memory_usage(), 0);
    }
}
