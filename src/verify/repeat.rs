//! Multi-device repeatability harness
//!
//! Runs the same computation on several emulated devices, each with its
//! own handle, and demands bitwise identical results. Devices run
//! concurrently and share no mutable state.

use crate::error::Result;
use crate::handle::Handle;
use crate::runtime::Device;
use crate::runtime::cpu::CpuDevice;
use bytemuck::Pod;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Run `f` once per device, each call with a fresh handle on that device
///
/// Results are returned in device order. The first error wins.
pub fn replicate<R, F>(devices: &[CpuDevice], f: F) -> Result<Vec<R>>
where
    R: Send,
    F: Fn(&Handle) -> Result<R> + Send + Sync,
{
    let run = |device: &CpuDevice| {
        let handle = Handle::new(device.clone());
        tracing::debug!(device = %device.name(), "repeatability run");
        f(&handle)
    };

    #[cfg(feature = "rayon")]
    {
        devices.par_iter().map(run).collect()
    }
    #[cfg(not(feature = "rayon"))]
    {
        devices.iter().map(run).collect()
    }
}

/// Panic unless every result is bitwise identical to the first
pub fn assert_repeatable<T: Pod>(results: &[Vec<T>]) {
    let Some((first, rest)) = results.split_first() else {
        return;
    };
    let expected: &[u8] = bytemuck::cast_slice(first);
    for (i, r) in rest.iter().enumerate() {
        assert!(
            bytemuck::cast_slice::<T, u8>(r) == expected,
            "device {} result differs from device 0",
            i + 1
        );
    }
}
