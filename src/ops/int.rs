//! Integer widths of the public API
//!
//! Every routine exists for 32-bit and 64-bit dimensions. Both widen to
//! `i64` at the call boundary, so identical arguments give identical
//! results regardless of width.

use std::fmt::Debug;

mod sealed {
    pub trait Sealed {}
    impl Sealed for i32 {}
    impl Sealed for i64 {}
}

/// Dimension, leading dimension, increment and count type (`i32` or `i64`)
pub trait ApiInt: sealed::Sealed + Copy + Debug + Send + Sync + 'static {
    /// Widen to the internal width
    fn to_i64(self) -> i64;
}

impl ApiInt for i32 {
    #[inline]
    fn to_i64(self) -> i64 {
        self as i64
    }
}

impl ApiInt for i64 {
    #[inline]
    fn to_i64(self) -> i64 {
        self
    }
}
