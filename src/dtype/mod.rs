//! Data type system for numr-blas routines
//!
//! Routines are generic over [`Element`]; [`DType`] is the runtime tag used in
//! logs, workspace sizing and diagnostics.

pub mod complex;
mod element;

pub use complex::{Complex64, Complex128};
pub use element::{ComplexElement, Element};

use std::fmt;

/// Element types accepted by the BLAS routines
///
/// # Discriminant Values
///
/// Values follow numr's stable numbering: floats in 0-9, complex in 40-49.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
#[repr(u8)]
pub enum DType {
    /// 64-bit floating point
    F64 = 0,
    /// 32-bit floating point
    F32 = 1,
    /// 64-bit complex (two f32: re, im)
    Complex64 = 40,
    /// 128-bit complex (two f64: re, im)
    Complex128 = 41,
}

impl DType {
    /// Size of one element in bytes
    #[inline]
    pub const fn size_in_bytes(self) -> usize {
        match self {
            Self::Complex128 => 16,
            Self::F64 | Self::Complex64 => 8,
            Self::F32 => 4,
        }
    }

    /// Returns true if this is a complex type
    #[inline]
    pub const fn is_complex(self) -> bool {
        matches!(self, Self::Complex64 | Self::Complex128)
    }

    /// BLAS precision prefix (`s`, `d`, `c`, `z`)
    pub const fn prefix(self) -> char {
        match self {
            Self::F32 => 's',
            Self::F64 => 'd',
            Self::Complex64 => 'c',
            Self::Complex128 => 'z',
        }
    }

    /// Short name for display
    pub const fn short_name(self) -> &'static str {
        match self {
            Self::F64 => "f64",
            Self::F32 => "f32",
            Self::Complex64 => "c64",
            Self::Complex128 => "c128",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dtype_sizes() {
        assert_eq!(DType::F32.size_in_bytes(), 4);
        assert_eq!(DType::F64.size_in_bytes(), 8);
        assert_eq!(DType::Complex64.size_in_bytes(), 8);
        assert_eq!(DType::Complex128.size_in_bytes(), 16);
    }

    #[test]
    fn test_dtype_prefix() {
        assert_eq!(DType::F32.prefix(), 's');
        assert_eq!(DType::Complex128.prefix(), 'z');
        assert!(DType::Complex64.is_complex());
        assert!(!DType::F64.is_complex());
    }
}
