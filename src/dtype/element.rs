//! Element trait for mapping Rust types to DType

use super::complex::{Complex64, Complex128};
use super::DType;
use bytemuck::{Pod, Zeroable};
use std::fmt::Debug;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Trait for types that can be elements of a BLAS operand
///
/// # Bounds
/// - `Pod + Zeroable` - device memory is moved as raw bytes (bytemuck)
/// - `Add + Sub + Mul + Div + Neg` - field arithmetic (Output = Self)
///
/// Real types implement `conj` as the identity, so conjugate transpose and
/// transpose coincide for them.
pub trait Element:
    Copy
    + Clone
    + Send
    + Sync
    + Pod
    + Zeroable
    + Debug
    + PartialEq
    + 'static
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
{
    /// The corresponding DType for this Rust type
    const DTYPE: DType;

    /// Machine epsilon of the underlying real type
    const EPSILON: f64;

    /// Zero value
    fn zero() -> Self;

    /// One value
    fn one() -> Self;

    /// Build a value from real and imaginary parts (imaginary part dropped for reals)
    fn from_parts(re: f64, im: f64) -> Self;

    /// Convert from f64 (real number)
    #[inline]
    fn from_f64(v: f64) -> Self {
        Self::from_parts(v, 0.0)
    }

    /// Complex conjugate (identity for real types)
    fn conj(self) -> Self;

    /// Absolute value (magnitude for complex types) as f64
    fn magnitude(self) -> f64;

    /// True when no component is NaN or infinite
    fn is_finite(self) -> bool;

    /// Exact comparison with the additive identity
    #[inline]
    fn is_zero(self) -> bool {
        self == Self::zero()
    }

    /// Exact comparison with the multiplicative identity
    #[inline]
    fn is_one(self) -> bool {
        self == Self::one()
    }
}

/// Complex element types, for the Hermitian routines
pub trait ComplexElement: Element {
    /// The value with its imaginary part dropped
    fn real_part(self) -> Self;
}

macro_rules! impl_real_element {
    ($t:ty, $dtype:expr) => {
        impl Element for $t {
            const DTYPE: DType = $dtype;
            const EPSILON: f64 = <$t>::EPSILON as f64;

            #[inline]
            fn zero() -> Self {
                0.0
            }

            #[inline]
            fn one() -> Self {
                1.0
            }

            #[inline]
            fn from_parts(re: f64, _im: f64) -> Self {
                re as $t
            }

            #[inline]
            fn conj(self) -> Self {
                self
            }

            #[inline]
            fn magnitude(self) -> f64 {
                self.abs() as f64
            }

            #[inline]
            fn is_finite(self) -> bool {
                <$t>::is_finite(self)
            }
        }
    };
}

impl_real_element!(f32, DType::F32);
impl_real_element!(f64, DType::F64);

macro_rules! impl_complex_element {
    ($t:ty, $float:ty, $dtype:expr) => {
        impl Element for $t {
            const DTYPE: DType = $dtype;
            const EPSILON: f64 = <$float>::EPSILON as f64;

            #[inline]
            fn zero() -> Self {
                <$t>::ZERO
            }

            #[inline]
            fn one() -> Self {
                <$t>::ONE
            }

            #[inline]
            fn from_parts(re: f64, im: f64) -> Self {
                <$t>::new(re as $float, im as $float)
            }

            #[inline]
            fn conj(self) -> Self {
                <$t>::conj(self)
            }

            #[inline]
            fn magnitude(self) -> f64 {
                <$t>::magnitude(self) as f64
            }

            #[inline]
            fn is_finite(self) -> bool {
                self.re.is_finite() && self.im.is_finite()
            }
        }

        impl ComplexElement for $t {
            #[inline]
            fn real_part(self) -> Self {
                <$t>::new(self.re, 0.0)
            }
        }
    };
}

impl_complex_element!(Complex64, f32, DType::Complex64);
impl_complex_element!(Complex128, f64, DType::Complex128);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_real_conj_is_identity() {
        assert_eq!(Element::conj(3.5f64), 3.5);
        assert_eq!(Element::conj(-2.0f32), -2.0);
    }

    #[test]
    fn test_complex_element() {
        let z = Complex128::from_parts(3.0, 4.0);
        assert_eq!(Element::magnitude(z), 5.0);
        assert_eq!(Element::conj(z), Complex128::new(3.0, -4.0));
        assert!(Element::is_finite(z));
        assert!(!Element::is_finite(Complex64::new(f32::NAN, 0.0)));
        assert_eq!(z.real_part(), Complex128::new(3.0, 0.0));
    }

    #[test]
    fn test_zero_one() {
        assert!(f64::zero().is_zero());
        assert!(f32::one().is_one());
        assert!(Complex64::zero().is_zero());
        assert!(!Complex128::from_parts(0.0, 1e-300).is_zero());
    }

    #[test]
    fn test_epsilon() {
        assert_eq!(<f32 as Element>::EPSILON, f32::EPSILON as f64);
        assert_eq!(<Complex128 as Element>::EPSILON, f64::EPSILON);
    }
}
