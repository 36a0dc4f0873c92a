//! Mode flags of the BLAS routines
//!
//! Every enum keeps the numeric code of the conventional C BLAS interface
//! so that raw codes coming from a foreign caller can be parsed with
//! `TryFrom<i32>`. `Side::Both` and `Fill::Full` are representable but
//! illegal for the triangular routines; passing them is an
//! [`Error::InvalidValue`].

use crate::error::{Error, Result};
use std::fmt;

macro_rules! blas_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $arg:literal {
            $($(#[$vmeta:meta])* $variant:ident = $code:literal, $ch:literal;)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
        #[repr(i32)]
        pub enum $name {
            $($(#[$vmeta])* $variant = $code,)+
        }

        impl $name {
            /// Raw interface code
            pub const fn code(self) -> i32 {
                self as i32
            }

            /// Parse the conventional one-letter form (case-insensitive)
            pub fn from_char(c: char) -> Result<Self> {
                match c.to_ascii_uppercase() {
                    $($ch => Ok(Self::$variant),)+
                    _ => Err(Error::invalid_value($arg, c)),
                }
            }

            /// The conventional one-letter form
            pub const fn as_char(self) -> char {
                match self {
                    $(Self::$variant => $ch,)+
                }
            }
        }

        impl TryFrom<i32> for $name {
            type Error = Error;

            fn try_from(code: i32) -> Result<Self> {
                match code {
                    $($code => Ok(Self::$variant),)+
                    _ => Err(Error::invalid_value($arg, code)),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.as_char())
            }
        }
    };
}

blas_enum! {
    /// Transformation applied to A before use
    Operation, "trans" {
        /// op(A) = A
        None = 111, 'N';
        /// op(A) = A^T
        Transpose = 112, 'T';
        /// op(A) = A^H
        ConjugateTranspose = 113, 'C';
    }
}

blas_enum! {
    /// Which triangle of A is referenced
    Fill, "uplo" {
        /// Upper triangle
        Upper = 121, 'U';
        /// Lower triangle
        Lower = 122, 'L';
        /// Whole matrix (illegal for triangular routines)
        Full = 123, 'F';
    }
}

blas_enum! {
    /// Whether the diagonal of A is stored or implicitly one
    Diagonal, "diag" {
        /// Diagonal is read from A
        NonUnit = 131, 'N';
        /// Diagonal is taken as one and never read
        Unit = 132, 'U';
    }
}

blas_enum! {
    /// Side of B the triangular operand multiplies from
    Side, "side" {
        /// op(A) X = alpha B
        Left = 141, 'L';
        /// X op(A) = alpha B
        Right = 142, 'R';
        /// Both sides (illegal for triangular routines)
        Both = 143, 'B';
    }
}

impl Side {
    /// Order of the triangular operand for an m × n right-hand side
    pub const fn triangular_order(self, m: i64, n: i64) -> i64 {
        match self {
            Self::Left => m,
            _ => n,
        }
    }
}
