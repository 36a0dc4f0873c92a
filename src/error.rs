//! Error types for numr-blas
//!
//! Routines return [`Result`]; callers that need the BLAS-style status code
//! convert with [`Error::status`] or [`Status::from_result`].

use std::fmt;
use thiserror::Error;

/// Result type alias using numr-blas's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in numr-blas routines
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The handle argument was missing
    #[error("Invalid handle: handle is null")]
    InvalidHandle,

    /// An enumerated argument holds a value that is illegal for the routine
    #[error("Invalid value for '{arg}': {value}")]
    InvalidValue {
        /// The argument name
        arg: &'static str,
        /// The rejected value, rendered for diagnostics
        value: String,
    },

    /// A dimension, leading dimension, increment or batch count is out of range
    #[error("Invalid size '{arg}': {reason}")]
    InvalidSize {
        /// The argument name
        arg: &'static str,
        /// Reason for invalidity
        reason: String,
    },

    /// A required pointer is null
    #[error("Invalid pointer: '{arg}' is null")]
    InvalidPointer {
        /// The argument name
        arg: &'static str,
    },

    /// Device or workspace memory could not be obtained
    #[error("Out of memory: failed to allocate {size} bytes")]
    OutOfMemory {
        /// Requested size in bytes
        size: usize,
    },

    /// A NaN or infinity was found while check-numerics mode is on
    #[error("Numerics check failed: '{arg}' contains NaN or infinity")]
    NumericsCheckFailed {
        /// The operand that failed the scan
        arg: &'static str,
    },

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an invalid size error
    pub fn invalid_size(arg: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidSize {
            arg,
            reason: reason.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(arg: &'static str, value: impl fmt::Debug) -> Self {
        Self::InvalidValue {
            arg,
            value: format!("{value:?}"),
        }
    }

    /// Create an invalid pointer error
    pub fn invalid_pointer(arg: &'static str) -> Self {
        Self::InvalidPointer { arg }
    }

    /// The status code this error surfaces as
    pub fn status(&self) -> Status {
        match self {
            Self::InvalidHandle => Status::InvalidHandle,
            Self::InvalidValue { .. } => Status::InvalidValue,
            Self::InvalidSize { .. } => Status::InvalidSize,
            Self::InvalidPointer { .. } => Status::InvalidPointer,
            Self::OutOfMemory { .. } => Status::MemoryError,
            Self::NumericsCheckFailed { .. } => Status::CheckNumericsFail,
            Self::Internal(_) => Status::InternalError,
        }
    }
}

/// BLAS-style status code
///
/// `Continue` is the validator's "approved, proceed" sentinel. It never
/// reaches a caller of a public routine.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Status {
    /// The call completed (or was a no-op)
    Success = 0,
    /// Handle was null
    InvalidHandle = 1,
    /// Pointer argument was null
    InvalidPointer = 3,
    /// Dimension, stride or count was out of range
    InvalidSize = 4,
    /// Device memory could not be obtained
    MemoryError = 5,
    /// Internal fault caught at the call boundary
    InternalError = 6,
    /// Enumerated argument was illegal
    InvalidValue = 11,
    /// Validation passed; computation should proceed
    Continue = 12,
    /// NaN or infinity detected by check-numerics mode
    CheckNumericsFail = 13,
}

impl Status {
    /// Map a routine result to its status code
    pub fn from_result<T>(result: &Result<T>) -> Self {
        match result {
            Ok(_) => Self::Success,
            Err(e) => e.status(),
        }
    }

    /// Whether the status represents a completed call
    pub fn is_success(self) -> bool {
        self == Self::Success
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Success => "success",
            Self::InvalidHandle => "invalid_handle",
            Self::InvalidPointer => "invalid_pointer",
            Self::InvalidSize => "invalid_size",
            Self::MemoryError => "memory_error",
            Self::InternalError => "internal_error",
            Self::InvalidValue => "invalid_value",
            Self::Continue => "continue",
            Self::CheckNumericsFail => "check_numerics_fail",
        };
        f.write_str(name)
    }
}

impl<T> From<&Result<T>> for Status {
    fn from(result: &Result<T>) -> Self {
        Self::from_result(result)
    }
}
