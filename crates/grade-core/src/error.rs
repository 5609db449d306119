//! Error types for the grading engine.
//!
//! The color math itself has no failure modes; out-of-range values are
//! extrapolated and visual artifacts are preferred over errors. What can fail
//! is the plumbing around it:
//! - Buffers whose length does not match their declared dimensions
//! - Zero-sized tables or lookups
//! - Named pipeline inputs that were never declared, or bound with the wrong kind
//!
//! # Usage
//!
//! ```rust
//! use grade_core::{GradeError, GradeResult};
//!
//! fn check(len: usize, width: u32, height: u32) -> GradeResult<()> {
//!     if len != width as usize * height as usize * 4 {
//!         return Err(GradeError::invalid_dimensions(width, height, "length mismatch"));
//!     }
//!     Ok(())
//! }
//! assert!(check(16, 2, 2).is_ok());
//! ```

use thiserror::Error;

/// Result type alias using [`GradeError`].
pub type GradeResult<T> = std::result::Result<T, GradeError>;

/// Errors raised at the API seams of the grading engine.
#[derive(Debug, Error)]
pub enum GradeError {
    /// Buffer dimensions are invalid or don't match the data length.
    #[error("invalid dimensions {width}x{height}: {reason}")]
    InvalidDimensions {
        /// Image width
        width: u32,
        /// Image height
        height: u32,
        /// What was wrong
        reason: String,
    },

    /// A tunable parameter is outside its usable domain.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Parameter name
        name: &'static str,
        /// What was wrong
        reason: String,
    },

    /// A named input was bound that the pipeline never declared.
    #[error("input `{0}` does not exist")]
    UnknownInput(String),

    /// A named input was bound with a value of the wrong kind.
    #[error("input `{name}` expects {expected}, got {got}")]
    InputKindMismatch {
        /// Input name
        name: String,
        /// Declared kind
        expected: &'static str,
        /// Kind of the supplied value
        got: &'static str,
    },
}

impl GradeError {
    /// Creates a [`GradeError::InvalidDimensions`] error.
    #[inline]
    pub fn invalid_dimensions(width: u32, height: u32, reason: impl Into<String>) -> Self {
        Self::InvalidDimensions {
            width,
            height,
            reason: reason.into(),
        }
    }

    /// Creates a [`GradeError::InvalidParameter`] error.
    #[inline]
    pub fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
