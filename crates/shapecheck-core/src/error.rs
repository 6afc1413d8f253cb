//! # Error Types
//!
//! Errors raised by the core primitives. Document defects are never errors;
//! they are reported as [`Diagnostic`](crate::Diagnostic)s.

use thiserror::Error;

/// Error raised by core primitives.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A string could not be read as a calendar timestamp.
    #[error("invalid timestamp {input:?}: {reason}")]
    InvalidTimestamp {
        /// The rejected input.
        input: String,
        /// Why every accepted layout failed.
        reason: String,
    },
}
