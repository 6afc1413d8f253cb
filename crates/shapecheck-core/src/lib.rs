//! # shapecheck-core — Foundational Types
//!
//! Leaf crate of the shapecheck workspace. It defines the vocabulary shared
//! by the schema engine and the CLI: where a value lives in a document
//! ([`InstancePath`]), what is wrong with it ([`Diagnostic`] /
//! [`Violation`]), and how `date-time` strings are recognized
//! ([`Timestamp`]).
//!
//! ## Crate Policy
//!
//! - No dependencies on other `shapecheck-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod diagnostic;
pub mod error;
pub mod path;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use diagnostic::{Diagnostic, Violation};
pub use error::CoreError;
pub use path::{InstancePath, PathSegment};
pub use temporal::Timestamp;
