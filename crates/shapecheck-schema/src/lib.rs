//! # shapecheck-schema — Structural Document Validation
//!
//! Checks a document against a schema and reports *every* violation, each
//! tagged with the path of the offending value.
//!
//! ## Pipeline
//!
//! - [`schema`] — compiles a raw schema tree into typed nodes, resolving
//!   every `$ref` up front ([`Schema::compile`]).
//! - [`resolve`] — the reference resolver (`#/definitions/caseEntry` →
//!   sub-schema).
//! - [`walk`] — the structural validator ([`Schema::validate`]).
//! - [`uniqueness`] — whole-document identifier uniqueness.
//! - [`document`] — payload parsing and the [`run_validation`] entry point.
//! - [`config`] — [`ValidatorConfig`], loaded from YAML.
//!
//! ## Two Kinds of Failure
//!
//! A broken *document* is never an error: it yields diagnostics in a
//! [`ValidationResult`]. A broken *schema* (unresolvable reference,
//! reference cycle, invalid pattern) is a [`SchemaError`], raised when the
//! schema is compiled.
//!
//! ```
//! use serde_json::json;
//! use shapecheck_schema::{run_validation, Schema};
//!
//! let schema = Schema::compile(json!({"type": "object", "required": ["title"]})).unwrap();
//! let result = run_validation("{}", &schema);
//! assert!(!result.is_valid());
//! assert_eq!(result.diagnostics()[0].to_string(), "title: Required field missing");
//! ```

pub mod config;
pub mod document;
pub mod error;
pub mod resolve;
pub mod schema;
pub mod uniqueness;
pub mod walk;

pub use config::{UniquenessRule, ValidatorConfig};
pub use document::{run_validation, run_with, validate_document, PayloadFormat, ValidationResult, Validator};
pub use error::SchemaError;
pub use resolve::resolve;
pub use schema::{NodeId, Schema, SchemaNode, Shape};
pub use shapecheck_core::{Diagnostic, Violation};
