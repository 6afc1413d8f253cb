//! # Schema Errors
//!
//! Failures that mean the *schema* (or the configuration around it) is
//! broken, as opposed to the document under test. Document defects are
//! never errors; they are [`Diagnostic`](shapecheck_core::Diagnostic)s.
//!
//! Every variant here is raised before a document is walked: when the schema
//! is loaded and compiled, or when configuration is read.

use thiserror::Error;

/// Error in a schema, its loading, or the validator configuration.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// A `$ref` names a location that does not exist in the schema tree.
    #[error("unresolved reference '{reference}': nothing at segment '{segment}'")]
    UnresolvedReference {
        /// The reference string as written in the schema.
        reference: String,
        /// The first segment that failed to resolve.
        segment: String,
    },

    /// A chain of `$ref`s loops back on itself without reaching a node
    /// that declares anything.
    #[error("reference cycle through '{reference}' never reaches a concrete schema node")]
    ReferenceCycle {
        /// One reference on the cycle.
        reference: String,
    },

    /// A schema node, or one of its keywords, has the wrong JSON type.
    #[error("malformed schema node at '{pointer}': {reason}")]
    MalformedNode {
        /// Location of the node within the schema (`#/definitions/caseEntry`).
        pointer: String,
        /// What was wrong with it.
        reason: String,
    },

    /// A `pattern` keyword is not a valid regular expression.
    #[error("invalid pattern {pattern:?} at '{pointer}': {source}")]
    InvalidPattern {
        /// Location of the node carrying the pattern.
        pointer: String,
        /// The pattern as written.
        pattern: String,
        /// Compilation failure reported by the regex engine.
        #[source]
        source: regex::Error,
    },

    /// The schema file could not be read or parsed.
    #[error("schema load error for '{schema_name}': {reason}")]
    SchemaLoad {
        /// Schema file path or identifier.
        schema_name: String,
        /// Reason the schema could not be loaded.
        reason: String,
    },

    /// A document file could not be read.
    #[error("document load error for '{path}': {reason}")]
    DocumentLoad {
        /// Path to the document that failed to load.
        path: String,
        /// Reason the document could not be loaded.
        reason: String,
    },

    /// The validator configuration could not be read or parsed.
    #[error("config error for '{path}': {reason}")]
    Config {
        /// Path or identifier of the configuration source.
        path: String,
        /// Reason the configuration was rejected.
        reason: String,
    },

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
