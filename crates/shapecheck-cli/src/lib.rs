//! # shapecheck-cli — Command-Line Interface
//!
//! The embedding application for the validation engine: it reads schema,
//! configuration and document files from disk and renders results.
//!
//! ## Subcommands
//!
//! - `shapecheck validate --schema <SCHEMA> <DOCUMENT>...` — validate documents
//! - `shapecheck resolve --schema <SCHEMA> <REFERENCE>` — print the sub-schema
//!   a `$ref` points to
//!
//! ## Exit Codes
//!
//! - `0` — every document is valid
//! - `1` — at least one document has diagnostics
//! - `2` — operational error (unreadable file, broken schema, bad config)
//!
//! ## Crate Policy
//!
//! - CLI construction (argument parsing) is separated from business logic.
//! - Handler functions delegate to `shapecheck-schema` and write to a
//!   caller-supplied sink, so they can be tested without a terminal.

pub mod resolve;
pub mod validate;

/// Path as shown to a user; the root path is rendered as `(root)`.
pub fn display_path(path: &str) -> &str {
    if path.is_empty() {
        "(root)"
    } else {
        path
    }
}
