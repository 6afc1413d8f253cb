//! # Reference Resolution
//!
//! Internal references are slash-delimited paths anchored at the schema
//! root, e.g. `#/definitions/caseEntry`. The leading anchor segment is
//! dropped; every remaining segment is a key into the current object (or a
//! 0-based index into the current array).
//!
//! Segments are used verbatim: there is no percent-decoding and no `~0`/`~1`
//! unescaping.

use serde_json::Value;

use crate::error::SchemaError;

/// Lookup keys of `reference`, with the anchor segment removed.
///
/// `#` and the empty string both denote the root and yield no keys.
pub fn reference_segments(reference: &str) -> impl Iterator<Item = &str> {
    reference.split('/').skip(1)
}

/// Render a schema location as a reference string, `#` for the root.
pub fn render_pointer<S: AsRef<str>>(segments: &[S]) -> String {
    let mut pointer = String::from("#");
    for segment in segments {
        pointer.push('/');
        pointer.push_str(segment.as_ref());
    }
    pointer
}

/// Resolve `reference` against `root`, returning the raw sub-schema it denotes.
///
/// # Errors
///
/// Returns [`SchemaError::UnresolvedReference`] naming the first segment
/// that does not exist. This is a schema defect; it is never reported as a
/// document diagnostic.
pub fn resolve<'s>(root: &'s Value, reference: &str) -> Result<&'s Value, SchemaError> {
    let mut node = root;
    for segment in reference_segments(reference) {
        node = step(node, segment).ok_or_else(|| SchemaError::UnresolvedReference {
            reference: reference.to_string(),
            segment: segment.to_string(),
        })?;
    }
    Ok(node)
}

fn step<'s>(node: &'s Value, segment: &str) -> Option<&'s Value> {
    match node {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}
