//! # Instance Paths
//!
//! Addresses of values inside a document, e.g. `cases[2].clarifying.questions[0]`.
//!
//! An [`InstancePath`] is an immutable, parent-linked list of segments that
//! lives on the validator's call stack: descending into a field or element
//! borrows the parent path instead of copying it, and the dotted/bracketed
//! text form is only produced when a diagnostic is emitted.

use std::fmt;

/// One step from a container into one of its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathSegment<'a> {
    /// A named field of an object.
    Field(&'a str),
    /// A 0-based position in an array.
    Index(usize),
}

/// Address of a value within a document. The root has the empty path.
#[derive(Debug, Clone, Copy)]
pub struct InstancePath<'a> {
    parent: Option<&'a InstancePath<'a>>,
    segment: Option<PathSegment<'a>>,
}

impl<'a> InstancePath<'a> {
    /// The path of the document root.
    pub const fn root() -> Self {
        Self {
            parent: None,
            segment: None,
        }
    }

    /// Path of the field `name` below this path.
    pub fn field<'b>(&'b self, name: &'b str) -> InstancePath<'b> {
        InstancePath {
            parent: Some(self),
            segment: Some(PathSegment::Field(name)),
        }
    }

    /// Path of the array element at `index` below this path.
    pub fn index<'b>(&'b self, index: usize) -> InstancePath<'b> {
        InstancePath {
            parent: Some(self),
            segment: Some(PathSegment::Index(index)),
        }
    }

    /// Segments from the root down to this path.
    pub fn segments(&self) -> Vec<PathSegment<'a>> {
        let mut segments = Vec::new();
        let mut current = Some(self);
        while let Some(path) = current {
            if let Some(segment) = path.segment {
                segments.push(segment);
            }
            current = path.parent;
        }
        segments.reverse();
        segments
    }
}

impl Default for InstancePath<'_> {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for InstancePath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for segment in self.segments() {
            match segment {
                PathSegment::Field(name) => {
                    if !first {
                        f.write_str(".")?;
                    }
                    f.write_str(name)?;
                }
                PathSegment::Index(i) => write!(f, "[{i}]")?,
            }
            first = false;
        }
        Ok(())
    }
}
