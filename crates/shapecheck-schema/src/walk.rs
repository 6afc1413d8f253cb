//! # Structural Validation
//!
//! Walks a document value against a compiled [`Schema`], appending a
//! [`Diagnostic`] for every violation found. The walk never stops at the
//! first problem and never fails: it is total over any document and any
//! schema that compiled.
//!
//! Per node:
//!
//! 1. References are followed to the declaration that governs them.
//! 2. The declared shape is checked. A value of the wrong JSON type gets one
//!    `Expected <type>` diagnostic and no further checks for that shape;
//!    otherwise every constraint of the shape is checked independently.
//! 3. `const` is checked last, even after a type mismatch.
//!
//! Object fields are visited in the document's own order, not the schema's.

use std::cmp::Ordering;

use serde_json::{Map, Number, Value};
use shapecheck_core::diagnostic::display_literal;
use shapecheck_core::{Diagnostic, InstancePath, Timestamp, Violation};

use crate::schema::{
    ArrayShape, IntegerShape, NodeId, ObjectShape, Schema, Shape, StringFormat, StringShape,
};

impl Schema {
    /// Validate `value` against the schema root, returning every diagnostic
    /// in discovery order.
    pub fn validate(&self, value: &Value) -> Vec<Diagnostic> {
        let mut out = Vec::new();
        self.validate_node(value, self.root(), &InstancePath::root(), &mut out);
        out
    }

    /// Validate `value`, found at `path`, against `node`, appending to `out`.
    pub fn validate_node(
        &self,
        value: &Value,
        node: NodeId,
        path: &InstancePath<'_>,
        out: &mut Vec<Diagnostic>,
    ) {
        let declaration = self.declaration(node);

        match &declaration.shape {
            Shape::Object(shape) => self.check_object(value, shape, path, out),
            Shape::Array(shape) => self.check_array(value, shape, path, out),
            Shape::String(shape) => check_string(value, shape, path, out),
            Shape::Integer(shape) => check_integer(value, shape, path, out),
            Shape::Any => {}
        }

        if let Some(expected) = &declaration.constant {
            if !literal_eq(value, expected) {
                emit(
                    out,
                    path,
                    Violation::ConstMismatch {
                        expected: expected.clone(),
                    },
                );
            }
        }
    }

    fn check_object(
        &self,
        value: &Value,
        shape: &ObjectShape,
        path: &InstancePath<'_>,
        out: &mut Vec<Diagnostic>,
    ) {
        let Some(fields) = value.as_object() else {
            emit(out, path, Violation::ExpectedObject);
            return;
        };

        for name in &shape.required {
            if !fields.contains_key(name) {
                emit(out, &path.field(name), Violation::RequiredMissing);
            }
        }

        self.check_fields(fields, shape, path, out);
    }

    fn check_fields(
        &self,
        fields: &Map<String, Value>,
        shape: &ObjectShape,
        path: &InstancePath<'_>,
        out: &mut Vec<Diagnostic>,
    ) {
        for (key, child) in fields {
            let child_path = path.field(key);
            match shape.properties.get(key) {
                Some(&node) => self.validate_node(child, node, &child_path, out),
                None if shape.closed => emit(out, &child_path, Violation::AdditionalProperty),
                None => {}
            }
        }
    }

    fn check_array(
        &self,
        value: &Value,
        shape: &ArrayShape,
        path: &InstancePath<'_>,
        out: &mut Vec<Diagnostic>,
    ) {
        let Some(elements) = value.as_array() else {
            emit(out, path, Violation::ExpectedArray);
            return;
        };

        let len = elements.len() as u64;
        if let Some(min) = shape.min_items {
            if len < min {
                emit(out, path, Violation::TooFewItems { min });
            }
        }
        if let Some(max) = shape.max_items {
            if len > max {
                emit(out, path, Violation::TooManyItems { max });
            }
        }

        if let Some(items) = shape.items {
            for (index, element) in elements.iter().enumerate() {
                self.validate_node(element, items, &path.index(index), out);
            }
        }
    }
}

fn check_string(value: &Value, shape: &StringShape, path: &InstancePath<'_>, out: &mut Vec<Diagnostic>) {
    let Some(text) = value.as_str() else {
        emit(out, path, Violation::ExpectedString);
        return;
    };

    let chars = text.chars().count() as u64;
    if let Some(min) = shape.min_length {
        if chars < min {
            emit(out, path, Violation::TooShort { min });
        }
    }
    if let Some(max) = shape.max_length {
        if chars > max {
            emit(out, path, Violation::TooLong { max });
        }
    }

    if let Some(pattern) = &shape.pattern {
        if !pattern.is_match(text) {
            emit(
                out,
                path,
                Violation::PatternMismatch {
                    pattern: pattern.as_str().to_string(),
                },
            );
        }
    }

    if let Some(allowed) = &shape.allowed {
        if !allowed.iter().any(|literal| literal.as_str() == Some(text)) {
            emit(
                out,
                path,
                Violation::NotInEnum {
                    allowed: allowed.iter().map(display_literal).collect(),
                },
            );
        }
    }

    if shape.format == Some(StringFormat::DateTime) && !Timestamp::is_valid(text) {
        emit(out, path, Violation::InvalidDateTime);
    }
}

fn check_integer(value: &Value, shape: &IntegerShape, path: &InstancePath<'_>, out: &mut Vec<Diagnostic>) {
    let number = match value {
        Value::Number(n) if is_whole(n) => n,
        _ => {
            emit(out, path, Violation::ExpectedInteger);
            return;
        }
    };

    if let Some(minimum) = &shape.minimum {
        if compare_numbers(number, minimum) == Some(Ordering::Less) {
            emit(
                out,
                path,
                Violation::BelowMinimum {
                    minimum: minimum.clone(),
                },
            );
        }
    }
    if let Some(maximum) = &shape.maximum {
        if compare_numbers(number, maximum) == Some(Ordering::Greater) {
            emit(
                out,
                path,
                Violation::AboveMaximum {
                    maximum: maximum.clone(),
                },
            );
        }
    }
}

fn emit(out: &mut Vec<Diagnostic>, path: &InstancePath<'_>, violation: Violation) {
    out.push(Diagnostic::new(path.to_string(), violation));
}

/// True for numbers without a fractional part (`3` and `3.0`, not `3.5`).
fn is_whole(n: &Number) -> bool {
    n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.is_finite() && f.fract() == 0.0)
}

/// Numeric comparison across serde_json's integer and float representations.
fn compare_numbers(a: &Number, b: &Number) -> Option<Ordering> {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return Some(x.cmp(&y));
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return Some(x.cmp(&y));
    }
    a.as_f64()?.partial_cmp(&b.as_f64()?)
}

/// Structural equality for `const`; `1` and `1.0` are equal.
pub(crate) fn literal_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => compare_numbers(x, y) == Some(Ordering::Equal),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| literal_eq(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| literal_eq(x, y)))
        }
        _ => a == b,
    }
}
