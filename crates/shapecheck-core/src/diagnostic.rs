//! # Diagnostics
//!
//! A [`Diagnostic`] is one reported mismatch between a document and a
//! schema: the rendered [`InstancePath`](crate::InstancePath) of the
//! offending value plus the [`Violation`] found there. Diagnostics are plain
//! data; they are never raised as errors.

use std::fmt;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use serde_json::{Number, Value};

/// What was wrong with a value.
///
/// The `Display` form is the user-facing message, e.g.
/// `Array must have at least 1 items`.
#[derive(Debug, Clone, PartialEq)]
pub enum Violation {
    /// Schema declares `type: object`, value is not a keyed map.
    ExpectedObject,
    /// Schema declares `type: array`, value is not a sequence.
    ExpectedArray,
    /// Schema declares `type: string`, value is not text.
    ExpectedString,
    /// Schema declares `type: integer`, value is not a whole number.
    ExpectedInteger,
    /// A `required` field is absent.
    RequiredMissing,
    /// A field not named in `properties` under `additionalProperties: false`.
    AdditionalProperty,
    /// Fewer elements than `minItems`.
    TooFewItems { min: u64 },
    /// More elements than `maxItems`.
    TooManyItems { max: u64 },
    /// Fewer characters than `minLength`.
    TooShort { min: u64 },
    /// More characters than `maxLength`.
    TooLong { max: u64 },
    /// No match for `pattern` anywhere in the string.
    PatternMismatch { pattern: String },
    /// Not one of the `enum` literals.
    NotInEnum { allowed: Vec<String> },
    /// `format: date-time` and the string is not a timestamp.
    InvalidDateTime,
    /// Below the inclusive `minimum`.
    BelowMinimum { minimum: Number },
    /// Above the inclusive `maximum`.
    AboveMaximum { maximum: Number },
    /// Not equal to `const`.
    ConstMismatch { expected: Value },
    /// Two entries of a uniquely-keyed collection share an identifier.
    DuplicateIds { label: String },
    /// The payload text is not well-formed structured data.
    Parse { format: String, detail: String },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExpectedObject => f.write_str("Expected object"),
            Self::ExpectedArray => f.write_str("Expected array"),
            Self::ExpectedString => f.write_str("Expected string"),
            Self::ExpectedInteger => f.write_str("Expected integer"),
            Self::RequiredMissing => f.write_str("Required field missing"),
            Self::AdditionalProperty => f.write_str("Additional property not allowed"),
            Self::TooFewItems { min } => write!(f, "Array must have at least {min} items"),
            Self::TooManyItems { max } => write!(f, "Array must have at most {max} items"),
            Self::TooShort { min } => write!(f, "String must be at least {min} characters"),
            Self::TooLong { max } => write!(f, "String must be at most {max} characters"),
            Self::PatternMismatch { pattern } => {
                write!(f, "String does not match pattern: {pattern}")
            }
            Self::NotInEnum { allowed } => {
                write!(f, "Value must be one of: {}", allowed.join(", "))
            }
            Self::InvalidDateTime => f.write_str("Invalid date-time format"),
            Self::BelowMinimum { minimum } => {
                write!(f, "Value must be at least {}", display_number(minimum))
            }
            Self::AboveMaximum { maximum } => {
                write!(f, "Value must be at most {}", display_number(maximum))
            }
            Self::ConstMismatch { expected } => {
                write!(f, "Value must be exactly: {}", display_literal(expected))
            }
            Self::DuplicateIds { label } => write!(f, "Duplicate {label} IDs found"),
            Self::Parse { format, detail } => write!(f, "{format} parse error: {detail}"),
        }
    }
}

/// Render a schema literal for a message: strings bare, numbers via
/// [`display_number`], everything else as JSON.
pub fn display_literal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => display_number(n),
        other => other.to_string(),
    }
}

/// Render a number the way it reads in a message: whole-valued floats drop
/// their fractional part (`5.0` → `5`).
pub fn display_number(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
        _ => n.to_string(),
    }
}

/// One path-tagged violation.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    path: String,
    violation: Violation,
}

impl Diagnostic {
    /// Create a diagnostic at an already-rendered path.
    pub fn new(path: impl Into<String>, violation: Violation) -> Self {
        Self {
            path: path.into(),
            violation,
        }
    }

    /// Dotted/bracketed address of the offending value; empty for the root.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The structured violation.
    pub fn violation(&self) -> &Violation {
        &self.violation
    }

    /// The user-facing message.
    pub fn message(&self) -> String {
        self.violation.to_string()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.violation)
    }
}

impl Serialize for Diagnostic {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Diagnostic", 2)?;
        state.serialize_field("path", &self.path)?;
        state.serialize_field("message", &self.message())?;
        state.end()
    }
}
