//! # Compiled Schemas
//!
//! A raw schema tree (`serde_json::Value`) is compiled once into an arena of
//! typed [`SchemaNode`]s. Each node is either a reference to another node or
//! a [`Declaration`]: one [`Shape`] variant per declared `type`, carrying
//! only the constraints that apply to that type, plus the type-agnostic
//! `const` on the envelope.
//!
//! ## Compilation
//!
//! Only nodes reachable from the root through `properties`, `items` and
//! `$ref` are compiled. Nodes are memoized by their location in the raw
//! tree, so every `$ref` to a definition shares one compiled node and a
//! definition that refers to itself compiles to a finite graph.
//!
//! All schema defects surface here, before any document is examined:
//! unresolved references, malformed keyword values, invalid patterns, and
//! reference chains that loop without ever reaching a declaration.
//! A compiled [`Schema`] is immutable and can be shared across threads.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Number, Value};

use crate::error::SchemaError;
use crate::resolve::{reference_segments, render_pointer, resolve};

/// Index of a node in a compiled [`Schema`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// One compiled schema node.
#[derive(Debug, Clone)]
pub enum SchemaNode {
    /// A `$ref` node. The target's fields govern validation; sibling
    /// keywords on the referencing node are ignored.
    Reference {
        /// The reference string as written.
        reference: String,
        /// Node the reference resolved to.
        target: NodeId,
    },
    /// A node that declares a shape.
    Declared(Declaration),
}

/// The declared contents of a non-reference node.
#[derive(Debug, Clone, Default)]
pub struct Declaration {
    /// Type-specific constraints.
    pub shape: Shape,
    /// Literal the value must equal, checked whatever the type.
    pub constant: Option<Value>,
}

/// Constraints selected by the node's `type`.
#[derive(Debug, Clone, Default)]
pub enum Shape {
    /// `type: object`
    Object(ObjectShape),
    /// `type: array`
    Array(ArrayShape),
    /// `type: string`
    String(StringShape),
    /// `type: integer`
    Integer(IntegerShape),
    /// No `type`, or one this engine does not check.
    #[default]
    Any,
}

/// Constraints of an object node.
#[derive(Debug, Clone, Default)]
pub struct ObjectShape {
    /// Field names that must be present, in declaration order.
    pub required: Vec<String>,
    /// Declared fields and their schemas.
    pub properties: HashMap<String, NodeId>,
    /// True when `additionalProperties` is explicitly `false`.
    pub closed: bool,
}

/// Constraints of an array node.
#[derive(Debug, Clone, Default)]
pub struct ArrayShape {
    /// Schema applied to every element.
    pub items: Option<NodeId>,
    pub min_items: Option<u64>,
    pub max_items: Option<u64>,
}

/// Constraints of a string node.
#[derive(Debug, Clone, Default)]
pub struct StringShape {
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    /// Matched anywhere in the string (unanchored search). Uses the `regex`
    /// dialect, which has no lookaround or backreferences; a pattern relying
    /// on them fails compilation with [`SchemaError::InvalidPattern`].
    pub pattern: Option<Regex>,
    /// Allowed literals. Non-string members never match.
    pub allowed: Option<Vec<Value>>,
    pub format: Option<StringFormat>,
}

/// A recognized `format` keyword value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringFormat {
    /// `date-time`: the string must parse as a calendar timestamp.
    DateTime,
}

/// Constraints of an integer node; bounds are inclusive.
#[derive(Debug, Clone, Default)]
pub struct IntegerShape {
    pub minimum: Option<Number>,
    pub maximum: Option<Number>,
}

/// Keywords read through serde. `properties`, `items` and `const` are read
/// from the raw object directly so children keep their tree location.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Keywords {
    #[serde(rename = "$ref")]
    reference: Option<String>,
    #[serde(rename = "type")]
    kind: Option<Value>,
    required: Option<Vec<String>>,
    additional_properties: Option<Value>,
    min_items: Option<Number>,
    max_items: Option<Number>,
    min_length: Option<Number>,
    max_length: Option<Number>,
    pattern: Option<String>,
    #[serde(rename = "enum")]
    allowed: Option<Vec<Value>>,
    format: Option<String>,
    minimum: Option<Number>,
    maximum: Option<Number>,
}

/// Keywords that have an effect when they appear beside `$ref`.
const SHAPE_KEYWORDS: &[&str] = &[
    "type",
    "required",
    "properties",
    "additionalProperties",
    "items",
    "minItems",
    "maxItems",
    "minLength",
    "maxLength",
    "pattern",
    "enum",
    "format",
    "minimum",
    "maximum",
    "const",
];

/// A compiled, immutable schema.
#[derive(Debug, Clone)]
pub struct Schema {
    raw: Value,
    nodes: Vec<SchemaNode>,
    root: NodeId,
}

impl Schema {
    /// Compile a raw schema tree.
    ///
    /// # Errors
    ///
    /// Returns the first schema defect found; see [`SchemaError`].
    pub fn compile(raw: Value) -> Result<Self, SchemaError> {
        let (nodes, root) = {
            let mut compiler = Compiler::new(&raw);
            let root = compiler.compile_at(Vec::new(), &raw)?;
            (compiler.nodes, root)
        };
        check_reference_chains(&nodes)?;

        let references = nodes
            .iter()
            .filter(|n| matches!(n, SchemaNode::Reference { .. }))
            .count();
        tracing::debug!(nodes = nodes.len(), references, "compiled schema");

        Ok(Self { raw, nodes, root })
    }

    /// Parse JSON schema text and compile it.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::SchemaLoad`] if the text is not JSON, otherwise
    /// any compilation error.
    pub fn from_json_str(text: &str) -> Result<Self, SchemaError> {
        let raw: Value = serde_json::from_str(text).map_err(|e| SchemaError::SchemaLoad {
            schema_name: "<inline>".to_string(),
            reason: format!("invalid JSON: {e}"),
        })?;
        Self::compile(raw)
    }

    /// Load a JSON schema file and compile it.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::SchemaLoad`] if the file cannot be read or is
    /// not JSON, otherwise any compilation error.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| SchemaError::SchemaLoad {
            schema_name: path.display().to_string(),
            reason: format!("cannot read file: {e}"),
        })?;
        let raw: Value = serde_json::from_str(&content).map_err(|e| SchemaError::SchemaLoad {
            schema_name: path.display().to_string(),
            reason: format!("invalid JSON: {e}"),
        })?;
        tracing::debug!(schema = %path.display(), "loaded schema file");
        Self::compile(raw)
    }

    /// The root node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Look up a compiled node.
    pub fn node(&self, id: NodeId) -> Option<&SchemaNode> {
        self.nodes.get(id.0)
    }

    /// Number of compiled nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Resolve a reference against the raw schema tree.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnresolvedReference`] if any segment is missing.
    pub fn resolve(&self, reference: &str) -> Result<&Value, SchemaError> {
        resolve(&self.raw, reference)
    }

    /// Follow references from `id` to the declaration that governs it.
    ///
    /// Compilation guarantees every reference chain ends in a declaration.
    pub(crate) fn declaration(&self, mut id: NodeId) -> &Declaration {
        loop {
            match &self.nodes[id.0] {
                SchemaNode::Reference { target, .. } => id = *target,
                SchemaNode::Declared(declaration) => return declaration,
            }
        }
    }
}

struct Compiler<'s> {
    root: &'s Value,
    nodes: Vec<SchemaNode>,
    by_location: HashMap<Vec<String>, NodeId>,
}

impl<'s> Compiler<'s> {
    fn new(root: &'s Value) -> Self {
        Self {
            root,
            nodes: Vec::new(),
            by_location: HashMap::new(),
        }
    }

    fn compile_at(&mut self, location: Vec<String>, value: &'s Value) -> Result<NodeId, SchemaError> {
        if let Some(&id) = self.by_location.get(&location) {
            return Ok(id);
        }

        // Reserve the slot first so a reference back to this location
        // finds it while its children are still compiling.
        let id = NodeId(self.nodes.len());
        self.nodes.push(SchemaNode::Declared(Declaration::default()));
        self.by_location.insert(location.clone(), id);

        let node = self.build(&location, value)?;
        self.nodes[id.0] = node;
        Ok(id)
    }

    fn build(&mut self, location: &[String], value: &'s Value) -> Result<SchemaNode, SchemaError> {
        let pointer = render_pointer(location);
        let object = value.as_object().ok_or_else(|| SchemaError::MalformedNode {
            pointer: pointer.clone(),
            reason: format!("expected a schema object, found {}", json_kind(value)),
        })?;
        let mut keywords = Keywords::deserialize(value).map_err(|e| SchemaError::MalformedNode {
            pointer: pointer.clone(),
            reason: e.to_string(),
        })?;

        if let Some(reference) = keywords.reference.take() {
            let ignored: Vec<&str> = object
                .keys()
                .map(String::as_str)
                .filter(|k| SHAPE_KEYWORDS.contains(k))
                .collect();
            if !ignored.is_empty() {
                tracing::warn!(
                    node = %pointer,
                    reference = %reference,
                    ?ignored,
                    "keywords beside $ref are ignored"
                );
            }

            let target_value = resolve(self.root, &reference)?;
            let target_location: Vec<String> =
                reference_segments(&reference).map(str::to_string).collect();
            let target = self.compile_at(target_location, target_value)?;
            return Ok(SchemaNode::Reference { reference, target });
        }

        let kind = keywords.kind.as_ref().and_then(Value::as_str).map(str::to_string);
        let shape = match kind.as_deref() {
            Some("object") => Shape::Object(self.object_shape(location, object, &keywords)?),
            Some("array") => Shape::Array(self.array_shape(location, object, &keywords)?),
            Some("string") => Shape::String(string_shape(&pointer, keywords)?),
            Some("integer") => Shape::Integer(IntegerShape {
                minimum: keywords.minimum,
                maximum: keywords.maximum,
            }),
            Some(other) => {
                tracing::debug!(node = %pointer, kind = other, "unchecked type; only const applies");
                Shape::Any
            }
            None => Shape::Any,
        };

        Ok(SchemaNode::Declared(Declaration {
            shape,
            constant: object.get("const").cloned(),
        }))
    }

    fn object_shape(
        &mut self,
        location: &[String],
        object: &'s Map<String, Value>,
        keywords: &Keywords,
    ) -> Result<ObjectShape, SchemaError> {
        let mut properties = HashMap::new();
        match object.get("properties") {
            None => {}
            Some(Value::Object(declared)) => {
                for (name, child) in declared {
                    let child_location = child_location(location, &["properties", name]);
                    let id = self.compile_at(child_location, child)?;
                    properties.insert(name.clone(), id);
                }
            }
            Some(other) => {
                return Err(SchemaError::MalformedNode {
                    pointer: render_pointer(location),
                    reason: format!("properties must be an object, found {}", json_kind(other)),
                })
            }
        }

        Ok(ObjectShape {
            required: keywords.required.clone().unwrap_or_default(),
            properties,
            closed: matches!(keywords.additional_properties, Some(Value::Bool(false))),
        })
    }

    fn array_shape(
        &mut self,
        location: &[String],
        object: &'s Map<String, Value>,
        keywords: &Keywords,
    ) -> Result<ArrayShape, SchemaError> {
        let items = match object.get("items") {
            Some(child) => Some(self.compile_at(child_location(location, &["items"]), child)?),
            None => None,
        };
        let pointer = render_pointer(location);
        Ok(ArrayShape {
            items,
            min_items: count_bound(&pointer, "minItems", keywords.min_items.as_ref())?,
            max_items: count_bound(&pointer, "maxItems", keywords.max_items.as_ref())?,
        })
    }
}

fn string_shape(pointer: &str, keywords: Keywords) -> Result<StringShape, SchemaError> {
    let pattern = keywords
        .pattern
        .map(|pattern| {
            Regex::new(&pattern).map_err(|source| SchemaError::InvalidPattern {
                pointer: pointer.to_string(),
                pattern,
                source,
            })
        })
        .transpose()?;

    let format = match keywords.format.as_deref() {
        Some("date-time") => Some(StringFormat::DateTime),
        Some(other) => {
            tracing::warn!(node = %pointer, format = other, "unrecognized string format ignored");
            None
        }
        None => None,
    };

    Ok(StringShape {
        min_length: count_bound(pointer, "minLength", keywords.min_length.as_ref())?,
        max_length: count_bound(pointer, "maxLength", keywords.max_length.as_ref())?,
        pattern,
        allowed: keywords.allowed,
        format,
    })
}

/// Read a length or item-count bound: a non-negative whole number, written
/// either as an integer or as a whole-valued float (`10.0`).
fn count_bound(pointer: &str, keyword: &str, bound: Option<&Number>) -> Result<Option<u64>, SchemaError> {
    let Some(n) = bound else {
        return Ok(None);
    };
    if let Some(count) = n.as_u64() {
        return Ok(Some(count));
    }
    match n.as_f64() {
        Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => Ok(Some(f as u64)),
        _ => Err(SchemaError::MalformedNode {
            pointer: pointer.to_string(),
            reason: format!("{keyword} must be a non-negative whole number, found {n}"),
        }),
    }
}

fn child_location(parent: &[String], steps: &[&str]) -> Vec<String> {
    parent
        .iter()
        .cloned()
        .chain(steps.iter().map(|s| s.to_string()))
        .collect()
}

/// Reject reference chains that revisit a node before reaching a declaration.
fn check_reference_chains(nodes: &[SchemaNode]) -> Result<(), SchemaError> {
    for start in 0..nodes.len() {
        let mut seen = HashSet::new();
        let mut current = start;
        while let SchemaNode::Reference { reference, target } = &nodes[current] {
            if !seen.insert(current) {
                return Err(SchemaError::ReferenceCycle {
                    reference: reference.clone(),
                });
            }
            current = target.0;
        }
    }
    Ok(())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
