//! # Document Validation
//!
//! Entry points that take a raw payload all the way to a
//! [`ValidationResult`]:
//!
//! 1. Parse the payload. Malformed text short-circuits with a single
//!    diagnostic at the root path; nothing is walked.
//! 2. Walk the parsed document against the compiled schema.
//! 3. Apply the whole-document uniqueness rules from [`ValidatorConfig`].
//!
//! The result is valid iff steps 2 and 3 produced no diagnostics.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Serialize;
use serde_json::Value;
use shapecheck_core::{Diagnostic, Violation};

use crate::config::ValidatorConfig;
use crate::error::SchemaError;
use crate::schema::Schema;
use crate::uniqueness;

/// Text syntax of a document payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadFormat {
    #[default]
    Json,
    Yaml,
}

impl PayloadFormat {
    /// Infer the format from a file extension: `.yaml`/`.yml` are YAML,
    /// everything else is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Self::Yaml,
            _ => Self::Json,
        }
    }

    /// Name used in parse error messages.
    pub fn name(self) -> &'static str {
        match self {
            Self::Json => "JSON",
            Self::Yaml => "YAML",
        }
    }

    /// Parse payload text into the JSON value model.
    pub fn parse(self, raw: &str) -> Result<Value, String> {
        match self {
            Self::Json => serde_json::from_str(raw).map_err(|e| e.to_string()),
            Self::Yaml => {
                let yaml: serde_yaml::Value = serde_yaml::from_str(raw).map_err(|e| e.to_string())?;
                yaml_to_json(yaml)
            }
        }
    }
}

impl FromStr for PayloadFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            other => Err(format!("unknown payload format '{other}' (expected json or yaml)")),
        }
    }
}

impl fmt::Display for PayloadFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Convert a YAML tree into the JSON value model.
///
/// Scalar map keys are stringified, tags are dropped, and floats JSON cannot
/// represent (NaN, infinities) are rejected.
fn yaml_to_json(yaml: serde_yaml::Value) -> Result<Value, String> {
    use serde_yaml::Value as Yaml;

    Ok(match yaml {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                let f = n.as_f64().unwrap_or(f64::NAN);
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| format!("number {n} has no JSON representation"))?
            }
        }
        Yaml::String(s) => Value::String(s),
        Yaml::Sequence(items) => Value::Array(
            items
                .into_iter()
                .map(yaml_to_json)
                .collect::<Result<_, _>>()?,
        ),
        Yaml::Mapping(mapping) => {
            let mut object = serde_json::Map::with_capacity(mapping.len());
            for (key, value) in mapping {
                let key = match key {
                    Yaml::String(s) => s,
                    Yaml::Number(n) => n.to_string(),
                    Yaml::Bool(b) => b.to_string(),
                    other => return Err(format!("unsupported map key: {other:?}")),
                };
                object.insert(key, yaml_to_json(value)?);
            }
            Value::Object(object)
        }
        Yaml::Tagged(tagged) => yaml_to_json(tagged.value)?,
    })
}

/// Outcome of validating one document.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    valid: bool,
    diagnostics: Vec<Diagnostic>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl ValidationResult {
    fn new(diagnostics: Vec<Diagnostic>, data: Option<Value>) -> Self {
        Self {
            valid: diagnostics.is_empty(),
            diagnostics,
            data,
        }
    }

    /// True iff no diagnostic was produced.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Diagnostics in discovery order.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// The parsed document; `None` when the payload did not parse.
    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, diagnostic) in self.diagnostics.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{diagnostic}")?;
        }
        Ok(())
    }
}

/// Validate a JSON payload against `schema` with the default configuration
/// (unique `cases[*].id`).
pub fn run_validation(raw: &str, schema: &Schema) -> ValidationResult {
    run_with(raw, PayloadFormat::Json, schema, &ValidatorConfig::default())
}

/// Validate a payload of the given format against `schema` under `config`.
pub fn run_with(
    raw: &str,
    format: PayloadFormat,
    schema: &Schema,
    config: &ValidatorConfig,
) -> ValidationResult {
    match format.parse(raw) {
        Ok(document) => validate_document(document, schema, config),
        Err(detail) => {
            tracing::debug!(%format, %detail, "payload did not parse");
            ValidationResult::new(
                vec![Diagnostic::new(
                    "",
                    Violation::Parse {
                        format: format.name().to_string(),
                        detail,
                    },
                )],
                None,
            )
        }
    }
}

/// Validate an already-parsed document against `schema` under `config`.
pub fn validate_document(document: Value, schema: &Schema, config: &ValidatorConfig) -> ValidationResult {
    let mut diagnostics = schema.validate(&document);
    uniqueness::check_all(&document, &config.uniqueness, &mut diagnostics);
    tracing::debug!(diagnostics = diagnostics.len(), "validated document");
    ValidationResult::new(diagnostics, Some(document))
}

/// A compiled schema bundled with its configuration.
///
/// `Validator` is `Send + Sync`; one instance can serve many documents,
/// concurrently or not.
#[derive(Debug, Clone)]
pub struct Validator {
    schema: Schema,
    config: ValidatorConfig,
}

impl Validator {
    /// Bundle a compiled schema with a configuration.
    pub fn new(schema: Schema, config: ValidatorConfig) -> Self {
        Self { schema, config }
    }

    /// Bundle a compiled schema with the default configuration.
    pub fn with_defaults(schema: Schema) -> Self {
        Self::new(schema, ValidatorConfig::default())
    }

    /// The compiled schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The active configuration.
    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Validate raw payload text.
    pub fn run(&self, raw: &str, format: PayloadFormat) -> ValidationResult {
        run_with(raw, format, &self.schema, &self.config)
    }

    /// Validate an already-parsed document.
    pub fn run_value(&self, document: Value) -> ValidationResult {
        validate_document(document, &self.schema, &self.config)
    }

    /// Read a document file and validate it, inferring the format from the
    /// extension. A file that reads but does not parse is an invalid
    /// result, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::DocumentLoad`] if the file cannot be read.
    pub fn validate_file(&self, path: &Path) -> Result<ValidationResult, SchemaError> {
        self.validate_file_as(path, PayloadFormat::from_path(path))
    }

    /// Read a document file and validate it as `format`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::DocumentLoad`] if the file cannot be read.
    pub fn validate_file_as(
        &self,
        path: &Path,
        format: PayloadFormat,
    ) -> Result<ValidationResult, SchemaError> {
        let raw = std::fs::read_to_string(path).map_err(|e| SchemaError::DocumentLoad {
            path: path.display().to_string(),
            reason: format!("cannot read file: {e}"),
        })?;
        tracing::debug!(document = %path.display(), %format, "validating document");
        Ok(self.run(&raw, format))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn case_schema() -> Schema {
        Schema::compile(json!({
            "type": "object",
            "required": ["cases"],
            "properties": {
                "cases": {"type": "array", "items": {"$ref": "#/definitions/caseEntry"}}
            },
            "definitions": {
                "caseEntry": {
                    "type": "object",
                    "required": ["id", "title"],
                    "properties": {
                        "id": {"type": "string"},
                        "title": {"type": "string", "minLength": 1}
                    }
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_valid_document() {
        let result = run_validation(
            r#"{"cases": [{"id": "c1", "title": "Pricing"}]}"#,
            &case_schema(),
        );
        assert!(result.is_valid());
        assert!(result.diagnostics().is_empty());
        assert_eq!(result.data().unwrap()["cases"][0]["id"], "c1");
    }

    #[test]
    fn test_malformed_payload() {
        let result = run_validation("{not json", &case_schema());
        assert!(!result.is_valid());
        assert_eq!(result.diagnostics().len(), 1);
        let diagnostic = &result.diagnostics()[0];
        assert_eq!(diagnostic.path(), "");
        assert!(diagnostic.message().starts_with("JSON parse error: "));
        assert!(result.data().is_none());
    }

    #[test]
    fn test_uniqueness_check_single_diagnostic() {
        let result = run_validation(
            r#"{"cases": [{"id": "a", "title": "x"}, {"id": "a", "title": "y"}, {"id": "a", "title": "z"}]}"#,
            &case_schema(),
        );
        assert!(!result.is_valid());
        assert_eq!(result.diagnostics().len(), 1);
        assert_eq!(
            result.diagnostics()[0].to_string(),
            "cases: Duplicate case IDs found"
        );
    }

    #[test]
    fn test_uniqueness_runs_after_structural_walk() {
        let result = run_validation(
            r#"{"cases": [{"id": "a"}, {"id": "a", "title": ""}]}"#,
            &case_schema(),
        );
        let rendered: Vec<String> = result.diagnostics().iter().map(|d| d.to_string()).collect();
        assert_eq!(
            rendered,
            vec![
                "cases[0].title: Required field missing",
                "cases[1].title: String must be at least 1 characters",
                "cases: Duplicate case IDs found",
            ]
        );
    }

    #[test]
    fn test_uniqueness_without_schema_rules() {
        let schema = Schema::compile(json!({})).unwrap();
        let result = run_validation(r#"{"cases": [{"id": "a"}, {"id": "a"}]}"#, &schema);
        assert_eq!(result.diagnostics().len(), 1);
        assert_eq!(result.diagnostics()[0].path(), "cases");
    }

    #[test]
    fn test_structural_only_config_skips_uniqueness() {
        let schema = Schema::compile(json!({})).unwrap();
        let result = run_with(
            r#"{"cases": [{"id": "a"}, {"id": "a"}]}"#,
            PayloadFormat::Json,
            &schema,
            &ValidatorConfig::structural_only(),
        );
        assert!(result.is_valid());
    }

    #[test]
    fn test_yaml_payload() {
        let validator = Validator::with_defaults(case_schema());
        let result = validator.run(
            "cases:\n  - id: c1\n    title: Pricing\n  - id: c2\n    title: 7\n",
            PayloadFormat::Yaml,
        );
        let rendered: Vec<String> = result.diagnostics().iter().map(|d| d.to_string()).collect();
        assert_eq!(rendered, vec!["cases[1].title: Expected string"]);
    }

    #[test]
    fn test_malformed_yaml_payload() {
        let validator = Validator::with_defaults(case_schema());
        let result = validator.run("cases: [unclosed", PayloadFormat::Yaml);
        assert_eq!(result.diagnostics().len(), 1);
        assert!(result.diagnostics()[0].message().starts_with("YAML parse error: "));
    }

    #[test]
    fn test_yaml_conversion_keys_and_scalars() {
        let value = PayloadFormat::Yaml
            .parse("1: one\ntrue: yes\nname: x\ncount: 42\nratio: 0.5\nempty: ~\n")
            .unwrap();
        assert_eq!(value["1"], "one");
        assert_eq!(value["true"], "yes");
        assert_eq!(value["count"], 42);
        assert_eq!(value["ratio"], 0.5);
        assert_eq!(value["empty"], Value::Null);
    }

    #[test]
    fn test_run_value() {
        let validator = Validator::with_defaults(case_schema());
        let result = validator.run_value(json!({"cases": "none"}));
        assert_eq!(result.diagnostics()[0].to_string(), "cases: Expected array");
    }

    #[test]
    fn test_result_display_lists_diagnostics() {
        let result = run_validation(r#"{"cases": [{}]}"#, &case_schema());
        assert_eq!(
            result.to_string(),
            "cases[0].id: Required field missing\ncases[0].title: Required field missing"
        );
    }

    #[test]
    fn test_result_serializes() {
        let result = run_validation(r#"{"cases": [{"id": "a"}]}"#, &case_schema());
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["valid"], false);
        assert_eq!(value["diagnostics"][0]["path"], "cases[0].title");
        assert_eq!(value["diagnostics"][0]["message"], "Required field missing");
        assert_eq!(value["data"]["cases"][0]["id"], "a");
    }

    #[test]
    fn test_format_from_path_and_str() {
        assert_eq!(PayloadFormat::from_path(Path::new("cases.yaml")), PayloadFormat::Yaml);
        assert_eq!(PayloadFormat::from_path(Path::new("cases.yml")), PayloadFormat::Yaml);
        assert_eq!(PayloadFormat::from_path(Path::new("cases.json")), PayloadFormat::Json);
        assert_eq!(PayloadFormat::from_path(Path::new("cases")), PayloadFormat::Json);
        assert_eq!("YAML".parse::<PayloadFormat>().unwrap(), PayloadFormat::Yaml);
        assert!("toml".parse::<PayloadFormat>().is_err());
    }

    #[test]
    fn test_missing_document_file() {
        let validator = Validator::with_defaults(case_schema());
        let err = validator
            .validate_file(Path::new("/nonexistent/cases.json"))
            .unwrap_err();
        assert!(
            matches!(err, SchemaError::DocumentLoad { .. }),
            "Expected DocumentLoad, got: {err}"
        );
    }

    #[test]
    fn test_validator_shared_across_threads() {
        let validator = std::sync::Arc::new(Validator::with_defaults(case_schema()));
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let validator = std::sync::Arc::clone(&validator);
                std::thread::spawn(move || {
                    let raw = format!(r#"{{"cases": [{{"id": "c{i}", "title": "t"}}]}}"#);
                    validator.run(&raw, PayloadFormat::Json).is_valid()
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }
}
