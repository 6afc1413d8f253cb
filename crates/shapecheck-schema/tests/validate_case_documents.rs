//! Integration test: validate the fixture case collections under `fixtures/cases/`
//! against `schemas/case-collection.schema.json`.
//!
//! The invalid fixture packs one defect of each kind into a single document, so
//! the expected diagnostic list doubles as a check of discovery order.

use std::path::{Path, PathBuf};

use shapecheck_schema::{
    PayloadFormat, Schema, SchemaError, ValidatorConfig, Validator, Violation,
};

/// Find the repository root.
fn repo_root() -> PathBuf {
    let mut dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    dir.pop(); // crates/
    dir.pop(); // repo root
    dir
}

fn case_schema() -> Schema {
    Schema::from_file(repo_root().join("schemas/case-collection.schema.json"))
        .expect("Failed to load case collection schema")
}

fn fixture(name: &str) -> PathBuf {
    repo_root().join("fixtures/cases").join(name)
}

fn rendered(validator: &Validator, path: &Path) -> Vec<String> {
    validator
        .validate_file(path)
        .expect("fixture should be readable")
        .diagnostics()
        .iter()
        .map(|d| d.to_string())
        .collect()
}

#[test]
fn test_valid_json_collection() {
    let validator = Validator::with_defaults(case_schema());
    let result = validator.validate_file(&fixture("valid.json")).unwrap();
    assert!(result.is_valid(), "unexpected diagnostics:\n{result}");
    let cases = result.data().unwrap()["cases"].as_array().unwrap();
    assert_eq!(cases.len(), 2);
}

#[test]
fn test_valid_yaml_collection() {
    let validator = Validator::with_defaults(case_schema());
    let result = validator.validate_file(&fixture("valid.yaml")).unwrap();
    assert!(result.is_valid(), "unexpected diagnostics:\n{result}");
}

#[test]
fn test_invalid_collection_reports_everything_in_order() {
    let validator = Validator::with_defaults(case_schema());
    let diagnostics = rendered(&validator, &fixture("invalid.json"));
    assert_eq!(
        diagnostics,
        vec![
            "version: Value must be exactly: 1.0",
            "cases[0].difficulty: Value must be one of: Easy, Medium, Hard",
            "cases[0].scenario: String must be at least 20 characters",
            "cases[0].timeLimitMinutes: Value must be at most 90",
            "cases[0].tts.languageCode: Value must be one of: de-DE, en-US",
            "cases[0].tts.voice: Additional property not allowed",
            "cases[0].clarifying.questions[0].answer: String must be at least 1 characters",
            "cases[0].solution.tree[0].children[0].label: Required field missing",
            "cases[1].clarifying.questions: Array must have at least 1 items",
            "notes: Additional property not allowed",
            "cases: Duplicate case IDs found",
        ]
    );
}

#[test]
fn test_invalid_collection_is_idempotent() {
    let validator = Validator::with_defaults(case_schema());
    let first = rendered(&validator, &fixture("invalid.json"));
    let second = rendered(&validator, &fixture("invalid.json"));
    assert_eq!(first, second);
}

#[test]
fn test_structural_only_config_drops_duplicate_check() {
    let validator = Validator::new(case_schema(), ValidatorConfig::structural_only());
    let result = validator.validate_file(&fixture("invalid.json")).unwrap();
    assert_eq!(result.diagnostics().len(), 10);
    assert!(!result
        .diagnostics()
        .iter()
        .any(|d| matches!(d.violation(), Violation::DuplicateIds { .. })));
}

#[test]
fn test_truncated_payload_short_circuits() {
    let validator = Validator::with_defaults(case_schema());
    let result = validator.validate_file(&fixture("truncated.json")).unwrap();
    assert!(!result.is_valid());
    assert_eq!(result.diagnostics().len(), 1);
    assert_eq!(result.diagnostics()[0].path(), "");
    assert!(result.diagnostics()[0]
        .message()
        .starts_with("JSON parse error: "));
    assert!(result.data().is_none());
}

#[test]
fn test_forced_format_overrides_extension() {
    let validator = Validator::with_defaults(case_schema());
    // JSON is a subset of YAML, so the JSON fixture also reads as YAML.
    let result = validator
        .validate_file_as(&fixture("valid.json"), PayloadFormat::Yaml)
        .unwrap();
    assert!(result.is_valid(), "unexpected diagnostics:\n{result}");
}

#[test]
fn test_schema_resolves_all_definitions() {
    let schema = case_schema();
    for name in ["caseEntry", "question", "treeNode"] {
        let reference = format!("#/definitions/{name}");
        let node = schema.resolve(&reference).unwrap();
        assert_eq!(node["type"], "object", "{reference} should be an object schema");
    }
}

#[test]
fn test_missing_schema_file() {
    let err = Schema::from_file(repo_root().join("schemas/missing.schema.json")).unwrap_err();
    assert!(
        matches!(err, SchemaError::SchemaLoad { .. }),
        "Expected SchemaLoad, got: {err}"
    );
}
