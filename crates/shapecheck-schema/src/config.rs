//! # Validator Configuration
//!
//! Settings for the whole-document checks that a schema cannot express.
//! Loaded from YAML:
//!
//! ```yaml
//! uniqueness:
//!   - collection: cases
//!     id_field: id
//!     label: case
//! ```
//!
//! Every field has a default; an empty file yields [`ValidatorConfig::default`],
//! which checks `cases[*].id`. An explicit empty `uniqueness` list turns the
//! check off.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

/// Whole-document checks applied after the structural walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidatorConfig {
    /// Collections whose entries must carry pairwise distinct identifiers.
    pub uniqueness: Vec<UniquenessRule>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            uniqueness: vec![UniquenessRule::default()],
        }
    }
}

/// A top-level array whose entries must not share an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UniquenessRule {
    /// Top-level field holding the array of entries.
    pub collection: String,
    /// Field of each entry holding its identifier.
    pub id_field: String,
    /// Noun used in the message: `Duplicate <label> IDs found`.
    pub label: String,
}

impl Default for UniquenessRule {
    fn default() -> Self {
        Self {
            collection: "cases".to_string(),
            id_field: "id".to_string(),
            label: "case".to_string(),
        }
    }
}

impl ValidatorConfig {
    /// Configuration with no whole-document checks.
    pub fn structural_only() -> Self {
        Self {
            uniqueness: Vec::new(),
        }
    }

    /// Parse configuration from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Config`] on malformed YAML or unknown fields.
    pub fn from_yaml_str(text: &str) -> Result<Self, SchemaError> {
        parse_yaml(text, "<inline>")
    }

    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Config`] if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| SchemaError::Config {
            path: path.display().to_string(),
            reason: format!("cannot read file: {e}"),
        })?;
        let config = parse_yaml(&content, &path.display().to_string())?;
        tracing::debug!(
            config = %path.display(),
            rules = config.uniqueness.len(),
            "loaded validator config"
        );
        Ok(config)
    }
}

fn parse_yaml(text: &str, origin: &str) -> Result<ValidatorConfig, SchemaError> {
    // serde_yaml rejects an empty document; treat it as "all defaults".
    if text.trim().is_empty() {
        return Ok(ValidatorConfig::default());
    }
    serde_yaml::from_str(text).map_err(|e| SchemaError::Config {
        path: origin.to_string(),
        reason: format!("invalid YAML: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_checks_case_ids() {
        let config = ValidatorConfig::default();
        assert_eq!(config.uniqueness.len(), 1);
        assert_eq!(config.uniqueness[0].collection, "cases");
        assert_eq!(config.uniqueness[0].id_field, "id");
        assert_eq!(config.uniqueness[0].label, "case");
    }

    #[test]
    fn test_empty_text_is_default() {
        assert_eq!(
            ValidatorConfig::from_yaml_str("  \n").unwrap(),
            ValidatorConfig::default()
        );
    }

    #[test]
    fn test_parse_custom_rules() {
        let config = ValidatorConfig::from_yaml_str(
            r#"
uniqueness:
  - collection: scenarios
    id_field: key
    label: scenario
  - collection: cases
"#,
        )
        .unwrap();
        assert_eq!(config.uniqueness.len(), 2);
        assert_eq!(config.uniqueness[0].id_field, "key");
        assert_eq!(config.uniqueness[1].id_field, "id");
        assert_eq!(config.uniqueness[1].label, "case");
    }

    #[test]
    fn test_explicit_empty_list_disables_checks() {
        let config = ValidatorConfig::from_yaml_str("uniqueness: []").unwrap();
        assert_eq!(config, ValidatorConfig::structural_only());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = ValidatorConfig::from_yaml_str("uniqness: []").unwrap_err();
        assert!(
            matches!(err, SchemaError::Config { .. }),
            "Expected Config error, got: {err}"
        );
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = ValidatorConfig::from_file("/nonexistent/shapecheck.yaml").unwrap_err();
        assert!(matches!(err, SchemaError::Config { .. }));
    }
}
