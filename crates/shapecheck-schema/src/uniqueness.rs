//! # Identifier Uniqueness
//!
//! The one whole-document invariant a per-node schema cannot express: the
//! entries of a top-level collection must have pairwise distinct identifiers.
//! Any number of duplicates produces a single diagnostic at the collection.

use std::collections::HashSet;

use serde_json::Value;
use shapecheck_core::{Diagnostic, Violation};

use crate::config::UniquenessRule;

/// Check one rule against a parsed document.
///
/// Documents without the collection, or whose collection is not an array,
/// pass. Identifiers are compared by their JSON text, so `"1"` and `1` are
/// distinct. An entry without the identifier field (or one that is not an
/// object) has the absent identifier, and two such entries collide.
pub fn check_unique_ids(document: &Value, rule: &UniquenessRule) -> Option<Diagnostic> {
    let entries = document.get(&rule.collection)?.as_array()?;

    let mut seen: HashSet<Option<String>> = HashSet::new();
    let duplicated = entries
        .iter()
        .map(|entry| entry.get(&rule.id_field).map(Value::to_string))
        .any(|id| !seen.insert(id));

    duplicated.then(|| {
        Diagnostic::new(
            rule.collection.clone(),
            Violation::DuplicateIds {
                label: rule.label.clone(),
            },
        )
    })
}

/// Check every rule in order, appending one diagnostic per failing rule.
pub fn check_all(document: &Value, rules: &[UniquenessRule], out: &mut Vec<Diagnostic>) {
    out.extend(rules.iter().filter_map(|rule| check_unique_ids(document, rule)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_duplicate_case_ids() {
        let doc = json!({"cases": [{"id": "a"}, {"id": "a"}]});
        let diagnostic = check_unique_ids(&doc, &UniquenessRule::default()).unwrap();
        assert_eq!(diagnostic.path(), "cases");
        assert_eq!(diagnostic.message(), "Duplicate case IDs found");
    }

    #[test]
    fn test_many_duplicates_single_diagnostic() {
        let doc = json!({"cases": [
            {"id": "a"}, {"id": "a"}, {"id": "b"}, {"id": "b"}, {"id": "a"}
        ]});
        let mut out = Vec::new();
        check_all(&doc, &[UniquenessRule::default()], &mut out);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_distinct_ids_pass() {
        let doc = json!({"cases": [{"id": "a"}, {"id": "b"}, {"id": "c"}]});
        assert!(check_unique_ids(&doc, &UniquenessRule::default()).is_none());
    }

    #[test]
    fn test_missing_or_malformed_collection_passes() {
        let rule = UniquenessRule::default();
        assert!(check_unique_ids(&json!({}), &rule).is_none());
        assert!(check_unique_ids(&json!({"cases": {"id": "a"}}), &rule).is_none());
        assert!(check_unique_ids(&json!([{"id": "a"}, {"id": "a"}]), &rule).is_none());
        assert!(check_unique_ids(&json!(null), &rule).is_none());
    }

    #[test]
    fn test_entries_without_id_collide() {
        let doc = json!({"cases": [{"title": "x"}, {"title": "y"}]});
        let diagnostic = check_unique_ids(&doc, &UniquenessRule::default()).unwrap();
        assert_eq!(diagnostic.to_string(), "cases: Duplicate case IDs found");

        let doc = json!({"cases": [{"title": "x"}, "loose", {"id": "a"}]});
        assert!(check_unique_ids(&doc, &UniquenessRule::default()).is_some());
    }

    #[test]
    fn test_single_entry_without_id_passes() {
        let doc = json!({"cases": [{"title": "x"}, {"id": "a"}, {"id": null}]});
        assert!(check_unique_ids(&doc, &UniquenessRule::default()).is_none());
    }

    #[test]
    fn test_ids_compared_by_type_and_value() {
        let doc = json!({"cases": [{"id": "1"}, {"id": 1}]});
        assert!(check_unique_ids(&doc, &UniquenessRule::default()).is_none());
        let doc = json!({"cases": [{"id": 1}, {"id": 1}]});
        assert!(check_unique_ids(&doc, &UniquenessRule::default()).is_some());
    }

    #[test]
    fn test_custom_rule_label() {
        let rule = UniquenessRule {
            collection: "scenarios".into(),
            id_field: "key".into(),
            label: "scenario".into(),
        };
        let doc = json!({"scenarios": [{"key": 7}, {"key": 7}]});
        let diagnostic = check_unique_ids(&doc, &rule).unwrap();
        assert_eq!(diagnostic.to_string(), "scenarios: Duplicate scenario IDs found");
    }
}
