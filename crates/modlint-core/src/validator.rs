//! Per-file implicit validation.
//!
//! Runs every catalogue rule whose kind filter matches each record, the
//! cross-record rules once per file, and reference-integrity extraction
//! when the catalogue enables it. Pure over its inputs; files can be
//! validated concurrently without shared state.

use crate::diagnostic::Diagnostic;
use crate::record::Record;
use crate::reference::ReferenceExtractor;
use crate::report::FileValidationResult;
use crate::rules::{REFERENCE_INTEGRITY_VALID, RuleCatalogue};

/// Validate one file's records and return the raw diagnostics.
///
/// Diagnostic order is stable: for each record in file order, the
/// matching record rules in catalogue order, then that record's missing
/// references; file-level rules come last.
pub fn validate_records(
    file_name: &str,
    records: &[Record],
    extractor: &ReferenceExtractor,
    catalogue: &RuleCatalogue,
) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for record in records {
        for rule in catalogue.record_rules() {
            if !rule.applies_to.matches(record.kind) {
                continue;
            }
            if let Some(message) = (rule.check)(record) {
                let mut diag = Diagnostic {
                    rule_name: rule.name.to_string(),
                    severity: rule.severity,
                    message,
                    file_name: file_name.to_string(),
                    record_id: None,
                };
                if let Some(id) = record.id() {
                    diag = diag.with_record_id(id);
                }
                diagnostics.push(diag);
            }
        }

        if catalogue.checks_references() {
            for missing in extractor.extract(record).missing {
                let mut diag = Diagnostic::error(
                    REFERENCE_INTEGRITY_VALID,
                    file_name,
                    format!(
                        "attribute '{}' references '{}', but no file '{}' exists",
                        missing.attribute, missing.value, missing.target
                    ),
                );
                if let Some(id) = record.id() {
                    diag = diag.with_record_id(id);
                }
                diagnostics.push(diag);
            }
        }
    }

    for rule in catalogue.file_rules() {
        let matching: Vec<Record> = records
            .iter()
            .filter(|r| rule.applies_to.matches(r.kind))
            .cloned()
            .collect();
        for finding in (rule.check)(&matching) {
            diagnostics.push(Diagnostic {
                rule_name: rule.name.to_string(),
                severity: rule.severity,
                message: finding.message,
                file_name: file_name.to_string(),
                record_id: finding.record_id,
            });
        }
    }

    diagnostics
}

/// Validate one file's records into a finished [`FileValidationResult`].
pub fn validate_file(
    file_name: &str,
    records: &[Record],
    extractor: &ReferenceExtractor,
    catalogue: &RuleCatalogue,
) -> FileValidationResult {
    let diagnostics = validate_records(file_name, records, extractor, catalogue);
    FileValidationResult::new(file_name, diagnostics)
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::Severity;
    use crate::key::FileKey;
    use crate::rules;
    use std::collections::BTreeMap;

    fn record(file: &str, pairs: &[(&str, &str)]) -> Record {
        let attributes: BTreeMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Record::new(FileKey::new(file), attributes)
    }

    fn extractor(keys: &[&str]) -> ReferenceExtractor {
        ReferenceExtractor::new(keys.iter().map(|k| FileKey::new(*k)))
    }

    // -----------------------------------------------------------------------
    // Test 1: Duplicate id plus negative weight in one file
    // -----------------------------------------------------------------------
    #[test]
    fn duplicate_id_and_negative_weight() {
        let records = vec![
            record("items", &[("id", "dup"), ("weight", "-5"), ("value", "100")]),
            record("items", &[("id", "dup"), ("weight", "15"), ("value", "200")]),
        ];
        let result = validate_file(
            "items.json",
            &records,
            &extractor(&["items"]),
            &RuleCatalogue::standard(),
        );

        assert!(result.error_count >= 1, "duplicate id must be an error");
        assert!(result.warning_count >= 1, "negative weight must warn");
        assert!(
            result
                .diagnostics
                .iter()
                .any(|d| d.rule_name == rules::ID_UNIQUE_REQUIRED && d.severity == Severity::Error)
        );
        assert!(
            result
                .diagnostics
                .iter()
                .any(|d| d.rule_name == rules::ITEM_WEIGHT_VALID && d.severity == Severity::Warning)
        );
    }

    // -----------------------------------------------------------------------
    // Test 2: Duplicate id fires exactly once for one duplicated value
    // -----------------------------------------------------------------------
    #[test]
    fn duplicate_id_fires_once() {
        let records = vec![record("items", &[("id", "dup")]), record("items", &[("id", "dup")])];
        let result = validate_file(
            "items.json",
            &records,
            &extractor(&["items"]),
            &RuleCatalogue::standard(),
        );

        let dup_count = result
            .diagnostics
            .iter()
            .filter(|d| d.rule_name == rules::ID_UNIQUE_REQUIRED)
            .count();
        assert_eq!(dup_count, 1);
    }

    // -----------------------------------------------------------------------
    // Test 3: Kind dispatch -- item rules do not run on characters
    // -----------------------------------------------------------------------
    #[test]
    fn item_rules_skip_characters() {
        // A character with a negative `value` attribute: Item_Value_Valid
        // must not fire because the record kind is Character.
        let records = vec![record("characters", &[("id", "npc"), ("value", "-10")])];
        let result = validate_file(
            "characters.json",
            &records,
            &extractor(&["characters"]),
            &RuleCatalogue::standard(),
        );

        assert_eq!(result.error_count, 0);
        assert_eq!(result.warning_count, 0);
    }

    // -----------------------------------------------------------------------
    // Test 4: Missing references become Reference_Integrity_Valid errors
    // -----------------------------------------------------------------------
    #[test]
    fn missing_reference_is_error() {
        let records = vec![record(
            "characters",
            &[("id", "npc"), ("equipment", "weapons.sword")],
        )];
        let result = validate_file(
            "characters.json",
            &records,
            &extractor(&["characters"]),
            &RuleCatalogue::standard(),
        );

        assert_eq!(result.error_count, 1);
        let diag = &result.diagnostics[0];
        assert_eq!(diag.rule_name, rules::REFERENCE_INTEGRITY_VALID);
        assert_eq!(diag.record_id.as_deref(), Some("npc"));
        assert!(diag.message.contains("weapons"));
    }

    // -----------------------------------------------------------------------
    // Test 5: Reference checks can be disabled via the catalogue
    // -----------------------------------------------------------------------
    #[test]
    fn reference_checks_disabled() {
        let records = vec![record("characters", &[("equipment", "weapons.sword")])];
        let catalogue = RuleCatalogue::standard().reference_checks(false);
        let result = validate_file(
            "characters.json",
            &records,
            &extractor(&["characters"]),
            &catalogue,
        );

        assert_eq!(result.error_count, 0);
    }

    // -----------------------------------------------------------------------
    // Test 6: Clean records produce a clean result
    // -----------------------------------------------------------------------
    #[test]
    fn clean_file_is_valid() {
        let records = vec![
            record("items", &[("id", "iron_sword"), ("weight", "3.5"), ("value", "120")]),
            record("items", &[("id", "iron_shield"), ("weight", "7"), ("value", "80")]),
        ];
        let result = validate_file(
            "items.json",
            &records,
            &extractor(&["items"]),
            &RuleCatalogue::standard(),
        );

        assert!(result.is_valid());
        assert!(result.diagnostics.is_empty());
    }

    // -----------------------------------------------------------------------
    // Test 7: Diagnostic order is stable across runs
    // -----------------------------------------------------------------------
    #[test]
    fn diagnostic_order_is_stable() {
        let records = vec![
            record("items", &[("id", "bad id"), ("weight", "-5")]),
            record("items", &[("id", "bad id"), ("value", "-1")]),
        ];
        let ex = extractor(&["items"]);
        let catalogue = RuleCatalogue::standard();

        let a = validate_records("items.json", &records, &ex, &catalogue);
        let b = validate_records("items.json", &records, &ex, &catalogue);
        assert_eq!(a, b);
    }
}
