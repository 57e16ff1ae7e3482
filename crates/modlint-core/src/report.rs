//! Aggregate result types returned to callers.
//!
//! All types here are immutable value objects assembled once per analysis
//! run; serde derives let callers serialize reports in whatever format
//! they need.

use crate::diagnostic::{Diagnostic, Severity};
use crate::key::FileKey;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Per-file result
// ---------------------------------------------------------------------------

/// Validation outcome for one data file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileValidationResult {
    pub file_name: String,
    /// Diagnostics in a stable order: per-record rules in record order,
    /// then file-level findings.
    pub diagnostics: Vec<Diagnostic>,
    pub error_count: usize,
    pub warning_count: usize,
}

impl FileValidationResult {
    /// Build a result, deriving the severity counts.
    pub fn new(file_name: impl Into<String>, diagnostics: Vec<Diagnostic>) -> Self {
        let error_count = diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count();
        let warning_count = diagnostics.len() - error_count;
        FileValidationResult {
            file_name: file_name.into(),
            diagnostics,
            error_count,
            warning_count,
        }
    }

    /// Whether the file produced no error diagnostics.
    pub fn is_valid(&self) -> bool {
        self.error_count == 0
    }
}

// ---------------------------------------------------------------------------
// Load order
// ---------------------------------------------------------------------------

/// One position in the recommended load order. Files caught in a circular
/// dependency are appended at the end with `in_cycle` set; their relative
/// order is alphabetical, not topological.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadOrderEntry {
    pub key: FileKey,
    pub in_cycle: bool,
}

impl LoadOrderEntry {
    pub fn ordered(key: FileKey) -> Self {
        LoadOrderEntry {
            key,
            in_cycle: false,
        }
    }

    pub fn unordered(key: FileKey) -> Self {
        LoadOrderEntry { key, in_cycle: true }
    }
}

// ---------------------------------------------------------------------------
// Fix suggestions
// ---------------------------------------------------------------------------

/// How urgently a suggestion should be acted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FixPriority {
    High,
    Medium,
}

/// What class of problem a suggestion addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FixCategory {
    CircularDependency,
    ReferenceIntegrity,
    DuplicateIdentifier,
}

impl fmt::Display for FixCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FixCategory::CircularDependency => f.write_str("Circular Dependency"),
            FixCategory::ReferenceIntegrity => f.write_str("Reference Integrity"),
            FixCategory::DuplicateIdentifier => f.write_str("Duplicate Identifier"),
        }
    }
}

/// A human-readable remediation hint derived from the diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixSuggestion {
    pub priority: FixPriority,
    pub category: FixCategory,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Module-level result
// ---------------------------------------------------------------------------

/// The full report for one module directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleValidationResult {
    /// Per-file results, sorted by file name.
    pub files: Vec<FileValidationResult>,
    /// Number of discovered files, parse failures included.
    pub total_files: usize,
    pub total_errors: usize,
    pub total_warnings: usize,
    /// Each group lists the files of one circular-dependency cycle.
    pub circular_dependencies: Vec<Vec<FileKey>>,
    pub load_order: Vec<LoadOrderEntry>,
    pub fix_suggestions: Vec<FixSuggestion>,
    /// True when there are no errors and no unresolved cycles.
    pub is_valid: bool,
}

impl ModuleValidationResult {
    /// Assemble a module report from its parts, deriving the totals and
    /// the validity flag.
    pub fn new(
        files: Vec<FileValidationResult>,
        total_files: usize,
        circular_dependencies: Vec<Vec<FileKey>>,
        load_order: Vec<LoadOrderEntry>,
        fix_suggestions: Vec<FixSuggestion>,
    ) -> Self {
        let total_errors = files.iter().map(|f| f.error_count).sum();
        let total_warnings = files.iter().map(|f| f.warning_count).sum();
        let is_valid = total_errors == 0 && circular_dependencies.is_empty();
        ModuleValidationResult {
            files,
            total_files,
            total_errors,
            total_warnings,
            circular_dependencies,
            load_order,
            fix_suggestions,
            is_valid,
        }
    }

    /// An empty directory is a valid, zero-diagnostic result.
    pub fn empty() -> Self {
        ModuleValidationResult::new(Vec::new(), 0, Vec::new(), Vec::new(), Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_result_counts_severities() {
        let diags = vec![
            Diagnostic::error("Item_Value_Valid", "items.json", "negative value"),
            Diagnostic::warning("Item_Weight_Valid", "items.json", "weight out of range"),
            Diagnostic::warning("ID_Format_Valid", "items.json", "bad id"),
        ];
        let result = FileValidationResult::new("items.json", diags);
        assert_eq!(result.error_count, 1);
        assert_eq!(result.warning_count, 2);
        assert!(!result.is_valid());
    }

    #[test]
    fn empty_module_is_valid() {
        let result = ModuleValidationResult::empty();
        assert_eq!(result.total_files, 0);
        assert_eq!(result.total_errors, 0);
        assert!(result.is_valid);
    }

    #[test]
    fn cycles_invalidate_even_without_errors() {
        let result = ModuleValidationResult::new(
            Vec::new(),
            2,
            vec![vec![FileKey::new("a"), FileKey::new("b")]],
            Vec::new(),
            Vec::new(),
        );
        assert_eq!(result.total_errors, 0);
        assert!(!result.is_valid);
    }

    #[test]
    fn totals_sum_across_files() {
        let a = FileValidationResult::new(
            "a.json",
            vec![Diagnostic::error("r", "a.json", "m")],
        );
        let b = FileValidationResult::new(
            "b.json",
            vec![
                Diagnostic::error("r", "b.json", "m"),
                Diagnostic::warning("r", "b.json", "m"),
            ],
        );
        let result = ModuleValidationResult::new(vec![a, b], 2, Vec::new(), Vec::new(), Vec::new());
        assert_eq!(result.total_errors, 2);
        assert_eq!(result.total_warnings, 1);
        assert!(!result.is_valid);
    }

    #[test]
    fn fix_category_display() {
        assert_eq!(
            FixCategory::CircularDependency.to_string(),
            "Circular Dependency"
        );
        assert_eq!(
            FixCategory::ReferenceIntegrity.to_string(),
            "Reference Integrity"
        );
        assert_eq!(
            FixCategory::DuplicateIdentifier.to_string(),
            "Duplicate Identifier"
        );
    }

    #[test]
    fn report_serializes() {
        let result = ModuleValidationResult::new(
            vec![FileValidationResult::new("items.json", Vec::new())],
            1,
            Vec::new(),
            vec![LoadOrderEntry::ordered(FileKey::new("items"))],
            Vec::new(),
        );
        let json = serde_json::to_string(&result).unwrap();
        let restored: ModuleValidationResult = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, result);
    }
}
