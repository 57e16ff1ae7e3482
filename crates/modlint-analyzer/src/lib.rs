//! Modlint Analyzer -- the validation orchestrator.
//!
//! Points at a module directory, this crate runs the full pipeline:
//!
//! 1. Enumerate data files (`modlint-data`). A file that fails to parse
//!    gets a single file-level error diagnostic and is excluded from
//!    graph building, but still counts toward the file total.
//! 2. Build the dependency graph once over all parsed files
//!    (`modlint-graph`) and extract cycles and the load order.
//! 3. Run per-file implicit validation (`modlint-core`) across worker
//!    threads -- the phase has no shared mutable state.
//! 4. Merge optional external schema diagnostics.
//! 5. Assemble a [`ModuleValidationResult`] with derived fix suggestions.
//!
//! Nothing in normal operation is fatal: the orchestrator always returns
//! a result, even for a directory of unparsable files. Only invalid
//! arguments (nonexistent paths) are signaled as errors.

use modlint_core::diagnostic::Diagnostic;
use modlint_core::key::FileKey;
use modlint_core::reference::ReferenceExtractor;
use modlint_core::report::{
    FileValidationResult, FixCategory, FixPriority, FixSuggestion, LoadOrderEntry,
    ModuleValidationResult,
};
use modlint_core::rules::{self, RuleCatalogue};
use modlint_core::validator::validate_records;
use modlint_data::loader::{self, DataLoadError, ParsedFile};
use modlint_graph::{DependencyGraph, FileDependencies};
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::debug;

// ---------------------------------------------------------------------------
// Structural diagnostic rule names
// ---------------------------------------------------------------------------

/// A file could not be parsed into records.
pub const FILE_PARSE_VALID: &str = "File_Parse_Valid";

/// Two physical files normalized to the same file key.
pub const FILE_KEY_UNIQUE: &str = "File_Key_Unique";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Caller contract violations. Everything else is reported as
/// diagnostics inside an always-returned result.
#[derive(Debug, thiserror::Error)]
pub enum AnalyzeError {
    #[error("path does not exist: {0}")]
    NotFound(PathBuf),

    #[error("path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("path is not a file: {0}")]
    NotAFile(PathBuf),

    /// I/O failure while enumerating the directory.
    #[error(transparent)]
    Load(#[from] DataLoadError),
}

// ---------------------------------------------------------------------------
// External schema validation seam
// ---------------------------------------------------------------------------

/// Optional external schema check, merged alongside the implicit rules.
pub trait SchemaValidator: Send + Sync {
    fn validate(&self, path: &Path) -> Vec<Diagnostic>;
}

// ---------------------------------------------------------------------------
// Scan outcome (internal)
// ---------------------------------------------------------------------------

/// The result of enumerating and parsing one directory.
struct ScanOutcome {
    /// Discovered files, parse failures and key conflicts included.
    total_files: usize,
    /// Keys of every discovered file -- references to an unparsable
    /// file's key still resolve, because the file exists.
    known_keys: BTreeSet<FileKey>,
    parsed: Vec<ParsedFile>,
    /// File-level structural failures, one result per file.
    failures: Vec<FileValidationResult>,
}

// ---------------------------------------------------------------------------
// ModuleAnalyzer
// ---------------------------------------------------------------------------

/// The validation orchestrator. Holds the injected rule catalogue and an
/// optional external schema validator; stateless across calls -- records
/// and the graph are rebuilt per invocation.
pub struct ModuleAnalyzer {
    catalogue: RuleCatalogue,
    schema_validator: Option<Box<dyn SchemaValidator>>,
}

impl ModuleAnalyzer {
    /// Build an analyzer with an explicit rule catalogue.
    pub fn new(catalogue: RuleCatalogue) -> Self {
        ModuleAnalyzer {
            catalogue,
            schema_validator: None,
        }
    }

    /// Build an analyzer with the standard fixed catalogue.
    pub fn standard() -> Self {
        Self::new(RuleCatalogue::standard())
    }

    /// Attach an external schema validator.
    pub fn with_schema_validator(mut self, validator: Box<dyn SchemaValidator>) -> Self {
        self.schema_validator = Some(validator);
        self
    }

    // -- Public API --

    /// Validate every data file in a module directory and return the
    /// merged report. An empty directory is a valid, zero-diagnostic
    /// result.
    pub fn validate_module(&self, dir: &Path) -> Result<ModuleValidationResult, AnalyzeError> {
        let scan = self.scan_directory(dir)?;
        debug!(
            path = %dir.display(),
            files = scan.total_files,
            parsed = scan.parsed.len(),
            "validating module directory"
        );

        let extractor = ReferenceExtractor::new(scan.known_keys.iter().cloned());
        let graph = build_graph(&scan.parsed, &extractor);
        let analysis = graph.analyze();

        // Per-file validation: embarrassingly parallel, joined before
        // report assembly.
        let mut files: Vec<FileValidationResult> = scan
            .parsed
            .par_iter()
            .map(|file| self.validate_parsed(file, &extractor))
            .collect();
        files.extend(scan.failures);
        files.sort_by(|a, b| a.file_name.cmp(&b.file_name));

        let fix_suggestions = derive_fix_suggestions(&analysis.cycles, &files);
        let result = ModuleValidationResult::new(
            files,
            scan.total_files,
            analysis.cycles,
            analysis.load_order,
            fix_suggestions,
        );

        debug!(
            errors = result.total_errors,
            warnings = result.total_warnings,
            cycles = result.circular_dependencies.len(),
            "module validation finished"
        );
        Ok(result)
    }

    /// Validate a single data file. Sibling file names in the same
    /// directory supply the known-key set for reference checks; the
    /// siblings themselves are never parsed.
    pub fn validate_single_file(&self, path: &Path) -> Result<FileValidationResult, AnalyzeError> {
        if !path.exists() {
            return Err(AnalyzeError::NotFound(path.to_path_buf()));
        }
        if !path.is_file() {
            return Err(AnalyzeError::NotAFile(path.to_path_buf()));
        }

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();

        let mut known: BTreeSet<FileKey> = match path.parent() {
            Some(parent) if parent.as_os_str().is_empty() => BTreeSet::new(),
            Some(parent) => loader::list_data_files(parent)?
                .iter()
                .map(|p| loader::normalize_file_key(p))
                .collect(),
            None => BTreeSet::new(),
        };
        known.insert(loader::normalize_file_key(path));
        let extractor = ReferenceExtractor::new(known);

        match loader::parse_data_file(path) {
            Ok(parsed) => Ok(self.validate_parsed(&parsed, &extractor)),
            Err(err) => Ok(FileValidationResult::new(
                &file_name,
                vec![unparsable_diagnostic(&file_name, &err)],
            )),
        }
    }

    /// The recommended load order for a module directory.
    pub fn recommended_load_order(&self, dir: &Path) -> Result<Vec<LoadOrderEntry>, AnalyzeError> {
        let scan = self.scan_directory(dir)?;
        let extractor = ReferenceExtractor::new(scan.known_keys.iter().cloned());
        let graph = build_graph(&scan.parsed, &extractor);
        Ok(graph.analyze().load_order)
    }

    /// The raw forward adjacency of the dependency graph.
    pub fn dependency_graph(
        &self,
        dir: &Path,
    ) -> Result<BTreeMap<FileKey, Vec<FileKey>>, AnalyzeError> {
        let scan = self.scan_directory(dir)?;
        let extractor = ReferenceExtractor::new(scan.known_keys.iter().cloned());
        let graph = build_graph(&scan.parsed, &extractor);
        Ok(graph.adjacency_map())
    }

    // -- Internal phases --

    /// Enumerate and parse a directory. Parse failures and key conflicts
    /// become file-level failure results; the run continues.
    fn scan_directory(&self, dir: &Path) -> Result<ScanOutcome, AnalyzeError> {
        if !dir.exists() {
            return Err(AnalyzeError::NotFound(dir.to_path_buf()));
        }
        if !dir.is_dir() {
            return Err(AnalyzeError::NotADirectory(dir.to_path_buf()));
        }

        let paths = loader::list_data_files(dir)?;
        let total_files = paths.len();

        let mut known_keys = BTreeSet::new();
        let mut claimed: BTreeMap<FileKey, String> = BTreeMap::new();
        let mut parsed = Vec::new();
        let mut failures = Vec::new();

        for path in &paths {
            let file_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
                .to_string();
            let key = loader::normalize_file_key(path);
            known_keys.insert(key.clone());

            if let Some(existing) = claimed.get(&key) {
                debug!(file = %file_name, key = %key, "file key conflict");
                failures.push(FileValidationResult::new(
                    &file_name,
                    vec![Diagnostic::error(
                        FILE_KEY_UNIQUE,
                        &file_name,
                        format!("normalizes to key '{key}', already claimed by '{existing}'"),
                    )],
                ));
                continue;
            }
            claimed.insert(key, file_name.clone());

            match loader::parse_data_file(path) {
                Ok(file) => parsed.push(file),
                Err(err) => {
                    debug!(file = %file_name, "data file failed to parse");
                    failures.push(FileValidationResult::new(
                        &file_name,
                        vec![unparsable_diagnostic(&file_name, &err)],
                    ));
                }
            }
        }

        Ok(ScanOutcome {
            total_files,
            known_keys,
            parsed,
            failures,
        })
    }

    /// Run implicit validation, load-hint checks, and the optional
    /// schema validator over one parsed file.
    fn validate_parsed(
        &self,
        file: &ParsedFile,
        extractor: &ReferenceExtractor,
    ) -> FileValidationResult {
        let mut diagnostics =
            validate_records(&file.file_name, &file.records, extractor, &self.catalogue);

        if self.catalogue.checks_references() {
            for hint in &file.load_hints {
                if extractor.resolve_candidate(hint).is_none() {
                    diagnostics.push(Diagnostic::error(
                        rules::REFERENCE_INTEGRITY_VALID,
                        &file.file_name,
                        format!("depends_on references '{hint}', but no such file exists"),
                    ));
                }
            }
        }

        if let Some(validator) = &self.schema_validator {
            diagnostics.extend(validator.validate(&file.path));
        }

        FileValidationResult::new(&file.file_name, diagnostics)
    }
}

impl Default for ModuleAnalyzer {
    fn default() -> Self {
        Self::standard()
    }
}

// ---------------------------------------------------------------------------
// Free helpers
// ---------------------------------------------------------------------------

/// Union each parsed file's record references into graph input. Load
/// hints are normalized through the extractor's alias handling; unknown
/// hints are skipped here (they are diagnosed during validation).
fn build_graph(parsed: &[ParsedFile], extractor: &ReferenceExtractor) -> DependencyGraph {
    let files: Vec<FileDependencies> = parsed
        .iter()
        .map(|file| {
            let mut deps = FileDependencies::new(file.key.clone());
            for record in &file.records {
                deps.content.extend(extractor.extract(record).resolved);
            }
            deps.load_hints.extend(
                file.load_hints
                    .iter()
                    .filter_map(|hint| extractor.resolve_candidate(hint)),
            );
            deps
        })
        .collect();
    DependencyGraph::build(&files)
}

fn unparsable_diagnostic(file_name: &str, err: &DataLoadError) -> Diagnostic {
    Diagnostic::error(
        FILE_PARSE_VALID,
        file_name,
        format!("file is unparsable: {err}"),
    )
}

/// One suggestion per cycle group, plus one per missing-reference and
/// duplicate-id diagnostic.
fn derive_fix_suggestions(
    cycles: &[Vec<FileKey>],
    files: &[FileValidationResult],
) -> Vec<FixSuggestion> {
    let mut suggestions = Vec::new();

    for group in cycles {
        let names: Vec<&str> = group.iter().map(|k| k.as_str()).collect();
        suggestions.push(FixSuggestion {
            priority: FixPriority::High,
            category: FixCategory::CircularDependency,
            message: format!(
                "Files {} reference each other in a cycle; break one of the references so a load order exists",
                names.join(", ")
            ),
        });
    }

    for file in files {
        for diag in &file.diagnostics {
            if diag.rule_name == rules::REFERENCE_INTEGRITY_VALID {
                suggestions.push(FixSuggestion {
                    priority: FixPriority::Medium,
                    category: FixCategory::ReferenceIntegrity,
                    message: format!("{}: {}", diag.file_name, diag.message),
                });
            } else if diag.rule_name == rules::ID_UNIQUE_REQUIRED {
                suggestions.push(FixSuggestion {
                    priority: FixPriority::High,
                    category: FixCategory::DuplicateIdentifier,
                    message: format!("{}: {}", diag.file_name, diag.message),
                });
            }
        }
    }

    suggestions
}

// ===========================================================================
// Tests
// ===========================================================================
