//! Modlint Core -- the validation model for game mod data files.
//!
//! This crate provides the record model, file keys, diagnostics, the
//! cross-file reference extractor, the fixed rule catalogue, and the
//! per-file implicit validator that every Modlint component depends on.
//!
//! # Pipeline Position
//!
//! A data file is parsed (by `modlint-data`) into a list of [`record::Record`]s
//! tagged with a [`key::FileKey`]. The [`reference::ReferenceExtractor`] scans
//! record attributes for references to other files; the resolved sets feed
//! the dependency graph (`modlint-graph`), while the
//! [`validator`] runs the [`rules::RuleCatalogue`] over each file and emits
//! [`diagnostic::Diagnostic`]s, aggregated into the result types in
//! [`report`].
//!
//! # Key Types
//!
//! - [`key::FileKey`] -- normalized lowercase file identifier, the unit of
//!   dependency-graph nodes.
//! - [`record::Record`] -- one parsed entity instance with a closed
//!   [`record::RecordKind`] and an untyped attribute map.
//! - [`rules::RuleCatalogue`] -- immutable table of validation rules,
//!   explicitly constructed and injected (never a global).
//! - [`report::ModuleValidationResult`] -- the aggregate report returned to
//!   callers.

pub mod diagnostic;
pub mod key;
pub mod record;
pub mod reference;
pub mod report;
pub mod rules;
pub mod validator;

pub use diagnostic::{Diagnostic, Severity};
pub use key::FileKey;
pub use record::{Record, RecordKind};
pub use reference::{MissingReference, RecordReferences, ReferenceExtractor};
pub use report::{
    FileValidationResult, FixCategory, FixPriority, FixSuggestion, LoadOrderEntry,
    ModuleValidationResult,
};
pub use rules::RuleCatalogue;
pub use validator::{validate_file, validate_records};
