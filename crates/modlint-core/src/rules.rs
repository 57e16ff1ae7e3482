//! The fixed rule catalogue.
//!
//! Rules are pure functions over already-parsed records: no I/O, no
//! mutable state, safe to run concurrently across files. The catalogue is
//! an immutable table constructed explicitly and handed to the
//! orchestrator -- never a global -- so tests can inject reduced rule
//! sets.
//!
//! A malformed or absent attribute means "rule does not apply": rules
//! never raise, and partially authored records produce no false
//! positives.

use crate::diagnostic::Severity;
use crate::record::{Record, RecordKind};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Rule names
// ---------------------------------------------------------------------------

pub const ID_UNIQUE_REQUIRED: &str = "ID_Unique_Required";
pub const ID_FORMAT_VALID: &str = "ID_Format_Valid";
pub const ITEM_WEIGHT_VALID: &str = "Item_Weight_Valid";
pub const ITEM_VALUE_VALID: &str = "Item_Value_Valid";
pub const CHARACTER_LEVEL_VALID: &str = "Character_Level_Valid";
pub const CRAFTING_PIECE_DIFFICULTY_VALID: &str = "Crafting_Piece_Difficulty_Valid";
pub const REFERENCE_INTEGRITY_VALID: &str = "Reference_Integrity_Valid";

// ---------------------------------------------------------------------------
// Bounds (the target engine's known acceptance ranges)
// ---------------------------------------------------------------------------

pub const ITEM_WEIGHT_MAX: f64 = 1000.0;
pub const CHARACTER_LEVEL_MAX: f64 = 63.0;
pub const CRAFTING_DIFFICULTY_MAX: f64 = 300.0;

// ---------------------------------------------------------------------------
// Rule table entries
// ---------------------------------------------------------------------------

/// Which record kinds a rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindFilter {
    /// Applies to every record regardless of kind.
    Any,
    Kind(RecordKind),
}

impl KindFilter {
    pub fn matches(&self, kind: RecordKind) -> bool {
        match self {
            KindFilter::Any => true,
            KindFilter::Kind(k) => *k == kind,
        }
    }
}

/// A rule that inspects one record. Returns a message when violated.
#[derive(Debug, Clone, Copy)]
pub struct RecordRule {
    pub name: &'static str,
    pub applies_to: KindFilter,
    pub severity: Severity,
    pub check: fn(&Record) -> Option<String>,
}

/// One finding from a cross-record rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRuleFinding {
    pub record_id: Option<String>,
    pub message: String,
}

/// A rule that inspects all records of a file together (uniqueness).
#[derive(Debug, Clone, Copy)]
pub struct FileRule {
    pub name: &'static str,
    pub applies_to: KindFilter,
    pub severity: Severity,
    pub check: fn(&[Record]) -> Vec<FileRuleFinding>,
}

// ---------------------------------------------------------------------------
// Rule implementations
// ---------------------------------------------------------------------------

fn check_id_format(record: &Record) -> Option<String> {
    let id = record.id()?;
    if id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        None
    } else {
        Some(format!(
            "id '{id}' contains characters outside [A-Za-z0-9_]"
        ))
    }
}

fn check_item_weight(record: &Record) -> Option<String> {
    let weight = record.numeric_attr("weight")?;
    if !(0.0..=ITEM_WEIGHT_MAX).contains(&weight) {
        Some(format!(
            "weight {weight} is outside the accepted range 0..={ITEM_WEIGHT_MAX}"
        ))
    } else {
        None
    }
}

fn check_item_value(record: &Record) -> Option<String> {
    let value = record.numeric_attr("value")?;
    if value < 0.0 {
        Some(format!("value {value} is negative"))
    } else {
        None
    }
}

fn check_character_level(record: &Record) -> Option<String> {
    let level = record.numeric_attr("level")?;
    if level <= 0.0 || level > CHARACTER_LEVEL_MAX {
        Some(format!(
            "level {level} is outside the accepted range 1..={CHARACTER_LEVEL_MAX}"
        ))
    } else {
        None
    }
}

fn check_crafting_difficulty(record: &Record) -> Option<String> {
    let difficulty = record.numeric_attr("difficulty")?;
    if !(0.0..=CRAFTING_DIFFICULTY_MAX).contains(&difficulty) {
        Some(format!(
            "difficulty {difficulty} is outside the accepted range 0..={CRAFTING_DIFFICULTY_MAX}"
        ))
    } else {
        None
    }
}

/// One finding per duplicated id value, carrying the occurrence count.
/// Records without an id are skipped.
fn check_duplicate_ids(records: &[Record]) -> Vec<FileRuleFinding> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for record in records {
        if let Some(id) = record.id() {
            *counts.entry(id).or_insert(0) += 1;
        }
    }

    counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(id, count)| FileRuleFinding {
            record_id: Some(id.to_string()),
            message: format!("id '{id}' is defined {count} times in the same file"),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Catalogue
// ---------------------------------------------------------------------------

/// The immutable rule table passed into the orchestrator.
#[derive(Debug, Clone)]
pub struct RuleCatalogue {
    record_rules: Vec<RecordRule>,
    file_rules: Vec<FileRule>,
    check_references: bool,
}

impl RuleCatalogue {
    /// The full fixed catalogue mirroring the target engine's acceptance
    /// ranges.
    pub fn standard() -> Self {
        RuleCatalogue {
            record_rules: vec![
                RecordRule {
                    name: ID_FORMAT_VALID,
                    applies_to: KindFilter::Any,
                    severity: Severity::Warning,
                    check: check_id_format,
                },
                RecordRule {
                    name: ITEM_WEIGHT_VALID,
                    applies_to: KindFilter::Kind(RecordKind::Item),
                    severity: Severity::Warning,
                    check: check_item_weight,
                },
                RecordRule {
                    name: ITEM_VALUE_VALID,
                    applies_to: KindFilter::Kind(RecordKind::Item),
                    severity: Severity::Error,
                    check: check_item_value,
                },
                RecordRule {
                    name: CHARACTER_LEVEL_VALID,
                    applies_to: KindFilter::Kind(RecordKind::Character),
                    severity: Severity::Error,
                    check: check_character_level,
                },
                RecordRule {
                    name: CRAFTING_PIECE_DIFFICULTY_VALID,
                    applies_to: KindFilter::Kind(RecordKind::CraftingPiece),
                    severity: Severity::Warning,
                    check: check_crafting_difficulty,
                },
            ],
            file_rules: vec![FileRule {
                name: ID_UNIQUE_REQUIRED,
                applies_to: KindFilter::Any,
                severity: Severity::Error,
                check: check_duplicate_ids,
            }],
            check_references: true,
        }
    }

    /// A custom catalogue for tests. Reference-integrity checks are off
    /// unless re-enabled.
    pub fn with_rules(record_rules: Vec<RecordRule>, file_rules: Vec<FileRule>) -> Self {
        RuleCatalogue {
            record_rules,
            file_rules,
            check_references: false,
        }
    }

    /// Toggle the built-in reference-integrity check.
    pub fn reference_checks(mut self, enabled: bool) -> Self {
        self.check_references = enabled;
        self
    }

    pub fn record_rules(&self) -> &[RecordRule] {
        &self.record_rules
    }

    pub fn file_rules(&self) -> &[FileRule] {
        &self.file_rules
    }

    /// Whether the validator should run reference-integrity extraction.
    pub fn checks_references(&self) -> bool {
        self.check_references
    }
}

// ===========================================================================
// Tests
// ===========================================================================
