use crate::key::FileKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Record kinds
// ---------------------------------------------------------------------------

/// The kind of entity a record describes, derived from the file it came
/// from. Closed set -- rule dispatch is a plain match on this enum, never
/// runtime type discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    Item,
    Character,
    CraftingPiece,
    /// Any file outside the known categories. Only kind-agnostic rules apply.
    Generic,
}

impl RecordKind {
    /// Derive the kind from a normalized file key (`items` -> `Item`).
    /// Singular forms are accepted for hand-named files.
    pub fn from_file_key(key: &FileKey) -> Self {
        match key.as_str() {
            "items" | "item" => RecordKind::Item,
            "characters" | "character" => RecordKind::Character,
            "crafting_pieces" | "crafting_piece" | "piece" => RecordKind::CraftingPiece,
            _ => RecordKind::Generic,
        }
    }

    /// Stable display name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            RecordKind::Item => "Item",
            RecordKind::Character => "Character",
            RecordKind::CraftingPiece => "CraftingPiece",
            RecordKind::Generic => "Generic",
        }
    }
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// One parsed entity instance from a data file.
///
/// Attributes are deliberately untyped strings: the source formats do not
/// distinguish value types strongly, and rules treat a malformed numeric
/// attribute as "rule does not apply" rather than an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// The file this record belongs to.
    pub file_key: FileKey,
    /// Entity kind, derived from the file key.
    pub kind: RecordKind,
    /// Raw attribute values, ordered by attribute name.
    pub attributes: BTreeMap<String, String>,
    /// Line in the source file, when the parser can supply one.
    #[serde(default)]
    pub source_line: Option<u32>,
}

impl Record {
    /// Create a record for a file, deriving its kind from the key.
    pub fn new(file_key: FileKey, attributes: BTreeMap<String, String>) -> Self {
        let kind = RecordKind::from_file_key(&file_key);
        Record {
            file_key,
            kind,
            attributes,
            source_line: None,
        }
    }

    /// The record's `id` attribute, if present.
    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    /// An attribute value by name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// An attribute parsed as a number. Returns `None` when the attribute
    /// is absent or not numeric, so range rules can skip partially
    /// authored records.
    pub fn numeric_attr(&self, name: &str) -> Option<f64> {
        self.attr(name)?.trim().parse::<f64>().ok()
    }
}
