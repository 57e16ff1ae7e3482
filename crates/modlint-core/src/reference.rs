//! Cross-file reference extraction.
//!
//! Two conventions are scanned for in every attribute value:
//!
//! 1. A dotted reference `file_key.entity_id` names its target file
//!    explicitly (`items.iron_sword`).
//! 2. Certain attribute *names* imply a target file regardless of value
//!    shape: `character = "bandit_leader"` references the `characters`
//!    file even though the value is a bare entity id.
//!
//! Extraction never fails. A reference whose target is not among the
//! discovered files is returned as missing -- a diagnostic-producing
//! condition, not an extraction error.

use crate::key::FileKey;
use crate::record::Record;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ---------------------------------------------------------------------------
// Alias table
// ---------------------------------------------------------------------------

/// Singular/shorthand tokens mapped to the canonical file key they refer
/// to. Used both for dotted-reference candidates (`item.iron_sword`) and
/// for attribute-name implication (`item = "iron_sword"`).
const ALIASES: &[(&str, &str)] = &[
    ("item", "items"),
    ("character", "characters"),
    ("piece", "crafting_pieces"),
    ("craft_piece", "crafting_pieces"),
    ("crafting_piece", "crafting_pieces"),
];

/// Resolve an alias token to its canonical target key, if it is one.
fn alias_target(token: &str) -> Option<&'static str> {
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == token)
        .map(|(_, target)| *target)
}

/// Whether a dotted-reference candidate looks like a file key at all.
/// Rejecting non-identifier candidates keeps decimal attribute values
/// such as `"1.5"` from registering phantom references.
fn is_identifier(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// ---------------------------------------------------------------------------
// Extraction results
// ---------------------------------------------------------------------------

/// A reference whose target file was not discovered in the corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingReference {
    /// The attribute the reference was found in.
    pub attribute: String,
    /// The raw attribute value.
    pub value: String,
    /// The normalized file key that failed to resolve.
    pub target: String,
}

/// References extracted from a single record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordReferences {
    /// Targets that resolve to a discovered file.
    pub resolved: BTreeSet<FileKey>,
    /// Targets that do not, in attribute order.
    pub missing: Vec<MissingReference>,
}

// ---------------------------------------------------------------------------
// Extractor
// ---------------------------------------------------------------------------

/// Stateless reference scanner over the known file-key set. Safe to share
/// read-only across concurrent validation of many files.
#[derive(Debug, Clone)]
pub struct ReferenceExtractor {
    known: BTreeSet<FileKey>,
}

/// Outcome of resolving one candidate token.
enum Resolution {
    Resolved(FileKey),
    Missing(String),
    NotAReference,
}

impl ReferenceExtractor {
    /// Build an extractor over the set of discovered file keys.
    pub fn new(known: impl IntoIterator<Item = FileKey>) -> Self {
        ReferenceExtractor {
            known: known.into_iter().collect(),
        }
    }

    /// The discovered file keys this extractor resolves against.
    pub fn known_keys(&self) -> &BTreeSet<FileKey> {
        &self.known
    }

    /// Resolve a candidate file-key token: case-insensitive match against
    /// the known keys, then against the alias table.
    pub fn resolve_candidate(&self, candidate: &str) -> Option<FileKey> {
        let token = candidate.to_lowercase();
        let direct = FileKey::new(&token);
        if self.known.contains(&direct) {
            return Some(direct);
        }
        if let Some(target) = alias_target(&token) {
            let aliased = FileKey::new(target);
            if self.known.contains(&aliased) {
                return Some(aliased);
            }
        }
        None
    }

    /// Scan every attribute of a record and split its references into
    /// resolved and missing targets.
    pub fn extract(&self, record: &Record) -> RecordReferences {
        let mut refs = RecordReferences::default();

        for (attribute, value) in &record.attributes {
            match self.classify(attribute, value) {
                Resolution::Resolved(key) => {
                    refs.resolved.insert(key);
                }
                Resolution::Missing(target) => {
                    refs.missing.push(MissingReference {
                        attribute: attribute.clone(),
                        value: value.clone(),
                        target,
                    });
                }
                Resolution::NotAReference => {}
            }
        }

        refs
    }

    /// Apply the two extraction strategies to one attribute.
    fn classify(&self, attribute: &str, value: &str) -> Resolution {
        // Strategy 1: dotted reference `candidate.entity_id`.
        if let Some((left, right)) = value.split_once('.')
            && !left.is_empty()
            && !right.is_empty()
            && is_identifier(left)
        {
            let token = left.to_lowercase();
            return match self.resolve_candidate(&token) {
                Some(key) => Resolution::Resolved(key),
                None => {
                    let target = alias_target(&token).unwrap_or(&token).to_string();
                    Resolution::Missing(target)
                }
            };
        }

        // Strategy 2: attribute-name implication for bare entity ids.
        if value.is_empty() {
            return Resolution::NotAReference;
        }
        if let Some(target) = alias_target(&attribute.to_lowercase()) {
            let key = FileKey::new(target);
            return if self.known.contains(&key) {
                Resolution::Resolved(key)
            } else {
                Resolution::Missing(target.to_string())
            };
        }

        Resolution::NotAReference
    }
}

// ===========================================================================
// Tests
// ===========================================================================
