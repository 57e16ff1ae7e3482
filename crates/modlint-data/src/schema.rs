//! Serde structs for the on-disk data-file formats.
//!
//! A data file is either a bare list of records, or a document with an
//! optional `depends_on` load-order hint:
//!
//! ```json
//! { "depends_on": ["items"], "records": [{ "id": "bandit", "level": 12 }] }
//! ```
//!
//! These structs are deserialized from RON, JSON, or TOML and then
//! converted into the untyped core record model by the loader.

use serde::Deserialize;
use std::collections::BTreeMap;

/// A data file: a bare record list, or a full document with hints.
/// TOML files always use the document form (a top-level table).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DataFileData {
    Records(Vec<RecordData>),
    Document(DocumentData),
}

/// The full document form.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentData {
    /// Declared load-order hints: raw file-key tokens, normalized later.
    #[serde(default)]
    pub depends_on: Vec<String>,
    pub records: Vec<RecordData>,
}

/// One record: an open attribute map. No fixed field list -- the record
/// model is untyped by design.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordData {
    #[serde(flatten)]
    pub attributes: BTreeMap<String, AttrValue>,
}

/// A scalar attribute value of any shape the source formats produce.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl AttrValue {
    /// Normalize to the string representation used by the record model.
    /// Numeric formatting round-trips through `parse::<f64>` for the
    /// range rules (`1.5` -> `"1.5"`, `2.0` -> `"2"`).
    pub fn into_text(self) -> String {
        match self {
            AttrValue::Bool(b) => b.to_string(),
            AttrValue::Int(i) => i.to_string(),
            AttrValue::Float(f) => f.to_string(),
            AttrValue::Text(s) => s,
        }
    }
}
