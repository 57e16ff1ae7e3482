//! Data-file discovery and parsing for the Modlint pipeline.
//!
//! Turns a directory of RON/TOML/JSON data files into the core record
//! model. Parsing is deliberately lenient about value types -- scalar
//! attributes of any shape normalize to strings, matching the untyped
//! record model -- but strict about document structure.

pub mod loader;
pub mod schema;

pub use loader::{
    DataLoadError, Format, ParsedFile, detect_format, list_data_files, normalize_file_key,
    parse_data_file,
};
