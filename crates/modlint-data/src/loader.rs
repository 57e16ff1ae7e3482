//! File discovery, format detection, and record parsing.

use crate::schema::{DataFileData, RecordData};
use modlint_core::key::FileKey;
use modlint_core::record::Record;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur during data loading.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported data file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// File discovery
// ===========================================================================

/// List the data files in a directory, sorted by file name.
///
/// Non-recursive; anything without a supported extension is skipped
/// silently (directories may hold readme files and editor droppings).
pub fn list_data_files(dir: &Path) -> Result<Vec<PathBuf>, DataLoadError> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && detect_format(&path).is_ok() {
            files.push(path);
        }
    }
    files.sort_by_key(|p| p.file_name().map(|n| n.to_os_string()));
    Ok(files)
}

/// Derive the normalized file key for a path.
pub fn normalize_file_key(path: &Path) -> FileKey {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    FileKey::from_file_name(name)
}

// ===========================================================================
// Parsing
// ===========================================================================

/// A successfully parsed data file.
#[derive(Debug, Clone)]
pub struct ParsedFile {
    pub path: PathBuf,
    /// Display name used in diagnostics.
    pub file_name: String,
    pub key: FileKey,
    pub records: Vec<Record>,
    /// Raw `depends_on` tokens, not yet normalized against the corpus.
    pub load_hints: Vec<String>,
}

/// Read a data file and convert it into records.
///
/// The document's scalar attribute values all normalize to strings; the
/// record kind is derived from the normalized file key.
pub fn parse_data_file(path: &Path) -> Result<ParsedFile, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;

    let data: DataFileData = match format {
        Format::Ron => ron::from_str(&content).map_err(|e| DataLoadError::Parse {
            file: path.to_path_buf(),
            detail: e.to_string(),
        })?,
        Format::Json => serde_json::from_str(&content).map_err(|e| DataLoadError::Parse {
            file: path.to_path_buf(),
            detail: e.to_string(),
        })?,
        Format::Toml => toml::from_str(&content).map_err(|e| DataLoadError::Parse {
            file: path.to_path_buf(),
            detail: e.to_string(),
        })?,
    };

    let (record_data, load_hints) = match data {
        DataFileData::Records(records) => (records, Vec::new()),
        DataFileData::Document(doc) => (doc.records, doc.depends_on),
    };

    let key = normalize_file_key(path);
    let records = record_data
        .into_iter()
        .map(|r| into_record(r, &key))
        .collect();

    Ok(ParsedFile {
        path: path.to_path_buf(),
        file_name: path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string(),
        key,
        records,
        load_hints,
    })
}

fn into_record(data: RecordData, key: &FileKey) -> Record {
    let attributes: BTreeMap<String, String> = data
        .attributes
        .into_iter()
        .map(|(name, value)| (name, value.into_text()))
        .collect();
    Record::new(key.clone(), attributes)
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use modlint_core::record::RecordKind;
    use std::fs;

    /// Create a temporary directory with a unique name for test isolation.
    fn make_test_dir(suffix: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "modlint_data_test_{suffix}_{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// Clean up a test directory.
    fn cleanup(dir: &Path) {
        let _ = fs::remove_dir_all(dir);
    }

    // -----------------------------------------------------------------------
    // detect_format
    // -----------------------------------------------------------------------

    #[test]
    fn detect_format_supported() {
        assert_eq!(detect_format(Path::new("items.ron")).unwrap(), Format::Ron);
        assert_eq!(
            detect_format(Path::new("items.toml")).unwrap(),
            Format::Toml
        );
        assert_eq!(
            detect_format(Path::new("items.json")).unwrap(),
            Format::Json
        );
    }

    #[test]
    fn detect_format_unsupported() {
        let result = detect_format(Path::new("items.xml"));
        assert!(matches!(
            result,
            Err(DataLoadError::UnsupportedFormat { .. })
        ));
        assert!(detect_format(Path::new("items")).is_err());
    }

    // -----------------------------------------------------------------------
    // list_data_files
    // -----------------------------------------------------------------------

    #[test]
    fn list_data_files_sorted_and_filtered() {
        let dir = make_test_dir("list");
        fs::write(dir.join("items.json"), "[]").unwrap();
        fs::write(dir.join("characters.ron"), "[]").unwrap();
        fs::write(dir.join("readme.md"), "not data").unwrap();

        let files = list_data_files(&dir).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["characters.ron", "items.json"]);

        cleanup(&dir);
    }

    #[test]
    fn list_data_files_empty_dir() {
        let dir = make_test_dir("list_empty");
        assert!(list_data_files(&dir).unwrap().is_empty());
        cleanup(&dir);
    }

    // -----------------------------------------------------------------------
    // normalize_file_key
    // -----------------------------------------------------------------------

    #[test]
    fn normalize_strips_legacy_naming() {
        assert_eq!(
            normalize_file_key(Path::new("/data/std_Items_xml.json")),
            FileKey::new("items")
        );
        assert_eq!(
            normalize_file_key(Path::new("characters.ron")),
            FileKey::new("characters")
        );
    }

    // -----------------------------------------------------------------------
    // parse_data_file
    // -----------------------------------------------------------------------

    #[test]
    fn parse_json_bare_list() {
        let dir = make_test_dir("parse_json");
        let path = dir.join("items.json");
        fs::write(
            &path,
            r#"[{"id": "iron_sword", "weight": 3.5, "value": 120}]"#,
        )
        .unwrap();

        let parsed = parse_data_file(&path).unwrap();
        assert_eq!(parsed.key, FileKey::new("items"));
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].kind, RecordKind::Item);
        assert_eq!(parsed.records[0].attr("weight"), Some("3.5"));
        assert_eq!(parsed.records[0].attr("value"), Some("120"));
        assert!(parsed.load_hints.is_empty());

        cleanup(&dir);
    }

    #[test]
    fn parse_ron_bare_list() {
        let dir = make_test_dir("parse_ron");
        let path = dir.join("items.ron");
        fs::write(&path, r#"[{"id": "iron_sword", "weight": 3.5}]"#).unwrap();

        let parsed = parse_data_file(&path).unwrap();
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].id(), Some("iron_sword"));

        cleanup(&dir);
    }

    #[test]
    fn parse_toml_document() {
        let dir = make_test_dir("parse_toml");
        let path = dir.join("characters.toml");
        fs::write(
            &path,
            r#"
depends_on = ["items"]

[[records]]
id = "bandit_leader"
level = 12
"#,
        )
        .unwrap();

        let parsed = parse_data_file(&path).unwrap();
        assert_eq!(parsed.key, FileKey::new("characters"));
        assert_eq!(parsed.load_hints, vec!["items"]);
        assert_eq!(parsed.records[0].kind, RecordKind::Character);
        assert_eq!(parsed.records[0].attr("level"), Some("12"));

        cleanup(&dir);
    }

    #[test]
    fn parse_json_document_with_hints() {
        let dir = make_test_dir("parse_json_doc");
        let path = dir.join("quests.json");
        fs::write(
            &path,
            r#"{"depends_on": ["items", "characters"], "records": [{"id": "rescue"}]}"#,
        )
        .unwrap();

        let parsed = parse_data_file(&path).unwrap();
        assert_eq!(parsed.load_hints, vec!["items", "characters"]);
        assert_eq!(parsed.records[0].kind, RecordKind::Generic);

        cleanup(&dir);
    }

    #[test]
    fn parse_failure_is_parse_error() {
        let dir = make_test_dir("parse_err");
        let path = dir.join("bad.json");
        fs::write(&path, "this is not valid JSON {{{").unwrap();

        let result = parse_data_file(&path);
        assert!(matches!(result, Err(DataLoadError::Parse { .. })));

        cleanup(&dir);
    }

    #[test]
    fn scalar_values_normalize_to_strings() {
        let dir = make_test_dir("parse_scalars");
        let path = dir.join("items.json");
        fs::write(
            &path,
            r#"[{"id": "sword", "value": -100, "weight": 2.0, "unique": true}]"#,
        )
        .unwrap();

        let parsed = parse_data_file(&path).unwrap();
        let record = &parsed.records[0];
        assert_eq!(record.attr("value"), Some("-100"));
        assert_eq!(record.attr("weight"), Some("2"));
        assert_eq!(record.attr("unique"), Some("true"));
        assert_eq!(record.numeric_attr("value"), Some(-100.0));

        cleanup(&dir);
    }

    // -----------------------------------------------------------------------
    // Error display messages
    // -----------------------------------------------------------------------

    #[test]
    fn error_display_messages() {
        let e = DataLoadError::UnsupportedFormat {
            file: PathBuf::from("items.xml"),
        };
        assert!(format!("{e}").contains("items.xml"));

        let e = DataLoadError::Parse {
            file: PathBuf::from("bad.json"),
            detail: "syntax error".to_string(),
        };
        assert!(format!("{e}").contains("bad.json"));
        assert!(format!("{e}").contains("syntax error"));
    }
}
