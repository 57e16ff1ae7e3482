use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalized lowercase identifier for a data file. Used as the unit of
/// dependency-graph nodes.
///
/// Keys are derived from a file's base name: the extension is stripped,
/// the name is lowercased, and the legacy `std_` prefix and `_xml` suffix
/// are removed. `std_Items_xml.json` and `items.ron` both normalize to
/// `items`, so a corpus migrated from the old naming convention keeps
/// stable graph nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileKey(String);

/// Legacy prefix stripped during normalization.
const LEGACY_PREFIX: &str = "std_";

/// Legacy suffix stripped during normalization.
const LEGACY_SUFFIX: &str = "_xml";

impl FileKey {
    /// Wrap an already-normalized key. Lowercases its input so keys built
    /// directly (tests, alias tables) compare equal to derived ones.
    pub fn new(key: impl Into<String>) -> Self {
        FileKey(key.into().to_lowercase())
    }

    /// Derive a key from a file name such as `std_Items_xml.json`.
    ///
    /// Strips the extension (last `.` segment), lowercases, then strips the
    /// known legacy prefix/suffix.
    pub fn from_file_name(name: &str) -> Self {
        let stem = match name.rsplit_once('.') {
            Some((stem, _ext)) if !stem.is_empty() => stem,
            _ => name,
        };
        Self::from_stem(stem)
    }

    /// Derive a key from a file stem (name without extension).
    pub fn from_stem(stem: &str) -> Self {
        let mut key = stem.to_lowercase();
        if let Some(rest) = key.strip_prefix(LEGACY_PREFIX) {
            key = rest.to_string();
        }
        if let Some(rest) = key.strip_suffix(LEGACY_SUFFIX) {
            key = rest.to_string();
        }
        FileKey(key)
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for FileKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_file_name() {
        assert_eq!(FileKey::from_file_name("items.json").as_str(), "items");
    }

    #[test]
    fn lowercases() {
        assert_eq!(FileKey::from_file_name("Items.RON").as_str(), "items");
    }

    #[test]
    fn strips_legacy_prefix_and_suffix() {
        assert_eq!(
            FileKey::from_file_name("std_Items_xml.json").as_str(),
            "items"
        );
        assert_eq!(FileKey::from_file_name("std_characters.toml").as_str(), "characters");
        assert_eq!(FileKey::from_file_name("crafting_pieces_xml.ron").as_str(), "crafting_pieces");
    }

    #[test]
    fn no_extension() {
        assert_eq!(FileKey::from_file_name("items").as_str(), "items");
    }

    #[test]
    fn hidden_file_keeps_name() {
        // A leading dot with no stem is not treated as an extension split.
        assert_eq!(FileKey::from_file_name(".items").as_str(), ".items");
    }

    #[test]
    fn new_lowercases() {
        assert_eq!(FileKey::new("Items"), FileKey::new("items"));
    }

    #[test]
    fn ordering_is_lexicographic() {
        let mut keys = vec![
            FileKey::new("items"),
            FileKey::new("characters"),
            FileKey::new("crafting_pieces"),
        ];
        keys.sort();
        assert_eq!(keys[0].as_str(), "characters");
        assert_eq!(keys[1].as_str(), "crafting_pieces");
        assert_eq!(keys[2].as_str(), "items");
    }

    #[test]
    fn keys_are_hashable() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(FileKey::new("items"), 1);
        map.insert(FileKey::new("characters"), 2);
        assert_eq!(map[&FileKey::from_file_name("std_items_xml.json")], 1);
    }
}
