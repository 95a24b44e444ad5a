//! Extension classification
//!
//! Maps file extensions to category folders. The table is built once and
//! handed to every stage that needs it; it is never mutated afterwards.

use crate::error::{OrganizeError, Result};
use std::collections::BTreeSet;

/// Name of the catch-all category for extensions no category claims
pub const UNKNOWNS: &str = "unknowns";

/// Ordered set of extensions, each including the leading dot
pub type ExtensionSet = BTreeSet<String>;

const DEFAULT_TABLE: &[(&str, &[&str])] = &[
    (
        "video",
        &[
            ".mp4", ".mov", ".avi", ".mkv", ".wmv", ".3gp", ".3g2", ".mpg", ".mpeg", ".m4v",
            ".h264", ".flv", ".rm", ".swf", ".vob",
        ],
    ),
    (
        "audio",
        &[
            ".mp3", ".wav", ".ogg", ".flac", ".aif", ".mid", ".midi", ".mpa", ".wma", ".wpl",
            ".cda",
        ],
    ),
    (
        "image",
        &[
            ".jpg", ".png", ".bmp", ".ai", ".psd", ".ico", ".jpeg", ".ps", ".svg", ".tif", ".tiff",
        ],
    ),
    (
        "archives",
        &[".zip", ".rar", ".7z", ".z", ".gz", ".rpm", ".arj", ".pkg", ".deb"],
    ),
    (
        "documents",
        &[".pdf", ".txt", ".doc", ".docx", ".rtf", ".tex", ".wpd", ".odt"],
    ),
];

/// A named bucket of extensions with a folder of the same name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub extensions: ExtensionSet,
}

impl Category {
    pub fn matches(&self, extension: &str) -> bool {
        self.extensions.contains(extension)
    }
}

/// Immutable mapping from category name to its extensions
///
/// Extension sets are pairwise disjoint, which is what lets the known
/// categories be sorted concurrently without touching the same file.
#[derive(Debug, Clone)]
pub struct CategoryTable {
    categories: Vec<Category>,
    known: ExtensionSet,
}

impl CategoryTable {
    /// Build a table from `(name, extensions)` pairs, keeping declaration order
    pub fn new<N, E, I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (N, Vec<E>)>,
        N: Into<String>,
        E: Into<String>,
    {
        let mut categories: Vec<Category> = Vec::new();
        let mut known = ExtensionSet::new();

        for (name, extensions) in entries {
            let name = name.into();
            if name.is_empty() || name == UNKNOWNS {
                return Err(OrganizeError::InvalidCategories(format!(
                    "category name '{}' is reserved or empty",
                    name
                )));
            }
            if categories.iter().any(|c| c.name == name) {
                return Err(OrganizeError::InvalidCategories(format!(
                    "category '{}' is declared twice",
                    name
                )));
            }

            let mut set = ExtensionSet::new();
            for ext in extensions {
                let ext = ext.into();
                if !ext.starts_with('.') || ext.len() < 2 {
                    return Err(OrganizeError::InvalidCategories(format!(
                        "extension '{}' of category '{}' must start with a dot",
                        ext, name
                    )));
                }
                if !known.insert(ext.clone()) {
                    return Err(OrganizeError::InvalidCategories(format!(
                        "extension '{}' is claimed by more than one category",
                        ext
                    )));
                }
                set.insert(ext);
            }

            categories.push(Category {
                name,
                extensions: set,
            });
        }

        Ok(Self { categories, known })
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn get(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Extension set of one named category
    pub fn extensions_for(&self, name: &str) -> Option<&ExtensionSet> {
        self.get(name).map(|c| &c.extensions)
    }

    /// Union of every extension listed under some category
    pub fn known_extensions(&self) -> &ExtensionSet {
        &self.known
    }

    pub fn is_known(&self, extension: &str) -> bool {
        self.known.contains(extension)
    }

    /// Category owning an extension, if any
    pub fn category_for(&self, extension: &str) -> Option<&str> {
        self.categories
            .iter()
            .find(|c| c.matches(extension))
            .map(|c| c.name.as_str())
    }

    /// Folder names created under the target root, `unknowns` last
    pub fn folder_names(&self) -> Vec<String> {
        self.categories
            .iter()
            .map(|c| c.name.clone())
            .chain(std::iter::once(UNKNOWNS.to_string()))
            .collect()
    }

    /// Extensions in `seen` that no category claims
    pub fn unknown_extensions(&self, seen: &ExtensionSet) -> ExtensionSet {
        seen.difference(&self.known).cloned().collect()
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        let categories: Vec<Category> = DEFAULT_TABLE
            .iter()
            .map(|(name, exts)| Category {
                name: name.to_string(),
                extensions: exts.iter().map(|e| e.to_string()).collect(),
            })
            .collect();
        let known = categories
            .iter()
            .flat_map(|c| c.extensions.iter().cloned())
            .collect();
        Self { categories, known }
    }
}

/// Final suffix of a file name including the dot, or `""` when there is none
///
/// Case is preserved. Dot-files like `.bashrc` and names ending in a dot
/// have no extension.
pub fn extension_of(name: &str) -> &str {
    match name.rfind('.') {
        Some(i) if i > 0 && i < name.len() - 1 => &name[i..],
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_is_disjoint() {
        let table = CategoryTable::default();
        let total: usize = table.categories().iter().map(|c| c.extensions.len()).sum();
        assert_eq!(total, table.known_extensions().len());
        assert_eq!(table.categories().len(), 5);
    }

    #[test]
    fn test_category_lookup() {
        let table = CategoryTable::default();
        assert_eq!(table.category_for(".mp4"), Some("video"));
        assert_eq!(table.category_for(".txt"), Some("documents"));
        assert_eq!(table.category_for(".zip"), Some("archives"));
        assert_eq!(table.category_for(".xlsx"), None);
        // Case-sensitive
        assert_eq!(table.category_for(".MP4"), None);
        assert!(table.extensions_for("audio").unwrap().contains(".flac"));
        assert!(table.extensions_for("nope").is_none());
    }

    #[test]
    fn test_folder_names_end_with_unknowns() {
        let table = CategoryTable::default();
        assert_eq!(
            table.folder_names(),
            vec!["video", "audio", "image", "archives", "documents", UNKNOWNS]
        );
    }

    #[test]
    fn test_unknown_extensions() {
        let table = CategoryTable::default();
        let seen: ExtensionSet = [".mp4", ".xlsx", "", ".txt", ".rs"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let unknown = table.unknown_extensions(&seen);
        let expected: ExtensionSet = ["", ".rs", ".xlsx"].iter().map(|s| s.to_string()).collect();
        assert_eq!(unknown, expected);
    }

    #[test]
    fn test_custom_table_rejects_overlap() {
        let err = CategoryTable::new(vec![("a", vec![".x"]), ("b", vec![".x"])]).unwrap_err();
        assert!(matches!(err, OrganizeError::InvalidCategories(_)));
    }

    #[test]
    fn test_custom_table_rejects_reserved_name() {
        assert!(CategoryTable::new(vec![(UNKNOWNS, vec![".x"])]).is_err());
        assert!(CategoryTable::new(vec![("a", vec!["x"])]).is_err());
    }

    #[test]
    fn test_custom_table() {
        let table = CategoryTable::new(vec![("code", vec![".rs", ".py"])]).unwrap();
        assert_eq!(table.category_for(".rs"), Some("code"));
        assert!(table.is_known(".py"));
        assert!(!table.is_known(".mp4"));
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("a.mp4"), ".mp4");
        assert_eq!(extension_of("archive.tar.gz"), ".gz");
        assert_eq!(extension_of("README"), "");
        assert_eq!(extension_of(".bashrc"), "");
        assert_eq!(extension_of("trailing."), "");
        assert_eq!(extension_of("Photo.JPG"), ".JPG");
    }
}
