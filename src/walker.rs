//! Directory walking
//!
//! Thin layer over `walkdir` producing the snapshots each stage works on.
//! A snapshot reflects the tree at the moment of the walk; paths in it go
//! stale as soon as a later operation moves or renames the file.

use crate::classify::extension_of;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A file found under the target root
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileEntry {
    /// Directory containing the file
    pub dir: PathBuf,
    /// File name within `dir`, not necessarily valid UTF-8
    pub name: OsString,
}

impl FileEntry {
    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.name)
    }

    /// Extension including the dot, `""` if none
    ///
    /// Invalid UTF-8 sequences in the name are replaced before matching,
    /// so `caf\xE9.txt` still has the extension `.txt`.
    pub fn extension(&self) -> String {
        extension_of(&self.name.to_string_lossy()).to_string()
    }

    /// File name as UTF-8, `None` when it is not valid UTF-8
    pub fn name_str(&self) -> Option<&str> {
        self.name.to_str()
    }
}

/// Every regular file under `root`, root itself included
pub fn walk_files(root: &Path) -> Vec<FileEntry> {
    walk_files_excluding(root, &[])
}

/// Like [`walk_files`], without descending into any of `excluded`
pub fn walk_files_excluding(root: &Path, excluded: &[PathBuf]) -> Vec<FileEntry> {
    let mut files = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| !(e.file_type().is_dir() && excluded.iter().any(|x| x == e.path())));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping unreadable entry");
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let dir = entry
            .path()
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| root.to_path_buf());

        files.push(FileEntry {
            dir,
            name: entry.file_name().to_os_string(),
        });
    }

    files
}

/// Directories strictly below `root` grouped by depth, deepest group first
///
/// Every directory in a group is deeper than every directory in the
/// groups after it, so processing groups in order visits children before
/// their parents.
pub fn walk_dirs_by_depth(root: &Path) -> Vec<Vec<PathBuf>> {
    let mut levels: Vec<Vec<PathBuf>> = Vec::new();

    for entry in WalkDir::new(root).min_depth(1).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping unreadable entry");
                continue;
            }
        };

        if !entry.file_type().is_dir() {
            continue;
        }

        let depth = entry.depth();
        if levels.len() < depth {
            levels.resize_with(depth, Vec::new);
        }
        levels[depth - 1].push(entry.into_path());
    }

    levels.retain(|level| !level.is_empty());
    levels.reverse();
    levels
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_walk_files_recursive() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a/b")).unwrap();
        fs::write(dir.path().join("top.txt"), "x").unwrap();
        fs::write(dir.path().join("a/mid.mp4"), "x").unwrap();
        fs::write(dir.path().join("a/b/deep"), "x").unwrap();

        let mut files = walk_files(dir.path());
        files.sort_by(|a, b| a.name.cmp(&b.name));

        assert_eq!(files.len(), 3);
        assert_eq!(files[0].name, "deep");
        assert_eq!(files[0].dir, dir.path().join("a/b"));
        assert_eq!(files[0].extension(), "");
        assert_eq!(files[1].name, "mid.mp4");
        assert_eq!(files[1].extension(), ".mp4");
        assert_eq!(files[2].path(), dir.path().join("top.txt"));
    }

    #[test]
    fn test_walk_files_excluding() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("skip/inner")).unwrap();
        fs::create_dir_all(dir.path().join("keep")).unwrap();
        fs::write(dir.path().join("skip/inner/a.txt"), "x").unwrap();
        fs::write(dir.path().join("keep/b.txt"), "x").unwrap();

        let files = walk_files_excluding(dir.path(), &[dir.path().join("skip")]);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "b.txt");
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_walk_files_non_utf8_name() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempdir().unwrap();
        let name = OsStr::from_bytes(b"caf\xe9.txt");
        fs::write(dir.path().join(name), "x").unwrap();

        let files = walk_files(dir.path());
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name.as_os_str(), name);
        assert_eq!(files[0].name_str(), None);
        assert_eq!(files[0].extension(), ".txt");
        assert_eq!(files[0].path(), dir.path().join(name));
    }

    #[cfg(unix)]
    #[test]
    fn test_walk_files_skips_symlinks() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("real.txt"), "x").unwrap();
        std::os::unix::fs::symlink(dir.path().join("real.txt"), dir.path().join("link.txt"))
            .unwrap();
        std::os::unix::fs::symlink(dir.path().join("gone.txt"), dir.path().join("dangling.txt"))
            .unwrap();

        let files = walk_files(dir.path());
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "real.txt");
    }

    #[test]
    fn test_walk_dirs_deepest_first() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a/b/c")).unwrap();
        fs::create_dir_all(dir.path().join("d")).unwrap();

        let levels = walk_dirs_by_depth(dir.path());
        assert_eq!(levels.len(), 3);
        assert_eq!(levels[0], vec![dir.path().join("a/b/c")]);
        assert_eq!(levels[1], vec![dir.path().join("a/b")]);
        let mut top = levels[2].clone();
        top.sort();
        assert_eq!(top, vec![dir.path().join("a"), dir.path().join("d")]);
    }

    #[test]
    fn test_walk_dirs_empty_root() {
        let dir = tempdir().unwrap();
        assert!(walk_dirs_by_depth(dir.path()).is_empty());
    }
}
