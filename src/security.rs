//! Pre-flight validation of the target folder

use crate::error::{OrganizeError, Result};
use std::path::{Path, PathBuf};

/// Security validator for the folder being organized
pub struct PathValidator;

impl PathValidator {
    /// Check if a path is protected and should not be reorganized
    pub fn is_protected_path(path: &Path) -> bool {
        let protected_paths: Vec<PathBuf> = vec![
            PathBuf::from("/System"),
            PathBuf::from("/usr"),
            PathBuf::from("/bin"),
            PathBuf::from("/sbin"),
            PathBuf::from("/Library"),
            PathBuf::from("/Applications"),
            PathBuf::from("/private"),
            PathBuf::from("/var"),
            // Windows system paths
            PathBuf::from("C:\\Windows"),
            PathBuf::from("C:\\Program Files"),
            PathBuf::from("C:\\Program Files (x86)"),
        ];

        // Get canonical path if possible
        let check_path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        // Filesystem root (or a bare drive on Windows)
        if check_path.parent().is_none() {
            return true;
        }

        let home = dirs::home_dir();

        // Block home directory itself (but not subdirectories)
        if home.as_ref() == Some(&check_path) {
            return true;
        }

        // Allow user directories within home and the temp folder, even
        // when they live below a protected path (/private/tmp on macOS)
        let owned_roots = home
            .into_iter()
            .filter(|h| h.parent().is_some())
            .chain(Self::temp_roots());
        for owned in owned_roots {
            if check_path.starts_with(&owned) {
                return false;
            }
        }

        for protected in &protected_paths {
            // The folder itself and its direct children
            if check_path == *protected || check_path.parent() == Some(protected.as_path()) {
                return true;
            }
        }

        false
    }

    /// Canonical system temp folders
    fn temp_roots() -> Vec<PathBuf> {
        [std::env::temp_dir(), PathBuf::from("/tmp")]
            .iter()
            .filter_map(|p| p.canonicalize().ok())
            .filter(|p| p.parent().is_some())
            .collect()
    }

    /// Validate the target folder before anything is touched
    ///
    /// Returns the canonical path of the target.
    pub fn validate_target(path: &Path) -> Result<PathBuf> {
        if !path.exists() {
            return Err(OrganizeError::TargetMissing(path.to_path_buf()));
        }
        if !path.is_dir() {
            return Err(OrganizeError::NotADirectory(path.to_path_buf()));
        }

        let canonical = path.canonicalize()?;
        if Self::is_protected_path(&canonical) {
            return Err(OrganizeError::ProtectedPath(canonical));
        }
        Ok(canonical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_protected_paths() {
        assert!(PathValidator::is_protected_path(Path::new("/")));
        assert!(PathValidator::is_protected_path(Path::new("/usr")));
        assert!(PathValidator::is_protected_path(Path::new("/usr/lib")));
        if let Some(home) = dirs::home_dir() {
            assert!(PathValidator::is_protected_path(&home));
        }
    }

    #[test]
    fn test_temp_roots_allowed() {
        for root in PathValidator::temp_roots() {
            assert!(!PathValidator::is_protected_path(&root), "{}", root.display());
        }
        assert!(!PathValidator::is_protected_path(&std::env::temp_dir()));
    }

    #[test]
    fn test_home_subfolder_allowed() {
        if let Some(home) = dirs::home_dir() {
            assert!(!PathValidator::is_protected_path(&home.join("Downloads")));
        }
    }

    #[test]
    fn test_temp_dir_not_protected() {
        let dir = tempdir().unwrap();
        let sub = dir.path().join("downloads");
        fs::create_dir(&sub).unwrap();
        assert!(!PathValidator::is_protected_path(&sub));
    }

    #[test]
    fn test_validate_missing_target() {
        let dir = tempdir().unwrap();
        let err = PathValidator::validate_target(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, OrganizeError::TargetMissing(_)));
    }

    #[test]
    fn test_validate_file_target() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("file.txt");
        fs::write(&file, "x").unwrap();
        let err = PathValidator::validate_target(&file).unwrap_err();
        assert!(matches!(err, OrganizeError::NotADirectory(_)));
    }

    #[test]
    fn test_validate_ok() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("inbox");
        fs::create_dir(&target).unwrap();
        let canonical = PathValidator::validate_target(&target).unwrap();
        assert_eq!(canonical, target.canonicalize().unwrap());
    }
}
