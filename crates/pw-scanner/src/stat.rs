//! Filesystem metadata queries.
//!
//! Every query returns a [`StatError`] that says *why* it failed, so callers
//! can tell a vanished entry from a permission problem or a broken disk.
//! All queries follow symbolic links.

use std::fs;
use std::time::SystemTime;

use camino::Utf8Path;
use pw_core::PathKind;

use crate::error::StatError;

/// Returns what kind of entry lives at `path`.
///
/// Symlinks are followed; a symlink whose target does not exist is reported
/// as [`PathKind::Symlink`] rather than as not found.
pub fn kind(path: &Utf8Path) -> Result<PathKind, StatError> {
    match fs::metadata(path) {
        Ok(metadata) => Ok(PathKind::from_file_type(metadata.file_type())),
        Err(err) => {
            let err = StatError::from_io(path, err);
            if !err.is_not_found() {
                return Err(err);
            }
            match fs::symlink_metadata(path) {
                Ok(metadata) if metadata.file_type().is_symlink() => Ok(PathKind::Symlink),
                _ => Err(err),
            }
        }
    }
}

/// Returns `true` if something exists at `path`.
///
/// Dangling symlinks do not exist.
pub fn exists(path: &Utf8Path) -> Result<bool, StatError> {
    match fs::metadata(path) {
        Ok(_) => Ok(true),
        Err(err) => match StatError::from_io(path, err) {
            StatError::NotFound(_) => Ok(false),
            err => Err(err),
        },
    }
}

/// Returns the last modification time of `path`.
pub fn modified(path: &Utf8Path) -> Result<SystemTime, StatError> {
    fs::metadata(path)
        .and_then(|metadata| metadata.modified())
        .map_err(|err| StatError::from_io(path, err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use filetime::FileTime;
    use tempfile::TempDir;

    fn utf8_root(temp: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap()
    }

    #[test]
    fn test_kind() {
        let temp = TempDir::new().unwrap();
        let root = utf8_root(&temp);
        let file = root.join("a.txt");
        fs::write(&file, "a").unwrap();

        assert_eq!(kind(&root).unwrap(), PathKind::Dir);
        assert_eq!(kind(&file).unwrap(), PathKind::File);
        assert!(kind(&root.join("missing")).unwrap_err().is_not_found());
    }

    #[test]
    fn test_kind_below_a_file_is_not_found() {
        let temp = TempDir::new().unwrap();
        let root = utf8_root(&temp);
        let file = root.join("f");
        fs::write(&file, "f").unwrap();

        assert!(kind(&file.join("child")).unwrap_err().is_not_found());
        assert!(!exists(&file.join("child")).unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink() {
        let temp = TempDir::new().unwrap();
        let root = utf8_root(&temp);
        let link = root.join("dangling");
        std::os::unix::fs::symlink(root.join("nowhere"), &link).unwrap();

        assert_eq!(kind(&link).unwrap(), PathKind::Symlink);
        assert!(!exists(&link).unwrap());
    }

    #[test]
    fn test_exists() {
        let temp = TempDir::new().unwrap();
        let root = utf8_root(&temp);
        assert!(exists(&root).unwrap());
        assert!(!exists(&root.join("missing")).unwrap());
    }

    #[test]
    fn test_modified() {
        let temp = TempDir::new().unwrap();
        let root = utf8_root(&temp);
        let file = root.join("a.txt");
        fs::write(&file, "a").unwrap();

        let stamp = FileTime::from_unix_time(1_600_000_000, 0);
        filetime::set_file_mtime(&file, stamp).unwrap();

        let mtime = modified(&file).unwrap();
        assert_eq!(FileTime::from_system_time(mtime), stamp);
        assert!(modified(&root.join("missing")).unwrap_err().is_not_found());
    }
}
