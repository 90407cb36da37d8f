//! Removal of objects that block the creation of an entry.

use std::fs;
use std::io;
use std::path::Path;

use log::debug;

use crate::ExtractionError;
use crate::Result;
use crate::error::FsOperation;

/// Removes whatever sits at `path` so the entry can be created again.
///
/// Files, links and special nodes are unlinked. An empty directory is
/// removed with `rmdir`; a non-empty one is left alone and the removal
/// fails.
///
/// # Errors
///
/// Returns `ExtractionError::Filesystem` with [`FsOperation::Remove`] if the
/// object cannot be removed.
pub fn remove_existing(path: &Path) -> Result<()> {
    debug!("removing existing object at {}", path.display());

    let unlink_err = match fs::remove_file(path) {
        Ok(()) => return Ok(()),
        Err(e) => e,
    };

    match fs::remove_dir(path) {
        Ok(()) => Ok(()),
        Err(dir_err) if unlink_is_directory_error(&unlink_err) => {
            Err(ExtractionError::fs(FsOperation::Remove, path, dir_err))
        }
        Err(_) => Err(ExtractionError::fs(FsOperation::Remove, path, unlink_err)),
    }
}

// unlink(2) on a directory reports EISDIR on Linux and EPERM elsewhere.
fn unlink_is_directory_error(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::IsADirectory || err.raw_os_error() == Some(libc::EPERM)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::os::unix::fs::symlink;
    use tempfile::TempDir;

    #[test]
    fn test_removes_regular_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("file");
        fs::write(&path, "data").unwrap();

        remove_existing(&path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_removes_symlink_not_target() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("target");
        let link = temp.path().join("link");
        fs::write(&target, "keep").unwrap();
        symlink(&target, &link).unwrap();

        remove_existing(&link).unwrap();
        assert!(fs::symlink_metadata(&link).is_err());
        assert_eq!(fs::read_to_string(&target).unwrap(), "keep");
    }

    #[test]
    fn test_removes_empty_directory() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("empty");
        fs::create_dir(&dir).unwrap();

        remove_existing(&dir).unwrap();
        assert!(!dir.exists());
    }

    #[test]
    fn test_non_empty_directory_fails() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("full");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("child"), "x").unwrap();

        let err = remove_existing(&dir).unwrap_err();
        assert_eq!(err.operation(), Some(FsOperation::Remove));
        assert!(dir.join("child").exists());
    }

    #[test]
    fn test_missing_path_fails() {
        let temp = TempDir::new().unwrap();
        let err = remove_existing(&temp.path().join("nothing")).unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::Filesystem { ref source, .. } if source.kind() == io::ErrorKind::NotFound
        ));
    }
}
