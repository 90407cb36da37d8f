//! Validated destination directory type.

use nix::unistd::AccessFlags;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use super::SafePath;
use crate::ExtractionError;
use crate::Result;

/// The directory an archive is extracted into.
///
/// Validated on construction to:
/// - Exist on the filesystem
/// - Be a directory (not a file)
/// - Be writable by the current process
/// - Be represented as an absolute canonical path
///
/// Creating the directory is the caller's job.
///
/// # Examples
///
/// ```no_run
/// use detar_core::types::{DestDir, SafePath};
/// use std::path::Path;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dest = DestDir::new("/tmp/extraction")?;
/// let path = dest.join(&SafePath::sanitize(Path::new("../etc/passwd")));
/// assert!(path.starts_with(dest.as_path()));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestDir(PathBuf);

impl DestDir {
    /// Creates a new `DestDir` after validating the path.
    ///
    /// # Errors
    ///
    /// Returns `ExtractionError::Io` if the path does not exist, is not a
    /// directory, cannot be canonicalized or is not writable.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let metadata = std::fs::metadata(&path).map_err(|e| {
            ExtractionError::Io(io::Error::new(
                e.kind(),
                format!("destination directory {}: {e}", path.display()),
            ))
        })?;
        if !metadata.is_dir() {
            return Err(ExtractionError::Io(io::Error::new(
                io::ErrorKind::NotADirectory,
                format!("path is not a directory: {}", path.display()),
            )));
        }

        let canonical = path.canonicalize().map_err(|e| {
            ExtractionError::Io(io::Error::new(
                e.kind(),
                format!("failed to canonicalize path {}: {e}", path.display()),
            ))
        })?;

        nix::unistd::access(&canonical, AccessFlags::W_OK).map_err(|errno| {
            ExtractionError::Io(io::Error::new(
                io::Error::from(errno).kind(),
                format!("directory is not writable: {}", canonical.display()),
            ))
        })?;

        Ok(Self(canonical))
    }

    /// Returns the path as a `&Path`.
    #[inline]
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Joins a sanitized entry path onto the destination.
    #[inline]
    #[must_use]
    pub fn join(&self, safe_path: &SafePath) -> PathBuf {
        if safe_path.is_root() {
            return self.0.clone();
        }
        self.0.join(safe_path.as_path())
    }

    /// Sanitizes an archive path and joins it onto the destination.
    #[must_use]
    pub fn resolve(&self, archive_path: &Path) -> PathBuf {
        self.join(&SafePath::sanitize(archive_path))
    }

    /// Checks that the directory holding `path` is still inside the
    /// destination once symbolic links on disk are followed.
    ///
    /// `path` must come from [`DestDir::join`] or [`DestDir::resolve`]. The
    /// nearest existing ancestor is resolved; whatever does not exist yet is
    /// left for the creating operation to report.
    ///
    /// # Errors
    ///
    /// Returns `ExtractionError::SymlinkEscape` if that ancestor resolves
    /// outside the destination.
    pub fn confine(&self, path: &Path) -> Result<()> {
        if path == self.0 {
            return Ok(());
        }
        for ancestor in path.ancestors().skip(1) {
            if let Ok(resolved) = ancestor.canonicalize() {
                if resolved.starts_with(&self.0) {
                    return Ok(());
                }
                return Err(ExtractionError::SymlinkEscape {
                    path: path.to_path_buf(),
                    resolved,
                });
            }
            if ancestor == self.0 {
                break;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_dest_dir_valid() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let dest = DestDir::new(temp.path()).expect("dest should be valid");
        assert!(dest.as_path().is_absolute());
    }

    #[test]
    fn test_dest_dir_nonexistent() {
        let result = DestDir::new("/nonexistent/directory/that/does/not/exist");
        assert!(matches!(result, Err(ExtractionError::Io(ref e)) if e.kind() == io::ErrorKind::NotFound));
    }

    #[test]
    fn test_dest_dir_not_a_directory() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let file_path = temp.path().join("file.txt");
        fs::write(&file_path, "test").expect("failed to write file");

        let result = DestDir::new(file_path);
        assert!(matches!(result, Err(ExtractionError::Io(_))));
    }

    #[test]
    fn test_dest_dir_canonicalization() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let subdir = temp.path().join("subdir");
        fs::create_dir(&subdir).expect("failed to create subdir");

        let dest = DestDir::new(subdir.join(".").join("..")).expect("should create dest dir");
        assert_eq!(dest.as_path(), temp.path().canonicalize().unwrap());
    }

    #[test]
    fn test_join_stays_inside() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let dest = DestDir::new(temp.path()).expect("should create");

        for name in ["../../etc/passwd", "/etc/passwd", "a/../../b", "ok/file"] {
            let path = dest.resolve(Path::new(name));
            assert!(path.starts_with(dest.as_path()), "{name} escaped to {path:?}");
        }
    }

    #[test]
    fn test_confine_plain_and_inner_links() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let dest = DestDir::new(temp.path()).expect("should create");
        fs::create_dir(dest.as_path().join("real")).unwrap();
        std::os::unix::fs::symlink("real", dest.as_path().join("alias")).unwrap();

        for name in ["top", "real/file", "alias/file", "missing/file", "."] {
            dest.confine(&dest.resolve(Path::new(name)))
                .unwrap_or_else(|e| panic!("{name}: {e}"));
        }
    }

    #[test]
    fn test_confine_rejects_link_out() {
        let outer = TempDir::new().expect("failed to create temp dir");
        let root = outer.path().join("root");
        fs::create_dir(&root).unwrap();
        fs::create_dir(outer.path().join("outside")).unwrap();
        let dest = DestDir::new(&root).expect("should create");
        std::os::unix::fs::symlink(outer.path().join("outside"), root.join("evil")).unwrap();
        std::os::unix::fs::symlink("../outside", root.join("up")).unwrap();

        for name in ["evil/pwned", "up/pwned", "evil/deeper/pwned"] {
            let err = dest.confine(&dest.resolve(Path::new(name))).unwrap_err();
            assert!(matches!(err, ExtractionError::SymlinkEscape { .. }), "{name}: {err}");
        }
    }

    #[test]
    fn test_join_root_entry() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let dest = DestDir::new(temp.path()).expect("should create");
        assert_eq!(dest.resolve(Path::new("./")), dest.as_path());
    }
}
