//! Error types for archive extraction operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `ExtractionError`.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Filesystem operation that failed while materializing an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsOperation {
    /// Creating a directory.
    CreateDir,
    /// Creating or truncating a regular file.
    CreateFile,
    /// Streaming entry content into a regular file.
    WriteFile,
    /// Creating a hard link.
    Hardlink,
    /// Creating a symbolic link.
    Symlink,
    /// Creating a named pipe.
    Mkfifo,
    /// Creating a character or block device node.
    Mknod,
    /// Removing an object that was in the way.
    Remove,
    /// Changing permission bits.
    Chmod,
    /// Changing owner and group.
    Chown,
    /// Setting access and modification times.
    SetTimes,
}

impl std::fmt::Display for FsOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let op = match self {
            Self::CreateDir => "create directory",
            Self::CreateFile => "create file",
            Self::WriteFile => "write file",
            Self::Hardlink => "create hard link",
            Self::Symlink => "create symlink",
            Self::Mkfifo => "create fifo",
            Self::Mknod => "create device node",
            Self::Remove => "remove existing",
            Self::Chmod => "change mode",
            Self::Chown => "change ownership",
            Self::SetTimes => "set times",
        };
        f.write_str(op)
    }
}

/// Errors that can occur during archive extraction.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// Reading the entry stream or an entry's content failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Entry carries a type code the engine cannot materialize.
    #[error(
        "unsupported header type flag for {name:?}: {code:#x} ({:?})",
        type_char(.code)
    )]
    UnsupportedEntryType {
        /// Raw type code from the archive header.
        code: u8,
        /// Name of the offending entry.
        name: PathBuf,
    },

    /// A filesystem operation failed for an entry.
    #[error("failed to {operation} {path:?}: {source}")]
    Filesystem {
        /// The operation that failed.
        operation: FsOperation,
        /// Destination path the operation targeted.
        path: PathBuf,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// Creating an entry would follow a symbolic link already on disk to a
    /// place outside the destination directory.
    #[error("{path:?} resolves through a symbolic link to {resolved:?}, outside the destination")]
    SymlinkEscape {
        /// Destination path of the entry, or of a hard link's source.
        path: PathBuf,
        /// Where the path's directory actually leads.
        resolved: PathBuf,
    },
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn type_char(code: &u8) -> char {
    char::from(*code)
}

impl ExtractionError {
    pub(crate) fn fs(
        operation: FsOperation,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::Filesystem {
            operation,
            path: path.into(),
            source,
        }
    }

    /// Returns `true` if a filesystem operation failed because its
    /// destination already exists.
    ///
    /// # Examples
    ///
    /// ```
    /// use detar_core::ExtractionError;
    /// use detar_core::error::FsOperation;
    /// use std::path::PathBuf;
    ///
    /// let err = ExtractionError::Filesystem {
    ///     operation: FsOperation::Symlink,
    ///     path: PathBuf::from("/out/link"),
    ///     source: std::io::ErrorKind::AlreadyExists.into(),
    /// };
    /// assert!(err.is_path_collision());
    /// ```
    #[must_use]
    pub fn is_path_collision(&self) -> bool {
        matches!(
            self,
            Self::Filesystem { source, .. } if source.kind() == std::io::ErrorKind::AlreadyExists
        )
    }

    /// Returns the filesystem operation that failed, if any.
    #[must_use]
    pub const fn operation(&self) -> Option<FsOperation> {
        match self {
            Self::Filesystem { operation, .. } => Some(*operation),
            _ => None,
        }
    }
}
