//! Error conversion utilities for CLI.
//!
//! Converts detar-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance.

use anyhow::anyhow;
use detar_core::ExtractionError;
use detar_core::error::FsOperation;
use std::io;
use std::path::Path;

/// Converts `ExtractionError` to user-friendly anyhow error with context
pub fn convert_extraction_error(err: ExtractionError, archive: &Path) -> anyhow::Error {
    match err {
        ExtractionError::UnsupportedEntryType { code, name } => {
            anyhow!(
                "Archive '{}' contains {} with unsupported type flag {code:#x} ({:?})\n\
                 HINT: Only regular files, directories, links, FIFOs and device nodes can be unpacked.",
                archive.display(),
                name.display(),
                char::from(code)
            )
        }
        ExtractionError::Filesystem {
            operation,
            path,
            source,
        } => {
            let hint = hint_for(operation, &source);
            let message = format!(
                "Failed to {operation} '{}' while unpacking '{}': {source}",
                path.display(),
                archive.display()
            );
            match hint {
                Some(hint) => anyhow!("{message}\nHINT: {hint}"),
                None => anyhow!("{message}"),
            }
        }
        ExtractionError::SymlinkEscape { path, resolved } => {
            anyhow!(
                "Archive '{}' tries to write '{}' through a symbolic link to '{}'\n\
                 HINT: An earlier entry links out of the destination; the archive may be malicious.",
                archive.display(),
                path.display(),
                resolved.display()
            )
        }
        ExtractionError::Io(io_err) => {
            anyhow!(
                "I/O error while reading '{}': {}\n\
                 HINT: The archive may be corrupted, truncated or not a tar file.",
                archive.display(),
                io_err
            )
        }
    }
}

fn hint_for(operation: FsOperation, source: &io::Error) -> Option<&'static str> {
    match (operation, source.kind()) {
        (FsOperation::Mknod | FsOperation::Chown, io::ErrorKind::PermissionDenied) => {
            Some("Device nodes and foreign owners require running as root.")
        }
        (FsOperation::Hardlink, io::ErrorKind::NotFound) => {
            Some("A hard link refers to a file that is not in the archive before it.")
        }
        (_, io::ErrorKind::AlreadyExists) => {
            Some("The path was recreated while unpacking; another process may be writing to the directory.")
        }
        (FsOperation::Remove, _) => Some("A non-empty directory is in the way of a link or special file."),
        _ => None,
    }
}

/// Adds context to a generic error about archive operations
pub fn add_archive_context<T>(
    result: Result<T, ExtractionError>,
    archive: &Path,
) -> anyhow::Result<T> {
    result.map_err(|e| convert_extraction_error(e, archive))
}
