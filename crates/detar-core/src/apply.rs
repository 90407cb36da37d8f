//! Materializing a single entry on the filesystem.
//!
//! Each entry type maps to exactly one creating operation. Nothing here
//! retries or restores metadata; that is the engine's job.

use std::fs;
use std::fs::DirBuilder;
use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::os::unix::fs::DirBuilderExt;
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::fs::PermissionsExt;
use std::os::unix::fs::symlink;
use std::path::Path;

use nix::sys::stat::Mode;
use nix::sys::stat::SFlag;
use nix::sys::stat::mknod;
use nix::unistd::mkfifo;

use crate::ExtractionError;
use crate::Result;
use crate::copy::CopyBuffer;
use crate::copy::copy_with_buffer;
use crate::error::FsOperation;
use crate::metadata::set_mode;
use crate::mode::NodeKind;
use crate::mode::permission_bits;
use crate::mode::to_native;
use crate::types::DestDir;
use crate::types::DeviceNumber;
use crate::types::Entry;
use crate::types::EntryType;
use crate::types::clean_lexical;

/// Creates the object described by `entry` at `path`.
///
/// `dest` resolves hard link targets; `buffer` carries file content.
///
/// # Errors
///
/// Returns `ExtractionError::UnsupportedEntryType` for unknown type codes
/// and `ExtractionError::Filesystem` when the creating operation fails. An
/// existing object at `path` surfaces as a failure for which
/// [`ExtractionError::is_path_collision`] holds, except for files, which
/// are truncated and given the entry's mode, and directories, which take
/// the entry's mode over whatever already exists there.
pub fn apply_entry(
    entry: &mut Entry<'_>,
    path: &Path,
    dest: &DestDir,
    buffer: &mut CopyBuffer,
) -> Result<()> {
    match &entry.entry_type {
        EntryType::File => create_file(entry, path, buffer),
        EntryType::Directory => create_dir(entry, path),
        EntryType::Hardlink { target } => {
            let source = dest.resolve(target);
            fs::hard_link(&source, path)
                .map_err(|e| ExtractionError::fs(FsOperation::Hardlink, path, e))
        }
        EntryType::Symlink { target } => symlink(clean_lexical(target), path)
            .map_err(|e| ExtractionError::fs(FsOperation::Symlink, path, e)),
        EntryType::Fifo => {
            let native = to_native(entry.mode, NodeKind::Fifo);
            mkfifo(path, Mode::from_bits_truncate(native))
                .map_err(|errno| ExtractionError::fs(FsOperation::Mkfifo, path, errno.into()))
        }
        EntryType::CharDevice { device } => {
            create_node(path, to_native(entry.mode, NodeKind::CharDevice), *device)
        }
        EntryType::BlockDevice { device } => {
            create_node(path, to_native(entry.mode, NodeKind::BlockDevice), *device)
        }
        EntryType::Unsupported { code } => Err(ExtractionError::UnsupportedEntryType {
            code: *code,
            name: entry.name.clone(),
        }),
    }
}

fn create_file(entry: &mut Entry<'_>, path: &Path, buffer: &mut CopyBuffer) -> Result<()> {
    let native = to_native(entry.mode, NodeKind::Regular);
    let existed = fs::symlink_metadata(path).is_ok();
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(native.into())
        .open(path)
        .map_err(|e| ExtractionError::fs(FsOperation::CreateFile, path, e))?;

    // The create mode only applies to a new file.
    if existed {
        file.set_permissions(fs::Permissions::from_mode(permission_bits(entry.mode).into()))
            .map_err(|e| ExtractionError::fs(FsOperation::Chmod, path, e))?;
    }

    if let Some(content) = entry.content_mut() {
        copy_with_buffer(content, &mut file, buffer)
            .map_err(|e| ExtractionError::fs(FsOperation::WriteFile, path, e))?;
    }

    file.flush()
        .map_err(|e| ExtractionError::fs(FsOperation::WriteFile, path, e))
}

fn create_dir(entry: &Entry<'_>, path: &Path) -> Result<()> {
    let native = to_native(entry.mode, NodeKind::Directory);
    match DirBuilder::new().mode(native.into()).create(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && !path.is_symlink() => {
            set_mode(path, entry.mode)
        }
        Err(e) => Err(ExtractionError::fs(FsOperation::CreateDir, path, e)),
    }
}

fn create_node(path: &Path, native: libc::mode_t, device: DeviceNumber) -> Result<()> {
    mknod(
        path,
        SFlag::from_bits_truncate(native),
        Mode::from_bits_truncate(native),
        device.to_dev_t(),
    )
    .map_err(|errno| ExtractionError::fs(FsOperation::Mknod, path, errno.into()))
}
