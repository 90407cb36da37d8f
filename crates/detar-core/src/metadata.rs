//! Restoring timestamps, ownership and special bits on created objects.

use std::os::unix::fs::chown;
use std::path::Path;
use std::time::Duration;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use log::debug;
use log::warn;
use nix::sys::stat::FchmodatFlags;
use nix::sys::stat::Mode;
use nix::sys::stat::UtimensatFlags;
use nix::sys::stat::fchmodat;
use nix::sys::stat::utimensat;
use nix::sys::time::TimeSpec;

use crate::ExtractionError;
use crate::Result;
use crate::error::FsOperation;
use crate::mode::FileMode;
use crate::mode::permission_bits;
use crate::types::Entry;
use crate::types::Owner;
use crate::types::Timestamp;

/// Applies the entry's metadata to the object just created at `path`.
///
/// Times are set whenever the entry carries at least one of them. Owner and
/// group are only changed when `privileged` is set; afterwards the mode is
/// written again if setuid or setgid was requested, since `chown` clears
/// those bits.
///
/// # Errors
///
/// Returns `ExtractionError::Filesystem` naming the failed operation.
pub fn restore(path: &Path, entry: &Entry<'_>, privileged: bool) -> Result<()> {
    restore_times(path, entry.accessed, entry.modified)?;
    if privileged {
        restore_ownership(path, entry.owner, entry.mode)?;
    }
    Ok(())
}

/// Sets access and modification time of `path`, following symlinks.
///
/// Nothing happens when both are absent. An absent or unrepresentable time
/// is replaced by the current time.
///
/// # Errors
///
/// Returns `ExtractionError::Filesystem` with [`FsOperation::SetTimes`].
pub fn restore_times(
    path: &Path,
    accessed: Option<Timestamp>,
    modified: Option<Timestamp>,
) -> Result<()> {
    let Some((atime, mtime)) = effective_times(path, accessed, modified) else {
        return Ok(());
    };

    utimensat(
        None,
        path,
        &TimeSpec::from_duration(atime),
        &TimeSpec::from_duration(mtime),
        UtimensatFlags::FollowSymlink,
    )
    .map_err(|errno| ExtractionError::fs(FsOperation::SetTimes, path, errno.into()))
}

/// Changes owner and group of `path`, then re-applies `mode` if it carries
/// setuid or setgid.
///
/// # Errors
///
/// Returns `ExtractionError::Filesystem` with [`FsOperation::Chown`] or
/// [`FsOperation::Chmod`].
pub fn restore_ownership(path: &Path, owner: Owner, mode: FileMode) -> Result<()> {
    chown(path, Some(owner.uid), Some(owner.gid))
        .map_err(|e| ExtractionError::fs(FsOperation::Chown, path, e))?;

    if mode.is_setuid() || mode.is_setgid() {
        debug!("re-applying mode {:#o} to {} after chown", mode.bits(), path.display());
        set_mode(path, mode)?;
    }
    Ok(())
}

/// Sets the permission and special bits of `path`, following symlinks.
pub(crate) fn set_mode(path: &Path, mode: FileMode) -> Result<()> {
    fchmodat(
        None,
        path,
        Mode::from_bits_truncate(permission_bits(mode)),
        FchmodatFlags::FollowSymlink,
    )
    .map_err(|errno| ExtractionError::fs(FsOperation::Chmod, path, errno.into()))
}

fn effective_times(
    path: &Path,
    accessed: Option<Timestamp>,
    modified: Option<Timestamp>,
) -> Option<(Duration, Duration)> {
    if accessed.is_none() && modified.is_none() {
        return None;
    }

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    let clamp = |time: Option<Timestamp>, which: &str| {
        time.map_or(now, |t| {
            t.as_duration().unwrap_or_else(|| {
                warn!(
                    "{which} time {}.{:09} of {} is out of range, using current time",
                    t.secs(),
                    t.nanos(),
                    path.display()
                );
                now
            })
        })
    };

    Some((clamp(accessed, "access"), clamp(modified, "modification")))
}
