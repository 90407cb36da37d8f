//! Archive entry data model.

use std::fmt;
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use super::EntryType;
use crate::mode::FileMode;

const NANOS_PER_SEC: u32 = 1_000_000_000;

/// Numeric owner of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Owner {
    /// User id.
    pub uid: u32,
    /// Group id.
    pub gid: u32,
}

impl Owner {
    /// Creates an owner from a user and group id.
    #[must_use]
    pub const fn new(uid: u32, gid: u32) -> Self {
        Self { uid, gid }
    }
}

/// Point in time relative to the Unix epoch, as stored in an archive.
///
/// Archives may carry times the filesystem cannot represent (before the
/// epoch, or too large for a signed nanosecond count).
/// [`Timestamp::is_representable`] tells them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    secs: i64,
    nanos: u32,
}

impl Timestamp {
    /// Creates a timestamp, carrying excess nanoseconds into the seconds.
    #[must_use]
    pub const fn new(secs: i64, nanos: u32) -> Self {
        Self {
            secs: secs.saturating_add((nanos / NANOS_PER_SEC) as i64),
            nanos: nanos % NANOS_PER_SEC,
        }
    }

    /// Creates a timestamp with whole seconds.
    #[must_use]
    pub const fn from_secs(secs: i64) -> Self {
        Self { secs, nanos: 0 }
    }

    /// Returns the current wall-clock time.
    #[must_use]
    pub fn now() -> Self {
        Self::from(SystemTime::now())
    }

    /// Seconds since the epoch (negative before it).
    #[must_use]
    pub const fn secs(self) -> i64 {
        self.secs
    }

    /// Sub-second part in nanoseconds, always below one second.
    #[must_use]
    pub const fn nanos(self) -> u32 {
        self.nanos
    }

    /// Returns `true` if the time lies at or after the epoch and its
    /// nanosecond count fits in an `i64`.
    #[must_use]
    pub const fn is_representable(self) -> bool {
        self.as_duration().is_some()
    }

    /// Returns the offset from the epoch, or `None` if the timestamp is not
    /// representable.
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub const fn as_duration(self) -> Option<Duration> {
        if self.secs < 0 {
            return None;
        }
        match self.secs.checked_mul(NANOS_PER_SEC as i64) {
            Some(whole) if whole.checked_add(self.nanos as i64).is_some() => {
                Some(Duration::new(self.secs as u64, self.nanos))
            }
            _ => None,
        }
    }
}

impl From<SystemTime> for Timestamp {
    fn from(time: SystemTime) -> Self {
        match time.duration_since(UNIX_EPOCH) {
            Ok(after) => Self::new(
                i64::try_from(after.as_secs()).unwrap_or(i64::MAX),
                after.subsec_nanos(),
            ),
            Err(before) => {
                let before = before.duration();
                let secs = i64::try_from(before.as_secs()).map_or(i64::MIN, |s| -s);
                match before.subsec_nanos() {
                    0 => Self::from_secs(secs),
                    nanos => Self::new(secs.saturating_sub(1), NANOS_PER_SEC - nanos),
                }
            }
        }
    }
}

/// One object to materialize: header fields plus, for regular files, a lazy
/// content source positioned at the entry's data.
///
/// # Examples
///
/// ```
/// use detar_core::mode::FileMode;
/// use detar_core::types::{Entry, Timestamp};
///
/// let entry = Entry::file("a/b.txt", &b"hello"[..])
///     .with_mode(FileMode::from_bits(0o644))
///     .with_modified(Timestamp::from_secs(1_700_000_000));
/// assert!(entry.entry_type.is_file());
/// ```
pub struct Entry<'a> {
    /// Path of the entry inside the archive.
    pub name: PathBuf,
    /// What kind of object this entry describes.
    pub entry_type: EntryType,
    /// Requested permission and special bits.
    pub mode: FileMode,
    /// Requested owner, applied only with privilege.
    pub owner: Owner,
    /// Access time, if the archive records one.
    pub accessed: Option<Timestamp>,
    /// Modification time, if the archive records one.
    pub modified: Option<Timestamp>,
    content: Option<Box<dyn Read + 'a>>,
}

impl<'a> Entry<'a> {
    /// Creates an entry with mode `0`, owner `0:0` and no timestamps.
    pub fn new(name: impl Into<PathBuf>, entry_type: EntryType) -> Self {
        Self {
            name: name.into(),
            entry_type,
            mode: FileMode::default(),
            owner: Owner::default(),
            accessed: None,
            modified: None,
            content: None,
        }
    }

    /// Creates a regular file entry reading its data from `content`.
    pub fn file(name: impl Into<PathBuf>, content: impl Read + 'a) -> Self {
        Self::new(name, EntryType::File).with_content(content)
    }

    /// Creates a directory entry.
    pub fn directory(name: impl Into<PathBuf>) -> Self {
        Self::new(name, EntryType::Directory)
    }

    /// Creates a symlink entry pointing at `target`.
    pub fn symlink(name: impl Into<PathBuf>, target: impl Into<PathBuf>) -> Self {
        Self::new(
            name,
            EntryType::Symlink {
                target: target.into(),
            },
        )
    }

    /// Creates a hard link entry to the earlier entry `target`.
    pub fn hardlink(name: impl Into<PathBuf>, target: impl Into<PathBuf>) -> Self {
        Self::new(
            name,
            EntryType::Hardlink {
                target: target.into(),
            },
        )
    }

    /// Sets the requested mode.
    pub fn with_mode(mut self, mode: FileMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the requested owner.
    pub fn with_owner(mut self, owner: Owner) -> Self {
        self.owner = owner;
        self
    }

    /// Sets the access time.
    pub fn with_accessed(mut self, accessed: Timestamp) -> Self {
        self.accessed = Some(accessed);
        self
    }

    /// Sets the modification time.
    pub fn with_modified(mut self, modified: Timestamp) -> Self {
        self.modified = Some(modified);
        self
    }

    /// Attaches the content source. Only read for regular files.
    pub fn with_content(mut self, content: impl Read + 'a) -> Self {
        self.content = Some(Box::new(content));
        self
    }

    /// Returns the content source, if any.
    pub fn content_mut(&mut self) -> Option<&mut (dyn Read + 'a)> {
        self.content.as_deref_mut()
    }
}

impl fmt::Debug for Entry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("name", &self.name)
            .field("entry_type", &self.entry_type)
            .field("mode", &format_args!("{:#o}", self.mode.bits()))
            .field("owner", &self.owner)
            .field("accessed", &self.accessed)
            .field("modified", &self.modified)
            .field("has_content", &self.content.is_some())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_normalizes_nanos() {
        let ts = Timestamp::new(10, 2_500_000_000);
        assert_eq!(ts.secs(), 12);
        assert_eq!(ts.nanos(), 500_000_000);
    }

    #[test]
    fn test_negative_timestamp_not_representable() {
        assert!(!Timestamp::from_secs(-1).is_representable());
        assert!(Timestamp::from_secs(0).is_representable());
        assert!(Timestamp::new(1_700_000_000, 123).is_representable());
    }

    #[test]
    fn test_nanosecond_overflow_not_representable() {
        // Year 2262 is the end of the signed nanosecond range.
        assert!(!Timestamp::from_secs(i64::MAX / 1_000_000_000 + 1).is_representable());
        assert!(Timestamp::from_secs(i64::MAX / 1_000_000_000 - 1).is_representable());
    }

    #[test]
    fn test_timestamp_from_system_time() {
        let time = UNIX_EPOCH + Duration::new(42, 7);
        assert_eq!(Timestamp::from(time), Timestamp::new(42, 7));

        let before = UNIX_EPOCH - Duration::new(1, 500_000_000);
        let ts = Timestamp::from(before);
        assert_eq!(ts.secs(), -2);
        assert_eq!(ts.nanos(), 500_000_000);
    }

    #[test]
    fn test_entry_builders() {
        let mut entry = Entry::file("dir/file.txt", &b"data"[..])
            .with_mode(FileMode::from_bits(0o600))
            .with_owner(Owner::new(1000, 100))
            .with_accessed(Timestamp::from_secs(1))
            .with_modified(Timestamp::from_secs(2));

        assert_eq!(entry.name, PathBuf::from("dir/file.txt"));
        assert_eq!(entry.mode.bits(), 0o600);
        assert_eq!(entry.owner, Owner::new(1000, 100));
        assert_eq!(entry.accessed, Some(Timestamp::from_secs(1)));

        let mut data = String::new();
        entry.content_mut().unwrap().read_to_string(&mut data).unwrap();
        assert_eq!(data, "data");
    }

    #[test]
    fn test_entry_debug_hides_content() {
        let entry = Entry::directory("dir").with_mode(FileMode::from_bits(0o755));
        let debug = format!("{entry:?}");
        assert!(debug.contains("Directory"));
        assert!(debug.contains("0o755"));
        assert!(debug.contains("has_content: false"));
    }
}
