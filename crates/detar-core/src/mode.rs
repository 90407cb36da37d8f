//! Translation from portable archive mode bits to the native `mode_t`.
//!
//! Archives describe permissions with the POSIX/ustar encoding (`0o7777`),
//! which is independent of how the host packs its `st_mode`. Every bit is
//! mapped explicitly through a table onto the libc constants, so an unknown
//! bit can never leak into a syscall.

use libc::mode_t;

/// Portable permission bits of an archive entry.
///
/// Holds the nine `rwx` permission bits plus the setuid, setgid and sticky
/// flags, using the archive encoding. Anything outside `0o7777` is dropped on
/// construction.
///
/// # Examples
///
/// ```
/// use detar_core::mode::FileMode;
///
/// let mode = FileMode::from_bits(0o104_755);
/// assert_eq!(mode.bits(), 0o4755);
/// assert!(mode.is_setuid());
/// assert_eq!(mode.permissions(), 0o755);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FileMode(u32);

impl FileMode {
    /// Set-user-id on execution.
    pub const SETUID: u32 = 0o4000;
    /// Set-group-id on execution.
    pub const SETGID: u32 = 0o2000;
    /// Restricted deletion flag.
    pub const STICKY: u32 = 0o1000;
    /// Mask of the owner/group/other permission bits.
    pub const PERMISSIONS: u32 = 0o777;

    const ALL: u32 = Self::SETUID | Self::SETGID | Self::STICKY | Self::PERMISSIONS;

    /// Builds a mode from raw archive bits, discarding unknown bits.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits & Self::ALL)
    }

    /// Returns the raw archive bits.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Returns only the `rwxrwxrwx` bits.
    #[must_use]
    pub const fn permissions(self) -> u32 {
        self.0 & Self::PERMISSIONS
    }

    /// Returns `true` if the setuid bit is requested.
    #[must_use]
    pub const fn is_setuid(self) -> bool {
        self.0 & Self::SETUID != 0
    }

    /// Returns `true` if the setgid bit is requested.
    #[must_use]
    pub const fn is_setgid(self) -> bool {
        self.0 & Self::SETGID != 0
    }

    /// Returns `true` if the sticky bit is requested.
    #[must_use]
    pub const fn is_sticky(self) -> bool {
        self.0 & Self::STICKY != 0
    }
}

/// Kind of node a mode is translated for.
///
/// Only FIFOs and device nodes carry their type in the mode handed to the
/// creating syscall; files and directories get their type from the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Regular file, created with `open(O_CREAT)`.
    Regular,
    /// Directory, created with `mkdir`.
    Directory,
    /// Named pipe.
    Fifo,
    /// Character device node.
    CharDevice,
    /// Block device node.
    BlockDevice,
}

const PERMISSION_TABLE: [(u32, mode_t); 9] = [
    (0o400, libc::S_IRUSR),
    (0o200, libc::S_IWUSR),
    (0o100, libc::S_IXUSR),
    (0o040, libc::S_IRGRP),
    (0o020, libc::S_IWGRP),
    (0o010, libc::S_IXGRP),
    (0o004, libc::S_IROTH),
    (0o002, libc::S_IWOTH),
    (0o001, libc::S_IXOTH),
];

const SPECIAL_TABLE: [(u32, mode_t); 3] = [
    (FileMode::SETUID, libc::S_ISUID),
    (FileMode::SETGID, libc::S_ISGID),
    (FileMode::STICKY, libc::S_ISVTX),
];

/// Returns the native permission and special bits for `mode`, without any
/// file type bits. This is the form `chmod` expects.
#[must_use]
pub fn permission_bits(mode: FileMode) -> mode_t {
    PERMISSION_TABLE
        .iter()
        .chain(SPECIAL_TABLE.iter())
        .filter(|(portable, _)| mode.bits() & portable != 0)
        .fold(0, |native, (_, bit)| native | bit)
}

/// Returns the native type bits for a node kind.
#[must_use]
pub fn type_bits(kind: NodeKind) -> mode_t {
    match kind {
        NodeKind::Regular | NodeKind::Directory => 0,
        NodeKind::Fifo => libc::S_IFIFO,
        NodeKind::CharDevice => libc::S_IFCHR,
        NodeKind::BlockDevice => libc::S_IFBLK,
    }
}

/// Translates a portable mode into the packed mode passed to the creating
/// syscall for `kind`.
///
/// # Examples
///
/// ```
/// use detar_core::mode::{FileMode, NodeKind, permission_bits, to_native, type_bits};
///
/// let mode = FileMode::from_bits(0o644);
/// let native = to_native(mode, NodeKind::Fifo);
/// assert_eq!(native, type_bits(NodeKind::Fifo) | permission_bits(mode));
/// ```
#[must_use]
pub fn to_native(mode: FileMode, kind: NodeKind) -> mode_t {
    permission_bits(mode) | type_bits(kind)
}
