//! Archive entry type enumeration.

use std::fmt;
use std::path::PathBuf;

use crate::mode::NodeKind;

/// Major and minor number of a device node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DeviceNumber {
    /// Driver number.
    pub major: u32,
    /// Instance number.
    pub minor: u32,
}

impl DeviceNumber {
    /// Creates a device number from its major and minor parts.
    #[must_use]
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Encodes the pair into the platform's `dev_t`.
    #[cfg(any(target_os = "linux", target_os = "android"))]
    #[must_use]
    pub fn to_dev_t(self) -> libc::dev_t {
        nix::sys::stat::makedev(u64::from(self.major), u64::from(self.minor))
    }

    /// Encodes the pair into the platform's `dev_t`.
    #[cfg(not(any(target_os = "linux", target_os = "android")))]
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn to_dev_t(self) -> libc::dev_t {
        libc::makedev(self.major as _, self.minor as _)
    }
}

/// Type of entry in an archive.
///
/// Each variant carries the metadata needed to materialize that type. Type
/// codes the engine does not know are kept as [`EntryType::Unsupported`] so
/// the failure can name them.
///
/// # Examples
///
/// ```
/// use detar_core::types::EntryType;
/// use std::path::PathBuf;
///
/// let file = EntryType::File;
/// let symlink = EntryType::Symlink {
///     target: PathBuf::from("../target"),
/// };
/// assert_eq!(file.code(), b'0');
/// assert_eq!(symlink.code(), b'2');
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntryType {
    /// Regular file entry.
    File,

    /// Directory entry.
    Directory,

    /// Hard link entry.
    ///
    /// `target` names an earlier entry of the same archive and is resolved
    /// against the destination root.
    Hardlink {
        /// The hard link target, relative to the archive root.
        target: PathBuf,
    },

    /// Symbolic link entry.
    ///
    /// `target` is written into the link verbatim (after lexical cleaning)
    /// and never resolved.
    Symlink {
        /// The symlink target.
        target: PathBuf,
    },

    /// Named pipe.
    Fifo,

    /// Character device node.
    CharDevice {
        /// Device number of the node.
        device: DeviceNumber,
    },

    /// Block device node.
    BlockDevice {
        /// Device number of the node.
        device: DeviceNumber,
    },

    /// Any type code outside the supported set.
    Unsupported {
        /// The raw type code from the header.
        code: u8,
    },
}

impl EntryType {
    /// Returns the ustar type flag for this entry type.
    #[must_use]
    pub const fn code(&self) -> u8 {
        match self {
            Self::File => b'0',
            Self::Hardlink { .. } => b'1',
            Self::Symlink { .. } => b'2',
            Self::CharDevice { .. } => b'3',
            Self::BlockDevice { .. } => b'4',
            Self::Directory => b'5',
            Self::Fifo => b'6',
            Self::Unsupported { code } => *code,
        }
    }

    /// Returns the node kind used for mode translation, if this type is
    /// created with a mode at all. Links take no mode.
    #[must_use]
    pub const fn node_kind(&self) -> Option<NodeKind> {
        match self {
            Self::File => Some(NodeKind::Regular),
            Self::Directory => Some(NodeKind::Directory),
            Self::Fifo => Some(NodeKind::Fifo),
            Self::CharDevice { .. } => Some(NodeKind::CharDevice),
            Self::BlockDevice { .. } => Some(NodeKind::BlockDevice),
            Self::Hardlink { .. } | Self::Symlink { .. } | Self::Unsupported { .. } => None,
        }
    }

    /// Returns `true` if timestamps and ownership are restored after this
    /// type is created. Links either share their target's inode or carry
    /// their own metadata.
    #[must_use]
    pub const fn restores_metadata(&self) -> bool {
        self.node_kind().is_some()
    }

    /// Returns `true` if an existing object in the way is removed and the
    /// creation retried. Files are truncated and directories merged instead.
    #[must_use]
    pub const fn replaces_existing(&self) -> bool {
        !matches!(self, Self::File | Self::Directory)
    }

    /// Returns `true` if this is a regular file.
    #[must_use]
    pub const fn is_file(&self) -> bool {
        matches!(self, Self::File)
    }

    /// Returns `true` if this is a directory.
    #[must_use]
    pub const fn is_directory(&self) -> bool {
        matches!(self, Self::Directory)
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => f.write_str("file"),
            Self::Directory => f.write_str("directory"),
            Self::Hardlink { target } => write!(f, "hard link to {}", target.display()),
            Self::Symlink { target } => write!(f, "symlink to {}", target.display()),
            Self::Fifo => f.write_str("fifo"),
            Self::CharDevice { device } => {
                write!(f, "character device {}:{}", device.major, device.minor)
            }
            Self::BlockDevice { device } => {
                write!(f, "block device {}:{}", device.major, device.minor)
            }
            Self::Unsupported { code } => write!(f, "unsupported type {code:#x}"),
        }
    }
}
