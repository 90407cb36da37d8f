//! Sanitized entry paths and lexical path cleaning.

use std::ffi::OsStr;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

/// An entry path that cannot leave the destination directory.
///
/// Built by resolving the archive name lexically as if it were rooted at
/// `/`: `.` components vanish, `..` pops the previous component and a `..`
/// at the top is dropped. A leading `/` is ignored. The result is relative
/// and may be empty, which denotes the destination root itself.
///
/// # Security Properties
///
/// - Can ONLY be constructed through [`SafePath::sanitize`]
/// - Never contains `..`, a root or a prefix component
/// - No filesystem access happens during sanitization
///
/// # Examples
///
/// ```
/// use detar_core::types::SafePath;
/// use std::path::Path;
///
/// let safe = SafePath::sanitize(Path::new("../../etc/passwd"));
/// assert_eq!(safe.as_path(), Path::new("etc/passwd"));
/// assert!(safe.was_clamped());
///
/// let plain = SafePath::sanitize(Path::new("./a/./b/../c.txt"));
/// assert_eq!(plain.as_path(), Path::new("a/c.txt"));
/// assert!(!plain.was_clamped());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SafePath {
    path: PathBuf,
    clamped: bool,
}

impl SafePath {
    /// Sanitizes an archive path. Never fails.
    #[must_use]
    pub fn sanitize(path: &Path) -> Self {
        let cleaned = normalize(path, true);
        let clamped = cleaned.escaped || path.has_root();
        Self {
            path: cleaned.components.iter().collect(),
            clamped,
        }
    }

    /// Returns the sanitized relative path.
    #[inline]
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.path
    }

    /// Returns `true` if the original path was absolute or tried to climb
    /// above the root and had to be clamped.
    #[must_use]
    pub const fn was_clamped(&self) -> bool {
        self.clamped
    }

    /// Returns `true` if the path denotes the destination root itself.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.path.as_os_str().is_empty()
    }
}

/// Lexically cleans a path without touching the filesystem.
///
/// Duplicate separators and `.` components are removed and `name/..` pairs
/// cancel out. Leading `..` components of a relative path are kept, as is
/// the root of an absolute one (`/..` is `/`). An empty result becomes `.`.
///
/// # Examples
///
/// ```
/// use detar_core::types::clean_lexical;
/// use std::path::Path;
///
/// assert_eq!(clean_lexical(Path::new("a//b/./../c")), Path::new("a/c"));
/// assert_eq!(clean_lexical(Path::new("../x")), Path::new("../x"));
/// assert_eq!(clean_lexical(Path::new("/../etc")), Path::new("/etc"));
/// assert_eq!(clean_lexical(Path::new("a/..")), Path::new("."));
/// ```
#[must_use]
pub fn clean_lexical(path: &Path) -> PathBuf {
    let rooted = path.has_root();
    let cleaned = normalize(path, rooted);

    let mut result = PathBuf::new();
    if rooted {
        result.push(Component::RootDir.as_os_str());
    }
    result.extend(cleaned.components);

    if result.as_os_str().is_empty() {
        result.push(Component::CurDir.as_os_str());
    }
    result
}

struct Normalized<'p> {
    components: Vec<&'p OsStr>,
    escaped: bool,
}

fn normalize(path: &Path, rooted: bool) -> Normalized<'_> {
    let mut components: Vec<&OsStr> = Vec::new();
    let mut escaped = false;
    let dotdot = Component::ParentDir.as_os_str();

    for component in path.components() {
        match component {
            Component::Normal(name) => components.push(name),
            Component::ParentDir => match components.last() {
                Some(last) if *last != dotdot => {
                    components.pop();
                }
                _ if rooted => escaped = true,
                _ => components.push(dotdot),
            },
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }

    Normalized {
        components,
        escaped,
    }
}
